//! The game-loop state machine.
//!
//! `Screen` owns exactly one `StepStrategy` at a time. A level strategy
//! simulates the current level; a transition strategy counts frames and then
//! moves on; level select and halted do nothing until the caller acts.

use std::fmt;

/// Externally visible state of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    LevelSelect,
    Playing { level: usize },
    LoseLife,
    GameOver,
    NextLevelTransition { to: usize },
    WinGame,
    Halted { reason: String },
}

impl GameState {
    /// Nothing happens from here until `Screen::restart`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver | Self::WinGame | Self::Halted { .. })
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelSelect => f.write_str("level select"),
            Self::Playing { level } => write!(f, "playing level {level}"),
            Self::LoseLife => f.write_str("lose life"),
            Self::GameOver => f.write_str("game over"),
            Self::NextLevelTransition { to } => write!(f, "next level ({to})"),
            Self::WinGame => f.write_str("win game"),
            Self::Halted { reason } => write!(f, "halted: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionKind {
    LoseLife { level: usize },
    GameOver,
    NextLevel { to: usize },
    WinGame,
}

impl TransitionKind {
    /// Level to enter once the transition has been shown, if any.
    pub(crate) fn next_level(self) -> Option<usize> {
        match self {
            Self::LoseLife { level } => Some(level),
            Self::NextLevel { to } => Some(to),
            Self::GameOver | Self::WinGame => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelStep {
    pub(crate) level: usize,
    pub(crate) first_tick: bool,
    pub(crate) ticks: u64,
}

impl LevelStep {
    pub(crate) fn new(level: usize) -> Self {
        Self {
            level,
            first_tick: true,
            ticks: 0,
        }
    }

    /// Counts a tick and reports whether it is the first one on this screen.
    pub(crate) fn begin_tick(&mut self) -> bool {
        self.ticks += 1;
        std::mem::replace(&mut self.first_tick, false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransitionStep {
    pub(crate) kind: TransitionKind,
    frame: u32,
    done: bool,
}

impl TransitionStep {
    pub(crate) fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            frame: 1,
            done: false,
        }
    }

    /// Advances one frame. Returns true exactly once, on the frame the
    /// transition has been shown for `duration` frames.
    pub(crate) fn advance(&mut self, duration: u32) -> bool {
        if self.done {
            return false;
        }
        let finished = self.frame >= duration;
        self.frame += 1;
        if finished {
            self.done = true;
        }
        finished
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepStrategy {
    LevelSelect,
    Level(LevelStep),
    Transition(TransitionStep),
    Halted(String),
}

impl StepStrategy {
    pub(crate) fn state(&self) -> GameState {
        match self {
            Self::LevelSelect => GameState::LevelSelect,
            Self::Level(step) => GameState::Playing { level: step.level },
            Self::Transition(step) => match step.kind {
                TransitionKind::LoseLife { .. } => GameState::LoseLife,
                TransitionKind::GameOver => GameState::GameOver,
                TransitionKind::NextLevel { to } => GameState::NextLevelTransition { to },
                TransitionKind::WinGame => GameState::WinGame,
            },
            Self::Halted(reason) => GameState::Halted {
                reason: reason.clone(),
            },
        }
    }
}
