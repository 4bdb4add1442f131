//! Global score, lives and level clock.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorebar {
    score: i64,
    lives: i64,
    level: usize,
    clock_us: u64,
}

impl Scorebar {
    pub fn new(lives: i64) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
            clock_us: 0,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score;
    }

    pub fn add_score(&mut self, delta: i64) {
        self.score += delta;
    }

    /// Six zero-padded digits, the way the scorebar is displayed.
    pub fn formatted_score(&self) -> String {
        format!("{:06}", self.score)
    }

    pub fn lives(&self) -> i64 {
        self.lives
    }

    pub fn set_lives(&mut self, lives: i64) {
        self.lives = lives;
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    /// Counts up by one frame. Only ticks while a level is being played.
    pub fn tick(&mut self, frame_us: u64) {
        self.clock_us += frame_us;
    }

    pub fn reset_clock(&mut self) {
        self.clock_us = 0;
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_us / 1000
    }

    /// Clock as `mm:ss`.
    pub fn formatted_time(&self) -> String {
        let secs = self.clock_us / 1_000_000;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
