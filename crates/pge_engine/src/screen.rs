//! Tick driver: owns the levels, the scorebar, the collision observer and the
//! active step strategy.
//!
//! One call to `step` advances exactly one fixed tick. Nothing inside a tick
//! suspends, and level resets only happen between ticks: transition requests
//! raised by actions are held until every entity has been evaluated.

use pge_core::{EngineConfig, EngineError, EngineResult, InputSnapshot, Scorebar};

use crate::action::ScreenRequest;
use crate::collision::{Collision, CollisionObservable};
use crate::entity::{Entity, EntityId};
use crate::event::{dispatch_events, TickView};
use crate::level::{Level, LevelEdit};
use crate::level_manager::LevelManager;
use crate::step::{GameState, LevelStep, StepStrategy, TransitionKind, TransitionStep};

pub struct Screen {
    config: EngineConfig,
    levels: LevelManager,
    scorebar: Scorebar,
    collisions: CollisionObservable,
    strategy: StepStrategy,
    running: bool,
    tick_count: u64,
    lives_seeded: bool,
}

impl Screen {
    /// Loads `levels` and begins a new game. The screen starts paused.
    pub fn new(config: EngineConfig, levels: Vec<Level>) -> EngineResult<Self> {
        config.validate()?;
        if levels.is_empty() {
            return Err(EngineError::NoLevels);
        }
        let mut manager = LevelManager::new();
        manager.load_all_saved_levels(levels);
        manager.set_level_select_mode(config.level_select);

        let mut screen = Self {
            scorebar: Scorebar::new(config.starting_lives),
            config,
            levels: manager,
            collisions: CollisionObservable::new(),
            strategy: StepStrategy::LevelSelect,
            running: false,
            tick_count: 0,
            lives_seeded: false,
        };
        screen.begin_game()?;
        Ok(screen)
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Withholds further ticks. No tick state needs saving.
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> GameState {
        self.strategy.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorebar(&self) -> &Scorebar {
        &self.scorebar
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn current_level(&self) -> EngineResult<&Level> {
        self.levels.current_level()
    }

    /// Collisions found during the last level tick.
    pub fn collisions(&self) -> &[Collision] {
        self.collisions.collisions()
    }

    /// Ticks advanced since the screen was created. Paused calls do not count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Ticks played on the current level screen, counting the first. Zero
    /// outside of play.
    pub fn level_ticks(&self) -> u64 {
        match &self.strategy {
            StepStrategy::Level(step) => step.ticks,
            _ => 0,
        }
    }

    /// Advances one tick. A paused screen ignores the call.
    ///
    /// Guard violations are logged and the tick carries on. Any other error
    /// halts the screen and is returned.
    pub fn step(&mut self, input: &InputSnapshot) -> EngineResult<()> {
        if !self.running {
            return Ok(());
        }
        self.tick_count += 1;
        let result = match &mut self.strategy {
            StepStrategy::LevelSelect | StepStrategy::Halted(_) => Ok(()),
            StepStrategy::Level(step) => {
                let level = step.level;
                let first_tick = step.begin_tick();
                self.level_tick(level, first_tick, input)
            }
            StepStrategy::Transition(step) => {
                if step.advance(self.config.transition_frames) {
                    let kind = step.kind;
                    self.leave_transition(kind)
                } else {
                    Ok(())
                }
            }
        };
        result.map_err(|err| self.halt(err))
    }

    /// Starts `level` from the level select screen.
    pub fn select_level(&mut self, level: usize) -> EngineResult<()> {
        if self.strategy != StepStrategy::LevelSelect {
            return Err(EngineError::Validation(format!(
                "cannot select a level while in state '{}'",
                self.state()
            )));
        }
        if !self.levels.level_number_in_game(level) {
            return Err(EngineError::LevelOutOfRange {
                level,
                count: self.levels.level_count(),
            });
        }
        if !self.levels.is_unlocked(level) {
            return Err(EngineError::Validation(format!("level {level} is locked")));
        }
        self.enter_level(level)
    }

    /// Throws away all progress and starts a new game from the snapshots.
    pub fn restart(&mut self) -> EngineResult<()> {
        log::info!("Restarting game");
        self.levels.reset_all();
        self.begin_game()
    }

    pub fn add_entity(&mut self, entity: Entity) -> EngineResult<EntityId> {
        let playing = matches!(self.strategy, StepStrategy::Level(_));
        let id = self.levels.current_level_mut()?.add_entity(entity);
        if playing {
            self.collisions.attach(id);
        }
        Ok(id)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> EngineResult<Entity> {
        let removed = self.levels.current_level_mut()?.remove_entity(id)?;
        if self.collisions.is_attached(id) {
            self.collisions.detach(id)?;
        }
        Ok(removed)
    }

    pub fn move_entity(&mut self, id: EntityId, x: f64, y: f64) -> EngineResult<()> {
        self.levels.current_level_mut()?.move_entity(id, x, y)
    }

    pub fn resize_entity(&mut self, id: EntityId, width: f64, height: f64) -> EngineResult<()> {
        self.levels.current_level_mut()?.resize_entity(id, width, height)
    }

    /// Drains the current level's edit journal.
    pub fn take_edits(&mut self) -> EngineResult<Vec<LevelEdit>> {
        Ok(self.levels.current_level_mut()?.take_edits())
    }

    fn begin_game(&mut self) -> EngineResult<()> {
        self.scorebar = Scorebar::new(self.config.starting_lives);
        self.lives_seeded = false;
        self.collisions.detach_all();
        self.levels.clear_unlocked_levels();
        self.levels.add_unlocked_level(1);
        if self.levels.level_select_mode() {
            self.set_strategy(StepStrategy::LevelSelect);
            Ok(())
        } else {
            self.enter_level(1)
        }
    }

    fn enter_level(&mut self, number: usize) -> EngineResult<()> {
        if !self.levels.set_level_number(number) {
            return Err(EngineError::LevelOutOfRange {
                level: number,
                count: self.levels.level_count(),
            });
        }
        self.levels.reset_current_level()?;
        self.collisions.detach_all();

        let level = self.levels.current_level_mut()?;
        if !self.lives_seeded {
            let lives = level.first_lives().unwrap_or(self.config.starting_lives);
            self.scorebar.set_lives(lives);
            self.lives_seeded = true;
        }
        level.sync_lives(self.scorebar.lives())?;
        for entity in level.entities() {
            self.collisions.attach(entity.id());
        }

        self.scorebar.set_level(number);
        self.scorebar.reset_clock();
        self.levels.add_unlocked_level(number);
        self.set_strategy(StepStrategy::Level(LevelStep::new(number)));
        Ok(())
    }

    fn level_tick(&mut self, number: usize, first_tick: bool, input: &InputSnapshot) -> EngineResult<()> {
        let level = self.levels.current_level_mut()?;
        let dt = self.config.motion_dt;
        for entity in level.entities_mut() {
            entity.integrate(dt);
        }
        self.collisions.update_observers(level.entities());

        let view = TickView {
            collisions: self.collisions.collisions(),
            input,
            first_tick,
        };
        let mut pending = None;
        let entities = level.entities_mut();
        for index in 0..entities.len() {
            match dispatch_events(entities, index, &view, &mut self.scorebar, &mut pending) {
                Ok(_) => {}
                Err(err) if err.is_guard_violation() => {
                    log::warn!("Level {number}: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        self.scorebar.tick(self.config.frame_us);

        match pending {
            Some(request) => self.finish_level(number, request),
            None => Ok(()),
        }
    }

    fn finish_level(&mut self, number: usize, request: ScreenRequest) -> EngineResult<()> {
        log::info!(
            "Level {number} finished after {} ticks: {}",
            self.level_ticks(),
            request.label()
        );
        let kind = match request {
            ScreenRequest::EndLevel { game_over: true } => TransitionKind::GameOver,
            ScreenRequest::EndLevel { game_over: false } => TransitionKind::LoseLife { level: number },
            ScreenRequest::NextLevel if self.levels.level_number_in_game(number + 1) => {
                TransitionKind::NextLevel { to: number + 1 }
            }
            ScreenRequest::NextLevel => TransitionKind::WinGame,
        };
        self.collisions.detach_all();
        self.set_strategy(StepStrategy::Transition(TransitionStep::new(kind)));
        if self.config.transition_frames == 0 {
            return self.leave_transition(kind);
        }
        Ok(())
    }

    fn leave_transition(&mut self, kind: TransitionKind) -> EngineResult<()> {
        match kind.next_level() {
            Some(level) => self.enter_level(level),
            None => Ok(()),
        }
    }

    fn set_strategy(&mut self, strategy: StepStrategy) {
        let from = self.strategy.state();
        let to = strategy.state();
        if from != to {
            log::info!("State: {from} -> {to}");
        }
        self.strategy = strategy;
    }

    fn halt(&mut self, err: EngineError) -> EngineError {
        log::error!("Screen halted: {err}");
        self.collisions.detach_all();
        self.set_strategy(StepStrategy::Halted(err.to_string()));
        err
    }
}
