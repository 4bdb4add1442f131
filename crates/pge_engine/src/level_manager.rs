//! Ordered levels with their initial-state snapshots.
//!
//! Level numbers are one-indexed everywhere in this API. Every live level has
//! a snapshot taken when it was loaded; resetting clones the snapshot back in,
//! so nothing that happens during play ever reaches the snapshot.

use std::collections::BTreeSet;

use pge_core::{EngineError, EngineResult};

use crate::level::Level;

#[derive(Debug)]
pub struct LevelManager {
    levels: Vec<Level>,
    initial: Vec<Level>,
    current: usize,
    unlocked: BTreeSet<usize>,
    level_select_mode: bool,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelManager {
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            initial: Vec::new(),
            current: 1,
            unlocked: BTreeSet::new(),
            level_select_mode: false,
        }
    }

    /// Appends a level and records its snapshot.
    pub fn add_level(&mut self, level: Level) {
        self.initial.push(level.clone());
        self.levels.push(level);
    }

    /// Replaces every level with `levels`, snapshotting each one. Call once
    /// when a game is loaded.
    pub fn load_all_saved_levels(&mut self, levels: Vec<Level>) {
        self.levels.clear();
        self.initial.clear();
        for level in levels {
            self.add_level(level);
        }
        self.current = 1;
        log::info!("Loaded {} levels", self.levels.len());
    }

    pub fn current_level(&self) -> EngineResult<&Level> {
        let count = self.levels.len();
        self.levels
            .get(self.current.wrapping_sub(1))
            .ok_or_else(|| self.missing(self.current, count))
    }

    pub fn current_level_mut(&mut self) -> EngineResult<&mut Level> {
        let count = self.levels.len();
        let missing = self.missing(self.current, count);
        self.levels.get_mut(self.current.wrapping_sub(1)).ok_or(missing)
    }

    pub fn level(&self, number: usize) -> Option<&Level> {
        self.levels.get(number.wrapping_sub(1))
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Moves the current pointer. Returns false, leaving it untouched, when
    /// `number` is not a level of this game.
    pub fn set_level_number(&mut self, number: usize) -> bool {
        if !self.level_number_in_game(number) {
            return false;
        }
        self.current = number;
        true
    }

    pub fn level_number_in_game(&self, number: usize) -> bool {
        number >= 1 && number <= self.levels.len()
    }

    pub fn level_number(&self) -> usize {
        self.current
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Swaps the live current level for a fresh clone of its snapshot.
    pub fn reset_current_level(&mut self) -> EngineResult<()> {
        let index = self.current.wrapping_sub(1);
        let fresh = self
            .initial
            .get(index)
            .ok_or(EngineError::MissingSnapshot {
                level: self.current,
            })?
            .clone();
        let slot = self
            .levels
            .get_mut(index)
            .ok_or(EngineError::LevelOutOfRange {
                level: self.current,
                count: self.initial.len(),
            })?;
        *slot = fresh;
        log::info!("Reset level {} ('{}')", self.current, slot.name);
        Ok(())
    }

    /// Restores every level from its snapshot and points back at level 1.
    pub fn reset_all(&mut self) {
        self.levels = self.initial.clone();
        self.current = 1;
    }

    pub fn snapshot(&self, number: usize) -> Option<&Level> {
        self.initial.get(number.wrapping_sub(1))
    }

    pub fn add_unlocked_level(&mut self, number: usize) {
        if self.level_number_in_game(number) {
            self.unlocked.insert(number);
        }
    }

    pub fn clear_unlocked_levels(&mut self) {
        self.unlocked.clear();
    }

    /// Ascending.
    pub fn unlocked_level_numbers(&self) -> Vec<usize> {
        self.unlocked.iter().copied().collect()
    }

    pub fn is_unlocked(&self, number: usize) -> bool {
        self.unlocked.contains(&number)
    }

    pub fn level_select_mode(&self) -> bool {
        self.level_select_mode
    }

    pub fn set_level_select_mode(&mut self, enabled: bool) {
        self.level_select_mode = enabled;
    }

    fn missing(&self, level: usize, count: usize) -> EngineError {
        if count == 0 {
            EngineError::NoLevels
        } else {
            EngineError::LevelOutOfRange { level, count }
        }
    }
}
