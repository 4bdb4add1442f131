//! A single level: the playable entities plus a camera and a background.
//!
//! Camera and background are entities too, but they never join collision or
//! event evaluation. Structural edits go through the methods here so each one
//! lands in the edit journal as a single atomic step.

use glam::DVec2;
use pge_core::{EngineError, EngineResult};

use crate::entity::{Entity, EntityId, EntityKind};

/// One externally observable change to a level's entity set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelEdit {
    Added(EntityId),
    Removed(EntityId),
    Moved { id: EntityId, to: DVec2 },
    Resized { id: EntityId, to: DVec2 },
}

#[derive(Debug)]
pub struct Level {
    pub name: String,
    entities: Vec<Entity>,
    camera: Entity,
    background: Entity,
    edits: Vec<LevelEdit>,
}

impl Level {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: Vec::new(),
            camera: Entity::new(EntityKind::Camera).named("camera"),
            background: Entity::new(EntityKind::Background).named("background"),
            edits: Vec::new(),
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to entity state. The set itself only changes through
    /// `add_entity`/`remove_entity`.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// First entity with this name, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        log::debug!("Level '{}': added {}", self.name, entity.label());
        self.entities.push(entity);
        self.edits.push(LevelEdit::Added(id));
        id
    }

    pub fn add_entities(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.add_entity(entity);
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) -> EngineResult<Entity> {
        let index = self.index_of(id)?;
        let removed = self.entities.remove(index);
        log::debug!("Level '{}': removed {}", self.name, removed.label());
        self.edits.push(LevelEdit::Removed(id));
        Ok(removed)
    }

    pub fn move_entity(&mut self, id: EntityId, x: f64, y: f64) -> EngineResult<()> {
        let index = self.index_of(id)?;
        let to = DVec2::new(x, y);
        self.entities[index].position = to;
        self.edits.push(LevelEdit::Moved { id, to });
        Ok(())
    }

    pub fn resize_entity(&mut self, id: EntityId, width: f64, height: f64) -> EngineResult<()> {
        if width < 0.0 || height < 0.0 {
            return Err(EngineError::Validation(format!(
                "entity size must be non-negative, got {width}x{height}"
            )));
        }
        let index = self.index_of(id)?;
        let to = DVec2::new(width, height);
        self.entities[index].size = to;
        self.edits.push(LevelEdit::Resized { id, to });
        Ok(())
    }

    pub fn camera(&self) -> &Entity {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Entity) {
        self.camera = camera;
    }

    pub fn background(&self) -> &Entity {
        &self.background
    }

    pub fn set_background(&mut self, background: Entity) {
        self.background = background;
    }

    /// Drains the edit journal.
    pub fn take_edits(&mut self) -> Vec<LevelEdit> {
        std::mem::take(&mut self.edits)
    }

    /// Lives of the first life-bearing entity, if any.
    pub fn first_lives(&self) -> Option<i64> {
        self.entities.iter().find_map(Entity::lives)
    }

    /// Overwrites `Lives` on every life-bearing entity.
    pub fn sync_lives(&mut self, lives: i64) -> EngineResult<()> {
        for entity in self.entities.iter_mut().filter(|e| e.kind().is_life_bearing()) {
            entity.set_lives(lives)?;
        }
        Ok(())
    }

    fn index_of(&self, id: EntityId) -> EngineResult<usize> {
        self.entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| EngineError::EntityNotFound {
                entity: id.to_string(),
            })
    }
}

/// Deep copy with fresh entity identities and an empty journal.
impl Clone for Level {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entities: self.entities.clone(),
            camera: self.camera.clone(),
            background: self.background.clone(),
            edits: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Level {
        let mut level = Level::new("1-1");
        level.add_entity(Entity::new(EntityKind::Character).named("hero").sized(16.0, 16.0));
        level.add_entity(Entity::new(EntityKind::Block).named("floor").at(0.0, 100.0));
        level
    }

    #[test]
    fn edits_are_journaled_in_order() {
        let mut level = sample();
        let hero = level.find_by_name("hero").expect("hero").id();
        level.take_edits();

        level.move_entity(hero, 5.0, 6.0).expect("move");
        level.resize_entity(hero, 8.0, 8.0).expect("resize");
        level.remove_entity(hero).expect("remove");

        let edits = level.take_edits();
        assert_eq!(
            edits,
            vec![
                LevelEdit::Moved {
                    id: hero,
                    to: DVec2::new(5.0, 6.0)
                },
                LevelEdit::Resized {
                    id: hero,
                    to: DVec2::new(8.0, 8.0)
                },
                LevelEdit::Removed(hero),
            ]
        );
        assert!(level.take_edits().is_empty());
        assert_eq!(level.entities().len(), 1);
    }

    #[test]
    fn unknown_entity_edits_fail_without_journal_entry() {
        let mut level = sample();
        level.take_edits();
        let stray = Entity::new(EntityKind::Block);
        let err = level.move_entity(stray.id(), 1.0, 1.0).expect_err("not in level");
        assert!(matches!(err, EngineError::EntityNotFound { .. }));
        assert!(level.resize_entity(stray.id(), -1.0, 1.0).is_err());
        assert!(level.take_edits().is_empty());
    }

    #[test]
    fn clone_is_independent_with_new_ids() {
        let original = sample();
        let mut copy = original.clone();
        assert!(copy.take_edits().is_empty());

        copy.entities_mut()[0].position = DVec2::new(50.0, 50.0);
        assert_eq!(original.entities()[0].position, DVec2::ZERO);
        assert_ne!(copy.entities()[0].id(), original.entities()[0].id());
        assert_eq!(copy.entities()[0].name, "hero");
    }

    #[test]
    fn sync_lives_touches_only_life_bearing_entities() {
        let mut level = sample();
        assert_eq!(level.first_lives(), Some(5));
        level.sync_lives(2).expect("sync");
        assert_eq!(level.find_by_name("hero").and_then(Entity::lives), Some(2));
        assert_eq!(level.find_by_name("floor").and_then(Entity::lives), None);
    }
}
