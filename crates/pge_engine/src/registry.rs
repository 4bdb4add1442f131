//! Name-to-constructor tables for entities, events and actions.
//!
//! Game files and editors refer to variants by name. The built-in variants are
//! registered by `with_builtins`; callers may add presets under new names.

use std::collections::BTreeMap;

use pge_core::{EngineError, EngineResult};

use crate::action::{Action, ActionKind};
use crate::collision::CollisionSide;
use crate::entity::{Entity, EntityKind};
use crate::event::{Event, EventKind};

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

pub struct Registry {
    entities: BTreeMap<String, Factory<Entity>>,
    events: BTreeMap<String, Factory<Event>>,
    actions: BTreeMap<String, Factory<Action>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            events: BTreeMap::new(),
            actions: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for &kind in EntityKind::ALL {
            registry.register_entity(kind.name(), move || Entity::new(kind));
        }
        for &kind in EventKind::ALL {
            registry.register_event(kind.name(), move || Event::new(kind));
        }
        for &kind in ActionKind::ALL {
            registry.register_action(kind.name(), move || Action::new(kind));
        }
        for side in [
            CollisionSide::Bottom,
            CollisionSide::Top,
            CollisionSide::Left,
            CollisionSide::Right,
        ] {
            let name = format!("{}Collision", side.label());
            registry.register_event(&name, move || collision_on(side));
        }
        registry
    }

    /// Registering an existing name replaces its constructor.
    pub fn register_entity(&mut self, name: &str, factory: impl Fn() -> Entity + Send + Sync + 'static) {
        if self.entities.insert(name.to_string(), Box::new(factory)).is_some() {
            log::debug!("Replaced entity factory '{name}'");
        }
    }

    pub fn register_event(&mut self, name: &str, factory: impl Fn() -> Event + Send + Sync + 'static) {
        if self.events.insert(name.to_string(), Box::new(factory)).is_some() {
            log::debug!("Replaced event factory '{name}'");
        }
    }

    pub fn register_action(&mut self, name: &str, factory: impl Fn() -> Action + Send + Sync + 'static) {
        if self.actions.insert(name.to_string(), Box::new(factory)).is_some() {
            log::debug!("Replaced action factory '{name}'");
        }
    }

    pub fn create_entity(&self, name: &str) -> EngineResult<Entity> {
        create(&self.entities, "entity", name)
    }

    pub fn create_event(&self, name: &str) -> EngineResult<Event> {
        create(&self.events, "event", name)
    }

    pub fn create_action(&self, name: &str) -> EngineResult<Action> {
        create(&self.actions, "action", name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

fn create<T>(table: &BTreeMap<String, Factory<T>>, role: &'static str, name: &str) -> EngineResult<T> {
    table
        .get(name)
        .map(|factory| factory())
        .ok_or_else(|| EngineError::UnknownVariant {
            role,
            name: name.to_string(),
        })
}

fn collision_on(side: CollisionSide) -> Event {
    let mut event = Event::new(EventKind::Collision);
    if let Err(err) = event.set_param("Side", side.label()) {
        log::error!("Collision preset for {} rejected: {err}", side.label());
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_every_variant() {
        let registry = Registry::with_builtins();
        for &kind in EntityKind::ALL {
            assert_eq!(registry.create_entity(kind.name()).expect("entity").kind(), kind);
        }
        for &kind in EventKind::ALL {
            assert_eq!(registry.create_event(kind.name()).expect("event").kind(), kind);
        }
        for &kind in ActionKind::ALL {
            assert_eq!(registry.create_action(kind.name()).expect("action").kind(), kind);
        }
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        let registry = Registry::with_builtins();
        let err = registry.create_event("Teleport").expect_err("unknown");
        assert!(err.is_configuration());
        assert!(matches!(err, EngineError::UnknownVariant { role: "event", .. }));
        assert!(Registry::new().create_entity("Character").is_err());
    }

    #[test]
    fn side_presets_are_collision_events() {
        let registry = Registry::with_builtins();
        let event = registry.create_event("BottomCollision").expect("preset");
        assert_eq!(event.kind(), EventKind::Collision);
        assert_eq!(event.params().text("Side").expect("side"), "Bottom");
    }

    #[test]
    fn custom_factories_can_be_registered() {
        let mut registry = Registry::with_builtins();
        registry.register_entity("Coin", || Entity::new(EntityKind::Goal).named("coin").sized(8.0, 8.0));
        let coin = registry.create_entity("Coin").expect("coin");
        assert_eq!(coin.name, "coin");
        assert!(registry.entity_names().any(|n| n == "Coin"));
    }
}
