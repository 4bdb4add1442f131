//! Simulated game objects.
//!
//! An entity owns its kinematic state, a fixed parameter schema chosen by its
//! kind, and the events attached to it. Events and their actions hold no
//! pointer back to the entity: the game loop hands the owner to them when it
//! evaluates or fires them, so cloning an entity needs no re-parenting.

use glam::DVec2;
use pge_core::{EngineError, EngineResult, ParamBag, ParamValue};
use uuid::Uuid;

use crate::event::Event;

pub const LIVES: &str = "Lives";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Character,
    Enemy,
    Block,
    Goal,
    Background,
    Camera,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Character,
        EntityKind::Enemy,
        EntityKind::Block,
        EntityKind::Goal,
        EntityKind::Background,
        EntityKind::Camera,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Enemy => "Enemy",
            Self::Block => "Block",
            Self::Goal => "Goal",
            Self::Background => "Background",
            Self::Camera => "Camera",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Only life-bearing entities can die.
    pub fn is_life_bearing(self) -> bool {
        matches!(self, Self::Character)
    }

    fn schema(self) -> Vec<(&'static str, ParamValue)> {
        match self {
            Self::Character => vec![(LIVES, ParamValue::Int(5))],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    pub name: String,
    pub image_path: String,
    /// Top-left corner, y grows downward.
    pub position: DVec2,
    pub size: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    /// Draw order and collision layer.
    pub z: i32,
    pub visible: bool,
    pub rotation: f64,
    params: ParamBag,
    events: Vec<Event>,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            name: String::new(),
            image_path: String::new(),
            position: DVec2::ZERO,
            size: DVec2::ZERO,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            z: 0,
            visible: true,
            rotation: 0.0,
            params: ParamBag::with_schema(kind.name(), kind.schema()),
            events: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = DVec2::new(x, y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = DVec2::new(width, height);
        self
    }

    pub fn on_layer(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    pub fn param(&self, name: &str) -> EngineResult<&ParamValue> {
        self.params.get(name)
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<()> {
        self.params.set(name, value)
    }

    /// `None` for entities that do not carry lives.
    pub fn lives(&self) -> Option<i64> {
        if !self.kind.is_life_bearing() {
            return None;
        }
        self.params.int(LIVES).ok()
    }

    pub fn set_lives(&mut self, lives: i64) -> EngineResult<()> {
        if !self.kind.is_life_bearing() {
            return Err(EngineError::NotLifeBearing {
                entity: self.label(),
            });
        }
        self.params.set(LIVES, lives)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn remove_event(&mut self, index: usize) -> Option<Event> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn restore_events(&mut self, events: Vec<Event>) {
        debug_assert!(self.events.is_empty());
        self.events = events;
    }

    /// Explicit Euler step: position moves with the old speed, then speed
    /// picks up the acceleration.
    pub fn integrate(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.velocity += self.acceleration * dt;
    }

    pub fn min(&self) -> DVec2 {
        self.position
    }

    pub fn max(&self) -> DVec2 {
        self.position + self.size
    }

    pub fn center(&self) -> DVec2 {
        self.position + self.size * 0.5
    }

    /// Strictly inside the box, edges excluded.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (min, max) = (self.min(), self.max());
        x > min.x && x < max.x && y > min.y && y < max.y
    }

    /// Name if authored, kind otherwise. Used in logs and errors.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("<{}>", self.kind.name())
        } else {
            self.name.clone()
        }
    }
}

/// Copies every piece of state, including the whole event/action tree, but
/// never the identity.
impl Clone for Entity {
    fn clone(&self) -> Self {
        Self {
            id: EntityId::new(),
            kind: self.kind,
            name: self.name.clone(),
            image_path: self.image_path.clone(),
            position: self.position,
            size: self.size,
            velocity: self.velocity,
            acceleration: self.acceleration,
            z: self.z,
            visible: self.visible,
            rotation: self.rotation,
            params: self.params.clone(),
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionKind};
    use crate::event::{Event, EventKind};

    #[test]
    fn constant_acceleration_integrates_euler_speeds() {
        let mut entity = Entity::new(EntityKind::Block);
        entity.acceleration = DVec2::new(1.0, 0.0);

        let mut speeds = Vec::new();
        let mut xs = Vec::new();
        for _ in 0..3 {
            entity.integrate(1.0);
            speeds.push(entity.velocity.x);
            xs.push(entity.position.x);
        }
        assert_eq!(speeds, vec![1.0, 2.0, 3.0]);
        assert_eq!(xs, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn speed_after_k_ticks_matches_acceleration_times_time() {
        let mut entity = Entity::new(EntityKind::Enemy);
        entity.acceleration = DVec2::new(0.0, 2.5);
        let dt = 0.25;
        for _ in 0..40 {
            entity.integrate(dt);
        }
        assert!((entity.velocity.y - 2.5 * dt * 40.0).abs() < 1e-9);
    }

    #[test]
    fn clone_gets_new_identity_and_independent_state() {
        let mut original = Entity::new(EntityKind::Character)
            .named("mario")
            .at(10.0, 20.0)
            .sized(16.0, 32.0);
        original.add_event(Event::new(EventKind::EveryStep).with_action(Action::new(ActionKind::Jump)));

        let mut copy = original.clone();
        let mut second = original.clone();
        assert_ne!(copy.id(), original.id());
        assert_ne!(copy.id(), second.id());

        copy.position.x = 99.0;
        copy.set_lives(1).expect("lives");
        copy.events_mut()[0]
            .actions_mut()[0]
            .set_param("Initial Jump Speed", 12.0)
            .expect("set jump");

        assert_eq!(original.position.x, 10.0);
        assert_eq!(original.lives(), Some(5));
        assert_eq!(second.lives(), Some(5));
        let jump = original.events()[0].actions()[0]
            .params()
            .real("Initial Jump Speed")
            .expect("jump speed");
        assert_eq!(jump, 0.0);

        second.name.push_str("_2");
        assert_eq!(original.name, "mario");
    }

    #[test]
    fn only_characters_carry_lives() {
        let mut block = Entity::new(EntityKind::Block);
        assert_eq!(block.lives(), None);
        let err = block.set_lives(3).expect_err("blocks have no lives");
        assert!(err.is_guard_violation());

        let mut hero = Entity::new(EntityKind::Character);
        hero.set_lives(2).expect("set lives");
        assert_eq!(hero.lives(), Some(2));
    }

    #[test]
    fn contains_point_excludes_edges() {
        let entity = Entity::new(EntityKind::Goal).at(0.0, 0.0).sized(10.0, 10.0);
        assert!(entity.contains_point(5.0, 5.0));
        assert!(!entity.contains_point(0.0, 5.0));
        assert!(!entity.contains_point(10.0, 10.0));
        assert_eq!(entity.center(), DVec2::new(5.0, 5.0));
    }

    #[test]
    fn kind_names_round_trip() {
        for &kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EntityKind::from_name("Dragon"), None);
    }
}
