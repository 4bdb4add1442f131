//! JSON game files.
//!
//! A game file lists levels; each level lists entities with their parameters,
//! events and actions by variant name. Parameter values are tagged
//! (`{"Int": 3}`, `{"Real": 3.0}`) so the kind survives a round trip.
//! Loading goes through the `Registry` and the typed setters, so an unknown
//! variant, an unknown parameter or a wrongly typed value fails the load.

use std::fs;
use std::path::Path;

use glam::DVec2;
use pge_core::{EngineConfig, EngineError, EngineResult, ParamBag, ParamValue};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::entity::{Entity, EntityKind};
use crate::event::Event;
use crate::level::Level;
use crate::registry::Registry;

pub const GAME_FILE_VERSION: &str = "0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameFile {
    pub version: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
    pub levels: Vec<LevelFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<EntityFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<EntityFile>,
    #[serde(default)]
    pub entities: Vec<EntityFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFile {
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub x_speed: f64,
    #[serde(default)]
    pub y_speed: f64,
    #[serde(default)]
    pub x_acceleration: f64,
    #[serde(default)]
    pub y_acceleration: f64,
    #[serde(default)]
    pub z: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    #[serde(default)]
    pub events: Vec<EventFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFile {
    pub kind: String,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    #[serde(default)]
    pub actions: Vec<ActionFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFile {
    pub kind: String,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamEntry {
    pub name: String,
    pub value: ParamValue,
}

/// A loaded game, ready to hand to `Screen::new`.
#[derive(Debug, Clone)]
pub struct Game {
    pub title: String,
    pub config: EngineConfig,
    pub levels: Vec<Level>,
}

pub fn load_game_from_path(path: &Path) -> EngineResult<Game> {
    let raw = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let game = load_game_from_str(&raw)?;
    log::info!(
        "Loaded game '{}' from {} ({} levels)",
        game.title,
        path.display(),
        game.levels.len()
    );
    Ok(game)
}

pub fn load_game_from_str(raw: &str) -> EngineResult<Game> {
    let file: GameFile = serde_json::from_str(raw)?;
    file.into_game(&Registry::with_builtins())
}

pub fn save_game_to_path(game: &Game, path: &Path) -> EngineResult<()> {
    let body = game_to_string(game)?;
    fs::write(path, body).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved game '{}' to {}", game.title, path.display());
    Ok(())
}

pub fn game_to_string(game: &Game) -> EngineResult<String> {
    Ok(serde_json::to_string_pretty(&GameFile::from_game(game))?)
}

impl GameFile {
    pub fn from_game(game: &Game) -> Self {
        Self {
            version: GAME_FILE_VERSION.to_string(),
            title: game.title.clone(),
            config: Some(game.config.clone()),
            levels: game.levels.iter().map(LevelFile::from_level).collect(),
        }
    }

    /// Validates the file and builds every level through `registry`.
    pub fn into_game(self, registry: &Registry) -> EngineResult<Game> {
        self.validate()?;
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let levels = self
            .levels
            .iter()
            .map(|level| level.to_level(registry))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Game {
            title: self.title,
            config,
            levels,
        })
    }

    fn validate(&self) -> EngineResult<()> {
        if self.version != GAME_FILE_VERSION {
            return Err(EngineError::Validation(format!(
                "unsupported game file version '{}' (expected '{GAME_FILE_VERSION}')",
                self.version
            )));
        }
        if self.levels.is_empty() {
            return Err(EngineError::Validation("levels array is empty".to_string()));
        }
        for level in &self.levels {
            if level.entities.is_empty() {
                log::warn!("Level '{}' has no entities. This is allowed but often accidental.", level.name);
            }
            for entity in level
                .entities
                .iter()
                .chain(level.camera.iter())
                .chain(level.background.iter())
            {
                if entity.width < 0.0 || entity.height < 0.0 {
                    return Err(EngineError::Validation(format!(
                        "entity '{}' in level '{}' has a negative size",
                        entity.name, level.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl LevelFile {
    pub fn from_level(level: &Level) -> Self {
        Self {
            name: level.name.clone(),
            camera: Some(EntityFile::from_entity(level.camera())),
            background: Some(EntityFile::from_entity(level.background())),
            entities: level.entities().iter().map(EntityFile::from_entity).collect(),
        }
    }

    fn to_level(&self, registry: &Registry) -> EngineResult<Level> {
        let mut level = Level::new(&self.name);
        if let Some(camera) = &self.camera {
            level.set_camera(camera.to_entity(registry)?);
        }
        if let Some(background) = &self.background {
            level.set_background(background.to_entity(registry)?);
        }
        for entity in &self.entities {
            let entity = entity.to_entity(registry)?;
            if matches!(entity.kind(), EntityKind::Camera | EntityKind::Background) {
                log::warn!(
                    "Level '{}': {} listed among playable entities",
                    self.name,
                    entity.label()
                );
            }
            level.add_entity(entity);
        }
        level.take_edits();
        Ok(level)
    }
}

impl EntityFile {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            kind: entity.kind().name().to_string(),
            name: entity.name.clone(),
            image_path: entity.image_path.clone(),
            x: entity.position.x,
            y: entity.position.y,
            width: entity.size.x,
            height: entity.size.y,
            x_speed: entity.velocity.x,
            y_speed: entity.velocity.y,
            x_acceleration: entity.acceleration.x,
            y_acceleration: entity.acceleration.y,
            z: entity.z,
            visible: entity.visible,
            rotation: entity.rotation,
            params: entries(entity.params()),
            events: entity.events().iter().map(EventFile::from_event).collect(),
        }
    }

    fn to_entity(&self, registry: &Registry) -> EngineResult<Entity> {
        let mut entity = registry.create_entity(&self.kind)?;
        entity.name = self.name.clone();
        entity.image_path = self.image_path.clone();
        entity.position = DVec2::new(self.x, self.y);
        entity.size = DVec2::new(self.width, self.height);
        entity.velocity = DVec2::new(self.x_speed, self.y_speed);
        entity.acceleration = DVec2::new(self.x_acceleration, self.y_acceleration);
        entity.z = self.z;
        entity.visible = self.visible;
        entity.rotation = self.rotation;
        for p in &self.params {
            entity.set_param(&p.name, p.value.clone())?;
        }
        for event in &self.events {
            entity.add_event(event.to_event(registry)?);
        }
        Ok(entity)
    }
}

impl EventFile {
    pub fn from_event(event: &Event) -> Self {
        Self {
            kind: event.kind().name().to_string(),
            params: entries(event.params()),
            actions: event.actions().iter().map(ActionFile::from_action).collect(),
        }
    }

    fn to_event(&self, registry: &Registry) -> EngineResult<Event> {
        let mut event = registry.create_event(&self.kind)?;
        for p in &self.params {
            event.set_param(&p.name, p.value.clone())?;
        }
        for action in &self.actions {
            event.add_action(action.to_action(registry)?);
        }
        Ok(event)
    }
}

impl ActionFile {
    pub fn from_action(action: &Action) -> Self {
        Self {
            kind: action.kind().name().to_string(),
            params: entries(action.params()),
        }
    }

    fn to_action(&self, registry: &Registry) -> EngineResult<Action> {
        let mut action = registry.create_action(&self.kind)?;
        for p in &self.params {
            action.set_param(&p.name, p.value.clone())?;
        }
        Ok(action)
    }
}

fn entries(bag: &ParamBag) -> Vec<ParamEntry> {
    bag.iter()
        .map(|p| ParamEntry {
            name: p.name().to_string(),
            value: p.value().clone(),
        })
        .collect()
}

const fn default_visible() -> bool {
    true
}
