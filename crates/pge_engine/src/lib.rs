pub mod action;
pub mod collision;
pub mod entity;
pub mod event;
pub mod level;
pub mod level_file;
pub mod level_manager;
pub mod registry;
pub mod screen;
pub mod step;

pub use action::{Action, ActionContext, ActionKind, ScreenRequest};
pub use collision::{Collision, CollisionObservable, CollisionSide, SideFilter};
pub use entity::{Entity, EntityId, EntityKind};
pub use event::{Event, EventContext, EventKind, Siblings, TickView};
pub use level::{Level, LevelEdit};
pub use level_file::{load_game_from_path, load_game_from_str, save_game_to_path, Game, GameFile};
pub use level_manager::LevelManager;
pub use registry::Registry;
pub use screen::Screen;
pub use step::GameState;
