pub mod config;
pub mod error;
pub mod input;
pub mod param;
pub mod scorebar;
pub mod time;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use input::{InputSnapshot, InputState, Key, MouseBtn, MouseClick};
pub use param::{ParamBag, ParamKind, ParamValue, Parameter};
pub use scorebar::Scorebar;
pub use time::TickSource;
