//! Error taxonomy shared by every engine crate.
//!
//! Three families matter to callers:
//!  - **Configuration** errors (unknown parameter, wrong value kind, unknown
//!    variant name) are rejected at the call site and never coerced.
//!  - **Guard violations** are authoring mistakes caught during a tick. The
//!    screen logs them and keeps simulating.
//!  - **Level/transition** errors leave the game loop with no sane data to
//!    continue on, so the screen halts.

use std::path::PathBuf;

use crate::param::ParamKind;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("parameter '{name}' not found on {owner}")]
    ParameterNotFound { owner: String, name: String },

    #[error("parameter '{name}' already registered")]
    DuplicateParameter { name: String },

    #[error("parameter '{name}' expects {expected} but got {found}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },

    #[error("parameter '{name}' rejects value '{value}': {reason}")]
    InvalidParameterValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("unknown {role} variant '{name}'")]
    UnknownVariant { role: &'static str, name: String },

    #[error("entity '{entity}' cannot lose a life (not a life-bearing entity)")]
    NotLifeBearing { entity: String },

    #[error("screen already finished this tick, ignoring {request}")]
    ScreenAlreadyFinished { request: String },

    #[error("game has no levels")]
    NoLevels,

    #[error("level {level} out of range (game has {count} levels)")]
    LevelOutOfRange { level: usize, count: usize },

    #[error("level {level} has no initial snapshot")]
    MissingSnapshot { level: usize },

    #[error("entity {entity} is not attached to the collision observer")]
    EntityNotAttached { entity: String },

    #[error("entity {entity} not found in level")]
    EntityNotFound { entity: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl EngineError {
    /// Guard violations are logged by the game loop and the tick carries on.
    pub fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            Self::NotLifeBearing { .. } | Self::ScreenAlreadyFinished { .. }
        )
    }

    /// Configuration errors come from authoring input and are reported back
    /// to whoever tried to apply it.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ParameterNotFound { .. }
                | Self::DuplicateParameter { .. }
                | Self::TypeMismatch { .. }
                | Self::InvalidParameterValue { .. }
                | Self::UnknownVariant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_violations_are_classified() {
        let err = EngineError::NotLifeBearing {
            entity: "brick".to_string(),
        };
        assert!(err.is_guard_violation());
        assert!(!err.is_configuration());

        let err = EngineError::ScreenAlreadyFinished {
            request: "next level".to_string(),
        };
        assert!(err.is_guard_violation());
    }

    #[test]
    fn level_errors_are_not_guards() {
        assert!(!EngineError::NoLevels.is_guard_violation());
        assert!(!EngineError::MissingSnapshot { level: 2 }.is_guard_violation());
        assert!(!EngineError::LevelOutOfRange { level: 4, count: 3 }.is_configuration());
    }

    #[test]
    fn type_mismatch_message_names_both_kinds() {
        let err = EngineError::TypeMismatch {
            name: "Lives".to_string(),
            expected: ParamKind::Int,
            found: ParamKind::Text,
        };
        let msg = err.to_string();
        assert!(msg.contains("Lives"));
        assert!(msg.contains("int"));
        assert!(msg.contains("text"));
        assert!(err.is_configuration());
    }
}
