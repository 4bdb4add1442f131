//! Effects fired by a triggered event.
//!
//! An action mutates its owning entity, the scorebar, or asks the game loop
//! for a screen transition. Transition requests are collected during the tick
//! and applied once it has finished, so a level is never torn down while
//! other entities are still being evaluated.

use pge_core::{EngineError, EngineResult, ParamBag, ParamValue, Scorebar};

use crate::entity::Entity;

/// What a finished level screen asks the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRequest {
    EndLevel { game_over: bool },
    NextLevel,
}

impl ScreenRequest {
    pub fn label(self) -> &'static str {
        match self {
            Self::EndLevel { game_over: true } => "game over",
            Self::EndLevel { game_over: false } => "lose life",
            Self::NextLevel => "next level",
        }
    }
}

/// Global state an action may touch besides its own entity.
pub struct ActionContext<'a> {
    pub scorebar: &'a mut Scorebar,
    pending: &'a mut Option<ScreenRequest>,
}

impl<'a> ActionContext<'a> {
    pub fn new(scorebar: &'a mut Scorebar, pending: &'a mut Option<ScreenRequest>) -> Self {
        Self { scorebar, pending }
    }

    /// A screen is finished as soon as one transition has been requested.
    pub fn screen_finished(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, request: ScreenRequest) -> EngineResult<()> {
        if let Some(existing) = self.pending {
            return Err(EngineError::ScreenAlreadyFinished {
                request: format!("{} (already {})", request.label(), existing.label()),
            });
        }
        *self.pending = Some(request);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Jump,
    SetXSpeed,
    SetXAcceleration,
    SetYAcceleration,
    ZeroLeftSpeed,
    StopRightSpeed,
    ZeroDownSpeed,
    ZeroUpSpeed,
    ShiftHorizontal,
    ShiftVertical,
    Rotate,
    Disappear,
    AddPoints,
    DecrementLives,
    Die,
    NextLevel,
}

impl ActionKind {
    pub const ALL: &'static [ActionKind] = &[
        ActionKind::Jump,
        ActionKind::SetXSpeed,
        ActionKind::SetXAcceleration,
        ActionKind::SetYAcceleration,
        ActionKind::ZeroLeftSpeed,
        ActionKind::StopRightSpeed,
        ActionKind::ZeroDownSpeed,
        ActionKind::ZeroUpSpeed,
        ActionKind::ShiftHorizontal,
        ActionKind::ShiftVertical,
        ActionKind::Rotate,
        ActionKind::Disappear,
        ActionKind::AddPoints,
        ActionKind::DecrementLives,
        ActionKind::Die,
        ActionKind::NextLevel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Jump => "Jump",
            Self::SetXSpeed => "SetXSpeed",
            Self::SetXAcceleration => "SetXAcceleration",
            Self::SetYAcceleration => "SetYAcceleration",
            Self::ZeroLeftSpeed => "ZeroLeftSpeed",
            Self::StopRightSpeed => "StopRightSpeed",
            Self::ZeroDownSpeed => "ZeroDownSpeed",
            Self::ZeroUpSpeed => "ZeroUpSpeed",
            Self::ShiftHorizontal => "ShiftHorizontal",
            Self::ShiftVertical => "ShiftVertical",
            Self::Rotate => "Rotate",
            Self::Disappear => "Disappear",
            Self::AddPoints => "AddPoints",
            Self::DecrementLives => "DecrementLives",
            Self::Die => "Die",
            Self::NextLevel => "NextLevel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    fn schema(self) -> Vec<(&'static str, ParamValue)> {
        match self {
            Self::Jump => vec![("Initial Jump Speed", ParamValue::Real(0.0))],
            Self::SetXSpeed => vec![("X Speed", ParamValue::Real(0.0))],
            Self::SetXAcceleration => vec![("X Acceleration", ParamValue::Real(0.0))],
            Self::SetYAcceleration => vec![("Y Acceleration", ParamValue::Real(0.0))],
            Self::ShiftHorizontal | Self::ShiftVertical => {
                vec![("Move Amount", ParamValue::Real(0.0))]
            }
            Self::Rotate => vec![("Rotate Amount", ParamValue::Real(0.0))],
            Self::AddPoints => vec![("Points", ParamValue::Int(0))],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    kind: ActionKind,
    params: ParamBag,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            params: ParamBag::with_schema(kind.name(), kind.schema()),
        }
    }

    /// Builder form of `set_param` for code-authored actions.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<Self> {
        self.set_param(name, value)?;
        Ok(self)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<()> {
        self.params.set(name, value)
    }

    pub fn act(&self, entity: &mut Entity, ctx: &mut ActionContext<'_>) -> EngineResult<()> {
        match self.kind {
            ActionKind::Jump => {
                entity.velocity.y = -self.params.real("Initial Jump Speed")?;
            }
            ActionKind::SetXSpeed => {
                entity.velocity.x = self.params.real("X Speed")?;
            }
            ActionKind::SetXAcceleration => {
                entity.acceleration.x = self.params.real("X Acceleration")?;
            }
            ActionKind::SetYAcceleration => {
                entity.acceleration.y = self.params.real("Y Acceleration")?;
            }
            ActionKind::ZeroLeftSpeed => {
                if entity.velocity.x < 0.0 {
                    entity.velocity.x = 0.0;
                }
            }
            ActionKind::StopRightSpeed => {
                if entity.velocity.x > 0.0 {
                    entity.velocity.x = 0.0;
                }
            }
            ActionKind::ZeroDownSpeed => {
                if entity.velocity.y > 0.0 {
                    entity.velocity.y = 0.0;
                }
            }
            ActionKind::ZeroUpSpeed => {
                if entity.velocity.y < 0.0 {
                    entity.velocity.y = 0.0;
                }
            }
            ActionKind::ShiftHorizontal => {
                entity.position.x += self.params.real("Move Amount")?;
            }
            ActionKind::ShiftVertical => {
                entity.position.y += self.params.real("Move Amount")?;
            }
            ActionKind::Rotate => {
                entity.rotation += self.params.real("Rotate Amount")?;
            }
            ActionKind::Disappear => {
                entity.visible = false;
            }
            ActionKind::AddPoints => {
                ctx.scorebar.add_score(self.params.int("Points")?);
            }
            ActionKind::DecrementLives => {
                let lives = ctx.scorebar.lives();
                ctx.scorebar.set_lives(lives - 1);
            }
            ActionKind::Die => die(entity, ctx)?,
            ActionKind::NextLevel => {
                if ctx.screen_finished() {
                    return Err(EngineError::ScreenAlreadyFinished {
                        request: ScreenRequest::NextLevel.label().to_string(),
                    });
                }
                ctx.request(ScreenRequest::NextLevel)?;
            }
        }
        Ok(())
    }
}

/// Lives come off the scorebar, which earlier `DecrementLives` actions in the
/// same tick have already charged. The entity only mirrors the result.
fn die(entity: &mut Entity, ctx: &mut ActionContext<'_>) -> EngineResult<()> {
    if entity.lives().is_none() {
        return Err(EngineError::NotLifeBearing {
            entity: entity.label(),
        });
    }
    let remaining = ctx.scorebar.lives() - 1;
    entity.set_lives(remaining)?;
    ctx.scorebar.set_lives(remaining);
    log::info!("{} died, {} lives left", entity.label(), remaining);
    ctx.request(ScreenRequest::EndLevel {
        game_over: remaining <= 0,
    })
}
