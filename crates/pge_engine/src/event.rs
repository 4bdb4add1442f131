//! Per-tick predicates with a trigger policy, each owning a list of actions.
//!
//! Evaluation of one entity's events happens in two passes, in insertion
//! order: every predicate is checked first, then the actions of the events that
//! fired run in event order and action order. There is no priority system, so
//! events whose effects interact depend on authoring order.
//!
//! Trigger policy: an event counts an occurrence each tick its predicate holds.
//! It fires when the count is a multiple of `How often to trigger` and does
//! not exceed `How many times to trigger` (or that limit is `Always`).

use pge_core::{EngineError, EngineResult, InputSnapshot, Key, MouseBtn, ParamBag, ParamValue, Scorebar};

use crate::action::{Action, ActionContext, ScreenRequest};
use crate::collision::{Collision, SideFilter};
use crate::entity::Entity;

pub const TRIGGER_EVERY: &str = "How often to trigger";
pub const TRIGGER_LIMIT: &str = "How many times to trigger";
pub const ALWAYS: &str = "Always";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPress,
    Click,
    InsideRegion,
    Collision,
    EntityDistance,
    PointsGreaterThan,
    GameStartup,
    EntityIsVisible,
    MinX,
    MaxY,
    Timer,
    EveryStep,
    FinishAchievement,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        EventKind::KeyPress,
        EventKind::Click,
        EventKind::InsideRegion,
        EventKind::Collision,
        EventKind::EntityDistance,
        EventKind::PointsGreaterThan,
        EventKind::GameStartup,
        EventKind::EntityIsVisible,
        EventKind::MinX,
        EventKind::MaxY,
        EventKind::Timer,
        EventKind::EveryStep,
        EventKind::FinishAchievement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::KeyPress => "KeyPress",
            Self::Click => "Click",
            Self::InsideRegion => "InsideRegion",
            Self::Collision => "Collision",
            Self::EntityDistance => "EntityDistance",
            Self::PointsGreaterThan => "PointsGreaterThan",
            Self::GameStartup => "GameStartup",
            Self::EntityIsVisible => "EntityIsVisible",
            Self::MinX => "MinX",
            Self::MaxY => "MaxY",
            Self::Timer => "Timer",
            Self::EveryStep => "EveryStep",
            Self::FinishAchievement => "FinishAchievement",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    fn schema(self) -> Vec<(&'static str, ParamValue)> {
        let mut schema = vec![
            (TRIGGER_EVERY, ParamValue::Int(1)),
            (TRIGGER_LIMIT, ParamValue::Text(ALWAYS.to_string())),
        ];
        match self {
            Self::KeyPress => {
                schema.push(("Key", ParamValue::Key(Key::Unbound)));
                schema.push(("Only On Press", ParamValue::Bool(false)));
            }
            Self::Click => schema.push(("Button", ParamValue::Text("Left".to_string()))),
            Self::InsideRegion => {
                for name in ["Minimum X", "Maximum X", "Minimum Y", "Maximum Y"] {
                    schema.push((name, ParamValue::Real(0.0)));
                }
            }
            Self::Collision => {
                schema.push(("Entity", ParamValue::Text(String::new())));
                schema.push(("Side", ParamValue::Text(SideFilter::ANY.to_string())));
            }
            Self::EntityDistance => {
                schema.push(("Entity", ParamValue::Text(String::new())));
                schema.push(("Distance", ParamValue::Real(0.0)));
                schema.push(("Less Than", ParamValue::Bool(true)));
            }
            Self::PointsGreaterThan => schema.push(("Amount of Points", ParamValue::Int(0))),
            Self::EntityIsVisible => schema.push(("Entity", ParamValue::Text(String::new()))),
            Self::MinX => schema.push(("Min X", ParamValue::Real(0.0))),
            Self::MaxY => schema.push(("Max Y", ParamValue::Real(0.0))),
            Self::Timer => schema.push(("Milliseconds", ParamValue::Int(0))),
            Self::GameStartup | Self::EveryStep | Self::FinishAchievement => {}
        }
        schema
    }

    /// The bare predicate, with no side effects. Achievement events are
    /// stateful and only answer through `Event::is_triggered`.
    fn holds(self, params: &ParamBag, ctx: &EventContext<'_>) -> EngineResult<bool> {
        let owner = ctx.owner;
        let holds = match self {
            Self::KeyPress => {
                let key = params.key("Key")?;
                if key == Key::Unbound {
                    false
                } else if params.boolean("Only On Press")? {
                    // Only the most recent press of the tick counts.
                    ctx.input.is_just_pressed(key) && ctx.input.last_pressed == Some(key)
                } else {
                    ctx.input.is_held(key)
                }
            }
            Self::Click => {
                let button = parse_button(params.text("Button")?)?;
                ctx.input
                    .click
                    .is_some_and(|c| c.button == button && owner.contains_point(c.x, c.y))
            }
            Self::InsideRegion => {
                let p = owner.position;
                p.x > params.real("Minimum X")?
                    && p.x < params.real("Maximum X")?
                    && p.y > params.real("Minimum Y")?
                    && p.y < params.real("Maximum Y")?
            }
            Self::Collision => {
                let other = params.text("Entity")?;
                let filter = parse_side(params.text("Side")?)?;
                ctx.collisions
                    .iter()
                    .any(|c| c.is_between(owner.id(), other) && filter.matches(c.side))
            }
            Self::EntityDistance => {
                let other = params.text("Entity")?;
                match ctx.find(other) {
                    Some(target) => {
                        let distance = owner.center().distance(target.center());
                        let less_than = params.boolean("Less Than")?;
                        (distance < params.real("Distance")?) == less_than
                    }
                    None => false,
                }
            }
            Self::PointsGreaterThan => ctx.scorebar.score() > params.int("Amount of Points")?,
            Self::GameStartup => ctx.first_tick,
            Self::EntityIsVisible => ctx.find(params.text("Entity")?).is_some_and(|e| e.visible),
            Self::MinX => owner.position.x <= params.real("Min X")?,
            Self::MaxY => owner.position.y >= params.real("Max Y")?,
            Self::Timer => {
                let threshold = params.int("Milliseconds")?.max(0) as u64;
                ctx.scorebar.clock_ms() >= threshold
            }
            Self::EveryStep => true,
            Self::FinishAchievement => false,
        };
        Ok(holds)
    }
}

/// Read-only world view for one tick. `owner` is also present in `entities`,
/// with its events detached while they are being evaluated.
pub struct EventContext<'a> {
    pub owner: &'a Entity,
    pub entities: &'a [Entity],
    pub collisions: &'a [Collision],
    pub input: &'a InputSnapshot,
    pub scorebar: &'a Scorebar,
    pub first_tick: bool,
}

impl<'a> EventContext<'a> {
    /// First entity in level order carrying `name`.
    pub fn find(&self, name: &str) -> Option<&'a Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// The other events on the same entity, split around the one being evaluated.
#[derive(Clone, Copy, Default)]
pub struct Siblings<'a> {
    before: &'a [Event],
    after: &'a [Event],
}

impl<'a> Siblings<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Event> {
        self.before.iter().chain(self.after.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct AchievementProgress {
    achieved: Vec<bool>,
    done: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    params: ParamBag,
    actions: Vec<Action>,
    occurrences: u64,
    progress: AchievementProgress,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            params: ParamBag::with_schema(kind.name(), kind.schema()),
            actions: Vec::new(),
            occurrences: 0,
            progress: AchievementProgress::default(),
        }
    }

    /// Builder form of `set_param` for code-authored events.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<Self> {
        self.set_param(name, value)?;
        Ok(self)
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    /// Kind-checked and value-checked update. Rejected values leave the slot
    /// untouched.
    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> EngineResult<()> {
        let value = value.into();
        validate(name, &value)?;
        self.params.set(name, value)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut [Action] {
        &mut self.actions
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn remove_action(&mut self, index: usize) -> Option<Action> {
        (index < self.actions.len()).then(|| self.actions.remove(index))
    }

    /// How many ticks the predicate has held so far.
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// Evaluates the predicate, counts the occurrence and applies the trigger
    /// policy.
    pub fn is_triggered(&mut self, ctx: &EventContext<'_>, siblings: Siblings<'_>) -> EngineResult<bool> {
        let holds = match self.kind {
            EventKind::FinishAchievement => advance_achievement(&mut self.progress, ctx, siblings)?,
            kind => kind.holds(&self.params, ctx)?,
        };
        if !holds {
            return Ok(false);
        }
        self.occurrences += 1;
        self.policy_allows()
    }

    /// Same answer as `is_triggered` would give after this tick's counting,
    /// without touching any counter.
    pub fn peek(&self, ctx: &EventContext<'_>) -> EngineResult<bool> {
        if !self.kind.holds(&self.params, ctx)? {
            return Ok(false);
        }
        self.policy_allows()
    }

    /// Runs every action in order. A guard violation is logged and the next
    /// action still runs; any other error stops the remaining actions.
    pub fn trigger(&self, entity: &mut Entity, ctx: &mut ActionContext<'_>) -> EngineResult<()> {
        for action in &self.actions {
            if let Err(err) = action.act(entity, ctx) {
                if err.is_guard_violation() {
                    log::warn!(
                        "{} action on {} skipped: {err}",
                        action.kind().name(),
                        entity.label()
                    );
                    continue;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn policy_allows(&self) -> EngineResult<bool> {
        let every = self.params.int(TRIGGER_EVERY)?.max(1) as u64;
        let n = self.occurrences;
        if n == 0 || n % every != 0 {
            return Ok(false);
        }
        match parse_limit(self.params.text(TRIGGER_LIMIT)?)? {
            None => Ok(true),
            Some(limit) => Ok(n <= limit),
        }
    }
}

/// Fires once, the first tick every sibling has been seen triggered at least
/// once. Sibling achievement events are not tracked.
fn advance_achievement(
    progress: &mut AchievementProgress,
    ctx: &EventContext<'_>,
    siblings: Siblings<'_>,
) -> EngineResult<bool> {
    if progress.done {
        return Ok(false);
    }
    let tracked: Vec<&Event> = siblings
        .iter()
        .filter(|e| e.kind != EventKind::FinishAchievement)
        .collect();
    if progress.achieved.len() != tracked.len() {
        progress.achieved.resize(tracked.len(), false);
    }
    for (slot, event) in progress.achieved.iter_mut().zip(&tracked) {
        if !*slot && event.peek(ctx)? {
            *slot = true;
        }
    }
    if progress.achieved.iter().all(|a| *a) {
        progress.done = true;
        return Ok(true);
    }
    Ok(false)
}

fn validate(name: &str, value: &ParamValue) -> EngineResult<()> {
    let invalid = |reason: &str| EngineError::InvalidParameterValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match (name, value) {
        (TRIGGER_EVERY, ParamValue::Int(n)) if *n < 1 => Err(invalid("must be at least 1")),
        (TRIGGER_LIMIT, ParamValue::Text(t)) => parse_limit(t).map(|_| ()),
        ("Side", ParamValue::Text(t)) => parse_side(t).map(|_| ()),
        ("Button", ParamValue::Text(t)) => parse_button(t).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_limit(text: &str) -> EngineResult<Option<u64>> {
    if text == ALWAYS {
        return Ok(None);
    }
    text.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EngineError::InvalidParameterValue {
            name: TRIGGER_LIMIT.to_string(),
            value: text.to_string(),
            reason: format!("expected '{ALWAYS}' or a whole number"),
        })
}

fn parse_side(text: &str) -> EngineResult<SideFilter> {
    SideFilter::from_label(text).ok_or_else(|| EngineError::InvalidParameterValue {
        name: "Side".to_string(),
        value: text.to_string(),
        reason: "expected Any, Top, Bottom, Left or Right".to_string(),
    })
}

fn parse_button(text: &str) -> EngineResult<MouseBtn> {
    MouseBtn::from_label(text).ok_or_else(|| EngineError::InvalidParameterValue {
        name: "Button".to_string(),
        value: text.to_string(),
        reason: "expected Left, Right or Middle".to_string(),
    })
}

/// Per-tick inputs shared by every entity's event pass.
pub struct TickView<'a> {
    pub collisions: &'a [Collision],
    pub input: &'a InputSnapshot,
    pub first_tick: bool,
}

/// Evaluates and fires the events of `entities[index]`. Returns how many
/// events fired. The entity's events are put back even when an action fails.
pub fn dispatch_events(
    entities: &mut [Entity],
    index: usize,
    tick: &TickView<'_>,
    scorebar: &mut Scorebar,
    pending: &mut Option<ScreenRequest>,
) -> EngineResult<usize> {
    let mut events = entities[index].take_events();
    let result = collect_triggered(&mut events, entities, index, tick, scorebar).and_then(|fired| {
        let entity = &mut entities[index];
        let mut ctx = ActionContext::new(scorebar, pending);
        for &i in &fired {
            events[i].trigger(entity, &mut ctx)?;
        }
        Ok(fired.len())
    });
    entities[index].restore_events(events);
    result
}

fn collect_triggered(
    events: &mut [Event],
    entities: &[Entity],
    index: usize,
    tick: &TickView<'_>,
    scorebar: &Scorebar,
) -> EngineResult<Vec<usize>> {
    let ctx = EventContext {
        owner: &entities[index],
        entities,
        collisions: tick.collisions,
        input: tick.input,
        scorebar,
        first_tick: tick.first_tick,
    };
    let mut fired = Vec::new();
    for i in 0..events.len() {
        let (before, rest) = events.split_at_mut(i);
        if let Some((current, after)) = rest.split_first_mut() {
            let siblings = Siblings {
                before: &*before,
                after: &*after,
            };
            if current.is_triggered(&ctx, siblings)? {
                fired.push(i);
            }
        }
    }
    Ok(fired)
}
