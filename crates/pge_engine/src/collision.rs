//! Per-tick pairwise AABB collision detection.
//!
//! Every attached entity is tested against every other attached entity
//! (O(n^2)). Two boxes only interact when they share a z layer and both are
//! visible. Touching edges count as overlap with depth 0.
//!
//! Each overlapping pair yields two records, one per ordering, carrying the
//! side from which `first` meets `second` and the penetration depth along the
//! shallower axis. The list is rebuilt from scratch every tick.
//!
//! Coordinates are screen-style: `position` is the top-left corner and y grows
//! downward.

use std::collections::HashMap;

use pge_core::{EngineError, EngineResult};

use crate::entity::{Entity, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl CollisionSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Side constraint carried by collision events as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideFilter {
    Any,
    Only(CollisionSide),
}

impl SideFilter {
    pub const ANY: &'static str = "Any";

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::ANY => Some(Self::Any),
            "Top" => Some(Self::Only(CollisionSide::Top)),
            "Bottom" => Some(Self::Only(CollisionSide::Bottom)),
            "Left" => Some(Self::Only(CollisionSide::Left)),
            "Right" => Some(Self::Only(CollisionSide::Right)),
            _ => None,
        }
    }

    pub fn matches(self, side: CollisionSide) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == side,
        }
    }
}

/// One ordered contact for the current tick. Do not keep these across ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub first: EntityId,
    pub second: EntityId,
    pub second_name: String,
    pub side: CollisionSide,
    pub depth: f64,
}

impl Collision {
    pub fn is_between(&self, first: EntityId, second_name: &str) -> bool {
        self.first == first && self.second_name == second_name
    }
}

#[derive(Debug, Default)]
pub struct CollisionObservable {
    observers: Vec<EntityId>,
    collisions: Vec<Collision>,
}

impl CollisionObservable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: EntityId) {
        if self.observers.contains(&id) {
            log::debug!("Entity {id} already attached to collision observer");
            return;
        }
        self.observers.push(id);
    }

    pub fn detach(&mut self, id: EntityId) -> EngineResult<()> {
        let index = self
            .observers
            .iter()
            .position(|o| *o == id)
            .ok_or_else(|| EngineError::EntityNotAttached {
                entity: id.to_string(),
            })?;
        self.observers.remove(index);
        Ok(())
    }

    /// Drops every observer and any collisions left from the last tick.
    pub fn detach_all(&mut self) {
        self.observers.clear();
        self.collisions.clear();
    }

    pub fn is_attached(&self, id: EntityId) -> bool {
        self.observers.contains(&id)
    }

    pub fn observers(&self) -> &[EntityId] {
        &self.observers
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Rebuilds the collision list for this tick from the attached entities.
    pub fn update_observers(&mut self, entities: &[Entity]) {
        self.collisions.clear();

        let by_id: HashMap<EntityId, &Entity> = entities.iter().map(|e| (e.id(), e)).collect();
        let attached: Vec<&Entity> = self
            .observers
            .iter()
            .filter_map(|id| {
                let found = by_id.get(id).copied();
                if found.is_none() {
                    log::warn!("Attached entity {id} is not in the current level");
                }
                found
            })
            .collect();

        for first in &attached {
            for second in &attached {
                if first.id() != second.id() && is_collision(first, second) {
                    let (side, depth) = classify(first, second);
                    self.collisions.push(Collision {
                        first: first.id(),
                        second: second.id(),
                        second_name: second.name.clone(),
                        side,
                        depth,
                    });
                }
            }
        }
        log::trace!(
            "{} collisions among {} observers",
            self.collisions.len(),
            attached.len()
        );
    }
}

/// Same layer, both visible, boxes overlapping or touching.
pub fn is_collision(first: &Entity, second: &Entity) -> bool {
    let (a_min, a_max) = (first.min(), first.max());
    let (b_min, b_max) = (second.min(), second.max());
    first.z == second.z
        && first.visible
        && second.visible
        && !(a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y)
}

/// Side from which `first` meets `second`, and the penetration depth.
///
/// The contact is horizontal when the vertical overlap is strictly larger than
/// the horizontal one. At an exact tie it is vertical. When both boxes share
/// the same x (or y) the side falls back to Left (or Top) for both orderings.
pub fn classify(first: &Entity, second: &Entity) -> (CollisionSide, f64) {
    let width = intersection_width(first, second);
    let height = intersection_height(first, second);
    if height > width {
        let side = if first.position.x < second.position.x {
            CollisionSide::Right
        } else {
            CollisionSide::Left
        };
        (side, width)
    } else {
        let side = if first.position.y < second.position.y {
            CollisionSide::Bottom
        } else {
            CollisionSide::Top
        };
        (side, height)
    }
}

fn intersection_width(first: &Entity, second: &Entity) -> f64 {
    intersection_size(first.min().x, first.max().x, second.min().x, second.max().x)
}

fn intersection_height(first: &Entity, second: &Entity) -> f64 {
    intersection_size(first.min().y, first.max().y, second.min().y, second.max().y)
}

/// Overlap length of two intervals known to intersect, including containment.
fn intersection_size(one_min: f64, one_max: f64, two_min: f64, two_max: f64) -> f64 {
    if one_min < two_min {
        if one_max < two_max {
            one_max - two_min
        } else {
            two_max - two_min
        }
    } else if one_max < two_max {
        one_max - one_min
    } else {
        two_max - one_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn block(name: &str, x: f64, y: f64, w: f64, h: f64) -> Entity {
        Entity::new(EntityKind::Block).named(name).at(x, y).sized(w, h)
    }

    fn detect(entities: &[Entity]) -> Vec<Collision> {
        let mut observable = CollisionObservable::new();
        for e in entities {
            observable.attach(e.id());
        }
        observable.update_observers(entities);
        observable.collisions().to_vec()
    }

    #[test]
    fn overlapping_pair_produces_mirrored_records() {
        // Hero falls onto the floor: shallow vertical overlap.
        let hero = block("hero", 10.0, 0.0, 10.0, 10.0);
        let floor = block("floor", 0.0, 8.0, 40.0, 10.0);
        let entities = vec![hero, floor];
        let collisions = detect(&entities);
        assert_eq!(collisions.len(), 2);

        let ab = &collisions[0];
        let ba = &collisions[1];
        assert_eq!(ab.first, entities[0].id());
        assert_eq!(ab.second, entities[1].id());
        assert_eq!(ab.side, CollisionSide::Bottom);
        assert_eq!(ba.side, CollisionSide::Top);
        assert_eq!(ab.side.opposite(), ba.side);
        assert!((ab.depth - 2.0).abs() < 1e-9);
        assert!((ab.depth - ba.depth).abs() < 1e-9);
        assert_eq!(ab.second_name, "floor");
        assert!(ab.is_between(entities[0].id(), "floor"));
    }

    #[test]
    fn side_overlap_is_horizontal() {
        let hero = block("hero", 0.0, 0.0, 10.0, 20.0);
        let wall = block("wall", 7.0, 0.0, 10.0, 40.0);
        let entities = vec![hero, wall];
        let collisions = detect(&entities);
        assert_eq!(collisions[0].side, CollisionSide::Right);
        assert_eq!(collisions[1].side, CollisionSide::Left);
        assert!((collisions[0].depth - 3.0).abs() < 1e-9);
    }

    #[test]
    fn different_layers_never_collide() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 0.0, 0.0, 10.0, 10.0).on_layer(1);
        assert!(detect(&[a, b]).is_empty());
    }

    #[test]
    fn invisible_entities_never_collide() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let mut b = block("b", 2.0, 2.0, 10.0, 10.0);
        b.visible = false;
        assert!(detect(&[a, b]).is_empty());
    }

    #[test]
    fn touching_edges_collide_with_zero_depth() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 0.0, 10.0, 10.0, 10.0);
        let collisions = detect(&[a, b]);
        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].depth, 0.0);
        assert_eq!(collisions[0].side, CollisionSide::Bottom);
    }

    #[test]
    fn separated_boxes_do_not_collide() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 10.5, 0.0, 10.0, 10.0);
        assert!(detect(&[a, b]).is_empty());
    }

    #[test]
    fn shared_x_reports_left_for_both_orderings() {
        let post = block("post", 0.0, 0.0, 10.0, 20.0);
        let pole = block("pole", 0.0, 5.0, 4.0, 40.0);
        let (ab, _) = classify(&post, &pole);
        let (ba, _) = classify(&pole, &post);
        assert_eq!(ab, CollisionSide::Left);
        assert_eq!(ba, CollisionSide::Left);
        assert_ne!(ab.opposite(), ba);
    }

    #[test]
    fn shared_y_reports_top_for_both_orderings() {
        let slab = block("slab", 0.0, 0.0, 20.0, 10.0);
        let beam = block("beam", 5.0, 0.0, 40.0, 4.0);
        let (ab, _) = classify(&slab, &beam);
        let (ba, _) = classify(&beam, &slab);
        assert_eq!(ab, CollisionSide::Top);
        assert_eq!(ba, CollisionSide::Top);
    }

    #[test]
    fn exact_tie_is_vertical() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 5.0, 5.0, 10.0, 10.0);
        let (side, depth) = classify(&a, &b);
        assert_eq!(side, CollisionSide::Bottom);
        assert!((depth - 5.0).abs() < 1e-9);
    }

    #[test]
    fn contained_box_depth_is_inner_extent() {
        let outer = block("outer", 0.0, 0.0, 100.0, 100.0);
        let inner = block("inner", 40.0, 10.0, 10.0, 60.0);
        let (side, depth) = classify(&outer, &inner);
        // Overlap is 10 wide and 60 tall, so the contact is horizontal.
        assert_eq!(side, CollisionSide::Right);
        assert!((depth - 10.0).abs() < 1e-9);
    }

    #[test]
    fn only_attached_entities_are_tested() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 1.0, 1.0, 10.0, 10.0);
        let c = block("c", 2.0, 2.0, 10.0, 10.0);
        let entities = vec![a, b, c];

        let mut observable = CollisionObservable::new();
        observable.attach(entities[0].id());
        observable.attach(entities[1].id());
        observable.update_observers(&entities);
        assert_eq!(observable.collisions().len(), 2);

        observable.detach(entities[1].id()).expect("detach");
        observable.update_observers(&entities);
        assert!(observable.collisions().is_empty());
    }

    #[test]
    fn detach_unknown_entity_fails() {
        let mut observable = CollisionObservable::new();
        let stray = block("stray", 0.0, 0.0, 1.0, 1.0);
        let err = observable.detach(stray.id()).expect_err("not attached");
        assert!(matches!(err, EngineError::EntityNotAttached { .. }));
    }

    #[test]
    fn list_is_rebuilt_every_tick() {
        let a = block("a", 0.0, 0.0, 10.0, 10.0);
        let b = block("b", 5.0, 0.0, 10.0, 10.0);
        let mut entities = vec![a, b];
        let mut observable = CollisionObservable::new();
        for e in &entities {
            observable.attach(e.id());
        }
        observable.update_observers(&entities);
        assert_eq!(observable.collisions().len(), 2);

        entities[1].position.x = 50.0;
        observable.update_observers(&entities);
        assert!(observable.collisions().is_empty());
    }

    #[test]
    fn side_filter_parses_labels() {
        assert_eq!(SideFilter::from_label("Any"), Some(SideFilter::Any));
        let bottom = SideFilter::from_label("Bottom").expect("bottom");
        assert!(bottom.matches(CollisionSide::Bottom));
        assert!(!bottom.matches(CollisionSide::Top));
        assert_eq!(SideFilter::from_label("Diagonal"), None);
        for side in [
            CollisionSide::Top,
            CollisionSide::Bottom,
            CollisionSide::Left,
            CollisionSide::Right,
        ] {
            assert_eq!(
                SideFilter::from_label(side.label()),
                Some(SideFilter::Only(side))
            );
        }
    }
}
