// extensions/tween.rs
//
// Tween system — manages animated value transitions by EntityId.
// Tweens are timestamp-driven: progress is a pure function of the frame
// timestamp, so a dropped frame skips ahead instead of drifting.
//
// Usage:
//   let mut tweens = TweenState::new();
//   tweens.add(entity_id, Tween::position(from, to, 300.0, Easing::CubicOut), now_ms);
//   tweens.tick(now_ms, &mut store, &mut events, max_events);

use std::collections::HashMap;

use glam::Vec2;

use crate::api::game::push_event_capped;
use crate::api::types::{EntityId, GameEvent};
use crate::components::entity::Lifecycle;
use crate::core::store::EntityStore;

use super::easing::{ease, ease_vec2, Easing};

/// What property a tween animates.
#[derive(Debug, Clone, Copy)]
pub enum TweenTarget {
    /// Animate Entity.pos
    Position { from: Vec2, to: Vec2 },
    /// Animate Entity.scale (uniform)
    Scale { from: f32, to: f32 },
    /// Animate Entity.alpha
    Alpha { from: f32, to: f32 },
}

/// What happens to the entity when a tween completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishAction {
    /// Nothing beyond removing the tween.
    #[default]
    None,
    /// The tween was a return flight: snap to the exact home position,
    /// drop back to the home layer, go Active again, and announce
    /// `ReturnFinished`.
    SettleHome,
}

/// A single one-shot tween.
#[derive(Debug, Clone)]
pub struct Tween {
    /// What to animate.
    pub target: TweenTarget,
    /// Timestamp the tween started; stamped by `TweenState::add`.
    pub start_ms: f64,
    /// Duration in milliseconds.
    pub duration_ms: f32,
    /// Easing function.
    pub easing: Easing,
    /// Completion behavior.
    pub finish: FinishAction,
}

impl Tween {
    /// Create a position tween.
    pub fn position(from: Vec2, to: Vec2, duration_ms: f32, easing: Easing) -> Self {
        Self {
            target: TweenTarget::Position { from, to },
            start_ms: 0.0,
            duration_ms,
            easing,
            finish: FinishAction::None,
        }
    }

    /// Create a uniform scale tween.
    pub fn scale(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            target: TweenTarget::Scale { from, to },
            start_ms: 0.0,
            duration_ms,
            easing,
            finish: FinishAction::None,
        }
    }

    /// Create an alpha (fade) tween.
    pub fn alpha(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            target: TweenTarget::Alpha { from, to },
            start_ms: 0.0,
            duration_ms,
            easing,
            finish: FinishAction::None,
        }
    }

    pub fn with_finish(mut self, finish: FinishAction) -> Self {
        self.finish = finish;
        self
    }

    /// Normalized progress [0, 1] at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) as f32 / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Handle to a tween for later reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u32);

/// Manages all active tweens.
#[derive(Debug, Default)]
pub struct TweenState {
    tweens: HashMap<TweenId, (EntityId, Tween)>,
    next_id: u32,
}

impl TweenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tween for an entity, starting at `now_ms`.
    /// Returns a handle for later control.
    pub fn add(&mut self, entity: EntityId, mut tween: Tween, now_ms: f64) -> TweenId {
        tween.start_ms = now_ms;
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.insert(id, (entity, tween));
        id
    }

    /// Remove a tween by handle.
    pub fn remove(&mut self, id: TweenId) -> bool {
        self.tweens.remove(&id).is_some()
    }

    /// Remove all tweens for an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.tweens.retain(|_, (e, _)| *e != entity);
    }

    /// Get a tween by handle.
    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(&id).map(|(_, t)| t)
    }

    /// Advance all tweens to `now_ms` and apply them to entities.
    /// Returns the number of tweens that completed this tick.
    pub fn tick(
        &mut self,
        now_ms: f64,
        store: &mut EntityStore,
        events: &mut Vec<GameEvent>,
        max_events: usize,
    ) -> usize {
        let mut completed = Vec::new();

        for (&id, (entity_id, tween)) in self.tweens.iter_mut() {
            let t = tween.progress(now_ms);

            let entity = match store.get_mut(*entity_id) {
                Some(e) => e,
                None => {
                    // Entity left the store mid-flight; drop the tween silently.
                    completed.push((id, None));
                    continue;
                }
            };

            match tween.target {
                TweenTarget::Position { from, to } => {
                    entity.pos = ease_vec2(from, to, t, tween.easing);
                }
                TweenTarget::Scale { from, to } => {
                    entity.scale = ease(from, to, t, tween.easing);
                }
                TweenTarget::Alpha { from, to } => {
                    entity.alpha = ease(from, to, t, tween.easing);
                }
            }

            if t >= 1.0 {
                if tween.finish == FinishAction::SettleHome {
                    entity.pos = entity.home;
                    entity.layer = entity.home_layer;
                    entity.state = Lifecycle::Active;
                    completed.push((id, Some(*entity_id)));
                } else {
                    completed.push((id, None));
                }
            }
        }

        let count = completed.len();
        for (id, settled) in completed {
            self.tweens.remove(&id);
            if let Some(entity_id) = settled {
                push_event_capped(events, max_events, GameEvent::ReturnFinished { id: entity_id });
            }
        }

        count
    }

    /// Number of active tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether there are no active tweens.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Clear all tweens.
    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityKind;
    use crate::components::entity::Entity;
    use crate::components::layer::Layer;

    fn store_with_entity() -> (EntityStore, EntityId) {
        let mut store = EntityStore::new();
        let id = store.spawn(Entity::new(EntityKind(1)).with_pos(Vec2::ZERO));
        (store, id)
    }

    #[test]
    fn tween_position_by_timestamp() {
        let mut tweens = TweenState::new();
        let (mut store, id) = store_with_entity();
        let mut events = Vec::new();

        tweens.add(
            id,
            Tween::position(Vec2::ZERO, Vec2::new(100.0, 0.0), 1000.0, Easing::Linear),
            0.0,
        );

        tweens.tick(500.0, &mut store, &mut events, 64);
        assert!((store.get(id).unwrap().pos.x - 50.0).abs() < 0.01);

        tweens.tick(1000.0, &mut store, &mut events, 64);
        assert!((store.get(id).unwrap().pos.x - 100.0).abs() < 0.01);
        assert!(tweens.is_empty());
    }

    #[test]
    fn late_frame_lands_exactly_at_end() {
        let mut tweens = TweenState::new();
        let (mut store, id) = store_with_entity();
        let mut events = Vec::new();

        tweens.add(
            id,
            Tween::position(Vec2::ZERO, Vec2::new(100.0, 40.0), 300.0, Easing::CubicOut),
            0.0,
        );

        // One giant frame well past the duration.
        tweens.tick(5000.0, &mut store, &mut events, 64);
        let e = store.get(id).unwrap();
        assert_eq!(e.pos, Vec2::new(100.0, 40.0));
        assert!(tweens.is_empty());
    }

    #[test]
    fn settle_home_restores_entity_and_reports() {
        let mut tweens = TweenState::new();
        let mut store = EntityStore::new();
        let id = store.spawn(
            Entity::new(EntityKind(1))
                .with_pos(Vec2::new(20.0, 30.0))
                .with_layer(Layer::Playfield),
        );
        {
            let e = store.get_mut(id).unwrap();
            e.state = Lifecycle::Returning;
            e.layer = Layer::Drag;
            e.pos = Vec2::new(300.0, 300.0);
        }
        let mut events = Vec::new();

        tweens.add(
            id,
            Tween::position(Vec2::new(300.0, 300.0), Vec2::new(20.0, 30.0), 300.0, Easing::CubicOut)
                .with_finish(FinishAction::SettleHome),
            0.0,
        );
        tweens.tick(300.0, &mut store, &mut events, 64);

        let e = store.get(id).unwrap();
        assert_eq!(e.pos, Vec2::new(20.0, 30.0));
        assert_eq!(e.state, Lifecycle::Active);
        assert_eq!(e.layer, Layer::Playfield);
        assert_eq!(events, vec![GameEvent::ReturnFinished { id }]);
    }

    #[test]
    fn orphaned_tween_is_dropped_silently() {
        let mut tweens = TweenState::new();
        let (mut store, id) = store_with_entity();
        let mut events = Vec::new();

        tweens.add(
            id,
            Tween::position(Vec2::ZERO, Vec2::ONE, 1000.0, Easing::Linear)
                .with_finish(FinishAction::SettleHome),
            0.0,
        );
        store.despawn(id);

        tweens.tick(100.0, &mut store, &mut events, 64);
        assert!(tweens.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn remove_entity_tweens() {
        let mut tweens = TweenState::new();
        let id = EntityId(1);

        tweens.add(id, Tween::position(Vec2::ZERO, Vec2::ONE, 1000.0, Easing::Linear), 0.0);
        tweens.add(id, Tween::alpha(1.0, 0.0, 1000.0, Easing::Linear), 0.0);

        assert_eq!(tweens.len(), 2);
        tweens.remove_entity(id);
        assert!(tweens.is_empty());
    }
}
