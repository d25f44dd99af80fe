//! Per-frame motion: falls, shakes, expiry, particle bursts.
//!
//! Falls and shakes are pure functions of the frame timestamp; this pass
//! just writes the current sample into each entity and retires whatever
//! finished. Runs before input so a tap lands on an entity exactly where
//! the player sees it.

use glam::Vec2;

use crate::api::game::{push_event_capped, EngineContext};
use crate::api::types::{EntityId, GameEvent};
use crate::components::entity::Lifecycle;
use crate::extensions::easing::Easing;
use crate::extensions::tween::{FinishAction, Tween};

pub fn step(ctx: &mut EngineContext) {
    let now = ctx.now_ms();
    let EngineContext { store, tweens, events, config, .. } = ctx;

    // Falling motion, and expiry of anything past its end or deadline.
    // Held and returning entities are exempt: a finger pin or a return
    // flight always outranks the fall script.
    let mut expired: Vec<EntityId> = Vec::new();
    for e in store.iter_mut() {
        if e.state != Lifecycle::Active {
            continue;
        }
        if let Some(fall) = e.fall {
            e.pos = fall.pos_at(now);
            if fall.done(now) {
                expired.push(e.id);
                continue;
            }
        }
        if let Some(deadline) = e.expire_at_ms {
            if now >= deadline {
                expired.push(e.id);
            }
        }
    }
    for id in expired {
        tweens.remove_entity(id);
        if let Some(e) = store.despawn(id) {
            push_event_capped(
                events,
                config.max_events,
                GameEvent::EntityExpired { id, kind: e.kind, payload: e.payload() },
            );
        }
    }

    // Shakes. On a falling entity the offset rides on top of the fall x;
    // otherwise the shake owns the position and restores its origin
    // exactly when done. A finished shake on a returning entity hands
    // over to the flight home.
    let mut fly_home: Vec<(EntityId, Vec2)> = Vec::new();
    for e in store.iter_mut() {
        let shake = match e.shake {
            Some(s) => s,
            None => continue,
        };
        if shake.done(now) {
            e.shake = None;
            if e.fall.is_none() {
                e.pos = shake.origin;
            }
            if e.state == Lifecycle::Returning {
                fly_home.push((e.id, e.pos));
            }
        } else if e.fall.is_some() && e.state == Lifecycle::Active {
            e.pos.x += shake.offset_at(now);
        } else {
            e.pos = Vec2::new(shake.origin.x + shake.offset_at(now), shake.origin.y);
        }
    }
    for (id, from) in fly_home {
        if let Some(e) = store.get(id) {
            tweens.add(
                id,
                Tween::position(from, e.home, config.return_duration_ms, Easing::CubicOut)
                    .with_finish(FinishAction::SettleHome),
                now,
            );
        }
    }

    // Particle bursts. The entity follows its last particle out.
    let mut burned_out: Vec<EntityId> = Vec::new();
    for e in store.iter_mut() {
        if e.state != Lifecycle::Exploding {
            continue;
        }
        let done = match &mut e.explosion {
            Some(burst) => !burst.tick(),
            None => true,
        };
        if done {
            burned_out.push(e.id);
        }
    }
    for id in burned_out {
        store.despawn(id);
    }
}
