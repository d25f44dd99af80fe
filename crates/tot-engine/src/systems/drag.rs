//! Single-pointer drag sessions: press, threshold, carry, drop.
//!
//! One session per surface. A press on an entity opens a session; the
//! press becomes a tap or a drag depending on how far the pointer travels
//! before release. Toddler fingers wobble, so a press that wiggles under
//! the threshold still counts as a clean tap.

use glam::Vec2;

use crate::api::game::EngineContext;
use crate::api::types::{EntityId, GameEvent, RejectReason};
use crate::components::entity::{Lifecycle, Shake};
use crate::components::layer::Layer;
use crate::input::queue::InputEvent;
use crate::systems::collision::{classify_drop, hit_test, DropVerdict};

#[derive(Debug)]
struct DragSession {
    entity: EntityId,
    pressed_at: Vec2,
    last: Vec2,
    /// Pointer-to-center offset captured at the grab, so the item does
    /// not jump under the finger.
    grab_offset: Vec2,
    /// The pointer crossed the drag threshold at some point.
    moved: bool,
    /// The session promoted into a live drag.
    dragging: bool,
    base_scale: f32,
    /// Siblings dimmed for this drag, with their original alpha.
    dimmed: Vec<(EntityId, f32)>,
}

/// Tracks the one live pointer session and turns raw pointer events into
/// taps, drags and drop verdicts.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity currently being carried, if a drag is live.
    pub fn held(&self) -> Option<EntityId> {
        self.session.as_ref().filter(|s| s.dragging).map(|s| s.entity)
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(&mut self, event: InputEvent, ctx: &mut EngineContext) {
        match event {
            InputEvent::PointerDown { x, y } => self.press(Vec2::new(x, y), ctx),
            InputEvent::PointerMove { x, y } => self.motion(Vec2::new(x, y), ctx),
            InputEvent::PointerUp { x, y } => self.release(Vec2::new(x, y), ctx),
            // Platform cancel = release at the last known position.
            InputEvent::PointerCancel => {
                if let Some(last) = self.session.as_ref().map(|s| s.last) {
                    self.release(last, ctx);
                }
            }
            InputEvent::Command { .. } => {}
        }
    }

    /// Tear down any live session without resolving a drop: the carried
    /// item snaps straight home. Used at session shutdown.
    pub fn abort(&mut self, ctx: &mut EngineContext) {
        let session = match self.session.take() {
            Some(s) => s,
            None => return,
        };
        restore_dimmed(&session, ctx);
        if session.dragging {
            if let Some(e) = ctx.store.get_mut(session.entity) {
                e.scale = session.base_scale;
                e.pos = e.home;
                e.layer = e.home_layer;
                e.state = Lifecycle::Active;
            }
        }
    }

    fn press(&mut self, p: Vec2, ctx: &mut EngineContext) {
        if self.session.is_some() {
            // Second finger while a session is live: first touch wins.
            log::debug!("pointer down during live session, ignoring");
            return;
        }
        let id = match hit_test(&ctx.store, p) {
            Some(id) => id,
            None => return,
        };
        let center = ctx.store.get(id).map(|e| e.pos).unwrap_or(p);
        self.session = Some(DragSession {
            entity: id,
            pressed_at: p,
            last: p,
            grab_offset: p - center,
            moved: false,
            dragging: false,
            base_scale: 1.0,
            dimmed: Vec::new(),
        });
    }

    fn motion(&mut self, p: Vec2, ctx: &mut EngineContext) {
        let session = match &mut self.session {
            Some(s) => s,
            None => return,
        };
        session.last = p;

        if !session.moved && p.distance(session.pressed_at) > ctx.config.drag_threshold {
            session.moved = true;
            let liftable = ctx
                .store
                .get(session.entity)
                .map(|e| e.draggable && e.state == Lifecycle::Active)
                .unwrap_or(false);
            if liftable {
                let allowed = ctx
                    .store
                    .get(session.entity)
                    .map(|e| ctx.tutorial.allows_drag(e))
                    .unwrap_or(false);
                if allowed {
                    session.dragging = true;
                    Self::begin_drag(session, ctx);
                } else {
                    ctx.nudge_tutorial();
                }
            }
        }

        if session.dragging {
            if let Some(e) = ctx.store.get_mut(session.entity) {
                e.pos = p - session.grab_offset;
            }
        }
    }

    fn release(&mut self, p: Vec2, ctx: &mut EngineContext) {
        let session = match self.session.take() {
            Some(s) => s,
            None => return,
        };
        if session.dragging {
            Self::finish_drag(session, p, ctx);
        } else if !session.moved {
            Self::finish_tap(session, ctx);
        }
        // A press that wandered past the threshold without becoming a
        // drag is neither tap nor drop; it just ends.
    }

    fn begin_drag(session: &mut DragSession, ctx: &mut EngineContext) {
        let id = session.entity;
        ctx.tweens.remove_entity(id);

        let dim = ctx.config.sibling_dim_alpha;
        let drag_scale = ctx.config.drag_scale;
        let mut dimmed = Vec::new();
        for e in ctx.store.iter_mut() {
            if e.id == id {
                session.base_scale = e.scale;
                e.state = Lifecycle::Held;
                // A grab permanently claims the item from its fall script.
                e.fall = None;
                e.shake = None;
                e.layer = Layer::Drag;
                e.scale *= drag_scale;
            } else if e.draggable && e.state == Lifecycle::Active {
                dimmed.push((e.id, e.alpha));
                e.alpha = dim;
            }
        }
        session.dimmed = dimmed;
    }

    fn finish_tap(session: DragSession, ctx: &mut EngineContext) {
        let id = session.entity;
        let hit = match ctx.store.get(id) {
            Some(e) if e.state == Lifecycle::Active => {
                Some((e.kind, e.payload(), ctx.tutorial.allows_tap(e)))
            }
            _ => None,
        };
        match hit {
            Some((kind, payload, true)) => {
                ctx.emit_event(GameEvent::EntityTapped { id, kind, payload });
            }
            Some((_, _, false)) => ctx.nudge_tutorial(),
            None => {}
        }
    }

    fn finish_drag(session: DragSession, p: Vec2, ctx: &mut EngineContext) {
        let id = session.entity;
        restore_dimmed(&session, ctx);
        if let Some(e) = ctx.store.get_mut(id) {
            e.scale = session.base_scale;
        }

        let verdict = match ctx.store.get(id) {
            Some(e) => classify_drop(&ctx.zones, e, p),
            None => return,
        };

        match verdict {
            DropVerdict::Accepted { zone } => {
                if let Some(z) = ctx.zones.get_mut(zone) {
                    z.filled += 1;
                }
                let payload = ctx.store.get(id).and_then(|e| e.payload());
                ctx.tweens.remove_entity(id);
                ctx.store.despawn(id);
                ctx.emit_event(GameEvent::DropAccepted { id, zone, payload });
            }
            DropVerdict::Rejected { zone, reason } => {
                ctx.emit_event(GameEvent::DropRejected { id, zone, reason });
                match reason {
                    // The zone protests: shake where it was dropped, then
                    // the stepper launches the flight home.
                    RejectReason::WrongItem => {
                        let now = ctx.now_ms();
                        let duration = ctx.config.shake_duration_ms;
                        if let Some(e) = ctx.store.get_mut(id) {
                            e.state = Lifecycle::Returning;
                            e.shake = Some(Shake::new(
                                e.pos,
                                now,
                                duration,
                                Shake::DEFAULT_AMPLITUDE,
                                Shake::DEFAULT_CYCLES,
                            ));
                        }
                    }
                    // Open space: quiet flight home, no protest.
                    RejectReason::MissedZone => {
                        ctx.return_home(id);
                    }
                }
            }
        }
    }
}

fn restore_dimmed(session: &DragSession, ctx: &mut EngineContext) {
    for (id, alpha) in &session.dimmed {
        if let Some(e) = ctx.store.get_mut(*id) {
            e.alpha = *alpha;
        }
    }
}
