use glam::Vec2;
use std::f32::consts::TAU;

use crate::api::types::{EntityId, EntityKind, Payload};
use crate::components::explosion::Explosion;
use crate::components::layer::Layer;

/// Where an entity is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Live on the playfield: hit-testable, steppable, expirable.
    #[default]
    Active,
    /// Pinned under a finger mid-drag. Exempt from falling and expiry.
    Held,
    /// Travelling back to its home position after a rejected drop.
    Returning,
    /// Bursting into particles; removed once the last particle dies.
    Exploding,
}

/// Scripted fall from above the viewport to below it, with a sine wobble
/// on the x axis. Position is a pure function of the current timestamp,
/// so a late frame never makes an item drift.
#[derive(Debug, Clone, Copy)]
pub struct FallMotion {
    /// Spawn position (wobble is centered on `start.x`).
    pub start: Vec2,
    /// Terminal y; reaching it expires the entity.
    pub end_y: f32,
    /// Travel time from `start.y` to `end_y`.
    pub duration_ms: f32,
    /// Timestamp the fall began.
    pub started_ms: f64,
    /// Wobble amplitude in world units (0 = straight fall).
    pub wobble_amp: f32,
    /// Wobble frequency in Hz.
    pub wobble_hz: f32,
    /// Wobble phase offset, randomized at spawn so items don't sway in sync.
    pub wobble_phase: f32,
}

impl FallMotion {
    /// Normalized travel progress [0, 1] at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let elapsed = (now_ms - self.started_ms) as f32;
        (elapsed / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Position at `now_ms`.
    pub fn pos_at(&self, now_ms: f64) -> Vec2 {
        let t = self.progress(now_ms);
        let y = self.start.y + (self.end_y - self.start.y) * t;
        let elapsed_s = ((now_ms - self.started_ms) / 1000.0) as f32;
        let x = self.start.x + self.wobble_amp * (elapsed_s * self.wobble_hz * TAU + self.wobble_phase).sin();
        Vec2::new(x, y)
    }

    /// Whether the fall reached its terminal y.
    pub fn done(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// A short decaying side-to-side shake ("no, not that one").
/// Offsets x around a fixed origin and restores the origin exactly when done.
#[derive(Debug, Clone, Copy)]
pub struct Shake {
    pub origin: Vec2,
    pub started_ms: f64,
    pub duration_ms: f32,
    pub amplitude: f32,
    pub cycles: f32,
}

impl Shake {
    pub const DEFAULT_AMPLITUDE: f32 = 6.0;
    pub const DEFAULT_CYCLES: f32 = 4.0;

    pub fn new(origin: Vec2, started_ms: f64, duration_ms: f32, amplitude: f32, cycles: f32) -> Self {
        Self { origin, started_ms, duration_ms, amplitude, cycles }
    }

    /// X offset from the origin at `now_ms`. Decays linearly to zero.
    pub fn offset_at(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        let t = ((now_ms - self.started_ms) as f32 / self.duration_ms).clamp(0.0, 1.0);
        let decay = 1.0 - t;
        self.amplitude * decay * (t * self.cycles * TAU).sin()
    }

    pub fn done(&self, now_ms: f64) -> bool {
        (now_ms - self.started_ms) as f32 >= self.duration_ms
    }
}

/// Fat Entity — a single struct with optional components.
/// Designed for simplicity and rapid prototyping over ECS purity.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier, assigned by the store at spawn.
    pub id: EntityId,
    /// Monotonic spawn sequence, assigned by the store. Higher = newer;
    /// the hit test uses it to pick the most recently spawned of
    /// overlapping entities.
    pub(crate) seq: u64,
    /// Game-defined kind.
    pub kind: EntityKind,
    /// Lifecycle state.
    pub state: Lifecycle,
    /// Position in world space (center).
    pub pos: Vec2,
    /// Home position a rejected drop returns to.
    pub home: Vec2,
    /// Diameter in world units; the hit circle and rendered size.
    pub size: f32,
    /// Scale multiplier (1.0 = natural size; bumped while held).
    pub scale: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Draw layer.
    pub layer: Layer,
    /// Layer to settle back to after a drag ends.
    pub home_layer: Layer,
    /// Whether a drag session may pick this entity up.
    pub draggable: bool,
    /// Teaching value. Immutable after spawn.
    payload: Option<Payload>,
    /// Scripted fall (optional).
    pub fall: Option<FallMotion>,
    /// Rejection shake (optional).
    pub shake: Option<Shake>,
    /// Particle burst (optional, only while `Exploding`).
    pub explosion: Option<Explosion>,
    /// Absolute deadline; an `Active` entity past it is expired and removed.
    pub expire_at_ms: Option<f64>,
}

impl Entity {
    /// Create a new entity at the origin. Id and spawn sequence are
    /// placeholders until the store assigns real ones.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            id: EntityId(0),
            seq: 0,
            kind,
            state: Lifecycle::Active,
            pos: Vec2::ZERO,
            home: Vec2::ZERO,
            size: 40.0,
            scale: 1.0,
            alpha: 1.0,
            layer: Layer::default(),
            home_layer: Layer::default(),
            draggable: false,
            payload: None,
            fall: None,
            shake: None,
            explosion: None,
            expire_at_ms: None,
        }
    }

    /// The teaching value this entity carries. Set once via the builder;
    /// nothing mutates it afterwards.
    pub fn payload(&self) -> Option<Payload> {
        self.payload
    }

    /// Spawn sequence number (higher = spawned later).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Hit-circle radius, scale included.
    pub fn radius(&self) -> f32 {
        self.size * self.scale * 0.5
    }

    /// Whether `point` falls inside the hit circle.
    pub fn contains(&self, point: Vec2) -> bool {
        let r = self.radius();
        self.pos.distance_squared(point) <= r * r
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self.home = pos;
        self
    }

    pub fn with_home(mut self, home: Vec2) -> Self {
        self.home = home;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self.home_layer = layer;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn with_fall(mut self, fall: FallMotion) -> Self {
        self.fall = Some(fall);
        self
    }

    pub fn with_expiry(mut self, deadline_ms: f64) -> Self {
        self.expire_at_ms = Some(deadline_ms);
        self
    }
}
