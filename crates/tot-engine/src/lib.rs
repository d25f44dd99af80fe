pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod render;
pub mod input;
pub mod services;
pub mod extensions;
pub mod runner;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, GameConfig, MiniGame};
pub use api::types::{
    EntityId, EntityKind, EventKind, GameEvent, Payload, RejectReason, SoundCue, ZoneId,
};
pub use components::entity::{Entity, FallMotion, Lifecycle, Shake};
pub use components::explosion::{Explosion, ExplosionParams, Particle};
pub use components::layer::Layer;
pub use components::zone::{Anchor, DropZone, Rect, ZoneAccept, ZoneSet, ZoneShape};
pub use core::rng::Rng;
pub use core::store::{EntityStore, FallSpec, SpawnClass, SpawnRequest, SpawnRules};
pub use core::timer::TimerQueue;
pub use core::viewport::Viewport;
pub use input::queue::{InputEvent, InputQueue};
pub use render::visual::{ParticleInstance, VisualBuffer, VisualInstance};
pub use runner::GameRunner;
pub use services::flags::{is_truthy, FlagStore, MemoryFlags};
pub use systems::collision::{classify_drop, hit_test, DropVerdict};
pub use systems::drag::DragController;
pub use systems::tutorial::{
    AdvanceRule, Gate, GateSet, HandMode, HandPose, Spotlight, TargetRef, Tutorial,
    TutorialOverlay, TutorialScript, TutorialStep,
};

// Extensions: decoupled optional systems
pub use extensions::{
    ease, ease_vec2, lerp, lerp_vec2, Easing, FinishAction, Tween, TweenId, TweenState,
    TweenTarget,
};
