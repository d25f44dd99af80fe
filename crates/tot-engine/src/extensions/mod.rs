// extensions/mod.rs
//
// Optional extension modules, decoupled from the entity store.
// Systems and games opt in by creating these states.

pub mod easing;
pub mod tween;

pub use easing::{ease, ease_vec2, lerp, lerp_vec2, Easing};
pub use tween::{FinishAction, Tween, TweenId, TweenState, TweenTarget};
