//! First-launch tutorial: a scripted sequence of guided steps.
//!
//! Games declare a script of steps; the orchestrator walks through them,
//! gating input so small hands can only do the guided thing, pointing a
//! demonstration hand at live targets, and advancing on a timer or on a
//! gameplay event. Once finished (or skipped) a persistent flag keeps the
//! tutorial quiet on every later launch.
//!
//! The overlay is recomputed from scratch every frame as a pure function
//! of the cycle clock and the current target position, so a moving target
//! drags the hint along with it and a dropped frame cannot desync it.

use glam::Vec2;
use serde_json::Value;

use crate::api::game::{push_event_capped, push_sound_capped, GameConfig};
use crate::api::types::{EntityKind, EventKind, GameEvent, Payload, SoundCue, ZoneId};
use crate::components::entity::Entity;
use crate::components::zone::ZoneSet;
use crate::core::store::EntityStore;
use crate::core::viewport::Viewport;
use crate::extensions::easing::Easing;
use crate::services::flags::{is_truthy, FlagStore};

/// Where a hint points. Entity references re-resolve every frame, so the
/// hint follows its target around the playfield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetRef {
    /// A fixed point in viewport fractions (0..1 on each axis).
    Screen { fx: f32, fy: f32 },
    /// The oldest live entity of a kind.
    FirstOfKind(EntityKind),
    /// The entity carrying a specific payload.
    WithPayload(Payload),
    /// The center of a drop zone.
    Zone(ZoneId),
}

impl TargetRef {
    fn resolve(&self, store: &EntityStore, zones: &ZoneSet, vp: &Viewport) -> Option<Vec2> {
        match self {
            TargetRef::Screen { fx, fy } => Some(vp.at(*fx, *fy)),
            TargetRef::FirstOfKind(kind) => store.oldest_of_kind(*kind).map(|e| e.pos),
            TargetRef::WithPayload(payload) => store.find_payload(*payload).map(|e| e.pos),
            TargetRef::Zone(id) => zones.get(*id).map(|z| z.rect.center()),
        }
    }
}

/// How an input channel behaves while a step is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// Anything goes.
    #[default]
    Open,
    /// Nothing goes; blocked attempts replay the hint.
    Closed,
    /// Only the step's target entity goes. For commands this means closed.
    TargetOnly,
}

/// Per-channel gates for one step.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateSet {
    pub tap: Gate,
    pub drag: Gate,
    pub command: Gate,
}

/// When a step hands over to the next one.
#[derive(Debug, Clone, Copy)]
pub enum AdvanceRule {
    /// After this many milliseconds on the step.
    After(f64),
    /// When an event of this kind shows up in the frame's event list.
    On(EventKind),
    /// Whichever of the two comes first.
    OnOrAfter(EventKind, f64),
}

/// What the demonstration hand does during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandMode {
    #[default]
    Hidden,
    /// Hover on the target and pulse a press.
    Tap,
    /// Loop a press-carry-release flight from the target to the destination.
    DragLoop,
}

/// One step of a tutorial script.
#[derive(Debug, Clone)]
pub struct TutorialStep {
    pub name: &'static str,
    pub caption: Option<&'static str>,
    pub target: Option<TargetRef>,
    pub dest: Option<TargetRef>,
    pub hand: HandMode,
    pub voice: Option<SoundCue>,
    pub spotlight: Option<f32>,
    pub advance: AdvanceRule,
    pub gates: GateSet,
}

impl TutorialStep {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            caption: None,
            target: None,
            dest: None,
            hand: HandMode::Hidden,
            voice: None,
            spotlight: None,
            advance: AdvanceRule::After(3000.0),
            gates: GateSet::default(),
        }
    }

    pub fn caption(mut self, text: &'static str) -> Self {
        self.caption = Some(text);
        self
    }

    pub fn target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn dest(mut self, dest: TargetRef) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn hand(mut self, hand: HandMode) -> Self {
        self.hand = hand;
        self
    }

    pub fn voice(mut self, cue: SoundCue) -> Self {
        self.voice = Some(cue);
        self
    }

    pub fn spotlight(mut self, radius: f32) -> Self {
        self.spotlight = Some(radius);
        self
    }

    pub fn advance(mut self, rule: AdvanceRule) -> Self {
        self.advance = rule;
        self
    }

    pub fn tap_gate(mut self, gate: Gate) -> Self {
        self.gates.tap = gate;
        self
    }

    pub fn drag_gate(mut self, gate: Gate) -> Self {
        self.gates.drag = gate;
        self
    }

    pub fn command_gate(mut self, gate: Gate) -> Self {
        self.gates.command = gate;
        self
    }
}

/// A complete tutorial: the persistence key plus the ordered steps.
#[derive(Debug, Clone)]
pub struct TutorialScript {
    pub flag_key: &'static str,
    pub steps: Vec<TutorialStep>,
}

impl TutorialScript {
    pub fn new(flag_key: &'static str) -> Self {
        Self { flag_key, steps: Vec::new() }
    }

    pub fn step(mut self, step: TutorialStep) -> Self {
        self.steps.push(step);
        self
    }
}

/// Spotlight circle for the host to dim everything outside of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub center: Vec2,
    pub radius: f32,
}

/// Demonstration hand pose. `press` runs 0 (hovering) to 1 (pressed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub pos: Vec2,
    pub press: f32,
}

/// Everything the host needs to draw the tutorial layer this frame.
#[derive(Debug, Clone, Default)]
pub struct TutorialOverlay {
    pub visible: bool,
    pub caption: Option<&'static str>,
    pub spotlight: Option<Spotlight>,
    pub hand: Option<HandPose>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Running(usize),
    Finished,
}

/// Walks a [`TutorialScript`], gates input, and animates the overlay.
#[derive(Debug)]
pub struct Tutorial {
    phase: Phase,
    script: Option<TutorialScript>,
    step_started_ms: f64,
    /// Restarted by [`Tutorial::nudge`] without touching the step clock.
    cycle_started_ms: f64,
    overlay: TutorialOverlay,
}

const TAP_CYCLE_MS: f64 = 900.0;
const DRAG_CYCLE_MS: f64 = 1600.0;

impl Tutorial {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            script: None,
            step_started_ms: 0.0,
            cycle_started_ms: 0.0,
            overlay: TutorialOverlay::default(),
        }
    }

    /// Install the script to run on the next [`Tutorial::start`].
    pub fn install(&mut self, script: TutorialScript) {
        self.script = Some(script);
        self.phase = Phase::Idle;
    }

    /// Begin the script unless this player has already seen it.
    /// Without an installed script the tutorial stays inert.
    pub fn start(
        &mut self,
        now: f64,
        flags: &dyn FlagStore,
        events: &mut Vec<GameEvent>,
        sounds: &mut Vec<SoundCue>,
        config: &GameConfig,
    ) {
        if self.phase != Phase::Idle {
            return;
        }
        let flag_key = match self.script.as_ref() {
            Some(script) if !script.steps.is_empty() => script.flag_key,
            _ => return,
        };
        let seen = flags
            .get(flag_key)
            .map(|v| is_truthy(flag_key, &v))
            .unwrap_or(false);
        if seen {
            // Quiet exit: no event, no re-write of the flag.
            self.phase = Phase::Finished;
            return;
        }
        self.phase = Phase::Running(0);
        self.enter_step(0, now, events, sounds, config);
    }

    /// Per-frame pass: advance the step if its rule is satisfied, then
    /// rebuild the overlay. Runs late in the frame so the advance rule
    /// sees every event the frame produced.
    pub fn frame(
        &mut self,
        now: f64,
        store: &EntityStore,
        zones: &ZoneSet,
        viewport: &Viewport,
        flags: &mut dyn FlagStore,
        events: &mut Vec<GameEvent>,
        sounds: &mut Vec<SoundCue>,
        config: &GameConfig,
    ) {
        let index = match self.phase {
            Phase::Running(i) => i,
            _ => {
                self.overlay = TutorialOverlay::default();
                return;
            }
        };
        let (rule, step_count) = match self.script.as_ref() {
            Some(script) if index < script.steps.len() => {
                (script.steps[index].advance, script.steps.len())
            }
            _ => {
                self.overlay = TutorialOverlay::default();
                return;
            }
        };

        let elapsed = now - self.step_started_ms;
        let advance = match rule {
            AdvanceRule::After(ms) => elapsed >= ms,
            AdvanceRule::On(kind) => events.iter().any(|e| e.kind() == kind),
            AdvanceRule::OnOrAfter(kind, ms) => {
                elapsed >= ms || events.iter().any(|e| e.kind() == kind)
            }
        };
        if advance {
            if index + 1 >= step_count {
                self.finish(flags, events, config.max_events);
            } else {
                self.phase = Phase::Running(index + 1);
                self.enter_step(index + 1, now, events, sounds, config);
            }
        }

        self.refresh_overlay(now, store, zones, viewport);
    }

    /// Restart the hint animation from its attention-grabbing start.
    /// The step clock keeps running; only the cycle resets.
    pub fn nudge(&mut self, now: f64, events: &mut Vec<GameEvent>, max_events: usize) {
        let index = match self.phase {
            Phase::Running(i) => i,
            _ => return,
        };
        self.cycle_started_ms = now;
        push_event_capped(events, max_events, GameEvent::HintReplayed { index });
    }

    /// Abandon the rest of the script, persisting the seen flag as if it
    /// had completed.
    pub fn skip(
        &mut self,
        flags: &mut dyn FlagStore,
        events: &mut Vec<GameEvent>,
        max_events: usize,
    ) {
        if matches!(self.phase, Phase::Running(_)) {
            self.finish(flags, events, max_events);
        }
    }

    /// Reset to idle, keeping the installed script. Used at shutdown.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.overlay = TutorialOverlay::default();
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Index of the live step, if the tutorial is running.
    pub fn step_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Running(i) => Some(i),
            _ => None,
        }
    }

    /// The overlay computed by the last frame pass.
    pub fn overlay(&self) -> &TutorialOverlay {
        &self.overlay
    }

    // -- Input gating --

    /// May this entity be tapped right now?
    pub fn allows_tap(&self, entity: &Entity) -> bool {
        match self.step() {
            Some(step) => match step.gates.tap {
                Gate::Open => true,
                Gate::Closed => false,
                Gate::TargetOnly => self.is_step_target(entity),
            },
            None => true,
        }
    }

    /// May this entity be dragged right now?
    pub fn allows_drag(&self, entity: &Entity) -> bool {
        match self.step() {
            Some(step) => match step.gates.drag {
                Gate::Open => true,
                Gate::Closed => false,
                Gate::TargetOnly => self.is_step_target(entity),
            },
            None => true,
        }
    }

    /// May this host command pass right now?
    pub fn allows_command(&self, _command: u32) -> bool {
        match self.step() {
            Some(step) => step.gates.command == Gate::Open,
            None => true,
        }
    }

    // -- Internals --

    fn step(&self) -> Option<&TutorialStep> {
        match self.phase {
            Phase::Running(i) => self.script.as_ref().and_then(|s| s.steps.get(i)),
            _ => None,
        }
    }

    fn is_step_target(&self, entity: &Entity) -> bool {
        match self.step().and_then(|s| s.target.as_ref()) {
            Some(TargetRef::FirstOfKind(kind)) => entity.kind == *kind,
            Some(TargetRef::WithPayload(payload)) => entity.payload() == Some(*payload),
            _ => false,
        }
    }

    fn enter_step(
        &mut self,
        index: usize,
        now: f64,
        events: &mut Vec<GameEvent>,
        sounds: &mut Vec<SoundCue>,
        config: &GameConfig,
    ) {
        self.step_started_ms = now;
        self.cycle_started_ms = now;
        let (name, voice) = match self.script.as_ref().and_then(|s| s.steps.get(index)) {
            Some(step) => (step.name, step.voice),
            None => return,
        };
        push_event_capped(events, config.max_events, GameEvent::TutorialStep { index, name });
        if let Some(cue) = voice {
            push_sound_capped(sounds, config.max_sounds, cue);
        }
    }

    fn finish(&mut self, flags: &mut dyn FlagStore, events: &mut Vec<GameEvent>, max_events: usize) {
        self.phase = Phase::Finished;
        self.overlay = TutorialOverlay::default();
        if let Some(key) = self.script.as_ref().map(|s| s.flag_key) {
            flags.set(key, Value::Bool(true));
        }
        push_event_capped(events, max_events, GameEvent::TutorialFinished);
    }

    fn refresh_overlay(&mut self, now: f64, store: &EntityStore, zones: &ZoneSet, vp: &Viewport) {
        let index = match self.phase {
            Phase::Running(i) => i,
            _ => {
                self.overlay = TutorialOverlay::default();
                return;
            }
        };
        let overlay = match self.script.as_ref().and_then(|s| s.steps.get(index)) {
            Some(step) => {
                let cycle = now - self.cycle_started_ms;
                let target = step.target.as_ref().and_then(|t| t.resolve(store, zones, vp));
                // A target that is not on the playfield right now hides the
                // hand and spotlight; the step clock keeps running.
                let spotlight = match (target, step.spotlight) {
                    (Some(center), Some(radius)) => Some(Spotlight { center, radius }),
                    _ => None,
                };
                let hand = match step.hand {
                    HandMode::Hidden => None,
                    HandMode::Tap => target.map(|pos| tap_pose(pos, cycle)),
                    HandMode::DragLoop => {
                        let dest = step.dest.as_ref().and_then(|t| t.resolve(store, zones, vp));
                        match (target, dest) {
                            (Some(from), Some(to)) => Some(drag_pose(from, to, cycle)),
                            _ => None,
                        }
                    }
                };
                TutorialOverlay { visible: true, caption: step.caption, spotlight, hand }
            }
            None => TutorialOverlay::default(),
        };
        self.overlay = overlay;
    }
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand hovering on the target, pulsing one press per cycle.
fn tap_pose(pos: Vec2, cycle_ms: f64) -> HandPose {
    let t = ((cycle_ms % TAP_CYCLE_MS) / TAP_CYCLE_MS) as f32;
    let press = if t < 0.35 {
        (t / 0.35 * std::f32::consts::PI).sin()
    } else {
        0.0
    };
    HandPose { pos, press }
}

/// Hand looping press at `from`, eased carry to `to`, release, rest.
fn drag_pose(from: Vec2, to: Vec2, cycle_ms: f64) -> HandPose {
    let t = ((cycle_ms % DRAG_CYCLE_MS) / DRAG_CYCLE_MS) as f32;
    if t < 0.15 {
        HandPose { pos: from, press: t / 0.15 }
    } else if t < 0.75 {
        let s = Easing::CubicInOut.apply((t - 0.15) / 0.6);
        HandPose { pos: from.lerp(to, s), press: 1.0 }
    } else if t < 0.9 {
        HandPose { pos: to, press: (0.9 - t) / 0.15 }
    } else {
        HandPose { pos: to, press: 0.0 }
    }
}
