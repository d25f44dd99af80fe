use crate::api::types::{EntityId, GameEvent, SoundCue, ZoneId};
use crate::components::entity::{Entity, Lifecycle, Shake};
use crate::components::explosion::{Explosion, ExplosionParams};
use crate::components::zone::{DropZone, ZoneSet};
use crate::core::rng::Rng;
use crate::core::store::{EntityStore, SpawnRequest, SpawnRules};
use crate::core::timer::TimerQueue;
use crate::core::viewport::Viewport;
use crate::extensions::easing::Easing;
use crate::extensions::tween::{FinishAction, Tween, TweenState};
use crate::services::flags::{FlagStore, MemoryFlags};
use crate::systems::tutorial::Tutorial;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Seed for every random decision. Same seed + same input = same session.
    pub seed: u64,
    /// Initial world width in game units.
    pub world_width: f32,
    /// Initial world height in game units.
    pub world_height: f32,
    /// Pointer travel (world units) that turns a press into a drag.
    pub drag_threshold: f32,
    /// Scale bump applied to an entity while it is held.
    pub drag_scale: f32,
    /// Opacity other draggables dim to while something is held.
    pub sibling_dim_alpha: f32,
    /// Flight time of a rejected item back to its home position.
    pub return_duration_ms: f32,
    /// Length of the wrong-item refusal shake.
    pub shake_duration_ms: f32,
    /// Maximum number of game events per frame (default: 64).
    pub max_events: usize,
    /// Maximum number of sound cues per frame (default: 32).
    pub max_sounds: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_width: 800.0,
            world_height: 600.0,
            drag_threshold: 8.0,
            drag_scale: 1.12,
            sibling_dim_alpha: 0.45,
            return_duration_ms: 300.0,
            shake_duration_ms: 500.0,
            max_events: 64,
            max_sounds: 32,
        }
    }
}

/// The core contract every mini-game fulfills.
pub trait MiniGame {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Set up the round: spawn entities, add zones, schedule timers.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The per-frame game step. React to events, advance rounds,
    /// spawn/despawn entities.
    fn update(&mut self, ctx: &mut EngineContext);

    /// The tutorial script for first-launch guidance, if the game has one.
    fn tutorial(&self) -> Option<crate::systems::tutorial::TutorialScript> {
        None
    }
}

pub(crate) fn push_event_capped(events: &mut Vec<GameEvent>, max: usize, event: GameEvent) {
    if events.len() < max {
        events.push(event);
    } else {
        log::warn!("event queue full ({}), dropping {:?}", max, event);
    }
}

pub(crate) fn push_sound_capped(sounds: &mut Vec<SoundCue>, max: usize, cue: SoundCue) {
    if sounds.len() < max {
        sounds.push(cue);
    } else {
        log::warn!("sound queue full ({}), dropping cue {}", max, cue.0);
    }
}

/// Mutable access to engine state, passed to MiniGame::init and update.
///
/// Everything lives on one thread; systems run in a fixed order inside
/// the tick, so there is no locking anywhere.
pub struct EngineContext {
    pub store: EntityStore,
    pub zones: ZoneSet,
    pub tweens: TweenState,
    pub timers: TimerQueue,
    pub tutorial: Tutorial,
    pub rng: Rng,
    pub viewport: Viewport,
    pub flags: Box<dyn FlagStore>,
    pub sounds: Vec<SoundCue>,
    pub events: Vec<GameEvent>,
    pub config: GameConfig,
    now_ms: f64,
}

impl EngineContext {
    pub fn new(config: GameConfig) -> Self {
        Self::with_flags(config, Box::new(MemoryFlags::new()))
    }

    /// Create a context with host-provided flag storage.
    pub fn with_flags(config: GameConfig, flags: Box<dyn FlagStore>) -> Self {
        let rng = Rng::new(config.seed);
        let viewport = Viewport::new(config.world_width, config.world_height);
        Self {
            store: EntityStore::new(),
            zones: ZoneSet::new(),
            tweens: TweenState::new(),
            timers: TimerQueue::new(),
            tutorial: Tutorial::new(),
            rng,
            viewport,
            flags,
            sounds: Vec::new(),
            events: Vec::new(),
            config,
            now_ms: 0.0,
        }
    }

    /// Timestamp of the current frame.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Clear per-frame transient data and advance the frame clock.
    pub(crate) fn begin_frame(&mut self, now_ms: f64) {
        self.sounds.clear();
        self.events.clear();
        self.now_ms = now_ms;
    }

    /// The host canvas changed size: adopt it and relayout every zone.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.set(width, height);
        let Self { zones, viewport, .. } = self;
        zones.relayout_all(viewport);
    }

    /// Emit a game event for the game and the host UI.
    pub fn emit_event(&mut self, event: GameEvent) {
        push_event_capped(&mut self.events, self.config.max_events, event);
    }

    /// Emit a fire-and-forget sound cue.
    pub fn emit_sound(&mut self, cue: SoundCue) {
        push_sound_capped(&mut self.sounds, self.config.max_sounds, cue);
    }

    // -- Entity convenience methods --

    /// Add an entity to the store. Returns the assigned id.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        self.store.spawn(entity)
    }

    /// Spawn under cap/anti-streak/separation rules.
    /// Returns None when the per-kind cap refuses the spawn.
    pub fn spawn_ruled(&mut self, req: &SpawnRequest, rules: &SpawnRules) -> Option<EntityId> {
        let now = self.now_ms;
        let Self { store, rng, viewport, .. } = self;
        store.spawn_ruled(req, rules, viewport, rng, now)
    }

    /// Remove an entity, cleaning up any tweens attached to it.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.tweens.remove_entity(id);
        self.store.despawn(id)
    }

    /// Burst an entity into particles. It stays in the store, untouchable,
    /// until the last particle dies. Returns false if the entity is gone
    /// or already bursting.
    pub fn explode(&mut self, id: EntityId, params: &ExplosionParams) -> bool {
        let Self { store, rng, events, config, .. } = self;
        let entity = match store.get_mut(id) {
            Some(e) => e,
            None => return false,
        };
        if entity.state == Lifecycle::Exploding {
            return false;
        }
        entity.state = Lifecycle::Exploding;
        entity.fall = None;
        entity.shake = None;
        entity.explosion = Some(Explosion::burst(entity.pos, params, rng));
        let at = entity.pos;
        push_event_capped(events, config.max_events, GameEvent::ExplosionTriggered { id, at });
        true
    }

    /// Play the refusal shake on an entity, in place.
    pub fn start_shake(&mut self, id: EntityId) -> bool {
        let now = self.now_ms;
        let duration = self.config.shake_duration_ms;
        match self.store.get_mut(id) {
            Some(e) => {
                e.shake = Some(Shake::new(e.pos, now, duration, Shake::DEFAULT_AMPLITUDE, Shake::DEFAULT_CYCLES));
                true
            }
            None => false,
        }
    }

    /// Send an entity flying back to its home position. It settles to its
    /// home layer and goes Active when the flight lands.
    pub fn return_home(&mut self, id: EntityId) -> bool {
        let now = self.now_ms;
        let Self { store, tweens, config, .. } = self;
        let entity = match store.get_mut(id) {
            Some(e) => e,
            None => return false,
        };
        entity.state = Lifecycle::Returning;
        tweens.add(
            entity.id,
            Tween::position(entity.pos, entity.home, config.return_duration_ms, Easing::CubicOut)
                .with_finish(FinishAction::SettleHome),
            now,
        );
        true
    }

    // -- Zone and timer convenience methods --

    /// Add a drop zone, laid out against the current viewport.
    pub fn add_zone(&mut self, mut zone: DropZone) -> ZoneId {
        zone.relayout(&self.viewport);
        self.zones.add(zone)
    }

    /// Schedule a one-shot timer; a `TimerFired` event carries the token back.
    pub fn schedule_timer(&mut self, delay_ms: f64) -> u32 {
        self.timers.schedule(self.now_ms, delay_ms)
    }

    pub fn cancel_timer(&mut self, token: u32) -> bool {
        self.timers.cancel(token)
    }

    // -- Tutorial convenience methods --

    /// Skip the rest of the tutorial and persist the seen flag.
    pub fn skip_tutorial(&mut self) {
        let Self { tutorial, flags, events, config, .. } = self;
        tutorial.skip(flags.as_mut(), events, config.max_events);
    }

    /// Restart the current hint animation from its attention-grabbing start.
    pub fn nudge_tutorial(&mut self) {
        let now = self.now_ms;
        let Self { tutorial, events, config, .. } = self;
        tutorial.nudge(now, events, config.max_events);
    }

    // -- Frame phases, called by the runner --

    pub(crate) fn start_tutorial(&mut self) {
        let now = self.now_ms;
        let Self { tutorial, flags, events, sounds, config, .. } = self;
        tutorial.start(now, flags.as_ref(), events, sounds, config);
    }

    pub(crate) fn tick_tweens(&mut self) {
        let now = self.now_ms;
        let Self { tweens, store, events, config, .. } = self;
        tweens.tick(now, store, events, config.max_events);
    }

    pub(crate) fn tick_timers(&mut self) {
        let now = self.now_ms;
        let Self { timers, events, config, .. } = self;
        timers.tick(now, events, config.max_events);
    }

    pub(crate) fn tick_tutorial(&mut self) {
        let now = self.now_ms;
        let Self { tutorial, store, zones, viewport, flags, events, sounds, config, .. } = self;
        tutorial.frame(now, store, zones, viewport, flags.as_mut(), events, sounds, config);
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
