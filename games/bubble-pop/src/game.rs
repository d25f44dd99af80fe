use tot_engine::*;

// World and bubble tuning
const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 600.0;
const BUBBLE: EntityKind = EntityKind(1);
const BUBBLE_SIZE: f32 = 64.0;
const FALL_DURATION_MS: f32 = 6000.0;
const WOBBLE_AMP: f32 = 12.0;
const WOBBLE_HZ: f32 = 0.4;
const SPAWN_INTERVAL_MS: f64 = 700.0;
const FIRST_WAVE: usize = 3;

// Round structure
const NUMBER_MIN: u32 = 1;
const NUMBER_MAX: u32 = 9;
const POPS_PER_ROUND: u32 = 5;

// Sound cues (host clip table)
const SND_POP: SoundCue = SoundCue(1);
const SND_WRONG: SoundCue = SoundCue(2);
const SND_NEW_TARGET: SoundCue = SoundCue(3);
const SND_WELCOME: SoundCue = SoundCue(10);
const SND_FIND: SoundCue = SoundCue(11);

// Session event kinds (game → host UI)
pub const EV_SCORE: u32 = 1;
pub const EV_NEW_TARGET: u32 = 2;

const TUTORIAL_SEEN: &str = "bubble_pop_tutorial_seen";

const POP_BURST: ExplosionParams = ExplosionParams {
    count: 60,
    speed: 4.5,
    size_min: 3.0,
    size_max: 6.5,
    life_frames: 48,
};

const SPAWN_RULES: SpawnRules = SpawnRules {
    max_active: 6,
    target_ratio: 0.35,
    streak_limit: 2,
    min_separation: 90.0,
    placement_attempts: 12,
};

/// Bubbles rain from the top, each showing a number. The child pops the
/// ones matching the current target; after enough pops the target moves
/// to a new number.
pub struct BubblePop {
    target: u32,
    score: u32,
    round_pops: u32,
    spawn_timer: Option<u32>,
}

impl BubblePop {
    pub fn new() -> Self {
        Self {
            target: NUMBER_MIN,
            score: 0,
            round_pops: 0,
            spawn_timer: None,
        }
    }

    /// The number the child is currently hunting.
    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn roll_target(rng: &mut Rng, current: Option<u32>) -> u32 {
        loop {
            let n = NUMBER_MIN + rng.next_int(NUMBER_MAX - NUMBER_MIN + 1);
            if current != Some(n) {
                return n;
            }
        }
    }

    fn spawn_bubble(&self, ctx: &mut EngineContext) {
        let decoys: Vec<Payload> = (NUMBER_MIN..=NUMBER_MAX)
            .filter(|n| *n != self.target)
            .map(Payload::Number)
            .collect();
        let req = SpawnRequest {
            kind: BUBBLE,
            size: BUBBLE_SIZE,
            layer: Layer::Playfield,
            draggable: false,
            target: Payload::Number(self.target),
            decoys: &decoys,
            fall: Some(FallSpec {
                duration_ms: FALL_DURATION_MS,
                wobble_amp: WOBBLE_AMP,
                wobble_hz: WOBBLE_HZ,
            }),
        };
        if ctx.spawn_ruled(&req, &SPAWN_RULES).is_none() {
            log::debug!("bubble cap reached, spawn skipped");
        }
    }

    fn on_tap(&mut self, ctx: &mut EngineContext, id: EntityId, number: u32) {
        if number != self.target {
            ctx.start_shake(id);
            ctx.emit_sound(SND_WRONG);
            return;
        }

        ctx.explode(id, &POP_BURST);
        ctx.emit_sound(SND_POP);
        self.score += 1;
        self.round_pops += 1;
        ctx.emit_event(GameEvent::Session {
            kind: EV_SCORE,
            a: self.score as f32,
            b: self.target as f32,
        });

        if self.round_pops >= POPS_PER_ROUND {
            self.round_pops = 0;
            self.target = Self::roll_target(&mut ctx.rng, Some(self.target));
            ctx.emit_sound(SND_NEW_TARGET);
            ctx.emit_event(GameEvent::Session {
                kind: EV_NEW_TARGET,
                a: self.target as f32,
                b: 0.0,
            });
            log::info!("bubble-pop: new target {}", self.target);
        }
    }
}

impl Default for BubblePop {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for BubblePop {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.target = Self::roll_target(&mut ctx.rng, None);
        self.score = 0;
        self.round_pops = 0;

        for _ in 0..FIRST_WAVE {
            self.spawn_bubble(ctx);
        }
        self.spawn_timer = Some(ctx.schedule_timer(SPAWN_INTERVAL_MS));
        log::info!("bubble-pop: round started, target {}", self.target);
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        let events = ctx.events.clone();
        for event in events {
            match event {
                GameEvent::TimerFired { token } if self.spawn_timer == Some(token) => {
                    self.spawn_bubble(ctx);
                    self.spawn_timer = Some(ctx.schedule_timer(SPAWN_INTERVAL_MS));
                }
                GameEvent::EntityTapped {
                    id,
                    payload: Some(Payload::Number(n)),
                    ..
                } => {
                    self.on_tap(ctx, id, n);
                }
                _ => {}
            }
        }
    }

    fn tutorial(&self) -> Option<TutorialScript> {
        Some(
            TutorialScript::new(TUTORIAL_SEEN)
                .step(
                    TutorialStep::new("welcome")
                        .caption("Pop the bubble with the right number!")
                        .voice(SND_WELCOME)
                        .advance(AdvanceRule::After(2200.0))
                        .tap_gate(Gate::Closed)
                        .drag_gate(Gate::Closed),
                )
                .step(
                    TutorialStep::new("pop-the-number")
                        .caption("Tap it!")
                        .target(TargetRef::WithPayload(Payload::Number(self.target)))
                        .hand(HandMode::Tap)
                        .voice(SND_FIND)
                        .spotlight(70.0)
                        .advance(AdvanceRule::On(EventKind::EntityTapped))
                        .tap_gate(Gate::TargetOnly)
                        .drag_gate(Gate::Closed),
                ),
        )
    }
}
