use glam::Vec2;
use tot_engine::*;

// World and layout
const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 600.0;
const TILE: EntityKind = EntityKind(1);
const CAR: EntityKind = EntityKind(2);
const LOCO: EntityKind = EntityKind(3);
const TILE_SIZE: f32 = 84.0;
const CAR_SIZE: f32 = 110.0;
const LOCO_SIZE: f32 = 120.0;

// The train rides a fractional track so a resize relayouts the cars.
const LOCO_FX: f32 = 0.10;
const CAR_FX0: f32 = 0.26;
const CAR_FDX: f32 = 0.16;
const CAR_FY: f32 = 0.40;
const CAR_FW: f32 = 0.14;
const CAR_FH: f32 = 0.20;

// Loose tiles sit in a chunky row along the bottom. Neighbors overlap a
// little; a press in the overlap grabs the top (newest) tile.
const TILE_ROW_X: f32 = 160.0;
const TILE_ROW_DX: f32 = 78.0;
const TILE_ROW_Y: f32 = 505.0;

const BASE_CARS: usize = 3;
const MAX_CARS: usize = 5;
const DEPART_MS: f32 = 1200.0;
const NEXT_ROUND_DELAY_MS: f64 = 1500.0;

// Sound cues (host clip table)
const SND_SEAT: SoundCue = SoundCue(1);
const SND_WRONG: SoundCue = SoundCue(2);
const SND_DEPART: SoundCue = SoundCue(3);
const SND_WELCOME: SoundCue = SoundCue(10);
const SND_DRAG_HINT: SoundCue = SoundCue(11);

// Session event kinds (game → host UI)
pub const EV_TILE_SEATED: u32 = 1;
pub const EV_TRAIN_DEPARTED: u32 = 2;
pub const EV_NEW_ROUND: u32 = 3;

const TUTORIAL_SEEN: &str = "number_train_tutorial_seen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Tiles are being dragged into their cars.
    Boarding,
    /// Every car is full; the train rolls off and the next round loads.
    Departing,
}

/// A counting train: cars numbered left to right, number tiles shuffled
/// below. Seat every tile in its car and the train pulls away, coming
/// back one car longer.
pub struct NumberTrain {
    phase: Phase,
    round: u32,
    cars: usize,
    seated: usize,
    depart_timer: Option<u32>,
}

fn cars_for(round: u32) -> usize {
    (BASE_CARS + round.saturating_sub(1) as usize).min(MAX_CARS)
}

fn car_anchor(slot: usize) -> Anchor {
    Anchor::fraction(CAR_FX0 + slot as f32 * CAR_FDX, CAR_FY, CAR_FW, CAR_FH)
}

fn car_pos(slot: usize, vp: &Viewport) -> Vec2 {
    vp.at(CAR_FX0 + slot as f32 * CAR_FDX, CAR_FY)
}

fn tile_slot_pos(slot: usize) -> Vec2 {
    Vec2::new(TILE_ROW_X + slot as f32 * TILE_ROW_DX, TILE_ROW_Y)
}

impl NumberTrain {
    pub fn new() -> Self {
        Self {
            phase: Phase::Boarding,
            round: 1,
            cars: BASE_CARS,
            seated: 0,
            depart_timer: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Cars on the track this round.
    pub fn cars(&self) -> usize {
        self.cars
    }

    pub fn seated(&self) -> usize {
        self.seated
    }

    fn shuffled_numbers(&self, rng: &mut Rng) -> Vec<u32> {
        let mut numbers: Vec<u32> = (1..=self.cars as u32).collect();
        for i in (1..numbers.len()).rev() {
            let j = rng.next_int(i as u32 + 1) as usize;
            numbers.swap(i, j);
        }
        numbers
    }

    fn setup_round(&mut self, ctx: &mut EngineContext) {
        ctx.store.clear();
        ctx.tweens.clear();
        ctx.zones.clear();

        self.cars = cars_for(self.round);
        self.seated = 0;
        self.phase = Phase::Boarding;
        self.depart_timer = None;

        let vp = ctx.viewport;
        ctx.spawn(
            Entity::new(LOCO)
                .with_pos(vp.at(LOCO_FX, CAR_FY))
                .with_size(LOCO_SIZE)
                .with_layer(Layer::Scenery),
        );
        for slot in 0..self.cars {
            let number = slot as u32 + 1;
            ctx.spawn(
                Entity::new(CAR)
                    .with_pos(car_pos(slot, &vp))
                    .with_size(CAR_SIZE)
                    .with_layer(Layer::Scenery),
            );
            ctx.add_zone(
                DropZone::new(
                    ZoneId(number),
                    ZoneAccept::Payload(Payload::Number(number)),
                    car_anchor(slot),
                )
                .with_label("car")
                .with_capacity(1),
            );
        }

        for (slot, n) in self.shuffled_numbers(&mut ctx.rng).iter().enumerate() {
            ctx.spawn(
                Entity::new(TILE)
                    .with_pos(tile_slot_pos(slot))
                    .with_size(TILE_SIZE)
                    .draggable()
                    .with_payload(Payload::Number(*n)),
            );
        }

        log::info!("number-train: round {} with {} cars", self.round, self.cars);
    }

    fn on_tile_seated(&mut self, ctx: &mut EngineContext, zone: ZoneId, number: u32) {
        self.seated += 1;
        ctx.emit_sound(SND_SEAT);
        ctx.emit_event(GameEvent::Session {
            kind: EV_TILE_SEATED,
            a: number as f32,
            b: self.cars as f32,
        });

        // The dropped tile was consumed by the zone; a rider copy takes
        // its seat in the car. Not draggable, so it stays put.
        if let Some(seat) = ctx.zones.get(zone).map(|z| z.rect.center()) {
            ctx.spawn(
                Entity::new(TILE)
                    .with_pos(seat)
                    .with_size(TILE_SIZE)
                    .with_payload(Payload::Number(number)),
            );
        }

        if self.seated == self.cars {
            self.depart(ctx);
        }
    }

    fn depart(&mut self, ctx: &mut EngineContext) {
        self.phase = Phase::Departing;
        let now = ctx.now_ms();
        let shift = Vec2::new(ctx.viewport.width + 200.0, 0.0);
        let riders: Vec<(EntityId, Vec2)> = ctx.store.iter().map(|e| (e.id, e.pos)).collect();
        for (id, pos) in riders {
            ctx.tweens.add(
                id,
                Tween::position(pos, pos + shift, DEPART_MS, Easing::CubicIn),
                now,
            );
        }
        self.depart_timer = Some(ctx.schedule_timer(NEXT_ROUND_DELAY_MS));

        ctx.emit_sound(SND_DEPART);
        ctx.emit_event(GameEvent::Session {
            kind: EV_TRAIN_DEPARTED,
            a: self.round as f32,
            b: self.cars as f32,
        });
        log::info!(
            "number-train: round {} departs with {} riders",
            self.round,
            self.seated
        );
    }

    fn next_round(&mut self, ctx: &mut EngineContext) {
        self.depart_timer = None;
        self.round += 1;
        self.setup_round(ctx);
        ctx.emit_event(GameEvent::Session {
            kind: EV_NEW_ROUND,
            a: self.round as f32,
            b: self.cars as f32,
        });
    }
}

impl Default for NumberTrain {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for NumberTrain {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.setup_round(ctx);
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        let events = ctx.events.clone();
        for event in events {
            match event {
                GameEvent::DropAccepted {
                    zone,
                    payload: Some(Payload::Number(n)),
                    ..
                } if self.phase == Phase::Boarding => {
                    self.on_tile_seated(ctx, zone, n);
                }
                GameEvent::DropRejected {
                    reason: RejectReason::WrongItem,
                    ..
                } => {
                    ctx.emit_sound(SND_WRONG);
                }
                GameEvent::TimerFired { token } if self.depart_timer == Some(token) => {
                    self.next_round(ctx);
                }
                _ => {}
            }
        }
    }

    fn tutorial(&self) -> Option<TutorialScript> {
        // Round one always has car 1, so the script can point at it
        // unconditionally. Seating any tile advances; if nothing lands
        // for a while the guide steps aside on its own.
        Some(
            TutorialScript::new(TUTORIAL_SEEN)
                .step(
                    TutorialStep::new("welcome")
                        .caption("All aboard the number train!")
                        .voice(SND_WELCOME)
                        .advance(AdvanceRule::After(2200.0))
                        .tap_gate(Gate::Closed)
                        .drag_gate(Gate::Closed)
                        .command_gate(Gate::Closed),
                )
                .step(
                    TutorialStep::new("seat-number-one")
                        .caption("Number 1 goes in the first car!")
                        .target(TargetRef::WithPayload(Payload::Number(1)))
                        .dest(TargetRef::Zone(ZoneId(1)))
                        .hand(HandMode::DragLoop)
                        .voice(SND_DRAG_HINT)
                        .spotlight(80.0)
                        .advance(AdvanceRule::OnOrAfter(EventKind::DropAccepted, 12_000.0))
                        .tap_gate(Gate::Closed)
                        .drag_gate(Gate::TargetOnly)
                        .command_gate(Gate::Closed),
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const FRAME_MS: f64 = 50.0;

    fn quiet_runner() -> GameRunner<NumberTrain> {
        let mut flags = MemoryFlags::new();
        flags.set(TUTORIAL_SEEN, Value::Bool(true));
        let mut runner = GameRunner::with_flags(NumberTrain::new(), Box::new(flags));
        runner.init();
        runner
    }

    fn run_frames(runner: &mut GameRunner<NumberTrain>, clock: &mut f64, frames: u32) {
        for _ in 0..frames {
            *clock += FRAME_MS;
            runner.tick(*clock);
        }
    }

    fn drag(runner: &mut GameRunner<NumberTrain>, clock: &mut f64, from: Vec2, to: Vec2) {
        runner.push_input(InputEvent::PointerDown { x: from.x, y: from.y });
        run_frames(runner, clock, 1);
        let mid = from.lerp(to, 0.5);
        runner.push_input(InputEvent::PointerMove { x: mid.x, y: mid.y });
        runner.push_input(InputEvent::PointerMove { x: to.x, y: to.y });
        runner.push_input(InputEvent::PointerUp { x: to.x, y: to.y });
        run_frames(runner, clock, 1);
    }

    /// Position of the loose (still draggable) tile showing `n`.
    fn tile_pos(runner: &GameRunner<NumberTrain>, n: u32) -> Vec2 {
        runner
            .ctx()
            .store
            .active()
            .find(|e| e.draggable && e.payload() == Some(Payload::Number(n)))
            .map(|e| e.pos)
            .expect("a loose tile with that number")
    }

    fn car_center(runner: &GameRunner<NumberTrain>, number: u32) -> Vec2 {
        runner
            .ctx()
            .zones
            .get(ZoneId(number))
            .expect("car zone exists")
            .rect
            .center()
    }

    fn seat_all(runner: &mut GameRunner<NumberTrain>, clock: &mut f64) {
        for n in 1..=runner.game().cars() as u32 {
            let from = tile_pos(runner, n);
            let to = car_center(runner, n);
            drag(runner, clock, from, to);
        }
    }

    #[test]
    fn each_number_rides_its_own_car() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);
        assert_eq!(runner.game().cars(), BASE_CARS);
        assert_eq!(runner.ctx().zones.len(), BASE_CARS);

        let from = tile_pos(&runner, 1);
        let to = car_center(&runner, 1);
        drag(&mut runner, &mut clock, from, to);

        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::DropAccepted {
                zone: ZoneId(1),
                payload: Some(Payload::Number(1)),
                ..
            }
        )));
        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::Session {
                kind: EV_TILE_SEATED,
                ..
            }
        )));
        assert!(runner.sounds().contains(&SND_SEAT));
        assert_eq!(runner.game().seated(), 1);

        // The rider copy sits at the car, out of the pointer's reach.
        let rider = runner.ctx().store.find_payload(Payload::Number(1)).unwrap();
        assert_eq!(rider.pos, to);
        assert!(!rider.draggable);
    }

    #[test]
    fn wrong_car_shakes_the_tile_home() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);

        let home = tile_pos(&runner, 2);
        let to = car_center(&runner, 1);
        drag(&mut runner, &mut clock, home, to);

        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::DropRejected {
                zone: Some(ZoneId(1)),
                reason: RejectReason::WrongItem,
                ..
            }
        )));
        assert!(runner.sounds().contains(&SND_WRONG));
        assert_eq!(runner.game().seated(), 0);

        // Shake, then the flight home.
        run_frames(&mut runner, &mut clock, 20);
        assert_eq!(tile_pos(&runner, 2), home);
    }

    #[test]
    fn cancel_mid_drag_sends_the_tile_home() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);

        let home = tile_pos(&runner, 1);
        runner.push_input(InputEvent::PointerDown { x: home.x, y: home.y });
        run_frames(&mut runner, &mut clock, 1);
        runner.push_input(InputEvent::PointerMove { x: 400.0, y: 420.0 });
        run_frames(&mut runner, &mut clock, 1);
        runner.push_input(InputEvent::PointerCancel);
        run_frames(&mut runner, &mut clock, 1);

        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::DropRejected {
                zone: None,
                reason: RejectReason::MissedZone,
                ..
            }
        )));

        run_frames(&mut runner, &mut clock, 10);
        assert_eq!(tile_pos(&runner, 1), home);
    }

    #[test]
    fn full_train_departs_and_grows() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);

        seat_all(&mut runner, &mut clock);
        assert_eq!(runner.game().phase(), Phase::Departing);
        assert!(runner.sounds().contains(&SND_DEPART));
        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::Session {
                kind: EV_TRAIN_DEPARTED,
                ..
            }
        )));
        // Loco, three cars, three riders all roll out together.
        assert_eq!(runner.ctx().tweens.len(), 7);

        run_frames(&mut runner, &mut clock, 10);
        let loco = runner.ctx().store.active().find(|e| e.kind == LOCO).unwrap();
        assert!(loco.pos.x > LOCO_FX * WORLD_W, "the engine pulls away");

        // Past the reload timer: a fresh, longer train.
        run_frames(&mut runner, &mut clock, 25);
        assert_eq!(runner.game().round(), 2);
        assert_eq!(runner.game().phase(), Phase::Boarding);
        assert_eq!(runner.game().cars(), BASE_CARS + 1);
        assert_eq!(runner.ctx().zones.len(), BASE_CARS + 1);
        assert_eq!(
            runner
                .ctx()
                .store
                .active()
                .filter(|e| e.kind == TILE && e.draggable)
                .count(),
            BASE_CARS + 1
        );
    }

    #[test]
    fn the_train_stops_growing_at_five_cars() {
        assert_eq!(cars_for(1), 3);
        assert_eq!(cars_for(3), 5);
        assert_eq!(cars_for(9), 5);
    }

    #[test]
    fn drops_still_land_after_a_resize() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);

        let before = car_center(&runner, 1);
        runner.resize(1000.0, 900.0);
        let after = car_center(&runner, 1);
        assert_ne!(before, after);
        assert_eq!(after, Vec2::new(CAR_FX0 * 1000.0, CAR_FY * 900.0));

        let from = tile_pos(&runner, 1);
        drag(&mut runner, &mut clock, from, after);
        assert!(runner
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::DropAccepted { .. })));
        assert_eq!(runner.game().seated(), 1);
    }

    #[test]
    fn overlapping_tiles_give_the_top_one() {
        let mut runner = quiet_runner();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);

        let mut tiles: Vec<(Vec2, u64, Option<Payload>)> = runner
            .ctx()
            .store
            .active()
            .filter(|e| e.kind == TILE && e.draggable)
            .map(|e| (e.pos, e.seq(), e.payload()))
            .collect();
        tiles.sort_by(|a, b| a.0.x.partial_cmp(&b.0.x).unwrap());
        let (left, right) = (tiles[0], tiles[1]);
        // The row spawns left to right, so the right neighbor is newer
        // and draws on top in their overlap band.
        assert!(right.1 > left.1);

        let mid = (left.0 + right.0) * 0.5;
        let n = right.2.unwrap().value();
        let to = car_center(&runner, n);
        drag(&mut runner, &mut clock, mid, to);

        assert!(runner.events().iter().any(|e| matches!(
            e,
            GameEvent::DropAccepted {
                payload: Some(Payload::Number(m)),
                ..
            } if *m == n
        )));
    }

    #[test]
    fn first_launch_walks_the_first_tile() {
        let mut runner = GameRunner::new(NumberTrain::new());
        runner.init();
        let mut clock = 0.0;
        run_frames(&mut runner, &mut clock, 1);
        assert!(runner.overlay().visible);

        // Drags are locked during the welcome.
        let from = tile_pos(&runner, 1);
        let to = car_center(&runner, 1);
        drag(&mut runner, &mut clock, from, to);
        assert!(!runner
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::DropAccepted { .. })));
        assert_eq!(runner.game().seated(), 0);

        // Past the welcome, only tile 1 may move.
        while clock < 2400.0 {
            run_frames(&mut runner, &mut clock, 1);
        }
        let from = tile_pos(&runner, 2);
        let to = car_center(&runner, 2);
        drag(&mut runner, &mut clock, from, to);
        assert_eq!(runner.game().seated(), 0);

        let from = tile_pos(&runner, 1);
        let to = car_center(&runner, 1);
        drag(&mut runner, &mut clock, from, to);
        assert!(runner.events().contains(&GameEvent::TutorialFinished));
        assert!(!runner.overlay().visible);
        assert_eq!(
            runner.ctx().flags.get(TUTORIAL_SEEN),
            Some(Value::Bool(true))
        );
        assert_eq!(runner.game().seated(), 1);
    }

    #[test]
    fn stalled_tutorial_lets_go_after_a_while() {
        let mut runner = GameRunner::new(NumberTrain::new());
        runner.init();
        let mut clock = 0.0;

        // Nothing gets seated; the guide step times out on its own.
        let mut finished_at = None;
        while clock < 16_000.0 {
            run_frames(&mut runner, &mut clock, 1);
            if runner.events().contains(&GameEvent::TutorialFinished) {
                finished_at = Some(clock);
                break;
            }
        }
        let finished_at = finished_at.expect("the guide eventually steps aside");
        assert!(finished_at >= 14_000.0, "welcome plus the full guide wait");
        assert!(!runner.overlay().visible);

        // Everything unlocks afterwards.
        let from = tile_pos(&runner, 2);
        let to = car_center(&runner, 2);
        drag(&mut runner, &mut clock, from, to);
        assert_eq!(runner.game().seated(), 1);
    }
}
