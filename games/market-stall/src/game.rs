use glam::Vec2;
use tot_engine::*;

// World and layout
const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 600.0;
const GOODS: EntityKind = EntityKind(1);
const COIN: EntityKind = EntityKind(2);
const GOODS_SIZE: f32 = 90.0;
const COIN_SIZE: f32 = 56.0;
const SHELF_COLS: usize = 3;

const BASKET_ZONE: ZoneId = ZoneId(1);
const TILL_ZONE: ZoneId = ZoneId(2);

/// Everything on the shelves: (goods id, price).
const CATALOG: [(u32, u32); 6] = [(1, 2), (2, 1), (3, 3), (4, 2), (5, 1), (6, 4)];
const LIST_LEN: usize = 3;
const COIN_DENOMS: [u32; 5] = [2, 1, 2, 1, 5];

// Sound cues (host clip table)
const SND_INTO_BASKET: SoundCue = SoundCue(1);
const SND_WRONG: SoundCue = SoundCue(2);
const SND_COIN: SoundCue = SoundCue(3);
const SND_TADA: SoundCue = SoundCue(4);
const SND_WELCOME: SoundCue = SoundCue(10);
const SND_DRAG_HINT: SoundCue = SoundCue(11);
const SND_PAY: SoundCue = SoundCue(12);

// Session event kinds (game → host UI)
pub const EV_ITEM_WANTED: u32 = 1;
pub const EV_ITEM_COLLECTED: u32 = 2;
pub const EV_PAYMENT_DUE: u32 = 3;
pub const EV_COIN_PAID: u32 = 4;
pub const EV_ROUND_DONE: u32 = 5;

// Host UI commands (host UI → game)
pub const CMD_NEXT_ROUND: u32 = 1;

const TUTORIAL_SEEN: &str = "market_stall_tutorial_seen";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dragging listed goods into the basket, one at a time.
    Shopping,
    /// Dragging coins to the till until the bill is covered.
    Payment,
    /// Round complete; waiting for the next-round command.
    Done,
}

/// A market round: the stall asks for goods one by one, the child drags
/// each into the basket, then pays the summed price in coins.
pub struct MarketStall {
    phase: Phase,
    round: u32,
    list: Vec<u32>,
    collected: usize,
    total_due: u32,
    paid: u32,
}

fn price_of(id: u32) -> u32 {
    CATALOG
        .iter()
        .find(|(c, _)| *c == id)
        .map(|(_, p)| *p)
        .unwrap_or(0)
}

fn shelf_pos(slot: usize) -> Vec2 {
    let col = slot % SHELF_COLS;
    let row = slot / SHELF_COLS;
    Vec2::new(130.0 + col as f32 * 140.0, 150.0 + row as f32 * 140.0)
}

fn coin_pos(slot: usize) -> Vec2 {
    Vec2::new(90.0 + slot as f32 * 95.0, 530.0)
}

impl MarketStall {
    pub fn new() -> Self {
        Self {
            phase: Phase::Shopping,
            round: 1,
            list: Vec::new(),
            collected: 0,
            total_due: 0,
            paid: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn shopping_list(&self) -> &[u32] {
        &self.list
    }

    /// The goods id the basket wants next, while shopping.
    pub fn expected_item(&self) -> Option<u32> {
        self.list.get(self.collected).copied()
    }

    pub fn total_due(&self) -> u32 {
        self.total_due
    }

    pub fn paid(&self) -> u32 {
        self.paid
    }

    fn expected_payload(&self) -> Option<Payload> {
        self.expected_item().map(|id| Payload::Goods {
            id,
            price: price_of(id),
        })
    }

    fn pick_list(rng: &mut Rng) -> Vec<u32> {
        let mut slots: Vec<usize> = (0..CATALOG.len()).collect();
        for i in (1..slots.len()).rev() {
            let j = rng.next_int(i as u32 + 1) as usize;
            slots.swap(i, j);
        }
        slots.truncate(LIST_LEN);
        slots.into_iter().map(|s| CATALOG[s].0).collect()
    }

    fn setup_round(&mut self, ctx: &mut EngineContext) {
        ctx.store.clear();
        ctx.tweens.clear();
        ctx.zones.clear();

        self.list = Self::pick_list(&mut ctx.rng);
        self.collected = 0;
        self.total_due = self.list.iter().map(|id| price_of(*id)).sum();
        self.paid = 0;
        self.phase = Phase::Shopping;

        for (slot, (id, price)) in CATALOG.iter().enumerate() {
            ctx.spawn(
                Entity::new(GOODS)
                    .with_pos(shelf_pos(slot))
                    .with_size(GOODS_SIZE)
                    .draggable()
                    .with_payload(Payload::Goods {
                        id: *id,
                        price: *price,
                    }),
            );
        }

        let accept = match self.expected_payload() {
            Some(p) => ZoneAccept::Payload(p),
            None => ZoneAccept::Nothing,
        };
        ctx.add_zone(
            DropZone::new(BASKET_ZONE, accept, Anchor::fraction(0.78, 0.42, 0.3, 0.34))
                .with_label("basket"),
        );
        let mut till = DropZone::new(
            TILL_ZONE,
            ZoneAccept::Kind(COIN),
            Anchor::fraction(0.78, 0.85, 0.3, 0.22),
        )
        .with_label("till");
        till.active = false;
        ctx.add_zone(till);

        self.announce_item(ctx);
        log::info!(
            "market-stall: round {} list {:?} (due {})",
            self.round,
            self.list,
            self.total_due
        );
    }

    fn announce_item(&self, ctx: &mut EngineContext) {
        if let Some(id) = self.expected_item() {
            ctx.emit_event(GameEvent::Session {
                kind: EV_ITEM_WANTED,
                a: id as f32,
                b: price_of(id) as f32,
            });
        }
    }

    fn on_item_collected(&mut self, ctx: &mut EngineContext) {
        self.collected += 1;
        ctx.emit_sound(SND_INTO_BASKET);
        ctx.emit_event(GameEvent::Session {
            kind: EV_ITEM_COLLECTED,
            a: self.collected as f32,
            b: self.list.len() as f32,
        });

        match self.expected_payload() {
            Some(p) => {
                ctx.zones.set_accept(BASKET_ZONE, ZoneAccept::Payload(p));
                self.announce_item(ctx);
            }
            None => self.begin_payment(ctx),
        }
    }

    fn begin_payment(&mut self, ctx: &mut EngineContext) {
        self.phase = Phase::Payment;
        ctx.zones.set_accept(BASKET_ZONE, ZoneAccept::Nothing);
        if let Some(till) = ctx.zones.get_mut(TILL_ZONE) {
            till.active = true;
        }
        for (slot, denom) in COIN_DENOMS.iter().enumerate() {
            ctx.spawn(
                Entity::new(COIN)
                    .with_pos(coin_pos(slot))
                    .with_size(COIN_SIZE)
                    .draggable()
                    .with_payload(Payload::Coin(*denom)),
            );
        }
        ctx.emit_sound(SND_PAY);
        ctx.emit_event(GameEvent::Session {
            kind: EV_PAYMENT_DUE,
            a: self.total_due as f32,
            b: 0.0,
        });
    }

    fn on_coin_paid(&mut self, ctx: &mut EngineContext, value: u32) {
        self.paid += value;
        ctx.emit_sound(SND_COIN);
        ctx.emit_event(GameEvent::Session {
            kind: EV_COIN_PAID,
            a: self.paid as f32,
            b: self.total_due as f32,
        });

        if self.paid >= self.total_due {
            self.phase = Phase::Done;
            ctx.emit_sound(SND_TADA);
            ctx.emit_event(GameEvent::Session {
                kind: EV_ROUND_DONE,
                a: self.round as f32,
                b: 0.0,
            });
        }
    }
}

impl Default for MarketStall {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for MarketStall {
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
                    zone: BASKET_ZONE, ..
                } if self.phase == Phase::Shopping => {
                    self.on_item_collected(ctx);
                }
                GameEvent::DropAccepted {
                    zone: TILL_ZONE,
                    payload: Some(Payload::Coin(v)),
                    ..
                } if self.phase == Phase::Payment => {
                    self.on_coin_paid(ctx, v);
                }
                GameEvent::DropRejected {
                    reason: RejectReason::WrongItem,
                    ..
                } => {
                    ctx.emit_sound(SND_WRONG);
                }
                GameEvent::CommandIssued {
                    command: CMD_NEXT_ROUND,
                } if self.phase == Phase::Done => {
                    self.round += 1;
                    self.setup_round(ctx);
                }
                _ => {}
            }
        }
    }

    fn tutorial(&self) -> Option<TutorialScript> {
        let first = self.expected_payload()?;
        Some(
            TutorialScript::new(TUTORIAL_SEEN)
                .step(
                    TutorialStep::new("welcome")
                        .caption("Let's go shopping!")
                        .voice(SND_WELCOME)
                        .advance(AdvanceRule::After(2200.0))
                        .tap_gate(Gate::Closed)
                        .drag_gate(Gate::Closed)
                        .command_gate(Gate::Closed),
                )
                .step(
                    TutorialStep::new("drag-to-basket")
                        .caption("Put it in the basket!")
                        .target(TargetRef::WithPayload(first))
                        .dest(TargetRef::Zone(BASKET_ZONE))
                        .hand(HandMode::DragLoop)
                        .voice(SND_DRAG_HINT)
                        .spotlight(80.0)
                        .advance(AdvanceRule::On(EventKind::DropAccepted))
                        .tap_gate(Gate::Closed)
                        .drag_gate(Gate::TargetOnly)
                        .command_gate(Gate::Closed),
                ),
        )
    }
}
