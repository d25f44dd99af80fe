use glam::Vec2;

/// Unique identifier for an entity in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Unique identifier for a drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId(pub u32);

/// Game-defined entity kind (bubble, goods, coin, tile, ...).
/// The engine never interprets the value beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKind(pub u16);

/// A sound cue emitted by game logic, fire-and-forget.
/// The numeric value maps to a game-defined clip in the host's sound player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundCue(pub u32);

/// The small teaching value an entity carries: a number to match, an item
/// for sale, or a coin denomination. Set once at spawn, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// A plain number (counting and matching games).
    Number(u32),
    /// A shop item with a price tag.
    Goods { id: u32, price: u32 },
    /// A coin of the given denomination.
    Coin(u32),
}

impl Payload {
    /// The primary numeric value, used as the display glyph for visuals.
    pub fn value(&self) -> u32 {
        match self {
            Payload::Number(n) => *n,
            Payload::Goods { id, .. } => *id,
            Payload::Coin(v) => *v,
        }
    }
}

/// Why a drop was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Landed in a zone that does not admit this item (or the zone is full).
    WrongItem,
    /// Released outside every active zone.
    MissedZone,
}

/// An event communicated from the engine to the game and the host UI.
/// Events accumulate during a tick and are cleared at the start of the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// An entity was tapped (press + release without crossing the drag threshold).
    EntityTapped { id: EntityId, kind: EntityKind, payload: Option<Payload> },
    /// A dragged entity was released over a zone that admits it.
    /// The entity has already been removed from the store.
    DropAccepted { id: EntityId, zone: ZoneId, payload: Option<Payload> },
    /// A dragged entity was released somewhere it does not belong.
    /// The entity stays live and travels back to its home position.
    DropRejected { id: EntityId, zone: Option<ZoneId>, reason: RejectReason },
    /// An entity started bursting into particles.
    ExplosionTriggered { id: EntityId, at: Vec2 },
    /// An entity left the playfield or outlived its deadline and was removed.
    EntityExpired { id: EntityId, kind: EntityKind, payload: Option<Payload> },
    /// A rejected entity finished travelling back to its home position.
    ReturnFinished { id: EntityId },
    /// A one-shot timer came due.
    TimerFired { token: u32 },
    /// A host UI command passed the tutorial gate.
    CommandIssued { command: u32 },
    /// The tutorial entered a new step.
    TutorialStep { index: usize, name: &'static str },
    /// The tutorial completed (or was skipped).
    TutorialFinished,
    /// The tutorial hint animation was restarted after a blocked interaction.
    HintReplayed { index: usize },
    /// Game-defined session event (round complete, score change, ...).
    Session { kind: u32, a: f32, b: f32 },
}

/// Discriminant of `GameEvent`, used by tutorial advance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EntityTapped,
    DropAccepted,
    DropRejected,
    ExplosionTriggered,
    EntityExpired,
    ReturnFinished,
    TimerFired,
    CommandIssued,
    TutorialStep,
    TutorialFinished,
    HintReplayed,
    Session,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::EntityTapped { .. } => EventKind::EntityTapped,
            GameEvent::DropAccepted { .. } => EventKind::DropAccepted,
            GameEvent::DropRejected { .. } => EventKind::DropRejected,
            GameEvent::ExplosionTriggered { .. } => EventKind::ExplosionTriggered,
            GameEvent::EntityExpired { .. } => EventKind::EntityExpired,
            GameEvent::ReturnFinished { .. } => EventKind::ReturnFinished,
            GameEvent::TimerFired { .. } => EventKind::TimerFired,
            GameEvent::CommandIssued { .. } => EventKind::CommandIssued,
            GameEvent::TutorialStep { .. } => EventKind::TutorialStep,
            GameEvent::TutorialFinished => EventKind::TutorialFinished,
            GameEvent::HintReplayed { .. } => EventKind::HintReplayed,
            GameEvent::Session { .. } => EventKind::Session,
        }
    }
}
