use std::collections::HashMap;

use glam::Vec2;

use crate::api::types::{EntityId, EntityKind, Payload};
use crate::components::entity::{Entity, FallMotion, Lifecycle};
use crate::components::layer::Layer;
use crate::core::rng::Rng;
use crate::core::viewport::Viewport;

/// Which side of a spawn the rules picked: the thing the round is looking
/// for, or a distractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnClass {
    Target,
    Decoy,
}

impl SpawnClass {
    fn other(self) -> Self {
        match self {
            SpawnClass::Target => SpawnClass::Decoy,
            SpawnClass::Decoy => SpawnClass::Target,
        }
    }
}

/// Tunable spawn policy for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRules {
    /// Cap on concurrently live entities of the kind. A spawn request at
    /// the cap is refused, not queued.
    pub max_active: usize,
    /// Probability a spawn is a target (vs. a decoy).
    pub target_ratio: f32,
    /// Longest allowed run of same-class spawns; the next spawn after a
    /// full run is forced to the opposite class.
    pub streak_limit: u32,
    /// Minimum |dx| from every live same-layer entity.
    pub min_separation: f32,
    /// Placement attempts before giving up on separation.
    pub placement_attempts: u32,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            max_active: 8,
            target_ratio: 0.5,
            streak_limit: 2,
            min_separation: 80.0,
            placement_attempts: 12,
        }
    }
}

/// Fall parameters for a ruled spawn.
#[derive(Debug, Clone, Copy)]
pub struct FallSpec {
    pub duration_ms: f32,
    pub wobble_amp: f32,
    pub wobble_hz: f32,
}

/// One ruled spawn: what kind of entity, what it may carry, how it moves.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    pub kind: EntityKind,
    pub size: f32,
    pub layer: Layer,
    pub draggable: bool,
    /// Payload a target-class spawn carries.
    pub target: Payload,
    /// Payload pool a decoy-class spawn draws from. Empty pool forces
    /// every spawn to target class.
    pub decoys: &'a [Payload],
    /// Falling spawns start just above the viewport and expire just below
    /// it. Static spawns sit in the top band.
    pub fall: Option<FallSpec>,
}

/// Entity storage using a flat Vec.
/// Designed for small entity counts (a screenful, not thousands).
///
/// The store owns id assignment and the spawn sequence counter; games
/// hand in an `Entity` built with placeholders and get the real id back.
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
    next_seq: u64,
    /// Last spawn class and run length, per kind.
    streaks: HashMap<EntityKind, (SpawnClass, u32)>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
            next_id: 1,
            next_seq: 1,
            streaks: HashMap::new(),
        }
    }

    /// Add an entity, assigning its id and spawn sequence.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        entity.seq = self.next_seq;
        self.next_seq += 1;
        self.entities.push(entity);
        id
    }

    /// Spawn under the rules: refuse at the cap, pick target or decoy with
    /// the anti-streak guard, place along x away from live neighbors.
    /// Returns None when the cap refuses the spawn.
    pub fn spawn_ruled(
        &mut self,
        req: &SpawnRequest,
        rules: &SpawnRules,
        vp: &Viewport,
        rng: &mut Rng,
        now_ms: f64,
    ) -> Option<EntityId> {
        if self.count_live(req.kind) >= rules.max_active {
            return None;
        }

        let class = self.pick_class(req.kind, req.decoys.is_empty(), rules, rng);
        let payload = match class {
            SpawnClass::Target => req.target,
            SpawnClass::Decoy => req.decoys[rng.next_int(req.decoys.len() as u32) as usize],
        };

        let x = self.place_x(req.size, req.layer, rules, vp, rng);
        let mut entity = Entity::new(req.kind)
            .with_size(req.size)
            .with_layer(req.layer)
            .with_payload(payload);
        if req.draggable {
            entity = entity.draggable();
        }

        match req.fall {
            Some(fall) => {
                let start = Vec2::new(x, -req.size);
                entity = entity.with_pos(start).with_fall(FallMotion {
                    start,
                    end_y: vp.height + req.size,
                    duration_ms: fall.duration_ms,
                    started_ms: now_ms,
                    wobble_amp: fall.wobble_amp,
                    wobble_hz: fall.wobble_hz,
                    wobble_phase: rng.next_f32() * std::f32::consts::TAU,
                });
            }
            None => {
                entity = entity.with_pos(Vec2::new(x, req.size));
            }
        }

        Some(self.spawn(entity))
    }

    fn pick_class(
        &mut self,
        kind: EntityKind,
        no_decoys: bool,
        rules: &SpawnRules,
        rng: &mut Rng,
    ) -> SpawnClass {
        let limit = rules.streak_limit.max(1);
        let forced = match self.streaks.get(&kind) {
            Some((class, run)) if *run >= limit => Some(class.other()),
            _ => None,
        };
        let mut class = forced.unwrap_or_else(|| {
            if rng.chance(rules.target_ratio) {
                SpawnClass::Target
            } else {
                SpawnClass::Decoy
            }
        });
        if no_decoys {
            class = SpawnClass::Target;
        }

        match self.streaks.get_mut(&kind) {
            Some((last, run)) if *last == class => *run += 1,
            _ => {
                self.streaks.insert(kind, (class, 1));
            }
        }
        class
    }

    fn place_x(
        &self,
        size: f32,
        layer: Layer,
        rules: &SpawnRules,
        vp: &Viewport,
        rng: &mut Rng,
    ) -> f32 {
        let margin = size;
        let lo = margin;
        let hi = (vp.width - margin).max(lo + 1.0);
        let mut x = rng.range_f32(lo, hi);
        for attempt in 0..rules.placement_attempts {
            let clear = self
                .entities
                .iter()
                .filter(|e| e.layer == layer && e.state != Lifecycle::Exploding)
                .all(|e| (e.pos.x - x).abs() >= rules.min_separation);
            if clear {
                return x;
            }
            if attempt + 1 == rules.placement_attempts {
                log::debug!("spawn placement fell back after {} attempts", rules.placement_attempts);
            }
            x = rng.range_f32(lo, hi);
        }
        x
    }

    /// Remove an entity by id. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(idx) = self.entities.iter().position(|e| e.id == id) {
            Some(self.entities.swap_remove(idx))
        } else {
            None
        }
    }

    /// Get a reference to an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate over all entities mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Iterate over entities still in play (not held, returning or bursting).
    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.state == Lifecycle::Active)
    }

    /// Mutable variant of [`active`](Self::active).
    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities
            .iter_mut()
            .filter(|e| e.state == Lifecycle::Active)
    }

    /// Live entities of a kind (everything that has not burst yet).
    pub fn count_live(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind == kind && e.state != Lifecycle::Exploding)
            .count()
    }

    /// Oldest active entity of a kind, by spawn order. Stable while newer
    /// entities churn, which keeps hint targets from jumping around.
    pub fn oldest_of_kind(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.kind == kind && e.state == Lifecycle::Active)
            .min_by_key(|e| e.seq)
    }

    /// Oldest active entity carrying exactly `payload`.
    pub fn find_payload(&self, payload: Payload) -> Option<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.payload() == Some(payload) && e.state == Lifecycle::Active)
            .min_by_key(|e| e.seq)
    }

    /// Number of entities in the store.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Clear all entities and streak history. Id assignment keeps counting.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.streaks.clear();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
