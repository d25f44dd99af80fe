//! Point-versus-entity hit testing and drop classification.
//!
//! Everything here is a pure function over the store and zone set. A bad
//! drop is an ordinary verdict, never an error: toddlers miss constantly.

use glam::Vec2;

use crate::api::types::{EntityId, RejectReason, ZoneId};
use crate::components::entity::{Entity, Lifecycle};
use crate::components::zone::ZoneSet;
use crate::core::store::EntityStore;

/// Outcome of releasing a dragged entity at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropVerdict {
    /// The zone admits the item; the resolver will consume it.
    Accepted { zone: ZoneId },
    /// The item does not belong here and will travel home.
    Rejected {
        /// The zone that refused it, if the point was over one at all.
        zone: Option<ZoneId>,
        reason: RejectReason,
    },
}

/// Topmost active entity whose hit circle contains `point`.
///
/// "Topmost" means most recently spawned: later spawns draw above earlier
/// ones within a layer, so ties go to the newest. Held, returning and
/// exploding entities are not hit-testable.
pub fn hit_test(store: &EntityStore, point: Vec2) -> Option<EntityId> {
    store
        .iter()
        .filter(|e| e.state == Lifecycle::Active && e.contains(point))
        .max_by_key(|e| e.seq())
        .map(|e| e.id)
}

/// Classify a drop of `entity` released at `point`.
///
/// No zone under the point is a quiet miss; a zone that does not admit
/// the item (or is already full) is a wrong-item refusal.
pub fn classify_drop(zones: &ZoneSet, entity: &Entity, point: Vec2) -> DropVerdict {
    match zones.zone_at(point) {
        None => DropVerdict::Rejected {
            zone: None,
            reason: RejectReason::MissedZone,
        },
        Some(zone) => {
            if zone.accept.admits(entity) && !zone.is_full() {
                DropVerdict::Accepted { zone: zone.id }
            } else {
                DropVerdict::Rejected {
                    zone: Some(zone.id),
                    reason: RejectReason::WrongItem,
                }
            }
        }
    }
}
