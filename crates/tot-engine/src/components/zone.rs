use glam::Vec2;

use crate::api::types::{EntityKind, Payload, ZoneId};
use crate::components::entity::Entity;
use crate::core::viewport::Viewport;

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Rect from a top-left corner and extent, the way host layouts
    /// usually describe regions.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// How a zone's bounds are derived from the viewport.
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    /// Center at (fx * width, fy * height), extent (fw * width,
    /// fh * height). Resize becomes a pure relayout.
    Fraction { fx: f32, fy: f32, fw: f32, fh: f32 },
    /// A fixed world-space rect, unaffected by resize.
    Fixed(Rect),
}

impl Anchor {
    pub fn fraction(fx: f32, fy: f32, fw: f32, fh: f32) -> Self {
        Anchor::Fraction { fx, fy, fw, fh }
    }

    pub fn fixed(rect: Rect) -> Self {
        Anchor::Fixed(rect)
    }

    pub fn resolve(&self, vp: &Viewport) -> Rect {
        match *self {
            Anchor::Fraction { fx, fy, fw, fh } => Rect::from_center_size(
                Vec2::new(fx * vp.width, fy * vp.height),
                Vec2::new(fw * vp.width, fh * vp.height),
            ),
            Anchor::Fixed(rect) => rect,
        }
    }
}

/// Containment shape within the bounds rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneShape {
    #[default]
    Rect,
    /// The circle inscribed in the bounds rect.
    Circle,
}

/// What a zone admits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneAccept {
    /// Anything.
    Any,
    /// Only entities of the given kind.
    Kind(EntityKind),
    /// Only entities carrying exactly this payload.
    Payload(Payload),
    /// Nothing; every drop here is a wrong item.
    Nothing,
}

impl ZoneAccept {
    pub fn admits(&self, entity: &Entity) -> bool {
        match self {
            ZoneAccept::Any => true,
            ZoneAccept::Kind(k) => entity.kind == *k,
            ZoneAccept::Payload(p) => entity.payload() == Some(*p),
            ZoneAccept::Nothing => false,
        }
    }
}

/// A named target region items can be dropped into: a basket, a train
/// car, a till. Zones never overlap in practice; lookup returns the
/// first hit.
#[derive(Debug, Clone)]
pub struct DropZone {
    pub id: ZoneId,
    pub label: &'static str,
    pub accept: ZoneAccept,
    pub shape: ZoneShape,
    pub anchor: Anchor,
    /// World bounds, recomputed from the anchor on every resize.
    pub rect: Rect,
    /// Maximum number of accepted drops (None = unlimited).
    pub capacity: Option<u32>,
    /// Accepted drops so far. The resolver increments this.
    pub filled: u32,
    /// Inactive zones are invisible to the resolver.
    pub active: bool,
}

impl DropZone {
    pub fn new(id: ZoneId, accept: ZoneAccept, anchor: Anchor) -> Self {
        Self {
            id,
            label: "",
            accept,
            shape: ZoneShape::Rect,
            anchor,
            rect: anchor.resolve(&Viewport::default()),
            capacity: None,
            filled: 0,
            active: true,
        }
    }

    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn with_shape(mut self, shape: ZoneShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn relayout(&mut self, vp: &Viewport) {
        self.rect = self.anchor.resolve(vp);
    }

    /// Containment against the current bounds, never a cached copy.
    pub fn contains(&self, point: Vec2) -> bool {
        match self.shape {
            ZoneShape::Rect => self.rect.contains(point),
            ZoneShape::Circle => {
                let size = self.rect.size();
                let radius = size.x.min(size.y) * 0.5;
                self.rect.center().distance_squared(point) <= radius * radius
            }
        }
    }

    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(cap) => self.filled >= cap,
            None => false,
        }
    }
}

/// All drop zones of the running game.
#[derive(Debug, Default)]
pub struct ZoneSet {
    zones: Vec<DropZone>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone. The caller picks the id; reusing one is a logic error
    /// that lookup by id will surface (first match wins).
    pub fn add(&mut self, zone: DropZone) -> ZoneId {
        let id = zone.id;
        self.zones.push(zone);
        id
    }

    pub fn get(&self, id: ZoneId) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut DropZone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    /// Retarget a zone's accept rule; rounds move targets this way.
    pub fn set_accept(&mut self, id: ZoneId, accept: ZoneAccept) {
        if let Some(zone) = self.get_mut(id) {
            zone.accept = accept;
        }
    }

    /// The first active zone containing `point`.
    pub fn zone_at(&self, point: Vec2) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.active && z.contains(point))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DropZone> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DropZone> {
        self.zones.iter_mut()
    }

    pub fn relayout_all(&mut self, vp: &Viewport) {
        for zone in &mut self.zones {
            zone.relayout(vp);
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_anchor_tracks_viewport() {
        let mut zone = DropZone::new(
            ZoneId(1),
            ZoneAccept::Any,
            Anchor::fraction(0.5, 0.8, 0.2, 0.1),
        );
        zone.relayout(&Viewport::new(1000.0, 500.0));
        assert_eq!(zone.rect.center(), Vec2::new(500.0, 400.0));

        zone.relayout(&Viewport::new(500.0, 500.0));
        assert_eq!(zone.rect.center(), Vec2::new(250.0, 400.0));
    }

    #[test]
    fn fixed_anchor_ignores_resize() {
        let mut zone = DropZone::new(
            ZoneId(1),
            ZoneAccept::Any,
            Anchor::fixed(Rect::from_xywh(200.0, 150.0, 100.0, 100.0)),
        );
        zone.relayout(&Viewport::new(4000.0, 3000.0));
        assert!(zone.contains(Vec2::new(250.0, 180.0)));
        assert!(!zone.contains(Vec2::new(150.0, 180.0)));
    }

    #[test]
    fn circle_zone_rejects_its_corners() {
        let zone = DropZone::new(
            ZoneId(1),
            ZoneAccept::Any,
            Anchor::fixed(Rect::from_xywh(0.0, 0.0, 100.0, 100.0)),
        )
        .with_shape(ZoneShape::Circle);

        assert!(zone.contains(Vec2::new(50.0, 50.0)));
        assert!(zone.contains(Vec2::new(50.0, 95.0)));
        // Inside the rect, outside the inscribed circle.
        assert!(!zone.contains(Vec2::new(95.0, 95.0)));
    }

    #[test]
    fn accept_rules() {
        let goods = EntityKind(2);
        let apple = Entity::new(goods).with_payload(Payload::Goods { id: 1, price: 3 });
        let pear = Entity::new(goods).with_payload(Payload::Goods { id: 2, price: 4 });

        assert!(ZoneAccept::Any.admits(&apple));
        assert!(ZoneAccept::Kind(goods).admits(&apple));
        assert!(!ZoneAccept::Kind(EntityKind(9)).admits(&apple));
        let want_apple = ZoneAccept::Payload(Payload::Goods { id: 1, price: 3 });
        assert!(want_apple.admits(&apple));
        assert!(!want_apple.admits(&pear));
        assert!(!ZoneAccept::Nothing.admits(&apple));
    }

    #[test]
    fn retargeting_changes_what_a_zone_admits() {
        let goods = EntityKind(2);
        let apple = Entity::new(goods).with_payload(Payload::Goods { id: 1, price: 3 });
        let mut zones = ZoneSet::new();
        zones.add(DropZone::new(
            ZoneId(1),
            ZoneAccept::Payload(Payload::Goods { id: 2, price: 4 }),
            Anchor::fraction(0.5, 0.5, 0.2, 0.2),
        ));

        let admits = |zones: &ZoneSet| {
            zones.get(ZoneId(1)).map(|z| z.accept.admits(&apple)).unwrap_or(false)
        };
        assert!(!admits(&zones));

        zones.set_accept(ZoneId(1), ZoneAccept::Payload(Payload::Goods { id: 1, price: 3 }));
        assert!(admits(&zones));
    }

    #[test]
    fn capacity_fills_up() {
        let mut zone =
            DropZone::new(ZoneId(1), ZoneAccept::Any, Anchor::fraction(0.5, 0.5, 0.2, 0.2))
                .with_capacity(2);
        assert!(!zone.is_full());
        zone.filled = 2;
        assert!(zone.is_full());
    }

    #[test]
    fn zone_at_skips_inactive() {
        let mut zones = ZoneSet::new();
        let mut zone =
            DropZone::new(ZoneId(1), ZoneAccept::Any, Anchor::fraction(0.5, 0.5, 0.5, 0.5));
        zone.relayout(&Viewport::new(100.0, 100.0));
        zone.active = false;
        zones.add(zone);
        assert!(zones.zone_at(Vec2::new(50.0, 50.0)).is_none());
    }
}
