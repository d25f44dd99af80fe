//! Flat per-frame draw buffers for the host renderer.
//!
//! The engine is headless: each tick ends by packing every live entity
//! into a plain float buffer the host can blit, pass to a canvas layer or
//! hand to a GPU instance buffer without walking Rust structures. Layouts
//! are fixed and documented here; the host indexes by stride.

use bytemuck::{Pod, Zeroable};

use crate::components::entity::Lifecycle;
use crate::core::store::EntityStore;

/// One drawable entity. 8 floats = 32 bytes stride.
///
/// `size` is the world-space rendered diameter in game units (base size
/// times the live scale, so a carried item arrives pre-enlarged). `glyph`
/// is the payload's display value, or -1 when the entity carries none.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VisualInstance {
    /// Entity id, for hosts that animate or address sprites per entity.
    pub id: f32,
    /// X position in world space.
    pub x: f32,
    /// Y position in world space.
    pub y: f32,
    /// World-space rendered diameter in game units.
    pub size: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Payload display value, or -1.0 for none.
    pub glyph: f32,
    /// Game-defined entity kind for sprite lookup.
    pub kind: f32,
    /// Paint layer, back (0) to front.
    pub layer: f32,
}

impl VisualInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// One explosion particle. 5 floats = 20 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ParticleInstance {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alpha: f32,
    /// Hue in degrees for the host's particle tint.
    pub hue: f32,
}

impl ParticleInstance {
    pub const FLOATS: usize = 5;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// The draw buffers rebuilt at the end of every tick.
pub struct VisualBuffer {
    /// Entity sprites in paint order: layer back-to-front, spawn order
    /// within a layer.
    pub instances: Vec<VisualInstance>,
    /// Explosion particles, drawn above everything but the overlay.
    pub particles: Vec<ParticleInstance>,
}

impl VisualBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(256),
            particles: Vec::with_capacity(512),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.particles.clear();
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    /// Raw pointer to instance data for zero-copy host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    /// Raw pointer to particle data for zero-copy host reads.
    pub fn particles_ptr(&self) -> *const f32 {
        self.particles.as_ptr() as *const f32
    }
}

impl Default for VisualBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack the store into draw buffers.
///
/// Exploding entities have no sprite of their own any more; they
/// contribute their particle burst instead.
pub fn build_visuals(store: &EntityStore, buffer: &mut VisualBuffer) {
    buffer.clear();

    let mut drawable: Vec<_> = store
        .iter()
        .filter(|e| e.state != Lifecycle::Exploding)
        .collect();
    drawable.sort_unstable_by_key(|e| (e.layer.as_u8(), e.seq()));

    for e in drawable {
        let glyph = e.payload().map(|p| p.value() as f32).unwrap_or(-1.0);
        buffer.instances.push(VisualInstance {
            id: e.id.0 as f32,
            x: e.pos.x,
            y: e.pos.y,
            size: e.size * e.scale,
            alpha: e.alpha,
            glyph,
            kind: e.kind.0 as f32,
            layer: e.layer.as_u8() as f32,
        });
    }

    for e in store.iter() {
        let burst = match &e.explosion {
            Some(b) if e.state == Lifecycle::Exploding => b,
            _ => continue,
        };
        let full_life = burst.life_frames();
        for p in burst.particles() {
            buffer.particles.push(ParticleInstance {
                x: p.pos.x,
                y: p.pos.y,
                size: p.size,
                alpha: p.alpha(full_life),
                hue: p.hue,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EntityKind, Payload};
    use crate::components::entity::Entity;
    use crate::components::explosion::{Explosion, ExplosionParams};
    use crate::components::layer::Layer;
    use crate::core::rng::Rng;
    use glam::Vec2;

    const KIND: EntityKind = EntityKind(1);

    #[test]
    fn visual_instance_is_8_floats() {
        assert_eq!(std::mem::size_of::<VisualInstance>(), 32);
        assert_eq!(VisualInstance::STRIDE_BYTES, 32);
    }

    #[test]
    fn particle_instance_is_5_floats() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 20);
    }

    #[test]
    fn instances_come_out_in_paint_order() {
        let mut store = EntityStore::new();
        // Spawned front-layer first, back-layer second.
        store.spawn(Entity::new(KIND).with_pos(Vec2::new(1.0, 0.0)).with_layer(Layer::Overlay));
        store.spawn(Entity::new(KIND).with_pos(Vec2::new(2.0, 0.0)).with_layer(Layer::Background));
        store.spawn(Entity::new(KIND).with_pos(Vec2::new(3.0, 0.0)).with_layer(Layer::Playfield));

        let mut buffer = VisualBuffer::new();
        build_visuals(&store, &mut buffer);

        let xs: Vec<f32> = buffer.instances.iter().map(|i| i.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn spawn_order_breaks_layer_ties() {
        let mut store = EntityStore::new();
        let a = store.spawn(Entity::new(KIND));
        let b = store.spawn(Entity::new(KIND));

        let mut buffer = VisualBuffer::new();
        build_visuals(&store, &mut buffer);

        assert_eq!(buffer.instances[0].id, a.0 as f32);
        assert_eq!(buffer.instances[1].id, b.0 as f32);
    }

    #[test]
    fn payload_becomes_the_glyph() {
        let mut store = EntityStore::new();
        store.spawn(Entity::new(KIND).with_payload(Payload::Number(7)));
        store.spawn(Entity::new(KIND));

        let mut buffer = VisualBuffer::new();
        build_visuals(&store, &mut buffer);

        assert_eq!(buffer.instances[0].glyph, 7.0);
        assert_eq!(buffer.instances[1].glyph, -1.0);
    }

    #[test]
    fn scale_inflates_the_rendered_size() {
        let mut store = EntityStore::new();
        store.spawn(Entity::new(KIND).with_size(50.0).with_scale(1.12));

        let mut buffer = VisualBuffer::new();
        build_visuals(&store, &mut buffer);

        assert!((buffer.instances[0].size - 56.0).abs() < 0.001);
    }

    #[test]
    fn exploding_entity_yields_particles_not_a_sprite() {
        let mut store = EntityStore::new();
        let id = store.spawn(Entity::new(KIND).with_pos(Vec2::new(100.0, 100.0)));
        let mut rng = Rng::new(7);
        if let Some(e) = store.get_mut(id) {
            e.state = Lifecycle::Exploding;
            e.explosion = Some(Explosion::burst(e.pos, &ExplosionParams::default(), &mut rng));
        }

        let mut buffer = VisualBuffer::new();
        build_visuals(&store, &mut buffer);

        assert_eq!(buffer.instance_count(), 0);
        assert_eq!(buffer.particle_count(), 24);
        // Fresh particles are fully opaque.
        assert!(buffer.particles.iter().all(|p| p.alpha > 0.99));
    }
}
