//! Particle burst played when an entity pops.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::core::rng::Rng;

/// A single burst particle.
///
/// Particles are the one piece of the engine that advances per frame
/// rather than per timestamp: a burst lasts a fixed number of frames and
/// nothing gameplay-visible hangs off its exact wall-clock length.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Display hue in degrees [0, 360).
    pub hue: f32,
    /// Remaining frames.
    pub life: u16,
}

impl Particle {
    pub const GRAVITY: f32 = 0.22;
    pub const DRAG: f32 = 0.985;
    pub const SHRINK: f32 = 0.96;
    pub const MIN_SIZE: f32 = 0.5;

    /// Advance one frame. Returns false when expired.
    pub fn tick(&mut self) -> bool {
        if self.life == 0 {
            return false;
        }
        self.life -= 1;
        self.vel.y += Self::GRAVITY;
        self.vel *= Self::DRAG;
        self.pos += self.vel;
        self.size *= Self::SHRINK;
        self.life > 0 && self.size > Self::MIN_SIZE
    }

    /// Opacity derived from remaining life.
    pub fn alpha(&self, full_life: u16) -> f32 {
        if full_life == 0 {
            return 0.0;
        }
        self.life as f32 / full_life as f32
    }
}

/// Burst shape parameters, tunable per entity kind.
#[derive(Debug, Clone, Copy)]
pub struct ExplosionParams {
    pub count: usize,
    /// Maximum initial speed, world units per frame.
    pub speed: f32,
    /// Particle size range at birth.
    pub size_min: f32,
    pub size_max: f32,
    /// Particle lifetime in frames.
    pub life_frames: u16,
}

impl Default for ExplosionParams {
    fn default() -> Self {
        Self {
            count: 24,
            speed: 4.0,
            size_min: 3.0,
            size_max: 6.0,
            life_frames: 48,
        }
    }
}

/// A live burst owned by its exploding entity. The entity sticks around
/// (untouchable, in `Lifecycle::Exploding`) until the last particle dies,
/// then the stepper removes both.
#[derive(Debug, Clone)]
pub struct Explosion {
    particles: Vec<Particle>,
    life_frames: u16,
}

impl Explosion {
    /// Spawn a radial burst at `center`.
    pub fn burst(center: Vec2, params: &ExplosionParams, rng: &mut Rng) -> Self {
        let mut particles = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            let angle = rng.next_f32() * TAU;
            let speed = rng.range_f32(params.speed * 0.3, params.speed);
            particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed),
                size: rng.range_f32(params.size_min, params.size_max),
                hue: rng.range_f32(0.0, 360.0),
                life: params.life_frames,
            });
        }
        Self {
            particles,
            life_frames: params.life_frames,
        }
    }

    /// Advance all particles one frame. Returns false once every particle
    /// has died.
    pub fn tick(&mut self) -> bool {
        self.particles.retain_mut(|p| p.tick());
        !self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Full lifetime used for alpha fade.
    pub fn life_frames(&self) -> u16 {
        self.life_frames
    }

    pub fn is_done(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_spawns_requested_count() {
        let mut rng = Rng::new(42);
        let burst = Explosion::burst(Vec2::ZERO, &ExplosionParams::default(), &mut rng);
        assert_eq!(burst.particles().len(), 24);
    }

    #[test]
    fn particles_die_within_lifetime() {
        let mut rng = Rng::new(42);
        let params = ExplosionParams {
            life_frames: 10,
            ..Default::default()
        };
        let mut burst = Explosion::burst(Vec2::ZERO, &params, &mut rng);
        for _ in 0..10 {
            burst.tick();
        }
        assert!(burst.is_done());
    }

    #[test]
    fn particle_falls_under_gravity() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 5.0,
            hue: 0.0,
            life: 60,
        };
        for _ in 0..20 {
            p.tick();
        }
        assert!(p.pos.y > 0.0, "gravity should pull particles down");
    }

    #[test]
    fn tiny_particles_expire_early() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 0.6,
            hue: 0.0,
            life: 1000,
        };
        let mut frames = 0;
        while p.tick() {
            frames += 1;
            assert!(frames < 100, "shrinking particle should expire");
        }
    }
}
