//! Particle field simulation: store, initialization and per-frame integration
//!
//! The field owns a flat array of particles rebuilt wholesale on resize.
//! Motion is a sum type: a particle is either free (velocity, edge bounce,
//! pointer repulsion) or orbital (fixed center/radius, advancing angle) for
//! its whole lifetime.

use egui::{Color32, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::FieldConfig;

/// Size oscillates between these multiples of the base size
pub const PULSE_MIN: f32 = 0.7;
pub const PULSE_MAX: f32 = 1.5;

/// Glow intensity bounds
pub const GLOW_MIN: f32 = 0.2;
pub const GLOW_MAX: f32 = 0.8;

/// Share of the density target spawned as free particles; the rest orbit
const FREE_SHARE: f32 = 0.6;

/// Orbital particles are grouped around this many cluster centers
const ORBIT_CLUSTERS: usize = 3;

const BASE_SIZE_RANGE: std::ops::Range<f32> = 1.0..3.5;
const ORBIT_RADIUS_RANGE: std::ops::Range<f32> = 20.0..100.0;
const ORBIT_SPEED_RANGE: std::ops::Range<f32> = 0.005..0.02;
const FREE_SPEED_LIMIT: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    Free {
        vel: Vec2,
    },
    Orbital {
        center: Vec2,
        radius: f32,
        angle: f32,
        angular_vel: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub size: f32,
    pub base_size: f32,
    pub color: Color32,
    pub growing: bool,
    pub glow: f32,
    pub glow_growing: bool,
    pub motion: Motion,
}

/// Connection between two particles, by index into the field
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// 1.0 at distance zero, 0.0 at max_distance
    pub strength: f32,
}

pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub width: f32,
    pub height: f32,
}

impl ParticleField {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            particles: Vec::new(),
            width,
            height,
        }
    }

    /// Rebuild the whole particle set for the current dimensions. The random
    /// source is injected so callers can seed it; the same seed and
    /// `(width, height, density)` always produce the same set.
    pub fn init(&mut self, config: &FieldConfig, rng: &mut impl Rng) {
        self.particles.clear();

        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }

        let count = config.density_for_width(self.width);
        // Integer remainder after the split goes to the free class
        let orbital_count = (count as f32 * (1.0 - FREE_SHARE)) as usize;
        let free_count = count - orbital_count;

        let palette = config.color_scheme().resolve_palette();
        let (width, height) = (self.width, self.height);

        for _ in 0..free_count {
            let p = spawn_free(width, height, config, &palette, rng);
            self.particles.push(p);
        }

        let centers: Vec<Vec2> = (0..ORBIT_CLUSTERS)
            .map(|_| Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)))
            .collect();

        for i in 0..orbital_count {
            let p = spawn_orbital(centers[i % ORBIT_CLUSTERS], &palette, rng);
            self.particles.push(p);
        }
    }

    /// Advance every particle by one frame. `pointer` is the latest recorded
    /// pointer position in field coordinates, if any.
    pub fn step(&mut self, config: &FieldConfig, pointer: Option<Vec2>, rng: &mut impl Rng) {
        let width = self.width;
        let height = self.height;

        for p in &mut self.particles {
            // Size pulse between the fixed multiples of the base size
            if p.growing {
                p.size += config.pulse_speed;
                if p.size >= p.base_size * PULSE_MAX {
                    p.size = p.base_size * PULSE_MAX;
                    p.growing = false;
                }
            } else {
                p.size -= config.pulse_speed;
                if p.size <= p.base_size * PULSE_MIN {
                    p.size = p.base_size * PULSE_MIN;
                    p.growing = true;
                }
            }

            // Glow oscillates on its own clock
            if p.glow_growing {
                p.glow += config.glow_speed;
                if p.glow >= GLOW_MAX {
                    p.glow = GLOW_MAX;
                    p.glow_growing = false;
                }
            } else {
                p.glow -= config.glow_speed;
                if p.glow <= GLOW_MIN {
                    p.glow = GLOW_MIN;
                    p.glow_growing = true;
                }
            }

            match &mut p.motion {
                Motion::Orbital {
                    center,
                    radius,
                    angle,
                    angular_vel,
                } => {
                    *angle += *angular_vel;
                    // Jitter is drawn fresh each frame, never accumulated
                    let jitter = Vec2::new(
                        rng.gen_range(-config.jitter..=config.jitter),
                        rng.gen_range(-config.jitter..=config.jitter),
                    );
                    p.pos = *center + *radius * Vec2::new(angle.cos(), angle.sin()) + jitter;
                }
                Motion::Free { vel } => {
                    // Repulsion displaces position directly, so the edge
                    // check below must run afterwards to bound the drift
                    if let Some(ptr) = pointer {
                        let away = p.pos - ptr;
                        let dist = away.length();
                        if dist > 0.0 && dist < config.mouse_influence_radius {
                            let push = (config.mouse_influence_radius - dist)
                                / config.mouse_influence_radius
                                * config.repulsion_strength;
                            p.pos += away / dist * push;
                        }
                        // dist == 0 gives no direction; leave the particle be
                    }

                    p.pos += *vel;

                    if p.pos.x < 0.0 {
                        p.pos.x = 0.0;
                        vel.x = -vel.x;
                    } else if p.pos.x > width {
                        p.pos.x = width;
                        vel.x = -vel.x;
                    }
                    if p.pos.y < 0.0 {
                        p.pos.y = 0.0;
                        vel.y = -vel.y;
                    } else if p.pos.y > height {
                        p.pos.y = height;
                        vel.y = -vel.y;
                    }
                }
            }
        }
    }

    /// Enumerate every unordered pair closer than `max_distance`.
    ///
    /// This is an O(n^2) pass; it is acceptable only because the density
    /// tiers cap n at a few dozen. Raising the cap means switching to a
    /// spatial grid first.
    pub fn connections(&self, max_distance: f32) -> Vec<Connection> {
        let mut connections = Vec::new();
        if max_distance <= 0.0 {
            return connections;
        }
        let max_sq = max_distance * max_distance;

        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let delta = self.particles[i].pos - self.particles[j].pos;
                let dist_sq = delta.length_sq();
                if dist_sq < max_sq {
                    connections.push(Connection {
                        a: i,
                        b: j,
                        strength: 1.0 - dist_sq.sqrt() / max_distance,
                    });
                }
            }
        }
        connections
    }
}

fn spawn_free(
    width: f32,
    height: f32,
    config: &FieldConfig,
    palette: &[Color32],
    rng: &mut impl Rng,
) -> Particle {
    let pos = Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
    let vel = Vec2::new(
        rng.gen_range(-FREE_SPEED_LIMIT..=FREE_SPEED_LIMIT),
        rng.gen_range(-FREE_SPEED_LIMIT..=FREE_SPEED_LIMIT),
    ) * config.speed;

    let base_size = rng.gen_range(BASE_SIZE_RANGE);
    Particle {
        pos,
        // Independent pulse phase
        size: base_size * rng.gen_range(PULSE_MIN..PULSE_MAX),
        base_size,
        color: palette[rng.gen_range(0..palette.len())],
        growing: rng.gen_bool(0.5),
        glow: rng.gen_range(GLOW_MIN..GLOW_MAX),
        glow_growing: rng.gen_bool(0.5),
        motion: Motion::Free { vel },
    }
}

fn spawn_orbital(center: Vec2, palette: &[Color32], rng: &mut impl Rng) -> Particle {
    let radius = rng.gen_range(ORBIT_RADIUS_RANGE);
    let angle = rng.gen_range(0.0..TAU);
    let magnitude = rng.gen_range(ORBIT_SPEED_RANGE);
    let angular_vel = if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    };

    let base_size = rng.gen_range(BASE_SIZE_RANGE);
    Particle {
        pos: center + radius * Vec2::new(angle.cos(), angle.sin()),
        size: base_size * rng.gen_range(PULSE_MIN..PULSE_MAX),
        base_size,
        color: palette[rng.gen_range(0..palette.len())],
        growing: rng.gen_bool(0.5),
        glow: rng.gen_range(GLOW_MIN..GLOW_MAX),
        glow_growing: rng.gen_bool(0.5),
        motion: Motion::Orbital {
            center,
            radius,
            angle,
            angular_vel,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(width: f32, height: f32, seed: u64, config: &FieldConfig) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = ParticleField::new(width, height);
        field.init(config, &mut rng);
        field
    }

    #[test]
    fn init_matches_density_tier() {
        let config = FieldConfig::default();
        assert_eq!(field(1920.0, 1080.0, 1, &config).particles.len(), 70);
        assert_eq!(field(1024.0, 768.0, 1, &config).particles.len(), 50);
        assert_eq!(field(375.0, 667.0, 1, &config).particles.len(), 30);
    }

    #[test]
    fn init_splits_free_and_orbital() {
        let config = FieldConfig::default();
        let field = field(1920.0, 1080.0, 3, &config);
        let free = field
            .particles
            .iter()
            .filter(|p| matches!(p.motion, Motion::Free { .. }))
            .count();
        let orbital = field.particles.len() - free;
        assert_eq!(free, 42);
        assert_eq!(orbital, 28);
    }

    #[test]
    fn orbital_particles_share_three_cluster_centers() {
        let config = FieldConfig::default();
        let field = field(1920.0, 1080.0, 4, &config);
        let mut centers: Vec<(u32, u32)> = field
            .particles
            .iter()
            .filter_map(|p| match p.motion {
                Motion::Orbital { center, .. } => Some((center.x.to_bits(), center.y.to_bits())),
                Motion::Free { .. } => None,
            })
            .collect();
        centers.sort_unstable();
        centers.dedup();
        assert_eq!(centers.len(), 3);
    }

    #[test]
    fn seeded_init_is_idempotent() {
        let config = FieldConfig::default();
        let a = field(1280.0, 800.0, 42, &config);
        let b = field(1280.0, 800.0, 42, &config);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn different_seeds_differ() {
        let config = FieldConfig::default();
        let a = field(1280.0, 800.0, 42, &config);
        let b = field(1280.0, 800.0, 43, &config);
        assert_ne!(a.particles, b.particles);
    }

    #[test]
    fn zero_area_viewport_yields_empty_field() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = ParticleField::new(0.0, 0.0);
        field.init(&config, &mut rng);
        assert!(field.particles.is_empty());

        // Stepping and pairing an empty field must be harmless
        field.step(&config, Some(Vec2::new(10.0, 10.0)), &mut rng);
        assert!(field.connections(150.0).is_empty());
    }

    #[test]
    fn size_stays_within_pulse_bounds() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = field(1280.0, 800.0, 7, &config);
        for _ in 0..2000 {
            field.step(&config, None, &mut rng);
        }
        for p in &field.particles {
            assert!(p.size >= p.base_size * PULSE_MIN - 1e-4);
            assert!(p.size <= p.base_size * PULSE_MAX + 1e-4);
        }
    }

    #[test]
    fn glow_stays_within_bounds() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut field = field(1280.0, 800.0, 8, &config);
        for _ in 0..2000 {
            field.step(&config, None, &mut rng);
        }
        for p in &field.particles {
            assert!(p.glow >= GLOW_MIN - 1e-4 && p.glow <= GLOW_MAX + 1e-4);
        }
    }

    #[test]
    fn free_particles_stay_in_bounds() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut field = field(640.0, 480.0, 9, &config);
        // Park the pointer mid-field so repulsion keeps shoving particles
        let pointer = Some(Vec2::new(320.0, 240.0));
        for _ in 0..1000 {
            field.step(&config, pointer, &mut rng);
            for p in &field.particles {
                if let Motion::Free { .. } = p.motion {
                    assert!(p.pos.x >= 0.0 && p.pos.x <= field.width);
                    assert!(p.pos.y >= 0.0 && p.pos.y <= field.height);
                }
            }
        }
    }

    #[test]
    fn edge_reflection_negates_velocity() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = ParticleField::new(100.0, 100.0);
        field.particles.push(Particle {
            pos: Vec2::new(99.9, 50.0),
            size: 2.0,
            base_size: 2.0,
            color: Color32::WHITE,
            growing: true,
            glow: 0.5,
            glow_growing: true,
            motion: Motion::Free {
                vel: Vec2::new(0.5, 0.0),
            },
        });

        field.step(&config, None, &mut rng);
        let p = &field.particles[0];
        assert_eq!(p.pos.x, 100.0);
        match p.motion {
            Motion::Free { vel } => assert_eq!(vel.x, -0.5),
            _ => unreachable!(),
        }
    }

    #[test]
    fn orbital_distance_stays_within_jitter_bound() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = field(1280.0, 800.0, 11, &config);
        let jitter_bound = (2.0_f32).sqrt() * config.jitter;
        for _ in 0..500 {
            field.step(&config, None, &mut rng);
            for p in &field.particles {
                if let Motion::Orbital { center, radius, .. } = p.motion {
                    let dist = (p.pos - center).length();
                    assert!((dist - radius).abs() <= jitter_bound + 1e-3);
                }
            }
        }
    }

    #[test]
    fn pointer_at_particle_position_is_inert() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = ParticleField::new(400.0, 400.0);
        field.particles.push(Particle {
            pos: Vec2::new(200.0, 200.0),
            size: 2.0,
            base_size: 2.0,
            color: Color32::WHITE,
            growing: true,
            glow: 0.5,
            glow_growing: true,
            motion: Motion::Free { vel: Vec2::ZERO },
        });

        // Degenerate distance must not produce NaN or any displacement
        field.step(&config, Some(Vec2::new(200.0, 200.0)), &mut rng);
        let p = &field.particles[0];
        assert!(p.pos.x.is_finite() && p.pos.y.is_finite());
        assert_eq!(p.pos, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn repulsion_approaches_strength_near_zero_distance() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = ParticleField::new(400.0, 400.0);
        field.particles.push(Particle {
            pos: Vec2::new(200.0, 200.0),
            size: 2.0,
            base_size: 2.0,
            color: Color32::WHITE,
            growing: true,
            glow: 0.5,
            glow_growing: true,
            motion: Motion::Free { vel: Vec2::ZERO },
        });

        // Pointer 1px left of the particle: push ~= (200-1)/200 * 0.5
        field.step(&config, Some(Vec2::new(199.0, 200.0)), &mut rng);
        let moved = field.particles[0].pos.x - 200.0;
        let expected = (200.0 - 1.0) / 200.0 * 0.5;
        assert!((moved - expected).abs() < 1e-4);
        assert_eq!(field.particles[0].pos.y, 200.0);
    }

    #[test]
    fn pointer_outside_influence_radius_does_nothing() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = ParticleField::new(800.0, 400.0);
        field.particles.push(Particle {
            pos: Vec2::new(600.0, 200.0),
            size: 2.0,
            base_size: 2.0,
            color: Color32::WHITE,
            growing: true,
            glow: 0.5,
            glow_growing: true,
            motion: Motion::Free { vel: Vec2::ZERO },
        });

        field.step(&config, Some(Vec2::new(100.0, 200.0)), &mut rng);
        assert_eq!(field.particles[0].pos, Vec2::new(600.0, 200.0));
    }

    #[test]
    fn connection_count_matches_pair_distances() {
        let mut field = ParticleField::new(800.0, 600.0);
        let mut place = |x: f32, y: f32| {
            field.particles.push(Particle {
                pos: Vec2::new(x, y),
                size: 2.0,
                base_size: 2.0,
                color: Color32::WHITE,
                growing: true,
                glow: 0.5,
                glow_growing: true,
                motion: Motion::Free { vel: Vec2::ZERO },
            });
        };
        place(100.0, 100.0);
        place(200.0, 100.0); // 100px from the first
        place(400.0, 100.0); // 200px from the second, 300px from the first

        let connections = field.connections(150.0);
        assert_eq!(connections.len(), 1);
        assert_eq!((connections[0].a, connections[0].b), (0, 1));
        let expected = 1.0 - 100.0 / 150.0;
        assert!((connections[0].strength - expected).abs() < 1e-4);
    }

    #[test]
    fn connection_strength_fades_to_zero_at_max_distance() {
        let mut field = ParticleField::new(800.0, 600.0);
        for x in [0.0, 149.9] {
            field.particles.push(Particle {
                pos: Vec2::new(x, 0.0),
                size: 2.0,
                base_size: 2.0,
                color: Color32::WHITE,
                growing: true,
                glow: 0.5,
                glow_growing: true,
                motion: Motion::Free { vel: Vec2::ZERO },
            });
        }
        let connections = field.connections(150.0);
        assert_eq!(connections.len(), 1);
        assert!(connections[0].strength < 0.01);
    }
}
