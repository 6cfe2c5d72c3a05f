// Swarm variant: seven translucent discs held near the centre of the grid.
// Visual outcomes:
// - Discs of different sizes wander in slow loops around the middle.
// - They overlap freely; where they stack the white gets denser.

use crate::config::SwarmParams;
use crate::draw::fill_disc;
use crate::types::{FrameBuffer, Rgb};
use rand::rngs::StdRng;
use rand::Rng;

/// One disc. Plain record, updated in place every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32, pub y: f32,        // position in simulation cells
    pub vx: f32, pub vy: f32,      // velocity in cells/frame
    pub radius: f32,               // fixed at creation
}

/// Advance one particle by one frame towards (cx,cy).
/// `noise` is a pair of uniform samples in [0,1) used for the jitter.
pub fn step_particle(p: &mut Particle, cx: f32, cy: f32, params: &SwarmParams, noise: (f32, f32)) {
    let dx = cx - p.x;
    let dy = cy - p.y;
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 || !dist.is_finite() {
        dist = 1.0;
    }

    let ax = dx / dist * params.attraction + (noise.0 - 0.5) * params.jitter;
    let ay = dy / dist * params.attraction + (noise.1 - 0.5) * params.jitter;

    p.vx = (p.vx + ax) * params.damping;
    p.vy = (p.vy + ay) * params.damping;

    p.x += p.vx;
    p.y += p.vy;
}

/// The swarm: particles plus the RNG that feeds their jitter.
pub struct Swarm {
    rng: StdRng,
    params: SwarmParams,
    particles: Vec<Particle>,
    center: (f32, f32),
}

impl Swarm {
    /// Empty until the first `reset`.
    pub fn new(rng: StdRng, params: SwarmParams) -> Self {
        Self {
            rng,
            params,
            particles: Vec::with_capacity(params.count),
            center: (0.0, 0.0),
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    /// Throw away all particles and spawn a fresh set at the centre of a
    /// `width x height` grid.
    pub fn reset(&mut self, width: usize, height: usize) {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        self.center = (cx, cy);
        self.particles.clear();

        let r_lo = ((cx + cy) / self.params.radius_min_div).round();
        let r_hi = ((cx + cy) / self.params.radius_max_div).round();

        for _ in 0..self.params.count {
            let radius = if r_hi > r_lo { self.rng.random_range(r_lo..r_hi) } else { r_lo };
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(self.params.speed_min..self.params.speed_max);
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                radius,
            });
        }
    }

    /// Move every particle one frame.
    pub fn step(&mut self) {
        let (cx, cy) = self.center;
        for p in self.particles.iter_mut() {
            let noise = (self.rng.random::<f32>(), self.rng.random::<f32>());
            step_particle(p, cx, cy, &self.params, noise);
        }
    }

    /// Composite all particles as half-transparent white discs.
    pub fn draw(&self, fb: &mut FrameBuffer) {
        for p in &self.particles {
            fill_disc(fb, p.x, p.y, p.radius, Rgb::WHITE, self.params.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn swarm(seed: u64) -> Swarm {
        Swarm::new(StdRng::seed_from_u64(seed), SwarmParams::default())
    }

    #[test]
    fn reset_spawns_seven_at_centre_with_bounded_radius() {
        let mut s = swarm(1);
        s.reset(55, 31);
        assert_eq!(s.particles().len(), 7);
        // cx + cy = 43 -> radius in [round(5.375), round(15.36)) = [5, 15)
        for p in s.particles() {
            assert_eq!((p.x, p.y), (27.5, 15.5));
            assert!(p.radius >= 5.0 && p.radius < 15.0, "radius {}", p.radius);
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((0.149..0.801).contains(&speed));
        }
    }

    #[test]
    fn reset_replaces_particles_instead_of_keeping_them() {
        let mut s = swarm(2);
        s.reset(55, 31);
        for _ in 0..50 {
            s.step();
        }
        s.reset(28, 55);
        assert_eq!(s.particles().len(), 7);
        assert_eq!(s.center(), (14.0, 27.5));
        assert!(s.particles().iter().all(|p| p.x == 14.0 && p.y == 27.5));
    }

    #[test]
    fn particle_at_centre_does_not_produce_nan() {
        let mut p = Particle { x: 10.0, y: 10.0, vx: 0.0, vy: 0.0, radius: 3.0 };
        step_particle(&mut p, 10.0, 10.0, &SwarmParams::default(), (0.5, 0.5));
        assert_eq!((p.x, p.y), (10.0, 10.0));
        assert!(p.vx.is_finite() && p.vy.is_finite());
    }

    #[test]
    fn attraction_pulls_towards_centre() {
        let params = SwarmParams { jitter: 0.0, ..SwarmParams::default() };
        let mut p = Particle { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0, radius: 1.0 };
        step_particle(&mut p, 10.0, 0.0, &params, (0.9, 0.1));
        assert!(p.vx > 0.0);
        assert_eq!(p.vy, 0.0);
        assert!((p.vx - 0.009 * 0.9975).abs() < 1e-7);
    }

    #[test]
    fn distance_from_centre_stays_bounded_over_a_long_run() {
        let mut s = swarm(42);
        s.reset(55, 31);
        let (cx, cy) = s.center();
        let mut total = 0.0f64;
        let steps = 5000;
        for _ in 0..steps {
            s.step();
            for p in s.particles() {
                let d = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
                assert!(d.is_finite());
                assert!(d < 500.0, "particle escaped to {d}");
                total += d as f64;
            }
        }
        let mean = total / (steps * 7) as f64;
        assert!(mean < 200.0, "mean distance {mean}");
    }

    #[test]
    fn same_seed_same_motion() {
        let mut a = swarm(9);
        let mut b = swarm(9);
        a.reset(55, 40);
        b.reset(55, 40);
        for _ in 0..100 {
            a.step();
            b.step();
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn draw_whitens_the_centre() {
        let mut s = swarm(3);
        s.reset(55, 31);
        let mut fb = FrameBuffer::new(55, 31, 0);
        s.draw(&mut fb);
        let c = Rgb::unpack(fb.get(27, 15));
        assert!(c.r > 200, "seven stacked half-white discs should be near white");
    }
}
