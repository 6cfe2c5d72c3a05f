// Pulse variant: one white disc that slowly shrinks, snaps back out, and
// leaves a fading shockwave ring behind each time it starts to expand.

use crate::config::PulseParams;
use crate::draw::{fill_disc, stroke_ring};
use crate::types::{FrameBuffer, Rgb};

// Float drift allowance when checking the radius against its bounds.
const BOUND_EPS: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Shrinking,
    Expanding,
}

/// A transient ring. Grows and fades every frame; dropped once invisible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shockwave {
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Clone, Debug)]
pub struct Pulse {
    params: PulseParams,
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub phase: Phase,
    pub rings: Vec<Shockwave>,
    ring_width: f32,
    center: (f32, f32),
}

impl Pulse {
    pub fn new(params: PulseParams) -> Self {
        Self {
            params,
            radius: 0.0,
            min_radius: 0.0,
            max_radius: 0.0,
            phase: Phase::Shrinking,
            rings: Vec::new(),
            ring_width: params.ring_width_desktop,
            center: (0.0, 0.0),
        }
    }

    /// Start over for a `width x height` grid. `mobile` selects the larger
    /// base radius and the thicker ring stroke.
    pub fn reset(&mut self, width: usize, height: usize, mobile: bool) {
        let divisor = if mobile { self.params.mobile_divisor } else { self.params.desktop_divisor };
        let base = width as f32 / divisor;
        self.radius = base;
        self.min_radius = base / 2.0;
        self.max_radius = base * 2.0;
        self.phase = Phase::Shrinking;
        self.rings.clear();
        self.ring_width = if mobile { self.params.ring_width_mobile } else { self.params.ring_width_desktop };
        self.center = (width as f32 / 2.0, height as f32 / 2.0);
    }

    /// One frame: age the existing rings, then move the disc (possibly
    /// spawning a new ring at the shrink -> expand turn).
    pub fn step(&mut self) {
        let growth = self.params.ring_growth;
        let fade = self.params.ring_fade;
        self.rings.retain_mut(|ring| {
            ring.radius += growth;
            ring.alpha -= fade;
            ring.alpha > 0.0
        });

        match self.phase {
            Phase::Shrinking => {
                self.radius -= self.params.shrink_speed;
                if self.radius <= self.min_radius + BOUND_EPS {
                    self.radius = self.min_radius;
                    self.phase = Phase::Expanding;
                    self.rings.push(Shockwave { radius: self.radius, alpha: 1.0 });
                }
            }
            Phase::Expanding => {
                self.radius += self.params.expand_speed;
                if self.radius >= self.max_radius - BOUND_EPS {
                    self.radius = self.max_radius;
                    self.phase = Phase::Shrinking;
                }
            }
        }
    }

    /// Disc first, rings over it.
    pub fn draw(&self, fb: &mut FrameBuffer) {
        let (cx, cy) = self.center;
        fill_disc(fb, cx, cy, self.radius, Rgb::WHITE, 1.0);
        for ring in &self.rings {
            stroke_ring(fb, cx, cy, ring.radius, self.ring_width, Rgb::WHITE, ring.alpha);
        }
    }
}
