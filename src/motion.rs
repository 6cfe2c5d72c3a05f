// One interface over the three background variants.
// The driver only ever talks to `Motion`; which state machine sits behind it
// is decided once from the variant config.

use crate::config::{MotionParams, Palette, VariantConfig};
use crate::draw::fill_vertical_gradient;
use crate::noise::NoiseField;
use crate::pulse::Pulse;
use crate::surface::SimSize;
use crate::swarm::Swarm;
use crate::types::FrameBuffer;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub enum Motion {
    Swarm(Swarm),
    Pulse { pulse: Pulse, breakpoint: usize },
    Noise(NoiseField),
}

impl Motion {
    pub fn new(config: &VariantConfig, seed: u64) -> Self {
        match config.motion {
            MotionParams::Swarm(params) => Motion::Swarm(Swarm::new(StdRng::seed_from_u64(seed), params)),
            MotionParams::Pulse(params) => Motion::Pulse {
                pulse: Pulse::new(params),
                breakpoint: params.mobile_breakpoint,
            },
            MotionParams::Noise(params) => Motion::Noise(NoiseField::new(seed, params, config.palette)),
        }
    }

    /// Reinitialise for a new simulation grid. `container_width` is the
    /// display width in pixels (decides mobile vs desktop sizing).
    pub fn reset(&mut self, sim: SimSize, container_width: usize) {
        match self {
            Motion::Swarm(swarm) => swarm.reset(sim.width, sim.height),
            Motion::Pulse { pulse, breakpoint } => {
                pulse.reset(sim.width, sim.height, container_width <= *breakpoint)
            }
            // The field is a pure function of (x, y, t); only the buffer changes.
            Motion::Noise(_) => {}
        }
    }

    /// Advance by exactly one frame.
    pub fn step(&mut self) {
        match self {
            Motion::Swarm(swarm) => swarm.step(),
            Motion::Pulse { pulse, .. } => pulse.step(),
            Motion::Noise(field) => field.step(),
        }
    }

    /// Paint the current state onto the simulation surface, background first.
    pub fn draw(&self, sim: &mut FrameBuffer, palette: &Palette) {
        match self {
            Motion::Swarm(swarm) => {
                fill_vertical_gradient(sim, &palette.gradient_stops());
                swarm.draw(sim);
            }
            Motion::Pulse { pulse, .. } => {
                fill_vertical_gradient(sim, &palette.gradient_stops());
                pulse.draw(sim);
            }
            Motion::Noise(field) => field.draw(sim),
        }
    }
}
