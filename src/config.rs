// Configuration: command line flags plus per-variant tuning.
// The motion constants and filter tables were tuned by eye; they live here as
// plain defaults so each variant can be adjusted without touching the loops.

use crate::error::Error;
use crate::filter::{FilterChain, FilterStage, Tone};
use crate::types::Rgb;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which background to animate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VariantKind {
    /// Seven translucent discs drifting around the centre
    Swarm,
    /// One pulsating disc emitting shockwave rings
    Pulse,
    /// Perlin noise clouds
    Noise,
}

/// Two brand colours with a neutral between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub a: Rgb, // gradient end at offset 1.0 / low noise values
    pub b: Rgb, // neutral band
    pub c: Rgb, // gradient end at offset 0.0 / high noise values
}

impl Palette {
    /// CSS `turquoise` / `white` / `coral`.
    pub const NAMED: Palette = Palette {
        a: Rgb::new(64, 224, 208),
        b: Rgb::WHITE,
        c: Rgb::new(255, 127, 80),
    };

    /// Site theme turquoise / white / coral.
    pub const BRAND: Palette = Palette {
        a: Rgb::new(72, 219, 193),
        b: Rgb::WHITE,
        c: Rgb::new(255, 133, 113),
    };

    /// Four-stop background gradient: neutral band in the middle, brand colours at the ends.
    pub fn gradient_stops(&self) -> [(f32, Rgb); 4] {
        [(1.0, self.a), (0.7, self.b), (0.3, self.b), (0.0, self.c)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwarmParams {
    pub count: usize,
    pub attraction: f32,
    pub jitter: f32,
    pub damping: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Radius range is [round((cx+cy)/min_div), round((cx+cy)/max_div)).
    pub radius_min_div: f32,
    pub radius_max_div: f32,
    pub alpha: f32,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            count: 7,
            attraction: 0.009,
            jitter: 0.002,
            damping: 0.9975,
            speed_min: 0.15,
            speed_max: 0.8,
            radius_min_div: 8.0,
            radius_max_div: 2.8,
            alpha: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseParams {
    pub shrink_speed: f32,
    pub expand_speed: f32,
    pub ring_growth: f32,
    pub ring_fade: f32,
    /// Base radius = sim_width / divisor.
    pub desktop_divisor: f32,
    pub mobile_divisor: f32,
    /// Containers at most this wide (px) count as mobile.
    pub mobile_breakpoint: usize,
    pub ring_width_desktop: f32,
    pub ring_width_mobile: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            shrink_speed: 0.1,
            expand_speed: 0.8,
            ring_growth: 1.0,
            ring_fade: 0.01,
            desktop_divisor: 6.0,
            mobile_divisor: 3.0,
            mobile_breakpoint: 768,
            ring_width_desktop: 2.0,
            ring_width_mobile: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
    /// Grid cells per noise unit along x and y.
    pub spatial_scale: f64,
    /// Frames per noise unit along the time axis.
    pub time_scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self { spatial_scale: 50.0, time_scale: 1200.0 }
    }
}

/// Motion tuning, tagged by variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionParams {
    Swarm(SwarmParams),
    Pulse(PulseParams),
    Noise(NoiseParams),
}

/// Everything one variant needs: simulation size, look, and motion.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantConfig {
    /// Length of the shorter simulation side in cells.
    pub base_sim_size: usize,
    /// Extra display pixels drawn past the left and right edges.
    pub overscan: usize,
    pub palette: Palette,
    pub filter: FilterChain,
    pub motion: MotionParams,
}

impl VariantConfig {
    pub fn kind(&self) -> VariantKind {
        match self.motion {
            MotionParams::Swarm(_) => VariantKind::Swarm,
            MotionParams::Pulse(_) => VariantKind::Pulse,
            MotionParams::Noise(_) => VariantKind::Noise,
        }
    }

    pub fn swarm() -> Self {
        Self {
            base_sim_size: 55,
            overscan: 60,
            palette: Palette::NAMED,
            filter: FilterChain {
                stages: vec![
                    FilterStage::Blur { std_dev: 15.0 },
                    FilterStage::discrete(&NINE_STEPS),
                    FilterStage::Blur { std_dev: 4.0 },
                    FilterStage::discrete(&WIDE_STEPS),
                ],
                tone: Tone::default(),
            },
            motion: MotionParams::Swarm(SwarmParams::default()),
        }
    }

    pub fn pulse() -> Self {
        Self {
            base_sim_size: 55,
            overscan: 60,
            palette: Palette::NAMED,
            filter: FilterChain {
                stages: vec![
                    FilterStage::Blur { std_dev: 32.0 },
                    FilterStage::discrete(&NINE_STEPS),
                    FilterStage::Blur { std_dev: 1.0 },
                    FilterStage::discrete(&WIDE_STEPS),
                ],
                tone: Tone::default(),
            },
            motion: MotionParams::Pulse(PulseParams::default()),
        }
    }

    pub fn noise() -> Self {
        let table = |v: &[f32]| Some(v.to_vec());
        Self {
            base_sim_size: 64,
            overscan: 0,
            palette: Palette::BRAND,
            filter: FilterChain {
                stages: vec![
                    FilterStage::Blur { std_dev: 50.0 },
                    FilterStage::Discrete {
                        r: table(&[0.8, 0.44559, 0.129, 0.787, 0.9, 0.78]),
                        g: None,
                        b: None,
                    },
                    FilterStage::Blur { std_dev: 60.0 },
                    FilterStage::Discrete {
                        r: table(&[1.0, 1.0, 0.9, 0.8, 1.0, 0.7]),
                        g: table(&[0.77, 0.777, 0.7, 0.98, 0.8777, 0.9988]),
                        b: table(&[0.45, 0.2222, 0.11, 0.7, 0.45, 0.9, 0.97]),
                    },
                    FilterStage::Blur { std_dev: 40.0 },
                    FilterStage::Discrete {
                        r: table(&[0.5451, 1.0, 1.0, 0.5, 0.74, 0.9657]),
                        g: table(&[0.45, 0.7811, 0.8777, 0.98, 0.8777, 0.9988]),
                        b: table(&[0.78, 0.999, 0.812, 0.974154, 0.7847, 0.878, 0.95]),
                    },
                ],
                tone: Tone { hue_rotate_deg: 190.0, grayscale: 0.4 },
            },
            motion: MotionParams::Noise(NoiseParams::default()),
        }
    }

    pub fn for_kind(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Swarm => Self::swarm(),
            VariantKind::Pulse => Self::pulse(),
            VariantKind::Noise => Self::noise(),
        }
    }
}

const NINE_STEPS: [f32; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
const WIDE_STEPS: [f32; 4] = [0.07, 0.37, 0.89, 1.0];

/// Command line flags.
#[derive(Debug, Parser)]
#[command(name = "backdrop")]
#[command(about = "Ambient animated background (swarm, pulse or Perlin noise)", long_about = None)]
pub struct Cli {
    /// Background variant to animate
    #[arg(short, long, value_enum, default_value_t = VariantKind::Swarm)]
    pub variant: VariantKind,

    /// Initial container width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: usize,

    /// Initial container height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: usize,

    /// Longer simulation side in cells (defaults per variant: 55, 55, 64)
    #[arg(long)]
    pub base_sim_size: Option<usize>,

    /// Seed for particle jitter and the noise permutation (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target presents per second in the window
    #[arg(long, default_value_t = 60)]
    pub fps: usize,

    /// Render without a window
    #[arg(long)]
    pub headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 120)]
    pub frames: u64,

    /// Write the last headless frame to this PNG
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Resolved run configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub variant: VariantConfig,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub fps: usize,
    pub headless: bool,
    pub frames: u64,
    pub snapshot: Option<PathBuf>,
}

impl Cli {
    /// Validate flags and fill in variant defaults.
    pub fn into_config(self) -> Result<AppConfig, Error> {
        let mut variant = VariantConfig::for_kind(self.variant);
        if let Some(base) = self.base_sim_size {
            if base == 0 {
                return Err(Error::Config("--base-sim-size must be at least 1".into()));
            }
            variant.base_sim_size = base;
        }
        if self.fps == 0 {
            return Err(Error::Config("--fps must be at least 1".into()));
        }
        if self.snapshot.is_some() && !self.headless {
            return Err(Error::Config("--snapshot requires --headless".into()));
        }
        if self.headless && self.snapshot.is_some() && self.frames == 0 {
            return Err(Error::Config("--snapshot needs at least one frame".into()));
        }
        Ok(AppConfig {
            variant,
            width: self.width,
            height: self.height,
            seed: self.seed.unwrap_or_else(rand::random),
            fps: self.fps,
            headless: self.headless,
            frames: self.frames,
            snapshot: self.snapshot,
        })
    }
}
