// Animation driver: resize -> simulate -> render -> present, once per host
// refresh, until the host goes away or `stop()` is called.
//
// Everything runs on one thread. The container size is polled at the top of
// each frame, so a resize always completes before the next step reads the
// simulation size.

use crate::config::VariantConfig;
use crate::error::Error;
use crate::motion::Motion;
use crate::render::Renderer;
use crate::surface::{Resize, Surfaces};
use crate::types::FrameBuffer;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Where frames go. Implemented by the window and by the headless renderer.
pub trait Host {
    /// Current container size in pixels. Either side may be zero.
    fn container_size(&self) -> (usize, usize);
    /// False once the component is no longer displayed.
    fn is_open(&self) -> bool;
    /// Show a finished frame. May block until the next refresh.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;
    /// Called instead of `present` when there is nothing to show.
    fn idle(&mut self) {}
}

/// Outcome of a single `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Presented,
    /// Zero-sized container: nothing drawn this time.
    Skipped,
    /// Torn down; no further frames.
    Stopped,
}

pub struct Animator {
    config: VariantConfig,
    surfaces: Surfaces,
    motion: Motion,
    renderer: Renderer,
    active: bool,
    presented: u64,
}

impl Animator {
    pub fn new(config: VariantConfig, seed: u64) -> Self {
        let surfaces = Surfaces::new(config.base_sim_size);
        let motion = Motion::new(&config, seed);
        let renderer = Renderer::new(config.filter.clone(), config.overscan);
        Self { config, surfaces, motion, renderer, active: true, presented: 0 }
    }

    /// Tear down: the next `tick` returns `Frame::Stopped` without touching the host.
    pub fn stop(&mut self) {
        if self.active {
            info!("animation stopped after {} frames", self.presented);
        }
        self.active = false;
    }

    /// Apply a container size. Motion state is rebuilt only on a real change.
    pub fn handle_resize(&mut self, width: usize, height: usize) -> Resize {
        let outcome = self.surfaces.resize(width, height);
        match outcome {
            Resize::Resized(sim) => {
                info!(
                    "{:?}: container {width}x{height}, simulation {}x{}",
                    self.config.kind(),
                    sim.width,
                    sim.height
                );
                self.motion.reset(sim, width);
            }
            Resize::Ignored => debug!("ignoring zero-sized container {width}x{height}"),
            Resize::Unchanged => {}
        }
        outcome
    }

    /// One simulate-and-render cycle.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> Result<Frame, Error> {
        if !self.active {
            return Ok(Frame::Stopped);
        }
        if !host.is_open() {
            self.stop();
            return Ok(Frame::Stopped);
        }

        let (w, h) = host.container_size();
        if self.handle_resize(w, h) == Resize::Ignored || !self.surfaces.is_ready() {
            host.idle();
            return Ok(Frame::Skipped);
        }

        self.motion.step();
        self.motion.draw(&mut self.surfaces.sim, &self.config.palette);
        self.renderer.composite(&self.surfaces.sim, &mut self.surfaces.display);

        if let Err(e) = host.present(&self.surfaces.display) {
            self.stop();
            return Err(e);
        }
        self.presented += 1;
        Ok(Frame::Presented)
    }

    /// Tick until stopped. Returns the number of frames presented.
    pub fn run<H: Host>(&mut self, host: &mut H) -> Result<u64, Error> {
        info!("animating {:?} background", self.config.kind());
        let mut fps = FpsCounter::new();
        while self.tick(host)? != Frame::Stopped {
            fps.frame();
        }
        Ok(self.presented)
    }
}

/// Logs frames per second once a second at debug level.
struct FpsCounter {
    since: Instant,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self { since: Instant::now(), frames: 0 }
    }

    fn frame(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            debug!("FPS: {:.1}", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}
