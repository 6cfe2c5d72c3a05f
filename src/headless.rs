// Off-screen host: renders a fixed number of frames into memory and can dump
// the last one as a PNG.
// Visual: nothing on screen; the snapshot file shows what the window would.

use crate::driver::Host;
use crate::error::Error;
use crate::types::{FrameBuffer, Rgb};
use image::{ImageBuffer, Rgb as ImageRgb, RgbImage};
use log::info;
use std::path::Path;

pub struct Headless {
    size: (usize, usize),
    remaining: u64,
    presented: u64,
    last: Option<FrameBuffer>,
}

impl Headless {
    /// A fixed `width x height` container that stays open for `frames` ticks.
    /// Idle ticks count too, so a zero-sized container still terminates.
    pub fn new(width: usize, height: usize, frames: u64) -> Self {
        Self { size: (width, height), remaining: frames, presented: 0, last: None }
    }

    /// Convert the last presented frame to an RGB image.
    pub fn snapshot(&self) -> Option<RgbImage> {
        let frame = self.last.as_ref()?;
        Some(ImageBuffer::from_fn(frame.width as u32, frame.height as u32, |x, y| {
            let c = Rgb::unpack(frame.get(x as usize, y as usize));
            ImageRgb([c.r, c.g, c.b])
        }))
    }

    /// Write the last presented frame to `path`. Returns false when no frame
    /// was ever presented.
    pub fn save_snapshot(&self, path: &Path) -> Result<bool, Error> {
        let Some(img) = self.snapshot() else {
            return Ok(false);
        };
        img.save(path)?;
        info!("frame {} ({}x{}) written to {}", self.presented, img.width(), img.height(), path.display());
        Ok(true)
    }
}

impl Host for Headless {
    fn container_size(&self) -> (usize, usize) {
        self.size
    }

    fn is_open(&self) -> bool {
        self.remaining > 0
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        match &mut self.last {
            Some(last) => last.clone_from(frame),
            None => self.last = Some(frame.clone()),
        }
        self.presented += 1;
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }

    fn idle(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}
