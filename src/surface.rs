// Resize coordination: keeps the low-res simulation grid and the full-size
// display buffer matched to the container.
// Visual: whatever the window shape, the blobs keep their proportions and
// the grid never grows past `base` cells on its long side.

use crate::types::FrameBuffer;

/// Simulation grid size in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimSize {
    pub width: usize,
    pub height: usize,
}

/// Derive the simulation grid for a container. The side matching the
/// container's longer side is `base`; the other follows the aspect ratio
/// (rounded, never below one cell).
/// Returns `None` for a zero-sized container.
pub fn sim_dimensions(container_w: usize, container_h: usize, base: usize) -> Option<SimSize> {
    if container_w == 0 || container_h == 0 || base == 0 {
        return None;
    }
    let aspect = container_w as f64 / container_h as f64;
    let base_f = base as f64;
    let size = if aspect >= 1.0 {
        // Wide or square
        SimSize { width: base, height: ((base_f / aspect).round() as usize).max(1) }
    } else {
        // Tall
        SimSize { width: ((base_f * aspect).round() as usize).max(1), height: base }
    };
    Some(size)
}

/// What a resize request turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resize {
    /// Zero-sized container; nothing changed, try again on the next event.
    Ignored,
    /// Same container as before; state untouched.
    Unchanged,
    /// Buffers reallocated; motion state must be reset.
    Resized(SimSize),
}

/// The two drawing targets and the container they were sized for.
pub struct Surfaces {
    pub sim: FrameBuffer,
    pub display: FrameBuffer,
    container: (usize, usize),
    base: usize,
}

impl Surfaces {
    pub fn new(base: usize) -> Self {
        Self {
            sim: FrameBuffer::new(0, 0, 0),
            display: FrameBuffer::new(0, 0, 0),
            container: (0, 0),
            base,
        }
    }

    /// True once a non-zero container has been seen.
    pub fn is_ready(&self) -> bool {
        !self.sim.is_empty() && !self.display.is_empty()
    }

    /// Resize both surfaces for a container of `width x height` pixels.
    pub fn resize(&mut self, width: usize, height: usize) -> Resize {
        if (width, height) == self.container && self.is_ready() {
            return Resize::Unchanged;
        }
        let Some(sim) = sim_dimensions(width, height, self.base) else {
            return Resize::Ignored;
        };
        self.container = (width, height);
        self.display.resize(width, height);
        self.sim.resize(sim.width, sim.height);
        Resize::Resized(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_container() {
        assert_eq!(sim_dimensions(1600, 900, 55), Some(SimSize { width: 55, height: 31 }));
    }

    #[test]
    fn tall_container() {
        assert_eq!(sim_dimensions(400, 800, 55), Some(SimSize { width: 28, height: 55 }));
    }

    #[test]
    fn square_container_uses_base_on_both_sides() {
        assert_eq!(sim_dimensions(700, 700, 64), Some(SimSize { width: 64, height: 64 }));
    }

    #[test]
    fn zero_sized_container_is_rejected() {
        assert_eq!(sim_dimensions(0, 900, 55), None);
        assert_eq!(sim_dimensions(900, 0, 55), None);
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_cell() {
        assert_eq!(sim_dimensions(100_000, 1, 55), Some(SimSize { width: 55, height: 1 }));
    }

    #[test]
    fn base_side_is_fixed_and_aspect_is_preserved() {
        for &(w, h) in &[(1920, 1080), (1080, 1920), (333, 777), (1000, 999), (3440, 1440), (360, 640)] {
            let s = sim_dimensions(w, h, 55).unwrap();
            assert_eq!(s.width.max(s.height), 55, "{w}x{h}");
            // Other side is within half a cell of the exact aspect-preserving length.
            let ratio = w.min(h) as f64 / w.max(h) as f64;
            let short = s.width.min(s.height) as f64;
            assert!((short - 55.0 * ratio).abs() <= 0.5, "{w}x{h}: short side {short}");
            assert_eq!(s.width >= s.height, w >= h);
        }
    }

    #[test]
    fn resize_is_idempotent() {
        let mut s = Surfaces::new(55);
        assert_eq!(s.resize(1600, 900), Resize::Resized(SimSize { width: 55, height: 31 }));
        let first = (s.sim.width, s.sim.height);
        assert_eq!(s.resize(1600, 900), Resize::Unchanged);
        assert_eq!((s.sim.width, s.sim.height), first);
        assert_eq!((s.display.width, s.display.height), (1600, 900));
    }

    #[test]
    fn zero_resize_keeps_previous_surfaces() {
        let mut s = Surfaces::new(55);
        s.resize(400, 800);
        assert_eq!(s.resize(0, 0), Resize::Ignored);
        assert_eq!((s.sim.width, s.sim.height), (28, 55));
        assert_eq!(s.container, (400, 800));
        assert!(s.is_ready());
    }

    #[test]
    fn nothing_ready_before_first_real_size() {
        let mut s = Surfaces::new(55);
        assert!(!s.is_ready());
        assert_eq!(s.resize(0, 10), Resize::Ignored);
        assert!(!s.is_ready());
    }
}
