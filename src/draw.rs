// Window host + software drawing utilities.
// Visual effects provided here:
// 1) A resizable window that shows the composited background.
// 2) The vertical brand gradient painted behind every swarm/pulse frame.
// 3) Anti-aliased discs and rings (4x4 supersampled coverage, source-over).

use crate::driver::Host;
use crate::error::Error;
use crate::types::{FrameBuffer, Rgb};
use minifb::{Key, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window paced at `fps` presents per second.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, fps: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(fps);
        Ok(Self { window })
    }
}

impl Host for Drawer {
    /// The window's client area is the container we fill.
    fn container_size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// False once the user closes the window or presses ESC.
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Push the pixels for this frame to the screen. minifb blocks here until
    /// the next refresh slot, which is what paces the animation.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    // Minimised or zero-sized: keep pumping events so a later resize is seen.
    fn idle(&mut self) {
        self.window.update();
    }
}

/* ---------- Software drawing ---------- */

const SUBSAMPLES: usize = 4;

/// Source-over blend of `color` at `alpha` (0..1) onto pixel (x,y).
#[inline]
fn blend_pixel(fb: &mut FrameBuffer, x: usize, y: usize, color: Rgb, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let idx = y * fb.width + x;
    let dst = Rgb::unpack(fb.pixels[idx]);
    fb.pixels[idx] = dst.lerp(color, alpha.min(1.0)).pack();
}

/// Paint a vertical linear gradient over the whole surface.
/// `stops` are (offset, colour) pairs; offset 0 is the first row, 1 the last.
/// Visual: horizontal bands fading from one brand colour through white to the other.
pub fn fill_vertical_gradient(fb: &mut FrameBuffer, stops: &[(f32, Rgb)]) {
    if fb.is_empty() || stops.is_empty() {
        return;
    }
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    for y in 0..fb.height {
        let t = (y as f32 + 0.5) / fb.height as f32;
        let color = sample_stops(&sorted, t).pack();
        let row = y * fb.width;
        fb.pixels[row..row + fb.width].fill(color);
    }
}

// Canvas semantics: before the first stop / after the last stop the end colour holds.
fn sample_stops(stops: &[(f32, Rgb)], t: f32) -> Rgb {
    let first = stops[0];
    if t <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (o0, c0) = pair[0];
        let (o1, c1) = pair[1];
        if t <= o1 {
            let span = o1 - o0;
            if span <= f32::EPSILON {
                return c1;
            }
            return c0.lerp(c1, (t - o0) / span);
        }
    }
    stops[stops.len() - 1].1
}

/// Fraction of pixel (x,y) covered by `inside`, estimated on a 4x4 grid.
fn coverage(x: usize, y: usize, inside: impl Fn(f32, f32) -> bool) -> f32 {
    let mut hits = 0;
    for sy in 0..SUBSAMPLES {
        for sx in 0..SUBSAMPLES {
            let px = x as f32 + (sx as f32 + 0.5) / SUBSAMPLES as f32;
            let py = y as f32 + (sy as f32 + 0.5) / SUBSAMPLES as f32;
            if inside(px, py) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SUBSAMPLES * SUBSAMPLES) as f32
}

/// Pixel-space bounding box of a circle of `reach` around (cx,cy), clipped.
fn clip_box(fb: &FrameBuffer, cx: f32, cy: f32, reach: f32) -> Option<(usize, usize, usize, usize)> {
    if fb.is_empty() || !reach.is_finite() || !cx.is_finite() || !cy.is_finite() {
        return None;
    }
    let x0 = (cx - reach).floor().max(0.0);
    let y0 = (cy - reach).floor().max(0.0);
    let x1 = (cx + reach).ceil().min(fb.width as f32 - 1.0);
    let y1 = (cy + reach).ceil().min(fb.height as f32 - 1.0);
    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
}

/// Filled disc centred at (cx,cy), composited at `alpha`.
/// Visual: a soft-edged round blob (a swarm particle or the pulse core).
pub fn fill_disc(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
    if radius <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip_box(fb, cx, cy, radius) else { return };
    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let cov = coverage(x, y, |px, py| {
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r2
            });
            blend_pixel(fb, x, y, color, cov * alpha);
        }
    }
}

/// Circle outline of `line_width` centred on `radius`, composited at `alpha`.
/// Visual: a thin shockwave ring.
pub fn stroke_ring(
    fb: &mut FrameBuffer,
    cx: f32, cy: f32,
    radius: f32,
    line_width: f32,
    color: Rgb,
    alpha: f32,
) {
    if radius <= 0.0 || line_width <= 0.0 || alpha <= 0.0 {
        return;
    }
    let half = line_width * 0.5;
    let Some((x0, y0, x1, y1)) = clip_box(fb, cx, cy, radius + half) else { return };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let cov = coverage(x, y, |px, py| {
                let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                (d - radius).abs() <= half
            });
            blend_pixel(fb, x, y, color, cov * alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORAL: Rgb = Rgb::new(255, 127, 80);
    const TURQUOISE: Rgb = Rgb::new(64, 224, 208);

    fn brand_stops() -> [(f32, Rgb); 4] {
        [(1.0, TURQUOISE), (0.7, Rgb::WHITE), (0.3, Rgb::WHITE), (0.0, CORAL)]
    }

    #[test]
    fn gradient_has_white_band_between_brand_ends() {
        let mut fb = FrameBuffer::new(3, 20, 0);
        fill_vertical_gradient(&mut fb, &brand_stops());
        // Row 0 centre sits at t=0.025, close to coral.
        let top = Rgb::unpack(fb.get(0, 0));
        assert_eq!(top.r, 255);
        assert!(top.g < 140);
        // Middle rows are pure white.
        assert_eq!(fb.get(1, 10), 0x00FF_FFFF);
        // Last row is near turquoise.
        let bottom = Rgb::unpack(fb.get(2, 19));
        assert!(bottom.r < 90);
        // Every row is uniform across its width.
        for y in 0..20 {
            assert_eq!(fb.get(0, y), fb.get(2, y));
        }
    }

    #[test]
    fn disc_is_opaque_at_centre_and_absent_far_away() {
        let mut fb = FrameBuffer::new(20, 20, 0);
        fill_disc(&mut fb, 10.0, 10.0, 4.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(10, 10), 0x00FF_FFFF);
        assert_eq!(fb.get(0, 0), 0);
        assert_eq!(fb.get(19, 10), 0);
    }

    #[test]
    fn half_alpha_disc_mixes_with_background() {
        let mut fb = FrameBuffer::new(10, 10, 0);
        fill_disc(&mut fb, 5.0, 5.0, 3.0, Rgb::WHITE, 0.5);
        let c = Rgb::unpack(fb.get(5, 5));
        assert!((127..=128).contains(&c.r));
    }

    #[test]
    fn ring_leaves_centre_untouched() {
        let mut fb = FrameBuffer::new(30, 30, 0);
        stroke_ring(&mut fb, 15.0, 15.0, 10.0, 2.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(15, 15), 0);
        assert_ne!(fb.get(25, 15), 0);
    }

    #[test]
    fn shapes_outside_the_surface_are_clipped() {
        let mut fb = FrameBuffer::new(8, 8, 0);
        fill_disc(&mut fb, -50.0, -50.0, 5.0, Rgb::WHITE, 1.0);
        stroke_ring(&mut fb, 100.0, 4.0, 3.0, 2.0, Rgb::WHITE, 1.0);
        fill_disc(&mut fb, f32::NAN, 4.0, 3.0, Rgb::WHITE, 1.0);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }
}
