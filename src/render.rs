// Compositing: stretch the low-res simulation over the display buffer, then
// run the variant's blur/posterise chain.
// Visual: the tiny grid becomes a full-window image of soft banded blobs.

use crate::filter::{FilterChain, FilterScratch};
use crate::gamma::GammaLut;
use crate::types::{channel_u8, linear_taps, FrameBuffer, Rgb};

/// Draw all of `src` into the rectangle (-margin, 0, dst.width + 2*margin,
/// dst.height) of `dst`, with bilinear smoothing.
pub fn scale_bilinear(src: &FrameBuffer, dst: &mut FrameBuffer, margin: usize) {
    if src.is_empty() || dst.is_empty() {
        return;
    }
    let cols = linear_taps(dst.width, src.width, margin);
    let rows = linear_taps(dst.height, src.height, 0);

    // Stretch every source row horizontally once; each output row is then a
    // blend of two of these.
    let mut stretched = vec![[0.0f32; 3]; src.height * dst.width];
    for (sy, line) in stretched.chunks_exact_mut(dst.width).enumerate() {
        let row = &src.pixels[sy * src.width..(sy + 1) * src.width];
        for (out, &(x0, x1, fx)) in line.iter_mut().zip(&cols) {
            let (a, b) = (Rgb::unpack(row[x0]), Rgb::unpack(row[x1]));
            let mix = |a: u8, b: u8| a as f32 + (b as f32 - a as f32) * fx;
            *out = [mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b)];
        }
    }

    for (out, &(y0, y1, fy)) in dst.pixels.chunks_exact_mut(dst.width).zip(&rows) {
        let top = &stretched[y0 * dst.width..(y0 + 1) * dst.width];
        let bottom = &stretched[y1 * dst.width..(y1 + 1) * dst.width];
        for ((px, t), b) in out.iter_mut().zip(top).zip(bottom) {
            let ch = |c: usize| channel_u8(t[c] + (b[c] - t[c]) * fy);
            *px = Rgb::new(ch(0), ch(1), ch(2)).pack();
        }
    }
}

/// Owns the display-side work buffers and the filter chain for one variant.
pub struct Renderer {
    filter: FilterChain,
    overscan: usize,
    lut: GammaLut,
    scratch: FilterScratch,
}

impl Renderer {
    pub fn new(filter: FilterChain, overscan: usize) -> Self {
        Self { filter, overscan, lut: GammaLut::new(), scratch: FilterScratch::default() }
    }

    /// Clear, upscale, filter. `display` ends up holding the finished frame.
    pub fn composite(&mut self, sim: &FrameBuffer, display: &mut FrameBuffer) {
        display.fill(Rgb::WHITE.pack());
        scale_bilinear(sim, display, self.overscan);
        self.filter.apply(display, &mut self.scratch, &self.lut);
    }
}
