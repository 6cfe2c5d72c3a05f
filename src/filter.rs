// Post-process filter chain applied to the upscaled display frame.
// Visual expectation: the crisp upscaled simulation turns into soft,
// posterised "lava lamp" blobs with a few discrete colour bands.
//
// Stages run in linear light (like SVG filter primitives), then an optional
// CSS-style tone pass (hue rotation + grayscale) runs back in sRGB.
use crate::gamma::{GammaLut, Linear};
use crate::types::{channel_u8, linear_taps, FrameBuffer, Rgb};

/// One primitive of the chain.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterStage {
    /// Gaussian blur with the given standard deviation in display pixels.
    Blur { std_dev: f32 },
    /// Per-channel discrete transfer. `None` leaves that channel untouched.
    Discrete {
        r: Option<Vec<f32>>,
        g: Option<Vec<f32>>,
        b: Option<Vec<f32>>,
    },
}

impl FilterStage {
    /// Same table on all three channels.
    pub fn discrete(table: &[f32]) -> Self {
        FilterStage::Discrete {
            r: Some(table.to_vec()),
            g: Some(table.to_vec()),
            b: Some(table.to_vec()),
        }
    }
}

/// sRGB tone adjustment applied after the linear stages.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tone {
    pub hue_rotate_deg: f32,
    pub grayscale: f32, // 0 = untouched, 1 = fully grey
}

impl Tone {
    pub fn is_identity(&self) -> bool {
        self.hue_rotate_deg % 360.0 == 0.0 && self.grayscale <= 0.0
    }

    /// Combined colour matrix: grayscale applied after hue rotation.
    pub fn matrix(&self) -> [[f32; 3]; 3] {
        let (sin, cos) = self.hue_rotate_deg.to_radians().sin_cos();
        let hue = [
            [0.213 + cos * 0.787 - sin * 0.213, 0.715 - cos * 0.715 - sin * 0.715, 0.072 - cos * 0.072 + sin * 0.928],
            [0.213 - cos * 0.213 + sin * 0.143, 0.715 + cos * 0.285 + sin * 0.140, 0.072 - cos * 0.072 - sin * 0.283],
            [0.213 - cos * 0.213 - sin * 0.787, 0.715 - cos * 0.715 + sin * 0.715, 0.072 + cos * 0.928 + sin * 0.072],
        ];
        let s = 1.0 - self.grayscale.clamp(0.0, 1.0);
        let grey = [
            [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
            [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
            [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
        ];
        let mut out = [[0.0f32; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| grey[i][k] * hue[k][j]).sum();
            }
        }
        out
    }
}

/// Ordered stages plus the trailing tone pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterChain {
    pub stages: Vec<FilterStage>,
    pub tone: Tone,
}

/// Linear-light work buffers reused every frame.
#[derive(Default)]
pub struct FilterScratch {
    work: Vec<Linear>,
    tmp: Vec<Linear>,
    // Reduced grid for wide blurs
    small: Vec<Linear>,
    small_tmp: Vec<Linear>,
}

impl FilterChain {
    /// Run the whole chain over `fb` in place.
    pub fn apply(&self, fb: &mut FrameBuffer, scratch: &mut FilterScratch, lut: &GammaLut) {
        if fb.is_empty() {
            return;
        }
        if !self.stages.is_empty() {
            let n = fb.pixels.len();
            scratch.work.clear();
            scratch.work.extend(fb.pixels.iter().map(|&px| lut.decode(px)));
            scratch.tmp.resize(n, [0.0; 3]);

            for stage in &self.stages {
                match stage {
                    FilterStage::Blur { std_dev } => blur_stage(scratch, fb.width, fb.height, *std_dev),
                    FilterStage::Discrete { r, g, b } => {
                        let tables = [r.as_deref(), g.as_deref(), b.as_deref()];
                        for px in scratch.work.iter_mut() {
                            for (c, table) in px.iter_mut().zip(tables) {
                                if let Some(table) = table {
                                    *c = discrete(table, *c);
                                }
                            }
                        }
                    }
                }
            }

            for (dst, &px) in fb.pixels.iter_mut().zip(&scratch.work) {
                *dst = lut.encode(px);
            }
        }

        if !self.tone.is_identity() {
            let m = self.tone.matrix();
            for px in fb.pixels.iter_mut() {
                let c = Rgb::unpack(*px);
                let v = [c.r as f32, c.g as f32, c.b as f32];
                let ch = |row: [f32; 3]| channel_u8(row[0] * v[0] + row[1] * v[1] + row[2] * v[2]);
                *px = Rgb::new(ch(m[0]), ch(m[1]), ch(m[2])).pack();
            }
        }
    }
}

/// Discrete transfer: C' = v[k], k = floor(C * n) clamped to the last entry.
pub fn discrete(table: &[f32], c: f32) -> f32 {
    if table.is_empty() {
        return c;
    }
    let n = table.len();
    let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
    let k = ((c * n as f32).floor() as usize).min(n - 1);
    table[k].clamp(0.0, 1.0)
}

/// Box width used for each of the three passes approximating a Gaussian.
pub fn box_width(std_dev: f32) -> usize {
    if !(std_dev > 0.0) {
        return 0;
    }
    let d = std_dev * 3.0 * (2.0 * std::f32::consts::PI).sqrt() / 4.0 + 0.5;
    d.floor() as usize
}

// Coarsest grid reduction used for wide blurs.
const MAX_BLUR_SCALE: usize = 8;
// Tile edge for the cache-friendly transpose.
const TILE: usize = 32;

/// Grid reduction for a blur of `std_dev`: the largest power of two no more
/// than half the deviation, capped at `MAX_BLUR_SCALE`. Wide blurs run on the
/// reduced grid and are stretched back; narrow ones run at full size.
pub fn blur_scale(std_dev: f32) -> usize {
    let mut k = 1;
    while k < MAX_BLUR_SCALE && (k * 4) as f32 <= std_dev {
        k *= 2;
    }
    k
}

fn blur_stage(scratch: &mut FilterScratch, w: usize, h: usize, std_dev: f32) {
    let k = blur_scale(std_dev);
    if k == 1 {
        gaussian_blur(&mut scratch.work, &mut scratch.tmp, w, h, std_dev);
        return;
    }
    let (sw, sh) = downsample(&scratch.work, w, h, k, &mut scratch.small);
    scratch.small_tmp.resize(sw * sh, [0.0; 3]);
    gaussian_blur(&mut scratch.small, &mut scratch.small_tmp, sw, sh, std_dev / k as f32);
    upsample(&scratch.small, sw, sh, &mut scratch.work, w, h);
}

/// Average `k x k` blocks (clipped at the right and bottom edges).
fn downsample(src: &[Linear], w: usize, h: usize, k: usize, dst: &mut Vec<Linear>) -> (usize, usize) {
    let (sw, sh) = (w.div_ceil(k), h.div_ceil(k));
    dst.clear();
    dst.resize(sw * sh, [0.0; 3]);
    for (y, row) in src.chunks_exact(w).enumerate() {
        let cells = &mut dst[(y / k) * sw..(y / k + 1) * sw];
        for (x, p) in row.iter().enumerate() {
            let cell = &mut cells[x / k];
            for c in 0..3 {
                cell[c] += p[c];
            }
        }
    }
    for (cy, cells) in dst.chunks_exact_mut(sw).enumerate() {
        let rows = k.min(h - cy * k);
        for (cx, cell) in cells.iter_mut().enumerate() {
            let inv = 1.0 / (rows * k.min(w - cx * k)) as f32;
            for v in cell.iter_mut() {
                *v *= inv;
            }
        }
    }
    (sw, sh)
}

/// Bilinear stretch of an `sw x sh` grid over `w x h`.
fn upsample(src: &[Linear], sw: usize, sh: usize, dst: &mut [Linear], w: usize, h: usize) {
    let cols = linear_taps(w, sw, 0);
    let rows = linear_taps(h, sh, 0);
    for (out, &(y0, y1, fy)) in dst.chunks_exact_mut(w).zip(&rows) {
        let top = &src[y0 * sw..(y0 + 1) * sw];
        let bottom = &src[y1 * sw..(y1 + 1) * sw];
        for (px, &(x0, x1, fx)) in out.iter_mut().zip(&cols) {
            for c in 0..3 {
                let t = top[x0][c] + (top[x1][c] - top[x0][c]) * fx;
                let b = bottom[x0][c] + (bottom[x1][c] - bottom[x0][c]) * fx;
                px[c] = t + (b - t) * fy;
            }
        }
    }
}

/// Three box passes per axis. Odd widths are centred; even widths use two
/// boxes offset half a pixel each way plus one box one pixel wider.
/// Columns are blurred as rows of the transposed image.
fn gaussian_blur(buf: &mut Vec<Linear>, tmp: &mut Vec<Linear>, w: usize, h: usize, std_dev: f32) {
    let d = box_width(std_dev);
    if d <= 1 {
        return;
    }
    let windows = if d % 2 == 1 {
        let r = (d - 1) / 2;
        [(r, r), (r, r), (r, r)]
    } else {
        let r = d / 2;
        [(r, r - 1), (r - 1, r), (r, r)]
    };
    box_rows(buf, tmp, w, &windows);
    transpose(buf, tmp, w, h);
    std::mem::swap(buf, tmp);
    box_rows(buf, tmp, h, &windows);
    transpose(buf, tmp, h, w);
    std::mem::swap(buf, tmp);
}

/// Run each window over every row of `buf`; the result ends up in `buf`.
fn box_rows(buf: &mut Vec<Linear>, tmp: &mut Vec<Linear>, w: usize, windows: &[(usize, usize)]) {
    for &(left, right) in windows {
        for (src, dst) in buf.chunks_exact(w).zip(tmp.chunks_exact_mut(w)) {
            box_line(src, dst, left, right);
        }
        std::mem::swap(buf, tmp);
    }
}

/// Sliding-window mean over [i - left, i + right].
/// Edge pixels are extended so borders don't darken.
fn box_line(src: &[Linear], dst: &mut [Linear], left: usize, right: usize) {
    let last = src.len() - 1;
    let win = (left + right + 1) as f32;

    // Prime the window for i = 0
    let mut sum = [0.0f32; 3];
    for k in -(left as isize)..=(right as isize) {
        let p = src[k.clamp(0, last as isize) as usize];
        for c in 0..3 {
            sum[c] += p[c];
        }
    }

    // Slide: emit, then drop the left sample and take the next right one
    for (i, out) in dst.iter_mut().enumerate() {
        *out = [sum[0] / win, sum[1] / win, sum[2] / win];
        let p_sub = src[i.saturating_sub(left)];
        let p_add = src[(i + right + 1).min(last)];
        for c in 0..3 {
            sum[c] += p_add[c] - p_sub[c];
        }
    }
}

/// `src` is `w x h`; `dst` becomes its `h x w` transpose.
fn transpose(src: &[Linear], dst: &mut [Linear], w: usize, h: usize) {
    for ty in (0..h).step_by(TILE) {
        for tx in (0..w).step_by(TILE) {
            for y in ty..(ty + TILE).min(h) {
                for x in tx..(tx + TILE).min(w) {
                    dst[x * h + y] = src[y * w + x];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<f32> {
        (1..=9).map(|i| i as f32 / 10.0).collect()
    }

    #[test]
    fn box_width_follows_gaussian_approximation() {
        assert_eq!(box_width(15.0), 28);
        assert_eq!(box_width(4.0), 8);
        assert_eq!(box_width(1.0), 2);
        assert_eq!(box_width(0.0), 0);
        assert_eq!(box_width(f32::NAN), 0);
    }

    #[test]
    fn discrete_picks_table_bucket() {
        let t = ramp();
        assert_eq!(discrete(&t, 0.0), 0.1);
        assert_eq!(discrete(&t, 0.5), 0.5);
        assert_eq!(discrete(&t, 1.0), 0.9);
        assert_eq!(discrete(&t, 2.0), 0.9);
        assert_eq!(discrete(&[0.2, 7.0], 0.9), 1.0);
        assert_eq!(discrete(&[], 0.3), 0.3);
    }

    #[test]
    fn blur_keeps_uniform_image_uniform() {
        let mut fb = FrameBuffer::new(40, 30, 0x00_80_40_C0);
        let chain = FilterChain {
            stages: vec![FilterStage::Blur { std_dev: 6.0 }],
            tone: Tone::default(),
        };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        for &px in &fb.pixels {
            let c = Rgb::unpack(px);
            assert!((c.r as i16 - 0x80).abs() <= 1);
            assert!((c.g as i16 - 0x40).abs() <= 1);
            assert!((c.b as i16 - 0xC0).abs() <= 1);
        }
    }

    #[test]
    fn blur_spreads_a_point_symmetrically() {
        let mut fb = FrameBuffer::new(21, 21, 0);
        fb.pixels[10 * 21 + 10] = 0x00FF_FFFF;
        let chain = FilterChain {
            stages: vec![FilterStage::Blur { std_dev: 2.0 }],
            tone: Tone::default(),
        };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        let centre = fb.get(10, 10) & 0xFF;
        assert!(centre > 0 && centre < 255);
        let close = |a: u32, b: u32| ((a & 0xFF) as i32 - (b & 0xFF) as i32).abs() <= 1;
        assert!(close(fb.get(7, 10), fb.get(13, 10)));
        assert!(close(fb.get(10, 7), fb.get(10, 13)));
        assert_eq!(fb.get(0, 0), 0);
    }

    #[test]
    fn posterise_collapses_to_table_values() {
        let mut fb = FrameBuffer::new(16, 1, 0);
        for (i, px) in fb.pixels.iter_mut().enumerate() {
            let v = (i * 17) as u8;
            *px = Rgb::new(v, v, v).pack();
        }
        let chain = FilterChain { stages: vec![FilterStage::discrete(&[0.0, 1.0])], tone: Tone::default() };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        assert!(fb.pixels.iter().all(|&p| p == 0 || p == 0x00FF_FFFF));
        assert_eq!(fb.pixels[0], 0);
        assert_eq!(fb.pixels[15], 0x00FF_FFFF);
    }

    #[test]
    fn discrete_without_table_leaves_channel() {
        let mut fb = FrameBuffer::new(2, 2, Rgb::new(10, 200, 90).pack());
        let chain = FilterChain {
            stages: vec![FilterStage::Discrete { r: Some(vec![1.0]), g: None, b: None }],
            tone: Tone::default(),
        };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        let c = Rgb::unpack(fb.pixels[0]);
        assert_eq!(c.r, 255);
        assert!((c.g as i16 - 200).abs() <= 1);
        assert!((c.b as i16 - 90).abs() <= 1);
    }

    #[test]
    fn full_grayscale_equalises_channels() {
        let mut fb = FrameBuffer::new(1, 1, Rgb::new(255, 40, 10).pack());
        let chain = FilterChain { stages: vec![], tone: Tone { hue_rotate_deg: 0.0, grayscale: 1.0 } };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        let c = Rgb::unpack(fb.pixels[0]);
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
    }

    #[test]
    fn hue_rotation_keeps_grey_grey() {
        let m = Tone { hue_rotate_deg: 190.0, grayscale: 0.0 }.matrix();
        for row in m {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-3);
        }
        assert!(Tone::default().is_identity());
        assert!(!Tone { hue_rotate_deg: 190.0, grayscale: 0.4 }.is_identity());
    }

    #[test]
    fn blur_scale_only_reduces_wide_blurs() {
        assert_eq!(blur_scale(1.0), 1);
        assert_eq!(blur_scale(2.0), 1);
        assert_eq!(blur_scale(4.0), 2);
        assert_eq!(blur_scale(15.0), 4);
        assert_eq!(blur_scale(32.0), 8);
        assert_eq!(blur_scale(60.0), 8);
        assert_eq!(blur_scale(f32::NAN), 1);
    }

    #[test]
    fn wide_blur_on_reduced_grid_tracks_full_resolution() {
        let (w, h) = (96, 96);
        let disc: Vec<Linear> = (0..w * h)
            .map(|i| {
                let (x, y) = ((i % w) as f32 - 48.0, (i / w) as f32 - 48.0);
                if x * x + y * y < 24.0 * 24.0 { [1.0; 3] } else { [0.0; 3] }
            })
            .collect();
        assert_eq!(blur_scale(8.5), 4);

        let mut full = disc.clone();
        gaussian_blur(&mut full, &mut vec![[0.0; 3]; w * h], w, h, 8.5);
        let mut scratch = FilterScratch { work: disc, tmp: vec![[0.0; 3]; w * h], ..Default::default() };
        blur_stage(&mut scratch, w, h, 8.5);

        let worst = full
            .iter()
            .zip(&scratch.work)
            .map(|(a, b)| (a[0] - b[0]).abs())
            .fold(0.0f32, f32::max);
        assert!(worst < 0.06, "max deviation {worst}");
    }

    #[test]
    fn blur_treats_both_axes_alike_on_non_square_frames() {
        let mut fb = FrameBuffer::new(31, 17, 0);
        fb.pixels[8 * 31 + 15] = 0x00FF_FFFF;
        let chain = FilterChain {
            stages: vec![FilterStage::Blur { std_dev: 2.0 }],
            tone: Tone::default(),
        };
        chain.apply(&mut fb, &mut FilterScratch::default(), &GammaLut::new());
        let close = |a: u32, b: u32| ((a & 0xFF) as i32 - (b & 0xFF) as i32).abs() <= 1;
        for off in 1..=3 {
            assert!(close(fb.get(15 + off, 8), fb.get(15, 8 + off)), "offset {off}");
            assert!(close(fb.get(15 - off, 8), fb.get(15, 8 - off)), "offset {off}");
        }
        assert!(fb.get(15, 8) & 0xFF > 0);
    }

    #[test]
    fn downsample_then_upsample_keeps_flat_regions() {
        let (w, h) = (13, 7);
        let src = vec![[0.25, 0.5, 0.75]; w * h];
        let mut small = Vec::new();
        let (sw, sh) = downsample(&src, w, h, 4, &mut small);
        assert_eq!((sw, sh), (4, 2));
        let mut back = vec![[0.0; 3]; w * h];
        upsample(&small, sw, sh, &mut back, w, h);
        for px in back {
            for (c, want) in px.iter().zip([0.25, 0.5, 0.75]) {
                assert!((c - want).abs() < 1e-5);
            }
        }
    }
}
