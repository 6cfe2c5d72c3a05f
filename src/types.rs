// Core types shared by the simulator, renderer and hosts.

/// A packed pixel surface. Used both for the low-res simulation grid and for
/// the full-size display.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // pixels across
    pub height: usize,     // pixels down
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A surface of the given size filled with one colour.
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    /// Reallocate to a new size. Old contents are discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 8-bit sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn pack(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn unpack(px: u32) -> Self {
        Self {
            r: ((px >> 16) & 0xFF) as u8,
            g: ((px >> 8) & 0xFF) as u8,
            b: (px & 0xFF) as u8,
        }
    }

    /// Channel-wise linear interpolation, `t` in [0,1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let mix = |a: u8, b: u8| channel_u8(a as f32 + t * (b as f32 - a as f32));
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Round a float channel into 0..=255. Out-of-range values clamp (never wrap)
/// and NaN becomes 0.
#[inline]
pub fn channel_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Bilinear sampling plan along one axis: for each of `dst_len` outputs, the
/// two source indices to blend and the weight of the second. The source is
/// stretched over `dst_len + 2 * margin` outputs, so `margin` outputs on each
/// side fall off the destination.
pub fn linear_taps(dst_len: usize, src_len: usize, margin: usize) -> Vec<(usize, usize, f32)> {
    let span = (dst_len + 2 * margin) as f32;
    let last = src_len.saturating_sub(1);
    (0..dst_len)
        .map(|i| {
            let u = ((i + margin) as f32 + 0.5) / span * src_len as f32 - 0.5;
            let u = u.clamp(0.0, last as f32);
            let i0 = u.floor() as usize;
            let i1 = (i0 + 1).min(last);
            (i0, i1, u - i0 as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_keeps_channels() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.pack(), 0x00_12_34_56);
        assert_eq!(Rgb::unpack(0x00_12_34_56), c);
    }

    #[test]
    fn channel_clamps_instead_of_wrapping() {
        assert_eq!(channel_u8(-20.0), 0);
        assert_eq!(channel_u8(300.0), 255);
        assert_eq!(channel_u8(f32::NAN), 0);
        assert_eq!(channel_u8(f32::INFINITY), 255);
        assert_eq!(channel_u8(127.6), 128);
    }

    #[test]
    fn resize_reallocates() {
        let mut fb = FrameBuffer::new(4, 4, 0xFFFFFF);
        fb.resize(3, 2);
        assert_eq!(fb.pixels.len(), 6);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn taps_line_up_with_cell_centres() {
        // 2x upscale: outputs 1 and 2 sit between the two source cells.
        let taps = linear_taps(4, 2, 0);
        assert_eq!(taps[0], (0, 1, 0.0));
        assert_eq!(taps[1], (0, 1, 0.25));
        assert_eq!(taps[2], (0, 1, 0.75));
        assert_eq!(taps[3], (1, 1, 0.0));
    }
}
