// sRGB <-> linear-light conversion for the filter chain.
// Filter stages (blur, discrete transfer) operate on linear values the way
// SVG primitives do by default; frames enter and leave the chain through
// `decode` and `encode`.

use crate::types::Rgb;

/// Linear-light RGB triple, each channel in 0..1.
pub type Linear = [f32; 3];

// Linear values are quantised to this many steps on the way back to 8 bits.
const ENCODE_STEPS: usize = 4096;

pub struct GammaLut {
    decode: [f32; 256],
    encode: [u8; ENCODE_STEPS],
}

impl GammaLut {
    /// Both tables are built once per renderer.
    pub fn new() -> Self {
        let mut decode = [0.0f32; 256];
        for (v, slot) in decode.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let top = (ENCODE_STEPS - 1) as f32;
        let mut encode = [0u8; ENCODE_STEPS];
        for (i, slot) in encode.iter_mut().enumerate() {
            let l = i as f32 / top;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { decode, encode }
    }

    #[inline]
    pub fn to_linear(&self, v: u8) -> f32 {
        self.decode[v as usize]
    }

    /// Out-of-range input clamps to the ends of the table; NaN maps to black.
    #[inline]
    pub fn to_srgb(&self, l: f32) -> u8 {
        if l.is_nan() {
            return 0;
        }
        let idx = (l.clamp(0.0, 1.0) * (ENCODE_STEPS - 1) as f32).round() as usize;
        self.encode[idx]
    }

    /// Packed `0x00RRGGBB` pixel into linear channels.
    #[inline]
    pub fn decode(&self, px: u32) -> Linear {
        let c = Rgb::unpack(px);
        [self.to_linear(c.r), self.to_linear(c.g), self.to_linear(c.b)]
    }

    /// Linear channels back into a packed pixel.
    #[inline]
    pub fn encode(&self, l: Linear) -> u32 {
        Rgb::new(self.to_srgb(l[0]), self.to_srgb(l[1]), self.to_srgb(l[2])).pack()
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}
