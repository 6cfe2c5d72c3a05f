// Noise-field variant: an improved Perlin gradient-noise field sampled on the
// low-res grid and mapped through a brand-colour ramp.
// Visual: slow, organic clouds of turquoise and coral drifting through white.

use crate::config::{NoiseParams, Palette};
use crate::types::{FrameBuffer, Rgb};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 3D improved Perlin noise over a seeded permutation table.
/// Output is continuous and lies (nominally) in [-1, 1]; callers clamp.
pub struct Perlin {
    /// 256-entry permutation, doubled so corner lookups never wrap.
    perm: [u8; 512],
}

impl Perlin {
    /// Same seed, same field.
    pub fn new(seed: u64) -> Self {
        let mut base: Vec<u8> = (0..=255).collect();
        base.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i & 511] as usize
    }

    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.0;
        }
        let (xf, yf, zf) = (x.floor(), y.floor(), z.floor());
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let zi = (zf as i64 & 255) as usize;
        let (x, y, z) = (x - xf, y - yf, z - zf);

        let (u, v, w) = (fade(x), fade(y), fade(z));

        // Hash the eight cube corners
        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(self.p(aa), x, y, z), grad(self.p(ba), x - 1.0, y, z)),
                lerp(u, grad(self.p(ab), x, y - 1.0, z), grad(self.p(bb), x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(u, grad(self.p(aa + 1), x, y, z - 1.0), grad(self.p(ba + 1), x - 1.0, y, z - 1.0)),
                lerp(
                    u,
                    grad(self.p(ab + 1), x, y - 1.0, z - 1.0),
                    grad(self.p(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }
}

/// 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of the 12 cube-edge gradients (4 repeated).
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Three-stop ramp: [0, 0.5) runs A -> B, [0.5, 1] runs B -> C.
/// Input outside [0,1] (or NaN) is clamped first.
pub fn ramp(palette: &Palette, v: f32) -> Rgb {
    let v = if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) };
    if v < 0.5 {
        palette.a.lerp(palette.b, v / 0.5)
    } else {
        palette.b.lerp(palette.c, (v - 0.5) / 0.5)
    }
}

/// Time-driven noise field state.
pub struct NoiseField {
    perlin: Perlin,
    params: NoiseParams,
    palette: Palette,
    t: u64,
}

impl NoiseField {
    pub fn new(seed: u64, params: NoiseParams, palette: Palette) -> Self {
        Self { perlin: Perlin::new(seed), params, palette, t: 0 }
    }

    /// Advance the time axis by one frame.
    pub fn step(&mut self) {
        self.t += 1;
    }

    /// Paint the field for the current `t` into every pixel of `fb`.
    pub fn draw(&self, fb: &mut FrameBuffer) {
        let z = self.t as f64 / self.params.time_scale;
        for j in 0..fb.height {
            for i in 0..fb.width {
                let n = self.perlin.sample(
                    i as f64 / self.params.spatial_scale,
                    j as f64 / self.params.spatial_scale,
                    z,
                );
                let normalized = ((n + 1.0) / 2.0) as f32;
                fb.pixels[j * fb.width + i] = ramp(&self.palette, normalized).pack();
            }
        }
    }
}
