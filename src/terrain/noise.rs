//! Perlin noise sampling
//!
//! Classic Perlin gradient noise with the standard Ken Perlin permutation
//! table, combined with a seed through a small hash so different seeds
//! produce different fields without touching the table.

/// Source of a smooth 2D noise field
///
/// Implementations must be deterministic and return values in [-1, 1].
/// The terrain pipeline is generic over this trait, so maps can be shaped
/// by any noise implementation, not just the built-in Perlin one.
pub trait NoiseSource {
    /// Sample the field at the given coordinates
    fn sample(&self, x: f64, y: f64) -> f64;
}

// Standard 256-element permutation table from Ken Perlin's reference
// implementation. Changing it changes every generated map.
const PERM: [u32; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Combine lattice coordinates with the seed through the permutation table
#[inline]
fn hash(x: i32, y: i32, seed: u32) -> u32 {
    let seed_hash = (seed.wrapping_mul(1103515245).wrapping_add(12345)) >> 16;
    let ix = ((x as u32) ^ seed_hash) & 255;
    let iy = ((y as u32) ^ (seed_hash >> 8)) & 255;
    let a = PERM[ix as usize];
    PERM[((a + iy) & 255) as usize]
}

/// Dot product of the hashed gradient direction with the offset vector
#[inline]
fn gradient(hash_value: u32, x: f64, y: f64) -> f64 {
    let h = hash_value & 7;
    let u = if h < 4 { x } else { y };
    let v = if h < 4 { y } else { x };
    let sign_u = if (h & 1) == 0 { -u } else { u };
    let sign_v = if (h & 2) == 0 { -v } else { v };
    sign_u + 2.0 * sign_v
}

/// Quintic smoothstep (Ken Perlin's improved fade function)
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Seeded 2D Perlin noise
///
/// # Examples
///
/// ```
/// use voronoi_mapgen::terrain::{NoiseSource, Perlin};
///
/// let noise = Perlin::new(42);
/// let v = noise.sample(0.3, 0.7);
/// assert!((-1.0..=1.0).contains(&v));
/// assert_eq!(v, noise.sample(0.3, 0.7));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Perlin {
    seed: u32,
}

impl Perlin {
    /// Create a noise field for the given seed
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl NoiseSource for Perlin {
    fn sample(&self, x: f64, y: f64) -> f64 {
        // unit lattice square containing the point
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let xf = x - x.floor();
        let yf = y - y.floor();

        let u = fade(xf);
        let v = fade(yf);

        let aa = hash(x0, y0, self.seed);
        let ba = hash(x0 + 1, y0, self.seed);
        let ab = hash(x0, y0 + 1, self.seed);
        let bb = hash(x0 + 1, y0 + 1, self.seed);

        let g_aa = gradient(aa, xf, yf);
        let g_ba = gradient(ba, xf - 1.0, yf);
        let g_ab = gradient(ab, xf, yf - 1.0);
        let g_bb = gradient(bb, xf - 1.0, yf - 1.0);

        let x0_val = lerp(g_aa, g_ba, u);
        let x1_val = lerp(g_ab, g_bb, u);
        // gradients reach sqrt(5); scale back into [-1, 1]
        (lerp(x0_val, x1_val, v) / 5f64.sqrt()).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise = Perlin::new(42);
        assert_eq!(noise.sample(0.5, 0.7), noise.sample(0.5, 0.7));
        assert_eq!(noise.sample(-3.2, 8.1), noise.sample(-3.2, 8.1));
    }

    #[test]
    fn test_range() {
        let noise = Perlin::new(12345);
        for i in 0..32 {
            for j in 0..32 {
                let v = noise.sample(i as f64 * 0.37, j as f64 * 0.53);
                assert!(
                    (-1.0..=1.0).contains(&v),
                    "sample at ({}, {}) out of range: {}",
                    i,
                    j,
                    v
                );
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Perlin::new(42);
        let b = Perlin::new(999);
        let differing = (0..16)
            .filter(|&i| {
                let x = i as f64 * 0.41 + 0.13;
                a.sample(x, x * 0.77) != b.sample(x, x * 0.77)
            })
            .count();
        assert!(differing > 0);
    }

    #[test]
    fn test_smooth_between_lattice_points() {
        let noise = Perlin::new(7);
        let mut prev = noise.sample(0.0, 0.5);
        for i in 1..=100 {
            let v = noise.sample(i as f64 / 100.0, 0.5);
            assert!((v - prev).abs() < 0.1, "jump between adjacent samples");
            prev = v;
        }
    }
}
