//! Random Site Scattering

use glam::DVec2;
use rand::Rng;

/// Scatter `count` sites uniformly on the integer grid inside the box
///
/// Integer coordinates make exact duplicates possible; the sweep collapses
/// those into a single cell, so the resulting diagram can hold fewer cells
/// than `count`.
pub(crate) fn scatter_sites<R: Rng>(
    rng: &mut R,
    count: usize,
    width: u32,
    height: u32,
) -> Vec<DVec2> {
    (0..count)
        .map(|_| {
            DVec2::new(
                rng.gen_range(0..width) as f64,
                rng.gen_range(0..height) as f64,
            )
        })
        .collect()
}
