//! Lloyd's Relaxation
//!
//! One relaxation step moves every site to the average of its cell's edge
//! endpoints, evening out cell sizes. The caller recomputes the diagram
//! from the relaxed sites and repeats as often as configured.

use glam::DVec2;

use crate::diagram::Diagram;

/// Relaxed site positions for every cell of the diagram, in cell ID order
///
/// Positions are rounded to whole units, matching the integer grid sites are
/// scattered on. A cell whose half-edges were all clipped away falls back to
/// (1, 1) so the site count never shrinks.
pub(crate) fn relaxed_sites(diagram: &Diagram) -> Vec<DVec2> {
    diagram
        .cells()
        .values()
        .map(|cell| {
            let mut sum = DVec2::ZERO;
            let mut count = 0;
            for he in cell.half_edges() {
                if let Some((a, b)) = diagram.edge(he.edge()).endpoints() {
                    sum += diagram.point(a).position();
                    sum += diagram.point(b).position();
                    count += 1;
                }
            }
            if count == 0 {
                DVec2::new(1.0, 1.0)
            } else {
                (sum / (count as f64 * 2.0)).round()
            }
        })
        .collect()
}
