//! Voronoi Diagram Generation
//!
//! Fortune's sweep-line construction of a Voronoi diagram inside a
//! rectangular bounding box, followed by edge clipping and cell closure.
//! Coordinates grow rightward in x and downward in y.

mod clip;
mod lloyd;
mod sites;
mod sweep;

pub(crate) use lloyd::relaxed_sites;
pub(crate) use sites::scatter_sites;

use glam::DVec2;

use crate::diagram::Diagram;
use crate::error::Result;

/// Tolerance for coordinate comparisons throughout generation
pub(crate) const EPSILON: f64 = 1e-9;

/// Stand-in for an unbounded coordinate
pub(crate) const INFINITY: f64 = 1e30;

#[inline]
pub(crate) fn equal_with_epsilon(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[inline]
pub(crate) fn greater_than_with_epsilon(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

#[inline]
pub(crate) fn less_than_with_epsilon(a: f64, b: f64) -> bool {
    b - a > EPSILON
}

/// Compute the Voronoi diagram of `sites` within a `width` x `height` box
///
/// Sites sharing exact coordinates are collapsed into one cell. Cell IDs are
/// assigned in sweep order (ascending y, then x), starting at 1. The seed is
/// only used to label error messages for irrecoverably degenerate input.
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use voronoi_mapgen::generation::compute_diagram;
///
/// let sites = vec![
///     DVec2::new(25.0, 25.0),
///     DVec2::new(75.0, 25.0),
///     DVec2::new(25.0, 75.0),
///     DVec2::new(75.0, 75.0),
/// ];
/// let diagram = compute_diagram(&sites, 100, 100, 0).unwrap();
/// assert_eq!(diagram.cell_count(), 4);
/// ```
pub fn compute_diagram(sites: &[DVec2], width: u32, height: u32, seed: u32) -> Result<Diagram> {
    sweep::Sweep::run(sites, width, height, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoronoiError;
    use crate::geometry::EdgeKind;

    fn quadrant_sites() -> Vec<DVec2> {
        vec![
            DVec2::new(10.0, 10.0),
            DVec2::new(90.0, 10.0),
            DVec2::new(10.0, 90.0),
            DVec2::new(90.0, 90.0),
        ]
    }

    #[test]
    fn test_no_sites_is_an_error() {
        assert!(matches!(
            compute_diagram(&[], 100, 100, 0),
            Err(VoronoiError::NoSites)
        ));
    }

    #[test]
    fn test_single_site_owns_the_whole_box() {
        let diagram = compute_diagram(&[DVec2::new(40.0, 60.0)], 100, 100, 0).unwrap();
        assert_eq!(diagram.cell_count(), 1);

        let cell = diagram.cell(1).unwrap();
        assert_eq!(cell.half_edges().len(), 4);
        assert!(cell.is_outer(&diagram.edges));
        // four border edges plus the closing repeat
        assert_eq!(cell.polygon().len(), 5);
        assert_eq!(cell.polygon().first(), cell.polygon().last());

        for he in cell.half_edges() {
            assert_eq!(diagram.edge(he.edge()).kind(), EdgeKind::Outer);
        }

        // the ring visits all four box corners
        let mut corners: Vec<(f64, f64)> = cell.polygon()[..4]
            .iter()
            .map(|&p| {
                let pos = diagram.point(p).position();
                (pos.x, pos.y)
            })
            .collect();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            corners,
            vec![(0.0, 0.0), (0.0, 100.0), (100.0, 0.0), (100.0, 100.0)]
        );
    }

    #[test]
    fn test_duplicate_sites_collapse_to_one_cell() {
        let sites = vec![
            DVec2::new(30.0, 30.0),
            DVec2::new(30.0, 30.0),
            DVec2::new(70.0, 70.0),
        ];
        let diagram = compute_diagram(&sites, 100, 100, 0).unwrap();
        assert_eq!(diagram.cell_count(), 2);
    }

    #[test]
    fn test_quadrant_layout() {
        let diagram = compute_diagram(&quadrant_sites(), 100, 100, 0).unwrap();
        assert_eq!(diagram.cell_count(), 4);

        // all four cells meet at the box center
        let center_shared = diagram
            .points
            .iter()
            .find(|p| p.position() == DVec2::new(50.0, 50.0));
        assert!(center_shared.is_some());

        // each cell is the quadrant surrounding its site
        for cell in diagram.cells().values() {
            let site = diagram.point(cell.site()).position();
            for &p in cell.polygon() {
                let pos = diagram.point(p).position();
                assert!((pos.x - site.x).abs() <= 40.0 + 1e-9);
                assert!((pos.y - site.y).abs() <= 40.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_cells_are_closed_rings() {
        let sites = vec![
            DVec2::new(13.0, 21.0),
            DVec2::new(77.0, 15.0),
            DVec2::new(45.0, 52.0),
            DVec2::new(88.0, 81.0),
            DVec2::new(20.0, 75.0),
            DVec2::new(60.0, 33.0),
        ];
        let diagram = compute_diagram(&sites, 100, 100, 0).unwrap();
        assert_eq!(diagram.cell_count(), sites.len());

        for cell in diagram.cells().values() {
            let n = cell.half_edges().len();
            assert!(n >= 3);
            assert_eq!(cell.polygon().first(), cell.polygon().last());
            for i in 0..n {
                let end = cell.half_edges()[i].end_point(&diagram.edges);
                let start = cell.half_edges()[(i + 1) % n].start_point(&diagram.edges);
                assert!(end.is_some());
                assert_eq!(end, start);
            }
        }
    }

    #[test]
    fn test_adjacency_is_mutual() {
        let diagram = compute_diagram(&quadrant_sites(), 100, 100, 0).unwrap();
        for (&id, cell) in diagram.cells() {
            for &other in cell.neighbours().values() {
                assert!(diagram.cell(other).unwrap().is_neighbour_of(id));
            }
        }
    }

    #[test]
    fn test_shared_edges_reference_both_sites() {
        let diagram = compute_diagram(&quadrant_sites(), 100, 100, 0).unwrap();
        for (_, edge) in diagram.edges() {
            if let Some(right) = edge.site_right() {
                let left_id = diagram.point(edge.site_left()).site_id().unwrap();
                let right_id = diagram.point(right).site_id().unwrap();
                assert_ne!(left_id, right_id);
                assert!(diagram.cell(left_id).unwrap().is_neighbour_of(right_id));
            }
        }
    }

    #[test]
    fn test_vertices_stay_in_the_box() {
        let sites = vec![
            DVec2::new(5.0, 5.0),
            DVec2::new(95.0, 8.0),
            DVec2::new(50.0, 50.0),
            DVec2::new(3.0, 97.0),
            DVec2::new(92.0, 93.0),
        ];
        let diagram = compute_diagram(&sites, 100, 100, 0).unwrap();
        for cell in diagram.cells().values() {
            for &p in cell.polygon() {
                let pos = diagram.point(p).position();
                assert!((-1e-9..=100.0 + 1e-9).contains(&pos.x));
                assert!((-1e-9..=100.0 + 1e-9).contains(&pos.y));
            }
        }
    }

    #[test]
    fn test_same_input_same_diagram() {
        let sites = vec![
            DVec2::new(13.0, 21.0),
            DVec2::new(77.0, 15.0),
            DVec2::new(45.0, 52.0),
            DVec2::new(88.0, 81.0),
        ];
        let a = compute_diagram(&sites, 100, 100, 7).unwrap();
        let b = compute_diagram(&sites, 100, 100, 7).unwrap();

        assert_eq!(a.points.len(), b.points.len());
        for (pa, pb) in a.points.iter().zip(&b.points) {
            assert_eq!(pa.position(), pb.position());
        }
        for ((ia, ca), (ib, cb)) in a.cells().iter().zip(b.cells()) {
            assert_eq!(ia, ib);
            assert_eq!(ca.polygon(), cb.polygon());
        }
        assert_eq!(a.site_order, b.site_order);
    }

    #[test]
    fn test_site_order_marks_duplicates() {
        let sites = vec![
            DVec2::new(30.0, 30.0),
            DVec2::new(30.0, 30.0),
            DVec2::new(70.0, 70.0),
        ];
        let diagram = compute_diagram(&sites, 100, 100, 0).unwrap();
        assert_eq!(diagram.site_order.len(), 3);
        assert_eq!(
            diagram.site_order.iter().filter(|&&id| id == 0).count(),
            1
        );
        let mut assigned: Vec<u32> = diagram
            .site_order
            .iter()
            .copied()
            .filter(|&id| id != 0)
            .collect();
        assigned.sort_unstable();
        assert_eq!(assigned, vec![1, 2]);
    }
}
