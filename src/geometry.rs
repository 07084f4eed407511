//! Diagram Geometry Primitives
//!
//! Points, edges and half-edges that make up a Voronoi diagram. Points and
//! edges live in arenas owned by the diagram and are referenced by index,
//! so the same vertex can be shared by every edge and cell that touches it.

use std::collections::BTreeMap;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a point in the diagram's point arena
///
/// Points are never removed from the arena, so an ID obtained from a diagram
/// stays valid for that diagram's lifetime.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub(crate) u32);

impl PointId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an edge in the diagram's edge arena
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A point of the diagram: either an input site or a computed vertex
///
/// Sites carry a non-zero ID matching their cell; vertices (edge endpoints
/// produced by the sweep, clipping and closure) have no site ID. Terrain
/// processing later fills in the noise and elevation fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Point {
    /// Planar position
    pub(crate) position: DVec2,
    /// Elevation in world units, assigned by terrain processing
    pub(crate) z: f64,
    /// Memoized noise sample in [0, 1], 0 meaning "not sampled yet"
    pub(crate) noise: f64,
    /// Cell ID for sites, 0 for vertices
    pub(crate) id: u32,
    /// Adjacent points reachable over a shared edge, keyed by that edge
    ///
    /// Only vertices get entries here; the map drives river tracing.
    /// A BTreeMap keeps iteration order deterministic across runs.
    pub(crate) neighbours: BTreeMap<EdgeId, PointId>,
}

impl Point {
    pub(crate) fn new(position: DVec2) -> Self {
        Self {
            position,
            z: 0.0,
            noise: 0.0,
            id: 0,
            neighbours: BTreeMap::new(),
        }
    }

    /// Planar position of this point
    #[inline]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Elevation in world units (negative under water)
    #[inline]
    pub fn elevation(&self) -> f64 {
        self.z
    }

    /// Noise sample in [0, 1] used to derive elevation
    #[inline]
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Cell ID when this point is an input site
    #[inline]
    pub fn site_id(&self) -> Option<u32> {
        (self.id != 0).then_some(self.id)
    }

    /// Neighbouring points connected by an edge, keyed by that edge
    #[inline]
    pub fn neighbours(&self) -> &BTreeMap<EdgeId, PointId> {
        &self.neighbours
    }
}

/// Classification of a diagram edge after clipping and terrain processing
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    /// Ordinary interior edge
    #[default]
    None,
    /// Edge touching or lying on the bounding box
    Outer,
    /// Edge separating a land cell from a water or ocean cell
    Coast,
    /// Edge carrying a traced river
    River,
    /// Edge between two land cells
    Land,
    /// Edge between two water cells
    Water,
}

/// An edge of the diagram separating two sites
///
/// Interior edges reference the site on each side; border edges synthesized
/// during cell closure only have a left site. Endpoints are optional while
/// the sweep is still running and after clipping removes an edge entirely.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) site_left: PointId,
    pub(crate) site_right: Option<PointId>,
    pub(crate) vertex_a: Option<PointId>,
    pub(crate) vertex_b: Option<PointId>,
    pub(crate) kind: EdgeKind,
    /// How many traced rivers flow over this edge
    pub(crate) river: u32,
}

impl Edge {
    pub(crate) fn new(site_left: PointId, site_right: Option<PointId>) -> Self {
        Self {
            site_left,
            site_right,
            vertex_a: None,
            vertex_b: None,
            kind: EdgeKind::default(),
            river: 0,
        }
    }

    /// Site on the left of this edge
    #[inline]
    pub fn site_left(&self) -> PointId {
        self.site_left
    }

    /// Site on the right, absent for synthesized border edges
    #[inline]
    pub fn site_right(&self) -> Option<PointId> {
        self.site_right
    }

    /// First endpoint, if assigned
    #[inline]
    pub fn vertex_a(&self) -> Option<PointId> {
        self.vertex_a
    }

    /// Second endpoint, if assigned
    #[inline]
    pub fn vertex_b(&self) -> Option<PointId> {
        self.vertex_b
    }

    /// Both endpoints, when the edge survived clipping
    #[inline]
    pub fn endpoints(&self) -> Option<(PointId, PointId)> {
        match (self.vertex_a, self.vertex_b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Edge classification
    #[inline]
    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// River flow counter (0 when no river crosses this edge)
    #[inline]
    pub fn river(&self) -> u32 {
        self.river
    }
}

/// One side of an edge as seen from a particular cell
///
/// Each interior edge produces two half-edges, one per adjacent cell.
/// The angle orders the half-edges around the cell site so the boundary
/// polygon can be walked in a consistent direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    pub(crate) edge: EdgeId,
    pub(crate) site: PointId,
    pub(crate) angle: f64,
}

impl HalfEdge {
    /// Build a half-edge for `site` along an edge shared with `opposite`
    ///
    /// The angle points from this cell's site toward the opposite one.
    pub(crate) fn between(
        edge: EdgeId,
        site: PointId,
        opposite: PointId,
        points: &[Point],
    ) -> Self {
        let s = points[site.index()].position;
        let o = points[opposite.index()].position;
        let angle = (o.y - s.y).atan2(o.x - s.x);
        Self { edge, site, angle }
    }

    /// Build a half-edge for `site` along a border edge with no opposite site
    ///
    /// The angle is derived from the edge endpoints, so both must already be
    /// assigned; returns `None` otherwise.
    pub(crate) fn border(
        edge: EdgeId,
        site: PointId,
        points: &[Point],
        edges: &[Edge],
    ) -> Option<Self> {
        let e = &edges[edge.index()];
        let (a, b) = e.endpoints()?;
        let pa = points[a.index()].position;
        let pb = points[b.index()].position;
        let angle = if e.site_left == site {
            (pb.x - pa.x).atan2(pa.y - pb.y)
        } else {
            (pa.x - pb.x).atan2(pb.y - pa.y)
        };
        Some(Self { edge, site, angle })
    }

    /// Edge this half-edge wraps
    #[inline]
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Site of the cell this half-edge belongs to
    #[inline]
    pub fn site(&self) -> PointId {
        self.site
    }

    /// Ordering angle around the cell site
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Endpoint where this half-edge starts when walking the cell boundary
    pub fn start_point(&self, edges: &[Edge]) -> Option<PointId> {
        let e = &edges[self.edge.index()];
        if e.site_left == self.site {
            e.vertex_a
        } else {
            e.vertex_b
        }
    }

    /// Endpoint where this half-edge ends when walking the cell boundary
    pub fn end_point(&self, edges: &[Edge]) -> Option<PointId> {
        let e = &edges[self.edge.index()];
        if e.site_left == self.site {
            e.vertex_b
        } else {
            e.vertex_a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(DVec2::new(0.0, 0.0)),
            Point::new(DVec2::new(10.0, 0.0)),
            Point::new(DVec2::new(5.0, -3.0)),
            Point::new(DVec2::new(5.0, 3.0)),
        ]
    }

    #[test]
    fn test_site_id_zero_is_vertex() {
        let mut p = Point::new(DVec2::new(1.0, 2.0));
        assert_eq!(p.site_id(), None);
        p.id = 7;
        assert_eq!(p.site_id(), Some(7));
    }

    #[test]
    fn test_half_edge_angle_between_sites() {
        let points = sample_points();

        // From site 0 toward site 1: straight along +x
        let he = HalfEdge::between(EdgeId(0), PointId(0), PointId(1), &points);
        assert!(he.angle().abs() < 1e-12);

        // From the other side the angle flips by pi
        let he = HalfEdge::between(EdgeId(0), PointId(1), PointId(0), &points);
        assert!((he.angle().abs() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_half_edge_start_end_orientation() {
        let points = sample_points();
        let mut edge = Edge::new(PointId(0), Some(PointId(1)));
        edge.vertex_a = Some(PointId(2));
        edge.vertex_b = Some(PointId(3));
        let edges = vec![edge];

        let he = HalfEdge::between(EdgeId(0), PointId(0), PointId(1), &points);
        assert_eq!(he.start_point(&edges), Some(PointId(2)));
        assert_eq!(he.end_point(&edges), Some(PointId(3)));

        // The opposite cell walks the edge in the other direction
        let he = HalfEdge::between(EdgeId(0), PointId(1), PointId(0), &points);
        assert_eq!(he.start_point(&edges), Some(PointId(3)));
        assert_eq!(he.end_point(&edges), Some(PointId(2)));
    }

    #[test]
    fn test_border_half_edge_requires_endpoints() {
        let points = sample_points();
        let edges = vec![Edge::new(PointId(0), None)];
        assert!(HalfEdge::border(EdgeId(0), PointId(0), &points, &edges).is_none());
    }

    #[test]
    fn test_endpoints_pairing() {
        let mut edge = Edge::new(PointId(0), Some(PointId(1)));
        assert_eq!(edge.endpoints(), None);
        edge.vertex_a = Some(PointId(2));
        assert_eq!(edge.endpoints(), None);
        edge.vertex_b = Some(PointId(3));
        assert_eq!(edge.endpoints(), Some((PointId(2), PointId(3))));
    }
}
