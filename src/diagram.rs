//! Voronoi Diagram
//!
//! Owns the point and edge arenas plus the cell table, and centralizes every
//! mutation that has to keep the vertex adjacency maps in sync. Edge endpoints
//! are never written directly; they go through [`Diagram::set_vertex_a`] and
//! [`Diagram::set_vertex_b`] so the neighbour entries on both endpoints are
//! registered and unregistered together.

use std::collections::BTreeMap;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::{Biome, Cell};
use crate::error::{Result, VoronoiError};
use crate::geometry::{Edge, EdgeId, EdgeKind, HalfEdge, Point, PointId};

/// A computed Voronoi diagram within a rectangular bounding box
///
/// Cells are keyed by their site ID (1-based, assigned in sweep order).
/// Points and edges live in arenas and are shared by reference: a vertex
/// where three cells meet is a single [`Point`] all three polygons index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Diagram {
    width: u32,
    height: u32,
    pub(crate) points: Vec<Point>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) cells: BTreeMap<u32, Cell>,
    /// Cell IDs in the order the input sites were sorted for the sweep,
    /// with 0 for sites skipped as duplicates
    ///
    /// River source selection draws indices into this list, so the same
    /// seed keeps picking the same cells regardless of cell ID layout.
    pub(crate) site_order: Vec<u32>,
}

impl Diagram {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: Vec::new(),
            edges: Vec::new(),
            cells: BTreeMap::new(),
            site_order: Vec::new(),
        }
    }

    /// Bounding box width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Bounding box height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Look up a point by ID
    #[inline]
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.index()]
    }

    /// Look up an edge by ID
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// All cells keyed by site ID, in ascending ID order
    #[inline]
    pub fn cells(&self) -> &BTreeMap<u32, Cell> {
        &self.cells
    }

    /// Number of cells in the diagram
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Look up a cell by site ID
    pub fn cell(&self, id: u32) -> Result<&Cell> {
        self.cells.get(&id).ok_or(VoronoiError::CellNotFound(id))
    }

    /// Edges that survived clipping, with their IDs
    ///
    /// Edges removed by clipping stay in the arena with their endpoints
    /// cleared; this iterator skips them.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.endpoints().is_some())
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Allocate a vertex point
    pub(crate) fn new_point(&mut self, position: DVec2) -> PointId {
        let id = PointId(self.points.len() as u32);
        self.points.push(Point::new(position));
        id
    }

    /// Allocate a site point together with its (still empty) cell
    pub(crate) fn new_site(&mut self, position: DVec2, id: u32) -> PointId {
        let pid = self.new_point(position);
        self.points[pid.index()].id = id;
        self.cells.insert(id, Cell::new(pid));
        pid
    }

    pub(crate) fn point_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.points[id.index()]
    }

    pub(crate) fn cell_mut(&mut self, id: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&id)
    }

    pub(crate) fn set_edge_kind(&mut self, edge: EdgeId, kind: EdgeKind) {
        self.edges[edge.index()].kind = kind;
    }

    /// Create an edge between two sites and hand each site's cell its
    /// half-edge. Endpoints may be filled in now or later by the sweep.
    pub(crate) fn create_edge(
        &mut self,
        left: PointId,
        right: PointId,
        vertex_a: Option<PointId>,
        vertex_b: Option<PointId>,
    ) -> Result<EdgeId> {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge::new(left, Some(right)));

        if let Some(v) = vertex_a {
            self.set_edge_start(id, left, right, v);
        }
        if let Some(v) = vertex_b {
            self.set_edge_end(id, left, right, v);
        }

        let he_left = HalfEdge::between(id, left, right, &self.points);
        let he_right = HalfEdge::between(id, right, left, &self.points);
        let left_cell = self.points[left.index()].id;
        let right_cell = self.points[right.index()].id;
        match self.cells.get_mut(&left_cell) {
            Some(cell) => cell.half_edges.push(he_left),
            None => {
                return Err(VoronoiError::GenerationFailed(format!(
                    "edge references unknown cell {}",
                    left_cell
                )))
            }
        }
        match self.cells.get_mut(&right_cell) {
            Some(cell) => cell.half_edges.push(he_right),
            None => {
                return Err(VoronoiError::GenerationFailed(format!(
                    "edge references unknown cell {}",
                    right_cell
                )))
            }
        }
        Ok(id)
    }

    /// Create a border edge along the bounding box for cell closure
    ///
    /// Border edges only have a left site and both endpoints are known
    /// up front. The caller inserts the matching half-edge at the right
    /// position in the cell's boundary walk.
    pub(crate) fn create_border_edge(
        &mut self,
        site: PointId,
        vertex_a: PointId,
        vertex_b: PointId,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        let mut edge = Edge::new(site, None);
        edge.kind = EdgeKind::Outer;
        self.edges.push(edge);
        self.set_vertex_a(id, Some(vertex_a));
        self.set_vertex_b(id, Some(vertex_b));
        id
    }

    /// Assign the start vertex of an edge, orienting it between `left` and
    /// `right`. The first assignment on a fresh edge also fixes the edge's
    /// site order; later assignments fill in whichever endpoint matches the
    /// given orientation.
    pub(crate) fn set_edge_start(
        &mut self,
        edge: EdgeId,
        left: PointId,
        right: PointId,
        vertex: PointId,
    ) {
        let e = &self.edges[edge.index()];
        if e.vertex_a.is_none() && e.vertex_b.is_none() {
            self.set_vertex_a(edge, Some(vertex));
            let e = &mut self.edges[edge.index()];
            e.site_left = left;
            e.site_right = Some(right);
        } else if e.site_left == right {
            self.set_vertex_b(edge, Some(vertex));
        } else {
            self.set_vertex_a(edge, Some(vertex));
        }
    }

    /// Assign the end vertex of an edge (the start as seen from the right site)
    pub(crate) fn set_edge_end(
        &mut self,
        edge: EdgeId,
        left: PointId,
        right: PointId,
        vertex: PointId,
    ) {
        self.set_edge_start(edge, right, left, vertex);
    }

    /// Set or clear an edge's first endpoint, keeping the point adjacency
    /// maps in sync with the second endpoint.
    pub(crate) fn set_vertex_a(&mut self, edge: EdgeId, value: Option<PointId>) {
        let other = self.edges[edge.index()].vertex_b;
        match value {
            Some(v) => {
                if let Some(b) = other {
                    self.points[b.index()].neighbours.insert(edge, v);
                    self.points[v.index()].neighbours.insert(edge, b);
                }
            }
            None => {
                if let Some(b) = other {
                    self.points[b.index()].neighbours.remove(&edge);
                }
            }
        }
        self.edges[edge.index()].vertex_a = value;
    }

    /// Set or clear an edge's second endpoint, keeping the point adjacency
    /// maps in sync with the first endpoint.
    pub(crate) fn set_vertex_b(&mut self, edge: EdgeId, value: Option<PointId>) {
        let other = self.edges[edge.index()].vertex_a;
        match value {
            Some(v) => {
                if let Some(a) = other {
                    self.points[a.index()].neighbours.insert(edge, v);
                    self.points[v.index()].neighbours.insert(edge, a);
                }
            }
            None => {
                if let Some(a) = other {
                    self.points[a.index()].neighbours.remove(&edge);
                }
            }
        }
        self.edges[edge.index()].vertex_b = value;
    }

    /// Set a cell's biome
    ///
    /// The first transition from non-water to water inverts the site's noise
    /// sample, so water depth grows where land elevation would have grown.
    pub(crate) fn set_cell_biome(&mut self, id: u32, biome: Biome) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        let was_water = cell.biome.map_or(false, Biome::is_water);
        let site = cell.site;
        cell.biome = Some(biome);
        if !was_water && biome.is_water() {
            let p = &mut self.points[site.index()];
            p.noise = 1.0 - p.noise;
        }
    }

    /// Rebuild every cell's boundary ring from its ordered half-edges
    pub(crate) fn collect_polygons(&mut self) {
        for cell in self.cells.values_mut() {
            cell.collect_polygon(&self.edges);
        }
    }

    /// Record cell-to-cell adjacency from the surviving half-edges
    ///
    /// Runs after clipping and closure. Each interior edge contributes one
    /// neighbour entry per side; border edges have no opposite cell.
    pub(crate) fn determine_neighbours(&mut self) {
        let ids: Vec<u32> = self.cells.keys().copied().collect();
        for id in ids {
            let Some(cell) = self.cells.get(&id) else {
                continue;
            };
            let site = cell.site;
            let mut neighbours = BTreeMap::new();
            for he in &cell.half_edges {
                let e = &self.edges[he.edge().index()];
                if e.site_left == site {
                    if let Some(right) = e.site_right {
                        neighbours.insert(he.edge(), self.points[right.index()].id);
                    }
                } else {
                    neighbours.insert(he.edge(), self.points[e.site_left.index()].id);
                }
            }
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.neighbours = neighbours;
            }
        }
    }
}
