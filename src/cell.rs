//! Voronoi Cell Structure
//!
//! Represents an individual cell of the diagram with its boundary half-edges,
//! polygon ring, neighbour connectivity and terrain classification.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Edge, EdgeId, EdgeKind, HalfEdge, PointId};

/// Terrain classification of a cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Biome {
    /// Landlocked water (lake)
    Water,
    /// Dry land
    Land,
    /// Water connected to the map border
    Ocean,
}

impl Biome {
    /// Whether this biome is any kind of water
    #[inline]
    pub fn is_water(self) -> bool {
        matches!(self, Biome::Water | Biome::Ocean)
    }
}

/// Elevation band derived from a cell's scaled height
///
/// Water cells get one of the depth bands, land cells one of the height bands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationZone {
    /// Highest land band (mountains)
    High,
    /// Land above the midline
    UpperMiddle,
    /// Land below the midline
    LowerMiddle,
    /// Lowest land band (plains near the coast)
    Low,
    /// Shallow water near the coast
    Shallow,
    /// Deep open water
    Deep,
    /// Deepest water band
    Trench,
}

impl ElevationZone {
    /// Whether this zone is a water depth band
    #[inline]
    pub fn is_water(self) -> bool {
        matches!(
            self,
            ElevationZone::Shallow | ElevationZone::Deep | ElevationZone::Trench
        )
    }
}

/// A single Voronoi cell
///
/// Each cell owns the half-edges bounding it, the ordered boundary polygon
/// and a neighbour map keyed by the shared edge. Terrain processing fills in
/// biome, elevation index and elevation zone after the diagram is computed.
///
/// # Design Notes
///
/// Cells are NOT serialized individually. They are regenerated from MapConfig
/// when loading a save file, ensuring consistency and compact save files.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Cell {
    /// Site point this cell was grown from
    pub(crate) site: PointId,
    /// Half-edges bounding this cell, ordered around the site after closure
    pub(crate) half_edges: Vec<HalfEdge>,
    /// Boundary polygon as a closed ring (first point repeated at the end)
    pub(crate) points: Vec<PointId>,
    /// Adjacent cell IDs keyed by the shared edge
    ///
    /// BTreeMap keeps neighbour iteration deterministic, which flood fill
    /// and elevation propagation rely on for reproducible maps.
    pub(crate) neighbours: BTreeMap<EdgeId, u32>,
    /// Terrain classification, None until terrain processing runs
    pub(crate) biome: Option<Biome>,
    /// Distance-from-border index in [0, 1], -1 until propagated
    pub(crate) elevation_index: f64,
    /// Elevation band, None until terrain processing runs
    pub(crate) zone: Option<ElevationZone>,
}

impl Cell {
    pub(crate) fn new(site: PointId) -> Self {
        Self {
            site,
            half_edges: Vec::new(),
            points: Vec::new(),
            neighbours: BTreeMap::new(),
            biome: None,
            elevation_index: -1.0,
            zone: None,
        }
    }

    /// Site point this cell was grown from
    #[inline]
    pub fn site(&self) -> PointId {
        self.site
    }

    /// Half-edges bounding this cell
    #[inline]
    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    /// Boundary polygon as a closed ring of point IDs
    ///
    /// The ring repeats the first point at the end, so a hexagonal cell
    /// has seven entries.
    #[inline]
    pub fn polygon(&self) -> &[PointId] {
        &self.points
    }

    /// Adjacent cell IDs keyed by the shared edge
    #[inline]
    pub fn neighbours(&self) -> &BTreeMap<EdgeId, u32> {
        &self.neighbours
    }

    /// Terrain classification
    #[inline]
    pub fn biome(&self) -> Option<Biome> {
        self.biome
    }

    /// Distance-from-border elevation index in [0, 1]
    #[inline]
    pub fn elevation_index(&self) -> f64 {
        self.elevation_index
    }

    /// Elevation band
    #[inline]
    pub fn zone(&self) -> Option<ElevationZone> {
        self.zone
    }

    /// Number of neighbouring cells
    #[inline]
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Check if this cell is adjacent to another cell
    pub fn is_neighbour_of(&self, other_cell_id: u32) -> bool {
        self.neighbours.values().any(|&id| id == other_cell_id)
    }

    /// Whether any bounding edge lies on the bounding box
    pub fn is_outer(&self, edges: &[Edge]) -> bool {
        self.half_edges
            .iter()
            .any(|he| edges[he.edge.index()].kind == EdgeKind::Outer)
    }

    /// Drop half-edges that lost an endpoint to clipping and sort the rest
    /// by descending angle, so consecutive half-edges share endpoints.
    ///
    /// Returns the number of half-edges kept.
    pub(crate) fn prepare_half_edges(&mut self, edges: &[Edge]) -> usize {
        self.half_edges.retain(|he| {
            he.start_point(edges).is_some() && he.end_point(edges).is_some()
        });
        self.half_edges.sort_by(|a, b| {
            b.angle
                .partial_cmp(&a.angle)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.half_edges.len()
    }

    /// Rebuild the boundary ring from the ordered half-edges
    pub(crate) fn collect_polygon(&mut self, edges: &[Edge]) {
        self.points.clear();
        let Some(first) = self.half_edges.first() else {
            return;
        };
        let Some(start) = first.start_point(edges) else {
            return;
        };
        self.points.push(start);
        for he in &self.half_edges {
            if let Some(end) = he.end_point(edges) {
                self.points.push(end);
            }
        }
    }
}
