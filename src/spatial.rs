//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

#[cfg(feature = "spatial-index")]
use glam::DVec2;
#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree over cell sites
///
/// Provides O(log n) nearest-site lookups to convert planar positions into
/// cell IDs, for hover queries and click handling. Cell IDs are not arena
/// indices, so the index keeps its own ID table alongside the tree.
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    ids: Vec<u32>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build a spatial index from cell IDs and their site positions
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_mapgen::*;
    /// use glam::DVec2;
    ///
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// let sites = vec![
    ///     (1, DVec2::new(10.0, 10.0)),
    ///     (2, DVec2::new(90.0, 10.0)),
    ///     (3, DVec2::new(50.0, 80.0)),
    /// ];
    ///
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(12.0, 9.0)), 1);
    /// # }
    /// ```
    pub fn new(sites: &[(u32, DVec2)]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|(_, p)| [p.x, p.y]).collect();
        let ids = sites.iter().map(|(id, _)| *id).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            ids,
        }
    }

    /// Find the cell whose site is nearest to a position
    ///
    /// The nearest site owns the position by the Voronoi property, so this
    /// returns the ID of the cell containing it. Positions outside the
    /// bounding box snap to the nearest cell.
    pub fn find_nearest(&self, position: DVec2) -> u32 {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        self.ids[result.item as usize]
    }
}
