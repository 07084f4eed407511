//! VoronoiMap main structure

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cell::Cell;
use crate::config::MapConfig;
use crate::diagram::Diagram;
use crate::error::Result;
use crate::generation::{compute_diagram, relaxed_sites, scatter_sites};
use crate::terrain::{build_terrain, NoiseSource, Perlin};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;
#[cfg(feature = "spatial-index")]
use glam::DVec2;

/// A complete generated island map
///
/// Wraps the computed Voronoi diagram together with the configuration it was
/// generated from. All cells, edges and points stay in memory for fast
/// queries and render data extraction.
///
/// # Examples
///
/// ```
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .dimensions(400, 300)
///     .unwrap()
///     .site_count(200)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = VoronoiMap::generate(config).unwrap();
/// println!("Generated {} cells", map.cell_count());
///
/// for (id, cell) in map.cells() {
///     println!("cell {}: {:?}", id, cell.biome());
/// }
/// ```
#[derive(Clone)]
pub struct VoronoiMap {
    /// Configuration used to generate this map
    pub(crate) config: MapConfig,

    /// The computed diagram with terrain applied
    pub(crate) diagram: Diagram,

    /// Spatial index over cell sites (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl VoronoiMap {
    /// Generate a map with the built-in Perlin noise field
    ///
    /// This is the most common way to create a map. The noise field is
    /// seeded from `config.noise_seed`.
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_mapgen::*;
    ///
    /// let config = MapConfigBuilder::new()
    ///     .seed(12345)
    ///     .dimensions(400, 300)
    ///     .unwrap()
    ///     .site_count(150)
    ///     .unwrap()
    ///     .lloyd_iterations(2)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    ///
    /// let map = VoronoiMap::generate(config).unwrap();
    /// assert!(map.cell_count() > 0);
    /// ```
    pub fn generate(config: MapConfig) -> Result<Self> {
        let noise = Perlin::new(config.noise_seed);
        Self::generate_with_noise(config, &noise)
    }

    /// Generate a map with a custom noise field
    ///
    /// The noise field shapes the island outline (in `Noise` shape mode) and
    /// drives the elevation of every cell, so swapping it out produces a
    /// completely different map from the same seed.
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_mapgen::*;
    ///
    /// # let config = MapConfigBuilder::new()
    /// #     .seed(7)
    /// #     .dimensions(300, 200)
    /// #     .unwrap()
    /// #     .site_count(100)
    /// #     .unwrap()
    /// #     .build()
    /// #     .unwrap();
    /// let noise = Perlin::new(999);
    /// let map = VoronoiMap::generate_with_noise(config, &noise).unwrap();
    /// ```
    pub fn generate_with_noise<N: NoiseSource>(config: MapConfig, noise: &N) -> Result<Self> {
        // One RNG stream covers scattering, island shaping and rivers, so
        // the seed alone reproduces the whole map.
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed as u64);

        let sites = scatter_sites(&mut rng, config.site_count, config.width, config.height);
        let mut diagram = compute_diagram(&sites, config.width, config.height, config.seed)?;
        for _ in 0..config.lloyd_iterations {
            let relaxed = relaxed_sites(&diagram);
            diagram = compute_diagram(&relaxed, config.width, config.height, config.seed)?;
        }

        build_terrain(&mut diagram, &config, noise, &mut rng);

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let sites: Vec<(u32, DVec2)> = diagram
                .cells()
                .iter()
                .map(|(&id, cell)| (id, diagram.point(cell.site()).position()))
                .collect();
            SpatialIndex::new(&sites)
        };

        Ok(Self {
            config,
            diagram,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Get the underlying diagram
    #[inline]
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Get the number of cells on this map
    ///
    /// Can be less than the configured site count when scattering produced
    /// duplicate sites.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.diagram.cell_count()
    }

    /// Get a cell by ID
    pub fn cell(&self, id: u32) -> Result<&Cell> {
        self.diagram.cell(id)
    }

    /// All cells keyed by ID, in ascending ID order
    ///
    /// # Example
    ///
    /// ```
    /// # use voronoi_mapgen::*;
    /// # let config = MapConfigBuilder::new().seed(42).dimensions(300, 200).unwrap()
    /// #     .site_count(100).unwrap().build().unwrap();
    /// # let map = VoronoiMap::generate(config).unwrap();
    /// let land = map
    ///     .cells()
    ///     .values()
    ///     .filter(|c| c.biome() == Some(Biome::Land))
    ///     .count();
    /// println!("{} land cells", land);
    /// ```
    #[inline]
    pub fn cells(&self) -> &std::collections::BTreeMap<u32, Cell> {
        self.diagram.cells()
    }

    /// Find the cell owning a position (requires spatial-index feature)
    ///
    /// Uses a KD-tree over the cell sites for O(log n) lookup. Positions
    /// outside the bounding box snap to the nearest cell.
    ///
    /// # Example
    ///
    /// ```
    /// # use voronoi_mapgen::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// # let config = MapConfigBuilder::new().seed(42).dimensions(300, 200).unwrap()
    /// #     .site_count(100).unwrap().build().unwrap();
    /// # let map = VoronoiMap::generate(config).unwrap();
    /// let id = map.find_cell_at(150.0, 100.0);
    /// let cell = map.cell(id).unwrap();
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, x: f64, y: f64) -> u32 {
        self.spatial_index.find_nearest(DVec2::new(x, y))
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// Returns the IDs of all cells reachable within `hops` neighbour steps,
    /// including the center cell itself. Returns an empty vec for an unknown
    /// center ID.
    pub fn find_cells_within_radius(&self, center_id: u32, hops: usize) -> Vec<u32> {
        if !self.diagram.cells().contains_key(&center_id) {
            return vec![];
        }

        let mut visited = std::collections::BTreeSet::new();
        let mut current = vec![center_id];
        visited.insert(center_id);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell_id in &current {
                if let Ok(cell) = self.diagram.cell(cell_id) {
                    for &neighbour in cell.neighbours().values() {
                        if visited.insert(neighbour) {
                            next.push(neighbour);
                        }
                    }
                }
            }
            current = next;
        }

        visited.into_iter().collect()
    }
}
