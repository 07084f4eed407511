//! Map Configuration and Builder
//!
//! This module provides configuration types for deterministic Voronoi map generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Island shaping strategy used to decide which cells start as water
///
/// Both shapes sample the same noise field; they differ in how the land/water
/// threshold is derived for each cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslandShape {
    /// Sine-modulated radial blob with a randomized dip sector
    ///
    /// Produces a single roughly round island with bays and an optional
    /// fjord-like indentation. Uses the generation RNG, so the same seed
    /// always produces the same outline.
    Radial,
    /// Pure noise threshold against a radial falloff
    ///
    /// Cells become water where their noise value falls below a falloff
    /// that grows with distance from the map center.
    Noise,
}

impl Default for IslandShape {
    fn default() -> Self {
        IslandShape::Radial
    }
}

/// How cells are tinted when extracting render data
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Continuous tint from the cell's noise level (green land, blue water)
    Elevation,
    /// Discrete palette from the cell's elevation zone
    ElevationZones,
}

impl Default for MapMode {
    fn default() -> Self {
        MapMode::Elevation
    }
}

/// Configuration for deterministic Voronoi map generation
///
/// This configuration is serializable and can be shared between client and server.
/// The same configuration will always produce the identical map.
///
/// # Serialization
///
/// Only the configuration is serialized (~40 bytes), not the generated cells.
/// The map is regenerated from the configuration when loading a save file.
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .dimensions(800, 600)
///     .unwrap()
///     .site_count(500)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config.seed, restored.seed);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Random seed for deterministic map generation
    ///
    /// The same seed (with the same other parameters) will always produce
    /// the exact same map with identical cells, biomes and rivers.
    pub seed: u32,

    /// Map width in world units (also the bounding-box right edge)
    pub width: u32,

    /// Map height in world units (also the bounding-box bottom edge)
    pub height: u32,

    /// Number of random sites to scatter before diagram computation
    ///
    /// The resulting cell count can be lower when random placement
    /// produces coincident sites, which are skipped.
    pub site_count: usize,

    /// Number of Lloyd's Relaxation iterations for uniform cell distribution
    ///
    /// - 0: Random Voronoi cells (irregular)
    /// - 2: Decent uniformity (default)
    /// - 5+: Very uniform, diminishing returns
    pub lloyd_iterations: usize,

    /// Random seed for the noise field (separate from cell placement seed)
    ///
    /// This allows the same cell layout with different terrain distributions.
    pub noise_seed: u32,

    /// Noise frequency multiplier applied to normalized cell coordinates
    ///
    /// Higher values produce more, smaller terrain features.
    pub noise_octaves: u32,

    /// Island shaping strategy for the initial land/water split
    pub island_shape: IslandShape,

    /// Peak elevation in world units used when scaling noise into height
    pub peak_height: f64,

    /// Cell tinting mode for render data extraction
    pub map_mode: MapMode,

    /// Whether render data marks cell borders and coastlines
    pub show_borders: bool,
}

impl MapConfig {
    /// Total map area in world units
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating MapConfig with validation
///
/// Uses the builder pattern to create configurations with sensible defaults
/// and validation of all numeric ranges.
///
/// # Example
///
/// ```rust
/// use voronoi_mapgen::*;
///
/// // Use defaults
/// let config = MapConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed(12345)
///     .dimensions(1024, 768)
///     .unwrap()
///     .site_count(2000)
///     .unwrap()
///     .lloyd_iterations(3)
///     .unwrap()
///     .island_shape(IslandShape::Noise)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u32>,
    width: u32,
    height: u32,
    site_count: usize,
    lloyd_iterations: usize,
    noise_seed: Option<u32>,
    noise_octaves: u32,
    island_shape: IslandShape,
    peak_height: f64,
    map_mode: MapMode,
    show_borders: bool,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - dimensions: 1920 x 1200
    /// - site_count: 4000
    /// - lloyd_iterations: 2
    /// - noise_seed: Same as seed
    /// - noise_octaves: 8
    /// - island_shape: Radial
    /// - peak_height: 8000.0
    /// - map_mode: Elevation
    /// - show_borders: true
    pub fn new() -> Self {
        Self {
            seed: None,
            width: 1920,
            height: 1200,
            site_count: 4000,
            lloyd_iterations: 2,
            noise_seed: None,
            noise_octaves: 8,
            island_shape: IslandShape::default(),
            peak_height: 8000.0,
            map_mode: MapMode::default(),
            show_borders: true,
        }
    }

    /// Set the random seed for map generation
    ///
    /// Using the same seed with the same other parameters will produce
    /// an identical map every time.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the map dimensions in world units
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero
    pub fn dimensions(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "dimensions must be positive (got {}x{})",
                width, height
            )));
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the number of sites to scatter
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if count is zero
    pub fn site_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(VoronoiError::InvalidConfig(
                "site count must be positive".to_string(),
            ));
        }
        self.site_count = count;
        Ok(self)
    }

    /// Set the number of Lloyd's Relaxation iterations
    ///
    /// More iterations create more uniform cell distributions but take longer.
    /// Recommended: 2-5 iterations for good uniformity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20 (excessive and impractical)
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 20 {
            return Err(VoronoiError::InvalidConfig(format!(
                "Lloyd iterations must be <= 20 (got {})",
                iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set a separate noise seed
    ///
    /// If not set, the noise seed will match the map seed.
    /// Setting a different noise seed allows the same cell layout
    /// with different terrain distributions.
    pub fn noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    /// Set the noise frequency multiplier
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if octaves is zero
    pub fn noise_octaves(mut self, octaves: u32) -> Result<Self> {
        if octaves == 0 {
            return Err(VoronoiError::InvalidConfig(
                "noise octaves must be positive".to_string(),
            ));
        }
        self.noise_octaves = octaves;
        Ok(self)
    }

    /// Set the island shaping strategy
    pub fn island_shape(mut self, shape: IslandShape) -> Self {
        self.island_shape = shape;
        self
    }

    /// Set the peak elevation used when scaling noise into height
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the peak is not positive or not finite
    pub fn peak_height(mut self, peak: f64) -> Result<Self> {
        if !peak.is_finite() || peak <= 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "peak height must be positive (got {})",
                peak
            )));
        }
        self.peak_height = peak;
        Ok(self)
    }

    /// Set the cell tinting mode for render data extraction
    pub fn map_mode(mut self, mode: MapMode) -> Self {
        self.map_mode = mode;
        self
    }

    /// Set whether render data marks cell borders and coastlines
    pub fn show_borders(mut self, show: bool) -> Self {
        self.show_borders = show;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let noise_seed = self.noise_seed.unwrap_or(seed);

        Ok(MapConfig {
            seed,
            width: self.width,
            height: self.height,
            site_count: self.site_count,
            lloyd_iterations: self.lloyd_iterations,
            noise_seed,
            noise_octaves: self.noise_octaves,
            island_shape: self.island_shape,
            peak_height: self.peak_height,
            map_mode: self.map_mode,
            show_borders: self.show_borders,
        })
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MapConfigBuilder::new().build().unwrap();
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1200);
        assert_eq!(config.site_count, 4000);
        assert_eq!(config.lloyd_iterations, 2);
        assert_eq!(config.noise_octaves, 8);
        assert_eq!(config.island_shape, IslandShape::Radial);
        assert_eq!(config.peak_height, 8000.0);
        assert_eq!(config.map_mode, MapMode::Elevation);
        assert!(config.show_borders);
    }

    #[test]
    fn test_builder_custom() {
        let config = MapConfigBuilder::new()
            .seed(42)
            .dimensions(800, 600)
            .unwrap()
            .site_count(1000)
            .unwrap()
            .lloyd_iterations(3)
            .unwrap()
            .noise_seed(99)
            .island_shape(IslandShape::Noise)
            .map_mode(MapMode::ElevationZones)
            .show_borders(false)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.site_count, 1000);
        assert_eq!(config.lloyd_iterations, 3);
        assert_eq!(config.noise_seed, 99);
        assert_eq!(config.island_shape, IslandShape::Noise);
        assert_eq!(config.map_mode, MapMode::ElevationZones);
        assert!(!config.show_borders);
    }

    #[test]
    fn test_noise_seed_defaults_to_map_seed() {
        let config = MapConfigBuilder::new().seed(42).build().unwrap();
        assert_eq!(config.noise_seed, 42);
    }

    #[test]
    fn test_separate_noise_seed() {
        let config = MapConfigBuilder::new()
            .seed(42)
            .noise_seed(99)
            .build()
            .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.noise_seed, 99);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(MapConfigBuilder::new().dimensions(0, 600).is_err());
        assert!(MapConfigBuilder::new().dimensions(800, 0).is_err());
    }

    #[test]
    fn test_invalid_site_count() {
        assert!(MapConfigBuilder::new().site_count(0).is_err());
    }

    #[test]
    fn test_too_many_iterations() {
        assert!(MapConfigBuilder::new().lloyd_iterations(21).is_err());
        assert!(MapConfigBuilder::new().lloyd_iterations(20).is_ok());
    }

    #[test]
    fn test_invalid_octaves() {
        assert!(MapConfigBuilder::new().noise_octaves(0).is_err());
    }

    #[test]
    fn test_invalid_peak() {
        assert!(MapConfigBuilder::new().peak_height(0.0).is_err());
        assert!(MapConfigBuilder::new().peak_height(-100.0).is_err());
        assert!(MapConfigBuilder::new().peak_height(f64::NAN).is_err());
    }

    #[test]
    fn test_area() {
        let config = MapConfigBuilder::new()
            .dimensions(100, 50)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.area(), 5000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MapConfigBuilder::new()
            .seed(12345)
            .dimensions(640, 480)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: MapConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.seed, restored.seed);
        assert_eq!(config.width, restored.width);
        assert_eq!(config.island_shape, restored.island_shape);
    }
}
