//! Voronoi-based procedural island map generation
//!
//! A standalone library that computes planar Voronoi diagrams with Fortune's
//! sweep line algorithm and turns them into island maps: biomes, coastlines,
//! elevation zones and rivers, ready to draw with any rendering stack.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_mapgen::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .dimensions(1920, 1200).unwrap()
//!     .site_count(4000).unwrap()
//!     .lloyd_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let map = VoronoiMap::generate(config).unwrap();
//!
//! // Extract draw data
//! let cells = render_cells(&map);
//! let overlays = line_overlays(&map);
//! println!("{} cell polygons, {} overlay segments", cells.len(), overlays.len());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and diagrams

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod cell;
pub mod diagram;
pub mod generation;
pub mod terrain;
pub mod map;
pub mod render;

mod rbtree;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{MapConfig, MapConfigBuilder, IslandShape, MapMode};
pub use geometry::{Edge, EdgeId, EdgeKind, HalfEdge, Point, PointId};
pub use cell::{Biome, Cell, ElevationZone};
pub use diagram::Diagram;
pub use generation::compute_diagram;
pub use terrain::{NoiseSource, Perlin};
pub use map::VoronoiMap;
pub use render::{
    render_cells, line_overlays, hover_info, CellRender, Color, HoverInfo, LineKind, LineSegment,
};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
