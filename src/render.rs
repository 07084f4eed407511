//! Render data extraction
//!
//! Produces engine-agnostic draw data from a generated map: filled cell
//! polygons, coast and river line overlays and hover lookups. The caller
//! feeds these into whatever drawing surface it uses; nothing here depends
//! on a rendering engine.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::{Biome, Cell, ElevationZone};
use crate::config::MapMode;
use crate::error::Result;
use crate::geometry::EdgeKind;
use crate::map::VoronoiMap;

/// RGB color type
pub type Color = [u8; 3];

const BORDER_COLOR: Color = [0, 0, 0];

/// Draw data for a single cell: its boundary polygon and colors
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct CellRender {
    /// Cell ID this polygon belongs to
    pub id: u32,
    /// Boundary polygon as a closed ring (first position repeated at the end)
    pub polygon: Vec<DVec2>,
    /// Fill color according to the configured map mode
    pub fill: Color,
    /// Stroke color for the polygon outline
    ///
    /// Matches the fill when borders are hidden, so drawing the outline
    /// unconditionally never shows a border.
    pub border: Color,
}

/// What a line overlay segment represents
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Coastline between land and water
    Coast,
    /// Traced river course
    River,
}

/// A line overlay segment drawn on top of the cell polygons
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct LineSegment {
    pub a: DVec2,
    pub b: DVec2,
    pub kind: LineKind,
}

/// Everything a UI shows about the cell under the cursor
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct HoverInfo {
    /// Cell ID
    pub id: u32,
    /// Site position of the cell
    pub position: DVec2,
    /// Elevation in world units (negative under water)
    pub elevation: f64,
    /// Distance-from-border elevation index in [0, 1]
    pub elevation_index: f64,
    /// Averaged noise sample in [0, 1]
    pub noise: f64,
    /// Terrain classification
    pub biome: Option<Biome>,
    /// Elevation band
    pub zone: Option<ElevationZone>,
}

/// Extract draw data for every cell, in ascending ID order
///
/// # Example
///
/// ```
/// use voronoi_mapgen::*;
///
/// # let config = MapConfigBuilder::new().seed(42).dimensions(300, 200).unwrap()
/// #     .site_count(100).unwrap().build().unwrap();
/// let map = VoronoiMap::generate(config).unwrap();
/// for cell in render_cells(&map) {
///     // draw cell.polygon filled with cell.fill, outlined with cell.border
/// }
/// ```
pub fn render_cells(map: &VoronoiMap) -> Vec<CellRender> {
    let diagram = map.diagram();
    let mode = map.config().map_mode;
    let show_borders = map.config().show_borders;

    diagram
        .cells()
        .iter()
        .map(|(&id, cell)| {
            let polygon = cell
                .polygon()
                .iter()
                .map(|&pid| diagram.point(pid).position())
                .collect();
            let fill = fill_color(mode, cell, diagram.point(cell.site()).noise());
            let border = if show_borders { BORDER_COLOR } else { fill };
            CellRender {
                id,
                polygon,
                fill,
                border,
            }
        })
        .collect()
}

/// Extract coast and river overlay segments
///
/// River segments are always included; coastlines only when the
/// configuration shows borders.
pub fn line_overlays(map: &VoronoiMap) -> Vec<LineSegment> {
    let diagram = map.diagram();
    let show_borders = map.config().show_borders;

    let mut segments = Vec::new();
    for (_, edge) in diagram.edges() {
        let kind = match edge.kind() {
            EdgeKind::Coast if show_borders => LineKind::Coast,
            EdgeKind::River => LineKind::River,
            _ => continue,
        };
        // edges() only yields edges with both endpoints intact
        if let Some((a, b)) = edge.endpoints() {
            segments.push(LineSegment {
                a: diagram.point(a).position(),
                b: diagram.point(b).position(),
                kind,
            });
        }
    }
    segments
}

/// Look up everything a UI shows about one cell
pub fn hover_info(map: &VoronoiMap, id: u32) -> Result<HoverInfo> {
    let cell = map.cell(id)?;
    let site = map.diagram().point(cell.site());
    Ok(HoverInfo {
        id,
        position: site.position(),
        elevation: site.elevation(),
        elevation_index: cell.elevation_index(),
        noise: site.noise(),
        biome: cell.biome(),
        zone: cell.zone(),
    })
}

/// Fill color for a cell under the given map mode
fn fill_color(mode: MapMode, cell: &Cell, noise: f64) -> Color {
    match mode {
        MapMode::Elevation => {
            let level = (noise * 255.0).round().clamp(0.0, 255.0) as u8;
            if cell.biome().map_or(false, Biome::is_water) {
                [0, 255 - level, 255]
            } else {
                [level, 255, level]
            }
        }
        MapMode::ElevationZones => match cell.zone() {
            Some(ElevationZone::High) => [165, 42, 42],
            Some(ElevationZone::UpperMiddle) => [255, 0, 0],
            Some(ElevationZone::LowerMiddle) => [255, 165, 0],
            Some(ElevationZone::Low) => [255, 255, 0],
            Some(ElevationZone::Shallow) => [0, 0, 255],
            Some(ElevationZone::Deep) => [0, 0, 139],
            Some(ElevationZone::Trench) => [25, 25, 112],
            None => BORDER_COLOR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, MapConfigBuilder};

    fn config(seed: u32) -> MapConfigBuilder {
        MapConfigBuilder::new()
            .seed(seed)
            .dimensions(300, 200)
            .unwrap()
            .site_count(120)
            .unwrap()
    }

    fn generate(config: MapConfig) -> VoronoiMap {
        VoronoiMap::generate(config).unwrap()
    }

    #[test]
    fn test_every_cell_gets_a_polygon() {
        let map = generate(config(42).build().unwrap());
        let cells = render_cells(&map);
        assert_eq!(cells.len(), map.cell_count());
        for cell in &cells {
            assert!(cell.polygon.len() >= 4);
            assert_eq!(cell.polygon.first(), cell.polygon.last());
        }
    }

    #[test]
    fn test_elevation_tint_tracks_biome() {
        let map = generate(config(42).build().unwrap());
        let renders = render_cells(&map);
        for render in &renders {
            let cell = map.cell(render.id).unwrap();
            if cell.biome().map_or(false, Biome::is_water) {
                assert_eq!(render.fill[0], 0);
                assert_eq!(render.fill[2], 255);
            } else {
                assert_eq!(render.fill[1], 255);
                assert_eq!(render.fill[0], render.fill[2]);
            }
        }
    }

    #[test]
    fn test_zone_palette() {
        let map = generate(config(42).map_mode(MapMode::ElevationZones).build().unwrap());
        let palette = [
            [165, 42, 42],
            [255, 0, 0],
            [255, 165, 0],
            [255, 255, 0],
            [0, 0, 255],
            [0, 0, 139],
            [25, 25, 112],
        ];
        for render in render_cells(&map) {
            assert!(palette.contains(&render.fill));
        }
    }

    #[test]
    fn test_hidden_borders_match_fill() {
        let map = generate(config(42).show_borders(false).build().unwrap());
        for render in render_cells(&map) {
            assert_eq!(render.border, render.fill);
        }

        let map = generate(config(42).build().unwrap());
        for render in render_cells(&map) {
            assert_eq!(render.border, BORDER_COLOR);
        }
    }

    #[test]
    fn test_coast_overlays_follow_border_flag() {
        let with = generate(config(42).build().unwrap());
        let without = generate(config(42).show_borders(false).build().unwrap());

        let coasts = |segments: &[LineSegment]| {
            segments.iter().filter(|s| s.kind == LineKind::Coast).count()
        };
        let rivers = |segments: &[LineSegment]| {
            segments.iter().filter(|s| s.kind == LineKind::River).count()
        };

        let seg_with = line_overlays(&with);
        let seg_without = line_overlays(&without);

        assert!(coasts(&seg_with) > 0, "island maps have a coastline");
        assert_eq!(coasts(&seg_without), 0);
        // river visibility never depends on the border flag
        assert_eq!(rivers(&seg_with), rivers(&seg_without));
    }

    #[test]
    fn test_hover_info() {
        let map = generate(config(42).build().unwrap());
        let id = *map.cells().keys().next().unwrap();
        let info = hover_info(&map, id).unwrap();
        let cell = map.cell(id).unwrap();

        assert_eq!(info.id, id);
        assert_eq!(info.position, map.diagram().point(cell.site()).position());
        assert_eq!(info.biome, cell.biome());
        assert_eq!(info.zone, cell.zone());
        assert_eq!(info.elevation_index, cell.elevation_index());

        assert!(hover_info(&map, 999_999).is_err());
    }
}
