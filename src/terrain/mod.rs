//! Island Terrain Processing
//!
//! Turns a bare Voronoi diagram into an island map. The passes run in a
//! fixed order: noise sampling, island shaping, ocean flood fill, coastline
//! marking, elevation propagation and river tracing. Each pass only reads
//! what earlier passes wrote, so the whole pipeline is deterministic for a
//! given diagram, noise field and RNG state.

mod noise;

pub use noise::{NoiseSource, Perlin};

use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::Rng;

use crate::cell::{Biome, ElevationZone};
use crate::config::{IslandShape, MapConfig};
use crate::diagram::Diagram;
use crate::geometry::{EdgeId, EdgeKind, PointId};

/// Run the full terrain pipeline on a computed diagram
///
/// The RNG must be the same one that scattered the sites, continuing its
/// stream; island shaping and river placement draw from it.
pub(crate) fn build_terrain<N: NoiseSource, R: Rng>(
    diagram: &mut Diagram,
    config: &MapConfig,
    noise: &N,
    rng: &mut R,
) {
    determine_noise(diagram, noise, config.noise_octaves);
    match config.island_shape {
        IslandShape::Radial => shape_radial(diagram, rng),
        IslandShape::Noise => shape_noise_threshold(diagram),
    }
    determine_ocean(diagram);
    determine_coast(diagram);
    determine_elevation(diagram, config.peak_height);
    determine_rivers(diagram, rng);
}

/// Sample the noise field for every polygon point and average it per cell
///
/// Point samples are memoized, so a vertex shared by several cells is
/// sampled once. The raw [-1, 1] sample is mapped to [0, 1].
fn determine_noise<N: NoiseSource>(diagram: &mut Diagram, noise: &N, octaves: u32) {
    let width = diagram.width() as f64;
    let height = diagram.height() as f64;
    let frequency = octaves as f64;

    let ids: Vec<u32> = diagram.cells.keys().copied().collect();
    for id in ids {
        let ring: Vec<PointId> = diagram.cells[&id].polygon().to_vec();
        let mut total = 0.0;
        for &pid in &ring {
            let p = diagram.point_mut(pid);
            if p.noise == 0.0 {
                let pos = p.position;
                let sample = noise.sample(frequency * pos.x / width, frequency * pos.y / height);
                p.noise = (sample + 1.0) / 2.0;
            }
            total += p.noise;
        }
        let site = diagram.cells[&id].site();
        diagram.point_mut(site).noise = total / ring.len() as f64;
    }
}

/// Classify cells as water or land along a sine-modulated radial outline
///
/// A point is land when it falls inside the main radius, or inside a second
/// radius past a small gap that produces outlying islets. A randomized dip
/// sector carves a bay into the outline.
fn shape_radial<R: Rng>(diagram: &mut Diagram, rng: &mut R) {
    // amount of smaller outlying islands; higher means more
    let island_factor = 1.07;
    // share of a cell's corners that must be water to flip the cell
    let lake_threshold = 0.2;
    let island_size = 1.0;

    let bumps = rng.gen_range(1..6) as f64;
    let start_angle = rng.gen_range(0.0..2.0 * PI);
    let dip_angle = rng.gen_range(0.0..2.0 * PI);
    let dip_width = rng.gen_range(0.2..0.7);

    let width = diagram.width() as f64;
    let height = diagram.height() as f64;

    let ids: Vec<u32> = diagram.cells.keys().copied().collect();
    for id in ids {
        let (water_points, ring_len) = {
            let cell = &diagram.cells[&id];
            let mut water_points = 0;
            for &pid in cell.polygon() {
                let pos = diagram.point(pid).position();
                // map into [-1, 1] around the map center
                let nx = 2.0 * (pos.x / width - 0.5);
                let ny = 2.0 * (pos.y / height - 0.5);
                let angle = ny.atan2(nx);
                let length = (1.0 - island_size) * nx.abs().max(ny.abs())
                    + (nx * nx + ny * ny).sqrt();

                let mut r1 = 0.5
                    + 0.40 * (start_angle + bumps * angle + ((bumps + 3.0) * angle).cos()).sin();
                let mut r2 = 0.7
                    - 0.20 * (start_angle + bumps * angle - ((bumps + 2.0) * angle).sin()).sin();

                if (angle - dip_angle).abs() < dip_width
                    || (angle - dip_angle + 2.0 * PI).abs() < dip_width
                    || (angle - dip_angle - 2.0 * PI).abs() < dip_width
                {
                    r1 = 0.2;
                    r2 = 0.2;
                }

                let land = length < r1 || (length > r1 * island_factor && length < r2);
                if !land {
                    water_points += 1;
                }
            }
            (water_points, cell.polygon().len())
        };

        let is_ocean = diagram.cells[&id].biome() == Some(Biome::Ocean);
        if !is_ocean && water_points as f64 >= ring_len as f64 * lake_threshold {
            diagram.set_cell_biome(id, Biome::Water);
        } else {
            diagram.set_cell_biome(id, Biome::Land);
        }
    }
}

/// Classify cells as water or land by thresholding cell noise against a
/// radial falloff that grows toward the map border
fn shape_noise_threshold(diagram: &mut Diagram) {
    let ocean_ratio = 0.5;
    let minimum_land_ratio = 0.1;
    let maximum_land_ratio = 0.5;
    let ocean_ratio = (maximum_land_ratio - minimum_land_ratio) * ocean_ratio
        + minimum_land_ratio;

    let half_width = (diagram.width() / 2) as f64;
    let half_height = (diagram.height() / 2) as f64;

    let ids: Vec<u32> = diagram.cells.keys().copied().collect();
    for id in ids {
        let site = diagram.cells[&id].site();
        let pos = diagram.point(site).position();
        let dx = (pos.x - half_width) / half_width;
        let dy = (pos.y - half_height) / half_height;
        let distance = (dx * dx + dy * dy).sqrt();
        let radial = ocean_ratio + ocean_ratio * distance * distance;

        if diagram.point(site).noise() < radial {
            diagram.set_cell_biome(id, Biome::Water);
        } else {
            diagram.set_cell_biome(id, Biome::Land);
        }
    }
}

/// Flood fill ocean from the map border
///
/// Every border cell becomes ocean, then the fill spreads through connected
/// water cells. Water that the fill never reaches stays as lakes.
fn determine_ocean(diagram: &mut Diagram) {
    let mut queue: VecDeque<u32> = diagram
        .cells
        .iter()
        .filter(|(_, cell)| cell.is_outer(&diagram.edges))
        .map(|(&id, _)| id)
        .collect();

    while let Some(id) = queue.pop_front() {
        diagram.set_cell_biome(id, Biome::Ocean);
        let water: Vec<u32> = diagram.cells[&id]
            .neighbours()
            .values()
            .copied()
            .filter(|n| {
                diagram.cells.get(n).and_then(|c| c.biome()) == Some(Biome::Water)
            })
            .collect();
        queue.extend(water);
    }
}

/// Mark every edge between a water cell and a land cell as coastline
fn determine_coast(diagram: &mut Diagram) {
    let water_ids: Vec<u32> = diagram
        .cells
        .iter()
        .filter(|(_, cell)| cell.biome().map_or(false, Biome::is_water))
        .map(|(&id, _)| id)
        .collect();

    for id in water_ids {
        let coast: Vec<EdgeId> = diagram.cells[&id]
            .neighbours()
            .iter()
            .filter(|(_, &n)| {
                let biome = diagram.cells.get(&n).and_then(|c| c.biome());
                !biome.map_or(false, Biome::is_water)
            })
            .map(|(&e, _)| e)
            .collect();
        for edge in coast {
            diagram.set_edge_kind(edge, EdgeKind::Coast);
        }
    }
}

/// Propagate an elevation index inward from the border and scale noise
/// into world-unit heights
///
/// Border cells start at a small index; every step inland adds a small
/// amount over water and a full unit over land, then the indices are
/// normalized. Land elevation is damped by the index so mountains end up
/// inland; water keeps its full (negative) depth.
fn determine_elevation(diagram: &mut Diagram, peak: f64) {
    let water_step = 0.001;
    let land_step = 1.0;

    let border: Vec<u32> = diagram
        .cells
        .iter()
        .filter(|(_, cell)| cell.is_outer(&diagram.edges))
        .map(|(&id, _)| id)
        .collect();
    let mut queue: VecDeque<u32> = border.iter().copied().collect();
    for &id in &border {
        if let Some(cell) = diagram.cell_mut(id) {
            cell.elevation_index = water_step;
        }
    }

    while let Some(id) = queue.pop_front() {
        let current = diagram.cells[&id].elevation_index();
        let pending: Vec<(u32, f64)> = diagram.cells[&id]
            .neighbours()
            .values()
            .copied()
            .filter_map(|n| {
                let cell = diagram.cells.get(&n)?;
                if cell.elevation_index() != -1.0 {
                    return None;
                }
                let step = if cell.biome().map_or(false, Biome::is_water) {
                    water_step
                } else {
                    land_step
                };
                Some((n, current + step))
            })
            .collect();
        for (n, index) in pending {
            if let Some(cell) = diagram.cell_mut(n) {
                cell.elevation_index = index;
            }
            queue.push_back(n);
        }
    }

    let max_index = diagram
        .cells
        .values()
        .map(|cell| cell.elevation_index())
        .fold(f64::MIN, f64::max);

    // normalize and turn noise into heights, cell by cell in ID order;
    // shared points take the value of the last cell that writes them
    let ids: Vec<u32> = diagram.cells.keys().copied().collect();
    for &id in &ids {
        let (site, water, index) = {
            let cell = &diagram.cells[&id];
            (
                cell.site(),
                cell.biome().map_or(false, Biome::is_water),
                cell.elevation_index() / max_index,
            )
        };
        if let Some(cell) = diagram.cell_mut(id) {
            cell.elevation_index = index;
        }

        let scale = |noise: f64| {
            let signed = if water { -noise.abs() } else { noise.abs() };
            let z = signed * peak;
            if water {
                z
            } else {
                z * index
            }
        };

        let site_noise = diagram.point(site).noise();
        diagram.point_mut(site).z = scale(site_noise);

        let ring: Vec<PointId> = diagram.cells[&id].polygon().to_vec();
        for pid in ring {
            let p = diagram.point_mut(pid);
            p.z = scale(p.noise);
        }
    }

    // relative position within the land and water height ranges decides
    // the elevation zone
    let land: Vec<f64> = diagram
        .cells
        .values()
        .filter(|cell| !cell.biome().map_or(false, Biome::is_water))
        .map(|cell| diagram.point(cell.site()).elevation())
        .collect();
    let water: Vec<f64> = diagram
        .cells
        .values()
        .filter(|cell| cell.biome().map_or(false, Biome::is_water))
        .map(|cell| diagram.point(cell.site()).elevation())
        .collect();

    let max_land = land.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_land = land.iter().copied().fold(f64::INFINITY, f64::min);
    let (max_land, min_land) = if land.is_empty() {
        (0.0, 0.0)
    } else {
        (max_land, min_land)
    };
    // depth grows downward: the "maximum" depth is the lowest elevation
    let max_depth = water.iter().copied().fold(f64::INFINITY, f64::min);
    let min_depth = water.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for id in ids {
        let (water_cell, z) = {
            let cell = &diagram.cells[&id];
            (
                cell.biome().map_or(false, Biome::is_water),
                diagram.point(cell.site()).elevation(),
            )
        };
        let zone = if water_cell {
            let relative = ((z - min_depth) / (max_depth - min_depth)) * 100.0;
            if relative <= 30.0 {
                ElevationZone::Shallow
            } else if relative <= 80.0 {
                ElevationZone::Deep
            } else {
                ElevationZone::Trench
            }
        } else {
            let relative = ((z - min_land) / (max_land - min_land)) * 100.0;
            if relative <= 30.0 {
                ElevationZone::Low
            } else if relative <= 65.0 {
                ElevationZone::LowerMiddle
            } else if relative <= 85.0 {
                ElevationZone::UpperMiddle
            } else {
                ElevationZone::High
            }
        };
        if let Some(cell) = diagram.cell_mut(id) {
            cell.zone = Some(zone);
        }
    }
}

/// Trace rivers from random high cells down to the coast
///
/// Candidate sources are drawn from the sweep's site order, so river
/// placement only depends on the RNG stream. From the highest edge of a
/// qualifying cell, the river repeatedly follows the steepest descending
/// edge and stops at rising ground or a coastline.
fn determine_rivers<R: Rng>(diagram: &mut Diagram, rng: &mut R) {
    let attempts = diagram.width() / 2;
    let cell_count = diagram.cells.len();

    for _ in 0..attempts {
        let index = if cell_count <= 1 {
            0
        } else {
            rng.gen_range(0..cell_count - 1)
        };
        let Some(&site_id) = diagram.site_order.get(index) else {
            continue;
        };
        let Some(cell) = diagram.cells.get(&site_id) else {
            continue;
        };
        if !matches!(
            cell.zone(),
            Some(ElevationZone::UpperMiddle) | Some(ElevationZone::High)
        ) {
            continue;
        }

        // edge with the highest endpoint in the cell
        let mut current: Option<EdgeId> = None;
        let mut current_high = f64::MIN;
        for he in cell.half_edges() {
            let Some((a, b)) = diagram.edge(he.edge()).endpoints() else {
                continue;
            };
            let high = diagram
                .point(a)
                .elevation()
                .max(diagram.point(b).elevation());
            if current.is_none() || high > current_high {
                current = Some(he.edge());
                current_high = high;
            }
        }
        let Some(mut edge) = current else {
            continue;
        };

        diagram.set_edge_kind(edge, EdgeKind::River);
        diagram.edges[edge.index()].river += 1;

        // follow the water downhill
        loop {
            let Some((a, b)) = diagram.edge(edge).endpoints() else {
                break;
            };
            let current_point =
                if diagram.point(a).elevation() < diagram.point(b).elevation() {
                    a
                } else {
                    b
                };

            // steepest descending edge out of the low endpoint
            let mut next_edge: Option<EdgeId> = None;
            let mut next_point: Option<PointId> = None;
            for (&e, &p) in diagram.point(current_point).neighbours() {
                if e == edge {
                    continue;
                }
                let lower = match next_point {
                    None => true,
                    Some(np) => diagram.point(np).elevation() > diagram.point(p).elevation(),
                };
                if lower {
                    next_edge = Some(e);
                    next_point = Some(p);
                }
            }
            let (Some(ne), Some(np)) = (next_edge, next_point) else {
                break;
            };

            // the river ends where the ground rises or the sea begins
            if diagram.point(current_point).elevation() < diagram.point(np).elevation() {
                break;
            }
            if diagram.edge(ne).kind() == EdgeKind::Coast {
                break;
            }

            edge = ne;
            diagram.set_edge_kind(edge, EdgeKind::River);
            diagram.edges[edge.index()].river += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    use crate::generation::compute_diagram;

    /// 5x5 grid of sites in a 150x150 box; cell IDs run 1..=25 row by row
    fn grid_diagram() -> Diagram {
        let mut sites = Vec::new();
        for j in 0..5 {
            for i in 0..5 {
                sites.push(DVec2::new((i * 30 + 15) as f64, (j * 30 + 15) as f64));
            }
        }
        compute_diagram(&sites, 150, 150, 0).unwrap()
    }

    /// Border cells ocean-to-be, an inner ring of land, a lake in the middle
    fn lake_setup(diagram: &mut Diagram) {
        let ids: Vec<u32> = diagram.cells.keys().copied().collect();
        for id in ids {
            let outer = diagram.cells[&id].is_outer(&diagram.edges);
            let biome = if outer || id == 13 {
                Biome::Water
            } else {
                Biome::Land
            };
            diagram.set_cell_biome(id, biome);
        }
    }

    #[test]
    fn test_noise_is_memoized_per_point() {
        let mut diagram = grid_diagram();
        let noise = Perlin::new(3);
        determine_noise(&mut diagram, &noise, 8);

        for cell in diagram.cells.values() {
            let site_noise = diagram.point(cell.site()).noise();
            assert!((0.0..=1.0).contains(&site_noise));
            for &p in cell.polygon() {
                assert!((0.0..=1.0).contains(&diagram.point(p).noise()));
            }
        }
    }

    #[test]
    fn test_ocean_flood_stops_at_land() {
        let mut diagram = grid_diagram();
        lake_setup(&mut diagram);
        determine_ocean(&mut diagram);

        // the lake is cut off from the border by land and stays water
        assert_eq!(diagram.cells[&13].biome(), Some(Biome::Water));
        // every border cell is ocean now
        for cell in diagram.cells.values() {
            if cell.is_outer(&diagram.edges) {
                assert_eq!(cell.biome(), Some(Biome::Ocean));
            }
        }
        // flood fill done: no water cell touches an ocean cell
        for cell in diagram.cells.values() {
            if cell.biome() == Some(Biome::Water) {
                for &n in cell.neighbours().values() {
                    assert_ne!(diagram.cells[&n].biome(), Some(Biome::Ocean));
                }
            }
        }
    }

    #[test]
    fn test_ocean_flood_reaches_connected_water() {
        let mut diagram = grid_diagram();
        let ids: Vec<u32> = diagram.cells.keys().copied().collect();
        for id in ids {
            diagram.set_cell_biome(id, Biome::Water);
        }
        determine_ocean(&mut diagram);
        for cell in diagram.cells.values() {
            assert_eq!(cell.biome(), Some(Biome::Ocean));
        }
    }

    #[test]
    fn test_coast_separates_land_and_water() {
        let mut diagram = grid_diagram();
        lake_setup(&mut diagram);
        determine_ocean(&mut diagram);
        determine_coast(&mut diagram);

        for cell in diagram.cells.values() {
            let water = cell.biome().map_or(false, Biome::is_water);
            for (&edge, &n) in cell.neighbours() {
                let other_water = diagram.cells[&n].biome().map_or(false, Biome::is_water);
                if water != other_water {
                    assert_eq!(diagram.edge(edge).kind(), EdgeKind::Coast);
                } else {
                    assert_ne!(diagram.edge(edge).kind(), EdgeKind::Coast);
                }
            }
        }
    }

    #[test]
    fn test_elevation_grows_inland() {
        let mut diagram = grid_diagram();
        lake_setup(&mut diagram);
        determine_ocean(&mut diagram);
        let noise = Perlin::new(3);
        determine_noise(&mut diagram, &noise, 8);
        determine_elevation(&mut diagram, 8000.0);

        for cell in diagram.cells.values() {
            assert!(cell.elevation_index() > 0.0);
            assert!(cell.elevation_index() <= 1.0);
            assert!(cell.zone().is_some());
        }

        // the land ring is higher-indexed than the ocean border
        let border_index = diagram.cells[&1].elevation_index();
        let land_index = diagram.cells[&7].elevation_index();
        assert!(land_index > border_index);

        // water goes down, land goes up
        for cell in diagram.cells.values() {
            let z = diagram.point(cell.site()).elevation();
            if cell.biome().map_or(false, Biome::is_water) {
                assert!(z <= 0.0);
                assert!(cell.zone().map_or(false, ElevationZone::is_water));
            } else {
                assert!(z >= 0.0);
                assert!(!cell.zone().map_or(true, ElevationZone::is_water));
            }
        }
    }

    #[test]
    fn test_rivers_flow_downhill_on_land() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let mut diagram = grid_diagram();
        lake_setup(&mut diagram);
        determine_ocean(&mut diagram);
        determine_coast(&mut diagram);
        let noise = Perlin::new(3);
        determine_noise(&mut diagram, &noise, 8);
        determine_elevation(&mut diagram, 8000.0);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        determine_rivers(&mut diagram, &mut rng);

        // marked edges carry flow, everything else none
        for (_, edge) in diagram.edges() {
            if edge.kind() == EdgeKind::River {
                assert!(edge.river() >= 1);
            } else {
                assert_eq!(edge.river(), 0);
            }
        }
    }

    #[test]
    fn test_noise_shape_thresholds_against_radial_falloff() {
        let mut diagram = grid_diagram();
        let noise = Perlin::new(3);
        determine_noise(&mut diagram, &noise, 8);
        shape_noise_threshold(&mut diagram);

        // every cell got classified one way or the other
        for cell in diagram.cells.values() {
            assert!(cell.biome().is_some());
        }
    }

    #[test]
    fn test_radial_shape_classifies_all_cells() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let mut diagram = grid_diagram();
        let noise = Perlin::new(3);
        determine_noise(&mut diagram, &noise, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        shape_radial(&mut diagram, &mut rng);

        for cell in diagram.cells.values() {
            assert!(cell.biome().is_some());
        }
        // corners of the map are far outside every radius and must be water
        assert!(diagram.cells[&1].biome().map_or(false, Biome::is_water));
        assert!(diagram.cells[&25].biome().map_or(false, Biome::is_water));
    }
}
