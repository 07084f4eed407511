//! Complete workflow demonstration for voronoi_mapgen

use voronoi_mapgen::*;

fn main() -> Result<()> {
    println!("=== voronoi_mapgen Complete Demo ===\n");

    // Step 1: Configure map
    println!("Step 1: Configuring map...");
    let config = MapConfigBuilder::new()
        .seed(12345)
        .dimensions(800, 600)?
        .site_count(1500)?
        .lloyd_iterations(2)?
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Box: {}x{}", config.width, config.height);
    println!("  Sites: {}", config.site_count);

    // Step 2: Generate map
    println!("\nStep 2: Generating map...");
    let map = VoronoiMap::generate(config)?;
    println!("  Generated {} cells", map.cell_count());

    // Step 3: Analyze terrain
    println!("\nStep 3: Biome distribution:");
    let mut biome_counts = std::collections::BTreeMap::new();
    for cell in map.cells().values() {
        *biome_counts
            .entry(format!("{:?}", cell.biome()))
            .or_insert(0usize) += 1;
    }
    for (biome, count) in &biome_counts {
        let pct = (*count as f64 / map.cell_count() as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", biome, count, pct);
    }

    // Step 4: Query spatial index
    #[cfg(feature = "spatial-index")]
    {
        println!("\nStep 4: Spatial queries:");
        let (x, y) = (config.width as f64 / 2.0, config.height as f64 / 2.0);
        let cell_id = map.find_cell_at(x, y);
        let info = hover_info(&map, cell_id)?;
        println!(
            "  Position ({}, {}) -> Cell {} ({:?}, {:?})",
            x, y, cell_id, info.biome, info.zone
        );
        println!("  Elevation: {:.1}", info.elevation);
    }

    // Step 5: Extract draw data
    println!("\nStep 5: Extracting draw data...");
    let cells = render_cells(&map);
    let overlays = line_overlays(&map);
    let coast = overlays
        .iter()
        .filter(|s| s.kind == LineKind::Coast)
        .count();
    let rivers = overlays
        .iter()
        .filter(|s| s.kind == LineKind::River)
        .count();
    println!("  Cell polygons: {}", cells.len());
    println!("  Coast segments: {}", coast);
    println!("  River segments: {}", rivers);

    println!("\n=== Demo Complete ===");
    Ok(())
}
