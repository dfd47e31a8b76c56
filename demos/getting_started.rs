use clustermap::{ClusteredMap, Config, Marker, Point, Region, RenderItem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see rebuild logs)
    env_logger::init();

    println!("=== clustermap - Getting Started ===\n");

    // === MARKERS ===
    println!("1. Markers");
    println!("----------");

    let markers = vec![
        Marker::new("cafe-1", Point::new(-73.9857, 40.7484), "Empire Cafe").with_type("cafe"),
        Marker::new("cafe-2", Point::new(-73.9855, 40.7486), "Fifth Ave Beans").with_type("cafe"),
        Marker::new("cafe-3", Point::new(-73.9851, 40.7481), "Midtown Roast").with_type("cafe"),
        Marker::new("bar-1", Point::new(-73.9850, 40.7480), "Skyline Bar").with_type("bar"),
        Marker::new("bar-2", Point::new(-73.9849, 40.7482), "Corner Pub").with_type("bar"),
        Marker::new("home", Point::new(-73.9712, 40.7831), "You are here"),
    ];
    println!("   {} markers, 2 types and 1 untyped\n", markers.len());

    // === CITY VIEW ===
    println!("2. City view");
    println!("------------");

    let mut map = ClusteredMap::builder()
        .config(Config::default())
        .markers(markers)
        .initial_region(Region::new(40.7580, -73.9855, 0.2, 0.2))
        .build()?;

    println!("   Zoom {}", map.viewport().zoom);
    print_render_list(&map);

    // === STREET VIEW ===
    println!("3. Street view");
    println!("--------------");

    map.set_region(Region::new(40.7483, -73.9853, 0.0008, 0.0008))?;
    println!("   Zoom {}", map.viewport().zoom);
    print_render_list(&map);

    // === CLUSTERING DISABLED ===
    println!("4. Clustering disabled");
    println!("----------------------");

    let flat = ClusteredMap::builder()
        .config(Config::default().with_clustering_enabled(false))
        .markers(map.markers().to_vec())
        .build()?;
    println!("   {} features displayed\n", flat.displayed().len());

    // === GEOJSON ===
    #[cfg(feature = "geojson")]
    {
        println!("5. GeoJSON export");
        println!("-----------------");
        println!("   {}\n", clustermap::geojson::to_geojson_string(flat.displayed())?);
    }

    Ok(())
}

fn print_render_list(map: &ClusteredMap<&str>) {
    for item in map.render() {
        match item {
            RenderItem::Marker(marker) => println!("   marker  {} ({})", marker.payload, marker.id),
            RenderItem::Cluster(cluster) => println!(
                "   cluster {} of type {:?} at ({:.4}, {:.4})",
                cluster.label,
                cluster.feature.marker_type.as_deref().unwrap_or_default(),
                cluster.coordinate.y(),
                cluster.coordinate.x()
            ),
        }
    }
    println!();
}
