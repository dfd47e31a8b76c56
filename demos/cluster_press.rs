use clustermap::{
    ClusteredMap, Config, EdgePadding, LayoutAnimation, MapSurface, Marker, Point, Region,
};

/// Stand-in for a host map view that just moves its camera.
struct Camera {
    region: Region,
}

impl MapSurface for Camera {
    fn fit_to_region(&mut self, region: &Region, edge_padding: &EdgePadding, animated: bool) {
        println!(
            "   camera -> center ({:.5}, {:.5}) span {:.5}x{:.5}, padding {:?}, animated: {}",
            region.latitude,
            region.longitude,
            region.latitude_delta,
            region.longitude_delta,
            edge_padding,
            animated
        );
        self.region = *region;
    }

    fn configure_layout_animation(&mut self, animation: &LayoutAnimation) {
        println!("   next layout change animates as {:?}", animation);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== clustermap - Cluster Press ===\n");

    let markers: Vec<_> = (0..12)
        .map(|i| {
            let offset = f64::from(i) * 0.0004;
            Marker::new(
                format!("stop-{}", i),
                Point::new(2.3522 + offset, 48.8566 - offset),
                format!("Bus stop {}", i),
            )
            .with_type("bus")
        })
        .collect();

    let config = Config::default().with_edge_padding(EdgePadding::uniform(80.0));
    let mut map = ClusteredMap::builder()
        .config(config)
        .markers(markers)
        .region(Region::new(48.8566, 2.3522, 0.5, 0.5))
        .on_cluster_press(|feature, leaves| {
            println!(
                "   pressed cluster {} holding {} stops",
                feature.feature.id,
                leaves.len()
            );
        })
        .on_region_change_complete(|region, previous| {
            println!(
                "   region settled at span {:.4}; {} features were shown",
                region.latitude_delta,
                previous.len()
            );
        })
        .build()?;

    let mut camera = Camera {
        region: Region::new(48.8566, 2.3522, 0.5, 0.5),
    };

    // Keep pressing the first cluster until everything is split apart.
    for step in 1.. {
        let Some(cluster) = map.displayed().iter().find(|f| f.is_cluster()).cloned() else {
            println!("\nNo clusters left after {} presses", step - 1);
            break;
        };

        println!("\nPress {} (zoom {})", step, map.viewport().zoom);
        map.press_cluster(&cluster, &mut camera)?;

        let fitted = camera.region;
        map.on_region_change_complete(fitted, &mut camera)?;
        println!("   now showing {} features", map.displayed().len());

        if step >= 5 {
            break;
        }
    }

    Ok(())
}
