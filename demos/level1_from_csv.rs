use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use rsobia::classifier::RandomForestConfig;
use rsobia::classify::Level1Classification;

/// Example: Level 1 land-cover classification from CSV attribute tables
/// and a GeoJSON object layer.
///
/// Writes a small synthetic dataset (a 4x3 grid of segmented objects with
/// spectral features), trains a Random Forest on the labeled subset,
/// predicts a class for every object and renders the classified map.
fn main() -> Result<()> {
    println!("=== Example: Level 1 GEOBIA classification ===\n");

    let input_dir = PathBuf::from("./temp/level1_demo");
    std::fs::create_dir_all(&input_dir)?;
    let (objects, training, geometry) = write_demo_inputs(&input_dir)?;

    println!("Inputs written to {:?}:", input_dir);
    println!("  - objects.csv: 12 image objects with ndvi / ndwi / brightness");
    println!("  - training.csv: 8 labeled training objects (3 classes)");
    println!("  - objects.geojson: object polygons keyed by object_id\n");

    let mut level1 = Level1Classification::new(
        objects,
        training,
        geometry,
        Some("./temp/level1_demo/output".to_string()),
        true,
    )?;
    level1.set_forest_config(RandomForestConfig {
        n_trees: 50,
        ..RandomForestConfig::default()
    });

    println!("Training and predicting...");
    let level1 = level1.run()?;

    if let Some(oob) = level1.oob_score() {
        println!(
            "\nOOB error: {:.1}% over {} evaluated training objects",
            oob.error_rate * 100.0,
            oob.evaluated
        );
    }

    println!("\nFeature importances:");
    for (feature, importance) in level1.feature_importances() {
        println!("  {:<12} {:.3}", feature, importance);
    }

    if let Some(confusion) = level1.confusion_matrix() {
        println!("\nConfusion matrix (OOB, actual x predicted):");
        print!("{}", confusion.summary(level1.classes()));
    }

    let map_path = level1.render_map("level1_map.png", 480)?;

    println!("\nDone!");
    println!("  - Classified polygons: {:?}", level1.get_output_path().join("level1_classification.geojson"));
    println!("  - Map image: {:?}", map_path);

    Ok(())
}

fn write_demo_inputs(dir: &std::path::Path) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let objects_path = dir.join("objects.csv");
    let training_path = dir.join("training.csv");
    let geometry_path = dir.join("objects.geojson");

    // three spectral signatures: water, closed canopy, bare soil
    let signature = |class: usize, jitter: f64| -> (f64, f64, f64) {
        match class {
            0 => (-0.30 + jitter, 0.50 - jitter, 52.0 + jitter * 100.0),
            1 => (0.78 - jitter, -0.12 + jitter, 96.0 + jitter * 100.0),
            _ => (0.15 + jitter, -0.05 - jitter, 148.0 + jitter * 100.0),
        }
    };
    let slug = |class: usize| match class {
        0 => "water",
        1 => "closed_canopy",
        _ => "bare_soil",
    };

    let mut objects = String::from("object_id,ndvi,ndwi,brightness\n");
    let mut training = String::from("object_id,ndvi,ndwi,brightness,class\n");
    let mut features = Vec::new();

    for i in 0..12usize {
        let class = i % 3;
        let jitter = (i / 3) as f64 * 0.015;
        let (ndvi, ndwi, brightness) = signature(class, jitter);
        objects.push_str(&format!(
            "{},{:.3},{:.3},{:.1}\n",
            i + 1,
            ndvi,
            ndwi,
            brightness
        ));
        if i < 8 {
            training.push_str(&format!(
                "{},{:.3},{:.3},{:.1},{}\n",
                i + 1,
                ndvi,
                ndwi,
                brightness,
                slug(class)
            ));
        }

        let x0 = (i % 4) as f64;
        let y0 = (i / 4) as f64;
        features.push(format!(
            r#"{{"type": "Feature", "properties": {{"object_id": {}}}, "geometry": {{"type": "Polygon", "coordinates": [[[{x0}, {y0}], [{x1}, {y0}], [{x1}, {y1}], [{x0}, {y1}], [{x0}, {y0}]]]}}}}"#,
            i + 1,
            x0 = x0,
            y0 = y0,
            x1 = x0 + 1.0,
            y1 = y0 + 1.0
        ));
    }

    let geometry = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    );

    std::fs::File::create(&objects_path)?.write_all(objects.as_bytes())?;
    std::fs::File::create(&training_path)?.write_all(training.as_bytes())?;
    std::fs::File::create(&geometry_path)?.write_all(geometry.as_bytes())?;

    Ok((objects_path, training_path, geometry_path))
}
