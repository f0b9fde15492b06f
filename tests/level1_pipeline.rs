use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use rsobia::classifier::RandomForestConfig;
use rsobia::classify::Level1Classification;
use rsobia::geometric::{CLASS_NAME_PROPERTY, CLASS_PROPERTY};

/// Synthetic Level 1 inputs: 8 segmented objects in a 4x2 grid, half of
/// them water-like (low NDVI, high NDWI, dark) and half canopy-like.
/// Six objects carry training labels.
fn write_inputs(dir: &std::path::Path) -> (PathBuf, PathBuf, PathBuf) {
    let objects_path = dir.join("objects.csv");
    let training_path = dir.join("training.csv");
    let geometry_path = dir.join("objects.geojson");

    let mut objects = String::from("object_id,ndvi,ndwi,brightness,surveyor\n");
    let mut features = Vec::new();
    for i in 0..8u32 {
        let water = i % 2 == 0;
        let jitter = i as f64 * 0.01;
        let (ndvi, ndwi, brightness) = if water {
            (-0.35 + jitter, 0.55 - jitter, 55.0 + i as f64)
        } else {
            (0.75 - jitter, -0.15 + jitter, 112.0 + i as f64)
        };
        objects.push_str(&format!(
            "{},{:.3},{:.3},{:.1},crew_a\n",
            i + 1,
            ndvi,
            ndwi,
            brightness
        ));

        let col = (i % 4) as f64;
        let row = (i / 4) as f64;
        features.push(format!(
            r#"{{
                "type": "Feature",
                "properties": {{"object_id": {id}}},
                "geometry": {{
                    "type": "Polygon",
                    "coordinates": [[
                        [{x0}, {y0}], [{x1}, {y0}], [{x1}, {y1}], [{x0}, {y1}], [{x0}, {y0}]
                    ]]
                }}
            }}"#,
            id = i + 1,
            x0 = col,
            y0 = row,
            x1 = col + 1.0,
            y1 = row + 1.0
        ));
    }

    let mut training = String::from("object_id,ndvi,ndwi,brightness,class\n");
    for i in 0..6u32 {
        let water = i % 2 == 0;
        let jitter = i as f64 * 0.01;
        let (ndvi, ndwi, brightness, class) = if water {
            (-0.35 + jitter, 0.55 - jitter, 55.0 + i as f64, "water")
        } else {
            (0.75 - jitter, -0.15 + jitter, 112.0 + i as f64, "closed_canopy")
        };
        training.push_str(&format!(
            "{},{:.3},{:.3},{:.1},{}\n",
            i + 1,
            ndvi,
            ndwi,
            brightness,
            class
        ));
    }

    let geometry = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    );

    std::fs::File::create(&objects_path)
        .unwrap()
        .write_all(objects.as_bytes())
        .unwrap();
    std::fs::File::create(&training_path)
        .unwrap()
        .write_all(training.as_bytes())
        .unwrap();
    std::fs::File::create(&geometry_path)
        .unwrap()
        .write_all(geometry.as_bytes())
        .unwrap();

    (objects_path, training_path, geometry_path)
}

fn run_pipeline(dir: &tempfile::TempDir, write_file: bool) -> Level1Classification {
    let (objects, training, geometry) = write_inputs(dir.path());
    let output = dir.path().join("output");

    let mut level1 = Level1Classification::new(
        objects,
        training,
        geometry,
        Some(output.to_string_lossy().to_string()),
        write_file,
    )
    .unwrap();
    level1.set_forest_config(RandomForestConfig {
        n_trees: 30,
        ..RandomForestConfig::default()
    });
    level1.run().unwrap()
}

#[test]
fn every_object_gets_a_prediction_and_join_preserves_count() {
    let dir = tempfile::tempdir().unwrap();
    let level1 = run_pipeline(&dir, false);

    let classified = level1.get_classified().unwrap();
    assert_eq!(classified.len(), 8);
    for index in 0..classified.len() {
        assert!(classified.class_of(index).is_some());
    }
}

#[test]
fn separable_objects_are_classified_correctly() {
    let dir = tempfile::tempdir().unwrap();
    let level1 = run_pipeline(&dir, false);

    let classified = level1.get_classified().unwrap();
    // objects alternate water / closed_canopy by construction
    for index in 0..classified.len() {
        let expected = if index % 2 == 0 { "water" } else { "closed_canopy" };
        assert_eq!(classified.class_of(index), Some(expected), "object {}", index);
    }

    let classes: HashSet<&str> = level1.classes().iter().map(|c| c.as_str()).collect();
    assert_eq!(classes, HashSet::from(["water", "closed_canopy"]));
}

#[test]
fn relabeled_display_names_are_attached() {
    let dir = tempfile::tempdir().unwrap();
    let level1 = run_pipeline(&dir, false);

    let classified = level1.get_classified().unwrap();
    for feature in classified.features() {
        let properties = feature.properties.as_ref().unwrap();
        let slug = properties.get(CLASS_PROPERTY).and_then(|v| v.as_str()).unwrap();
        let name = properties
            .get(CLASS_NAME_PROPERTY)
            .and_then(|v| v.as_str())
            .unwrap();
        match slug {
            "water" => assert_eq!(name, "Water"),
            "closed_canopy" => assert_eq!(name, "Closed canopy"),
            other => panic!("unexpected class {}", other),
        }
    }
}

#[test]
fn training_summary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let level1 = run_pipeline(&dir, false);

    let oob = level1.oob_score().unwrap();
    assert!(oob.evaluated > 0);
    assert!(oob.error_rate >= 0.0 && oob.error_rate <= 1.0);

    let importances = level1.feature_importances();
    assert_eq!(importances.len(), 3);
    // surveyor is not numeric and must not appear as a feature
    assert!(importances.iter().all(|(name, _)| name != "surveyor"));
    // sorted highest first
    for pair in importances.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }

    let confusion = level1.confusion_matrix().unwrap();
    assert_eq!(confusion.n_classes(), 2);
    assert_eq!(confusion.total(), oob.evaluated);
}

#[test]
fn classified_geojson_and_map_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let level1 = run_pipeline(&dir, true);

    let exported = level1.get_output_path().join("level1_classification.geojson");
    assert!(exported.exists());
    let parsed: geojson::GeoJson = std::fs::read_to_string(&exported).unwrap().parse().unwrap();
    match parsed {
        geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 8),
        _ => panic!("expected a FeatureCollection"),
    }

    let map_path = level1.render_map("level1_map.png", 128).unwrap();
    assert!(map_path.exists());
    let img = image::open(&map_path).unwrap().to_rgba8();
    assert_eq!(img.width(), 128);
}

#[test]
fn training_id_missing_from_objects_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (objects, _training, geometry) = write_inputs(dir.path());

    // training references an object id the full table does not have
    let rogue = dir.path().join("rogue_training.csv");
    std::fs::write(
        &rogue,
        "object_id,ndvi,ndwi,brightness,class\n1,-0.3,0.5,55.0,water\n99,0.8,-0.1,110.0,closed_canopy\n",
    )
    .unwrap();

    let level1 = Level1Classification::new(objects, rogue, geometry, None, false).unwrap();
    let err = level1.run().unwrap_err();
    assert!(err.to_string().contains("99"));
}
