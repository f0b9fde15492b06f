use anyhow::{bail, Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classify::legend::display_label;
use crate::geo_core::BoundingBox;
use crate::geometric::ImageObjects;

/// Property holding the predicted class slug on classified features
pub const CLASS_PROPERTY: &str = "level1";
/// Property holding the display name of the predicted class
pub const CLASS_NAME_PROPERTY: &str = "level1_name";

/// Image-object polygons joined with their predicted land-cover class.
///
/// The join is by identifier and total: every polygon must have a
/// prediction, and the output carries exactly one feature per input
/// polygon.
#[derive(Debug)]
pub struct ClassifiedMap {
    features: Vec<Feature>,
}

impl ClassifiedMap {
    /// Join predictions (identifier to class slug) into the polygon
    /// features. A polygon without a prediction is an error.
    pub fn from_predictions(
        objects: &ImageObjects,
        predictions: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut features = Vec::with_capacity(objects.len());
        for (feature, id) in objects.features().iter().zip(objects.ids()) {
            let slug = predictions
                .get(id)
                .with_context(|| format!("No prediction for object '{}'", id))?;
            let mut classified = feature.clone();
            classified.set_property(CLASS_PROPERTY, slug.clone());
            classified.set_property(CLASS_NAME_PROPERTY, display_label(slug));
            features.push(classified);
        }

        if features.len() != objects.len() {
            bail!(
                "Join lost polygons: {} classified vs {} input",
                features.len(),
                objects.len()
            );
        }

        Ok(ClassifiedMap { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Predicted class slug of one feature
    pub fn class_of(&self, index: usize) -> Option<&str> {
        self.features
            .get(index)
            .and_then(|f| f.properties.as_ref())
            .and_then(|p| p.get(CLASS_PROPERTY))
            .and_then(|v| v.as_str())
    }

    /// Bounding box of the classified layer
    pub fn bbox(&self) -> Result<BoundingBox> {
        BoundingBox::from_features(&self.features)
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            foreign_members: None,
            features: self.features.clone(),
        }
    }

    /// Write the classified polygons as `<name>.geojson` under
    /// `output_path`.
    pub fn to_geojson(&self, output_path: &Path, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(output_path)
            .context(format!("Failed to create output directory: {:?}", output_path))?;

        let output_file = output_path.join(format!("{}.geojson", name));
        let geojson = GeoJson::from(self.to_feature_collection());
        std::fs::write(&output_file, geojson.to_string())
            .context(format!("Failed to write GeoJSON file: {:?}", output_file))?;

        println!("Classified map saved to: {:?}", output_file);
        Ok(output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn objects() -> ImageObjects {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"object_id": 1},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"object_id": 2},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]
                    }
                }
            ]
        }"#
        .parse()
        .unwrap();
        ImageObjects::from_geojson(&geojson, "object_id").unwrap()
    }

    #[test]
    fn test_join_preserves_count_and_labels() {
        let objects = objects();
        let mut predictions = HashMap::new();
        predictions.insert("1".to_string(), "water".to_string());
        predictions.insert("2".to_string(), "closed_canopy".to_string());

        let classified = ClassifiedMap::from_predictions(&objects, &predictions).unwrap();
        assert_eq!(classified.len(), objects.len());
        assert_eq!(classified.class_of(0), Some("water"));
        assert_eq!(classified.class_of(1), Some("closed_canopy"));

        let name = classified.features()[1]
            .properties
            .as_ref()
            .unwrap()
            .get(CLASS_NAME_PROPERTY)
            .and_then(|v| v.as_str())
            .unwrap();
        assert_eq!(name, "Closed canopy");
    }

    #[test]
    fn test_missing_prediction_is_error() {
        let objects = objects();
        let mut predictions = HashMap::new();
        predictions.insert("1".to_string(), "water".to_string());
        let err = ClassifiedMap::from_predictions(&objects, &predictions).unwrap_err();
        assert!(err.to_string().contains("No prediction"));
    }

    #[test]
    fn test_to_geojson_round_trips() {
        let objects = objects();
        let mut predictions = HashMap::new();
        predictions.insert("1".to_string(), "water".to_string());
        predictions.insert("2".to_string(), "water".to_string());
        let classified = ClassifiedMap::from_predictions(&objects, &predictions).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = classified.to_geojson(dir.path(), "level1_test").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: GeoJson = raw.parse().unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            _ => panic!("expected a FeatureCollection"),
        }
    }
}
