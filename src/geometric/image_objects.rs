use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson};
use std::collections::HashSet;
use std::path::Path;

use crate::commons::normalize_id;
use crate::geo_core::BoundingBox;

/// Polygon geometry of the segmented image objects.
///
/// Loaded from a GeoJSON FeatureCollection produced by the external
/// segmentation step. Only area geometries (Polygon, MultiPolygon) are
/// kept; stray line or point features are dropped the way land cover
/// layers drop LineStrings. Every kept feature must carry a unique
/// identifier property matching the attribute tables.
pub struct ImageObjects {
    features: Vec<Feature>,
    ids: Vec<String>,
    id_property: String,
}

impl ImageObjects {
    /// Load image objects from a GeoJSON file.
    pub fn from_geojson_file(path: &Path, id_property: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read geometry file: {:?}", path))?;
        let geojson: GeoJson = raw
            .parse()
            .context(format!("Failed to parse GeoJSON: {:?}", path))?;
        Self::from_geojson(&geojson, id_property)
    }

    /// Extract image objects from parsed GeoJSON.
    pub fn from_geojson(geojson: &GeoJson, id_property: &str) -> Result<Self> {
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => bail!("Image objects must be a GeoJSON FeatureCollection"),
        };

        let mut features = Vec::new();
        let mut ids = Vec::new();
        let mut seen = HashSet::new();

        for (index, feature) in collection.features.iter().enumerate() {
            let is_area = matches!(
                feature.geometry.as_ref().map(|g| &g.value),
                Some(geojson::Value::Polygon(_)) | Some(geojson::Value::MultiPolygon(_))
            );
            if !is_area {
                continue;
            }

            let id = feature
                .properties
                .as_ref()
                .and_then(|properties| properties.get(id_property))
                .and_then(normalize_id)
                .with_context(|| {
                    format!(
                        "Feature {} has no usable '{}' identifier property",
                        index, id_property
                    )
                })?;

            if !seen.insert(id.clone()) {
                bail!("Duplicate identifier '{}' in geometry layer", id);
            }
            ids.push(id);
            features.push(feature.clone());
        }

        if features.is_empty() {
            bail!("Geometry layer contains no polygon features");
        }

        Ok(ImageObjects {
            features,
            ids,
            id_property: id_property.to_string(),
        })
    }

    /// Number of polygon features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Normalized identifiers, in feature order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn id_property(&self) -> &str {
        &self.id_property
    }

    /// Bounding box of the whole layer
    pub fn bbox(&self) -> Result<BoundingBox> {
        BoundingBox::from_features(&self.features)
    }
}
