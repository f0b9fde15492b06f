use anyhow::{bail, Result};
use geojson::Feature;

/// Base struct for geospatial metadata shared across the pipeline.
/// Handles the CRS (Coordinate Reference System).
///
/// All inputs are assumed to already share a single CRS; the EPSG code is
/// carried as metadata and written out with exported layers, but no
/// reprojection happens inside this crate.
#[derive(Debug, Clone)]
pub struct GeoCore {
    /// EPSG code of the working CRS
    pub epsg: i32,
}

impl GeoCore {
    /// Create a new GeoCore with an EPSG code
    pub fn new(epsg: i32) -> Self {
        GeoCore { epsg }
    }

    /// Get EPSG code
    pub fn get_epsg(&self) -> i32 {
        self.epsg
    }

    /// Set EPSG code
    pub fn set_epsg(&mut self, epsg: i32) {
        self.epsg = epsg;
    }
}

impl Default for GeoCore {
    fn default() -> Self {
        // Default to EPSG:4326 (WGS84)
        GeoCore::new(4326)
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An empty box that any call to [`extend`](Self::extend) will replace
    pub fn empty() -> Self {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Grow the box to include a coordinate
    pub fn extend(&mut self, x: f64, y: f64) {
        if x < self.min_x {
            self.min_x = x;
        }
        if y < self.min_y {
            self.min_y = y;
        }
        if x > self.max_x {
            self.max_x = x;
        }
        if y > self.max_y {
            self.max_y = y;
        }
    }

    /// True once the box contains at least one finite coordinate
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Compute the bounding box of a set of GeoJSON features
    pub fn from_features(features: &[Feature]) -> Result<Self> {
        let mut bbox = BoundingBox::empty();
        for feature in features {
            if let Some(ref geometry) = feature.geometry {
                bbox.extend_from_value(&geometry.value);
            }
        }
        if !bbox.is_valid() {
            bail!("Features contain no coordinates to compute a bounding box from");
        }
        Ok(bbox)
    }

    fn extend_from_value(&mut self, value: &geojson::Value) {
        use geojson::Value;
        match value {
            Value::Point(position) => self.extend_from_position(position),
            Value::MultiPoint(positions) | Value::LineString(positions) => {
                for position in positions {
                    self.extend_from_position(position);
                }
            }
            Value::MultiLineString(lines) | Value::Polygon(lines) => {
                for line in lines {
                    for position in line {
                        self.extend_from_position(position);
                    }
                }
            }
            Value::MultiPolygon(polygons) => {
                for polygon in polygons {
                    for ring in polygon {
                        for position in ring {
                            self.extend_from_position(position);
                        }
                    }
                }
            }
            Value::GeometryCollection(geometries) => {
                for geometry in geometries {
                    self.extend_from_value(&geometry.value);
                }
            }
        }
    }

    fn extend_from_position(&mut self, position: &[f64]) {
        if position.len() >= 2 {
            self.extend(position[0], position[1]);
        }
    }
}
