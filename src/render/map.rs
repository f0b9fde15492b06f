use anyhow::{bail, Context, Result};
use geo::{BoundingRect, Contains, Geometry as GeoGeometry, Point};
use image::RgbaImage;
use std::path::Path;

use crate::classify::legend::class_color;
use crate::geo_core::BoundingBox;
use crate::geometric::{ClassifiedMap, CLASS_PROPERTY};
use crate::render::scheme::{Rgb, BACKGROUND};

/// Mapping between map coordinates and the pixel grid.
///
/// North-up: row 0 is the top of the map (max_y), pixels are square.
struct Canvas {
    width: u32,
    height: u32,
    min_x: f64,
    max_y: f64,
    /// Pixels per map unit
    scale: f64,
}

impl Canvas {
    fn new(bbox: &BoundingBox, width: u32) -> Result<Self> {
        if width == 0 {
            bail!("Map width must be at least 1 pixel");
        }
        if !bbox.is_valid() || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            bail!(
                "Degenerate map extent: {:.6} x {:.6}",
                bbox.width(),
                bbox.height()
            );
        }
        let scale = width as f64 / bbox.width();
        let height = (bbox.height() * scale).ceil().max(1.0) as u32;
        Ok(Canvas {
            width,
            height,
            min_x: bbox.min_x,
            max_y: bbox.max_y,
            scale,
        })
    }

    /// Map coordinates of a pixel center
    fn pixel_center(&self, col: u32, row: u32) -> (f64, f64) {
        (
            self.min_x + (col as f64 + 0.5) / self.scale,
            self.max_y - (row as f64 + 0.5) / self.scale,
        )
    }

    /// Column range covered by [min_x, max_x], clamped to the canvas
    fn col_range(&self, min_x: f64, max_x: f64) -> (u32, u32) {
        let first = ((min_x - self.min_x) * self.scale).floor().max(0.0) as u32;
        let last = (((max_x - self.min_x) * self.scale).ceil() as u32).min(self.width);
        (first.min(self.width), last)
    }

    /// Row range covered by [min_y, max_y], clamped to the canvas
    fn row_range(&self, min_y: f64, max_y: f64) -> (u32, u32) {
        let first = ((self.max_y - max_y) * self.scale).floor().max(0.0) as u32;
        let last = (((self.max_y - min_y) * self.scale).ceil() as u32).min(self.height);
        (first.min(self.height), last)
    }
}

/// Render the classified polygons as a filled (choropleth) map and write
/// it as a PNG of the given pixel width.
///
/// Each polygon is filled with its fixed class color; pixels outside any
/// polygon keep the white background.
pub fn render_classified_map(map: &ClassifiedMap, path: &Path, width: u32) -> Result<()> {
    if map.is_empty() {
        bail!("Nothing to render: classified map is empty");
    }
    let bbox = map.bbox()?;
    let canvas = Canvas::new(&bbox, width)?;

    let mut pixels = Vec::with_capacity(canvas.width as usize * canvas.height as usize * 4);
    for _ in 0..canvas.width as usize * canvas.height as usize {
        pixels.extend_from_slice(&BACKGROUND);
    }

    for feature in map.features() {
        let geometry = match &feature.geometry {
            Some(geometry) => geometry,
            None => continue,
        };
        let geo_geometry: GeoGeometry<f64> = geometry
            .try_into()
            .context("Failed to convert GeoJSON geometry for rendering")?;

        let color = feature
            .properties
            .as_ref()
            .and_then(|properties| properties.get(CLASS_PROPERTY))
            .and_then(|value| value.as_str())
            .map(class_color)
            .unwrap_or(crate::render::scheme::UNCLASSIFIED);

        rasterize_geometry(&geo_geometry, color, &canvas, &mut pixels);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create output directory: {:?}", parent))?;
        }
    }

    let img = RgbaImage::from_raw(canvas.width, canvas.height, pixels)
        .context("Pixel buffer does not match canvas dimensions")?;
    img.save(path)
        .context(format!("Failed to write map image: {:?}", path))?;

    println!("Level 1 map saved to: {:?}", path);
    Ok(())
}

/// Fill the pixels whose centers fall inside the geometry.
///
/// Only pixels within the geometry envelope are tested.
fn rasterize_geometry(geometry: &GeoGeometry<f64>, color: Rgb, canvas: &Canvas, pixels: &mut [u8]) {
    let rect = match geometry.bounding_rect() {
        Some(rect) => rect,
        None => return,
    };

    let (col_start, col_end) = canvas.col_range(rect.min().x, rect.max().x);
    let (row_start, row_end) = canvas.row_range(rect.min().y, rect.max().y);
    let rgba = color.to_rgba(255);

    for row in row_start..row_end {
        for col in col_start..col_end {
            let (x, y) = canvas.pixel_center(col, row);
            if geometry.contains(&Point::new(x, y)) {
                let offset = (row as usize * canvas.width as usize + col as usize) * 4;
                pixels[offset..offset + 4].copy_from_slice(&rgba);
            }
        }
    }
}
