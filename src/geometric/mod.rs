pub mod classified_map;
pub mod image_objects;

pub use classified_map::{ClassifiedMap, CLASS_PROPERTY, CLASS_NAME_PROPERTY};
pub use image_objects::ImageObjects;
