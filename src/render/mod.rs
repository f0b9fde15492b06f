pub mod map;
pub mod scheme;

pub use map::render_classified_map;
pub use scheme::Rgb;
