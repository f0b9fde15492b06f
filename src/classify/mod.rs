pub mod legend;
pub mod level1;

pub use legend::{class_color, display_label, LandCoverClass};
pub use level1::Level1Classification;
