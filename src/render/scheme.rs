//! Colors used by the choropleth renderer.

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Fill for classes without a palette entry
pub const UNCLASSIFIED: Rgb = Rgb::new(128, 128, 128);

/// Map background (RGBA, opaque white)
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgba() {
        assert_eq!(Rgb::new(10, 20, 30).to_rgba(255), [10, 20, 30, 255]);
    }
}
