use crate::commons::sentence_case;
use crate::render::scheme::{Rgb, UNCLASSIFIED};

/// Level 1 land cover classes
/// Name            Code  Slug
/// Water             1   water
/// Closed canopy     2   closed_canopy
/// Open canopy       3   open_canopy
/// Grassland         4   grassland
/// Bare soil         5   bare_soil
/// Built-up          6   built_up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandCoverClass {
    Water = 1,
    ClosedCanopy = 2,
    OpenCanopy = 3,
    Grassland = 4,
    BareSoil = 5,
    BuiltUp = 6,
}

impl LandCoverClass {
    pub const ALL: [LandCoverClass; 6] = [
        LandCoverClass::Water,
        LandCoverClass::ClosedCanopy,
        LandCoverClass::OpenCanopy,
        LandCoverClass::Grassland,
        LandCoverClass::BareSoil,
        LandCoverClass::BuiltUp,
    ];

    /// Slug used in training labels and exported attributes
    pub fn slug(self) -> &'static str {
        match self {
            LandCoverClass::Water => "water",
            LandCoverClass::ClosedCanopy => "closed_canopy",
            LandCoverClass::OpenCanopy => "open_canopy",
            LandCoverClass::Grassland => "grassland",
            LandCoverClass::BareSoil => "bare_soil",
            LandCoverClass::BuiltUp => "built_up",
        }
    }

    /// Name shown on the rendered map and exported attributes
    pub fn display_name(self) -> &'static str {
        match self {
            LandCoverClass::Water => "Water",
            LandCoverClass::ClosedCanopy => "Closed canopy",
            LandCoverClass::OpenCanopy => "Open canopy",
            LandCoverClass::Grassland => "Grassland",
            LandCoverClass::BareSoil => "Bare soil",
            LandCoverClass::BuiltUp => "Built-up",
        }
    }

    /// Fixed map color
    pub fn color(self) -> Rgb {
        match self {
            LandCoverClass::Water => Rgb::new(70, 130, 180),
            LandCoverClass::ClosedCanopy => Rgb::new(27, 120, 55),
            LandCoverClass::OpenCanopy => Rgb::new(145, 207, 96),
            LandCoverClass::Grassland => Rgb::new(217, 239, 139),
            LandCoverClass::BareSoil => Rgb::new(216, 179, 101),
            LandCoverClass::BuiltUp => Rgb::new(120, 120, 120),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|class| class.slug() == slug)
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|class| class.code() == code)
    }
}

/// Relabel a class slug to its display name.
///
/// Pure and idempotent: known slugs map to their fixed display names,
/// labels that already are display names pass through unchanged, and
/// unknown slugs fall back to sentence case.
pub fn display_label(label: &str) -> String {
    if let Some(class) = LandCoverClass::from_slug(label) {
        return class.display_name().to_string();
    }
    if LandCoverClass::ALL
        .iter()
        .any(|class| class.display_name() == label)
    {
        return label.to_string();
    }
    sentence_case(label)
}

/// Fixed color of a class slug (or display name); unknown classes get a
/// neutral gray.
pub fn class_color(label: &str) -> Rgb {
    LandCoverClass::from_slug(label)
        .or_else(|| {
            LandCoverClass::ALL
                .iter()
                .copied()
                .find(|class| class.display_name() == label)
        })
        .map(LandCoverClass::color)
        .unwrap_or(UNCLASSIFIED)
}
