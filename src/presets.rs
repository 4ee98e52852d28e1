//! Catalogue of styles, room types and ready-made presets.

use crate::settings::DesignSettings;

pub const THEMES: [&str; 6] = [
    "Modern",
    "Traditional",
    "Minimalist",
    "Industrial",
    "Scandinavian",
    "Bohemian",
];

pub const ROOMS: [&str; 8] = [
    "Living Room",
    "Dining Room",
    "Bedroom",
    "Bathroom",
    "Office",
    "Kitchen",
    "Study",
    "Nursery",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub style: &'static str,
    pub room_type: &'static str,
    pub strength: f32,
    pub guidance_scale: f32,
    pub enhance_lighting: bool,
}

impl StylePreset {
    /// Overlay this preset's values; other settings are kept.
    pub fn apply_to(&self, settings: DesignSettings) -> DesignSettings {
        DesignSettings {
            strength: self.strength,
            guidance_scale: self.guidance_scale,
            enhance_lighting: self.enhance_lighting,
            ..settings
        }
    }
}

pub const STYLE_PRESETS: [StylePreset; 5] = [
    StylePreset {
        id: "modern-living",
        name: "Modern Living",
        description: "Clean lines, neutral colors, minimalist furniture",
        style: "Modern",
        room_type: "Living Room",
        strength: 0.8,
        guidance_scale: 7.5,
        enhance_lighting: true,
    },
    StylePreset {
        id: "cozy-bedroom",
        name: "Cozy Bedroom",
        description: "Warm colors, soft textures, comfortable atmosphere",
        style: "Traditional",
        room_type: "Bedroom",
        strength: 0.7,
        guidance_scale: 6.0,
        enhance_lighting: true,
    },
    StylePreset {
        id: "luxury-bathroom",
        name: "Luxury Bathroom",
        description: "High-end finishes, spa-like atmosphere",
        style: "Modern",
        room_type: "Bathroom",
        strength: 0.9,
        guidance_scale: 8.0,
        enhance_lighting: true,
    },
    StylePreset {
        id: "minimalist-office",
        name: "Minimalist Office",
        description: "Clean workspace, productivity-focused design",
        style: "Minimalist",
        room_type: "Office",
        strength: 0.8,
        guidance_scale: 7.0,
        enhance_lighting: true,
    },
    StylePreset {
        id: "elegant-dining",
        name: "Elegant Dining",
        description: "Sophisticated dining space for entertaining",
        style: "Traditional",
        room_type: "Dining Room",
        strength: 0.8,
        guidance_scale: 7.5,
        enhance_lighting: true,
    },
];

pub fn find_preset(id: &str) -> Option<&'static StylePreset> {
    STYLE_PRESETS
        .iter()
        .find(|preset| preset.id.eq_ignore_ascii_case(id.trim()))
}

/// Case-insensitive lookup returning the catalogue spelling.
pub fn canonical_theme(input: &str) -> Option<&'static str> {
    THEMES
        .iter()
        .copied()
        .find(|theme| theme.eq_ignore_ascii_case(input.trim()))
}

pub fn canonical_room(input: &str) -> Option<&'static str> {
    ROOMS
        .iter()
        .copied()
        .find(|room| room.eq_ignore_ascii_case(input.trim()))
}
