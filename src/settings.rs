//! Generation settings.
//!
//! The server never interprets settings beyond the two prompt flags; it keeps
//! them as a raw JSON object and forwards them. The typed [`DesignSettings`]
//! is what clients build and send.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub type SettingsMap = Map<String, Value>;

/// Accepts settings given as an object or as a JSON-encoded string.
/// Anything unparseable is treated as no settings.
pub fn parse_settings(raw: Option<&Value>) -> SettingsMap {
    match raw {
        None | Some(Value::Null) => SettingsMap::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) if text.trim().is_empty() => SettingsMap::new(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("Ignoring settings that are not an object: {other}");
                SettingsMap::new()
            }
            Err(err) => {
                warn!("Failed to parse settings: {err}");
                SettingsMap::new()
            }
        },
        Some(other) => {
            warn!("Ignoring settings that are not an object: {other}");
            SettingsMap::new()
        }
    }
}

/// Lighting is on unless the caller sent exactly `false`.
pub fn lighting_enabled(settings: &SettingsMap) -> bool {
    !matches!(settings.get("enhanceLighting"), Some(Value::Bool(false)))
}

pub fn preserve_colors(settings: &SettingsMap) -> bool {
    settings.get("preserveColors").is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub const STRENGTH_RANGE: (f32, f32) = (0.1, 1.0);
pub const GUIDANCE_RANGE: (f32, f32) = (1.0, 20.0);
pub const STEPS_RANGE: (u32, u32) = (10, 50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSettings {
    pub strength: f32,
    pub guidance_scale: f32,
    pub steps: u32,
    pub seed: u64,
    pub enable_upscaling: bool,
    pub preserve_colors: bool,
    pub enhance_lighting: bool,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            strength: 0.8,
            guidance_scale: 7.5,
            steps: 20,
            seed: 0,
            enable_upscaling: false,
            preserve_colors: false,
            enhance_lighting: true,
        }
    }
}

impl DesignSettings {
    /// Snap every value onto the ranges and step sizes of the settings panel.
    pub fn clamped(mut self) -> Self {
        self.strength = (self.strength.clamp(STRENGTH_RANGE.0, STRENGTH_RANGE.1) * 10.0).round() / 10.0;
        self.guidance_scale =
            (self.guidance_scale.clamp(GUIDANCE_RANGE.0, GUIDANCE_RANGE.1) * 2.0).round() / 2.0;
        let steps = self.steps.clamp(STEPS_RANGE.0, STEPS_RANGE.1);
        self.steps = ((steps + 2) / 5 * 5).clamp(STEPS_RANGE.0, STEPS_RANGE.1);
        self
    }

    /// JSON string sent with a design request, tagged with style and room.
    pub fn to_request_json(&self, style: &str, room_type: &str) -> String {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => SettingsMap::new(),
        };
        map.insert("style".to_string(), Value::String(style.to_string()));
        map.insert("roomType".to_string(), Value::String(room_type.to_string()));
        Value::Object(map).to_string()
    }

    /// The `settings` field of a client design request.
    pub fn to_request_value(&self, style: &str, room_type: &str) -> Value {
        Value::String(self.to_request_json(style, room_type))
    }
}
