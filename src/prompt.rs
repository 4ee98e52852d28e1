use crate::settings::{SettingsMap, lighting_enabled, preserve_colors};

pub const LIGHTING_CLAUSE: &str = ", bright lighting, well-lit, natural lighting, warm atmosphere";
pub const COLOR_CLAUSE: &str = ", maintaining original color palette, color harmony";
pub const QUALITY_SUFFIX: &str =
    ", professional photography, high quality, detailed, realistic, 8k resolution";

pub fn build_prompt(theme: &str, room: &str, settings: &SettingsMap) -> String {
    let mut prompt = format!("{theme} style {room} interior design");
    if lighting_enabled(settings) {
        prompt.push_str(LIGHTING_CLAUSE);
    }
    if preserve_colors(settings) {
        prompt.push_str(COLOR_CLAUSE);
    }
    prompt.push_str(QUALITY_SUFFIX);
    prompt
}
