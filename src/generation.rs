//! Request adapter shared by the HTTP routes and the MCP tools: validate the
//! inbound request, call the design service, and record results in history.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::error::AppError;
use crate::history::{HistoryError, HistoryStore, ImageHistoryRecord};
use crate::image_processing::{decode_data_uri, detect_mime_type, get_dimensions};
use crate::prompt::build_prompt;
use crate::settings::{SettingsMap, parse_settings};
use crate::upstream::{DesignEndpoint, GenerationForm};

pub const DEFAULT_VARIATIONS: u32 = 3;
/// The design service never renders more than this many variations.
pub const MAX_VARIATIONS: u32 = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    pub image: Option<String>,
    pub theme: Option<String>,
    pub room: Option<String>,
    pub settings: Option<Value>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationsRequest {
    pub image: Option<String>,
    pub theme: Option<String>,
    pub room: Option<String>,
    pub settings: Option<Value>,
    /// Integer, float or numeric string; see [`variation_count`].
    #[serde(rename = "num_variations")]
    pub num_variations: Option<Value>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignResponse {
    /// `[original, generated]`.
    pub output: Vec<String>,
    pub message: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationsResponse {
    pub success: bool,
    pub variations: Vec<String>,
    pub num_generated: usize,
    pub message: String,
    pub settings_used: Option<Value>,
}

struct PreparedInput {
    image: String,
    bytes: Vec<u8>,
    theme: String,
    room: String,
    settings: SettingsMap,
    prompt: String,
    owner: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn prepare(
    state: &AppState,
    image: Option<String>,
    theme: Option<String>,
    room: Option<String>,
    settings: Option<&Value>,
    user_id: Option<String>,
) -> Result<PreparedInput, AppError> {
    let (Some(image), Some(theme), Some(room)) = (non_empty(image), non_empty(theme), non_empty(room))
    else {
        return Err(AppError::Validation(
            "image, theme and room are required".to_string(),
        ));
    };
    let decoded = decode_data_uri(&image).map_err(|err| {
        AppError::Validation(format!("image must be a base64 data URI: {err}"))
    })?;
    describe_upload(&decoded.bytes);

    let owner = non_empty(user_id);
    if let Some(owner) = owner.as_deref() {
        if !state.owners.verify(owner) {
            return Err(AppError::Unauthorized(
                "userId is not a recognised owner id".to_string(),
            ));
        }
    }

    let settings = parse_settings(settings);
    let prompt = build_prompt(&theme, &room, &settings);
    Ok(PreparedInput {
        image,
        bytes: decoded.bytes,
        theme,
        room,
        settings,
        prompt,
        owner,
    })
}

fn describe_upload(bytes: &[u8]) {
    match detect_mime_type(bytes) {
        Some(mime_type) => match get_dimensions(bytes, mime_type) {
            Ok((width, height)) => {
                debug!(mime_type, width, height, size = bytes.len(), "Received room photo")
            }
            Err(err) => debug!(mime_type, size = bytes.len(), "Room photo header unreadable: {err}"),
        },
        None => warn!(size = bytes.len(), "Room photo is not a recognised image format"),
    }
}

/// Single design: one generated image, optionally saved to the owner's history.
pub async fn run_design(state: &AppState, request: DesignRequest) -> Result<DesignResponse, AppError> {
    let input = prepare(
        state,
        request.image,
        request.theme,
        request.room,
        request.settings.as_ref(),
        request.user_id,
    )?;
    info!("Processing {} style for {}", input.theme, input.room);

    let endpoint = DesignEndpoint::for_settings(&input.settings);
    let settings_json =
        (!input.settings.is_empty()).then(|| Value::Object(input.settings.clone()).to_string());
    let result = state
        .upstream
        .generate(
            endpoint,
            GenerationForm {
                image: input.bytes,
                prompt: input.prompt,
                settings: settings_json,
                num_variations: None,
            },
        )
        .await?;

    if !result.success {
        return Err(AppError::GenerationFailed(
            result.error.unwrap_or_else(|| "Generation failed".to_string()),
        ));
    }
    let generated = result.output.into_iter().next().ok_or_else(|| {
        AppError::GenerationFailed("design service returned no image".to_string())
    })?;

    if let Some(owner) = input.owner.as_deref() {
        if let Err(err) = state.history.append(owner, &generated).await {
            warn!(owner, "Failed to save image to history: {err}");
        } else {
            info!(owner, "Image saved to history");
        }
    }

    Ok(DesignResponse {
        output: vec![input.image, generated],
        message: format!("{} style applied successfully!", input.theme),
        success: true,
    })
}

/// Several variations of one design in a single service call.
pub async fn run_variations(
    state: &AppState,
    request: VariationsRequest,
) -> Result<VariationsResponse, AppError> {
    let input = prepare(
        state,
        request.image,
        request.theme,
        request.room,
        request.settings.as_ref(),
        request.user_id,
    )?;
    let count = variation_count(request.num_variations.as_ref());
    info!("Generating {count} variations for {} style {}", input.theme, input.room);

    let result = state
        .upstream
        .generate(
            DesignEndpoint::Variations,
            GenerationForm {
                image: input.bytes,
                prompt: input.prompt,
                settings: Some(Value::Object(input.settings).to_string()),
                num_variations: Some(count),
            },
        )
        .await?;

    if !result.success {
        return Err(AppError::GenerationFailed(
            result
                .error
                .unwrap_or_else(|| "Failed to generate variations".to_string()),
        ));
    }
    let variations = result.variations.ok_or_else(|| {
        AppError::GenerationFailed("design service returned no variations".to_string())
    })?;

    if let Some(owner) = input.owner.as_deref() {
        let saved = save_variations(&state.history, owner, &variations)
            .await
            .iter()
            .filter(|result| result.is_ok())
            .count();
        info!(owner, saved, total = variations.len(), "Variations saved to history");
    }

    Ok(VariationsResponse {
        success: true,
        num_generated: variations.len(),
        message: format!("Generated {} variations successfully!", variations.len()),
        settings_used: result.settings_used,
        variations,
    })
}

/// Requested number of variations clamped to `1..=MAX_VARIATIONS`. Anything
/// that is not a number falls back to [`DEFAULT_VARIATIONS`].
pub fn variation_count(raw: Option<&Value>) -> u32 {
    let requested = match raw {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value.trunc() as i64)),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|value| value.trunc() as i64)
            })
        }
        _ => None,
    };
    let Some(requested) = requested else {
        if raw.is_some_and(|value| !value.is_null()) {
            debug!(?raw, "Unreadable variation count, using default");
        }
        return DEFAULT_VARIATIONS;
    };
    let count = requested.clamp(1, i64::from(MAX_VARIATIONS)) as u32;
    if i64::from(count) != requested {
        debug!(requested, count, "Clamped variation count");
    }
    count
}

/// Writes every variation concurrently. Slot `i` holds the outcome for
/// `variations[i]`; records already written stay written when others fail.
pub async fn save_variations(
    history: &HistoryStore,
    owner: &str,
    variations: &[String],
) -> Vec<Result<ImageHistoryRecord, HistoryError>> {
    let results = join_all(variations.iter().map(|image| history.append(owner, image))).await;
    for (index, result) in results.iter().enumerate() {
        if let Err(err) = result {
            warn!(owner, index, "Failed to save variation to history: {err}");
        }
    }
    results
}

/// Direct history write. Both fields must be non-empty.
pub async fn record_image(
    state: &AppState,
    user_id: Option<String>,
    image_url: Option<String>,
) -> Result<ImageHistoryRecord, AppError> {
    let (Some(owner), Some(image_url)) = (non_empty(user_id), non_empty(image_url)) else {
        return Err(AppError::Validation(
            "userId and imageUrl are required".to_string(),
        ));
    };
    if !state.owners.verify(&owner) {
        return Err(AppError::Unauthorized(
            "userId is not a recognised owner id".to_string(),
        ));
    }
    Ok(state.history.append(&owner, &image_url).await?)
}

/// All records of one owner, newest first.
pub async fn list_history(
    state: &AppState,
    user_id: Option<String>,
) -> Result<Vec<ImageHistoryRecord>, AppError> {
    let Some(owner) = non_empty(user_id) else {
        return Err(AppError::Validation(
            "userId query parameter is required".to_string(),
        ));
    };
    if !state.owners.verify(&owner) {
        return Err(AppError::Unauthorized(
            "userId is not a recognised owner id".to_string(),
        ));
    }
    Ok(state.history.list_by_owner(&owner).await?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn variation_count_accepts_loose_numbers() {
        assert_eq!(variation_count(None), 3);
        assert_eq!(variation_count(Some(&Value::Null)), 3);
        assert_eq!(variation_count(Some(&json!(4))), 4);
        assert_eq!(variation_count(Some(&json!(-1))), 1);
        assert_eq!(variation_count(Some(&json!(0))), 1);
        assert_eq!(variation_count(Some(&json!(9))), 5);
        assert_eq!(variation_count(Some(&json!(2.0))), 2);
        assert_eq!(variation_count(Some(&json!("4"))), 4);
        assert_eq!(variation_count(Some(&json!(" 2.7 "))), 2);
        assert_eq!(variation_count(Some(&json!("many"))), 3);
        assert_eq!(variation_count(Some(&json!([2]))), 3);
    }
}
