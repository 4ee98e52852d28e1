use std::path::{Path, PathBuf};

use crate::client::ClientError;
use crate::image_processing::{
    decode_data_uri, detect_mime_type, encode_data_uri, mime_type_from_extension,
};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";
const PASTED_FILE_NAME: &str = "pasted-image.png";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A candidate upload: dropped, selected, or pasted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    source: ImageSource,
}

fn mime_from_name(name: &str) -> Option<&'static str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_type_from_extension)
}

impl ImageFile {
    /// Describe a file on disk. The type comes from the extension, or from the
    /// file's magic bytes when the extension is unknown.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| ClientError::Unexpected(format!("{}: {err}", path.display())))?;
        if !metadata.is_file() {
            return Err(ClientError::InvalidFileType);
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = metadata.len();

        let mime_type = match mime_from_name(&name) {
            Some(mime) => mime.to_string(),
            None if size <= MAX_FILE_SIZE => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|err| ClientError::Unexpected(format!("{}: {err}", path.display())))?;
                detect_mime_type(&bytes).unwrap_or(UNKNOWN_MIME_TYPE).to_string()
            }
            None => UNKNOWN_MIME_TYPE.to_string(),
        };

        Ok(Self {
            name,
            mime_type,
            size,
            source: ImageSource::Path(path.to_path_buf()),
        })
    }

    /// In-memory image; the type is sniffed from the bytes, then the name.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Self {
        let mime_type = detect_mime_type(&bytes)
            .or_else(|| mime_from_name(name))
            .unwrap_or(UNKNOWN_MIME_TYPE)
            .to_string();
        Self {
            name: name.to_string(),
            mime_type,
            size: bytes.len() as u64,
            source: ImageSource::Bytes(bytes),
        }
    }

    /// Clipboard text holding a `data:image/...` URI.
    pub fn from_pasted_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with("data:image/") {
            return None;
        }
        let decoded = decode_data_uri(text).ok()?;
        let mime_type = decoded.mime_type.unwrap_or_else(|| "image/png".to_string());
        Some(Self {
            name: PASTED_FILE_NAME.to_string(),
            mime_type,
            size: decoded.bytes.len() as u64,
            source: ImageSource::Bytes(decoded.bytes),
        })
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.mime_type.starts_with("image/") {
            return Err(ClientError::InvalidFileType);
        }
        if self.size > MAX_FILE_SIZE {
            return Err(ClientError::FileTooLarge);
        }
        Ok(())
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, ClientError> {
        match &self.source {
            ImageSource::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|err| ClientError::Unexpected(format!("{}: {err}", path.display()))),
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    pub async fn read_data_uri(&self) -> Result<String, ClientError> {
        let bytes = self.read_bytes().await?;
        Ok(encode_data_uri(&self.mime_type, &bytes))
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Human-readable size with at most two decimals, e.g. `1.5 MB`.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if size == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
