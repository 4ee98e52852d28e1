use std::path::Path;

use reqwest::Client;
use tracing::info;

use crate::client::ClientError;
use crate::image_processing::decode_data_uri;

/// Bytes of a generated image, which is either an inline data URI or a URL.
pub async fn fetch_image_bytes(http: &Client, image: &str) -> Result<Vec<u8>, ClientError> {
    if image.starts_with("data:") {
        return decode_data_uri(image)
            .map(|decoded| decoded.bytes)
            .map_err(|err| ClientError::Download(err.to_string()));
    }
    if !(image.starts_with("http://") || image.starts_with("https://")) {
        return Err(ClientError::Download(format!("unsupported image reference: {image}")));
    }

    let response = http
        .get(image)
        .send()
        .await
        .map_err(|err| ClientError::Download(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Download(format!("server returned {status}")));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ClientError::Download(err.to_string()))?;
    Ok(bytes.to_vec())
}

pub async fn save_image(http: &Client, image: &str, path: &Path) -> Result<(), ClientError> {
    let bytes = fetch_image_bytes(http, image).await?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| ClientError::Download(err.to_string()))?;
    }
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|err| ClientError::Download(err.to_string()))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved design");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::encode_data_uri;

    #[tokio::test]
    async fn data_uris_are_written_without_a_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/design.png");
        let uri = encode_data_uri("image/png", b"pixels");
        save_image(&Client::new(), &uri, &path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let err = fetch_image_bytes(&Client::new(), "ftp://example.com/a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Download(_)));
    }
}
