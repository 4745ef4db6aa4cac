use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

use crate::error::{BannerError, Result};

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// A user-supplied image kept in its encoded `data:<mime>;base64,<payload>` form.
///
/// The encoding is checked when a request is built, not here, so a malformed value
/// surfaces as a generation failure before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    data_url: String,
}

impl ReferenceImage {
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self::from_data_url(to_data_url(bytes, mime_type))
    }

    /// File-input boundary. Returns `None` for anything that is not an image, which
    /// callers treat as "no reference attached".
    pub fn from_upload(bytes: &[u8], declared_mime: Option<&str>) -> Option<Self> {
        let mime_type = declared_mime
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .map(str::to_string)
            .or_else(|| infer::get(bytes).map(|kind| kind.mime_type().to_string()))?;

        if !mime_type.starts_with("image/") || bytes.is_empty() {
            log::debug!("Ignoring non-image upload ({})", mime_type);
            return None;
        }

        Some(Self::from_bytes(bytes, &mime_type))
    }

    /// Reads a file, guessing its MIME type from the extension and then from its content.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let guessed = mime_guess::from_path(path).first();
        let declared = guessed
            .as_ref()
            .map(|mime| mime.essence_str())
            .filter(|mime| mime.starts_with("image/"));
        Ok(Self::from_upload(&bytes, declared))
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Splits the data URL into MIME type and raw bytes.
    pub fn decode(&self) -> Result<(String, Vec<u8>)> {
        parse_data_url(&self.data_url)
    }
}

pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| BannerError::MalformedReferenceImage("missing data: scheme".into()))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        BannerError::MalformedReferenceImage("missing ',' between header and payload".into())
    })?;

    let mut params = header.split(';');
    let mime_type = params.next().unwrap_or_default().trim();
    if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
        return Err(BannerError::MalformedReferenceImage(
            "payload is not base64-encoded".into(),
        ));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| BannerError::MalformedReferenceImage(format!("invalid base64: {}", e)))?;
    if data.is_empty() {
        return Err(BannerError::MalformedReferenceImage("empty payload".into()));
    }

    let mime_type = if mime_type.is_empty() {
        DEFAULT_IMAGE_MIME.to_string()
    } else {
        mime_type.to_string()
    };
    Ok((mime_type, data))
}

pub fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
