//! Image inlining: remote image URL to `data:` URI.
//!
//! Inlining is total. A failed fetch degrades to `None` so a missing avatar or
//! banner never aborts the card pipeline.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::ImageFormat;
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::HttpClient;

/// Used when neither the response header nor the bytes identify the format.
pub const FALLBACK_MIME: &str = "image/png";

pub struct ImageInliner {
    http: HttpClient,
}

impl ImageInliner {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_config(None, None, Some(timeout_secs))?,
        })
    }

    /// Fetch `url` and return it as a `data:` URI, or `None` on any failure.
    pub async fn inline(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        match self.http.get_bytes(url).await {
            Ok(fetched) => {
                let mime = resolve_mime(fetched.content_type.as_deref(), &fetched.bytes);
                debug!(url = %url, mime = %mime, bytes = fetched.bytes.len(), "image inlined");
                Some(to_data_uri(&mime, &fetched.bytes))
            }
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch image");
                None
            }
        }
    }

    /// Inline an optional URL; a missing URL is the same as a failed fetch.
    pub async fn inline_opt(&self, url: Option<&str>) -> Option<String> {
        match url {
            Some(url) => self.inline(url).await,
            None => None,
        }
    }
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Prefer a declared `image/*` content type, then magic-byte sniffing.
pub fn resolve_mime(content_type: Option<&str>, bytes: &[u8]) -> String {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or("").trim().to_lowercase();
        if essence.starts_with("image/") && essence.len() > "image/".len() {
            return essence;
        }
    }

    image::guess_format(bytes)
        .ok()
        .and_then(mime_for_format)
        .unwrap_or(FALLBACK_MIME)
        .to_string()
}

fn mime_for_format(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Ico => Some("image/x-icon"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Avif => Some("image/avif"),
        _ => None,
    }
}
