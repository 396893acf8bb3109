//! Client-side image preparation before upload.
//!
//! Panoramas are capped at a maximum width (aspect preserved) and re-encoded
//! as JPEG to bound storage and bandwidth. Input that cannot be decoded is
//! passed through untouched.

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::GenericImageView as _;
use image::imageops::FilterType;
use tracing::{debug, warn};

use crate::error::ImageError;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_QUALITY: u8 = 70;
pub const JPEG_MIME: &str = "image/jpeg";

/// A user-selected image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(Self::new(name, mime_for_extension(&ext), bytes))
    }
}

pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => JPEG_MIME,
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        JPEG_MIME => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub max_width: u32,
    /// JPEG quality, `1..=100`.
    pub quality: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// `false` when the original bytes were kept because decoding failed.
    pub reencoded: bool,
}

impl PreparedImage {
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.content_type)
    }

    pub fn data_uri(&self) -> String {
        data_uri(&self.content_type, &self.bytes)
    }
}

/// Output size for a `width x height` source capped at `max_width`.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled.max(1))
}

/// Decodes, downscales and re-encodes `file` as JPEG.
pub fn compress(file: &ImageFile, opts: ImageOptions) -> Result<PreparedImage, ImageError> {
    let decoded =
        image::load_from_memory(&file.bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let (w, h) = target_dimensions(decoded.width(), decoded.height(), opts.max_width);
    let resized = if (w, h) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(w, h, FilterType::Triangle)
    };

    let rgb = resized.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, opts.quality.clamp(1, 100));
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    debug!(
        name = %file.name,
        width = w,
        height = h,
        bytes = out.len(),
        "image re-encoded"
    );
    Ok(PreparedImage {
        bytes: out,
        content_type: JPEG_MIME.to_string(),
        reencoded: true,
    })
}

/// [`compress`], keeping the original bytes when the image cannot be processed.
pub fn compress_or_original(file: &ImageFile, opts: ImageOptions) -> PreparedImage {
    match compress(file, opts) {
        Ok(prepared) => prepared,
        Err(err) => {
            warn!(name = %file.name, error = %err, "image not re-encoded, keeping original bytes");
            PreparedImage {
                bytes: file.bytes.clone(),
                content_type: file.content_type.clone(),
                reencoded: false,
            }
        }
    }
}

/// Runs [`compress_or_original`] off the async executor thread where one exists.
pub async fn prepare(file: ImageFile, opts: ImageOptions) -> PreparedImage {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            let name = file.name.clone();
            let fallback = file.clone();
            return match tokio::task::spawn_blocking(move || compress_or_original(&file, opts))
                .await
            {
                Ok(prepared) => prepared,
                Err(err) => {
                    warn!(name = %name, error = %err, "image task failed, keeping original bytes");
                    PreparedImage {
                        bytes: fallback.bytes,
                        content_type: fallback.content_type,
                        reencoded: false,
                    }
                }
            };
        }
    }
    compress_or_original(&file, opts)
}

pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{content_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Inline substitute used when no upload is possible.
pub async fn inline_data_uri(file: ImageFile, opts: ImageOptions) -> String {
    prepare(file, opts).await.data_uri()
}
