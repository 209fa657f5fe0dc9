//! Image compression with the `image` codecs.

use super::svg::{clean_svg, SvgOptions};
use super::ImageOptimizer;
use crate::config::ImagesConfig;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{AnimationDecoder, ColorType, ImageEncoder, ImageFormat, ImageResult};
use std::io::Cursor;
use std::path::Path;

/// Per-format optimizer driven by [`ImagesConfig`].
#[derive(Debug, Clone)]
pub struct ImageCodecs {
    config: ImagesConfig,
}

impl ImageCodecs {
    /// Create an optimizer with the given settings.
    pub fn new(config: ImagesConfig) -> Self {
        if config.gif_interlaced {
            tracing::debug!("gif interlacing requested; the gif encoder writes non-interlaced frames");
        }
        if config.jpeg_progressive {
            tracing::debug!("progressive jpeg requested; the jpeg encoder writes baseline images");
        }
        Self { config }
    }

    fn png(&self, bytes: &[u8]) -> ImageResult<Vec<u8>> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        let (compression, filter) = match self.config.png_optimization_level {
            0 => (CompressionType::Fast, FilterType::NoFilter),
            1..=3 => (CompressionType::Default, FilterType::Adaptive),
            _ => (CompressionType::Best, FilterType::Adaptive),
        };

        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, compression, filter).write_image(
            img.as_bytes(),
            img.width(),
            img.height(),
            img.color(),
        )?;
        Ok(out)
    }

    fn jpeg(&self, bytes: &[u8]) -> ImageResult<Vec<u8>> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        let rgb = img.to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.config.jpeg_quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        Ok(out)
    }

    fn gif(&self, bytes: &[u8]) -> ImageResult<Vec<u8>> {
        let frames = GifDecoder::new(Cursor::new(bytes))?.into_frames().collect_frames()?;

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, 10);
            if let Some(repeat) = gif_repeat(bytes) {
                encoder.set_repeat(repeat)?;
            }
            encoder.encode_frames(frames)?;
        }
        Ok(out)
    }

    fn svg(&self, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let source = std::str::from_utf8(bytes).map_err(|e| format!("svg is not utf-8: {}", e))?;
        let options = SvgOptions {
            remove_view_box: self.config.svg_remove_view_box,
            cleanup_ids: self.config.svg_cleanup_ids,
        };
        clean_svg(source, &options).map(String::into_bytes)
    }
}

/// Loop setting from the NETSCAPE2.0 application extension.
///
/// `None` means the source has no extension and plays once.
fn gif_repeat(bytes: &[u8]) -> Option<Repeat> {
    const MARKER: &[u8] = b"NETSCAPE2.0";
    let at = bytes.windows(MARKER.len()).position(|w| w == MARKER)? + MARKER.len();
    match bytes.get(at..at + 4)? {
        [0x03, 0x01, lo, hi] => match u16::from_le_bytes([*lo, *hi]) {
            0 => Some(Repeat::Infinite),
            n => Some(Repeat::Finite(n)),
        },
        _ => None,
    }
}

impl ImageOptimizer for ImageCodecs {
    fn optimize(&self, path: &Path, bytes: &[u8]) -> Result<Option<Vec<u8>>, String> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let optimized = match ext.as_str() {
            "png" => self.png(bytes).map_err(|e| e.to_string())?,
            "jpg" | "jpeg" => self.jpeg(bytes).map_err(|e| e.to_string())?,
            "gif" => self.gif(bytes).map_err(|e| e.to_string())?,
            "svg" => self.svg(bytes)?,
            _ => return Ok(None),
        };

        Ok(Some(optimized))
    }
}
