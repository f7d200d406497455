use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;

use crate::errors::{GhosthandError, GhosthandResult};

const JPEG_QUALITY: u8 = 80;

/// One encoded screen capture. Only the JPEG bytes and dimensions leave the
/// capture call; the raw bitmap never escapes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub trait ScreenSource {
    fn capture(&self) -> GhosthandResult<Frame>;
}

/// Captures the primary monitor via `xcap`.
pub struct XcapScreen;

impl ScreenSource for XcapScreen {
    fn capture(&self) -> GhosthandResult<Frame> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| GhosthandError::Perception(format!("monitor enumeration: {e}")))?;
        let monitor = monitors
            .first()
            .ok_or_else(|| GhosthandError::Perception("no monitor found".into()))?;
        let rgba = monitor
            .capture_image()
            .map_err(|e| GhosthandError::Perception(format!("capture: {e}")))?;

        let (width, height) = rgba.dimensions();
        let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
        let jpeg = encode_jpeg(&rgb)?;

        tracing::debug!(width, height, bytes = jpeg.len(), "frame captured");
        Ok(Frame {
            jpeg,
            width,
            height,
        })
    }
}

fn encode_jpeg(rgb: &image::RgbImage) -> GhosthandResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| GhosthandError::Perception(format!("JPEG encode: {e}")))?;
    Ok(out)
}
