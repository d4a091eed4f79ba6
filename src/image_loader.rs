//! # Image Loading and Decoding
//!
//! Photos and logos reach the engine as base64 strings or `data:` URIs
//! inside the inspection JSON. They are decoded once per generation run and
//! prepared for PDF embedding: JPEG passes through untouched (DCTDecode),
//! PNG is decoded to RGB with a separate alpha channel for SMask transparency.
//!
//! Decoding never touches the filesystem or the network. A failure is
//! reported as `ReportError::Image`; renderers turn it into a placeholder box.

use std::io::Cursor;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// An encoded image as delivered by the caller.
///
/// Holds the textual form (raw base64 or a `data:image/...;base64,` URI) so
/// that one corrupt photo never fails deserialization of the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(String);

impl ImageSource {
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Wrap already-read image bytes (JPEG or PNG).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn load(&self) -> Result<LoadedImage, ReportError> {
        load_image(&self.0)
    }
}

/// A fully decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Width / height, guarded against degenerate sizes.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height_px == 0 {
            1.0
        } else {
            self.width_px as f64 / self.height_px as f64
        }
    }

    /// Largest (width, height) with this image's aspect ratio fitting in a box.
    pub fn fit_within(&self, max_w: f64, max_h: f64) -> (f64, f64) {
        let ratio = self.aspect_ratio();
        if max_w / ratio <= max_h {
            (max_w, max_w / ratio)
        } else {
            (max_h * ratio, max_h)
        }
    }
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes. None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Decode an image from a data URI or raw base64 string.
pub fn load_image(src: &str) -> Result<LoadedImage, ReportError> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, ReportError> {
    let src = src.trim();
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| ReportError::Image("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }
    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ReportError> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| ReportError::Image(format!("Base64 decode error: {}", e)))
}

/// Detect image format from magic bytes and decode accordingly.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, ReportError> {
    if data.len() < 4 {
        return Err(ReportError::Image("Image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(ReportError::Image(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, ReportError> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ReportError::Image(format!("JPEG format detection error: {}", e)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ReportError::Image(format!("Failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers up to the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, ReportError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ReportError::Image(format!("PNG format detection error: {}", e)))?
        .decode()
        .map_err(|e| ReportError::Image(format!("Failed to decode PNG: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image("data:image/png;base64").is_err());
    }

    #[test]
    fn test_garbage_base64_is_an_image_error() {
        let err = ImageSource::from_base64("not an image!!").load().unwrap_err();
        assert!(matches!(err, ReportError::Image(_)));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_decode_png_with_alpha() {
        let loaded = decode_image_bytes(&png_bytes(1, 1, [255, 0, 0, 128])).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert_eq!(alpha.as_ref().unwrap(), &[128]);
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_minimal_jpeg() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = ImageSource::from_bytes(&buf).load().unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (2, 2));
        assert!(matches!(
            loaded.pixel_data,
            ImagePixelData::Jpeg {
                color_space: JpegColorSpace::DeviceRGB,
                ..
            }
        ));
    }

    #[test]
    fn test_data_uri_round_trip_through_json() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(4, 2, [0, 255, 0, 255]));
        let json = format!("\"data:image/png;base64,{}\"", b64);
        let source: ImageSource = serde_json::from_str(&json).unwrap();
        let loaded = source.load().unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (4, 2));
    }

    #[test]
    fn test_fit_within_keeps_aspect_ratio() {
        let loaded = decode_image_bytes(&png_bytes(4, 2, [0, 0, 0, 255])).unwrap();
        assert_eq!(loaded.fit_within(100.0, 100.0), (100.0, 50.0));
        assert_eq!(loaded.fit_within(100.0, 20.0), (40.0, 20.0));
    }
}
