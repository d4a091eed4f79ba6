//! # PDF Serializer
//!
//! Writes a finished [`PageSequence`] as a PDF 1.7 file.
//!
//! This is a from-scratch writer for the small subset the report needs:
//! standard Type1 fonts with WinAnsi encoding, filled and stroked
//! rectangles, rule lines and image XObjects. Page coordinates are flipped
//! here from the canvas's top-left origin to PDF's bottom-left origin.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::sync::Arc;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{DrawCommand, Page, PageSequence};
use crate::error::ReportError;
use crate::font::{fold_diacritic, StandardFont};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::style::{RectStyle, TextStyle};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Standard fonts in use with their object ids; `/F{index}` in content.
    font_objects: Vec<(StandardFont, usize)>,
    /// Distinct images with their XObject ids; `/Im{index}` in content.
    image_objects: Vec<(Arc<LoadedImage>, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn image_index(&self, image: &Arc<LoadedImage>) -> Option<usize> {
        self.image_objects
            .iter()
            .position(|(known, _)| Arc::ptr_eq(known, image))
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize every page of `pages` to PDF bytes.
    pub fn write(&self, pages: &PageSequence, metadata: &PdfMetadata) -> Result<Vec<u8>, ReportError> {
        if pages.pages().is_empty() {
            return Err(ReportError::Render("Page sequence is empty".to_string()));
        }

        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then page objects and content streams
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, pages.pages());
        self.register_images(&mut builder, pages.pages());

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages.pages() {
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let font_resources = builder
                .font_objects
                .iter()
                .enumerate()
                .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let xobject_resources = self.build_xobject_resource_dict(page, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
            };

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", encode_text(subject));
        }
        let _ = write!(
            info,
            "/Producer (revize-report {}) >>",
            env!("CARGO_PKG_VERSION")
        );
        let info_obj_id = builder.push(info.into_bytes());

        log::debug!(
            "PDF: {} pages, {} fonts, {} images, {} objects",
            page_obj_ids.len(),
            builder.font_objects.len(),
            builder.image_objects.len(),
            builder.objects.len() - 1
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    /// One Type1 font object per standard font actually used.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        let mut fonts: Vec<StandardFont> = pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(|c| match c {
                DrawCommand::Text { style, .. } => Some(StandardFont::resolve(style.font_family, style.bold)),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }

        for font in fonts {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            builder.font_objects.push((font, id));
        }
    }

    /// One XObject per distinct image; a logo or photo drawn twice is stored once.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        for page in pages {
            for command in &page.commands {
                if let DrawCommand::Image { image, .. } = command {
                    if builder.image_index(image).is_none() {
                        let id = Self::write_image_xobject(builder, image);
                        builder.image_objects.push((Arc::clone(image), id));
                    }
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, color_space
                );
                builder.push_stream(&dict, data)
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first so the main image can reference it
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha| {
                        let dict = format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        );
                        let id = builder.push_stream(&dict, &compress_to_vec_zlib(alpha, 6));
                        format!(" /SMask {} 0 R", id)
                    })
                    .unwrap_or_default();

                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    fn build_xobject_resource_dict(&self, page: &Page, builder: &PdfBuilder) -> String {
        let mut used: Vec<usize> = page
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { image, .. } => builder.image_index(image),
                _ => None,
            })
            .collect();
        used.sort_unstable();
        used.dedup();
        used.iter()
            .map(|&i| format!("/Im{} {} 0 R", i, builder.image_objects[i].1))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Content stream for one page, in drawing order.
    fn build_content_stream(&self, page: &Page, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        let page_height = page.height;

        for command in &page.commands {
            match command {
                DrawCommand::Text { text, x, y, style, .. } => {
                    self.write_text(&mut stream, text, *x, page_height - *y, style, builder);
                }
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    style,
                } => {
                    self.write_rect(&mut stream, *x, page_height - *y - *height, *width, *height, style);
                }
                DrawCommand::Image {
                    image,
                    x,
                    y,
                    width,
                    height,
                } => {
                    if let Some(index) = builder.image_index(image) {
                        let _ = write!(
                            stream,
                            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            width,
                            height,
                            x,
                            page_height - y - height,
                            index
                        );
                    }
                }
            }
        }
        stream
    }

    /// `top` is the PDF y of the top of the line box; the baseline sits one
    /// font size below it.
    fn write_text(&self, stream: &mut String, text: &str, x: f64, top: f64, style: &TextStyle, builder: &PdfBuilder) {
        let font = builder.font_index(StandardFont::resolve(style.font_family, style.bold));
        let baseline = top - style.font_size;
        let c = style.color;
        let _ = write!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            c.r,
            c.g,
            c.b,
            font,
            style.font_size,
            x,
            baseline,
            encode_text(text)
        );
    }

    /// `y` is the PDF y of the bottom edge.
    fn write_rect(&self, stream: &mut String, x: f64, y: f64, w: f64, h: f64, style: &RectStyle) {
        let stroke = style.stroke.filter(|_| style.stroke_width > 0.0);

        // Degenerate rectangles with a stroke are rule lines.
        if h.abs() < 0.001 || w.abs() < 0.001 {
            if let Some(sc) = stroke {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    sc.r,
                    sc.g,
                    sc.b,
                    style.stroke_width,
                    x,
                    y + h,
                    x + w,
                    y
                );
            }
            return;
        }

        let op = match (style.fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };
        stream.push_str("q\n");
        if let Some(fc) = style.fill {
            let _ = write!(stream, "{:.3} {:.3} {:.3} rg\n", fc.r, fc.g, fc.b);
        }
        if let Some(sc) = stroke {
            let _ = write!(stream, "{:.3} {:.3} {:.3} RG\n{:.2} w\n", sc.r, sc.g, sc.b, style.stroke_width);
        }
        let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n", x, y, w, h, op);
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
///
/// Characters WinAnsi lacks (most Czech carons and rings) lose their
/// diacritic; a few symbols get a textual replacement; anything else
/// becomes `?`. Bytes above 0x7E are written as octal escapes.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch) {
            Some(byte) => push_byte(&mut out, byte),
            None => {
                let folded = fold_diacritic(ch);
                if let Some(byte) = unicode_to_winansi(folded) {
                    push_byte(&mut out, byte);
                } else {
                    match symbol_replacement(ch) {
                        Some(s) => s.bytes().for_each(|b| push_byte(&mut out, b)),
                        None => push_byte(&mut out, b'?'),
                    }
                }
            }
        }
    }
    out
}

fn push_byte(out: &mut String, byte: u8) {
    match byte {
        b'\\' => out.push_str("\\\\"),
        b'(' => out.push_str("\\("),
        b')' => out.push_str("\\)"),
        0x20..=0x7E => out.push(byte as char),
        _ => {
            let _ = write!(out, "\\{:03o}", byte);
        }
    }
}

fn symbol_replacement(ch: char) -> Option<&'static str> {
    match ch {
        '\u{3a9}' | '\u{2126}' => Some("Ohm"),
        '\u{3bc}' => Some("u"),
        '≤' => Some("<="),
        '≥' => Some(">="),
        '\t' | '\u{a0}' => Some(" "),
        '\u{2212}' => Some("-"),
        _ => None,
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA1..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Š
        0x017D => Some(0x8E), // Ž
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // š
        0x017E => Some(0x9E), // ž
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::model::{Orientation, PageSize};
    use crate::style::Color;

    fn contains(bytes: &[u8], needle: &str) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_encode_text_escapes_and_folds() {
        assert_eq!(encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(encode_text("back\\slash"), "back\\\\slash");
        // č and ř fold, á and š are WinAnsi
        assert_eq!(encode_text("čř"), "cr");
        assert_eq!(encode_text("á"), "\\341");
        assert_eq!(encode_text("š"), "\\232");
        assert_eq!(encode_text("250 MΩ"), "250 MOhm");
        assert_eq!(encode_text("→"), "?");
    }

    #[test]
    fn test_empty_sequence_is_an_error() {
        let pages = PageSequence::new(PageSize::A4);
        let err = PdfWriter::new().write(&pages, &PdfMetadata::default()).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
    }

    #[test]
    fn test_document_structure_and_orientation() {
        let mut pages = PageSequence::new(PageSize::A4);
        pages.new_page(Orientation::Portrait);
        pages.draw_text("Závěr", 36.0, 60.0, &TextStyle::default());
        pages.new_page(Orientation::Landscape);
        pages.draw_text("Příloha 1", 36.0, 60.0, &TextStyle::default().bold());

        let metadata = PdfMetadata {
            title: Some("Revize R-1".to_string()),
            ..Default::default()
        };
        let bytes = PdfWriter::new().write(&pages, &metadata).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, "%%EOF"));
        assert!(contains(&bytes, "/MediaBox [0 0 595.28 841.89]"));
        assert!(contains(&bytes, "/MediaBox [0 0 841.89 595.28]"));
        assert!(contains(&bytes, "/Count 2"));
        assert!(contains(&bytes, "/Title (Revize R-1)"));
        assert!(contains(&bytes, "/BaseFont /Helvetica "));
        assert!(contains(&bytes, "/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_shared_image_written_once() {
        let image = Arc::new(LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255; 2 * 2 * 3],
                alpha: Some(vec![128; 4]),
            },
            width_px: 2,
            height_px: 2,
        });
        let mut pages = PageSequence::new(PageSize::A4);
        pages.new_page(Orientation::Portrait);
        pages.draw_image(&image, 36.0, 36.0, 20.0, 20.0);
        pages.new_page(Orientation::Portrait);
        pages.draw_image(&image, 36.0, 36.0, 20.0, 20.0);

        let bytes = PdfWriter::new().write(&pages, &PdfMetadata::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/ColorSpace /DeviceRGB").count(), 1);
        assert_eq!(text.matches("/SMask").count(), 1);
    }

    #[test]
    fn test_rule_line_and_filled_rect() {
        let writer = PdfWriter::new();
        let mut stream = String::new();
        writer.write_rect(&mut stream, 10.0, 20.0, 100.0, 0.0, &RectStyle::stroked(Color::BLACK, 0.5));
        assert!(stream.contains(" m\n") && stream.contains(" l\nS\n"));

        let mut stream = String::new();
        writer.write_rect(&mut stream, 10.0, 20.0, 100.0, 30.0, &RectStyle::filled(Color::RED));
        assert!(stream.contains("re\nf\n"));

        let mut stream = String::new();
        writer.write_rect(&mut stream, 0.0, 0.0, 10.0, 10.0, &RectStyle::default());
        assert!(stream.is_empty());
    }
}
