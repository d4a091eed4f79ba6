//! # Fonts
//!
//! The report uses the standard PDF fonts only (Helvetica, Times, Courier),
//! which need no embedding. This module resolves a template's font family
//! name to one of them and measures text with the built-in AFM widths.

pub mod metrics;

use serde::{Deserialize, Serialize};

pub use metrics::StandardFontMetrics;

/// Font families a template may select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Map a user-entered family name. Unknown names fall back to Helvetica.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        if lower.starts_with("times") || (lower.contains("serif") && !lower.contains("sans")) {
            FontFamily::Times
        } else if lower.starts_with("courier") || lower.contains("mono") {
            FontFamily::Courier
        } else {
            if !lower.is_empty()
                && !lower.starts_with("helvetica")
                && !lower.starts_with("arial")
                && !lower.contains("sans")
            {
                log::warn!("Font family '{}' is not available, using Helvetica", name);
            }
            FontFamily::Helvetica
        }
    }
}

/// The standard PDF fonts this engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    pub fn resolve(family: FontFamily, bold: bool) -> Self {
        match (family, bold) {
            (FontFamily::Helvetica, false) => Self::Helvetica,
            (FontFamily::Helvetica, true) => Self::HelveticaBold,
            (FontFamily::Times, false) => Self::TimesRoman,
            (FontFamily::Times, true) => Self::TimesBold,
            (FontFamily::Courier, false) => Self::Courier,
            (FontFamily::Courier, true) => Self::CourierBold,
        }
    }

    /// The PDF BaseFont name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    /// Width table. Times is measured with Helvetica widths, which
    /// overestimates slightly and so never overflows a column.
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::TimesRoman => &metrics::HELVETICA,
            Self::HelveticaBold | Self::TimesBold => &metrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold => &metrics::COURIER,
        }
    }
}

/// Text measurement shared by layout code and the canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    pub fn char_width(&self, ch: char, family: FontFamily, bold: bool, font_size: f64) -> f64 {
        StandardFont::resolve(family, bold)
            .metrics()
            .char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, family: FontFamily, bold: bool, font_size: f64) -> f64 {
        StandardFont::resolve(family, bold)
            .metrics()
            .measure_string(text, font_size)
    }
}

/// Strip the diacritic from Czech and common Latin accented letters.
/// Characters without a mapping are returned unchanged.
pub fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' | 'å' | 'ą' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Å' | 'Ą' => 'A',
        'č' | 'ç' | 'ć' => 'c',
        'Č' | 'Ç' | 'Ć' => 'C',
        'ď' => 'd',
        'Ď' => 'D',
        'é' | 'ě' | 'è' | 'ë' | 'ê' | 'ę' => 'e',
        'É' | 'Ě' | 'È' | 'Ë' | 'Ê' | 'Ę' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ľ' | 'ĺ' | 'ł' => 'l',
        'Ľ' | 'Ĺ' | 'Ł' => 'L',
        'ň' | 'ñ' | 'ń' => 'n',
        'Ň' | 'Ñ' | 'Ń' => 'N',
        'ó' | 'ò' | 'ö' | 'ô' | 'ő' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Ő' => 'O',
        'ř' | 'ŕ' => 'r',
        'Ř' | 'Ŕ' => 'R',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ť' => 't',
        'Ť' => 'T',
        'ú' | 'ů' | 'ù' | 'ü' | 'û' | 'ű' => 'u',
        'Ú' | 'Ů' | 'Ù' | 'Ü' | 'Û' | 'Ű' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_width() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', FontFamily::Helvetica, false, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure_string("Revize", FontFamily::Helvetica, false, 12.0);
        let bold = ctx.measure_string("Revize", FontFamily::Helvetica, true, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_czech_letters_measure_like_base() {
        let ctx = FontContext::new();
        let plain = ctx.measure_string("Rozvadec", FontFamily::Helvetica, false, 10.0);
        let czech = ctx.measure_string("Rozvaděč", FontFamily::Helvetica, false, 10.0);
        assert!((plain - czech).abs() < 1e-9);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("iiWW", FontFamily::Courier, false, 10.0);
        assert!((w - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_family_from_name() {
        assert_eq!(FontFamily::from_name("Times New Roman"), FontFamily::Times);
        assert_eq!(FontFamily::from_name("Courier New"), FontFamily::Courier);
        assert_eq!(FontFamily::from_name("Roboto"), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name("Open Sans"), FontFamily::Helvetica);
    }
}
