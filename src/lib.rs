//! # Revize Report
//!
//! A report engine for electrical inspections ("revize").
//!
//! A report is a cover page, a portrait body of sections and landscape
//! appendices with defect photos. Which sections appear, in which order and
//! with which table columns is decided by a user-editable template. The
//! engine never slices a long canvas into pages afterwards: every section
//! knows how much room it needs, and the flow controller breaks the page
//! before content would cross the bottom margin.
//!
//! ## Architecture
//!
//! ```text
//! InspectionRecord + TemplateDescriptor
//!       ↓
//!   [template]    merge with canonical defaults, filter, order
//!       ↓
//!   [report]      cover, body sections, signatures, appendices
//!       ↓         (through [layout]: cursor, page breaks, tables)
//!   [overlay]     header/footer, page X of Y
//!       ↓
//!   PageSequence (recorded draw commands per page)
//!       ↓
//!   [pdf]         serialize to PDF bytes
//! ```

pub mod canvas;
pub mod cover;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod pdf;
pub mod report;
pub mod sections;
pub mod style;
pub mod template;
pub mod text;
pub mod variables;

use serde::{Deserialize, Serialize};

pub use canvas::{Canvas, PageSequence};
pub use error::ReportError;
pub use model::InspectionRecord;
pub use report::{generate, generate_into, GenerateOptions};
pub use template::TemplateDescriptor;

use pdf::{PdfMetadata, PdfWriter};

/// JSON input of the CLI and [`render_json`]: the inspection and its template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportBundle {
    pub revize: InspectionRecord,
    #[serde(default)]
    pub sablona: TemplateDescriptor,
}

/// Generate the report and serialize it to PDF bytes.
pub fn render_pdf(
    record: &InspectionRecord,
    template: &TemplateDescriptor,
    options: &GenerateOptions,
) -> Result<Vec<u8>, ReportError> {
    let pages = generate(record, template, options)?;
    let title = match (record.number.trim(), record.title.trim()) {
        ("", "") => None,
        ("", title) => Some(title.to_string()),
        (number, "") => Some(format!("Revize {}", number)),
        (number, title) => Some(format!("Revize {} - {}", number, title)),
    };
    let metadata = PdfMetadata {
        title,
        author: record
            .technician
            .as_ref()
            .map(|t| t.name.trim().to_string())
            .filter(|n| !n.is_empty()),
        subject: Some(template.cover_title.clone()).filter(|s| !s.contains("{{")),
    };
    PdfWriter::new().write(&pages, &metadata)
}

/// Render a [`ReportBundle`] given as JSON to PDF bytes.
pub fn render_json(json: &str, options: &GenerateOptions) -> Result<Vec<u8>, ReportError> {
    let bundle: ReportBundle = serde_json::from_str(json)?;
    render_pdf(&bundle.revize, &bundle.sablona, options)
}
