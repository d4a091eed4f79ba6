//! # Section Renderers
//!
//! One renderer per report section. A renderer reads the inspection through
//! the [`RenderContext`], draws through the [`Flow`] and returns the cursor
//! below whatever it drew. It knows how much space it needs up front
//! (`estimate`), which the report loop uses to break the page before the
//! section starts instead of leaving a lone heading at the bottom.
//!
//! Renderers are looked up in a [`SectionRegistry`]; a section id without a
//! renderer is a fatal template error.

mod conclusion;
mod defects;
mod identity;
mod instruments;
mod measures;
mod narrative;
mod panels;
mod rooms;
pub mod signatures;

pub use conclusion::{banner_height, draw_result_banner, result_color};
pub use defects::severity_color;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::ReportError;
use crate::image_loader::{ImageSource, LoadedImage};
use crate::layout::table::{Cell, Table, TableColumn};
use crate::layout::{Cursor, Flow};
use crate::model::InspectionRecord;
use crate::style::{RectStyle, TextStyle, Theme};
use crate::template::ordering::PlannedSection;
use crate::template::{SectionId, TemplateDescriptor};
use crate::text::TextLayout;
use crate::variables::VariableContext;

/// Vertical gap between sections.
pub const SECTION_GAP: f64 = 12.0;
/// Gap between a subheading block (panel, room) and the next one.
pub const BLOCK_GAP: f64 = 8.0;

/// Read-only inputs shared by all renderers during one run.
pub struct RenderContext<'a> {
    pub record: &'a InspectionRecord,
    pub template: &'a TemplateDescriptor,
    pub theme: Theme,
    pub today: NaiveDate,
    pub text: TextLayout,
}

impl<'a> RenderContext<'a> {
    pub fn new(record: &'a InspectionRecord, template: &'a TemplateDescriptor, today: NaiveDate) -> Self {
        Self {
            record,
            template,
            theme: template.theme(),
            today,
            text: TextLayout::new(),
        }
    }

    pub fn vars(&self) -> VariableContext<'a> {
        VariableContext {
            record: self.record,
            today: self.today,
        }
    }

    /// Decode an image, logging and returning `None` on failure.
    pub fn load_image(&self, source: &ImageSource, what: &str) -> Option<Arc<LoadedImage>> {
        match source.load() {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                log::warn!("Cannot decode {}: {}", what, e);
                None
            }
        }
    }
}

pub trait SectionRenderer {
    fn id(&self) -> SectionId;

    /// False when the section's data is empty; such a section draws nothing.
    fn has_content(&self, ctx: &RenderContext) -> bool;

    /// Space the section needs at its start (heading plus the first rows or
    /// lines) for content `width` points wide.
    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64;

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError>;
}

pub struct SectionRegistry {
    renderers: Vec<Box<dyn SectionRenderer>>,
}

impl SectionRegistry {
    pub fn empty() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// All built-in renderers.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(identity::IdentitySection));
        registry.register(Box::new(identity::ObjectSection));
        registry.register(Box::new(narrative::NarrativeSection::scope()));
        registry.register(Box::new(measures::ProtectiveMeasuresSection));
        registry.register(Box::new(narrative::NarrativeSection::prior_inspections()));
        registry.register(Box::new(narrative::NarrativeSection::performed_actions()));
        registry.register(Box::new(panels::PanelsSection));
        registry.register(Box::new(rooms::RoomsSection));
        registry.register(Box::new(instruments::InstrumentsSection));
        registry.register(Box::new(conclusion::ConclusionSection));
        registry.register(Box::new(defects::DefectsAppendix));
        registry
    }

    /// Register a renderer, replacing any existing one for the same section.
    pub fn register(&mut self, renderer: Box<dyn SectionRenderer>) {
        self.renderers.retain(|r| r.id() != renderer.id());
        self.renderers.push(renderer);
    }

    pub fn get(&self, id: SectionId) -> Result<&dyn SectionRenderer, ReportError> {
        self.renderers
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.as_ref())
            .ok_or_else(|| ReportError::UnknownSection(id.key().to_string()))
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Shared drawing helpers ─────────────────────────────────────

/// Height taken by a section heading including its rule and spacing.
pub fn heading_height(theme: &Theme) -> f64 {
    theme.heading().line_height() + 6.0
}

/// Section heading with a rule in the primary color below it.
pub fn draw_heading(flow: &mut Flow, cursor: Cursor, title: &str, theme: &Theme) -> Cursor {
    let frame = flow.frame(cursor.orientation);
    let style = theme.heading();
    let canvas = flow.canvas_at(cursor);
    canvas.draw_text(title, frame.left, cursor.y, &style);
    let rule_y = cursor.y + style.line_height() + 1.0;
    canvas.draw_rect(frame.left, rule_y, frame.width, 0.0, &RectStyle::stroked(theme.primary, 1.0));
    cursor.advance(heading_height(theme))
}

pub fn subheading_height(theme: &Theme) -> f64 {
    theme.subheading().line_height() + 3.0
}

pub fn draw_subheading(flow: &mut Flow, cursor: Cursor, title: &str, theme: &Theme) -> Cursor {
    let frame = flow.frame(cursor.orientation);
    flow.canvas_at(cursor)
        .draw_text(title, frame.left, cursor.y, &theme.subheading());
    cursor.advance(subheading_height(theme))
}

/// Wrap `text` to the frame width and draw it, breaking between lines.
pub fn draw_paragraph(flow: &mut Flow, cursor: Cursor, text: &str, style: &TextStyle, layout: &TextLayout) -> Cursor {
    let frame = flow.frame(cursor.orientation);
    let wrapped = layout.wrap(text, style, frame.width);
    flow.draw_lines(cursor, &wrapped.lines, frame.left, style)
}

/// Height of the first two lines of a paragraph (the least that is kept
/// together at the bottom of a page).
pub fn paragraph_lead(text: &str, style: &TextStyle, layout: &TextLayout, width: f64) -> f64 {
    let lines = layout.wrap(text, style, width).lines.len().min(2);
    lines as f64 * style.line_height()
}

/// Two-column label/value table without a header row.
pub fn key_value_table(rows: Vec<(&str, String)>, theme: &Theme, label_width: f64) -> Table {
    let mut table = Table::new(
        vec![
            TableColumn::new("", Some(label_width)),
            TableColumn::new("", None),
        ],
        theme.body(),
    )
    .without_header();
    for (label, value) in rows {
        table.push_row(vec![Cell::from(label).bold(), Cell::from(value)]);
    }
    table
}
