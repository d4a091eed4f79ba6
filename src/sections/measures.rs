//! Protective-measures checklist (ČSN 33 2000-4-41).
//!
//! Every canonical measure is listed with a tick box, checked when the
//! inspection selected it. Selected measures outside the canonical list are
//! appended, checked.

use super::{draw_heading, heading_height, RenderContext, SectionRenderer};
use crate::error::ReportError;
use crate::layout::{Cursor, Flow};
use crate::style::{Color, RectStyle};
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;

const CANONICAL_MEASURES: [&str; 8] = [
    "Automatické odpojení od zdroje",
    "Dvojitá nebo zesílená izolace",
    "Elektrické oddělení",
    "Malé napětí SELV nebo PELV",
    "Doplňková ochrana proudovým chráničem",
    "Doplňkové ochranné pospojování",
    "Ochrana zábranou",
    "Ochrana polohou",
];

const BOX_SIZE: f64 = 8.0;

pub struct ProtectiveMeasuresSection;

impl ProtectiveMeasuresSection {
    fn items(&self, selected: &[String]) -> Vec<(String, bool)> {
        let normalized: Vec<String> = selected.iter().map(|s| s.trim().to_lowercase()).collect();
        let mut items: Vec<(String, bool)> = CANONICAL_MEASURES
            .iter()
            .map(|m| (m.to_string(), normalized.contains(&m.to_lowercase())))
            .collect();
        for extra in selected {
            let trimmed = extra.trim();
            if !trimmed.is_empty()
                && !CANONICAL_MEASURES
                    .iter()
                    .any(|m| m.to_lowercase() == trimmed.to_lowercase())
            {
                items.push((trimmed.to_string(), true));
            }
        }
        items
    }
}

impl SectionRenderer for ProtectiveMeasuresSection {
    fn id(&self) -> SectionId {
        SectionId::ProtectiveMeasures
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        ctx.record
            .protective_measures
            .iter()
            .any(|m| !m.trim().is_empty())
    }

    fn estimate(&self, ctx: &RenderContext, _width: f64) -> f64 {
        heading_height(&ctx.theme) + 2.0 * ctx.theme.body().line_height()
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let frame = flow.frame(cursor.orientation);
        let style = ctx.theme.body();
        let line_height = style.line_height();
        let box_offset = (line_height - BOX_SIZE) / 2.0;

        for (label, checked) in self.items(&ctx.record.protective_measures) {
            cursor = flow.ensure(cursor, line_height);
            let canvas = flow.canvas_at(cursor);
            let box_style = if checked {
                RectStyle::filled(ctx.theme.primary).with_stroke(Color::BLACK, 0.5)
            } else {
                RectStyle::stroked(Color::BLACK, 0.5)
            };
            canvas.draw_rect(frame.left, cursor.y + box_offset, BOX_SIZE, BOX_SIZE, &box_style);
            let label_style = if checked { style.clone().bold() } else { style.clone() };
            canvas.draw_text(&label, frame.left + BOX_SIZE + 6.0, cursor.y, &label_style);
            cursor = cursor.advance(line_height);
        }
        Ok(cursor)
    }
}
