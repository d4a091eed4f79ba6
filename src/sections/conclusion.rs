//! Conclusion: outcome banner, narrative, justification and next inspection.

use super::{
    draw_heading, draw_paragraph, draw_subheading, heading_height, paragraph_lead,
    subheading_height, RenderContext, SectionRenderer, BLOCK_GAP,
};
use crate::canvas::Canvas;
use crate::error::ReportError;
use crate::layout::{Cursor, Flow};
use crate::model::InspectionResult;
use crate::style::{Color, RectStyle, Theme};
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;
use crate::variables::format_date;

pub fn result_color(result: InspectionResult) -> Color {
    match result {
        InspectionResult::Compliant => Color::GREEN,
        InspectionResult::NonCompliant => Color::RED,
        InspectionResult::ConditionallyCompliant => Color::AMBER,
        InspectionResult::Unset => Color::GRAY,
    }
}

pub fn banner_height(theme: &Theme) -> f64 {
    theme.label().sized(theme.base_size + 2.0).line_height() + 12.0
}

/// Colored outcome banner, centered text. Returns its height.
pub fn draw_result_banner(
    canvas: &mut dyn Canvas,
    x: f64,
    y: f64,
    width: f64,
    result: InspectionResult,
    theme: &Theme,
) -> f64 {
    let fill = result_color(result);
    let height = banner_height(theme);
    let style = theme
        .label()
        .sized(theme.base_size + 2.0)
        .colored(fill.contrasting_text());
    canvas.draw_rect(x, y, width, height, &RectStyle::filled(fill));
    let text = result.label();
    let text_width = canvas.measure_text(text, &style).width;
    canvas.draw_text(text, x + ((width - text_width) / 2.0).max(4.0), y + 6.0, &style);
    height
}

pub struct ConclusionSection;

impl ConclusionSection {
    fn justification<'r>(&self, ctx: &RenderContext<'r>) -> Option<&'r str> {
        let r = ctx.record;
        let needs = matches!(
            r.result,
            InspectionResult::NonCompliant | InspectionResult::ConditionallyCompliant
        );
        let text = r.non_compliance_reason.trim();
        (needs && !text.is_empty()).then_some(text)
    }
}

impl SectionRenderer for ConclusionSection {
    fn id(&self) -> SectionId {
        SectionId::Conclusion
    }

    /// The outcome banner always has something to say.
    fn has_content(&self, _ctx: &RenderContext) -> bool {
        true
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        heading_height(&ctx.theme)
            + banner_height(&ctx.theme)
            + BLOCK_GAP
            + paragraph_lead(&ctx.record.conclusion, &ctx.theme.body(), &ctx.text, width)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let r = ctx.record;
        let body = ctx.theme.body();
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let frame = flow.frame(cursor.orientation);

        let height = draw_result_banner(
            flow.canvas_at(cursor),
            frame.left,
            cursor.y,
            frame.width,
            r.result,
            &ctx.theme,
        );
        cursor = cursor.advance(height + BLOCK_GAP);

        if !r.conclusion.trim().is_empty() {
            cursor = draw_paragraph(flow, cursor, &r.conclusion, &body, &ctx.text);
            cursor = cursor.advance(BLOCK_GAP);
        }

        if let Some(reason) = self.justification(ctx) {
            let lead = paragraph_lead(reason, &body, &ctx.text, frame.width);
            cursor = flow.ensure(cursor, subheading_height(&ctx.theme) + lead);
            cursor = draw_subheading(flow, cursor, "Zdůvodnění", &ctx.theme);
            cursor = draw_paragraph(flow, cursor, reason, &body, &ctx.text);
            cursor = cursor.advance(BLOCK_GAP);
        }

        let line_height = body.line_height();
        cursor = flow.ensure(cursor, line_height);
        flow.canvas_at(cursor).draw_text(
            &format!("Termín příští revize: {}", format_date(r.valid_until)),
            frame.left,
            cursor.y,
            &ctx.theme.label(),
        );
        Ok(cursor.advance(line_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_colors() {
        assert_eq!(result_color(InspectionResult::Compliant), Color::GREEN);
        assert_eq!(result_color(InspectionResult::NonCompliant), Color::RED);
        assert_eq!(result_color(InspectionResult::ConditionallyCompliant), Color::AMBER);
        assert_eq!(result_color(InspectionResult::Unset), Color::GRAY);
    }
}
