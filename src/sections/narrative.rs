//! Free-text sections. Text is wrapped first and the break decision is made
//! on the wrapped lines, so a paragraph only moves or splits when it really
//! doesn't fit.

use super::{
    draw_heading, draw_paragraph, draw_subheading, heading_height, paragraph_lead,
    subheading_height, RenderContext, SectionRenderer, BLOCK_GAP,
};
use crate::error::ReportError;
use crate::layout::{Cursor, Flow};
use crate::model::InspectionRecord;
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;

/// A labelled paragraph inside a narrative section.
struct Passage<'r> {
    label: Option<&'static str>,
    text: &'r str,
}

impl<'r> Passage<'r> {
    fn plain(text: &'r str) -> Self {
        Passage { label: None, text }
    }
}

fn scope_passages(r: &InspectionRecord) -> Vec<Passage<'_>> {
    vec![
        Passage {
            label: Some("Předmět revize"),
            text: &r.scope,
        },
        Passage {
            label: Some("Předmětem revize není"),
            text: &r.scope_excluded,
        },
    ]
}

fn prior_passages(r: &InspectionRecord) -> Vec<Passage<'_>> {
    vec![Passage::plain(&r.prior_findings)]
}

fn action_passages(r: &InspectionRecord) -> Vec<Passage<'_>> {
    vec![Passage::plain(&r.performed_actions)]
}

type Passages = for<'r> fn(&'r InspectionRecord) -> Vec<Passage<'r>>;

pub struct NarrativeSection {
    id: SectionId,
    passages: Passages,
}

impl NarrativeSection {
    pub fn scope() -> Self {
        Self {
            id: SectionId::Scope,
            passages: scope_passages,
        }
    }

    pub fn prior_inspections() -> Self {
        Self {
            id: SectionId::PriorInspections,
            passages: prior_passages,
        }
    }

    pub fn performed_actions() -> Self {
        Self {
            id: SectionId::PerformedActions,
            passages: action_passages,
        }
    }

    fn non_empty<'r>(&self, record: &'r InspectionRecord) -> Vec<Passage<'r>> {
        (self.passages)(record)
            .into_iter()
            .filter(|p| !p.text.trim().is_empty())
            .collect()
    }
}

impl SectionRenderer for NarrativeSection {
    fn id(&self) -> SectionId {
        self.id
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !self.non_empty(ctx.record).is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        let passages = self.non_empty(ctx.record);
        let Some(first) = passages.first() else {
            return 0.0;
        };
        let label = if first.label.is_some() {
            subheading_height(&ctx.theme)
        } else {
            0.0
        };
        heading_height(&ctx.theme) + label + paragraph_lead(first.text, &ctx.theme.body(), &ctx.text, width)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let style = ctx.theme.body();
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        let frame = flow.frame(cursor.orientation);

        for (i, passage) in self.non_empty(ctx.record).iter().enumerate() {
            if i > 0 {
                cursor = cursor.advance(BLOCK_GAP);
            }
            if let Some(label) = passage.label {
                // Keep the label with the first lines of its paragraph.
                let lead = paragraph_lead(passage.text, &style, &ctx.text, frame.width);
                cursor = flow.ensure(cursor, subheading_height(&ctx.theme) + lead);
                cursor = draw_subheading(flow, cursor, label, &ctx.theme);
            }
            cursor = draw_paragraph(flow, cursor, passage.text, &style, &ctx.text);
        }
        Ok(cursor)
    }
}
