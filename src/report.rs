//! # Report Generation
//!
//! Drives one generation run: plan the sections, draw the cover, flow the
//! portrait body, place the signatures, append the landscape appendices and
//! finish with the header/footer overlay.
//!
//! A run is a pure function of the record, the template and the options. The
//! only clock read is `GenerateOptions::default()`; everything below it uses
//! the injected date.

use chrono::NaiveDate;

use crate::canvas::{Canvas, PageSequence};
use crate::cover::render_cover;
use crate::error::ReportError;
use crate::layout::{Cursor, Flow};
use crate::model::{InspectionRecord, Orientation, PageConfig};
use crate::overlay::apply_overlay;
use crate::sections::signatures::{anchored_top, draw_signatures, SIGNATURES_HEIGHT};
use crate::sections::{RenderContext, SectionRegistry, SECTION_GAP};
use crate::template::ordering::{cover_blocks, plan_sections};
use crate::template::{CoverBlock, SignaturePlacement, TemplateDescriptor};

/// Run-level settings that are not part of the template.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Date used for "today", the print date and defaulted signature dates.
    pub today: NaiveDate,
    pub page: PageConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
            page: PageConfig::default(),
        }
    }
}

impl GenerateOptions {
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            today,
            page: PageConfig::default(),
        }
    }
}

/// Where the signatures block ends up for a given template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSlot {
    Cover,
    LastPage,
    Hidden,
}

pub fn signature_slot(template: &TemplateDescriptor) -> SignatureSlot {
    if !cover_blocks(template).contains(&CoverBlock::Signatures) {
        return SignatureSlot::Hidden;
    }
    match template.signature_placement {
        SignaturePlacement::Cover if template.show_cover => SignatureSlot::Cover,
        SignaturePlacement::Cover => {
            log::debug!("Cover disabled, signatures move to the last page");
            SignatureSlot::LastPage
        }
        SignaturePlacement::LastPage => SignatureSlot::LastPage,
    }
}

/// Generate the report into a fresh [`PageSequence`].
pub fn generate(
    record: &InspectionRecord,
    template: &TemplateDescriptor,
    options: &GenerateOptions,
) -> Result<PageSequence, ReportError> {
    let mut pages = PageSequence::new(options.page.size);
    generate_into(&mut pages, record, template, options)?;
    Ok(pages)
}

/// Generate the report onto any [`Canvas`].
pub fn generate_into(
    canvas: &mut dyn Canvas,
    record: &InspectionRecord,
    template: &TemplateDescriptor,
    options: &GenerateOptions,
) -> Result<(), ReportError> {
    generate_with_registry(canvas, record, template, options, &SectionRegistry::standard())
}

/// As [`generate_into`], with a caller-supplied renderer registry.
pub fn generate_with_registry(
    canvas: &mut dyn Canvas,
    record: &InspectionRecord,
    template: &TemplateDescriptor,
    options: &GenerateOptions,
    registry: &SectionRegistry,
) -> Result<(), ReportError> {
    let plan = plan_sections(template)?;
    // Fail before drawing anything if a planned section has no renderer.
    for section in plan.iter() {
        registry.get(section.id)?;
    }

    let ctx = RenderContext::new(record, template, options.today);
    let slot = signature_slot(template);
    let mut flow = Flow::new(canvas, options.page.clone());

    if template.show_cover {
        let cover = flow.new_page(Orientation::Portrait);
        render_cover(&ctx, &mut flow, cover, slot == SignatureSlot::Cover);
    }

    // The first body page opens with the first section that draws anything.
    let mut body: Option<Cursor> = None;
    for section in &plan.body {
        let renderer = registry.get(section.id)?;
        if !renderer.has_content(&ctx) {
            log::debug!("Section '{}' has no content, skipped", section.id.key());
            continue;
        }
        let cursor = body.unwrap_or_else(|| flow.new_page(Orientation::Portrait));
        let width = flow.frame(cursor.orientation).width;
        let cursor = flow.ensure(cursor, renderer.estimate(&ctx, width));
        log::debug!("Section '{}' starts on page {}", section.id.key(), cursor.page + 1);
        let cursor = renderer.render(&ctx, &mut flow, cursor, section)?;
        body = Some(cursor.advance(SECTION_GAP));
    }

    if slot == SignatureSlot::LastPage {
        let cursor = body.unwrap_or_else(|| flow.new_page(Orientation::Portrait));
        place_signatures(&ctx, &mut flow, cursor);
    }

    for section in &plan.appendices {
        let renderer = registry.get(section.id)?;
        if !renderer.has_content(&ctx) {
            log::debug!("Appendix '{}' has no content, skipped", section.id.key());
            continue;
        }
        let start = flow.switch_orientation(Orientation::Landscape);
        log::debug!("Appendix '{}' starts on page {}", section.title, start.page + 1);
        renderer.render(&ctx, &mut flow, start, section)?;
    }

    flow.finish();
    drop(flow);

    apply_overlay(canvas, &ctx, &options.page);
    log::info!("Report generated: {} pages", canvas.page_count());
    Ok(())
}

/// Bottom-anchored signatures on the page of `cursor`, or on a new page
/// when the body already reaches into the signatures area.
fn place_signatures(ctx: &RenderContext, flow: &mut Flow, cursor: Cursor) {
    let cursor = flow.ensure(cursor, SIGNATURES_HEIGHT);
    let frame = flow.frame(cursor.orientation);
    if cursor.y > anchored_top(&frame) + 0.01 {
        log::warn!("Signatures overlap body content on page {}", cursor.page + 1);
    }
    log::debug!("Signatures on page {}", cursor.page + 1);
    draw_signatures(flow.canvas_at(cursor), &frame, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{SectionConfig, SectionId};

    fn only_sections(enabled: impl Fn(&SectionId) -> bool) -> Vec<SectionConfig> {
        SectionId::CANONICAL
            .iter()
            .map(|id| SectionConfig {
                id: id.key().to_string(),
                enabled: Some(enabled(id)),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_signature_slot() {
        let mut template = TemplateDescriptor::default();
        assert_eq!(signature_slot(&template), SignatureSlot::Cover);

        template.signature_placement = SignaturePlacement::LastPage;
        assert_eq!(signature_slot(&template), SignatureSlot::LastPage);

        template.signature_placement = SignaturePlacement::Cover;
        template.show_cover = false;
        assert_eq!(signature_slot(&template), SignatureSlot::LastPage);

        template.cover_show_signatures = false;
        assert_eq!(signature_slot(&template), SignatureSlot::Hidden);
    }

    #[test]
    fn test_cover_disabled_starts_with_body() {
        let template = TemplateDescriptor {
            show_cover: false,
            ..Default::default()
        };
        let record = InspectionRecord::default();
        let options = GenerateOptions::with_today(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let pages = generate(&record, &template, &options).unwrap();
        assert!(pages.page_text(0).contains("Identifikační údaje"));
        assert!(pages.find_page("ZPRÁVA O REVIZI").is_none());
    }

    #[test]
    fn test_no_blank_body_page_without_body_content() {
        use crate::model::{Defect, Severity};

        let template = TemplateDescriptor {
            sections: only_sections(SectionId::is_appendix),
            cover_show_signatures: false,
            ..Default::default()
        };
        let record = InspectionRecord {
            defects: vec![Defect {
                description: "Chybí kryt".to_string(),
                severity: Severity::C2,
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = GenerateOptions::with_today(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let pages = generate(&record, &template, &options).unwrap();
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_orientation(0), Orientation::Portrait);
        assert_eq!(pages.page_orientation(1), Orientation::Landscape);
        assert!(pages.page_text(1).contains("Chybí kryt"));
    }

    #[test]
    fn test_last_page_signatures_open_a_page_when_body_is_empty() {
        let template = TemplateDescriptor {
            show_cover: false,
            signature_placement: SignaturePlacement::LastPage,
            sections: only_sections(|_| false),
            ..Default::default()
        };
        let options = GenerateOptions::with_today(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let pages = generate(&InspectionRecord::default(), &template, &options).unwrap();
        assert_eq!(pages.page_count(), 1);
        assert!(pages.page_text(0).contains("podpis"));
    }

    #[test]
    fn test_missing_renderer_aborts_before_drawing() {
        let record = InspectionRecord::default();
        let options = GenerateOptions::with_today(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let mut pages = PageSequence::new(options.page.size);
        let err = generate_with_registry(
            &mut pages,
            &record,
            &TemplateDescriptor::default(),
            &options,
            &SectionRegistry::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::UnknownSection(_)));
        assert_eq!(pages.page_count(), 0);
    }
}
