//! Defect appendix: landscape pages, one block per defect.
//!
//! Each block has a metadata table on the left and a photo grid on the right,
//! three photos per row. The metadata and the first photo row are kept
//! together; further photo rows may continue on the following page.

use std::sync::Arc;

use super::{draw_heading, heading_height, RenderContext, SectionRenderer};
use crate::canvas::Canvas;
use crate::error::ReportError;
use crate::image_loader::LoadedImage;
use crate::layout::table::{Cell, Table, TableColumn};
use crate::layout::{Cursor, Flow, PageFrame};
use crate::model::{Defect, Photo, Severity};
use crate::style::{Color, RectStyle};
use crate::template::ordering::PlannedSection;
use crate::template::SectionId;
use crate::variables::{format_date, or_dash};

pub const PHOTOS_PER_ROW: usize = 3;
pub const PHOTO_CELL_HEIGHT: f64 = 110.0;
const METADATA_SHARE: f64 = 0.4;
const COLUMN_GAP: f64 = 12.0;
const PHOTO_GAP: f64 = 6.0;
const CAPTION_HEIGHT: f64 = 12.0;
const DEFECT_GAP: f64 = 14.0;

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::C1 => Color::RED,
        Severity::C2 => Color::ORANGE,
        Severity::C3 => Color::GREEN,
    }
}

/// Horizontal split of the content frame.
struct BlockGeometry {
    meta_x: f64,
    meta_width: f64,
    photos_x: f64,
    cell_width: f64,
}

impl BlockGeometry {
    fn new(frame: &PageFrame) -> Self {
        let meta_width = frame.width * METADATA_SHARE;
        let photos_x = frame.left + meta_width + COLUMN_GAP;
        let photos_width = frame.right() - photos_x;
        Self {
            meta_x: frame.left,
            meta_width,
            photos_x,
            cell_width: (photos_width - PHOTO_GAP * (PHOTOS_PER_ROW - 1) as f64)
                / PHOTOS_PER_ROW as f64,
        }
    }
}

pub struct DefectsAppendix;

impl DefectsAppendix {
    fn metadata(&self, index: usize, defect: &Defect, ctx: &RenderContext) -> Table {
        let mut table = Table::new(
            vec![
                TableColumn::new("", Some(90.0)),
                TableColumn::new("", None),
            ],
            ctx.theme.small(),
        )
        .without_header();

        let row = |label: &str, value: String| vec![Cell::from(label).bold(), Cell::from(value)];
        table.push_row(vec![
            Cell::from(format!("Závada č. {}", index + 1)).bold(),
            Cell::from(or_dash(&defect.description)).bold(),
        ]);
        table.push_row(vec![
            Cell::from("Závažnost").bold(),
            Cell::from(defect.severity.label()).filled(severity_color(defect.severity)),
        ]);
        table.push_row(row("Stav", defect.status.label().to_string()));
        if let Some(location) = ctx.record.defect_location(defect) {
            table.push_row(row("Umístění", location));
        }
        table.push_row(row("Zjištěno", format_date(defect.found_on)));
        table.push_row(row("Termín odstranění", format_date(defect.deadline)));
        if !defect.remedy.trim().is_empty() {
            table.push_row(row("Náprava", defect.remedy.trim().to_string()));
        }
        table
    }

    /// Height of the part that must stay together: metadata and first photo row.
    fn lead_height(&self, index: usize, defect: &Defect, ctx: &RenderContext, frame: &PageFrame) -> f64 {
        let geometry = BlockGeometry::new(frame);
        let meta = self.metadata(index, defect, ctx).measure(geometry.meta_width);
        let photos = if defect.photos.is_empty() {
            0.0
        } else {
            PHOTO_CELL_HEIGHT
        };
        meta.max(photos)
    }

    fn render_defect(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        index: usize,
        defect: &Defect,
    ) -> Cursor {
        let frame = flow.frame(cursor.orientation);
        let geometry = BlockGeometry::new(&frame);
        let start = flow.ensure(cursor, self.lead_height(index, defect, ctx, &frame));

        let meta_end = self.metadata(index, defect, ctx).draw(
            flow,
            start,
            geometry.meta_x,
            geometry.meta_width,
            &ctx.theme,
        );

        let mut photo_cursor = start;
        for (row, photos) in defect.photos.chunks(PHOTOS_PER_ROW).enumerate() {
            if row > 0 {
                photo_cursor = flow.ensure(photo_cursor, PHOTO_CELL_HEIGHT);
            }
            let canvas = flow.canvas_at(photo_cursor);
            for (col, photo) in photos.iter().enumerate() {
                let x = geometry.photos_x + col as f64 * (geometry.cell_width + PHOTO_GAP);
                let image = ctx.load_image(
                    &photo.image,
                    &format!("photo {} of defect {}", row * PHOTOS_PER_ROW + col + 1, index + 1),
                );
                draw_photo_cell(canvas, x, photo_cursor.y, geometry.cell_width, image, photo, ctx);
            }
            photo_cursor = photo_cursor.advance(PHOTO_CELL_HEIGHT);
        }

        let end = match photo_cursor.page.cmp(&meta_end.page) {
            std::cmp::Ordering::Greater => photo_cursor,
            std::cmp::Ordering::Less => meta_end,
            std::cmp::Ordering::Equal if photo_cursor.y > meta_end.y => photo_cursor,
            std::cmp::Ordering::Equal => meta_end,
        };
        end.advance(DEFECT_GAP)
    }
}

fn draw_photo_cell(
    canvas: &mut dyn Canvas,
    x: f64,
    y: f64,
    width: f64,
    image: Option<Arc<LoadedImage>>,
    photo: &Photo,
    ctx: &RenderContext,
) {
    let image_height = PHOTO_CELL_HEIGHT - CAPTION_HEIGHT - PHOTO_GAP;
    match image {
        Some(image) => {
            let (w, h) = image.fit_within(width, image_height);
            let ix = x + (width - w) / 2.0;
            let iy = y + (image_height - h) / 2.0;
            canvas.draw_image(&image, ix, iy, w, h);
        }
        None => {
            let placeholder = RectStyle::filled(Color::GRAY.lighten(0.85)).with_stroke(Color::GRAY, 0.75);
            canvas.draw_rect(x, y, width, image_height, &placeholder);
            let style = ctx.theme.small().colored(Color::GRAY);
            let label = "Fotografii nelze zobrazit";
            let label = ctx.text.truncate(label, &style, width - 8.0);
            let label_width = canvas.measure_text(&label, &style).width;
            canvas.draw_text(
                &label,
                x + (width - label_width) / 2.0,
                y + (image_height - style.line_height()) / 2.0,
                &style,
            );
        }
    }

    if let Some(caption) = photo.caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        let style = ctx.theme.small();
        let caption = ctx.text.truncate(caption, &style, width);
        canvas.draw_text(&caption, x, y + image_height + 2.0, &style);
    }
}

impl SectionRenderer for DefectsAppendix {
    fn id(&self) -> SectionId {
        SectionId::Defects
    }

    fn has_content(&self, ctx: &RenderContext) -> bool {
        !ctx.record.defects.is_empty()
    }

    fn estimate(&self, ctx: &RenderContext, width: f64) -> f64 {
        let Some(first) = ctx.record.defects.first() else {
            return heading_height(&ctx.theme);
        };
        let meta = self
            .metadata(0, first, ctx)
            .measure(width * METADATA_SHARE);
        let photos = if first.photos.is_empty() { 0.0 } else { PHOTO_CELL_HEIGHT };
        heading_height(&ctx.theme) + meta.max(photos)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        flow: &mut Flow,
        cursor: Cursor,
        section: &PlannedSection,
    ) -> Result<Cursor, ReportError> {
        let mut cursor = draw_heading(flow, cursor, &section.title, &ctx.theme);
        for (index, defect) in ctx.record.defects.iter().enumerate() {
            cursor = self.render_defect(ctx, flow, cursor, index, defect);
        }
        Ok(cursor)
    }
}
