//! # Cover Page
//!
//! The cover is drawn before the section loop on its own portrait page. It
//! is an ordered list of blocks (identity boxes, title, customer, object,
//! outcome banner, signatures). Blocks stack downward from the top of the
//! content frame, except signatures, which sit on the bottom edge.

use crate::canvas::Canvas;
use crate::layout::{Cursor, Flow, PageFrame};
use crate::sections::draw_result_banner;
use crate::sections::signatures::{anchored_top, draw_signatures};
use crate::sections::RenderContext;
use crate::style::{Color, RectStyle};
use crate::template::ordering::cover_blocks;
use crate::template::CoverBlock;
use crate::variables::{format_date, interpolate, or_dash};

const BLOCK_SPACING: f64 = 16.0;
const LOGO_MAX_WIDTH: f64 = 120.0;
const LOGO_MAX_HEIGHT: f64 = 50.0;
const TITLE_PADDING: f64 = 10.0;

/// Draw the cover blocks on the page at `cursor`.
///
/// `with_signatures` is false when signatures go to the last page instead.
pub fn render_cover(ctx: &RenderContext, flow: &mut Flow, cursor: Cursor, with_signatures: bool) -> Cursor {
    let frame = flow.frame(cursor.orientation);
    let mut y = frame.top;
    let blocks = cover_blocks(ctx.template);
    log::debug!(
        "Cover blocks: {}",
        blocks.iter().map(|b| b.key()).collect::<Vec<_>>().join(", ")
    );

    let canvas = flow.canvas_at(cursor);
    for block in blocks {
        let height = match block {
            CoverBlock::Identity => draw_identity(canvas, &frame, y, ctx),
            CoverBlock::Title => draw_title(canvas, &frame, y, ctx),
            CoverBlock::Customer => draw_customer(canvas, &frame, y, ctx),
            CoverBlock::Object => draw_object(canvas, &frame, y, ctx),
            CoverBlock::Result => draw_result_banner(
                canvas,
                frame.left,
                y,
                frame.width,
                ctx.record.result,
                &ctx.theme,
            ),
            CoverBlock::Signatures => {
                if with_signatures {
                    draw_signatures(canvas, &frame, ctx);
                }
                0.0
            }
        };
        if height > 0.0 {
            y += height + BLOCK_SPACING;
        }
    }

    if y > anchored_top(&frame) && with_signatures {
        log::warn!("Cover blocks run into the signatures area");
    }
    Cursor { y, ..cursor }
}

/// Label/value lines under a small caption, returns the height used.
fn draw_box(canvas: &mut dyn Canvas, x: f64, y: f64, width: f64, caption: &str, lines: &[String], ctx: &RenderContext) -> f64 {
    let caption_style = ctx.theme.small().bold().colored(ctx.theme.secondary);
    let body = ctx.theme.body();
    canvas.draw_text(caption, x, y, &caption_style);
    let mut line_y = y + caption_style.line_height() + 2.0;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let text = ctx.text.truncate(line, &body, width);
        canvas.draw_text(&text, x, line_y, &body);
        line_y += body.line_height();
    }
    line_y - y
}

fn draw_identity(canvas: &mut dyn Canvas, frame: &PageFrame, y: f64, ctx: &RenderContext) -> f64 {
    let r = ctx.record;
    let half = (frame.width - BLOCK_SPACING) / 2.0;
    let mut left_height: f64 = 0.0;
    let mut right_height: f64 = 0.0;

    if ctx.template.cover_show_company {
        if let Some(company) = &r.company {
            let mut top = y;
            if let Some(logo) = company
                .logo
                .as_ref()
                .and_then(|l| ctx.load_image(l, "company logo"))
            {
                let (w, h) = logo.fit_within(LOGO_MAX_WIDTH, LOGO_MAX_HEIGHT);
                canvas.draw_image(&logo, frame.left, top, w, h);
                top += h + 6.0;
            }
            let mut lines = vec![or_dash(&company.name), company.address.clone()];
            if !company.ico.trim().is_empty() {
                lines.push(format!("IČO: {}", company.ico.trim()));
            }
            if !company.dic.trim().is_empty() {
                lines.push(format!("DIČ: {}", company.dic.trim()));
            }
            lines.push(company.phone.clone());
            lines.push(company.email.clone());
            left_height = (top - y) + draw_box(canvas, frame.left, top, half, "Revizní firma", &lines, ctx);
        }
    }

    if ctx.template.cover_show_technician {
        if let Some(technician) = &r.technician {
            let lines = vec![
                or_dash(&technician.name),
                format!("Ev. č. osvědčení: {}", or_dash(&technician.license_number)),
                technician.phone.clone(),
                technician.email.clone(),
            ];
            right_height = draw_box(
                canvas,
                frame.left + half + BLOCK_SPACING,
                y,
                half,
                "Revizní technik",
                &lines,
                ctx,
            );
        }
    }

    left_height.max(right_height)
}

fn draw_title(canvas: &mut dyn Canvas, frame: &PageFrame, y: f64, ctx: &RenderContext) -> f64 {
    let title = interpolate(&ctx.template.cover_title, &ctx.vars());
    let size = if ctx.template.cover_title_size.is_finite() && ctx.template.cover_title_size >= 8.0 {
        ctx.template.cover_title_size
    } else {
        20.0
    };
    let style = ctx.theme.label().sized(size).colored(ctx.theme.primary);
    let wrapped = ctx.text.wrap(&title, &style, frame.width - 2.0 * TITLE_PADDING);

    let mut line_y = y + TITLE_PADDING;
    for line in &wrapped.lines {
        let width = canvas.measure_text(line, &style).width;
        canvas.draw_text(line, frame.left + (frame.width - width) / 2.0, line_y, &style);
        line_y += style.line_height();
    }

    let subtitle_style = ctx.theme.body();
    let subtitle = format!(
        "č. {} ze dne {}",
        or_dash(&ctx.record.number),
        format_date(ctx.record.drafted_on.or(ctx.record.performed_on))
    );
    let width = canvas.measure_text(&subtitle, &subtitle_style).width;
    canvas.draw_text(&subtitle, frame.left + (frame.width - width) / 2.0, line_y + 2.0, &subtitle_style);
    line_y += subtitle_style.line_height() + 2.0;

    let height = line_y + TITLE_PADDING - y;
    if ctx.template.cover_title_border {
        canvas.draw_rect(frame.left, y, frame.width, height, &RectStyle::stroked(ctx.theme.primary, 1.5));
    }
    height
}

fn draw_customer(canvas: &mut dyn Canvas, frame: &PageFrame, y: f64, ctx: &RenderContext) -> f64 {
    let r = ctx.record;
    let lines = match &r.customer {
        Some(c) => {
            let mut lines = vec![or_dash(&c.name), c.address.clone()];
            if !c.ico.trim().is_empty() {
                lines.push(format!("IČO: {}", c.ico.trim()));
            }
            if !c.contact_person.trim().is_empty() {
                lines.push(format!("Kontaktní osoba: {}", c.contact_person.trim()));
            }
            lines
        }
        None if !r.client.trim().is_empty() => vec![r.client.trim().to_string()],
        None => return 0.0,
    };
    draw_box(canvas, frame.left, y, frame.width, "Objednatel / provozovatel", &lines, ctx)
}

fn draw_object(canvas: &mut dyn Canvas, frame: &PageFrame, y: f64, ctx: &RenderContext) -> f64 {
    let r = ctx.record;
    let lines = vec![
        r.title.clone(),
        r.object_description.clone(),
        r.site_address.clone(),
        format!("{} revize, {}", r.kind.label(), r.category.label().to_lowercase()),
    ];
    let height = draw_box(canvas, frame.left, y, frame.width, "Revidovaný objekt", &lines, ctx);
    let rule = y + height + 4.0;
    canvas.draw_rect(frame.left, rule, frame.width, 0.0, &RectStyle::stroked(Color::GRAY.lighten(0.5), 0.5));
    height + 4.0
}
