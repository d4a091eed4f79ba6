//! Signatures block: technician and customer boxes with signature lines.
//!
//! Fixed height, always anchored to the bottom of the content frame of the
//! page it lands on (the cover or the last body page).

use super::RenderContext;
use crate::canvas::Canvas;
use crate::layout::PageFrame;
use crate::style::{Color, RectStyle};
use crate::variables::{format_date, or_dash};

pub const SIGNATURES_HEIGHT: f64 = 84.0;
const BOX_GAP: f64 = 24.0;
const SIGNATURE_LINE_WIDTH: f64 = 160.0;

/// Top edge of a bottom-anchored signatures block.
pub fn anchored_top(frame: &PageFrame) -> f64 {
    frame.bottom - SIGNATURES_HEIGHT
}

pub fn draw_signatures(canvas: &mut dyn Canvas, frame: &PageFrame, ctx: &RenderContext) {
    let top = anchored_top(frame);
    let r = ctx.record;
    let box_width = (frame.width - BOX_GAP) / 2.0;

    let technician_name = r
        .technician
        .as_ref()
        .map(|t| or_dash(&t.name))
        .unwrap_or_else(|| "-".to_string());
    let license = r
        .technician
        .as_ref()
        .map(|t| or_dash(&t.license_number))
        .unwrap_or_else(|| "-".to_string());
    let date = format_date(r.drafted_on.or(Some(ctx.today)));

    let customer_name = match &r.customer {
        Some(c) if !c.contact_person.trim().is_empty() => c.contact_person.trim().to_string(),
        Some(c) => or_dash(&c.name),
        None => or_dash(&r.client),
    };

    draw_box(
        canvas,
        ctx,
        frame.left,
        top,
        box_width,
        "Revizní technik",
        &[
            technician_name,
            format!("Ev. č. osvědčení: {}", license),
            format!("Datum: {}", date),
        ],
    );
    draw_box(
        canvas,
        ctx,
        frame.left + box_width + BOX_GAP,
        top,
        box_width,
        "Za objednatele / provozovatele",
        &[customer_name, String::new(), "Převzal dne:".to_string()],
    );
}

fn draw_box(
    canvas: &mut dyn Canvas,
    ctx: &RenderContext,
    x: f64,
    top: f64,
    width: f64,
    title: &str,
    lines: &[String],
) {
    let label = ctx.theme.small().bold().colored(ctx.theme.secondary);
    let body = ctx.theme.small();

    canvas.draw_text(title, x, top, &label);
    let mut y = top + label.line_height() + 2.0;
    for line in lines {
        if !line.is_empty() {
            canvas.draw_text(line, x, y, &body);
        }
        y += body.line_height();
    }

    let line_y = top + SIGNATURES_HEIGHT - body.line_height() - 2.0;
    let line_width = SIGNATURE_LINE_WIDTH.min(width);
    canvas.draw_rect(x, line_y, line_width, 0.0, &RectStyle::stroked(Color::BLACK, 0.5));
    canvas.draw_text("podpis", x, line_y + 2.0, &body.clone().colored(Color::GRAY));
}
