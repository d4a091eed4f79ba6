//! # Header and Footer Overlay
//!
//! Runs once after every page exists. It paints the running header and the
//! footer into the bands the flow controller left free. The total is only
//! known at this point, so footer text gets its page numbers before it is
//! measured and aligned. Markers left in body text (a cover title using
//! `{{totalPages}}`) are resolved afterwards in place.

use crate::canvas::Canvas;
use crate::layout::{FOOTER_BAND, HEADER_BAND};
use crate::model::PageConfig;
use crate::sections::RenderContext;
use crate::style::{Color, RectStyle, TextStyle};
use crate::variables::{format_date, interpolate, or_dash, substitute_page_markers};

/// Footer page number with deferred markers.
pub const PAGE_NUMBER_TEMPLATE: &str = "Strana {{currentPage}} z {{totalPages}}";

/// Paint headers and footers on all pages, then resolve page markers.
pub fn apply_overlay(canvas: &mut dyn Canvas, ctx: &RenderContext, config: &PageConfig) {
    let total = canvas.page_count();
    let style = ctx.theme.small().colored(ctx.theme.secondary);
    let rule = RectStyle::stroked(Color::GRAY.lighten(0.4), 0.5);
    let footer_text = interpolate(&ctx.template.footer_custom_text, &ctx.vars());

    for index in 0..total {
        canvas.set_page(index);
        let (width, height) = canvas.page_dimensions(index);
        let left = config.margin.left;
        let right = width - config.margin.right;

        if ctx.template.show_header {
            let y = config.margin.top + 4.0;
            let number = or_dash(&ctx.record.number);
            let date = format_date(ctx.record.performed_on);
            let side = (right - left) / 4.0;
            let title = ctx.text.truncate(ctx.record.title.trim(), &style, (right - left) - 2.0 * side);

            canvas.draw_text(&number, left, y, &style);
            draw_centered(canvas, &title, left, right, y, &style);
            draw_right(canvas, &date, right, y, &style);
            canvas.draw_rect(left, config.margin.top + HEADER_BAND - 4.0, right - left, 0.0, &rule);
        }

        let rule_y = height - config.margin.bottom - FOOTER_BAND + 4.0;
        let text_y = rule_y + 6.0;
        let mut painted = false;
        if ctx.template.footer_print_date {
            canvas.draw_text(&format!("Vytištěno: {}", format_date(Some(ctx.today))), left, text_y, &style);
            painted = true;
        }
        if ctx.template.footer_page_number {
            let number = substitute_page_markers(PAGE_NUMBER_TEMPLATE, index + 1, total);
            draw_centered(canvas, &number, left, right, text_y, &style);
            painted = true;
        }
        if !footer_text.trim().is_empty() {
            let custom = substitute_page_markers(footer_text.trim(), index + 1, total);
            let text = ctx.text.truncate(&custom, &style, (right - left) / 3.0);
            draw_right(canvas, &text, right, text_y, &style);
            painted = true;
        }
        if painted {
            canvas.draw_rect(left, rule_y, right - left, 0.0, &rule);
        }
    }

    for index in 0..total {
        canvas.rewrite_text(index, &|text| substitute_page_markers(text, index + 1, total));
    }
    log::debug!("Overlay applied to {} pages", total);
}

fn draw_centered(canvas: &mut dyn Canvas, text: &str, left: f64, right: f64, y: f64, style: &TextStyle) {
    let width = canvas.measure_text(text, style).width;
    canvas.draw_text(text, left + ((right - left) - width) / 2.0, y, style);
}

fn draw_right(canvas: &mut dyn Canvas, text: &str, right: f64, y: f64, style: &TextStyle) {
    let width = canvas.measure_text(text, style).width;
    canvas.draw_text(text, right - width, y, style);
}
