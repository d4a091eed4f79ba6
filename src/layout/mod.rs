//! # Pagination
//!
//! The flow controller that sections draw through. It owns the canvas and the
//! page geometry and decides when a new page is needed; the vertical position
//! itself is a [`Cursor`] value that every renderer receives and returns, so
//! no renderer depends on hidden position state.
//!
//! Page geometry: the margins frame the page, and inside them a header band
//! and a footer band are reserved for the overlay pass. Body content lives
//! between `frame.top` and `frame.bottom`.
//!
//! Break rules:
//! - `ensure(cursor, needed)` keeps the cursor when `needed` fits exactly.
//! - Content taller than a whole page is placed at the top of a fresh page
//!   and allowed to overflow, so pagination always terminates.
//! - Wrapped text breaks between lines with orphan/widow control
//!   (see [`page_break`]).

pub mod page_break;
pub mod table;

use crate::canvas::Canvas;
use crate::model::{Orientation, PageConfig};
use crate::style::TextStyle;

use page_break::{lines_that_fit, split_lines, LineRules, LineSplit};

/// Height reserved below the top margin for the running header.
pub const HEADER_BAND: f64 = 24.0;
/// Height reserved above the bottom margin for the footer.
pub const FOOTER_BAND: f64 = 24.0;

const LINE_RULES: LineRules = LineRules {
    min_orphan: 2,
    min_widow: 2,
};

/// Current drawing position: page, orientation and vertical offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub orientation: Orientation,
    pub y: f64,
}

impl Cursor {
    pub fn advance(self, dy: f64) -> Self {
        Cursor {
            y: self.y + dy,
            ..self
        }
    }
}

/// Usable area of a page in a given orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub page_width: f64,
    pub page_height: f64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub bottom: f64,
}

impl PageFrame {
    pub fn new(config: &PageConfig, orientation: Orientation) -> Self {
        let (page_width, page_height) = config.size.oriented(orientation);
        Self {
            page_width,
            page_height,
            left: config.margin.left,
            top: config.margin.top + HEADER_BAND,
            width: page_width - config.margin.horizontal(),
            bottom: page_height - config.margin.bottom - FOOTER_BAND,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Controller states, logged at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    RenderingSection,
    PageBreakPending,
    OrientationSwitchPending,
    Done,
}

pub struct Flow<'c> {
    canvas: &'c mut dyn Canvas,
    config: PageConfig,
    state: FlowState,
}

impl<'c> Flow<'c> {
    pub fn new(canvas: &'c mut dyn Canvas, config: PageConfig) -> Self {
        Self {
            canvas,
            config,
            state: FlowState::RenderingSection,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    fn transition(&mut self, next: FlowState) {
        if self.state != next {
            log::trace!("flow: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub fn frame(&self, orientation: Orientation) -> PageFrame {
        PageFrame::new(&self.config, orientation)
    }

    /// The canvas, positioned on the cursor's page.
    pub fn canvas_at(&mut self, cursor: Cursor) -> &mut dyn Canvas {
        if self.canvas.current_page() != cursor.page {
            self.canvas.set_page(cursor.page);
        }
        &mut *self.canvas
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas {
        &mut *self.canvas
    }

    /// Open a page in the given orientation and return a cursor at its content top.
    pub fn new_page(&mut self, orientation: Orientation) -> Cursor {
        let page = self.canvas.new_page(orientation);
        self.transition(FlowState::RenderingSection);
        log::debug!("Page {} ({:?})", page + 1, orientation);
        Cursor {
            page,
            orientation,
            y: self.frame(orientation).top,
        }
    }

    /// Break to a new page in the cursor's orientation.
    pub fn page_break(&mut self, cursor: Cursor) -> Cursor {
        self.transition(FlowState::PageBreakPending);
        self.new_page(cursor.orientation)
    }

    /// Start a fresh page in `orientation`, even if the current one is empty.
    pub fn switch_orientation(&mut self, orientation: Orientation) -> Cursor {
        self.transition(FlowState::OrientationSwitchPending);
        self.new_page(orientation)
    }

    pub fn finish(&mut self) {
        self.transition(FlowState::Done);
    }

    pub fn remaining(&self, cursor: Cursor) -> f64 {
        (self.frame(cursor.orientation).bottom - cursor.y).max(0.0)
    }

    pub fn at_page_top(&self, cursor: Cursor) -> bool {
        cursor.y <= self.frame(cursor.orientation).top + 0.01
    }

    /// Guarantee `needed` points below the cursor, breaking the page if not.
    pub fn ensure(&mut self, cursor: Cursor, needed: f64) -> Cursor {
        if needed <= self.remaining(cursor) {
            return cursor;
        }
        if self.at_page_top(cursor) {
            log::warn!(
                "Block of {:.1}pt exceeds the usable page height ({:.1}pt), allowing overflow",
                needed,
                self.frame(cursor.orientation).height()
            );
            return cursor;
        }
        self.page_break(cursor)
    }

    /// Draw pre-wrapped lines at `x`, breaking between lines where needed.
    pub fn draw_lines(&mut self, mut cursor: Cursor, lines: &[String], x: f64, style: &TextStyle) -> Cursor {
        let line_height = style.line_height();
        let mut rest = lines;

        while !rest.is_empty() {
            let fitting = lines_that_fit(self.remaining(cursor), line_height);
            let take = match split_lines(fitting, rest.len(), LINE_RULES) {
                LineSplit::All => rest.len(),
                LineSplit::Take(n) => n,
                // A page that can't hold the minimum still gets what fits.
                LineSplit::NextPage if self.at_page_top(cursor) => fitting.clamp(1, rest.len()),
                LineSplit::NextPage => {
                    cursor = self.page_break(cursor);
                    continue;
                }
            };

            let canvas = self.canvas_at(cursor);
            for line in &rest[..take] {
                canvas.draw_text(line, x, cursor.y, style);
                cursor = cursor.advance(line_height);
            }
            rest = &rest[take..];
            if !rest.is_empty() {
                cursor = self.page_break(cursor);
            }
        }
        cursor
    }
}
