//! # Canvas
//!
//! The drawing surface the report engine paints on: page-addressable
//! primitives in absolute coordinates, page creation with orientation and
//! text measurement. Nothing here reflows; every command lands exactly where
//! the caller put it.
//!
//! `PageSequence` is the recording implementation. It keeps every page with
//! its orientation and the ordered draw commands, which is both the output of
//! a generation run and the input of the PDF writer.
//!
//! Coordinates are points, origin top-left, y down. Text is positioned by the
//! top of its line box; the line box is `style.line_height()` tall.

use std::sync::Arc;

use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::model::{Orientation, PageSize};
use crate::style::{RectStyle, TextStyle};

/// Result of measuring a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait Canvas {
    /// Append a page and make it current. Returns its index.
    fn new_page(&mut self, orientation: Orientation) -> usize;

    /// Make an existing page current so later draw calls land on it.
    fn set_page(&mut self, index: usize);

    fn page_count(&self) -> usize;

    fn current_page(&self) -> usize;

    fn page_orientation(&self, index: usize) -> Orientation;

    /// (width, height) of the given page in points.
    fn page_dimensions(&self, index: usize) -> (f64, f64);

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &RectStyle);

    fn draw_image(&mut self, image: &Arc<LoadedImage>, x: f64, y: f64, width: f64, height: f64);

    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Rewrite every text run already drawn on `page`.
    fn rewrite_text(&mut self, page: usize, rewrite: &dyn Fn(&str) -> String);
}

/// One recorded drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
        /// Measured width at the time of drawing.
        width: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: RectStyle,
    },
    Image {
        image: Arc<LoadedImage>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl DrawCommand {
    /// Bounding box (x, y, width, height) covered by this command.
    pub fn bounds(&self) -> Rect {
        match self {
            DrawCommand::Text {
                x, y, style, width, ..
            } => Rect::new(*x, *y, *width, style.line_height()),
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                ..
            }
            | DrawCommand::Image {
                x,
                y,
                width,
                height,
                ..
            } => Rect::new(*x, *y, *width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// A finished (or in-progress) page.
#[derive(Debug, Clone)]
pub struct Page {
    pub orientation: Orientation,
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl Page {
    /// All text on the page, one run per line, in drawing order.
    pub fn text(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }

    /// Union of the extents of every command drawn on the page.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.commands
            .iter()
            .map(DrawCommand::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Recording canvas: the page sequence produced by a generation run.
#[derive(Debug, Clone)]
pub struct PageSequence {
    size: PageSize,
    pages: Vec<Page>,
    current: usize,
    fonts: FontContext,
}

impl PageSequence {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: Vec::new(),
            current: 0,
            fonts: FontContext::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Text content of a page, or empty when the index is out of range.
    pub fn page_text(&self, index: usize) -> String {
        self.pages.get(index).map(Page::text).unwrap_or_default()
    }

    /// Text of every page, for whole-document comparisons.
    pub fn all_text(&self) -> Vec<String> {
        self.pages.iter().map(Page::text).collect()
    }

    /// Index of the first page containing `needle` in any text run.
    pub fn find_page(&self, needle: &str) -> Option<usize> {
        self.pages
            .iter()
            .position(|p| p.texts().any(|t| t.contains(needle)))
    }

    fn push(&mut self, command: DrawCommand) {
        if self.pages.is_empty() {
            log::warn!("Draw call before any page was created, opening a portrait page");
            self.new_page(Orientation::Portrait);
        }
        self.pages[self.current].commands.push(command);
    }
}

impl Canvas for PageSequence {
    fn new_page(&mut self, orientation: Orientation) -> usize {
        let (width, height) = self.size.oriented(orientation);
        self.pages.push(Page {
            orientation,
            width,
            height,
            commands: Vec::new(),
        });
        self.current = self.pages.len() - 1;
        self.current
    }

    fn set_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        } else {
            log::warn!(
                "set_page({}) out of range ({} pages), ignored",
                index,
                self.pages.len()
            );
        }
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn page_orientation(&self, index: usize) -> Orientation {
        self.pages
            .get(index)
            .map(|p| p.orientation)
            .unwrap_or_default()
    }

    fn page_dimensions(&self, index: usize) -> (f64, f64) {
        match self.pages.get(index) {
            Some(p) => (p.width, p.height),
            None => self.size.oriented(Orientation::Portrait),
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let width = self.measure_text(text, style).width;
        self.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
            width,
        });
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &RectStyle) {
        self.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            style: style.clone(),
        });
    }

    fn draw_image(&mut self, image: &Arc<LoadedImage>, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::Image {
            image: Arc::clone(image),
            x,
            y,
            width,
            height,
        });
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        TextMetrics {
            width: self
                .fonts
                .measure_string(text, style.font_family, style.bold, style.font_size),
            height: style.line_height(),
        }
    }

    fn rewrite_text(&mut self, page: usize, rewrite: &dyn Fn(&str) -> String) {
        let fonts = self.fonts;
        let Some(page) = self.pages.get_mut(page) else {
            return;
        };
        for command in &mut page.commands {
            if let DrawCommand::Text {
                text, style, width, ..
            } = command
            {
                let rewritten = rewrite(text);
                if rewritten != *text {
                    *width = fonts.measure_string(
                        &rewritten,
                        style.font_family,
                        style.bold,
                        style.font_size,
                    );
                    *text = rewritten;
                }
            }
        }
    }
}
