//! # Table Renderer
//!
//! Draws a header row in the theme's primary color and striped body rows
//! below the cursor, wrapping cell text to its column width. Rows are never
//! split: a row that doesn't fit goes to the next page and the header is
//! repeated there. Returns the cursor below the last row so callers can keep
//! drawing; tables drawn back to back share nothing else.

use crate::layout::{Cursor, Flow};
use crate::style::{Color, RectStyle, TextStyle, Theme};
use crate::text::TextLayout;

const CELL_PADDING_X: f64 = 3.0;
const CELL_PADDING_Y: f64 = 2.5;
const RULE_COLOR: Color = Color {
    r: 0.8,
    g: 0.82,
    b: 0.85,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub label: String,
    /// Fixed width in points; `None` shares the leftover width evenly.
    pub width: Option<f64>,
}

impl TableColumn {
    pub fn new(label: impl Into<String>, width: Option<f64>) -> Self {
        Self {
            label: label.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
    pub fill: Option<Color>,
}

impl Cell {
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Solid background; text switches to a contrasting color.
    pub fn filled(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell {
            text,
            bold: false,
            fill: None,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::from(text.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Cell>>,
    pub show_header: bool,
    /// Text style for body cells; header cells use its bold variant.
    pub style: TextStyle,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>, style: TextStyle) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            show_header: true,
            style,
        }
    }

    pub fn without_header(mut self) -> Self {
        self.show_header = false;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Column widths for a table `total` points wide.
    pub fn column_widths(&self, total: f64) -> Vec<f64> {
        let fixed: f64 = self.columns.iter().filter_map(|c| c.width).sum();
        let auto_count = self.columns.iter().filter(|c| c.width.is_none()).count();

        // Fixed widths that overrun the table are scaled down to fit.
        let scale = if fixed > total && fixed > 0.0 {
            total / fixed
        } else {
            1.0
        };
        let leftover = (total - fixed * scale).max(0.0);
        let auto_width = if auto_count > 0 {
            leftover / auto_count as f64
        } else {
            0.0
        };

        self.columns
            .iter()
            .map(|c| c.width.map(|w| w * scale).unwrap_or(auto_width))
            .collect()
    }

    fn cell_lines(&self, layout: &TextLayout, text: &str, style: &TextStyle, width: f64) -> Vec<String> {
        let wrapped = layout.wrap(text, style, (width - 2.0 * CELL_PADDING_X).max(1.0));
        if wrapped.lines.is_empty() {
            vec![String::new()]
        } else {
            wrapped.lines
        }
    }

    fn row_layout(&self, layout: &TextLayout, cells: &[Cell], widths: &[f64], header: bool) -> (Vec<Vec<String>>, f64) {
        let mut max_lines = 1;
        let mut lines = Vec::with_capacity(widths.len());
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i);
            let text = cell.map(|c| c.text.as_str()).unwrap_or("");
            let style = self.cell_style(cell, header);
            let cell_lines = self.cell_lines(layout, text, &style, *width);
            max_lines = max_lines.max(cell_lines.len());
            lines.push(cell_lines);
        }
        let height = max_lines as f64 * self.style.line_height() + 2.0 * CELL_PADDING_Y;
        (lines, height)
    }

    fn cell_style(&self, cell: Option<&Cell>, header: bool) -> TextStyle {
        let mut style = self.style.clone();
        if header || cell.map(|c| c.bold).unwrap_or(false) {
            style.bold = true;
        }
        style
    }

    fn header_cells(&self) -> Vec<Cell> {
        self.columns.iter().map(|c| Cell::from(c.label.as_str())).collect()
    }

    /// Total height if drawn without page breaks.
    pub fn measure(&self, width: f64) -> f64 {
        let layout = TextLayout::new();
        let widths = self.column_widths(width);
        let header = if self.show_header {
            self.row_layout(&layout, &self.header_cells(), &widths, true).1
        } else {
            0.0
        };
        header
            + self
                .rows
                .iter()
                .map(|r| self.row_layout(&layout, r, &widths, false).1)
                .sum::<f64>()
    }

    /// Height of the header plus the first body row, the minimum that must
    /// stay together at the top of a table.
    pub fn leading_height(&self, width: f64) -> f64 {
        let layout = TextLayout::new();
        let widths = self.column_widths(width);
        let header = if self.show_header {
            self.row_layout(&layout, &self.header_cells(), &widths, true).1
        } else {
            0.0
        };
        let first = self
            .rows
            .first()
            .map(|r| self.row_layout(&layout, r, &widths, false).1)
            .unwrap_or(0.0);
        header + first
    }

    /// Draw the table at `x`, `width` points wide, starting at `cursor`.
    pub fn draw(&self, flow: &mut Flow, cursor: Cursor, x: f64, width: f64, theme: &Theme) -> Cursor {
        if self.columns.is_empty() {
            return cursor;
        }
        let layout = TextLayout::new();
        let widths = self.column_widths(width);
        let header = self.show_header.then(|| {
            let cells = self.header_cells();
            let (lines, height) = self.row_layout(&layout, &cells, &widths, true);
            (lines, height)
        });

        let mut cursor = flow.ensure(cursor, self.leading_height(width));
        if let Some((lines, height)) = &header {
            cursor = self.draw_header(flow, cursor, x, &widths, lines, *height, theme);
        }

        let stripe = theme.primary.lighten(0.9);
        for (index, row) in self.rows.iter().enumerate() {
            let (lines, height) = self.row_layout(&layout, row, &widths, false);
            let before = cursor.page;
            cursor = flow.ensure(cursor, height);
            if cursor.page != before {
                log::debug!("Table continues on page {}", cursor.page + 1);
                if let Some((header_lines, header_height)) = &header {
                    cursor = self.draw_header(flow, cursor, x, &widths, header_lines, *header_height, theme);
                }
            }

            let canvas = flow.canvas_at(cursor);
            if index % 2 == 1 {
                canvas.draw_rect(x, cursor.y, width, height, &RectStyle::filled(stripe));
            }
            let mut cell_x = x;
            for (i, cell_width) in widths.iter().enumerate() {
                let cell = row.get(i);
                let mut style = self.cell_style(cell, false);
                if let Some(fill) = cell.and_then(|c| c.fill) {
                    canvas.draw_rect(cell_x, cursor.y, *cell_width, height, &RectStyle::filled(fill));
                    style.color = fill.contrasting_text();
                }
                let mut line_y = cursor.y + CELL_PADDING_Y;
                for line in &lines[i] {
                    canvas.draw_text(line, cell_x + CELL_PADDING_X, line_y, &style);
                    line_y += style.line_height();
                }
                cell_x += cell_width;
            }
            canvas.draw_rect(x, cursor.y + height, width, 0.0, &RectStyle::stroked(RULE_COLOR, 0.5));
            cursor = cursor.advance(height);
        }
        cursor
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_header(
        &self,
        flow: &mut Flow,
        cursor: Cursor,
        x: f64,
        widths: &[f64],
        lines: &[Vec<String>],
        height: f64,
        theme: &Theme,
    ) -> Cursor {
        let canvas = flow.canvas_at(cursor);
        let total: f64 = widths.iter().sum();
        canvas.draw_rect(x, cursor.y, total, height, &RectStyle::filled(theme.primary));
        let style = self.cell_style(None, true).colored(theme.primary.contrasting_text());
        let mut cell_x = x;
        for (cell_lines, w) in lines.iter().zip(widths) {
            let mut line_y = cursor.y + CELL_PADDING_Y;
            for line in cell_lines {
                canvas.draw_text(line, cell_x + CELL_PADDING_X, line_y, &style);
                line_y += style.line_height();
            }
            cell_x += w;
        }
        cursor.advance(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, DrawCommand, PageSequence};
    use crate::model::{Orientation, PageConfig, PageSize};

    fn table(rows: usize) -> Table {
        let mut t = Table::new(
            vec![
                TableColumn::new("Č.", Some(30.0)),
                TableColumn::new("Okruh", None),
                TableColumn::new("Jistič", None),
            ],
            TextStyle::default(),
        );
        for i in 0..rows {
            t.push_row(vec![
                Cell::from(i.to_string()),
                Cell::from("Zásuvky kuchyň"),
                Cell::from("B16"),
            ]);
        }
        t
    }

    #[test]
    fn test_column_widths_split_leftover() {
        let widths = table(0).column_widths(230.0);
        assert_eq!(widths, vec![30.0, 100.0, 100.0]);
    }

    #[test]
    fn test_overrunning_fixed_widths_scale_down() {
        let t = Table::new(
            vec![
                TableColumn::new("a", Some(300.0)),
                TableColumn::new("b", Some(100.0)),
            ],
            TextStyle::default(),
        );
        assert_eq!(t.column_widths(200.0), vec![150.0, 50.0]);
    }

    #[test]
    fn test_header_labels_in_order() {
        let mut seq = PageSequence::new(PageSize::A4);
        let mut flow = Flow::new(&mut seq, PageConfig::default());
        let cursor = flow.new_page(Orientation::Portrait);
        let end = table(2).draw(&mut flow, cursor, 36.0, 500.0, &Theme::default());
        assert!(end.y > cursor.y);
        drop(flow);
        let texts: Vec<&str> = seq.page(0).unwrap().texts().collect();
        assert_eq!(&texts[..3], &["Č.", "Okruh", "Jistič"]);
    }

    #[test]
    fn test_header_repeats_after_page_break() {
        let mut seq = PageSequence::new(PageSize::A4);
        let mut flow = Flow::new(&mut seq, PageConfig::default());
        let cursor = flow.new_page(Orientation::Portrait);
        let end = table(120).draw(&mut flow, cursor, 36.0, 500.0, &Theme::default());
        drop(flow);
        assert!(seq.page_count() > 1);
        assert_eq!(end.page, seq.page_count() - 1);
        for page in seq.pages() {
            assert_eq!(page.texts().next(), Some("Č."));
        }
    }

    #[test]
    fn test_filled_cell_gets_contrasting_text() {
        let mut seq = PageSequence::new(PageSize::A4);
        let mut flow = Flow::new(&mut seq, PageConfig::default());
        let cursor = flow.new_page(Orientation::Portrait);
        let mut t = Table::new(vec![TableColumn::new("Závažnost", None)], TextStyle::default()).without_header();
        t.push_row(vec![Cell::from("C1").filled(Color::RED)]);
        t.draw(&mut flow, cursor, 36.0, 200.0, &Theme::default());
        drop(flow);
        let text_color = seq.page(0).unwrap().commands.iter().find_map(|c| match c {
            DrawCommand::Text { style, .. } => Some(style.color),
            _ => None,
        });
        assert_eq!(text_color, Some(Color::WHITE));
    }
}
