//! Paginated table layout.
//!
//! A [`Table`] owns the immutable column geometry and style; the mutable
//! layout position lives in a [`Cursor`] that every call takes and returns.
//! Tables move through `HeaderDrawn -> RowsInProgress -> Complete`, passing
//! through a page break (new page, page decoration, optional header) whenever
//! the next row would cross the bottom margin.

use super::{theme, Align, Font, Surface, TextOptions};
use crate::error::EeccError;

/// Horizontal inset of left- and right-aligned cells
const CELL_PADDING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: &'static str,
    /// Share of the table width
    pub fraction: f64,
    pub align: Align,
}

impl Column {
    pub fn new(label: &'static str, fraction: f64, align: Align) -> Self {
        Self {
            label,
            fraction,
            align,
        }
    }

    pub fn centered(label: &'static str, fraction: f64) -> Self {
        Self::new(label, fraction, Align::Center)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    /// Left and right margin of the header bar and rows
    pub margin: f64,
    pub header_height: f64,
    pub header_font_size: f64,
    pub header_line_gap: f64,
    pub row_height: f64,
    pub row_gap: f64,
    pub font_size: f64,
    pub bottom_margin: f64,
    /// Where rows resume on a new page when the header is not repeated
    pub continuation_y: f64,
    pub repeat_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            margin: 50.0,
            header_height: 20.0,
            header_font_size: 10.0,
            header_line_gap: 0.0,
            row_height: 20.0,
            row_gap: 1.5,
            font_size: 10.0,
            bottom_margin: 50.0,
            continuation_y: 50.0,
            repeat_header: true,
        }
    }
}

/// Absolute column positions for one page width
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    pub x: f64,
    pub width: f64,
    pub column_x: Vec<f64>,
    pub column_widths: Vec<f64>,
}

impl TableGeometry {
    /// Column widths are `fraction * (page_width - 2 * margin)`, laid out left
    /// to right from the margin.
    pub fn compute(page_width: f64, margin: f64, columns: &[Column]) -> Self {
        let width = page_width - margin * 2.0;
        let column_widths: Vec<f64> = columns.iter().map(|c| c.fraction * width).collect();
        let column_x = column_widths
            .iter()
            .scan(margin, |x, w| {
                let start = *x;
                *x += w;
                Some(start)
            })
            .collect();
        Self {
            x: margin,
            width,
            column_x,
            column_widths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    HeaderDrawn,
    RowsInProgress,
    Complete,
}

/// Layout position of a table in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Top of the next row
    pub y: f64,
    pub state: TableState,
    pub rows_drawn: usize,
    pub page_breaks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    /// Shaded data row
    Data,
    /// Data row without background
    Plain,
    /// Alternate shading for long listings
    Striped,
    GroupHeader,
    GrandTotal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub role: RowRole,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(role: RowRole, cells: Vec<String>) -> Self {
        Self { role, cells }
    }
}

/// Called after a page break, before anything else is drawn on the new page
pub type PageDecorator<'a> = dyn FnMut(&mut dyn Surface) -> Result<(), EeccError> + 'a;

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    style: TableStyle,
    geometry: TableGeometry,
}

impl Table {
    pub fn new(columns: Vec<Column>, style: TableStyle, page_width: f64) -> Self {
        let geometry = TableGeometry::compute(page_width, style.margin, &columns);
        Self {
            columns,
            style,
            geometry,
        }
    }

    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    /// Vertical space of one row including the gap below it
    pub fn row_stride(&self) -> f64 {
        self.style.row_height + self.style.row_gap
    }

    /// Rows that fit between `start_y` and the bottom margin
    pub fn rows_that_fit(&self, page_height: f64, start_y: f64) -> usize {
        let available = page_height - self.style.bottom_margin - start_y;
        if available <= 0.0 {
            return 0;
        }
        (available / self.row_stride()).floor() as usize
    }

    /// Height of the header bar plus `rows` rows
    pub fn height_with_rows(&self, rows: usize) -> f64 {
        self.style.header_height + self.style.row_gap + rows as f64 * self.row_stride()
    }

    /// Draw the header bar at `y` and return a cursor below it
    pub fn begin(&self, surface: &mut dyn Surface, y: f64) -> Cursor {
        self.draw_header(surface, y);
        Cursor {
            y: y + self.style.header_height + self.style.row_gap,
            state: TableState::HeaderDrawn,
            rows_drawn: 0,
            page_breaks: 0,
        }
    }

    fn draw_header(&self, surface: &mut dyn Surface, y: f64) {
        let style = &self.style;
        surface.set_fill_color(theme::BRAND);
        surface.fill_rect(self.geometry.x, y, self.geometry.width, style.header_height);

        surface.set_font(Font::Bold, style.header_font_size);
        surface.set_fill_color(theme::TEXT_ON_BRAND);
        for (i, column) in self.columns.iter().enumerate() {
            let lines = column.label.lines().count().max(1) as f64;
            let text_height = lines * (style.header_font_size + 1.0)
                + (lines - 1.0) * style.header_line_gap;
            let text_y = y + (style.header_height - text_height) / 2.0;
            let options = self
                .cell_options(i, column.align)
                .with_line_gap(style.header_line_gap);
            surface.text(column.label, self.cell_x(i, column.align), text_y, options);
        }
    }

    fn cell_x(&self, index: usize, align: Align) -> f64 {
        let x = self.geometry.column_x[index];
        match align {
            Align::Left => x + CELL_PADDING,
            Align::Center | Align::Right => x,
        }
    }

    fn cell_options(&self, index: usize, align: Align) -> TextOptions {
        let width = self.geometry.column_widths[index];
        let width = match align {
            Align::Left => width - 2.0 * CELL_PADDING,
            Align::Right => width - CELL_PADDING,
            Align::Center => width,
        };
        TextOptions::boxed(width, align)
    }

    /// Draw `row` at the cursor, breaking the page first when it would cross
    /// the bottom margin.
    pub fn draw_row(
        &self,
        surface: &mut dyn Surface,
        cursor: Cursor,
        row: &Row,
        decorate: &mut PageDecorator<'_>,
    ) -> Result<Cursor, EeccError> {
        let (_, page_height) = surface.page_size();
        let mut cursor = cursor;

        if cursor.y + self.style.row_height > page_height - self.style.bottom_margin {
            cursor = self.page_break(surface, cursor, decorate)?;
        }

        self.draw_row_at(surface, cursor.y, row);

        Ok(Cursor {
            y: cursor.y + self.row_stride(),
            state: TableState::RowsInProgress,
            rows_drawn: cursor.rows_drawn + 1,
            page_breaks: cursor.page_breaks,
        })
    }

    /// Draw every row in order
    pub fn draw_rows(
        &self,
        surface: &mut dyn Surface,
        cursor: Cursor,
        rows: &[Row],
        decorate: &mut PageDecorator<'_>,
    ) -> Result<Cursor, EeccError> {
        rows.iter()
            .try_fold(cursor, |cursor, row| self.draw_row(surface, cursor, row, decorate))
    }

    pub fn finish(&self, cursor: Cursor) -> Cursor {
        Cursor {
            state: TableState::Complete,
            ..cursor
        }
    }

    fn page_break(
        &self,
        surface: &mut dyn Surface,
        cursor: Cursor,
        decorate: &mut PageDecorator<'_>,
    ) -> Result<Cursor, EeccError> {
        surface.add_page()?;
        decorate(surface)?;

        let resumed = if self.style.repeat_header {
            self.begin(surface, self.style.continuation_y)
        } else {
            Cursor {
                y: self.style.continuation_y,
                state: TableState::HeaderDrawn,
                rows_drawn: 0,
                page_breaks: 0,
            }
        };

        Ok(Cursor {
            rows_drawn: cursor.rows_drawn,
            page_breaks: cursor.page_breaks + 1,
            ..resumed
        })
    }

    fn draw_row_at(&self, surface: &mut dyn Surface, y: f64, row: &Row) {
        let style = &self.style;
        let (background, font, text_color) = match row.role {
            RowRole::Data => (Some(theme::DATA_ROW), Font::Regular, theme::TEXT),
            RowRole::Plain => (None, Font::Regular, theme::TEXT),
            RowRole::Striped => (Some(theme::STRIPED_ROW), Font::Regular, theme::TEXT),
            RowRole::GroupHeader => (Some(theme::GROUP_HEADER_ROW), Font::Bold, theme::TEXT),
            RowRole::GrandTotal => (Some(theme::BRAND), Font::Bold, theme::TEXT_ON_BRAND),
        };

        if let Some(color) = background {
            surface.set_fill_color(color);
            surface.fill_rect(self.geometry.x, y, self.geometry.width, style.row_height);
        }

        surface.set_font(font, style.font_size);
        surface.set_fill_color(text_color);
        let text_y = y + (style.row_height - style.font_size) / 2.0 - 2.0;
        for (i, (column, value)) in self.columns.iter().zip(&row.cells).enumerate() {
            if value.is_empty() {
                continue;
            }
            surface.text(
                value,
                self.cell_x(i, column.align),
                text_y,
                self.cell_options(i, column.align),
            );
        }
    }
}

/// A run of rows sharing a group header and a grand total
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub title: String,
    /// Cells after the row-number column
    pub rows: Vec<Vec<String>>,
    pub total_label: String,
    /// Cells after the row-number column; the first one is overwritten by the label
    pub totals: Vec<String>,
}

/// Flatten groups into rows: group header, numbered data rows, grand total.
/// Row numbers run across groups. The label goes into column 1.
pub fn grouped_rows(groups: &[RowGroup]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut number = 1;

    for group in groups {
        rows.push(Row::new(
            RowRole::GroupHeader,
            vec![String::new(), group.title.clone()],
        ));

        for cells in &group.rows {
            let mut row = Vec::with_capacity(cells.len() + 1);
            row.push(number.to_string());
            row.extend(cells.iter().cloned());
            rows.push(Row::new(RowRole::Data, row));
            number += 1;
        }

        let mut total = vec![String::new()];
        total.extend(group.totals.iter().cloned());
        if total.len() < 2 {
            total.resize(2, String::new());
        }
        total[1] = group.total_label.clone();
        rows.push(Row::new(RowRole::GrandTotal, total));
    }

    rows
}
