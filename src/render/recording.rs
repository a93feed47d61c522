//! In-memory surface that records every primitive instead of drawing it.
//!
//! Used by `generate --dry-run` and by the layout tests.

use std::io::Write;

use super::{metrics, Font, Rgb, Surface, TextOptions, A4_LANDSCAPE};
use crate::error::EeccError;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    AddPage,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgb,
    },
    Path {
        points: Vec<(f64, f64)>,
        color: Rgb,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: Font,
        size: f64,
        color: Rgb,
        options: TextOptions,
    },
}

#[derive(Debug)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    font: Font,
    font_size: f64,
    fill: Rgb,
    ops: Vec<DrawOp>,
    pages: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::with_page_size(A4_LANDSCAPE.0, A4_LANDSCAPE.1)
    }

    pub fn with_page_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            font: Font::Regular,
            font_size: 12.0,
            fill: Rgb::BLACK,
            ops: Vec::new(),
            pages: 1,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Ops of page `page` (1-based)
    pub fn page_ops(&self, page: usize) -> Vec<&DrawOp> {
        let mut current = 1;
        let mut result = Vec::new();
        for op in &self.ops {
            if *op == DrawOp::AddPage {
                current += 1;
                continue;
            }
            if current == page {
                result.push(op);
            }
        }
        result
    }

    /// Every text drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn page_texts(&self, page: usize) -> Vec<&str> {
        self.page_ops(page)
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Page number (1-based) of the first text op equal to `needle`
    pub fn page_of(&self, needle: &str) -> Option<usize> {
        let mut page = 1;
        for op in &self.ops {
            match op {
                DrawOp::AddPage => page += 1,
                DrawOp::Text { text, .. } if text == needle => return Some(page),
                _ => {}
            }
        }
        None
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn add_page(&mut self) -> Result<(), EeccError> {
        self.pages += 1;
        self.ops.push(DrawOp::AddPage);
        Ok(())
    }

    fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.font_size = size;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: self.fill,
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ops.push(DrawOp::Circle {
            cx,
            cy,
            radius,
            color: self.fill,
        });
    }

    fn fill_path(&mut self, points: &[(f64, f64)]) {
        self.ops.push(DrawOp::Path {
            points: points.to_vec(),
            color: self.fill,
        });
    }

    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: self.font,
            size: self.font_size,
            color: self.fill,
            options,
        });
    }

    fn text_width(&self, text: &str) -> f64 {
        metrics::text_width(self.font, self.font_size, text)
    }

    /// Writes one line per recorded op
    fn finish(self, sink: &mut dyn Write) -> Result<(), EeccError> {
        writeln!(sink, "pages: {}", self.pages)?;
        for op in &self.ops {
            writeln!(sink, "{:?}", op)?;
        }
        Ok(())
    }
}
