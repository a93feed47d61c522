// Render module - drawing surfaces and the statement layout on top of them
//
// Coordinates are PDF points with the origin at the top-left corner of the
// page and y growing downwards.

pub mod composer;
pub mod metrics;
pub mod pdf;
pub mod pie;
pub mod recording;
pub mod table;
pub mod theme;

use std::io::Write;

use crate::error::EeccError;

pub use composer::compose;
pub use pdf::PdfSurface;
pub use recording::{DrawOp, RecordingSurface};

/// A4 landscape, in points
pub const A4_LANDSCAPE: (f64, f64) = (841.89, 595.28);

/// Line height relative to font size for the builtin Helvetica faces
const LINE_HEIGHT_FACTOR: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Placement options for [`Surface::text`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Box width used for alignment and wrapping
    pub width: Option<f64>,
    pub align: Align,
    /// Wrap at the box width; explicit `\n` always breaks
    pub line_break: bool,
    /// Extra space between lines
    pub line_gap: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            width: None,
            align: Align::Left,
            line_break: true,
            line_gap: 0.0,
        }
    }
}

impl TextOptions {
    pub fn boxed(width: f64, align: Align) -> Self {
        Self {
            width: Some(width),
            align,
            ..Self::default()
        }
    }

    pub fn single_line() -> Self {
        Self {
            line_break: false,
            ..Self::default()
        }
    }

    pub fn with_line_gap(mut self, line_gap: f64) -> Self {
        self.line_gap = line_gap;
        self
    }
}

/// Drawing primitives the layout code is written against.
///
/// A fresh surface already holds its first page.
pub trait Surface {
    fn page_size(&self) -> (f64, f64);

    fn add_page(&mut self) -> Result<(), EeccError>;

    fn set_font(&mut self, font: Font, size: f64);

    fn set_fill_color(&mut self, color: Rgb);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64);

    /// Fill the closed polygon through `points`
    fn fill_path(&mut self, points: &[(f64, f64)]);

    /// Draw `text` with the top of its first line at `y`
    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions);

    /// Width of `text` in the current font and size
    fn text_width(&self, text: &str) -> f64;

    /// Serialize the document into `sink`
    fn finish(self, sink: &mut dyn Write) -> Result<(), EeccError>
    where
        Self: Sized;
}

/// A single line of laid-out text: its content and top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Break `text` into lines and position each one inside the options box
pub fn layout_text(
    text: &str,
    x: f64,
    y: f64,
    options: &TextOptions,
    font: Font,
    size: f64,
) -> Vec<PlacedLine> {
    let line_height = size * LINE_HEIGHT_FACTOR + options.line_gap;

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        match options.width {
            Some(width) if options.line_break => {
                lines.extend(wrap(paragraph, width, font, size));
            }
            _ => lines.push(paragraph.to_string()),
        }
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line_width = metrics::text_width(font, size, &line);
            let line_x = match (options.width, options.align) {
                (Some(width), Align::Center) => x + (width - line_width) / 2.0,
                (Some(width), Align::Right) => x + width - line_width,
                _ => x,
            };
            PlacedLine {
                text: line,
                x: line_x,
                y: y + i as f64 * line_height,
            }
        })
        .collect()
}

/// Greedy word wrap; a word wider than the box gets a line of its own
fn wrap(paragraph: &str, width: f64, font: Font, size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if !current.is_empty() && metrics::text_width(font, size, &candidate) > width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}
