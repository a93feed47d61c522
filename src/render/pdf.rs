//! PDF surface backed by `printpdf` and the builtin Helvetica faces.

use std::f64::consts::PI;
use std::io::Write;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Polygon, Pt,
};
use tracing::debug;

use super::{layout_text, metrics, Font, Rgb, Surface, TextOptions, A4_LANDSCAPE};
use crate::error::EeccError;

const LAYER_NAME: &str = "Statement";
const CIRCLE_SEGMENTS: usize = 72;

fn mm(points: f64) -> Mm {
    Mm::from(Pt(points as f32))
}

fn render_error(err: printpdf::Error) -> EeccError {
    EeccError::Render(err.to_string())
}

pub struct PdfSurface {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    width: f64,
    height: f64,
    font: Font,
    font_size: f64,
    pages: usize,
}

impl PdfSurface {
    /// A4 landscape document holding one empty page
    pub fn new(title: &str) -> Result<Self, EeccError> {
        let (width, height) = A4_LANDSCAPE;
        let (doc, page, layer) = PdfDocument::new(title, mm(width), mm(height), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            width,
            height,
            font: Font::Regular,
            font_size: 12.0,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Top-left page coordinates to a PDF point
    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(mm(x), mm(self.height - y))
    }

    fn fill_polygon(&self, points: &[(f64, f64)]) {
        if points.len() < 3 {
            return;
        }
        let ring = points
            .iter()
            .map(|&(x, y)| (self.point(x, y), false))
            .collect();
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn font_ref(&self) -> &IndirectFontRef {
        match self.font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

impl Surface for PdfSurface {
    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn add_page(&mut self) -> Result<(), EeccError> {
        let (page, layer) = self.doc.add_page(mm(self.width), mm(self.height), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        Ok(())
    }

    fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.font_size = size;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0,
            None,
        )));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill_polygon(&[
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
        ]);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        let points: Vec<(f64, f64)> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / CIRCLE_SEGMENTS as f64;
                (cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect();
        self.fill_polygon(&points);
    }

    fn fill_path(&mut self, points: &[(f64, f64)]) {
        self.fill_polygon(points);
    }

    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions) {
        let size = self.font_size;
        for line in layout_text(text, x, y, &options, self.font, size) {
            if line.text.is_empty() {
                continue;
            }
            let baseline = line.y + size * metrics::ASCENT;
            self.layer.use_text(
                line.text,
                size as f32,
                mm(line.x),
                mm(self.height - baseline),
                self.font_ref(),
            );
        }
    }

    fn text_width(&self, text: &str) -> f64 {
        metrics::text_width(self.font, self.font_size, text)
    }

    fn finish(self, sink: &mut dyn Write) -> Result<(), EeccError> {
        let pages = self.pages;
        let bytes = self.doc.save_to_bytes().map_err(render_error)?;
        sink.write_all(&bytes)?;
        debug!("PDF finished: {} pages, {} bytes", pages, bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_is_pdf() {
        let mut surface = PdfSurface::new("test").unwrap();
        surface.set_fill_color(Rgb::new(0x1d, 0x11, 0x3e));
        surface.fill_rect(50.0, 120.0, 741.89, 20.0);
        surface.set_font(Font::Bold, 10.0);
        surface.set_fill_color(Rgb::WHITE);
        surface.text("FONDO", 55.0, 125.0, TextOptions::default());
        surface.add_page().unwrap();
        surface.fill_circle(200.0, 300.0, 50.0);
        assert_eq!(surface.page_count(), 2);

        let mut out = Vec::new();
        surface.finish(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF"));
    }

    #[test]
    fn test_flips_y_axis() {
        let surface = PdfSurface::new("test").unwrap();
        let point = surface.point(0.0, 0.0);
        assert!((point.y.0 - A4_LANDSCAPE.1 as f32).abs() < 0.01);
        assert!(point.x.0.abs() < 0.01);
    }
}
