//! Pie charts with a percentage legend.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{theme, Font, Rgb, Surface, TextOptions};
use crate::reports::Share;

/// Slices start at 12 o'clock
const START_ANGLE: f64 = -90.0;
/// Arc resolution of a slice outline
const DEGREES_PER_SEGMENT: f64 = 5.0;

const LEGEND_OFFSET: f64 = 20.0;
const LEGEND_SPACING: f64 = 18.0;
const LEGEND_SWATCH: f64 = 10.0;
const LEGEND_TEXT_OFFSET: f64 = 15.0;
const LEGEND_FONT_SIZE: f64 = 9.0;
const LEGEND_COLUMN_WIDTH: f64 = 110.0;
/// Swatch and font shrink with the row spacing of a crowded legend
const LEGEND_FILL: f64 = 0.8;

/// Region the legend must stay inside. Long legends wrap into columns up
/// to `right`, then tighten their row spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendArea {
    pub top: f64,
    pub bottom: f64,
    pub right: f64,
}

impl LegendArea {
    pub const UNBOUNDED: LegendArea = LegendArea {
        top: f64::NEG_INFINITY,
        bottom: f64::INFINITY,
        right: f64::INFINITY,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Index of the share in the input
    pub index: usize,
    /// Degrees, clockwise from the positive x axis
    pub start: f64,
    pub sweep: f64,
    pub color: Rgb,
}

impl Slice {
    pub fn end(&self) -> f64 {
        self.start + self.sweep
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub text: String,
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieLayout {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub slices: Vec<Slice>,
    /// Whole chart drawn as one neutral circle
    pub neutral: bool,
    pub legend: Vec<LegendEntry>,
    pub legend_swatch: f64,
    pub legend_font_size: f64,
}

fn palette_color(palette: &[Rgb], index: usize) -> Rgb {
    if palette.is_empty() {
        theme::NEUTRAL
    } else {
        palette[index % palette.len()]
    }
}

fn legend_percentage(value: Decimal, total: Decimal) -> String {
    if total <= Decimal::ZERO {
        return "0.0".to_string();
    }
    let pct = (value / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}", pct)
}

/// Legend grid for `count` entries: (columns, rows, row spacing)
fn legend_grid(count: usize, legend_x: f64, area: &LegendArea) -> (usize, usize, f64) {
    if count == 0 {
        return (1, 0, LEGEND_SPACING);
    }
    let height = area.bottom - area.top;
    let rows_per_column = if height.is_finite() {
        ((height / LEGEND_SPACING).floor() as usize).max(1)
    } else {
        count
    };
    let max_columns = if area.right.is_finite() {
        (((area.right - legend_x) / LEGEND_COLUMN_WIDTH).floor() as usize).max(1)
    } else {
        usize::MAX
    };

    let columns = count.div_ceil(rows_per_column).clamp(1, max_columns);
    let rows = count.div_ceil(columns);
    let spacing = if height.is_finite() {
        LEGEND_SPACING.min(height / rows as f64)
    } else {
        LEGEND_SPACING
    };
    (columns, rows, spacing)
}

/// Compute slices and legend for `shares` centered at (`cx`, `cy`)
pub fn layout(
    shares: &[Share],
    palette: &[Rgb],
    cx: f64,
    cy: f64,
    radius: f64,
    area: &LegendArea,
) -> PieLayout {
    let total: Decimal = shares.iter().map(|s| s.value).sum();
    let neutral = total <= Decimal::ZERO;

    let mut slices = Vec::new();
    if !neutral {
        let total_f = total.to_f64().unwrap_or(0.0);
        let mut angle = START_ANGLE;
        for (index, share) in shares.iter().enumerate() {
            if share.value <= Decimal::ZERO {
                continue;
            }
            let sweep = share.value.to_f64().unwrap_or(0.0) / total_f * 360.0;
            slices.push(Slice {
                index,
                start: angle,
                sweep,
                color: palette_color(palette, index),
            });
            angle += sweep;
        }
    }

    let legend_x = cx + radius + LEGEND_OFFSET;
    let (_, rows, spacing) = legend_grid(shares.len(), legend_x, area);
    let block = rows as f64 * spacing;
    let legend_top = (cy - block / 2.0).min(area.bottom - block).max(area.top);
    let legend = shares
        .iter()
        .enumerate()
        .map(|(index, share)| {
            let (column, row) = if rows == 0 {
                (0, 0)
            } else {
                (index / rows, index % rows)
            };
            LegendEntry {
                text: format!("{}: {}%", share.label, legend_percentage(share.value, total)),
                color: palette_color(palette, index),
                x: legend_x + column as f64 * LEGEND_COLUMN_WIDTH,
                y: legend_top + row as f64 * spacing,
            }
        })
        .collect();

    PieLayout {
        cx,
        cy,
        radius,
        slices,
        neutral,
        legend,
        legend_swatch: LEGEND_SWATCH.min(spacing * LEGEND_FILL),
        legend_font_size: LEGEND_FONT_SIZE.min(spacing * LEGEND_FILL),
    }
}

/// Outline of a slice: the center followed by points along its arc
pub fn slice_outline(cx: f64, cy: f64, radius: f64, slice: &Slice) -> Vec<(f64, f64)> {
    let steps = (slice.sweep / DEGREES_PER_SEGMENT).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((cx, cy));
    for step in 0..=steps {
        let angle = (slice.start + slice.sweep * step as f64 / steps as f64).to_radians();
        points.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    points
}

/// Draw a laid-out chart
pub fn draw(surface: &mut dyn Surface, chart: &PieLayout) {
    if chart.neutral {
        surface.set_fill_color(theme::NEUTRAL);
        surface.fill_circle(chart.cx, chart.cy, chart.radius);
    } else {
        for slice in &chart.slices {
            surface.set_fill_color(slice.color);
            surface.fill_path(&slice_outline(chart.cx, chart.cy, chart.radius, slice));
        }
    }

    surface.set_font(Font::Regular, chart.legend_font_size);
    for entry in &chart.legend {
        surface.set_fill_color(entry.color);
        surface.fill_rect(entry.x, entry.y, chart.legend_swatch, chart.legend_swatch);
        surface.set_fill_color(theme::TEXT);
        surface.text(
            &entry.text,
            entry.x + LEGEND_TEXT_OFFSET,
            entry.y,
            TextOptions::single_line(),
        );
    }
}

/// Lay out and draw in one step
pub fn draw_pie(
    surface: &mut dyn Surface,
    shares: &[Share],
    palette: &[Rgb],
    cx: f64,
    cy: f64,
    radius: f64,
    area: &LegendArea,
) -> PieLayout {
    let chart = layout(shares, palette, cx, cy, radius, area);
    draw(surface, &chart);
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawOp, RecordingSurface};
    use rust_decimal_macros::dec;

    fn share(label: &str, value: Decimal) -> Share {
        Share {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn test_two_slices_clockwise_from_top() {
        let shares = vec![share("USD", dec!(65)), share("PEN", dec!(35))];
        let chart = layout(
            &shares,
            &theme::CURRENCY_PALETTE,
            200.0,
            400.0,
            50.0,
            &LegendArea::UNBOUNDED,
        );

        assert!(!chart.neutral);
        assert_eq!(chart.slices.len(), 2);
        assert!((chart.slices[0].start - -90.0).abs() < 1e-9);
        assert!((chart.slices[0].sweep - 234.0).abs() < 1e-9);
        assert!((chart.slices[1].start - 144.0).abs() < 1e-9);
        assert!((chart.slices[1].sweep - 126.0).abs() < 1e-9);
        assert!((chart.slices[1].end() - 270.0).abs() < 1e-9);
        assert_eq!(chart.slices[1].color, theme::CURRENCY_PALETTE[1]);
        assert_eq!(chart.legend[0].text, "USD: 65.0%");
        assert_eq!(chart.legend[1].text, "PEN: 35.0%");
    }

    #[test]
    fn test_zero_total_draws_neutral_circle() {
        let shares = vec![share("A", dec!(0))];
        let mut surface = RecordingSurface::new();
        let chart = draw_pie(
            &mut surface,
            &shares,
            &theme::FUND_PALETTE,
            200.0,
            400.0,
            50.0,
            &LegendArea::UNBOUNDED,
        );

        assert!(chart.neutral);
        assert!(chart.slices.is_empty());
        assert_eq!(chart.legend[0].text, "A: 0.0%");
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            DrawOp::Circle { color, .. } if *color == theme::NEUTRAL
        )));
        assert!(!surface.ops().iter().any(|op| matches!(op, DrawOp::Path { .. })));
    }

    #[test]
    fn test_zero_entries_skip_slice_but_keep_legend() {
        let shares = vec![share("USD", dec!(100)), share("PEN", dec!(0))];
        let chart = layout(
            &shares,
            &theme::CURRENCY_PALETTE,
            0.0,
            0.0,
            50.0,
            &LegendArea::UNBOUNDED,
        );
        assert_eq!(chart.slices.len(), 1);
        assert!((chart.slices[0].sweep - 360.0).abs() < 1e-9);
        assert_eq!(chart.legend[1].text, "PEN: 0.0%");
    }

    #[test]
    fn test_colors_wrap_around_palette() {
        let shares: Vec<_> = (0..11).map(|i| share(&format!("f{}", i), dec!(1))).collect();
        let chart = layout(
            &shares,
            &theme::FUND_PALETTE,
            0.0,
            0.0,
            50.0,
            &LegendArea::UNBOUNDED,
        );
        assert_eq!(chart.slices[9].color, theme::FUND_PALETTE[0]);
        assert_eq!(chart.slices[10].color, theme::FUND_PALETTE[1]);
    }

    #[test]
    fn test_legend_is_centered_on_chart() {
        let shares = vec![share("a", dec!(1)), share("b", dec!(1)), share("c", dec!(2))];
        let chart = layout(
            &shares,
            &theme::FUND_PALETTE,
            300.0,
            400.0,
            50.0,
            &LegendArea::UNBOUNDED,
        );
        assert_eq!(chart.legend[0].x, 370.0);
        assert_eq!(chart.legend[0].y, 400.0 - 27.0);
        assert_eq!(chart.legend[2].y, 400.0 + 9.0);
        assert_eq!(chart.legend[2].text, "c: 50.0%");
    }

    #[test]
    fn test_short_legend_is_clamped_into_area() {
        let shares = vec![share("a", dec!(1)), share("b", dec!(1)), share("c", dec!(2))];
        let area = LegendArea {
            top: 390.0,
            bottom: 575.0,
            right: 820.0,
        };
        // Centered it would start at 373
        let chart = layout(&shares, &theme::FUND_PALETTE, 300.0, 400.0, 50.0, &area);
        assert_eq!(chart.legend[0].y, 390.0);
        assert_eq!(chart.legend[2].y, 426.0);
        assert_eq!(chart.legend_swatch, 10.0);
    }

    #[test]
    fn test_long_legend_stays_on_page() {
        let shares: Vec<_> = (0..30)
            .map(|i| share(&format!("fund{:02}", i), dec!(1)))
            .collect();
        let page_height = 595.28;
        let area = LegendArea {
            top: 390.28,
            bottom: page_height - 20.0,
            right: 821.89,
        };
        let chart = layout(&shares, &theme::FUND_PALETTE, 591.42, 465.28, 50.0, &area);

        assert_eq!(chart.legend.len(), 30);
        for entry in &chart.legend {
            assert!(entry.y >= area.top, "{} at {}", entry.text, entry.y);
            assert!(
                entry.y + chart.legend_swatch <= area.bottom,
                "{} at {}",
                entry.text,
                entry.y
            );
            assert!(entry.x + LEGEND_COLUMN_WIDTH <= area.right + 1e-9, "{}", entry.text);
        }
        // Only one column fits beside the chart, so rows tighten
        assert!(chart.legend.iter().all(|e| e.x == chart.legend[0].x));
        assert!(chart.legend_font_size < LEGEND_FONT_SIZE);
    }

    #[test]
    fn test_legend_wraps_into_columns_when_wide_enough() {
        let shares: Vec<_> = (0..30).map(|i| share(&format!("f{}", i), dec!(1))).collect();
        let area = LegendArea {
            top: 0.0,
            bottom: 180.0,
            right: 1000.0,
        };
        let chart = layout(&shares, &theme::FUND_PALETTE, 100.0, 90.0, 50.0, &area);

        // 10 rows of 18pt per column
        assert_eq!(chart.legend[0].x, 170.0);
        assert_eq!(chart.legend[10].x, 280.0);
        assert_eq!(chart.legend[20].x, 390.0);
        assert_eq!(chart.legend[10].y, chart.legend[0].y);
        assert_eq!(chart.legend[9].y, 162.0);
        assert_eq!(chart.legend_swatch, LEGEND_SWATCH);
    }

    #[test]
    fn test_slice_outline_starts_at_center_and_top() {
        let slice = Slice {
            index: 0,
            start: -90.0,
            sweep: 90.0,
            color: theme::BRAND,
        };
        let points = slice_outline(100.0, 100.0, 50.0, &slice);
        assert_eq!(points[0], (100.0, 100.0));
        assert!((points[1].0 - 100.0).abs() < 1e-9);
        assert!((points[1].1 - 50.0).abs() < 1e-9);
        let last = points[points.len() - 1];
        assert!((last.0 - 150.0).abs() < 1e-9);
        assert!((last.1 - 100.0).abs() < 1e-9);
    }
}
