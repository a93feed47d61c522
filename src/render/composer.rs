//! Statement document: cover, portfolio summary, positions and transactions.

use rust_decimal::Decimal;
use tracing::debug;

use super::pie::{self, LegendArea};
use super::table::{grouped_rows, Column, Row, RowGroup, RowRole, Table, TableStyle};
use super::{theme, Align, Font, Surface, TextOptions};
use crate::error::EeccError;
use crate::models::{Currency, Fund, PortfolioHistory, Statement};
use crate::reports::{by_currency, by_fund, CurrencyNormalizer};
use crate::utils::{format_amount, format_date, format_shares};

const TITLE_X: f64 = 50.0;
const TITLE_Y: f64 = 60.0;
const TITLE_SIZE: f64 = 28.0;
/// Space taken by a section title placed above a continued table
const SECTION_TITLE_HEIGHT: f64 = 40.0;
const SECTION_SPACING: f64 = 20.0;
const TABLE_HEADER_Y: f64 = 120.0;

const COVER_MARK: (f64, f64) = (50.0, 50.0);
const COVER_MARK_SIZE: f64 = 24.0;

const WATERMARK_MARK_X: f64 = 20.0;
const WATERMARK_MARK_Y: f64 = 15.0;
const WATERMARK_MARK_SIZE: f64 = 12.0;
const WATERMARK_TEXT_Y: f64 = 20.0;
const WATERMARK_TEXT_SIZE: f64 = 8.0;
/// Distance of the period label from the right page edge
const WATERMARK_DATE_INSET: f64 = 115.0;
const WATERMARK_SPACING: f64 = 20.0;

const DISTRIBUTION_MARGIN: f64 = 20.0;
/// Distance of the distribution band from the bottom page edge
const DISTRIBUTION_BOTTOM_OFFSET: f64 = 235.0;
const DISTRIBUTION_BAR_HEIGHT: f64 = 30.0;
const DISTRIBUTION_TITLE_SIZE: f64 = 18.0;
const PIE_RADIUS: f64 = 50.0;
const PIE_OFFSET_Y: f64 = 75.0;
const PIE_SHIFT_X: f64 = 30.0;

const MIN_CONTINUATION_ROWS: usize = 2;

pub const SUMMARY_TITLE: &str = "Resumen de tu portafolio";
pub const POSITIONS_TITLE: &str = "Posiciones del portafolio";
pub const PRIOR_POSITIONS_TITLE: &str = "Posiciones del mes anterior";
pub const TRANSACTIONS_TITLE: &str = "Transacciones de los últimos 3 meses";
pub const NO_TRANSACTIONS: &str = "No se registraron movimientos en los últimos 3 meses.";

fn summary_columns() -> Vec<Column> {
    vec![
        Column::centered("N°", 0.05),
        Column::new("FONDO", 0.38, Align::Left),
        Column::centered("MONEDA", 0.10),
        Column::centered("AHORROS", 0.16),
        Column::centered("APORTE", 0.15),
        Column::centered("RENTABILIDAD", 0.16),
    ]
}

fn position_columns() -> Vec<Column> {
    vec![
        Column::centered("N°", 0.05),
        Column::new("FONDO", 0.26, Align::Left),
        Column::centered("SALDO AL", 0.13),
        Column::centered("N° DE CUOTAS", 0.14),
        Column::centered("VALOR CUOTA", 0.14),
        Column::centered("SALDO", 0.14),
        Column::centered("SALDO EN USD", 0.14),
    ]
}

fn transaction_columns() -> Vec<Column> {
    vec![
        Column::centered("FECHA DE\nSOLICITUD", 0.12),
        Column::centered("FECHA DE\nASIGNACIÓN", 0.13),
        Column::new("FONDO MUTUO", 0.2, Align::Left),
        Column::centered("TIPO DE\nMOVIMIENTO", 0.12),
        Column::centered("N° DE\nCUOTAS", 0.11),
        Column::centered("VALOR\nCUOTA", 0.11),
        Column::centered("MONEDA", 0.1),
        Column::new("MONTO", 0.11, Align::Right),
    ]
}

fn transaction_style() -> TableStyle {
    TableStyle {
        header_height: 35.0,
        header_font_size: 9.0,
        header_line_gap: 2.0,
        row_height: 25.0,
        row_gap: 0.0,
        font_size: 9.0,
        repeat_header: false,
        ..TableStyle::default()
    }
}

fn group_title(currency: &Currency) -> String {
    match currency {
        Currency::Usd => "$ (USD)".to_string(),
        Currency::Pen => "S/. (PEN)".to_string(),
        Currency::Other(code) => format!("{} ({})", code, code),
    }
}

fn group_total_label(currency: &Currency) -> String {
    match currency {
        Currency::Usd => "Gran total $".to_string(),
        Currency::Pen => "Gran total S/.".to_string(),
        Currency::Other(code) => format!("Gran total {}", code),
    }
}

/// Invested funds grouped by balance currency: USD, then PEN, then any other
/// currency in order of first appearance. Empty groups are dropped.
pub fn currency_groups<'a>(funds: impl Iterator<Item = &'a Fund>) -> Vec<(Currency, Vec<&'a Fund>)> {
    let mut groups: Vec<(Currency, Vec<&'a Fund>)> =
        vec![(Currency::Usd, Vec::new()), (Currency::Pen, Vec::new())];

    for fund in funds {
        let currency = &fund.balance.currency;
        match groups.iter_mut().find(|(c, _)| c == currency) {
            Some((_, members)) => members.push(fund),
            None => groups.push((currency.clone(), vec![fund])),
        }
    }

    groups.retain(|(_, members)| !members.is_empty());
    groups
}

fn unit_price(fund: &Fund) -> Option<Decimal> {
    fund.share_price.or_else(|| match fund.balance.shares {
        Some(shares) if !shares.is_zero() => Some(fund.balance.amount / shares),
        _ => None,
    })
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Render `statement` onto `surface`, starting on its current (first) page
pub fn compose(surface: &mut dyn Surface, statement: &Statement, brand: &str) -> Result<(), EeccError> {
    let composer = Composer::new(statement, brand);
    composer.cover(surface);
    composer.summary(surface)?;
    composer.positions(surface)?;
    composer.transactions(surface)?;
    Ok(())
}

struct Composer<'a> {
    statement: &'a Statement,
    normalizer: CurrencyNormalizer,
    brand: &'a str,
    identity: String,
    period_label: String,
}

impl<'a> Composer<'a> {
    fn new(statement: &'a Statement, brand: &'a str) -> Self {
        Self {
            statement,
            normalizer: CurrencyNormalizer::new(&statement.exchange_rate),
            brand,
            identity: statement.customer.identity_line(),
            period_label: statement.period.range_label(),
        }
    }

    fn cover(&self, surface: &mut dyn Surface) {
        let (width, height) = surface.page_size();
        surface.set_fill_color(theme::BRAND);
        surface.fill_rect(0.0, 0.0, width, height);

        surface.set_font(Font::Bold, COVER_MARK_SIZE);
        surface.set_fill_color(theme::TEXT_ON_BRAND);
        surface.text(self.brand, COVER_MARK.0, COVER_MARK.1, TextOptions::single_line());

        surface.set_font(Font::Bold, 48.0);
        let centered = TextOptions::boxed(width, Align::Center);
        surface.text("Estado de", 0.0, 280.0, centered);
        surface.text("cuenta", 0.0, 320.0, centered);

        surface.set_font(Font::Bold, 32.0);
        surface.set_fill_color(theme::ACCENT);
        let month_line = format!(
            "{} {}",
            self.statement.period.month_name(),
            self.statement.year()
        );
        surface.text(&month_line, 0.0, 390.0, centered);
    }

    /// Brand mark, customer identity and reporting period along the top edge
    fn watermark(&self, surface: &mut dyn Surface) {
        let (width, _) = surface.page_size();

        surface.set_font(Font::Bold, WATERMARK_MARK_SIZE);
        surface.set_fill_color(theme::BRAND);
        surface.text(
            self.brand,
            WATERMARK_MARK_X,
            WATERMARK_MARK_Y,
            TextOptions::single_line(),
        );

        surface.set_font(Font::Regular, WATERMARK_TEXT_SIZE);
        surface.set_fill_color(theme::TEXT);
        let date_x = width - WATERMARK_DATE_INSET;
        let identity_x = date_x - surface.text_width(&self.identity) - WATERMARK_SPACING;
        surface.text(
            &self.identity,
            identity_x,
            WATERMARK_TEXT_Y,
            TextOptions::single_line(),
        );
        surface.text(
            &self.period_label,
            date_x,
            WATERMARK_TEXT_Y,
            TextOptions::single_line(),
        );
    }

    fn decorate(&self, surface: &mut dyn Surface) -> Result<(), EeccError> {
        self.watermark(surface);
        Ok(())
    }

    fn title(&self, surface: &mut dyn Surface, text: &str, y: f64) {
        let (width, _) = surface.page_size();
        surface.set_font(Font::Bold, TITLE_SIZE);
        surface.set_fill_color(theme::BRAND);
        surface.text(text, TITLE_X, y, TextOptions::boxed(width, Align::Left));
    }

    fn content_page(&self, surface: &mut dyn Surface, title: &str) -> Result<(), EeccError> {
        surface.add_page()?;
        self.watermark(surface);
        self.title(surface, title, TITLE_Y);
        Ok(())
    }

    fn summary(&self, surface: &mut dyn Surface) -> Result<(), EeccError> {
        self.content_page(surface, SUMMARY_TITLE)?;
        let (width, height) = surface.page_size();

        let rows: Vec<Row> = self
            .statement
            .resume
            .iter()
            .enumerate()
            .map(|(i, fund)| {
                Row::new(
                    RowRole::Data,
                    vec![
                        (i + 1).to_string(),
                        fund.name.clone(),
                        fund.currency.code().to_string(),
                        format_amount(fund.saves),
                        format_amount(fund.contribution),
                        fund.profitability.clone(),
                    ],
                )
            })
            .collect();

        let table = Table::new(summary_columns(), TableStyle::default(), width);
        let cursor = table.begin(surface, TABLE_HEADER_Y);
        let cursor = table.draw_rows(surface, cursor, &rows, &mut |s| self.decorate(s))?;
        let cursor = table.finish(cursor);

        let distribution_y = height - DISTRIBUTION_BOTTOM_OFFSET;
        if cursor.y > distribution_y {
            debug!("Summary table reaches the chart area, moving charts to a new page");
            surface.add_page()?;
            self.watermark(surface);
        }
        self.distributions(surface, distribution_y);
        Ok(())
    }

    fn distributions(&self, surface: &mut dyn Surface, y: f64) {
        let (width, height) = surface.page_size();
        let half = (width - DISTRIBUTION_MARGIN * 2.0) / 2.0;
        let holdings = &self.statement.current_snapshot.portfolio;

        surface.set_font(Font::Bold, DISTRIBUTION_TITLE_SIZE);
        surface.set_fill_color(theme::BRAND);
        let title_y = y + 9.0;
        surface.text(
            "Distribución por moneda",
            DISTRIBUTION_MARGIN,
            title_y,
            TextOptions::boxed(half, Align::Center),
        );
        surface.text(
            "Distribución por fondo",
            DISTRIBUTION_MARGIN + half,
            title_y,
            TextOptions::boxed(half, Align::Center),
        );

        let chart_y = y + DISTRIBUTION_BAR_HEIGHT + PIE_OFFSET_Y;
        let left_x = DISTRIBUTION_MARGIN + half / 2.0 - PIE_SHIFT_X;
        let right_x = DISTRIBUTION_MARGIN + half + half / 2.0 - PIE_SHIFT_X;
        let legend_area = |right: f64| LegendArea {
            top: y + DISTRIBUTION_BAR_HEIGHT,
            bottom: height - DISTRIBUTION_MARGIN,
            right,
        };

        pie::draw_pie(
            surface,
            &by_currency(holdings, &self.normalizer),
            &theme::CURRENCY_PALETTE,
            left_x,
            chart_y,
            PIE_RADIUS,
            &legend_area(DISTRIBUTION_MARGIN + half),
        );
        pie::draw_pie(
            surface,
            &by_fund(holdings, &self.normalizer),
            &theme::FUND_PALETTE,
            right_x,
            chart_y,
            PIE_RADIUS,
            &legend_area(width - DISTRIBUTION_MARGIN),
        );
    }

    fn position_rows(&self, snapshot: &PortfolioHistory) -> Vec<Row> {
        let groups: Vec<RowGroup> = currency_groups(snapshot.portfolio.invested_funds())
            .into_iter()
            .map(|(currency, funds)| {
                let mut total = Decimal::ZERO;
                let mut total_usd = Decimal::ZERO;
                let rows = funds
                    .iter()
                    .map(|fund| {
                        let amount = fund.balance.amount;
                        let usd = self.normalizer.to_usd(amount, &fund.balance.currency);
                        total += amount;
                        total_usd += usd;
                        vec![
                            fund.display_id(),
                            snapshot.formatted_date.clone(),
                            or_dash(fund.balance.shares.map(format_shares)),
                            or_dash(unit_price(fund).map(format_shares)),
                            format_amount(amount),
                            format_amount(usd),
                        ]
                    })
                    .collect();

                RowGroup {
                    title: group_title(&currency),
                    rows,
                    total_label: group_total_label(&currency),
                    totals: vec![
                        String::new(),
                        String::new(),
                        String::new(),
                        String::new(),
                        format_amount(total),
                        format_amount(total_usd),
                    ],
                }
            })
            .collect();

        grouped_rows(&groups)
    }

    fn positions(&self, surface: &mut dyn Surface) -> Result<(), EeccError> {
        self.content_page(surface, POSITIONS_TITLE)?;
        let (width, height) = surface.page_size();
        let table = Table::new(position_columns(), TableStyle::default(), width);

        let rows = self.position_rows(&self.statement.current_snapshot);
        let cursor = table.begin(surface, TABLE_HEADER_Y);
        let cursor = table.draw_rows(surface, cursor, &rows, &mut |s| self.decorate(s))?;
        let cursor = table.finish(cursor);

        let Some(prior) = &self.statement.prior_snapshot else {
            return Ok(());
        };

        let prior_rows = self.position_rows(prior);
        let title_y = cursor.y + SECTION_SPACING;
        let header_y = title_y + SECTION_TITLE_HEIGHT;
        let needed = table.height_with_rows(MIN_CONTINUATION_ROWS.min(prior_rows.len()));
        let header_y = if header_y + needed <= height - table.style().bottom_margin {
            self.title(surface, PRIOR_POSITIONS_TITLE, title_y);
            header_y
        } else {
            self.content_page(surface, PRIOR_POSITIONS_TITLE)?;
            TABLE_HEADER_Y
        };

        let cursor = table.begin(surface, header_y);
        let cursor = table.draw_rows(surface, cursor, &prior_rows, &mut |s| self.decorate(s))?;
        table.finish(cursor);
        Ok(())
    }

    fn transactions(&self, surface: &mut dyn Surface) -> Result<(), EeccError> {
        self.content_page(surface, TRANSACTIONS_TITLE)?;
        let (width, _) = surface.page_size();

        if self.statement.transactions.is_empty() {
            surface.set_font(Font::Regular, 10.0);
            surface.set_fill_color(theme::TEXT);
            surface.text(
                NO_TRANSACTIONS,
                TITLE_X,
                TABLE_HEADER_Y,
                TextOptions::boxed(width - TITLE_X * 2.0, Align::Left),
            );
            return Ok(());
        }

        let rows: Vec<Row> = self
            .statement
            .transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| {
                let role = if i % 2 == 0 {
                    RowRole::Striped
                } else {
                    RowRole::Plain
                };
                Row::new(
                    role,
                    vec![
                        format_date(tx.creation_date),
                        or_dash(tx.price_date.map(format_date)),
                        tx.fund_label(),
                        tx.transaction_type().label().to_string(),
                        or_dash(tx.shares.map(format_shares)),
                        or_dash(tx.price.map(format_shares)),
                        or_dash(tx.currency.as_ref().map(|c| c.code().to_string())),
                        format_amount(tx.amount),
                    ],
                )
            })
            .collect();

        let table = Table::new(transaction_columns(), transaction_style(), width);
        let cursor = table.begin(surface, TABLE_HEADER_Y);
        let cursor = table.draw_rows(surface, cursor, &rows, &mut |s| self.decorate(s))?;
        let cursor = table.finish(cursor);
        debug!(
            "Transactions table: {} rows, {} page breaks",
            cursor.rows_drawn, cursor.page_breaks
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FundBalance;
    use rust_decimal_macros::dec;

    fn fund(id: &str, currency: Currency) -> Fund {
        Fund {
            id: id.to_string(),
            name: None,
            series: None,
            currency: currency.clone(),
            balance: FundBalance {
                amount: dec!(10),
                currency,
                shares: Some(dec!(4)),
            },
            available_balance: None,
            cost_basis: None,
            share_price: None,
            returns: None,
        }
    }

    #[test]
    fn test_currency_groups_order() {
        let funds = vec![
            fund("eur1", Currency::Other("EUR".to_string())),
            fund("pen1", Currency::Pen),
            fund("usd1", Currency::Usd),
            fund("pen2", Currency::Pen),
        ];
        let groups = currency_groups(funds.iter());
        let order: Vec<_> = groups
            .iter()
            .map(|(c, members)| (c.code().to_string(), members.len()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("USD".to_string(), 1),
                ("PEN".to_string(), 2),
                ("EUR".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_currency_groups_drop_empty() {
        let funds = vec![fund("pen1", Currency::Pen)];
        let groups = currency_groups(funds.iter());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, Currency::Pen);
    }

    #[test]
    fn test_group_labels() {
        assert_eq!(group_title(&Currency::Usd), "$ (USD)");
        assert_eq!(group_title(&Currency::Pen), "S/. (PEN)");
        assert_eq!(group_total_label(&Currency::Pen), "Gran total S/.");
        assert_eq!(
            group_total_label(&Currency::Other("EUR".to_string())),
            "Gran total EUR"
        );
    }

    #[test]
    fn test_unit_price_falls_back_to_balance_over_shares() {
        let mut f = fund("usd1", Currency::Usd);
        assert_eq!(unit_price(&f), Some(dec!(2.5)));
        f.share_price = Some(dec!(3));
        assert_eq!(unit_price(&f), Some(dec!(3)));
        f.share_price = None;
        f.balance.shares = Some(Decimal::ZERO);
        assert_eq!(unit_price(&f), None);
    }
}
