//! Output formatting module for CLI display
//!
//! Statement figures are gathered into a [`StatementSummary`] first, then
//! rendered as terminal tables or JSON.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::models::{FundResume, Statement};
use crate::reports::{by_currency, by_fund, CurrencyNormalizer, Share};
use crate::utils::{format_money, format_percent};

/// Figures shown by `eecc summary`
#[derive(Debug, Clone, Serialize)]
pub struct StatementSummary {
    pub customer: String,
    pub period: String,
    pub snapshot_date: String,
    pub exchange_rate: Decimal,
    pub resume: Vec<FundResume>,
    pub currency_distribution: Vec<Share>,
    pub fund_distribution: Vec<Share>,
    pub transactions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<String>,
}

impl StatementSummary {
    pub fn from_statement(statement: &Statement) -> Self {
        let normalizer = CurrencyNormalizer::new(&statement.exchange_rate);
        let holdings = &statement.current_snapshot.portfolio;

        Self {
            customer: statement.customer.identity_line(),
            period: statement.period.to_string(),
            snapshot_date: statement.current_snapshot.formatted_date.clone(),
            exchange_rate: normalizer.pen_per_usd(),
            resume: statement.resume.clone(),
            currency_distribution: by_currency(holdings, &normalizer),
            fund_distribution: by_fund(holdings, &normalizer),
            transactions: statement.transactions.len(),
            data_quality: normalizer.issue().map(|issue| issue.message.clone()),
        }
    }
}

pub fn format_summary_json(summary: &StatementSummary) -> String {
    serde_json::to_string_pretty(summary)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

#[derive(Tabled)]
struct ResumeRow {
    #[tabled(rename = "N°")]
    number: usize,
    #[tabled(rename = "Fondo")]
    name: String,
    #[tabled(rename = "Moneda")]
    currency: String,
    #[tabled(rename = "Ahorros")]
    saves: String,
    #[tabled(rename = "Aporte")]
    contribution: String,
    #[tabled(rename = "Rentabilidad")]
    profitability: String,
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Distribución")]
    label: String,
    #[tabled(rename = "%")]
    value: String,
}

fn share_table(shares: &[Share]) -> String {
    let rows: Vec<ShareRow> = shares
        .iter()
        .map(|s| ShareRow {
            label: s.label.clone(),
            value: format_percent(s.value),
        })
        .collect();
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

/// Format a statement summary for terminal table output
pub fn format_summary_table(summary: &StatementSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {}\n",
        "Estado de cuenta".bold(),
        summary.period.cyan()
    ));
    output.push_str(&format!("{}\n", summary.customer));
    output.push_str(&format!(
        "Snapshot: {}   Tipo de cambio: {}\n\n",
        summary.snapshot_date, summary.exchange_rate
    ));

    let rows: Vec<ResumeRow> = summary
        .resume
        .iter()
        .enumerate()
        .map(|(i, r)| ResumeRow {
            number: i + 1,
            name: r.name.clone(),
            currency: r.currency.code().to_string(),
            saves: format_money(r.saves, &r.currency),
            contribution: format_money(r.contribution, &r.currency),
            profitability: r.profitability.clone(),
        })
        .collect();

    if rows.is_empty() {
        output.push_str("No funds in portfolio\n");
    } else {
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
            .to_string();
        output.push_str(&table);
        output.push('\n');
    }

    output.push_str(&format!("\n{}\n", "Por moneda".bold()));
    output.push_str(&share_table(&summary.currency_distribution));
    output.push('\n');

    if !summary.fund_distribution.is_empty() {
        output.push_str(&format!("\n{}\n", "Por fondo".bold()));
        output.push_str(&share_table(&summary.fund_distribution));
        output.push('\n');
    }

    output.push_str(&format!(
        "\nTransacciones (últimos 3 meses): {}\n",
        summary.transactions
    ));

    if let Some(issue) = &summary.data_quality {
        output.push_str(&format!("{} {}\n", "⚠".yellow().bold(), issue));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use rust_decimal_macros::dec;

    fn summary() -> StatementSummary {
        StatementSummary {
            customer: "DNI 45678912 - Ana Lucia Rojas Diaz".to_string(),
            period: "2025-10".to_string(),
            snapshot_date: "2025-10-31".to_string(),
            exchange_rate: dec!(3.53),
            resume: vec![FundResume {
                name: "usa500USD SERIES_B".to_string(),
                currency: Currency::Usd,
                saves: dec!(1100),
                contribution: dec!(1000),
                profitability: "10.00%".to_string(),
            }],
            currency_distribution: vec![
                Share {
                    label: "USD".to_string(),
                    value: dec!(100),
                },
                Share {
                    label: "PEN".to_string(),
                    value: dec!(0),
                },
            ],
            fund_distribution: vec![],
            transactions: 3,
            data_quality: None,
        }
    }

    #[test]
    fn test_table_output() {
        colored::control::set_override(false);
        let out = format_summary_table(&summary());
        assert!(out.contains("usa500USD SERIES_B"));
        assert!(out.contains("$ 1,100.00"));
        assert!(out.contains("10.00%"));
        assert!(out.contains("100.00%"));
        assert!(out.contains("Transacciones (últimos 3 meses): 3"));
        assert!(!out.contains("Por fondo"));
    }

    #[test]
    fn test_json_output() {
        let json = format_summary_json(&summary());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["period"], "2025-10");
        assert_eq!(value["resume"][0]["profitability"], "10.00%");
        assert_eq!(value["currency_distribution"][1]["label"], "PEN");
        assert!(value.get("data_quality").is_none());
    }
}
