//! Command dispatcher that routes parsed CLI commands to their handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::formatters::{format_summary_json, format_summary_table, StatementSummary};
use crate::cli::{Commands, StatementArgs};
use crate::config::Config;
use crate::db::{self, FixtureBundle, SqliteStore};
use crate::models::{Period, Statement};
use crate::render::pdf::PdfSurface;
use crate::render::recording::RecordingSurface;
use crate::render::{compose, Surface};
use crate::reports::assemble;

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Init => dispatch_init(config),
        Commands::Seed { file } => dispatch_seed(config, &file),
        Commands::Generate {
            target,
            output,
            dry_run,
        } => dispatch_generate(config, &target, output, dry_run).await,
        Commands::Summary { target, json } => dispatch_summary(config, &target, json).await,
    }
}

fn dispatch_init(config: &Config) -> Result<()> {
    db::init_database(&config.database)?;
    println!(
        "{} Database ready at {}",
        "✓".green().bold(),
        config.database.display()
    );
    Ok(())
}

fn dispatch_seed(config: &Config, file: &Path) -> Result<()> {
    let bundle = FixtureBundle::from_file(file)?;
    let store = SqliteStore::open(&config.database)?;
    let counts = store.seed(&bundle)?;

    println!("{} Seed complete!", "✓".green().bold());
    println!("  Customers: {}", counts.customers.to_string().green());
    println!("  Portfolios: {}", counts.portfolios.to_string().green());
    println!("  Snapshots: {}", counts.snapshots.to_string().green());
    println!("  Exchange rates: {}", counts.exchange_rates.to_string().green());
    println!("  Fund prices: {}", counts.fund_prices.to_string().green());
    println!("  Transactions: {}", counts.transactions.to_string().green());
    Ok(())
}

async fn load_statement(config: &Config, target: &StatementArgs) -> Result<Statement> {
    let period = Period::new(target.year, target.month)?;
    let store = SqliteStore::open(&config.database)?.with_page_size(config.transactions_page_size);
    assemble(&store, &target.customer, period).await
}

/// Default file name for a statement, e.g. `eecc-c-100-2025-10.pdf`
pub fn default_output_path(config: &Config, customer_id: &str, period: Period) -> PathBuf {
    config
        .output_dir
        .join(format!("eecc-{}-{}.pdf", customer_id, period))
}

/// Render `statement` into PDF bytes
pub fn render_pdf(statement: &Statement, brand: &str) -> Result<Vec<u8>> {
    let title = format!(
        "Estado de cuenta {} {}",
        statement.period,
        statement.customer.display_name()
    );
    let mut surface = PdfSurface::new(&title)?;
    compose(&mut surface, statement, brand)?;

    let mut bytes = Vec::new();
    surface.finish(&mut bytes)?;
    Ok(bytes)
}

async fn dispatch_generate(
    config: &Config,
    target: &StatementArgs,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    info!(
        "Generating statement for {} {}-{:02}",
        target.customer, target.year, target.month
    );
    let statement = load_statement(config, target).await?;

    if dry_run {
        let mut surface = RecordingSurface::new();
        compose(&mut surface, &statement, &config.brand)?;
        println!(
            "{} Statement laid out on {} pages",
            "✓".green().bold(),
            surface.page_count()
        );
        println!("\n{} Dry run - no file written", "ℹ".blue().bold());
        return Ok(());
    }

    // Nothing touches the disk until the whole document rendered
    let bytes = render_pdf(&statement, &config.brand)?;

    let path =
        output.unwrap_or_else(|| default_output_path(config, &target.customer, statement.period));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {:?}", path))?;

    println!(
        "{} Statement written to {} ({} bytes)",
        "✓".green().bold(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

async fn dispatch_summary(config: &Config, target: &StatementArgs, json: bool) -> Result<()> {
    let statement = load_statement(config, target).await?;
    let summary = StatementSummary::from_statement(&statement);

    if json {
        println!("{}", format_summary_json(&summary));
    } else {
        print!("{}", format_summary_table(&summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn config(dir: &Path) -> Config {
        Config {
            env: Environment::Test,
            database: dir.join("eecc.db"),
            output_dir: dir.join("out"),
            brand: "blum".to_string(),
            transactions_page_size: 2,
        }
    }

    fn seed(config: &Config) {
        let bundle = crate::db::fixtures::sample_bundle();
        SqliteStore::open(&config.database)
            .unwrap()
            .seed(&bundle)
            .unwrap();
    }

    fn october(customer: &str) -> StatementArgs {
        StatementArgs {
            customer: customer.to_string(),
            year: 2025,
            month: 10,
        }
    }

    #[test]
    fn test_default_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let period = Period::new(2025, 10).unwrap();
        assert_eq!(
            default_output_path(&config, "c-100", period),
            dir.path().join("out").join("eecc-c-100-2025-10.pdf")
        );
    }

    #[tokio::test]
    async fn test_generate_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        seed(&config);

        dispatch_generate(&config, &october("c-100"), None, false)
            .await
            .unwrap();

        let path = dir.path().join("out").join("eecc-c-100-2025-10.pdf");
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        seed(&config);

        let result = dispatch_generate(&config, &october("c-200"), None, false).await;
        assert!(result.is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_missing_portfolio_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        seed(&config);

        let err = dispatch_generate(&config, &october("c-300"), None, false)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("portfolio not found"));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        seed(&config);

        dispatch_generate(&config, &october("c-100"), None, true)
            .await
            .unwrap();
        assert!(!dir.path().join("out").exists());
    }
}
