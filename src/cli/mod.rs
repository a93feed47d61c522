use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "eecc")]
#[command(version, about = "Monthly account statements for investment portfolios")]
#[command(
    long_about = "Generate the monthly account statement (EECC) of a customer's investment portfolio as a PDF: portfolio summary, currency and fund distribution charts, positions for the month and the month before, and the last three months of transactions."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the statement database
    Init,

    /// Load customers, portfolios, snapshots, rates, prices and transactions
    /// from a JSON fixture bundle
    Seed {
        /// Path to the JSON bundle
        file: PathBuf,
    },

    /// Render the statement PDF for a customer and month
    Generate {
        #[command(flatten)]
        target: StatementArgs,

        /// Output file (default: <output_dir>/eecc-<customer>-<yyyy-mm>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lay out the document without writing a file
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the figures of a statement without rendering it
    Summary {
        #[command(flatten)]
        target: StatementArgs,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatementArgs {
    /// Customer id
    #[arg(short, long)]
    pub customer: String,

    /// Statement year (e.g., 2025)
    #[arg(short, long)]
    pub year: i32,

    /// Statement month, 1-12
    #[arg(short, long)]
    pub month: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "eecc", "--no-color", "generate", "--customer", "c-100", "--year", "2025", "--month",
            "10", "--dry-run",
        ])
        .unwrap();
        assert!(cli.no_color);
        match cli.command {
            Commands::Generate {
                target,
                output,
                dry_run,
            } => {
                assert_eq!(target.customer, "c-100");
                assert_eq!(target.year, 2025);
                assert_eq!(target.month, 10);
                assert!(output.is_none());
                assert!(dry_run);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["eecc", "init", "-v", "--config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_missing_customer_is_rejected() {
        assert!(Cli::try_parse_from(["eecc", "summary", "--year", "2025", "--month", "1"]).is_err());
    }
}
