//! Runtime configuration
//!
//! Values come from a TOML file (`--config <path>` or
//! `<config_home>/eecc/config.toml`) and are then overridden by the `EECC_ENV`,
//! `EECC_DB` and `EECC_OUTPUT_DIR` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::db::DEFAULT_PAGE_SIZE;
use crate::error::EeccError;

pub const ENV_VAR: &str = "EECC_ENV";
pub const DB_VAR: &str = "EECC_DB";
pub const OUTPUT_DIR_VAR: &str = "EECC_OUTPUT_DIR";

const DEFAULT_BRAND: &str = "blum";

/// Deployment environment; selects the default database file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
    Sandbox,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
            Environment::Sandbox => "sandbox",
            Environment::Test => "test",
        }
    }
}

impl FromStr for Environment {
    type Err = EeccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            "sandbox" => Ok(Environment::Sandbox),
            "test" => Ok(Environment::Test),
            other => Err(EeccError::Config(format!("unknown environment: {}", other))),
        }
    }
}

/// Config file contents; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub env: Option<String>,
    pub database: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub brand: Option<String>,
    pub transactions_page_size: Option<usize>,
}

impl FileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration file")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub env: Environment,
    pub database: PathBuf,
    pub output_dir: PathBuf,
    /// Mark printed on the cover and on every page header
    pub brand: String,
    pub transactions_page_size: usize,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("eecc").join("config.toml"))
    }

    /// Load from `path` (must exist) or from the default location (optional),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(read_file(path)?),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Some(read_file(&path)?),
                None => None,
            },
        };

        Self::resolve(file.unwrap_or_default(), |name| std::env::var(name).ok())
    }

    /// Merge file values with overrides looked up through `env`
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_name = env(ENV_VAR).or(file.env);
        let environment = match env_name {
            Some(name) => name.parse::<Environment>()?,
            None => Environment::default(),
        };

        let database = match env(DB_VAR).map(PathBuf::from).or(file.database) {
            Some(path) => path,
            None => default_database(environment)?,
        };

        let output_dir = env(OUTPUT_DIR_VAR)
            .map(PathBuf::from)
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let transactions_page_size = file.transactions_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if transactions_page_size == 0 {
            return Err(EeccError::Config("transactions_page_size must be positive".to_string()).into());
        }

        let config = Config {
            env: environment,
            database,
            output_dir,
            brand: file.brand.unwrap_or_else(|| DEFAULT_BRAND.to_string()),
            transactions_page_size,
        };
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration at {:?}", path))?;
    FileConfig::from_toml_str(&content).with_context(|| format!("In {:?}", path))
}

fn default_database(env: Environment) -> Result<PathBuf> {
    let data_home = dir_spec::data_home()
        .ok_or_else(|| EeccError::Config("could not determine data directory".to_string()))?;
    Ok(data_home
        .join("eecc")
        .join(format!("eecc-{}.db", env.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_file_values() {
        let file = FileConfig::from_toml_str(
            r#"
            env = "sandbox"
            database = "/tmp/eecc.db"
            output_dir = "/tmp/out"
            brand = "acme"
            transactions_page_size = 25
            "#,
        )
        .unwrap();
        let config = Config::resolve(file, lookup(&[])).unwrap();
        assert_eq!(config.env, Environment::Sandbox);
        assert_eq!(config.database, PathBuf::from("/tmp/eecc.db"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.brand, "acme");
        assert_eq!(config.transactions_page_size, 25);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig::from_toml_str("env = \"dev\"\ndatabase = \"a.db\"").unwrap();
        let config = Config::resolve(
            file,
            lookup(&[("EECC_ENV", "PROD"), ("EECC_DB", "b.db"), ("EECC_OUTPUT_DIR", "out")]),
        )
        .unwrap();
        assert_eq!(config.env, Environment::Prod);
        assert_eq!(config.database, PathBuf::from("b.db"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.brand, "blum");
        assert_eq!(config.transactions_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let err = Config::resolve(
            FileConfig::default(),
            lookup(&[("EECC_ENV", "staging"), ("EECC_DB", "x.db")]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EeccError>(),
            Some(EeccError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(FileConfig::from_toml_str("colour = \"red\"").is_err());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let file = FileConfig::from_toml_str("transactions_page_size = 0").unwrap();
        assert!(Config::resolve(file, lookup(&[("EECC_DB", "x.db")])).is_err());
    }
}
