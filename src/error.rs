//! Error handling for statement generation
//!
//! Defines the error taxonomy shared by the lookup collaborators, the
//! calculators and the renderer, and keeps the anyhow-based Result alias used
//! by the orchestration layers for context chaining.

use thiserror::Error;

/// Core error types for statement generation
#[derive(Error, Debug)]
pub enum EeccError {
    /// A required record does not exist in the upstream store.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A value used in a ratio is zero or missing.
    #[error("data quality issue: {0}")]
    DataQuality(String),

    /// A collaborator failed for a reason other than absence.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl EeccError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        EeccError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EeccError::NotFound { .. })
    }
}

impl From<rusqlite::Error> for EeccError {
    fn from(err: rusqlite::Error) -> Self {
        EeccError::Upstream(format!("database: {}", err))
    }
}

impl From<serde_json::Error> for EeccError {
    fn from(err: serde_json::Error) -> Self {
        EeccError::Upstream(format!("malformed record: {}", err))
    }
}

/// Result type alias for orchestration code
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = EeccError::not_found("customer", "c-1");
        assert_eq!(err.to_string(), "customer not found: c-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_anyhow_context_keeps_variant() {
        use anyhow::Context;
        let result: Result<()> = Err(EeccError::not_found("exchange rate", "2025-10-31"))
            .context("failed to assemble statement");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to assemble statement"));
        let inner = err.downcast_ref::<EeccError>().expect("variant lost");
        assert!(inner.is_not_found());
    }

    #[test]
    fn test_error_variants() {
        let dq = EeccError::DataQuality("zero rate".to_string());
        assert!(dq.to_string().starts_with("data quality issue"));

        let up = EeccError::Upstream("timeout".to_string());
        assert!(up.to_string().starts_with("upstream error"));
        assert!(!up.is_not_found());
    }

    #[test]
    fn test_sqlite_errors_map_to_upstream() {
        let err: EeccError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, EeccError::Upstream(_)));
    }
}
