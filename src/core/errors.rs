//! PGR-prefixed error types with structured error codes.
//!
//! The engine itself never fails; these errors only come from the edges
//! (configuration, deck loading, terminal and log I/O).

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PgError>;

/// Top-level error type for prompt-grid.
#[derive(Debug, Error)]
pub enum PgError {
    #[error("[PGR-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PGR-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PGR-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PGR-2001] invalid deck: {details}")]
    InvalidDeck { details: String },

    #[error("[PGR-2002] missing deck file: {path}")]
    MissingDeck { path: PathBuf },

    #[error("[PGR-2003] unsupported deck format for {path} (expected .toml or .json)")]
    UnsupportedDeckFormat { path: PathBuf },

    #[error("[PGR-2004] invalid combo {raw:?}: {details}")]
    InvalidCombo { raw: String, details: String },

    #[error("[PGR-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[PGR-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[PGR-3002] terminal failure: {source}")]
    Terminal {
        #[source]
        source: std::io::Error,
    },

    #[error("[PGR-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl PgError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PGR-1001",
            Self::MissingConfig { .. } => "PGR-1002",
            Self::ConfigParse { .. } => "PGR-1003",
            Self::InvalidDeck { .. } => "PGR-2001",
            Self::MissingDeck { .. } => "PGR-2002",
            Self::UnsupportedDeckFormat { .. } => "PGR-2003",
            Self::InvalidCombo { .. } => "PGR-2004",
            Self::Serialization { .. } => "PGR-2101",
            Self::Io { .. } => "PGR-3001",
            Self::Terminal { .. } => "PGR-3002",
            Self::Runtime { .. } => "PGR-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Terminal { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for PgError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for PgError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PgError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
