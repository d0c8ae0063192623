//! Error types for cmdforge.
//!
//! The query, render and accumulator operations are total and never fail.
//! Errors only arise at the edges: reading a catalog or config file, and
//! the integrity pass run over a freshly loaded catalog.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate subcategory id '{subcategory}' in category '{category}'")]
    DuplicateSubcategory {
        category: String,
        subcategory: String,
    },

    #[error("Duplicate template id: {0}")]
    DuplicateTemplate(String),

    #[error("Template '{template}' references unknown category '{category}'")]
    UnknownCategory { template: String, category: String },

    #[error(
        "Template '{template}' references subcategory '{subcategory}' which is not in category '{category}'"
    )]
    UnknownSubcategory {
        template: String,
        category: String,
        subcategory: String,
    },

    #[error("Template '{template}' lists extra option '{param}' more than once")]
    DuplicateExtraOption { template: String, param: String },
}

impl CatalogError {
    /// True for integrity violations, false for I/O and syntax problems
    pub fn is_integrity(&self) -> bool {
        !matches!(self, CatalogError::Io { .. } | CatalogError::Parse(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raised by a clipboard backend when the text could not be written
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
