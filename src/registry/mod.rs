//! RPPS registry: bulk import of the official extraction, identity
//! resolution and name search, and active/deregistered classification.
//!
//! The registry lives in its own SQLite file, opened with
//! [`open_registry`](crate::db::open_registry).

pub mod import;
pub mod matcher;
pub mod status;

use std::path::PathBuf;

use thiserror::Error;

use crate::db::DatabaseError;

pub use import::{
    import_registry, quality_report, store_import_document, ImportReport, QualityReport,
    RPPS_SOURCE_URL,
};
pub use matcher::{
    get_by_id, is_valid_rpps, search_by_name, FuzzyMatcher, NameMatchStrategy,
    SubstringMatcher, DEFAULT_MATCH_SCORE,
};
pub use status::{classify_status, validate_for_use, StatusReport};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
