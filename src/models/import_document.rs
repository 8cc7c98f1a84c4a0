use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance record for one registry source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDocument {
    pub file_name: String,
    pub file_size_mb: f64,
    pub sha256: String,
    pub import_date: NaiveDate,
}
