use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::DocType;

/// An indexed scanned document (lab sheet, signed quote, PEC, insurance
/// card/claim). Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub patient_id: String,
    pub doc_type: DocType,
    pub file_path: String,
    pub date: NaiveDate,
}
