use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::QuoteStatus;

/// A treatment quote line, identified by (quote_id, code). Status changes
/// arrive through re-import, never computed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub quote_id: String,
    pub status: QuoteStatus,
    pub date: Option<NaiveDate>,
    pub patient_id: String,
    pub doctor_id: String,
    pub code: String,
    pub amount: f64,
    pub declared_material: String,
    pub tooth_number: String,
    pub source_file: String,
}
