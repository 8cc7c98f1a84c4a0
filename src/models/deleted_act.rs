use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A removed/voided billing act, as exported by the practice software.
/// Append-only; the date may be absent in old exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedActRecord {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub doctor_id: String,
    pub doctor_name: String,
    pub code: String,
    pub label: String,
    pub amount: f64,
    pub source_file: String,
}

/// A deleted act about to be inserted; the store assigns the row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeletedAct {
    pub date: Option<NaiveDate>,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub doctor_id: String,
    pub doctor_name: String,
    pub code: String,
    pub label: String,
    pub amount: f64,
    pub source_file: String,
}
