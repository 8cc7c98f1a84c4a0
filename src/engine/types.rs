use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ComplianceStatus, ControlState, ValidationState};

/// Days of slack allowed between a lab-sheet date and the invoice date.
pub const DEFAULT_TOLERANCE_DAYS: i64 = 7;

/// Parameters of one reconciliation run. Start and end are inclusive.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tolerance_days: i64,
}

impl ReconcileOptions {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
        }
    }

    pub fn with_tolerance(mut self, days: i64) -> Self {
        self.tolerance_days = days;
        self
    }
}

/// One classified output row. Serde names carry the French column headers
/// the practice's review spreadsheet expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    #[serde(rename = "Patient")]
    pub patient: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Matériau Devis")]
    pub quote_material: String,
    #[serde(rename = "Matériau Fiche LABO")]
    pub lab_material: String,
    #[serde(rename = "Contrôlé")]
    pub control: ControlState,
    #[serde(rename = "Validé")]
    pub validation: ValidationState,
    #[serde(rename = "Statut")]
    pub status: ComplianceStatus,
}
