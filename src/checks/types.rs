use chrono::NaiveDate;
use serde::Serialize;

pub const FLAG_OK_REPLACED: &str = "OK_REPLACED";
pub const FLAG_QUOTE_DELETED_NO_INVOICE: &str = "QUOTE_DELETED_NO_INVOICE";
pub const FLAG_MATERIAL_MISMATCH: &str = "MATERIAL_MISMATCH";
pub const FLAG_DELETED_PROSTHESIS: &str = "DELETED_PROSTHESIS";
pub const FLAG_INSURANCE_DOC_MISSING: &str = "INSURANCE_DOC_MISSING";
pub const FLAG_DUPLICATE_AFTER_DELETION: &str = "DUPLICATE_AFTER_DELETION";

/// Material reading when OCR fails or finds no vocabulary term.
pub const MATERIAL_UNKNOWN: &str = "unknown";

/// Deleted quote joined to its latest replacement invoice, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedQuoteFlowRow {
    pub quote_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub code: String,
    pub quote_date: Option<NaiveDate>,
    pub scan_path: Option<String>,
    pub invoice_no: Option<String>,
    pub fse_no: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub flag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialMismatchRow {
    pub patient_id: String,
    pub quote_id: String,
    pub declared_material: String,
    pub lab_material: String,
    pub doc_path: String,
    pub flag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedProsthesisRow {
    pub patient_id: String,
    pub doctor_name: String,
    pub code: String,
    pub label: String,
    pub date: Option<NaiveDate>,
    pub source_file: String,
    pub flag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsuranceDocRow {
    pub patient_id: String,
    pub quote_id: String,
    pub invoice_id: String,
    /// Comma-joined missing categories: "insurance_card", "pec_or_claim".
    pub missing_type: String,
    pub flag: &'static str,
}

/// Quote recreated after an earlier identical one was deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateQuoteRow {
    pub patient_id: String,
    pub doctor_id: String,
    pub code: String,
    pub tooth_number: String,
    pub material: String,
    pub new_quote_date: Option<NaiveDate>,
    pub deleted_quote_id: String,
    pub duplicate_quote_id: String,
    pub flag: &'static str,
}

/// Aggregated output of one full validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub deleted_quotes: Vec<DeletedQuoteFlowRow>,
    pub material_mismatches: Vec<MaterialMismatchRow>,
    pub deleted_prostheses: Vec<DeletedProsthesisRow>,
    pub missing_insurance_docs: Vec<InsuranceDocRow>,
    pub recreated_quotes: Vec<DuplicateQuoteRow>,
}

impl ValidationReport {
    /// Rows that need review. OK_REPLACED rows are informational and
    /// excluded from the count.
    pub fn issue_count(&self) -> usize {
        let unreplaced = self
            .deleted_quotes
            .iter()
            .filter(|r| r.flag != FLAG_OK_REPLACED)
            .count();

        unreplaced
            + self.material_mismatches.len()
            + self.deleted_prostheses.len()
            + self.missing_insurance_docs.len()
            + self.recreated_quotes.len()
    }
}
