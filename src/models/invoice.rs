use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An issued invoice line, identified by (invoice_no, code). Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_no: Option<String>,
    pub date: NaiveDate,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub doctor_id: String,
    pub doctor_name: String,
    pub code: String,
    pub qty: i64,
    pub amount: f64,
    pub fse_no: Option<String>,
    pub source_file: String,
}

impl InvoiceRecord {
    /// Whether this line counts as actually billed: an invoice number or an
    /// FSE transaction number must be present and non-blank.
    pub fn has_billing_ref(&self) -> bool {
        fn filled(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        filled(&self.invoice_no) || filled(&self.fse_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(invoice_no: Option<&str>, fse_no: Option<&str>) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: invoice_no.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            patient_id: "P001".into(),
            patient_name: None,
            doctor_id: "D001".into(),
            doctor_name: "Dr Martin".into(),
            code: "HBLD038".into(),
            qty: 1,
            amount: 450.0,
            fse_no: fse_no.map(str::to_string),
            source_file: "invoices.csv".into(),
        }
    }

    #[test]
    fn billing_ref_requires_invoice_or_fse_number() {
        assert!(invoice(Some("INV1"), None).has_billing_ref());
        assert!(invoice(None, Some("FSE9")).has_billing_ref());
        assert!(invoice(Some("INV1"), Some("FSE9")).has_billing_ref());
        assert!(!invoice(None, None).has_billing_ref());
        assert!(!invoice(Some(""), Some("  ")).has_billing_ref());
    }
}
