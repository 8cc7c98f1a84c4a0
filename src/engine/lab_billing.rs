use chrono::Duration;
use rusqlite::Connection;

use crate::db::{DatabaseError, StoreSnapshot};
use crate::models::{ComplianceStatus, ControlState, DocType, ValidationState};

use super::types::{ReconcileOptions, ReconciliationRow};

const PLACEHOLDER: &str = "—";

/// Cross-checks every lab sheet in the requested range against billing.
/// One row per (sheet, prosthetic code) pair, or one per matching invoice
/// when several invoices fall inside the tolerance window.
/// O(n*m) where n = filtered sheets, m = reference codes; bounded for a
/// single practice's reference table.
pub fn run_lab_billing_check(
    snapshot: &StoreSnapshot,
    opts: &ReconcileOptions,
) -> Vec<ReconciliationRow> {
    let sheets: Vec<_> = snapshot
        .scans
        .iter()
        .filter(|s| {
            s.doc_type == DocType::LabSheet && s.date >= opts.start && s.date <= opts.end
        })
        .collect();

    tracing::debug!(
        sheets = sheets.len(),
        codes = snapshot.procedures.len(),
        tolerance_days = opts.tolerance_days,
        "Reconciling lab sheets against billing"
    );

    let mut rows = Vec::new();

    for sheet in &sheets {
        for procedure in &snapshot.procedures {
            let window_start = sheet.date - Duration::days(opts.tolerance_days);
            let window_end = sheet.date + Duration::days(opts.tolerance_days);

            let invoices: Vec<_> = snapshot
                .invoices
                .iter()
                .filter(|inv| {
                    inv.patient_id == sheet.patient_id
                        && inv.code == procedure.code
                        && inv.date >= window_start
                        && inv.date <= window_end
                        && inv.has_billing_ref()
                })
                .collect();

            if !invoices.is_empty() {
                for invoice in invoices {
                    rows.push(ReconciliationRow {
                        patient: or_placeholder(invoice.patient_name.as_deref()),
                        date: sheet.date,
                        quote_material: or_placeholder(Some(&procedure.label)),
                        lab_material: or_placeholder(Some(&procedure.label)),
                        control: ControlState::Controlled,
                        validation: ValidationState::Validated,
                        status: ComplianceStatus::Compliant,
                    });
                }
                continue;
            }

            // No billed invoice in the window. A matching deleted act (any
            // date) explains the gap; otherwise the sheet is unaccounted for.
            let deleted = snapshot
                .deleted_acts
                .iter()
                .find(|act| act.patient_id == sheet.patient_id && act.code == procedure.code);

            let (patient, validation) = match deleted {
                Some(act) => (
                    or_placeholder(act.patient_name.as_deref()),
                    ValidationState::Deleted,
                ),
                None => (PLACEHOLDER.to_string(), ValidationState::Undetermined),
            };

            rows.push(ReconciliationRow {
                patient,
                date: sheet.date,
                quote_material: or_placeholder(Some(&procedure.label)),
                lab_material: or_placeholder(Some(&procedure.label)),
                control: ControlState::NotControlled,
                validation,
                status: ComplianceStatus::Inconsistent,
            });
        }
    }

    tracing::info!(rows = rows.len(), "Lab billing reconciliation complete");
    rows
}

/// Loads the working tables and runs the reconciliation in one call.
pub fn run_from_store(
    conn: &Connection,
    opts: &ReconcileOptions,
) -> Result<Vec<ReconciliationRow>, DatabaseError> {
    let snapshot = StoreSnapshot::load(conn)?;
    Ok(run_lab_billing_check(&snapshot, opts))
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{InvoiceRecord, ProcedureCode, ScanRecord};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn january() -> ReconcileOptions {
        ReconcileOptions::new(date("2023-01-01"), date("2023-01-31"))
    }

    fn crown_code() -> ProcedureCode {
        ProcedureCode {
            code: "HBMD001".into(),
            label: "Crown on molar".into(),
            is_prosthetic: true,
            materials: String::new(),
            basket: String::new(),
        }
    }

    fn sheet(patient_id: &str, day: &str) -> ScanRecord {
        ScanRecord {
            patient_id: patient_id.into(),
            doc_type: DocType::LabSheet,
            file_path: format!("scans/{patient_id}.pdf"),
            date: date(day),
        }
    }

    fn invoice(patient_id: &str, code: &str, day: &str) -> InvoiceRecord {
        InvoiceRecord {
            invoice_no: Some("INV001".into()),
            date: date(day),
            patient_id: patient_id.into(),
            patient_name: Some("John Doe".into()),
            doctor_id: "D001".into(),
            doctor_name: "Dr. Smith".into(),
            code: code.into(),
            qty: 1,
            amount: 150.0,
            fse_no: Some("FSE123".into()),
            source_file: "invoice.csv".into(),
        }
    }

    fn deleted_act(patient_id: &str, code: &str) -> crate::models::DeletedActRecord {
        crate::models::DeletedActRecord {
            id: 1,
            date: Some(date("2023-01-21")),
            patient_id: patient_id.into(),
            patient_name: Some("John Doe".into()),
            doctor_id: "D003".into(),
            doctor_name: "Dr. Smith".into(),
            code: code.into(),
            label: "Molar crown".into(),
            amount: 130.0,
            source_file: "deleted.csv".into(),
        }
    }

    fn snapshot_with(
        scans: Vec<ScanRecord>,
        invoices: Vec<InvoiceRecord>,
        deleted: Vec<crate::models::DeletedActRecord>,
    ) -> StoreSnapshot {
        StoreSnapshot {
            procedures: vec![crown_code()],
            scans,
            invoices,
            deleted_acts: deleted,
            quotes: Vec::new(),
        }
    }

    #[test]
    fn invoice_in_window_is_compliant() {
        let snapshot = snapshot_with(
            vec![sheet("P001", "2023-01-10")],
            vec![invoice("P001", "HBMD001", "2023-01-09")],
            vec![],
        );

        let rows = run_lab_billing_check(&snapshot, &january());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ComplianceStatus::Compliant);
        assert_eq!(rows[0].control, ControlState::Controlled);
        assert_eq!(rows[0].validation, ValidationState::Validated);
        assert_eq!(rows[0].patient, "John Doe");
        assert_eq!(rows[0].quote_material, "Crown on molar");
    }

    #[test]
    fn no_invoice_yields_undetermined_inconsistency() {
        let snapshot = snapshot_with(vec![sheet("P002", "2023-01-15")], vec![], vec![]);

        let rows = run_lab_billing_check(&snapshot, &january());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ComplianceStatus::Inconsistent);
        assert_eq!(rows[0].control, ControlState::NotControlled);
        assert_eq!(rows[0].validation, ValidationState::Undetermined);
        assert_eq!(rows[0].patient, "—");
    }

    #[test]
    fn deleted_act_explains_missing_invoice() {
        let snapshot = snapshot_with(
            vec![sheet("P003", "2023-01-20")],
            vec![],
            vec![deleted_act("P003", "HBMD001")],
        );

        let rows = run_lab_billing_check(&snapshot, &january());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ComplianceStatus::Inconsistent);
        assert_eq!(rows[0].validation, ValidationState::Deleted);
        assert_eq!(rows[0].patient, "John Doe");
    }

    #[test]
    fn tolerance_window_is_inclusive_on_both_edges() {
        for (day, expected) in [
            ("2023-01-03", ComplianceStatus::Compliant),
            ("2023-01-17", ComplianceStatus::Compliant),
            ("2023-01-02", ComplianceStatus::Inconsistent),
            ("2023-01-18", ComplianceStatus::Inconsistent),
        ] {
            let snapshot = snapshot_with(
                vec![sheet("P001", "2023-01-10")],
                vec![invoice("P001", "HBMD001", day)],
                vec![],
            );

            let rows = run_lab_billing_check(&snapshot, &january());
            assert_eq!(rows[0].status, expected, "invoice dated {day}");
        }
    }

    #[test]
    fn invoice_without_billing_reference_does_not_count() {
        let mut inv = invoice("P001", "HBMD001", "2023-01-10");
        inv.invoice_no = None;
        inv.fse_no = Some("  ".into());

        let snapshot = snapshot_with(vec![sheet("P001", "2023-01-10")], vec![inv], vec![]);

        let rows = run_lab_billing_check(&snapshot, &january());
        assert_eq!(rows[0].status, ComplianceStatus::Inconsistent);
    }

    #[test]
    fn each_matching_invoice_gets_its_own_row() {
        let mut second = invoice("P001", "HBMD001", "2023-01-12");
        second.invoice_no = Some("INV002".into());

        let snapshot = snapshot_with(
            vec![sheet("P001", "2023-01-10")],
            vec![invoice("P001", "HBMD001", "2023-01-09"), second],
            vec![],
        );

        let rows = run_lab_billing_check(&snapshot, &january());

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == ComplianceStatus::Compliant));
    }

    #[test]
    fn every_code_is_checked_for_every_sheet() {
        let mut snapshot = snapshot_with(vec![sheet("P001", "2023-01-10")], vec![], vec![]);
        snapshot.procedures.push(ProcedureCode {
            code: "HBLD038".into(),
            label: "Ceramic crown".into(),
            is_prosthetic: true,
            materials: String::new(),
            basket: String::new(),
        });

        let rows = run_lab_billing_check(&snapshot, &january());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn sheets_outside_range_and_other_doc_types_are_ignored() {
        let mut other = sheet("P001", "2023-01-10");
        other.doc_type = DocType::SignedQuote;

        let snapshot = snapshot_with(
            vec![other, sheet("P001", "2023-02-05")],
            vec![invoice("P001", "HBMD001", "2023-01-09")],
            vec![],
        );

        let rows = run_lab_billing_check(&snapshot, &january());
        assert!(rows.is_empty());
    }

    #[test]
    fn custom_tolerance_narrows_the_window() {
        let snapshot = snapshot_with(
            vec![sheet("P001", "2023-01-10")],
            vec![invoice("P001", "HBMD001", "2023-01-11")],
            vec![],
        );

        let opts = january().with_tolerance(0);
        let rows = run_lab_billing_check(&snapshot, &opts);
        assert_eq!(rows[0].status, ComplianceStatus::Inconsistent);
    }

    #[test]
    fn blank_patient_name_falls_back_to_placeholder() {
        let mut inv = invoice("P001", "HBMD001", "2023-01-10");
        inv.patient_name = Some(String::new());

        let snapshot = snapshot_with(vec![sheet("P001", "2023-01-10")], vec![inv], vec![]);

        let rows = run_lab_billing_check(&snapshot, &january());
        assert_eq!(rows[0].patient, "—");
    }

    #[test]
    fn run_from_store_reads_the_working_tables() {
        let conn = crate::db::open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO ccam_prosthetics (code, label, is_prosthetic) VALUES (?1, ?2, 1)",
            ("HBMD001", "Crown on molar"),
        )
        .unwrap();
        conn.execute(
            "INSERT INTO scans (patient_id, doc_type, file_path, date)
             VALUES ('P001', 'lab_sheet', 'scan1.pdf', '2023-01-10')",
            [],
        )
        .unwrap();

        let rows = run_from_store(&conn, &january()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ComplianceStatus::Inconsistent);
    }
}
