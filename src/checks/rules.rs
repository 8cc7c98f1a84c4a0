use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::db::StoreSnapshot;
use crate::models::{DocType, QuoteRecord, QuoteStatus};
use crate::ocr::TextExtractor;

use super::types::*;

/// Controlled vocabulary of prosthetic materials. First match wins.
static MATERIAL_VOCAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(zirconia|ceramic|resin|metal)").unwrap());

// ---------------------------------------------------------------------------
// Deleted quote flow
// ---------------------------------------------------------------------------

/// Every deleted quote, joined to the latest replacement invoice for the
/// same patient and code. A billing reference on that invoice means the
/// deletion was a legitimate redo, otherwise the quote vanished unbilled.
pub fn check_deleted_quote_flow(snapshot: &StoreSnapshot) -> Vec<DeletedQuoteFlowRow> {
    let mut rows = Vec::new();

    for quote in snapshot
        .quotes
        .iter()
        .filter(|q| q.status == QuoteStatus::Deleted)
    {
        let scan_path = snapshot
            .scans
            .iter()
            .find(|s| s.patient_id == quote.patient_id && s.doc_type == DocType::LabSheet)
            .map(|s| s.file_path.clone());

        let replacement = snapshot
            .invoices
            .iter()
            .filter(|inv| {
                inv.patient_id == quote.patient_id
                    && inv.code == quote.code
                    && inv.has_billing_ref()
            })
            .max_by_key(|inv| inv.date);

        let row = match replacement {
            Some(inv) => DeletedQuoteFlowRow {
                quote_id: quote.quote_id.clone(),
                patient_id: quote.patient_id.clone(),
                doctor_id: quote.doctor_id.clone(),
                code: quote.code.clone(),
                quote_date: quote.date,
                scan_path,
                invoice_no: inv.invoice_no.clone(),
                fse_no: inv.fse_no.clone(),
                invoice_date: Some(inv.date),
                flag: FLAG_OK_REPLACED,
            },
            None => DeletedQuoteFlowRow {
                quote_id: quote.quote_id.clone(),
                patient_id: quote.patient_id.clone(),
                doctor_id: quote.doctor_id.clone(),
                code: quote.code.clone(),
                quote_date: quote.date,
                scan_path,
                invoice_no: None,
                fse_no: None,
                invoice_date: None,
                flag: FLAG_QUOTE_DELETED_NO_INVOICE,
            },
        };
        rows.push(row);
    }

    tracing::info!(rows = rows.len(), "Deleted quotes processed");
    rows
}

// ---------------------------------------------------------------------------
// Material mismatch
// ---------------------------------------------------------------------------

/// Reads the first material vocabulary term out of the document's OCR text.
/// Any OCR failure degrades this single reading to "unknown", never the run.
pub fn extract_material(extractor: &dyn TextExtractor, path: &Path) -> String {
    match extractor.extract_text(path) {
        Ok(pages) => {
            for page in &pages {
                if let Some(found) = MATERIAL_VOCAB.find(page) {
                    return found.as_str().to_lowercase();
                }
            }
            MATERIAL_UNKNOWN.to_string()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "OCR failed");
            MATERIAL_UNKNOWN.to_string()
        }
    }
}

/// Compares each quote's declared material against the material read off the
/// patient's lab sheet. Quotes without a declared material or without a lab
/// sheet are skipped; unreadable sheets never flag.
pub fn check_material_mismatch(
    snapshot: &StoreSnapshot,
    extractor: &dyn TextExtractor,
) -> Vec<MaterialMismatchRow> {
    let mut rows = Vec::new();

    for quote in &snapshot.quotes {
        let declared = quote.declared_material.trim().to_lowercase();
        if declared.is_empty() {
            continue;
        }

        let Some(scan) = snapshot
            .scans
            .iter()
            .find(|s| s.patient_id == quote.patient_id && s.doc_type == DocType::LabSheet)
        else {
            continue;
        };

        let lab_material = extract_material(extractor, Path::new(&scan.file_path));
        if lab_material != MATERIAL_UNKNOWN && declared != lab_material {
            rows.push(MaterialMismatchRow {
                patient_id: quote.patient_id.clone(),
                quote_id: quote.quote_id.clone(),
                declared_material: declared,
                lab_material,
                doc_path: scan.file_path.clone(),
                flag: FLAG_MATERIAL_MISMATCH,
            });
        }
    }

    tracing::info!(rows = rows.len(), "Material mismatches detected");
    rows
}

// ---------------------------------------------------------------------------
// Deleted prosthetic acts
// ---------------------------------------------------------------------------

/// Audit list of every deleted act whose code is in the prosthetic
/// reference table. Informational, not conditional.
pub fn check_deleted_prostheses(snapshot: &StoreSnapshot) -> Vec<DeletedProsthesisRow> {
    let prosthetic_codes: HashSet<&str> = snapshot
        .procedures
        .iter()
        .filter(|p| p.is_prosthetic)
        .map(|p| p.code.as_str())
        .collect();

    let rows: Vec<DeletedProsthesisRow> = snapshot
        .deleted_acts
        .iter()
        .filter(|act| prosthetic_codes.contains(act.code.as_str()))
        .map(|act| DeletedProsthesisRow {
            patient_id: act.patient_id.clone(),
            doctor_name: act.doctor_name.clone(),
            code: act.code.clone(),
            label: act.label.clone(),
            date: act.date,
            source_file: act.source_file.clone(),
            flag: FLAG_DELETED_PROSTHESIS,
        })
        .collect();

    tracing::info!(rows = rows.len(), "Deleted prosthetic acts found");
    rows
}

// ---------------------------------------------------------------------------
// Insurance coverage documents
// ---------------------------------------------------------------------------

/// Every accepted quote and every invoice must have an insurance card scan
/// plus a PEC or claim scan on file for the patient.
pub fn check_insurance_docs(snapshot: &StoreSnapshot) -> Vec<InsuranceDocRow> {
    let scan_index: HashSet<(&str, &str)> = snapshot
        .scans
        .iter()
        .map(|s| (s.patient_id.as_str(), s.doc_type.as_str()))
        .collect();

    let has_scan =
        |pid: &str, doc_type: DocType| scan_index.contains(&(pid, doc_type.as_str()));

    let mut rows = Vec::new();

    let mut push_missing = |patient_id: &str, quote_id: String, invoice_id: String| {
        let mut missing = Vec::new();
        if !has_scan(patient_id, DocType::InsuranceCard) {
            missing.push("insurance_card");
        }
        if !has_scan(patient_id, DocType::Pec) && !has_scan(patient_id, DocType::InsuranceClaim)
        {
            missing.push("pec_or_claim");
        }

        if !missing.is_empty() {
            rows.push(InsuranceDocRow {
                patient_id: patient_id.to_string(),
                quote_id,
                invoice_id,
                missing_type: missing.join(","),
                flag: FLAG_INSURANCE_DOC_MISSING,
            });
        }
    };

    for quote in snapshot
        .quotes
        .iter()
        .filter(|q| q.status == QuoteStatus::Accepted)
    {
        push_missing(&quote.patient_id, quote.quote_id.clone(), String::new());
    }

    for invoice in &snapshot.invoices {
        let invoice_id = [invoice.invoice_no.as_deref(), invoice.fse_no.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or_default()
            .to_string();
        push_missing(&invoice.patient_id, String::new(), invoice_id);
    }

    tracing::info!(rows = rows.len(), "Insurance document issues found");
    rows
}

// ---------------------------------------------------------------------------
// Recreated quotes after deletion
// ---------------------------------------------------------------------------

type QuoteGroupKey = (String, String, String, String, String);

/// Flags quotes recreated after an identical one was deleted: same patient,
/// doctor, code, tooth and material, with a deleted quote alongside a
/// proposed or accepted one.
pub fn check_recreated_quotes(snapshot: &StoreSnapshot) -> Vec<DuplicateQuoteRow> {
    let mut groups: BTreeMap<QuoteGroupKey, Vec<&QuoteRecord>> = BTreeMap::new();
    for quote in &snapshot.quotes {
        let key = (
            quote.patient_id.clone(),
            quote.doctor_id.clone(),
            quote.code.clone(),
            quote.tooth_number.clone(),
            quote.declared_material.clone(),
        );
        groups.entry(key).or_default().push(quote);
    }

    let mut rows = Vec::new();

    for group in groups.values_mut() {
        // Undated quotes sort last, so the originating deletion is the
        // earliest dated one.
        group.sort_by_key(|q| (q.date.is_none(), q.date));

        let Some(originating) = group.iter().find(|q| q.status == QuoteStatus::Deleted) else {
            continue;
        };

        for quote in group
            .iter()
            .filter(|q| q.status != QuoteStatus::Deleted)
        {
            rows.push(DuplicateQuoteRow {
                patient_id: quote.patient_id.clone(),
                doctor_id: quote.doctor_id.clone(),
                code: quote.code.clone(),
                tooth_number: quote.tooth_number.clone(),
                material: quote.declared_material.clone(),
                new_quote_date: quote.date,
                deleted_quote_id: originating.quote_id.clone(),
                duplicate_quote_id: quote.quote_id.clone(),
                flag: FLAG_DUPLICATE_AFTER_DELETION,
            });
        }
    }

    tracing::info!(rows = rows.len(), "Duplicate quotes after deletion detected");
    rows
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Runs the five rules. They share no state; a failure inside OCR only
/// degrades the affected material reading.
pub fn run_all(snapshot: &StoreSnapshot, extractor: &dyn TextExtractor) -> ValidationReport {
    let report = ValidationReport {
        deleted_quotes: check_deleted_quote_flow(snapshot),
        material_mismatches: check_material_mismatch(snapshot, extractor),
        deleted_prostheses: check_deleted_prostheses(snapshot),
        missing_insurance_docs: check_insurance_docs(snapshot),
        recreated_quotes: check_recreated_quotes(snapshot),
    };

    tracing::info!(issues = report.issue_count(), "Validation rule set complete");
    report
}
