use std::path::Path;

use crate::models::InvoiceRecord;

use super::{
    field, header_positions, open_reader, opt_text, parse_amount, parse_date, parse_qty,
    require_columns, IngestError,
};

const EXPECTED_COLUMNS: &[&str] = &[
    "invoice_no",
    "date",
    "patient_id",
    "patient_name",
    "doctor_id",
    "doctor_name",
    "code",
    "qty",
    "amount",
    "fse_no",
    "source_file",
];

/// Loads a billing export. All columns must be present; blank invoice and
/// FSE numbers load as NULL so they never count as billing references.
pub fn load_invoices_file(path: &Path) -> Result<Vec<InvoiceRecord>, IngestError> {
    let mut reader = open_reader(path, b',')?;
    let positions = header_positions(reader.headers()?);
    require_columns(&positions, EXPECTED_COLUMNS, path)?;

    let mut invoices = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = line + 2;

        invoices.push(InvoiceRecord {
            invoice_no: opt_text(field(&record, &positions, "invoice_no")),
            date: parse_date(field(&record, &positions, "date"), "date", line)?,
            patient_id: field(&record, &positions, "patient_id").to_string(),
            patient_name: opt_text(field(&record, &positions, "patient_name")),
            doctor_id: field(&record, &positions, "doctor_id").to_string(),
            doctor_name: field(&record, &positions, "doctor_name").to_string(),
            code: field(&record, &positions, "code").to_string(),
            qty: parse_qty(field(&record, &positions, "qty"), "qty", line)?,
            amount: parse_amount(field(&record, &positions, "amount"), "amount", line)?,
            fse_no: opt_text(field(&record, &positions, "fse_no")),
            source_file: field(&record, &positions, "source_file").to_string(),
        });
    }

    tracing::info!(path = %path.display(), rows = invoices.len(), "Loaded invoices");
    Ok(invoices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "invoice_no,date,patient_id,patient_name,doctor_id,doctor_name,code,qty,amount,fse_no,source_file";

    fn temp_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn well_formed_export_loads() {
        let file = temp_csv(&[
            "INV001,2023-01-09,P001,John Doe,D001,Dr. Smith,HBMD001,1,150.0,FSE123,jan.csv",
        ]);

        let invoices = load_invoices_file(file.path()).unwrap();

        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].invoice_no.as_deref(), Some("INV001"));
        assert_eq!(invoices[0].qty, 1);
        assert!(invoices[0].has_billing_ref());
    }

    #[test]
    fn blank_references_load_as_none() {
        let file = temp_csv(&[",2023-01-09,P001,,D001,Dr. Smith,HBMD001,1,150.0,,jan.csv"]);

        let invoices = load_invoices_file(file.path()).unwrap();

        assert!(invoices[0].invoice_no.is_none());
        assert!(invoices[0].fse_no.is_none());
        assert!(!invoices[0].has_billing_ref());
    }

    #[test]
    fn missing_columns_are_all_named() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invoice_no,date,patient_id").unwrap();
        writeln!(file, "INV001,2023-01-09,P001").unwrap();
        file.flush().unwrap();

        let err = load_invoices_file(file.path()).unwrap_err();

        match err {
            IngestError::MissingColumns { columns, .. } => {
                assert_eq!(columns.len(), 8);
                assert!(columns.contains(&"doctor_name".to_string()));
                assert!(columns.contains(&"source_file".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn malformed_date_fails_with_its_line_number() {
        let file = temp_csv(&[
            "INV001,2023-01-09,P001,John,D001,Dr,HBMD001,1,150.0,,jan.csv",
            "INV002,10/01/2023,P002,Jane,D001,Dr,HBMD001,1,150.0,,jan.csv",
        ]);

        let err = load_invoices_file(file.path()).unwrap_err();

        assert!(matches!(
            err,
            IngestError::InvalidField { field: "date", line: 3, .. }
        ));
    }

    #[test]
    fn headers_match_case_insensitively() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Invoice_No,Date,Patient_ID,Patient_Name,Doctor_ID,Doctor_Name,Code,Qty,Amount,FSE_No,Source_File"
        )
        .unwrap();
        writeln!(file, "INV001,2023-01-09,P001,John,D001,Dr,HBMD001,1,150.0,,jan.csv").unwrap();
        file.flush().unwrap();

        let invoices = load_invoices_file(file.path()).unwrap();
        assert_eq!(invoices[0].patient_id, "P001");
    }
}
