use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use crate::models::{DocType, ScanRecord};

use super::{field, header_positions, open_reader, parse_date, require_columns, IngestError};

const EXPECTED_COLUMNS: &[&str] = &["patient_id", "doc_type", "file_path", "date"];

/// Loads the scans index. Document types are lowercased before validation;
/// any unrecognized type fails the whole file, naming every offender once.
pub fn load_scans_file(path: &Path) -> Result<Vec<ScanRecord>, IngestError> {
    let mut reader = open_reader(path, b',')?;
    let positions = header_positions(reader.headers()?);
    require_columns(&positions, EXPECTED_COLUMNS, path)?;

    let mut scans = Vec::new();
    let mut invalid_types = BTreeSet::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let line = line + 2;

        let raw_type = field(&record, &positions, "doc_type").to_lowercase();
        let Ok(doc_type) = DocType::from_str(&raw_type) else {
            invalid_types.insert(raw_type);
            continue;
        };

        scans.push(ScanRecord {
            patient_id: field(&record, &positions, "patient_id").to_string(),
            doc_type,
            file_path: field(&record, &positions, "file_path").to_string(),
            date: parse_date(field(&record, &positions, "date"), "date", line)?,
        });
    }

    if !invalid_types.is_empty() {
        return Err(IngestError::InvalidDocTypes(
            invalid_types.into_iter().collect(),
        ));
    }

    tracing::info!(path = %path.display(), rows = scans.len(), "Loaded scan index");
    Ok(scans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "patient_id,doc_type,file_path,date").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn valid_doc_types_load_with_parsed_dates() {
        let file = temp_csv(&[
            "P001,lab_sheet,scan1.pdf,2023-01-10",
            "P001,Insurance_Card,card.pdf,2023-01-02",
        ]);

        let scans = load_scans_file(file.path()).unwrap();

        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].doc_type, DocType::LabSheet);
        assert_eq!(scans[1].doc_type, DocType::InsuranceCard);
    }

    #[test]
    fn unknown_doc_types_fail_the_whole_file() {
        let file = temp_csv(&[
            "P001,lab_sheet,scan1.pdf,2023-01-10",
            "P002,xray,x.pdf,2023-01-11",
            "P003,panoramic,p.pdf,2023-01-12",
        ]);

        let err = load_scans_file(file.path()).unwrap_err();

        match err {
            IngestError::InvalidDocTypes(types) => {
                assert_eq!(types, vec!["panoramic".to_string(), "xray".to_string()]);
            }
            other => panic!("expected InvalidDocTypes, got {other:?}"),
        }
    }

    #[test]
    fn malformed_date_is_reported() {
        let file = temp_csv(&["P001,lab_sheet,scan1.pdf,10 janvier"]);

        let err = load_scans_file(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidField { field: "date", .. }));
    }

    #[test]
    fn missing_columns_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "patient_id,file_path").unwrap();
        writeln!(file, "P001,scan1.pdf").unwrap();
        file.flush().unwrap();

        let err = load_scans_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumns { ref columns, .. } if columns == &["date", "doc_type"]
        ));
    }
}
