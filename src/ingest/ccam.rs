use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::models::ProcedureCode;

use super::{header_positions, open_reader, IngestError};

// Source headers vary across reference exports; all known spellings map
// onto the table's columns. Headers are lowercased before lookup.
const LABEL_ALIASES: &[&str] = &["label", "libellé", "intitule", "designation"];
const MATERIALS_ALIASES: &[&str] = &["materials", "matiere"];
const BASKET_ALIASES: &[&str] = &["basket", "panier"];

/// Loads the prosthetic reference from a comma-separated file.
pub fn load_ccam_csv(path: &Path) -> Result<Vec<ProcedureCode>, IngestError> {
    load_ccam(path, b',')
}

/// Loads the prosthetic reference from a semicolon-separated file, the
/// usual layout of French reference exports.
pub fn load_ccam_txt(path: &Path) -> Result<Vec<ProcedureCode>, IngestError> {
    load_ccam(path, b';')
}

/// Picks the delimiter from the file extension: `.txt` and `.tsv` are
/// semicolon-separated, everything else comma-separated.
pub fn load_ccam_file(path: &Path) -> Result<Vec<ProcedureCode>, IngestError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") | Some("tsv") => load_ccam_txt(path),
        _ => load_ccam_csv(path),
    }
}

fn load_ccam(path: &Path, delimiter: u8) -> Result<Vec<ProcedureCode>, IngestError> {
    let mut reader = open_reader(path, delimiter)?;
    let positions = header_positions(reader.headers()?);

    if !positions.contains_key("code") {
        return Err(IngestError::MissingColumns {
            file: path.display().to_string(),
            columns: vec!["code".to_string()],
        });
    }

    let label_idx = first_alias(&positions, LABEL_ALIASES);
    let materials_idx = first_alias(&positions, MATERIALS_ALIASES);
    let basket_idx = first_alias(&positions, BASKET_ALIASES);
    let code_idx = positions["code"];

    let mut seen: HashSet<String> = HashSet::new();
    let mut codes = Vec::new();

    for record in reader.records() {
        let record = record?;

        let code = record
            .get(code_idx)
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        // Empty codes and duplicates (first wins) are dropped.
        if code.is_empty() || !seen.insert(code.clone()) {
            continue;
        }

        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        codes.push(ProcedureCode {
            code,
            label: cell(label_idx),
            // Everything in the reference file is prosthetic by definition.
            is_prosthetic: true,
            materials: cell(materials_idx),
            basket: cell(basket_idx),
        });
    }

    tracing::info!(path = %path.display(), rows = codes.len(), "Loaded prosthetic reference");
    Ok(codes)
}

fn first_alias(positions: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| positions.get(*alias).copied())
}
