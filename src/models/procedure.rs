use serde::{Deserialize, Serialize};

/// One row of the CCAM prosthetics reference (code → label/material/basket).
/// Loaded in bulk from the nomenclature document; upserted by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureCode {
    pub code: String,
    pub label: String,
    pub is_prosthetic: bool,
    pub materials: String,
    pub basket: String,
}
