use serde::{Deserialize, Serialize};

/// A health professional from the RPPS registry extraction.
/// All fields besides the identifier arrive as free text from the official
/// file and are stored as-is; only the matcher normalizes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Professional {
    pub rpps_id: String,
    pub title: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub profession_code: Option<String>,
    pub profession_label: Option<String>,
    pub specialty_code: Option<String>,
    pub specialty_label: Option<String>,
    pub status: Option<String>,
    pub practice_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub date_registered: Option<String>,
    pub date_updated: Option<String>,
    pub date_import: Option<String>,
    pub source_url: Option<String>,
    pub version_extraction: Option<String>,
}

impl Professional {
    /// Display name as shown in status reports ("first last").
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}
