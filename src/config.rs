use std::path::PathBuf;

use crate::engine::DEFAULT_TOLERANCE_DAYS;
use crate::registry::DEFAULT_MATCH_SCORE;

/// Application-level constants
pub const APP_NAME: &str = "ProtoCheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// Platform data dir + `protocheck/` (e.g. ~/.local/share/protocheck on Linux)
pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_dir().expect("Cannot determine data directory");
    base.join("protocheck")
}

/// Default location of the billing store database
pub fn store_db_path() -> PathBuf {
    app_data_dir().join("protocheck.db")
}

/// Default location of the RPPS registry database
pub fn registry_db_path() -> PathBuf {
    app_data_dir().join("rpps.db")
}

/// Default directory for CSV/JSON exports
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "protocheck=info"
}

/// Resolved runtime settings shared by the CLI commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub store_db: PathBuf,
    pub registry_db: PathBuf,
    pub tolerance_days: i64,
    pub min_match_score: u32,
    /// Plain substring name matching instead of the fuzzy default.
    pub substring_match: bool,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            store_db: store_db_path(),
            registry_db: registry_db_path(),
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
            min_match_score: DEFAULT_MATCH_SCORE,
            substring_match: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_platform_data() {
        let dir = app_data_dir();
        let base = dirs::data_dir().unwrap();
        assert!(dir.starts_with(base));
        assert!(dir.ends_with("protocheck"));
    }

    #[test]
    fn db_paths_under_app_data() {
        let app = app_data_dir();
        assert!(store_db_path().starts_with(&app));
        assert!(registry_db_path().starts_with(&app));
        assert!(store_db_path().ends_with("protocheck.db"));
        assert!(registry_db_path().ends_with("rpps.db"));
    }

    #[test]
    fn default_context_uses_default_knobs() {
        let ctx = AppContext::default();
        assert_eq!(ctx.tolerance_days, DEFAULT_TOLERANCE_DAYS);
        assert_eq!(ctx.min_match_score, DEFAULT_MATCH_SCORE);
        assert!(!ctx.substring_match);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
