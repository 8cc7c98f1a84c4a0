use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, accent-stripped, trimmed form of a string.
/// Decomposes to NFD and drops combining marks instead of substituting
/// from a fixed accent table, so any diacritic folds correctly.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Whether a raw status string means the professional was struck off the
/// registry. Catches "radié"/"déréférencé" spellings regardless of case,
/// accents, or inserted spacing ("r a d i e"). Single source of truth for
/// the active/deregistered split; callers must not reimplement it inline.
pub fn is_deregistered(status: Option<&str>) -> bool {
    let Some(status) = status else {
        return false;
    };
    let folded: String = normalize(status).split_whitespace().collect();
    folded.contains("radie") || folded.contains("dereference")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_case_and_whitespace() {
        assert_eq!(normalize("  Radié "), "radie");
        assert_eq!(normalize("Déréférencé"), "dereference");
        assert_eq!(normalize("DUPONT"), "dupont");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_handles_non_french_diacritics() {
        // Not limited to the accents of a substitution table
        assert_eq!(normalize("Šárka"), "sarka");
        assert_eq!(normalize("Müller"), "muller");
        assert_eq!(normalize("Nguyễn"), "nguyen");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["Radié", "  Crème Brûlée  ", "plain", "", "ÉÀÇ"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {s:?}");
        }
    }

    #[test]
    fn deregistered_variants_all_detected() {
        for s in [
            "Radié",
            "radie",
            "RADIE",
            "r a d i e",
            "Déréférencé",
            "dereference",
            "DEREFERENCE",
        ] {
            assert!(is_deregistered(Some(s)), "{s:?} should classify as deregistered");
        }
    }

    #[test]
    fn active_empty_and_absent_are_not_deregistered() {
        assert!(!is_deregistered(Some("Actif")));
        assert!(!is_deregistered(Some("")));
        assert!(!is_deregistered(None));
    }
}
