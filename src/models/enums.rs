use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same wire string, so stored values, JSON and CSV cells
/// all agree.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $s)]
                $variant
            ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DocType {
    LabSheet => "lab_sheet",
    SignedQuote => "signed_quote",
    Pec => "pec",
    InsuranceCard => "insurance_card",
    InsuranceClaim => "insurance_claim",
});

str_enum!(QuoteStatus {
    Proposed => "proposed",
    Accepted => "accepted",
    Deleted => "deleted",
});

// Display vocabulary of the reconciliation output. The French labels are
// the contract with the practice's review spreadsheet; keep them verbatim.

str_enum!(ControlState {
    Controlled => "Contrôlé",
    NotControlled => "Non contrôlé",
});

str_enum!(ValidationState {
    Validated => "Validé",
    Deleted => "Supprimé",
    Undetermined => "—",
});

str_enum!(ComplianceStatus {
    Compliant => "Conforme",
    Inconsistent => "Incohérent",
});
