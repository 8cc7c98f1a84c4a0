use rusqlite::Connection;
use serde::Serialize;

use crate::db::{get_professional_by_rpps, DatabaseError};
use crate::text::is_deregistered;

/// Outcome of an identity check. `NotFound` and `Deregistered` are both
/// alert conditions; callers must reject either one for billing or linking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StatusReport {
    NotFound {
        rpps_id: String,
    },
    Deregistered {
        rpps_id: String,
        name: String,
        status: String,
    },
    Active {
        rpps_id: String,
        name: String,
        status: String,
    },
}

impl StatusReport {
    pub fn is_alert(&self) -> bool {
        !matches!(self, StatusReport::Active { .. })
    }
}

/// Looks the identifier up and classifies the record's raw status text.
pub fn classify_status(conn: &Connection, rpps_id: &str) -> Result<StatusReport, DatabaseError> {
    let Some(record) = get_professional_by_rpps(conn, rpps_id)? else {
        tracing::warn!(rpps_id, "RPPS ID not found");
        return Ok(StatusReport::NotFound {
            rpps_id: rpps_id.to_string(),
        });
    };

    let name = record.display_name();
    let status = record.status.clone().unwrap_or_default();

    if is_deregistered(record.status.as_deref()) {
        tracing::warn!(rpps_id, status = %status, "RPPS ID is deregistered");
        return Ok(StatusReport::Deregistered {
            rpps_id: rpps_id.to_string(),
            name,
            status,
        });
    }

    Ok(StatusReport::Active {
        rpps_id: rpps_id.to_string(),
        name,
        status,
    })
}

/// Whether the professional can be used for billing or linking.
pub fn validate_for_use(conn: &Connection, rpps_id: &str) -> Result<bool, DatabaseError> {
    let report = classify_status(conn, rpps_id)?;

    if report.is_alert() {
        tracing::error!(rpps_id, ?report, "RPPS validation failed");
        return Ok(false);
    }

    tracing::info!(rpps_id, "RPPS validation passed");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_professionals, open_memory_registry};
    use crate::models::Professional;

    fn registry_with_status(status: &str) -> Connection {
        let conn = open_memory_registry().unwrap();
        insert_professionals(
            &conn,
            &[Professional {
                rpps_id: "10000000001".into(),
                last_name: Some("DUPONT".into()),
                first_name: Some("Marie".into()),
                status: Some(status.into()),
                ..Default::default()
            }],
        )
        .unwrap();
        conn
    }

    #[test]
    fn unknown_id_is_an_alert() {
        let conn = open_memory_registry().unwrap();

        let report = classify_status(&conn, "10000000001").unwrap();

        assert_eq!(
            report,
            StatusReport::NotFound {
                rpps_id: "10000000001".into()
            }
        );
        assert!(report.is_alert());
    }

    #[test]
    fn active_record_carries_name_and_raw_status() {
        let conn = registry_with_status("Actif");

        let report = classify_status(&conn, "10000000001").unwrap();

        assert_eq!(
            report,
            StatusReport::Active {
                rpps_id: "10000000001".into(),
                name: "Marie DUPONT".into(),
                status: "Actif".into(),
            }
        );
        assert!(!report.is_alert());
    }

    #[test]
    fn deregistered_is_detected_despite_accents_and_spacing() {
        for status in ["Radié", "RADIEE", "r a d i é", "Déréférencé"] {
            let conn = registry_with_status(status);
            let report = classify_status(&conn, "10000000001").unwrap();
            assert!(
                matches!(report, StatusReport::Deregistered { .. }),
                "status {status:?}"
            );
        }
    }

    #[test]
    fn validate_for_use_rejects_not_found_and_deregistered_alike() {
        let empty = open_memory_registry().unwrap();
        assert!(!validate_for_use(&empty, "10000000001").unwrap());

        let deregistered = registry_with_status("Radié");
        assert!(!validate_for_use(&deregistered, "10000000001").unwrap());

        let active = registry_with_status("Actif");
        assert!(validate_for_use(&active, "10000000001").unwrap());
    }
}
