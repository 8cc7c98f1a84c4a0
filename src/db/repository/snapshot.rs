use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::{DeletedActRecord, InvoiceRecord, ProcedureCode, QuoteRecord, ScanRecord};

use super::{
    get_all_deleted_acts, get_all_invoices, get_all_procedure_codes, get_all_quotes, get_all_scans,
};

/// Consistent in-memory view of the five compliance tables, loaded once per
/// run. The reconciliation engine and the validation rules only ever read
/// from this, so both stay pure and the store is queried exactly once.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub procedures: Vec<ProcedureCode>,
    pub scans: Vec<ScanRecord>,
    pub invoices: Vec<InvoiceRecord>,
    pub deleted_acts: Vec<DeletedActRecord>,
    pub quotes: Vec<QuoteRecord>,
}

impl StoreSnapshot {
    pub fn load(conn: &Connection) -> Result<Self, DatabaseError> {
        let snapshot = Self {
            procedures: get_all_procedure_codes(conn)?,
            scans: get_all_scans(conn)?,
            invoices: get_all_invoices(conn)?,
            deleted_acts: get_all_deleted_acts(conn)?,
            quotes: get_all_quotes(conn)?,
        };

        tracing::debug!(
            procedures = snapshot.procedures.len(),
            scans = snapshot.scans.len(),
            invoices = snapshot.invoices.len(),
            deleted_acts = snapshot.deleted_acts.len(),
            quotes = snapshot.quotes.len(),
            "Loaded store snapshot"
        );

        Ok(snapshot)
    }
}
