//! Lab sheet / billing reconciliation.
//!
//! Pure functions over a [`StoreSnapshot`](crate::db::StoreSnapshot): every
//! lab sheet in the requested range is cross-checked against the prosthetic
//! reference table, invoices and deleted acts, and classified with the French
//! labels the review spreadsheet uses.

pub mod lab_billing;
pub mod types;

pub use lab_billing::{run_from_store, run_lab_billing_check};
pub use types::{ReconcileOptions, ReconciliationRow, DEFAULT_TOLERANCE_DAYS};
