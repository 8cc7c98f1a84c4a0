//! Billing validation rule set.
//!
//! Five independent rules over a [`StoreSnapshot`](crate::db::StoreSnapshot):
//! deleted quote flow, declared vs lab material, deleted prosthetic acts,
//! insurance document coverage, and quotes recreated after deletion. Rules
//! share no state and can run in any order; [`run_all`] runs them all and
//! aggregates the rows into a [`ValidationReport`].

pub mod rules;
pub mod types;

pub use rules::{
    check_deleted_prostheses, check_deleted_quote_flow, check_insurance_docs,
    check_material_mismatch, check_recreated_quotes, extract_material, run_all,
};
pub use types::{
    DeletedProsthesisRow, DeletedQuoteFlowRow, DuplicateQuoteRow, InsuranceDocRow,
    MaterialMismatchRow, ValidationReport, FLAG_DELETED_PROSTHESIS,
    FLAG_DUPLICATE_AFTER_DELETION, FLAG_INSURANCE_DOC_MISSING, FLAG_MATERIAL_MISMATCH,
    FLAG_OK_REPLACED, FLAG_QUOTE_DELETED_NO_INVOICE, MATERIAL_UNKNOWN,
};
