pub mod config;
pub mod models;
pub mod db;
pub mod text; // accent-insensitive normalization shared by search and status
pub mod ingest; // CSV loaders for the billing store
pub mod ocr;
pub mod engine; // lab sheet vs. invoice reconciliation
pub mod checks; // billing validation rule set
pub mod registry; // RPPS professional registry
pub mod export;
