//! Repository layer: entity-scoped database operations.
//!
//! Compliance-store tables and the RPPS registry live in separate SQLite
//! files; each function states which connection it expects.

mod deleted_act;
mod import_document;
mod invoice;
mod procedure;
mod professional;
mod quote;
mod scan;
mod snapshot;

// Re-export all public items from sub-modules
pub use deleted_act::*;
pub use import_document::*;
pub use invoice::*;
pub use procedure::*;
pub use professional::*;
pub use quote::*;
pub use scan::*;
pub use snapshot::*;
