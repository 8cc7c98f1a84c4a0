pub mod deleted_act;
pub mod enums;
pub mod import_document;
pub mod invoice;
pub mod procedure;
pub mod professional;
pub mod quote;
pub mod scan;

pub use deleted_act::{DeletedActRecord, NewDeletedAct};
pub use enums::{ComplianceStatus, ControlState, DocType, QuoteStatus, ValidationState};
pub use import_document::ImportDocument;
pub use invoice::InvoiceRecord;
pub use procedure::ProcedureCode;
pub use professional::Professional;
pub use quote::QuoteRecord;
pub use scan::ScanRecord;
