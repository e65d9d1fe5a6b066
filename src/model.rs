//! Lifecycle identifiers, opaque documents, operation bookkeeping, and stored records.

pub mod document;
pub mod id;
pub mod operation;
pub mod record;

pub use document::*;
pub use id::*;
pub use operation::*;
pub use record::*;
