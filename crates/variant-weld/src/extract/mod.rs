//! Schema extraction from per-class documentation records

pub mod docs;
pub mod extractor;

pub use docs::{DirectorySource, DocArgument, DocConstant, DocMember, DocMethod, DocRecord, DocSource, MemorySource};
pub use extractor::{SchemaExtractor, OPERATOR_PREFIX};
