//! Intermediate representation shared by extraction and synthesis
//!
//! - `types`: the type mapping table
//! - `schema`: per-class schema records
//! - `store`: the serialized schema collection

pub mod schema;
pub mod store;
pub mod types;

pub use schema::*;
pub use store::*;
pub use types::*;
