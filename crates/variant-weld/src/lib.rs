//! Variant-Weld: binding generation for built-in value types
//!
//! This crate exposes an engine's built-in value classes (vectors, colors,
//! transforms, packed arrays) to an embedded script runtime. It extracts a
//! normalized schema per class from documentation records and override
//! tables, then synthesizes the glue code that marshals values across the
//! boundary.
//!
//! # Architecture
//!
//! - `config`: override document, type mapping, operator catalog, constructor overloads
//! - `extract`: documentation sources and the schema extractor
//! - `ir`: schemas and the schema store
//! - `codegen`: code model, synthesizer and emitters
//! - `runtime`: reference binder evaluating the code model in process
//! - `build`: pipeline orchestration for the CLI and build scripts
//!
//! # Usage
//!
//! In a `build.rs`:
//!
//! ```rust,ignore
//! use variant_weld::build::BindingBuilder;
//!
//! fn main() {
//!     BindingBuilder::new()
//!         .docs("doc/classes")
//!         .build()
//!         .expect("Failed to generate bindings");
//! }
//! ```

pub mod build;
pub mod codegen;
pub mod config;
pub mod error;
pub mod extract;
pub mod ir;
pub mod runtime;

// Re-export commonly used types
pub use build::{BindingBuilder, BuildOutput, CheckReport};
pub use codegen::{BindingUnit, Emitter, QuickJsEmitter, Synthesizer};
pub use config::{ClassOverrides, WeldConfig};
pub use error::{WeldError, WeldResult};
pub use extract::{DirectorySource, DocRecord, DocSource, MemorySource, SchemaExtractor};
pub use ir::{ClassSchema, SchemaStore, TypeTable};
pub use runtime::{Binder, Host, Value};
