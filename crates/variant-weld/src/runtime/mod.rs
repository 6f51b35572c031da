//! In-process evaluation of synthesized bindings
//!
//! The reference binder executes a [`BindingUnit`](crate::codegen::BindingUnit)
//! against a script value model and a pluggable [`Host`], so the behaviour of
//! generated glue can be exercised without compiling it.

pub mod binder;
pub mod buffer;
pub mod host;
pub mod value;

pub use binder::Binder;
pub use buffer::{ingest_elements, view_window, Ingested};
pub use host::{Host, NullHost, ScriptError, ScriptResult};
pub use value::{Instance, InstanceData, Value};
