//! Glue-code synthesis
//!
//! This module provides:
//! - the code model shared by emitters and the reference binder
//! - the synthesizer building it from a schema store
//! - emitters rendering it to source text

pub mod emit;
pub mod model;
pub mod synth;

pub use emit::{Emitter, QuickJsEmitter};
pub use model::BindingUnit;
pub use synth::{native_default, Synthesizer};
