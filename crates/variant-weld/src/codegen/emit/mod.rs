//! Emitters render a [`BindingUnit`] to source text
//!
//! The synthesizer decides what is generated; an emitter only decides how it
//! is spelled for a particular embedding API.

pub mod quickjs;

pub use quickjs::QuickJsEmitter;

use crate::codegen::model::BindingUnit;

pub trait Emitter {
    /// Render the whole unit as one source file
    fn emit(&self, unit: &BindingUnit) -> String;
}
