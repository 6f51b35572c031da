//! Build utilities
//!
//! `BindingBuilder` runs the generation pipeline from a CLI or a build.rs
//! script and owns artifact writing.

pub mod pipeline;

pub use pipeline::{write_atomic, BindingBuilder, BuildOutput, CheckReport, OUTPUT_FILE, SCHEMA_FILE};
