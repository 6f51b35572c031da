//! Packed-array ingestion from raw buffers
//!
//! One routine serves every fixed-width element type; only the stride and
//! the decoding differ.

use super::value::{Instance, Value};
use crate::config::ElementKind;
use tracing::warn;

/// Result of ingesting a byte buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub elements: Vec<Value>,
    /// Trailing bytes that did not form a whole element
    pub remainder: usize,
}

/// Decode `bytes` into elements of `element`
///
/// The element count is `bytes.len() / stride`; a remainder is dropped and
/// logged. Elements without a fixed width yield nothing.
pub fn ingest_elements(bytes: &[u8], element: ElementKind, class: &str) -> Ingested {
    let Some(stride) = element.stride() else {
        return Ingested {
            elements: Vec::new(),
            remainder: bytes.len(),
        };
    };

    let chunks = bytes.chunks_exact(stride);
    let remainder = chunks.remainder().len();
    if remainder != 0 {
        warn!(
            class,
            length = bytes.len(),
            stride,
            remainder,
            "buffer.truncated"
        );
    }

    let elements = chunks.map(|chunk| element_value(element, chunk)).collect();
    Ingested {
        elements,
        remainder,
    }
}

/// Window of a typed view, clamped to the underlying buffer
pub fn view_window(buffer: &[u8], offset: usize, length: usize) -> &[u8] {
    if offset > buffer.len() {
        return &[];
    }
    let end = offset + length.min(buffer.len() - offset);
    &buffer[offset..end]
}

fn element_value(element: ElementKind, chunk: &[u8]) -> Value {
    let components = element.decode(chunk);
    let names: &[&str] = match element {
        ElementKind::Vector2 => &["x", "y"],
        ElementKind::Vector3 => &["x", "y", "z"],
        ElementKind::Color => &["r", "g", "b", "a"],
        _ => return components.first().copied().map(Value::Number).unwrap_or(Value::Undefined),
    };

    let mut instance = Instance::new(element.native());
    for (name, component) in names.iter().zip(components) {
        instance.set_field(name, Value::Number(component));
    }
    Value::Builtin(instance)
}
