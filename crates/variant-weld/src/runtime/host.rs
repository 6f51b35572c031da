//! Host facilities the glue code calls into
//!
//! Generated code relies on the embedding host for native constructors,
//! method calls, dynamic dispatch, operator evaluation and generic
//! conversion. The reference binder reaches the same facilities through
//! [`Host`]; every method has a default that reports the facility as
//! unavailable, so a host only implements what it supports.

use super::value::{Instance, Value};
use crate::codegen::model::ValueType;
use crate::ir::schema::OperatorCode;
use crate::ir::types::TypeKind;
use thiserror::Error;

/// Error surfaced to the calling script
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// Argument or property type mismatch under debug validation
    #[error("TypeError: {0}")]
    Type(String),

    /// Index outside the container
    #[error("RangeError: {0}")]
    Range(String),

    /// The host could not perform the requested operation
    #[error("host error: {0}")]
    Host(String),
}

pub type ScriptResult<T> = Result<T, ScriptError>;

fn unsupported<T>(what: &str, name: &str) -> ScriptResult<T> {
    Err(ScriptError::Host(format!("{} `{}` is not supported by this host", what, name)))
}

pub trait Host {
    /// Native constructor of `class` applied to converted arguments
    fn construct(&self, class: &str, _args: &[Value]) -> ScriptResult<Value> {
        unsupported("constructor", class)
    }

    /// Static factory such as `Color::html`
    fn factory(&self, function: &str, _args: &[Value]) -> ScriptResult<Value> {
        unsupported("factory", function)
    }

    /// Mutating method used while initializing a new instance
    fn invoke(&self, _receiver: &mut Instance, method: &str, _args: &[Value]) -> ScriptResult<()> {
        unsupported("method", method)
    }

    /// Direct native method call
    fn call_native(&self, _receiver: &mut Instance, method: &str, _args: &[Value]) -> ScriptResult<Value> {
        unsupported("method", method)
    }

    /// Dynamic-dispatch call keyed by native name
    fn call_dynamic(&self, _receiver: &mut Instance, method: &str, _args: &[Value]) -> ScriptResult<Value> {
        unsupported("dynamic call", method)
    }

    /// Generic operator evaluation on boxed operands
    fn evaluate(&self, code: OperatorCode, _left: &Value, _right: Option<&Value>) -> ScriptResult<Value> {
        unsupported("operator", code.native())
    }

    /// Generic conversion of any value into `class`
    fn convert(&self, _value: &Value, class: &str) -> ScriptResult<Value> {
        unsupported("conversion to", class)
    }

    /// Whether [`convert`](Self::convert) accepts this built-in value
    fn can_convert(&self, _value: &Value, _class: &str) -> bool {
        false
    }

    /// Evaluate a native default literal for a parameter of type `ty`
    ///
    /// The default understands numeric, boolean and quoted string literals
    /// plus the empty constructors `String()` and `Variant()`.
    fn literal(&self, ty: &ValueType, literal: &str) -> Value {
        let literal = literal.trim();
        match ty.kind {
            TypeKind::Number => literal
                .parse::<f64>()
                .or_else(|_| literal.trim_end_matches('f').parse::<f64>())
                .map(Value::Number)
                .unwrap_or(Value::Undefined),
            TypeKind::Boolean => Value::Bool(literal == "true"),
            TypeKind::String => match literal {
                "String()" => Value::String(String::new()),
                quoted if quoted.len() >= 2 && quoted.starts_with('"') && quoted.ends_with('"') => {
                    Value::String(quoted[1..quoted.len() - 1].to_string())
                }
                other => Value::String(other.to_string()),
            },
            _ => Value::Undefined,
        }
    }

    /// Cross-type operator symbols merged into a class's operator table
    fn cross_type_operators(&self, _class: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Host without any native facilities
///
/// Enough for construction paths that only assign fields or ingest buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}
