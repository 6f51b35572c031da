//! Script-side value model used by the reference binder

use std::collections::BTreeMap;
use std::fmt;

/// A script value as seen by generated glue
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Number(f64),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
    ArrayBuffer(Vec<u8>),
    /// Typed view over a byte buffer
    DataView {
        buffer: Vec<u8>,
        offset: usize,
        length: usize,
    },
    /// A bound built-in instance
    Builtin(Instance),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Builtin(instance) => Some(instance),
            _ => None,
        }
    }

    /// Name used in diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Array(_) => "Array",
            Value::ArrayBuffer(_) => "ArrayBuffer",
            Value::DataView { .. } => "DataView",
            Value::Builtin(instance) => instance.class(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Builtin(instance)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(items) => write!(f, "[{} items]", items.len()),
            Value::ArrayBuffer(bytes) => write!(f, "ArrayBuffer({})", bytes.len()),
            Value::DataView { length, .. } => write!(f, "DataView({})", length),
            Value::Builtin(instance) => write!(f, "{}", instance.class()),
        }
    }
}

/// Storage of a built-in instance
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceData {
    /// Named native fields; nested values are instances themselves
    Fields(BTreeMap<String, Value>),
    /// Elements of an array container
    Elements(Vec<Value>),
}

/// A built-in value owned by the script
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    data: InstanceData,
}

impl Instance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            data: InstanceData::Fields(BTreeMap::new()),
        }
    }

    pub fn with_elements(class: impl Into<String>, elements: Vec<Value>) -> Self {
        Self {
            class: class.into(),
            data: InstanceData::Elements(elements),
        }
    }

    /// Builder form of [`set_field`](Self::set_field)
    pub fn field(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set_field(path, value.into());
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn data(&self) -> &InstanceData {
        &self.data
    }

    /// Read a native accessor path such as `position.x` or `elements[0]`
    pub fn get(&self, path: &str) -> Option<&Value> {
        let InstanceData::Fields(fields) = &self.data else {
            return None;
        };
        match path.split_once('.') {
            None => fields.get(path),
            Some((head, rest)) => fields.get(head)?.as_instance()?.get(rest),
        }
    }

    /// Write a native accessor path, creating intermediate instances
    ///
    /// Has no effect on element containers.
    pub fn set_field(&mut self, path: &str, value: Value) {
        let InstanceData::Fields(fields) = &mut self.data else {
            return;
        };
        match path.split_once('.') {
            None => {
                fields.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let slot = fields
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Builtin(Instance::new("")));
                if !matches!(slot, Value::Builtin(_)) {
                    *slot = Value::Builtin(Instance::new(""));
                }
                if let Value::Builtin(inner) = slot {
                    inner.set_field(rest, value);
                }
            }
        }
    }

    pub fn elements(&self) -> Option<&[Value]> {
        match &self.data {
            InstanceData::Elements(elements) => Some(elements),
            InstanceData::Fields(_) => None,
        }
    }

    pub fn set_elements(&mut self, elements: Vec<Value>) {
        self.data = InstanceData::Elements(elements);
    }
}
