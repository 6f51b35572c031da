//! Constructor overload table and packed-array element descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameter type that accepts any built-in value the host can convert to
/// the constructed class
pub const CONVERTIBLE: &str = "convertible";

/// One declared constructor overload
///
/// The overload's arity range follows from its parameters: trailing
/// parameters with a default may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorOverload {
    #[serde(default)]
    pub params: Vec<ConstructorParam>,
    /// Steps applied in order to the default-constructed instance
    #[serde(default)]
    pub init: Vec<InitStep>,
}

impl ConstructorOverload {
    /// Smallest and largest call-time argument count this overload accepts
    pub fn arity(&self) -> (usize, usize) {
        let optional = self
            .params
            .iter()
            .rev()
            .take_while(|p| p.default.is_some())
            .count();
        (self.params.len() - optional, self.params.len())
    }

    /// Parameter list as shown in error messages, e.g. `position, size`
    pub fn signature(&self) -> String {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.name.is_empty() {
                    format!("arg{}", i)
                } else {
                    p.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Argument indices read by the init steps
    pub fn referenced_args(&self) -> Vec<usize> {
        self.init.iter().flat_map(InitStep::args).collect()
    }
}

/// A constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorParam {
    #[serde(default)]
    pub name: String,
    /// Script tag, or `convertible`
    #[serde(rename = "type")]
    pub ty: String,
    /// Alternative numeric conversion
    #[serde(default)]
    pub convert: Option<ParamConversion>,
    /// Literal used when the caller omits a trailing argument
    #[serde(default)]
    pub default: Option<String>,
}

impl ConstructorParam {
    pub fn is_convertible(&self) -> bool {
        self.ty == CONVERTIBLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamConversion {
    /// Unsigned integer, e.g. a packed `0xRRGGBBAA` color
    Uint,
}

/// Initialization step applied to the default-constructed instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InitStep {
    /// `tmp.<path> = arg`
    Assign { path: String, arg: usize },
    /// `tmp.<p> = arg` for every path
    Broadcast { paths: Vec<String>, arg: usize },
    /// `tmp = arg`
    Replace { arg: usize },
    /// `tmp = Class(args...)`
    Construct { args: Vec<usize> },
    /// `tmp = <function>(args...)`
    Factory { function: String, args: Vec<usize> },
    /// `tmp.<method>(args...)`
    Invoke { method: String, args: Vec<usize> },
    /// `tmp = arg` through the host's dynamic conversion
    Convert { arg: usize },
}

impl InitStep {
    pub fn args(&self) -> Vec<usize> {
        match self {
            InitStep::Assign { arg, .. }
            | InitStep::Broadcast { arg, .. }
            | InitStep::Replace { arg }
            | InitStep::Convert { arg } => vec![*arg],
            InitStep::Construct { args }
            | InitStep::Factory { args, .. }
            | InitStep::Invoke { args, .. } => args.clone(),
        }
    }
}

/// Element descriptor of a fixed-element array container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrayConfig {
    pub element: ElementKind,
}

/// Element type stored by a packed array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Byte,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Vector2,
    Vector3,
    Color,
}

impl ElementKind {
    /// Size of one element in a raw buffer; `None` when elements are not
    /// fixed-width and cannot be read from bytes
    pub fn stride(&self) -> Option<usize> {
        match self {
            ElementKind::Byte => Some(1),
            ElementKind::Int32 | ElementKind::Float32 => Some(4),
            ElementKind::Int64 | ElementKind::Float64 | ElementKind::Vector2 => Some(8),
            ElementKind::Vector3 => Some(12),
            ElementKind::Color => Some(16),
            ElementKind::String => None,
        }
    }

    /// Native element spelling
    pub fn native(&self) -> &'static str {
        match self {
            ElementKind::Byte => "uint8_t",
            ElementKind::Int32 => "int32_t",
            ElementKind::Int64 => "int64_t",
            ElementKind::Float32 => "float",
            ElementKind::Float64 => "double",
            ElementKind::String => "String",
            ElementKind::Vector2 => "Vector2",
            ElementKind::Vector3 => "Vector3",
            ElementKind::Color => "Color",
        }
    }

    /// Number of numeric components per element
    pub fn components(&self) -> usize {
        match self {
            ElementKind::Vector2 => 2,
            ElementKind::Vector3 => 3,
            ElementKind::Color => 4,
            _ => 1,
        }
    }

    /// Decode one little-endian element
    ///
    /// `chunk` must be exactly [`stride`](Self::stride) bytes long.
    pub fn decode(&self, chunk: &[u8]) -> Vec<f64> {
        match self {
            ElementKind::Byte => chunk.iter().map(|&b| f64::from(b)).collect(),
            ElementKind::Int32 => vec![f64::from(i32::from_le_bytes(word(chunk)))],
            ElementKind::Int64 => vec![i64::from_le_bytes(dword(chunk)) as f64],
            ElementKind::Float64 => vec![f64::from_le_bytes(dword(chunk))],
            ElementKind::Float32
            | ElementKind::Vector2
            | ElementKind::Vector3
            | ElementKind::Color => chunk
                .chunks_exact(4)
                .map(|c| f64::from(f32::from_le_bytes(word(c))))
                .collect(),
            ElementKind::String => Vec::new(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native())
    }
}

fn word(bytes: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[..4]);
    out
}

fn dword(bytes: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&bytes[..8]);
    out
}
