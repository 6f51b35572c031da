//! Class schema records
//!
//! A [`ClassSchema`] is the normalized description of one built-in class:
//! what the extractor produces and the synthesizer consumes. Schemas are
//! plain data and serialize to the intermediate JSON artifact.

use crate::ir::types::{BOOLEAN, VOID};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation codes understood by the host's operator-evaluation facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCode {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Positive,
    Module,
}

impl OperatorCode {
    /// Host spelling of the code
    pub fn native(&self) -> &'static str {
        match self {
            OperatorCode::Equal => "Variant::OP_EQUAL",
            OperatorCode::NotEqual => "Variant::OP_NOT_EQUAL",
            OperatorCode::Less => "Variant::OP_LESS",
            OperatorCode::LessEqual => "Variant::OP_LESS_EQUAL",
            OperatorCode::Greater => "Variant::OP_GREATER",
            OperatorCode::GreaterEqual => "Variant::OP_GREATER_EQUAL",
            OperatorCode::Add => "Variant::OP_ADD",
            OperatorCode::Subtract => "Variant::OP_SUBTRACT",
            OperatorCode::Multiply => "Variant::OP_MULTIPLY",
            OperatorCode::Divide => "Variant::OP_DIVIDE",
            OperatorCode::Negate => "Variant::OP_NEGATE",
            OperatorCode::Positive => "Variant::OP_POSITIVE",
            OperatorCode::Module => "Variant::OP_MODULE",
        }
    }

    /// Key in the script engine's operator table, if the engine overloads it
    ///
    /// The engine derives `!=`, `<=`, `>` and `>=` from `==` and `<`, so
    /// those codes have no symbol of their own.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            OperatorCode::Equal => Some("=="),
            OperatorCode::Less => Some("<"),
            OperatorCode::Add => Some("+"),
            OperatorCode::Subtract => Some("-"),
            OperatorCode::Multiply => Some("*"),
            OperatorCode::Divide => Some("/"),
            OperatorCode::Module => Some("%"),
            OperatorCode::Negate => Some("neg"),
            OperatorCode::Positive => Some("pos"),
            OperatorCode::NotEqual
            | OperatorCode::LessEqual
            | OperatorCode::Greater
            | OperatorCode::GreaterEqual => None,
        }
    }

    /// Whether the code takes no operand
    pub fn is_unary(&self) -> bool {
        matches!(self, OperatorCode::Negate | OperatorCode::Positive)
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native())
    }
}

/// What an operator wrapper hands back to the script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum ReturnCategory {
    /// A new value of the receiver's class
    OwnType,
    /// A new value of an explicitly declared tag
    Declared(String),
    /// A boolean
    Boolean,
    /// The receiver is overwritten with the result and returned
    MutateReceiver,
}

impl ReturnCategory {
    /// Resolve the returned tag for a receiver of `class`
    pub fn tag(&self, class: &str) -> String {
        match self {
            ReturnCategory::OwnType | ReturnCategory::MutateReceiver => class.to_string(),
            ReturnCategory::Declared(tag) => tag.clone(),
            ReturnCategory::Boolean => BOOLEAN.to_string(),
        }
    }

    pub fn mutates_receiver(&self) -> bool {
        matches!(self, ReturnCategory::MutateReceiver)
    }
}

/// A script-visible field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    /// Script-facing identifier
    pub name: String,
    /// Script type tag
    #[serde(rename = "type")]
    pub ty: String,
    /// Accessor path into the host value (`x`, `normal.x`, `elements[0]`)
    pub native: String,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            native: name.clone(),
            name,
            ty: ty.into(),
        }
    }

    pub fn with_native(mut self, path: impl Into<String>) -> Self {
        self.native = path.into();
        self
    }
}

/// A method or operator argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    /// Documented parameter name
    #[serde(default)]
    pub name: String,
    /// Script type tag
    #[serde(rename = "type")]
    pub ty: String,
    /// Default literal, in host syntax
    pub default_value: Option<String>,
    pub has_default_value: bool,
    /// Host enumeration the numeric value is cast to at the call site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default_value: None,
            has_default_value: false,
            enumeration: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self.has_default_value = true;
        self
    }

    pub fn with_enumeration(mut self, enumeration: impl Into<String>) -> Self {
        self.enumeration = Some(enumeration.into());
        self
    }
}

/// A callable member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method {
    /// Script-facing name
    pub name: String,
    /// Native entry point, or dispatch key when delegated
    pub native_method: String,
    /// Return tag, or `void`
    #[serde(rename = "return")]
    pub return_type: String,
    pub arguments: Vec<Argument>,
    /// Route through the host's dynamic call path instead of a direct call
    pub delegated: bool,
    /// Element read through the container's index operator
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            native_method: name.clone(),
            name,
            return_type: VOID.to_string(),
            arguments: Vec::new(),
            delegated: false,
            indexed: false,
        }
    }

    pub fn returns(mut self, tag: impl Into<String>) -> Self {
        self.return_type = tag.into();
        self
    }

    pub fn arg(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_native(mut self, native: impl Into<String>) -> Self {
        self.native_method = native.into();
        self
    }

    pub fn delegated(mut self) -> Self {
        self.delegated = true;
        self
    }

    /// The synthetic `get(index)` accessor appended to array containers
    pub fn element_getter() -> Self {
        let mut method = Method::new("get")
            .with_native("operator[]")
            .returns("Variant")
            .arg(Argument::new("index", "number"));
        method.indexed = true;
        method
    }

    pub fn is_void(&self) -> bool {
        self.return_type == VOID
    }

    /// Number of trailing arguments that may be omitted
    pub fn optional_count(&self) -> usize {
        self.arguments
            .iter()
            .rev()
            .take_while(|a| a.has_default_value)
            .count()
    }
}

/// An operator entry sourced from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub code: OperatorCode,
    /// Zero (unary) or one (binary) operand
    pub arguments: Vec<Argument>,
    #[serde(rename = "return")]
    pub returns: ReturnCategory,
}

impl Operator {
    pub fn is_binary(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Operand tag for binary operators
    pub fn operand(&self) -> Option<&str> {
        self.arguments.first().map(|a| a.ty.as_str())
    }
}

/// A class-scoped constant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: String,
}

/// Normalized description of one built-in class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    pub name: String,
    /// Arity advertised when registering the constructor
    pub constructor_argc: usize,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub operators: Vec<Operator>,
    pub constants: Vec<Constant>,
}

impl ClassSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor_argc: 0,
            properties: Vec::new(),
            methods: Vec::new(),
            operators: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn with_argc(mut self, argc: usize) -> Self {
        self.constructor_argc = argc;
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.push(Constant {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Every name that appears anywhere in the schema
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.methods.iter().map(|m| m.name.as_str()))
            .chain(self.operators.iter().map(|o| o.name.as_str()))
            .chain(self.constants.iter().map(|c| c.name.as_str()))
    }

    /// Every tag referenced by the schema, with a description of where
    pub fn referenced_tags(&self) -> Vec<(String, &str)> {
        let mut tags = Vec::new();
        for p in &self.properties {
            tags.push((p.name.clone(), p.ty.as_str()));
        }
        for m in &self.methods {
            tags.push((format!("{}()", m.name), m.return_type.as_str()));
            for (i, a) in m.arguments.iter().enumerate() {
                tags.push((format!("{}(#{})", m.name, i), a.ty.as_str()));
            }
        }
        for o in &self.operators {
            match &o.returns {
                ReturnCategory::Declared(tag) => tags.push((o.name.clone(), tag.as_str())),
                ReturnCategory::Boolean => tags.push((o.name.clone(), BOOLEAN)),
                _ => {}
            }
            for a in &o.arguments {
                tags.push((o.name.clone(), a.ty.as_str()));
            }
        }
        tags
    }
}
