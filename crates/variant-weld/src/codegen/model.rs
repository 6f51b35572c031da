//! Code model
//!
//! Structured description of the glue code for a set of classes. The
//! synthesizer builds it from the schema store; emitters render it to text
//! and the reference binder evaluates it directly.

use crate::config::ElementKind;
use crate::ir::schema::OperatorCode;
use crate::ir::types::{TypeEntry, TypeKind};

/// A resolved type tag with everything marshaling needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueType {
    pub tag: String,
    pub kind: TypeKind,
    /// Host type code
    pub variant: String,
    /// Native spelling
    pub native: String,
}

impl ValueType {
    pub fn is_checked(&self) -> bool {
        self.kind.is_checked()
    }

    pub fn is_builtin(&self) -> bool {
        self.kind == TypeKind::Builtin
    }
}

impl From<&TypeEntry> for ValueType {
    fn from(entry: &TypeEntry) -> Self {
        Self {
            tag: entry.tag.clone(),
            kind: entry.kind,
            variant: entry.variant.clone(),
            native: entry.native.clone(),
        }
    }
}

/// How a script value becomes a native one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Number,
    /// Number read as an unsigned integer
    Uint,
    String,
    Boolean,
    /// Built-in value of the named class
    Builtin(String),
    /// Generic dynamic conversion
    Dynamic,
}

impl Conversion {
    pub fn for_type(ty: &ValueType) -> Self {
        match ty.kind {
            TypeKind::Number => Conversion::Number,
            TypeKind::String => Conversion::String,
            TypeKind::Boolean => Conversion::Boolean,
            TypeKind::Builtin => Conversion::Builtin(ty.tag.clone()),
            TypeKind::Variant | TypeKind::Object => Conversion::Dynamic,
        }
    }
}

/// Every generated binding, in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingUnit {
    pub classes: Vec<ClassBinding>,
}

impl BindingUnit {
    pub fn class(&self, name: &str) -> Option<&ClassBinding> {
        self.classes.iter().find(|c| c.class == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassBinding {
    pub class: String,
    pub ty: ValueType,
    /// Arity passed to the class registration
    pub arity: usize,
    pub constructor: ConstructorDispatcher,
    /// `None` when the class exposes no properties
    pub accessors: Option<PropertyAccessors>,
    pub methods: Vec<MethodWrapper>,
    pub operators: Vec<OperatorWrapper>,
    pub constants: Vec<ConstantBinding>,
    /// Element type for fixed-element array containers
    pub element: Option<ElementKind>,
}

impl ClassBinding {
    pub fn method(&self, name: &str) -> Option<&MethodWrapper> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn operator(&self, name: &str) -> Option<&OperatorWrapper> {
        self.operators.iter().find(|o| o.name == name)
    }

    /// Operators bound into the class's operator table
    pub fn table_operators(&self) -> impl Iterator<Item = &OperatorWrapper> {
        self.operators.iter().filter(|o| o.in_operator_table())
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// Constructor dispatch keyed by argument count, then by first-argument shape
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDispatcher {
    pub class: String,
    /// Disjoint arity ranges; counts outside every arm yield a default instance
    pub arms: Vec<ArityArm>,
}

impl ConstructorDispatcher {
    pub fn arm_for(&self, argc: usize) -> Option<&ArityArm> {
        self.arms.iter().find(|arm| arm.accepts(argc))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArityArm {
    pub min: usize,
    pub max: usize,
    /// Tried in order; the first matching guard wins
    pub cases: Vec<ShapeCase>,
    /// Type error raised under debug validation when no case matches
    pub expected: Option<String>,
}

impl ArityArm {
    pub fn accepts(&self, argc: usize) -> bool {
        self.min <= argc && argc <= self.max
    }
}

/// Runtime shape test on the first argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeGuard {
    Always,
    Number,
    String,
    Boolean,
    Array,
    ArrayBuffer,
    DataView,
    /// Built-in value of exactly this type
    Builtin(ValueType),
    /// Built-in value the host converts to the constructed class
    Convertible,
}

impl ShapeGuard {
    /// Name used in "expected" messages
    pub fn describe(&self, class: &str) -> String {
        match self {
            ShapeGuard::Always => "any value".to_string(),
            ShapeGuard::Number => "number".to_string(),
            ShapeGuard::String => "string".to_string(),
            ShapeGuard::Boolean => "boolean".to_string(),
            ShapeGuard::Array => "Array".to_string(),
            ShapeGuard::ArrayBuffer => "ArrayBuffer".to_string(),
            ShapeGuard::DataView => "DataView".to_string(),
            ShapeGuard::Builtin(ty) => ty.tag.clone(),
            ShapeGuard::Convertible => format!("value convertible to {}", class),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCase {
    pub guard: ShapeGuard,
    /// Parameter list for error messages, e.g. `position, size`
    pub signature: String,
    pub params: Vec<ParamSlot>,
    pub actions: Vec<InitAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSlot {
    pub index: usize,
    /// `None` for parameters accepting any convertible value
    pub ty: Option<ValueType>,
    pub conversion: Conversion,
    /// Validated against its type under the debug condition
    pub validate: bool,
    /// Literal used when the argument is omitted
    pub default: Option<String>,
}

impl ParamSlot {
    pub fn type_error(&self, class: &str, signature: &str) -> String {
        let tag = self.ty.as_ref().map(|t| t.tag.as_str()).unwrap_or("value");
        format!(
            "{} expected for argument {} of {}({})",
            tag, self.index, class, signature
        )
    }
}

/// Step applied to the default-constructed instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitAction {
    Assign { path: String, arg: usize },
    Broadcast { paths: Vec<String>, arg: usize },
    Replace { arg: usize },
    Construct { args: Vec<usize> },
    Factory { function: String, args: Vec<usize> },
    Invoke { method: String, args: Vec<usize> },
    /// Generic dynamic conversion of the argument into the class
    Convert { arg: usize },
    /// Fill elements from a contiguous byte buffer
    IngestBuffer { arg: usize, element: ElementKind },
    /// Fill elements from a typed view over a buffer
    IngestView { arg: usize, element: ElementKind },
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// One getter and one setter per class, switching on the slot index
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessors {
    pub slots: Vec<PropertySlot>,
}

impl PropertyAccessors {
    pub fn slot(&self, name: &str) -> Option<&PropertySlot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySlot {
    pub index: usize,
    pub name: String,
    /// Accessor path into the native value
    pub path: String,
    pub ty: ValueType,
}

impl PropertySlot {
    pub fn type_error(&self, class: &str) -> String {
        format!("{} expected for {}.{}", self.ty.tag, class, self.name)
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MethodWrapper {
    pub name: String,
    pub args: Vec<ArgSlot>,
    pub call: CallKind,
    /// `None` for void methods
    pub returns: Option<ValueType>,
}

impl MethodWrapper {
    /// Arity advertised to the script engine
    pub fn argc(&self) -> usize {
        self.args.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgSlot {
    pub index: usize,
    pub ty: ValueType,
    pub conversion: Conversion,
    pub validate: bool,
    /// Native literal used when the caller passes fewer arguments
    pub default: Option<String>,
    /// Enumeration the value is cast to at the call site
    pub enumeration: Option<String>,
}

impl ArgSlot {
    pub fn type_error(&self, class: &str, method: &str) -> String {
        format!(
            "{} expected for argument {} of {}.{}",
            self.ty.tag, self.index, class, method
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    /// Direct call of the native entry point
    Direct { native: String },
    /// Host's dynamic-dispatch call keyed by native name
    Delegated { native: String },
    /// Container index operator
    Index,
}

// ---------------------------------------------------------------------------
// Operators and constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorWrapper {
    pub name: String,
    pub code: OperatorCode,
    /// Operator-table key, if the engine overloads this code
    pub symbol: Option<String>,
    /// Operand type for binary operators
    pub operand: Option<ValueType>,
    pub returns: ValueType,
    /// Overwrite the receiver and return it
    pub mutates: bool,
}

impl OperatorWrapper {
    /// Receiver plus operand
    pub fn argc(&self) -> usize {
        1 + usize::from(self.operand.is_some())
    }

    pub fn in_operator_table(&self) -> bool {
        self.symbol.is_some() && !self.mutates
    }

    pub fn type_error(&self, class: &str) -> String {
        let tag = self.operand.as_ref().map(|t| t.tag.as_str()).unwrap_or("value");
        format!("{} expected for {}.{}", tag, class, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBinding {
    pub name: String,
    pub value: String,
}
