//! Type mapping table
//!
//! Bidirectional mapping between the host's native type names and the tags
//! exposed to scripts. Both stages consult it: the extractor maps documented
//! native names to tags, the synthesizer maps tags back to host type codes,
//! native spellings and marshaling strategies.
//!
//! | Native name(s)              | Tag          | Kind      |
//! |-----------------------------|--------------|-----------|
//! | `int`, `float`              | `number`     | number    |
//! | `bool`                      | `boolean`    | boolean   |
//! | `String`, `NodePath`, ...   | `string`     | string    |
//! | `Vector2`, `Color`, ...     | same name    | builtin   |
//! | `Variant`                   | `Variant`    | variant   |
//! | `Array`, `Dictionary`, ...  | `object`     | object    |
//!
//! `void` is not a tag; it marks methods without a return value.

use crate::error::{WeldError, WeldResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Return type marker for methods that produce no value
pub const VOID: &str = "void";

/// Tag of the boolean row, produced by comparison operators
pub const BOOLEAN: &str = "boolean";

/// How values of a tag cross the script boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Script number, host `real_t`
    Number,
    /// Script string, host `String`
    String,
    /// Script boolean, host `bool`
    Boolean,
    /// One of the configured built-in value classes
    Builtin,
    /// Any host value, converted through the generic dynamic path
    Variant,
    /// Host type known to be valid but not exposed structurally
    Object,
}

impl TypeKind {
    /// Whether values of this kind are validated against a host type code
    /// before conversion. Dynamic kinds accept anything.
    pub fn is_checked(&self) -> bool {
        !matches!(self, TypeKind::Variant | TypeKind::Object)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::Boolean => "boolean",
            TypeKind::Builtin => "builtin",
            TypeKind::Variant => "variant",
            TypeKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Script-facing tag
    pub tag: String,
    /// Marshaling kind
    pub kind: TypeKind,
    /// Native type names that alias to this tag
    #[serde(default)]
    pub natives: Vec<String>,
    /// Host type code, e.g. `Variant::VECTOR2`
    pub variant: String,
    /// Native spelling used for locals in generated code
    pub native: String,
}

impl TypeEntry {
    pub fn new(
        tag: impl Into<String>,
        kind: TypeKind,
        variant: impl Into<String>,
        native: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            kind,
            natives: Vec::new(),
            variant: variant.into(),
            native: native.into(),
        }
    }

    /// Add a native alias
    pub fn alias(mut self, native: impl Into<String>) -> Self {
        self.natives.push(native.into());
        self
    }

    /// Create a built-in class entry whose tag and native name are the class name
    pub fn builtin(class: &str, variant: impl Into<String>) -> Self {
        Self::new(class, TypeKind::Builtin, variant, class).alias(class)
    }

    pub fn is_builtin(&self) -> bool {
        self.kind == TypeKind::Builtin
    }
}

/// The mapping table, indexed in both directions
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    by_tag: HashMap<String, usize>,
    by_native: HashMap<String, usize>,
}

impl TypeTable {
    /// Build a table, rejecting duplicate tags and native names claimed by
    /// two different tags
    pub fn new(entries: Vec<TypeEntry>) -> WeldResult<Self> {
        let mut by_tag = HashMap::new();
        let mut by_native = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if entry.tag == VOID {
                return Err(WeldError::config("`void` is reserved and cannot be a type tag"));
            }
            if by_tag.insert(entry.tag.clone(), index).is_some() {
                return Err(WeldError::config(format!(
                    "duplicate type tag `{}`",
                    entry.tag
                )));
            }
            for native in &entry.natives {
                if let Some(previous) = by_native.insert(native.clone(), index) {
                    if previous != index {
                        return Err(WeldError::config(format!(
                            "native type `{}` is mapped to both `{}` and `{}`",
                            native, entries[previous].tag, entry.tag
                        )));
                    }
                }
            }
        }

        Ok(Self {
            entries,
            by_tag,
            by_native,
        })
    }

    /// All entries, in declaration order
    pub fn entries(&self) -> &[TypeEntry] {
        &self.entries
    }

    /// Look up the entry for a script tag
    pub fn entry(&self, tag: &str) -> Option<&TypeEntry> {
        self.by_tag.get(tag).map(|&i| &self.entries[i])
    }

    /// Look up the entry a native type name aliases to
    pub fn resolve_native(&self, native: &str) -> Option<&TypeEntry> {
        self.by_native.get(native).map(|&i| &self.entries[i])
    }

    /// Native names that map to a tag (reverse direction)
    pub fn natives_for(&self, tag: &str) -> &[String] {
        self.entry(tag).map(|e| e.natives.as_slice()).unwrap_or(&[])
    }

    /// Map a documented native type to its tag, failing on unmapped names
    pub fn map_native(&self, class: &str, context: &str, native: &str) -> WeldResult<String> {
        self.resolve_native(native)
            .map(|e| e.tag.clone())
            .ok_or_else(|| WeldError::unmapped(class, context, native))
    }

    /// Map a documented return type, keeping `void` as is
    pub fn map_return(&self, class: &str, context: &str, native: &str) -> WeldResult<String> {
        if native == VOID {
            Ok(VOID.to_string())
        } else {
            self.map_native(class, context, native)
        }
    }

    /// Fetch the entry for a tag referenced by a schema
    pub fn require(&self, class: &str, context: &str, tag: &str) -> WeldResult<&TypeEntry> {
        self.entry(tag).ok_or_else(|| WeldError::UnknownTag {
            class: class.to_string(),
            context: context.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Check that a tag (or `void`) exists
    pub fn check_tag(&self, class: &str, context: &str, tag: &str) -> WeldResult<()> {
        if tag == VOID {
            return Ok(());
        }
        self.require(class, context, tag).map(|_| ())
    }
}
