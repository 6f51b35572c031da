//! Schema store
//!
//! The ordered collection of class schemas. Its JSON form is the contract
//! between extraction and synthesis and can be persisted and diffed on its
//! own, so serialization is canonical: object keys sorted, two-space
//! indentation, trailing newline.

use crate::error::{WeldError, WeldResult};
use crate::ir::schema::ClassSchema;
use crate::ir::types::TypeTable;
use serde_json::Value;
use std::collections::HashSet;

/// Class schemas in configured order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStore {
    classes: Vec<ClassSchema>,
}

impl SchemaStore {
    pub fn new(classes: Vec<ClassSchema>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[ClassSchema] {
        &self.classes
    }

    pub fn class(&self, name: &str) -> Option<&ClassSchema> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Serialize to the canonical JSON artifact
    pub fn to_json(&self) -> WeldResult<String> {
        let value = canonicalize(serde_json::to_value(&self.classes)?);
        let mut json = serde_json::to_string_pretty(&value)?;
        json.push('\n');
        Ok(json)
    }

    /// Parse a previously written artifact
    pub fn from_json(json: &str) -> WeldResult<Self> {
        let classes: Vec<ClassSchema> = serde_json::from_str(json)?;
        Ok(Self { classes })
    }

    /// Check store-wide invariants against the mapping table
    ///
    /// Class names must be unique and every tag referenced by any schema
    /// must have a mapping entry.
    pub fn validate(&self, types: &TypeTable) -> WeldResult<()> {
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.name.as_str()) {
                return Err(WeldError::config(format!(
                    "class `{}` appears twice in the schema store",
                    class.name
                )));
            }
            types.require(&class.name, "class", &class.name)?;
            for (context, tag) in class.referenced_tags() {
                types.check_tag(&class.name, &context, tag)?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SchemaStore {
    type Item = &'a ClassSchema;
    type IntoIter = std::slice::Iter<'a, ClassSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}

/// Rebuild every object with its keys in sorted order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
