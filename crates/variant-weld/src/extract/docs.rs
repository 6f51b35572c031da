//! Documentation records and where they come from
//!
//! A record describes one class with three sections: members, methods and
//! constants. Records are JSON documents:
//!
//! ```json
//! {
//!   "name": "Vector2",
//!   "members": [{ "name": "x", "type": "float" }],
//!   "methods": [
//!     { "name": "lerp", "return": "Vector2",
//!       "arguments": [{ "name": "to", "type": "Vector2" },
//!                     { "name": "weight", "type": "float", "default": "0.5" }] }
//!   ],
//!   "constants": [{ "name": "ZERO", "value": "Vector2(0, 0)" }]
//! }
//! ```

use crate::error::{WeldError, WeldResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRecord {
    /// Class the record documents; may be omitted
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<DocMember>,
    #[serde(default)]
    pub methods: Vec<DocMethod>,
    #[serde(default)]
    pub constants: Vec<DocConstant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMethod {
    pub name: String,
    /// Native return type; absent for `void`
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub arguments: Vec<DocArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocArgument {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocConstant {
    pub name: String,
    pub value: String,
}

impl DocRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn member(mut self, name: &str, ty: &str) -> Self {
        self.members.push(DocMember {
            name: name.to_string(),
            ty: ty.to_string(),
            default: None,
        });
        self
    }

    pub fn method(mut self, method: DocMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constant(mut self, name: &str, value: &str) -> Self {
        self.constants.push(DocConstant {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

impl DocMethod {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            return_type: None,
            arguments: Vec::new(),
        }
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_type = Some(ty.to_string());
        self
    }

    pub fn arg(mut self, name: &str, ty: &str) -> Self {
        self.arguments.push(DocArgument {
            name: name.to_string(),
            ty: ty.to_string(),
            default: None,
            enumeration: None,
        });
        self
    }

    pub fn arg_default(mut self, name: &str, ty: &str, default: &str) -> Self {
        self.arguments.push(DocArgument {
            name: name.to_string(),
            ty: ty.to_string(),
            default: Some(default.to_string()),
            enumeration: None,
        });
        self
    }
}

/// Supplies one documentation record per class
pub trait DocSource {
    /// Fetch the record for `class`, or `None` when it has none
    fn record(&self, class: &str) -> WeldResult<Option<DocRecord>>;
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: HashMap<String, DocRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record keyed by its name
    pub fn insert(&mut self, record: DocRecord) {
        self.records.insert(record.name.clone(), record);
    }

    pub fn with(mut self, record: DocRecord) -> Self {
        self.insert(record);
        self
    }
}

impl DocSource for MemorySource {
    fn record(&self, class: &str) -> WeldResult<Option<DocRecord>> {
        Ok(self.records.get(class).cloned())
    }
}

/// A directory with one `<Class>.json` file per class
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, class: &str) -> PathBuf {
        self.root.join(format!("{}.json", class))
    }
}

impl DocSource for DirectorySource {
    fn record(&self, class: &str) -> WeldResult<Option<DocRecord>> {
        let path = self.path_for(class);
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), "docs.read");
        let text = fs::read_to_string(&path)?;
        let mut record: DocRecord =
            serde_json::from_str(&text).map_err(|source| WeldError::Record {
                path: path.clone(),
                source,
            })?;
        if record.name.is_empty() {
            record.name = class.to_string();
        }
        Ok(Some(record))
    }
}
