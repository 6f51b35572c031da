//! Override configuration
//!
//! Everything the generator needs besides the documentation records lives in
//! one declarative TOML document:
//!
//! - `classes`: the ordered list of built-in classes to bind
//! - `[[types]]`: the type mapping table
//! - `[operators.<name>]`: the operator descriptor catalog
//! - `[class.<Name>]`: per-class overrides (arity cap, ignore list, property
//!   remaps, catalog operators, delegation prefixes, constructor overloads,
//!   packed-array element descriptor)
//!
//! A document for the standard built-in set is compiled into the crate and
//! available through [`WeldConfig::builtin`]. Adding a built-in class is a
//! data change to that document.

pub mod catalog;
pub mod constructors;

pub use catalog::*;
pub use constructors::*;

use crate::error::{WeldError, WeldResult};
use crate::ir::types::{TypeEntry, TypeKind, TypeTable};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default configuration for the standard built-in classes
pub const BUILTIN_CONFIG: &str = include_str!("../../config/builtins.toml");

/// Raw configuration document as written in TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    pub classes: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub operators: BTreeMap<String, OperatorTemplate>,
    #[serde(default)]
    pub class: BTreeMap<String, ClassOverrides>,
}

/// Per-class override tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassOverrides {
    /// Arity advertised at constructor registration
    #[serde(default)]
    pub constructor_argc: usize,
    /// Members, methods and constants left out of the schema
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Property name to native accessor path
    #[serde(default)]
    pub remap: BTreeMap<String, String>,
    /// Catalog operator names, in registration order
    #[serde(default)]
    pub operators: Vec<String>,
    /// Method name prefixes routed through the dynamic call path
    #[serde(default)]
    pub delegate_prefixes: Vec<String>,
    /// Native name prefix rewrites for delegated methods
    #[serde(default)]
    pub native_renames: BTreeMap<String, String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorOverload>,
    /// Present for fixed-element array containers
    #[serde(default)]
    pub array: Option<ArrayConfig>,
}

impl ClassOverrides {
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|n| n == name)
    }

    /// Native accessor path for a property
    pub fn native_path<'a>(&'a self, property: &'a str) -> &'a str {
        self.remap.get(property).map(String::as_str).unwrap_or(property)
    }

    pub fn is_delegated(&self, method: &str) -> bool {
        self.delegate_prefixes.iter().any(|p| method.starts_with(p.as_str()))
    }

    /// Apply the longest matching rename prefix to a delegated native name
    pub fn rename_native(&self, native: &str) -> String {
        self.native_renames
            .iter()
            .filter(|(prefix, _)| native.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, replacement)| format!("{}{}", replacement, &native[prefix.len()..]))
            .unwrap_or_else(|| native.to_string())
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct WeldConfig {
    classes: Vec<String>,
    types: TypeTable,
    catalog: OperatorCatalog,
    overrides: BTreeMap<String, ClassOverrides>,
}

impl WeldConfig {
    /// Load the embedded default configuration
    pub fn builtin() -> WeldResult<Self> {
        Self::from_toml(BUILTIN_CONFIG)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> WeldResult<Self> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "config.load");
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> WeldResult<Self> {
        let document: ConfigDocument = toml::from_str(text)?;
        Self::from_document(document)
    }

    /// Validate a raw document
    ///
    /// Every configured class ends up with an override entry (empty when the
    /// document has none), so lookups for configured classes never fail.
    pub fn from_document(document: ConfigDocument) -> WeldResult<Self> {
        let ConfigDocument {
            classes,
            types,
            operators,
            class: mut overrides,
        } = document;

        if classes.is_empty() {
            return Err(WeldError::config("no classes configured"));
        }
        let mut seen = HashSet::new();
        for name in &classes {
            if !seen.insert(name.as_str()) {
                return Err(WeldError::config(format!("class `{}` listed twice", name)));
            }
        }
        if let Some(stray) = overrides.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(WeldError::config(format!(
                "overrides given for `{}`, which is not a configured class",
                stray
            )));
        }

        let types = TypeTable::new(types)?;
        let catalog = OperatorCatalog::new(operators);
        catalog.validate(&types)?;

        for name in &classes {
            let entry = types.require(name, "class", name)?;
            if entry.kind != TypeKind::Builtin {
                return Err(WeldError::config(format!(
                    "type entry for class `{}` must have kind `builtin`, found `{}`",
                    name, entry.kind
                )));
            }
            let class_overrides = overrides.entry(name.clone()).or_default();
            catalog.operators_for(name, &class_overrides.operators)?;
            validate_constructors(name, class_overrides, &types)?;
        }

        debug!(
            classes = classes.len(),
            types = types.entries().len(),
            operators = catalog.names().count(),
            "config.loaded"
        );

        Ok(Self {
            classes,
            types,
            catalog,
            overrides,
        })
    }

    /// Configured classes, in registration order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn catalog(&self) -> &OperatorCatalog {
        &self.catalog
    }

    pub fn overrides(&self, class: &str) -> WeldResult<&ClassOverrides> {
        self.overrides
            .get(class)
            .ok_or_else(|| WeldError::config(format!("class `{}` is not configured", class)))
    }
}

fn validate_constructors(class: &str, overrides: &ClassOverrides, types: &TypeTable) -> WeldResult<()> {
    for (index, overload) in overrides.constructors.iter().enumerate() {
        let context = format!("constructor #{}", index);
        let bad = |detail: String| WeldError::config(format!("{}.{}: {}", class, context, detail));

        let mut seen_default = false;
        for param in &overload.params {
            if param.is_convertible() {
                if overload.params.len() != 1 {
                    return Err(bad("`convertible` is only allowed as the sole parameter".into()));
                }
            } else {
                types.require(class, &context, &param.ty)?;
            }
            if param.convert.is_some() && param.ty != "number" {
                return Err(bad(format!("conversion applies to numbers, not `{}`", param.ty)));
            }
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(bad("parameters with defaults must be trailing".into()));
            }
        }

        if overload.init.is_empty() {
            return Err(bad("overload has no init steps".into()));
        }
        if let Some(arg) = overload
            .referenced_args()
            .into_iter()
            .find(|&arg| arg >= overload.params.len())
        {
            return Err(bad(format!(
                "init step reads argument {} but only {} declared",
                arg,
                overload.params.len()
            )));
        }
    }
    Ok(())
}
