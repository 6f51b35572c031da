//! Operator descriptor catalog
//!
//! Operators never come from documentation records. Each class lists the
//! catalog templates it supports, and the extractor instantiates them with
//! the class's own name standing in for `self`.

use crate::error::{WeldError, WeldResult};
use crate::ir::schema::{Argument, Operator, OperatorCode, ReturnCategory};
use crate::ir::types::{TypeTable, BOOLEAN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for the receiver's class in operands and returns
pub const SELF: &str = "self";

/// Return marker for operators that overwrite and return the receiver
pub const RECEIVER: &str = "receiver";

/// A class-independent operator descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorTemplate {
    pub code: OperatorCode,
    /// `self` or a tag; absent for unary operators
    #[serde(default)]
    pub operand: Option<String>,
    /// `self`, `receiver`, `boolean` or a tag
    pub returns: String,
}

impl OperatorTemplate {
    pub fn return_category(&self) -> ReturnCategory {
        match self.returns.as_str() {
            SELF => ReturnCategory::OwnType,
            RECEIVER => ReturnCategory::MutateReceiver,
            BOOLEAN => ReturnCategory::Boolean,
            tag => ReturnCategory::Declared(tag.to_string()),
        }
    }

    /// Produce the operator entry for `class`
    pub fn instantiate(&self, name: &str, class: &str) -> Operator {
        let arguments = self
            .operand
            .iter()
            .map(|operand| {
                let ty = if operand == SELF { class } else { operand.as_str() };
                Argument::new("other", ty)
            })
            .collect();

        Operator {
            name: name.to_string(),
            code: self.code,
            arguments,
            returns: self.return_category(),
        }
    }
}

/// Named operator templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorCatalog {
    templates: BTreeMap<String, OperatorTemplate>,
}

impl OperatorCatalog {
    pub fn new(templates: BTreeMap<String, OperatorTemplate>) -> Self {
        Self { templates }
    }

    pub fn template(&self, name: &str) -> Option<&OperatorTemplate> {
        self.templates.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Instantiate the listed templates for `class`, in list order
    pub fn operators_for(&self, class: &str, names: &[String]) -> WeldResult<Vec<Operator>> {
        names
            .iter()
            .map(|name| {
                self.template(name)
                    .map(|template| template.instantiate(name, class))
                    .ok_or_else(|| {
                        WeldError::config(format!(
                            "class `{}` lists unknown operator `{}`",
                            class, name
                        ))
                    })
            })
            .collect()
    }

    /// Check operand arity against the code and every referenced tag
    pub fn validate(&self, types: &TypeTable) -> WeldResult<()> {
        for (name, template) in &self.templates {
            if template.code.is_unary() != template.operand.is_none() {
                return Err(WeldError::config(format!(
                    "operator `{}`: {} takes {} operand",
                    name,
                    template.code,
                    if template.code.is_unary() { "no" } else { "one" }
                )));
            }
            if let Some(operand) = template.operand.as_deref().filter(|o| *o != SELF) {
                types.require("operators", name, operand)?;
            }
            match template.return_category() {
                ReturnCategory::Declared(tag) => {
                    types.require("operators", name, &tag)?;
                }
                ReturnCategory::Boolean => {
                    types.require("operators", name, BOOLEAN)?;
                }
                ReturnCategory::OwnType | ReturnCategory::MutateReceiver => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{TypeEntry, TypeKind};

    fn catalog() -> OperatorCatalog {
        let mut templates = BTreeMap::new();
        templates.insert(
            "equals".to_string(),
            OperatorTemplate {
                code: OperatorCode::Equal,
                operand: Some(SELF.into()),
                returns: "boolean".into(),
            },
        );
        templates.insert(
            "add_assign".to_string(),
            OperatorTemplate {
                code: OperatorCode::Add,
                operand: Some(SELF.into()),
                returns: RECEIVER.into(),
            },
        );
        templates.insert(
            "negate".to_string(),
            OperatorTemplate {
                code: OperatorCode::Negate,
                operand: None,
                returns: SELF.into(),
            },
        );
        OperatorCatalog::new(templates)
    }

    #[test]
    fn test_instantiate_substitutes_class() {
        let ops = catalog()
            .operators_for("Vector2", &["negate".into(), "equals".into(), "add_assign".into()])
            .unwrap();
        assert_eq!(ops.len(), 3);
        assert!(!ops[0].is_binary());
        assert_eq!(ops[0].returns, ReturnCategory::OwnType);
        assert_eq!(ops[1].operand(), Some("Vector2"));
        assert_eq!(ops[1].returns, ReturnCategory::Boolean);
        assert_eq!(ops[2].returns, ReturnCategory::MutateReceiver);
    }

    #[test]
    fn test_unknown_operator_is_error() {
        let err = catalog()
            .operators_for("Color", &["modulo".into()])
            .unwrap_err();
        assert!(err.to_string().contains("modulo"));
    }

    #[test]
    fn test_validate_operand_arity() {
        let types = TypeTable::new(vec![TypeEntry::new(
            "boolean",
            TypeKind::Boolean,
            "Variant::BOOL",
            "bool",
        )])
        .unwrap();
        assert!(catalog().validate(&types).is_ok());

        let mut templates = BTreeMap::new();
        templates.insert(
            "negate".to_string(),
            OperatorTemplate {
                code: OperatorCode::Negate,
                operand: Some(SELF.into()),
                returns: SELF.into(),
            },
        );
        assert!(OperatorCatalog::new(templates).validate(&types).is_err());
    }

    #[test]
    fn test_boolean_return_needs_boolean_row() {
        let types = TypeTable::new(vec![TypeEntry::new(
            "number",
            TypeKind::Number,
            "Variant::FLOAT",
            "real_t",
        )])
        .unwrap();
        let err = catalog().validate(&types).unwrap_err();
        assert!(matches!(err, WeldError::UnknownTag { ref tag, .. } if tag == "boolean"));
    }
}
