//! Schema extractor
//!
//! Normalizes one documentation record per configured class into a
//! [`ClassSchema`], applying the class's override tables and the type mapping
//! table. Any unmapped type or missing record aborts the run.

use crate::config::{ClassOverrides, WeldConfig};
use crate::error::{WeldError, WeldResult};
use crate::extract::docs::{DocMethod, DocRecord, DocSource};
use crate::ir::schema::{Argument, ClassSchema, Method, Property};
use crate::ir::store::SchemaStore;
use crate::ir::types::TypeTable;
use tracing::{debug, info};

/// Prefix of native operator entries, which are never bound as methods
pub const OPERATOR_PREFIX: &str = "operator";

pub struct SchemaExtractor<'a> {
    config: &'a WeldConfig,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(config: &'a WeldConfig) -> Self {
        Self { config }
    }

    /// Extract every configured class, in configured order
    pub fn extract<S: DocSource + ?Sized>(&self, source: &S) -> WeldResult<SchemaStore> {
        let mut classes = Vec::with_capacity(self.config.classes().len());
        for class in self.config.classes() {
            let record = source
                .record(class)?
                .ok_or_else(|| WeldError::MissingRecord(class.clone()))?;
            classes.push(self.extract_class(class, &record)?);
        }

        let store = SchemaStore::new(classes);
        store.validate(self.config.types())?;
        info!(classes = store.len(), "extract.done");
        Ok(store)
    }

    /// Extract a single class from its record
    pub fn extract_class(&self, class: &str, record: &DocRecord) -> WeldResult<ClassSchema> {
        if !record.name.is_empty() && record.name != class {
            return Err(WeldError::config(format!(
                "record for `{}` documents `{}`",
                class, record.name
            )));
        }

        let overrides = self.config.overrides(class)?;
        let types = self.config.types();
        let mut schema = ClassSchema::new(class).with_argc(overrides.constructor_argc);

        for member in &record.members {
            if overrides.is_ignored(&member.name) {
                debug!(class, member = %member.name, "extract.skip_ignored");
                continue;
            }
            let ty = types.map_native(class, &member.name, &member.ty)?;
            schema = schema.property(
                Property::new(&member.name, ty).with_native(overrides.native_path(&member.name)),
            );
        }

        let is_array = overrides.is_array();
        for doc in &record.methods {
            let name = doc.name.as_str();
            if name == class || name.starts_with(OPERATOR_PREFIX) {
                continue;
            }
            if overrides.is_ignored(name) {
                debug!(class, method = name, "extract.skip_ignored");
                continue;
            }
            if is_array && name == "get" {
                debug!(class, "extract.replace_documented_get");
                continue;
            }
            schema = schema.method(build_method(class, doc, overrides, types)?);
        }
        if is_array {
            schema = schema.method(Method::element_getter());
        }

        for operator in self
            .config
            .catalog()
            .operators_for(class, &overrides.operators)?
        {
            schema = schema.operator(operator);
        }

        for constant in &record.constants {
            if overrides.is_ignored(&constant.name) {
                debug!(class, constant = %constant.name, "extract.skip_ignored");
                continue;
            }
            schema = schema.constant(&constant.name, &constant.value);
        }

        debug!(
            class,
            properties = schema.properties.len(),
            methods = schema.methods.len(),
            operators = schema.operators.len(),
            constants = schema.constants.len(),
            "extract.class"
        );
        Ok(schema)
    }
}

fn build_method(
    class: &str,
    doc: &DocMethod,
    overrides: &ClassOverrides,
    types: &TypeTable,
) -> WeldResult<Method> {
    let context = format!("{}()", doc.name);
    let return_type = types.map_return(class, &context, doc.return_type.as_deref().unwrap_or("void"))?;
    let mut method = Method::new(&doc.name).returns(return_type);

    for (index, arg) in doc.arguments.iter().enumerate() {
        let ty = types.map_native(class, &format!("{}(#{})", doc.name, index), &arg.ty)?;
        let mut argument = Argument::new(&arg.name, ty);
        if let Some(default) = &arg.default {
            argument = argument.with_default(default);
        }
        if let Some(enumeration) = &arg.enumeration {
            argument = argument.with_enumeration(enumeration);
        }
        method = method.arg(argument);
    }

    if overrides.is_delegated(&doc.name) {
        method = method
            .with_native(overrides.rename_native(&doc.name))
            .delegated();
    }
    Ok(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::docs::MemorySource;
    use crate::ir::schema::ReturnCategory;

    fn config() -> WeldConfig {
        WeldConfig::builtin().unwrap()
    }

    #[test]
    fn test_arity_and_operators() {
        let config = config();
        let extractor = SchemaExtractor::new(&config);
        let record = DocRecord::new("Vector2")
            .member("x", "float")
            .member("y", "float")
            .method(DocMethod::new("Vector2").returns("Vector2"))
            .method(DocMethod::new("operator +").returns("Vector2").arg("right", "Vector2"))
            .method(DocMethod::new("length").returns("float"))
            .constant("ZERO", "Vector2(0, 0)");

        let schema = extractor.extract_class("Vector2", &record).unwrap();
        assert_eq!(schema.constructor_argc, 2);
        let methods: Vec<_> = schema.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, ["length"]);
        assert_eq!(schema.methods[0].return_type, "number");
        assert_eq!(schema.operators.len(), 12);
        assert_eq!(schema.operators[0].name, "negate");

        let equals = schema.operators.iter().find(|o| o.name == "equals").unwrap();
        assert_eq!(equals.returns, ReturnCategory::Boolean);
        let add = schema.operators.iter().find(|o| o.name == "add").unwrap();
        assert_eq!(add.returns.tag("Vector2"), "Vector2");
        assert_eq!(add.operand(), Some("Vector2"));
    }

    #[test]
    fn test_ignored_names_never_appear() {
        let config = config();
        let extractor = SchemaExtractor::new(&config);
        let record = DocRecord::new("Color")
            .member("r", "float")
            .member("h", "float")
            .member("r8", "int")
            .method(DocMethod::new("to_html").returns("String").arg_default("with_alpha", "bool", "true"));

        let schema = extractor.extract_class("Color", &record).unwrap();
        assert!(schema.names().all(|n| n != "h" && n != "r8"));
        assert_eq!(schema.properties.len(), 1);
        let arg = &schema.methods[0].arguments[0];
        assert!(arg.has_default_value);
        assert_eq!(arg.default_value.as_deref(), Some("true"));
        assert_eq!(arg.ty, "boolean");
    }

    #[test]
    fn test_remapped_paths() {
        let config = config();
        let extractor = SchemaExtractor::new(&config);
        let record = DocRecord::new("Plane")
            .member("normal", "Vector3")
            .member("x", "float")
            .member("d", "float");

        let schema = extractor.extract_class("Plane", &record).unwrap();
        let natives: Vec<_> = schema.properties.iter().map(|p| p.native.as_str()).collect();
        assert_eq!(natives, ["normal", "normal.x", "d"]);
    }

    #[test]
    fn test_delegation_is_per_class() {
        let config = config();
        let extractor = SchemaExtractor::new(&config);
        let bytes = DocRecord::new("PackedByteArray")
            .method(DocMethod::new("decode_u8").returns("int").arg("byte_offset", "int"))
            .method(DocMethod::new("to_int32_array").returns("PackedInt32Array"))
            .method(DocMethod::new("size").returns("int"))
            .method(DocMethod::new("hex_encode").returns("String"));

        let schema = extractor.extract_class("PackedByteArray", &bytes).unwrap();
        let decode = &schema.methods[0];
        assert!(decode.delegated);
        assert_eq!(decode.native_method, "decode_u8");
        let to_int = &schema.methods[1];
        assert!(to_int.delegated);
        assert_eq!(to_int.native_method, "decode_s32_array");
        assert!(!schema.methods[2].delegated);
        assert!(schema.methods.iter().all(|m| m.name != "hex_encode"));
        assert!(schema.methods.last().unwrap().indexed);

        let ints = DocRecord::new("PackedInt32Array")
            .method(DocMethod::new("to_byte_array").returns("PackedByteArray"));
        let schema = extractor.extract_class("PackedInt32Array", &ints).unwrap();
        assert!(schema.methods.iter().all(|m| !m.delegated));
    }

    #[test]
    fn test_unmapped_type_is_fatal() {
        let config = config();
        let extractor = SchemaExtractor::new(&config);
        let record = DocRecord::new("Vector2").method(DocMethod::new("bogus").returns("Texture2D"));
        let err = extractor.extract_class("Vector2", &record).unwrap_err();
        assert!(matches!(err, WeldError::UnmappedType { ref ty, .. } if ty == "Texture2D"));
    }

    #[test]
    fn test_missing_record_is_fatal() {
        let config = config();
        let source = MemorySource::new().with(DocRecord::new("Vector2"));
        let err = SchemaExtractor::new(&config).extract(&source).unwrap_err();
        assert!(matches!(err, WeldError::MissingRecord(ref class) if class == "Rect2"));
    }
}
