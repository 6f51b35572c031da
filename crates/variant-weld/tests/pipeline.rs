use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use variant_weld::build::BindingBuilder;
use variant_weld::codegen::Synthesizer;
use variant_weld::ir::{ClassSchema, Method, ReturnCategory, SchemaStore};
use variant_weld::runtime::{Binder, Instance, NullHost, Value};
use variant_weld::{WeldConfig, WeldError};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn builder(out: &Path) -> BindingBuilder {
    BindingBuilder::new()
        .config(fixtures().join("weld.toml"))
        .docs(fixtures().join("docs"))
        .schema(out.join("schema.json"))
        .output(out.join("bindings.gen.cpp"))
}

fn method<'a>(schema: &'a ClassSchema, name: &str) -> Option<&'a Method> {
    schema.methods.iter().find(|m| m.name == name)
}

fn load_store(out: &Path) -> SchemaStore {
    SchemaStore::from_json(&fs::read_to_string(out.join("schema.json")).unwrap()).unwrap()
}

#[test]
fn test_run_writes_both_artifacts() {
    let dir = TempDir::new().unwrap();
    let output = builder(dir.path()).run().unwrap();

    assert_eq!(output.classes, 3);
    assert_eq!(output.schema, Some(dir.path().join("schema.json")));
    assert!(output.output.exists());

    let schema_text = fs::read_to_string(dir.path().join("schema.json")).unwrap();
    assert!(schema_text.ends_with("]\n"));
    assert!(schema_text.contains("\n  {\n    \"constants\": ["));

    let store = load_store(dir.path());
    let names: Vec<&str> = store.classes().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Vector2", "Color", "PackedByteArray"]);
}

#[test]
fn test_schema_contents() {
    let dir = TempDir::new().unwrap();
    builder(dir.path()).run().unwrap();
    let store = load_store(dir.path());

    let vector2 = store.class("Vector2").unwrap();
    assert_eq!(vector2.constructor_argc, 2);
    let methods: Vec<&str> = vector2.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, ["length", "lerp", "rotated"]);
    let lerp = &vector2.methods[1];
    assert!(lerp.arguments[1].has_default_value);
    assert_eq!(lerp.arguments[1].default_value.as_deref(), Some("0.5"));
    let operators: Vec<&str> = vector2.operators.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(operators, ["negate", "equals", "add", "add_assign"]);
    assert_eq!(vector2.operators[1].returns, ReturnCategory::Boolean);
    assert_eq!(vector2.operators[2].returns.tag("Vector2"), "Vector2");
    assert_eq!(vector2.operators[3].returns.tag("Vector2"), "Vector2");

    let color = store.class("Color").unwrap();
    assert!(color.properties.iter().all(|p| p.name != "h"));
    assert_eq!(color.constructor_argc, 4);

    let bytes = store.class("PackedByteArray").unwrap();
    assert_eq!(bytes.constructor_argc, 0);
    let delegated: Vec<(&str, &str)> = bytes
        .methods
        .iter()
        .filter(|m| m.delegated)
        .map(|m| (m.name.as_str(), m.native_method.as_str()))
        .collect();
    assert_eq!(
        delegated,
        [
            ("decode_u8", "decode_u8"),
            ("to_float32_array", "decode_float_array"),
            ("has_encoded_var", "has_encoded_var"),
        ]
    );
    assert!(!method(bytes, "size").unwrap().delegated);
    assert!(method(bytes, "compress").is_none());
    let get = method(bytes, "get").unwrap();
    assert!(get.indexed);
    assert_eq!(get.return_type, "Variant");
    assert_eq!(bytes.methods.last().unwrap().name, "get");
}

#[test]
fn test_runs_are_byte_identical() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    builder(first.path()).run().unwrap();
    builder(second.path()).run().unwrap();

    for file in ["schema.json", "bindings.gen.cpp"] {
        assert_eq!(
            fs::read_to_string(first.path().join(file)).unwrap(),
            fs::read_to_string(second.path().join(file)).unwrap()
        );
    }
}

#[test]
fn test_generate_matches_run() {
    let dir = TempDir::new().unwrap();
    builder(dir.path()).run().unwrap();
    let full = fs::read_to_string(dir.path().join("bindings.gen.cpp")).unwrap();

    let regenerated = dir.path().join("regenerated.cpp");
    BindingBuilder::new()
        .config(fixtures().join("weld.toml"))
        .schema(dir.path().join("schema.json"))
        .output(&regenerated)
        .generate()
        .unwrap();
    assert_eq!(fs::read_to_string(regenerated).unwrap(), full);
}

#[test]
fn test_check_detects_stale_output() {
    let dir = TempDir::new().unwrap();
    let builder = builder(dir.path());
    assert!(!builder.check().unwrap().is_clean());

    builder.run().unwrap();
    assert!(builder.check().unwrap().is_clean());

    fs::write(dir.path().join("bindings.gen.cpp"), "// edited\n").unwrap();
    let report = builder.check().unwrap();
    assert!(report.schema_matches);
    assert!(!report.output_matches);
}

#[test]
fn test_generated_source_layout() {
    let dir = TempDir::new().unwrap();
    builder(dir.path()).run().unwrap();
    let source = fs::read_to_string(dir.path().join("bindings.gen.cpp")).unwrap();

    let declaration = source
        .find("static JSValue Vector2_constructor(JSContext *ctx, JSValueConst new_target, int argc, JSValueConst *argv);")
        .unwrap();
    let entry = source
        .find("void QuickJSBuiltinBinder::bind_builtin_classes_gen() {")
        .unwrap();
    let first = source
        .find("register_builtin_class(Variant::VECTOR2, \"Vector2\", Vector2_constructor, 2);")
        .unwrap();
    let second = source
        .find("register_builtin_class(Variant::COLOR, \"Color\", Color_constructor, 4);")
        .unwrap();
    let third = source
        .find("register_builtin_class(Variant::PACKED_BYTE_ARRAY, \"PackedByteArray\", PackedByteArray_constructor, 0);")
        .unwrap();
    let definition = source.find("static void bind_Vector2_properties(JSContext *ctx) {").unwrap();
    assert!(declaration < entry && entry < first && first < second && second < third && third < definition);

    assert!(source.contains("ingest_elements<uint8_t, 1>(tmp, buffer, size, \"PackedByteArray\");"));
    assert!(source.contains("self_value.call(\"decode_float_array\");"));
    assert!(source.contains("register_constant(Variant::COLOR, \"BLACK\", Color(0, 0, 0, 1));"));
    assert!(!source.contains("\"compress\""));
}

#[test]
fn test_missing_record_is_fatal() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    for class in ["Vector2", "Color"] {
        fs::copy(
            fixtures().join("docs").join(format!("{}.json", class)),
            docs.join(format!("{}.json", class)),
        )
        .unwrap();
    }
    let schema = dir.path().join("schema.json");
    let output = dir.path().join("bindings.gen.cpp");
    fs::write(&schema, "[]\n").unwrap();
    fs::write(&output, "// previous run\n").unwrap();

    let builder = BindingBuilder::new()
        .config(fixtures().join("weld.toml"))
        .docs(&docs)
        .schema(&schema)
        .output(&output);
    let result = builder.run();
    assert!(matches!(result, Err(WeldError::MissingRecord(ref class)) if class == "PackedByteArray"));
    assert!(!schema.exists());
    assert!(!output.exists());

    fs::write(&schema, "[]\n").unwrap();
    assert!(builder.write_schema().is_err());
    assert!(!schema.exists());
}

#[test]
fn test_reference_binder_over_extracted_schema() {
    let dir = TempDir::new().unwrap();
    builder(dir.path()).run().unwrap();
    let config = WeldConfig::load(&fixtures().join("weld.toml")).unwrap();
    let unit = Synthesizer::new(&config).synthesize(&load_store(dir.path())).unwrap();
    let mut binder = Binder::new(&unit, NullHost).with_debug_validation(true);

    let v = binder
        .construct("Vector2", &[Value::Number(1.0), Value::Number(2.0)])
        .unwrap();
    assert_eq!(v, Instance::new("Vector2").field("x", 1.0).field("y", 2.0));

    let v = binder.construct("Vector2", &[Value::Number(7.0)]).unwrap();
    assert_eq!(v, Instance::new("Vector2").field("x", 7.0).field("y", 7.0));

    let c = binder
        .construct("Color", &[Value::Number(0.5), Value::Number(0.5), Value::Number(0.5)])
        .unwrap();
    assert_eq!(binder.get_property(&c, "a").unwrap(), Value::Number(1.0));

    let bytes = binder
        .construct("PackedByteArray", &[Value::ArrayBuffer(vec![1, 2, 3])])
        .unwrap();
    assert_eq!(bytes.elements().unwrap().len(), 3);
    assert!(binder.warnings().is_empty());

    assert_eq!(binder.constant("Vector2", "ONE"), Some("Vector2(1, 1)"));
}
