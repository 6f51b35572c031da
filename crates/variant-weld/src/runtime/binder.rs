//! Reference binder
//!
//! Evaluates a [`BindingUnit`] directly, with the semantics the emitted glue
//! has at call time: constructor dispatch by argument count and first
//! argument shape, buffer ingestion, debug-only type validation, property
//! accessors, method and operator wrappers.

use super::buffer::{ingest_elements, view_window};
use super::host::{Host, ScriptError, ScriptResult};
use super::value::{Instance, Value};
use crate::codegen::model::{
    BindingUnit, CallKind, ClassBinding, Conversion, InitAction, ShapeCase, ShapeGuard,
    ValueType,
};
use crate::config::ElementKind;
use crate::ir::types::TypeKind;
use tracing::debug;

pub struct Binder<'u, H: Host> {
    unit: &'u BindingUnit,
    host: H,
    debug_validation: bool,
    warnings: Vec<String>,
}

impl<'u, H: Host> Binder<'u, H> {
    pub fn new(unit: &'u BindingUnit, host: H) -> Self {
        Self {
            unit,
            host,
            debug_validation: false,
            warnings: Vec::new(),
        }
    }

    /// Raise type errors on mismatched arguments, as debug builds do
    pub fn with_debug_validation(mut self, enabled: bool) -> Self {
        self.debug_validation = enabled;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Non-fatal diagnostics recorded so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn binding(&self, class: &str) -> ScriptResult<&'u ClassBinding> {
        self.unit
            .class(class)
            .ok_or_else(|| ScriptError::Type(format!("{} is not a bound class", class)))
    }

    /// Default-constructed instance of `class`
    pub fn default_instance(&self, class: &str) -> Instance {
        self.default_with(class, &mut Vec::new())
    }

    fn default_with(&self, class: &str, visiting: &mut Vec<String>) -> Instance {
        let Some(binding) = self.unit.class(class) else {
            return Instance::new(class);
        };
        if binding.element.is_some() {
            return Instance::with_elements(class, Vec::new());
        }

        visiting.push(class.to_string());
        let mut instance = Instance::new(class);
        if let Some(accessors) = &binding.accessors {
            for slot in &accessors.slots {
                let value = match slot.ty.kind {
                    TypeKind::Number => Value::Number(0.0),
                    TypeKind::String => Value::String(String::new()),
                    TypeKind::Boolean => Value::Bool(false),
                    TypeKind::Builtin if !visiting.contains(&slot.ty.tag) => {
                        Value::Builtin(self.default_with(&slot.ty.tag, visiting))
                    }
                    _ => Value::Undefined,
                };
                if instance.get(&slot.path).is_none() {
                    instance.set_field(&slot.path, value);
                }
            }
        }
        visiting.pop();
        instance
    }

    // -- marshaling ----------------------------------------------------------

    fn matches(&self, value: &Value, ty: &ValueType) -> bool {
        match ty.kind {
            TypeKind::Number => matches!(value, Value::Number(_)),
            TypeKind::String => matches!(value, Value::String(_)),
            TypeKind::Boolean => matches!(value, Value::Bool(_)),
            TypeKind::Builtin => value.as_instance().is_some_and(|i| i.class() == ty.tag),
            TypeKind::Variant | TypeKind::Object => true,
        }
    }

    /// Best-effort conversion; never fails
    fn convert(&self, value: &Value, conversion: &Conversion) -> Value {
        match conversion {
            Conversion::Number => Value::Number(to_number(value)),
            Conversion::Uint => Value::Number((to_number(value) as i64 as u32) as f64),
            Conversion::String => match value {
                Value::String(_) => value.clone(),
                Value::Undefined => Value::String(String::new()),
                other => Value::String(other.to_string()),
            },
            Conversion::Boolean => Value::Bool(value.truthy()),
            Conversion::Builtin(class) => match value {
                Value::Builtin(instance) if instance.class() == class => value.clone(),
                _ => Value::Builtin(self.default_instance(class)),
            },
            Conversion::Dynamic => value.clone(),
        }
    }

    fn guard_matches(&self, guard: &ShapeGuard, value: &Value, class: &str) -> bool {
        match guard {
            ShapeGuard::Always => true,
            ShapeGuard::Number => matches!(value, Value::Number(_)),
            ShapeGuard::String => matches!(value, Value::String(_)),
            ShapeGuard::Boolean => matches!(value, Value::Bool(_)),
            ShapeGuard::Array => matches!(value, Value::Array(_)),
            ShapeGuard::ArrayBuffer => matches!(value, Value::ArrayBuffer(_)),
            ShapeGuard::DataView => matches!(value, Value::DataView { .. }),
            ShapeGuard::Builtin(ty) => self.matches(value, ty),
            ShapeGuard::Convertible => {
                matches!(value, Value::Builtin(_)) && self.host.can_convert(value, class)
            }
        }
    }

    // -- constructors --------------------------------------------------------

    /// Construct an instance of `class` from call-time arguments
    pub fn construct(&mut self, class: &str, args: &[Value]) -> ScriptResult<Instance> {
        let binding = self.binding(class)?;
        let mut tmp = self.default_instance(class);

        let Some(arm) = binding.constructor.arm_for(args.len()) else {
            debug!(class, argc = args.len(), "binder.construct.default");
            return Ok(tmp);
        };

        let guarded = arm.cases.iter().any(|c| c.guard != ShapeGuard::Always);
        let (cases, checked_from): (Vec<&ShapeCase>, usize) = if guarded {
            let first = args.first().unwrap_or(&Value::Undefined);
            match arm
                .cases
                .iter()
                .find(|c| c.guard != ShapeGuard::Always && self.guard_matches(&c.guard, first, class))
            {
                Some(case) => (vec![case], 1),
                None => {
                    if self.debug_validation {
                        if let Some(expected) = &arm.expected {
                            return Err(ScriptError::Type(expected.clone()));
                        }
                    }
                    return Ok(tmp);
                }
            }
        } else {
            (arm.cases.iter().collect(), 0)
        };

        for case in cases {
            self.run_case(class, case, args, checked_from, &mut tmp)?;
        }
        Ok(tmp)
    }

    fn run_case(
        &mut self,
        class: &str,
        case: &ShapeCase,
        args: &[Value],
        checked_from: usize,
        tmp: &mut Instance,
    ) -> ScriptResult<()> {
        if self.debug_validation {
            for param in case.params.iter().filter(|p| p.validate && p.index >= checked_from) {
                let Some(ty) = &param.ty else { continue };
                let supplied = args.get(param.index);
                let failed = match supplied {
                    Some(value) => !self.matches(value, ty),
                    None => param.default.is_none(),
                };
                if failed {
                    return Err(ScriptError::Type(param.type_error(class, &case.signature)));
                }
            }
        }

        let value = |index: usize| -> Value {
            let Some(param) = case.params.get(index) else {
                return Value::Undefined;
            };
            match (args.get(index), &param.default, &param.ty) {
                (Some(arg), _, _) => self.convert(arg, &param.conversion),
                (None, Some(default), Some(ty)) => self.host.literal(ty, default),
                _ => Value::Undefined,
            }
        };
        let values = |indices: &[usize]| -> Vec<Value> { indices.iter().map(|&i| value(i)).collect() };

        let mut pending_warnings = Vec::new();
        for action in &case.actions {
            match action {
                InitAction::Assign { path, arg } => tmp.set_field(path, value(*arg)),
                InitAction::Broadcast { paths, arg } => {
                    let v = value(*arg);
                    for path in paths {
                        tmp.set_field(path, v.clone());
                    }
                }
                InitAction::Replace { arg } => *tmp = into_instance(value(*arg), class)?,
                InitAction::Construct { args } => {
                    *tmp = into_instance(self.host.construct(class, &values(args))?, class)?;
                }
                InitAction::Factory { function, args } => {
                    *tmp = into_instance(self.host.factory(function, &values(args))?, class)?;
                }
                InitAction::Invoke { method, args } => {
                    self.host.invoke(tmp, method, &values(args))?;
                }
                InitAction::Convert { arg } => {
                    let source = args.get(*arg).unwrap_or(&Value::Undefined);
                    *tmp = into_instance(self.host.convert(source, class)?, class)?;
                }
                InitAction::IngestBuffer { arg, element } => {
                    if let Some(Value::ArrayBuffer(bytes)) = args.get(*arg) {
                        ingest(tmp, bytes, *element, class, &mut pending_warnings);
                    }
                }
                InitAction::IngestView { arg, element } => {
                    if let Some(Value::DataView {
                        buffer,
                        offset,
                        length,
                    }) = args.get(*arg)
                    {
                        let window = view_window(buffer, *offset, *length);
                        ingest(tmp, window, *element, class, &mut pending_warnings);
                    }
                }
            }
        }
        self.warnings.extend(pending_warnings);
        Ok(())
    }

    // -- properties ----------------------------------------------------------

    /// Read a property; unknown names read as undefined
    pub fn get_property(&self, receiver: &Instance, name: &str) -> ScriptResult<Value> {
        let binding = self.binding(receiver.class())?;
        let slot = binding.accessors.as_ref().and_then(|a| a.slot(name));
        Ok(slot
            .and_then(|slot| receiver.get(&slot.path))
            .cloned()
            .unwrap_or(Value::Undefined))
    }

    /// Write a property and return the written value
    pub fn set_property(&self, receiver: &mut Instance, name: &str, value: Value) -> ScriptResult<Value> {
        let binding = self.binding(receiver.class())?;
        let Some(slot) = binding.accessors.as_ref().and_then(|a| a.slot(name)) else {
            return Ok(value);
        };
        if self.debug_validation && slot.ty.is_checked() && !self.matches(&value, &slot.ty) {
            return Err(ScriptError::Type(slot.type_error(&binding.class)));
        }
        receiver.set_field(&slot.path, self.convert(&value, &Conversion::for_type(&slot.ty)));
        Ok(value)
    }

    // -- methods and operators ----------------------------------------------

    pub fn call_method(&self, receiver: &mut Instance, name: &str, args: &[Value]) -> ScriptResult<Value> {
        let binding = self.binding(receiver.class())?;
        let method = binding
            .method(name)
            .ok_or_else(|| ScriptError::Type(format!("{}.{} is not a function", binding.class, name)))?;

        let mut values = Vec::with_capacity(method.args.len());
        for slot in &method.args {
            let value = match (args.get(slot.index), &slot.default) {
                (None, Some(default)) => self.host.literal(&slot.ty, default),
                (supplied, _) => {
                    let supplied = supplied.unwrap_or(&Value::Undefined);
                    if self.debug_validation && slot.validate && !self.matches(supplied, &slot.ty) {
                        return Err(ScriptError::Type(slot.type_error(&binding.class, name)));
                    }
                    self.convert(supplied, &slot.conversion)
                }
            };
            values.push(value);
        }

        let result = match &method.call {
            CallKind::Direct { native } => self.host.call_native(receiver, native, &values)?,
            CallKind::Delegated { native } => self.host.call_dynamic(receiver, native, &values)?,
            CallKind::Index => {
                let index = values.first().and_then(Value::as_number).unwrap_or(0.0) as i64;
                let elements = receiver.elements().unwrap_or(&[]);
                usize::try_from(index)
                    .ok()
                    .and_then(|i| elements.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        ScriptError::Range(format!(
                            "index {} out of range for {} of size {}",
                            index,
                            binding.class,
                            elements.len()
                        ))
                    })?
            }
        };

        Ok(if method.returns.is_some() {
            result
        } else {
            Value::Undefined
        })
    }

    /// Apply a named operator; mutating operators overwrite the receiver
    pub fn apply_operator(
        &self,
        receiver: &mut Instance,
        name: &str,
        operand: Option<&Value>,
    ) -> ScriptResult<Value> {
        let binding = self.binding(receiver.class())?;
        let operator = binding
            .operator(name)
            .ok_or_else(|| ScriptError::Type(format!("{}.{} is not a function", binding.class, name)))?;

        let operand = match &operator.operand {
            Some(ty) => {
                let supplied = operand.unwrap_or(&Value::Undefined);
                if self.debug_validation && ty.is_checked() && !self.matches(supplied, ty) {
                    return Err(ScriptError::Type(operator.type_error(&binding.class)));
                }
                Some(self.convert(supplied, &Conversion::for_type(ty)))
            }
            None => None,
        };

        let left = Value::Builtin(receiver.clone());
        let result = self.host.evaluate(operator.code, &left, operand.as_ref())?;
        if operator.mutates {
            *receiver = into_instance(result, &binding.class)?;
            return Ok(Value::Builtin(receiver.clone()));
        }
        Ok(result)
    }

    /// Symbols of the class's operator table, cross-type entries last
    pub fn operator_symbols(&self, class: &str) -> ScriptResult<Vec<String>> {
        let binding = self.binding(class)?;
        let mut symbols: Vec<String> = binding
            .table_operators()
            .filter_map(|o| o.symbol.clone())
            .collect();
        symbols.extend(self.host.cross_type_operators(class));
        Ok(symbols)
    }

    pub fn constant(&self, class: &str, name: &str) -> Option<&'u str> {
        self.unit
            .class(class)?
            .constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }
}

fn ingest(tmp: &mut Instance, bytes: &[u8], element: ElementKind, class: &str, warnings: &mut Vec<String>) {
    let ingested = ingest_elements(bytes, element, class);
    if ingested.remainder != 0 {
        warnings.push(format!(
            "{}: {} trailing byte(s) ignored, buffer length {} is not a multiple of {}",
            class,
            ingested.remainder,
            bytes.len(),
            element.stride().unwrap_or(1)
        ));
    }
    tmp.set_elements(ingested.elements);
}

fn into_instance(value: Value, class: &str) -> ScriptResult<Instance> {
    match value {
        Value::Builtin(instance) if instance.class() == class => Ok(instance),
        other => Err(ScriptError::Host(format!(
            "expected {} from host, got {}",
            class,
            other.type_name()
        ))),
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Undefined => f64::NAN,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Synthesizer;
    use crate::config::WeldConfig;
    use crate::ir::schema::{Argument, ClassSchema, Method, OperatorCode, Property};
    use crate::ir::store::SchemaStore;
    use crate::runtime::host::NullHost;
    use std::cell::RefCell;

    fn unit(classes: Vec<ClassSchema>) -> BindingUnit {
        let config = WeldConfig::builtin().unwrap();
        let classes = classes
            .into_iter()
            .map(|mut schema| {
                let overrides = config.overrides(&schema.name).unwrap();
                schema.constructor_argc = overrides.constructor_argc;
                schema.operators = config
                    .catalog()
                    .operators_for(&schema.name, &overrides.operators)
                    .unwrap();
                schema
            })
            .collect();
        Synthesizer::new(&config)
            .synthesize(&SchemaStore::new(classes))
            .unwrap()
    }

    fn vector2() -> ClassSchema {
        ClassSchema::new("Vector2")
            .property(Property::new("x", "number"))
            .property(Property::new("y", "number"))
            .method(
                Method::new("dot")
                    .returns("number")
                    .arg(Argument::new("with", "Vector2")),
            )
            .constant("ZERO", "Vector2(0, 0)")
    }

    fn vec2(x: f64, y: f64) -> Instance {
        Instance::new("Vector2").field("x", x).field("y", y)
    }

    /// Adds Vector2 operands component-wise and compares them for equality
    #[derive(Default)]
    struct VectorHost {
        calls: RefCell<Vec<String>>,
    }

    impl Host for VectorHost {
        fn call_native(&self, receiver: &mut Instance, method: &str, args: &[Value]) -> ScriptResult<Value> {
            self.calls.borrow_mut().push(format!("native:{}", method));
            let other = args[0].as_instance().unwrap();
            let component = |i: &Instance, k: &str| i.get(k).and_then(Value::as_number).unwrap();
            Ok(Value::Number(
                component(receiver, "x") * component(other, "x")
                    + component(receiver, "y") * component(other, "y"),
            ))
        }

        fn call_dynamic(&self, _receiver: &mut Instance, method: &str, _args: &[Value]) -> ScriptResult<Value> {
            self.calls.borrow_mut().push(format!("dynamic:{}", method));
            Ok(Value::Number(42.0))
        }

        fn evaluate(&self, code: OperatorCode, left: &Value, right: Option<&Value>) -> ScriptResult<Value> {
            let l = left.as_instance().unwrap();
            let r = right.and_then(Value::as_instance).unwrap();
            let component = |i: &Instance, k: &str| i.get(k).and_then(Value::as_number).unwrap();
            match code {
                OperatorCode::Equal => Ok(Value::Bool(l == r)),
                OperatorCode::Add => Ok(Value::Builtin(vec2(
                    component(l, "x") + component(r, "x"),
                    component(l, "y") + component(r, "y"),
                ))),
                _ => Err(ScriptError::Host(code.to_string())),
            }
        }
    }

    #[test]
    fn test_two_numbers_assign_components() {
        let unit = unit(vec![vector2()]);
        let mut binder = Binder::new(&unit, NullHost);
        let v = binder.construct("Vector2", &[Value::Number(1.5), Value::Number(-2.0)]).unwrap();
        assert_eq!(v, vec2(1.5, -2.0));
    }

    #[test]
    fn test_one_number_broadcasts() {
        let unit = unit(vec![vector2()]);
        let mut binder = Binder::new(&unit, NullHost);
        let v = binder.construct("Vector2", &[Value::Number(3.0)]).unwrap();
        assert_eq!(v, vec2(3.0, 3.0));

        let copy = binder.construct("Vector2", &[Value::Builtin(vec2(1.0, 2.0))]).unwrap();
        assert_eq!(copy, vec2(1.0, 2.0));
    }

    #[test]
    fn test_unmatched_shape() {
        let unit = unit(vec![vector2()]);
        let mut binder = Binder::new(&unit, NullHost);
        let v = binder.construct("Vector2", &[Value::from("nope")]).unwrap();
        assert_eq!(v, vec2(0.0, 0.0));
        let v = binder.construct("Vector2", &[]).unwrap();
        assert_eq!(v, vec2(0.0, 0.0));

        let mut binder = Binder::new(&unit, NullHost).with_debug_validation(true);
        let err = binder.construct("Vector2", &[Value::from("nope")]).unwrap_err();
        assert_eq!(
            err,
            ScriptError::Type("Vector2 or number expected for argument #0 of Vector2()".into())
        );
        let err = binder
            .construct("Vector2", &[Value::Number(1.0), Value::from("y")])
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::Type("number expected for argument 1 of Vector2(x, y)".into())
        );
    }

    /// Converts any built-in into a Vector2 regardless of the requested class
    struct MisconvertingHost;

    impl Host for MisconvertingHost {
        fn can_convert(&self, _value: &Value, _class: &str) -> bool {
            true
        }

        fn convert(&self, _value: &Value, _class: &str) -> ScriptResult<Value> {
            Ok(Value::Builtin(vec2(1.0, 1.0)))
        }
    }

    #[test]
    fn test_host_conversion_must_match_class() {
        let unit = unit(vec![vector2(), ClassSchema::new("Transform2D")]);
        let mut binder = Binder::new(&unit, MisconvertingHost);
        let err = binder
            .construct("Transform2D", &[Value::Builtin(Instance::new("Basis"))])
            .unwrap_err();
        assert_eq!(err, ScriptError::Host("expected Transform2D from host, got Vector2".into()));

        assert_eq!(
            into_instance(Value::Builtin(vec2(0.0, 0.0)), "Vector2").unwrap(),
            vec2(0.0, 0.0)
        );
        assert!(into_instance(Value::Number(1.0), "Vector2").is_err());
    }

    #[test]
    fn test_color_alpha_default() {
        let color = ClassSchema::new("Color")
            .property(Property::new("r", "number"))
            .property(Property::new("g", "number"))
            .property(Property::new("b", "number"))
            .property(Property::new("a", "number"));
        let unit = unit(vec![color]);
        let mut binder = Binder::new(&unit, NullHost).with_debug_validation(true);

        let c = binder
            .construct("Color", &[Value::Number(0.1), Value::Number(0.2), Value::Number(0.3)])
            .unwrap();
        assert_eq!(c.get("a"), Some(&Value::Number(1.0)));

        let c = binder
            .construct(
                "Color",
                &[Value::Number(0.1), Value::Number(0.2), Value::Number(0.3), Value::Number(0.5)],
            )
            .unwrap();
        assert_eq!(c.get("a"), Some(&Value::Number(0.5)));
    }

    #[test]
    fn test_byte_buffer_remainder_is_truncated() {
        let unit = unit(vec![ClassSchema::new("PackedInt32Array"), ClassSchema::new("PackedByteArray")]);
        let mut binder = Binder::new(&unit, NullHost).with_debug_validation(true);

        let array = binder
            .construct("PackedInt32Array", &[Value::ArrayBuffer(vec![1, 0, 0, 0, 2, 0, 0, 0, 9, 9])])
            .unwrap();
        assert_eq!(
            array.elements().unwrap(),
            &[Value::Number(1.0), Value::Number(2.0)]
        );
        assert_eq!(binder.warnings().len(), 1);
        assert!(binder.warnings()[0].contains("2 trailing byte(s)"));

        let bytes = binder
            .construct(
                "PackedByteArray",
                &[Value::DataView {
                    buffer: vec![1, 2, 3, 4],
                    offset: 1,
                    length: 10,
                }],
            )
            .unwrap();
        assert_eq!(bytes.elements().unwrap().len(), 3);
        assert_eq!(binder.warnings().len(), 1);
    }

    #[test]
    fn test_properties() {
        let unit = unit(vec![vector2()]);
        let mut binder = Binder::new(&unit, NullHost);
        let mut v = binder.construct("Vector2", &[Value::Number(1.0), Value::Number(2.0)]).unwrap();

        assert_eq!(binder.get_property(&v, "y").unwrap(), Value::Number(2.0));
        assert_eq!(binder.get_property(&v, "z").unwrap(), Value::Undefined);
        assert_eq!(binder.set_property(&mut v, "x", Value::Number(5.0)).unwrap(), Value::Number(5.0));
        assert_eq!(v.get("x"), Some(&Value::Number(5.0)));

        let checked = Binder::new(&unit, NullHost).with_debug_validation(true);
        let err = checked.set_property(&mut v, "x", Value::from("five")).unwrap_err();
        assert_eq!(err, ScriptError::Type("number expected for Vector2.x".into()));
        assert_eq!(v.get("x"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn test_remapped_property_paths() {
        let plane = ClassSchema::new("Plane")
            .property(Property::new("d", "number"))
            .property(Property::new("normal", "Vector3"))
            .property(Property::new("x", "number").with_native("normal.x"));
        let vector3 = ClassSchema::new("Vector3")
            .property(Property::new("x", "number"))
            .property(Property::new("y", "number"))
            .property(Property::new("z", "number"));
        let unit = unit(vec![vector3, plane]);
        let mut binder = Binder::new(&unit, NullHost);

        let mut p = binder
            .construct(
                "Plane",
                &[Value::Number(1.0), Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)],
            )
            .unwrap();
        assert_eq!(binder.get_property(&p, "x").unwrap(), Value::Number(1.0));
        binder.set_property(&mut p, "x", Value::Number(9.0)).unwrap();
        let normal = binder.get_property(&p, "normal").unwrap();
        assert_eq!(normal.as_instance().unwrap().get("x"), Some(&Value::Number(9.0)));
    }

    #[test]
    fn test_methods_direct_delegated_and_indexed() {
        let bytes = ClassSchema::new("PackedByteArray")
            .method(
                Method::new("decode_u8")
                    .returns("number")
                    .arg(Argument::new("byte_offset", "number"))
                    .delegated(),
            )
            .method(Method::element_getter());
        let unit = unit(vec![vector2(), bytes]);
        let mut binder = Binder::new(&unit, VectorHost::default());

        let mut v = vec2(1.0, 2.0);
        let dot = binder.call_method(&mut v, "dot", &[Value::Builtin(vec2(3.0, 4.0))]).unwrap();
        assert_eq!(dot, Value::Number(11.0));

        let mut array = binder
            .construct("PackedByteArray", &[Value::ArrayBuffer(vec![7, 8])])
            .unwrap();
        let decoded = binder.call_method(&mut array, "decode_u8", &[Value::Number(0.0)]).unwrap();
        assert_eq!(decoded, Value::Number(42.0));
        assert_eq!(
            binder.call_method(&mut array, "get", &[Value::Number(1.0)]).unwrap(),
            Value::Number(8.0)
        );
        assert!(matches!(
            binder.call_method(&mut array, "get", &[Value::Number(2.0)]),
            Err(ScriptError::Range(_))
        ));
        assert_eq!(*binder.host().calls.borrow(), ["native:dot", "dynamic:decode_u8"]);
    }

    #[test]
    fn test_operators() {
        let unit = unit(vec![vector2()]);
        let binder = Binder::new(&unit, VectorHost::default()).with_debug_validation(true);
        let mut v = vec2(1.0, 2.0);
        let other = Value::Builtin(vec2(1.0, 2.0));

        assert_eq!(binder.apply_operator(&mut v, "equals", Some(&other)).unwrap(), Value::Bool(true));
        let sum = binder.apply_operator(&mut v, "add", Some(&other)).unwrap();
        assert_eq!(sum, Value::Builtin(vec2(2.0, 4.0)));
        assert_eq!(v, vec2(1.0, 2.0));

        let assigned = binder.apply_operator(&mut v, "add_assign", Some(&other)).unwrap();
        assert_eq!(v, vec2(2.0, 4.0));
        assert_eq!(assigned, Value::Builtin(vec2(2.0, 4.0)));

        let err = binder
            .apply_operator(&mut v, "add", Some(&Value::Number(1.0)))
            .unwrap_err();
        assert_eq!(err, ScriptError::Type("Vector2 expected for Vector2.add".into()));

        let symbols = binder.operator_symbols("Vector2").unwrap();
        assert!(symbols.contains(&"+".to_string()));
        assert!(!symbols.contains(&"+=".to_string()));
        assert_eq!(binder.constant("Vector2", "ZERO"), Some("Vector2(0, 0)"));
    }
}
