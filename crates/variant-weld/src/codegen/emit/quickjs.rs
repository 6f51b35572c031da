//! C++ emitter for the QuickJS embedding
//!
//! Output layout:
//!
//! 1. includes and the shared `ingest_elements` buffer helper
//! 2. forward declarations of every constructor and binding function
//! 3. `QuickJSBuiltinBinder::bind_builtin_classes_gen()`, which registers
//!    each class with its constructor and arity, then runs the per-class
//!    binding functions
//! 4. definitions
//!
//! Type checks are compiled only when `DEBUG_METHODS_ENABLED` is defined.

use super::Emitter;
use crate::codegen::model::{
    ArgSlot, ArityArm, BindingUnit, CallKind, ClassBinding, Conversion, InitAction,
    MethodWrapper, OperatorWrapper, ParamSlot, PropertyAccessors, ShapeCase, ShapeGuard,
    ValueType,
};
use crate::ir::types::TypeKind;

const DEBUG_GUARD: &str = "DEBUG_METHODS_ENABLED";

/// Emits `quickjs_builtin_binder.gen.cpp`
#[derive(Debug, Clone, Default)]
pub struct QuickJsEmitter;

impl QuickJsEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for QuickJsEmitter {
    fn emit(&self, unit: &BindingUnit) -> String {
        let mut output = String::new();

        output.push_str("/* THIS FILE IS GENERATED. DO NOT EDIT. */\n\n");
        output.push_str("#include \"core/variant/variant.h\"\n");
        output.push_str("#include \"quickjs_binder.h\"\n");
        output.push_str("#include \"quickjs_builtin_binder.h\"\n\n");
        output.push_str("#ifndef inf\n#define inf INFINITY\n#endif\n\n");

        if unit
            .classes
            .iter()
            .any(|c| c.element.and_then(|e| e.stride()).is_some())
        {
            output.push_str(INGEST_HELPER);
            output.push('\n');
        }

        for class in &unit.classes {
            output.push_str(&format!(
                "static JSValue {}_constructor(JSContext *ctx, JSValueConst new_target, int argc, JSValueConst *argv);\n",
                class.class
            ));
            output.push_str(&format!(
                "static void bind_{}_properties(JSContext *ctx);\n",
                class.class
            ));
        }

        output.push_str("\nvoid QuickJSBuiltinBinder::bind_builtin_classes_gen() {\n");
        for class in &unit.classes {
            output.push_str(&format!(
                "\tregister_builtin_class({}, \"{}\", {}_constructor, {});\n",
                class.ty.variant, class.class, class.class, class.arity
            ));
        }
        output.push('\n');
        for class in &unit.classes {
            output.push_str(&format!("\tbind_{}_properties(ctx);\n", class.class));
        }
        output.push_str("}\n");

        for class in &unit.classes {
            let writer = ClassWriter::new(class);
            output.push('\n');
            output.push_str(&writer.constructor());
            output.push('\n');
            output.push_str(&writer.bindings());
        }

        output
    }
}

const INGEST_HELPER: &str = r#"template <typename T, size_t Stride, typename A>
static void ingest_elements(A &array, const uint8_t *bytes, size_t size, const char *class_name) {
	static_assert(sizeof(T) == Stride, "element layout does not match the buffer stride");
	if (size % Stride != 0) {
		WARN_PRINT(vformat("Buffer length %d is not a multiple of the element size for %s; trailing bytes ignored", (int64_t)size, class_name));
	}
	const size_t count = size / Stride;
	array.resize(count);
	if (count) {
		memcpy(array.ptrw(), bytes, count * Stride);
	}
}
"#;

struct ClassWriter<'a> {
    binding: &'a ClassBinding,
}

impl<'a> ClassWriter<'a> {
    fn new(binding: &'a ClassBinding) -> Self {
        Self { binding }
    }

    fn class(&self) -> &str {
        &self.binding.class
    }

    fn native(&self) -> &str {
        &self.binding.ty.native
    }

    fn variant(&self) -> &str {
        &self.binding.ty.variant
    }

    // -- constructor ------------------------------------------------------

    fn constructor(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "static JSValue {}_constructor(JSContext *ctx, JSValueConst new_target, int argc, JSValueConst *argv) {{\n",
            self.class()
        ));
        output.push_str(&format!("\t{} tmp;\n", self.native()));

        for (i, arm) in self.binding.constructor.arms.iter().enumerate() {
            let keyword = if i == 0 { "\tif" } else { " else if" };
            output.push_str(&format!("{} ({}) {{\n", keyword, arity_condition(arm)));
            output.push_str(&self.arm_body(arm));
            output.push('\t');
            output.push('}');
        }
        if !self.binding.constructor.arms.is_empty() {
            output.push('\n');
        }

        output.push_str("\tJSValue proto = JS_GetProperty(ctx, new_target, QuickJSBinder::JS_ATOM_prototype);\n");
        output.push_str("\tJSValue obj = JS_NewObjectProtoClass(ctx, proto, QuickJSBinder::get_context_binder(ctx)->get_origin_class_id());\n");
        output.push_str(&format!(
            "\tQuickJSBuiltinBinder::bind_builtin_object(ctx, obj, {}, &tmp);\n",
            self.variant()
        ));
        output.push_str("\tJS_FreeValue(ctx, proto);\n");
        output.push_str("\treturn obj;\n");
        output.push_str("}\n");
        output
    }

    fn arm_body(&self, arm: &ArityArm) -> String {
        let mut output = String::new();
        let guarded: Vec<&ShapeCase> = arm
            .cases
            .iter()
            .filter(|c| c.guard != ShapeGuard::Always)
            .collect();

        if guarded.is_empty() {
            for case in &arm.cases {
                output.push_str(&self.case_body(case, "\t\t", 0));
            }
            return output;
        }

        for (i, case) in guarded.iter().enumerate() {
            let keyword = if i == 0 { "\t\tif" } else { " else if" };
            output.push_str(&format!(
                "{} ({}) {{\n",
                keyword,
                self.guard_condition(&case.guard)
            ));
            output.push_str(&self.case_body(case, "\t\t\t", 1));
            output.push_str("\t\t}");
        }
        match &arm.expected {
            Some(expected) => {
                output.push_str(" else {\n");
                output.push_str(&format!("#ifdef {}\n", DEBUG_GUARD));
                output.push_str(&format!(
                    "\t\t\treturn JS_ThrowTypeError(ctx, \"{}\");\n",
                    c_string(expected)
                ));
                output.push_str("#endif\n");
                output.push_str("\t\t}\n");
            }
            None => output.push('\n'),
        }
        output
    }

    fn guard_condition(&self, guard: &ShapeGuard) -> String {
        match guard {
            ShapeGuard::Always => "true".to_string(),
            ShapeGuard::Number => "JS_IsNumber(argv[0])".to_string(),
            ShapeGuard::String => "JS_IsString(argv[0])".to_string(),
            ShapeGuard::Boolean => "JS_IsBool(argv[0])".to_string(),
            ShapeGuard::Array => "JS_IsArray(ctx, argv[0])".to_string(),
            ShapeGuard::ArrayBuffer => "JS_IsArrayBuffer(argv[0])".to_string(),
            ShapeGuard::DataView => "JS_IsDataView(argv[0])".to_string(),
            ShapeGuard::Builtin(ty) => format!(
                "QuickJSBinder::validate_type(ctx, {}, argv[0])",
                ty.variant
            ),
            ShapeGuard::Convertible => format!(
                "BINDING_DATA_FROM_JS(ctx, argv[0]) && Variant::can_convert(BINDING_DATA_FROM_JS(ctx, argv[0])->type, {})",
                self.variant()
            ),
        }
    }

    /// Validation and init steps of one overload. Parameters before
    /// `checked_from` are already covered by the shape guard.
    fn case_body(&self, case: &ShapeCase, indent: &str, checked_from: usize) -> String {
        let mut output = String::new();

        let checks: Vec<&ParamSlot> = case
            .params
            .iter()
            .filter(|p| p.validate && p.index >= checked_from && p.ty.is_some())
            .collect();
        if !checks.is_empty() {
            output.push_str(&format!("#ifdef {}\n", DEBUG_GUARD));
            for param in checks {
                if let Some(ty) = &param.ty {
                    let arg = format!("argv[{}]", param.index);
                    let mut failed = format!("!{}", validate_call(ty, &arg));
                    if param.default.is_some() {
                        failed = format!("argc > {} && {}", param.index, failed);
                    }
                    output.push_str(&format!(
                        "{}ERR_FAIL_COND_V({}, (JS_ThrowTypeError(ctx, \"{}\")));\n",
                        indent,
                        failed,
                        c_string(&param.type_error(self.class(), &case.signature))
                    ));
                }
            }
            output.push_str("#endif\n");
        }

        for action in &case.actions {
            output.push_str(&self.init_action(case, action, indent));
        }
        output
    }

    fn param_value(&self, case: &ShapeCase, index: usize) -> String {
        let Some(param) = case.params.get(index) else {
            return "Variant()".to_string();
        };
        let arg = format!("argv[{}]", index);
        let value = to_native(&param.conversion, &arg);
        match &param.default {
            Some(default) => format!("(argc > {} ? {} : {})", index, value, default),
            None => value,
        }
    }

    fn param_list(&self, case: &ShapeCase, args: &[usize]) -> String {
        args.iter()
            .map(|&i| self.param_value(case, i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn init_action(&self, case: &ShapeCase, action: &InitAction, indent: &str) -> String {
        match action {
            InitAction::Assign { path, arg } => {
                format!("{}tmp.{} = {};\n", indent, path, self.param_value(case, *arg))
            }
            InitAction::Broadcast { paths, arg } => {
                let mut output = String::new();
                if let Some((first, rest)) = paths.split_first() {
                    output.push_str(&format!(
                        "{}tmp.{} = {};\n",
                        indent,
                        first,
                        self.param_value(case, *arg)
                    ));
                    for path in rest {
                        output.push_str(&format!("{}tmp.{} = tmp.{};\n", indent, path, first));
                    }
                }
                output
            }
            InitAction::Replace { arg } => {
                format!("{}tmp = {};\n", indent, self.param_value(case, *arg))
            }
            InitAction::Construct { args } => format!(
                "{}tmp = {}({});\n",
                indent,
                self.native(),
                self.param_list(case, args)
            ),
            InitAction::Factory { function, args } => format!(
                "{}tmp = {}({});\n",
                indent,
                function,
                self.param_list(case, args)
            ),
            InitAction::Invoke { method, args } => format!(
                "{}tmp.{}({});\n",
                indent,
                method,
                self.param_list(case, args)
            ),
            InitAction::Convert { arg } => format!(
                "{}tmp = QuickJSBinder::var_to_variant(ctx, argv[{}]);\n",
                indent, arg
            ),
            InitAction::IngestBuffer { arg, element } => {
                let mut output = String::new();
                output.push_str(&format!("{}size_t size = 0;\n", indent));
                output.push_str(&format!(
                    "{}uint8_t *buffer = JS_GetArrayBuffer(ctx, &size, argv[{}]);\n",
                    indent, arg
                ));
                output.push_str(&format!("{}if (buffer) {{\n", indent));
                output.push_str(&format!(
                    "{}\tingest_elements<{}, {}>(tmp, buffer, size, \"{}\");\n",
                    indent,
                    element.native(),
                    element.stride().unwrap_or_default(),
                    self.class()
                ));
                output.push_str(&format!("{}}}\n", indent));
                output
            }
            InitAction::IngestView { arg, element } => {
                let mut output = String::new();
                for (local, property) in [("length", "byteLength"), ("offset", "byteOffset")] {
                    output.push_str(&format!(
                        "{}JSValue js_{} = JS_GetPropertyStr(ctx, argv[{}], \"{}\");\n",
                        indent, local, arg, property
                    ));
                    output.push_str(&format!(
                        "{}uint64_t {} = QuickJSBinder::js_to_uint64(ctx, js_{});\n",
                        indent, local, local
                    ));
                    output.push_str(&format!("{}JS_FreeValue(ctx, js_{});\n", indent, local));
                }
                output.push_str(&format!(
                    "{}JSValue array_buffer = JS_GetPropertyStr(ctx, argv[{}], \"buffer\");\n",
                    indent, arg
                ));
                output.push_str(&format!("{}size_t size = 0;\n", indent));
                output.push_str(&format!(
                    "{}uint8_t *buffer = JS_GetArrayBuffer(ctx, &size, array_buffer);\n",
                    indent
                ));
                output.push_str(&format!("{}JS_FreeValue(ctx, array_buffer);\n", indent));
                output.push_str(&format!("{}if (buffer && offset <= size) {{\n", indent));
                output.push_str(&format!(
                    "{}\tingest_elements<{}, {}>(tmp, buffer + offset, MIN((size_t)length, size - (size_t)offset), \"{}\");\n",
                    indent,
                    element.native(),
                    element.stride().unwrap_or_default(),
                    self.class()
                ));
                output.push_str(&format!("{}}}\n", indent));
                output
            }
        }
    }

    // -- per-class binding function -----------------------------------------

    fn bindings(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "static void bind_{}_properties(JSContext *ctx) {{\n",
            self.class()
        ));
        output.push_str("\tQuickJSBinder *binder = QuickJSBinder::get_context_binder(ctx);\n");

        if let Some(accessors) = &self.binding.accessors {
            output.push_str(&self.properties(accessors));
        }
        for method in &self.binding.methods {
            output.push_str(&self.method(method));
        }
        for operator in &self.binding.operators {
            output.push_str(&self.operator_method(operator));
        }
        output.push_str(&self.operator_table());
        for constant in &self.binding.constants {
            output.push_str(&format!(
                "\tbinder->get_builtin_binder().register_constant({}, \"{}\", {});\n",
                self.variant(),
                constant.name,
                constant.value
            ));
        }

        output.push_str("}\n");
        output
    }

    fn receiver(&self, from: &str, indent: &str) -> String {
        format!(
            "{indent}ECMAScriptGCHandler *bind = BINDING_DATA_FROM_JS(ctx, {from});\n{indent}{native} *ptr = bind->get{native}();\n",
            indent = indent,
            from = from,
            native = self.native()
        )
    }

    fn properties(&self, accessors: &PropertyAccessors) -> String {
        let mut output = String::new();

        output.push_str("\n\tJSCFunctionMagic *getter = [](JSContext *ctx, JSValueConst this_val, int argc, JSValueConst *argv, int magic) -> JSValue {\n");
        output.push_str(&self.receiver("this_val", "\t\t"));
        output.push_str("\t\tswitch (magic) {\n");
        for slot in &accessors.slots {
            output.push_str(&format!("\t\t\tcase {}:\n", slot.index));
            output.push_str(&format!(
                "\t\t\t\treturn {};\n",
                to_script(&slot.ty, &format!("ptr->{}", slot.path))
            ));
        }
        output.push_str("\t\t}\n");
        output.push_str("\t\treturn JS_UNDEFINED;\n");
        output.push_str("\t};\n");

        output.push_str("\n\tJSCFunctionMagic *setter = [](JSContext *ctx, JSValueConst this_val, int argc, JSValueConst *argv, int magic) -> JSValue {\n");
        output.push_str(&self.receiver("this_val", "\t\t"));
        output.push_str("\t\tswitch (magic) {\n");
        for slot in &accessors.slots {
            output.push_str(&format!("\t\t\tcase {}:\n", slot.index));
            if slot.ty.is_checked() {
                output.push_str(&format!("#ifdef {}\n", DEBUG_GUARD));
                output.push_str(&format!(
                    "\t\t\t\tERR_FAIL_COND_V(!{}, (JS_ThrowTypeError(ctx, \"{}\")));\n",
                    validate_call(&slot.ty, "argv[0]"),
                    c_string(&slot.type_error(self.class()))
                ));
                output.push_str("#endif\n");
            }
            output.push_str(&format!(
                "\t\t\t\tptr->{} = {};\n",
                slot.path,
                to_native(&Conversion::for_type(&slot.ty), "argv[0]")
            ));
            output.push_str("\t\t\t\tbreak;\n");
        }
        output.push_str("\t\t}\n");
        output.push_str("\t\treturn JS_DupValue(ctx, argv[0]);\n");
        output.push_str("\t};\n\n");

        for slot in &accessors.slots {
            output.push_str(&format!(
                "\tbinder->get_builtin_binder().register_property({}, \"{}\", getter, setter, {});\n",
                self.variant(),
                slot.name,
                slot.index
            ));
        }
        output
    }

    fn arg_declare(&self, slot: &ArgSlot, method: &str) -> String {
        let mut output = String::new();
        let arg = format!("argv[{}]", slot.index);
        if slot.validate {
            let mut failed = format!("!{}", validate_call(&slot.ty, &arg));
            if slot.default.is_some() {
                failed = format!("argc > {} && {}", slot.index, failed);
            }
            output.push_str(&format!("#ifdef {}\n", DEBUG_GUARD));
            output.push_str(&format!(
                "\t\t\tERR_FAIL_COND_V({}, (JS_ThrowTypeError(ctx, \"{}\")));\n",
                failed,
                c_string(&slot.type_error(self.class(), method))
            ));
            output.push_str("#endif\n");
        }
        let value = to_native(&slot.conversion, &arg);
        let value = match &slot.default {
            Some(default) => format!(
                "argc > {} ? {} : {}({})",
                slot.index, value, slot.ty.native, default
            ),
            None => value,
        };
        output.push_str(&format!(
            "\t\t\tconst {} &arg{} = {};\n",
            slot.ty.native, slot.index, value
        ));
        output
    }

    fn method(&self, method: &MethodWrapper) -> String {
        let mut output = String::new();
        output.push_str("\n\tbinder->get_builtin_binder().register_method(\n");
        output.push_str(&format!("\t\t{},\n", self.variant()));
        output.push_str(&format!("\t\t\"{}\",\n", method.name));
        output.push_str("\t\t[](JSContext *ctx, JSValueConst this_val, int argc, JSValueConst *argv) {\n");
        output.push_str(&self.receiver("this_val", "\t\t\t"));
        for slot in &method.args {
            output.push_str(&self.arg_declare(slot, &method.name));
        }

        let args = method
            .args
            .iter()
            .map(|slot| match &slot.enumeration {
                Some(enumeration) => format!("{}(arg{})", enumeration, slot.index),
                None => format!("arg{}", slot.index),
            })
            .collect::<Vec<_>>();
        let ret = match &method.returns {
            Some(ty) => format!("{} ret = ", ty.native),
            None => String::new(),
        };

        match &method.call {
            CallKind::Direct { native } => {
                output.push_str(&format!("\t\t\t{}ptr->{}({});\n", ret, native, args.join(", ")));
            }
            CallKind::Delegated { native } => {
                let mut call_args = format!("\"{}\"", native);
                for arg in &args {
                    call_args.push_str(", ");
                    call_args.push_str(arg);
                }
                output.push_str("\t\t\tVariant self_value = *ptr;\n");
                output.push_str(&format!("\t\t\t{}self_value.call({});\n", ret, call_args));
                output.push_str("\t\t\t*ptr = self_value;\n");
            }
            CallKind::Index => {
                let index = args.first().map(String::as_str).unwrap_or("0");
                output.push_str(&format!(
                    "\t\t\t{}ptr->operator[](static_cast<int>({}));\n",
                    ret, index
                ));
            }
        }

        let value = match &method.returns {
            Some(ty) => to_script(ty, "ret"),
            None => "JS_UNDEFINED".to_string(),
        };
        output.push_str(&format!("\t\t\treturn {};\n", value));
        output.push_str("\t\t},\n");
        output.push_str(&format!("\t\t{});\n", method.argc()));
        output
    }

    fn operand_declare(&self, operator: &OperatorWrapper, from: &str, indent: &str) -> String {
        let mut output = String::new();
        if let Some(ty) = &operator.operand {
            if ty.is_checked() {
                output.push_str(&format!("#ifdef {}\n", DEBUG_GUARD));
                output.push_str(&format!(
                    "{}ERR_FAIL_COND_V(!{}, (JS_ThrowTypeError(ctx, \"{}\")));\n",
                    indent,
                    validate_call(ty, from),
                    c_string(&operator.type_error(self.class()))
                ));
                output.push_str("#endif\n");
            }
            output.push_str(&format!(
                "{}const {} &operand = {};\n",
                indent,
                ty.native,
                to_native(&Conversion::for_type(ty), from)
            ));
        }
        output
    }

    fn evaluate(&self, operator: &OperatorWrapper) -> String {
        let operand = if operator.operand.is_some() {
            "Variant(operand)"
        } else {
            "Variant()"
        };
        format!(
            "Variant::evaluate({}, Variant(*ptr), {})",
            operator.code.native(),
            operand
        )
    }

    /// Operator exposed as a named method on the receiver
    fn operator_method(&self, operator: &OperatorWrapper) -> String {
        let mut output = String::new();
        output.push_str("\n\tbinder->get_builtin_binder().register_method(\n");
        output.push_str(&format!("\t\t{},\n", self.variant()));
        output.push_str(&format!("\t\t\"{}\",\n", operator.name));
        output.push_str("\t\t[](JSContext *ctx, JSValueConst this_val, int argc, JSValueConst *argv) {\n");
        output.push_str(&self.receiver("this_val", "\t\t\t"));
        output.push_str(&self.operand_declare(operator, "argv[0]", "\t\t\t"));
        if operator.mutates {
            output.push_str(&format!("\t\t\t*ptr = {};\n", self.evaluate(operator)));
            output.push_str("\t\t\treturn JS_DupValue(ctx, this_val);\n");
        } else {
            output.push_str(&format!(
                "\t\t\t{} ret = {};\n",
                operator.returns.native,
                self.evaluate(operator)
            ));
            output.push_str(&format!("\t\t\treturn {};\n", to_script(&operator.returns, "ret")));
        }
        output.push_str("\t\t},\n");
        output.push_str(&format!("\t\t{});\n", operator.argc() - 1));
        output
    }

    /// Operator table entries plus externally declared cross-type operators
    fn operator_table(&self) -> String {
        let mut output = String::new();
        output.push_str("\n\tVector<JSValue> operators;\n");
        output.push_str("\tJSValue base_operators = JS_NewObject(ctx);\n");

        for operator in self.binding.table_operators() {
            let Some(symbol) = &operator.symbol else {
                continue;
            };
            output.push_str(&format!(
                "\tJS_SetPropertyStr(ctx, base_operators, \"{}\",\n",
                symbol
            ));
            output.push_str("\t\tJS_NewCFunction(ctx, [](JSContext *ctx, JSValueConst this_val, int argc, JSValueConst *argv) {\n");
            output.push_str(&self.receiver("argv[0]", "\t\t\t"));
            output.push_str(&self.operand_declare(operator, "argv[1]", "\t\t\t"));
            output.push_str(&format!(
                "\t\t\t{} ret = {};\n",
                operator.returns.native,
                self.evaluate(operator)
            ));
            output.push_str(&format!("\t\t\treturn {};\n", to_script(&operator.returns, "ret")));
            output.push_str("\t\t},\n");
            output.push_str(&format!("\t\t\"{}\",\n", operator.name));
            output.push_str(&format!("\t\t{})\n", operator.argc()));
            output.push_str("\t);\n");
        }

        output.push_str("\toperators.push_back(base_operators);\n");
        output.push_str(&format!(
            "\tbinder->get_builtin_binder().get_cross_type_operators({}, operators);\n",
            self.variant()
        ));
        output.push_str(&format!(
            "\tbinder->get_builtin_binder().register_operators({}, operators);\n",
            self.variant()
        ));
        output
    }
}

fn arity_condition(arm: &ArityArm) -> String {
    if arm.min == arm.max {
        format!("argc == {}", arm.min)
    } else {
        format!("argc >= {} && argc <= {}", arm.min, arm.max)
    }
}

fn validate_call(ty: &ValueType, arg: &str) -> String {
    format!("QuickJSBinder::validate_type(ctx, {}, {})", ty.variant, arg)
}

/// Script value to native value
fn to_native(conversion: &Conversion, arg: &str) -> String {
    match conversion {
        Conversion::Number => format!("QuickJSBinder::js_to_number(ctx, {})", arg),
        Conversion::Uint => format!("QuickJSBinder::js_to_uint(ctx, {})", arg),
        Conversion::String => format!("QuickJSBinder::js_to_string(ctx, {})", arg),
        Conversion::Boolean => format!("QuickJSBinder::js_to_bool(ctx, {})", arg),
        Conversion::Builtin(class) => format!("*(BINDING_DATA_FROM_JS(ctx, {}))->get{}()", arg, class),
        Conversion::Dynamic => format!("QuickJSBinder::var_to_variant(ctx, {})", arg),
    }
}

/// Native value to script value
fn to_script(ty: &ValueType, expr: &str) -> String {
    match ty.kind {
        TypeKind::Number => format!("QuickJSBinder::to_js_number(ctx, {})", expr),
        TypeKind::String => format!("QuickJSBinder::to_js_string(ctx, {})", expr),
        TypeKind::Boolean => format!("QuickJSBinder::to_js_bool(ctx, {})", expr),
        TypeKind::Builtin => format!("QuickJSBuiltinBinder::new_object_from(ctx, {})", expr),
        TypeKind::Variant | TypeKind::Object => {
            format!("QuickJSBinder::variant_to_var(ctx, {})", expr)
        }
    }
}

fn c_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::synth::Synthesizer;
    use crate::config::WeldConfig;
    use crate::ir::schema::{Argument, ClassSchema, Method, Property};
    use crate::ir::store::SchemaStore;

    fn emit(classes: Vec<ClassSchema>) -> String {
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
        let unit = Synthesizer::new(&config)
            .synthesize(&SchemaStore::new(classes))
            .unwrap();
        QuickJsEmitter::new().emit(&unit)
    }

    fn vector2() -> ClassSchema {
        ClassSchema::new("Vector2")
            .property(Property::new("x", "number"))
            .property(Property::new("y", "number"))
            .method(
                Method::new("lerp")
                    .returns("Vector2")
                    .arg(Argument::new("to", "Vector2"))
                    .arg(Argument::new("weight", "number").with_default("0.5")),
            )
            .constant("ZERO", "Vector2(0, 0)")
    }

    #[test]
    fn test_registration_region() {
        let out = emit(vec![vector2(), ClassSchema::new("RID")]);
        let register_vector = out
            .find("\tregister_builtin_class(Variant::VECTOR2, \"Vector2\", Vector2_constructor, 2);")
            .unwrap();
        let register_rid = out
            .find("\tregister_builtin_class(Variant::RID, \"RID\", RID_constructor, 0);")
            .unwrap();
        let bind_vector = out.find("\tbind_Vector2_properties(ctx);").unwrap();
        assert!(register_vector < register_rid && register_rid < bind_vector);
        assert!(out.contains("static void bind_RID_properties(JSContext *ctx);\n"));
        assert!(!out.contains("ingest_elements"));
    }

    #[test]
    fn test_vector2_constructor() {
        let out = emit(vec![vector2()]);
        assert!(out.contains("\tif (argc == 1) {\n\t\tif (QuickJSBinder::validate_type(ctx, Variant::VECTOR2, argv[0])) {\n\t\t\ttmp = *(BINDING_DATA_FROM_JS(ctx, argv[0]))->getVector2();\n"));
        assert!(out.contains("} else if (JS_IsNumber(argv[0])) {\n\t\t\ttmp.x = QuickJSBinder::js_to_number(ctx, argv[0]);\n\t\t\ttmp.y = tmp.x;\n"));
        assert!(out.contains("return JS_ThrowTypeError(ctx, \"Vector2 or number expected for argument #0 of Vector2()\");"));
        assert!(out.contains(" else if (argc == 2) {\n#ifdef DEBUG_METHODS_ENABLED\n\t\tERR_FAIL_COND_V(!QuickJSBinder::validate_type(ctx, Variant::FLOAT, argv[0]), (JS_ThrowTypeError(ctx, \"number expected for argument 0 of Vector2(x, y)\")));\n"));
    }

    #[test]
    fn test_properties_and_methods() {
        let out = emit(vec![vector2()]);
        assert!(out.contains("\t\t\tcase 1:\n\t\t\t\treturn QuickJSBinder::to_js_number(ctx, ptr->y);\n"));
        assert!(out.contains("\t\t\t\tptr->x = QuickJSBinder::js_to_number(ctx, argv[0]);\n"));
        assert!(out.contains("(JS_ThrowTypeError(ctx, \"number expected for Vector2.x\"))"));
        assert!(out.contains("\t\treturn JS_DupValue(ctx, argv[0]);\n"));
        assert!(out.contains("register_property(Variant::VECTOR2, \"y\", getter, setter, 1);"));
        assert!(out.contains("\t\t\tconst real_t &arg1 = argc > 1 ? QuickJSBinder::js_to_number(ctx, argv[1]) : real_t(0.5);\n"));
        assert!(out.contains("\t\t\tVector2 ret = ptr->lerp(arg0, arg1);\n\t\t\treturn QuickJSBuiltinBinder::new_object_from(ctx, ret);\n"));
        assert!(out.contains("register_constant(Variant::VECTOR2, \"ZERO\", Vector2(0, 0));"));
    }

    #[test]
    fn test_operators() {
        let out = emit(vec![vector2()]);
        assert!(out.contains("\t\t\"add_assign\",\n"));
        assert!(out.contains("\t\t\t*ptr = Variant::evaluate(Variant::OP_ADD, Variant(*ptr), Variant(operand));\n\t\t\treturn JS_DupValue(ctx, this_val);\n"));
        assert!(out.contains("\t\t\tbool ret = Variant::evaluate(Variant::OP_EQUAL, Variant(*ptr), Variant(operand));\n\t\t\treturn QuickJSBinder::to_js_bool(ctx, ret);\n"));
        assert!(out.contains("\tJS_SetPropertyStr(ctx, base_operators, \"+\",\n"));
        assert!(out.contains("\tJS_SetPropertyStr(ctx, base_operators, \"neg\",\n"));
        assert!(!out.contains("base_operators, \"+=\""));
        assert!(out.contains("Variant::evaluate(Variant::OP_NEGATE, Variant(*ptr), Variant())"));
        assert!(out.contains("get_cross_type_operators(Variant::VECTOR2, operators);"));
    }

    #[test]
    fn test_packed_arrays() {
        let bytes = ClassSchema::new("PackedByteArray")
            .method(
                Method::new("decode_u8")
                    .returns("number")
                    .arg(Argument::new("byte_offset", "number"))
                    .delegated(),
            )
            .method(Method::element_getter());
        let out = emit(vec![bytes, ClassSchema::new("PackedStringArray")]);

        assert!(out.contains("static void ingest_elements("));
        assert!(out.contains("static_assert(sizeof(T) == Stride,"));
        assert!(out.contains("ingest_elements<uint8_t, 1>(tmp, buffer, size, \"PackedByteArray\");"));
        assert!(out.contains("ingest_elements<uint8_t, 1>(tmp, buffer + offset, MIN((size_t)length, size - (size_t)offset), \"PackedByteArray\");"));
        assert!(out.contains("\t\t\tVariant self_value = *ptr;\n\t\t\treal_t ret = self_value.call(\"decode_u8\", arg0);\n\t\t\t*ptr = self_value;\n"));
        assert!(out.contains("\t\t\tVariant ret = ptr->operator[](static_cast<int>(arg0));\n"));
        assert!(out.contains("Array or PackedStringArray expected for argument #0 of PackedStringArray()"));
        assert!(!out.contains("ingest_elements<String"));
    }

    #[test]
    fn test_ingestion_uses_element_stride() {
        let out = emit(vec![
            ClassSchema::new("PackedVector2Array").method(Method::element_getter()),
            ClassSchema::new("PackedColorArray").method(Method::element_getter()),
        ]);
        assert!(out.contains("ingest_elements<Vector2, 8>(tmp, buffer, size, \"PackedVector2Array\");"));
        assert!(out.contains("ingest_elements<Color, 16>(tmp, buffer, size, \"PackedColorArray\");"));
    }

    #[test]
    fn test_enumeration_cast() {
        let rect = ClassSchema::new("Rect2").method(
            Method::new("grow_side")
                .returns("Rect2")
                .arg(Argument::new("side", "number").with_enumeration("Side"))
                .arg(Argument::new("amount", "number")),
        );
        let out = emit(vec![rect]);
        assert!(out.contains("Rect2 ret = ptr->grow_side(Side(arg0), arg1);"));
    }
}
