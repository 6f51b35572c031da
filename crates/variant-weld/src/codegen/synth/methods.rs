use super::resolve;
use crate::codegen::model::{ArgSlot, CallKind, Conversion, MethodWrapper};
use crate::error::WeldResult;
use crate::ir::schema::Method;
use crate::ir::types::TypeTable;

/// Translate a documented default literal into native syntax
///
/// Empty collections and strings are written differently in documentation
/// than in native code; every other literal is used verbatim.
pub fn native_default(literal: &str) -> String {
    match literal {
        "\"\"" => "String()".to_string(),
        "null" => "Variant()".to_string(),
        "[]" => "Array()".to_string(),
        "{}" => "Dictionary()".to_string(),
        other => other.to_string(),
    }
}

pub(super) fn wrap(class: &str, method: &Method, types: &TypeTable) -> WeldResult<MethodWrapper> {
    let mut args = Vec::with_capacity(method.arguments.len());
    for (index, argument) in method.arguments.iter().enumerate() {
        let ty = resolve(types, class, &format!("{}(#{})", method.name, index), &argument.ty)?;
        args.push(ArgSlot {
            index,
            conversion: Conversion::for_type(&ty),
            validate: ty.is_checked(),
            default: argument
                .default_value
                .as_deref()
                .filter(|_| argument.has_default_value)
                .map(native_default),
            enumeration: argument.enumeration.clone(),
            ty,
        });
    }

    let call = if method.indexed {
        CallKind::Index
    } else if method.delegated {
        CallKind::Delegated {
            native: method.native_method.clone(),
        }
    } else {
        CallKind::Direct {
            native: method.native_method.clone(),
        }
    };

    let returns = if method.is_void() {
        None
    } else {
        Some(resolve(types, class, &format!("{}()", method.name), &method.return_type)?)
    };

    Ok(MethodWrapper {
        name: method.name.clone(),
        args,
        call,
        returns,
    })
}
