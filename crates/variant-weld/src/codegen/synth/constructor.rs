//! Constructor dispatcher planning
//!
//! Overloads are grouped by arity range. Ranges must be identical or
//! disjoint. Within a group the first argument's runtime shape picks the
//! overload, so every overload of a shared group (and every single-argument
//! overload) needs a distinct first-argument guard.

use super::resolve;
use crate::codegen::model::{
    ArityArm, Conversion, ConstructorDispatcher, InitAction, ParamSlot, ShapeCase, ShapeGuard,
};
use crate::config::{ClassOverrides, ConstructorOverload, ElementKind, InitStep, ParamConversion};
use crate::error::{WeldError, WeldResult};
use crate::ir::types::{TypeKind, TypeTable};

struct Candidate {
    min: usize,
    max: usize,
    case: ShapeCase,
}

pub(super) fn plan(
    class: &str,
    overrides: &ClassOverrides,
    types: &TypeTable,
) -> WeldResult<ConstructorDispatcher> {
    let mut candidates = Vec::new();
    if let Some(array) = overrides.array {
        candidates.extend(container_cases(class, array.element, types)?);
    }
    for overload in &overrides.constructors {
        candidates.push(candidate(class, overload, types)?);
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for c in &candidates {
        if !ranges.contains(&(c.min, c.max)) {
            ranges.push((c.min, c.max));
        }
    }
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        let ((a_min, a_max), (b_min, b_max)) = (pair[0], pair[1]);
        if b_min <= a_max {
            return Err(WeldError::AmbiguousConstructor {
                class: class.to_string(),
                argc: b_min,
                detail: format!(
                    "arity ranges {}..={} and {}..={} overlap",
                    a_min, a_max, b_min, b_max
                ),
            });
        }
    }

    let mut arms = Vec::with_capacity(ranges.len());
    for (min, max) in ranges {
        let mut cases: Vec<ShapeCase> = Vec::new();
        for c in candidates.iter().filter(|c| c.min == min && c.max == max) {
            cases.push(c.case.clone());
        }
        arms.push(arm(class, min, max, cases)?);
    }

    Ok(ConstructorDispatcher {
        class: class.to_string(),
        arms,
    })
}

fn arm(class: &str, min: usize, max: usize, mut cases: Vec<ShapeCase>) -> WeldResult<ArityArm> {
    let guarded = cases.len() > 1 || (min == 1 && max == 1);
    if !guarded {
        for case in &mut cases {
            case.guard = ShapeGuard::Always;
        }
        return Ok(ArityArm {
            min,
            max,
            cases,
            expected: None,
        });
    }

    for (i, case) in cases.iter().enumerate() {
        let clash = cases[..i].iter().any(|earlier| earlier.guard == case.guard);
        if clash || (case.guard == ShapeGuard::Always && cases.len() > 1) {
            return Err(WeldError::AmbiguousConstructor {
                class: class.to_string(),
                argc: min,
                detail: format!(
                    "more than one overload accepts {} as the first argument",
                    case.guard.describe(class)
                ),
            });
        }
    }

    let expected = if cases.iter().any(|c| c.guard == ShapeGuard::Always) {
        None
    } else {
        let shapes: Vec<String> = cases.iter().map(|c| c.guard.describe(class)).collect();
        Some(format!(
            "{} expected for argument #0 of {}()",
            shapes.join(" or "),
            class
        ))
    };

    Ok(ArityArm {
        min,
        max,
        cases,
        expected,
    })
}

fn candidate(class: &str, overload: &ConstructorOverload, types: &TypeTable) -> WeldResult<Candidate> {
    let context = format!("{}({})", class, overload.signature());
    let mut params = Vec::with_capacity(overload.params.len());
    for (index, param) in overload.params.iter().enumerate() {
        let slot = if param.is_convertible() {
            ParamSlot {
                index,
                ty: None,
                conversion: Conversion::Dynamic,
                validate: false,
                default: param.default.clone(),
            }
        } else {
            let ty = resolve(types, class, &context, &param.ty)?;
            let conversion = match param.convert {
                Some(ParamConversion::Uint) => Conversion::Uint,
                None => Conversion::for_type(&ty),
            };
            ParamSlot {
                index,
                validate: ty.is_checked(),
                conversion,
                default: param.default.clone(),
                ty: Some(ty),
            }
        };
        params.push(slot);
    }

    let guard = params.first().map(guard_for).unwrap_or(ShapeGuard::Always);
    let (min, max) = overload.arity();
    Ok(Candidate {
        min,
        max,
        case: ShapeCase {
            guard,
            signature: overload.signature(),
            params,
            actions: overload.init.iter().map(action).collect(),
        },
    })
}

fn guard_for(slot: &ParamSlot) -> ShapeGuard {
    match &slot.ty {
        None => ShapeGuard::Convertible,
        Some(ty) => match ty.kind {
            TypeKind::Number => ShapeGuard::Number,
            TypeKind::String => ShapeGuard::String,
            TypeKind::Boolean => ShapeGuard::Boolean,
            TypeKind::Builtin => ShapeGuard::Builtin(ty.clone()),
            TypeKind::Variant | TypeKind::Object => ShapeGuard::Always,
        },
    }
}

fn action(step: &InitStep) -> InitAction {
    match step.clone() {
        InitStep::Assign { path, arg } => InitAction::Assign { path, arg },
        InitStep::Broadcast { paths, arg } => InitAction::Broadcast { paths, arg },
        InitStep::Replace { arg } => InitAction::Replace { arg },
        InitStep::Construct { args } => InitAction::Construct { args },
        InitStep::Factory { function, args } => InitAction::Factory { function, args },
        InitStep::Invoke { method, args } => InitAction::Invoke { method, args },
        InitStep::Convert { arg } => InitAction::Convert { arg },
    }
}

/// Single-argument cases every fixed-element container accepts
fn container_cases(class: &str, element: ElementKind, types: &TypeTable) -> WeldResult<Vec<Candidate>> {
    let own = resolve(types, class, "class", class)?;
    let any = |guard: ShapeGuard, action: InitAction| Candidate {
        min: 1,
        max: 1,
        case: ShapeCase {
            guard,
            signature: "from".to_string(),
            params: vec![ParamSlot {
                index: 0,
                ty: None,
                conversion: Conversion::Dynamic,
                validate: false,
                default: None,
            }],
            actions: vec![action],
        },
    };

    let mut cases = vec![any(ShapeGuard::Array, InitAction::Convert { arg: 0 })];
    if element.stride().is_some() {
        cases.push(any(
            ShapeGuard::ArrayBuffer,
            InitAction::IngestBuffer { arg: 0, element },
        ));
        cases.push(any(
            ShapeGuard::DataView,
            InitAction::IngestView { arg: 0, element },
        ));
    }
    cases.push(any(ShapeGuard::Builtin(own), InitAction::Replace { arg: 0 }));
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeldConfig;

    fn dispatcher(class: &str) -> ConstructorDispatcher {
        let config = WeldConfig::builtin().unwrap();
        plan(class, config.overrides(class).unwrap(), config.types()).unwrap()
    }

    #[test]
    fn test_vector2_arms() {
        let d = dispatcher("Vector2");
        assert_eq!(d.arms.len(), 2);

        let one = d.arm_for(1).unwrap();
        let guards: Vec<_> = one.cases.iter().map(|c| c.guard.describe("Vector2")).collect();
        assert_eq!(guards, ["Vector2", "number"]);
        assert_eq!(
            one.expected.as_deref(),
            Some("Vector2 or number expected for argument #0 of Vector2()")
        );

        let two = d.arm_for(2).unwrap();
        assert_eq!(two.cases.len(), 1);
        assert_eq!(two.cases[0].guard, ShapeGuard::Always);
        assert!(two.expected.is_none());
        assert!(d.arm_for(0).is_none());
        assert!(d.arm_for(3).is_none());
    }

    #[test]
    fn test_color_defaults_and_uint() {
        let d = dispatcher("Color");
        let rgba = d.arm_for(3).unwrap();
        assert_eq!((rgba.min, rgba.max), (3, 4));
        assert_eq!(rgba.cases[0].params[3].default.as_deref(), Some("1.0"));

        let one = d.arm_for(1).unwrap();
        assert_eq!(one.cases[0].params[0].conversion, Conversion::Uint);
        assert_eq!(one.cases[1].guard, ShapeGuard::String);
    }

    #[test]
    fn test_packed_array_cases() {
        let d = dispatcher("PackedFloat32Array");
        let one = d.arm_for(1).unwrap();
        let guards: Vec<_> = one.cases.iter().map(|c| c.guard.describe("PackedFloat32Array")).collect();
        assert_eq!(guards, ["Array", "ArrayBuffer", "DataView", "PackedFloat32Array"]);

        let strings = dispatcher("PackedStringArray");
        let one = strings.arm_for(1).unwrap();
        assert_eq!(one.cases.len(), 2);
        assert!(one.cases.iter().all(|c| c.guard != ShapeGuard::ArrayBuffer));
    }

    #[test]
    fn test_convertible_follows_exact_copy() {
        let d = dispatcher("Transform2D");
        let one = d.arm_for(1).unwrap();
        assert!(matches!(one.cases[0].guard, ShapeGuard::Builtin(ref t) if t.tag == "Transform2D"));
        assert_eq!(one.cases[1].guard, ShapeGuard::Convertible);
    }

    #[test]
    fn test_overlapping_ranges_are_ambiguous() {
        let config = WeldConfig::builtin().unwrap();
        let mut overrides = config.overrides("Color").unwrap().clone();
        let mut four = overrides.constructors[0].clone();
        four.params[3].default = None;
        overrides.constructors.push(four);

        let err = plan("Color", &overrides, config.types()).unwrap_err();
        assert!(matches!(err, WeldError::AmbiguousConstructor { argc: 4, .. }));
    }

    #[test]
    fn test_duplicate_guards_are_ambiguous() {
        let config = WeldConfig::builtin().unwrap();
        let mut overrides = config.overrides("Vector2").unwrap().clone();
        let broadcast = overrides.constructors[2].clone();
        overrides.constructors.push(broadcast);

        let err = plan("Vector2", &overrides, config.types()).unwrap_err();
        assert!(matches!(err, WeldError::AmbiguousConstructor { argc: 1, .. }));
    }
}
