//! Code synthesizer
//!
//! Turns the schema store into a [`BindingUnit`]: per class a constructor
//! dispatcher, the property accessor pair, method and operator wrappers and
//! constant registrations.

mod accessors;
mod constructor;
mod methods;
mod operators;

pub use methods::native_default;

use crate::codegen::model::{BindingUnit, ClassBinding, ConstantBinding, ValueType};
use crate::config::WeldConfig;
use crate::error::WeldResult;
use crate::ir::schema::ClassSchema;
use crate::ir::store::SchemaStore;
use crate::ir::types::TypeTable;
use tracing::{debug, info};

pub struct Synthesizer<'a> {
    config: &'a WeldConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a WeldConfig) -> Self {
        Self { config }
    }

    /// Synthesize bindings for every class in the store, in store order
    pub fn synthesize(&self, store: &SchemaStore) -> WeldResult<BindingUnit> {
        store.validate(self.config.types())?;
        let classes = store
            .classes()
            .iter()
            .map(|schema| self.class_binding(schema))
            .collect::<WeldResult<Vec<_>>>()?;
        info!(classes = classes.len(), "synth.done");
        Ok(BindingUnit { classes })
    }

    pub fn class_binding(&self, schema: &ClassSchema) -> WeldResult<ClassBinding> {
        let class = schema.name.as_str();
        let types = self.config.types();
        let overrides = self.config.overrides(class)?;

        let binding = ClassBinding {
            class: class.to_string(),
            ty: resolve(types, class, "class", class)?,
            arity: schema.constructor_argc,
            constructor: constructor::plan(class, overrides, types)?,
            accessors: accessors::plan(schema, types)?,
            methods: schema
                .methods
                .iter()
                .map(|m| methods::wrap(class, m, types))
                .collect::<WeldResult<_>>()?,
            operators: schema
                .operators
                .iter()
                .map(|o| operators::wrap(class, o, types))
                .collect::<WeldResult<_>>()?,
            constants: schema
                .constants
                .iter()
                .map(|c| ConstantBinding {
                    name: c.name.clone(),
                    value: c.value.clone(),
                })
                .collect(),
            element: overrides.array.map(|a| a.element),
        };

        debug!(
            class,
            arms = binding.constructor.arms.len(),
            methods = binding.methods.len(),
            operators = binding.operators.len(),
            "synth.class"
        );
        Ok(binding)
    }
}

fn resolve(types: &TypeTable, class: &str, context: &str, tag: &str) -> WeldResult<ValueType> {
    types.require(class, context, tag).map(ValueType::from)
}
