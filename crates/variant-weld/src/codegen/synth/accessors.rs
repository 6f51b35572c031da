use super::resolve;
use crate::codegen::model::{PropertyAccessors, PropertySlot};
use crate::error::WeldResult;
use crate::ir::schema::ClassSchema;
use crate::ir::types::TypeTable;

/// Index every property in schema order
pub(super) fn plan(schema: &ClassSchema, types: &TypeTable) -> WeldResult<Option<PropertyAccessors>> {
    if schema.properties.is_empty() {
        return Ok(None);
    }

    let slots = schema
        .properties
        .iter()
        .enumerate()
        .map(|(index, p)| {
            Ok(PropertySlot {
                index,
                name: p.name.clone(),
                path: p.native.clone(),
                ty: resolve(types, &schema.name, &p.name, &p.ty)?,
            })
        })
        .collect::<WeldResult<Vec<_>>>()?;

    Ok(Some(PropertyAccessors { slots }))
}
