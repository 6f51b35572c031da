use super::resolve;
use crate::codegen::model::OperatorWrapper;
use crate::error::WeldResult;
use crate::ir::schema::Operator;
use crate::ir::types::TypeTable;

pub(super) fn wrap(class: &str, operator: &Operator, types: &TypeTable) -> WeldResult<OperatorWrapper> {
    let operand = operator
        .operand()
        .map(|tag| resolve(types, class, &operator.name, tag))
        .transpose()?;
    let returns = resolve(types, class, &operator.name, &operator.returns.tag(class))?;

    Ok(OperatorWrapper {
        name: operator.name.clone(),
        code: operator.code,
        symbol: operator.code.symbol().map(str::to_string),
        operand,
        returns,
        mutates: operator.returns.mutates_receiver(),
    })
}
