//! Boolean protocol.
//!
//! Conditionals are not an evaluator feature: they are these methods,
//! installed once on `Boolean` and inherited by `True` and `False`. Branch
//! arguments are usually blocks, which get evaluated through the block
//! activation path; a plain value in branch position is answered as-is.

use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    value::Value,
};

fn receiver_bool(receiver: Value) -> RunResult<bool> {
    match receiver {
        Value::Boolean(value) => Ok(value),
        _ => Err(VmError::type_mismatch("receiver must be a Boolean")),
    }
}

/// Evaluates a branch argument: blocks are invoked, anything else answers
/// itself.
fn eval_branch(vm: &mut Vm<'_>, arg: Value) -> RunResult<Flow> {
    match super::block_of(vm, arg) {
        Some(block) => vm.call_block(block, &[], "value"),
        None => Ok(Flow::Value(arg)),
    }
}

pub(super) fn not(receiver: Value) -> RunResult<Flow> {
    let value = receiver_bool(receiver)?;
    Ok(Flow::Value(Value::Boolean(!value)))
}

pub(super) fn if_true(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    if receiver_bool(receiver)? {
        eval_branch(vm, args[0])
    } else {
        Ok(Flow::Value(Value::Nil))
    }
}

pub(super) fn if_false(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    if receiver_bool(receiver)? {
        Ok(Flow::Value(Value::Nil))
    } else {
        eval_branch(vm, args[0])
    }
}

pub(super) fn if_true_if_false(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let index = usize::from(!receiver_bool(receiver)?);
    eval_branch(vm, args[index])
}

/// Short-circuiting conjunction: the argument is only evaluated when the
/// receiver is true.
pub(super) fn and(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    if receiver_bool(receiver)? {
        eval_branch(vm, args[0])
    } else {
        Ok(Flow::Value(Value::Boolean(false)))
    }
}

/// Short-circuiting disjunction.
pub(super) fn or(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    if receiver_bool(receiver)? {
        Ok(Flow::Value(Value::Boolean(true)))
    } else {
        eval_branch(vm, args[0])
    }
}

pub(super) fn xor(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let lhs = receiver_bool(receiver)?;
    let rhs = match eval_branch(vm, args[0])? {
        Flow::Value(Value::Boolean(value)) => value,
        Flow::Value(_) => return Err(VmError::type_mismatch("xor: expects a Boolean argument")),
        ret @ Flow::Return { .. } => return Ok(ret),
    };
    Ok(Flow::Value(Value::Boolean(lhs ^ rhs)))
}
