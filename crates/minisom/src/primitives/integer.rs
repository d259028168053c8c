//! Integer protocol: fixed-width arithmetic and comparisons.
//!
//! Arithmetic wraps at the i64 boundary, matching the original's fixed-width
//! behaviour; there is no promotion to wider integers.

use super::value_class_name;
use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    value::Value,
};

/// The receiver is always an integer (these live in `Integer`'s dictionary);
/// the argument needs checking.
fn operands(vm: &Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<(i64, i64)> {
    let Value::Integer(lhs) = receiver else {
        return Err(VmError::type_mismatch("receiver must be an Integer"));
    };
    match args[0] {
        Value::Integer(rhs) => Ok((lhs, rhs)),
        other => Err(VmError::type_mismatch(format!(
            "argument must be an Integer, not {}",
            value_class_name(vm, other)
        ))),
    }
}

fn receiver_int(receiver: Value) -> RunResult<i64> {
    match receiver {
        Value::Integer(value) => Ok(value),
        _ => Err(VmError::type_mismatch("receiver must be an Integer")),
    }
}

pub(super) fn add(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Integer(lhs.wrapping_add(rhs))))
}

pub(super) fn sub(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Integer(lhs.wrapping_sub(rhs))))
}

pub(super) fn mul(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Integer(lhs.wrapping_mul(rhs))))
}

pub(super) fn div(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    if rhs == 0 {
        return Err(VmError::division_by_zero());
    }
    Ok(Flow::Value(Value::Integer(lhs.wrapping_div(rhs))))
}

pub(super) fn modulo(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    if rhs == 0 {
        return Err(VmError::division_by_zero());
    }
    Ok(Flow::Value(Value::Integer(lhs.wrapping_rem(rhs))))
}

pub(super) fn less(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Boolean(lhs < rhs)))
}

pub(super) fn greater(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Boolean(lhs > rhs)))
}

pub(super) fn less_eq(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Boolean(lhs <= rhs)))
}

pub(super) fn greater_eq(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Boolean(lhs >= rhs)))
}

/// Value equality; a non-integer argument answers false rather than erroring.
pub(super) fn eq(receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let lhs = receiver_int(receiver)?;
    Ok(Flow::Value(Value::Boolean(matches!(args[0], Value::Integer(rhs) if rhs == lhs))))
}

pub(super) fn not_eq(receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let lhs = receiver_int(receiver)?;
    Ok(Flow::Value(Value::Boolean(!matches!(args[0], Value::Integer(rhs) if rhs == lhs))))
}

pub(super) fn abs(receiver: Value) -> RunResult<Flow> {
    let value = receiver_int(receiver)?;
    Ok(Flow::Value(Value::Integer(value.wrapping_abs())))
}

pub(super) fn negated(receiver: Value) -> RunResult<Flow> {
    let value = receiver_int(receiver)?;
    Ok(Flow::Value(Value::Integer(value.wrapping_neg())))
}

pub(super) fn min(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Integer(lhs.min(rhs))))
}

pub(super) fn max(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let (lhs, rhs) = operands(vm, receiver, args)?;
    Ok(Flow::Value(Value::Integer(lhs.max(rhs))))
}

pub(super) fn as_string(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let value = receiver_int(receiver)?;
    let string = vm.allocate_string(value.to_string())?;
    Ok(Flow::Value(string))
}
