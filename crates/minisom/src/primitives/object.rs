//! Object protocol: identity, hashing, printing, nil tests.

use crate::{
    error::RunResult,
    evaluator::{Flow, Vm},
    value::{Value, describe},
};

pub(super) fn class(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    Ok(Flow::Value(Value::Ref(vm.class_of_value(receiver))))
}

/// Identity equality; value classes with content equality override this.
pub(super) fn eq(_vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    Ok(Flow::Value(Value::Boolean(receiver == args[0])))
}

pub(super) fn hash(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    Ok(Flow::Value(Value::Integer(receiver.identity_hash(vm.heap))))
}

pub(super) fn println(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = describe(receiver, vm.heap, vm.interns);
    vm.print.write_line(&text);
    Ok(Flow::Value(receiver))
}

pub(super) fn print(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = describe(receiver, vm.heap, vm.interns);
    vm.print.write_str(&text);
    Ok(Flow::Value(receiver))
}

pub(super) fn is_nil(receiver: Value) -> RunResult<Flow> {
    Ok(Flow::Value(Value::Boolean(receiver.is_nil())))
}

pub(super) fn not_nil(receiver: Value) -> RunResult<Flow> {
    Ok(Flow::Value(Value::Boolean(!receiver.is_nil())))
}

pub(super) fn as_string(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = describe(receiver, vm.heap, vm.interns);
    let value = vm.allocate_string(text)?;
    Ok(Flow::Value(value))
}
