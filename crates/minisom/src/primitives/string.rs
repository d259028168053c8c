//! String and Symbol protocol.
//!
//! Symbols inherit the String primitives through the class chain, so the
//! text helpers here accept both heap strings and interned symbols. String
//! equality is content equality; the matching `hash` override keeps the
//! equal-implies-equal-hash law.

use super::value_class_name;
use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    heap::HeapData,
    value::{Value, string_hash},
};

/// The text behind a string-family value: a heap string's contents or a
/// symbol's spelling.
fn text_of(vm: &Vm<'_>, value: Value) -> Option<String> {
    match value {
        Value::Ref(id) => match vm.heap.get(id) {
            HeapData::String(text) => Some(text.to_string()),
            _ => None,
        },
        Value::Symbol(id) => Some(vm.interns.get(id).to_owned()),
        _ => None,
    }
}

fn receiver_text(vm: &Vm<'_>, receiver: Value) -> RunResult<String> {
    text_of(vm, receiver).ok_or_else(|| VmError::type_mismatch("receiver must be a String"))
}

pub(super) fn length(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = receiver_text(vm, receiver)?;
    Ok(Flow::Value(Value::Integer(text.chars().count() as i64)))
}

pub(super) fn concat(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let mut text = receiver_text(vm, receiver)?;
    let Some(suffix) = text_of(vm, args[0]) else {
        return Err(VmError::type_mismatch(format!(
            "argument must be a String, not {}",
            value_class_name(vm, args[0])
        )));
    };
    text.push_str(&suffix);
    let value = vm.allocate_string(text)?;
    Ok(Flow::Value(value))
}

/// Content equality; a non-string argument answers false.
pub(super) fn eq(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let text = receiver_text(vm, receiver)?;
    let equal = text_of(vm, args[0]).is_some_and(|other| other == text);
    Ok(Flow::Value(Value::Boolean(equal)))
}

pub(super) fn hash(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = receiver_text(vm, receiver)?;
    Ok(Flow::Value(Value::Integer(string_hash(&text))))
}

pub(super) fn as_symbol(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = receiver_text(vm, receiver)?;
    Ok(Flow::Value(Value::Symbol(vm.interns.intern(&text))))
}

/// Parses the receiver as an integer; unparseable text answers nil.
pub(super) fn as_integer(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let text = receiver_text(vm, receiver)?;
    let value = match text.trim().parse::<i64>() {
        Ok(value) => Value::Integer(value),
        Err(_) => Value::Nil,
    };
    Ok(Flow::Value(value))
}

/// Symbol-specific `asString`: answers the spelling without the `#`.
pub(super) fn symbol_as_string(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let Value::Symbol(id) = receiver else {
        return Err(VmError::type_mismatch("receiver must be a Symbol"));
    };
    let text = vm.interns.get(id).to_owned();
    let value = vm.allocate_string(text)?;
    Ok(Flow::Value(value))
}
