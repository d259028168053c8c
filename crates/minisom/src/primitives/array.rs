//! Array protocol: bounds-checked 1-based access, iteration, and the
//! class-side allocator.

use super::{block_of, value_class_name};
use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    heap::{HeapData, HeapId},
    value::Value,
};

/// Upper bound for `new:`, so one bad size cannot swallow the host heap.
const MAX_ARRAY_LENGTH: usize = 1 << 24;

fn receiver_array(vm: &Vm<'_>, receiver: Value) -> RunResult<HeapId> {
    if let Value::Ref(id) = receiver
        && matches!(vm.heap.get(id), HeapData::Array(_))
    {
        return Ok(id);
    }
    Err(VmError::type_mismatch("receiver must be an Array"))
}

fn elements<'a>(vm: &'a Vm<'_>, id: HeapId) -> &'a [Value] {
    match vm.heap.get(id) {
        HeapData::Array(elements) => elements,
        other => panic!("expected an array, found {}", other.type_name()),
    }
}

/// Checks a 1-based index against the array length, answering the zero-based
/// offset.
fn checked_index(vm: &Vm<'_>, id: HeapId, arg: Value) -> RunResult<usize> {
    let Value::Integer(index) = arg else {
        return Err(VmError::type_mismatch(format!(
            "index must be an Integer, not {}",
            value_class_name(vm, arg)
        )));
    };
    let length = elements(vm, id).len();
    if index < 1 || index as usize > length {
        return Err(VmError::index_out_of_bounds(index, length));
    }
    Ok(index as usize - 1)
}

pub(super) fn at(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let id = receiver_array(vm, receiver)?;
    let offset = checked_index(vm, id, args[0])?;
    Ok(Flow::Value(elements(vm, id)[offset]))
}

/// `at:put:` answers the receiver, so stores chain.
pub(super) fn at_put(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let id = receiver_array(vm, receiver)?;
    let offset = checked_index(vm, id, args[0])?;
    match vm.heap.get_mut(id) {
        HeapData::Array(elements) => elements[offset] = args[1],
        other => panic!("expected an array, found {}", other.type_name()),
    }
    Ok(Flow::Value(receiver))
}

pub(super) fn length(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let id = receiver_array(vm, receiver)?;
    Ok(Flow::Value(Value::Integer(elements(vm, id).len() as i64)))
}

/// Sends `value:` to the argument block for each element in order. A
/// non-local return from the block abandons the iteration.
pub(super) fn do_each(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let id = receiver_array(vm, receiver)?;
    let Some(block) = block_of(vm, args[0]) else {
        return Err(VmError::type_mismatch(format!(
            "do: expects a Block, not {}",
            value_class_name(vm, args[0])
        )));
    };
    let snapshot = elements(vm, id).to_vec();
    for element in snapshot {
        match vm.call_block(block, &[element], "value:")? {
            Flow::Value(_) => {}
            ret @ Flow::Return { .. } => return Ok(ret),
        }
    }
    Ok(Flow::Value(receiver))
}

/// Class-side `new:`: a fresh array of the given length, every slot nil.
/// The receiver is the class object, so subclasses of Array allocate with
/// their own class.
pub(super) fn new_with(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let Value::Ref(class) = receiver else {
        return Err(VmError::type_mismatch("receiver must be a class"));
    };
    let Value::Integer(length) = args[0] else {
        return Err(VmError::type_mismatch(format!(
            "array size must be an Integer, not {}",
            value_class_name(vm, args[0])
        )));
    };
    let Ok(length) = usize::try_from(length) else {
        return Err(VmError::type_mismatch("array size must not be negative"));
    };
    if length > MAX_ARRAY_LENGTH {
        return Err(VmError::allocation_failed(MAX_ARRAY_LENGTH));
    }
    let id = vm.heap.allocate(class, HeapData::Array(vec![Value::Nil; length]))?;
    Ok(Flow::Value(Value::Ref(id)))
}
