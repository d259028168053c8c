//! Class protocol: instance allocation and reflection.

use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    heap::HeapData,
    value::Value,
};

/// `new`: allocates an instance with every slot initialised to nil.
///
/// The core value classes refuse `new`; their instances come from literals
/// and dedicated primitives. `Array new` answers an empty array so the
/// class behaves like `Array new: 0`.
pub(super) fn new(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let Value::Ref(class) = receiver else {
        return Err(VmError::type_mismatch("receiver must be a class"));
    };
    let field_count = match vm.heap.get(class) {
        HeapData::Class(data) => data.field_count(),
        _ => return Err(VmError::type_mismatch("receiver must be a class")),
    };
    if class == vm.core.array {
        let id = vm.heap.allocate(class, HeapData::Array(Vec::new()))?;
        return Ok(Flow::Value(Value::Ref(id)));
    }
    if vm.core.is_value_class(class) {
        return Err(VmError::type_mismatch(
            "instances of this class are created from literals, not with new",
        ));
    }
    let instance = vm.allocate_instance(class, field_count)?;
    Ok(Flow::Value(instance))
}

/// `name`: the class's name as a string.
pub(super) fn name(vm: &mut Vm<'_>, receiver: Value) -> RunResult<Flow> {
    let Value::Ref(class) = receiver else {
        return Err(VmError::type_mismatch("receiver must be a class"));
    };
    let name = match vm.heap.get(class) {
        HeapData::Class(data) => vm.interns.get(data.name).to_owned(),
        _ => return Err(VmError::type_mismatch("receiver must be a class")),
    };
    let value = vm.allocate_string(name)?;
    Ok(Flow::Value(value))
}
