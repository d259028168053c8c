//! Block protocol: evaluation and the while loops.
//!
//! These primitives route straight into the evaluator's block-activation
//! path. Iteration is not an evaluator feature; it lives here, driven by
//! repeated block evaluation.

use super::{block_of, value_class_name};
use crate::{
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    heap::HeapData,
    value::Value,
};

fn receiver_block(vm: &Vm<'_>, receiver: Value) -> RunResult<crate::heap::HeapId> {
    if let Value::Ref(id) = receiver
        && matches!(vm.heap.get(id), HeapData::Block(_))
    {
        return Ok(id);
    }
    Err(VmError::type_mismatch("receiver must be a Block"))
}

/// `value`, `value:` and `value:value:`; the arity check against the block's
/// parameter count happens in the activation path.
pub(super) fn value(vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
    let block = receiver_block(vm, receiver)?;
    let selector = match args.len() {
        0 => "value",
        1 => "value:",
        _ => "value:value:",
    };
    vm.call_block(block, args, selector)
}

/// `whileTrue:` / `whileFalse:`: re-evaluates the receiver block until it
/// answers the terminating boolean, running the argument block between
/// evaluations. Answers nil.
pub(super) fn while_loop(vm: &mut Vm<'_>, receiver: Value, args: &[Value], run_while: bool) -> RunResult<Flow> {
    let condition = receiver_block(vm, receiver)?;
    let Some(body) = block_of(vm, args[0]) else {
        return Err(VmError::type_mismatch(format!(
            "the loop body must be a Block, not {}",
            value_class_name(vm, args[0])
        )));
    };

    loop {
        let decision = match vm.call_block(condition, &[], "value")? {
            Flow::Value(value) => value,
            ret @ Flow::Return { .. } => return Ok(ret),
        };
        let Value::Boolean(decision) = decision else {
            return Err(VmError::type_mismatch("the loop condition must answer a Boolean"));
        };
        if decision != run_while {
            return Ok(Flow::Value(Value::Nil));
        }
        match vm.call_block(body, &[], "value")? {
            Flow::Value(_) => {}
            ret @ Flow::Return { .. } => return Ok(ret),
        }
    }
}
