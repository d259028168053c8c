//! Method lookup and message dispatch.
//!
//! `send_message` resolves the receiver's class, walks the superclass chain
//! for the selector (interned, so every comparison is integer equality),
//! checks the argument count, and invokes either the registered primitive
//! or the compiled source method. An argument-count mismatch is a distinct
//! error from a failed lookup.

use crate::{
    class::{MethodEntry, MethodKind},
    error::{RunResult, VmError},
    evaluator::{Flow, Vm},
    heap::{Heap, HeapData, HeapId},
    intern::{Interns, SymbolId},
    value::Value,
};

/// Walks the superclass chain starting at `start`, returning the holder
/// class and its entry for `selector`. Lookup stops at a nil superclass.
pub(crate) fn lookup_method(heap: &Heap, start: HeapId, selector: SymbolId) -> Option<(HeapId, MethodEntry)> {
    let mut class = start;
    loop {
        let HeapData::Class(data) = heap.get(class) else {
            return None;
        };
        let HeapData::MethodDict(dict) = heap.get(data.method_dict) else {
            return None;
        };
        if let Some(entry) = dict.get(selector) {
            return Some((class, entry));
        }
        class = data.superclass?;
    }
}

/// Display name of the class at `id`, borrowing only the heap and interner.
pub(crate) fn class_display<'a>(heap: &'a Heap, interns: &'a Interns, id: HeapId) -> &'a str {
    match heap.get(id) {
        HeapData::Class(class) => interns.get(class.name),
        _ => "?",
    }
}

impl Vm<'_> {
    /// Sends `selector` to `receiver`. `start_class` overrides where lookup
    /// begins; super sends pass the defining class's superclass.
    pub(crate) fn send_message(
        &mut self,
        receiver: Value,
        selector: SymbolId,
        args: &[Value],
        start_class: Option<HeapId>,
    ) -> RunResult<Flow> {
        let receiver_class = self.class_of_value(receiver);
        let start = start_class.unwrap_or(receiver_class);

        let Some((holder, entry)) = lookup_method(self.heap, start, selector) else {
            return Err(VmError::does_not_understand(
                class_display(self.heap, self.interns, receiver_class),
                self.interns.get(selector),
            ));
        };

        if entry.arg_count != args.len() {
            return Err(VmError::argument_count(
                class_display(self.heap, self.interns, receiver_class),
                self.interns.get(selector),
                entry.arg_count,
                args.len(),
            ));
        }

        match entry.kind {
            MethodKind::Primitive(primitive) => {
                let holder_name = class_display(self.heap, self.interns, holder);
                self.tracer.primitive(holder_name, self.interns.get(selector), self.depth);
                primitive.invoke(self, receiver, args).map_err(|err| {
                    err.with_send_context(
                        class_display(self.heap, self.interns, receiver_class),
                        self.interns.get(selector),
                    )
                })
            }
            MethodKind::Source(method) => {
                let holder_name = class_display(self.heap, self.interns, holder);
                self.tracer.method_enter(holder_name, self.interns.get(selector), self.depth);
                let outcome = self.invoke_method(method, receiver, args);
                self.tracer.method_exit(self.interns.get(selector), self.depth);
                outcome
            }
        }
    }
}
