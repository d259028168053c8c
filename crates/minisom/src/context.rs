//! Activation frames.
//!
//! A context records one in-flight method or block invocation. Contexts are
//! heap objects, not host stack frames, so a block that outlives the method
//! that created it still reaches valid outer bindings. The slot vector is a
//! single flat region holding parameters first, then locals; preparation
//! resolves every variable reference to a (depth, slot) pair against this
//! layout, so no name lookup happens here.

use crate::{
    class::{BlockId, MethodId},
    heap::{Heap, HeapData, HeapId},
    value::Value,
};

/// Whether a context activates a method or a block template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Method(MethodId),
    Block(BlockId),
}

/// The payload of a context heap object.
#[derive(Debug)]
pub(crate) struct ContextData {
    /// `self` for this activation. Block frames copy the receiver of their
    /// home method, so `self` and instance variables resolve identically in
    /// nested blocks.
    pub receiver: Value,
    pub kind: FrameKind,
    /// Parameter and local slots, parameters first.
    pub slots: Vec<Value>,
    /// Lexical link: the frame this block was created in. `None` for method
    /// frames.
    pub outer: Option<HeapId>,
    /// Dynamic link: the activation that performed the send. `None` for the
    /// top-level activation.
    pub sender: Option<HeapId>,
    /// Monotonically increasing activation id, used to report which home
    /// activation an escaped non-local return belonged to.
    pub serial: u64,
    /// Set when the activation ends; a block performing `^` checks this on
    /// its home frame to detect an escaped return.
    pub finished: bool,
}

impl ContextData {
    pub(crate) fn get_slot(&self, slot: usize) -> Value {
        self.slots[slot]
    }

    pub(crate) fn set_slot(&mut self, slot: usize, value: Value) {
        self.slots[slot] = value;
    }
}

/// Reads the context stored at `id`.
///
/// Panics if `id` does not address a context; ids handed around by the
/// evaluator always do.
pub(crate) fn context(heap: &Heap, id: HeapId) -> &ContextData {
    match heap.get(id) {
        HeapData::Context(ctx) => ctx,
        other => panic!("expected a context at {id:?}, found {}", other.type_name()),
    }
}

pub(crate) fn context_mut(heap: &mut Heap, id: HeapId) -> &mut ContextData {
    match heap.get_mut(id) {
        HeapData::Context(ctx) => ctx,
        other => panic!("expected a context at {id:?}, found {}", other.type_name()),
    }
}

/// Walks the lexical chain `depth` hops out from `id`.
pub(crate) fn lexical_at(heap: &Heap, id: HeapId, depth: usize) -> HeapId {
    let mut current = id;
    for _ in 0..depth {
        current = context(heap, current)
            .outer
            .expect("lexical depth exceeds the outer-context chain");
    }
    current
}

/// Finds the home method activation of `id`: the nearest frame on the
/// lexical chain that activates a method rather than a block.
pub(crate) fn home_of(heap: &Heap, id: HeapId) -> HeapId {
    let mut current = id;
    loop {
        let ctx = context(heap, current);
        match ctx.kind {
            FrameKind::Method(_) => return current,
            FrameKind::Block(_) => {
                current = ctx.outer.expect("block context without an outer frame");
            }
        }
    }
}

/// The method executed by the home activation of `id`.
pub(crate) fn method_of(heap: &Heap, id: HeapId) -> MethodId {
    match context(heap, home_of(heap, id)).kind {
        FrameKind::Method(mid) => mid,
        FrameKind::Block(_) => unreachable!("home_of returns a method frame"),
    }
}

/// True when `target` appears on the sender chain starting at `from`.
///
/// Used to resolve non-local returns: the home activation must still be an
/// active caller of the returning block, otherwise the return has escaped.
pub(crate) fn on_sender_chain(heap: &Heap, from: HeapId, target: HeapId) -> bool {
    let mut current = Some(from);
    while let Some(id) = current {
        if id == target {
            return true;
        }
        current = context(heap, id).sender;
    }
    false
}
