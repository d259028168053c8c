//! The runtime value representation.
//!
//! A hybrid design: values whose identity is their content (nil, booleans,
//! integers, interned symbols) are stored inline, while everything else
//! lives in the arena and is referenced via `Ref(HeapId)`. The derived
//! `PartialEq` is exactly object identity: immediates compare by value,
//! references by address.
//!
//! `Value` is `Copy`. The heap never frees objects mid-run, so handing
//! values around needs no reference counting.

use crate::{
    heap::{Heap, HeapData, HeapId, ObjTag},
    intern::{Interns, SymbolId},
};

/// Depth cap when describing nested arrays, so self-referencing structures
/// still print.
const DESCRIBE_DEPTH: usize = 8;

/// A SOM value: an immediate, or a reference into the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    /// An interned symbol; equality of ids is equality of symbols.
    Symbol(SymbolId),
    Ref(HeapId),
}

impl Value {
    /// The type tag of this value, without touching its class.
    pub(crate) fn tag(self, heap: &Heap) -> ObjTag {
        match self {
            Self::Nil => ObjTag::Nil,
            Self::Boolean(_) => ObjTag::Boolean,
            Self::Integer(_) => ObjTag::Integer,
            Self::Symbol(_) => ObjTag::Symbol,
            Self::Ref(id) => heap.header(id).tag,
        }
    }

    pub(crate) fn is_nil(self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Identity hash: stable per object, equal for identical objects.
    ///
    /// Integers hash to their value so that equal integers agree; heap
    /// objects hash to the allocation-time hash in their header. Content
    /// hashing for strings lives in the String primitive, which also owns
    /// content equality.
    pub(crate) fn identity_hash(self, heap: &Heap) -> i64 {
        match self {
            Self::Nil => 0,
            Self::Boolean(false) => 1,
            Self::Boolean(true) => 2,
            Self::Integer(v) => v,
            Self::Symbol(id) => id.index() as i64,
            Self::Ref(id) => i64::from(heap.header(id).hash),
        }
    }
}

/// Renders `value` the way the print primitives show it.
///
/// Strings render as their contents, symbols with their `#` prefix, arrays
/// as space-joined elements in parentheses, and instances as a class-named
/// description.
pub(crate) fn describe(value: Value, heap: &Heap, interns: &Interns) -> String {
    let mut out = String::new();
    describe_into(&mut out, value, heap, interns, DESCRIBE_DEPTH);
    out
}

fn describe_into(out: &mut String, value: Value, heap: &Heap, interns: &Interns, depth: usize) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Boolean(true) => out.push_str("true"),
        Value::Boolean(false) => out.push_str("false"),
        Value::Integer(v) => out.push_str(&v.to_string()),
        Value::Symbol(id) => {
            out.push('#');
            out.push_str(interns.get(id));
        }
        Value::Ref(id) => match heap.get(id) {
            HeapData::String(s) => out.push_str(s),
            HeapData::Array(elements) => {
                if depth == 0 {
                    out.push_str("(...)");
                    return;
                }
                out.push('(');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    describe_into(out, *element, heap, interns, depth - 1);
                }
                out.push(')');
            }
            HeapData::Class(class) => out.push_str(interns.get(class.name)),
            HeapData::Instance(_) | HeapData::Block(_) | HeapData::MethodDict(_) | HeapData::Context(_) => {
                let class = heap.header(id).class;
                let name = match heap.get(class) {
                    HeapData::Class(class) => interns.get(class.name),
                    _ => "?",
                };
                out.push_str("instance of ");
                out.push_str(name);
            }
        },
    }
}

/// Content hash for string data, used by the String `hash` primitive so
/// that content-equal strings agree on their hash.
pub(crate) fn string_hash(text: &str) -> i64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.hash(&mut hasher);
    // Fold into the positive i64 range so the value round-trips through the
    // language's fixed-width integers.
    (hasher.finish() & (i64::MAX as u64)) as i64
}
