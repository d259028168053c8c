//! Class objects, method dictionaries, and compiled method storage.
//!
//! A class is a heap object ([`ClassData`] inside `HeapData::Class`) whose
//! own class pointer addresses its metaclass. Its method dictionary is a
//! separate heap object so the class graph matches the object model: every
//! class addresses a valid dictionary, and lookup walks dictionaries only.
//!
//! Compiled method and block bodies live in universe-owned tables addressed
//! by [`MethodId`] / [`BlockId`]; heap objects refer to them by index, never
//! by owning the AST.

use indexmap::IndexMap;

use crate::{ast::Body, heap::HeapId, intern::SymbolId, primitives::Primitive};

/// Index into the universe's compiled-method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MethodId(u32);

impl MethodId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("method table overflow"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the universe's compiled-block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BlockId(u32);

impl BlockId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("block table overflow"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The payload of a class heap object.
#[derive(Debug)]
pub(crate) struct ClassData {
    pub name: SymbolId,
    /// `None` only for `Object`, the root of the inheritance chain.
    pub superclass: Option<HeapId>,
    /// Heap address of this class's method dictionary.
    pub method_dict: HeapId,
    /// Instance variable names: the inherited prefix followed by this
    /// class's own, in declaration order. Indices are layout indices and are
    /// never renumbered, so subclass instances stay layout-compatible with
    /// their parent for the inherited prefix.
    pub field_names: Vec<SymbolId>,
}

impl ClassData {
    /// Number of instance variable slots an instance of this class carries.
    pub(crate) fn field_count(&self) -> usize {
        self.field_names.len()
    }
}

/// How a method entry is executed: a registered built-in, or a compiled
/// source body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodKind {
    Primitive(Primitive),
    Source(MethodId),
}

/// One method dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MethodEntry {
    pub arg_count: usize,
    pub kind: MethodKind,
}

/// Selector-keyed method dictionary.
///
/// Selectors are interned, so the key comparison here is integer equality;
/// nothing on the lookup path ever compares string content.
#[derive(Debug, Default)]
pub(crate) struct MethodDict {
    entries: IndexMap<SymbolId, MethodEntry>,
}

impl MethodDict {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Installs an entry; re-installing an existing selector overwrites it,
    /// so the last definition wins.
    pub(crate) fn insert(&mut self, selector: SymbolId, entry: MethodEntry) {
        self.entries.insert(selector, entry);
    }

    pub(crate) fn get(&self, selector: SymbolId) -> Option<MethodEntry> {
        self.entries.get(&selector).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A compiled source method: its prepared body plus the layout facts the
/// evaluator needs to build an activation frame.
#[derive(Debug)]
pub(crate) struct CompiledMethod {
    pub selector: SymbolId,
    /// The class whose dictionary holds this method; super sends start the
    /// lookup at this class's superclass.
    pub holder: HeapId,
    pub arg_count: usize,
    pub local_count: usize,
    pub body: Body,
}

/// A compiled block template: shared by every closure created from the same
/// block literal.
#[derive(Debug)]
pub(crate) struct CompiledBlock {
    pub arg_count: usize,
    pub local_count: usize,
    pub body: Body,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interns;

    #[test]
    fn reinstalling_a_selector_overwrites() {
        let mut interns = Interns::new();
        let sel = interns.intern("go");
        let mut dict = MethodDict::new();
        dict.insert(
            sel,
            MethodEntry {
                arg_count: 0,
                kind: MethodKind::Source(MethodId::new(1)),
            },
        );
        dict.insert(
            sel,
            MethodEntry {
                arg_count: 0,
                kind: MethodKind::Source(MethodId::new(2)),
            },
        );
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(sel).unwrap().kind, MethodKind::Source(MethodId::new(2)));
    }
}
