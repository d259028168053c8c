//! The object heap.
//!
//! A single append-only arena of typed slots. Every slot carries a fixed
//! [`Header`] (class address, identity hash, type tag) next to its payload
//! variant, and is addressed by an opaque [`HeapId`] handle that stays valid
//! for the life of the universe. Nothing is freed mid-run; teardown drops
//! the arena wholesale.
//!
//! The tag is advisory: the true type of an object is its class pointer.
//! The tag lets callers fast-path common cases without chasing the class.

use std::collections::BTreeMap;

use crate::{
    class::{BlockId, ClassData, MethodDict},
    context::ContextData,
    error::{RunResult, VmError},
    limits::ResourceLimits,
    value::Value,
};

/// Unique identifier for objects stored in the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(usize);

impl HeapId {
    /// Placeholder class address used only while the bootstrap wires the
    /// Object/Class/Metaclass loop; every header holding it is patched
    /// before the universe is handed out.
    pub(crate) const UNSET: Self = Self(usize::MAX);

    /// Returns the raw index value.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }

    /// Builds an id from a raw index, for tests that sweep the whole arena.
    #[cfg(test)]
    pub(crate) fn from_index_for_tests(index: usize) -> Self {
        Self(index)
    }
}

/// Type tag stored in every object header.
///
/// The immediate value representations (integers, symbols, booleans, nil)
/// never hit the arena, but their tags are part of the same closed set so a
/// single tag describes any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
pub(crate) enum ObjTag {
    Object,
    Integer,
    String,
    Symbol,
    Array,
    Class,
    MethodDict,
    Block,
    Context,
    Boolean,
    Nil,
}

/// The fixed header every heap object begins with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Header {
    /// Address of this object's class. For a class object this is its
    /// metaclass.
    pub class: HeapId,
    /// Identity hash, assigned at allocation and stable thereafter.
    pub hash: u32,
    pub tag: ObjTag,
}

/// A closure: a block template plus the lexical frame it captured.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockObj {
    pub template: BlockId,
    /// The activation frame current when the block literal was evaluated.
    /// Live storage, not a copy: reads and writes through the block hit the
    /// same slots the home method's body uses.
    pub outer: HeapId,
}

/// Instance variable storage for a user-class instance. The class (and with
/// it the slot layout) lives in the header.
#[derive(Debug)]
pub(crate) struct InstanceData {
    pub fields: Vec<Value>,
}

/// Payload variants for heap objects.
#[derive(Debug)]
pub(crate) enum HeapData {
    String(Box<str>),
    Array(Vec<Value>),
    Class(ClassData),
    MethodDict(MethodDict),
    Block(BlockObj),
    Context(ContextData),
    Instance(InstanceData),
}

impl HeapData {
    fn tag(&self) -> ObjTag {
        match self {
            Self::String(_) => ObjTag::String,
            Self::Array(_) => ObjTag::Array,
            Self::Class(_) => ObjTag::Class,
            Self::MethodDict(_) => ObjTag::MethodDict,
            Self::Block(_) => ObjTag::Block,
            Self::Context(_) => ObjTag::Context,
            Self::Instance(_) => ObjTag::Object,
        }
    }

    /// Static variant name, used in heap statistics and internal panics.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Array(_) => "Array",
            Self::Class(_) => "Class",
            Self::MethodDict(_) => "MethodDict",
            Self::Block(_) => "Block",
            Self::Context(_) => "Context",
            Self::Instance(_) => "Instance",
        }
    }
}

#[derive(Debug)]
struct Slot {
    header: Header,
    data: HeapData,
}

/// The arena.
#[derive(Debug)]
pub(crate) struct Heap {
    slots: Vec<Slot>,
    max_objects: usize,
    next_hash: u32,
}

impl Heap {
    pub(crate) fn new(limits: &ResourceLimits) -> Self {
        Self {
            slots: Vec::new(),
            max_objects: limits.max_heap_objects,
            next_hash: 1,
        }
    }

    /// Allocates a new object with the given class, failing once the object
    /// cap is reached.
    pub(crate) fn allocate(&mut self, class: HeapId, data: HeapData) -> RunResult<HeapId> {
        if self.slots.len() >= self.max_objects {
            return Err(VmError::allocation_failed(self.max_objects));
        }
        let id = HeapId(self.slots.len());
        let header = Header {
            class,
            hash: self.next_hash,
            tag: data.tag(),
        };
        self.next_hash = self.next_hash.wrapping_add(1);
        self.slots.push(Slot { header, data });
        Ok(id)
    }

    pub(crate) fn get(&self, id: HeapId) -> &HeapData {
        &self.slots[id.index()].data
    }

    pub(crate) fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.slots[id.index()].data
    }

    pub(crate) fn header(&self, id: HeapId) -> Header {
        let header = self.slots[id.index()].header;
        debug_assert!(header.class != HeapId::UNSET, "unpatched class pointer escaped bootstrap");
        header
    }

    /// Repoints an object's class. Bootstrap-only: this is how the
    /// Object/Class/Metaclass cycle is closed after all three exist.
    pub(crate) fn patch_class(&mut self, id: HeapId, class: HeapId) {
        self.slots[id.index()].header.class = class;
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Snapshot of live object counts, by payload variant.
    pub(crate) fn stats(&self) -> HeapStats {
        let mut objects_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
        for slot in &self.slots {
            *objects_by_type.entry(slot.data.type_name()).or_insert(0) += 1;
        }
        HeapStats {
            live_objects: self.slots.len(),
            objects_by_type,
        }
    }
}

/// Snapshot of heap state at a point in time.
///
/// The `objects_by_type` map uses `BTreeMap` for deterministic iteration
/// order, making snapshots suitable for display and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Total number of live objects on the heap.
    pub live_objects: usize,
    /// Breakdown of live objects by payload variant name.
    pub objects_by_type: BTreeMap<&'static str, usize>,
}
