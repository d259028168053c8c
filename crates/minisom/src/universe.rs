//! The universe: heap, symbol table, globals, compiled code tables, and the
//! core class graph.
//!
//! Bootstrap builds the Object/Class/Metaclass loop first, using only field
//! writes and patching the three class pointers once all three objects
//! exist; no message is sent until the graph is closed. The core data
//! classes follow, their method dictionaries are populated from the
//! primitive registry, and the distinguished globals `nil`, `true`, `false`
//! and the class names are registered last.

use ahash::AHashMap;

use crate::{
    ast::{ClassDef, MethodDef},
    class::{ClassData, CompiledBlock, CompiledMethod, MethodDict, MethodEntry, MethodId, MethodKind},
    error::{RunResult, VmError},
    heap::{Heap, HeapData, HeapId, HeapStats},
    intern::{Interns, StaticNames, SymbolId},
    limits::ResourceLimits,
    prepare::prepare_method,
    primitives,
    value::Value,
};

/// Heap addresses of the classes the bootstrap creates.
///
/// Kept directly so the core always reaches these classes even if user code
/// rebinds their global names.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CoreClasses {
    pub object: HeapId,
    pub class: HeapId,
    pub metaclass: HeapId,
    pub integer: HeapId,
    pub string: HeapId,
    pub symbol: HeapId,
    pub array: HeapId,
    pub block: HeapId,
    pub boolean: HeapId,
    pub true_class: HeapId,
    pub false_class: HeapId,
    pub nil_class: HeapId,
}

impl CoreClasses {
    /// Classes whose instances are born from literals or dedicated
    /// primitives; `new` is refused on them.
    pub(crate) fn is_value_class(&self, id: HeapId) -> bool {
        id == self.integer
            || id == self.string
            || id == self.symbol
            || id == self.block
            || id == self.boolean
            || id == self.true_class
            || id == self.false_class
            || id == self.nil_class
            || id == self.class
            || id == self.metaclass
    }
}

/// Resolves the class of any value: immediates through the core-class
/// table, heap objects through their header.
pub(crate) fn class_of(core: &CoreClasses, heap: &Heap, value: Value) -> HeapId {
    match value {
        Value::Nil => core.nil_class,
        Value::Boolean(true) => core.true_class,
        Value::Boolean(false) => core.false_class,
        Value::Integer(_) => core.integer,
        Value::Symbol(_) => core.symbol,
        Value::Ref(id) => heap.header(id).class,
    }
}

/// The complete state of one interpreter instance.
#[derive(Debug)]
pub struct Universe {
    pub(crate) heap: Heap,
    pub(crate) interns: Interns,
    /// Process-wide name bindings: classes and top-level variables.
    pub(crate) globals: AHashMap<SymbolId, Value>,
    pub(crate) methods: Vec<CompiledMethod>,
    pub(crate) blocks: Vec<CompiledBlock>,
    pub(crate) core: CoreClasses,
    pub(crate) limits: ResourceLimits,
    /// Source of activation serials; see `ContextData::serial`.
    pub(crate) next_serial: u64,
}

impl Universe {
    pub fn new() -> RunResult<Self> {
        Self::with_limits(ResourceLimits::default())
    }

    pub fn with_limits(limits: ResourceLimits) -> RunResult<Self> {
        let mut heap = Heap::new(&limits);
        let mut interns = Interns::new();
        let core = bootstrap(&mut heap, &mut interns)?;

        let mut universe = Self {
            heap,
            interns,
            globals: AHashMap::new(),
            methods: Vec::new(),
            blocks: Vec::new(),
            core,
            limits,
            next_serial: 0,
        };
        primitives::install(&mut universe);
        universe.register_core_globals();
        Ok(universe)
    }

    fn register_core_globals(&mut self) {
        let core = self.core;
        for (name, class) in [
            (StaticNames::ObjectName, core.object),
            (StaticNames::ClassName, core.class),
            (StaticNames::MetaclassName, core.metaclass),
            (StaticNames::IntegerName, core.integer),
            (StaticNames::StringName, core.string),
            (StaticNames::SymbolName, core.symbol),
            (StaticNames::ArrayName, core.array),
            (StaticNames::BlockName, core.block),
            (StaticNames::BooleanName, core.boolean),
            (StaticNames::TrueName, core.true_class),
            (StaticNames::FalseName, core.false_class),
            (StaticNames::NilName, core.nil_class),
        ] {
            self.globals.insert(name.id(), Value::Ref(class));
        }
        self.globals.insert(StaticNames::NilGlobal.id(), Value::Nil);
        self.globals.insert(StaticNames::TrueGlobal.id(), Value::Boolean(true));
        self.globals.insert(StaticNames::FalseGlobal.id(), Value::Boolean(false));
    }

    /// Reads the class data at `id`; panics if `id` is not a class. Used on
    /// ids the core itself produced.
    pub(crate) fn class_data(&self, id: HeapId) -> &ClassData {
        match self.heap.get(id) {
            HeapData::Class(class) => class,
            other => panic!("expected a class, found {}", other.type_name()),
        }
    }

    /// The name of the class at `id`, for error messages and tracing.
    pub(crate) fn class_name(&self, id: HeapId) -> &str {
        self.interns.get(self.class_data(id).name)
    }

    pub(crate) fn global(&self, name: SymbolId) -> Option<Value> {
        self.globals.get(&name).copied()
    }

    /// Snapshot of live heap object counts.
    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Installs a parsed class definition: resolves the superclass,
    /// computes the instance-variable layout (inherited prefix plus own
    /// variables), materialises the class/metaclass pair, compiles every
    /// method, and binds the class under its name.
    ///
    /// Re-installing an existing name replaces the binding; instances of
    /// the prior class are unaffected.
    pub(crate) fn install_class(&mut self, def: &ClassDef) -> RunResult<HeapId> {
        let super_name = def.superclass.unwrap_or(StaticNames::ObjectName.id());
        let super_id = match self.global(super_name) {
            Some(Value::Ref(id)) if matches!(self.heap.get(id), HeapData::Class(_)) => id,
            Some(_) => {
                return Err(VmError::type_mismatch(format!(
                    "superclass '{}' is not a class",
                    self.interns.get(super_name)
                )));
            }
            None => return Err(VmError::undefined_global(self.interns.get(super_name))),
        };

        let mut field_names = self.class_data(super_id).field_names.clone();
        field_names.extend(def.fields.iter().copied());

        // Metaclass first: the class object's class pointer needs it.
        let super_meta = self.heap.header(super_id).class;
        let meta_dict = self.heap.allocate(self.core.object, HeapData::MethodDict(MethodDict::new()))?;
        let meta_name = {
            let text = format!("{} class", self.interns.get(def.name));
            self.interns.intern(&text)
        };
        let meta = self.heap.allocate(
            self.core.metaclass,
            HeapData::Class(ClassData {
                name: meta_name,
                superclass: Some(super_meta),
                method_dict: meta_dict,
                field_names: Vec::new(),
            }),
        )?;

        let dict = self.heap.allocate(self.core.object, HeapData::MethodDict(MethodDict::new()))?;
        let class = self.heap.allocate(
            meta,
            HeapData::Class(ClassData {
                name: def.name,
                superclass: Some(super_id),
                method_dict: dict,
                field_names: field_names.clone(),
            }),
        )?;

        for method in &def.instance_methods {
            self.compile_into(class, dict, method, &field_names);
        }
        // Class-side methods run with the class object as receiver; they
        // see no instance variables.
        for method in &def.class_methods {
            self.compile_into(meta, meta_dict, method, &[]);
        }

        self.globals.insert(def.name, Value::Ref(class));
        Ok(class)
    }

    /// Compiles one method and installs it in `dict` under its selector.
    fn compile_into(&mut self, holder: HeapId, dict: HeapId, def: &MethodDef, fields: &[SymbolId]) {
        let body = prepare_method(&def.params, &def.locals, def.body.clone(), fields, &mut self.blocks);
        let id = MethodId::new(self.methods.len());
        self.methods.push(CompiledMethod {
            selector: def.selector,
            holder,
            arg_count: def.params.len(),
            local_count: def.locals.len(),
            body,
        });
        let entry = MethodEntry {
            arg_count: def.params.len(),
            kind: MethodKind::Source(id),
        };
        match self.heap.get_mut(dict) {
            HeapData::MethodDict(dict) => dict.insert(def.selector, entry),
            other => panic!("expected a method dictionary, found {}", other.type_name()),
        }
    }

    /// Compiles a top-level expression body into a synthetic zero-argument
    /// method held by `Object`, for the launcher's `-e` path.
    pub(crate) fn compile_expression(&mut self, locals: &[SymbolId], body: crate::ast::Body) -> MethodId {
        let body = prepare_method(&[], locals, body, &[], &mut self.blocks);
        let id = MethodId::new(self.methods.len());
        self.methods.push(CompiledMethod {
            selector: StaticNames::DoIt.id(),
            holder: self.core.object,
            arg_count: 0,
            local_count: locals.len(),
            body,
        });
        id
    }
}

/// Builds the core class graph.
///
/// Step one is the metaphysical trio and its metaclasses, allocated with
/// placeholder class pointers and patched into the usual loop: an instance
/// of `X` has class `X class`, `X class` is an instance of `Metaclass`, and
/// `Metaclass` is an instance of `Metaclass class`, whose class is
/// `Metaclass`. Step two derives the data classes, which need no patching
/// because `Metaclass` exists by then.
fn bootstrap(heap: &mut Heap, interns: &mut Interns) -> RunResult<CoreClasses> {
    let dict = |heap: &mut Heap| heap.allocate(HeapId::UNSET, HeapData::MethodDict(MethodDict::new()));

    let object_dict = dict(heap)?;
    let class_dict = dict(heap)?;
    let metaclass_dict = dict(heap)?;
    let object_meta_dict = dict(heap)?;
    let class_meta_dict = dict(heap)?;
    let metaclass_meta_dict = dict(heap)?;

    let raw_class = |heap: &mut Heap, class: HeapId, name: SymbolId, superclass: Option<HeapId>, method_dict: HeapId| {
        heap.allocate(
            class,
            HeapData::Class(ClassData {
                name,
                superclass,
                method_dict,
                field_names: Vec::new(),
            }),
        )
    };

    let object = raw_class(heap, HeapId::UNSET, StaticNames::ObjectName.id(), None, object_dict)?;
    let class = raw_class(
        heap,
        HeapId::UNSET,
        StaticNames::ClassName.id(),
        Some(object),
        class_dict,
    )?;
    let metaclass = raw_class(
        heap,
        HeapId::UNSET,
        StaticNames::MetaclassName.id(),
        Some(class),
        metaclass_dict,
    )?;

    let object_meta_name = interns.intern("Object class");
    let class_meta_name = interns.intern("Class class");
    let metaclass_meta_name = interns.intern("Metaclass class");
    let object_meta = raw_class(heap, metaclass, object_meta_name, Some(class), object_meta_dict)?;
    let class_meta = raw_class(heap, metaclass, class_meta_name, Some(object_meta), class_meta_dict)?;
    let metaclass_meta = raw_class(heap, metaclass, metaclass_meta_name, Some(class_meta), metaclass_meta_dict)?;

    // Close the cycle.
    heap.patch_class(object, object_meta);
    heap.patch_class(class, class_meta);
    heap.patch_class(metaclass, metaclass_meta);
    for dict in [
        object_dict,
        class_dict,
        metaclass_dict,
        object_meta_dict,
        class_meta_dict,
        metaclass_meta_dict,
    ] {
        heap.patch_class(dict, object);
    }

    // The data classes. Symbol extends String; True and False extend
    // Boolean; everything else extends Object directly.
    let integer = define_core_class(heap, interns, object, metaclass, "Integer", object)?;
    let string = define_core_class(heap, interns, object, metaclass, "String", object)?;
    let symbol = define_core_class(heap, interns, object, metaclass, "Symbol", string)?;
    let array = define_core_class(heap, interns, object, metaclass, "Array", object)?;
    let block = define_core_class(heap, interns, object, metaclass, "Block", object)?;
    let boolean = define_core_class(heap, interns, object, metaclass, "Boolean", object)?;
    let true_class = define_core_class(heap, interns, object, metaclass, "True", boolean)?;
    let false_class = define_core_class(heap, interns, object, metaclass, "False", boolean)?;
    let nil_class = define_core_class(heap, interns, object, metaclass, "Nil", object)?;

    Ok(CoreClasses {
        object,
        class,
        metaclass,
        integer,
        string,
        symbol,
        array,
        block,
        boolean,
        true_class,
        false_class,
        nil_class,
    })
}

/// Creates a class/metaclass pair for a core data class. The metaclass
/// inherits from the superclass's metaclass, so class-side lookup follows
/// the same shape as instance-side lookup.
fn define_core_class(
    heap: &mut Heap,
    interns: &mut Interns,
    object: HeapId,
    metaclass: HeapId,
    name: &str,
    superclass: HeapId,
) -> RunResult<HeapId> {
    let super_meta = heap.header(superclass).class;
    let meta_dict = heap.allocate(object, HeapData::MethodDict(MethodDict::new()))?;
    let meta_name = interns.intern(&format!("{name} class"));
    let meta = heap.allocate(
        metaclass,
        HeapData::Class(ClassData {
            name: meta_name,
            superclass: Some(super_meta),
            method_dict: meta_dict,
            field_names: Vec::new(),
        }),
    )?;
    let dict = heap.allocate(object, HeapData::MethodDict(MethodDict::new()))?;
    let name = interns.intern(name);
    heap.allocate(
        meta,
        HeapData::Class(ClassData {
            name,
            superclass: Some(superclass),
            method_dict: dict,
            field_names: Vec::new(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metaclass_loop_is_closed() {
        let u = Universe::new().unwrap();
        let core = u.core;
        // Object's class is "Object class", an instance of Metaclass.
        let object_meta = u.heap.header(core.object).class;
        assert_eq!(u.class_name(object_meta), "Object class");
        assert_eq!(u.heap.header(object_meta).class, core.metaclass);
        // Metaclass is an instance of "Metaclass class", whose class is
        // Metaclass again.
        let metaclass_meta = u.heap.header(core.metaclass).class;
        assert_eq!(u.class_name(metaclass_meta), "Metaclass class");
        assert_eq!(u.heap.header(metaclass_meta).class, core.metaclass);
    }

    #[test]
    fn every_class_pointer_addresses_a_class() {
        let u = Universe::new().unwrap();
        for index in 0..u.heap.len() {
            let id = crate::heap::HeapId::from_index_for_tests(index);
            let class = u.heap.header(id).class;
            assert!(
                matches!(u.heap.get(class), HeapData::Class(_)),
                "object {index} has a non-class class pointer"
            );
        }
    }

    #[test]
    fn symbol_extends_string_and_true_extends_boolean() {
        let u = Universe::new().unwrap();
        assert_eq!(u.class_data(u.core.symbol).superclass, Some(u.core.string));
        assert_eq!(u.class_data(u.core.true_class).superclass, Some(u.core.boolean));
        assert_eq!(u.class_data(u.core.object).superclass, None);
    }

    #[test]
    fn distinguished_globals_exist() {
        let u = Universe::new().unwrap();
        assert_eq!(u.global(StaticNames::NilGlobal.id()), Some(Value::Nil));
        assert_eq!(u.global(StaticNames::TrueGlobal.id()), Some(Value::Boolean(true)));
        assert_eq!(u.global(StaticNames::FalseGlobal.id()), Some(Value::Boolean(false)));
        assert!(matches!(u.global(StaticNames::ObjectName.id()), Some(Value::Ref(_))));
    }

    #[test]
    fn subclass_layout_keeps_inherited_prefix() {
        let mut u = Universe::new().unwrap();
        let parent_def = crate::parse::parse_class("A = Object ( | a b | )", &mut u.interns).unwrap();
        let parent = u.install_class(&parent_def).unwrap();
        let child_def = crate::parse::parse_class("B = A ( | c | )", &mut u.interns).unwrap();
        let child = u.install_class(&child_def).unwrap();

        let parent_fields = u.class_data(parent).field_names.clone();
        let child_fields = u.class_data(child).field_names.clone();
        assert_eq!(child_fields.len(), 3);
        assert_eq!(&child_fields[..2], &parent_fields[..]);
    }

    #[test]
    fn reinstalling_a_class_replaces_the_binding() {
        let mut u = Universe::new().unwrap();
        let first = crate::parse::parse_class("A = Object ( | a | )", &mut u.interns).unwrap();
        let first_id = u.install_class(&first).unwrap();
        let second = crate::parse::parse_class("A = Object ( | a b | )", &mut u.interns).unwrap();
        let second_id = u.install_class(&second).unwrap();
        assert_ne!(first_id, second_id);
        assert_eq!(u.global(first.name), Some(Value::Ref(second_id)));
    }

    #[test]
    fn unknown_superclass_is_flagged() {
        let mut u = Universe::new().unwrap();
        let def = crate::parse::parse_class("A = Missing ( )", &mut u.interns).unwrap();
        let err = u.install_class(&def).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UndefinedGlobal);
    }
}
