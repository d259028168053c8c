//! The primitive registry: built-in methods callable from class method
//! dictionaries.
//!
//! Each family of primitives has its own submodule. [`Primitive`] enumerates
//! every built-in; `install` populates the core classes' method dictionaries
//! from [`CORE_PRIMITIVES`] during bootstrap. Primitives receive the raw
//! receiver and argument values and answer a [`Flow`], because the
//! control-flow primitives (`ifTrue:`, `whileTrue:`, `do:`) invoke blocks
//! whose non-local returns must keep unwinding.

mod array;
mod block;
mod boolean;
mod class;
mod integer;
mod object;
mod string;

use crate::{
    class::{MethodEntry, MethodKind},
    error::RunResult,
    evaluator::{Flow, Vm},
    heap::{HeapData, HeapId},
    intern::StaticNames,
    universe::Universe,
    value::Value,
};

/// Every built-in method the core ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    // Object
    ObjectClass,
    ObjectEq,
    ObjectHash,
    ObjectPrintln,
    ObjectPrint,
    ObjectIsNil,
    ObjectNotNil,
    ObjectAsString,
    // Integer
    IntegerAdd,
    IntegerSub,
    IntegerMul,
    IntegerDiv,
    IntegerMod,
    IntegerLess,
    IntegerGreater,
    IntegerLessEq,
    IntegerGreaterEq,
    IntegerEq,
    IntegerNotEq,
    IntegerAbs,
    IntegerNegated,
    IntegerMin,
    IntegerMax,
    IntegerAsString,
    // String (Symbol inherits most of these)
    StringLength,
    StringConcat,
    StringEq,
    StringHash,
    StringAsSymbol,
    StringAsInteger,
    // Symbol
    SymbolAsString,
    // Array
    ArrayAt,
    ArrayAtPut,
    ArrayLength,
    ArrayDo,
    ArrayNewWith,
    // Block
    BlockValue,
    BlockValue1,
    BlockValue2,
    BlockWhileTrue,
    BlockWhileFalse,
    // Boolean (installed once; True and False inherit)
    BooleanNot,
    BooleanIfTrue,
    BooleanIfFalse,
    BooleanIfTrueIfFalse,
    BooleanAnd,
    BooleanOr,
    BooleanXor,
    // Class
    ClassNew,
    ClassName,
}

impl Primitive {
    /// Invokes this primitive with the raw receiver and arguments.
    ///
    /// The dispatch layer has already checked the argument count against
    /// the selector's arity.
    pub(crate) fn invoke(self, vm: &mut Vm<'_>, receiver: Value, args: &[Value]) -> RunResult<Flow> {
        match self {
            Self::ObjectClass => object::class(vm, receiver),
            Self::ObjectEq => object::eq(vm, receiver, args),
            Self::ObjectHash => object::hash(vm, receiver),
            Self::ObjectPrintln => object::println(vm, receiver),
            Self::ObjectPrint => object::print(vm, receiver),
            Self::ObjectIsNil => object::is_nil(receiver),
            Self::ObjectNotNil => object::not_nil(receiver),
            Self::ObjectAsString => object::as_string(vm, receiver),
            Self::IntegerAdd => integer::add(vm, receiver, args),
            Self::IntegerSub => integer::sub(vm, receiver, args),
            Self::IntegerMul => integer::mul(vm, receiver, args),
            Self::IntegerDiv => integer::div(vm, receiver, args),
            Self::IntegerMod => integer::modulo(vm, receiver, args),
            Self::IntegerLess => integer::less(vm, receiver, args),
            Self::IntegerGreater => integer::greater(vm, receiver, args),
            Self::IntegerLessEq => integer::less_eq(vm, receiver, args),
            Self::IntegerGreaterEq => integer::greater_eq(vm, receiver, args),
            Self::IntegerEq => integer::eq(receiver, args),
            Self::IntegerNotEq => integer::not_eq(receiver, args),
            Self::IntegerAbs => integer::abs(receiver),
            Self::IntegerNegated => integer::negated(receiver),
            Self::IntegerMin => integer::min(vm, receiver, args),
            Self::IntegerMax => integer::max(vm, receiver, args),
            Self::IntegerAsString => integer::as_string(vm, receiver),
            Self::StringLength => string::length(vm, receiver),
            Self::StringConcat => string::concat(vm, receiver, args),
            Self::StringEq => string::eq(vm, receiver, args),
            Self::StringHash => string::hash(vm, receiver),
            Self::StringAsSymbol => string::as_symbol(vm, receiver),
            Self::StringAsInteger => string::as_integer(vm, receiver),
            Self::SymbolAsString => string::symbol_as_string(vm, receiver),
            Self::ArrayAt => array::at(vm, receiver, args),
            Self::ArrayAtPut => array::at_put(vm, receiver, args),
            Self::ArrayLength => array::length(vm, receiver),
            Self::ArrayDo => array::do_each(vm, receiver, args),
            Self::ArrayNewWith => array::new_with(vm, receiver, args),
            Self::BlockValue => block::value(vm, receiver, args),
            Self::BlockValue1 => block::value(vm, receiver, args),
            Self::BlockValue2 => block::value(vm, receiver, args),
            Self::BlockWhileTrue => block::while_loop(vm, receiver, args, true),
            Self::BlockWhileFalse => block::while_loop(vm, receiver, args, false),
            Self::BooleanNot => boolean::not(receiver),
            Self::BooleanIfTrue => boolean::if_true(vm, receiver, args),
            Self::BooleanIfFalse => boolean::if_false(vm, receiver, args),
            Self::BooleanIfTrueIfFalse => boolean::if_true_if_false(vm, receiver, args),
            Self::BooleanAnd => boolean::and(vm, receiver, args),
            Self::BooleanOr => boolean::or(vm, receiver, args),
            Self::BooleanXor => boolean::xor(vm, receiver, args),
            Self::ClassNew => class::new(vm, receiver),
            Self::ClassName => class::name(vm, receiver),
        }
    }
}

/// Which core class's dictionary a primitive is installed in.
#[derive(Debug, Clone, Copy)]
enum Holder {
    Object,
    Integer,
    String,
    Symbol,
    Array,
    /// `Array`'s metaclass; holds the class-side `new:`.
    ArrayMeta,
    Block,
    Boolean,
    Class,
}

/// The minimum primitive set plus the conversions and comparison extras the
/// original system carried.
const CORE_PRIMITIVES: &[(Holder, StaticNames, Primitive)] = &[
    (Holder::Object, StaticNames::Class, Primitive::ObjectClass),
    (Holder::Object, StaticNames::Eq, Primitive::ObjectEq),
    (Holder::Object, StaticNames::Hash, Primitive::ObjectHash),
    (Holder::Object, StaticNames::Println, Primitive::ObjectPrintln),
    (Holder::Object, StaticNames::Print, Primitive::ObjectPrint),
    (Holder::Object, StaticNames::IsNil, Primitive::ObjectIsNil),
    (Holder::Object, StaticNames::NotNil, Primitive::ObjectNotNil),
    (Holder::Object, StaticNames::AsString, Primitive::ObjectAsString),
    (Holder::Integer, StaticNames::Plus, Primitive::IntegerAdd),
    (Holder::Integer, StaticNames::Minus, Primitive::IntegerSub),
    (Holder::Integer, StaticNames::Star, Primitive::IntegerMul),
    (Holder::Integer, StaticNames::Slash, Primitive::IntegerDiv),
    (Holder::Integer, StaticNames::Percent, Primitive::IntegerMod),
    (Holder::Integer, StaticNames::Less, Primitive::IntegerLess),
    (Holder::Integer, StaticNames::Greater, Primitive::IntegerGreater),
    (Holder::Integer, StaticNames::LessEq, Primitive::IntegerLessEq),
    (Holder::Integer, StaticNames::GreaterEq, Primitive::IntegerGreaterEq),
    (Holder::Integer, StaticNames::Eq, Primitive::IntegerEq),
    (Holder::Integer, StaticNames::NotEq, Primitive::IntegerNotEq),
    (Holder::Integer, StaticNames::Abs, Primitive::IntegerAbs),
    (Holder::Integer, StaticNames::Negated, Primitive::IntegerNegated),
    (Holder::Integer, StaticNames::Min, Primitive::IntegerMin),
    (Holder::Integer, StaticNames::Max, Primitive::IntegerMax),
    (Holder::Integer, StaticNames::AsString, Primitive::IntegerAsString),
    (Holder::String, StaticNames::Length, Primitive::StringLength),
    (Holder::String, StaticNames::Plus, Primitive::StringConcat),
    (Holder::String, StaticNames::Eq, Primitive::StringEq),
    (Holder::String, StaticNames::Hash, Primitive::StringHash),
    (Holder::String, StaticNames::AsSymbol, Primitive::StringAsSymbol),
    (Holder::String, StaticNames::AsInteger, Primitive::StringAsInteger),
    (Holder::Symbol, StaticNames::AsString, Primitive::SymbolAsString),
    (Holder::Array, StaticNames::At, Primitive::ArrayAt),
    (Holder::Array, StaticNames::AtPut, Primitive::ArrayAtPut),
    (Holder::Array, StaticNames::Length, Primitive::ArrayLength),
    (Holder::Array, StaticNames::Do, Primitive::ArrayDo),
    (Holder::ArrayMeta, StaticNames::NewWith, Primitive::ArrayNewWith),
    (Holder::Block, StaticNames::Value, Primitive::BlockValue),
    (Holder::Block, StaticNames::Value1, Primitive::BlockValue1),
    (Holder::Block, StaticNames::Value2, Primitive::BlockValue2),
    (Holder::Block, StaticNames::WhileTrue, Primitive::BlockWhileTrue),
    (Holder::Block, StaticNames::WhileFalse, Primitive::BlockWhileFalse),
    (Holder::Boolean, StaticNames::Not, Primitive::BooleanNot),
    (Holder::Boolean, StaticNames::IfTrue, Primitive::BooleanIfTrue),
    (Holder::Boolean, StaticNames::IfFalse, Primitive::BooleanIfFalse),
    (Holder::Boolean, StaticNames::IfTrueIfFalse, Primitive::BooleanIfTrueIfFalse),
    (Holder::Boolean, StaticNames::And, Primitive::BooleanAnd),
    (Holder::Boolean, StaticNames::Or, Primitive::BooleanOr),
    (Holder::Boolean, StaticNames::Xor, Primitive::BooleanXor),
    (Holder::Class, StaticNames::New, Primitive::ClassNew),
    (Holder::Class, StaticNames::Name, Primitive::ClassName),
];

/// Arity of a selector from its spelling: one per colon for keyword
/// selectors, one for binary selectors, zero for unary.
fn arity_of(selector: &str) -> usize {
    let colons = selector.bytes().filter(|&b| b == b':').count();
    if colons > 0 {
        colons
    } else if selector.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        0
    } else {
        1
    }
}

/// Populates the core classes' method dictionaries. Called once from the
/// bootstrap, after the class graph exists and before any code runs.
pub(crate) fn install(universe: &mut Universe) {
    for &(holder, name, primitive) in CORE_PRIMITIVES {
        let class = match holder {
            Holder::Object => universe.core.object,
            Holder::Integer => universe.core.integer,
            Holder::String => universe.core.string,
            Holder::Symbol => universe.core.symbol,
            Holder::Array => universe.core.array,
            Holder::ArrayMeta => universe.heap.header(universe.core.array).class,
            Holder::Block => universe.core.block,
            Holder::Boolean => universe.core.boolean,
            Holder::Class => universe.core.class,
        };
        let dict = universe.class_data(class).method_dict;
        let entry = MethodEntry {
            arg_count: arity_of(name.text()),
            kind: MethodKind::Primitive(primitive),
        };
        match universe.heap.get_mut(dict) {
            HeapData::MethodDict(dict) => dict.insert(name.id(), entry),
            other => panic!("expected a method dictionary, found {}", other.type_name()),
        }
    }
}

/// Display name of a value's class, for primitive error messages.
fn value_class_name<'a>(vm: &'a Vm<'_>, value: Value) -> &'a str {
    let class = vm.class_of_value(value);
    match vm.heap.get(class) {
        HeapData::Class(class) => vm.interns.get(class.name),
        _ => "?",
    }
}

/// The block heap object behind `value`, if it is one.
fn block_of(vm: &Vm<'_>, value: Value) -> Option<HeapId> {
    match value {
        Value::Ref(id) if matches!(vm.heap.get(id), HeapData::Block(_)) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_follows_the_selector_shape() {
        assert_eq!(arity_of("println"), 0);
        assert_eq!(arity_of("+"), 1);
        assert_eq!(arity_of("<="), 1);
        assert_eq!(arity_of("at:"), 1);
        assert_eq!(arity_of("at:put:"), 2);
        assert_eq!(arity_of("ifTrue:ifFalse:"), 2);
    }

    #[test]
    fn core_dictionaries_are_populated() {
        let u = Universe::new().unwrap();
        let dict = u.class_data(u.core.integer).method_dict;
        let HeapData::MethodDict(dict) = u.heap.get(dict) else {
            panic!("expected a method dictionary")
        };
        let entry = dict.get(StaticNames::Plus.id()).unwrap();
        assert_eq!(entry.arg_count, 1);
        assert_eq!(entry.kind, MethodKind::Primitive(Primitive::IntegerAdd));
    }
}
