//! Symbol interning.
//!
//! Selectors, identifiers, and `#symbol` literals are interned into a single
//! table: byte-equal inputs always map to the same [`SymbolId`], so selector
//! comparison anywhere in the dispatch path is integer equality and never
//! touches string content.
//!
//! The table is pre-seeded with [`StaticNames`], the names the bootstrap and
//! the primitive registry need, so those ids are known constants: the id of
//! `StaticNames::Println` is its discriminant. Dynamically interned names
//! (from parsing user code) follow after the static block.

use ahash::AHashMap;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Index into the symbol interner's storage.
///
/// Uses `u32` to keep the id small; symbols are never freed, and equality of
/// ids is equality of symbol content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Returns the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Names known at compile time, pre-interned in discriminant order.
///
/// Covers every selector the primitive registry installs, the core class
/// names the bootstrap registers, and the handful of synthetic names the
/// runner uses. Each variant's `&'static str` form is its source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, EnumIter)]
pub(crate) enum StaticNames {
    // Object protocol
    #[strum(serialize = "class")]
    Class,
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "hash")]
    Hash,
    #[strum(serialize = "println")]
    Println,
    #[strum(serialize = "print")]
    Print,
    #[strum(serialize = "isNil")]
    IsNil,
    #[strum(serialize = "notNil")]
    NotNil,
    #[strum(serialize = "asString")]
    AsString,

    // Integer protocol
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "<=")]
    LessEq,
    #[strum(serialize = ">=")]
    GreaterEq,
    #[strum(serialize = "~=")]
    NotEq,
    #[strum(serialize = "abs")]
    Abs,
    #[strum(serialize = "negated")]
    Negated,
    #[strum(serialize = "min:")]
    Min,
    #[strum(serialize = "max:")]
    Max,
    #[strum(serialize = "asInteger")]
    AsInteger,

    // String / Symbol protocol
    #[strum(serialize = "length")]
    Length,
    #[strum(serialize = "asSymbol")]
    AsSymbol,

    // Array protocol
    #[strum(serialize = "at:")]
    At,
    #[strum(serialize = "at:put:")]
    AtPut,
    #[strum(serialize = "do:")]
    Do,
    #[strum(serialize = "new:")]
    NewWith,

    // Block protocol
    #[strum(serialize = "value")]
    Value,
    #[strum(serialize = "value:")]
    Value1,
    #[strum(serialize = "value:value:")]
    Value2,
    #[strum(serialize = "whileTrue:")]
    WhileTrue,
    #[strum(serialize = "whileFalse:")]
    WhileFalse,

    // Boolean protocol
    #[strum(serialize = "not")]
    Not,
    #[strum(serialize = "ifTrue:")]
    IfTrue,
    #[strum(serialize = "ifFalse:")]
    IfFalse,
    #[strum(serialize = "ifTrue:ifFalse:")]
    IfTrueIfFalse,
    #[strum(serialize = "and:")]
    And,
    #[strum(serialize = "or:")]
    Or,
    #[strum(serialize = "xor:")]
    Xor,

    // Class protocol
    #[strum(serialize = "new")]
    New,
    #[strum(serialize = "name")]
    Name,

    // Core class names registered by the bootstrap
    #[strum(serialize = "Object")]
    ObjectName,
    #[strum(serialize = "Class")]
    ClassName,
    #[strum(serialize = "Metaclass")]
    MetaclassName,
    #[strum(serialize = "Integer")]
    IntegerName,
    #[strum(serialize = "String")]
    StringName,
    #[strum(serialize = "Symbol")]
    SymbolName,
    #[strum(serialize = "Array")]
    ArrayName,
    #[strum(serialize = "Block")]
    BlockName,
    #[strum(serialize = "Boolean")]
    BooleanName,
    #[strum(serialize = "True")]
    TrueName,
    #[strum(serialize = "False")]
    FalseName,
    #[strum(serialize = "Nil")]
    NilName,

    // Distinguished globals
    #[strum(serialize = "nil")]
    NilGlobal,
    #[strum(serialize = "true")]
    TrueGlobal,
    #[strum(serialize = "false")]
    FalseGlobal,

    // Synthetic names used by the runner
    #[strum(serialize = "run")]
    Run,
    #[strum(serialize = "doIt")]
    DoIt,
}

impl StaticNames {
    /// The id this name was seeded under.
    #[inline]
    pub(crate) fn id(self) -> SymbolId {
        SymbolId(self as u32)
    }

    /// The source spelling of this name.
    pub(crate) fn text(self) -> &'static str {
        self.into()
    }
}

/// The symbol table: unique storage for every interned byte sequence.
#[derive(Debug)]
pub(crate) struct Interns {
    lookup: AHashMap<Box<str>, SymbolId>,
    symbols: Vec<Box<str>>,
}

impl Interns {
    /// Creates a table pre-seeded with every [`StaticNames`] entry, in
    /// discriminant order so `StaticNames::id` holds.
    pub(crate) fn new() -> Self {
        let mut interns = Self {
            lookup: AHashMap::new(),
            symbols: Vec::new(),
        };
        for name in StaticNames::iter() {
            let id = interns.intern(name.text());
            debug_assert_eq!(id, name.id());
        }
        interns
    }

    /// Interns `text`, returning the existing id for byte-equal input.
    pub(crate) fn intern(&mut self, text: &str) -> SymbolId {
        if let Some(&id) = self.lookup.get(text) {
            return id;
        }
        let id = SymbolId(u32::try_from(self.symbols.len()).expect("symbol table overflow"));
        let stored: Box<str> = text.into();
        self.symbols.push(stored.clone());
        self.lookup.insert(stored, id);
        id
    }

    /// Returns the text for an interned symbol.
    pub(crate) fn get(&self, id: SymbolId) -> &str {
        &self.symbols[id.index()]
    }

    /// Number of interned symbols, static seed included.
    pub(crate) fn len(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_equal_inputs_share_an_id() {
        let mut interns = Interns::new();
        let a = interns.intern("counter");
        let b = interns.intern("counter");
        let c = interns.intern("counter2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn static_names_are_pre_interned() {
        let mut interns = Interns::new();
        let before = interns.len();
        assert_eq!(interns.intern("at:put:"), StaticNames::AtPut.id());
        assert_eq!(interns.intern("Object"), StaticNames::ObjectName.id());
        assert_eq!(interns.len(), before);
    }

    #[test]
    fn text_round_trips() {
        let mut interns = Interns::new();
        let id = interns.intern("ifTrue:ifFalse:");
        assert_eq!(interns.get(id), "ifTrue:ifFalse:");
    }
}
