//! AST node types shared between the parser, the preparation pass, and the
//! evaluator.
//!
//! The parser produces trees whose variables are [`VarRef::Named`] and whose
//! blocks are inline [`Expr::BlockLiteral`] nodes. Preparation rewrites both:
//! names become resolved slot references and block literals become indices
//! into the universe's compiled-block table. The evaluator only ever sees
//! prepared trees.

use crate::{class::BlockId, intern::SymbolId};

/// A parsed class definition: `Name = Super ( | ivars | methods ---- classMethods )`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassDef {
    pub name: SymbolId,
    /// Superclass name; `None` means `Object`.
    pub superclass: Option<SymbolId>,
    /// Instance variable names in declaration order.
    pub fields: Vec<SymbolId>,
    pub instance_methods: Vec<MethodDef>,
    pub class_methods: Vec<MethodDef>,
}

/// A parsed method definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MethodDef {
    /// Full selector, e.g. `increment`, `+` or `at:put:`.
    pub selector: SymbolId,
    pub params: Vec<SymbolId>,
    pub locals: Vec<SymbolId>,
    pub body: Body,
}

/// A statement sequence; the body of a method, block, or top-level expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Body {
    pub exprs: Vec<Expr>,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Literal),
    Variable(VarRef),
    /// `target := value`; evaluates to the assigned value.
    Assign { target: VarRef, value: Box<Expr> },
    Send(Box<SendExpr>),
    /// `^ expr`; a method return, or a non-local return inside a block.
    Return(Box<Expr>),
    /// A block literal as parsed; compiled away by preparation.
    BlockLiteral(Box<BlockDef>),
    /// A block literal after preparation, pointing at its compiled template.
    Block(BlockId),
}

/// Surface form of a message send. Determines parse precedence only; the
/// evaluator treats all three forms uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendKind {
    Unary,
    Binary,
    Keyword,
}

/// A message send with receiver and strict left-to-right argument order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SendExpr {
    pub receiver: Expr,
    pub selector: SymbolId,
    pub kind: SendKind,
    pub args: Vec<Expr>,
}

/// A block literal: parameters, locals, and body, before compilation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BlockDef {
    pub params: Vec<SymbolId>,
    pub locals: Vec<SymbolId>,
    pub body: Body,
}

/// A variable reference.
///
/// The parser emits `Named`, `SelfRef`, and `Super`; preparation resolves
/// `Named` into one of the slot-addressed forms, so the evaluator never does
/// name lookup for arguments, locals, or instance variables at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarRef {
    /// Unresolved name straight from the parser.
    Named(SymbolId),
    /// The receiver of the current activation.
    SelfRef,
    /// `super`; valid only in receiver position, enforced by the parser.
    Super,
    /// A parameter slot, `depth` lexical frames out.
    Argument { depth: usize, index: usize },
    /// A local slot, `depth` lexical frames out. `slot` is the flat frame
    /// index, i.e. already offset past that frame's parameters.
    Local { depth: usize, slot: usize },
    /// An instance variable of the receiver, by layout index.
    Field(usize),
    /// A name resolved against the globals table at run time.
    Global(SymbolId),
}

/// A literal value. Array literals allocate a fresh array per evaluation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Integer(i64),
    String(Box<str>),
    Symbol(SymbolId),
    Array(Vec<Literal>),
}
