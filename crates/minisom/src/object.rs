//! The embedder-facing value type.
//!
//! Results leaving the interpreter are converted from the internal value
//! representation into [`Object`], which owns its data and has no ties to
//! the universe that produced it. The launcher and the integration tests
//! consume evaluation results exclusively through this type.

use std::fmt;

use crate::{
    heap::{Heap, HeapData},
    intern::Interns,
    value::Value,
};

/// Conversion depth cap; nesting beyond it renders as an empty array rather
/// than recursing forever through self-referencing structures.
const MAX_CONVERT_DEPTH: usize = 16;

/// A SOM value surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Nil,
    Boolean(bool),
    Integer(i64),
    String(String),
    Symbol(String),
    Array(Vec<Object>),
    /// A class, by name.
    Class(String),
    /// An instance of a user class, by class name.
    Instance { class: String },
    /// A block closure; opaque outside the universe that created it.
    Block,
}

impl Object {
    pub(crate) fn from_value(value: Value, heap: &Heap, interns: &Interns) -> Self {
        Self::convert(value, heap, interns, MAX_CONVERT_DEPTH)
    }

    fn convert(value: Value, heap: &Heap, interns: &Interns, depth: usize) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Boolean(value) => Self::Boolean(value),
            Value::Integer(value) => Self::Integer(value),
            Value::Symbol(id) => Self::Symbol(interns.get(id).to_owned()),
            Value::Ref(id) => match heap.get(id) {
                HeapData::String(text) => Self::String(text.to_string()),
                HeapData::Array(elements) => {
                    if depth == 0 {
                        return Self::Array(Vec::new());
                    }
                    Self::Array(
                        elements
                            .iter()
                            .map(|&element| Self::convert(element, heap, interns, depth - 1))
                            .collect(),
                    )
                }
                HeapData::Class(class) => Self::Class(interns.get(class.name).to_owned()),
                HeapData::Block(_) => Self::Block,
                HeapData::Instance(_) | HeapData::MethodDict(_) | HeapData::Context(_) => {
                    let class = heap.header(id).class;
                    let name = match heap.get(class) {
                        HeapData::Class(class) => interns.get(class.name).to_owned(),
                        _ => "?".to_owned(),
                    };
                    Self::Instance { class: name }
                }
            },
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(text) => write!(f, "{text}"),
            Self::Symbol(text) => write!(f, "#{text}"),
            Self::Array(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Self::Class(name) => write!(f, "{name}"),
            Self::Instance { class } => write!(f, "instance of {class}"),
            Self::Block => write!(f, "a Block"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_print_output() {
        assert_eq!(Object::Nil.to_string(), "nil");
        assert_eq!(Object::Integer(-3).to_string(), "-3");
        assert_eq!(Object::Symbol("at:put:".into()).to_string(), "#at:put:");
        let array = Object::Array(vec![Object::Integer(1), Object::String("x".into())]);
        assert_eq!(array.to_string(), "(1 x)");
    }
}
