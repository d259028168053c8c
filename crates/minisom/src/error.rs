//! Runtime error kinds surfaced by the interpreter core.
//!
//! Every fallible core path returns [`RunResult`]. A [`VmError`] short-circuits
//! evaluation up to the top-level invocation; there is no in-language exception
//! handling, so nothing below the launcher ever catches one.

use std::fmt;

use strum::{Display, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, VmError>;

/// The closed set of runtime error kinds.
///
/// Uses strum derives for automatic `Display` and `Into<&'static str>`
/// implementations; the string form matches the variant name exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    /// The heap refused an allocation (object cap reached).
    AllocationFailed,
    /// Method lookup walked the whole superclass chain without a hit.
    DoesNotUnderstand,
    /// A method was found but invoked with the wrong number of arguments.
    ArgumentCountMismatch,
    /// A primitive was applied to a receiver or argument of the wrong type.
    TypeMismatch,
    /// A global name was read before anything was bound to it.
    UndefinedGlobal,
    /// A block performed `^` after its home method activation had returned.
    EscapedNonLocalReturn,
    /// Method/block nesting exceeded the configured call depth.
    StackOverflow,
    /// An array access outside `1..=length`.
    IndexOutOfBounds,
    /// Integer `/` or `%` with a zero divisor.
    DivisionByZero,
}

/// A runtime error carrying the selector and receiver class involved, where known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmError {
    pub kind: ErrorKind,
    /// Selector of the send that failed, if the error arose from a send.
    pub selector: Option<String>,
    /// Class name of the receiver, if the error arose from a send.
    pub receiver_class: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl VmError {
    /// Creates an error with no send context.
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            selector: None,
            receiver_class: None,
            message: message.into(),
        }
    }

    /// Attaches `Class>>#selector` context to an error that lacks it.
    ///
    /// Used when a primitive reports a bare error and the dispatch layer knows
    /// which send triggered it. Context already present is kept.
    #[must_use]
    pub(crate) fn with_send_context(mut self, receiver_class: &str, selector: &str) -> Self {
        if self.receiver_class.is_none() {
            self.receiver_class = Some(receiver_class.to_owned());
        }
        if self.selector.is_none() {
            self.selector = Some(selector.to_owned());
        }
        self
    }

    pub(crate) fn does_not_understand(receiver_class: &str, selector: &str) -> Self {
        Self {
            kind: ErrorKind::DoesNotUnderstand,
            selector: Some(selector.to_owned()),
            receiver_class: Some(receiver_class.to_owned()),
            message: format!("{receiver_class} does not understand #{selector}"),
        }
    }

    pub(crate) fn argument_count(receiver_class: &str, selector: &str, expected: usize, given: usize) -> Self {
        Self {
            kind: ErrorKind::ArgumentCountMismatch,
            selector: Some(selector.to_owned()),
            receiver_class: Some(receiver_class.to_owned()),
            message: format!("#{selector} expects {expected} arguments, got {given}"),
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    pub(crate) fn undefined_global(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedGlobal, format!("undefined global '{name}'"))
    }

    pub(crate) fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} is out of bounds for length {length}"),
        )
    }

    pub(crate) fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub(crate) fn stack_overflow(limit: usize) -> Self {
        Self::new(ErrorKind::StackOverflow, format!("call depth limit of {limit} exceeded"))
    }

    pub(crate) fn allocation_failed(limit: usize) -> Self {
        Self::new(
            ErrorKind::AllocationFailed,
            format!("heap object limit of {limit} exceeded"),
        )
    }

    pub(crate) fn escaped_return(serial: u64) -> Self {
        Self::new(
            ErrorKind::EscapedNonLocalReturn,
            format!("non-local return from a block whose home activation #{serial} already returned"),
        )
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let (Some(class), Some(selector)) = (&self.receiver_class, &self.selector) {
            write!(f, " ({class}>>#{selector})")?;
        }
        Ok(())
    }
}

impl std::error::Error for VmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_send_context() {
        let err = VmError::does_not_understand("Integer", "frobnicate");
        assert_eq!(
            err.to_string(),
            "DoesNotUnderstand: Integer does not understand #frobnicate (Integer>>#frobnicate)"
        );
    }

    #[test]
    fn display_without_context() {
        let err = VmError::division_by_zero();
        assert_eq!(err.to_string(), "DivisionByZero: division by zero");
    }

    #[test]
    fn with_send_context_keeps_existing() {
        let err = VmError::does_not_understand("Array", "foo").with_send_context("String", "bar");
        assert_eq!(err.receiver_class.as_deref(), Some("Array"));
        assert_eq!(err.selector.as_deref(), Some("foo"));
    }
}
