//! Error kinds surfaced through the public API.

use minisom::{Error, ErrorKind, Object, ResourceLimits, Runner, VmError};
use pretty_assertions::assert_eq;

fn eval_err(source: &str) -> VmError {
    let mut runner = Runner::new().unwrap();
    match runner.eval(source) {
        Err(Error::Run(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn unknown_selector_does_not_understand() {
    let err = eval_err("3 frobnicate");
    assert_eq!(err.kind, ErrorKind::DoesNotUnderstand);
    assert_eq!(err.selector.as_deref(), Some("frobnicate"));
    assert_eq!(err.receiver_class.as_deref(), Some("Integer"));
}

#[test]
fn nil_refuses_arithmetic() {
    let err = eval_err("nil + 1");
    assert_eq!(err.kind, ErrorKind::DoesNotUnderstand);
    assert_eq!(err.receiver_class.as_deref(), Some("Nil"));
}

#[test]
fn nil_still_answers_the_object_protocol() {
    let mut runner = Runner::new().unwrap();
    assert_eq!(runner.eval("nil isNil").unwrap(), Object::Boolean(true));
    assert_eq!(runner.eval("nil hash = nil hash").unwrap(), Object::Boolean(true));
}

#[test]
fn division_by_zero() {
    assert_eq!(eval_err("3 / 0").kind, ErrorKind::DivisionByZero);
    assert_eq!(eval_err("3 % 0").kind, ErrorKind::DivisionByZero);
}

#[test]
fn type_mismatch_on_mixed_arithmetic() {
    let err = eval_err("3 + 'x'");
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
    // Dispatch attaches the send context to the primitive's error.
    assert_eq!(err.selector.as_deref(), Some("+"));
    assert_eq!(err.receiver_class.as_deref(), Some("Integer"));
}

#[test]
fn index_out_of_bounds() {
    assert_eq!(eval_err("(Array new: 2) at: 5").kind, ErrorKind::IndexOutOfBounds);
    assert_eq!(eval_err("(Array new: 2) at: 0").kind, ErrorKind::IndexOutOfBounds);
    assert_eq!(eval_err("(Array new: 2) at: 3 put: 1").kind, ErrorKind::IndexOutOfBounds);
}

#[test]
fn undefined_global() {
    let err = eval_err("Missing new");
    assert_eq!(err.kind, ErrorKind::UndefinedGlobal);
    assert!(err.message.contains("Missing"));
}

#[test]
fn block_argument_count_mismatch() {
    assert_eq!(eval_err("[:x | x] value").kind, ErrorKind::ArgumentCountMismatch);
    assert_eq!(eval_err("[1] value: 2").kind, ErrorKind::ArgumentCountMismatch);
}

#[test]
fn value_classes_refuse_new() {
    assert_eq!(eval_err("Integer new").kind, ErrorKind::TypeMismatch);
    assert_eq!(eval_err("Block new").kind, ErrorKind::TypeMismatch);
}

#[test]
fn escaped_non_local_return() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source("Escape = Object ( maker = ( ^[ ^1 ] ) )")
        .unwrap();
    let err = match runner.eval("| b | b := Escape new maker. b value") {
        Err(Error::Run(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };
    assert_eq!(err.kind, ErrorKind::EscapedNonLocalReturn);
}

#[test]
fn unbounded_recursion_overflows() {
    let mut runner = Runner::with_limits(ResourceLimits {
        max_call_depth: 64,
        ..ResourceLimits::default()
    })
    .unwrap();
    runner.load_class_source("Loop = Object ( go = ( ^self go ) )").unwrap();
    let err = match runner.eval("Loop new go") {
        Err(Error::Run(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };
    assert_eq!(err.kind, ErrorKind::StackOverflow);
}

#[test]
fn heap_exhaustion_fails_allocation() {
    let base = Runner::new().unwrap().heap_stats().live_objects;
    let mut runner = Runner::with_limits(ResourceLimits {
        max_heap_objects: base + 1,
        ..ResourceLimits::default()
    })
    .unwrap();
    let err = match runner.eval("'a' + 'b'") {
        Err(Error::Run(err)) => err,
        other => panic!("expected a runtime error, got {other:?}"),
    };
    assert_eq!(err.kind, ErrorKind::AllocationFailed);
}

#[test]
fn parse_errors_surface_distinctly() {
    let mut runner = Runner::new().unwrap();
    match runner.eval("3 +") {
        Err(Error::Parse(err)) => assert!(err.message.contains("expected an expression")),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn errors_abandon_the_rest_of_the_sequence() {
    let mut runner = Runner::new().unwrap();
    runner.eval("x := 1").unwrap();
    // The failing statement stops the sequence before the second assignment.
    let _ = runner.eval("3 / 0. x := 2").unwrap_err();
    assert_eq!(runner.eval("x").unwrap(), Object::Integer(1));
}

#[test]
fn display_carries_send_context() {
    let err = eval_err("3 frobnicate");
    let text = err.to_string();
    assert!(text.contains("DoesNotUnderstand"));
    assert!(text.contains("Integer"));
    assert!(text.contains("frobnicate"));
}

#[test]
fn argument_count_is_distinct_from_lookup_failure() {
    let err = eval_err("[:x | x] value");
    assert!(err.kind != ErrorKind::DoesNotUnderstand);
}
