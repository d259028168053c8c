//! Top-level expression evaluation: literals, sends, assignment, globals.

use minisom::{Object, Runner};
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Object {
    let mut runner = Runner::new().unwrap();
    runner.eval(source).unwrap()
}

#[test]
fn integer_addition() {
    assert_eq!(eval("3 + 4"), Object::Integer(7));
}

#[test]
fn arithmetic_is_left_associative() {
    assert_eq!(eval("2 + 3 * 4"), Object::Integer(20));
    assert_eq!(eval("2 + (3 * 4)"), Object::Integer(14));
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_eq!(eval("3 negated + 10"), Object::Integer(7));
}

#[test]
fn integer_comparisons() {
    assert_eq!(eval("10 < 20"), Object::Boolean(true));
    assert_eq!(eval("10 > 20"), Object::Boolean(false));
    assert_eq!(eval("10 <= 10"), Object::Boolean(true));
    assert_eq!(eval("10 >= 11"), Object::Boolean(false));
    assert_eq!(eval("3 = 3"), Object::Boolean(true));
    assert_eq!(eval("3 ~= 4"), Object::Boolean(true));
}

#[test]
fn integer_division_truncates() {
    assert_eq!(eval("7 / 2"), Object::Integer(3));
    assert_eq!(eval("7 % 3"), Object::Integer(1));
    assert_eq!(eval("-7 abs"), Object::Integer(7));
    assert_eq!(eval("3 min: 5"), Object::Integer(3));
    assert_eq!(eval("3 max: 5"), Object::Integer(5));
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval("'Hello, ' + 'World!'"),
        Object::String("Hello, World!".to_owned())
    );
    assert_eq!(eval("('Hello, ' + 'World!') length"), Object::Integer(13));
}

#[test]
fn string_conversions() {
    assert_eq!(eval("'abc' asSymbol"), Object::Symbol("abc".to_owned()));
    assert_eq!(eval("#abc asString"), Object::String("abc".to_owned()));
    assert_eq!(eval("'41' asInteger"), Object::Integer(41));
    assert_eq!(eval("'nope' asInteger"), Object::Nil);
}

#[test]
fn statement_sequence_answers_the_last_value() {
    assert_eq!(eval("1. 2. 3"), Object::Integer(3));
    assert_eq!(eval("1. 2. 3."), Object::Integer(3));
}

#[test]
fn expression_locals() {
    assert_eq!(eval("| a b | a := 4. b := a + 1. a * b"), Object::Integer(20));
}

#[test]
fn top_level_assignment_binds_a_global() {
    let mut runner = Runner::new().unwrap();
    assert_eq!(runner.eval("x := 5").unwrap(), Object::Integer(5));
    // Globals persist across separate evaluations of the same runner.
    assert_eq!(runner.eval("x + 1").unwrap(), Object::Integer(6));
}

#[test]
fn distinguished_globals() {
    assert_eq!(eval("nil"), Object::Nil);
    assert_eq!(eval("true"), Object::Boolean(true));
    assert_eq!(eval("false"), Object::Boolean(false));
}

#[test]
fn class_and_name() {
    assert_eq!(eval("3 class"), Object::Class("Integer".to_owned()));
    assert_eq!(eval("'s' class"), Object::Class("String".to_owned()));
    assert_eq!(eval("#s class"), Object::Class("Symbol".to_owned()));
    assert_eq!(eval("true class"), Object::Class("True".to_owned()));
    assert_eq!(eval("nil class"), Object::Class("Nil".to_owned()));
    assert_eq!(eval("3 class name"), Object::String("Integer".to_owned()));
}

#[test]
fn nil_tests() {
    assert_eq!(eval("nil isNil"), Object::Boolean(true));
    assert_eq!(eval("nil notNil"), Object::Boolean(false));
    assert_eq!(eval("3 isNil"), Object::Boolean(false));
}

#[test]
fn array_literals_and_access() {
    assert_eq!(eval("#(1 2 3) length"), Object::Integer(3));
    assert_eq!(eval("#(1 2 3) at: 2"), Object::Integer(2));
    assert_eq!(
        eval("#(1 two 'three')"),
        Object::Array(vec![
            Object::Integer(1),
            Object::Symbol("two".to_owned()),
            Object::String("three".to_owned()),
        ])
    );
}

#[test]
fn array_allocation_and_store() {
    assert_eq!(
        eval("| a | a := Array new: 3. a at: 1 put: 10. a at: 1"),
        Object::Integer(10)
    );
    // Fresh slots are nil.
    assert_eq!(eval("(Array new: 2) at: 2"), Object::Nil);
    assert_eq!(eval("Array new length"), Object::Integer(0));
}

#[test]
fn array_literals_are_fresh_per_evaluation() {
    let mut runner = Runner::new().unwrap();
    runner.eval("go := [ #(1 2) ]").unwrap();
    assert_eq!(runner.eval("(go value) at: 1 put: 9. (go value) at: 1").unwrap(), Object::Integer(1));
}

#[test]
fn conditionals_are_messages() {
    assert_eq!(eval("true ifTrue: [1] ifFalse: [2]"), Object::Integer(1));
    assert_eq!(eval("false ifTrue: [1] ifFalse: [2]"), Object::Integer(2));
    assert_eq!(eval("false ifTrue: [1]"), Object::Nil);
    assert_eq!(eval("false ifFalse: [9]"), Object::Integer(9));
    assert_eq!(eval("true and: [false]"), Object::Boolean(false));
    assert_eq!(eval("false and: [true]"), Object::Boolean(false));
    assert_eq!(eval("false or: [true]"), Object::Boolean(true));
    assert_eq!(eval("true xor: true"), Object::Boolean(false));
    assert_eq!(eval("true xor: false"), Object::Boolean(true));
}
