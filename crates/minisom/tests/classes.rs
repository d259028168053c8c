//! Class installation, instance state, inheritance, and super sends.

use minisom::{Object, Runner};
use pretty_assertions::assert_eq;

const COUNTER: &str = "Counter = Object (
    | value |
    initialize = ( value := 0 )
    increment = ( ^value := value + 1 )
)";

const POINT: &str = "Point = Object (
    | x y |
    setX: a y: b = ( x := a. y := b. ^self )
    x = ( ^x )
    y = ( ^y )
)";

#[test]
fn counter_counts() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source(COUNTER).unwrap();
    let result = runner
        .eval("| c | c := Counter new. c initialize. c increment. c increment. c increment")
        .unwrap();
    assert_eq!(result, Object::Integer(3));
}

#[test]
fn instance_state_survives_between_evaluations() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source(COUNTER).unwrap();
    runner.eval("c := Counter new. c initialize").unwrap();
    runner.eval("c increment. c increment").unwrap();
    assert_eq!(runner.eval("c increment").unwrap(), Object::Integer(3));
}

#[test]
fn point_setters_return_self_for_chaining() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source(POINT).unwrap();
    assert_eq!(
        runner.eval("((Point new) setX: 7 y: 9) x").unwrap(),
        Object::Integer(7)
    );
    assert_eq!(
        runner.eval("((Point new) setX: 7 y: 9) y").unwrap(),
        Object::Integer(9)
    );
}

#[test]
fn fresh_instance_slots_are_nil() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source(POINT).unwrap();
    assert_eq!(runner.eval("Point new x").unwrap(), Object::Nil);
}

#[test]
fn load_class_source_returns_the_name() {
    let mut runner = Runner::new().unwrap();
    assert_eq!(runner.load_class_source(COUNTER).unwrap(), "Counter");
}

#[test]
fn methods_fall_back_to_the_superclass() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source("Animal = Object ( noise = ( ^'...' ) legs = ( ^4 ) )")
        .unwrap();
    runner.load_class_source("Dog = Animal ( noise = ( ^'woof' ) )").unwrap();
    assert_eq!(runner.eval("Dog new noise").unwrap(), Object::String("woof".to_owned()));
    assert_eq!(runner.eval("Dog new legs").unwrap(), Object::Integer(4));
}

#[test]
fn super_starts_at_the_defining_class_superclass() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source("A = Object ( describe = ( ^'A' ) )").unwrap();
    runner
        .load_class_source("B = A ( describe = ( ^'B-' + super describe ) )")
        .unwrap();
    runner
        .load_class_source("C = B ( describe = ( ^'C-' + super describe ) )")
        .unwrap();
    // The super chain is resolved from the holder, not the receiver, so the
    // C instance walks all three implementations.
    assert_eq!(
        runner.eval("C new describe").unwrap(),
        Object::String("C-B-A".to_owned())
    );
}

#[test]
fn subclass_sees_inherited_instance_variables() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source("Base = Object ( | a | setA: v = ( a := v ) a = ( ^a ) )")
        .unwrap();
    runner
        .load_class_source("Derived = Base ( | b | setB: v = ( b := v ) sum = ( ^a + b ) )")
        .unwrap();
    let result = runner
        .eval("| d | d := Derived new. d setA: 3. d setB: 4. d sum")
        .unwrap();
    assert_eq!(result, Object::Integer(7));
}

#[test]
fn class_side_methods_live_on_the_metaclass() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source(
            "Factory = Object (
                | tag |
                tag = ( ^tag )
                setTag: t = ( tag := t )
                ----
                make = ( | f | f := Factory new. f setTag: 42. ^f )
            )",
        )
        .unwrap();
    assert_eq!(
        runner.eval("Factory make").unwrap(),
        Object::Instance {
            class: "Factory".to_owned()
        }
    );
    assert_eq!(runner.eval("Factory make tag").unwrap(), Object::Integer(42));
}

#[test]
fn reinstalling_a_class_rebinds_the_name() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source("Thing = Object ( answer = ( ^1 ) )").unwrap();
    assert_eq!(runner.eval("Thing new answer").unwrap(), Object::Integer(1));
    runner.load_class_source("Thing = Object ( answer = ( ^2 ) )").unwrap();
    assert_eq!(runner.eval("Thing new answer").unwrap(), Object::Integer(2));
}

#[test]
fn default_superclass_is_object() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source("Bare = ( run = ( ^self class name ) )").unwrap();
    assert_eq!(runner.eval("Bare new run").unwrap(), Object::String("Bare".to_owned()));
    assert_eq!(runner.eval("Bare new isNil").unwrap(), Object::Boolean(false));
}

#[test]
fn instances_surface_with_their_class_name() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source(POINT).unwrap();
    assert_eq!(
        runner.eval("Point new").unwrap(),
        Object::Instance {
            class: "Point".to_owned()
        }
    );
}

#[test]
fn run_entry_point_via_send_to_global() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source("Main = Object ( run = ( ^6 * 7 ) )")
        .unwrap();
    let mut print = minisom::CollectStringPrint::new();
    let mut tracer = minisom::NoopTracer;
    let result = runner.send_to_global("Main", "run", &mut print, &mut tracer).unwrap();
    assert_eq!(result, Object::Integer(42));
}
