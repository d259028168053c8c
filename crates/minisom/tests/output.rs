//! Program output through `PrintWriter`, and dispatch tracing.

use minisom::{CollectStringPrint, NoopTracer, Object, RecordingTracer, Runner};
use pretty_assertions::assert_eq;

fn eval_output(source: &str) -> (Object, String) {
    let mut runner = Runner::new().unwrap();
    let mut print = CollectStringPrint::new();
    let mut tracer = NoopTracer;
    let result = runner.run_expression(source, &mut print, &mut tracer).unwrap();
    (result, print.into_output())
}

#[test]
fn println_writes_contents_and_answers_the_receiver() {
    let (result, output) = eval_output("'Hello, World!' println");
    assert_eq!(output, "Hello, World!\n");
    assert_eq!(result, Object::String("Hello, World!".to_owned()));
}

#[test]
fn println_renders_each_kind() {
    assert_eq!(eval_output("7 println").1, "7\n");
    assert_eq!(eval_output("nil println").1, "nil\n");
    assert_eq!(eval_output("true println").1, "true\n");
    assert_eq!(eval_output("#sym println").1, "#sym\n");
    assert_eq!(eval_output("#(1 2 3) println").1, "(1 2 3)\n");
}

#[test]
fn print_omits_the_newline() {
    let (_, output) = eval_output("'a' print. 'b' print");
    assert_eq!(output, "ab");
}

#[test]
fn instances_print_with_their_class_name() {
    let mut runner = Runner::new().unwrap();
    runner.load_class_source("Widget = Object ( )").unwrap();
    let mut print = CollectStringPrint::new();
    let mut tracer = NoopTracer;
    runner
        .run_expression("Widget new println", &mut print, &mut tracer)
        .unwrap();
    assert_eq!(print.output(), "instance of Widget\n");
}

#[test]
fn output_accumulates_across_a_loop() {
    let (_, output) = eval_output("| i | i := 0. [i < 3] whileTrue: [i := i + 1. i println]");
    assert_eq!(output, "1\n2\n3\n");
}

#[test]
fn tracer_sees_method_enter_and_exit() {
    let mut runner = Runner::new().unwrap();
    runner
        .load_class_source("Greeter = Object ( greet = ( ^'hi' ) )")
        .unwrap();
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    runner
        .run_expression("Greeter new greet", &mut print, &mut tracer)
        .unwrap();
    let events = tracer.events();
    assert!(events.contains(&"enter Greeter>>#greet".to_owned()), "events: {events:?}");
    assert!(events.contains(&"exit #greet".to_owned()), "events: {events:?}");
}

#[test]
fn tracer_sees_primitives_with_their_holder() {
    let mut runner = Runner::new().unwrap();
    let mut print = CollectStringPrint::new();
    let mut tracer = RecordingTracer::new();
    runner.run_expression("3 + 4", &mut print, &mut tracer).unwrap();
    assert!(
        tracer.events().contains(&"primitive Integer>>#+".to_owned()),
        "events: {:?}",
        tracer.events()
    );
}

#[test]
fn heap_stats_report_contexts_and_strings() {
    let mut runner = Runner::new().unwrap();
    let before = runner.heap_stats();
    runner.eval("'fresh' + ' string'").unwrap();
    let after = runner.heap_stats();
    assert!(after.live_objects > before.live_objects);
    assert!(after.objects_by_type.get("Context").copied().unwrap_or(0) > 0);
    assert!(after.objects_by_type.get("String").copied().unwrap_or(0) > 0);
}
