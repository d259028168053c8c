//! Dispatch tracing.
//!
//! A trait-based observer over the evaluator's send path. [`NoopTracer`] is
//! the production default and does nothing; [`StderrTracer`] writes an
//! indented send trace to stderr and backs the launcher's `--trace` flag.
//! Implementations only override the hooks they care about.

/// Trait for observing dispatch during evaluation.
///
/// All methods have default no-op implementations.
pub trait VmTracer {
    /// A source method activation is about to run.
    fn method_enter(&mut self, class: &str, selector: &str, depth: usize) {
        let _ = (class, selector, depth);
    }

    /// A source method activation finished (normally or by unwinding).
    fn method_exit(&mut self, selector: &str, depth: usize) {
        let _ = (selector, depth);
    }

    /// A primitive is about to be invoked.
    fn primitive(&mut self, class: &str, selector: &str, depth: usize) {
        let _ = (class, selector, depth);
    }
}

/// Tracer that does nothing.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Tracer that writes a human-readable send trace to stderr, indented by
/// activation depth.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl VmTracer for StderrTracer {
    fn method_enter(&mut self, class: &str, selector: &str, depth: usize) {
        eprintln!("{:indent$}-> {class}>>#{selector}", "", indent = depth * 2);
    }

    fn method_exit(&mut self, selector: &str, depth: usize) {
        eprintln!("{:indent$}<- #{selector}", "", indent = depth * 2);
    }

    fn primitive(&mut self, class: &str, selector: &str, depth: usize) {
        eprintln!("{:indent$} * {class}>>#{selector}", "", indent = depth * 2);
    }
}

/// Tracer that records every event, for tests that assert on dispatch order.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<String>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[String] {
        &self.events
    }
}

impl VmTracer for RecordingTracer {
    fn method_enter(&mut self, class: &str, selector: &str, _depth: usize) {
        self.events.push(format!("enter {class}>>#{selector}"));
    }

    fn method_exit(&mut self, selector: &str, _depth: usize) {
        self.events.push(format!("exit #{selector}"));
    }

    fn primitive(&mut self, class: &str, selector: &str, _depth: usize) {
        self.events.push(format!("primitive {class}>>#{selector}"));
    }
}
