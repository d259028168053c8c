//! Public interface for loading and running SOM code.
//!
//! [`Runner`] owns a universe and exposes the three operations the
//! launcher needs: install a class source file, evaluate a top-level
//! expression, and send a message to a named global. Results surface as
//! [`Object`]; failures as [`Error`], which folds parse and runtime errors
//! into one launcher-facing type.

use std::fmt;

use crate::{
    context::context,
    error::VmError,
    evaluator::{Flow, Vm},
    heap::HeapStats,
    io::{PrintWriter, StdPrint},
    limits::ResourceLimits,
    object::Object,
    parse::{ParseError, parse_class, parse_expression},
    tracer::{NoopTracer, VmTracer},
    universe::Universe,
    value::Value,
};

/// Anything that can go wrong between source text and a result value.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(ParseError),
    Run(VmError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Run(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<VmError> for Error {
    fn from(err: VmError) -> Self {
        Self::Run(err)
    }
}

/// Primary interface for running SOM code.
///
/// # Example
/// ```
/// use minisom::Runner;
///
/// let mut runner = Runner::new().unwrap();
/// let result = runner.eval("3 + 4").unwrap();
/// assert_eq!(result, minisom::Object::Integer(7));
/// ```
#[derive(Debug)]
pub struct Runner {
    universe: Universe,
}

impl Runner {
    /// Creates a runner with default resource limits. Bootstraps the core
    /// class graph.
    pub fn new() -> Result<Self, Error> {
        Self::with_limits(ResourceLimits::default())
    }

    pub fn with_limits(limits: ResourceLimits) -> Result<Self, Error> {
        Ok(Self {
            universe: Universe::with_limits(limits)?,
        })
    }

    /// Parses and installs one class definition, binding the class under
    /// its name. Returns the class name.
    pub fn load_class_source(&mut self, source: &str) -> Result<String, Error> {
        let def = parse_class(source, &mut self.universe.interns)?;
        self.universe.install_class(&def)?;
        Ok(self.universe.interns.get(def.name).to_owned())
    }

    /// Evaluates a top-level expression body (optionally starting with a
    /// `| locals |` list) with the given output writer and tracer.
    ///
    /// The body is compiled into a synthetic zero-argument method and run
    /// with `nil` as the receiver.
    pub fn run_expression(
        &mut self,
        source: &str,
        print: &mut dyn PrintWriter,
        tracer: &mut dyn VmTracer,
    ) -> Result<Object, Error> {
        let (locals, body) = parse_expression(source, &mut self.universe.interns)?;
        let method = self.universe.compile_expression(&locals, body);
        let mut vm = Vm::new(&mut self.universe, print, tracer);
        let flow = vm.invoke_method(method, Value::Nil, &[])?;
        self.finish(flow)
    }

    /// Evaluates an expression, printing to stdout with no tracing.
    pub fn eval(&mut self, source: &str) -> Result<Object, Error> {
        self.run_expression(source, &mut StdPrint, &mut NoopTracer)
    }

    /// Sends a unary message to a named global, typically `run` to a class
    /// installed from a source file.
    pub fn send_to_global(
        &mut self,
        global: &str,
        selector: &str,
        print: &mut dyn PrintWriter,
        tracer: &mut dyn VmTracer,
    ) -> Result<Object, Error> {
        let name = self.universe.interns.intern(global);
        let Some(receiver) = self.universe.global(name) else {
            return Err(VmError::undefined_global(global).into());
        };
        let selector = self.universe.interns.intern(selector);
        let mut vm = Vm::new(&mut self.universe, print, tracer);
        let flow = vm.send_message(receiver, selector, &[], None)?;
        self.finish(flow)
    }

    fn finish(&self, flow: Flow) -> Result<Object, Error> {
        match flow {
            Flow::Value(value) => Ok(Object::from_value(value, &self.universe.heap, &self.universe.interns)),
            // Activation frames catch returns addressed to them, so a
            // return surviving to here lost its home.
            Flow::Return { home, .. } => {
                Err(VmError::escaped_return(context(&self.universe.heap, home).serial).into())
            }
        }
    }

    /// Snapshot of live heap object counts.
    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        self.universe.heap_stats()
    }
}
