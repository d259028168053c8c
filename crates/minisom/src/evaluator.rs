//! The tree-walking evaluator.
//!
//! [`Vm`] borrows the universe's parts for the duration of one top-level
//! invocation: the heap, interner, and globals mutably, the compiled code
//! tables and core-class registry immutably. Method and block bodies are
//! frozen while code runs (classes are installed through the loader, not
//! from inside expressions), which is what lets bodies be walked while the
//! heap is mutated.
//!
//! Evaluation produces a [`Flow`]: either a plain value, or a non-local
//! return still unwinding toward its home method activation. Errors
//! short-circuit to the top-level invocation without executing further
//! statements.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    ast::{Body, Expr, Literal, SendExpr, VarRef},
    class::{CompiledBlock, CompiledMethod, MethodId},
    context::{ContextData, FrameKind, context, context_mut, home_of, lexical_at, method_of, on_sender_chain},
    error::{RunResult, VmError},
    heap::{BlockObj, Heap, HeapData, HeapId, InstanceData},
    intern::{Interns, SymbolId},
    io::PrintWriter,
    limits::ResourceLimits,
    tracer::VmTracer,
    universe::{CoreClasses, Universe, class_of},
    value::Value,
};

/// Argument vector for a send; two inline slots cover almost every selector.
pub(crate) type Args = SmallVec<[Value; 2]>;

/// The result of evaluating an expression.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Flow {
    Value(Value),
    /// A `^` from a block, unwinding until `home` is the activation being
    /// left. Every intervening activation is abandoned.
    Return { value: Value, home: HeapId },
}

/// One evaluation session over a universe.
pub(crate) struct Vm<'u> {
    pub(crate) heap: &'u mut Heap,
    pub(crate) interns: &'u mut Interns,
    pub(crate) globals: &'u mut AHashMap<SymbolId, Value>,
    pub(crate) methods: &'u [CompiledMethod],
    pub(crate) blocks: &'u [CompiledBlock],
    pub(crate) core: CoreClasses,
    pub(crate) limits: ResourceLimits,
    pub(crate) next_serial: &'u mut u64,
    pub(crate) print: &'u mut dyn PrintWriter,
    pub(crate) tracer: &'u mut dyn VmTracer,
    /// The context being executed; `None` only before the first activation.
    pub(crate) current: Option<HeapId>,
    pub(crate) depth: usize,
}

impl<'u> Vm<'u> {
    pub(crate) fn new(
        universe: &'u mut Universe,
        print: &'u mut dyn PrintWriter,
        tracer: &'u mut dyn VmTracer,
    ) -> Self {
        Self {
            heap: &mut universe.heap,
            interns: &mut universe.interns,
            globals: &mut universe.globals,
            methods: &universe.methods,
            blocks: &universe.blocks,
            core: universe.core,
            limits: universe.limits,
            next_serial: &mut universe.next_serial,
            print,
            tracer,
            current: None,
            depth: 0,
        }
    }

    fn bump_serial(&mut self) -> u64 {
        *self.next_serial += 1;
        *self.next_serial
    }

    pub(crate) fn class_of_value(&self, value: Value) -> HeapId {
        class_of(&self.core, self.heap, value)
    }

    /// Activates a source method: builds the context (receiver bound, the
    /// parameter prefix of the flat slot region filled, locals nil), walks
    /// the body, and catches a non-local return targeting this activation.
    ///
    /// A method body without an explicit `^` answers its last statement's
    /// value; an empty body answers the receiver.
    pub(crate) fn invoke_method(&mut self, id: MethodId, receiver: Value, args: &[Value]) -> RunResult<Flow> {
        if self.depth >= self.limits.max_call_depth {
            return Err(VmError::stack_overflow(self.limits.max_call_depth));
        }
        let methods = self.methods;
        let method = &methods[id.index()];
        debug_assert_eq!(method.arg_count, args.len());

        let mut slots = vec![Value::Nil; method.arg_count + method.local_count];
        slots[..args.len()].copy_from_slice(args);
        let serial = self.bump_serial();
        let ctx = self.heap.allocate(
            self.core.object,
            HeapData::Context(ContextData {
                receiver,
                kind: FrameKind::Method(id),
                slots,
                outer: None,
                sender: self.current,
                serial,
                finished: false,
            }),
        )?;

        let saved = std::mem::replace(&mut self.current, Some(ctx));
        self.depth += 1;
        let outcome = self.eval_body(&method.body, receiver);
        self.depth -= 1;
        self.current = saved;
        context_mut(self.heap, ctx).finished = true;

        match outcome? {
            Flow::Return { value, home } if home == ctx => Ok(Flow::Value(value)),
            other => Ok(other),
        }
    }

    /// Activates a block: the captured frame becomes the lexical outer, the
    /// receiver is copied from it, and a `^` in the body keeps unwinding
    /// past this frame. An empty block answers nil.
    pub(crate) fn call_block(&mut self, block: HeapId, args: &[Value], selector: &str) -> RunResult<Flow> {
        if self.depth >= self.limits.max_call_depth {
            return Err(VmError::stack_overflow(self.limits.max_call_depth));
        }
        let BlockObj { template, outer } = match self.heap.get(block) {
            HeapData::Block(block) => *block,
            other => panic!("call_block on a {}", other.type_name()),
        };
        let blocks = self.blocks;
        let tmpl = &blocks[template.index()];
        if tmpl.arg_count != args.len() {
            return Err(VmError::argument_count("Block", selector, tmpl.arg_count, args.len()));
        }

        let receiver = context(self.heap, outer).receiver;
        let mut slots = vec![Value::Nil; tmpl.arg_count + tmpl.local_count];
        slots[..args.len()].copy_from_slice(args);
        let serial = self.bump_serial();
        let ctx = self.heap.allocate(
            self.core.object,
            HeapData::Context(ContextData {
                receiver,
                kind: FrameKind::Block(template),
                slots,
                outer: Some(outer),
                sender: self.current,
                serial,
                finished: false,
            }),
        )?;

        let saved = std::mem::replace(&mut self.current, Some(ctx));
        self.depth += 1;
        let outcome = self.eval_body(&tmpl.body, Value::Nil);
        self.depth -= 1;
        self.current = saved;
        context_mut(self.heap, ctx).finished = true;

        outcome
    }

    fn eval_body(&mut self, body: &Body, default: Value) -> RunResult<Flow> {
        let mut last = default;
        for expr in &body.exprs {
            match self.eval_expr(expr)? {
                Flow::Value(value) => last = value,
                ret @ Flow::Return { .. } => return Ok(ret),
            }
        }
        Ok(Flow::Value(last))
    }

    fn eval_expr(&mut self, expr: &Expr) -> RunResult<Flow> {
        match expr {
            Expr::Literal(literal) => {
                let value = self.eval_literal(literal)?;
                Ok(Flow::Value(value))
            }
            Expr::Variable(var) => {
                let value = self.read_var(*var)?;
                Ok(Flow::Value(value))
            }
            Expr::Assign { target, value } => {
                let value = match self.eval_expr(value)? {
                    Flow::Value(value) => value,
                    ret => return Ok(ret),
                };
                self.write_var(*target, value)?;
                Ok(Flow::Value(value))
            }
            Expr::Send(send) => self.eval_send(send),
            Expr::Return(inner) => {
                let value = match self.eval_expr(inner)? {
                    Flow::Value(value) => value,
                    ret => return Ok(ret),
                };
                let current = self.current.expect("return outside any activation");
                let home = home_of(self.heap, current);
                let home_ctx = context(self.heap, home);
                // The home activation must still be an active caller; a
                // finished home, or one no longer on the sender chain, means
                // the block escaped the method that created it.
                if home_ctx.finished || !on_sender_chain(self.heap, current, home) {
                    return Err(VmError::escaped_return(home_ctx.serial));
                }
                Ok(Flow::Return { value, home })
            }
            Expr::Block(id) => {
                let outer = self.current.expect("block literal outside any activation");
                let obj = self.heap.allocate(
                    self.core.block,
                    HeapData::Block(BlockObj { template: *id, outer }),
                )?;
                Ok(Flow::Value(Value::Ref(obj)))
            }
            Expr::BlockLiteral(_) => unreachable!("block literals are compiled during preparation"),
        }
    }

    fn eval_send(&mut self, send: &SendExpr) -> RunResult<Flow> {
        let is_super = matches!(send.receiver, Expr::Variable(VarRef::Super));
        let receiver = if is_super {
            let current = self.current.expect("super send outside any activation");
            context(self.heap, current).receiver
        } else {
            match self.eval_expr(&send.receiver)? {
                Flow::Value(value) => value,
                ret => return Ok(ret),
            }
        };

        let mut args = Args::new();
        for arg in &send.args {
            match self.eval_expr(arg)? {
                Flow::Value(value) => args.push(value),
                ret => return Ok(ret),
            }
        }

        // A super send starts lookup at the superclass of the class that
        // defined the running method, not at the receiver's class.
        let start_class = if is_super {
            let current = self.current.expect("super send outside any activation");
            let mid = method_of(self.heap, current);
            let holder = self.methods[mid.index()].holder;
            match self.heap.get(holder) {
                HeapData::Class(class) => match class.superclass {
                    Some(superclass) => Some(superclass),
                    None => {
                        return Err(VmError::does_not_understand(
                            "Object",
                            self.interns.get(send.selector),
                        ));
                    }
                },
                other => panic!("method holder is a {}", other.type_name()),
            }
        } else {
            None
        };

        self.send_message(receiver, send.selector, &args, start_class)
    }

    fn eval_literal(&mut self, literal: &Literal) -> RunResult<Value> {
        match literal {
            Literal::Integer(value) => Ok(Value::Integer(*value)),
            Literal::Symbol(id) => Ok(Value::Symbol(*id)),
            Literal::String(text) => {
                let id = self.heap.allocate(self.core.string, HeapData::String(text.clone()))?;
                Ok(Value::Ref(id))
            }
            Literal::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_literal(element)?);
                }
                let id = self.heap.allocate(self.core.array, HeapData::Array(values))?;
                Ok(Value::Ref(id))
            }
        }
    }

    fn read_var(&mut self, var: VarRef) -> RunResult<Value> {
        let current = self.current.expect("variable access outside any activation");
        match var {
            VarRef::SelfRef => Ok(context(self.heap, current).receiver),
            VarRef::Argument { depth, index } => {
                let frame = lexical_at(self.heap, current, depth);
                Ok(context(self.heap, frame).get_slot(index))
            }
            VarRef::Local { depth, slot } => {
                let frame = lexical_at(self.heap, current, depth);
                Ok(context(self.heap, frame).get_slot(slot))
            }
            VarRef::Field(index) => {
                let receiver = context(self.heap, current).receiver;
                self.read_field(receiver, index)
            }
            VarRef::Global(name) => self
                .globals
                .get(&name)
                .copied()
                .ok_or_else(|| VmError::undefined_global(self.interns.get(name))),
            VarRef::Super => Err(VmError::type_mismatch("'super' may only be used as a message receiver")),
            VarRef::Named(_) => unreachable!("names are resolved during preparation"),
        }
    }

    fn write_var(&mut self, target: VarRef, value: Value) -> RunResult<()> {
        let current = self.current.expect("variable access outside any activation");
        match target {
            VarRef::Argument { depth, index } => {
                let frame = lexical_at(self.heap, current, depth);
                context_mut(self.heap, frame).set_slot(index, value);
                Ok(())
            }
            VarRef::Local { depth, slot } => {
                let frame = lexical_at(self.heap, current, depth);
                context_mut(self.heap, frame).set_slot(slot, value);
                Ok(())
            }
            VarRef::Field(index) => {
                let receiver = context(self.heap, current).receiver;
                self.write_field(receiver, index, value)
            }
            // Top-level variables live in the globals table.
            VarRef::Global(name) => {
                self.globals.insert(name, value);
                Ok(())
            }
            VarRef::SelfRef | VarRef::Super => unreachable!("the parser rejects assignment to self and super"),
            VarRef::Named(_) => unreachable!("names are resolved during preparation"),
        }
    }

    fn read_field(&self, receiver: Value, index: usize) -> RunResult<Value> {
        if let Value::Ref(id) = receiver
            && let HeapData::Instance(instance) = self.heap.get(id)
        {
            return Ok(instance.fields[index]);
        }
        Err(VmError::type_mismatch("receiver has no instance variable slots"))
    }

    fn write_field(&mut self, receiver: Value, index: usize, value: Value) -> RunResult<()> {
        if let Value::Ref(id) = receiver
            && let HeapData::Instance(instance) = self.heap.get_mut(id)
        {
            instance.fields[index] = value;
            return Ok(());
        }
        Err(VmError::type_mismatch("receiver has no instance variable slots"))
    }

    /// Allocates an instance of `class` with every slot initialised to nil.
    pub(crate) fn allocate_instance(&mut self, class: HeapId, field_count: usize) -> RunResult<Value> {
        let id = self.heap.allocate(
            class,
            HeapData::Instance(InstanceData {
                fields: vec![Value::Nil; field_count],
            }),
        )?;
        Ok(Value::Ref(id))
    }

    /// Allocates a heap string with the String class.
    pub(crate) fn allocate_string(&mut self, text: impl Into<Box<str>>) -> RunResult<Value> {
        let id = self.heap.allocate(self.core.string, HeapData::String(text.into()))?;
        Ok(Value::Ref(id))
    }
}
