//! Install-time variable resolution.
//!
//! Runs once when a method is compiled into a class (or an expression into
//! a synthetic method). Every [`VarRef::Named`] is rewritten into a slot
//! reference against the enclosing frames, the receiver's instance-variable
//! layout, or the globals table, so the evaluator does no name lookup in
//! hot paths. Block literals are compiled here too: their bodies resolve
//! against the full scope chain, captured variables get a (depth, slot)
//! pair, and the literal is replaced by an index into the compiled-block
//! table.

use crate::{
    ast::{Body, Expr, SendExpr, VarRef},
    class::{BlockId, CompiledBlock},
    intern::SymbolId,
};

/// The parameter and local names of one lexical frame.
struct Scope {
    params: Vec<SymbolId>,
    locals: Vec<SymbolId>,
}

struct Resolver<'a> {
    /// Innermost scope last.
    scopes: Vec<Scope>,
    /// Instance-variable layout of the holder class, inherited prefix first.
    fields: &'a [SymbolId],
    blocks: &'a mut Vec<CompiledBlock>,
}

/// Resolves a method body against its parameters, locals, and the holder
/// class's instance-variable layout. Compiled blocks are appended to
/// `blocks`.
pub(crate) fn prepare_method(
    params: &[SymbolId],
    locals: &[SymbolId],
    body: Body,
    fields: &[SymbolId],
    blocks: &mut Vec<CompiledBlock>,
) -> Body {
    let mut resolver = Resolver {
        scopes: vec![Scope {
            params: params.to_vec(),
            locals: locals.to_vec(),
        }],
        fields,
        blocks,
    };
    resolver.body(body)
}

impl Resolver<'_> {
    fn body(&mut self, body: Body) -> Body {
        Body {
            exprs: body.exprs.into_iter().map(|e| self.expr(e)).collect(),
        }
    }

    fn expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Literal(lit) => Expr::Literal(lit),
            Expr::Variable(var) => Expr::Variable(self.var(var)),
            Expr::Assign { target, value } => Expr::Assign {
                target: self.var(target),
                value: Box::new(self.expr(*value)),
            },
            Expr::Send(send) => {
                let SendExpr {
                    receiver,
                    selector,
                    kind,
                    args,
                } = *send;
                Expr::Send(Box::new(SendExpr {
                    receiver: self.expr(receiver),
                    selector,
                    kind,
                    args: args.into_iter().map(|a| self.expr(a)).collect(),
                }))
            }
            Expr::Return(inner) => Expr::Return(Box::new(self.expr(*inner))),
            Expr::BlockLiteral(def) => {
                self.scopes.push(Scope {
                    params: def.params.clone(),
                    locals: def.locals.clone(),
                });
                let body = self.body(def.body);
                let scope = self.scopes.pop().expect("scope stack underflow");
                let id = BlockId::new(self.blocks.len());
                self.blocks.push(CompiledBlock {
                    arg_count: scope.params.len(),
                    local_count: scope.locals.len(),
                    body,
                });
                Expr::Block(id)
            }
            // Already-prepared nodes pass through untouched.
            prepared @ Expr::Block(_) => prepared,
        }
    }

    fn var(&self, var: VarRef) -> VarRef {
        let VarRef::Named(name) = var else {
            return var;
        };
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(index) = scope.params.iter().position(|&p| p == name) {
                return VarRef::Argument { depth, index };
            }
            if let Some(index) = scope.locals.iter().position(|&l| l == name) {
                return VarRef::Local {
                    depth,
                    slot: scope.params.len() + index,
                };
            }
        }
        // Later declarations shadow inherited fields of the same name.
        if let Some(index) = self.fields.iter().rposition(|&f| f == name) {
            return VarRef::Field(index);
        }
        VarRef::Global(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intern::Interns, parse};

    fn prepared(source: &str, params: &[&str], locals: &[&str], fields: &[&str]) -> (Body, Vec<CompiledBlock>) {
        let mut interns = Interns::new();
        let params: Vec<_> = params.iter().map(|n| interns.intern(n)).collect();
        let locals: Vec<_> = locals.iter().map(|n| interns.intern(n)).collect();
        let fields: Vec<_> = fields.iter().map(|n| interns.intern(n)).collect();
        let (_, body) = parse::parse_expression(source, &mut interns).unwrap();
        let mut blocks = Vec::new();
        let body = prepare_method(&params, &locals, body, &fields, &mut blocks);
        (body, blocks)
    }

    #[test]
    fn params_then_locals_then_fields_then_globals() {
        let (body, _) = prepared("p. l. f. g", &["p"], &["l"], &["f"]);
        assert_eq!(body.exprs[0], Expr::Variable(VarRef::Argument { depth: 0, index: 0 }));
        assert_eq!(body.exprs[1], Expr::Variable(VarRef::Local { depth: 0, slot: 1 }));
        assert_eq!(body.exprs[2], Expr::Variable(VarRef::Field(0)));
        assert!(matches!(body.exprs[3], Expr::Variable(VarRef::Global(_))));
    }

    #[test]
    fn locals_sit_after_params_in_the_flat_frame() {
        let (body, _) = prepared("b", &["a", "x"], &["b"], &[]);
        assert_eq!(body.exprs[0], Expr::Variable(VarRef::Local { depth: 0, slot: 2 }));
    }

    #[test]
    fn block_capture_carries_depth() {
        let (body, blocks) = prepared("[:x | x + l]", &[], &["l"], &[]);
        assert!(matches!(body.exprs[0], Expr::Block(_)));
        assert_eq!(blocks.len(), 1);
        let Expr::Send(send) = &blocks[0].body.exprs[0] else {
            panic!("expected a send in the block body")
        };
        assert_eq!(send.receiver, Expr::Variable(VarRef::Argument { depth: 0, index: 0 }));
        assert_eq!(send.args[0], Expr::Variable(VarRef::Local { depth: 1, slot: 0 }));
    }

    #[test]
    fn nested_blocks_compile_innermost_first() {
        let (_, blocks) = prepared("[ [:y | y] ]", &[], &[], &[]);
        assert_eq!(blocks.len(), 2);
        // The inner block lands at index 0, the outer at 1.
        assert_eq!(blocks[0].arg_count, 1);
        assert_eq!(blocks[1].arg_count, 0);
        assert_eq!(blocks[1].body.exprs[0], Expr::Block(BlockId::new(0)));
    }

    #[test]
    fn child_field_shadows_inherited() {
        let (body, _) = prepared("v", &[], &[], &["v", "v"]);
        assert_eq!(body.exprs[0], Expr::Variable(VarRef::Field(1)));
    }
}
