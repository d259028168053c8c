//! Recursive-descent parser for SOM-family syntax.
//!
//! Entry points: [`parse_class`] for a class source file and
//! [`parse_expression`] for a top-level expression (the launcher's `-e`
//! path). Precedence is the usual unary > binary > keyword. The parser
//! interns identifiers and selectors as it goes, so downstream passes only
//! see [`SymbolId`]s.
//!
//! Where the surface syntax is ambiguous the parser reports an error naming
//! the offending token instead of guessing; in particular a `----` separator
//! anywhere but between the instance and class sides, and class-side
//! variable lists, are rejected outright.

use std::fmt;

use crate::{
    ast::{Body, ClassDef, Expr, Literal, MethodDef, SendExpr, SendKind, VarRef},
    intern::{Interns, SymbolId},
    lex::{Token, TokenKind, tokenize},
};

/// A syntax error with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses a class definition source file.
pub(crate) fn parse_class(source: &str, interns: &mut Interns) -> Result<ClassDef, ParseError> {
    let mut parser = Parser::new(source, interns)?;
    let class = parser.class_def()?;
    parser.expect_eof()?;
    Ok(class)
}

/// Parses a top-level expression body: optional `| locals |` then statements.
pub(crate) fn parse_expression(source: &str, interns: &mut Interns) -> Result<(Vec<SymbolId>, Body), ParseError> {
    let mut parser = Parser::new(source, interns)?;
    let locals = parser.var_list()?;
    let body = parser.statements(&TokenKind::Eof)?;
    parser.expect_eof()?;
    Ok((locals, body))
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interns: &'a mut Interns,
}

impl<'a> Parser<'a> {
    fn new(source: &str, interns: &'a mut Interns) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            interns,
        })
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_second(&self) -> &TokenKind {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let tok = &self.tokens[self.pos];
        ParseError {
            line: tok.line,
            column: tok.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {kind} {context}, found {}", self.peek())))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek(), TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error(format!("expected end of input, found {}", self.peek())))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek() {
            TokenKind::Identifier(_) => {
                let TokenKind::Identifier(name) = self.advance() else {
                    unreachable!()
                };
                Ok(name)
            }
            other => Err(self.error(format!("expected an identifier {context}, found {other}"))),
        }
    }

    // === class definitions ===

    fn class_def(&mut self) -> Result<ClassDef, ParseError> {
        let name = self.expect_identifier("as the class name")?;
        let name = self.interns.intern(&name);
        self.expect(&TokenKind::Operator("=".to_owned()), "after the class name")?;

        let superclass = if matches!(self.peek(), TokenKind::Identifier(_)) {
            let sup = self.expect_identifier("as the superclass name")?;
            Some(self.interns.intern(&sup))
        } else {
            None
        };

        self.expect(&TokenKind::LParen, "to open the class body")?;
        let fields = self.var_list()?;

        let mut instance_methods = Vec::new();
        let mut class_methods = Vec::new();
        let mut class_side = false;
        loop {
            match self.peek() {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Separator => {
                    if class_side {
                        return Err(self.error("'----' may appear only once, between instance and class sides"));
                    }
                    self.advance();
                    if matches!(self.peek(), TokenKind::Vertical) {
                        return Err(self.error("class-side variable lists are not supported"));
                    }
                    class_side = true;
                }
                TokenKind::Eof => return Err(self.error("unterminated class body")),
                _ => {
                    let method = self.method_def()?;
                    if class_side {
                        class_methods.push(method);
                    } else {
                        instance_methods.push(method);
                    }
                }
            }
        }

        Ok(ClassDef {
            name,
            superclass,
            fields,
            instance_methods,
            class_methods,
        })
    }

    fn method_def(&mut self) -> Result<MethodDef, ParseError> {
        let (selector, params) = self.method_pattern()?;
        self.expect(&TokenKind::Operator("=".to_owned()), "after the method pattern")?;
        if matches!(self.peek(), TokenKind::Identifier(name) if name == "primitive") {
            return Err(self.error("primitive method bodies are not supported"));
        }
        self.expect(&TokenKind::LParen, "to open the method body")?;
        let locals = self.var_list()?;
        self.check_distinct(&params, &locals)?;
        let body = self.statements(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen, "to close the method body")?;
        Ok(MethodDef {
            selector,
            params,
            locals,
            body,
        })
    }

    fn method_pattern(&mut self) -> Result<(SymbolId, Vec<SymbolId>), ParseError> {
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((self.interns.intern(&name), Vec::new()))
            }
            TokenKind::Keyword(_) => {
                let mut selector = String::new();
                let mut params = Vec::new();
                while let TokenKind::Keyword(part) = self.peek().clone() {
                    self.advance();
                    selector.push_str(&part);
                    let param = self.expect_identifier("as a parameter name")?;
                    params.push(self.interns.intern(&param));
                }
                self.check_no_duplicates(&params, "parameter")?;
                Ok((self.interns.intern(&selector), params))
            }
            TokenKind::Operator(op) => {
                self.advance();
                let param = self.expect_identifier("as the operand name")?;
                Ok((self.interns.intern(&op), vec![self.interns.intern(&param)]))
            }
            other => Err(self.error(format!("expected a method pattern, found {other}"))),
        }
    }

    /// Parses an optional `| name name |` list.
    fn var_list(&mut self) -> Result<Vec<SymbolId>, ParseError> {
        if !self.eat(&TokenKind::Vertical) {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        while matches!(self.peek(), TokenKind::Identifier(_)) {
            let name = self.expect_identifier("in the variable list")?;
            names.push(self.interns.intern(&name));
        }
        self.expect(&TokenKind::Vertical, "to close the variable list")?;
        self.check_no_duplicates(&names, "variable")?;
        Ok(names)
    }

    fn check_no_duplicates(&self, names: &[SymbolId], what: &str) -> Result<(), ParseError> {
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(self.error(format!("duplicate {what} '{}'", self.interns.get(*name))));
            }
        }
        Ok(())
    }

    fn check_distinct(&self, params: &[SymbolId], locals: &[SymbolId]) -> Result<(), ParseError> {
        for local in locals {
            if params.contains(local) {
                return Err(self.error(format!(
                    "local '{}' shadows a parameter of the same method",
                    self.interns.get(*local)
                )));
            }
        }
        Ok(())
    }

    // === statements and expressions ===

    fn statements(&mut self, terminator: &TokenKind) -> Result<Body, ParseError> {
        let mut exprs = Vec::new();
        loop {
            if self.peek() == terminator || matches!(self.peek(), TokenKind::Eof) {
                break;
            }
            let expr = if self.eat(&TokenKind::Caret) {
                Expr::Return(Box::new(self.expression()?))
            } else {
                self.expression()?
            };
            exprs.push(expr);
            // `.` separates statements; a trailing one before the terminator is fine.
            if !self.eat(&TokenKind::Period) {
                break;
            }
        }
        Ok(Body { exprs })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), TokenKind::Identifier(_)) && matches!(self.peek_second(), TokenKind::Assign) {
            let name = self.expect_identifier("as an assignment target")?;
            if name == "self" || name == "super" {
                return Err(self.error(format!("cannot assign to '{name}'")));
            }
            self.advance(); // :=
            let value = self.expression()?;
            return Ok(Expr::Assign {
                target: VarRef::Named(self.interns.intern(&name)),
                value: Box::new(value),
            });
        }
        self.keyword_send()
    }

    fn keyword_send(&mut self) -> Result<Expr, ParseError> {
        let receiver = self.binary_send()?;
        if !matches!(self.peek(), TokenKind::Keyword(_)) {
            return Ok(receiver);
        }
        let mut selector = String::new();
        let mut args = Vec::new();
        while let TokenKind::Keyword(part) = self.peek().clone() {
            self.advance();
            selector.push_str(&part);
            args.push(self.binary_send()?);
        }
        Ok(Expr::Send(Box::new(SendExpr {
            receiver,
            selector: self.interns.intern(&selector),
            kind: SendKind::Keyword,
            args,
        })))
    }

    fn binary_send(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary_send()?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(op) => op.clone(),
                TokenKind::Vertical => "|".to_owned(),
                _ => break,
            };
            self.advance();
            let rhs = self.unary_send()?;
            lhs = Expr::Send(Box::new(SendExpr {
                receiver: lhs,
                selector: self.interns.intern(&op),
                kind: SendKind::Binary,
                args: vec![rhs],
            }));
        }
        Ok(lhs)
    }

    fn unary_send(&mut self) -> Result<Expr, ParseError> {
        let mut receiver = self.primary()?;
        while matches!(self.peek(), TokenKind::Identifier(_)) {
            let selector = self.expect_identifier("as a unary selector")?;
            receiver = Expr::Send(Box::new(SendExpr {
                receiver,
                selector: self.interns.intern(&selector),
                kind: SendKind::Unary,
                args: Vec::new(),
            }));
        }
        Ok(receiver)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(match name.as_str() {
                    "self" => Expr::Variable(VarRef::SelfRef),
                    "super" => Expr::Variable(VarRef::Super),
                    _ => Expr::Variable(VarRef::Named(self.interns.intern(&name))),
                })
            }
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(value)))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(text.into())))
            }
            TokenKind::SymbolLit(text) => {
                self.advance();
                Ok(Expr::Literal(Literal::Symbol(self.interns.intern(&text))))
            }
            TokenKind::PoundParen => {
                self.advance();
                let elements = self.array_elements()?;
                Ok(Expr::Literal(Literal::Array(elements)))
            }
            TokenKind::LBracket => self.block_literal(),
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "to close the parenthesised expression")?;
                Ok(expr)
            }
            TokenKind::Separator => Err(self.error("'----' is only valid between instance and class sides")),
            other => Err(self.error(format!("expected an expression, found {other}"))),
        }
    }

    fn array_elements(&mut self) -> Result<Vec<Literal>, ParseError> {
        let mut elements = Vec::new();
        loop {
            match self.peek().clone() {
                TokenKind::RParen => {
                    self.advance();
                    return Ok(elements);
                }
                TokenKind::Integer(value) => {
                    self.advance();
                    elements.push(Literal::Integer(value));
                }
                TokenKind::Str(text) => {
                    self.advance();
                    elements.push(Literal::String(text.into()));
                }
                TokenKind::SymbolLit(text) => {
                    self.advance();
                    elements.push(Literal::Symbol(self.interns.intern(&text)));
                }
                // Bare identifiers inside an array literal are symbols.
                TokenKind::Identifier(name) => {
                    self.advance();
                    elements.push(Literal::Symbol(self.interns.intern(&name)));
                }
                TokenKind::PoundParen => {
                    self.advance();
                    elements.push(Literal::Array(self.array_elements()?));
                }
                other => return Err(self.error(format!("expected an array element, found {other}"))),
            }
        }
    }

    fn block_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBracket, "to open the block")?;
        let mut params = Vec::new();
        while self.eat(&TokenKind::Colon) {
            let param = self.expect_identifier("as a block parameter")?;
            params.push(self.interns.intern(&param));
        }
        self.check_no_duplicates(&params, "block parameter")?;
        if !params.is_empty() {
            self.expect(&TokenKind::Vertical, "after the block parameters")?;
        }
        let locals = self.var_list()?;
        self.check_distinct(&params, &locals)?;
        let body = self.statements(&TokenKind::RBracket)?;
        self.expect(&TokenKind::RBracket, "to close the block")?;
        Ok(Expr::BlockLiteral(Box::new(crate::ast::BlockDef {
            params,
            locals,
            body,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Literal, SendKind, VarRef};

    fn parse_one(source: &str) -> Expr {
        let mut interns = Interns::new();
        let (locals, mut body) = parse_expression(source, &mut interns).unwrap();
        assert!(locals.is_empty());
        assert_eq!(body.exprs.len(), 1);
        body.exprs.pop().unwrap()
    }

    #[test]
    fn precedence_unary_binary_keyword() {
        // `1 + 2 max: 3 negated` parses as `(1 + 2) max: (3 negated)`.
        let Expr::Send(kw) = parse_one("1 + 2 max: 3 negated") else {
            panic!("expected a keyword send")
        };
        assert_eq!(kw.kind, SendKind::Keyword);
        let Expr::Send(bin) = &kw.receiver else {
            panic!("expected a binary receiver")
        };
        assert_eq!(bin.kind, SendKind::Binary);
        let Expr::Send(unary) = &kw.args[0] else {
            panic!("expected a unary argument")
        };
        assert_eq!(unary.kind, SendKind::Unary);
    }

    #[test]
    fn assignment_chains_right() {
        let Expr::Assign { value, .. } = parse_one("a := b := 3") else {
            panic!("expected an assignment")
        };
        assert!(matches!(*value, Expr::Assign { .. }));
    }

    #[test]
    fn self_and_super_are_recognised() {
        assert_eq!(parse_one("self"), Expr::Variable(VarRef::SelfRef));
        let Expr::Send(send) = parse_one("super show") else {
            panic!("expected a send")
        };
        assert_eq!(send.receiver, Expr::Variable(VarRef::Super));
    }

    #[test]
    fn array_literal_idents_become_symbols() {
        let Expr::Literal(Literal::Array(elements)) = parse_one("#(1 two 'three')") else {
            panic!("expected an array literal")
        };
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[1], Literal::Symbol(_)));
    }

    #[test]
    fn block_with_params_and_locals() {
        let Expr::BlockLiteral(block) = parse_one("[:x :y | | sum | sum := x + y. sum]") else {
            panic!("expected a block literal")
        };
        assert_eq!(block.params.len(), 2);
        assert_eq!(block.locals.len(), 1);
        assert_eq!(block.body.exprs.len(), 2);
    }

    #[test]
    fn class_with_both_sides() {
        let mut interns = Interns::new();
        let source = "Point = Object ( | x y |\n  x = ( ^x )\n  setX: a y: b = ( x := a. y := b. ^self )\n  ----\n  origin = ( ^Point new )\n)";
        let class = parse_class(source, &mut interns).unwrap();
        assert_eq!(interns.get(class.name), "Point");
        assert_eq!(class.fields.len(), 2);
        assert_eq!(class.instance_methods.len(), 2);
        assert_eq!(class.class_methods.len(), 1);
        assert_eq!(interns.get(class.instance_methods[1].selector), "setX:y:");
    }

    #[test]
    fn class_without_superclass_defaults_later() {
        let mut interns = Interns::new();
        let class = parse_class("Thing = ( run = ( ^1 ) )", &mut interns).unwrap();
        assert!(class.superclass.is_none());
    }

    #[test]
    fn stray_separator_is_flagged() {
        let mut interns = Interns::new();
        let err = parse_expression("1 + ----", &mut interns).unwrap_err();
        assert!(err.message.contains("----"));
    }

    #[test]
    fn double_separator_is_flagged() {
        let mut interns = Interns::new();
        let err = parse_class("A = ( ---- ---- )", &mut interns).unwrap_err();
        assert!(err.message.contains("only once"));
    }

    #[test]
    fn class_side_variables_are_flagged() {
        let mut interns = Interns::new();
        let err = parse_class("A = ( ---- | v | )", &mut interns).unwrap_err();
        assert!(err.message.contains("not supported"));
    }

    #[test]
    fn assignment_to_self_is_flagged() {
        let mut interns = Interns::new();
        let err = parse_expression("self := 3", &mut interns).unwrap_err();
        assert!(err.message.contains("cannot assign"));
    }

    #[test]
    fn trailing_period_is_permitted() {
        let mut interns = Interns::new();
        let (_, body) = parse_expression("3 + 4.", &mut interns).unwrap();
        assert_eq!(body.exprs.len(), 1);
    }

    #[test]
    fn duplicate_parameters_are_flagged() {
        let mut interns = Interns::new();
        let err = parse_class("A = ( at: x put: x = ( ^x ) )", &mut interns).unwrap_err();
        assert!(err.message.contains("duplicate parameter"));
    }
}
