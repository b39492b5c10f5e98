//! Printing nodes back to source form.
//!
//! Binary and logical operands are parenthesized only when the child binds
//! more loosely than its parent (or equally, on the right-hand side).

use std::fmt;

use chrono::SecondsFormat;

use crate::nodes::{
    Block, Expr, FunctionBody, FunctionExpr, Package, Property, Statement, StringExprPart,
};

const INDENT: &str = "    ";

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn statements(&mut self, body: &[Statement]) {
        for (i, stmt) in body.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Expr(s) => self.expr(&s.expression),
            Statement::Variable(s) => {
                self.push(s.id.name.as_str());
                self.push(" = ");
                self.expr(&s.init);
            }
            Statement::Option(s) => {
                self.push("option ");
                self.push(s.id.name.as_str());
                self.push(" = ");
                self.expr(&s.init);
            }
            Statement::Return(s) => {
                self.push("return ");
                self.expr(&s.argument);
            }
        }
    }

    /// Print `child`, parenthesized when it binds looser than `min`.
    fn operand(&mut self, child: &Expr, min: u8) {
        if child.precedence() < min {
            self.push("(");
            self.expr(child);
            self.push(")");
        } else {
            self.expr(child);
        }
    }

    fn expr(&mut self, e: &Expr) {
        sluice_stack::ensure_sufficient_stack(|| self.expr_inner(e));
    }

    fn expr_inner(&mut self, e: &Expr) {
        match e {
            Expr::Identifier(id) => self.push(id.name.as_str()),
            Expr::Array(a) => {
                self.push("[");
                for (i, el) in a.elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(el);
                }
                self.push("]");
            }
            Expr::Dict(d) => {
                if d.elements.is_empty() {
                    self.push("[:]");
                    return;
                }
                self.push("[");
                for (i, item) in d.elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(&item.key);
                    self.push(": ");
                    self.expr(&item.val);
                }
                self.push("]");
            }
            Expr::Function(f) => self.function(f),
            Expr::Logical(l) => {
                let prec = l.op.precedence();
                self.operand(&l.left, prec);
                self.push(" ");
                self.push(l.op.as_symbol());
                self.push(" ");
                self.operand(&l.right, prec + 1);
            }
            Expr::Object(o) => {
                self.push("{");
                if let Some(with) = &o.with {
                    self.push(with.name.as_str());
                    self.push(" with ");
                }
                self.properties(&o.properties);
                self.push("}");
            }
            Expr::Member(m) => {
                self.operand(&m.object, 10);
                if is_identifier(m.property.as_str()) {
                    self.push(".");
                    self.push(m.property.as_str());
                } else {
                    self.push("[");
                    self.string_literal(m.property.as_str());
                    self.push("]");
                }
            }
            Expr::Index(ix) => {
                self.operand(&ix.array, 10);
                self.push("[");
                self.expr(&ix.index);
                self.push("]");
            }
            Expr::Binary(b) => {
                let prec = b.op.precedence();
                self.operand(&b.left, prec);
                self.push(" ");
                self.push(b.op.as_symbol());
                self.push(" ");
                self.operand(&b.right, prec + 1);
            }
            Expr::Unary(u) => {
                self.push(u.op.as_symbol());
                self.operand(&u.argument, u.op.precedence());
            }
            Expr::Call(c) => {
                if let Some(pipe) = &c.pipe {
                    self.operand(pipe, 9);
                    self.push(" |> ");
                }
                self.operand(&c.callee, 10);
                self.push("(");
                self.properties(&c.arguments);
                self.push(")");
            }
            Expr::Conditional(c) => {
                self.push("if ");
                self.expr(&c.test);
                self.push(" then ");
                self.expr(&c.consequent);
                self.push(" else ");
                self.expr(&c.alternate);
            }
            Expr::StringExpr(s) => {
                self.push("\"");
                for part in &s.parts {
                    match part {
                        StringExprPart::Text(text) => self.escaped(text, true),
                        StringExprPart::Interpolated(e) => {
                            self.push("${");
                            self.expr(e);
                            self.push("}");
                        }
                    }
                }
                self.push("\"");
            }
            Expr::Integer(lit) => self.push(&lit.value.to_string()),
            Expr::Uint(lit) => self.push(&format!("uint(v: {})", lit.value)),
            Expr::Float(lit) => self.push(&format_float(lit.value)),
            Expr::StringLit(lit) => self.string_literal(&lit.value),
            Expr::Boolean(lit) => self.push(if lit.value { "true" } else { "false" }),
            Expr::Duration(lit) => self.push(&lit.value.to_string()),
            Expr::DateTime(lit) => {
                self.push(&lit.value.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            }
            Expr::Regexp(lit) => self.push(&lit.value.to_string()),
        }
    }

    fn properties(&mut self, props: &[Property]) {
        for (i, p) in props.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if is_identifier(p.key.name.as_str()) {
                self.push(p.key.name.as_str());
            } else {
                self.string_literal(p.key.name.as_str());
            }
            self.push(": ");
            self.expr(&p.value);
        }
    }

    fn function(&mut self, f: &FunctionExpr) {
        self.push("(");
        for (i, p) in f.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(p.key.name.as_str());
            if p.is_pipe {
                self.push("=<-");
            } else if let Some(default) = &p.default {
                self.push("=");
                self.expr(default);
            }
        }
        self.push(") => ");
        match &f.body {
            // A bare record body would read as a block.
            FunctionBody::Expr(body @ Expr::Object(_)) => {
                self.push("(");
                self.expr(body);
                self.push(")");
            }
            FunctionBody::Expr(body) => self.expr(body),
            FunctionBody::Block(block) => self.block(block),
        }
    }

    fn block(&mut self, block: &Block) {
        self.push("{");
        self.indent += 1;
        self.newline();
        self.statements(&block.body);
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn string_literal(&mut self, s: &str) {
        self.push("\"");
        self.escaped(s, false);
        self.push("\"");
    }

    fn escaped(&mut self, s: &str, interpolated: bool) {
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => self.push("\\\""),
                '\\' => self.push("\\\\"),
                '\n' => self.push("\\n"),
                '\t' => self.push("\\t"),
                '$' if interpolated && chars.peek() == Some(&'{') => self.push("\\$"),
                c => self.out.push(c),
            }
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Floats always print with a decimal point or exponent.
fn format_float(v: f64) -> String {
    format!("{v:?}")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::new();
        p.expr(self);
        f.write_str(&p.out)
    }
}

impl fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::new();
        p.function(self);
        f.write_str(&p.out)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::new();
        p.statement(self);
        f.write_str(&p.out)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::new();
        p.statements(&self.body);
        f.write_str(&p.out)
    }
}
