//! Typed-node traversal.
//!
//! [`visit_types_mut`] visits every type slot of a package in pre-order:
//! a node's own slot first, then its children in this fixed order:
//!
//! | node        | children                                  |
//! |-------------|-------------------------------------------|
//! | array       | elements                                  |
//! | dict        | key, value of each item                   |
//! | function    | parameter defaults, body                  |
//! | object      | `with` identifier, property values        |
//! | member      | object                                    |
//! | index       | array, index                              |
//! | binary      | left, right                               |
//! | unary       | argument                                  |
//! | call        | callee, argument values, pipe             |
//! | logical     | left, right                               |
//! | conditional | test, consequent, alternate               |
//! | string      | interpolated parts                        |
//!
//! Inference reserves type slots in the same order.

use std::sync::Arc;

use sluice_types::MonoType;

use crate::nodes::{Expr, FunctionBody, Package, Statement, StringExprPart};

pub fn visit_types_mut(pkg: &mut Package, f: &mut impl FnMut(&mut MonoType)) {
    visit_statements(&mut pkg.body, f);
}

fn visit_statements(body: &mut [Statement], f: &mut impl FnMut(&mut MonoType)) {
    for stmt in body {
        match stmt {
            Statement::Expr(s) => visit_expr(&mut s.expression, f),
            Statement::Variable(s) => visit_expr(&mut s.init, f),
            Statement::Option(s) => visit_expr(&mut s.init, f),
            Statement::Return(s) => visit_expr(&mut s.argument, f),
        }
    }
}

pub fn visit_expr(e: &mut Expr, f: &mut impl FnMut(&mut MonoType)) {
    sluice_stack::ensure_sufficient_stack(|| visit_expr_inner(e, f));
}

fn visit_expr_inner(e: &mut Expr, f: &mut impl FnMut(&mut MonoType)) {
    match e {
        Expr::Identifier(id) => f(&mut id.typ),
        Expr::Array(a) => {
            f(&mut a.typ);
            for el in &mut a.elements {
                visit_expr(el, f);
            }
        }
        Expr::Dict(d) => {
            f(&mut d.typ);
            for item in &mut d.elements {
                visit_expr(&mut item.key, f);
                visit_expr(&mut item.val, f);
            }
        }
        Expr::Function(func) => {
            let func = Arc::make_mut(func);
            f(&mut func.typ);
            for p in &mut func.params {
                if let Some(default) = &mut p.default {
                    visit_expr(default, f);
                }
            }
            match &mut func.body {
                FunctionBody::Expr(body) => visit_expr(body, f),
                FunctionBody::Block(block) => visit_statements(&mut block.body, f),
            }
        }
        Expr::Object(o) => {
            f(&mut o.typ);
            if let Some(with) = &mut o.with {
                f(&mut with.typ);
            }
            for p in &mut o.properties {
                visit_expr(&mut p.value, f);
            }
        }
        Expr::Member(m) => {
            f(&mut m.typ);
            visit_expr(&mut m.object, f);
        }
        Expr::Index(ix) => {
            f(&mut ix.typ);
            visit_expr(&mut ix.array, f);
            visit_expr(&mut ix.index, f);
        }
        Expr::Binary(b) => {
            f(&mut b.typ);
            visit_expr(&mut b.left, f);
            visit_expr(&mut b.right, f);
        }
        Expr::Unary(u) => {
            f(&mut u.typ);
            visit_expr(&mut u.argument, f);
        }
        Expr::Call(c) => {
            f(&mut c.typ);
            visit_expr(&mut c.callee, f);
            for arg in &mut c.arguments {
                visit_expr(&mut arg.value, f);
            }
            if let Some(pipe) = &mut c.pipe {
                visit_expr(pipe, f);
            }
        }
        Expr::Logical(l) => {
            visit_expr(&mut l.left, f);
            visit_expr(&mut l.right, f);
        }
        Expr::Conditional(c) => {
            visit_expr(&mut c.test, f);
            visit_expr(&mut c.consequent, f);
            visit_expr(&mut c.alternate, f);
        }
        Expr::StringExpr(s) => {
            for part in &mut s.parts {
                if let StringExprPart::Interpolated(e) = part {
                    visit_expr(e, f);
                }
            }
        }
        Expr::Integer(_)
        | Expr::Uint(_)
        | Expr::Float(_)
        | Expr::StringLit(_)
        | Expr::Boolean(_)
        | Expr::Duration(_)
        | Expr::DateTime(_)
        | Expr::Regexp(_) => {}
    }
}
