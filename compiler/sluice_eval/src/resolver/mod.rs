//! Resolving runtime values back into expressions.
//!
//! A closure is resolved by rewriting its body so it no longer depends on
//! the scope it captured: every free identifier is replaced by a literal
//! for its current value, recursively for captured closures. Names bound
//! inside the function (parameters, the implicit `<-`, block assignments
//! and the parameters of nested functions) are left alone, as are pure
//! builtins. The result is a self-contained expression that can be shipped
//! elsewhere and executed without this runtime.
//!
//! Resolution fails with `NotResolvable` when a value has no literal form
//! (null, bytes, vectors), when a side-effecting builtin is captured or
//! called, when a free name is not bound in the captured scope, and when a
//! closure reaches itself through what it captured (only possible through
//! an option that was rebound to the closure).
//!
//! Every rewritten node keeps the type inference assigned to the original.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use sluice_diagnostic::{Error, Result};
use sluice_ir::{SourceLocation, Symbol, PIPE_PLACEHOLDER};
use sluice_semantic::{
    ArrayExpr, BinaryExpr, Block, BooleanLit, CallExpr, ConditionalExpr, DateTimeLit, DictExpr,
    DictItem, DurationLit, Expr, ExprStatement, FloatLit, FunctionBody, FunctionExpr,
    FunctionParameter, Identifier, IdentifierExpr, IndexExpr, IntegerLit, LogicalExpr,
    MemberExpr, ObjectExpr, OptionStatement, Property, RegexpLit, ReturnStatement, Statement,
    StringExpr, StringExprPart, StringLit, UintLit, UnaryExpr, VariableAssgn,
};

use crate::scope::Scope;
use crate::value::{Function, UserFunction, Value};

/// Express `value` as a self-contained expression.
pub fn resolve(value: &Value) -> Result<Expr> {
    value_to_expr(value, &SourceLocation::default(), &mut FxHashSet::default())
}

/// Resolve a user closure into a function literal.
pub fn resolve_function(f: &UserFunction) -> Result<FunctionExpr> {
    resolve_user(f, &mut FxHashSet::default())
}

/// Closures currently being resolved, by address.
type Active = FxHashSet<*const UserFunction>;

#[tracing::instrument(level = "debug", skip_all, fields(params = f.expr.params.len()))]
fn resolve_user(f: &UserFunction, active: &mut Active) -> Result<FunctionExpr> {
    let addr = std::ptr::from_ref(f);
    if !active.insert(addr) {
        return Err(Error::not_resolvable(
            "function refers to itself through its captured scope",
        ));
    }
    let mut resolver = Resolver {
        scope: &f.scope,
        locals: Vec::new(),
        active: &mut *active,
    };
    let result = resolver.function(&f.expr);
    active.remove(&addr);
    result
}

fn value_to_expr(value: &Value, loc: &SourceLocation, active: &mut Active) -> Result<Expr> {
    let loc = loc.clone();
    let expr = match value {
        Value::Bool(b) => Expr::Boolean(BooleanLit { loc, value: *b }),
        Value::Int(n) => Expr::Integer(IntegerLit { loc, value: *n }),
        Value::UInt(n) => Expr::Uint(UintLit { loc, value: *n }),
        Value::Float(n) => Expr::Float(FloatLit { loc, value: *n }),
        Value::String(s) => Expr::StringLit(StringLit {
            loc,
            value: s.to_string(),
        }),
        Value::Duration(d) => Expr::Duration(DurationLit { loc, value: *d }),
        Value::Time(t) => Expr::DateTime(DateTimeLit { loc, value: *t }),
        Value::Regexp(r) => Expr::Regexp(RegexpLit {
            loc,
            value: r.clone(),
        }),
        Value::Null(ty) => {
            return Err(Error::not_resolvable(format!(
                "a null {ty} has no literal form"
            ))
            .at(&loc));
        }
        Value::Bytes(_) | Value::Vector(_) => {
            return Err(Error::not_resolvable(format!(
                "a {} value has no literal form",
                value.type_name()
            ))
            .at(&loc));
        }
        Value::Array(a) => {
            let mut elements = Vec::with_capacity(a.len());
            for el in &a.elements {
                elements.push(value_to_expr(el, &loc, active)?);
            }
            Expr::Array(Box::new(ArrayExpr {
                loc,
                elements,
                typ: a.ty.clone(),
            }))
        }
        Value::Object(o) => {
            let mut properties = Vec::with_capacity(o.properties().len());
            for (name, v) in o.properties() {
                properties.push(property(name.clone(), value_to_expr(v, &loc, active)?, &loc));
            }
            Expr::Object(Box::new(ObjectExpr {
                loc,
                with: None,
                properties,
                typ: o.ty().clone(),
            }))
        }
        Value::Dict(d) => {
            let mut elements = Vec::with_capacity(d.len());
            for (k, v) in d.entries() {
                elements.push(DictItem {
                    key: value_to_expr(k, &loc, active)?,
                    val: value_to_expr(v, &loc, active)?,
                });
            }
            Expr::Dict(Box::new(DictExpr {
                loc,
                elements,
                typ: d.ty.clone(),
            }))
        }
        Value::Function(Function::User(f)) => {
            let mut resolved = resolve_user(f, active)?;
            resolved.loc = loc;
            Expr::Function(Arc::new(resolved))
        }
        Value::Function(Function::Builtin(b)) => {
            if b.side_effect {
                return Err(Error::not_resolvable(format!(
                    "builtin {} has side effects",
                    b.name
                ))
                .at(&loc));
            }
            Expr::Identifier(IdentifierExpr {
                loc,
                name: b.name.clone(),
                typ: b.ty.clone(),
            })
        }
    };
    Ok(expr)
}

fn property(name: Symbol, value: Expr, loc: &SourceLocation) -> Property {
    Property {
        loc: loc.clone(),
        key: Identifier {
            loc: loc.clone(),
            name,
        },
        value,
    }
}

struct Resolver<'a> {
    scope: &'a Scope,
    /// Names bound inside the function being resolved, one set per nested
    /// function.
    locals: Vec<FxHashSet<Symbol>>,
    active: &'a mut Active,
}

impl Resolver<'_> {
    fn is_local(&self, name: &str) -> bool {
        self.locals.iter().any(|names| names.contains(name))
    }

    fn bind_local(&mut self, name: &Symbol) {
        if let Some(names) = self.locals.last_mut() {
            names.insert(name.clone());
        }
    }

    fn function(&mut self, f: &FunctionExpr) -> Result<FunctionExpr> {
        let mut names: FxHashSet<Symbol> = f.params.iter().map(|p| p.key.name.clone()).collect();
        names.insert(Symbol::new(PIPE_PLACEHOLDER));
        self.locals.push(names);
        let result = self.function_inner(f);
        self.locals.pop();
        result
    }

    fn function_inner(&mut self, f: &FunctionExpr) -> Result<FunctionExpr> {
        let mut params = Vec::with_capacity(f.params.len());
        for p in &f.params {
            let default = match &p.default {
                Some(d) => Some(self.expr(d)?),
                None => None,
            };
            params.push(FunctionParameter {
                default,
                ..p.clone()
            });
        }
        let body = match &f.body {
            FunctionBody::Expr(e) => FunctionBody::Expr(self.expr(e)?),
            FunctionBody::Block(block) => FunctionBody::Block(self.block(block)?),
        };
        Ok(FunctionExpr {
            loc: f.loc.clone(),
            params,
            body,
            typ: f.typ.clone(),
        })
    }

    fn block(&mut self, block: &Block) -> Result<Block> {
        let mut body = Vec::with_capacity(block.body.len());
        for stmt in &block.body {
            let stmt = match stmt {
                Statement::Expr(s) => Statement::Expr(ExprStatement {
                    loc: s.loc.clone(),
                    expression: self.expr(&s.expression)?,
                }),
                Statement::Variable(v) => {
                    let init = self.expr(&v.init)?;
                    self.bind_local(&v.id.name);
                    Statement::Variable(Box::new(VariableAssgn {
                        loc: v.loc.clone(),
                        id: v.id.clone(),
                        init,
                    }))
                }
                Statement::Option(o) => {
                    let init = self.expr(&o.init)?;
                    self.bind_local(&o.id.name);
                    Statement::Option(Box::new(OptionStatement {
                        loc: o.loc.clone(),
                        id: o.id.clone(),
                        init,
                    }))
                }
                Statement::Return(r) => Statement::Return(ReturnStatement {
                    loc: r.loc.clone(),
                    argument: self.expr(&r.argument)?,
                }),
            };
            body.push(stmt);
        }
        Ok(Block {
            loc: block.loc.clone(),
            body,
        })
    }

    fn exprs(&mut self, exprs: &[Expr]) -> Result<Vec<Expr>> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn properties(&mut self, props: &[Property]) -> Result<Vec<Property>> {
        let mut out = Vec::with_capacity(props.len());
        for p in props {
            out.push(Property {
                loc: p.loc.clone(),
                key: p.key.clone(),
                value: self.expr(&p.value)?,
            });
        }
        Ok(out)
    }

    fn expr(&mut self, e: &Expr) -> Result<Expr> {
        sluice_stack::ensure_sufficient_stack(|| self.expr_inner(e))
    }

    fn expr_inner(&mut self, e: &Expr) -> Result<Expr> {
        let resolved = match e {
            Expr::Identifier(id) => {
                if self.is_local(id.name.as_str()) {
                    return Ok(e.clone());
                }
                return match self.scope.lookup(id.name.as_str()) {
                    Some(Value::Function(Function::Builtin(b))) if !b.side_effect => Ok(e.clone()),
                    Some(value) => value_to_expr(&value, &id.loc, self.active),
                    None => Err(Error::not_resolvable(format!(
                        "identifier {} is not bound in the captured scope",
                        id.name
                    ))
                    .at(&id.loc)),
                };
            }
            Expr::Array(a) => Expr::Array(Box::new(ArrayExpr {
                loc: a.loc.clone(),
                elements: self.exprs(&a.elements)?,
                typ: a.typ.clone(),
            })),
            Expr::Dict(d) => {
                let mut elements = Vec::with_capacity(d.elements.len());
                for item in &d.elements {
                    elements.push(DictItem {
                        key: self.expr(&item.key)?,
                        val: self.expr(&item.val)?,
                    });
                }
                Expr::Dict(Box::new(DictExpr {
                    loc: d.loc.clone(),
                    elements,
                    typ: d.typ.clone(),
                }))
            }
            Expr::Function(f) => Expr::Function(Arc::new(self.function(f)?)),
            Expr::Logical(l) => Expr::Logical(Box::new(LogicalExpr {
                loc: l.loc.clone(),
                op: l.op,
                left: self.expr(&l.left)?,
                right: self.expr(&l.right)?,
            })),
            Expr::Object(o) => self.object(o)?,
            Expr::Member(m) => {
                let object = self.expr(&m.object)?;
                if let Expr::Object(o) = &object {
                    if let Some(p) = o.properties.iter().rev().find(|p| p.key.name == m.property) {
                        return Ok(p.value.clone());
                    }
                }
                Expr::Member(Box::new(MemberExpr {
                    loc: m.loc.clone(),
                    object,
                    property: m.property.clone(),
                    typ: m.typ.clone(),
                }))
            }
            Expr::Index(ix) => Expr::Index(Box::new(IndexExpr {
                loc: ix.loc.clone(),
                array: self.expr(&ix.array)?,
                index: self.expr(&ix.index)?,
                typ: ix.typ.clone(),
            })),
            Expr::Binary(b) => Expr::Binary(Box::new(BinaryExpr {
                loc: b.loc.clone(),
                op: b.op,
                left: self.expr(&b.left)?,
                right: self.expr(&b.right)?,
                typ: b.typ.clone(),
            })),
            Expr::Unary(u) => Expr::Unary(Box::new(UnaryExpr {
                loc: u.loc.clone(),
                op: u.op,
                argument: self.expr(&u.argument)?,
                typ: u.typ.clone(),
            })),
            Expr::Call(c) => Expr::Call(Box::new(CallExpr {
                loc: c.loc.clone(),
                callee: self.expr(&c.callee)?,
                arguments: self.properties(&c.arguments)?,
                pipe: match &c.pipe {
                    Some(p) => Some(self.expr(p)?),
                    None => None,
                },
                typ: c.typ.clone(),
            })),
            Expr::Conditional(c) => Expr::Conditional(Box::new(ConditionalExpr {
                loc: c.loc.clone(),
                test: self.expr(&c.test)?,
                consequent: self.expr(&c.consequent)?,
                alternate: self.expr(&c.alternate)?,
            })),
            Expr::StringExpr(s) => {
                let mut parts = Vec::with_capacity(s.parts.len());
                for part in &s.parts {
                    parts.push(match part {
                        StringExprPart::Text(t) => StringExprPart::Text(t.clone()),
                        StringExprPart::Interpolated(e) => {
                            StringExprPart::Interpolated(self.expr(e)?)
                        }
                    });
                }
                Expr::StringExpr(Box::new(StringExpr {
                    loc: s.loc.clone(),
                    parts,
                }))
            }
            Expr::Integer(_)
            | Expr::Uint(_)
            | Expr::Float(_)
            | Expr::StringLit(_)
            | Expr::Boolean(_)
            | Expr::Duration(_)
            | Expr::DateTime(_)
            | Expr::Regexp(_) => e.clone(),
        };
        Ok(resolved)
    }

    /// A `with` over a captured record becomes a plain record literal: the
    /// base's properties in order, overridden in place, then new ones.
    fn object(&mut self, o: &ObjectExpr) -> Result<Expr> {
        let overrides = self.properties(&o.properties)?;
        let base = match &o.with {
            Some(base) if !self.is_local(base.name.as_str()) => base,
            with => {
                return Ok(Expr::Object(Box::new(ObjectExpr {
                    loc: o.loc.clone(),
                    with: with.clone(),
                    properties: overrides,
                    typ: o.typ.clone(),
                })));
            }
        };

        let obj = match self.scope.lookup(base.name.as_str()) {
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                return Err(Error::not_resolvable(format!(
                    "cannot extend {}: it is a {}",
                    base.name,
                    other.type_name()
                ))
                .at(&base.loc));
            }
            None => {
                return Err(Error::not_resolvable(format!(
                    "identifier {} is not bound in the captured scope",
                    base.name
                ))
                .at(&base.loc));
            }
        };

        let mut properties = Vec::with_capacity(obj.properties().len() + overrides.len());
        for (name, v) in obj.properties() {
            let value = value_to_expr(v, &base.loc, self.active)?;
            properties.push(property(name.clone(), value, &base.loc));
        }
        for p in overrides {
            match properties.iter_mut().find(|q| q.key.name == p.key.name) {
                Some(slot) => *slot = p,
                None => properties.push(p),
            }
        }
        Ok(Expr::Object(Box::new(ObjectExpr {
            loc: o.loc.clone(),
            with: None,
            properties,
            typ: o.typ.clone(),
        })))
    }
}
