//! Expression inference rules.

use rustc_hash::FxHashSet;
use sluice_diagnostic::{Error, Result};
use sluice_ir::{BinaryOp, SourceLocation, Symbol, UnaryOp, PIPE_PLACEHOLDER};
use sluice_types::{BasicType, FunctionData, Idx, Scheme, TypeData};

use super::{Infer, TypeEnv};
use crate::nodes::{
    CallExpr, Expr, FunctionBody, FunctionExpr, ObjectExpr, StringExprPart,
};

impl Infer<'_> {
    pub(super) fn infer_expr_inner(&mut self, env: &TypeEnv, e: &Expr) -> Result<Idx> {
        match e {
            Expr::Integer(_) => Ok(Idx::INT),
            Expr::Uint(_) => Ok(Idx::UINT),
            Expr::Float(_) => Ok(Idx::FLOAT),
            Expr::StringLit(_) => Ok(Idx::STRING),
            Expr::Boolean(_) => Ok(Idx::BOOL),
            Expr::Duration(_) => Ok(Idx::DURATION),
            Expr::DateTime(_) => Ok(Idx::TIME),
            Expr::Regexp(_) => Ok(Idx::REGEXP),

            Expr::Identifier(id) => {
                let slot = self.reserve();
                let ty = self.lookup(env, &id.name, &id.loc)?;
                Ok(self.fill(slot, ty))
            }
            Expr::Array(a) => {
                let slot = self.reserve();
                let elem = self.engine.fresh_var();
                for el in &a.elements {
                    let t = self.infer_expr(env, el)?;
                    self.unify(elem, t, el.loc())?;
                }
                let ty = self.engine.pool_mut().array(elem);
                Ok(self.fill(slot, ty))
            }
            Expr::Dict(d) => {
                let slot = self.reserve();
                let key = self.engine.fresh_var();
                let value = self.engine.fresh_var();
                for item in &d.elements {
                    let k = self.infer_expr(env, &item.key)?;
                    self.unify(key, k, item.key.loc())?;
                    let v = self.infer_expr(env, &item.val)?;
                    self.unify(value, v, item.val.loc())?;
                }
                let ty = self.engine.pool_mut().dict(key, value);
                Ok(self.fill(slot, ty))
            }
            Expr::Function(f) => self.function(env, f),
            Expr::Logical(l) => {
                let left = self.infer_expr(env, &l.left)?;
                self.unify(Idx::BOOL, left, l.left.loc())?;
                let right = self.infer_expr(env, &l.right)?;
                self.unify(Idx::BOOL, right, l.right.loc())?;
                Ok(Idx::BOOL)
            }
            Expr::Object(o) => self.object(env, o),
            Expr::Member(m) => {
                let slot = self.reserve();
                let object = self.infer_expr(env, &m.object)?;
                let field = self.engine.fresh_var();
                let rest = self.engine.fresh_var();
                let want = self
                    .engine
                    .pool_mut()
                    .record(vec![(m.property.clone(), field)], rest);
                self.unify(want, object, &m.loc)?;
                Ok(self.fill(slot, field))
            }
            Expr::Index(ix) => {
                let slot = self.reserve();
                let array = self.infer_expr(env, &ix.array)?;
                let index = self.infer_expr(env, &ix.index)?;
                let elem = self.engine.fresh_var();
                let want = self.engine.pool_mut().array(elem);
                self.unify(want, array, ix.array.loc())?;
                self.unify(Idx::INT, index, ix.index.loc())?;
                Ok(self.fill(slot, elem))
            }
            Expr::Binary(b) => {
                let slot = self.reserve();
                let left = self.infer_expr(env, &b.left)?;
                let right = self.infer_expr(env, &b.right)?;
                let ty = self.binary(b.op, left, right, &b.loc, &b.left, &b.right)?;
                Ok(self.fill(slot, ty))
            }
            Expr::Unary(u) => {
                let slot = self.reserve();
                let arg = self.infer_expr(env, &u.argument)?;
                let ty = match u.op {
                    UnaryOp::Not => {
                        self.unify(Idx::BOOL, arg, u.argument.loc())?;
                        Idx::BOOL
                    }
                    UnaryOp::Exists => Idx::BOOL,
                    UnaryOp::Neg => {
                        self.expect_basic(arg, &u.loc, "-", &NEGATABLE)?;
                        arg
                    }
                    UnaryOp::Pos => {
                        self.expect_basic(arg, &u.loc, "+", &NUMERIC_OR_DURATION)?;
                        arg
                    }
                };
                Ok(self.fill(slot, ty))
            }
            Expr::Call(c) => self.call(env, c),
            Expr::Conditional(c) => {
                let test = self.infer_expr(env, &c.test)?;
                self.unify(Idx::BOOL, test, c.test.loc())?;
                let consequent = self.infer_expr(env, &c.consequent)?;
                let alternate = self.infer_expr(env, &c.alternate)?;
                self.unify(consequent, alternate, c.alternate.loc())?;
                Ok(alternate)
            }
            Expr::StringExpr(s) => {
                // Interpolated values are checked for stringability at runtime.
                for part in &s.parts {
                    if let StringExprPart::Interpolated(e) = part {
                        self.infer_expr(env, e)?;
                    }
                }
                Ok(Idx::STRING)
            }
        }
    }

    fn function(&mut self, env: &TypeEnv, f: &FunctionExpr) -> Result<Idx> {
        let slot = self.reserve();
        let mut local = env.child();
        let mut seen = FxHashSet::default();
        let ret = self.engine.fresh_var();
        let mut data = FunctionData::new(ret);

        // Without a pipe parameter, a piped value is reachable from defaults
        // as `<-`.
        if f.pipe_param().is_none() {
            let piped = self.engine.fresh_var();
            local.bind(Symbol::new(PIPE_PLACEHOLDER), Scheme::mono(piped));
        }

        for p in &f.params {
            let name = &p.key.name;
            if !seen.insert(name.clone()) {
                return Err(
                    Error::invalid(format!("duplicate parameter \"{name}\"")).at(&p.loc),
                );
            }
            let ty = self.engine.fresh_var();
            if let Some(default) = &p.default {
                let d = self.infer_expr(&local, default)?;
                self.unify(ty, d, default.loc())?;
            }
            local.bind(name.clone(), Scheme::mono(ty));

            if p.is_pipe {
                if data.pipe.is_some() {
                    return Err(Error::invalid("function has more than one pipe parameter")
                        .at(&p.loc));
                }
                data.pipe = Some((name.clone(), ty));
            } else if p.default.is_some() {
                data.optional.push((name.clone(), ty));
            } else {
                data.required.push((name.clone(), ty));
            }
        }

        let body = match &f.body {
            FunctionBody::Expr(e) => self.infer_expr(&local, e)?,
            FunctionBody::Block(block) => self.block(&local, block)?,
        };
        self.unify(ret, body, &f.loc)?;
        let ty = self.engine.pool_mut().function(data);
        Ok(self.fill(slot, ty))
    }

    fn object(&mut self, env: &TypeEnv, o: &ObjectExpr) -> Result<Idx> {
        let slot = self.reserve();
        let tail = match &o.with {
            Some(with) => {
                let with_slot = self.reserve();
                let base = self.lookup(env, &with.name, &with.loc)?;
                self.fill(with_slot, base);
                let labels: Vec<&Symbol> = o.properties.iter().map(|p| &p.key.name).collect();
                self.without_labels(base, &labels, &with.loc)?
            }
            None => Idx::EMPTY_RECORD,
        };
        let mut props = Vec::with_capacity(o.properties.len());
        for p in &o.properties {
            let ty = self.infer_expr(env, &p.value)?;
            props.push((p.key.name.clone(), ty));
        }
        let ty = self.engine.pool_mut().record(props, tail);
        Ok(self.fill(slot, ty))
    }

    /// `row` with the known occurrences of `labels` removed, so that a
    /// `with` literal replaces those properties instead of shadowing them.
    fn without_labels(
        &mut self,
        row: Idx,
        labels: &[&Symbol],
        loc: &SourceLocation,
    ) -> Result<Idx> {
        let row = self.engine.resolve(row);
        match self.engine.pool().get(row).clone() {
            TypeData::Extend { label, head, tail } => {
                let rest = self.without_labels(tail, labels, loc)?;
                if labels.contains(&&label) {
                    Ok(rest)
                } else if rest == tail {
                    Ok(row)
                } else {
                    Ok(self.engine.pool_mut().extend(label, head, rest))
                }
            }
            TypeData::Var(_) | TypeData::EmptyRecord => Ok(row),
            TypeData::Basic(_)
            | TypeData::Array(_)
            | TypeData::Dict { .. }
            | TypeData::Function(_) => Err(Error::type_mismatch(format!(
                "cannot extend non-record type {}",
                self.engine.export(row)
            ))
            .at(loc)),
        }
    }

    fn call(&mut self, env: &TypeEnv, c: &CallExpr) -> Result<Idx> {
        let slot = self.reserve();
        let callee = self.infer_expr(env, &c.callee)?;
        let ret = self.engine.fresh_var();
        let mut shape = FunctionData::new(ret);
        for arg in &c.arguments {
            let ty = self.infer_expr(env, &arg.value)?;
            shape.required.push((arg.key.name.clone(), ty));
        }
        if let Some(pipe) = &c.pipe {
            let ty = self.infer_expr(env, pipe)?;
            shape.pipe = Some((Symbol::new(PIPE_PLACEHOLDER), ty));
        }
        self.engine
            .unify_call(callee, &shape)
            .map_err(|e| self.engine.describe(&e).at(&c.loc))?;
        Ok(self.fill(slot, ret))
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        left: Idx,
        right: Idx,
        loc: &SourceLocation,
        left_expr: &Expr,
        right_expr: &Expr,
    ) -> Result<Idx> {
        let symbol = op.as_symbol();
        match op {
            BinaryOp::Add => {
                self.unify(left, right, right_expr.loc())?;
                self.expect_basic(left, loc, symbol, &ADDABLE)?;
                Ok(left)
            }
            BinaryOp::Sub => {
                self.unify(left, right, right_expr.loc())?;
                self.expect_basic(left, loc, symbol, &NUMERIC_OR_DURATION)?;
                Ok(left)
            }
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
                self.unify(left, right, right_expr.loc())?;
                self.expect_basic(left, loc, symbol, &NUMERIC)?;
                Ok(left)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if !self.both_numeric(left, right) {
                    self.unify(left, right, right_expr.loc())?;
                }
                Ok(Idx::BOOL)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                if !self.both_numeric(left, right) {
                    self.unify(left, right, right_expr.loc())?;
                    self.expect_basic(left, loc, symbol, &ORDERED)?;
                }
                Ok(Idx::BOOL)
            }
            BinaryOp::RegexMatch | BinaryOp::NotRegexMatch => {
                self.unify(Idx::STRING, left, left_expr.loc())?;
                self.unify(Idx::REGEXP, right, right_expr.loc())?;
                Ok(Idx::BOOL)
            }
        }
    }

    fn basic_of(&mut self, ty: Idx) -> Option<BasicType> {
        let ty = self.engine.resolve(ty);
        match self.engine.pool().get(ty) {
            TypeData::Basic(b) => Some(*b),
            _ => None,
        }
    }

    /// Mixed numeric operands compare without unifying.
    fn both_numeric(&mut self, left: Idx, right: Idx) -> bool {
        matches!(
            (self.basic_of(left), self.basic_of(right)),
            (Some(a), Some(b)) if NUMERIC.contains(&a) && NUMERIC.contains(&b)
        )
    }

    /// Fail when `ty` is already known and is not one of `allowed`.
    fn expect_basic(
        &mut self,
        ty: Idx,
        loc: &SourceLocation,
        op: &str,
        allowed: &[BasicType],
    ) -> Result<()> {
        let resolved = self.engine.resolve(ty);
        let ok = match self.engine.pool().get(resolved) {
            TypeData::Var(_) => true,
            TypeData::Basic(b) => allowed.contains(b),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::type_mismatch(format!(
                "operator {op} is not defined for type {}",
                self.engine.export(resolved)
            ))
            .at(loc))
        }
    }
}

const NUMERIC: [BasicType; 3] = [BasicType::Int, BasicType::Uint, BasicType::Float];

const NUMERIC_OR_DURATION: [BasicType; 4] = [
    BasicType::Int,
    BasicType::Uint,
    BasicType::Float,
    BasicType::Duration,
];

const NEGATABLE: [BasicType; 3] = [BasicType::Int, BasicType::Float, BasicType::Duration];

const ADDABLE: [BasicType; 5] = [
    BasicType::Int,
    BasicType::Uint,
    BasicType::Float,
    BasicType::String,
    BasicType::Duration,
];

const ORDERED: [BasicType; 6] = [
    BasicType::Int,
    BasicType::Uint,
    BasicType::Float,
    BasicType::String,
    BasicType::Duration,
    BasicType::Time,
];
