//! Type unification engine.
//!
//! Link-based union-find over the [`Pool`]: binding a variable stores a link
//! to its target, and [`UnifyEngine::resolve`] follows links with path
//! compression. Ranks implement let-polymorphism: binding a variable lowers
//! the rank of every variable in its target, so only variables that never
//! escaped an assignment are generalized.
//!
//! Records unify as rows (Rémy): to unify `{l: T | r}` with another row, the
//! other row is rewritten to bring `l` to its head, extending an open tail
//! if `l` is absent.
//!
//! Functions unify by parameter name. Call sites have their own rule,
//! [`UnifyEngine::unify_call`], which checks a concrete call against the
//! callee's declared parameters.

mod error;
mod rank;

pub use error::UnifyError;
pub use rank::Rank;

use rustc_hash::{FxHashMap, FxHashSet};
use sluice_diagnostic::Error;
use sluice_ir::{Symbol, PIPE_PLACEHOLDER};

use crate::monotype::MonoType;
use crate::pool::{FunctionData, Idx, Pool, PoolSnapshot, TypeData, VarState};

/// A type with universally quantified variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    pub vars: Vec<u32>,
    pub ty: Idx,
}

impl Scheme {
    pub fn mono(ty: Idx) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UnifyEngine {
    pool: Pool,
    rank: Rank,
}

impl UnifyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn enter_scope(&mut self) {
        self.rank = self.rank.next();
    }

    pub fn exit_scope(&mut self) {
        self.rank = self.rank.prev();
    }

    pub fn fresh_var(&mut self) -> Idx {
        self.pool.fresh_var(self.rank)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        self.pool.snapshot()
    }

    pub fn rollback(&mut self, snapshot: PoolSnapshot) {
        self.pool.rollback(snapshot);
        self.rank = Rank::FIRST;
    }

    // Resolution

    /// Follow links to the representative type, compressing the path.
    pub fn resolve(&mut self, idx: Idx) -> Idx {
        let TypeData::Var(id) = *self.pool.get(idx) else {
            return idx;
        };
        match self.pool.var_state(id) {
            Some(VarState::Link { target }) => {
                let target = *target;
                let resolved = self.resolve(target);
                if resolved != target {
                    self.pool
                        .set_var_state(id, VarState::Link { target: resolved });
                }
                resolved
            }
            _ => idx,
        }
    }

    fn var_rank(&self, id: u32) -> Rank {
        match self.pool.var_state(id) {
            Some(VarState::Unbound { rank }) => *rank,
            _ => self.rank,
        }
    }

    // Unification

    /// Make `expected` and `found` the same type.
    pub fn unify(&mut self, expected: Idx, found: Idx) -> Result<(), UnifyError> {
        if expected == found {
            return Ok(());
        }
        let a = self.resolve(expected);
        let b = self.resolve(found);
        if a == b {
            return Ok(());
        }
        sluice_stack::ensure_sufficient_stack(|| self.unify_resolved(a, b))
    }

    fn unify_resolved(&mut self, a: Idx, b: Idx) -> Result<(), UnifyError> {
        match (self.pool.get(a).clone(), self.pool.get(b).clone()) {
            (TypeData::Var(id), _) => self.bind(id, a, b),
            (_, TypeData::Var(id)) => self.bind(id, b, a),
            (TypeData::Basic(x), TypeData::Basic(y)) if x == y => Ok(()),
            (TypeData::Array(x), TypeData::Array(y)) => self.unify(x, y),
            (TypeData::Dict { key: k1, value: v1 }, TypeData::Dict { key: k2, value: v2 }) => {
                self.unify(k1, k2)?;
                self.unify(v1, v2)
            }
            (TypeData::EmptyRecord, TypeData::EmptyRecord) => Ok(()),
            (TypeData::Extend { label, head, tail }, TypeData::Extend { .. }) => {
                self.unify_rows(&label, head, tail, b)
            }
            (TypeData::EmptyRecord, TypeData::Extend { label, .. })
            | (TypeData::Extend { label, .. }, TypeData::EmptyRecord) => {
                Err(UnifyError::MissingLabel { label })
            }
            (TypeData::Function(f), TypeData::Function(g)) => self.unify_functions(&f, &g),
            _ => Err(UnifyError::Mismatch {
                expected: a,
                found: b,
            }),
        }
    }

    fn bind(&mut self, id: u32, var: Idx, target: Idx) -> Result<(), UnifyError> {
        if self.occurs(id, target) {
            return Err(UnifyError::InfiniteType { var, ty: target });
        }
        let rank = self.var_rank(id);
        self.lower_ranks(target, rank);
        tracing::trace!(var = id, target = target.raw(), "bind type variable");
        self.pool.set_var_state(id, VarState::Link { target });
        Ok(())
    }

    fn occurs(&mut self, id: u32, ty: Idx) -> bool {
        let ty = self.resolve(ty);
        match self.pool.get(ty).clone() {
            TypeData::Var(other) => other == id,
            TypeData::Basic(_) | TypeData::EmptyRecord => false,
            TypeData::Array(elem) => self.occurs(id, elem),
            TypeData::Dict { key, value } => self.occurs(id, key) || self.occurs(id, value),
            TypeData::Extend { head, tail, .. } => self.occurs(id, head) || self.occurs(id, tail),
            TypeData::Function(f) => f.children().any(|t| self.occurs(id, t)),
        }
    }

    /// Pull every variable in `ty` down to at most `rank`.
    fn lower_ranks(&mut self, ty: Idx, rank: Rank) {
        let ty = self.resolve(ty);
        match self.pool.get(ty).clone() {
            TypeData::Var(id) => {
                if self.var_rank(id) > rank {
                    self.pool.set_var_state(id, VarState::Unbound { rank });
                }
            }
            TypeData::Basic(_) | TypeData::EmptyRecord => {}
            TypeData::Array(elem) => self.lower_ranks(elem, rank),
            TypeData::Dict { key, value } => {
                self.lower_ranks(key, rank);
                self.lower_ranks(value, rank);
            }
            TypeData::Extend { head, tail, .. } => {
                self.lower_ranks(head, rank);
                self.lower_ranks(tail, rank);
            }
            TypeData::Function(f) => {
                for t in f.children() {
                    self.lower_ranks(t, rank);
                }
            }
        }
    }

    // Records

    fn unify_rows(
        &mut self,
        label: &Symbol,
        head: Idx,
        tail: Idx,
        other: Idx,
    ) -> Result<(), UnifyError> {
        let tail_var = self.row_tail_var(tail);
        let (other_head, other_tail) = self.rewrite_row(other, label)?;
        if let Some(v) = tail_var {
            if !matches!(self.pool.var_state(v), Some(VarState::Unbound { .. })) {
                return Err(UnifyError::RecursiveRow {
                    label: label.clone(),
                });
            }
        }
        self.unify(head, other_head)?;
        self.unify(tail, other_tail)
    }

    /// The open variable at the end of a row, if the row is open.
    fn row_tail_var(&mut self, mut row: Idx) -> Option<u32> {
        loop {
            row = self.resolve(row);
            match self.pool.get(row) {
                TypeData::Extend { tail, .. } => row = *tail,
                TypeData::Var(id) => return Some(*id),
                _ => return None,
            }
        }
    }

    /// Rewrite `row` as `{label: head | tail}`, returning `(head, tail)`.
    fn rewrite_row(&mut self, row: Idx, label: &Symbol) -> Result<(Idx, Idx), UnifyError> {
        let row = self.resolve(row);
        match self.pool.get(row).clone() {
            TypeData::Extend {
                label: l,
                head,
                tail,
            } => {
                if &l == label {
                    return Ok((head, tail));
                }
                let (found, rest) = self.rewrite_row(tail, label)?;
                let tail = self.pool.extend(l, head, rest);
                Ok((found, tail))
            }
            TypeData::Var(id) => {
                let rank = self.var_rank(id);
                let head = self.pool.fresh_var(rank);
                let tail = self.pool.fresh_var(rank);
                let ext = self.pool.extend(label.clone(), head, tail);
                self.pool.set_var_state(id, VarState::Link { target: ext });
                Ok((head, tail))
            }
            TypeData::EmptyRecord => Err(UnifyError::MissingLabel {
                label: label.clone(),
            }),
            _ => Err(UnifyError::Mismatch {
                expected: Idx::EMPTY_RECORD,
                found: row,
            }),
        }
    }

    // Functions

    fn unify_functions(&mut self, f: &FunctionData, g: &FunctionData) -> Result<(), UnifyError> {
        // A pipe on one side may be matched by a named parameter on the other.
        let mut piped_f: Option<Symbol> = None;
        let mut piped_g: Option<Symbol> = None;
        match (&f.pipe, &g.pipe) {
            (Some((fname, ft)), Some((gname, gt))) => {
                if fname != gname && fname != PIPE_PLACEHOLDER && gname != PIPE_PLACEHOLDER {
                    return Err(UnifyError::PipeMismatch {
                        expected: fname.clone(),
                        found: gname.clone(),
                    });
                }
                self.unify(*ft, *gt)?;
            }
            (Some((name, t)), None) => {
                let Some(u) = g.param(name.as_str()) else {
                    return Err(UnifyError::MissingPipe { name: name.clone() });
                };
                self.unify(*t, u)?;
                piped_g = Some(name.clone());
            }
            (None, Some((name, t))) => {
                let Some(u) = f.param(name.as_str()) else {
                    return Err(UnifyError::MissingPipe { name: name.clone() });
                };
                self.unify(u, *t)?;
                piped_f = Some(name.clone());
            }
            (None, None) => {}
        }

        for (name, t) in f.required.iter().chain(&f.optional) {
            if piped_f.as_ref() == Some(name) {
                continue;
            }
            match g.param(name.as_str()) {
                Some(u) => self.unify(*t, u)?,
                None if f.is_required(name.as_str()) => {
                    return Err(UnifyError::MissingArgument { name: name.clone() })
                }
                None => {}
            }
        }
        for (name, _) in &g.required {
            if piped_g.as_ref() != Some(name) && f.param(name.as_str()).is_none() {
                return Err(UnifyError::MissingArgument { name: name.clone() });
            }
        }
        self.unify(f.ret, g.ret)
    }

    /// Check a call against its callee's type.
    ///
    /// `call` lists the explicit arguments as `required`, the piped value (if
    /// any) as `pipe` under the placeholder name, and a fresh return type.
    /// A callee that is still a variable becomes the call's shape.
    pub fn unify_call(&mut self, callee: Idx, call: &FunctionData) -> Result<(), UnifyError> {
        let callee = self.resolve(callee);
        match self.pool.get(callee).clone() {
            TypeData::Function(decl) => self.apply_call(&decl, call),
            TypeData::Var(_) => {
                let shape = self.pool.function(call.clone());
                self.unify(callee, shape)
            }
            _ => Err(UnifyError::NotAFunction { found: callee }),
        }
    }

    fn apply_call(&mut self, decl: &FunctionData, call: &FunctionData) -> Result<(), UnifyError> {
        let mut seen = FxHashSet::default();
        for (name, _) in &call.required {
            if !seen.insert(name.clone()) {
                return Err(UnifyError::DuplicateArgument { name: name.clone() });
            }
        }

        let decl_pipe = decl.pipe.as_ref();
        if let (Some((_, piped)), Some((pipe_name, pipe_ty))) = (&call.pipe, decl_pipe) {
            if seen.contains(pipe_name) {
                return Err(UnifyError::DuplicateArgument {
                    name: pipe_name.clone(),
                });
            }
            self.unify(*pipe_ty, *piped)?;
        }

        for (name, arg) in &call.required {
            match decl_pipe {
                Some((pipe_name, pipe_ty)) if pipe_name == name => self.unify(*pipe_ty, *arg)?,
                _ => match decl.param(name.as_str()) {
                    Some(param) => self.unify(param, *arg)?,
                    None => return Err(UnifyError::UnexpectedArgument { name: name.clone() }),
                },
            }
        }

        for (name, _) in &decl.required {
            if !seen.contains(name) {
                return Err(UnifyError::MissingArgument { name: name.clone() });
            }
        }
        if let Some((pipe_name, _)) = decl_pipe {
            if call.pipe.is_none() && !seen.contains(pipe_name) {
                return Err(UnifyError::MissingPipe {
                    name: pipe_name.clone(),
                });
            }
        }
        self.unify(decl.ret, call.ret)
    }

    // Polymorphism

    /// Quantify the variables of `ty` created deeper than the current rank.
    pub fn generalize(&mut self, ty: Idx) -> Scheme {
        let mut vars = Vec::new();
        self.collect_generalizable(ty, &mut vars);
        Scheme { vars, ty }
    }

    fn collect_generalizable(&mut self, ty: Idx, vars: &mut Vec<u32>) {
        let ty = self.resolve(ty);
        match self.pool.get(ty).clone() {
            TypeData::Var(id) => {
                if self.var_rank(id) > self.rank && !vars.contains(&id) {
                    vars.push(id);
                }
            }
            TypeData::Basic(_) | TypeData::EmptyRecord => {}
            TypeData::Array(elem) => self.collect_generalizable(elem, vars),
            TypeData::Dict { key, value } => {
                self.collect_generalizable(key, vars);
                self.collect_generalizable(value, vars);
            }
            TypeData::Extend { head, tail, .. } => {
                self.collect_generalizable(head, vars);
                self.collect_generalizable(tail, vars);
            }
            TypeData::Function(f) => {
                for t in f.children() {
                    self.collect_generalizable(t, vars);
                }
            }
        }
    }

    /// Replace a scheme's quantified variables with fresh ones.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Idx {
        if scheme.vars.is_empty() {
            return scheme.ty;
        }
        let subst: FxHashMap<u32, Idx> = scheme
            .vars
            .iter()
            .map(|&id| (id, self.fresh_var()))
            .collect();
        self.substitute(scheme.ty, &subst)
    }

    fn substitute(&mut self, ty: Idx, subst: &FxHashMap<u32, Idx>) -> Idx {
        let ty = self.resolve(ty);
        match self.pool.get(ty).clone() {
            TypeData::Var(id) => subst.get(&id).copied().unwrap_or(ty),
            TypeData::Basic(_) | TypeData::EmptyRecord => ty,
            TypeData::Array(elem) => {
                let elem = self.substitute(elem, subst);
                self.pool.array(elem)
            }
            TypeData::Dict { key, value } => {
                let key = self.substitute(key, subst);
                let value = self.substitute(value, subst);
                self.pool.dict(key, value)
            }
            TypeData::Extend { label, head, tail } => {
                let head = self.substitute(head, subst);
                let tail = self.substitute(tail, subst);
                self.pool.extend(label, head, tail)
            }
            TypeData::Function(f) => {
                let required = self.substitute_params(&f.required, subst);
                let optional = self.substitute_params(&f.optional, subst);
                let pipe = f
                    .pipe
                    .as_ref()
                    .map(|(n, t)| (n.clone(), self.substitute(*t, subst)));
                let ret = self.substitute(f.ret, subst);
                self.pool.function(FunctionData {
                    required,
                    optional,
                    pipe,
                    ret,
                })
            }
        }
    }

    fn substitute_params(
        &mut self,
        params: &[(Symbol, Idx)],
        subst: &FxHashMap<u32, Idx>,
    ) -> Vec<(Symbol, Idx)> {
        params
            .iter()
            .map(|(n, t)| (n.clone(), self.substitute(*t, subst)))
            .collect()
    }

    // MonoType bridge

    /// Read `t` into the pool with every variable quantified.
    pub fn import_scheme(&mut self, t: &MonoType) -> Result<Scheme, Error> {
        self.enter_scope();
        let mut vars = FxHashMap::default();
        let imported = self.pool.import(t, self.rank, &mut vars);
        self.exit_scope();
        Ok(self.generalize(imported?))
    }

    pub fn export(&self, ty: Idx) -> MonoType {
        self.pool.export(ty)
    }

    /// Turn a unification failure into a user-facing error.
    pub fn describe(&self, err: &UnifyError) -> Error {
        match err {
            UnifyError::Mismatch { expected, found } => Error::type_mismatch(format!(
                "expected {} but found {}",
                self.export(*expected),
                self.export(*found)
            )),
            UnifyError::InfiniteType { var, ty } => Error::type_mismatch(format!(
                "type variable {} occurs in {}",
                self.export(*var),
                self.export(*ty)
            )),
            UnifyError::MissingLabel { label } => {
                Error::type_mismatch(format!("record is missing label {label}"))
            }
            UnifyError::RecursiveRow { label } => Error::type_mismatch(format!(
                "record label {label} cannot be added to a row that already ends in itself"
            )),
            UnifyError::MissingArgument { name } => Error::missing_argument(name.as_str()),
            UnifyError::MissingPipe { name } => Error::new(
                sluice_diagnostic::ErrorCode::MissingArgument,
                format!("missing pipe argument \"{name}\""),
            ),
            UnifyError::UnexpectedArgument { name } => {
                Error::invalid(format!("unexpected argument \"{name}\""))
            }
            UnifyError::DuplicateArgument { name } => Error::duplicate_argument(name.as_str()),
            UnifyError::PipeMismatch { expected, found } => Error::type_mismatch(format!(
                "expected pipe argument \"{expected}\" but found \"{found}\""
            )),
            UnifyError::NotAFunction { found } => Error::type_mismatch(format!(
                "cannot call a value of type {}",
                self.export(*found)
            )),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap successful unifications")]
mod tests;
