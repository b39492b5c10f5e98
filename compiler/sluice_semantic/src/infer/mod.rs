//! Type inference over the semantic graph.
//!
//! Hindley-Milner with let-polymorphism on top of [`UnifyEngine`]. A
//! [`TypeChecker`] lives as long as the interpreter that owns it: each
//! package (phase) is checked against the environment accumulated by the
//! phases before it.
//!
//! # Assigning types
//!
//! Inference never mutates nodes while it runs. Each typed node reserves a
//! slot when inference reaches it, in the pre-order documented in
//! [`crate::walk`]. Once the whole package has been inferred the final
//! solution of every slot is exported and written back through
//! [`walk::visit_types_mut`](crate::walk::visit_types_mut), which visits
//! slots in the same order.
//!
//! # Failure
//!
//! A phase either type-checks completely or leaves no trace: the unifier is
//! rolled back to its snapshot and the top-level environment is not
//! replaced.

mod env;
mod expr;

pub use env::TypeEnv;

use sluice_diagnostic::{Error, Result};
use sluice_ir::{SourceLocation, Symbol};
use sluice_types::{Idx, MonoType, UnifyEngine};

use crate::nodes::{Block, Expr, Package, Statement};
use crate::walk;

#[derive(Debug, Default)]
pub struct TypeChecker {
    engine: UnifyEngine,
    env: TypeEnv,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a builtin; every variable in `ty` is quantified.
    pub fn add_builtin(&mut self, name: &str, ty: &MonoType) -> Result<()> {
        let scheme = self.engine.import_scheme(ty)?;
        self.env.bind(Symbol::new(name), scheme);
        Ok(())
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    /// The current top-level type of `name`, with quantified variables left
    /// as variables.
    pub fn lookup_type(&self, name: &str) -> Option<MonoType> {
        self.env.lookup(name).map(|s| self.engine.export(s.ty))
    }

    /// Infer `pkg` and assign a type to each of its typed nodes.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = pkg.body.len()))]
    pub fn infer_package(&mut self, pkg: &mut Package) -> Result<()> {
        let snapshot = self.engine.snapshot();
        let mut env = self.env.clone();
        let mut infer = Infer {
            engine: &mut self.engine,
            slots: Vec::new(),
        };
        let slots = match infer.top_level(&mut env, &pkg.body) {
            Ok(()) => infer.slots,
            Err(err) => {
                tracing::debug!(error = %err, "phase failed type inference");
                self.engine.rollback(snapshot);
                return Err(err);
            }
        };

        let mut visited = 0usize;
        let mut types = slots.iter().map(|&idx| self.engine.export(idx));
        walk::visit_types_mut(pkg, &mut |slot| {
            visited += 1;
            if let Some(ty) = types.next() {
                *slot = ty;
            }
        });
        if visited != slots.len() {
            self.engine.rollback(snapshot);
            return Err(Error::internal(format!(
                "inference reserved {} type slots but the package has {visited}",
                slots.len()
            )));
        }

        tracing::debug!(typed_nodes = visited, "inferred package");
        self.env = env;
        Ok(())
    }
}

/// State for inferring one package.
struct Infer<'a> {
    engine: &'a mut UnifyEngine,
    slots: Vec<Idx>,
}

impl Infer<'_> {
    fn reserve(&mut self) -> usize {
        self.slots.push(Idx::EMPTY_RECORD);
        self.slots.len() - 1
    }

    fn fill(&mut self, slot: usize, ty: Idx) -> Idx {
        self.slots[slot] = ty;
        ty
    }

    fn unify(&mut self, expected: Idx, found: Idx, loc: &SourceLocation) -> Result<()> {
        self.engine
            .unify(expected, found)
            .map_err(|e| self.engine.describe(&e).at(loc))
    }

    fn top_level(&mut self, env: &mut TypeEnv, body: &[Statement]) -> Result<()> {
        for stmt in body {
            match stmt {
                Statement::Expr(s) => {
                    self.infer_expr(env, &s.expression)?;
                }
                Statement::Return(s) => {
                    return Err(
                        Error::invalid("return statement outside of a function body").at(&s.loc),
                    );
                }
                Statement::Variable(_) | Statement::Option(_) => self.assignment(env, stmt)?,
            }
        }
        Ok(())
    }

    /// Infer a variable or option assignment and bind its generalized type.
    fn assignment(&mut self, env: &mut TypeEnv, stmt: &Statement) -> Result<()> {
        let (id, init, is_option) = match stmt {
            Statement::Variable(v) => (&v.id, &v.init, false),
            Statement::Option(o) => (&o.id, &o.init, true),
            Statement::Expr(_) | Statement::Return(_) => return Ok(()),
        };

        self.engine.enter_scope();
        let ty = self.infer_expr(env, init)?;
        self.engine.exit_scope();

        if is_option {
            if let Some(existing) = env.lookup(id.name.as_str()).cloned() {
                let existing = self.engine.instantiate(&existing);
                self.unify(existing, ty, &id.loc)?;
            }
        }
        let scheme = self.engine.generalize(ty);
        tracing::trace!(name = %id.name, quantified = scheme.vars.len(), "bind");
        env.bind(id.name.clone(), scheme);
        Ok(())
    }

    /// Infer a function body block; its type is the type of its `return`.
    fn block(&mut self, env: &TypeEnv, block: &Block) -> Result<Idx> {
        let mut local = env.child();
        let last = block.body.len().checked_sub(1);
        for (i, stmt) in block.body.iter().enumerate() {
            match stmt {
                Statement::Return(r) => {
                    if Some(i) != last {
                        return Err(Error::invalid(
                            "return must be the last statement of a block",
                        )
                        .at(&r.loc));
                    }
                    return self.infer_expr(&local, &r.argument);
                }
                Statement::Expr(s) => {
                    self.infer_expr(&local, &s.expression)?;
                }
                Statement::Variable(_) | Statement::Option(_) => {
                    self.assignment(&mut local, stmt)?;
                }
            }
        }
        Err(Error::invalid("missing return statement in function block").at(&block.loc))
    }

    fn lookup(&mut self, env: &TypeEnv, name: &Symbol, loc: &SourceLocation) -> Result<Idx> {
        match env.lookup(name.as_str()) {
            Some(scheme) => Ok(self.engine.instantiate(scheme)),
            None => Err(Error::invalid(format!("undefined identifier {name}")).at(loc)),
        }
    }

    fn infer_expr(&mut self, env: &TypeEnv, e: &Expr) -> Result<Idx> {
        sluice_stack::ensure_sufficient_stack(|| self.infer_expr_inner(env, e))
    }
}
