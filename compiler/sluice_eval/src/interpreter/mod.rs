//! Tree-walking interpreter over the typed semantic graph.
//!
//! An [`Interpreter`] runs a program as a sequence of phases. Each phase is a
//! [`Package`] that is first type-checked against everything the earlier
//! phases defined and only then executed in the shared top-level scope.
//! A phase that fails type checking leaves both the type environment and
//! the top-level scope untouched.
//!
//! Executing a phase produces its side effects: the value of every
//! top-level expression statement, and the result of every call to a
//! side-effecting builtin, in the order they happened.

mod builder;
mod function_call;
mod scope_guard;

use std::sync::Arc;

use sluice_diagnostic::{Error, Result};
use sluice_ir::{LogicalOp, SourceLocation, Symbol};
use sluice_semantic::{
    Block, Expr, ObjectExpr, Package, Statement, StringExpr, StringExprPart, TypeChecker,
};

pub use builder::InterpreterBuilder;

use crate::operators::evaluate_binary;
use crate::scope::Scope;
use crate::stack::CallStack;
use crate::unary_operators::evaluate_unary;
use crate::value::{Function, Value};

/// A value produced by a phase, with the node that produced it.
#[derive(Clone, Debug)]
pub struct SideEffect {
    pub value: Value,
    /// The top-level expression or the side-effecting call.
    pub node: Expr,
}

pub struct Interpreter {
    globals: Scope,
    checker: TypeChecker,
    stack: CallStack,
    side_effects: Vec<SideEffect>,
    file: Option<Arc<str>>,
}

impl Interpreter {
    /// An interpreter with the standard builtins.
    pub fn new() -> Result<Self> {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Type-check and execute one phase, returning its side effects.
    ///
    /// Types inferred for the phase are written into `pkg`. Assignments made
    /// before a runtime error stay visible to later phases.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = pkg.body.len()))]
    pub fn eval(&mut self, pkg: &mut Package) -> Result<Vec<SideEffect>> {
        self.checker.infer_package(pkg)?;

        self.side_effects.clear();
        // Owned for the phase so assignments update the frame in place.
        let mut globals = std::mem::take(&mut self.globals);
        let result = pkg
            .body
            .iter()
            .try_for_each(|stmt| self.top_level(&mut globals, stmt));
        self.globals = globals;
        if let Err(err) = result {
            tracing::debug!(error = %err, "phase failed at runtime");
            self.side_effects.clear();
            return Err(err);
        }
        tracing::debug!(side_effects = self.side_effects.len(), "phase complete");
        Ok(std::mem::take(&mut self.side_effects))
    }

    /// Bind `name` to `value` at the top level, for later phases to use.
    ///
    /// Type variables in the value's type are quantified.
    pub fn define(&mut self, name: &str, value: Value) -> Result<()> {
        self.checker.add_builtin(name, &value.ty())?;
        self.globals.set(Symbol::new(name), value);
        Ok(())
    }

    /// The current top-level value of `name`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.globals.lookup(name)
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    pub fn checker(&self) -> &TypeChecker {
        &self.checker
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    fn top_level(&mut self, scope: &mut Scope, stmt: &Statement) -> Result<()> {
        match stmt {
            Statement::Expr(s) => {
                let value = self.eval_expr(scope, &s.expression)?;
                self.side_effects.push(SideEffect {
                    value,
                    node: s.expression.clone(),
                });
            }
            Statement::Variable(v) => {
                let value = self.eval_expr(scope, &v.init)?;
                scope.set(v.id.name.clone(), value);
            }
            Statement::Option(o) => {
                let value = self.eval_expr(scope, &o.init)?;
                scope.set_option(o.id.name.clone(), value);
            }
            Statement::Return(r) => {
                return Err(Error::invalid("return statement outside of a function body").at(&r.loc));
            }
        }
        Ok(())
    }

    /// Execute a function body block in `scope` and return the value of
    /// its `return`.
    pub(crate) fn eval_block(&mut self, scope: &mut Scope, block: &Block) -> Result<Value> {
        for stmt in &block.body {
            match stmt {
                Statement::Expr(s) => {
                    self.eval_expr(scope, &s.expression)?;
                }
                Statement::Variable(v) => {
                    let value = self.eval_expr(scope, &v.init)?;
                    scope.set(v.id.name.clone(), value);
                }
                Statement::Option(o) => {
                    let value = self.eval_expr(scope, &o.init)?;
                    scope.set_option(o.id.name.clone(), value);
                }
                Statement::Return(r) => return self.eval_expr(scope, &r.argument),
            }
        }
        Err(Error::invalid("missing return statement in function block").at(&block.loc))
    }

    pub(crate) fn eval_expr(&mut self, scope: &Scope, e: &Expr) -> Result<Value> {
        sluice_stack::ensure_sufficient_stack(|| self.eval_expr_inner(scope, e))
    }

    fn eval_expr_inner(&mut self, scope: &Scope, e: &Expr) -> Result<Value> {
        match e {
            Expr::Integer(lit) => Ok(Value::Int(lit.value)),
            Expr::Uint(lit) => Ok(Value::UInt(lit.value)),
            Expr::Float(lit) => Ok(Value::Float(lit.value)),
            Expr::StringLit(lit) => Ok(Value::string(lit.value.as_str())),
            Expr::Boolean(lit) => Ok(Value::Bool(lit.value)),
            Expr::Duration(lit) => Ok(Value::Duration(lit.value)),
            Expr::DateTime(lit) => Ok(Value::Time(lit.value)),
            Expr::Regexp(lit) => Ok(Value::Regexp(lit.value.clone())),

            Expr::Identifier(id) => scope
                .lookup(id.name.as_str())
                .ok_or_else(|| Error::invalid(format!("undefined identifier {}", id.name)).at(&id.loc)),
            Expr::Array(a) => {
                let mut elements = Vec::with_capacity(a.elements.len());
                for el in &a.elements {
                    elements.push(self.eval_expr(scope, el)?);
                }
                Ok(Value::array(a.typ.clone(), elements))
            }
            Expr::Dict(d) => {
                let mut entries = Vec::with_capacity(d.elements.len());
                for item in &d.elements {
                    let key = self.eval_expr(scope, &item.key)?;
                    let val = self.eval_expr(scope, &item.val)?;
                    entries.push((key, val));
                }
                Ok(Value::dict(d.typ.clone(), entries))
            }
            // The captured handle is a snapshot: later assignments to
            // `scope` copy the frame instead of changing it.
            Expr::Function(f) => Ok(Value::Function(Function::user(
                Arc::clone(f),
                scope.clone(),
            ))),
            Expr::Logical(l) => {
                let left = self.eval_condition(scope, &l.left)?;
                match (l.op, left) {
                    (LogicalOp::And, false) => Ok(Value::Bool(false)),
                    (LogicalOp::Or, true) => Ok(Value::Bool(true)),
                    _ => self.eval_condition(scope, &l.right).map(Value::Bool),
                }
            }
            Expr::Object(o) => self.eval_object(scope, o),
            Expr::Member(m) => match self.eval_expr(scope, &m.object)? {
                Value::Object(obj) => Ok(obj
                    .get(m.property.as_str())
                    .cloned()
                    .unwrap_or_else(|| Value::Null(m.typ.clone()))),
                Value::Null(_) => Ok(Value::Null(m.typ.clone())),
                other => Err(Error::type_mismatch(format!(
                    "cannot access property {} of {}",
                    m.property,
                    other.type_name()
                ))
                .at(&m.loc)),
            },
            Expr::Index(ix) => {
                let array = self.eval_expr(scope, &ix.array)?;
                let index = self.eval_expr(scope, &ix.index)?;
                match (array, index) {
                    (Value::Array(arr), Value::Int(i)) => usize::try_from(i)
                        .ok()
                        .and_then(|i| arr.get(i))
                        .cloned()
                        .ok_or_else(|| {
                            Error::out_of_range(format!(
                                "cannot access element {i} of array of length {}",
                                arr.len()
                            ))
                            .at(&ix.loc)
                        }),
                    (Value::Null(_), _) | (_, Value::Null(_)) => Ok(Value::Null(ix.typ.clone())),
                    (array, index) => Err(Error::type_mismatch(format!(
                        "cannot index {} with {}",
                        array.type_name(),
                        index.type_name()
                    ))
                    .at(&ix.loc)),
                }
            }
            Expr::Binary(b) => {
                let left = self.eval_expr(scope, &b.left)?;
                let right = self.eval_expr(scope, &b.right)?;
                evaluate_binary(b.op, &left, &right, &b.typ).map_err(|e| e.at(&b.loc))
            }
            Expr::Unary(u) => {
                let value = self.eval_expr(scope, &u.argument)?;
                evaluate_unary(u.op, &value, &u.typ).map_err(|e| e.at(&u.loc))
            }
            Expr::Call(c) => self.eval_call(scope, c),
            Expr::Conditional(c) => {
                if self.eval_condition(scope, &c.test)? {
                    self.eval_expr(scope, &c.consequent)
                } else {
                    self.eval_expr(scope, &c.alternate)
                }
            }
            Expr::StringExpr(s) => self.eval_string(scope, s),
        }
    }

    /// Evaluate a boolean test; null counts as false.
    fn eval_condition(&mut self, scope: &Scope, e: &Expr) -> Result<bool> {
        match self.eval_expr(scope, e)? {
            Value::Bool(b) => Ok(b),
            Value::Null(_) => Ok(false),
            other => Err(Error::type_mismatch(format!(
                "expected a boolean condition, got {}",
                other.type_name()
            ))
            .at(e.loc())),
        }
    }

    /// Build a record. With a `with` base the base's properties come first,
    /// in their order, with overridden values replaced in place.
    fn eval_object(&mut self, scope: &Scope, o: &ObjectExpr) -> Result<Value> {
        let mut properties: Vec<(Symbol, Value)> = match &o.with {
            Some(base) => match scope.lookup(base.name.as_str()) {
                Some(Value::Object(obj)) => obj.properties().to_vec(),
                Some(other) => {
                    return Err(Error::type_mismatch(format!(
                        "cannot extend {} with properties: it is a {}",
                        base.name,
                        other.type_name()
                    ))
                    .at(&base.loc));
                }
                None => {
                    return Err(
                        Error::invalid(format!("undefined identifier {}", base.name)).at(&base.loc)
                    );
                }
            },
            None => Vec::with_capacity(o.properties.len()),
        };
        for p in &o.properties {
            let value = self.eval_expr(scope, &p.value)?;
            properties.push((p.key.name.clone(), value));
        }
        Ok(Value::object(properties))
    }

    fn eval_string(&mut self, scope: &Scope, s: &StringExpr) -> Result<Value> {
        let mut out = String::new();
        for part in &s.parts {
            match part {
                StringExprPart::Text(text) => out.push_str(text),
                StringExprPart::Interpolated(e) => {
                    let value = self.eval_expr(scope, e)?;
                    interpolate(&mut out, &value).map_err(|err| err.at(e.loc()))?;
                }
            }
        }
        Ok(Value::string(out))
    }

    /// The call site location, stamped with the configured file name.
    fn locate(&self, loc: &SourceLocation) -> SourceLocation {
        match (&loc.file, &self.file) {
            (None, Some(file)) => loc.clone().with_file(Arc::clone(file)),
            _ => loc.clone(),
        }
    }
}

/// Append the string form of a scalar.
fn interpolate(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Bool(_)
        | Value::Int(_)
        | Value::UInt(_)
        | Value::Float(_)
        | Value::String(_)
        | Value::Duration(_)
        | Value::Time(_) => {
            out.push_str(&value.to_string());
            Ok(())
        }
        Value::Null(ty) => Err(Error::failed_precondition(format!(
            "cannot interpolate a null {ty}"
        ))),
        other => Err(Error::type_mismatch(format!(
            "cannot interpolate a value of type {}",
            other.type_name()
        ))),
    }
}

impl Drop for Interpreter {
    /// Options can hold closures that captured the option's own cell;
    /// clearing the top-level frame releases them.
    fn drop(&mut self) {
        self.globals.clear();
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("globals", &self.globals)
            .field("stack_depth", &self.stack.depth())
            .finish_non_exhaustive()
    }
}
