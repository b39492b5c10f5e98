//! Function values: closures over user code and native builtins.

use std::fmt;
use std::sync::Arc;

use sluice_diagnostic::Result;
use sluice_ir::Symbol;
use sluice_semantic::FunctionExpr;
use sluice_types::MonoType;

use crate::builtins::{Arguments, CallContext};
use crate::scope::Scope;

use super::Value;

/// Native implementation of a builtin.
pub type BuiltinFn = fn(&CallContext<'_>, &Arguments) -> Result<Value>;

#[derive(Clone)]
pub enum Function {
    User(Arc<UserFunction>),
    Builtin(Arc<BuiltinFunction>),
}

impl Function {
    pub fn user(expr: Arc<FunctionExpr>, scope: Scope) -> Self {
        Function::User(Arc::new(UserFunction { expr, scope }))
    }

    pub fn ty(&self) -> MonoType {
        match self {
            Function::User(f) => f.expr.typ.clone(),
            Function::Builtin(b) => b.ty.clone(),
        }
    }

    pub fn has_side_effect(&self) -> bool {
        match self {
            Function::User(_) => false,
            Function::Builtin(b) => b.side_effect,
        }
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::User(a), Function::User(b)) => Arc::ptr_eq(a, b),
            (Function::Builtin(a), Function::Builtin(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::User(u) => fmt::Debug::fmt(u, f),
            Function::Builtin(b) => fmt::Debug::fmt(b, f),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::User(u) => write!(f, "{}", u.expr),
            Function::Builtin(b) => write!(f, "<builtin {}>", b.name),
        }
    }
}

/// A function literal closed over the scope it was evaluated in.
pub struct UserFunction {
    pub expr: Arc<FunctionExpr>,
    pub scope: Scope,
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("expr", &self.expr.to_string())
            .finish_non_exhaustive()
    }
}

pub struct BuiltinFunction {
    pub name: Symbol,
    pub ty: MonoType,
    /// Calls are recorded as side effects and the function cannot be
    /// resolved into a pure expression.
    pub side_effect: bool,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("side_effect", &self.side_effect)
            .finish_non_exhaustive()
    }
}
