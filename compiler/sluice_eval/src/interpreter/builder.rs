//! `InterpreterBuilder` for configuring an [`Interpreter`].

use std::sync::Arc;

use sluice_diagnostic::Result;
use sluice_semantic::TypeChecker;

use super::Interpreter;
use crate::builtins::BuiltinCatalog;
use crate::scope::Scope;
use crate::stack::{CallStack, DEFAULT_MAX_DEPTH};
use crate::value::{Function, Value};

pub struct InterpreterBuilder {
    builtins: BuiltinCatalog,
    max_call_depth: usize,
    /// File name stamped on call sites that carry none.
    file: Option<Arc<str>>,
}

impl InterpreterBuilder {
    /// Standard builtins and the default call depth.
    pub fn new() -> Self {
        Self {
            builtins: BuiltinCatalog::standard(),
            max_call_depth: DEFAULT_MAX_DEPTH,
            file: None,
        }
    }

    #[must_use]
    pub fn builtins(mut self, builtins: BuiltinCatalog) -> Self {
        self.builtins = builtins;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn file(mut self, file: impl Into<Arc<str>>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Register every builtin with the type checker and bind it at the top
    /// level.
    pub fn build(self) -> Result<Interpreter> {
        let mut checker = TypeChecker::new();
        let mut globals = Scope::new();
        for builtin in self.builtins.iter() {
            checker.add_builtin(builtin.name.as_str(), &builtin.ty)?;
            globals.set(
                builtin.name.clone(),
                Value::Function(Function::Builtin(Arc::clone(builtin))),
            );
        }
        tracing::debug!(builtins = self.builtins.len(), "interpreter ready");

        Ok(Interpreter {
            globals,
            checker,
            stack: CallStack::new(self.max_call_depth),
            side_effects: Vec::new(),
            file: self.file,
        })
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
