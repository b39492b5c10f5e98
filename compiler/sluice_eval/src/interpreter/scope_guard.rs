//! RAII guard for call stack entries.
//!
//! [`Interpreter::enter_call`] pushes a [`StackEntry`] and returns a guard
//! that derefs to the interpreter. Dropping the guard pops the entry, so a
//! call leaves the stack as it found it on success, on error and while
//! unwinding.

use std::ops::{Deref, DerefMut};

use sluice_diagnostic::Result;

use super::Interpreter;
use crate::stack::StackEntry;

pub(super) struct CallGuard<'a> {
    interpreter: &'a mut Interpreter,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.interpreter.stack.pop();
    }
}

impl Deref for CallGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for CallGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `entry` for the duration of the returned guard.
    pub(super) fn enter_call(&mut self, entry: StackEntry) -> Result<CallGuard<'_>> {
        self.stack.push(entry)?;
        Ok(CallGuard { interpreter: self })
    }
}
