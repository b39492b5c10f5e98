//! The interpreter's call stack.
//!
//! Every function call, user or builtin, pushes a [`StackEntry`] naming the
//! callee and the call site, and pops it when the call completes, whether
//! it succeeded or failed. Builtins can inspect the live stack through
//! their call context.

use sluice_diagnostic::{Error, Result};
use sluice_ir::SourceLocation;

/// Default bound on nested calls.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub function_name: String,
    /// Where the call was made, not where the function was defined.
    pub location: SourceLocation,
}

#[derive(Clone, Debug)]
pub struct CallStack {
    entries: Vec<StackEntry>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            entries: Vec::new(),
            max_depth,
        }
    }

    /// Push an entry. Fails without pushing once `max_depth` entries are
    /// live.
    pub fn push(&mut self, entry: StackEntry) -> Result<()> {
        if self.entries.len() >= self.max_depth {
            return Err(Error::invalid(format!(
                "maximum call depth of {} exceeded calling {}",
                self.max_depth, entry.function_name
            ))
            .at(&entry.location));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        debug_assert!(!self.entries.is_empty(), "CallStack::pop on empty stack");
        self.entries.pop()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The innermost call, if any.
    pub fn current(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    /// Live entries, outermost first.
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap pushes below the limit")]
mod tests;
