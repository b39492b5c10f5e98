//! Runtime scopes.
//!
//! A [`Scope`] is a frame of name → value bindings chained to its parent.
//! Frames are persistent: a closure keeps the frame it was created in, and
//! assigning through another handle to that frame copies it first, so the
//! closure keeps seeing the bindings it was defined against. A frame that
//! no closure shares is updated in place.
//!
//! Assignments always bind in the current frame, so a function body that
//! reassigns a captured name shadows it instead of mutating its definition
//! site. Options are the exception: each option lives in a shared cell, so
//! rebinding it is seen by every closure that captured it.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use sluice_ir::Symbol;

use crate::value::Value;

#[derive(Clone)]
enum Binding {
    Value(Value),
    Option(Arc<RwLock<Value>>),
}

impl Binding {
    fn value(&self) -> Value {
        match self {
            Binding::Value(v) => v.clone(),
            Binding::Option(cell) => cell.read().clone(),
        }
    }
}

#[derive(Clone)]
struct Frame {
    bindings: FxHashMap<Symbol, Binding>,
    parent: Option<Scope>,
}

#[derive(Clone)]
pub struct Scope(Arc<Frame>);

impl Scope {
    /// A root scope with no bindings.
    pub fn new() -> Self {
        Scope(Arc::new(Frame {
            bindings: FxHashMap::default(),
            parent: None,
        }))
    }

    /// A new empty frame whose parent is `self`.
    #[must_use]
    pub fn nest(&self) -> Self {
        Scope(Arc::new(Frame {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Look up `name`, searching enclosing frames.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.binding(name).map(Binding::value)
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        let mut scope = self;
        loop {
            if let Some(b) = scope.0.bindings.get(name) {
                return Some(b);
            }
            scope = scope.parent()?;
        }
    }

    /// Bind `name` in this frame.
    ///
    /// Handles cloned from this one before the call, and closures created
    /// in it, keep the previous bindings.
    pub fn set(&mut self, name: Symbol, value: Value) {
        Arc::make_mut(&mut self.0)
            .bindings
            .insert(name, Binding::Value(value));
    }

    /// Rebind the option `name` in the cell that declared it, or declare it
    /// in this frame when no enclosing frame has.
    pub fn set_option(&mut self, name: Symbol, value: Value) {
        if let Some(Binding::Option(cell)) = self.binding(name.as_str()) {
            *cell.write() = value;
            return;
        }
        Arc::make_mut(&mut self.0)
            .bindings
            .insert(name, Binding::Option(Arc::new(RwLock::new(value))));
    }

    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.0.bindings.contains_key(name)
    }

    /// Names bound in this frame, sorted.
    pub fn local_names(&self) -> Vec<Symbol> {
        let mut names: Vec<Symbol> = self.0.bindings.keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    /// Drop every binding in this frame.
    ///
    /// Option cells declared here are reset to null first: a closure
    /// stored in an option it captured would otherwise keep the cell alive.
    pub fn clear(&mut self) {
        for binding in self.0.bindings.values() {
            if let Binding::Option(cell) = binding {
                let mut value = cell.write();
                *value = Value::Null(value.ty());
            }
        }
        Arc::make_mut(&mut self.0).bindings.clear();
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self;
        while let Some(parent) = scope.parent() {
            depth += 1;
            scope = parent;
        }
        depth
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("depth", &self.depth())
            .field("names", &self.local_names())
            .finish()
    }
}
