//! Type environment: name to type scheme bindings with scope chaining.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use sluice_ir::Symbol;
use sluice_types::Scheme;

#[derive(Clone, Debug, Default)]
struct TypeEnvInner {
    bindings: FxHashMap<Symbol, Scheme>,
    parent: Option<TypeEnv>,
}

/// Scoped name → [`Scheme`] map.
///
/// Cloning is O(1); the first binding into a shared frame copies that frame
/// only, which is how a failed phase leaves the top-level environment
/// untouched.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv(Rc<TypeEnvInner>);

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn child(&self) -> Self {
        TypeEnv(Rc::new(TypeEnvInner {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    pub fn bind(&mut self, name: Symbol, scheme: Scheme) {
        Rc::make_mut(&mut self.0).bindings.insert(name, scheme);
    }

    /// Look up `name`, searching enclosing scopes.
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.0
            .bindings
            .get(name)
            .or_else(|| self.0.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.0.bindings.contains_key(name)
    }
}
