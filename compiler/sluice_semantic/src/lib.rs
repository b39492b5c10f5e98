//! The typed semantic graph evaluated by the sluice interpreter.
//!
//! Parsing is an external step; this crate starts from the graph it
//! produces. [`nodes`] defines the graph, [`infer`] assigns a [`MonoType`]
//! to every typed node, and the `Display` impls in `format` print nodes back
//! to source form (how resolved closures are compared).
//!
//! [`build`] constructs graphs directly, for tests and for the resolver.
//!
//! [`MonoType`]: sluice_types::MonoType

pub mod build;
mod format;
pub mod infer;
pub mod nodes;
pub mod walk;

pub use infer::{TypeChecker, TypeEnv};
pub use nodes::*;
