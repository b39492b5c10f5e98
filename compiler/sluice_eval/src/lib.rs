//! Sluice Eval - interpreter and closure resolver for sluice programs.
//!
//! # Architecture
//!
//! - [`Interpreter`]: runs a program phase by phase, type-checking each
//!   [`Package`](sluice_semantic::Package) before executing it and
//!   collecting its [`SideEffect`]s
//! - [`Scope`]: shared, chained frames of runtime bindings
//! - [`Value`]: runtime values, each carrying its [`MonoType`](sluice_types::MonoType)
//! - [`BuiltinCatalog`]: native functions with declared types
//! - [`CallStack`]: live call entries with a depth limit
//! - [`resolve`]: turns a closure into a self-contained expression
//! - `evaluate_binary` / `evaluate_unary`: direct enum dispatch for operators

pub mod builtins;
pub mod interpreter;
mod operators;
pub mod resolver;
mod scope;
mod stack;
mod unary_operators;
pub mod value;

pub use builtins::{Arguments, BuiltinCatalog, CallContext};
pub use interpreter::{Interpreter, InterpreterBuilder, SideEffect};
pub use operators::evaluate_binary;
pub use resolver::{resolve, resolve_function};
pub use scope::Scope;
pub use stack::{CallStack, StackEntry, DEFAULT_MAX_DEPTH};
pub use unary_operators::evaluate_unary;
pub use value::{BuiltinFn, BuiltinFunction, Function, UserFunction, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or unparsable, or when the host
/// already installed a global subscriber. Later calls are no-ops. Use
/// `RUST_LOG=sluice_eval=debug` for phases and calls, and
/// `RUST_LOG=sluice_semantic=debug` for type inference.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
        if installed.is_ok() {
            tracing::debug!("tracing initialized");
        }
    });
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap successful evaluation")]
mod tests;
