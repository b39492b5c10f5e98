//! Shared vocabulary for the sluice query runtime.
//!
//! Everything here is plain data used by more than one layer: the type
//! representation, the semantic graph, diagnostics and the evaluator.
//!
//! - [`Symbol`]: cheaply clonable identifier
//! - [`SourceLocation`] / [`Position`]: where a node came from
//! - [`BinaryOp`], [`LogicalOp`], [`UnaryOp`]: operator vocabulary
//! - [`Duration`], [`Regexp`], [`Time`]: scalar payloads shared by literals and values

mod duration;
mod location;
mod ops;
mod regexp;
mod symbol;

pub use duration::{Duration, DurationUnit};
pub use location::{Position, SourceLocation};
pub use ops::{BinaryOp, LogicalOp, UnaryOp};
pub use regexp::Regexp;
pub use symbol::Symbol;

/// Absolute point in time with its original offset.
pub type Time = chrono::DateTime<chrono::FixedOffset>;

/// Name bound to the piped-in value when a callee's pipe parameter name is
/// not known at the call site.
pub const PIPE_PLACEHOLDER: &str = "<-";

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap known-good patterns")]
mod tests;
