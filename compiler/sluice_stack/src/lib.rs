//! Stack growth for recursive tree walks.
//!
//! Type rendering, inference, evaluation and closure resolution all recurse
//! over user-supplied trees whose depth is unbounded. Every one of those
//! walks enters [`ensure_sufficient_stack`] at each level so that a deeply
//! nested query grows the stack instead of aborting the process.
//!
//! On native targets the stack is extended with `stacker` whenever fewer than
//! [`RED_ZONE`] bytes remain. On `wasm32` the closure is called directly.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 100 * 1024;

/// Size of each freshly allocated stack segment.
pub const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f` directly; wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
