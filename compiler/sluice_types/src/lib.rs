//! Type system core for the sluice query runtime.
//!
//! Two representations live here:
//!
//! - [`MonoType`]: the immutable, buffer-backed type value attached to every
//!   semantic-graph node and every runtime value. Composite types are built
//!   through a [`TypeBuilder`] session that copies constituents into one
//!   buffer; reading never copies.
//! - [`Pool`] + [`UnifyEngine`]: the mutable working representation used
//!   while inferring types. Type variables are union-find links with ranks
//!   for let-polymorphism. Results are exported back to [`MonoType`].

mod monotype;
mod pool;
mod unify;

pub use monotype::{
    Argument, ArgumentType, BasicType, Kind, MonoType, Property, PropertyType, Slot, TypeBuilder,
};
pub use pool::{FunctionData, Idx, Pool, PoolSnapshot, TypeData, VarState};
pub use unify::{Rank, Scheme, UnifyEngine, UnifyError};
