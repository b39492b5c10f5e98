//! Error kinds.

/// What went wrong, independent of where.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorCode {
    /// Bad argument or shape.
    #[error("invalid")]
    Invalid,
    /// A required value was absent where a concrete value was expected.
    #[error("failed precondition")]
    FailedPrecondition,
    #[error("out of range")]
    OutOfRange,
    #[error("duplicate argument")]
    DuplicateArgument,
    #[error("missing argument")]
    MissingArgument,
    #[error("type mismatch")]
    TypeMismatch,
    /// A closure cannot be frozen into a pure expression.
    #[error("not resolvable")]
    NotResolvable,
    /// An invariant of this runtime was violated. Always a bug.
    #[error("internal error")]
    Internal,
    /// Code taken from the wrapped cause.
    #[error("inherited")]
    Inherited,
}
