//! Unification failures.

use sluice_ir::Symbol;

use crate::Idx;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyError {
    Mismatch { expected: Idx, found: Idx },
    /// A variable would have to contain itself.
    InfiniteType { var: Idx, ty: Idx },
    /// A closed record lacks a required label.
    MissingLabel { label: Symbol },
    /// Two rows share a tail but disagree on `label`.
    RecursiveRow { label: Symbol },
    MissingArgument { name: Symbol },
    MissingPipe { name: Symbol },
    UnexpectedArgument { name: Symbol },
    DuplicateArgument { name: Symbol },
    PipeMismatch { expected: Symbol, found: Symbol },
    NotAFunction { found: Idx },
}
