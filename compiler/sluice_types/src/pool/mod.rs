//! Working type storage for inference.
//!
//! Types under inference are mutable through their variables, so they live
//! in a [`Pool`] and are referenced by [`Idx`]. Basic types and the empty
//! record are pre-interned at fixed indices. Everything else is appended.
//!
//! Type variables are union-find nodes: a variable is either unbound (with
//! the rank it was created at) or linked to another type.

mod export;

use std::fmt;

use sluice_ir::Symbol;

use crate::monotype::BasicType;
use crate::unify::Rank;

/// A 32-bit index into the [`Pool`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    pub const BOOL: Self = Self(0);
    pub const INT: Self = Self(1);
    pub const UINT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    pub const STRING: Self = Self(4);
    pub const DURATION: Self = Self(5);
    pub const TIME: Self = Self(6);
    pub const REGEXP: Self = Self(7);
    pub const BYTES: Self = Self(8);
    pub const EMPTY_RECORD: Self = Self(9);

    const PRE_INTERNED: u32 = 10;

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn of_basic(basic: BasicType) -> Self {
        Self(u32::from(basic as u8))
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Idx({})", self.0)
    }
}

/// The shape of one pool entry.
#[derive(Clone, Debug)]
pub enum TypeData {
    Basic(BasicType),
    /// Variable number; its state lives in [`Pool::var_state`].
    Var(u32),
    Array(Idx),
    Dict {
        key: Idx,
        value: Idx,
    },
    /// The closed end of a record row.
    EmptyRecord,
    /// `{label: head | tail}`; `tail` is another row or a variable.
    Extend {
        label: Symbol,
        head: Idx,
        tail: Idx,
    },
    Function(Box<FunctionData>),
}

/// A function type split the way calls see it.
#[derive(Clone, Debug)]
pub struct FunctionData {
    /// Parameters without defaults, in declaration order.
    pub required: Vec<(Symbol, Idx)>,
    /// Parameters with defaults, in declaration order.
    pub optional: Vec<(Symbol, Idx)>,
    /// The parameter fed by `|>`; named `<-` when only the call site is known.
    pub pipe: Option<(Symbol, Idx)>,
    pub ret: Idx,
}

impl FunctionData {
    pub fn new(ret: Idx) -> Self {
        FunctionData {
            required: Vec::new(),
            optional: Vec::new(),
            pipe: None,
            ret,
        }
    }

    /// Look up a non-pipe parameter by name.
    pub fn param(&self, name: &str) -> Option<Idx> {
        self.required
            .iter()
            .chain(&self.optional)
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|(n, _)| n == name)
    }

    /// Every type directly inside this function.
    pub fn children(&self) -> impl Iterator<Item = Idx> + '_ {
        self.required
            .iter()
            .chain(&self.optional)
            .chain(self.pipe.iter())
            .map(|(_, t)| *t)
            .chain(std::iter::once(self.ret))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarState {
    Unbound { rank: Rank },
    Link { target: Idx },
}

static EMPTY_RECORD: TypeData = TypeData::EmptyRecord;

/// Saved pool extent, restored when a phase fails inference.
#[derive(Clone, Debug)]
pub struct PoolSnapshot {
    types: usize,
    vars: Vec<VarState>,
}

#[derive(Clone, Debug)]
pub struct Pool {
    types: Vec<TypeData>,
    vars: Vec<VarState>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        let mut types: Vec<TypeData> =
            BasicType::ALL.iter().copied().map(TypeData::Basic).collect();
        types.push(TypeData::EmptyRecord);
        debug_assert_eq!(types.len(), Idx::PRE_INTERNED as usize);
        Pool {
            types,
            vars: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entry for `idx`.
    ///
    /// Every `Idx` is minted by this pool, so an index outside it is a bug
    /// in the caller: it asserts in debug builds and is logged as an error
    /// before reading as the empty record in release builds.
    pub fn get(&self, idx: Idx) -> &TypeData {
        debug_assert!(
            (idx.0 as usize) < self.types.len(),
            "type index {} is outside the pool of {} types",
            idx.0,
            self.types.len()
        );
        self.types.get(idx.0 as usize).unwrap_or_else(|| {
            tracing::error!(idx = idx.0, len = self.types.len(), "type index outside the pool");
            &EMPTY_RECORD
        })
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "pool size is bounded by program size"
    )]
    fn push(&mut self, data: TypeData) -> Idx {
        let idx = Idx(self.types.len() as u32);
        self.types.push(data);
        idx
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "variable count is bounded by program size"
    )]
    pub fn fresh_var(&mut self, rank: Rank) -> Idx {
        let id = self.vars.len() as u32;
        self.vars.push(VarState::Unbound { rank });
        self.push(TypeData::Var(id))
    }

    pub fn array(&mut self, elem: Idx) -> Idx {
        self.push(TypeData::Array(elem))
    }

    pub fn dict(&mut self, key: Idx, value: Idx) -> Idx {
        self.push(TypeData::Dict { key, value })
    }

    pub fn extend(&mut self, label: Symbol, head: Idx, tail: Idx) -> Idx {
        self.push(TypeData::Extend { label, head, tail })
    }

    /// A record row from `(label, type)` pairs ending in `tail`.
    pub fn record(&mut self, props: Vec<(Symbol, Idx)>, tail: Idx) -> Idx {
        props
            .into_iter()
            .rev()
            .fold(tail, |tail, (label, head)| self.extend(label, head, tail))
    }

    pub fn function(&mut self, data: FunctionData) -> Idx {
        self.push(TypeData::Function(Box::new(data)))
    }

    pub fn var_state(&self, id: u32) -> Option<&VarState> {
        self.vars.get(id as usize)
    }

    pub(crate) fn set_var_state(&mut self, id: u32, state: VarState) {
        if let Some(slot) = self.vars.get_mut(id as usize) {
            *slot = state;
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            types: self.types.len(),
            vars: self.vars.clone(),
        }
    }

    pub fn rollback(&mut self, snapshot: PoolSnapshot) {
        self.types.truncate(snapshot.types);
        self.vars = snapshot.vars;
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests unwrap known shapes")]
mod tests;
