//! Let-nesting depth for generalization.

/// Depth of let-bindings a type variable was created under.
///
/// Top-level statements are inferred at [`Rank::FIRST`]; each variable
/// assignment's right-hand side is inferred one rank deeper. When the
/// assignment completes, variables still at the deeper rank did not escape
/// into the enclosing environment and are generalized.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct Rank(u16);

impl Rank {
    pub const FIRST: Self = Self(1);
    pub const MAX: Self = Self(u16::MAX - 1);

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    #[inline]
    #[must_use]
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::FIRST.0))
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::FIRST
    }
}
