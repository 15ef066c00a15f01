use std::fmt;

// ---------------------------------------------------------------------------
// Numeric tolerance
// ---------------------------------------------------------------------------

/// Shared floating-point tolerance for geometric comparisons.
///
/// Used for degenerate-length checks, anti-parallel detection in the
/// shortest-arc rotation, and the zero-distance guard in target clamping.
pub const TOLERANCE: f32 = 1e-5;

// ---------------------------------------------------------------------------
// JointId
// ---------------------------------------------------------------------------

/// Stable handle to a joint inside its owning tree's arena.
///
/// Ids are arena indices: valid only against the tree that minted them and
/// not across a topology rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId(u32);

impl JointId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Index into the owning arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
