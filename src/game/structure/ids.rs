//! Entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a joint. Never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointId(pub(crate) u64);

/// Identifier of a member. Never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub(crate) u64);

impl JointId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl MemberId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint_{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member_{}", self.0)
    }
}

/// Monotonic counter shared by joints and members of one graph.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue counting after `last` (used when extending a snapshot).
    pub fn starting_after(last: u64) -> Self {
        Self { next: last + 1 }
    }

    pub fn joint(&mut self) -> JointId {
        JointId(self.bump())
    }

    pub fn member(&mut self) -> MemberId {
        MemberId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_across_kinds() {
        let mut ids = IdGenerator::new();
        let a = ids.joint();
        let m = ids.member();
        let b = ids.joint();
        assert_eq!((a.raw(), m.raw(), b.raw()), (0, 1, 2));
        assert_eq!(b.to_string(), "joint_2");
        assert_eq!(m.to_string(), "member_1");
    }
}
