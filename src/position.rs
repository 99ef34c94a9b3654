// Copyright © 2025 Stephan Kunz
//! [`Position`] — the child-index path that identifies a model node.

use std::fmt;

/// A finite path of child indices from the root of a model tree.
///
/// Two model nodes within one tree never share a position (see the model tree's
/// `computePositions` pass in [`crate::model`]); positions are therefore used as the key
/// for per-node persistent state in the scheduler.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(Vec<u32>);

impl Position {
    /// The position of the root node: the empty path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the position of the `index`-th child of a node at `self`.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(u32::try_from(index).unwrap_or(u32::MAX));
        Self(path)
    }

    /// The raw child-index path.
    #[must_use]
    pub fn path(&self) -> &[u32] {
        &self.0
    }

    /// `true` if this position is the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        let mut out = String::new();
        for index in &self.0 {
            out.push('/');
            out.push_str(&format!("{index}"));
        }
        write!(f, "{out}")
    }
}
