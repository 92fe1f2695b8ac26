//! Positional Identifiers
//!
//! A positional identifier is the path of child indices leading from the
//! render root to a slot in the tree. It is displayed in dotted form
//! (`"0.2.1"`) but stored as a small inline vector, so extending and
//! truncating a path never allocates for trees of ordinary depth.
//!
//! Two identical paths seen in different reconcile passes address the same
//! *slot*, not necessarily the same logical entity: list diffing is purely
//! positional and reordering is never detected.

use std::fmt;

use smallvec::{smallvec, SmallVec};

/// Path of child indices from the mount point to a slot.
///
/// The empty path is the mount point itself (the live container the tree
/// is rendered into). The default render root is `[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PositionalId(SmallVec<[usize; 8]>);

impl PositionalId {
    /// The default render root, `"0"`.
    pub fn root() -> Self {
        Self(smallvec![0])
    }

    /// The mount point that the root is inserted into.
    pub fn mount_point() -> Self {
        Self(SmallVec::new())
    }

    /// Build an identifier from an explicit path.
    pub fn from_path(path: &[usize]) -> Self {
        Self(SmallVec::from_slice(path))
    }

    /// Identifier of the child at `index`.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Identifier of the parent slot. `None` for the mount point.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(SmallVec::from_slice(parent)))
    }

    /// Trailing child index, i.e. the position among siblings.
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Identifier of the sibling directly after this slot.
    pub fn next_sibling(&self) -> Option<Self> {
        let index = self.index()?;
        let mut path = self.0.clone();
        *path.last_mut()? = index + 1;
        Some(Self(path))
    }

    /// Number of path segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the mount point.
    pub fn is_mount_point(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw path.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for PositionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.0.iter();
        if let Some(first) = segments.next() {
            write!(f, "{first}")?;
            for segment in segments {
                write!(f, ".{segment}")?;
            }
        }
        Ok(())
    }
}

/// Key of a component instance: a positional identifier plus the depth of
/// the component chain at that position.
///
/// A component whose expansion is another component renders both links of
/// the chain into the same positional slot. The depth keeps each link's
/// instance entry apart: the outermost node at a position has depth 0, its
/// expansion depth 1, and so on. Children always restart at depth 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    id: PositionalId,
    depth: usize,
}

impl SlotKey {
    /// Outermost slot at the given position.
    pub fn new(id: PositionalId) -> Self {
        Self { id, depth: 0 }
    }

    /// Slot at the given position and chain depth.
    pub fn at_depth(id: PositionalId, depth: usize) -> Self {
        Self { id, depth }
    }

    /// The slot occupied by this slot's expansion.
    pub fn nested(&self) -> Self {
        Self {
            id: self.id.clone(),
            depth: self.depth + 1,
        }
    }

    /// Outermost slot of the child at `index`.
    pub fn child(&self, index: usize) -> Self {
        Self::new(self.id.child(index))
    }

    /// Positional identifier of the slot.
    pub fn id(&self) -> &PositionalId {
        &self.id
    }

    /// Chain depth of the slot.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth == 0 {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}#{}", self.id, self.depth)
        }
    }
}
