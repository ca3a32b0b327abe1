//! Typed ids for nodes, half-edges, edges and cells.
//!
//! Every id wraps a raw integer of a [`MeshIndex`] type. A `u16` mesh holds
//! at most 65535 entities of each kind, a `u32` one about four billion.
//!
//! The all-ones raw value never names an entity. Links that are not set yet
//! hold it, and a cell id holding it is the exterior face
//! ([`CellId::exterior`]). Because that value stays the same when cells are
//! renumbered, refinement can compact cell ids without touching exterior
//! half-edges.

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::error::{MeshError, Result};

/// Raw integer type behind the typed ids.
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + Into<u64> + 'static
{
    /// The all-ones value, reserved for unset links and the exterior face.
    const RESERVED: Self;

    /// Narrow a `usize`.
    ///
    /// Callers size the table with [`ensure_capacity`] first; an id that does
    /// not fit is a bug and trips a debug assertion.
    fn from_usize(v: usize) -> Self;

    /// Widen to `usize`.
    fn to_usize(self) -> usize;

    /// How many distinct ids of one kind this type can hold.
    fn capacity() -> usize {
        let reserved: u64 = Self::RESERVED.into();
        usize::try_from(reserved).unwrap_or(usize::MAX)
    }
}

macro_rules! raw_index {
    ($($t:ty),*) => {$(
        impl MeshIndex for $t {
            const RESERVED: Self = <$t>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(v < Self::capacity(), "id {} does not fit in {}", v, stringify!($t));
                v as $t
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

raw_index!(u16, u32, u64);

/// Fail with [`MeshError::IndexOutOfRange`] if `count` ids of kind `what`
/// cannot all be represented in `I`.
pub(crate) fn ensure_capacity<I: MeshIndex>(what: &'static str, count: usize) -> Result<()> {
    let capacity = I::capacity();
    if count > capacity {
        return Err(MeshError::out_of_range(what, count - 1, capacity));
    }
    Ok(())
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name<I: MeshIndex = u32>(I);

        impl<I: MeshIndex> $name<I> {
            /// Wrap a position in the owning array.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The reserved id, used for links that are not set.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::RESERVED)
            }

            /// Position in the owning array.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// The raw integer.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Whether this id names an entity rather than the reserved value.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::RESERVED
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($tag, "({})"), self.index())
                } else {
                    f.write_str(concat!($tag, "(-)"))
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

typed_id!(
    /// A node; indexes the coordinate array.
    NodeId,
    "N"
);
typed_id!(
    /// A row of the half-edge table.
    HalfEdgeId,
    "HE"
);
typed_id!(
    /// A cell, or the exterior face.
    CellId,
    "C"
);
typed_id!(
    /// An edge, numbered by the rank of its main half-edge.
    EdgeId,
    "E"
);

impl<I: MeshIndex> CellId<I> {
    /// The unbounded face outside the mesh. Exterior half-edges carry it.
    #[inline]
    pub fn exterior() -> Self {
        Self::invalid()
    }

    /// Whether this is the exterior face.
    #[inline]
    pub fn is_exterior(self) -> bool {
        !self.is_valid()
    }
}
