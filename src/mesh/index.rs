//! Typed node and polygon ids.
//!
//! Ids are generic over their storage integer so that small meshes can use
//! `u16` and very large ones `u64`. Every id handed out by a mesh refers to
//! an existing element; there is no null id.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Storage integer of [`NodeId`] and [`PolygonId`].
///
/// Implemented for `u16`, `u32` and `u64`.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Number of distinct ids the type can hold.
    const CAPACITY: usize;

    /// Convert from a `usize` below [`CAPACITY`](Self::CAPACITY).
    fn from_usize(v: usize) -> Self;

    /// Convert to `usize`.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {
        $(
            impl MeshIndex for $t {
                const CAPACITY: usize = {
                    let capacity = <$t>::MAX as u128 + 1;
                    if capacity > usize::MAX as u128 {
                        usize::MAX
                    } else {
                        capacity as usize
                    }
                };

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(v < Self::CAPACITY, "index {} too large for {}", v, stringify!($t));
                    v as $t
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Id of a node within its mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId<I: MeshIndex = u32>(I);

/// Id of a polygon within its mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PolygonId<I: MeshIndex = u32>(I);

macro_rules! impl_id {
    ($name:ident, $prefix:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Id of the element at position `index`.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Position of the element in its mesh.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $prefix, self.index())
            }
        }
    };
}

impl_id!(NodeId, "N");
impl_id!(PolygonId, "P");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_keep_their_index() {
        let n: NodeId = NodeId::new(42);
        assert_eq!(n.index(), 42);

        let small: NodeId<u16> = NodeId::new(u16::MAX as usize);
        assert_eq!(small.index(), 65535);

        let p: PolygonId<u64> = PolygonId::new(5);
        assert_eq!(p.index(), 5);
    }

    #[test]
    fn test_capacity_covers_every_value() {
        assert_eq!(u16::CAPACITY, 1 << 16);
        assert_eq!(u32::CAPACITY as u64, 1u64 << 32);
        assert_eq!(u64::CAPACITY, usize::MAX);
    }

    #[test]
    fn test_ids_order_by_index() {
        let mut ids: Vec<PolygonId> = [3, 0, 2].into_iter().map(PolygonId::new).collect();
        ids.sort();
        assert_eq!(ids, vec![PolygonId::new(0), PolygonId::new(2), PolygonId::new(3)]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", NodeId::<u32>::new(42)), "N(42)");
        assert_eq!(format!("{:?}", PolygonId::<u16>::new(7)), "P(7)");
    }
}
