//! Logical resource handles.
//!
//! Handles are plain indices into the [`ResourceRegistry`](crate::ResourceRegistry) descriptor tables,
//! tagged with the registry generation that issued them. After a
//! [`ResourceRegistry::reset()`](crate::ResourceRegistry::reset) all previously issued handles become stale,
//! and every lookup through them fails with [`Error::StaleHandle`](crate::Error::StaleHandle).

use std::fmt;

use static_assertions::{assert_eq_size, assert_impl_all};

/// Index value used by the invalid sentinel handle.
pub(crate) const INVALID_INDEX: u32 = u32::MAX;

macro_rules! logical_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) index: u32,
            pub(crate) generation: u32,
        }

        impl $name {
            /// The invalid sentinel handle. Returned when resource creation fails.
            pub const INVALID: Self = Self {
                index: INVALID_INDEX,
                generation: 0,
            };

            #[inline]
            pub(crate) fn new(index: u32, generation: u32) -> Self {
                Self {
                    index,
                    generation,
                }
            }

            /// Returns true if this handle is not the invalid sentinel. This does not check for staleness.
            #[inline]
            pub fn is_valid(&self) -> bool {
                self.index != INVALID_INDEX
            }

            /// Index of the resource in the registry.
            #[inline]
            pub fn index(&self) -> u32 {
                self.index
            }

            /// Generation of the registry that created this handle.
            #[inline]
            pub fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({}.g{})", $prefix, self.index, self.generation)
                } else {
                    write!(f, "{}(invalid)", $prefix)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

logical_handle!(
    /// Handle to a logical texture in the render graph.
    TextureHandle,
    "Texture"
);

logical_handle!(
    /// Handle to a logical buffer in the render graph.
    BufferHandle,
    "Buffer"
);

assert_eq_size!(TextureHandle, u64);
assert_eq_size!(BufferHandle, u64);
assert_impl_all!(TextureHandle: Copy, Send, Sync);
assert_impl_all!(BufferHandle: Copy, Send, Sync);
