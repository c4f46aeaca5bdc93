//! Exposes the render graph error type

use thiserror::Error;

use crate::graph::resource::ResourceType;
use crate::recorder::{DescriptorHeapKind, DescriptorView};

/// Error type that the render graph can return.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle is the invalid sentinel handle.
    #[error("Invalid resource handle.")]
    InvalidHandle,
    /// The handle was issued by an earlier generation of the registry, before a reset.
    #[error("Stale resource handle from generation {handle_generation}, registry is at generation {registry_generation}.")]
    StaleHandle {
        /// Generation stored in the handle.
        handle_generation: u32,
        /// Current generation of the registry.
        registry_generation: u32,
    },
    /// The handle index does not refer to a created resource.
    #[error("Resource index {index} out of range, only {count} resources exist.")]
    HandleOutOfRange {
        /// Index stored in the handle.
        index: u32,
        /// Amount of resources in the registry.
        count: usize,
    },
    /// The barrier planner was not sized to hold state for this resource.
    #[error("Barrier planner holds {capacity} {kind:?} states, but resource {index} was accessed.")]
    PlannerUndersized {
        /// Kind of the resource that was accessed.
        kind: ResourceType,
        /// Index of the accessed resource.
        index: u32,
        /// Amount of state slots in the planner.
        capacity: usize,
    },
    /// A pass was declared incorrectly and cannot be executed.
    #[error("Invalid pass: `{0}`")]
    InvalidPass(String),
    /// No physical resource was bound to a logical resource.
    #[error("No physical resource bound to `{0}`")]
    NoResourceBound(String),
    /// A descriptor view was requested that was never allocated.
    #[error("No {view:?} descriptor allocated for `{resource}`")]
    NoDescriptor {
        /// Kind of view that was requested.
        view: DescriptorView,
        /// Resource the view was requested for.
        resource: String,
    },
    /// A pass tried to access a resource it did not declare while building.
    #[error("Pass `{pass}` did not declare an access to `{resource}`")]
    UndeclaredAccess {
        /// Name of the pass.
        pass: String,
        /// Resource that was accessed.
        resource: String,
    },
    /// A descriptor heap ran out of free slots.
    #[error("Descriptor heap {0:?} is exhausted.")]
    DescriptorHeapExhausted(DescriptorHeapKind),
    /// A heap was passed in the slot of a different heap kind.
    #[error("Expected a {expected:?} descriptor heap, but the frame context holds a {found:?} heap.")]
    DescriptorHeapMismatch {
        /// Kind the view needs.
        expected: DescriptorHeapKind,
        /// Kind reported by the heap.
        found: DescriptorHeapKind,
    },
    /// A descriptor view is needed, but the frame context has no heap to allocate it from.
    #[error("No {0:?} descriptor heap in frame context.")]
    NoDescriptorHeap(DescriptorHeapKind),
    /// Uncategorized error.
    #[error("Uncategorized error: `{0}`")]
    Uncategorized(&'static str),
}
