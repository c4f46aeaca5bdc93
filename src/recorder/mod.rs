//! Contracts between the render graph and the surrounding renderer.
//!
//! The render graph never talks to a device directly. Barriers and all commands recorded by pass executors go
//! through a [`CommandRecorder`], and descriptor views for resolved resources are allocated from
//! [`DescriptorHeap`]s owned by the caller. A Vulkan implementation of the recorder is provided in [`vulkan`].

use anyhow::Result;
use ash::vk;

use crate::graph::physical_resource::PhysicalResource;
use crate::graph::state::Barrier;

pub mod vulkan;

/// Kind of a descriptor heap.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum DescriptorHeapKind {
    /// Render target views.
    RenderTarget,
    /// Depth-stencil views.
    DepthStencil,
    /// Shader resource and unordered access views.
    ShaderResource,
    /// Samplers.
    Sampler,
}

/// Kind of a descriptor view of a resource.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum DescriptorView {
    /// Color attachment view.
    RenderTarget,
    /// Depth-stencil attachment view.
    DepthStencil,
    /// Read-only shader view.
    ShaderResource,
    /// Read-write shader view.
    UnorderedAccess,
}

impl DescriptorView {
    /// The heap views of this kind are allocated from.
    pub fn heap(&self) -> DescriptorHeapKind {
        match self {
            DescriptorView::RenderTarget => DescriptorHeapKind::RenderTarget,
            DescriptorView::DepthStencil => DescriptorHeapKind::DepthStencil,
            DescriptorView::ShaderResource | DescriptorView::UnorderedAccess => DescriptorHeapKind::ShaderResource,
        }
    }
}

/// Slot in a descriptor heap.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct DescriptorHandle {
    /// Heap the slot belongs to.
    pub heap: DescriptorHeapKind,
    /// Index of the slot in the heap.
    pub index: u32,
}

/// An allocator for descriptor slots, owned outside the render graph.
pub trait DescriptorHeap {
    /// Kind of descriptors stored in this heap.
    fn kind(&self) -> DescriptorHeapKind;
    /// Allocate a slot. Returns `None` if the heap is full.
    fn allocate(&mut self) -> Option<DescriptorHandle>;
}

/// A planned barrier together with the physical resource it acts on, if one was bound.
#[derive(Debug, Copy, Clone)]
pub struct ResolvedBarrier<'a> {
    /// The planned transition.
    pub barrier: Barrier,
    /// Physical resource bound to the logical resource of the barrier.
    pub resource: Option<&'a PhysicalResource>,
}

/// Records commands for the GPU. Pass executors receive the recorder through the
/// [`ExecutionContext`](crate::ExecutionContext) and record their draws and dispatches into it.
pub trait CommandRecorder {
    /// Record a batch of resource transitions.
    /// # Errors
    /// - Implementations may fail if a resource needed for the transition is not bound.
    fn resource_barriers(&mut self, barriers: &[ResolvedBarrier<'_>]) -> Result<()>;

    /// Open a debug label. Used to annotate passes in graphics debuggers.
    fn begin_label(&mut self, _name: &str, _color: [f32; 4]) -> Result<()> {
        Ok(())
    }

    /// Close the last opened debug label.
    fn end_label(&mut self) {}

    /// Native command buffer handle, for executors that record raw Vulkan commands.
    fn native(&self) -> vk::CommandBuffer {
        vk::CommandBuffer::null()
    }
}
