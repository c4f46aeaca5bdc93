pub use ash::vk;

pub use crate::error::Error;
pub use crate::settings::{GraphSettings, GraphSettingsBuilder};

pub use crate::graph::handle::{BufferHandle, TextureHandle};
pub use crate::graph::resource::{
    AccessKind, BufferAccess, BufferDesc, BufferUsage, ResourceAccess, ResourceType, TextureAccess, TextureDesc, TextureUsage,
};
pub use crate::graph::registry::ResourceRegistry;
pub use crate::graph::state::{Barrier, ResourceState, StateMapping, VulkanState};
pub use crate::graph::barrier::BarrierPlanner;
pub use crate::graph::pass::{PassBuilder, PassDesc, PassExecutor};
pub use crate::graph::physical_resource::{DescriptorTables, PhysicalResource, PhysicalResourceBindings};
pub use crate::graph::context::{ExecutionContext, FrameContext};
pub use crate::graph::compiled::{CompiledGraph, CompiledPass};
pub use crate::graph::render_graph::RenderGraph;

pub use crate::recorder::{CommandRecorder, DescriptorHandle, DescriptorHeap, DescriptorHeapKind, DescriptorView, ResolvedBarrier};
pub use crate::recorder::vulkan::VulkanRecorder;

pub use crate::util::to_vk::IntoVulkanType;
