//! Resource residency states, the access to state mapping tables, and barrier descriptions.

use ash::vk;

use crate::graph::resource::{AccessKind, ResourceType};
use crate::util::to_vk::IntoVulkanType;

/// GPU residency state of a resource.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ResourceState {
    /// Contents are undefined, e.g. a freshly allocated image.
    Undefined,
    /// Generic state usable by any operation.
    #[default]
    Common,
    /// Readable from shaders.
    ShaderResource,
    /// Bound as a color attachment.
    RenderTarget,
    /// Read and written from shaders as storage.
    UnorderedAccess,
    /// Readable by any read operation (uniform, vertex, index, indirect, shader, transfer).
    GenericRead,
    /// Bound as a writable depth-stencil attachment.
    DepthWrite,
    /// Bound as a read-only depth-stencil attachment, or sampled.
    DepthRead,
    /// Source of a copy.
    CopySource,
    /// Destination of a copy.
    CopyDest,
    /// Ready for presentation.
    Present,
}

/// Vulkan representation of a [`ResourceState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VulkanState {
    /// Image layout. Ignored for buffers.
    pub layout: vk::ImageLayout,
    /// Pipeline stages that access the resource in this state.
    pub stage: vk::PipelineStageFlags2,
    /// Memory access in this state.
    pub access: vk::AccessFlags2,
}

impl IntoVulkanType for ResourceState {
    type Output = VulkanState;

    fn into_vulkan(self) -> Self::Output {
        let (layout, stage, access) = match self {
            ResourceState::Undefined => (
                vk::ImageLayout::UNDEFINED,
                vk::PipelineStageFlags2::TOP_OF_PIPE,
                vk::AccessFlags2::NONE,
            ),
            ResourceState::Common => (
                vk::ImageLayout::GENERAL,
                vk::PipelineStageFlags2::ALL_COMMANDS,
                vk::AccessFlags2::MEMORY_READ | vk::AccessFlags2::MEMORY_WRITE,
            ),
            ResourceState::ShaderResource => (
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::PipelineStageFlags2::VERTEX_SHADER
                    | vk::PipelineStageFlags2::FRAGMENT_SHADER
                    | vk::PipelineStageFlags2::COMPUTE_SHADER,
                vk::AccessFlags2::SHADER_SAMPLED_READ,
            ),
            ResourceState::RenderTarget => (
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
                vk::AccessFlags2::COLOR_ATTACHMENT_READ | vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
            ),
            ResourceState::UnorderedAccess => (
                vk::ImageLayout::GENERAL,
                vk::PipelineStageFlags2::FRAGMENT_SHADER | vk::PipelineStageFlags2::COMPUTE_SHADER,
                vk::AccessFlags2::SHADER_STORAGE_READ | vk::AccessFlags2::SHADER_STORAGE_WRITE,
            ),
            ResourceState::GenericRead => (
                vk::ImageLayout::GENERAL,
                vk::PipelineStageFlags2::ALL_COMMANDS,
                vk::AccessFlags2::SHADER_READ
                    | vk::AccessFlags2::UNIFORM_READ
                    | vk::AccessFlags2::VERTEX_ATTRIBUTE_READ
                    | vk::AccessFlags2::INDEX_READ
                    | vk::AccessFlags2::INDIRECT_COMMAND_READ
                    | vk::AccessFlags2::TRANSFER_READ,
            ),
            // Depth/stencil loads happen in EARLY_FRAGMENT_TESTS, stores in LATE_FRAGMENT_TESTS.
            ResourceState::DepthWrite => (
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
                vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ | vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
            ),
            ResourceState::DepthRead => (
                vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
                vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS
                    | vk::PipelineStageFlags2::FRAGMENT_SHADER,
                vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ | vk::AccessFlags2::SHADER_SAMPLED_READ,
            ),
            ResourceState::CopySource => (
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::PipelineStageFlags2::TRANSFER,
                vk::AccessFlags2::TRANSFER_READ,
            ),
            ResourceState::CopyDest => (
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::PipelineStageFlags2::TRANSFER,
                vk::AccessFlags2::TRANSFER_WRITE,
            ),
            ResourceState::Present => (
                vk::ImageLayout::PRESENT_SRC_KHR,
                vk::PipelineStageFlags2::BOTTOM_OF_PIPE,
                vk::AccessFlags2::NONE,
            ),
        };
        VulkanState {
            layout,
            stage,
            access,
        }
    }
}

/// Maps the effective access of a pass to the state a resource must be in.
///
/// Textures and buffers use different tables. The defaults intentionally map a plain write
/// differently: [`StateMapping::TEXTURE`] sends a written texture to [`ResourceState::RenderTarget`],
/// while [`StateMapping::BUFFER`] sends a written buffer to [`ResourceState::UnorderedAccess`].
/// Both can be replaced through [`GraphSettings`](crate::GraphSettings).
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct StateMapping {
    /// State for resources that are only read.
    pub read: ResourceState,
    /// State for resources that are only written.
    pub write: ResourceState,
    /// State for resources that are both read and written.
    pub read_write: ResourceState,
    /// State used when no access could be determined.
    pub fallback: ResourceState,
}

impl StateMapping {
    /// Default table for color textures.
    pub const TEXTURE: Self = Self {
        read: ResourceState::ShaderResource,
        write: ResourceState::RenderTarget,
        read_write: ResourceState::UnorderedAccess,
        fallback: ResourceState::Common,
    };

    /// Default table for textures with a depth or stencil format.
    pub const DEPTH_STENCIL: Self = Self {
        read: ResourceState::DepthRead,
        write: ResourceState::DepthWrite,
        read_write: ResourceState::DepthWrite,
        fallback: ResourceState::Common,
    };

    /// Default table for buffers.
    pub const BUFFER: Self = Self {
        read: ResourceState::GenericRead,
        write: ResourceState::UnorderedAccess,
        read_write: ResourceState::UnorderedAccess,
        fallback: ResourceState::Common,
    };

    /// Get the required state for an effective access.
    pub fn required_state(&self, access: Option<AccessKind>) -> ResourceState {
        match access {
            Some(AccessKind::Read) => self.read,
            Some(AccessKind::Write) => self.write,
            Some(AccessKind::ReadWrite) => self.read_write,
            None => self.fallback,
        }
    }
}

/// A transition of one resource from one state to another, to be issued before a pass.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Barrier {
    /// Kind of the resource.
    pub kind: ResourceType,
    /// Index of the resource in the registry.
    pub index: u32,
    /// State the resource was in.
    pub before: ResourceState,
    /// State the resource must be in.
    pub after: ResourceState,
}

impl Barrier {
    /// Source and destination state in Vulkan terms.
    pub fn vk_states(&self) -> (VulkanState, VulkanState) {
        (self.before.into_vulkan(), self.after.into_vulkan())
    }
}
