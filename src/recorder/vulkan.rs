//! Vulkan implementation of [`CommandRecorder`].

use std::ffi::CString;

use anyhow::Result;
use ash::extensions::ext::DebugUtils;
use ash::vk;

use crate::Error;
use crate::graph::physical_resource::PhysicalResource;
use crate::graph::resource::ResourceType;
use crate::graph::state::Barrier;
use crate::recorder::{CommandRecorder, ResolvedBarrier};

/// Records into a Vulkan command buffer. The command buffer must be in the recording state and the device must
/// support `VK_KHR_synchronization2` (core in Vulkan 1.3).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct VulkanRecorder {
    #[derivative(Debug = "ignore")]
    device: ash::Device,
    cmd: vk::CommandBuffer,
    #[derivative(Debug = "ignore")]
    debug_utils: Option<DebugUtils>,
}

impl VulkanRecorder {
    /// Record into `cmd`, allocated from `device`.
    pub fn new(device: ash::Device, cmd: vk::CommandBuffer) -> Self {
        Self {
            device,
            cmd,
            debug_utils: None,
        }
    }

    /// Emit pass labels through `VK_EXT_debug_utils`.
    pub fn with_debug_utils(mut self, debug_utils: DebugUtils) -> Self {
        self.debug_utils = Some(debug_utils);
        self
    }

    /// The device commands are recorded with.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// The command buffer commands are recorded into.
    pub fn handle(&self) -> vk::CommandBuffer {
        self.cmd
    }
}

/// Translate a texture barrier into an image memory barrier over `image`.
pub fn image_barrier(barrier: &Barrier, image: vk::Image, range: vk::ImageSubresourceRange) -> vk::ImageMemoryBarrier2 {
    let (src, dst) = barrier.vk_states();
    vk::ImageMemoryBarrier2 {
        src_stage_mask: src.stage,
        src_access_mask: src.access,
        dst_stage_mask: dst.stage,
        dst_access_mask: dst.access,
        old_layout: src.layout,
        new_layout: dst.layout,
        src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
        dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
        image,
        subresource_range: range,
        ..Default::default()
    }
}

/// Translate a buffer barrier into a global memory barrier.
pub fn memory_barrier(barrier: &Barrier) -> vk::MemoryBarrier2 {
    // Every driver implements buffer barriers as global memory barriers, so we do the same.
    let (src, dst) = barrier.vk_states();
    vk::MemoryBarrier2 {
        src_stage_mask: src.stage,
        src_access_mask: src.access,
        dst_stage_mask: dst.stage,
        dst_access_mask: dst.access,
        ..Default::default()
    }
}

impl CommandRecorder for VulkanRecorder {
    fn resource_barriers(&mut self, barriers: &[ResolvedBarrier<'_>]) -> Result<()> {
        let mut image_barriers = Vec::new();
        let mut memory_barriers = Vec::new();
        for resolved in barriers {
            let barrier = &resolved.barrier;
            match (barrier.kind, resolved.resource) {
                (ResourceType::Texture, Some(PhysicalResource::Image { image, range })) => {
                    image_barriers.push(image_barrier(barrier, *image, *range));
                }
                (ResourceType::Buffer, _) => memory_barriers.push(memory_barrier(barrier)),
                (ResourceType::Texture, _) => {
                    return Err(Error::NoResourceBound(format!("texture #{}", barrier.index)).into());
                }
            }
        }

        let dependency = vk::DependencyInfo::builder()
            .memory_barriers(&memory_barriers)
            .image_memory_barriers(&image_barriers);
        unsafe {
            self.device.cmd_pipeline_barrier2(self.cmd, &dependency);
        }
        Ok(())
    }

    fn begin_label(&mut self, name: &str, color: [f32; 4]) -> Result<()> {
        let Some(debug_utils) = &self.debug_utils else { return Ok(()) };
        let name = CString::new(name)?;
        let label = vk::DebugUtilsLabelEXT {
            p_label_name: name.as_ptr(),
            color,
            ..Default::default()
        };
        unsafe {
            debug_utils.cmd_begin_debug_utils_label(self.cmd, &label);
        }
        Ok(())
    }

    fn end_label(&mut self) {
        if let Some(debug_utils) = &self.debug_utils {
            unsafe {
                debug_utils.cmd_end_debug_utils_label(self.cmd);
            }
        }
    }

    fn native(&self) -> vk::CommandBuffer {
        self.cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::ResourceState;

    fn texture_barrier(before: ResourceState, after: ResourceState) -> Barrier {
        Barrier {
            kind: ResourceType::Texture,
            index: 0,
            before,
            after,
        }
    }

    #[test]
    fn render_target_to_shader_read_layouts() {
        let barrier = texture_barrier(ResourceState::RenderTarget, ResourceState::ShaderResource);
        let range = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };
        let vk_barrier = image_barrier(&barrier, vk::Image::null(), range);
        assert_eq!(vk_barrier.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(vk_barrier.new_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(vk_barrier.src_stage_mask, vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT);
        assert!(vk_barrier.dst_stage_mask.contains(vk::PipelineStageFlags2::VERTEX_SHADER));
        assert!(vk_barrier.dst_access_mask.contains(vk::AccessFlags2::SHADER_SAMPLED_READ));
        assert_eq!(vk_barrier.subresource_range.level_count, 1);
    }

    #[test]
    fn buffer_barrier_is_global() {
        let barrier = Barrier {
            kind: ResourceType::Buffer,
            index: 3,
            before: ResourceState::UnorderedAccess,
            after: ResourceState::GenericRead,
        };
        let vk_barrier = memory_barrier(&barrier);
        assert_eq!(vk_barrier.s_type, vk::StructureType::MEMORY_BARRIER_2);
        assert!(vk_barrier.src_access_mask.contains(vk::AccessFlags2::SHADER_STORAGE_WRITE));
        assert!(vk_barrier.dst_access_mask.contains(vk::AccessFlags2::UNIFORM_READ));
    }
}
