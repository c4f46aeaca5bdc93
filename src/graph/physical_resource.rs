use ash::vk;

use crate::graph::resource::{aspect_flags, ResourceType, TextureDesc};
use crate::recorder::{DescriptorHandle, DescriptorView};

/// Describes any physical resource handle on the GPU.
#[derive(Debug, Copy, Clone)]
pub enum PhysicalResource {
    /// An image and the subresource range the logical texture covers.
    Image {
        /// Image handle.
        image: vk::Image,
        /// Covered subresources.
        range: vk::ImageSubresourceRange,
    },
    /// A buffer range.
    Buffer {
        /// Buffer handle.
        buffer: vk::Buffer,
        /// Offset of the range in bytes.
        offset: vk::DeviceSize,
        /// Size of the range in bytes.
        size: vk::DeviceSize,
    },
}

impl PhysicalResource {
    /// Bind the whole image, with the aspect and mip levels derived from the texture description.
    pub fn image(image: vk::Image, desc: &TextureDesc) -> Self {
        PhysicalResource::Image {
            image,
            range: vk::ImageSubresourceRange {
                aspect_mask: aspect_flags(desc.format),
                base_mip_level: 0,
                level_count: desc.mip_levels,
                base_array_layer: 0,
                layer_count: 1,
            },
        }
    }

    /// Bind a whole buffer.
    pub fn buffer(buffer: vk::Buffer, size: vk::DeviceSize) -> Self {
        PhysicalResource::Buffer {
            buffer,
            offset: 0,
            size,
        }
    }

    /// The image handle, if this is an image.
    pub fn image_handle(&self) -> Option<vk::Image> {
        match self {
            PhysicalResource::Image { image, .. } => Some(*image),
            PhysicalResource::Buffer { .. } => None,
        }
    }

    /// The buffer handle, if this is a buffer.
    pub fn buffer_handle(&self) -> Option<vk::Buffer> {
        match self {
            PhysicalResource::Buffer { buffer, .. } => Some(*buffer),
            PhysicalResource::Image { .. } => None,
        }
    }
}

/// Stores bindings from logical resource indices to physical resources, one slot per logical resource.
/// Every slot starts out unbound.
#[derive(Debug, Default, Clone)]
pub struct PhysicalResourceBindings {
    textures: Vec<Option<PhysicalResource>>,
    buffers: Vec<Option<PhysicalResource>>,
}

impl PhysicalResourceBindings {
    /// Create a binding table with room for the given amount of textures and buffers.
    pub fn new(texture_count: usize, buffer_count: usize) -> Self {
        Self {
            textures: vec![None; texture_count],
            buffers: vec![None; buffer_count],
        }
    }

    pub(crate) fn bind(&mut self, kind: ResourceType, index: usize, resource: PhysicalResource) {
        let slots = match kind {
            ResourceType::Texture => &mut self.textures,
            ResourceType::Buffer => &mut self.buffers,
        };
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(resource);
        }
    }

    /// Give the texture at `dst` the same physical resource as the texture at `src`.
    /// Returns false if `src` is not bound.
    pub(crate) fn alias_texture(&mut self, dst: usize, src: usize) -> bool {
        match self.textures.get(src).copied().flatten() {
            Some(resource) if dst < self.textures.len() => {
                self.textures[dst] = Some(resource);
                true
            }
            _ => false,
        }
    }

    /// Resolve a logical resource to its physical resource. Returns `None` if nothing is bound.
    pub fn resolve(&self, kind: ResourceType, index: u32) -> Option<&PhysicalResource> {
        let slots = match kind {
            ResourceType::Texture => &self.textures,
            ResourceType::Buffer => &self.buffers,
        };
        slots.get(index as usize).and_then(|slot| slot.as_ref())
    }
}

/// Descriptor views of every logical resource, one slot per resource and view kind.
#[derive(Debug, Default, Clone)]
pub struct DescriptorTables {
    texture_views: [Vec<Option<DescriptorHandle>>; 4],
    buffer_views: [Vec<Option<DescriptorHandle>>; 2],
}

fn texture_slot(view: DescriptorView) -> usize {
    match view {
        DescriptorView::RenderTarget => 0,
        DescriptorView::DepthStencil => 1,
        DescriptorView::ShaderResource => 2,
        DescriptorView::UnorderedAccess => 3,
    }
}

fn buffer_slot(view: DescriptorView) -> Option<usize> {
    match view {
        DescriptorView::ShaderResource => Some(0),
        DescriptorView::UnorderedAccess => Some(1),
        _ => None,
    }
}

impl DescriptorTables {
    /// Create empty tables with room for the given amount of textures and buffers.
    pub fn new(texture_count: usize, buffer_count: usize) -> Self {
        Self {
            texture_views: std::array::from_fn(|_| vec![None; texture_count]),
            buffer_views: std::array::from_fn(|_| vec![None; buffer_count]),
        }
    }

    /// Store a view of a texture.
    pub(crate) fn set_texture(&mut self, index: usize, view: DescriptorView, handle: DescriptorHandle) {
        if let Some(slot) = self.texture_views[texture_slot(view)].get_mut(index) {
            *slot = Some(handle);
        }
    }

    /// Store a view of a buffer. Buffers only have shader resource and unordered access views.
    pub(crate) fn set_buffer(&mut self, index: usize, view: DescriptorView, handle: DescriptorHandle) -> bool {
        let Some(table) = buffer_slot(view) else { return false };
        match self.buffer_views[table].get_mut(index) {
            Some(slot) => {
                *slot = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Look up a view of a texture.
    pub fn texture(&self, index: u32, view: DescriptorView) -> Option<DescriptorHandle> {
        self.texture_views[texture_slot(view)]
            .get(index as usize)
            .copied()
            .flatten()
    }

    /// Look up a view of a buffer.
    pub fn buffer(&self, index: u32, view: DescriptorView) -> Option<DescriptorHandle> {
        let table = buffer_slot(view)?;
        self.buffer_views[table]
            .get(index as usize)
            .copied()
            .flatten()
    }
}
