use ash::vk;

use crate::graph::handle::{BufferHandle, TextureHandle};

/// Type of a resource in the render graph.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ResourceType {
    /// Texture resource
    #[default]
    Texture,
    /// Buffer resource
    Buffer,
}

/// How a pass accesses a resource.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum AccessKind {
    /// The pass only reads from the resource.
    Read,
    /// The pass only writes to the resource.
    Write,
    /// The pass reads from and writes to the resource.
    ReadWrite,
}

impl AccessKind {
    /// Whether this access reads from the resource.
    pub fn is_read(&self) -> bool {
        matches!(self, AccessKind::Read | AccessKind::ReadWrite)
    }

    /// Whether this access writes to the resource.
    pub fn is_write(&self) -> bool {
        matches!(self, AccessKind::Write | AccessKind::ReadWrite)
    }
}

/// A single access declaration made by a pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResourceAccess<H> {
    /// The accessed resource.
    pub handle: H,
    /// How the resource is accessed.
    pub access: AccessKind,
}

/// Access to a texture.
pub type TextureAccess = ResourceAccess<TextureHandle>;
/// Access to a buffer.
pub type BufferAccess = ResourceAccess<BufferHandle>;

/// Usage tag of a texture, used to decide which descriptor views it needs.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum TextureUsage {
    /// Only sampled in shaders.
    #[default]
    Sampled,
    /// Color attachment, also sampled by later passes.
    RenderTarget,
    /// Depth-stencil attachment, also sampled by later passes.
    DepthStencil,
    /// Storage image, written from shaders.
    Storage,
}

/// Usage tag of a buffer.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uniform buffer.
    #[default]
    Uniform,
    /// Vertex buffer.
    Vertex,
    /// Index buffer.
    Index,
    /// Storage buffer, written from shaders.
    Storage,
    /// Indirect draw or dispatch arguments.
    Indirect,
}

/// Describes a logical texture. Immutable once created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format. [`vk::Format::UNDEFINED`] is not a valid format.
    pub format: vk::Format,
    /// Amount of mip levels.
    pub mip_levels: u32,
    /// Amount of samples per pixel.
    pub sample_count: u32,
    /// How the texture will be used.
    pub usage: TextureUsage,
    /// Whether this texture holds data from a previous frame, for temporal effects.
    pub is_history: bool,
}

impl TextureDesc {
    /// Describe a single-sampled texture with one mip level.
    pub fn new(width: u32, height: u32, format: vk::Format) -> Self {
        Self {
            width,
            height,
            format,
            mip_levels: 1,
            sample_count: 1,
            usage: TextureUsage::default(),
            is_history: false,
        }
    }

    /// Set the usage tag.
    pub fn usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Set the amount of mip levels.
    pub fn mip_levels(mut self, levels: u32) -> Self {
        self.mip_levels = levels;
        self
    }

    /// Set the amount of samples per pixel.
    pub fn samples(mut self, samples: u32) -> Self {
        self.sample_count = samples;
        self
    }

    /// Mark this texture as a history buffer.
    pub fn history(mut self, is_history: bool) -> Self {
        self.is_history = is_history;
        self
    }

    /// A texture description is valid if all dimensions are non-zero and the format is known.
    pub fn is_valid(&self) -> bool {
        self.width != 0
            && self.height != 0
            && self.mip_levels != 0
            && self.sample_count != 0
            && self.format != vk::Format::UNDEFINED
    }

    /// Whether the format of this texture has a depth or stencil aspect.
    pub fn is_depth_stencil(&self) -> bool {
        !aspect_flags(self.format).contains(vk::ImageAspectFlags::COLOR)
    }

    /// Sample count as a Vulkan flag. Returns an empty flag for unsupported counts.
    pub fn vk_samples(&self) -> vk::SampleCountFlags {
        match self.sample_count {
            1 => vk::SampleCountFlags::TYPE_1,
            2 => vk::SampleCountFlags::TYPE_2,
            4 => vk::SampleCountFlags::TYPE_4,
            8 => vk::SampleCountFlags::TYPE_8,
            16 => vk::SampleCountFlags::TYPE_16,
            32 => vk::SampleCountFlags::TYPE_32,
            64 => vk::SampleCountFlags::TYPE_64,
            _ => vk::SampleCountFlags::empty(),
        }
    }
}

/// Describes a logical buffer. Immutable once created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: vk::DeviceSize,
    /// How the buffer will be used.
    pub usage: BufferUsage,
}

impl BufferDesc {
    /// Describe a buffer of `size` bytes.
    pub fn new(size: vk::DeviceSize, usage: BufferUsage) -> Self {
        Self {
            size,
            usage,
        }
    }

    /// A buffer description is valid if its size is non-zero.
    pub fn is_valid(&self) -> bool {
        self.size != 0
    }
}

/// Infer the image aspect of a format.
pub fn aspect_flags(format: vk::Format) -> vk::ImageAspectFlags {
    match format {
        vk::Format::D16_UNORM | vk::Format::D32_SFLOAT | vk::Format::X8_D24_UNORM_PACK32 => {
            vk::ImageAspectFlags::DEPTH
        }
        vk::Format::S8_UINT => vk::ImageAspectFlags::STENCIL,
        vk::Format::D16_UNORM_S8_UINT | vk::Format::D24_UNORM_S8_UINT | vk::Format::D32_SFLOAT_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::COLOR,
    }
}
