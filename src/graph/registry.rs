//! The resource registry owns the logical resource descriptions of one graph generation.

use crate::Error;
use crate::graph::handle::{BufferHandle, TextureHandle};
use crate::graph::resource::{BufferDesc, TextureDesc};

/// Resource registry. Stores texture and buffer descriptions and hands out handles to them.
///
/// # Example
/// ```
/// use render_graph::prelude::*;
///
/// let mut registry = ResourceRegistry::new();
/// let hdr = registry.create_texture(TextureDesc::new(1920, 1080, vk::Format::R16G16B16A16_SFLOAT));
/// assert!(hdr.is_valid());
/// assert_eq!(registry.texture_desc(hdr)?.width, 1920);
///
/// registry.reset();
/// assert!(registry.texture_desc(hdr).is_err());
/// # Ok::<(), render_graph::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    textures: Vec<TextureDesc>,
    buffers: Vec<BufferDesc>,
    generation: u32,
}

pub(crate) fn validate(index: u32, generation: u32, current: u32, count: usize) -> Result<usize, Error> {
    if index == crate::graph::handle::INVALID_INDEX {
        return Err(Error::InvalidHandle);
    }
    if generation != current {
        return Err(Error::StaleHandle {
            handle_generation: generation,
            registry_generation: current,
        });
    }
    let slot = index as usize;
    if slot >= count {
        return Err(Error::HandleOutOfRange {
            index,
            count,
        });
    }
    Ok(slot)
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new texture. Returns [`TextureHandle::INVALID`] if the description is not valid.
    pub fn create_texture(&mut self, desc: TextureDesc) -> TextureHandle {
        if !desc.is_valid() {
            debug!("Rejected invalid texture description {:?}", desc);
            return TextureHandle::INVALID;
        }
        let handle = TextureHandle::new(self.textures.len() as u32, self.generation);
        self.textures.push(desc);
        trace!("Created {:?}: {}x{} {:?}", handle, desc.width, desc.height, desc.format);
        handle
    }

    /// Register a new buffer. Returns [`BufferHandle::INVALID`] if the description is not valid.
    pub fn create_buffer(&mut self, desc: BufferDesc) -> BufferHandle {
        if !desc.is_valid() {
            debug!("Rejected invalid buffer description {:?}", desc);
            return BufferHandle::INVALID;
        }
        let handle = BufferHandle::new(self.buffers.len() as u32, self.generation);
        self.buffers.push(desc);
        trace!("Created {:?}: {} bytes", handle, desc.size);
        handle
    }

    /// Look up the description of a texture.
    /// # Errors
    /// - Fails if the handle is invalid, stale, or does not refer to a texture in this registry.
    pub fn texture_desc(&self, handle: TextureHandle) -> Result<&TextureDesc, Error> {
        let slot = self.texture_slot(handle)?;
        Ok(&self.textures[slot])
    }

    /// Look up the description of a buffer.
    /// # Errors
    /// - Fails if the handle is invalid, stale, or does not refer to a buffer in this registry.
    pub fn buffer_desc(&self, handle: BufferHandle) -> Result<&BufferDesc, Error> {
        let slot = self.buffer_slot(handle)?;
        Ok(&self.buffers[slot])
    }

    pub(crate) fn texture_slot(&self, handle: TextureHandle) -> Result<usize, Error> {
        validate(handle.index, handle.generation, self.generation, self.textures.len())
    }

    pub(crate) fn buffer_slot(&self, handle: BufferHandle) -> Result<usize, Error> {
        validate(handle.index, handle.generation, self.generation, self.buffers.len())
    }

    /// Destroy all descriptions. All handles issued before the reset become stale.
    pub fn reset(&mut self) {
        self.textures.clear();
        self.buffers.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Amount of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Amount of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Current generation. Incremented on every reset.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Iterate over all textures and their handles.
    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &TextureDesc)> {
        let generation = self.generation;
        self.textures
            .iter()
            .enumerate()
            .map(move |(index, desc)| (TextureHandle::new(index as u32, generation), desc))
    }

    /// Iterate over all buffers and their handles.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferHandle, &BufferDesc)> {
        let generation = self.generation;
        self.buffers
            .iter()
            .enumerate()
            .map(move |(index, desc)| (BufferHandle::new(index as u32, generation), desc))
    }
}
