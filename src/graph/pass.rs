//! This module exposes the [`PassBuilder`] struct, used for declaring the resources a pass in a
//! [`RenderGraph`](crate::RenderGraph) creates and accesses.
//!
//! Every pass is added through [`RenderGraph::add_pass()`](crate::RenderGraph::add_pass), which takes two closures.
//! The first one is the build closure. It is called immediately with a [`PassBuilder`] and declares accesses,
//! it must not record any GPU work. The second closure is the executor, which is stored and only called when the
//! compiled graph is executed.
//!
//! # Example
//!
//! ```
//! use render_graph::prelude::*;
//!
//! let mut graph = RenderGraph::new();
//! let mut gbuffer = TextureHandle::INVALID;
//! graph.add_pass("gbuffer", |builder| {
//!     gbuffer = builder.create_texture(
//!         TextureDesc::new(1920, 1080, vk::Format::R8G8B8A8_UNORM).usage(TextureUsage::RenderTarget),
//!     );
//!     builder.write_texture(gbuffer);
//! }, |_ctx| Ok(()));
//!
//! graph.add_pass("lighting", |builder| {
//!     builder.read_texture(gbuffer);
//! }, move |ctx| {
//!     let _view = ctx.shader_resource_view(gbuffer);
//!     Ok(())
//! });
//! ```

use anyhow::Result;

use crate::{Error, ExecutionContext, ResourceRegistry};
use crate::graph::handle::{BufferHandle, TextureHandle};
use crate::graph::resource::{AccessKind, BufferAccess, BufferDesc, ResourceAccess, TextureAccess, TextureDesc};

/// Defines a pass executor that is called when the compiled graph is executed.
pub trait PassExecutor {
    /// Record the commands of this pass.
    fn execute(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()>;
}

impl<F> PassExecutor for F
where
    F: FnMut(&mut ExecutionContext<'_>) -> Result<()>,
{
    /// Record this pass by calling the given function.
    fn execute(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        self(ctx)
    }
}

pub(crate) type BoxedPassFn<'cb> = Box<dyn PassExecutor + 'cb>;

/// Declaration of one pass: its name, and every resource access it makes.
#[derive(Debug, Default, Clone)]
pub struct PassDesc {
    pub(crate) name: String,
    pub(crate) color: Option<[f32; 4]>,
    pub(crate) texture_inputs: Vec<TextureAccess>,
    pub(crate) texture_outputs: Vec<TextureAccess>,
    pub(crate) buffer_inputs: Vec<BufferAccess>,
    pub(crate) buffer_outputs: Vec<BufferAccess>,
}

impl PassDesc {
    /// Create an empty pass description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A pass is valid if it has a name.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }

    /// Get the pass name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Debug color of this pass, if one was set.
    pub fn color(&self) -> Option<[f32; 4]> {
        self.color
    }

    /// Textures read by this pass.
    pub fn texture_inputs(&self) -> &[TextureAccess] {
        &self.texture_inputs
    }

    /// Textures written by this pass.
    pub fn texture_outputs(&self) -> &[TextureAccess] {
        &self.texture_outputs
    }

    /// Buffers read by this pass.
    pub fn buffer_inputs(&self) -> &[BufferAccess] {
        &self.buffer_inputs
    }

    /// Buffers written by this pass.
    pub fn buffer_outputs(&self) -> &[BufferAccess] {
        &self.buffer_outputs
    }

    /// All texture accesses, inputs first.
    pub fn texture_accesses(&self) -> impl Iterator<Item = &TextureAccess> {
        self.texture_inputs.iter().chain(self.texture_outputs.iter())
    }

    /// All buffer accesses, inputs first.
    pub fn buffer_accesses(&self) -> impl Iterator<Item = &BufferAccess> {
        self.buffer_inputs.iter().chain(self.buffer_outputs.iter())
    }

    /// Whether this pass declared any access to the texture.
    pub fn declares_texture(&self, handle: TextureHandle) -> bool {
        self.texture_accesses().any(|access| access.handle == handle)
    }

    /// Whether this pass declared any access to the buffer.
    pub fn declares_buffer(&self, handle: BufferHandle) -> bool {
        self.buffer_accesses().any(|access| access.handle == handle)
    }
}

/// A declared pass together with its deferred executor.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Pass<'cb> {
    pub(crate) desc: PassDesc,
    #[derivative(Debug = "ignore")]
    pub(crate) execute: BoxedPassFn<'cb>,
}

impl<'cb> Pass<'cb> {
    /// Get the pass name
    pub fn name(&self) -> &str {
        self.desc.name()
    }

    /// Get the declaration of this pass.
    pub fn desc(&self) -> &PassDesc {
        &self.desc
    }
}

/// Short-lived builder handed to the build closure of a pass. Creates resources and declares accesses.
///
/// Declarations made with an invalid handle are silently ignored.
/// # Example
/// See the [`pass`](crate::graph::pass) module level documentation.
pub struct PassBuilder<'a> {
    registry: &'a mut ResourceRegistry,
    desc: &'a mut PassDesc,
}

impl<'a> PassBuilder<'a> {
    /// Create a builder that records into `desc` and creates resources in `registry`.
    pub fn new(registry: &'a mut ResourceRegistry, desc: &'a mut PassDesc) -> Self {
        Self {
            registry,
            desc,
        }
    }

    /// Name of the pass being built.
    pub fn pass_name(&self) -> &str {
        &self.desc.name
    }

    /// The registry resources are created in.
    pub fn registry(&self) -> &ResourceRegistry {
        self.registry
    }

    /// Set the color of this pass. This can show up in graphics debuggers like RenderDoc.
    #[cfg(feature = "debug-markers")]
    pub fn color(&mut self, color: [f32; 4]) -> &mut Self {
        self.desc.color = Some(color);
        self
    }

    /// Create a new texture. Returns [`TextureHandle::INVALID`] if the description is invalid.
    pub fn create_texture(&mut self, desc: TextureDesc) -> TextureHandle {
        self.registry.create_texture(desc)
    }

    /// Create a new buffer. Returns [`BufferHandle::INVALID`] if the description is invalid.
    pub fn create_buffer(&mut self, desc: BufferDesc) -> BufferHandle {
        self.registry.create_buffer(desc)
    }

    /// Declare that this pass reads from a texture.
    pub fn read_texture(&mut self, handle: TextureHandle) -> &mut Self {
        if self.accepts_texture(handle) {
            self.desc.texture_inputs.push(ResourceAccess {
                handle,
                access: AccessKind::Read,
            });
        }
        self
    }

    /// Declare that this pass writes to a texture.
    pub fn write_texture(&mut self, handle: TextureHandle) -> &mut Self {
        if self.accepts_texture(handle) {
            self.desc.texture_outputs.push(ResourceAccess {
                handle,
                access: AccessKind::Write,
            });
        }
        self
    }

    /// Declare that this pass reads from and writes to a texture. The texture is added to both the inputs
    /// and the outputs of the pass.
    pub fn read_write_texture(&mut self, handle: TextureHandle) -> &mut Self {
        if self.accepts_texture(handle) {
            let access = ResourceAccess {
                handle,
                access: AccessKind::ReadWrite,
            };
            self.desc.texture_inputs.push(access);
            self.desc.texture_outputs.push(access);
        }
        self
    }

    /// Declare that this pass reads from a buffer.
    pub fn read_buffer(&mut self, handle: BufferHandle) -> &mut Self {
        if self.accepts_buffer(handle) {
            self.desc.buffer_inputs.push(ResourceAccess {
                handle,
                access: AccessKind::Read,
            });
        }
        self
    }

    /// Declare that this pass writes to a buffer.
    pub fn write_buffer(&mut self, handle: BufferHandle) -> &mut Self {
        if self.accepts_buffer(handle) {
            self.desc.buffer_outputs.push(ResourceAccess {
                handle,
                access: AccessKind::Write,
            });
        }
        self
    }

    fn accepts_texture(&self, handle: TextureHandle) -> bool {
        Self::accepts(&self.desc.name, handle, self.registry.texture_slot(handle))
    }

    fn accepts_buffer(&self, handle: BufferHandle) -> bool {
        Self::accepts(&self.desc.name, handle, self.registry.buffer_slot(handle))
    }

    fn accepts(pass: &str, handle: impl std::fmt::Debug, slot: Result<usize, Error>) -> bool {
        match slot {
            Ok(_) => {
                trace!("Pass `{}` declared access to {:?}", pass, handle);
                true
            }
            Err(Error::InvalidHandle) => false,
            Err(err) => {
                warn!("Pass `{}` ignored access to {:?}: {}", pass, handle, err);
                false
            }
        }
    }
}
