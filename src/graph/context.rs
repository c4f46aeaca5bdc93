//! Per-frame inputs to execution, and the view of the compiled graph handed to each pass executor.

use ash::vk;

use crate::Error;
use crate::graph::handle::{BufferHandle, TextureHandle};
use crate::graph::pass::PassDesc;
use crate::graph::physical_resource::{DescriptorTables, PhysicalResource, PhysicalResourceBindings};
use crate::graph::resource::ResourceType;
use crate::recorder::{CommandRecorder, DescriptorHandle, DescriptorHeap, DescriptorView};

/// Everything the render graph needs from the renderer for one frame.
///
/// # Example
/// ```
/// use render_graph::prelude::*;
///
/// let frame = FrameContext::new(42);
/// assert!(frame.recorder.is_none());
/// assert_eq!(frame.frame_index, 42);
/// ```
#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct FrameContext<'f> {
    /// Recorder all barriers and pass commands are recorded into. Execution records nothing without one.
    #[derivative(Debug = "ignore")]
    pub recorder: Option<&'f mut dyn CommandRecorder>,
    /// Device that owns the physical resources.
    pub device: vk::Device,
    /// Heap for render target views.
    #[derivative(Debug = "ignore")]
    pub render_target_heap: Option<&'f mut dyn DescriptorHeap>,
    /// Heap for depth-stencil views.
    #[derivative(Debug = "ignore")]
    pub depth_stencil_heap: Option<&'f mut dyn DescriptorHeap>,
    /// Heap for shader resource and unordered access views.
    #[derivative(Debug = "ignore")]
    pub shader_resource_heap: Option<&'f mut dyn DescriptorHeap>,
    /// Index of the frame being rendered.
    pub frame_index: u64,
}

impl<'f> FrameContext<'f> {
    /// Create a frame context with no recorder and no heaps.
    pub fn new(frame_index: u64) -> Self {
        Self {
            frame_index,
            ..Default::default()
        }
    }

    /// Set the command recorder.
    pub fn recorder(mut self, recorder: &'f mut dyn CommandRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Set the device handle.
    pub fn device(mut self, device: vk::Device) -> Self {
        self.device = device;
        self
    }

    /// Set the descriptor heaps.
    pub fn heaps(
        mut self,
        render_target: &'f mut dyn DescriptorHeap,
        depth_stencil: &'f mut dyn DescriptorHeap,
        shader_resource: &'f mut dyn DescriptorHeap,
    ) -> Self {
        self.render_target_heap = Some(render_target);
        self.depth_stencil_heap = Some(depth_stencil);
        self.shader_resource_heap = Some(shader_resource);
        self
    }

    /// Allocate a slot for a view from the matching heap.
    /// # Errors
    /// - Fails if the matching heap is missing or full.
    /// - Fails if the heap in the matching slot reports a different kind.
    pub(crate) fn allocate(&mut self, view: DescriptorView) -> Result<DescriptorHandle, Error> {
        let kind = view.heap();
        let heap = match view {
            DescriptorView::RenderTarget => self.render_target_heap.as_deref_mut(),
            DescriptorView::DepthStencil => self.depth_stencil_heap.as_deref_mut(),
            DescriptorView::ShaderResource | DescriptorView::UnorderedAccess => self.shader_resource_heap.as_deref_mut(),
        };
        let heap = heap.ok_or(Error::NoDescriptorHeap(kind))?;
        if heap.kind() != kind {
            return Err(Error::DescriptorHeapMismatch {
                expected: kind,
                found: heap.kind(),
            });
        }
        heap.allocate().ok_or(Error::DescriptorHeapExhausted(kind))
    }
}

/// View of the compiled graph handed to a pass executor. Only resources the pass declared can be looked up.
pub struct ExecutionContext<'a> {
    pub(crate) recorder: &'a mut dyn CommandRecorder,
    pub(crate) pass: &'a PassDesc,
    pub(crate) bindings: &'a PhysicalResourceBindings,
    pub(crate) descriptors: &'a DescriptorTables,
    pub(crate) frame_index: u64,
}

impl<'a> ExecutionContext<'a> {
    /// The recorder to record commands into.
    pub fn recorder(&mut self) -> &mut dyn CommandRecorder {
        &mut *self.recorder
    }

    /// Name of the pass being executed.
    pub fn pass_name(&self) -> &str {
        self.pass.name()
    }

    /// Index of the frame being rendered.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn check_texture(&self, handle: TextureHandle) -> Result<(), Error> {
        if self.pass.declares_texture(handle) {
            Ok(())
        } else {
            Err(Error::UndeclaredAccess {
                pass: self.pass.name().to_owned(),
                resource: handle.to_string(),
            })
        }
    }

    fn check_buffer(&self, handle: BufferHandle) -> Result<(), Error> {
        if self.pass.declares_buffer(handle) {
            Ok(())
        } else {
            Err(Error::UndeclaredAccess {
                pass: self.pass.name().to_owned(),
                resource: handle.to_string(),
            })
        }
    }

    /// Physical resource bound to a texture.
    /// # Errors
    /// - Fails if the pass did not declare the texture, or nothing is bound to it.
    pub fn texture(&self, handle: TextureHandle) -> Result<&PhysicalResource, Error> {
        self.check_texture(handle)?;
        self.bindings
            .resolve(ResourceType::Texture, handle.index())
            .ok_or_else(|| Error::NoResourceBound(handle.to_string()))
    }

    /// Physical resource bound to a buffer.
    /// # Errors
    /// - Fails if the pass did not declare the buffer, or nothing is bound to it.
    pub fn buffer(&self, handle: BufferHandle) -> Result<&PhysicalResource, Error> {
        self.check_buffer(handle)?;
        self.bindings
            .resolve(ResourceType::Buffer, handle.index())
            .ok_or_else(|| Error::NoResourceBound(handle.to_string()))
    }

    fn texture_view(&self, handle: TextureHandle, view: DescriptorView) -> Result<DescriptorHandle, Error> {
        self.check_texture(handle)?;
        self.descriptors
            .texture(handle.index(), view)
            .ok_or_else(|| Error::NoDescriptor {
                view,
                resource: handle.to_string(),
            })
    }

    fn buffer_view(&self, handle: BufferHandle, view: DescriptorView) -> Result<DescriptorHandle, Error> {
        self.check_buffer(handle)?;
        self.descriptors
            .buffer(handle.index(), view)
            .ok_or_else(|| Error::NoDescriptor {
                view,
                resource: handle.to_string(),
            })
    }

    /// Render target view of a texture.
    pub fn render_target_view(&self, handle: TextureHandle) -> Result<DescriptorHandle, Error> {
        self.texture_view(handle, DescriptorView::RenderTarget)
    }

    /// Depth-stencil view of a texture.
    pub fn depth_stencil_view(&self, handle: TextureHandle) -> Result<DescriptorHandle, Error> {
        self.texture_view(handle, DescriptorView::DepthStencil)
    }

    /// Shader resource view of a texture.
    pub fn shader_resource_view(&self, handle: TextureHandle) -> Result<DescriptorHandle, Error> {
        self.texture_view(handle, DescriptorView::ShaderResource)
    }

    /// Unordered access view of a texture.
    pub fn unordered_access_view(&self, handle: TextureHandle) -> Result<DescriptorHandle, Error> {
        self.texture_view(handle, DescriptorView::UnorderedAccess)
    }

    /// Shader resource view of a buffer.
    pub fn buffer_shader_resource_view(&self, handle: BufferHandle) -> Result<DescriptorHandle, Error> {
        self.buffer_view(handle, DescriptorView::ShaderResource)
    }

    /// Unordered access view of a buffer.
    pub fn buffer_unordered_access_view(&self, handle: BufferHandle) -> Result<DescriptorHandle, Error> {
        self.buffer_view(handle, DescriptorView::UnorderedAccess)
    }
}
