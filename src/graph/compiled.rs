//! The compiled graph is the execution plan produced by [`RenderGraph::compile()`](crate::RenderGraph::compile).
//!
//! Passes are stored in declaration order, each together with the barriers that must be issued right before it.
//! Physical resources and descriptor views are bound to the compiled graph before executing it.
//!
//! # Example
//! ```
//! use render_graph::prelude::*;
//!
//! let mut graph = RenderGraph::new();
//! let backbuffer = graph.import_texture(
//!     TextureDesc::new(1280, 720, vk::Format::B8G8R8A8_SRGB).usage(TextureUsage::RenderTarget),
//!     ResourceState::Present,
//! );
//! graph.add_pass("draw", |builder| {
//!     builder.write_texture(backbuffer);
//! }, |_ctx| Ok(()));
//!
//! let mut compiled = graph.compile()?;
//! assert_eq!(compiled.passes()[0].barriers().len(), 1);
//! let desc = *compiled.registry().texture_desc(backbuffer)?;
//! compiled.bind_texture(backbuffer, PhysicalResource::image(vk::Image::null(), &desc))?;
//! // Without a recorder, nothing is executed.
//! compiled.execute(&mut FrameContext::new(0))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::Graph;

use crate::Error;
use crate::graph::context::{ExecutionContext, FrameContext};
use crate::graph::handle::{BufferHandle, TextureHandle};
use crate::graph::pass::{Pass, PassDesc};
use crate::graph::physical_resource::{DescriptorTables, PhysicalResource, PhysicalResourceBindings};
use crate::graph::registry::ResourceRegistry;
use crate::graph::resource::{BufferUsage, ResourceType, TextureUsage};
use crate::graph::state::{Barrier, ResourceState};
use crate::recorder::{DescriptorHandle, DescriptorView, ResolvedBarrier};

/// A pass in the execution plan, with the barriers to issue before it.
#[derive(Debug)]
pub struct CompiledPass<'cb> {
    pub(crate) pass: Pass<'cb>,
    pub(crate) barriers: Vec<Barrier>,
    pub(crate) dependencies: Vec<usize>,
}

impl<'cb> CompiledPass<'cb> {
    /// Get the pass name
    pub fn name(&self) -> &str {
        self.pass.name()
    }

    /// Get the declaration of this pass.
    pub fn desc(&self) -> &PassDesc {
        self.pass.desc()
    }

    /// Barriers issued right before this pass.
    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    /// Indices of earlier passes that last wrote a resource this pass accesses.
    /// Informational only, execution always follows declaration order.
    pub fn dependencies(&self) -> &[usize] {
        &self.dependencies
    }

    /// Check whether this pass can be executed.
    /// # Errors
    /// - Fails if the pass has no name.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pass.desc.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidPass(String::from("pass has no name")))
        }
    }
}

/// A compiled render graph, ready for binding physical resources and executing.
#[derive(Debug)]
pub struct CompiledGraph<'cb> {
    pub(crate) passes: Vec<CompiledPass<'cb>>,
    pub(crate) registry: ResourceRegistry,
    pub(crate) bindings: PhysicalResourceBindings,
    pub(crate) descriptors: DescriptorTables,
    pub(crate) final_texture_states: Vec<ResourceState>,
    pub(crate) final_buffer_states: Vec<ResourceState>,
    pub(crate) debug_labels: bool,
}

/// Compute, for every pass, the earlier passes that last wrote each resource it accesses.
pub(crate) fn dependencies(passes: &[&PassDesc]) -> Vec<Vec<usize>> {
    let mut last_writer: HashMap<(ResourceType, u32), usize> = HashMap::new();
    passes
        .iter()
        .enumerate()
        .map(|(index, pass)| {
            let accesses = pass
                .texture_accesses()
                .map(|access| ((ResourceType::Texture, access.handle.index()), access.access))
                .chain(
                    pass.buffer_accesses()
                        .map(|access| ((ResourceType::Buffer, access.handle.index()), access.access)),
                )
                .collect::<Vec<_>>();

            let mut deps = accesses
                .iter()
                .filter_map(|(key, _)| last_writer.get(key).copied())
                .collect::<Vec<_>>();
            deps.sort_unstable();
            deps.dedup();

            // Unnamed passes never run, so they cannot produce a resource.
            if !pass.is_valid() {
                return deps;
            }
            for (key, access) in accesses {
                if access.is_write() {
                    last_writer.insert(key, index);
                }
            }
            deps
        })
        .collect()
}

impl<'cb> CompiledGraph<'cb> {
    /// All passes in execution order.
    pub fn passes(&self) -> &[CompiledPass<'cb>] {
        &self.passes
    }

    /// Names of all passes in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// The resource registry the graph was compiled from. Handles issued while declaring passes stay valid here.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Amount of logical textures in the graph.
    pub fn texture_count(&self) -> usize {
        self.registry.texture_count()
    }

    /// Amount of logical buffers in the graph.
    pub fn buffer_count(&self) -> usize {
        self.registry.buffer_count()
    }

    /// Physical resource bindings of the graph.
    pub fn bindings(&self) -> &PhysicalResourceBindings {
        &self.bindings
    }

    /// Descriptor views of the graph.
    pub fn descriptors(&self) -> &DescriptorTables {
        &self.descriptors
    }

    fn texture_slot(&self, handle: TextureHandle) -> Result<usize, Error> {
        self.registry.texture_slot(handle)
    }

    fn buffer_slot(&self, handle: BufferHandle) -> Result<usize, Error> {
        self.registry.buffer_slot(handle)
    }

    /// Bind a physical resource to a texture.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    /// - Fails if `resource` is not an image.
    pub fn bind_texture(&mut self, handle: TextureHandle, resource: PhysicalResource) -> Result<(), Error> {
        let slot = self.texture_slot(handle)?;
        if !matches!(resource, PhysicalResource::Image { .. }) {
            return Err(Error::Uncategorized("Textures can only be bound to images"));
        }
        self.bindings.bind(ResourceType::Texture, slot, resource);
        Ok(())
    }

    /// Bind a physical resource to a buffer.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    /// - Fails if `resource` is not a buffer.
    pub fn bind_buffer(&mut self, handle: BufferHandle, resource: PhysicalResource) -> Result<(), Error> {
        let slot = self.buffer_slot(handle)?;
        if !matches!(resource, PhysicalResource::Buffer { .. }) {
            return Err(Error::Uncategorized("Buffers can only be bound to buffers"));
        }
        self.bindings.bind(ResourceType::Buffer, slot, resource);
        Ok(())
    }

    /// Bind the physical resource of `src` to `dst` as well, e.g. to read last frame's output as a history texture.
    /// # Errors
    /// - Fails if either handle does not belong to this graph, or `src` is not bound.
    pub fn alias_texture(&mut self, dst: TextureHandle, src: TextureHandle) -> Result<(), Error> {
        let dst_slot = self.texture_slot(dst)?;
        let src_slot = self.texture_slot(src)?;
        if self.bindings.alias_texture(dst_slot, src_slot) {
            Ok(())
        } else {
            Err(Error::NoResourceBound(src.to_string()))
        }
    }

    /// Store a descriptor view of a texture.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    pub fn set_texture_descriptor(&mut self, handle: TextureHandle, view: DescriptorView, descriptor: DescriptorHandle) -> Result<(), Error> {
        let slot = self.texture_slot(handle)?;
        self.descriptors.set_texture(slot, view, descriptor);
        Ok(())
    }

    /// Store a descriptor view of a buffer.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    /// - Fails if `view` is not a shader resource or unordered access view.
    pub fn set_buffer_descriptor(&mut self, handle: BufferHandle, view: DescriptorView, descriptor: DescriptorHandle) -> Result<(), Error> {
        let slot = self.buffer_slot(handle)?;
        if self.descriptors.set_buffer(slot, view, descriptor) {
            Ok(())
        } else {
            Err(Error::Uncategorized("Buffers only have shader resource and unordered access views"))
        }
    }

    /// Allocate descriptor views for every bound resource from the heaps in `frame`.
    /// Which views are allocated depends on the usage of the resource. Views that already exist are kept.
    /// # Errors
    /// - Fails if a required heap is missing from `frame`, or is exhausted.
    pub fn allocate_descriptors(&mut self, frame: &mut FrameContext<'_>) -> Result<(), Error> {
        for (handle, desc) in self.registry.textures() {
            let index = handle.index() as usize;
            if self.bindings.resolve(ResourceType::Texture, handle.index()).is_none() {
                continue;
            }
            let views: &[DescriptorView] = match desc.usage {
                TextureUsage::Sampled => &[DescriptorView::ShaderResource],
                TextureUsage::RenderTarget => &[DescriptorView::RenderTarget, DescriptorView::ShaderResource],
                TextureUsage::DepthStencil => &[DescriptorView::DepthStencil, DescriptorView::ShaderResource],
                TextureUsage::Storage => &[DescriptorView::UnorderedAccess, DescriptorView::ShaderResource],
            };
            for &view in views {
                if self.descriptors.texture(index as u32, view).is_none() {
                    let descriptor = frame.allocate(view)?;
                    self.descriptors.set_texture(index, view, descriptor);
                }
            }
        }

        for (handle, desc) in self.registry.buffers() {
            let index = handle.index() as usize;
            if self.bindings.resolve(ResourceType::Buffer, handle.index()).is_none() {
                continue;
            }
            let views: &[DescriptorView] = match desc.usage {
                BufferUsage::Storage => &[DescriptorView::UnorderedAccess, DescriptorView::ShaderResource],
                _ => &[DescriptorView::ShaderResource],
            };
            for &view in views {
                if self.descriptors.buffer(index as u32, view).is_none() {
                    let descriptor = frame.allocate(view)?;
                    self.descriptors.set_buffer(index, view, descriptor);
                }
            }
        }
        Ok(())
    }

    /// State a texture is left in after the last pass. Useful to seed the next frame.
    pub fn final_texture_state(&self, handle: TextureHandle) -> Option<ResourceState> {
        let slot = self.texture_slot(handle).ok()?;
        self.final_texture_states.get(slot).copied()
    }

    /// State a buffer is left in after the last pass.
    pub fn final_buffer_state(&self, handle: BufferHandle) -> Option<ResourceState> {
        let slot = self.buffer_slot(handle).ok()?;
        self.final_buffer_states.get(slot).copied()
    }

    /// Export the pass dependencies as a graphviz-compatible dot file.
    pub fn as_dot(&self) -> String {
        let mut graph = Graph::<String, String>::new();
        let nodes = self
            .passes
            .iter()
            .map(|pass| graph.add_node(pass.name().to_owned()))
            .collect::<Vec<_>>();
        for (index, pass) in self.passes.iter().enumerate() {
            for &dependency in pass.dependencies() {
                graph.add_edge(nodes[dependency], nodes[index], String::new());
            }
        }
        let invalid = self
            .passes
            .iter()
            .map(|pass| pass.validate().is_err())
            .collect::<Vec<_>>();
        let edge_attributes = |_, _: EdgeReference<'_, String>| String::new();
        let node_attributes = |_, (node, _): (NodeIndex, &String)| {
            if invalid[node.index()] {
                String::from("fillcolor = \"#f75e70\"")
            } else {
                String::from("fillcolor = \"#5e6df7\"")
            }
        };
        let dot = Dot::with_attr_getters(&graph, &[Config::EdgeNoLabel], &edge_attributes, &node_attributes);
        format!("{}", dot)
    }

    /// Execute every pass in order. Before each pass, its barriers are recorded, then its executor is called.
    ///
    /// If the frame context has no recorder, nothing is executed. Passes that fail validation are skipped.
    /// # Errors
    /// - Fails if the recorder fails to record a barrier.
    /// - Fails if a pass executor returns an error.
    pub fn execute(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        let frame_index = frame.frame_index;
        let Some(recorder) = frame.recorder.as_deref_mut() else {
            warn!("No command recorder in frame context, skipping {} passes", self.passes.len());
            return Ok(());
        };

        for compiled in &mut self.passes {
            if let Err(err) = compiled.validate() {
                warn!("Skipping pass: {}", err);
                continue;
            }

            if !compiled.barriers.is_empty() {
                let resolved = compiled
                    .barriers
                    .iter()
                    .map(|barrier| {
                        #[cfg(feature = "log-barriers")]
                        trace!("[{}] {:?} #{}: {:?} -> {:?}", compiled.pass.name(), barrier.kind, barrier.index, barrier.before, barrier.after);
                        ResolvedBarrier {
                            barrier: *barrier,
                            resource: self.bindings.resolve(barrier.kind, barrier.index),
                        }
                    })
                    .collect::<Vec<_>>();
                recorder
                    .resource_barriers(&resolved)
                    .with_context(|| format!("recording barriers for pass `{}`", compiled.pass.name()))?;
            }

            let label = cfg!(feature = "debug-markers") && self.debug_labels;
            if label {
                recorder.begin_label(compiled.pass.name(), compiled.pass.desc.color.unwrap_or([1.0, 1.0, 1.0, 1.0]))?;
            }

            let mut ctx = ExecutionContext {
                recorder: &mut *recorder,
                pass: &compiled.pass.desc,
                bindings: &self.bindings,
                descriptors: &self.descriptors,
                frame_index,
            };
            let result = compiled.pass.execute.execute(&mut ctx);
            // Close the label even if the pass failed, so the command buffer stays balanced.
            if label {
                recorder.end_label();
            }
            result.with_context(|| format!("executing pass `{}`", compiled.pass.desc.name()))?;
        }
        Ok(())
    }
}
