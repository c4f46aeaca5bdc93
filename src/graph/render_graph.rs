//! The render graph owns the resource registry and the list of declared passes of one graph generation.

use anyhow::Result;

use crate::{Error, GraphSettings};
use crate::graph::barrier::BarrierPlanner;
use crate::graph::compiled::{dependencies, CompiledGraph, CompiledPass};
use crate::graph::context::ExecutionContext;
use crate::graph::handle::{BufferHandle, TextureHandle};
use crate::graph::pass::{Pass, PassBuilder, PassDesc, PassExecutor};
use crate::graph::physical_resource::{DescriptorTables, PhysicalResourceBindings};
use crate::graph::registry::ResourceRegistry;
use crate::graph::resource::{BufferDesc, TextureDesc};
use crate::graph::state::ResourceState;

/// Render graph. Passes are declared with [`RenderGraph::add_pass()`], then the graph is turned into an
/// execution plan with [`RenderGraph::compile()`].
///
/// Passes always execute in declaration order. The graph does not reorder passes or remove passes whose
/// outputs are never used.
///
/// # Example
/// ```
/// use render_graph::prelude::*;
///
/// let mut graph = RenderGraph::new();
/// for name in ["A", "B", "C"] {
///     graph.add_pass(name, |_| {}, |_| Ok(()));
/// }
/// let compiled = graph.compile()?;
/// assert_eq!(compiled.pass_names(), ["A", "B", "C"]);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct RenderGraph<'cb> {
    registry: ResourceRegistry,
    passes: Vec<Pass<'cb>>,
    settings: GraphSettings,
    initial_texture_states: Vec<(TextureHandle, ResourceState)>,
    initial_buffer_states: Vec<(BufferHandle, ResourceState)>,
}

impl<'cb> RenderGraph<'cb> {
    /// Create an empty render graph with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty render graph with the given settings.
    pub fn with_settings(settings: GraphSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// The settings of this graph.
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// The resource registry of this graph.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Add a pass. `build` is called immediately to declare the resources the pass creates and accesses.
    /// `execute` is stored and called when the compiled graph is executed.
    pub fn add_pass<B, F>(&mut self, name: impl Into<String>, build: B, execute: F)
    where
        B: FnOnce(&mut PassBuilder<'_>),
        F: FnMut(&mut ExecutionContext<'_>) -> Result<()> + 'cb, {
        self.add_pass_with_executor(name, build, execute);
    }

    /// Add a pass with any [`PassExecutor`]. See [`RenderGraph::add_pass()`].
    pub fn add_pass_with_executor<B>(&mut self, name: impl Into<String>, build: B, executor: impl PassExecutor + 'cb)
    where
        B: FnOnce(&mut PassBuilder<'_>), {
        let mut desc = PassDesc::new(name);
        {
            let mut builder = PassBuilder::new(&mut self.registry, &mut desc);
            build(&mut builder);
        }
        trace!(
            "Declared pass `{}` with {} texture and {} buffer accesses",
            desc.name(),
            desc.texture_accesses().count(),
            desc.buffer_accesses().count()
        );
        self.passes.push(Pass {
            desc,
            execute: Box::new(executor),
        });
    }

    /// Create a texture outside of any pass.
    pub fn create_texture(&mut self, desc: TextureDesc) -> TextureHandle {
        self.registry.create_texture(desc)
    }

    /// Create a buffer outside of any pass.
    pub fn create_buffer(&mut self, desc: BufferDesc) -> BufferHandle {
        self.registry.create_buffer(desc)
    }

    /// Create a texture whose contents live outside the graph, like a swapchain image, in a known state.
    pub fn import_texture(&mut self, desc: TextureDesc, state: ResourceState) -> TextureHandle {
        let handle = self.registry.create_texture(desc);
        if handle.is_valid() {
            self.initial_texture_states.push((handle, state));
        }
        handle
    }

    /// Create a buffer whose contents live outside the graph, in a known state.
    pub fn import_buffer(&mut self, desc: BufferDesc, state: ResourceState) -> BufferHandle {
        let handle = self.registry.create_buffer(desc);
        if handle.is_valid() {
            self.initial_buffer_states.push((handle, state));
        }
        handle
    }

    /// Set the state a texture is in before the first pass.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    pub fn set_initial_texture_state(&mut self, handle: TextureHandle, state: ResourceState) -> Result<(), Error> {
        self.registry.texture_slot(handle)?;
        self.initial_texture_states.push((handle, state));
        Ok(())
    }

    /// Set the state a buffer is in before the first pass.
    /// # Errors
    /// - Fails if the handle does not belong to this graph.
    pub fn set_initial_buffer_state(&mut self, handle: BufferHandle, state: ResourceState) -> Result<(), Error> {
        self.registry.buffer_slot(handle)?;
        self.initial_buffer_states.push((handle, state));
        Ok(())
    }

    /// Amount of declared passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Names of all declared passes, in declaration order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Compile all declared passes into an execution plan. The graph is consumed: its passes and its registry
    /// move into the compiled graph, so every handle issued by this graph can still be used for binding
    /// physical resources. Build a new graph for the next frame.
    ///
    /// Barriers are planned for every valid pass in declaration order. Passes without a name are kept in the plan,
    /// but do not take part in barrier planning and are skipped while executing.
    ///
    /// A graph can only be compiled once:
    /// ```compile_fail
    /// use render_graph::prelude::*;
    ///
    /// let graph = RenderGraph::new();
    /// let first = graph.compile()?;
    /// let second = graph.compile()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    /// # Errors
    /// - Fails if barrier planning fails. This indicates an implementation error.
    pub fn compile(self) -> Result<CompiledGraph<'cb>> {
        let texture_count = self.registry.texture_count();
        let buffer_count = self.registry.buffer_count();
        let mut planner = BarrierPlanner::for_registry(&self.registry, &self.settings);
        for (handle, state) in &self.initial_texture_states {
            planner.set_initial_texture_state(handle.index(), *state)?;
        }
        for (handle, state) in &self.initial_buffer_states {
            planner.set_initial_buffer_state(handle.index(), *state)?;
        }

        let passes = self.passes;
        let deps = {
            let descs = passes.iter().map(|pass| pass.desc()).collect::<Vec<_>>();
            dependencies(&descs)
        };

        let mut compiled_passes = Vec::with_capacity(passes.len());
        for (pass, dependencies) in passes.into_iter().zip(deps) {
            let mut barriers = Vec::new();
            if pass.desc.is_valid() {
                barriers.extend(planner.build_texture_barriers(&pass.desc)?);
                barriers.extend(planner.build_buffer_barriers(&pass.desc)?);
            } else {
                warn!("Pass #{} has no name and will be skipped", compiled_passes.len());
            }
            compiled_passes.push(CompiledPass {
                pass,
                barriers,
                dependencies,
            });
        }

        debug!(
            "Compiled {} passes over {} textures and {} buffers with {} barriers",
            compiled_passes.len(),
            texture_count,
            buffer_count,
            compiled_passes.iter().map(|pass| pass.barriers.len()).sum::<usize>()
        );

        Ok(CompiledGraph {
            passes: compiled_passes,
            registry: self.registry,
            bindings: PhysicalResourceBindings::new(texture_count, buffer_count),
            descriptors: DescriptorTables::new(texture_count, buffer_count),
            final_texture_states: (0..texture_count as u32)
                .filter_map(|index| planner.texture_state(index))
                .collect(),
            final_buffer_states: (0..buffer_count as u32)
                .filter_map(|index| planner.buffer_state(index))
                .collect(),
            debug_labels: self.settings.debug_labels,
        })
    }

    /// Remove all passes and resources. All handles issued before the reset become stale.
    pub fn reset(&mut self) {
        self.passes.clear();
        self.initial_texture_states.clear();
        self.initial_buffer_states.clear();
        self.registry.reset();
    }
}
