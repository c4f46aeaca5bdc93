//! Exposes the settings used to configure a render graph.

use crate::graph::state::{ResourceState, StateMapping};

/// Settings for a [`RenderGraph`](crate::RenderGraph) and the barrier planner it uses while compiling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GraphSettings {
    /// Mapping from effective access to required state for color textures.
    pub texture_mapping: StateMapping,
    /// Mapping from effective access to required state for textures with a depth or stencil format.
    pub depth_stencil_mapping: StateMapping,
    /// Mapping from effective access to required state for buffers.
    pub buffer_mapping: StateMapping,
    /// State every resource is assumed to be in if no initial state was set.
    pub default_state: ResourceState,
    /// Whether to wrap every pass in a debug label while executing. Requires the `debug-markers` feature.
    pub debug_labels: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            texture_mapping: StateMapping::TEXTURE,
            depth_stencil_mapping: StateMapping::DEPTH_STENCIL,
            buffer_mapping: StateMapping::BUFFER,
            default_state: ResourceState::Common,
            debug_labels: cfg!(feature = "debug-markers"),
        }
    }
}

/// The settings builder is a convenience struct to easily create [`GraphSettings`].
///
/// For information about each of the fields, see [`GraphSettings`].
/// # Example
/// ```
/// use render_graph::prelude::*;
///
/// let settings = GraphSettingsBuilder::new()
///     .default_state(ResourceState::Undefined)
///     .buffer_mapping(StateMapping {
///         write: ResourceState::CopyDest,
///         ..StateMapping::BUFFER
///     })
///     .debug_labels(false)
///     .build();
/// let graph = RenderGraph::with_settings(settings);
/// ```
#[derive(Debug, Default)]
pub struct GraphSettingsBuilder {
    inner: GraphSettings,
}

impl GraphSettingsBuilder {
    /// Create a new settings builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mapping table for color textures.
    pub fn texture_mapping(mut self, mapping: StateMapping) -> Self {
        self.inner.texture_mapping = mapping;
        self
    }

    /// Sets the mapping table for depth-stencil textures.
    pub fn depth_stencil_mapping(mut self, mapping: StateMapping) -> Self {
        self.inner.depth_stencil_mapping = mapping;
        self
    }

    /// Sets the mapping table for buffers.
    pub fn buffer_mapping(mut self, mapping: StateMapping) -> Self {
        self.inner.buffer_mapping = mapping;
        self
    }

    /// Sets the state resources are assumed to start in.
    pub fn default_state(mut self, state: ResourceState) -> Self {
        self.inner.default_state = state;
        self
    }

    /// Enable or disable debug labels around passes.
    pub fn debug_labels(mut self, enabled: bool) -> Self {
        self.inner.debug_labels = enabled;
        self
    }

    /// Build the resulting settings.
    pub fn build(self) -> GraphSettings {
        self.inner
    }
}
