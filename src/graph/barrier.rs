//! The barrier planner tracks the last known state of every logical resource and computes the
//! transitions each pass needs.
//!
//! For every pass, all accesses to one resource are first reduced to a single effective access:
//! [`AccessKind::ReadWrite`] if the resource was both read and written, [`AccessKind::Write`] if it was only written,
//! and [`AccessKind::Read`] otherwise. The effective access is mapped to a required state through a
//! [`StateMapping`]. A barrier is only emitted if the required state differs from the tracked state, so planning
//! the same pass twice in a row yields no barriers the second time.
//!
//! Barriers of one pass are ordered by first appearance, with all inputs of the pass before its outputs.

use std::collections::HashMap;

use crate::{Error, GraphSettings, ResourceRegistry};
use crate::graph::pass::PassDesc;
use crate::graph::resource::{AccessKind, ResourceType};
use crate::graph::state::{Barrier, ResourceState, StateMapping};

#[derive(Debug, Default, Copy, Clone)]
struct AccessSummary {
    read: bool,
    written: bool,
}

impl AccessSummary {
    fn add(&mut self, access: AccessKind) {
        self.read |= access.is_read();
        self.written |= access.is_write();
    }

    fn effective(&self) -> Option<AccessKind> {
        match (self.read, self.written) {
            (true, true) => Some(AccessKind::ReadWrite),
            (false, true) => Some(AccessKind::Write),
            (true, false) => Some(AccessKind::Read),
            (false, false) => None,
        }
    }
}

/// Reduce a list of accesses to one effective access per resource index, in order of first appearance.
fn aggregate(accesses: impl Iterator<Item = (u32, AccessKind)>) -> Vec<(u32, AccessSummary)> {
    let mut summaries: Vec<(u32, AccessSummary)> = Vec::new();
    for (index, access) in accesses {
        match summaries.iter_mut().find(|(other, _)| *other == index) {
            Some((_, summary)) => summary.add(access),
            None => {
                let mut summary = AccessSummary::default();
                summary.add(access);
                summaries.push((index, summary));
            }
        }
    }
    summaries
}

/// Tracks resource states and computes the minimal set of barriers before each pass.
#[derive(Debug, Clone)]
pub struct BarrierPlanner {
    texture_states: Vec<ResourceState>,
    buffer_states: Vec<ResourceState>,
    texture_mapping: StateMapping,
    buffer_mapping: StateMapping,
    texture_overrides: HashMap<u32, StateMapping>,
    default_state: ResourceState,
}

impl Default for BarrierPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BarrierPlanner {
    /// Create a planner with the default mapping tables and no state slots.
    pub fn new() -> Self {
        Self::with_settings(&GraphSettings::default())
    }

    /// Create a planner using the mapping tables and default state from `settings`.
    pub fn with_settings(settings: &GraphSettings) -> Self {
        Self {
            texture_states: Vec::new(),
            buffer_states: Vec::new(),
            texture_mapping: settings.texture_mapping,
            buffer_mapping: settings.buffer_mapping,
            texture_overrides: HashMap::new(),
            default_state: settings.default_state,
        }
    }

    /// Create a planner sized to every resource in the registry. Textures with a depth or stencil format
    /// use the depth-stencil mapping from `settings`.
    pub fn for_registry(registry: &ResourceRegistry, settings: &GraphSettings) -> Self {
        let mut planner = Self::with_settings(settings);
        planner.initialize_textures(registry.texture_count());
        planner.initialize_buffers(registry.buffer_count());
        for (handle, desc) in registry.textures() {
            if desc.is_depth_stencil() {
                planner.set_texture_mapping(handle.index(), settings.depth_stencil_mapping);
            }
        }
        planner
    }

    /// Size the texture state slots. Every slot starts in the default state.
    pub fn initialize_textures(&mut self, count: usize) {
        self.texture_states.clear();
        self.texture_states.resize(count, self.default_state);
        self.texture_overrides.clear();
    }

    /// Size the buffer state slots. Every slot starts in the default state.
    pub fn initialize_buffers(&mut self, count: usize) {
        self.buffer_states.clear();
        self.buffer_states.resize(count, self.default_state);
    }

    /// Seed the tracked state of a texture, e.g. the known state of an acquired swapchain image.
    /// # Errors
    /// - Fails if the planner holds no state slot for this index.
    pub fn set_initial_texture_state(&mut self, index: u32, state: ResourceState) -> Result<(), Error> {
        let capacity = self.texture_states.len();
        let slot = self
            .texture_states
            .get_mut(index as usize)
            .ok_or(Error::PlannerUndersized {
                kind: ResourceType::Texture,
                index,
                capacity,
            })?;
        *slot = state;
        Ok(())
    }

    /// Seed the tracked state of a buffer.
    /// # Errors
    /// - Fails if the planner holds no state slot for this index.
    pub fn set_initial_buffer_state(&mut self, index: u32, state: ResourceState) -> Result<(), Error> {
        let capacity = self.buffer_states.len();
        let slot = self
            .buffer_states
            .get_mut(index as usize)
            .ok_or(Error::PlannerUndersized {
                kind: ResourceType::Buffer,
                index,
                capacity,
            })?;
        *slot = state;
        Ok(())
    }

    /// Use a different mapping table for one texture.
    pub fn set_texture_mapping(&mut self, index: u32, mapping: StateMapping) {
        self.texture_overrides.insert(index, mapping);
    }

    /// Mapping table used for a texture.
    pub fn texture_mapping(&self, index: u32) -> StateMapping {
        self.texture_overrides
            .get(&index)
            .copied()
            .unwrap_or(self.texture_mapping)
    }

    /// Mapping table used for buffers.
    pub fn buffer_mapping(&self) -> StateMapping {
        self.buffer_mapping
    }

    /// Currently tracked state of a texture.
    pub fn texture_state(&self, index: u32) -> Option<ResourceState> {
        self.texture_states.get(index as usize).copied()
    }

    /// Currently tracked state of a buffer.
    pub fn buffer_state(&self, index: u32) -> Option<ResourceState> {
        self.buffer_states.get(index as usize).copied()
    }

    /// Amount of texture state slots.
    pub fn texture_capacity(&self) -> usize {
        self.texture_states.len()
    }

    /// Amount of buffer state slots.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_states.len()
    }

    /// Compute the texture barriers needed before `pass`, and update the tracked states.
    /// # Errors
    /// - Fails if the pass accesses a texture the planner holds no slot for. No state is modified in that case.
    pub fn build_texture_barriers(&mut self, pass: &PassDesc) -> Result<Vec<Barrier>, Error> {
        let summaries = aggregate(
            pass.texture_accesses()
                .map(|access| (access.handle.index(), access.access)),
        );
        Self::check_capacity(&summaries, self.texture_states.len(), ResourceType::Texture)?;

        let mut barriers = Vec::new();
        for (index, summary) in summaries {
            let required = self.texture_mapping(index).required_state(summary.effective());
            let tracked = &mut self.texture_states[index as usize];
            if let Some(barrier) = Self::transition(ResourceType::Texture, index, tracked, required) {
                barriers.push(barrier);
            }
        }
        Ok(barriers)
    }

    /// Compute the buffer barriers needed before `pass`, and update the tracked states.
    /// # Errors
    /// - Fails if the pass accesses a buffer the planner holds no slot for. No state is modified in that case.
    pub fn build_buffer_barriers(&mut self, pass: &PassDesc) -> Result<Vec<Barrier>, Error> {
        let summaries = aggregate(
            pass.buffer_accesses()
                .map(|access| (access.handle.index(), access.access)),
        );
        Self::check_capacity(&summaries, self.buffer_states.len(), ResourceType::Buffer)?;

        let mapping = self.buffer_mapping;
        let mut barriers = Vec::new();
        for (index, summary) in summaries {
            let required = mapping.required_state(summary.effective());
            let tracked = &mut self.buffer_states[index as usize];
            if let Some(barrier) = Self::transition(ResourceType::Buffer, index, tracked, required) {
                barriers.push(barrier);
            }
        }
        Ok(barriers)
    }

    fn check_capacity(summaries: &[(u32, AccessSummary)], capacity: usize, kind: ResourceType) -> Result<(), Error> {
        match summaries
            .iter()
            .find(|(index, _)| *index as usize >= capacity)
        {
            Some(&(index, _)) => Err(Error::PlannerUndersized {
                kind,
                index,
                capacity,
            }),
            None => Ok(()),
        }
    }

    fn transition(kind: ResourceType, index: u32, tracked: &mut ResourceState, required: ResourceState) -> Option<Barrier> {
        if *tracked == required {
            return None;
        }
        let barrier = Barrier {
            kind,
            index,
            before: *tracked,
            after: required,
        };
        trace!("Planned {:?} #{} barrier {:?} -> {:?}", kind, index, barrier.before, barrier.after);
        *tracked = required;
        Some(barrier)
    }
}
