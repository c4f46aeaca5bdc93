#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use render_graph::prelude::*;

/// Something that happened while executing a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A batch of barriers, and whether a physical resource was bound for each of them.
    Barriers(Vec<(Barrier, bool)>),
    BeginLabel(String),
    EndLabel,
    /// Pushed by pass executors.
    Pass(String),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Command recorder that logs everything it is asked to record.
#[derive(Debug, Default)]
pub struct RecordingRecorder {
    pub log: EventLog,
}

impl RecordingRecorder {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
        }
    }
}

impl CommandRecorder for RecordingRecorder {
    fn resource_barriers(&mut self, barriers: &[ResolvedBarrier<'_>]) -> Result<()> {
        let batch = barriers
            .iter()
            .map(|resolved| (resolved.barrier, resolved.resource.is_some()))
            .collect();
        self.log.borrow_mut().push(Event::Barriers(batch));
        Ok(())
    }

    fn begin_label(&mut self, name: &str, _color: [f32; 4]) -> Result<()> {
        self.log.borrow_mut().push(Event::BeginLabel(name.to_owned()));
        Ok(())
    }

    fn end_label(&mut self) {
        self.log.borrow_mut().push(Event::EndLabel);
    }
}

/// Descriptor heap that hands out increasing indices up to a fixed capacity.
#[derive(Debug)]
pub struct CountingHeap {
    pub kind: DescriptorHeapKind,
    pub capacity: u32,
    pub allocated: u32,
}

impl CountingHeap {
    pub fn new(kind: DescriptorHeapKind, capacity: u32) -> Self {
        Self {
            kind,
            capacity,
            allocated: 0,
        }
    }
}

impl DescriptorHeap for CountingHeap {
    fn kind(&self) -> DescriptorHeapKind {
        self.kind
    }

    fn allocate(&mut self) -> Option<DescriptorHandle> {
        if self.allocated >= self.capacity {
            return None;
        }
        let handle = DescriptorHandle {
            heap: self.kind,
            index: self.allocated,
        };
        self.allocated += 1;
        Some(handle)
    }
}

/// Enable log output for tests. Safe to call more than once.
pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

pub fn color_target(width: u32, height: u32) -> TextureDesc {
    TextureDesc::new(width, height, vk::Format::R8G8B8A8_UNORM).usage(TextureUsage::RenderTarget)
}

pub fn depth_target(width: u32, height: u32) -> TextureDesc {
    TextureDesc::new(width, height, vk::Format::D32_SFLOAT).usage(TextureUsage::DepthStencil)
}

pub fn storage_buffer(size: u64) -> BufferDesc {
    BufferDesc::new(size, BufferUsage::Storage)
}

/// Settings without debug labels, so event logs only contain barriers and passes.
pub fn quiet_settings() -> GraphSettings {
    GraphSettingsBuilder::new().debug_labels(false).build()
}

/// Build a pass declaration outside of a graph.
pub fn declare(registry: &mut ResourceRegistry, name: &str, build: impl FnOnce(&mut PassBuilder<'_>)) -> PassDesc {
    let mut desc = PassDesc::new(name);
    build(&mut PassBuilder::new(registry, &mut desc));
    desc
}

/// Executor that logs its pass name.
pub fn logging_pass(log: &EventLog) -> impl FnMut(&mut ExecutionContext<'_>) -> Result<()> + 'static {
    let log = log.clone();
    move |ctx| {
        log.borrow_mut().push(Event::Pass(ctx.pass_name().to_owned()));
        Ok(())
    }
}

pub fn pass_events(log: &EventLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Pass(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}
