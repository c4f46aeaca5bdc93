//! The render graph system manages barriers between passes that run **on a single command list**, and
//! transitions resources into the state each pass needs. Each pass declares the textures and buffers it creates,
//! reads and writes through a [`PassBuilder`], and the graph plans the barriers while compiling.
//! All resources are referenced through lightweight [`TextureHandle`] and [`BufferHandle`] values.
//!
//! Physical resources and descriptor views need to be bound to the [`CompiledGraph`] before executing it.
//!
//! Through [`CompiledGraph::as_dot()`], it's possible to export a graphviz-compatible dot file to display the pass dependencies.
//!
//! # Example
//!
//! ```
//! use render_graph::prelude::*;
//!
//! let mut graph = RenderGraph::new();
//! let mut scene = TextureHandle::INVALID;
//! graph.add_pass("scene", |builder| {
//!     scene = builder.create_texture(
//!         TextureDesc::new(1280, 720, vk::Format::R16G16B16A16_SFLOAT).usage(TextureUsage::RenderTarget),
//!     );
//!     builder.write_texture(scene);
//! }, |_ctx| Ok(()));
//! graph.add_pass("tonemap", |builder| {
//!     builder.read_texture(scene);
//! }, |_ctx| Ok(()));
//!
//! let compiled = graph.compile()?;
//! assert_eq!(compiled.passes()[1].dependencies(), [0]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! For more complex passes, see the [`pass`] module documentation.
//!
//! # Executing
//!
//! A compiled graph is executed with a [`FrameContext`], which carries the [`CommandRecorder`](crate::CommandRecorder)
//! for this frame. Barriers are recorded right before the pass that needs them, then the pass executor is called.

pub mod handle;
pub mod resource;
pub mod registry;
pub mod state;
pub mod barrier;
pub mod pass;
pub mod physical_resource;
pub mod context;
pub mod compiled;
pub mod render_graph;

pub use handle::{BufferHandle, TextureHandle};
pub use pass::PassBuilder;
pub use compiled::CompiledGraph;
pub use context::FrameContext;
pub use render_graph::RenderGraph;
