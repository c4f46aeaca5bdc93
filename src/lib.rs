//! Render graph for Vulkan command recording
//!
//! This crate lets a renderer declare its frame as a list of passes. Each pass declares which textures and buffers
//! it reads and writes, and the graph works out the barriers needed between them. Execution records those barriers
//! and calls each pass in declaration order.
//!
//! To get started, the easiest way is to simply
//! ```
//! // Import all important types and traits
//! use render_graph::prelude::*;
//! // Or, import types under a namespace.
//! use render_graph::prelude as rg;
//! ```
//!
//! # Example
//!
//! First, we create a graph and import the swapchain image, which is in the present state at the start of the frame.
//! ```
//! use render_graph::prelude::*;
//!
//! let mut graph = RenderGraph::new();
//! let swapchain = graph.import_texture(
//!     TextureDesc::new(1920, 1080, vk::Format::B8G8R8A8_SRGB).usage(TextureUsage::RenderTarget),
//!     ResourceState::Present,
//! );
//! # let _ = swapchain;
//! ```
//! Then, passes are added. The build closure declares accesses, the executor records commands later.
//! ```
//! # use render_graph::prelude::*;
//! # let mut graph = RenderGraph::new();
//! # let swapchain = graph.import_texture(TextureDesc::new(1920, 1080, vk::Format::B8G8R8A8_SRGB), ResourceState::Present);
//! graph.add_pass("clear", |builder| {
//!     builder.write_texture(swapchain);
//! }, move |ctx| {
//!     let _image = ctx.texture(swapchain)?;
//!     Ok(())
//! });
//! ```
//! Finally the graph is compiled, physical resources are bound, and the graph is executed into a recorder.
//! ```
//! # use render_graph::prelude::*;
//! # let mut graph = RenderGraph::new();
//! # let swapchain = graph.import_texture(TextureDesc::new(1920, 1080, vk::Format::B8G8R8A8_SRGB), ResourceState::Present);
//! # graph.add_pass("clear", |builder| { builder.write_texture(swapchain); }, |_| Ok(()));
//! let mut compiled = graph.compile()?;
//! let desc = *compiled.registry().texture_desc(swapchain)?;
//! compiled.bind_texture(swapchain, PhysicalResource::image(vk::Image::null(), &desc))?;
//! // With a real device, pass a `VulkanRecorder` to the frame context.
//! compiled.execute(&mut FrameContext::new(0))?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//! For further example code, check out the following modules
//! - [`graph`] for declaring passes and compiling the graph.
//! - [`graph::pass`] for the pass builder.
//! - [`recorder`] for the command recorder and descriptor heap interfaces.
//! - [`settings`] for configuring barrier planning.

#[macro_use]
extern crate derivative;
#[macro_use] extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod error;
pub mod settings;
pub mod recorder;
pub mod graph;
pub mod util;
