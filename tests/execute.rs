use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use ash::vk::Handle;

use framework::{Event, RecordingRecorder};
use render_graph::prelude::*;

mod framework;

#[test]
pub fn executes_in_declaration_order() -> Result<()> {
    framework::init_logging();
    let log = framework::event_log();
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    for name in ["A", "B", "C"] {
        graph.add_pass(name, |_| {}, framework::logging_pass(&log));
    }

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::new(&log);
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;
    assert_eq!(framework::pass_events(&log), ["A", "B", "C"]);
    Ok(())
}

#[test]
pub fn barriers_precede_their_pass() -> Result<()> {
    let log = framework::event_log();
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    let mut gbuffer = TextureHandle::INVALID;
    graph.add_pass("gbuffer", |builder| {
        gbuffer = builder.create_texture(framework::color_target(64, 64));
        builder.write_texture(gbuffer);
    }, framework::logging_pass(&log));
    graph.add_pass("lighting", |builder| {
        builder.read_texture(gbuffer);
    }, framework::logging_pass(&log));

    let mut compiled = graph.compile()?;
    let desc = *compiled.registry().texture_desc(gbuffer)?;
    compiled.bind_texture(gbuffer, PhysicalResource::image(vk::Image::null(), &desc))?;
    let mut recorder = RecordingRecorder::new(&log);
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;

    let barrier = |before, after| Barrier {
        kind: ResourceType::Texture,
        index: gbuffer.index(),
        before,
        after,
    };
    assert_eq!(
        *log.borrow(),
        [
            Event::Barriers(vec![(barrier(ResourceState::Common, ResourceState::RenderTarget), true)]),
            Event::Pass(String::from("gbuffer")),
            Event::Barriers(vec![(barrier(ResourceState::RenderTarget, ResourceState::ShaderResource), true)]),
            Event::Pass(String::from("lighting")),
        ]
    );
    Ok(())
}

#[test]
pub fn unbound_resources_are_passed_to_the_recorder() -> Result<()> {
    let log = framework::event_log();
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    let buffer = graph.create_buffer(framework::storage_buffer(64));
    graph.add_pass("fill", |builder| {
        builder.write_buffer(buffer);
    }, |_| Ok(()));

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::new(&log);
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;
    match &log.borrow()[0] {
        Event::Barriers(batch) => {
            assert_eq!(batch.len(), 1);
            assert!(!batch[0].1, "Nothing was bound to the buffer.");
        }
        other => panic!("Expected a barrier batch, got {:?}", other),
    }
    Ok(())
}

#[test]
pub fn no_recorder_executes_nothing() -> Result<()> {
    framework::init_logging();
    let log = framework::event_log();
    let mut graph = RenderGraph::new();
    graph.add_pass("skipped", |_| {}, framework::logging_pass(&log));

    let mut compiled = graph.compile()?;
    compiled.execute(&mut FrameContext::new(0))?;
    assert!(log.borrow().is_empty(), "No executor should run without a recorder.");
    Ok(())
}

#[test]
pub fn unnamed_pass_is_skipped() -> Result<()> {
    let log = framework::event_log();
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    graph.add_pass("first", |_| {}, framework::logging_pass(&log));
    graph.add_pass("", |_| {}, framework::logging_pass(&log));
    graph.add_pass("last", |_| {}, framework::logging_pass(&log));

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::new(&log);
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;
    assert_eq!(framework::pass_events(&log), ["first", "last"]);
    Ok(())
}

#[test]
pub fn executor_error_stops_execution() -> Result<()> {
    let log = framework::event_log();
    let mut graph = RenderGraph::new();
    graph.add_pass("broken", |_| {}, |_| Err(anyhow::anyhow!("pipeline missing")));
    graph.add_pass("after", |_| {}, framework::logging_pass(&log));

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::new(&log);
    let err = compiled
        .execute(&mut FrameContext::new(0).recorder(&mut recorder))
        .expect_err("Executor error should be propagated.");
    let message = format!("{:#}", err);
    assert!(message.contains("broken"), "{}", message);
    assert!(message.contains("pipeline missing"), "{}", message);
    assert!(framework::pass_events(&log).is_empty());
    // The label of the failed pass is still closed.
    #[cfg(feature = "debug-markers")]
    assert_eq!(*log.borrow(), [Event::BeginLabel(String::from("broken")), Event::EndLabel]);
    Ok(())
}

#[test]
pub fn context_only_resolves_declared_resources() -> Result<()> {
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    let declared = graph.create_texture(framework::color_target(64, 64));
    let other = graph.create_texture(framework::color_target(64, 64));
    let unbound = graph.create_buffer(framework::storage_buffer(64));
    let checked = Rc::new(Cell::new(false));
    let seen = checked.clone();
    graph.add_pass("post", |builder| {
        builder.read_texture(declared).read_buffer(unbound);
    }, move |ctx| {
        assert!(matches!(ctx.texture(declared)?, PhysicalResource::Image { .. }));
        assert!(matches!(ctx.texture(other), Err(Error::UndeclaredAccess { .. })));
        assert!(matches!(ctx.buffer(unbound), Err(Error::NoResourceBound(_))));
        assert!(matches!(ctx.shader_resource_view(declared), Err(Error::NoDescriptor { .. })));
        assert_eq!(ctx.frame_index(), 7);
        assert_eq!(ctx.recorder().native(), vk::CommandBuffer::null());
        seen.set(true);
        Ok(())
    });

    let mut compiled = graph.compile()?;
    let desc = *compiled.registry().texture_desc(declared)?;
    compiled.bind_texture(declared, PhysicalResource::image(vk::Image::null(), &desc))?;
    let mut recorder = RecordingRecorder::default();
    compiled.execute(&mut FrameContext::new(7).recorder(&mut recorder))?;
    assert!(checked.get(), "Executor should have run.");
    Ok(())
}

#[test]
pub fn undeclared_access_error_reaches_caller() -> Result<()> {
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    let hidden = graph.create_texture(framework::color_target(64, 64));
    graph.add_pass("sneaky", |_| {}, move |ctx| {
        ctx.texture(hidden)?;
        Ok(())
    });

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::default();
    let err = compiled
        .execute(&mut FrameContext::new(0).recorder(&mut recorder))
        .expect_err("Undeclared access should fail.");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UndeclaredAccess { .. })));
    Ok(())
}

#[test]
pub fn allocate_descriptors_by_usage() -> Result<()> {
    let mut graph = RenderGraph::with_settings(framework::quiet_settings());
    let color = graph.create_texture(framework::color_target(64, 64));
    let depth = graph.create_texture(framework::depth_target(64, 64));
    let particles = graph.create_buffer(framework::storage_buffer(1024));
    let skipped = graph.create_texture(framework::color_target(64, 64));
    let checked = Rc::new(Cell::new(false));
    let seen = checked.clone();
    graph.add_pass("particles", |builder| {
        builder.write_texture(color).write_texture(depth).read_write_texture(skipped).write_buffer(particles);
    }, move |ctx| {
        assert_eq!(ctx.render_target_view(color)?.heap, DescriptorHeapKind::RenderTarget);
        assert_eq!(ctx.depth_stencil_view(depth)?.heap, DescriptorHeapKind::DepthStencil);
        ctx.shader_resource_view(color)?;
        ctx.buffer_unordered_access_view(particles)?;
        ctx.buffer_shader_resource_view(particles)?;
        assert!(ctx.unordered_access_view(color).is_err());
        assert!(ctx.render_target_view(skipped).is_err(), "Unbound textures get no views.");
        seen.set(true);
        Ok(())
    });

    let mut compiled = graph.compile()?;
    for texture in [color, depth] {
        let desc = *compiled.registry().texture_desc(texture)?;
        compiled.bind_texture(texture, PhysicalResource::image(vk::Image::null(), &desc))?;
    }
    compiled.bind_buffer(particles, PhysicalResource::buffer(vk::Buffer::null(), 1024))?;

    let mut rtv = framework::CountingHeap::new(DescriptorHeapKind::RenderTarget, 8);
    let mut dsv = framework::CountingHeap::new(DescriptorHeapKind::DepthStencil, 8);
    let mut srv = framework::CountingHeap::new(DescriptorHeapKind::ShaderResource, 8);
    let mut recorder = RecordingRecorder::default();
    {
        let mut frame = FrameContext::new(0).heaps(&mut rtv, &mut dsv, &mut srv);
        compiled.allocate_descriptors(&mut frame)?;
        // Existing views are kept.
        compiled.allocate_descriptors(&mut frame)?;
    }
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;

    assert!(checked.get());
    assert_eq!(rtv.allocated, 1);
    assert_eq!(dsv.allocated, 1);
    // Color and depth shader resource views, buffer shader resource and unordered access views.
    assert_eq!(srv.allocated, 4);
    Ok(())
}

#[test]
pub fn allocate_descriptors_errors() -> Result<()> {
    let mut graph = RenderGraph::new();
    let color = graph.create_texture(framework::color_target(64, 64));
    let mut compiled = graph.compile()?;
    let desc = *compiled.registry().texture_desc(color)?;
    compiled.bind_texture(color, PhysicalResource::image(vk::Image::null(), &desc))?;

    assert_eq!(
        compiled.allocate_descriptors(&mut FrameContext::new(0)),
        Err(Error::NoDescriptorHeap(DescriptorHeapKind::RenderTarget))
    );

    let mut rtv = framework::CountingHeap::new(DescriptorHeapKind::RenderTarget, 1);
    let mut dsv = framework::CountingHeap::new(DescriptorHeapKind::DepthStencil, 1);
    let mut srv = framework::CountingHeap::new(DescriptorHeapKind::ShaderResource, 0);
    {
        let mut frame = FrameContext::new(0).heaps(&mut rtv, &mut dsv, &mut srv);
        assert_eq!(
            compiled.allocate_descriptors(&mut frame),
            Err(Error::DescriptorHeapExhausted(DescriptorHeapKind::ShaderResource))
        );
    }

    // Heaps passed in the wrong order are rejected instead of silently used.
    let mut rtv = framework::CountingHeap::new(DescriptorHeapKind::RenderTarget, 4);
    let mut dsv = framework::CountingHeap::new(DescriptorHeapKind::DepthStencil, 4);
    let mut srv = framework::CountingHeap::new(DescriptorHeapKind::ShaderResource, 4);
    let mut graph = RenderGraph::new();
    let target = graph.create_texture(framework::color_target(64, 64));
    let mut compiled = graph.compile()?;
    let desc = *compiled.registry().texture_desc(target)?;
    compiled.bind_texture(target, PhysicalResource::image(vk::Image::null(), &desc))?;
    let mut frame = FrameContext::new(0).heaps(&mut dsv, &mut rtv, &mut srv);
    assert_eq!(
        compiled.allocate_descriptors(&mut frame),
        Err(Error::DescriptorHeapMismatch {
            expected: DescriptorHeapKind::RenderTarget,
            found: DescriptorHeapKind::DepthStencil,
        })
    );
    drop(frame);
    assert_eq!(rtv.allocated + dsv.allocated, 0, "Nothing should be allocated from a mismatched heap.");
    Ok(())
}

#[test]
pub fn alias_history_texture() -> Result<()> {
    let mut graph = RenderGraph::new();
    let current = graph.create_texture(framework::color_target(64, 64));
    let history = graph.create_texture(framework::color_target(64, 64).history(true));
    let mut compiled = graph.compile()?;

    assert!(matches!(compiled.alias_texture(history, current), Err(Error::NoResourceBound(_))));
    let desc = *compiled.registry().texture_desc(current)?;
    let image = vk::Image::from_raw(0x1234);
    compiled.bind_texture(current, PhysicalResource::image(image, &desc))?;
    compiled.alias_texture(history, current)?;
    let aliased = compiled
        .bindings()
        .resolve(ResourceType::Texture, history.index())
        .and_then(|resource| resource.image_handle());
    assert_eq!(aliased, Some(image));
    Ok(())
}

#[test]
pub fn manual_descriptors() -> Result<()> {
    let mut graph = RenderGraph::new();
    let texture = graph.create_texture(framework::color_target(64, 64));
    let buffer = graph.create_buffer(framework::storage_buffer(64));
    let mut compiled = graph.compile()?;
    let view = DescriptorHandle {
        heap: DescriptorHeapKind::ShaderResource,
        index: 12,
    };

    compiled.set_texture_descriptor(texture, DescriptorView::ShaderResource, view)?;
    compiled.set_buffer_descriptor(buffer, DescriptorView::UnorderedAccess, view)?;
    assert!(compiled.set_buffer_descriptor(buffer, DescriptorView::RenderTarget, view).is_err());
    assert_eq!(compiled.descriptors().texture(texture.index(), DescriptorView::ShaderResource), Some(view));
    assert_eq!(compiled.descriptors().buffer(buffer.index(), DescriptorView::UnorderedAccess), Some(view));
    Ok(())
}

#[cfg(feature = "debug-markers")]
#[test]
pub fn passes_are_labeled() -> Result<()> {
    let log = framework::event_log();
    let mut graph = RenderGraph::new();
    graph.add_pass("labeled", |builder| {
        builder.color([0.0, 1.0, 0.0, 1.0]);
    }, framework::logging_pass(&log));

    let mut compiled = graph.compile()?;
    let mut recorder = RecordingRecorder::new(&log);
    compiled.execute(&mut FrameContext::new(0).recorder(&mut recorder))?;
    assert_eq!(
        *log.borrow(),
        [
            Event::BeginLabel(String::from("labeled")),
            Event::Pass(String::from("labeled")),
            Event::EndLabel,
        ]
    );
    Ok(())
}
