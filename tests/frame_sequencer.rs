#![allow(clippy::unwrap_used, clippy::panic)]

//! End-to-end frames on a headless adapter. Every test returns early when
//! the machine has no usable GPU.

use std::path::Path;

use dynasurf::{
    gpu::render_context::RenderContext,
    options::Options,
    renderer::{plan::PassKind, FrameOutcome, FrameSequencer},
    scene::{helix_bundle, HelixParams, Scene},
    view::{OutputTarget, ViewState},
};
use glam::{Mat4, Vec3};
use rand::{rngs::StdRng, SeedableRng};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const SIZE: (u32, u32) = (160, 120);

fn context() -> Option<RenderContext> {
    match pollster::block_on(RenderContext::headless(FORMAT, SIZE.0, SIZE.1)) {
        Ok(context) => Some(context),
        Err(e) => {
            log::warn!("no headless adapter, skipping: {e}");
            None
        }
    }
}

fn small_scene() -> Scene {
    let params = HelixParams {
        chains: 2,
        residues: 24,
        timesteps: 2,
        jitter: 0.3,
    };
    helix_bundle(&params, &mut StdRng::seed_from_u64(7))
}

fn sequencer(context: &RenderContext, scene: Scene, options: Options) -> FrameSequencer {
    FrameSequencer::new(context, scene, options, Path::new("does-not-exist"))
        .unwrap()
}

fn output(context: &RenderContext) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Output"),
        size: wgpu::Extent3d {
            width: SIZE.0,
            height: SIZE.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn view_of(scene: &Scene) -> ViewState {
    let (center, radius) = scene.bounding_sphere();
    let mut view = ViewState::new(SIZE, 0.8, 0.5, radius * 10.0 + 10.0);
    view.view = Mat4::look_at_rh(center + Vec3::Z * (radius * 3.0 + 1.0), center, Vec3::Y);
    view
}

fn render(
    context: &RenderContext,
    sequencer: &mut FrameSequencer,
    view: &ViewState,
) -> FrameOutcome {
    let (texture, target) = output(context);
    sequencer
        .display(context, view, OutputTarget::new(&texture, &target))
        .unwrap()
}

/// Copy `texture` back to the host as tightly packed RGBA8 rows.
fn read_pixels(context: &RenderContext, texture: &wgpu::Texture) -> Vec<u8> {
    let row = SIZE.0 * 4;
    let padded = row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Readback"),
        size: u64::from(padded * SIZE.1),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(SIZE.1),
            },
        },
        wgpu::Extent3d {
            width: SIZE.0,
            height: SIZE.1,
            depth_or_array_layers: 1,
        },
    );
    context.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    let mapped = loop {
        let _ = context.device.poll(wgpu::PollType::Poll);
        if let Ok(result) = receiver.try_recv() {
            break result;
        }
    };
    mapped.unwrap();

    let data = slice.get_mapped_range();
    let pixels = data
        .chunks(padded as usize)
        .flat_map(|line| &line[..row as usize])
        .copied()
        .collect();
    drop(data);
    staging.unmap();
    pixels
}

#[test]
fn resize_round_trip_restores_every_target() {
    let Some(context) = context() else {
        return;
    };
    let mut sequencer = sequencer(&context, small_scene(), Options::default());
    let original = sequencer.resources().targets.dimensions();

    assert_eq!(sequencer.resize(&context, (320, 200)), (320, 200));
    assert_ne!(sequencer.resources().targets.dimensions(), original);

    assert_eq!(sequencer.resize(&context, SIZE), SIZE);
    assert_eq!(sequencer.resources().targets.dimensions(), original);
}

#[test]
fn empty_scene_is_skipped() {
    let Some(context) = context() else {
        return;
    };
    let scene = Scene::default();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());

    let outcome = render(&context, &mut sequencer, &view);
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert_eq!(outcome.draws(), 0);
    assert!(sequencer.last_uniforms().is_none());
}

#[test]
fn define_toggles_reload_once_each_way() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());

    let _ = render(&context, &mut sequencer, &view);
    assert_eq!(sequencer.reloads(), 0);

    sequencer.options_mut().depth_of_field.enabled = true;
    let _ = render(&context, &mut sequencer, &view);
    assert_eq!(sequencer.reloads(), 1);
    let _ = render(&context, &mut sequencer, &view);
    assert_eq!(sequencer.reloads(), 1);

    sequencer.options_mut().depth_of_field.enabled = false;
    let _ = render(&context, &mut sequencer, &view);
    assert_eq!(sequencer.reloads(), 2);
}

#[test]
fn non_define_options_do_not_reload() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());

    sequencer.options_mut().surface.sharpness = 4.0;
    sequencer.options_mut().lod.interpolation = 0.3;
    let _ = render(&context, &mut sequencer, &view);
    assert_eq!(sequencer.reloads(), 0);
}

#[test]
fn identical_inputs_give_identical_uniforms() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());

    let first_outcome = render(&context, &mut sequencer, &view);
    let first = sequencer.last_uniforms().copied();
    let second_outcome = render(&context, &mut sequencer, &view);
    let second = sequencer.last_uniforms().copied();

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(first_outcome, second_outcome);
}

#[test]
fn identical_inputs_give_identical_pixels() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut options = Options::default();
    options.lighting.ambient_occlusion = true;
    options.lod.interpolation = 0.75;
    let mut sequencer = sequencer(&context, scene, options);
    let (texture, target) = output(&context);

    let mut frames = Vec::new();
    for _ in 0..2 {
        let outcome = sequencer
            .display(&context, &view, OutputTarget::new(&texture, &target))
            .unwrap();
        assert_ne!(outcome, FrameOutcome::Skipped);
        frames.push(read_pixels(&context, &texture));
    }

    let background = &frames[0][..4];
    assert!(frames[0].chunks(4).any(|pixel| pixel != background));
    assert!(frames[0] == frames[1], "repeated frame changed pixels");
}

#[test]
fn skipped_frame_leaves_previous_image() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());
    let (texture, target) = output(&context);

    let outcome = sequencer
        .display(&context, &view, OutputTarget::new(&texture, &target))
        .unwrap();
    assert_ne!(outcome, FrameOutcome::Skipped);
    let shown = read_pixels(&context, &texture);

    sequencer.set_scene(&context, Scene::default());
    let outcome = sequencer
        .display(&context, &view, OutputTarget::new(&texture, &target))
        .unwrap();
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert!(read_pixels(&context, &texture) == shown, "skipped frame touched the output");
}

#[test]
fn full_resolution_frames_blit_and_scaled_frames_display() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut sequencer = sequencer(&context, scene, Options::default());

    let FrameOutcome::Rendered { passes, draws } = render(&context, &mut sequencer, &view)
    else {
        panic!("default frame should render");
    };
    assert!(draws > 0);
    assert!(passes.contains(&PassKind::Surface));
    assert!(passes.contains(&PassKind::Shade));
    assert_eq!(passes.last(), Some(&PassKind::Blit));

    sequencer.options_mut().display.resolution_scale = 0.5;
    let FrameOutcome::Rendered { passes, .. } = render(&context, &mut sequencer, &view) else {
        panic!("scaled frame should render");
    };
    assert_eq!(passes.last(), Some(&PassKind::Display));
    assert_eq!(sequencer.resources().size(), (80, 60));
}

#[test]
fn every_feature_renders() {
    let Some(context) = context() else {
        return;
    };
    let scene = small_scene();
    let view = view_of(&scene);
    let mut options = Options::default();
    options.lighting.ambient_occlusion = true;
    options.depth_of_field.enabled = true;
    options.surface.lens = true;
    options.animation.animate = true;
    options.debug.show_grid = true;
    options.debug.shadows = true;
    options.lod.interpolation = 0.75;
    let mut sequencer = sequencer(&context, scene, options);

    let FrameOutcome::Rendered { passes, .. } = render(&context, &mut sequencer, &view) else {
        panic!("frame should render");
    };
    for pass in [
        PassKind::GridBin,
        PassKind::Shadow,
        PassKind::AmbientSample,
        PassKind::AmbientBlurVertical,
        PassKind::GridOverlay,
        PassKind::DepthOfFieldBlend,
    ] {
        assert!(passes.contains(&pass), "missing {pass:?}");
    }

    sequencer.options_mut().debug.visualize_overlaps = true;
    let FrameOutcome::Rendered { passes, .. } = render(&context, &mut sequencer, &view) else {
        panic!("overlap frame should render");
    };
    assert!(passes.contains(&PassKind::Overlaps));
    assert!(!passes.contains(&PassKind::Shade));
}
