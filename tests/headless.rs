//! Offscreen rendering against a real adapter.
//!
//! Each test skips (passes) when no adapter is available, so the suite still
//! runs on machines without a GPU or software rasterizer. Capacity, setter
//! and writer bookkeeping is also covered by the device-free unit tests next
//! to the renderer; these check what only a real draw can show.

#![allow(clippy::unwrap_used, clippy::panic, clippy::print_stderr)]

use glam::{Mat4, Vec3};
use sphere_sprites::{
    camera::core::Camera,
    error::ParticleError,
    gpu::{
        render_context::RenderContext, shader_composer::ShaderComposer,
        texture::RenderTarget,
    },
    options::{CameraOptions, ParticleOptions},
    renderer::particle::{ParticleRenderer, ShadingVariant, Transforms},
};

const SIZE: u32 = 64;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
// 64 px * 4 bytes is already a multiple of COPY_BYTES_PER_ROW_ALIGNMENT.
const BYTES_PER_ROW: u32 = SIZE * 4;

fn context() -> Option<RenderContext> {
    match pollster::block_on(RenderContext::headless(FORMAT, SIZE, SIZE)) {
        Ok(context) => Some(context),
        Err(e) => {
            eprintln!("skipping: no adapter ({e})");
            None
        }
    }
}

fn renderer(context: &RenderContext) -> ParticleRenderer {
    let mut composer = ShaderComposer::new().unwrap();
    ParticleRenderer::new(context, true, &mut composer).unwrap()
}

fn transforms() -> Transforms {
    let camera = Camera::from_options(&CameraOptions::default(), 1.0);
    Transforms::new(
        Mat4::IDENTITY,
        camera.view_matrix(),
        camera.projection_matrix(),
    )
}

/// Record `draw` into a fresh colour/depth pair and read the colour back as
/// tightly packed RGBA rows.
fn render(
    context: &RenderContext,
    particles: &mut ParticleRenderer,
    draw: impl FnOnce(&mut ParticleRenderer, &mut wgpu::RenderPass<'_>),
) -> Vec<u8> {
    let color = RenderTarget::new(&context.device, SIZE, SIZE, FORMAT);
    let depth = RenderTarget::depth(&context.device, SIZE, SIZE);
    let readback = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback"),
        size: u64::from(BYTES_PER_ROW * SIZE),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = context.create_encoder();
    particles.begin_frame();
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        draw(particles, &mut pass);
    }
    encoder.copy_texture_to_buffer(
        color.texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_ROW),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    context.submit(encoder);

    let slice = readback.slice(..);
    slice.map_async(wgpu::MapMode::Read, |result| result.unwrap());
    let _ = context.device.poll(wgpu::PollType::Wait).unwrap();
    let pixels = slice.get_mapped_range().to_vec();
    readback.unmap();
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

/// One large particle at the origin, seen from the default camera.
fn single_particle(context: &RenderContext) -> ParticleRenderer {
    let mut particles = renderer(context);
    particles.resize(&context.device, 1);
    particles
        .set_positions(&context.queue, &[Vec3::ZERO])
        .unwrap();
    particles.set_screen_width(SIZE);
    particles.set_particle_size(3.0);
    particles
}

#[test]
fn upload_respects_capacity() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);

    particles.resize(&context.device, 10);
    assert_eq!(particles.capacity(), 10);

    let ten = vec![Vec3::ONE; 10];
    assert!(particles.set_positions(&context.queue, &ten).is_ok());

    let eleven = vec![Vec3::ONE; 11];
    match particles.set_positions(&context.queue, &eleven) {
        Err(ParticleError::CapacityExceeded {
            requested,
            capacity,
        }) => {
            assert_eq!(requested, 11);
            assert_eq!(capacity, 10);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
}

#[test]
fn resize_to_zero_draws_nothing() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);
    particles.resize(&context.device, 0);
    assert_eq!(particles.capacity(), 0);
    assert!(particles.set_positions(&context.queue, &[]).is_ok());

    let transforms = transforms();
    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw(&context, pass, &transforms);
    });
    assert!(pixels.chunks(4).all(|px| px[..3] == [0, 0, 0]));
}

#[test]
fn setters_are_reflected() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);
    assert_eq!(particles.screen_width(), SIZE);

    particles.set_screen_width(1920);
    particles.set_particle_size(0.25);
    particles.set_color(1.0, 0.0, 0.5);
    assert_eq!(particles.screen_width(), 1920);
    assert_eq!(particles.particle_size(), 0.25);
    assert_eq!(particles.color(), Vec3::new(1.0, 0.0, 0.5));

    particles.apply_options(&ParticleOptions::default());
    assert_eq!(particles.particle_size(), ParticleOptions::default().size);
    assert_eq!(particles.params().screen_width, 1920);
}

#[test]
fn standard_sprite_is_a_lit_disc() {
    let Some(context) = context() else { return };
    let mut particles = single_particle(&context);
    let transforms = transforms();

    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw(&context, pass, &transforms);
    });

    let center = pixel(&pixels, SIZE / 2, SIZE / 2);
    assert!(center[2] > 100, "center not lit: {center:?}");
    assert!(center[0] < 10, "red leaked into default colour: {center:?}");
    // The sprite is 32 px across: its quad corners are discarded, and
    // nothing lands outside the quad.
    assert_eq!(pixel(&pixels, 17, 17)[..3], [0, 0, 0]);
    assert_eq!(pixel(&pixels, 46, 46)[..3], [0, 0, 0]);
    assert_eq!(pixel(&pixels, 0, 0)[..3], [0, 0, 0]);
}

#[test]
fn cmyk_colours_first_particle_cyan() {
    let Some(context) = context() else { return };
    let mut particles = single_particle(&context);
    particles.set_color(1.0, 0.0, 0.0);
    let transforms = transforms();

    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw_with(ShadingVariant::Cmyk, &context, pass, &transforms);
    });

    let center = pixel(&pixels, SIZE / 2, SIZE / 2);
    assert!(center[0] < 10, "uniform colour used by CMYK: {center:?}");
    assert!(center[1] > 100 && center[2] > 100, "not cyan: {center:?}");
}

/// Pixel column a world-space x on the z = 0 plane lands in.
fn column(x: f32) -> u32 {
    let options = CameraOptions::default();
    let half_width = options.distance * (options.fovy.to_radians() / 2.0).tan();
    let half = SIZE as f32 / 2.0;
    (half + x / half_width * half) as u32
}

fn lit(pixels: &[u8], x: f32) -> bool {
    pixel(pixels, column(x), SIZE / 2)[2] > 60
}

#[test]
fn partial_writes_keep_other_particles() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);
    particles.resize(&context.device, 2);
    particles.set_screen_width(SIZE);
    particles.set_particle_size(1.5);
    particles
        .set_positions(
            &context.queue,
            &[Vec3::new(-1.2, 0.0, 0.0), Vec3::new(1.2, 0.0, 0.0)],
        )
        .unwrap();

    let mut writer = particles.bind_positions(&context.queue);
    assert_eq!(writer.capacity(), 2);
    assert!(writer.write(2, &[Vec3::ZERO]).is_err());
    writer.write(1, &[Vec3::ZERO]).unwrap();
    assert_eq!(writer.dirty(), Some(1..2));
    writer.unbind();

    let transforms = transforms();
    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw(&context, pass, &transforms);
    });
    assert!(lit(&pixels, -1.2), "untouched slot lost");
    assert!(lit(&pixels, 0.0), "written slot not uploaded");
    assert!(!lit(&pixels, 1.2), "old position still drawn");
}

#[test]
fn empty_bind_keeps_positions() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);
    particles.resize(&context.device, 1);
    particles.set_screen_width(SIZE);
    particles.set_particle_size(1.5);
    particles
        .set_positions(&context.queue, &[Vec3::new(1.2, 0.0, 0.0)])
        .unwrap();

    particles.bind_positions(&context.queue).unbind();

    let transforms = transforms();
    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw(&context, pass, &transforms);
    });
    assert!(lit(&pixels, 1.2));
    assert!(!lit(&pixels, 0.0));
}

#[test]
fn dropped_writer_still_uploads() {
    let Some(context) = context() else { return };
    let mut particles = renderer(&context);
    particles.resize(&context.device, 1);
    particles.set_screen_width(SIZE);
    particles.set_particle_size(1.5);

    {
        let mut writer = particles.bind_positions(&context.queue);
        writer.with_positions(|slots| slots[0] = Vec3::new(-1.2, 0.0, 0.0));
    }

    let transforms = transforms();
    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw(&context, pass, &transforms);
    });
    assert!(lit(&pixels, -1.2));
    assert!(!lit(&pixels, 0.0));
}

#[test]
fn many_draws_in_one_pass_keep_their_own_matrices() {
    let Some(context) = context() else { return };
    let mut particles = single_particle(&context);
    particles.set_particle_size(0.9);
    let scene = transforms();
    let xs: Vec<f32> = (0..6).map(|i| -2.0 + 0.8 * i as f32).collect();

    let pixels = render(&context, &mut particles, |p, pass| {
        for &x in &xs {
            let moved = Transforms {
                model: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
                ..scene
            };
            p.draw(&context, pass, &moved);
        }
    });

    for &x in &xs {
        assert!(lit(&pixels, x), "draw at x = {x} missing");
    }
}

#[test]
fn headless_context_has_no_surface() {
    let Some(context) = context() else { return };
    assert!(!context.has_surface());
    assert_eq!(context.format(), FORMAT);
    assert_eq!((context.width(), context.height()), (SIZE, SIZE));
    assert!(context.get_next_frame().is_err());
}

#[test]
fn external_buffers_draw_with_both_programs() {
    let Some(context) = context() else { return };
    let mut particles = single_particle(&context);
    let shared = particles.position_buffer().clone();
    assert_eq!(
        ParticleRenderer::position_layout().array_stride,
        sphere_sprites::renderer::particle::POSITION_STRIDE
    );

    // Draw the same shared buffer twice in one pass: the standard program
    // on the left half of the screen, CMYK nudged to the right.
    let scene = transforms();
    let left = Transforms {
        model: Mat4::from_translation(Vec3::new(-1.2, 0.0, 0.0)),
        ..scene
    };
    let right = Transforms {
        model: Mat4::from_translation(Vec3::new(1.2, 0.0, 0.0)),
        ..scene
    };
    particles.set_particle_size(1.5);

    let pixels = render(&context, &mut particles, |p, pass| {
        p.draw_external(&context, pass, &shared, 1, &left);
        p.draw_external_cmyk(&context, pass, &shared, 1, &right);
    });

    let quarter = SIZE / 4;
    let standard = pixel(&pixels, quarter, SIZE / 2);
    let cmyk = pixel(&pixels, SIZE - quarter, SIZE / 2);
    assert!(standard[2] > 60 && standard[1] < cmyk[1], "{standard:?} {cmyk:?}");
    assert!(cmyk[1] > 60 && cmyk[2] > 60, "{cmyk:?}");
}
