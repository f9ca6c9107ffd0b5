//! Standalone particle window backed by winit.
//!
//! Fills a [`ParticleRenderer`] with a random cloud and spins it. Drag with
//! the left mouse button to orbit, scroll to zoom, press `C` to switch
//! between the standard and CMYK programs.
//!
//! ```no_run
//! # use sphere_sprites::viewer::Viewer;
//! Viewer::builder()
//!     .with_title("Particles")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::{sync::Arc, time::Instant};

use glam::{Mat4, Vec2};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    camera::controller::CameraController,
    error::ParticleError,
    gpu::{
        render_context::RenderContext, shader_composer::ShaderComposer,
        texture::RenderTarget,
    },
    options::Options,
    renderer::particle::{ParticleRenderer, ShadingVariant, Transforms},
    util::cloud,
};

/// Radius of the generated particle cloud.
const CLOUD_RADIUS: f32 = 2.0;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Sphere Sprites".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays a spinning particle cloud.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::Viewer`] if the event loop cannot be created
    /// or exits abnormally.
    pub fn run(self) -> Result<(), ParticleError> {
        let event_loop = EventLoop::new()
            .map_err(|e| ParticleError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            scene: None,
            options: self.options,
            title: self.title,
            last_frame_time: Instant::now(),
            last_mouse_pos: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| ParticleError::Viewer(e.to_string()))
    }
}

// ── Scene ────────────────────────────────────────────────────────────────

/// Everything needed to draw one frame.
struct Scene {
    context: RenderContext,
    particles: ParticleRenderer,
    depth: RenderTarget,
    controller: CameraController,
    shading: ShadingVariant,
    spin: f32,
    angle: f32,
}

impl Scene {
    async fn new(
        window: Arc<Window>,
        options: &Options,
    ) -> Result<Self, ParticleError> {
        let size = window.inner_size();
        let context =
            RenderContext::new(window, (size.width, size.height)).await?;

        let mut composer = ShaderComposer::new()?;
        let mut particles =
            ParticleRenderer::new(&context, true, &mut composer)?;
        particles.apply_options(&options.particles);
        particles.set_screen_width(context.width());
        particles.resize(&context.device, options.particles.count);

        let mut controller = CameraController::new(
            &options.camera,
            context.width(),
            context.height(),
        );
        let mut writer = particles.bind_positions(&context.queue);
        writer.with_positions(|slots| {
            cloud::fill_ball(slots, CLOUD_RADIUS, &mut rand::rng());
            controller.fit_to_positions(slots);
        });
        writer.unbind();
        log::info!("uploaded {} particles", particles.capacity());

        let depth =
            RenderTarget::depth(&context.device, context.width(), context.height());

        Ok(Self {
            context,
            particles,
            depth,
            controller,
            shading: options.particles.shading,
            spin: options.camera.spin,
            angle: 0.0,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.depth = RenderTarget::depth(&self.context.device, width, height);
        self.controller.resize(width, height);
        self.particles.set_screen_width(width);
    }

    fn render(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        self.angle = (self.angle + self.spin * dt) % std::f32::consts::TAU;

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let camera = &self.controller.camera;
        let transforms = Transforms::new(
            Mat4::from_rotation_y(self.angle),
            camera.view_matrix(),
            camera.projection_matrix(),
        );

        let mut encoder = self.context.create_encoder();
        self.particles.begin_frame();
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Particle Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            depth_slice: None,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(BACKGROUND),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
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
            self.particles.draw_with(
                self.shading,
                &self.context,
                &mut pass,
                &transforms,
            );
        }
        self.context.submit(encoder);
        frame.present();
        Ok(())
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    options: Options,
    title: String,
    last_frame_time: Instant,
    last_mouse_pos: Option<Vec2>,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let scene =
            match pollster::block_on(Scene::new(window.clone(), &self.options))
            {
                Ok(s) => s,
                Err(e) => {
                    log::error!("Failed to initialize renderer: {e}");
                    event_loop.exit();
                    return;
                }
            };

        window.request_redraw();
        self.window = Some(window);
        self.scene = Some(scene);
        self.last_frame_time = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        let (Some(window), Some(scene)) = (&self.window, &mut self.scene)
        else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                scene.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::KeyC)
                {
                    scene.shading = scene.shading.toggled();
                    log::info!("shading: {:?}", scene.shading);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                scene.controller.mouse_pressed =
                    state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                if let Some(last) = self.last_mouse_pos {
                    if scene.controller.mouse_pressed {
                        scene.controller.rotate(pos - last);
                    }
                }
                self.last_mouse_pos = Some(pos);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                scene.controller.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame_time).as_secs_f32();
                self.last_frame_time = now;

                match scene.render(dt) {
                    Ok(()) => {}
                    Err(
                        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost,
                    ) => {
                        let inner = window.inner_size();
                        scene.resize(inner.width, inner.height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("Surface error: {e:?}"),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
