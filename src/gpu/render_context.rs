use std::fmt;

/// Failure to obtain a device or a presentable surface.
#[derive(Debug)]
pub enum RenderContextError {
    /// The window handle could not back a wgpu surface.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter matched the request.
    NoAdapter(wgpu::RequestAdapterError),
    /// The adapter refused the device request.
    Device(wgpu::RequestDeviceError),
    /// The adapter cannot present to the surface.
    UnsupportedSurface,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "cannot create surface: {e}"),
            Self::NoAdapter(e) => write!(f, "no usable adapter: {e}"),
            Self::Device(e) => write!(f, "device request refused: {e}"),
            Self::UnsupportedSurface => {
                f.write_str("adapter cannot present to this surface")
            }
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::NoAdapter(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::UnsupportedSurface => None,
        }
    }
}

/// Where finished frames go.
enum Presentation {
    /// Caller-owned textures only.
    Offscreen,
    /// A configured window surface.
    Window {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
}

/// Device, queue and target description shared by every particle draw.
///
/// The context always knows a colour format and a pixel size, whether or not
/// it presents to a window. Pipelines are built against [`format`](Self::format)
/// and sprites are sized from [`width`](Self::width).
pub struct RenderContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
    /// The wgpu command queue.
    pub queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    presentation: Presentation,
}

/// Request an adapter (compatible with `surface` when given) and a device
/// with downlevel limits raised to what the adapter supports.
async fn open_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderContextError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: surface,
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        })
        .await
        .map_err(RenderContextError::NoAdapter)?;
    log::debug!("adapter: {:?}", adapter.get_info());

    let limits =
        wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Particle Device"),
            required_limits: limits,
            ..Default::default()
        })
        .await
        .map_err(RenderContextError::Device)?;
    Ok((adapter, device, queue))
}

impl RenderContext {
    /// Offscreen context rendering to `format` textures of the given size.
    ///
    /// # Errors
    ///
    /// Fails when no adapter is available or the device request is refused.
    pub async fn headless(
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let (_, device, queue) = open_device(&instance, None).await?;
        Ok(Self::from_device(device, queue, format, width, height))
    }

    /// Wrap a device and queue the caller already owns. Rendering goes to
    /// caller-provided textures.
    #[must_use]
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            device,
            queue,
            format,
            width: width.max(1),
            height: height.max(1),
            presentation: Presentation::Offscreen,
        }
    }

    /// Context presenting to `window`, sized `(width, height)` pixels.
    ///
    /// # Errors
    ///
    /// Fails when the surface cannot be created, no compatible adapter
    /// exists, the device request is refused or the adapter cannot present
    /// to the surface.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        (width, height): (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(RenderContextError::Surface)?;
        let (adapter, device, queue) =
            open_device(&instance, Some(&surface)).await?;

        let (width, height) = (width.max(1), height.max(1));
        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or(RenderContextError::UnsupportedSurface)?;
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            format: config.format,
            width,
            height,
            presentation: Presentation::Window { surface, config },
        })
    }

    /// Colour format every pipeline targets.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Track a new target size, reconfiguring the window surface if there is
    /// one. Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        if let Presentation::Window { surface, config } = &mut self.presentation
        {
            config.width = width;
            config.height = height;
            surface.configure(&self.device, config);
        }
    }

    /// Next window texture to draw into.
    ///
    /// # Errors
    ///
    /// Passes through surface errors. An offscreen context reports
    /// [`wgpu::SurfaceError::Lost`].
    pub fn get_next_frame(
        &self,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        match &self.presentation {
            Presentation::Window { surface, .. } => {
                surface.get_current_texture()
            }
            Presentation::Offscreen => Err(wgpu::SurfaceError::Lost),
        }
    }

    /// Whether frames can be presented to a window.
    pub fn has_surface(&self) -> bool {
        matches!(self.presentation, Presentation::Window { .. })
    }

    /// Fresh command encoder on this device.
    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Encoder"),
            })
    }

    /// Finish `encoder` and submit it.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
    }
}
