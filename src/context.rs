use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Deg;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraController, CameraView, Projection},
    data_structures::texture::Texture,
};

/// Every scene renders into a multisampled target, which alpha-to-coverage
/// needs, and resolves into the single-sampled output.
pub const SAMPLE_COUNT: u32 = 4;

/// The multisampled color and depth attachments of a frame.
#[derive(Debug)]
pub struct RenderTargets {
    pub msaa: Texture,
    pub depth: Texture,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        Self {
            msaa: Texture::create_msaa_target(device, size, sample_count, format, "msaa_texture"),
            depth: Texture::create_depth_texture(device, size, sample_count, "depth_texture"),
        }
    }

    /// Attachments for a frame that resolves into `output`.
    pub fn frame<'a>(&'a self, output: &'a wgpu::TextureView) -> FrameTarget<'a> {
        FrameTarget {
            color: &self.msaa.view,
            resolve: output,
            depth: &self.depth.view,
        }
    }
}

/// Views a scene draws into for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub resolve: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

/// Fly camera state owned by the context and driven by input events.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub projection: Projection,
}

impl CameraResources {
    pub fn view(&self) -> CameraView {
        CameraView::new(&self.camera, &self.projection)
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) targets: RenderTargets,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Format frames are rendered in. Never sRGB, see [`surface_formats`].
    pub color_format: wgpu::TextureFormat,
    pub camera: CameraResources,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::info!("Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("cannot open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, color_format) =
            surface_formats(&surface_caps.formats).context("the surface supports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: if color_format == surface_format {
                vec![]
            } else {
                vec![color_format]
            },
            desired_maximum_frame_latency: 2,
        };

        let targets = RenderTargets::new(
            &device,
            [config.width, config.height],
            color_format,
            SAMPLE_COUNT,
        );

        let camera = CameraResources {
            camera: Camera::new((0.0, 0.0, 3.0), Deg(-90.0), Deg(0.0)),
            controller: CameraController::new(4.0, 0.004),
            projection: Projection::new(config.width, config.height, Deg(45.0), 0.1, 100.0),
        };

        Ok(Self {
            window,
            targets,
            surface,
            device,
            queue,
            config,
            color_format,
            camera,
            clear_colour: wgpu::Color::BLACK,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.camera.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.targets = RenderTargets::new(
            &self.device,
            [width, height],
            self.color_format,
            SAMPLE_COUNT,
        );
    }
}

/// Pick the surface format and the format frames are rendered in.
///
/// Lessons blend and clear in gamma space, like a WebGL canvas: colour values
/// reach the screen unconverted. A non-sRGB surface format is preferred. If
/// the surface only offers sRGB formats, frames render through a non-sRGB view
/// of it.
pub fn surface_formats(
    supported: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let surface = supported
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| supported.first().copied())?;
    Some((surface, surface.remove_srgb_suffix()))
}

/// The device-side part of a [`Context`], handed to scenes.
///
/// Holds no window, so scenes can also be driven offscreen.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    pub sample_count: u32,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        // wgpu devices and queues are reference counted, this only clones the handle.
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            color_format: ctx.color_format,
            sample_count: SAMPLE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use wgpu::TextureFormat;

    use super::*;

    #[test]
    fn linear_surface_formats_are_preferred() {
        let supported = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            surface_formats(&supported),
            Some((TextureFormat::Bgra8Unorm, TextureFormat::Bgra8Unorm))
        );
    }

    #[test]
    fn srgb_only_surfaces_render_through_a_linear_view() {
        let supported = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(
            surface_formats(&supported),
            Some((TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba8Unorm))
        );
        assert_eq!(surface_formats(&[]), None);
    }
}
