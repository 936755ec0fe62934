//! Offscreen GPU setup shared by the GPU integration tests.

#![allow(dead_code)]

use std::iter;

use cgmath::Deg;
use render_lessons::{
    camera::{CameraView, Projection},
    context::{InitContext, RenderTargets, SAMPLE_COUNT},
    scenes::Scene,
};

pub const SIZE: u32 = 256;
/// Frames are rendered in gamma space, like on a non-sRGB surface.
pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub async fn headless_gpu() -> anyhow::Result<InitContext> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("headless device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;
    Ok(InitContext {
        device,
        queue,
        color_format: FORMAT,
        sample_count: SAMPLE_COUNT,
    })
}

/// Draw one frame of `scene` offscreen and read the resolved image back.
pub async fn render_frame(
    gpu: &InitContext,
    scene: &mut impl Scene,
) -> anyhow::Result<Vec<u8>> {
    let device = &gpu.device;
    let output = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("output"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = output.create_view(&wgpu::TextureViewDescriptor::default());
    let targets = RenderTargets::new(device, [SIZE, SIZE], FORMAT, gpu.sample_count);
    let camera = CameraView::new(
        &scene.camera(),
        &Projection::new(SIZE, SIZE, Deg(45.0), 0.1, 100.0),
    );

    let u32_size = std::mem::size_of::<u32>() as u32;
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (u32_size * SIZE * SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("headless encoder"),
    });
    scene.draw(gpu, &mut encoder, targets.frame(&view), &camera)?;
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &output,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(u32_size * SIZE),
                rows_per_image: Some(SIZE),
            },
        },
        output.size(),
    );
    gpu.queue.submit(iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    device.poll(wgpu::PollType::Wait)?;
    rx.receive().await.ok_or_else(|| anyhow::anyhow!("map callback dropped"))??;

    let pixels = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(pixels)
}

/// RGBA of the pixel at `(x, y)` of a frame read back by [`render_frame`].
pub fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
    let at = ((y * SIZE + x) * 4) as usize;
    [frame[at], frame[at + 1], frame[at + 2], frame[at + 3]]
}
