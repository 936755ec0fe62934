//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around a wgpu texture and its
//! default view, plus helpers for the render targets every scene draws into
//! (multisampled color and depth) and for uploading images with an optional
//! vertical flip and a CPU-generated mip chain.

use image::{RgbaImage, imageops};

/// A GPU texture with its default view.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// How pixel data is laid out on the GPU when uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Store the last row first, so texture coordinate `v = 0` reads the
    /// bottom of the image.
    pub flip_y: bool,
    pub mipmaps: bool,
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            flip_y: true,
            mipmaps: true,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// `sample_count` must match the color target of the pass it is used in.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
        label: &str,
    ) -> Self {
        Self::create_attachment(device, size, sample_count, Self::DEPTH_FORMAT, label)
    }

    /// Create the multisampled color attachment that gets resolved into the
    /// surface (or an offscreen texture) at the end of a pass.
    pub fn create_msaa_target(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        Self::create_attachment(device, size, sample_count, format, label)
    }

    fn create_attachment(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Upload an 8-bit RGBA image. Texels are sampled as stored, without an
    /// sRGB decode, to match the gamma-space frame.
    ///
    /// With `upload.mipmaps` the smaller levels are filtered on the CPU, since
    /// wgpu has no equivalent of `generateMipmap`.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
        upload: Upload,
    ) -> Self {
        let mut level = if upload.flip_y {
            imageops::flip_vertical(image)
        } else {
            image.clone()
        };
        let (width, height) = level.dimensions();
        let mip_level_count = if upload.mipmaps {
            mip_level_count(width, height)
        } else {
            1
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for mip_level in 0..mip_level_count {
            write_level(queue, &texture, mip_level, &level, 4);
            if mip_level + 1 < mip_level_count {
                let (w, h) = level.dimensions();
                level = imageops::resize(
                    &level,
                    (w / 2).max(1),
                    (h / 2).max(1),
                    imageops::FilterType::Triangle,
                );
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Upload single-channel float data as a 16-bit float red texture.
    ///
    /// Sampling yields `(r, 0, 0, 1)`. No mip chain is built for float data.
    pub fn from_red_f32(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        data: &[f32],
        label: &str,
        flip_y: bool,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == (width * height) as usize,
            "{label}: expected {} texels, got {}",
            width * height,
            data.len()
        );
        let mut rows: Vec<&[f32]> = data.chunks(width as usize).collect();
        if flip_y {
            rows.reverse();
        }
        let bytes: Vec<u8> = rows
            .into_iter()
            .flatten()
            .flat_map(|v| half::f16::from_f32(*v).to_le_bytes())
            .collect();

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(2 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view })
    }

    /// Free the GPU memory now instead of when the last reference drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

fn write_level(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    level: &RgbaImage,
    bytes_per_texel: u32,
) {
    let (width, height) = level.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
        },
        level.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_texel * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
