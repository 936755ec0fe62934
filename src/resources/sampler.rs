//! Control-facing sampler parameters and their wgpu descriptors.

use crate::controls::Cycle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

impl Cycle for WrapMode {
    fn options() -> &'static [Self] {
        &[
            WrapMode::ClampToEdge,
            WrapMode::Repeat,
            WrapMode::MirroredRepeat,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

impl Cycle for MagFilter {
    fn options() -> &'static [Self] {
        &[MagFilter::Nearest, MagFilter::Linear]
    }
}

/// Minification filters in GL naming: `<texel filter>MipmapNearest|Linear`.
/// The plain variants sample only the base level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl MinFilter {
    /// `(texel filter, mip filter, uses mips)`
    fn split(self) -> (wgpu::FilterMode, wgpu::FilterMode, bool) {
        use wgpu::FilterMode::{Linear, Nearest};
        match self {
            MinFilter::Nearest => (Nearest, Nearest, false),
            MinFilter::Linear => (Linear, Nearest, false),
            MinFilter::NearestMipmapNearest => (Nearest, Nearest, true),
            MinFilter::NearestMipmapLinear => (Nearest, Linear, true),
            MinFilter::LinearMipmapNearest => (Linear, Nearest, true),
            MinFilter::LinearMipmapLinear => (Linear, Linear, true),
        }
    }
}

impl Cycle for MinFilter {
    fn options() -> &'static [Self] {
        &[
            MinFilter::Nearest,
            MinFilter::Linear,
            MinFilter::NearestMipmapNearest,
            MinFilter::NearestMipmapLinear,
            MinFilter::LinearMipmapNearest,
            MinFilter::LinearMipmapLinear,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            mag_filter: MagFilter::Nearest,
            min_filter: MinFilter::Nearest,
        }
    }
}

impl SamplerSettings {
    /// Repeat with full trilinear filtering.
    pub fn trilinear() -> Self {
        Self {
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            mag_filter: MagFilter::Linear,
            min_filter: MinFilter::LinearMipmapLinear,
        }
    }

    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let (min_filter, mipmap_filter, mipmapped) = self.min_filter.split();
        wgpu::SamplerDescriptor {
            label: Some("Lesson Sampler"),
            address_mode_u: self.wrap_s.to_wgpu(),
            address_mode_v: self.wrap_t.to_wgpu(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: match self.mag_filter {
                MagFilter::Nearest => wgpu::FilterMode::Nearest,
                MagFilter::Linear => wgpu::FilterMode::Linear,
            },
            min_filter,
            mipmap_filter,
            lod_min_clamp: 0.0,
            lod_max_clamp: if mipmapped { 32.0 } else { 0.0 },
            ..Default::default()
        }
    }

    pub fn create(&self, device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&self.descriptor())
    }
}
