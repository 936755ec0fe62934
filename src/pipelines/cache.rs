//! Lazily built textured pipelines, one per distinct [`PipelineKey`].
//!
//! wgpu has no dynamic blend/depth/cull state, so every combination the
//! controls can reach becomes its own pipeline. They are built the first
//! time a key is used and kept until the owning scene ends.

use std::collections::HashMap;

use super::basic::{
    PipelineKey, draw_uniform_layout, mk_render_pipeline, texture_sampler_layout, texture_shader,
};

#[derive(Debug)]
pub struct PipelineCache {
    pub texture_layout: wgpu::BindGroupLayout,
    pub uniform_layout: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let texture_layout = texture_sampler_layout(device);
        let uniform_layout = draw_uniform_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Texture Pipeline Layout"),
            bind_group_layouts: &[&texture_layout, &uniform_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(texture_shader());
        Self {
            texture_layout,
            uniform_layout,
            layout,
            shader,
            color_format,
            sample_count,
            pipelines: HashMap::new(),
        }
    }

    /// Make sure a pipeline for `key` exists. Call before the render pass
    /// starts, then look it up with [`get`](Self::get).
    pub fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        log::debug!("Building pipeline {key:?}");
        let pipeline = mk_render_pipeline(
            device,
            &self.layout,
            &self.shader,
            self.color_format,
            self.sample_count,
            key,
        );
        self.pipelines.insert(key, pipeline);
    }

    pub fn get(&self, key: &PipelineKey) -> anyhow::Result<&wgpu::RenderPipeline> {
        self.pipelines
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("pipeline {key:?} was not prepared"))
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
