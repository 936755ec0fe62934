//! GPU state shared by the lesson scenes.
//!
//! A scene allocates one [`SceneResources`] in `start` and hands it back to
//! [`SceneResources::release`] in `end`. Everything the scene created lives in
//! one of its pools, so releasing the pools releases the scene.

use std::collections::HashMap;

use anyhow::Context as _;

use crate::{
    camera::CameraView,
    context::{FrameTarget, InitContext},
    data_structures::{
        draw_item::DrawItem,
        handle::{Handle, ResourcePool},
        mesh::Mesh,
        texture::Texture,
    },
    pipelines::{
        alpha_fill::{draw_alpha_fill, mk_alpha_fill_pipeline},
        cache::PipelineCache,
        uniforms::{DrawUniform, DrawUniforms},
    },
    render::PlannedDraw,
};

type BindGroupKey = (Handle<Texture>, Handle<wgpu::Sampler>);

/// How much a scene released when it ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReleaseCounts {
    pub meshes: usize,
    pub textures: usize,
    pub samplers: usize,
    pub pipelines: usize,
}

#[derive(Debug)]
pub struct SceneResources {
    pub meshes: ResourcePool<Mesh>,
    pub textures: ResourcePool<Texture>,
    pub samplers: ResourcePool<wgpu::Sampler>,
    pub items: Vec<DrawItem>,
    pipelines: PipelineCache,
    alpha_fill: wgpu::RenderPipeline,
    uniforms: DrawUniforms,
    bind_groups: HashMap<BindGroupKey, wgpu::BindGroup>,
}

impl SceneResources {
    /// `max_draws` bounds how many items a single frame may draw.
    pub fn new(gpu: &InitContext, max_draws: u32) -> Self {
        let pipelines = PipelineCache::new(&gpu.device, gpu.color_format, gpu.sample_count);
        let uniforms = DrawUniforms::new(&gpu.device, &pipelines.uniform_layout, max_draws);
        let alpha_fill = mk_alpha_fill_pipeline(&gpu.device, gpu.color_format, gpu.sample_count);
        Self {
            meshes: ResourcePool::new(),
            textures: ResourcePool::new(),
            samplers: ResourcePool::new(),
            items: Vec::new(),
            pipelines,
            alpha_fill,
            uniforms,
            bind_groups: HashMap::new(),
        }
    }

    /// Swap a sampler for a new one and release the old handle.
    pub fn replace_sampler(
        &mut self,
        old: Handle<wgpu::Sampler>,
        sampler: wgpu::Sampler,
    ) -> Handle<wgpu::Sampler> {
        self.bind_groups.retain(|(_, s), _| *s != old);
        self.samplers.remove(old);
        let handle = self.samplers.insert(sampler);
        for item in self.items.iter_mut().filter(|item| item.sampler == old) {
            item.sampler = handle;
        }
        handle
    }

    /// Ids of every handle currently owned by the scene.
    pub fn live_handles(&self) -> Vec<u64> {
        self.meshes
            .handles()
            .map(|h| h.id())
            .chain(self.textures.handles().map(|h| h.id()))
            .chain(self.samplers.handles().map(|h| h.id()))
            .collect()
    }

    fn prepare_bind_group(
        &mut self,
        device: &wgpu::Device,
        key: BindGroupKey,
    ) -> anyhow::Result<()> {
        if self.bind_groups.contains_key(&key) {
            return Ok(());
        }
        let (texture, sampler) = key;
        let view = &self.textures.fetch(texture)?.view;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.samplers.fetch(sampler)?),
                },
            ],
            label: Some("texture_bind_group"),
        });
        self.bind_groups.insert(key, bind_group);
        Ok(())
    }

    /// Record one render pass that clears the target, issues `plan` in order
    /// and finally forces alpha to 1 while keeping rgb.
    pub fn record(
        &mut self,
        gpu: &InitContext,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        clear_colour: wgpu::Color,
        camera: &CameraView,
        plan: &[PlannedDraw],
    ) -> anyhow::Result<()> {
        // Pipelines, bind groups and uniforms must exist before the pass
        // borrows them.
        let mut uniforms = Vec::with_capacity(plan.len());
        for draw in plan {
            let item = self.items.get(draw.item).context("planned draw has no item")?;
            let key = (item.texture, item.sampler);
            let mvp = camera.view_proj * item.transform.to_matrix();
            let uniform = DrawUniform::new(mvp, item.tint);
            self.pipelines.prepare(&gpu.device, draw.key);
            self.prepare_bind_group(&gpu.device, key)?;
            uniforms.push(uniform);
        }
        self.uniforms.write(&gpu.queue, &uniforms)?;

        let mut render_pass = begin_pass(encoder, target, clear_colour);
        for (slot, draw) in plan.iter().enumerate() {
            let item = &self.items[draw.item];
            render_pass.set_pipeline(self.pipelines.get(&draw.key)?);
            if let Some(constant) = draw.blend_constant {
                render_pass.set_blend_constant(constant);
            }
            let bind_group = self
                .bind_groups
                .get(&(item.texture, item.sampler))
                .context("bind group was not prepared")?;
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.set_bind_group(1, &self.uniforms.bind_group, &[self.uniforms.offset(slot)]);
            self.meshes.fetch(item.mesh)?.draw(&mut render_pass);
        }
        draw_alpha_fill(&mut render_pass, &self.alpha_fill);
        Ok(())
    }

    /// Destroy everything the scene allocated. Every pooled value is released
    /// exactly once, since the pools hand each one out a single time.
    pub fn release(mut self) -> ReleaseCounts {
        let mut counts = ReleaseCounts {
            pipelines: self.pipelines.len(),
            ..Default::default()
        };
        self.items.clear();
        self.bind_groups.clear();
        for mesh in self.meshes.drain() {
            mesh.destroy();
            counts.meshes += 1;
        }
        for texture in self.textures.drain() {
            texture.destroy();
            counts.textures += 1;
        }
        counts.samplers = self.samplers.drain().count();
        self.uniforms.destroy();
        counts
    }
}

pub fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: FrameTarget<'_>,
    clear_colour: wgpu::Color,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Scene Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color,
            resolve_target: Some(target.resolve),
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_colour),
                // Only the resolved image is kept.
                store: wgpu::StoreOp::Discard,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
