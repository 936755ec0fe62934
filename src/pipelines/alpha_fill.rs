//! Forces the color target's alpha to 1 without touching rgb.
//!
//! Blended draws leave partial alpha behind, and a non-opaque framebuffer gets
//! composited with whatever is behind the canvas. Drawing one full-screen
//! triangle with an alpha-only write mask fixes that up at the end of a frame.

use super::basic::depth_stencil_state;

pub fn mk_alpha_fill_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Alpha Fill Pipeline Layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Alpha Fill Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("alpha_fill.wgsl").into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Alpha Fill Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALPHA,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(false)),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Draw the fill. Expects to be the last draw of the pass.
pub fn draw_alpha_fill(render_pass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
    render_pass.set_pipeline(pipeline);
    render_pass.draw(0..3, 0..1);
}
