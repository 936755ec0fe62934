use wgpu::util::DeviceExt;

/// Per-draw data: the full model-view-projection matrix and a tint that is
/// multiplied into the sampled color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub mvp: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl DrawUniform {
    pub fn new(mvp: cgmath::Matrix4<f32>, tint: [f32; 4]) -> Self {
        Self {
            mvp: mvp.into(),
            tint,
        }
    }
}

/// One uniform buffer holding a [`DrawUniform`] slot per item, each at an
/// aligned offset so a single bind group serves every draw.
#[derive(Debug)]
pub struct DrawUniforms {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
}

impl DrawUniforms {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u32) -> Self {
        let stride = Self::stride_for(device.limits().min_uniform_buffer_offset_alignment);
        let capacity = capacity.max(1);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Draw Uniform Buffer"),
            contents: &vec![0u8; (stride * capacity) as usize],
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
            label: Some("draw_uniform_bind_group"),
        });
        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn stride_for(alignment: u32) -> u32 {
        let size = std::mem::size_of::<DrawUniform>() as u32;
        size.div_ceil(alignment) * alignment
    }

    /// Upload `uniforms` into slots `0..uniforms.len()`.
    pub fn write(&self, queue: &wgpu::Queue, uniforms: &[DrawUniform]) -> anyhow::Result<()> {
        anyhow::ensure!(
            uniforms.len() as u32 <= self.capacity,
            "{} draws exceed the {} uniform slots",
            uniforms.len(),
            self.capacity
        );
        let mut bytes = vec![0u8; self.stride as usize * uniforms.len()];
        for (slot, uniform) in bytes.chunks_mut(self.stride as usize).zip(uniforms) {
            slot[..std::mem::size_of::<DrawUniform>()].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
        Ok(())
    }

    pub fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        self.stride * slot as u32
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 80);
        assert_eq!(DrawUniforms::stride_for(256), 256);
        assert_eq!(DrawUniforms::stride_for(64), 128);
        assert_eq!(DrawUniforms::stride_for(16), 80);
    }
}
