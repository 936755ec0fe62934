//! Draw items: one textured, tinted mesh placed in the world.
//!
//! Items reference their GPU resources through handles into the owning
//! scene's pools. They carry no GPU state of their own, which keeps the
//! ordering and state-resolution logic in [`crate::render`] testable without a
//! device.

use cgmath::{One, Point3};

use crate::{
    data_structures::{handle::Handle, mesh::Mesh, texture::Texture},
    render::Renderable,
};

/// Scale, rotation and translation of an item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub position: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate or scale).
    pub fn new() -> Self {
        Self {
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn at(position: cgmath::Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_scale(mut self, scale: cgmath::Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix: translation * rotation * scale.
    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct DrawItem {
    pub transform: Transform,
    pub texture: Handle<Texture>,
    pub sampler: Handle<wgpu::Sampler>,
    pub tint: [f32; 4],
    pub mesh: Handle<Mesh>,
    pub transparent: bool,
}

impl Renderable for DrawItem {
    fn position(&self) -> Point3<f32> {
        Point3::new(
            self.transform.position.x,
            self.transform.position.y,
            self.transform.position.z,
        )
    }

    fn is_transparent(&self) -> bool {
        self.transparent
    }
}
