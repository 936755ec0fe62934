//! The lesson scenes and the registry that selects between them.
//!
//! # Lifecycle
//!
//! 1. `load()` names the images the scene needs. The app fetches them before
//!    anything else happens.
//! 2. `start()` builds every GPU resource of the scene from the loaded assets.
//! 3. `draw()` records one frame. `on_control()` may run between frames.
//! 4. `end()` releases everything `start()` allocated. A scene can be started
//!    again afterwards.

use crate::{
    camera::{Camera, CameraView},
    context::{FrameTarget, InitContext},
    controls::Control,
    resources::{AssetRequest, Assets},
};

pub mod blending;
pub mod gpu;
pub mod texture;

pub use blending::BlendingScene;
pub use texture::TextureScene;

pub trait Scene {
    /// Registry name of the scene.
    fn name(&self) -> &'static str;

    fn load(&self) -> AssetRequest;

    fn start(&mut self, gpu: &InitContext, assets: &Assets) -> anyhow::Result<()>;

    /// Where the fly camera starts when the scene is activated.
    fn camera(&self) -> Camera;

    fn clear_colour(&self) -> wgpu::Color;

    /// Apply a control input. Takes effect with the next `draw`.
    fn on_control(&mut self, gpu: &InitContext, control: Control);

    fn draw(
        &mut self,
        gpu: &InitContext,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        camera: &CameraView,
    ) -> anyhow::Result<()>;

    fn end(&mut self);
}

/// All scenes, as a tagged union keyed by [`Scene::name`].
#[derive(Debug)]
pub enum SceneKind {
    Texture(TextureScene),
    Blending(BlendingScene),
}

macro_rules! each_scene {
    ($self:expr, $scene:ident => $body:expr) => {
        match $self {
            SceneKind::Texture($scene) => $body,
            SceneKind::Blending($scene) => $body,
        }
    };
}

impl SceneKind {
    pub const NAMES: [&'static str; 2] = [TextureScene::NAME, BlendingScene::NAME];

    /// A fresh, not yet started scene. Names match case-insensitively.
    pub fn by_name(name: &str) -> anyhow::Result<Self> {
        match Self::NAMES.iter().position(|n| n.eq_ignore_ascii_case(name)) {
            Some(0) => Ok(Self::Texture(TextureScene::new())),
            Some(_) => Ok(Self::Blending(BlendingScene::new())),
            None => anyhow::bail!(
                "unknown scene '{name}', available: {}",
                Self::NAMES.join(", ")
            ),
        }
    }

    pub fn names() -> &'static [&'static str] {
        &Self::NAMES
    }

    fn index(&self) -> usize {
        match self {
            SceneKind::Texture(_) => 0,
            SceneKind::Blending(_) => 1,
        }
    }

    /// Name of the scene `step` places away in registry order, wrapping.
    pub fn neighbour(&self, step: isize) -> &'static str {
        let len = Self::NAMES.len() as isize;
        Self::NAMES[(self.index() as isize + step).rem_euclid(len) as usize]
    }
}

impl Scene for SceneKind {
    fn name(&self) -> &'static str {
        each_scene!(self, s => s.name())
    }

    fn load(&self) -> AssetRequest {
        each_scene!(self, s => s.load())
    }

    fn start(&mut self, gpu: &InitContext, assets: &Assets) -> anyhow::Result<()> {
        each_scene!(self, s => s.start(gpu, assets))
    }

    fn camera(&self) -> Camera {
        each_scene!(self, s => s.camera())
    }

    fn clear_colour(&self) -> wgpu::Color {
        each_scene!(self, s => s.clear_colour())
    }

    fn on_control(&mut self, gpu: &InitContext, control: Control) {
        each_scene!(self, s => s.on_control(gpu, control))
    }

    fn draw(
        &mut self,
        gpu: &InitContext,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        camera: &CameraView,
    ) -> anyhow::Result<()> {
        each_scene!(self, s => s.draw(gpu, encoder, target, camera))
    }

    fn end(&mut self) {
        each_scene!(self, s => s.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let scene = SceneKind::by_name("blending").unwrap();
        assert_eq!(scene.name(), "Blending");
        assert!(matches!(SceneKind::by_name("TEXTURE"), Ok(SceneKind::Texture(_))));
    }

    #[test]
    fn unknown_names_list_the_registry() {
        let err = SceneKind::by_name("Terrain").unwrap_err().to_string();
        assert!(err.contains("Terrain"));
        assert!(err.contains("Texture, Blending"));
    }

    #[test]
    fn neighbours_wrap_around() {
        let scene = SceneKind::by_name("Texture").unwrap();
        assert_eq!(scene.neighbour(1), "Blending");
        assert_eq!(scene.neighbour(-1), "Blending");
        assert_eq!(scene.neighbour(2), "Texture");
    }

    #[test]
    fn every_scene_requests_its_images() {
        for name in SceneKind::names() {
            let scene = SceneKind::by_name(name).unwrap();
            assert!(!scene.load().is_empty(), "{name} loads nothing");
        }
    }
}
