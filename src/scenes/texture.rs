//! One textured quad with live sampler controls.
//!
//! Shows how wrap modes and filters change what a texture looks like, and
//! how texture coordinates outside `0..1` behave. The texture coordinates of
//! the four corners are editable and re-uploaded every frame.

use cgmath::{Point3, Vector3};

use crate::{
    camera::{Camera, CameraView},
    context::{FrameTarget, InitContext},
    controls::{Control, step},
    data_structures::{
        blend::{BlendSettings, RenderToggles, ResolvedBlend},
        draw_item::{DrawItem, Transform},
        handle::Handle,
        mesh::{Geometry, Mesh},
        texture::{Texture, Upload},
    },
    render::plan_frame,
    resources::{AssetRequest, Assets, procedural, sampler::SamplerSettings},
    scenes::{Scene, gpu::SceneResources},
};

/// Corner colors, bottom left first. The slight pink tint on the first
/// corner shows that vertex colors are interpolated too.
const QUAD_COLORS: [[u8; 4]; 4] = [
    [255, 225, 255, 255],
    [255, 255, 255, 255],
    [255, 255, 255, 255],
    [255, 255, 255, 255],
];

const DEFAULT_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

const TEXTURE_NAMES: [&str; 4] = ["color-grid", "smiley", "gray gradient", "float gradient"];

const NUDGE: f32 = 0.1;
const ZOOM: f32 = 1.25;

#[derive(Debug)]
struct Resources {
    gpu: SceneResources,
    quad: Handle<Mesh>,
    textures: Vec<Handle<Texture>>,
}

#[derive(Debug)]
pub struct TextureScene {
    sampler: SamplerSettings,
    tex_coords: [[f32; 2]; 4],
    current_texture: usize,
    resources: Option<Resources>,
}

impl Default for TextureScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureScene {
    pub const NAME: &'static str = "Texture";

    pub fn new() -> Self {
        Self {
            sampler: SamplerSettings::default(),
            tex_coords: DEFAULT_TEX_COORDS,
            current_texture: 0,
            resources: None,
        }
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        self.sampler
    }

    pub fn tex_coords(&self) -> [[f32; 2]; 4] {
        self.tex_coords
    }

    pub fn live_handles(&self) -> Vec<u64> {
        self.resources
            .as_ref()
            .map(|r| r.gpu.live_handles())
            .unwrap_or_default()
    }

    fn set_sampler(&mut self, gpu: &InitContext, settings: SamplerSettings) {
        self.sampler = settings;
        log::info!("Sampler: {settings:?}");
        if let Some(resources) = &mut self.resources {
            let old = resources.gpu.items[0].sampler;
            resources
                .gpu
                .replace_sampler(old, settings.create(&gpu.device));
        }
    }

    fn select_texture(&mut self, reverse: bool) {
        let len = TEXTURE_NAMES.len();
        self.current_texture = if reverse {
            (self.current_texture + len - 1) % len
        } else {
            (self.current_texture + 1) % len
        };
        log::info!("Texture: {}", TEXTURE_NAMES[self.current_texture]);
        if let Some(resources) = &mut self.resources {
            resources.gpu.items[0].texture = resources.textures[self.current_texture];
        }
    }

    /// Move every corner's texture coordinates by `delta`.
    pub fn offset_tex_coords(&mut self, delta: [f32; 2]) {
        for uv in &mut self.tex_coords {
            uv[0] += delta[0];
            uv[1] += delta[1];
        }
    }

    /// Scale texture coordinates about the origin.
    pub fn scale_tex_coords(&mut self, factor: f32) {
        for uv in &mut self.tex_coords {
            uv[0] *= factor;
            uv[1] *= factor;
        }
    }
}

impl Scene for TextureScene {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn load(&self) -> AssetRequest {
        &[("texture", "images/color-grid.png")]
    }

    fn start(&mut self, gpu: &InitContext, assets: &Assets) -> anyhow::Result<()> {
        let (device, queue) = (&gpu.device, &gpu.queue);
        // Controls start from their defaults on every activation.
        self.end();
        *self = Self::new();
        let mut resources = SceneResources::new(gpu, 1);

        let quad = resources.meshes.insert(Mesh::new(
            device,
            "quad",
            &Geometry::quad(QUAD_COLORS, self.tex_coords),
        ));

        let upload = Upload::default();
        let (width, height, floats) = procedural::float_gradient();
        let rgba = |image: &image::RgbaImage, name: &str| {
            Texture::from_rgba(device, queue, image, name, upload)
        };
        let textures = vec![
            rgba(assets.image("texture")?, TEXTURE_NAMES[0]),
            rgba(&procedural::smiley(), TEXTURE_NAMES[1]),
            rgba(&procedural::gray_gradient(), TEXTURE_NAMES[2]),
            Texture::from_red_f32(device, queue, width, height, &floats, TEXTURE_NAMES[3], true)?,
        ];
        let textures: Vec<_> = textures
            .into_iter()
            .map(|t| resources.textures.insert(t))
            .collect();

        let sampler = resources.samplers.insert(self.sampler.create(device));
        resources.items.push(DrawItem {
            transform: Transform::new(),
            texture: textures[self.current_texture],
            sampler,
            tint: [1.0, 1.0, 1.0, 1.0],
            mesh: quad,
            transparent: false,
        });

        self.resources = Some(Resources {
            gpu: resources,
            quad,
            textures,
        });
        Ok(())
    }

    fn camera(&self) -> Camera {
        Camera::looking_at(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn clear_colour(&self) -> wgpu::Color {
        wgpu::Color::BLACK
    }

    fn on_control(&mut self, gpu: &InitContext, control: Control) {
        let mut sampler = self.sampler;
        match control {
            Control::Slot { index: 1, reverse } => self.select_texture(reverse),
            Control::Slot { index: 2, reverse } => {
                sampler.wrap_s = step(sampler.wrap_s, reverse);
                self.set_sampler(gpu, sampler);
            }
            Control::Slot { index: 3, reverse } => {
                sampler.wrap_t = step(sampler.wrap_t, reverse);
                self.set_sampler(gpu, sampler);
            }
            Control::Slot { index: 4, reverse } => {
                sampler.mag_filter = step(sampler.mag_filter, reverse);
                self.set_sampler(gpu, sampler);
            }
            Control::Slot { index: 5, reverse } => {
                sampler.min_filter = step(sampler.min_filter, reverse);
                self.set_sampler(gpu, sampler);
            }
            Control::Slot { index: 0, .. } => {
                self.tex_coords = DEFAULT_TEX_COORDS;
                log::info!("Texture coordinates reset");
            }
            Control::Nudge { dx, dy } => {
                self.offset_tex_coords([f32::from(dx) * NUDGE, f32::from(dy) * NUDGE]);
                log::info!("Texture coordinates: {:?}", self.tex_coords);
            }
            Control::Zoom { out } => {
                self.scale_tex_coords(if out { ZOOM } else { 1.0 / ZOOM });
                log::info!("Texture coordinates: {:?}", self.tex_coords);
            }
            _ => {}
        }
    }

    fn draw(
        &mut self,
        gpu: &InitContext,
        encoder: &mut wgpu::CommandEncoder,
        target: FrameTarget<'_>,
        camera: &CameraView,
    ) -> anyhow::Result<()> {
        let clear_colour = self.clear_colour();
        let Some(resources) = &mut self.resources else {
            anyhow::bail!("{} was drawn before it was started", Self::NAME);
        };

        let geometry = Geometry::quad(QUAD_COLORS, self.tex_coords);
        resources
            .gpu
            .meshes
            .fetch(resources.quad)?
            .write_vertices(&gpu.queue, &geometry.vertices);

        // The quad is opaque, so no blend function is ever applied.
        let blend = BlendSettings {
            enabled: false,
            ..Default::default()
        };
        let applied = ResolvedBlend {
            key: blend.key(),
            constant: wgpu::Color::WHITE,
        };
        let plan = plan_frame(
            &resources.gpu.items,
            camera.position,
            &blend,
            &applied,
            &RenderToggles::default(),
        );
        resources
            .gpu
            .record(gpu, encoder, target, clear_colour, camera, &plan)
    }

    fn end(&mut self) {
        if let Some(resources) = self.resources.take() {
            let counts = resources.gpu.release();
            log::info!("{} ended, released {counts:?}", Self::NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_and_zoom_edit_every_corner() {
        let mut scene = TextureScene::new();
        scene.offset_tex_coords([0.5, -0.5]);
        assert_eq!(scene.tex_coords()[0], [0.5, -0.5]);
        assert_eq!(scene.tex_coords()[2], [1.5, 0.5]);
        scene.scale_tex_coords(2.0);
        assert_eq!(scene.tex_coords()[2], [3.0, 1.0]);
    }

    #[test]
    fn texture_selection_wraps() {
        let mut scene = TextureScene::new();
        scene.select_texture(true);
        assert_eq!(scene.current_texture, TEXTURE_NAMES.len() - 1);
        scene.select_texture(false);
        assert_eq!(scene.current_texture, 0);
    }

    #[test]
    fn unstarted_scene_owns_no_handles() {
        let mut scene = TextureScene::new();
        assert!(scene.live_handles().is_empty());
        scene.end();
        assert!(scene.live_handles().is_empty());
    }
}
