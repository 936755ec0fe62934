//! Transparent cubes on a checkered ground plane.
//!
//! Every blend equation and factor is switchable at runtime, as are draw
//! order sorting, backface culling, depth testing for transparent items and
//! alpha to coverage. Switching them one by one shows why transparent
//! geometry is drawn sorted, back to front, after everything opaque.

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

/// Blend constants the constant-color control steps through.
pub const CONSTANT_PRESETS: [[f32; 4]; 4] = [
    [1.0, 1.0, 1.0, 1.0],
    [0.5, 0.5, 0.5, 0.5],
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 0.5, 1.0, 0.25],
];

const CUBE_HEIGHT: f32 = 1.01;

#[derive(Debug)]
pub struct BlendingScene {
    blend: BlendSettings,
    applied: ResolvedBlend,
    toggles: RenderToggles,
    constant_preset: usize,
    resources: Option<SceneResources>,
}

impl Default for BlendingScene {
    fn default() -> Self {
        Self::new()
    }
}

impl BlendingScene {
    pub const NAME: &'static str = "Blending";

    pub fn new() -> Self {
        let blend = BlendSettings::default();
        Self {
            applied: ResolvedBlend {
                key: blend.key(),
                constant: wgpu::Color::WHITE,
            },
            blend,
            toggles: RenderToggles::default(),
            constant_preset: 0,
            resources: None,
        }
    }

    pub fn blend_settings(&self) -> &BlendSettings {
        &self.blend
    }

    /// The blend function draws actually use: the latest settings that
    /// passed validation.
    pub fn applied_blend(&self) -> &ResolvedBlend {
        &self.applied
    }

    pub fn toggles(&self) -> &RenderToggles {
        &self.toggles
    }

    pub fn set_toggles(&mut self, toggles: RenderToggles) {
        self.toggles = toggles;
    }

    /// Change the blend settings. Invalid factor combinations are kept as the
    /// selection but not applied.
    pub fn set_blend(&mut self, blend: BlendSettings) {
        self.blend = blend;
        match blend.resolve() {
            Ok(resolved) => self.applied = resolved,
            Err(err) => log::warn!("{err}, still blending with {:?}", self.applied.key),
        }
    }

    pub fn items(&self) -> &[DrawItem] {
        self.resources
            .as_ref()
            .map(|r| r.items.as_slice())
            .unwrap_or_default()
    }

    pub fn live_handles(&self) -> Vec<u64> {
        self.resources
            .as_ref()
            .map(SceneResources::live_handles)
            .unwrap_or_default()
    }

    fn toggle(name: &str, flag: &mut bool) {
        *flag = !*flag;
        log::info!("{name}: {}", if *flag { "on" } else { "off" });
    }
}

fn cube(
    mesh: Handle<Mesh>,
    sampler: Handle<wgpu::Sampler>,
    texture: Handle<Texture>,
    position: Vector3<f32>,
    tint: [f32; 4],
) -> DrawItem {
    DrawItem {
        transform: Transform::at(position),
        texture,
        sampler,
        tint,
        mesh,
        transparent: true,
    }
}

impl Scene for BlendingScene {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn load(&self) -> AssetRequest {
        &[
            ("color-grid", "images/color-grid.png"),
            ("metal", "images/metal.png"),
            ("glass", "images/transparent1.png"),
            ("fog", "images/fog.png"),
        ]
    }

    fn start(&mut self, gpu: &InitContext, assets: &Assets) -> anyhow::Result<()> {
        let (device, queue) = (&gpu.device, &gpu.queue);
        // Controls start from their defaults on every activation.
        self.end();
        *self = Self::new();
        let mut res = SceneResources::new(gpu, 6);

        let cube_mesh = res.meshes.insert(Mesh::new(device, "cube", &Geometry::cube()));
        let plane_mesh = res
            .meshes
            .insert(Mesh::new(device, "plane", &Geometry::plane([0.0, 0.0], [20.0, 20.0])));

        let upload = Upload::default();
        let mut image = |name: &str| -> anyhow::Result<Handle<Texture>> {
            let texture = Texture::from_rgba(device, queue, assets.image(name)?, name, upload);
            Ok(res.textures.insert(texture))
        };
        let color_grid = image("color-grid")?;
        let metal = image("metal")?;
        let glass = image("glass")?;
        let fog = image("fog")?;
        let white = res
            .textures
            .insert(Texture::from_rgba(device, queue, &procedural::white(), "white", upload));
        let checker = res.textures.insert(Texture::from_rgba(
            device,
            queue,
            &procedural::checker(1024, 256, [127; 3], [255; 3]),
            "checker",
            upload,
        ));

        let sampler = res.samplers.insert(SamplerSettings::trilinear().create(device));

        res.items = vec![
            DrawItem {
                transform: Transform::new().with_scale(Vector3::new(20.0, 1.0, 20.0)),
                texture: checker,
                sampler,
                tint: [1.0, 0.9, 0.7, 1.0],
                mesh: plane_mesh,
                transparent: false,
            },
            cube(cube_mesh, sampler, fog, Vector3::new(0.0, CUBE_HEIGHT, 0.0), [1.0; 4]),
            cube(cube_mesh, sampler, metal, Vector3::new(3.0, CUBE_HEIGHT, 0.0), [1.0; 4]),
            cube(cube_mesh, sampler, glass, Vector3::new(-3.0, CUBE_HEIGHT, 0.0), [1.0; 4]),
            cube(
                cube_mesh,
                sampler,
                color_grid,
                Vector3::new(0.0, CUBE_HEIGHT, 3.0),
                [1.0, 1.0, 1.0, 0.5],
            ),
            cube(
                cube_mesh,
                sampler,
                white,
                Vector3::new(0.0, CUBE_HEIGHT, -3.0),
                [0.0, 0.0, 1.0, 0.5],
            ),
        ];
        log::info!(
            "{} started with {} items, {} textures",
            Self::NAME,
            res.items.len(),
            res.textures.len()
        );
        self.resources = Some(res);
        Ok(())
    }

    fn camera(&self) -> Camera {
        Camera::looking_at(Point3::new(3.0, 3.0, 3.0), Vector3::new(-1.0, -1.0, -1.0))
    }

    fn clear_colour(&self) -> wgpu::Color {
        wgpu::Color {
            r: 0.98,
            g: 0.9,
            b: 0.8,
            a: 1.0,
        }
    }

    fn on_control(&mut self, _gpu: &InitContext, control: Control) {
        let mut blend = self.blend;
        match control {
            Control::Slot { index: 1, .. } => Self::toggle("Blending", &mut self.blend.enabled),
            Control::Slot { index: 2, reverse } => {
                blend.equation = step(blend.equation, reverse);
                log::info!("Blend equation: {:?}", blend.equation);
                self.set_blend(blend);
            }
            Control::Slot { index: 3, reverse } => {
                blend.src_factor = step(blend.src_factor, reverse);
                log::info!("Source factor: {:?}", blend.src_factor);
                self.set_blend(blend);
            }
            Control::Slot { index: 4, reverse } => {
                blend.dst_factor = step(blend.dst_factor, reverse);
                log::info!("Destination factor: {:?}", blend.dst_factor);
                self.set_blend(blend);
            }
            Control::Slot { index: 5, reverse } => {
                let len = CONSTANT_PRESETS.len();
                self.constant_preset = if reverse {
                    (self.constant_preset + len - 1) % len
                } else {
                    (self.constant_preset + 1) % len
                };
                blend.constant_color = CONSTANT_PRESETS[self.constant_preset];
                log::info!("Constant color: {:?}", blend.constant_color);
                self.set_blend(blend);
            }
            Control::Slot { index: 6, .. } => {
                Self::toggle("Sort renderers", &mut self.toggles.sort_by_distance)
            }
            Control::Slot { index: 7, .. } => {
                Self::toggle("Backface culling", &mut self.toggles.backface_culling)
            }
            Control::Slot { index: 8, .. } => {
                Self::toggle("Depth testing", &mut self.toggles.depth_testing)
            }
            Control::Slot { index: 9, .. } => {
                Self::toggle("Alpha to coverage", &mut self.toggles.alpha_to_coverage)
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
        let Some(res) = &mut self.resources else {
            anyhow::bail!("{} was drawn before it was started", Self::NAME);
        };
        let plan = plan_frame(
            &res.items,
            camera.position,
            &self.blend,
            &self.applied,
            &self.toggles,
        );
        res.record(gpu, encoder, target, clear_colour, camera, &plan)
    }

    fn end(&mut self) {
        if let Some(res) = self.resources.take() {
            let counts = res.release();
            log::info!("{} ended, released {counts:?}", Self::NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::data_structures::blend::BlendFactor;

    use super::*;

    #[test]
    fn initial_applied_blend_matches_defaults() {
        let scene = BlendingScene::new();
        assert_eq!(
            scene.applied_blend(),
            &BlendSettings::default().resolve().unwrap()
        );
    }

    #[test]
    fn invalid_selection_keeps_last_valid_blend() {
        let mut scene = BlendingScene::new();
        let valid = BlendSettings {
            src_factor: BlendFactor::ConstantColor,
            dst_factor: BlendFactor::One,
            ..Default::default()
        };
        scene.set_blend(valid);
        let applied = *scene.applied_blend();
        assert_eq!(applied.key.src_factor, BlendFactor::ConstantColor);

        scene.set_blend(BlendSettings {
            dst_factor: BlendFactor::OneMinusConstantAlpha,
            ..valid
        });
        assert_eq!(
            scene.blend_settings().dst_factor,
            BlendFactor::OneMinusConstantAlpha
        );
        assert_eq!(scene.applied_blend(), &applied);
    }

    #[test]
    fn presets_start_with_the_default_constant() {
        assert_eq!(CONSTANT_PRESETS[0], BlendSettings::default().constant_color);
    }
}
