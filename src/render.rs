//! Draw ordering and per-draw state resolution.
//!
//! This is the device-independent half of the frame compositor. Given the
//! items of a scene and its control-bound configuration it decides:
//!
//! - in which order items are submitted ([`resolve_draw_order`])
//! - which depth and blend state every single draw uses ([`resolve_item_state`])
//! - which state applies to the whole frame ([`FrameState`])
//!
//! [`plan_frame`] combines all three into one [`PlannedDraw`] per item, which
//! scenes turn into pipeline lookups and draw calls.
//!
//! # Ordering
//!
//! With sorting enabled, opaque items are drawn first, near to far, so the
//! depth test can reject hidden fragments early. Transparent items follow far
//! to near, which is what over-compositing needs. The sort is stable, so items
//! at equal distance keep their registry order.

use std::cmp::Ordering;

use cgmath::{MetricSpace, Point3};

use crate::{
    data_structures::blend::{BlendSettings, RenderToggles, ResolvedBlend},
    pipelines::basic::PipelineKey,
};

/// Anything the compositor can order: a world position and an opacity class.
pub trait Renderable {
    fn position(&self) -> Point3<f32>;
    fn is_transparent(&self) -> bool;
}

/// Submission order as indices into `items`. The slice itself is left as is.
pub fn resolve_draw_order<R: Renderable>(
    items: &[R],
    camera: Point3<f32>,
    sort_by_distance: bool,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    if !sort_by_distance {
        return order;
    }
    let distances: Vec<f32> = items
        .iter()
        .map(|item| item.position().distance2(camera))
        .collect();
    // `sort_by` is stable, which gives the tie-break on registry order.
    // `total_cmp` keeps the order total when a distance is NaN.
    order.sort_by(|&a, &b| {
        match (items[a].is_transparent(), items[b].is_transparent()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => distances[b].total_cmp(&distances[a]),
            (false, false) => distances[a].total_cmp(&distances[b]),
        }
    });
    order
}

/// Depth and blend switches for one draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemState {
    pub depth_test: bool,
    pub blend: bool,
}

pub fn resolve_item_state(
    transparent: bool,
    blend: &BlendSettings,
    toggles: &RenderToggles,
) -> ItemState {
    ItemState {
        depth_test: !transparent || toggles.depth_testing,
        blend: transparent && blend.enabled,
    }
}

/// State that is set once per frame rather than per item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameState {
    pub backface_culling: bool,
    pub alpha_to_coverage: bool,
}

impl From<&RenderToggles> for FrameState {
    fn from(toggles: &RenderToggles) -> Self {
        Self {
            backface_culling: toggles.backface_culling,
            alpha_to_coverage: toggles.alpha_to_coverage,
        }
    }
}

/// One draw call of a frame, in submission order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedDraw {
    /// Index into the item slice.
    pub item: usize,
    pub key: PipelineKey,
    /// Set for blended draws only.
    pub blend_constant: Option<wgpu::Color>,
}

/// Resolve order and state for every item of a frame.
///
/// `settings` decides whether blending is on, `applied` is the last blend
/// function that passed validation and is what blended draws actually use.
pub fn plan_frame<R: Renderable>(
    items: &[R],
    camera: Point3<f32>,
    settings: &BlendSettings,
    applied: &ResolvedBlend,
    toggles: &RenderToggles,
) -> Vec<PlannedDraw> {
    let frame = FrameState::from(toggles);
    resolve_draw_order(items, camera, toggles.sort_by_distance)
        .into_iter()
        .map(|item| {
            let state = resolve_item_state(items[item].is_transparent(), settings, toggles);
            PlannedDraw {
                item,
                key: PipelineKey {
                    backface_culling: frame.backface_culling,
                    depth_test: state.depth_test,
                    blend: state.blend.then_some(applied.key),
                    alpha_to_coverage: frame.alpha_to_coverage,
                },
                blend_constant: state.blend.then_some(applied.constant),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(Point3<f32>, bool);

    impl Renderable for Item {
        fn position(&self) -> Point3<f32> {
            self.0
        }

        fn is_transparent(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn equal_distances_keep_registry_order() {
        let items = [
            Item(Point3::new(1.0, 0.0, 0.0), true),
            Item(Point3::new(0.0, 1.0, 0.0), true),
            Item(Point3::new(0.0, 0.0, 1.0), true),
            Item(Point3::new(-1.0, 0.0, 0.0), false),
            Item(Point3::new(0.0, -1.0, 0.0), false),
        ];
        let order = resolve_draw_order(&items, Point3::new(0.0, 0.0, 0.0), true);
        assert_eq!(order, vec![3, 4, 0, 1, 2]);
    }

    #[test]
    fn empty_registry_resolves_to_nothing() {
        let items: [Item; 0] = [];
        assert!(resolve_draw_order(&items, Point3::new(0.0, 0.0, 0.0), true).is_empty());
    }

    #[test]
    fn planned_draws_carry_frame_toggles_and_applied_blend() {
        let items = [
            Item(Point3::new(0.0, 0.0, 1.0), false),
            Item(Point3::new(0.0, 0.0, 2.0), true),
        ];
        let settings = BlendSettings::default();
        let applied = settings.resolve().unwrap();
        let toggles = RenderToggles {
            backface_culling: false,
            depth_testing: false,
            ..Default::default()
        };
        let plan = plan_frame(&items, Point3::new(0.0, 0.0, 0.0), &settings, &applied, &toggles);
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|d| !d.key.backface_culling));
        assert_eq!(plan[0].key.blend, None);
        assert!(plan[0].key.depth_test);
        assert_eq!(plan[0].blend_constant, None);
        assert_eq!(plan[1].key.blend, Some(applied.key));
        assert!(!plan[1].key.depth_test);
        assert_eq!(plan[1].blend_constant, Some(applied.constant));
    }

    #[test]
    fn frame_state_copies_global_toggles() {
        let toggles = RenderToggles {
            backface_culling: false,
            alpha_to_coverage: true,
            ..Default::default()
        };
        assert_eq!(
            FrameState::from(&toggles),
            FrameState {
                backface_culling: false,
                alpha_to_coverage: true
            }
        );
    }
}
