//! Blend configuration and its translation to wgpu fixed-function state.
//!
//! The enums mirror the WebGL blend equations and factors one to one. wgpu
//! bakes blending into the pipeline, so [`BlendSettings::resolve`] turns the
//! control-facing settings into a [`ResolvedBlend`]: a pipeline-level
//! [`wgpu::BlendState`] plus the dynamic blend constant for the pass.

use thiserror::Error;

use crate::controls::Cycle;

/// How source and destination contributions are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    /// `src * srcFactor + dst * dstFactor`
    Add,
    /// `src * srcFactor - dst * dstFactor`
    Subtract,
    /// `dst * dstFactor - src * srcFactor`
    ReverseSubtract,
    /// `min(src, dst)`, factors are ignored
    Min,
    /// `max(src, dst)`, factors are ignored
    Max,
}

impl BlendEquation {
    pub const ALL: [BlendEquation; 5] = [
        BlendEquation::Add,
        BlendEquation::Subtract,
        BlendEquation::ReverseSubtract,
        BlendEquation::Min,
        BlendEquation::Max,
    ];

    pub fn operation(self) -> wgpu::BlendOperation {
        match self {
            BlendEquation::Add => wgpu::BlendOperation::Add,
            BlendEquation::Subtract => wgpu::BlendOperation::Subtract,
            BlendEquation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
            BlendEquation::Min => wgpu::BlendOperation::Min,
            BlendEquation::Max => wgpu::BlendOperation::Max,
        }
    }

    pub fn ignores_factors(self) -> bool {
        matches!(self, BlendEquation::Min | BlendEquation::Max)
    }
}

impl Cycle for BlendEquation {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}

/// Per-channel multiplier applied to the source or destination color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

impl BlendFactor {
    pub const ALL: [BlendFactor; 15] = [
        BlendFactor::Zero,
        BlendFactor::One,
        BlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::DstColor,
        BlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha,
        BlendFactor::ConstantColor,
        BlendFactor::OneMinusConstantColor,
        BlendFactor::ConstantAlpha,
        BlendFactor::OneMinusConstantAlpha,
        BlendFactor::SrcAlphaSaturate,
    ];

    /// wgpu has a single constant slot, so the constant-alpha variants map to
    /// the constant factors and rely on a splatted blend constant.
    pub fn to_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::DstColor => wgpu::BlendFactor::Dst,
            BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
            BlendFactor::ConstantColor | BlendFactor::ConstantAlpha => wgpu::BlendFactor::Constant,
            BlendFactor::OneMinusConstantColor | BlendFactor::OneMinusConstantAlpha => {
                wgpu::BlendFactor::OneMinusConstant
            }
            BlendFactor::SrcAlphaSaturate => wgpu::BlendFactor::SrcAlphaSaturated,
        }
    }

    fn uses_constant_color(self) -> bool {
        matches!(
            self,
            BlendFactor::ConstantColor | BlendFactor::OneMinusConstantColor
        )
    }

    fn uses_constant_alpha(self) -> bool {
        matches!(
            self,
            BlendFactor::ConstantAlpha | BlendFactor::OneMinusConstantAlpha
        )
    }
}

impl Cycle for BlendFactor {
    fn options() -> &'static [Self] {
        &Self::ALL
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlendError {
    #[error("{color:?} and {alpha:?} cannot be combined: both read the single blend constant")]
    MixedConstantFactors {
        color: BlendFactor,
        alpha: BlendFactor,
    },
}

/// Control-bound blend configuration of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendSettings {
    pub enabled: bool,
    pub equation: BlendEquation,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub constant_color: [f32; 4],
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            equation: BlendEquation::Add,
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            constant_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// The pipeline-relevant part of [`BlendSettings`], used as a cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlendKey {
    pub equation: BlendEquation,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl BlendKey {
    pub fn to_blend_state(self) -> wgpu::BlendState {
        let (src_factor, dst_factor) = if self.equation.ignores_factors() {
            // wgpu rejects anything but One/One for min and max.
            (wgpu::BlendFactor::One, wgpu::BlendFactor::One)
        } else {
            (self.src_factor.to_wgpu(), self.dst_factor.to_wgpu())
        };
        let component = wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: self.equation.operation(),
        };
        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    }
}

/// Validated blend configuration, ready for a pipeline and a render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedBlend {
    pub key: BlendKey,
    pub constant: wgpu::Color,
}

impl BlendSettings {
    pub fn key(&self) -> BlendKey {
        BlendKey {
            equation: self.equation,
            src_factor: self.src_factor,
            dst_factor: self.dst_factor,
        }
    }

    pub fn resolve(&self) -> Result<ResolvedBlend, BlendError> {
        let (src, dst) = (self.src_factor, self.dst_factor);
        if !self.equation.ignores_factors() {
            if src.uses_constant_color() && dst.uses_constant_alpha() {
                return Err(BlendError::MixedConstantFactors {
                    color: src,
                    alpha: dst,
                });
            }
            if dst.uses_constant_color() && src.uses_constant_alpha() {
                return Err(BlendError::MixedConstantFactors {
                    color: dst,
                    alpha: src,
                });
            }
        }
        let [r, g, b, a] = self.constant_color.map(f64::from);
        let constant = if src.uses_constant_alpha() || dst.uses_constant_alpha() {
            wgpu::Color { r: a, g: a, b: a, a }
        } else {
            wgpu::Color { r, g, b, a }
        };
        Ok(ResolvedBlend {
            key: self.key(),
            constant,
        })
    }
}

/// Global per-frame switches of the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderToggles {
    pub sort_by_distance: bool,
    pub backface_culling: bool,
    pub depth_testing: bool,
    pub alpha_to_coverage: bool,
}

impl Default for RenderToggles {
    fn default() -> Self {
        Self {
            sort_by_distance: false,
            backface_culling: true,
            depth_testing: true,
            alpha_to_coverage: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_classic_alpha_blending() {
        let resolved = BlendSettings::default().resolve().unwrap();
        let state = resolved.key.to_blend_state();
        assert_eq!(
            state.color,
            wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            }
        );
        // GL `blendFunc` applies the same factors to alpha.
        assert_eq!(state.alpha, state.color);
        assert_eq!(resolved.constant, wgpu::Color::WHITE);
    }

    #[test]
    fn min_and_max_force_unit_factors() {
        for equation in [BlendEquation::Min, BlendEquation::Max] {
            let settings = BlendSettings {
                equation,
                src_factor: BlendFactor::DstColor,
                dst_factor: BlendFactor::Zero,
                ..Default::default()
            };
            let state = settings.resolve().unwrap().key.to_blend_state();
            assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
            assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
            assert_eq!(state.alpha, state.color);
        }
    }

    #[test]
    fn constant_alpha_splats_the_alpha_channel() {
        let settings = BlendSettings {
            src_factor: BlendFactor::ConstantAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            constant_color: [0.2, 0.4, 0.6, 0.25],
            ..Default::default()
        };
        let resolved = settings.resolve().unwrap();
        assert_eq!(
            resolved.constant,
            wgpu::Color {
                r: 0.25,
                g: 0.25,
                b: 0.25,
                a: 0.25
            }
        );
        assert_eq!(
            resolved.key.to_blend_state().color.src_factor,
            wgpu::BlendFactor::Constant
        );
    }

    #[test]
    fn constant_color_keeps_all_channels() {
        let settings = BlendSettings {
            src_factor: BlendFactor::ConstantColor,
            dst_factor: BlendFactor::OneMinusConstantColor,
            constant_color: [0.5, 0.25, 1.0, 0.75],
            ..Default::default()
        };
        let resolved = settings.resolve().unwrap();
        assert_eq!(resolved.constant.r, 0.5);
        assert_eq!(resolved.constant.g, 0.25);
        assert_eq!(resolved.constant.a, 0.75);
    }

    #[test]
    fn mixing_constant_color_and_alpha_is_rejected() {
        let settings = BlendSettings {
            src_factor: BlendFactor::OneMinusConstantAlpha,
            dst_factor: BlendFactor::ConstantColor,
            ..Default::default()
        };
        assert_eq!(
            settings.resolve(),
            Err(BlendError::MixedConstantFactors {
                color: BlendFactor::ConstantColor,
                alpha: BlendFactor::OneMinusConstantAlpha,
            })
        );
    }

    #[test]
    fn mixed_constants_are_fine_when_factors_are_ignored() {
        let settings = BlendSettings {
            equation: BlendEquation::Max,
            src_factor: BlendFactor::ConstantColor,
            dst_factor: BlendFactor::ConstantAlpha,
            ..Default::default()
        };
        assert!(settings.resolve().is_ok());
    }

    #[test]
    fn saturate_maps_to_saturated_source_alpha() {
        assert_eq!(
            BlendFactor::SrcAlphaSaturate.to_wgpu(),
            wgpu::BlendFactor::SrcAlphaSaturated
        );
    }
}
