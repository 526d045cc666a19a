//! Whole-pipeline render state, applied in one go through a [`StateCache`].
//!
//! Each descriptor groups the cells a renderer usually changes together. Only
//! the parts that differ from the cache reach the driver.

use gl::types::*;
use uvgl_core::{
    BlendEquationMode, BlendFactor, Capability, CompareFunction, CullFaceMode, GlDriver,
    PolygonMode, Result, StencilOperation,
};

use crate::cells::{BlendEquations, BlendFunctions, StencilFuncState, StencilOpState};
use crate::state::StateCache;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    pub enabled: bool,
    pub color: [GLfloat; 4],
    pub equation: BlendEquations,
    pub function: BlendFunctions,
    pub color_mask: [bool; 4],
}

impl BlendState {
    /// Blending off, every channel written.
    pub const OPAQUE: Self = Self {
        enabled: false,
        color: [0.0; 4],
        equation: BlendEquations {
            rgb: BlendEquationMode::Add,
            alpha: BlendEquationMode::Add,
        },
        function: BlendFunctions {
            src_rgb: BlendFactor::One,
            dst_rgb: BlendFactor::Zero,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
        },
        color_mask: [true; 4],
    };

    /// Premultiplied alpha.
    pub const ALPHA_BLEND: Self = Self {
        enabled: true,
        function: BlendFunctions {
            src_rgb: BlendFactor::One,
            dst_rgb: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
        },
        ..Self::OPAQUE
    };

    pub const NON_PREMULTIPLIED: Self = Self {
        enabled: true,
        function: BlendFunctions {
            src_rgb: BlendFactor::SrcAlpha,
            dst_rgb: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::SrcAlpha,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
        },
        ..Self::OPAQUE
    };

    pub const ADDITIVE: Self = Self {
        enabled: true,
        function: BlendFunctions {
            src_rgb: BlendFactor::SrcAlpha,
            dst_rgb: BlendFactor::One,
            src_alpha: BlendFactor::SrcAlpha,
            dst_alpha: BlendFactor::One,
        },
        ..Self::OPAQUE
    };
}

impl Default for BlendState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Stencil test settings for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceDesc {
    pub func: StencilFuncState,
    pub op: StencilOpState,
}

impl StencilFaceDesc {
    pub const DEFAULT: Self = Self {
        func: StencilFuncState {
            func: CompareFunction::Always,
            reference: 0,
            mask: GLuint::MAX,
        },
        op: StencilOpState {
            stencil_fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            depth_pass: StencilOperation::Keep,
        },
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: CompareFunction,
    pub stencil_test: bool,
    pub front: StencilFaceDesc,
    pub back: StencilFaceDesc,
}

impl DepthStencilState {
    /// No depth or stencil testing.
    pub const NONE: Self = Self {
        depth_test: false,
        depth_write: false,
        depth_func: CompareFunction::Less,
        stencil_test: false,
        front: StencilFaceDesc::DEFAULT,
        back: StencilFaceDesc::DEFAULT,
    };

    pub const DEFAULT: Self = Self {
        depth_test: true,
        depth_write: true,
        depth_func: CompareFunction::LessOrEqual,
        ..Self::NONE
    };

    /// Depth tested but never written.
    pub const DEPTH_READ: Self = Self {
        depth_write: false,
        ..Self::DEFAULT
    };
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    /// `None` disables culling.
    pub cull: Option<CullFaceMode>,
    pub polygon_mode: PolygonMode,
    pub scissor_test: bool,
    pub polygon_offset_fill: bool,
}

impl RasterizerState {
    pub const CULL_NONE: Self = Self {
        cull: None,
        polygon_mode: PolygonMode::Fill,
        scissor_test: false,
        polygon_offset_fill: false,
    };

    pub const CULL_BACK: Self = Self {
        cull: Some(CullFaceMode::Back),
        ..Self::CULL_NONE
    };

    pub const WIREFRAME: Self = Self {
        polygon_mode: PolygonMode::Line,
        ..Self::CULL_NONE
    };
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::CULL_BACK
    }
}

impl StateCache {
    /// Returns whether any driver call was made.
    pub fn apply_blend_state(&mut self, gl: &dyn GlDriver, state: &BlendState) -> Result<bool> {
        let mut changed = self.set_enabled(gl, Capability::Blend, state.enabled)?;
        // Factors and equations stay untouched while blending is off.
        if state.enabled {
            changed |= self.set_blend_color(gl, state.color)?;
            changed |= self.set_blend_equation(gl, state.equation.rgb, state.equation.alpha)?;
            changed |= self.set_blend_function(gl, state.function)?;
        }
        changed |= self.set_color_mask(gl, state.color_mask)?;
        Ok(changed)
    }

    /// Identical faces go through the combined stencil calls.
    pub fn apply_depth_stencil_state(&mut self, gl: &dyn GlDriver, state: &DepthStencilState) -> Result<bool> {
        let mut changed = self.set_enabled(gl, Capability::DepthTest, state.depth_test)?;
        if state.depth_test {
            changed |= self.set_depth_func(gl, state.depth_func)?;
        }
        changed |= self.set_depth_mask(gl, state.depth_write)?;

        changed |= self.set_enabled(gl, Capability::StencilTest, state.stencil_test)?;
        if state.stencil_test {
            if state.front == state.back {
                changed |= self.set_stencil_func(gl, gl::FRONT_AND_BACK, state.front.func)?;
                changed |= self.set_stencil_op(gl, gl::FRONT_AND_BACK, state.front.op)?;
            } else {
                for (face, desc) in [(gl::FRONT, &state.front), (gl::BACK, &state.back)] {
                    changed |= self.set_stencil_func(gl, face, desc.func)?;
                    changed |= self.set_stencil_op(gl, face, desc.op)?;
                }
            }
        }
        Ok(changed)
    }

    pub fn apply_rasterizer_state(&mut self, gl: &dyn GlDriver, state: &RasterizerState) -> Result<bool> {
        let mut changed = self.set_enabled(gl, Capability::CullFace, state.cull.is_some())?;
        if let Some(mode) = state.cull {
            changed |= self.set_cull_face(gl, mode)?;
        }
        changed |= self.set_polygon_mode(gl, state.polygon_mode)?;
        changed |= self.set_enabled(gl, Capability::ScissorTest, state.scissor_test)?;
        changed |= self.set_enabled(gl, Capability::PolygonOffsetFill, state.polygon_offset_fill)?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::FakeGl;
    use uvgl_core::Capabilities;

    use super::*;

    fn cache(gl: &FakeGl) -> StateCache {
        let caps = Capabilities::probe(gl).unwrap();
        let cache = StateCache::from_device(gl, &caps).unwrap();
        gl.clear_calls();
        cache
    }

    #[test]
    fn blend_state_round_trip_skips_repeats() {
        let gl = FakeGl::desktop();
        let mut cache = cache(&gl);

        assert!(cache.apply_blend_state(&gl, &BlendState::ALPHA_BLEND).unwrap());
        assert!(gl.fixed().enabled.contains(&gl::BLEND));
        assert_eq!(gl.fixed().blend_func, [gl::ONE, gl::ONE_MINUS_SRC_ALPHA, gl::ONE, gl::ONE_MINUS_SRC_ALPHA]);
        gl.clear_calls();

        assert!(!cache.apply_blend_state(&gl, &BlendState::ALPHA_BLEND).unwrap());
        assert!(gl.calls().is_empty());

        assert!(cache.apply_blend_state(&gl, &BlendState::OPAQUE).unwrap());
        assert_eq!(gl.call_names(), vec!["glDisable"]);
    }

    #[test]
    fn matching_stencil_faces_use_combined_calls() {
        let gl = FakeGl::desktop();
        let mut cache = cache(&gl);
        let face = StencilFaceDesc {
            func: StencilFuncState {
                func: CompareFunction::Equal,
                reference: 1,
                mask: 0xFF,
            },
            op: StencilOpState {
                depth_pass: StencilOperation::Replace,
                ..StencilFaceDesc::DEFAULT.op
            },
        };
        let state = DepthStencilState {
            stencil_test: true,
            front: face,
            back: face,
            ..DepthStencilState::DEFAULT
        };

        cache.apply_depth_stencil_state(&gl, &state).unwrap();
        assert_eq!(gl.count("glStencilFunc"), 1);
        assert_eq!(gl.count("glStencilOp"), 1);
        assert_eq!(gl.count("glStencilFuncSeparate"), 0);
        assert_eq!(gl.fixed().depth_func, gl::LEQUAL);

        let split = DepthStencilState {
            back: StencilFaceDesc::DEFAULT,
            ..state
        };
        gl.clear_calls();
        cache.apply_depth_stencil_state(&gl, &split).unwrap();
        assert_eq!(gl.call_names(), vec!["glStencilFuncSeparate", "glStencilOpSeparate"]);
        assert_eq!(gl.fixed().stencil_back.func, gl::ALWAYS);
        assert_eq!(gl.fixed().stencil_front.func, gl::EQUAL);
    }

    #[test]
    fn rasterizer_state_toggles_culling() {
        let gl = FakeGl::desktop();
        let mut cache = cache(&gl);

        assert!(cache.apply_rasterizer_state(&gl, &RasterizerState::CULL_BACK).unwrap());
        assert_eq!(gl.call_names(), vec!["glEnable"]);
        gl.clear_calls();

        assert!(cache.apply_rasterizer_state(&gl, &RasterizerState::WIREFRAME).unwrap());
        assert_eq!(gl.call_names(), vec!["glDisable", "glPolygonMode"]);
        assert_eq!(gl.fixed().polygon_mode, gl::LINE);
    }
}
