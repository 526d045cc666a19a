//! Per-face stencil state.
//!
//! Each face has its own cell. A combined update compares both faces and
//! sets them together with the non-separate entry point.

use gl::types::*;
use tracing::trace;
use uvgl_core::{CompareFunction, GlDriver, Result, StencilFace, StencilOperation};

use super::{get_enum, get_integer, set, StateCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFuncState {
    pub func: CompareFunction,
    pub reference: GLint,
    pub mask: GLuint,
}

/// `GL_STENCIL_FUNC`, `GL_STENCIL_REF` and `GL_STENCIL_VALUE_MASK` of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFunc {
    face: StencilFace,
    value: StencilFuncState,
}

impl StencilFunc {
    /// Read the state of `face`, which must be `GL_FRONT` or `GL_BACK`.
    pub fn from_device(gl: &dyn GlDriver, face: GLenum) -> Result<Self> {
        let face = StencilFace::from_gl(face)?;
        let (func, reference, mask) = match face {
            StencilFace::Front => (gl::STENCIL_FUNC, gl::STENCIL_REF, gl::STENCIL_VALUE_MASK),
            StencilFace::Back => (
                gl::STENCIL_BACK_FUNC,
                gl::STENCIL_BACK_REF,
                gl::STENCIL_BACK_VALUE_MASK,
            ),
        };
        Ok(Self {
            face,
            value: StencilFuncState {
                func: get_enum(gl, func, "GL_STENCIL_FUNC")?,
                reference: get_integer(gl, reference)?,
                mask: get_integer(gl, mask)? as GLuint,
            },
        })
    }

    pub fn face(&self) -> StencilFace {
        self.face
    }

    /// Set both faces to `desired` with one `glStencilFunc`.
    ///
    /// Skips the driver only if front, back and `desired` are all equal.
    pub fn try_update_combined(
        front: &mut Self,
        back: &mut Self,
        gl: &dyn GlDriver,
        desired: StencilFuncState,
    ) -> Result<bool> {
        if front.value == desired && back.value == desired {
            return Ok(false);
        }
        set(gl, "glStencilFunc", |gl| {
            gl.stencil_func(desired.func as GLenum, desired.reference, desired.mask)
        })?;
        trace!(cell = Self::NAME, value = ?desired, "both faces changed");
        front.value = desired;
        back.value = desired;
        Ok(true)
    }
}

impl StateCell for StencilFunc {
    type Value = StencilFuncState;
    const NAME: &'static str = "stencil_func";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glStencilFuncSeparate", |gl| {
            gl.stencil_func_separate(self.face.as_gl(), value.func as GLenum, value.reference, value.mask)
        })
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOpState {
    pub stencil_fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub depth_pass: StencilOperation,
}

/// `GL_STENCIL_FAIL`, `GL_STENCIL_PASS_DEPTH_FAIL` and
/// `GL_STENCIL_PASS_DEPTH_PASS` of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOp {
    face: StencilFace,
    value: StencilOpState,
}

impl StencilOp {
    /// Read the state of `face`, which must be `GL_FRONT` or `GL_BACK`.
    pub fn from_device(gl: &dyn GlDriver, face: GLenum) -> Result<Self> {
        let face = StencilFace::from_gl(face)?;
        let (sfail, dpfail, dppass) = match face {
            StencilFace::Front => (
                gl::STENCIL_FAIL,
                gl::STENCIL_PASS_DEPTH_FAIL,
                gl::STENCIL_PASS_DEPTH_PASS,
            ),
            StencilFace::Back => (
                gl::STENCIL_BACK_FAIL,
                gl::STENCIL_BACK_PASS_DEPTH_FAIL,
                gl::STENCIL_BACK_PASS_DEPTH_PASS,
            ),
        };
        Ok(Self {
            face,
            value: StencilOpState {
                stencil_fail: get_enum(gl, sfail, "GL_STENCIL_FAIL")?,
                depth_fail: get_enum(gl, dpfail, "GL_STENCIL_PASS_DEPTH_FAIL")?,
                depth_pass: get_enum(gl, dppass, "GL_STENCIL_PASS_DEPTH_PASS")?,
            },
        })
    }

    pub fn face(&self) -> StencilFace {
        self.face
    }

    /// Set both faces to `desired` with one `glStencilOp`.
    ///
    /// Skips the driver only if front, back and `desired` are all equal.
    pub fn try_update_combined(
        front: &mut Self,
        back: &mut Self,
        gl: &dyn GlDriver,
        desired: StencilOpState,
    ) -> Result<bool> {
        if front.value == desired && back.value == desired {
            return Ok(false);
        }
        set(gl, "glStencilOp", |gl| {
            gl.stencil_op(
                desired.stencil_fail as GLenum,
                desired.depth_fail as GLenum,
                desired.depth_pass as GLenum,
            )
        })?;
        trace!(cell = Self::NAME, value = ?desired, "both faces changed");
        front.value = desired;
        back.value = desired;
        Ok(true)
    }
}

impl StateCell for StencilOp {
    type Value = StencilOpState;
    const NAME: &'static str = "stencil_op";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glStencilOpSeparate", |gl| {
            gl.stencil_op_separate(
                self.face.as_gl(),
                value.stencil_fail as GLenum,
                value.depth_fail as GLenum,
                value.depth_pass as GLenum,
            )
        })
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::FakeGl;
    use uvgl_core::GlError;

    use super::*;

    const DEFAULT_FUNC: StencilFuncState = StencilFuncState {
        func: CompareFunction::Always,
        reference: 0,
        mask: GLuint::MAX,
    };

    fn faces(gl: &FakeGl) -> (StencilFunc, StencilFunc) {
        (
            StencilFunc::from_device(gl, gl::FRONT).unwrap(),
            StencilFunc::from_device(gl, gl::BACK).unwrap(),
        )
    }

    #[test]
    fn reads_gl_defaults_for_each_face() {
        let gl = FakeGl::desktop();
        let (front, back) = faces(&gl);
        assert_eq!(front.value(), DEFAULT_FUNC);
        assert_eq!(back.value(), DEFAULT_FUNC);
        assert_eq!(back.face(), StencilFace::Back);
    }

    #[test]
    fn rejects_unknown_faces() {
        let gl = FakeGl::desktop();
        let err = StencilOp::from_device(&gl, gl::FRONT_AND_BACK).unwrap_err();
        assert_eq!(
            err,
            GlError::InvalidArgument {
                what: "stencil face",
                value: gl::FRONT_AND_BACK
            }
        );
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn back_face_queries_back_state() {
        let gl = FakeGl::desktop();
        gl.seed(|s| s.stencil_back.dppass = gl::REPLACE);
        let op = StencilOp::from_device(&gl, gl::BACK).unwrap();
        assert_eq!(op.value().depth_pass, StencilOperation::Replace);
        assert_eq!(gl.count("glGetIntegerv"), 3);
    }

    #[test]
    fn separate_update_only_touches_its_face() {
        let gl = FakeGl::desktop();
        let (_, mut back) = faces(&gl);
        let desired = StencilFuncState {
            func: CompareFunction::Equal,
            ..DEFAULT_FUNC
        };
        assert!(back.try_update(&gl, desired).unwrap());
        assert_eq!(gl.fixed().stencil_back.func, gl::EQUAL);
        assert_eq!(gl.fixed().stencil_front.func, gl::ALWAYS);
        assert_eq!(gl.count("glStencilFuncSeparate"), 1);
    }

    #[test]
    fn combined_update_short_circuits_only_when_all_three_match() {
        let gl = FakeGl::desktop();
        let (mut front, mut back) = faces(&gl);
        gl.clear_calls();

        assert!(!StencilFunc::try_update_combined(&mut front, &mut back, &gl, DEFAULT_FUNC).unwrap());
        assert!(gl.calls().is_empty());

        // Front matches the request, back does not.
        let desired = StencilFuncState {
            reference: 3,
            ..DEFAULT_FUNC
        };
        back.try_update(&gl, StencilFuncState { mask: 0x0F, ..DEFAULT_FUNC })
            .unwrap();
        front.try_update(&gl, desired).unwrap();
        gl.clear_calls();

        assert!(StencilFunc::try_update_combined(&mut front, &mut back, &gl, desired).unwrap());
        assert_eq!(gl.call_names(), vec!["glStencilFunc"]);
        assert_eq!((front.value(), back.value()), (desired, desired));
        assert_eq!(gl.fixed().stencil_back.mask, GLuint::MAX);
        assert_eq!(gl.fixed().stencil_back.reference, 3);
    }

    #[test]
    fn combined_op_update_sets_both_faces() {
        let gl = FakeGl::desktop();
        let mut front = StencilOp::from_device(&gl, gl::FRONT).unwrap();
        let mut back = StencilOp::from_device(&gl, gl::BACK).unwrap();
        let desired = StencilOpState {
            stencil_fail: StencilOperation::Keep,
            depth_fail: StencilOperation::IncrementWrap,
            depth_pass: StencilOperation::Zero,
        };

        assert!(StencilOp::try_update_combined(&mut front, &mut back, &gl, desired).unwrap());
        assert_eq!(gl.fixed().stencil_front.dpfail, gl::INCR_WRAP);
        assert_eq!(gl.fixed().stencil_back.dppass, gl::ZERO);
        assert_eq!(gl.count("glStencilOp"), 1);
        assert_eq!(gl.count("glStencilOpSeparate"), 0);
    }
}
