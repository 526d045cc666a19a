use gl::types::*;
use uvgl_core::{check_error, decode, Capabilities, CullFaceMode, GlDriver, GlError, PolygonMode, Result};

use super::{get_booleans, get_enum, get_integer, set, StateCell};

/// `GL_CULL_FACE_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullFace {
    value: CullFaceMode,
}

impl CullFace {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        Ok(Self {
            value: get_enum(gl, gl::CULL_FACE_MODE, "GL_CULL_FACE_MODE")?,
        })
    }
}

impl StateCell for CullFace {
    type Value = CullFaceMode;
    const NAME: &'static str = "cull_face";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glCullFace", |gl| gl.cull_face(value as GLenum))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// `GL_POLYGON_MODE` for both faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonModeCell {
    value: PolygonMode,
    supported: bool,
}

impl PolygonModeCell {
    /// GLES has no polygon mode at all; there the cell starts at `Fill`
    /// without asking the driver, and any other mode is rejected.
    pub fn from_device(gl: &dyn GlDriver, caps: &Capabilities) -> Result<Self> {
        if !caps.supports_polygon_mode {
            return Ok(Self {
                value: PolygonMode::Fill,
                supported: false,
            });
        }
        // Compatibility profiles report front and back separately.
        let mut modes = [0; 2];
        gl.get_integer_v(gl::POLYGON_MODE, &mut modes);
        check_error(gl, "glGetIntegerv")?;
        Ok(Self {
            value: decode("GL_POLYGON_MODE", modes[0])?,
            supported: true,
        })
    }
}

impl StateCell for PolygonModeCell {
    type Value = PolygonMode;
    const NAME: &'static str = "polygon_mode";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        if !self.supported {
            return Err(GlError::InvalidArgument {
                what: "polygon mode",
                value: value as GLenum,
            });
        }
        set(gl, "glPolygonMode", |gl| {
            gl.polygon_mode(gl::FRONT_AND_BACK, value as GLenum)
        })
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// `GL_COLOR_WRITEMASK` as red, green, blue, alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMask {
    value: [bool; 4],
}

impl ColorMask {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        Ok(Self {
            value: get_booleans::<4>(gl, gl::COLOR_WRITEMASK)?,
        })
    }
}

impl StateCell for ColorMask {
    type Value = [bool; 4];
    const NAME: &'static str = "color_mask";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, [r, g, b, a]: Self::Value) -> Result<()> {
        set(gl, "glColorMask", |gl| gl.color_mask(r, g, b, a))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// `GL_STENCIL_CLEAR_VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearStencil {
    value: GLint,
}

impl ClearStencil {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        Ok(Self {
            value: get_integer(gl, gl::STENCIL_CLEAR_VALUE)?,
        })
    }
}

impl StateCell for ClearStencil {
    type Value = GLint;
    const NAME: &'static str = "clear_stencil";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glClearStencil", |gl| gl.clear_stencil(value))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};

    use super::*;

    #[test]
    fn polygon_mode_defaults_to_fill_without_querying_on_es() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let caps = Capabilities::probe(&gl).unwrap();
        gl.clear_calls();

        let cell = PolygonModeCell::from_device(&gl, &caps).unwrap();
        assert_eq!(cell.value(), PolygonMode::Fill);
        assert!(gl.calls().is_empty());
        assert_eq!(gl.error_checks(), 0);
    }

    #[test]
    fn polygon_mode_other_than_fill_is_rejected_on_es() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let caps = Capabilities::probe(&gl).unwrap();
        let mut cell = PolygonModeCell::from_device(&gl, &caps).unwrap();
        gl.clear_calls();

        assert!(!cell.try_update(&gl, PolygonMode::Fill).unwrap());
        let err = cell.try_update(&gl, PolygonMode::Line).unwrap_err();
        assert_eq!(
            err,
            GlError::InvalidArgument {
                what: "polygon mode",
                value: gl::LINE
            }
        );
        assert_eq!(cell.value(), PolygonMode::Fill);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn polygon_mode_is_queried_on_desktop() {
        let gl = FakeGl::desktop();
        gl.seed(|s| s.polygon_mode = gl::LINE);
        let caps = Capabilities::probe(&gl).unwrap();

        let mut cell = PolygonModeCell::from_device(&gl, &caps).unwrap();
        assert_eq!(cell.value(), PolygonMode::Line);
        assert!(cell.try_update(&gl, PolygonMode::Fill).unwrap());
        assert_eq!(gl.fixed().polygon_mode, gl::FILL);
    }

    #[test]
    fn unchanged_values_issue_no_calls() {
        let gl = FakeGl::desktop();
        let mut cull = CullFace::from_device(&gl).unwrap();
        let mut mask = ColorMask::from_device(&gl).unwrap();
        let mut stencil = ClearStencil::from_device(&gl).unwrap();
        gl.clear_calls();

        assert!(!cull.try_update(&gl, CullFaceMode::Back).unwrap());
        assert!(!mask.try_update(&gl, [true; 4]).unwrap());
        assert!(!stencil.try_update(&gl, 0).unwrap());
        assert!(gl.calls().is_empty());
        assert_eq!(gl.error_checks(), 0);
    }

    #[test]
    fn color_mask_sets_all_channels() {
        let gl = FakeGl::desktop();
        let mut mask = ColorMask::from_device(&gl).unwrap();
        assert!(mask.try_update(&gl, [true, false, true, false]).unwrap());
        assert_eq!(gl.fixed().color_mask, [true, false, true, false]);
        assert_eq!(gl.count("glColorMask"), 1);
    }
}
