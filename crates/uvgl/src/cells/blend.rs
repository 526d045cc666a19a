use gl::types::*;
use uvgl_core::{check_error, BlendEquationMode, BlendFactor, GlDriver, Result};

use super::{get_enum, set, StateCell};

/// `GL_BLEND_COLOR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendColor {
    value: [GLfloat; 4],
}

impl BlendColor {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        let mut value = [0.0; 4];
        gl.get_float_v(gl::BLEND_COLOR, &mut value);
        check_error(gl, "glGetFloatv")?;
        Ok(Self { value })
    }
}

impl StateCell for BlendColor {
    type Value = [GLfloat; 4];
    const NAME: &'static str = "blend_color";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, [r, g, b, a]: Self::Value) -> Result<()> {
        set(gl, "glBlendColor", |gl| gl.blend_color(r, g, b, a))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// RGB and alpha blend equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendEquations {
    pub rgb: BlendEquationMode,
    pub alpha: BlendEquationMode,
}

impl BlendEquations {
    /// The same equation for both channels.
    pub fn uniform(mode: BlendEquationMode) -> Self {
        Self { rgb: mode, alpha: mode }
    }
}

/// `GL_BLEND_EQUATION_RGB` and `GL_BLEND_EQUATION_ALPHA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendEquation {
    value: BlendEquations,
}

impl BlendEquation {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        let rgb = get_enum(gl, gl::BLEND_EQUATION_RGB, "GL_BLEND_EQUATION_RGB")?;
        let alpha = get_enum(gl, gl::BLEND_EQUATION_ALPHA, "GL_BLEND_EQUATION_ALPHA")?;
        Ok(Self {
            value: BlendEquations { rgb, alpha },
        })
    }
}

impl StateCell for BlendEquation {
    type Value = BlendEquations;
    const NAME: &'static str = "blend_equation";

    fn value(&self) -> Self::Value {
        self.value
    }

    /// A single `glBlendEquation` when both channels match.
    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        if value.rgb == value.alpha {
            set(gl, "glBlendEquation", |gl| gl.blend_equation(value.rgb as GLenum))
        } else {
            set(gl, "glBlendEquationSeparate", |gl| {
                gl.blend_equation_separate(value.rgb as GLenum, value.alpha as GLenum)
            })
        }
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// Source and destination factors for both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunctions {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendFunctions {
    pub fn uniform(src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            src_rgb: src,
            dst_rgb: dst,
            src_alpha: src,
            dst_alpha: dst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunction {
    value: BlendFunctions,
}

impl BlendFunction {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        Ok(Self {
            value: BlendFunctions {
                src_rgb: get_enum(gl, gl::BLEND_SRC_RGB, "GL_BLEND_SRC_RGB")?,
                dst_rgb: get_enum(gl, gl::BLEND_DST_RGB, "GL_BLEND_DST_RGB")?,
                src_alpha: get_enum(gl, gl::BLEND_SRC_ALPHA, "GL_BLEND_SRC_ALPHA")?,
                dst_alpha: get_enum(gl, gl::BLEND_DST_ALPHA, "GL_BLEND_DST_ALPHA")?,
            },
        })
    }
}

impl StateCell for BlendFunction {
    type Value = BlendFunctions;
    const NAME: &'static str = "blend_function";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glBlendFuncSeparate", |gl| {
            gl.blend_func_separate(
                value.src_rgb as GLenum,
                value.dst_rgb as GLenum,
                value.src_alpha as GLenum,
                value.dst_alpha as GLenum,
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

    use super::*;

    #[test]
    fn blend_color_compares_exactly() {
        let gl = FakeGl::desktop();
        let mut cell = BlendColor::from_device(&gl).unwrap();
        assert_eq!(cell.value(), [0.0; 4]);
        gl.clear_calls();

        assert!(!cell.try_update(&gl, [0.0; 4]).unwrap());
        assert!(gl.calls().is_empty());

        assert!(cell.try_update(&gl, [0.0, 0.0, 0.0, f32::EPSILON]).unwrap());
        assert_eq!(gl.call_names(), vec!["glBlendColor"]);
        assert_eq!(gl.fixed().blend_color, [0.0, 0.0, 0.0, f32::EPSILON]);
    }

    #[test]
    fn matching_channels_use_the_single_equation_call() {
        let gl = FakeGl::desktop();
        let mut cell = BlendEquation::from_device(&gl).unwrap();
        gl.clear_calls();

        assert!(cell
            .try_update(&gl, BlendEquations::uniform(BlendEquationMode::Max))
            .unwrap());
        assert_eq!(gl.call_names(), vec!["glBlendEquation"]);
        assert_eq!(gl.count("glBlendEquationSeparate"), 0);
        assert_eq!(gl.fixed().blend_equation, (gl::MAX, gl::MAX));
    }

    #[test]
    fn differing_channels_use_the_separate_call() {
        let gl = FakeGl::desktop();
        let mut cell = BlendEquation::from_device(&gl).unwrap();
        gl.clear_calls();

        let desired = BlendEquations {
            rgb: BlendEquationMode::Add,
            alpha: BlendEquationMode::Subtract,
        };
        assert!(cell.try_update(&gl, desired).unwrap());
        assert_eq!(gl.call_names(), vec!["glBlendEquationSeparate"]);
        assert_eq!(cell.value(), desired);
    }

    #[test]
    fn blend_function_reads_gl_defaults() {
        let gl = FakeGl::desktop();
        let cell = BlendFunction::from_device(&gl).unwrap();
        assert_eq!(cell.value(), BlendFunctions::uniform(BlendFactor::One, BlendFactor::Zero));
    }
}
