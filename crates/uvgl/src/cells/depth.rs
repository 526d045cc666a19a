use gl::types::*;
use uvgl_core::{check_error, Capabilities, CompareFunction, GlDriver, Result};

use super::{get_booleans, get_enum, set, StateCell};

/// `GL_DEPTH_FUNC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthFunc {
    value: CompareFunction,
}

impl DepthFunc {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        Ok(Self {
            value: get_enum(gl, gl::DEPTH_FUNC, "GL_DEPTH_FUNC")?,
        })
    }
}

impl StateCell for DepthFunc {
    type Value = CompareFunction;
    const NAME: &'static str = "depth_func";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glDepthFunc", |gl| gl.depth_func(value as GLenum))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// `GL_DEPTH_WRITEMASK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthMask {
    value: bool,
}

impl DepthMask {
    pub fn from_device(gl: &dyn GlDriver) -> Result<Self> {
        let [value] = get_booleans::<1>(gl, gl::DEPTH_WRITEMASK)?;
        Ok(Self { value })
    }
}

impl StateCell for DepthMask {
    type Value = bool;
    const NAME: &'static str = "depth_mask";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        set(gl, "glDepthMask", |gl| gl.depth_mask(value))
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }
}

/// `GL_DEPTH_CLEAR_VALUE`.
///
/// Drivers without `glClearDepth(double)` are read and written in single
/// precision. The value is still cached as a double, narrowed to what the
/// driver holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearDepth {
    value: GLdouble,
    double: bool,
}

impl ClearDepth {
    pub fn from_device(gl: &dyn GlDriver, caps: &Capabilities) -> Result<Self> {
        let double = caps.supports_double_clear_depth;
        let value = if double {
            let mut value = [0.0];
            gl.get_double_v(gl::DEPTH_CLEAR_VALUE, &mut value);
            check_error(gl, "glGetDoublev")?;
            value[0]
        } else {
            let mut value = [0.0];
            gl.get_float_v(gl::DEPTH_CLEAR_VALUE, &mut value);
            check_error(gl, "glGetFloatv")?;
            GLdouble::from(value[0])
        };
        Ok(Self { value, double })
    }
}

impl StateCell for ClearDepth {
    type Value = GLdouble;
    const NAME: &'static str = "clear_depth";

    fn value(&self) -> Self::Value {
        self.value
    }

    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()> {
        if self.double {
            set(gl, "glClearDepth", |gl| gl.clear_depth(value))
        } else {
            set(gl, "glClearDepthf", |gl| gl.clear_depth_f(value as GLfloat))
        }
    }

    fn store(&mut self, value: Self::Value) {
        self.value = value;
    }

    fn normalize(&self, value: Self::Value) -> Self::Value {
        if self.double {
            value
        } else {
            GLdouble::from(value as GLfloat)
        }
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};
    use uvgl_core::GlError;

    use super::*;

    #[test]
    fn depth_mask_false_to_true_issues_one_call() {
        let gl = FakeGl::desktop();
        gl.seed(|s| s.depth_mask = false);
        let mut cell = DepthMask::from_device(&gl).unwrap();
        assert!(!cell.value());
        gl.clear_calls();

        assert!(cell.try_update(&gl, true).unwrap());
        assert!(cell.value());
        let calls = gl.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].name, calls[0].args.as_str()), ("glDepthMask", "true"));
    }

    #[test]
    fn failed_update_keeps_the_cached_value() {
        let gl = FakeGl::desktop();
        let mut cell = DepthFunc::from_device(&gl).unwrap();
        gl.fail_next("glDepthFunc", gl::INVALID_ENUM);

        let err = cell.try_update(&gl, CompareFunction::Greater).unwrap_err();
        assert!(matches!(err, GlError::Driver { call: "glDepthFunc", .. }));
        assert_eq!(cell.value(), CompareFunction::Less);

        // The next attempt is not short-circuited.
        assert!(cell.try_update(&gl, CompareFunction::Greater).unwrap());
        assert_eq!(gl.fixed().depth_func, gl::GREATER);
    }

    #[test]
    fn clear_depth_uses_double_precision_on_desktop() {
        let gl = FakeGl::desktop();
        let caps = Capabilities::probe(&gl).unwrap();
        let mut cell = ClearDepth::from_device(&gl, &caps).unwrap();
        assert_eq!(gl.count("glGetDoublev"), 1);
        assert_eq!(cell.value(), 1.0);

        assert!(cell.try_update(&gl, 0.25).unwrap());
        assert_eq!(gl.count("glClearDepth"), 1);
        assert_eq!(gl.count("glClearDepthf"), 0);
    }

    #[test]
    fn clear_depth_never_uses_double_precision_on_es() {
        let gl = FakeGl::new(Profile::es(3, 0));
        let caps = Capabilities::probe(&gl).unwrap();
        let mut cell = ClearDepth::from_device(&gl, &caps).unwrap();
        assert!(cell.try_update(&gl, 0.5).unwrap());

        assert_eq!(gl.count("glGetDoublev"), 0);
        assert_eq!(gl.count("glClearDepth"), 0);
        assert_eq!(gl.count("glGetFloatv"), 1);
        assert_eq!(gl.count("glClearDepthf"), 1);
        assert_eq!(gl.fixed().clear_depth, 0.5);
    }

    #[test]
    fn single_precision_clear_depth_is_cached_as_the_driver_holds_it() {
        let gl = FakeGl::new(Profile::es(3, 0));
        let caps = Capabilities::probe(&gl).unwrap();
        let mut cell = ClearDepth::from_device(&gl, &caps).unwrap();
        gl.clear_calls();

        assert!(cell.try_update(&gl, 0.1).unwrap());
        assert!(!cell.try_update(&gl, 0.1).unwrap());
        assert_eq!(gl.count("glClearDepthf"), 1);
        assert_eq!(cell.value(), f64::from(0.1f32));

        let reread = ClearDepth::from_device(&gl, &caps).unwrap();
        assert_eq!(reread, cell);
    }

    #[test]
    fn double_precision_clear_depth_is_kept_exact() {
        let gl = FakeGl::desktop();
        let caps = Capabilities::probe(&gl).unwrap();
        let mut cell = ClearDepth::from_device(&gl, &caps).unwrap();

        assert!(cell.try_update(&gl, 0.1).unwrap());
        assert_eq!(cell.value(), 0.1);
        assert_eq!(gl.fixed().clear_depth, 0.1);
    }
}
