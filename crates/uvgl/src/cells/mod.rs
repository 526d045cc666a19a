//! Shadow copies of individual pieces of GL global state.
//!
//! A cell is read from the driver once with its `from_device` constructor.
//! After that [`StateCell::try_update`] compares the desired value with the
//! cached one and only calls into the driver when they differ.

use std::fmt;

use gl::types::*;
use num_traits::FromPrimitive;
use tracing::trace;
use uvgl_core::{check_error, decode, GlDriver, Result};

mod blend;
mod capability;
mod depth;
mod raster;
mod stencil;

pub use blend::{BlendColor, BlendEquation, BlendEquations, BlendFunction, BlendFunctions};
pub use capability::CapabilityFlag;
pub use depth::{ClearDepth, DepthFunc, DepthMask};
pub use raster::{ClearStencil, ColorMask, CullFace, PolygonModeCell};
pub use stencil::{StencilFunc, StencilFuncState, StencilOp, StencilOpState};

/// One cached piece of driver state.
pub trait StateCell {
    type Value: Copy + PartialEq + fmt::Debug;

    /// Name used in logs.
    const NAME: &'static str;

    /// The last value known to be set on the driver.
    fn value(&self) -> Self::Value;

    /// Issue the driver call(s) that set `value`, checking for an error after
    /// each one.
    fn apply(&self, gl: &dyn GlDriver, value: Self::Value) -> Result<()>;

    /// Record `value` as current. Only called after [`StateCell::apply`]
    /// succeeded.
    fn store(&mut self, value: Self::Value);

    /// The value the driver ends up holding when asked for `value`.
    fn normalize(&self, value: Self::Value) -> Self::Value {
        value
    }

    /// Set `desired` on the driver unless it is already current.
    ///
    /// `desired` is normalized first. Returns `Ok(false)` without touching
    /// the driver when it then equals the cached value (exact comparison,
    /// including floats). On a driver error the cached value is left
    /// unchanged.
    fn try_update(&mut self, gl: &dyn GlDriver, desired: Self::Value) -> Result<bool> {
        let desired = self.normalize(desired);
        if self.value() == desired {
            return Ok(false);
        }
        self.apply(gl, desired)?;
        trace!(cell = Self::NAME, value = ?desired, "state changed");
        self.store(desired);
        Ok(true)
    }
}

pub(crate) fn get_integer(gl: &dyn GlDriver, pname: GLenum) -> Result<GLint> {
    let mut value = [0];
    gl.get_integer_v(pname, &mut value);
    check_error(gl, "glGetIntegerv")?;
    Ok(value[0])
}

/// Query an enum-valued integer and decode it.
pub(crate) fn get_enum<T: FromPrimitive>(gl: &dyn GlDriver, pname: GLenum, query: &'static str) -> Result<T> {
    decode(query, get_integer(gl, pname)?)
}

pub(crate) fn get_booleans<const N: usize>(gl: &dyn GlDriver, pname: GLenum) -> Result<[bool; N]> {
    let mut raw = [gl::FALSE; N];
    gl.get_boolean_v(pname, &mut raw);
    check_error(gl, "glGetBooleanv")?;
    Ok(raw.map(|b| b != gl::FALSE))
}

/// Run one setter and check `glGetError` after it.
pub(crate) fn set(gl: &dyn GlDriver, call: &'static str, f: impl FnOnce(&dyn GlDriver)) -> Result<()> {
    f(gl);
    check_error(gl, call)
}
