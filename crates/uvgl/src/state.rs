//! The per-context owner of every state cell.

use std::marker::PhantomData;

use gl::types::*;
use tracing::debug;
use uvgl_core::{
    BlendEquationMode, Capabilities, Capability, CompareFunction, CullFaceMode, GlDriver, GlError,
    PolygonMode, Result,
};

use crate::cells::{
    BlendColor, BlendEquation, BlendEquations, BlendFunction, BlendFunctions, CapabilityFlag,
    ClearDepth, ClearStencil, ColorMask, CullFace, DepthFunc, DepthMask, PolygonModeCell,
    StateCell, StencilFunc, StencilFuncState, StencilOp, StencilOpState,
};

/// Cached copy of the driver's fixed-function state.
///
/// Every setter returns `Ok(true)` if it issued a driver call and `Ok(false)`
/// if the requested value was already current. A cache belongs to the
/// thread its context is current on and cannot be sent elsewhere.
#[derive(Debug, Clone)]
pub struct StateCache {
    blend_color: BlendColor,
    blend_equation: BlendEquation,
    blend_function: BlendFunction,
    color_mask: ColorMask,
    depth_func: DepthFunc,
    depth_mask: DepthMask,
    clear_depth: ClearDepth,
    clear_stencil: ClearStencil,
    stencil_func: [StencilFunc; 2],
    stencil_op: [StencilOp; 2],
    cull_face: CullFace,
    polygon_mode: PolygonModeCell,
    capabilities: Vec<CapabilityFlag>,
    _not_send: PhantomData<*const ()>,
}

impl StateCache {
    /// Read every cell from the driver.
    pub fn from_device(gl: &dyn GlDriver, caps: &Capabilities) -> Result<Self> {
        let capabilities = Capability::ALL
            .iter()
            .map(|&cap| CapabilityFlag::from_device(gl, cap))
            .collect::<Result<Vec<_>>>()?;

        let cache = Self {
            blend_color: BlendColor::from_device(gl)?,
            blend_equation: BlendEquation::from_device(gl)?,
            blend_function: BlendFunction::from_device(gl)?,
            color_mask: ColorMask::from_device(gl)?,
            depth_func: DepthFunc::from_device(gl)?,
            depth_mask: DepthMask::from_device(gl)?,
            clear_depth: ClearDepth::from_device(gl, caps)?,
            clear_stencil: ClearStencil::from_device(gl)?,
            stencil_func: [
                StencilFunc::from_device(gl, gl::FRONT)?,
                StencilFunc::from_device(gl, gl::BACK)?,
            ],
            stencil_op: [
                StencilOp::from_device(gl, gl::FRONT)?,
                StencilOp::from_device(gl, gl::BACK)?,
            ],
            cull_face: CullFace::from_device(gl)?,
            polygon_mode: PolygonModeCell::from_device(gl, caps)?,
            capabilities,
            _not_send: PhantomData,
        };
        debug!("state cache loaded from driver");
        Ok(cache)
    }

    /// Re-read everything, for when code outside the cache changed state.
    pub fn refresh(&mut self, gl: &dyn GlDriver, caps: &Capabilities) -> Result<()> {
        *self = Self::from_device(gl, caps)?;
        Ok(())
    }

    pub fn blend_color(&self) -> [GLfloat; 4] {
        self.blend_color.value()
    }

    pub fn set_blend_color(&mut self, gl: &dyn GlDriver, color: [GLfloat; 4]) -> Result<bool> {
        self.blend_color.try_update(gl, color)
    }

    pub fn blend_equation(&self) -> BlendEquations {
        self.blend_equation.value()
    }

    pub fn set_blend_equation(&mut self, gl: &dyn GlDriver, rgb: BlendEquationMode, alpha: BlendEquationMode) -> Result<bool> {
        self.blend_equation.try_update(gl, BlendEquations { rgb, alpha })
    }

    pub fn blend_function(&self) -> BlendFunctions {
        self.blend_function.value()
    }

    pub fn set_blend_function(&mut self, gl: &dyn GlDriver, functions: BlendFunctions) -> Result<bool> {
        self.blend_function.try_update(gl, functions)
    }

    pub fn color_mask(&self) -> [bool; 4] {
        self.color_mask.value()
    }

    pub fn set_color_mask(&mut self, gl: &dyn GlDriver, mask: [bool; 4]) -> Result<bool> {
        self.color_mask.try_update(gl, mask)
    }

    pub fn depth_func(&self) -> CompareFunction {
        self.depth_func.value()
    }

    pub fn set_depth_func(&mut self, gl: &dyn GlDriver, func: CompareFunction) -> Result<bool> {
        self.depth_func.try_update(gl, func)
    }

    pub fn depth_mask(&self) -> bool {
        self.depth_mask.value()
    }

    pub fn set_depth_mask(&mut self, gl: &dyn GlDriver, enabled: bool) -> Result<bool> {
        self.depth_mask.try_update(gl, enabled)
    }

    pub fn clear_depth(&self) -> GLdouble {
        self.clear_depth.value()
    }

    pub fn set_clear_depth(&mut self, gl: &dyn GlDriver, depth: GLdouble) -> Result<bool> {
        self.clear_depth.try_update(gl, depth)
    }

    pub fn clear_stencil(&self) -> GLint {
        self.clear_stencil.value()
    }

    pub fn set_clear_stencil(&mut self, gl: &dyn GlDriver, value: GLint) -> Result<bool> {
        self.clear_stencil.try_update(gl, value)
    }

    /// Stencil function of `GL_FRONT` or `GL_BACK`.
    pub fn stencil_func(&self, face: GLenum) -> Result<StencilFuncState> {
        Ok(self.stencil_func[face_index(face)?].value())
    }

    /// `face` may be `GL_FRONT`, `GL_BACK` or `GL_FRONT_AND_BACK`.
    pub fn set_stencil_func(&mut self, gl: &dyn GlDriver, face: GLenum, desired: StencilFuncState) -> Result<bool> {
        if face == gl::FRONT_AND_BACK {
            let [front, back] = &mut self.stencil_func;
            return StencilFunc::try_update_combined(front, back, gl, desired);
        }
        self.stencil_func[face_index(face)?].try_update(gl, desired)
    }

    /// Stencil operations of `GL_FRONT` or `GL_BACK`.
    pub fn stencil_op(&self, face: GLenum) -> Result<StencilOpState> {
        Ok(self.stencil_op[face_index(face)?].value())
    }

    /// `face` may be `GL_FRONT`, `GL_BACK` or `GL_FRONT_AND_BACK`.
    pub fn set_stencil_op(&mut self, gl: &dyn GlDriver, face: GLenum, desired: StencilOpState) -> Result<bool> {
        if face == gl::FRONT_AND_BACK {
            let [front, back] = &mut self.stencil_op;
            return StencilOp::try_update_combined(front, back, gl, desired);
        }
        self.stencil_op[face_index(face)?].try_update(gl, desired)
    }

    pub fn cull_face(&self) -> CullFaceMode {
        self.cull_face.value()
    }

    pub fn set_cull_face(&mut self, gl: &dyn GlDriver, mode: CullFaceMode) -> Result<bool> {
        self.cull_face.try_update(gl, mode)
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode.value()
    }

    pub fn set_polygon_mode(&mut self, gl: &dyn GlDriver, mode: PolygonMode) -> Result<bool> {
        self.polygon_mode.try_update(gl, mode)
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities
            .iter()
            .any(|flag| flag.capability() == capability && flag.value())
    }

    pub fn set_enabled(&mut self, gl: &dyn GlDriver, capability: Capability, enabled: bool) -> Result<bool> {
        match self.capabilities.iter_mut().find(|flag| flag.capability() == capability) {
            Some(flag) => flag.try_update(gl, enabled),
            None => Err(GlError::InvalidArgument {
                what: "capability",
                value: capability.as_gl(),
            }),
        }
    }
}

fn face_index(face: GLenum) -> Result<usize> {
    match face {
        gl::FRONT => Ok(0),
        gl::BACK => Ok(1),
        value => Err(GlError::InvalidArgument {
            what: "stencil face",
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};
    use uvgl_core::StencilOperation;

    use super::*;

    fn cache(gl: &FakeGl) -> StateCache {
        let caps = Capabilities::probe(gl).unwrap();
        let cache = StateCache::from_device(gl, &caps).unwrap();
        gl.clear_calls();
        cache
    }

    #[test]
    fn loads_gl_defaults() {
        let gl = FakeGl::desktop();
        let cache = cache(&gl);
        assert_eq!(cache.depth_func(), CompareFunction::Less);
        assert!(cache.depth_mask());
        assert_eq!(cache.cull_face(), CullFaceMode::Back);
        assert_eq!(cache.polygon_mode(), PolygonMode::Fill);
        assert_eq!(cache.clear_depth(), 1.0);
        assert!(!cache.is_enabled(Capability::Blend));
    }

    #[test]
    fn loading_never_sets_state() {
        let gl = FakeGl::desktop();
        let caps = Capabilities::probe(&gl).unwrap();
        let before = gl.fixed();
        StateCache::from_device(&gl, &caps).unwrap();
        assert_eq!(gl.fixed(), before);
        assert!(gl
            .call_names()
            .iter()
            .all(|name| name.starts_with("glGet") || *name == "glIsEnabled"));
    }

    #[test]
    fn repeated_requests_reach_the_driver_once() {
        let gl = FakeGl::desktop();
        let mut cache = cache(&gl);

        for _ in 0..3 {
            cache.set_enabled(&gl, Capability::Blend, true).unwrap();
            cache.set_depth_func(&gl, CompareFunction::LessOrEqual).unwrap();
            cache.set_blend_color(&gl, [1.0, 0.5, 0.25, 1.0]).unwrap();
        }
        assert_eq!(gl.call_names(), vec!["glEnable", "glDepthFunc", "glBlendColor"]);
        assert_eq!(gl.error_checks(), 3);
    }

    #[test]
    fn front_and_back_uses_the_combined_path() {
        let gl = FakeGl::desktop();
        let mut cache = cache(&gl);
        let desired = StencilOpState {
            stencil_fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            depth_pass: StencilOperation::Replace,
        };

        assert!(cache.set_stencil_op(&gl, gl::FRONT_AND_BACK, desired).unwrap());
        assert_eq!(cache.stencil_op(gl::FRONT).unwrap(), desired);
        assert_eq!(cache.stencil_op(gl::BACK).unwrap(), desired);
        assert_eq!(gl.call_names(), vec!["glStencilOp"]);

        assert!(!cache.set_stencil_op(&gl, gl::BACK, desired).unwrap());
        assert!(matches!(
            cache.stencil_func(gl::NONE),
            Err(GlError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn es_cache_skips_polygon_mode_and_double_depth() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let caps = Capabilities::probe(&gl).unwrap();
        gl.clear_calls();
        let mut cache = StateCache::from_device(&gl, &caps).unwrap();

        assert_eq!(gl.count("glGetDoublev"), 0);
        assert!(!gl.calls().iter().any(|c| c.args == gl::POLYGON_MODE.to_string()));
        assert!(cache.set_clear_depth(&gl, 0.0).unwrap());
        assert_eq!(gl.count("glClearDepthf"), 1);
    }
}
