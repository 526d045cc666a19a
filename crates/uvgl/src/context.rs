//! One rendering context: driver, probed capabilities, the chosen
//! named-object path and the state cache.

use std::marker::PhantomData;

use anyhow::{Context as _, Result};
use tracing::info;
use uvgl_core::{Capabilities, DsaStrategy, GlDriver};
use uvgl_dsa::DirectStateAccess;
use uvgl_native::NativeGl;

use crate::render_state::{BlendState, DepthStencilState, RasterizerState};
use crate::state::StateCache;

/// Everything tied to one GL context.
///
/// Capabilities are probed and the [`DirectStateAccess`] variant is chosen
/// once, in [`GlContext::new`]; neither changes afterwards. The context must
/// stay on the thread it was created on, so it is neither `Send` nor `Sync`.
pub struct GlContext<D: GlDriver> {
    driver: D,
    caps: Capabilities,
    dsa: Box<dyn DirectStateAccess>,
    state: StateCache,
    _not_send: PhantomData<*const ()>,
}

impl GlContext<NativeGl> {
    /// Load the driver through the system GL library and set up a context.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and must stay
    /// current whenever the returned value is used.
    pub unsafe fn load_native() -> Result<Self> {
        let driver = NativeGl::load().context("loading GL entry points")?;
        Self::new(driver)
    }
}

impl<D: GlDriver> GlContext<D> {
    pub fn new(driver: D) -> Result<Self> {
        let caps = Capabilities::probe(&driver).context("probing driver capabilities")?;
        let dsa = uvgl_dsa::select(&caps, &driver).context("selecting named-object access")?;
        let state = StateCache::from_device(&driver, &caps).context("reading initial driver state")?;
        info!(version = %caps.version, strategy = %dsa.strategy(), "GL context ready");

        Ok(Self {
            driver,
            caps,
            dsa,
            state,
            _not_send: PhantomData,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn caps(&self) -> &Capabilities {
        &self.caps
    }

    pub fn dsa_strategy(&self) -> DsaStrategy {
        self.dsa.strategy()
    }

    /// The named-object path together with the driver it runs against.
    ///
    /// Under [`DsaStrategy::BindEmulated`] every call leaves its object bound;
    /// see [`GlContext::reset_bind_points`].
    pub fn dsa(&self) -> (&dyn DirectStateAccess, &dyn GlDriver) {
        (self.dsa.as_ref(), &self.driver)
    }

    pub fn state(&self) -> &StateCache {
        &self.state
    }

    /// The state cache together with the driver its setters need.
    pub fn state_mut(&mut self) -> (&mut StateCache, &dyn GlDriver) {
        (&mut self.state, &self.driver)
    }

    pub fn apply_blend_state(&mut self, blend: &BlendState) -> uvgl_core::Result<bool> {
        self.state.apply_blend_state(&self.driver, blend)
    }

    pub fn apply_depth_stencil_state(&mut self, depth_stencil: &DepthStencilState) -> uvgl_core::Result<bool> {
        self.state.apply_depth_stencil_state(&self.driver, depth_stencil)
    }

    pub fn apply_rasterizer_state(&mut self, rasterizer: &RasterizerState) -> uvgl_core::Result<bool> {
        self.state.apply_rasterizer_state(&self.driver, rasterizer)
    }

    /// Re-read the state cache after foreign code touched the context.
    pub fn refresh_state(&mut self) -> uvgl_core::Result<()> {
        self.state.refresh(&self.driver, &self.caps)
    }

    pub fn reset_bind_points(&self) -> uvgl_core::Result<()> {
        crate::reset::reset_bind_points(&self.driver)
    }
}

impl<D: GlDriver> std::fmt::Debug for GlContext<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("caps", &self.caps)
            .field("dsa", &self.dsa.strategy())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};
    use uvgl_core::{CompareFunction, DsaFamily};

    use super::*;

    #[test]
    fn desktop_context_uses_arb_and_caches_state() {
        let mut ctx = GlContext::new(FakeGl::desktop()).unwrap();
        assert_eq!(ctx.dsa_strategy(), DsaStrategy::Arb);
        ctx.driver().clear_calls();

        let (state, gl) = ctx.state_mut();
        assert!(state.set_depth_func(gl, CompareFunction::Greater).unwrap());
        assert!(!state.set_depth_func(gl, CompareFunction::Greater).unwrap());
        assert_eq!(ctx.driver().count("glDepthFunc"), 1);
        assert_eq!(ctx.state().depth_func(), CompareFunction::Greater);
    }

    #[test]
    fn context_without_entry_points_falls_back_to_binding() {
        let profile = Profile::desktop(3, 3)
            .with_extension("GL_EXT_direct_state_access")
            .without_entry_points(DsaFamily::Ext);
        let ctx = GlContext::new(FakeGl::new(profile)).unwrap();
        assert_eq!(ctx.dsa_strategy(), DsaStrategy::BindEmulated);

        let (dsa, gl) = ctx.dsa();
        dsa.named_buffer_data(gl, 1, gl::ARRAY_BUFFER, 4, Some(&[1, 2, 3, 4]), gl::STATIC_DRAW)
            .unwrap();
        assert_eq!(ctx.driver().bindings().buffers[&gl::ARRAY_BUFFER], 1);

        ctx.reset_bind_points().unwrap();
        assert!(ctx.driver().bindings().is_default());
    }

    #[test]
    fn driver_failure_during_setup_is_reported_with_context() {
        let gl = FakeGl::desktop();
        gl.fail_next("glGetBooleanv", gl::INVALID_ENUM);

        let err = GlContext::new(gl).unwrap_err();
        assert_eq!(err.to_string(), "reading initial driver state");
        assert!(err.root_cause().to_string().contains("glGetBooleanv"));
    }

    #[test]
    fn refresh_picks_up_foreign_changes() {
        let mut ctx = GlContext::new(FakeGl::desktop()).unwrap();
        ctx.driver().seed(|s| s.depth_mask = false);
        assert!(ctx.state().depth_mask());

        ctx.refresh_state().unwrap();
        assert!(!ctx.state().depth_mask());
    }
}
