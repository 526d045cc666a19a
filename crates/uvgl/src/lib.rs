#![allow(clippy::too_many_arguments)]

//! Cached OpenGL device state and named-object access for one context.
//!
//! [`GlContext`] owns a driver and decides at creation time how GL objects
//! are addressed by name (see [`uvgl_dsa`]). Fixed-function state goes
//! through its [`StateCache`], which skips every call whose value is already
//! set on the driver.
//!
//! ```no_run
//! use uvgl::{BlendState, GlContext};
//!
//! # fn main() -> anyhow::Result<()> {
//! // SAFETY: the host made a GL context current on this thread.
//! let mut ctx = unsafe { GlContext::load_native()? };
//! ctx.apply_blend_state(&BlendState::ALPHA_BLEND)?;
//!
//! let (dsa, gl) = ctx.dsa();
//! dsa.named_buffer_data(gl, 1, gl::ARRAY_BUFFER, 64, None, gl::DYNAMIC_DRAW)?;
//! # Ok(())
//! # }
//! ```

pub mod cells;
mod context;
mod render_state;
mod reset;
mod state;

pub use context::GlContext;
pub use render_state::{BlendState, DepthStencilState, RasterizerState, StencilFaceDesc};
pub use reset::{reset_bind_points, BUFFER_TARGETS, TEXTURE_TARGETS};
pub use state::StateCache;

pub use uvgl_core::{
    BlendEquationMode, BlendFactor, Capabilities, Capability, CompareFunction, CullFaceMode,
    DsaStrategy, GlDriver, GlError, PolygonMode, StencilOperation,
};
pub use uvgl_dsa::DirectStateAccess;
pub use uvgl_native::NativeGl;
