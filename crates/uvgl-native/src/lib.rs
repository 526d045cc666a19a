//! Native OpenGL driver for `uvgl`.
//!
//! [`NativeGl`] forwards every [`uvgl_core::GlDriver`] call to the driver of
//! the context that is current on the calling thread.

mod ext;
mod loader;
mod native;

pub use native::NativeGl;
