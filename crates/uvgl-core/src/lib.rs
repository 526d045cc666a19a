#![allow(clippy::too_many_arguments)]

//! Shared building blocks for the Ultraviolet OpenGL core.
//!
//! - [`GlDriver`] is the raw call surface into the graphics driver. Every
//!   other crate in the workspace talks to the driver through it, which is
//!   what lets the state cache and the DSA layer run against
//!   [`testing::FakeGl`] in tests.
//! - [`Capabilities`] probes a live driver once at context creation and
//!   decides which [`DsaStrategy`] the context will use.
//! - [`GlError`] is the error taxonomy shared by every crate.
//! - [`pixels`] sizes the client memory of pixel transfers.
//! - [`types`] holds the typed GL enums decoded from driver queries.

pub mod capabilities;
pub mod driver;
pub mod error;
pub mod logging;
pub mod pixels;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use capabilities::{Capabilities, DsaStrategy, GlVersion};
pub use driver::{check_error, DsaFamily, GlDriver};
pub use error::{GlError, Result};
pub use pixels::{pixel_size, PixelDirection, PixelStore};
pub use types::*;

/// Raw GL scalar types, re-exported so downstream crates agree on them.
pub use gl::types as gl_types;
