#![allow(clippy::too_many_arguments)]

//! Named-object access for buffers, framebuffers, renderbuffers, textures
//! and vertex arrays.
//!
//! [`DirectStateAccess`] is one operation surface with three
//! implementations:
//!
//! | Variant             | Entry points                         | Bind points |
//! |---------------------|--------------------------------------|-------------|
//! | [`ArbDsa`]          | `ARB_direct_state_access` / GL 4.5   | untouched   |
//! | [`ExtDsa`]          | `EXT_direct_state_access`            | untouched   |
//! | [`BindEmulatedDsa`] | bind to a target, then legacy call   | **mutated** |
//!
//! A context picks one with [`select`] right after probing and keeps it for
//! its whole lifetime.

use std::ffi::c_void;

use gl::types::*;
use tracing::debug;
use uvgl_core::{
    check_error, pixel_size, Capabilities, DsaFamily, DsaStrategy, GlDriver, GlError, PixelDirection,
    PixelStore, Result,
};

mod arb;
mod emulated;
mod ext;

pub use arb::ArbDsa;
pub use emulated::BindEmulatedDsa;
pub use ext::ExtDsa;

/// Operations on GL objects addressed by name.
///
/// Every operation takes the object name, and where a legacy call would need
/// one, the target the object is bound to. `ArbDsa` ignores targets. `ExtDsa`
/// only forwards texture targets.
///
/// # Bind-state side effect
///
/// [`BindEmulatedDsa`] implements each operation by binding the object to the
/// supplied target and issuing the legacy call. The binding is **left in
/// place** afterwards. Code that relies on a particular buffer, texture,
/// framebuffer, renderbuffer or vertex array being bound must rebind it after
/// using this trait, or call `uvgl::reset_bind_points`. The two other
/// variants never change a bind point.
///
/// `GL_ELEMENT_ARRAY_BUFFER` is vertex array state: a buffer operation on
/// that target binds the buffer into whichever vertex array is bound.
///
/// # Client memory
///
/// Slices are checked before any driver call. Buffer data must cover
/// `size`; pixel slices must cover the span the current pixel-store
/// parameters give for the extent, format and type. A short slice fails
/// with [`GlError::SliceTooShort`].
///
/// # Errors
///
/// `glGetError` is checked after every driver call, and the first error is
/// returned as [`GlError::Driver`]. Nothing is retried.
pub trait DirectStateAccess {
    /// The strategy this implementation stands for.
    fn strategy(&self) -> DsaStrategy;

    // Buffers

    fn named_buffer_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        size: GLsizeiptr,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> Result<()>;

    fn named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        data: &[u8],
    ) -> Result<()>;

    /// Read `out.len()` bytes starting at `offset`.
    fn get_named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        out: &mut [u8],
    ) -> Result<()>;

    /// Map the whole buffer. The pointer stays valid until the buffer is
    /// unmapped.
    fn map_named_buffer(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        access: GLenum,
    ) -> Result<*mut c_void>;

    fn map_named_buffer_range(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> Result<*mut c_void>;

    /// Returns `false` if the buffer's contents were corrupted while mapped.
    fn unmap_named_buffer(&self, gl: &dyn GlDriver, buffer: GLuint, target: GLenum) -> Result<bool>;

    // Framebuffers

    fn named_framebuffer_texture(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
    ) -> Result<()>;

    fn named_framebuffer_renderbuffer(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) -> Result<()>;

    /// The emulated path binds `framebuffer` to `GL_DRAW_FRAMEBUFFER`.
    fn named_framebuffer_draw_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, buf: GLenum) -> Result<()>;

    /// The emulated path binds `framebuffer` to `GL_DRAW_FRAMEBUFFER`.
    fn named_framebuffer_draw_buffers(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        bufs: &[GLenum],
    ) -> Result<()>;

    /// The emulated path binds `framebuffer` to `GL_READ_FRAMEBUFFER`.
    fn named_framebuffer_read_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, src: GLenum) -> Result<()>;

    fn check_named_framebuffer_status(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
    ) -> Result<GLenum>;

    /// Fails with [`GlError::Unsupported`] on the EXT path, which has no
    /// equivalent, and on drivers without framebuffer invalidation.
    fn invalidate_named_framebuffer_data(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachments: &[GLenum],
    ) -> Result<()>;

    // Renderbuffers (the emulated path binds to `GL_RENDERBUFFER`)

    fn named_renderbuffer_storage(
        &self,
        gl: &dyn GlDriver,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()>;

    fn named_renderbuffer_storage_multisample(
        &self,
        gl: &dyn GlDriver,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()>;

    // Textures

    fn texture_parameter_i(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        pname: GLenum,
        param: GLint,
    ) -> Result<()>;

    fn texture_parameter_f(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        pname: GLenum,
        param: GLfloat,
    ) -> Result<()>;

    fn texture_storage_1d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    ) -> Result<()>;

    fn texture_storage_2d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()>;

    fn texture_storage_3d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) -> Result<()>;

    fn texture_sub_image_2d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    ) -> Result<()>;

    fn texture_sub_image_3d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        zoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    ) -> Result<()>;

    fn generate_texture_mipmap(&self, gl: &dyn GlDriver, texture: GLuint, target: GLenum) -> Result<()>;

    /// Read back a whole mip level into `out`, laid out by the pack
    /// parameters.
    fn get_texture_image(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
    ) -> Result<()>;

    // Vertex arrays (the emulated path binds the array itself)

    fn vertex_array_vertex_buffer(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) -> Result<()>;

    fn enable_vertex_array_attrib(&self, gl: &dyn GlDriver, vaobj: GLuint, index: GLuint) -> Result<()>;

    fn vertex_array_attrib_format(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) -> Result<()>;

    fn vertex_array_attrib_binding(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        binding_index: GLuint,
    ) -> Result<()>;
}

/// Pick the implementation the probed capabilities allow.
pub fn select(caps: &Capabilities, gl: &dyn GlDriver) -> Result<Box<dyn DirectStateAccess>> {
    for_strategy(caps.dsa_strategy(), caps, gl)
}

/// Build the implementation for `strategy`.
///
/// Fails with [`GlError::MissingEntryPoint`] if the driver did not load the
/// entry points the strategy needs.
pub fn for_strategy(
    strategy: DsaStrategy,
    caps: &Capabilities,
    gl: &dyn GlDriver,
) -> Result<Box<dyn DirectStateAccess>> {
    let dsa: Box<dyn DirectStateAccess> = match strategy {
        DsaStrategy::Arb => {
            require(gl, DsaFamily::Arb, "ARB_direct_state_access")?;
            Box::new(ArbDsa::new(caps))
        }
        DsaStrategy::Ext => {
            require(gl, DsaFamily::Ext, "EXT_direct_state_access")?;
            Box::new(ExtDsa)
        }
        DsaStrategy::BindEmulated => Box::new(BindEmulatedDsa::new(caps)),
    };
    debug!(strategy = %strategy, "selected named-object access");
    Ok(dsa)
}

fn require(gl: &dyn GlDriver, family: DsaFamily, name: &'static str) -> Result<()> {
    if gl.has_entry_points(family) {
        Ok(())
    } else {
        Err(GlError::MissingEntryPoint(name))
    }
}

/// Fail unless `data` holds the `size` bytes the driver will read.
pub(crate) fn check_buffer_data(size: GLsizeiptr, data: Option<&[u8]>) -> Result<()> {
    match data {
        Some(data) if size > 0 && data.len() < size as usize => Err(GlError::SliceTooShort {
            what: "buffer data",
            required: size as usize,
            len: data.len(),
        }),
        _ => Ok(()),
    }
}

/// Fail unless `len` bytes of client memory cover a pixel transfer of
/// `extent`. `rows` and `images` pick the pixel-store parameters to read,
/// as in [`PixelStore::query`].
pub(crate) fn check_pixels(
    gl: &dyn GlDriver,
    direction: PixelDirection,
    (rows, images): (bool, bool),
    format: GLenum,
    ty: GLenum,
    extent: [GLsizei; 3],
    len: usize,
) -> Result<()> {
    let pixel = pixel_size(format, ty)?;
    let [width, height, depth] = extent;
    if width <= 0 || height <= 0 || depth <= 0 {
        return Ok(());
    }
    let store = PixelStore::query(gl, direction, rows, images)?;
    let required = store.required_len(pixel, width, height, depth);
    if len < required {
        return Err(GlError::SliceTooShort {
            what: match direction {
                PixelDirection::Unpack => "pixel upload",
                PixelDirection::Pack => "texture readback",
            },
            required,
            len,
        });
    }
    Ok(())
}

/// Width, height and depth of one mip level, each read through `query`.
pub(crate) fn level_extent(
    gl: &dyn GlDriver,
    call: &'static str,
    query: impl Fn(&dyn GlDriver, GLenum, &mut [GLint]),
) -> Result<[GLsizei; 3]> {
    let mut extent = [0; 3];
    for (slot, pname) in extent
        .iter_mut()
        .zip([gl::TEXTURE_WIDTH, gl::TEXTURE_HEIGHT, gl::TEXTURE_DEPTH])
    {
        let mut value = [0];
        checked(gl, call, |gl| query(gl, pname, &mut value))?;
        *slot = value[0];
    }
    Ok(extent)
}

/// Whether readbacks of `target` go through the image pack parameters.
pub(crate) fn has_images(target: GLenum) -> bool {
    matches!(
        target,
        gl::TEXTURE_3D | gl::TEXTURE_2D_ARRAY | gl::TEXTURE_CUBE_MAP_ARRAY
    )
}

/// Issue one driver call and check `glGetError` right after it.
pub(crate) fn checked<T>(gl: &dyn GlDriver, call: &'static str, f: impl FnOnce(&dyn GlDriver) -> T) -> Result<T> {
    let value = f(gl);
    check_error(gl, call)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};

    use super::*;

    fn probe(gl: &FakeGl) -> Capabilities {
        Capabilities::probe(gl).unwrap()
    }

    #[test]
    fn selects_arb_on_gl_45() {
        let gl = FakeGl::desktop();
        let dsa = select(&probe(&gl), &gl).unwrap();
        assert_eq!(dsa.strategy(), DsaStrategy::Arb);
    }

    #[test]
    fn falls_back_to_ext_without_arb_entry_points() {
        let gl = FakeGl::new(
            Profile::desktop(3, 3)
                .with_extension("GL_EXT_direct_state_access")
                .without_entry_points(DsaFamily::Arb),
        );
        let dsa = select(&probe(&gl), &gl).unwrap();
        assert_eq!(dsa.strategy(), DsaStrategy::Ext);
    }

    #[test]
    fn falls_back_to_bind_emulation_on_es() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = select(&probe(&gl), &gl).unwrap();
        assert_eq!(dsa.strategy(), DsaStrategy::BindEmulated);
    }

    #[test]
    fn forcing_an_unloaded_family_fails() {
        let gl = FakeGl::new(Profile::desktop(4, 6).without_entry_points(DsaFamily::Ext));
        let caps = probe(&gl);
        let err = for_strategy(DsaStrategy::Ext, &caps, &gl).err();
        assert_eq!(err, Some(GlError::MissingEntryPoint("EXT_direct_state_access")));
    }

    #[test]
    fn short_buffer_data_is_refused_by_every_variant() {
        let gl = FakeGl::desktop();
        let caps = probe(&gl);
        gl.clear_calls();

        for strategy in [DsaStrategy::Arb, DsaStrategy::Ext, DsaStrategy::BindEmulated] {
            let dsa = for_strategy(strategy, &caps, &gl).unwrap();
            let err = dsa
                .named_buffer_data(&gl, 1, gl::ARRAY_BUFFER, 64, Some(&[1, 2, 3, 4]), gl::STATIC_DRAW)
                .unwrap_err();
            assert_eq!(
                err,
                GlError::SliceTooShort {
                    what: "buffer data",
                    required: 64,
                    len: 4
                },
                "{strategy}"
            );
        }
        assert!(gl.calls().is_empty());
        assert!(gl.objects().buffers.is_empty());
    }

    #[test]
    fn short_pixel_uploads_are_refused_by_every_variant() {
        let gl = FakeGl::desktop();
        let caps = probe(&gl);

        for (texture, strategy) in [(1, DsaStrategy::Arb), (2, DsaStrategy::Ext), (3, DsaStrategy::BindEmulated)] {
            let dsa = for_strategy(strategy, &caps, &gl).unwrap();
            let err = dsa
                .texture_sub_image_2d(&gl, texture, gl::TEXTURE_2D, 0, 0, 0, 4, 4, gl::RGBA, gl::UNSIGNED_BYTE, &[0; 60])
                .unwrap_err();
            assert_eq!(
                err,
                GlError::SliceTooShort {
                    what: "pixel upload",
                    required: 64,
                    len: 60
                },
                "{strategy}"
            );
            let err = dsa
                .texture_sub_image_3d(
                    &gl,
                    texture,
                    gl::TEXTURE_3D,
                    0,
                    0,
                    0,
                    0,
                    4,
                    4,
                    2,
                    gl::RGBA,
                    gl::UNSIGNED_BYTE,
                    &[0; 64],
                )
                .unwrap_err();
            assert!(matches!(err, GlError::SliceTooShort { required: 128, .. }), "{strategy}");
        }
        assert_eq!(gl.count("glTextureSubImage2D"), 0);
        assert_eq!(gl.count("glTextureSubImage3DEXT"), 0);
        assert_eq!(gl.count("glTexSubImage3D"), 0);
        assert_eq!(gl.count("glBindTexture"), 0);
    }

    #[test]
    fn pixel_slices_are_sized_with_the_unpack_parameters() {
        let gl = FakeGl::desktop();
        let dsa = select(&probe(&gl), &gl).unwrap();
        dsa.texture_storage_2d(&gl, 1, gl::TEXTURE_2D, 1, gl::RGB8, 3, 2)
            .unwrap();

        // Rows of 9 bytes padded to 12: 21 bytes, not 18.
        let err = dsa
            .texture_sub_image_2d(&gl, 1, gl::TEXTURE_2D, 0, 0, 0, 3, 2, gl::RGB, gl::UNSIGNED_BYTE, &[0; 18])
            .unwrap_err();
        assert!(matches!(err, GlError::SliceTooShort { required: 21, len: 18, .. }));

        gl.seed(|s| s.unpack.alignment = 1);
        dsa.texture_sub_image_2d(&gl, 1, gl::TEXTURE_2D, 0, 0, 0, 3, 2, gl::RGB, gl::UNSIGNED_BYTE, &[7; 18])
            .unwrap();
        assert_eq!(gl.objects().textures[&1].levels[0].data, vec![7; 18]);
    }

    #[test]
    fn unknown_pixel_type_is_an_invalid_argument() {
        let gl = FakeGl::desktop();
        let dsa = select(&probe(&gl), &gl).unwrap();
        let err = dsa
            .texture_sub_image_2d(&gl, 1, gl::TEXTURE_2D, 0, 0, 0, 1, 1, gl::RGBA, gl::RGBA8, &[0; 4])
            .unwrap_err();
        assert_eq!(
            err,
            GlError::InvalidArgument {
                what: "pixel type",
                value: gl::RGBA8
            }
        );
    }

    #[test]
    fn short_readbacks_are_refused_before_the_driver_writes() {
        let gl = FakeGl::desktop();
        let caps = probe(&gl);

        for (texture, strategy) in [(1, DsaStrategy::Ext), (2, DsaStrategy::BindEmulated)] {
            let dsa = for_strategy(strategy, &caps, &gl).unwrap();
            dsa.texture_storage_2d(&gl, texture, gl::TEXTURE_2D, 2, gl::RGBA8, 4, 4)
                .unwrap();
            let mut out = [0u8; 32];
            let err = dsa
                .get_texture_image(&gl, texture, gl::TEXTURE_2D, 0, gl::RGBA, gl::UNSIGNED_BYTE, &mut out)
                .unwrap_err();
            assert_eq!(
                err,
                GlError::SliceTooShort {
                    what: "texture readback",
                    required: 64,
                    len: 32
                },
                "{strategy}"
            );
            // The second level is 2×2 and fits.
            dsa.get_texture_image(&gl, texture, gl::TEXTURE_2D, 1, gl::RGBA, gl::UNSIGNED_BYTE, &mut out[..16])
                .unwrap();
        }
        assert_eq!(gl.count("glGetTextureImageEXT"), 1);
        assert_eq!(gl.count("glGetTexImage"), 1);

        // The ARB path hands the slice length to the driver instead.
        let dsa = for_strategy(DsaStrategy::Arb, &caps, &gl).unwrap();
        let mut out = [0u8; 32];
        let err = dsa
            .get_texture_image(&gl, 1, gl::TEXTURE_2D, 0, gl::RGBA, gl::UNSIGNED_BYTE, &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            GlError::Driver {
                call: "glGetTextureImage",
                code: gl::INVALID_OPERATION
            }
        );
    }

    #[test]
    fn checked_reports_the_failing_call() {
        let gl = FakeGl::desktop();
        gl.fail_next("glDepthFunc", gl::INVALID_ENUM);
        let result = checked(&gl, "glDepthFunc", |gl| gl.depth_func(gl::LESS));
        assert_eq!(
            result,
            Err(GlError::Driver {
                call: "glDepthFunc",
                code: gl::INVALID_ENUM
            })
        );
    }
}
