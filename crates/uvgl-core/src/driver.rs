//! The raw driver call surface.
//!
//! [`GlDriver`] mirrors the driver's entry points one to one, except that
//! client memory is passed as slices instead of raw pointers. It is object
//! safe so a context can hold a `Box<dyn GlDriver>` and tests can substitute
//! a recording fake.
//!
//! Where the driver learns the length of client memory from the slice, or
//! from a size the implementation checks against it, the method is safe.
//! Pixel transfers size client memory from the extent, format, type and the
//! pixel-store state, which an implementation cannot see, so those methods
//! are `unsafe`; see [`crate::pixels`] for computing the span.
//!
//! Methods are grouped as:
//! - global state queries and setters,
//! - legacy object calls that act on whatever is bound to a target,
//! - `ARB_direct_state_access` (GL 4.5 core) named-object calls,
//! - `EXT_direct_state_access` named-object calls.

use std::ffi::c_void;

use gl::types::*;
use tracing::error;

use crate::error::{GlError, Result};

/// A family of named-object entry points a driver may or may not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsaFamily {
    Arb,
    Ext,
}

/// Raw OpenGL entry points.
///
/// Implementations are used from the thread that owns the GL context.
pub trait GlDriver {
    /// Whether every entry point of `family` resolved when the driver loaded.
    fn has_entry_points(&self, family: DsaFamily) -> bool;

    // ---------------------------------------------------------------------
    // Errors and queries
    // ---------------------------------------------------------------------

    /// `glGetError`. Returns `GL_NO_ERROR` when no error is pending.
    fn get_error(&self) -> GLenum;
    fn get_string(&self, name: GLenum) -> Option<String>;
    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String>;
    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]);
    fn get_float_v(&self, pname: GLenum, out: &mut [GLfloat]);
    fn get_double_v(&self, pname: GLenum, out: &mut [GLdouble]);
    fn get_boolean_v(&self, pname: GLenum, out: &mut [GLboolean]);
    fn is_enabled(&self, cap: GLenum) -> bool;

    // ---------------------------------------------------------------------
    // Fixed-function state
    // ---------------------------------------------------------------------

    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn blend_color(&self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn blend_equation(&self, mode: GLenum);
    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum);
    fn blend_func_separate(
        &self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    );
    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool);
    fn depth_func(&self, func: GLenum);
    fn depth_mask(&self, flag: bool);
    fn clear_depth(&self, depth: GLdouble);
    fn clear_depth_f(&self, depth: GLfloat);
    fn clear_stencil(&self, s: GLint);
    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint);
    fn stencil_func_separate(&self, face: GLenum, func: GLenum, reference: GLint, mask: GLuint);
    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    fn stencil_op_separate(&self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    fn cull_face(&self, mode: GLenum);
    fn polygon_mode(&self, face: GLenum, mode: GLenum);

    // ---------------------------------------------------------------------
    // Legacy bind-to-target object calls
    // ---------------------------------------------------------------------

    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    /// Raises `GL_INVALID_VALUE` without touching the buffer when `data` is
    /// shorter than `size`. The same holds for the named variants.
    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum);
    fn buffer_sub_data(&self, target: GLenum, offset: GLintptr, data: &[u8]);
    fn get_buffer_sub_data(&self, target: GLenum, offset: GLintptr, out: &mut [u8]);
    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void;
    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void;
    fn unmap_buffer(&self, target: GLenum) -> bool;

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint);
    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint);
    fn framebuffer_renderbuffer(
        &self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    );
    fn draw_buffer(&self, buf: GLenum);
    fn draw_buffers(&self, bufs: &[GLenum]);
    fn read_buffer(&self, src: GLenum);
    fn check_framebuffer_status(&self, target: GLenum) -> GLenum;
    fn invalidate_framebuffer(&self, target: GLenum, attachments: &[GLenum]);

    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint);
    fn renderbuffer_storage(
        &self,
        target: GLenum,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );

    fn bind_texture(&self, target: GLenum, texture: GLuint);
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat);
    fn tex_storage_1d(&self, target: GLenum, levels: GLsizei, internal_format: GLenum, width: GLsizei);
    fn tex_storage_2d(
        &self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn tex_storage_3d(
        &self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn tex_sub_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn tex_sub_image_3d(
        &self,
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
    );
    fn generate_mipmap(&self, target: GLenum);
    fn get_tex_level_parameter_iv(&self, target: GLenum, level: GLint, pname: GLenum, out: &mut [GLint]);
    /// # Safety
    ///
    /// `out` must hold the whole level as laid out by the pack parameters.
    unsafe fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]);

    fn bind_vertex_array(&self, array: GLuint);
    fn bind_vertex_buffer(
        &self,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    );
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn vertex_attrib_format(
        &self,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    );
    fn vertex_attrib_binding(&self, attrib_index: GLuint, binding_index: GLuint);

    // ---------------------------------------------------------------------
    // ARB_direct_state_access
    // ---------------------------------------------------------------------

    fn named_buffer_data(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum);
    fn named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, data: &[u8]);
    fn get_named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]);
    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void;
    fn map_named_buffer_range(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void;
    fn unmap_named_buffer(&self, buffer: GLuint) -> bool;

    fn named_framebuffer_texture(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn named_framebuffer_renderbuffer(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    );
    fn named_framebuffer_draw_buffer(&self, framebuffer: GLuint, buf: GLenum);
    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]);
    fn named_framebuffer_read_buffer(&self, framebuffer: GLuint, src: GLenum);
    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum;
    fn invalidate_named_framebuffer_data(&self, framebuffer: GLuint, attachments: &[GLenum]);

    fn named_renderbuffer_storage(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn named_renderbuffer_storage_multisample(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );

    fn texture_parameter_i(&self, texture: GLuint, pname: GLenum, param: GLint);
    fn texture_parameter_f(&self, texture: GLuint, pname: GLenum, param: GLfloat);
    fn texture_storage_1d(&self, texture: GLuint, levels: GLsizei, internal_format: GLenum, width: GLsizei);
    fn texture_storage_2d(
        &self,
        texture: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn texture_storage_3d(
        &self,
        texture: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn texture_sub_image_2d(
        &self,
        texture: GLuint,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn texture_sub_image_3d(
        &self,
        texture: GLuint,
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
    );
    fn generate_texture_mipmap(&self, texture: GLuint);
    /// The driver is told `out.len()` and refuses to write past it.
    fn get_texture_image(&self, texture: GLuint, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]);

    fn vertex_array_vertex_buffer(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    );
    fn enable_vertex_array_attrib(&self, vaobj: GLuint, index: GLuint);
    fn vertex_array_attrib_format(
        &self,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    );
    fn vertex_array_attrib_binding(&self, vaobj: GLuint, attrib_index: GLuint, binding_index: GLuint);

    // ---------------------------------------------------------------------
    // EXT_direct_state_access
    //
    // Texture entry points of this family take the texture target
    // alongside the name.
    // ---------------------------------------------------------------------

    fn named_buffer_data_ext(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum);
    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, data: &[u8]);
    fn get_named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]);
    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void;
    fn map_named_buffer_range_ext(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void;
    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool;

    fn named_framebuffer_texture_ext(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn named_framebuffer_renderbuffer_ext(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    );
    fn framebuffer_draw_buffer_ext(&self, framebuffer: GLuint, mode: GLenum);
    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]);
    fn framebuffer_read_buffer_ext(&self, framebuffer: GLuint, mode: GLenum);
    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum;

    fn named_renderbuffer_storage_ext(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn named_renderbuffer_storage_multisample_ext(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );

    fn texture_parameter_i_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLint);
    fn texture_parameter_f_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLfloat);
    fn texture_storage_1d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    );
    fn texture_storage_2d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );
    fn texture_storage_3d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn texture_sub_image_2d_ext(
        &self,
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
    );
    /// # Safety
    ///
    /// `pixels` must hold the span the unpack parameters give for this
    /// extent, format and type.
    unsafe fn texture_sub_image_3d_ext(
        &self,
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
    );
    fn generate_texture_mipmap_ext(&self, texture: GLuint, target: GLenum);
    fn get_texture_level_parameter_iv_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        out: &mut [GLint],
    );
    /// # Safety
    ///
    /// `out` must hold the whole level as laid out by the pack parameters.
    unsafe fn get_texture_image_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
    );

    fn vertex_array_bind_vertex_buffer_ext(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    );
    fn enable_vertex_array_attrib_ext(&self, vaobj: GLuint, index: GLuint);
    fn vertex_array_vertex_attrib_format_ext(
        &self,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    );
    fn vertex_array_vertex_attrib_binding_ext(
        &self,
        vaobj: GLuint,
        attrib_index: GLuint,
        binding_index: GLuint,
    );
}

/// Consult the driver's error flag after `call`.
///
/// Every driver call made by the cache and the DSA layer is followed by
/// this check. The result is not atomic with respect to other threads
/// touching the same context, which is why contexts are `!Send`.
pub fn check_error(gl: &dyn GlDriver, call: &'static str) -> Result<()> {
    match gl.get_error() {
        gl::NO_ERROR => Ok(()),
        code => {
            error!(call, code, "GL call failed");
            Err(GlError::Driver { call, code })
        }
    }
}
