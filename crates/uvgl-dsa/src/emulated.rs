//! Named-object access on drivers without any DSA extension.
//!
//! Each operation binds the object to its target and issues the legacy
//! call. Bindings are not restored.

use std::ffi::c_void;

use gl::types::*;
use tracing::trace;
use uvgl_core::{Capabilities, DsaStrategy, GlDriver, GlError, PixelDirection, Result};

use crate::{check_buffer_data, check_pixels, checked, has_images, level_extent, DirectStateAccess};

/// Bind-then-call emulation. Leaves every object it touched bound.
#[derive(Debug, Clone, Copy)]
pub struct BindEmulatedDsa {
    invalidate: bool,
    /// GLES 2.0 has no row-length or skip pixel-store parameters.
    pixel_rows: bool,
}

impl BindEmulatedDsa {
    pub fn new(caps: &Capabilities) -> Self {
        Self {
            invalidate: caps.supports_invalidate_framebuffer,
            pixel_rows: caps.supports_pixel_store_rows,
        }
    }
}

fn bind_buffer(gl: &dyn GlDriver, target: GLenum, buffer: GLuint) -> Result<()> {
    trace!(bind_target = target, buffer, "binding buffer for emulated access");
    checked(gl, "glBindBuffer", |gl| gl.bind_buffer(target, buffer))
}

fn bind_framebuffer(gl: &dyn GlDriver, target: GLenum, framebuffer: GLuint) -> Result<()> {
    trace!(bind_target = target, framebuffer, "binding framebuffer for emulated access");
    checked(gl, "glBindFramebuffer", |gl| gl.bind_framebuffer(target, framebuffer))
}

fn bind_renderbuffer(gl: &dyn GlDriver, renderbuffer: GLuint) -> Result<()> {
    trace!(renderbuffer, "binding renderbuffer for emulated access");
    checked(gl, "glBindRenderbuffer", |gl| {
        gl.bind_renderbuffer(gl::RENDERBUFFER, renderbuffer)
    })
}

fn bind_texture(gl: &dyn GlDriver, target: GLenum, texture: GLuint) -> Result<()> {
    trace!(bind_target = target, texture, "binding texture for emulated access");
    checked(gl, "glBindTexture", |gl| gl.bind_texture(target, texture))
}

fn bind_vertex_array(gl: &dyn GlDriver, vaobj: GLuint) -> Result<()> {
    trace!(vaobj, "binding vertex array for emulated access");
    checked(gl, "glBindVertexArray", |gl| gl.bind_vertex_array(vaobj))
}

impl DirectStateAccess for BindEmulatedDsa {
    fn strategy(&self) -> DsaStrategy {
        DsaStrategy::BindEmulated
    }

    fn named_buffer_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        size: GLsizeiptr,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> Result<()> {
        check_buffer_data(size, data)?;
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glBufferData", |gl| gl.buffer_data(target, size, data, usage))
    }

    fn named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        data: &[u8],
    ) -> Result<()> {
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glBufferSubData", |gl| gl.buffer_sub_data(target, offset, data))
    }

    fn get_named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        out: &mut [u8],
    ) -> Result<()> {
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glGetBufferSubData", |gl| gl.get_buffer_sub_data(target, offset, out))
    }

    fn map_named_buffer(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        access: GLenum,
    ) -> Result<*mut c_void> {
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glMapBuffer", |gl| gl.map_buffer(target, access))
    }

    fn map_named_buffer_range(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> Result<*mut c_void> {
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glMapBufferRange", |gl| {
            gl.map_buffer_range(target, offset, length, access)
        })
    }

    fn unmap_named_buffer(&self, gl: &dyn GlDriver, buffer: GLuint, target: GLenum) -> Result<bool> {
        bind_buffer(gl, target, buffer)?;
        checked(gl, "glUnmapBuffer", |gl| gl.unmap_buffer(target))
    }

    fn named_framebuffer_texture(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
    ) -> Result<()> {
        bind_framebuffer(gl, target, framebuffer)?;
        checked(gl, "glFramebufferTexture", |gl| {
            gl.framebuffer_texture(target, attachment, texture, level)
        })
    }

    fn named_framebuffer_renderbuffer(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) -> Result<()> {
        bind_framebuffer(gl, target, framebuffer)?;
        checked(gl, "glFramebufferRenderbuffer", |gl| {
            gl.framebuffer_renderbuffer(target, attachment, renderbuffer_target, renderbuffer)
        })
    }

    fn named_framebuffer_draw_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, buf: GLenum) -> Result<()> {
        bind_framebuffer(gl, gl::DRAW_FRAMEBUFFER, framebuffer)?;
        checked(gl, "glDrawBuffer", |gl| gl.draw_buffer(buf))
    }

    fn named_framebuffer_draw_buffers(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        bufs: &[GLenum],
    ) -> Result<()> {
        bind_framebuffer(gl, gl::DRAW_FRAMEBUFFER, framebuffer)?;
        checked(gl, "glDrawBuffers", |gl| gl.draw_buffers(bufs))
    }

    fn named_framebuffer_read_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, src: GLenum) -> Result<()> {
        bind_framebuffer(gl, gl::READ_FRAMEBUFFER, framebuffer)?;
        checked(gl, "glReadBuffer", |gl| gl.read_buffer(src))
    }

    fn check_named_framebuffer_status(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
    ) -> Result<GLenum> {
        bind_framebuffer(gl, target, framebuffer)?;
        checked(gl, "glCheckFramebufferStatus", |gl| gl.check_framebuffer_status(target))
    }

    fn invalidate_named_framebuffer_data(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
        attachments: &[GLenum],
    ) -> Result<()> {
        if !self.invalidate {
            return Err(GlError::Unsupported {
                op: "InvalidateNamedFramebufferData",
                strategy: DsaStrategy::BindEmulated,
            });
        }
        bind_framebuffer(gl, target, framebuffer)?;
        checked(gl, "glInvalidateFramebuffer", |gl| {
            gl.invalidate_framebuffer(target, attachments)
        })
    }

    fn named_renderbuffer_storage(
        &self,
        gl: &dyn GlDriver,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()> {
        bind_renderbuffer(gl, renderbuffer)?;
        checked(gl, "glRenderbufferStorage", |gl| {
            gl.renderbuffer_storage(gl::RENDERBUFFER, internal_format, width, height)
        })
    }

    fn named_renderbuffer_storage_multisample(
        &self,
        gl: &dyn GlDriver,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()> {
        bind_renderbuffer(gl, renderbuffer)?;
        checked(gl, "glRenderbufferStorageMultisample", |gl| {
            gl.renderbuffer_storage_multisample(gl::RENDERBUFFER, samples, internal_format, width, height)
        })
    }

    fn texture_parameter_i(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        pname: GLenum,
        param: GLint,
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glTexParameteri", |gl| gl.tex_parameter_i(target, pname, param))
    }

    fn texture_parameter_f(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        pname: GLenum,
        param: GLfloat,
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glTexParameterf", |gl| gl.tex_parameter_f(target, pname, param))
    }

    fn texture_storage_1d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glTexStorage1D", |gl| {
            gl.tex_storage_1d(target, levels, internal_format, width)
        })
    }

    fn texture_storage_2d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glTexStorage2D", |gl| {
            gl.tex_storage_2d(target, levels, internal_format, width, height)
        })
    }

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
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glTexStorage3D", |gl| {
            gl.tex_storage_3d(target, levels, internal_format, width, height, depth)
        })
    }

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
    ) -> Result<()> {
        let rows = (self.pixel_rows, false);
        check_pixels(
            gl,
            PixelDirection::Unpack,
            rows,
            format,
            ty,
            [width, height, 1],
            pixels.len(),
        )?;
        bind_texture(gl, target, texture)?;
        // SAFETY: `pixels` covers the transfer under the current unpack state.
        checked(gl, "glTexSubImage2D", |gl| unsafe {
            gl.tex_sub_image_2d(target, level, xoffset, yoffset, width, height, format, ty, pixels)
        })
    }

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
    ) -> Result<()> {
        let rows = (self.pixel_rows, self.pixel_rows);
        check_pixels(
            gl,
            PixelDirection::Unpack,
            rows,
            format,
            ty,
            [width, height, depth],
            pixels.len(),
        )?;
        bind_texture(gl, target, texture)?;
        // SAFETY: as above.
        checked(gl, "glTexSubImage3D", |gl| unsafe {
            gl.tex_sub_image_3d(
                target, level, xoffset, yoffset, zoffset, width, height, depth, format, ty, pixels,
            )
        })
    }

    fn generate_texture_mipmap(&self, gl: &dyn GlDriver, texture: GLuint, target: GLenum) -> Result<()> {
        bind_texture(gl, target, texture)?;
        checked(gl, "glGenerateMipmap", |gl| gl.generate_mipmap(target))
    }

    fn get_texture_image(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
    ) -> Result<()> {
        bind_texture(gl, target, texture)?;
        let extent = level_extent(gl, "glGetTexLevelParameteriv", |gl, pname, value| {
            gl.get_tex_level_parameter_iv(target, level, pname, value)
        })?;
        let rows = (self.pixel_rows, self.pixel_rows && has_images(target));
        check_pixels(gl, PixelDirection::Pack, rows, format, ty, extent, out.len())?;
        // SAFETY: `out` covers the whole level under the current pack state.
        checked(gl, "glGetTexImage", |gl| unsafe {
            gl.get_tex_image(target, level, format, ty, out)
        })
    }

    fn vertex_array_vertex_buffer(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) -> Result<()> {
        bind_vertex_array(gl, vaobj)?;
        checked(gl, "glBindVertexBuffer", |gl| {
            gl.bind_vertex_buffer(binding_index, buffer, offset, stride)
        })
    }

    fn enable_vertex_array_attrib(&self, gl: &dyn GlDriver, vaobj: GLuint, index: GLuint) -> Result<()> {
        bind_vertex_array(gl, vaobj)?;
        checked(gl, "glEnableVertexAttribArray", |gl| gl.enable_vertex_attrib_array(index))
    }

    fn vertex_array_attrib_format(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) -> Result<()> {
        bind_vertex_array(gl, vaobj)?;
        checked(gl, "glVertexAttribFormat", |gl| {
            gl.vertex_attrib_format(attrib_index, size, ty, normalized, relative_offset)
        })
    }

    fn vertex_array_attrib_binding(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        binding_index: GLuint,
    ) -> Result<()> {
        bind_vertex_array(gl, vaobj)?;
        checked(gl, "glVertexAttribBinding", |gl| {
            gl.vertex_attrib_binding(attrib_index, binding_index)
        })
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::{FakeGl, Profile};

    use super::*;

    fn emulated(gl: &FakeGl) -> BindEmulatedDsa {
        BindEmulatedDsa::new(&Capabilities::probe(gl).unwrap())
    }

    #[test]
    fn binds_then_calls_and_leaves_the_binding() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = emulated(&gl);
        gl.clear_calls();

        dsa.named_buffer_data(&gl, 7, gl::ARRAY_BUFFER, 3, Some(&[1, 2, 3]), gl::STATIC_DRAW)
            .unwrap();

        assert_eq!(gl.call_names(), vec!["glBindBuffer", "glBufferData"]);
        assert_eq!(gl.error_checks(), 2);
        assert_eq!(gl.bindings().buffers[&gl::ARRAY_BUFFER], 7);
        assert_eq!(gl.objects().buffers[&7].data, vec![1, 2, 3]);
    }

    #[test]
    fn es2_uploads_are_sized_by_alignment_alone() {
        let gl = FakeGl::new(Profile::es(2, 0));
        let dsa = emulated(&gl);
        dsa.texture_storage_2d(&gl, 2, gl::TEXTURE_2D, 1, gl::RGBA8, 2, 2)
            .unwrap();
        gl.clear_calls();

        dsa.texture_sub_image_2d(&gl, 2, gl::TEXTURE_2D, 0, 0, 0, 2, 2, gl::RGBA, gl::UNSIGNED_BYTE, &[9; 16])
            .unwrap();
        assert_eq!(gl.count("glGetIntegerv"), 1);
        assert_eq!(gl.objects().textures[&2].levels[0].data, vec![9; 16]);
    }

    #[test]
    fn element_buffer_data_lands_in_the_bound_vertex_array() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = emulated(&gl);
        dsa.enable_vertex_array_attrib(&gl, 3, 0).unwrap();
        dsa.named_buffer_data(&gl, 8, gl::ELEMENT_ARRAY_BUFFER, 6, None, gl::STATIC_DRAW)
            .unwrap();

        assert_eq!(gl.objects().vertex_arrays[&3].element_buffer, 8);
    }

    #[test]
    fn missing_legacy_entry_point_is_a_driver_error() {
        let gl = FakeGl::new(Profile::desktop(3, 3).without_entry_point("glTexStorage2D"));
        let dsa = emulated(&gl);

        let err = dsa
            .texture_storage_2d(&gl, 1, gl::TEXTURE_2D, 1, gl::RGBA8, 4, 4)
            .unwrap_err();
        assert_eq!(
            err,
            GlError::Driver {
                call: "glTexStorage2D",
                code: gl::INVALID_OPERATION
            }
        );
    }

    #[test]
    fn failed_bind_skips_the_legacy_call() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = emulated(&gl);
        gl.clear_calls();
        gl.fail_next("glBindTexture", gl::INVALID_ENUM);

        let err = dsa
            .texture_storage_2d(&gl, 4, gl::TEXTURE_2D, 1, gl::RGBA8, 4, 4)
            .unwrap_err();

        assert_eq!(
            err,
            GlError::Driver {
                call: "glBindTexture",
                code: gl::INVALID_ENUM
            }
        );
        assert_eq!(gl.call_names(), vec!["glBindTexture"]);
        assert!(gl.objects().textures.is_empty());
    }

    #[test]
    fn draw_and_read_buffers_use_their_own_bind_points() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = emulated(&gl);

        dsa.named_framebuffer_draw_buffers(&gl, 3, &[gl::COLOR_ATTACHMENT0, gl::COLOR_ATTACHMENT1])
            .unwrap();
        dsa.named_framebuffer_read_buffer(&gl, 4, gl::COLOR_ATTACHMENT0)
            .unwrap();

        let bindings = gl.bindings();
        assert_eq!((bindings.draw_framebuffer, bindings.read_framebuffer), (3, 4));
        let objects = gl.objects();
        assert_eq!(
            objects.framebuffers[&3].draw_buffers,
            vec![gl::COLOR_ATTACHMENT0, gl::COLOR_ATTACHMENT1]
        );
        assert_eq!(objects.framebuffers[&4].read_buffer, Some(gl::COLOR_ATTACHMENT0));
    }

    #[test]
    fn invalidate_is_unsupported_on_old_drivers() {
        let gl = FakeGl::new(Profile::es(2, 0));
        let dsa = emulated(&gl);
        let err = dsa
            .invalidate_named_framebuffer_data(&gl, 1, gl::FRAMEBUFFER, &[gl::DEPTH_ATTACHMENT])
            .unwrap_err();
        assert!(matches!(
            err,
            GlError::Unsupported {
                strategy: DsaStrategy::BindEmulated,
                ..
            }
        ));
    }

    #[test]
    fn renderbuffer_storage_binds_the_renderbuffer() {
        let gl = FakeGl::new(Profile::es(3, 2));
        let dsa = emulated(&gl);
        dsa.named_renderbuffer_storage_multisample(&gl, 5, 4, gl::DEPTH24_STENCIL8, 64, 32)
            .unwrap();

        assert_eq!(gl.bindings().renderbuffer, 5);
        let objects = gl.objects();
        let rb = &objects.renderbuffers[&5];
        assert_eq!((rb.samples, rb.width, rb.height), (4, 64, 32));
    }
}
