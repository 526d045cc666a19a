//! `EXT_direct_state_access`, for drivers that predate GL 4.5.

use std::ffi::c_void;

use gl::types::*;
use uvgl_core::{DsaStrategy, GlDriver, GlError, PixelDirection, Result};

use crate::{check_buffer_data, check_pixels, checked, has_images, level_extent, DirectStateAccess};

/// Calls the EXT named entry points. Only texture calls use the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtDsa;

impl DirectStateAccess for ExtDsa {
    fn strategy(&self) -> DsaStrategy {
        DsaStrategy::Ext
    }

    fn named_buffer_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        size: GLsizeiptr,
        data: Option<&[u8]>,
        usage: GLenum,
    ) -> Result<()> {
        check_buffer_data(size, data)?;
        checked(gl, "glNamedBufferDataEXT", |gl| {
            gl.named_buffer_data_ext(buffer, size, data, usage)
        })
    }

    fn named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        offset: GLintptr,
        data: &[u8],
    ) -> Result<()> {
        checked(gl, "glNamedBufferSubDataEXT", |gl| {
            gl.named_buffer_sub_data_ext(buffer, offset, data)
        })
    }

    fn get_named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        offset: GLintptr,
        out: &mut [u8],
    ) -> Result<()> {
        checked(gl, "glGetNamedBufferSubDataEXT", |gl| {
            gl.get_named_buffer_sub_data_ext(buffer, offset, out)
        })
    }

    fn map_named_buffer(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        access: GLenum,
    ) -> Result<*mut c_void> {
        checked(gl, "glMapNamedBufferEXT", |gl| gl.map_named_buffer_ext(buffer, access))
    }

    fn map_named_buffer_range(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> Result<*mut c_void> {
        checked(gl, "glMapNamedBufferRangeEXT", |gl| {
            gl.map_named_buffer_range_ext(buffer, offset, length, access)
        })
    }

    fn unmap_named_buffer(&self, gl: &dyn GlDriver, buffer: GLuint, _target: GLenum) -> Result<bool> {
        checked(gl, "glUnmapNamedBufferEXT", |gl| gl.unmap_named_buffer_ext(buffer))
    }

    fn named_framebuffer_texture(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        _target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: GLint,
    ) -> Result<()> {
        checked(gl, "glNamedFramebufferTextureEXT", |gl| {
            gl.named_framebuffer_texture_ext(framebuffer, attachment, texture, level)
        })
    }

    fn named_framebuffer_renderbuffer(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        _target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) -> Result<()> {
        checked(gl, "glNamedFramebufferRenderbufferEXT", |gl| {
            gl.named_framebuffer_renderbuffer_ext(framebuffer, attachment, renderbuffer_target, renderbuffer)
        })
    }

    fn named_framebuffer_draw_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, buf: GLenum) -> Result<()> {
        checked(gl, "glFramebufferDrawBufferEXT", |gl| {
            gl.framebuffer_draw_buffer_ext(framebuffer, buf)
        })
    }

    fn named_framebuffer_draw_buffers(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        bufs: &[GLenum],
    ) -> Result<()> {
        checked(gl, "glFramebufferDrawBuffersEXT", |gl| {
            gl.framebuffer_draw_buffers_ext(framebuffer, bufs)
        })
    }

    fn named_framebuffer_read_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, src: GLenum) -> Result<()> {
        checked(gl, "glFramebufferReadBufferEXT", |gl| {
            gl.framebuffer_read_buffer_ext(framebuffer, src)
        })
    }

    fn check_named_framebuffer_status(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
    ) -> Result<GLenum> {
        checked(gl, "glCheckNamedFramebufferStatusEXT", |gl| {
            gl.check_named_framebuffer_status_ext(framebuffer, target)
        })
    }

    /// The EXT family has no invalidation entry point.
    fn invalidate_named_framebuffer_data(
        &self,
        _gl: &dyn GlDriver,
        _framebuffer: GLuint,
        _target: GLenum,
        _attachments: &[GLenum],
    ) -> Result<()> {
        Err(GlError::Unsupported {
            op: "InvalidateNamedFramebufferData",
            strategy: DsaStrategy::Ext,
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
        checked(gl, "glNamedRenderbufferStorageEXT", |gl| {
            gl.named_renderbuffer_storage_ext(renderbuffer, internal_format, width, height)
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
        checked(gl, "glNamedRenderbufferStorageMultisampleEXT", |gl| {
            gl.named_renderbuffer_storage_multisample_ext(renderbuffer, samples, internal_format, width, height)
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
        checked(gl, "glTextureParameteriEXT", |gl| {
            gl.texture_parameter_i_ext(texture, target, pname, param)
        })
    }

    fn texture_parameter_f(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        target: GLenum,
        pname: GLenum,
        param: GLfloat,
    ) -> Result<()> {
        checked(gl, "glTextureParameterfEXT", |gl| {
            gl.texture_parameter_f_ext(texture, target, pname, param)
        })
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
        checked(gl, "glTextureStorage1DEXT", |gl| {
            gl.texture_storage_1d_ext(texture, target, levels, internal_format, width)
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
        checked(gl, "glTextureStorage2DEXT", |gl| {
            gl.texture_storage_2d_ext(texture, target, levels, internal_format, width, height)
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
        checked(gl, "glTextureStorage3DEXT", |gl| {
            gl.texture_storage_3d_ext(texture, target, levels, internal_format, width, height, depth)
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
        check_pixels(
            gl,
            PixelDirection::Unpack,
            (true, false),
            format,
            ty,
            [width, height, 1],
            pixels.len(),
        )?;
        // SAFETY: `pixels` covers the transfer under the current unpack state.
        checked(gl, "glTextureSubImage2DEXT", |gl| unsafe {
            gl.texture_sub_image_2d_ext(
                texture, target, level, xoffset, yoffset, width, height, format, ty, pixels,
            )
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
        check_pixels(
            gl,
            PixelDirection::Unpack,
            (true, true),
            format,
            ty,
            [width, height, depth],
            pixels.len(),
        )?;
        // SAFETY: as above.
        checked(gl, "glTextureSubImage3DEXT", |gl| unsafe {
            gl.texture_sub_image_3d_ext(
                texture, target, level, xoffset, yoffset, zoffset, width, height, depth, format, ty, pixels,
            )
        })
    }

    fn generate_texture_mipmap(&self, gl: &dyn GlDriver, texture: GLuint, target: GLenum) -> Result<()> {
        checked(gl, "glGenerateTextureMipmapEXT", |gl| {
            gl.generate_texture_mipmap_ext(texture, target)
        })
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
        let extent = level_extent(gl, "glGetTextureLevelParameterivEXT", |gl, pname, value| {
            gl.get_texture_level_parameter_iv_ext(texture, target, level, pname, value)
        })?;
        check_pixels(
            gl,
            PixelDirection::Pack,
            (true,
            has_images(target)),
            format,
            ty,
            extent,
            out.len(),
        )?;
        // SAFETY: `out` covers the whole level under the current pack state.
        checked(gl, "glGetTextureImageEXT", |gl| unsafe {
            gl.get_texture_image_ext(texture, target, level, format, ty, out)
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
        checked(gl, "glVertexArrayBindVertexBufferEXT", |gl| {
            gl.vertex_array_bind_vertex_buffer_ext(vaobj, binding_index, buffer, offset, stride)
        })
    }

    fn enable_vertex_array_attrib(&self, gl: &dyn GlDriver, vaobj: GLuint, index: GLuint) -> Result<()> {
        checked(gl, "glEnableVertexArrayAttribEXT", |gl| {
            gl.enable_vertex_array_attrib_ext(vaobj, index)
        })
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
        checked(gl, "glVertexArrayVertexAttribFormatEXT", |gl| {
            gl.vertex_array_vertex_attrib_format_ext(vaobj, attrib_index, size, ty, normalized, relative_offset)
        })
    }

    fn vertex_array_attrib_binding(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        binding_index: GLuint,
    ) -> Result<()> {
        checked(gl, "glVertexArrayVertexAttribBindingEXT", |gl| {
            gl.vertex_array_vertex_attrib_binding_ext(vaobj, attrib_index, binding_index)
        })
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::FakeGl;

    use super::*;

    #[test]
    fn invalidate_is_unsupported_and_issues_nothing() {
        let gl = FakeGl::desktop();
        let err = ExtDsa
            .invalidate_named_framebuffer_data(&gl, 3, gl::FRAMEBUFFER, &[gl::COLOR_ATTACHMENT0])
            .unwrap_err();
        assert_eq!(
            err,
            GlError::Unsupported {
                op: "InvalidateNamedFramebufferData",
                strategy: DsaStrategy::Ext,
            }
        );
        assert!(gl.calls().is_empty());
        assert_eq!(gl.error_checks(), 0);
    }

    #[test]
    fn texture_calls_forward_the_target() {
        let gl = FakeGl::desktop();
        ExtDsa
            .texture_parameter_i(&gl, 6, gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint)
            .unwrap();
        ExtDsa.generate_texture_mipmap(&gl, 6, gl::TEXTURE_2D).unwrap();

        let calls = gl.calls();
        assert_eq!(calls[0].name, "glTextureParameteriEXT");
        assert!(calls[0].args.starts_with(&format!("6, {}", gl::TEXTURE_2D)));
        assert_eq!(calls[1].name, "glGenerateTextureMipmapEXT");
        let objects = gl.objects();
        let texture = &objects.textures[&6];
        assert_eq!(texture.params_i[&gl::TEXTURE_MIN_FILTER], gl::LINEAR as GLint);
        assert!(texture.mipmaps_generated);
        assert!(gl.bindings().is_default());
    }

    #[test]
    fn vertex_array_setup_matches_attribute_state() {
        let gl = FakeGl::desktop();
        ExtDsa.vertex_array_vertex_buffer(&gl, 1, 0, 9, 0, 16).unwrap();
        ExtDsa.enable_vertex_array_attrib(&gl, 1, 2).unwrap();
        ExtDsa
            .vertex_array_attrib_format(&gl, 1, 2, 3, gl::FLOAT, false, 4)
            .unwrap();
        ExtDsa.vertex_array_attrib_binding(&gl, 1, 2, 0).unwrap();

        let objects = gl.objects();
        let vao = &objects.vertex_arrays[&1];
        assert_eq!(vao.buffers[&0], (9, 0, 16));
        let attrib = &vao.attribs[&2];
        assert!(attrib.enabled);
        assert_eq!((attrib.size, attrib.ty, attrib.relative_offset), (3, gl::FLOAT, 4));
    }
}
