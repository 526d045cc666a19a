//! `ARB_direct_state_access`, core since GL 4.5.

use std::ffi::c_void;

use gl::types::*;
use uvgl_core::{Capabilities, DsaStrategy, GlDriver, GlError, PixelDirection, Result};

use crate::{check_buffer_data, check_pixels, checked, DirectStateAccess};

/// Calls the GL 4.5 named entry points. Targets are ignored.
#[derive(Debug, Clone, Copy)]
pub struct ArbDsa {
    invalidate: bool,
}

impl ArbDsa {
    pub fn new(caps: &Capabilities) -> Self {
        Self {
            invalidate: caps.supports_invalidate_framebuffer,
        }
    }
}

impl DirectStateAccess for ArbDsa {
    fn strategy(&self) -> DsaStrategy {
        DsaStrategy::Arb
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
        checked(gl, "glNamedBufferData", |gl| gl.named_buffer_data(buffer, size, data, usage))
    }

    fn named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        offset: GLintptr,
        data: &[u8],
    ) -> Result<()> {
        checked(gl, "glNamedBufferSubData", |gl| gl.named_buffer_sub_data(buffer, offset, data))
    }

    fn get_named_buffer_sub_data(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        offset: GLintptr,
        out: &mut [u8],
    ) -> Result<()> {
        checked(gl, "glGetNamedBufferSubData", |gl| {
            gl.get_named_buffer_sub_data(buffer, offset, out)
        })
    }

    fn map_named_buffer(
        &self,
        gl: &dyn GlDriver,
        buffer: GLuint,
        _target: GLenum,
        access: GLenum,
    ) -> Result<*mut c_void> {
        checked(gl, "glMapNamedBuffer", |gl| gl.map_named_buffer(buffer, access))
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
        checked(gl, "glMapNamedBufferRange", |gl| {
            gl.map_named_buffer_range(buffer, offset, length, access)
        })
    }

    fn unmap_named_buffer(&self, gl: &dyn GlDriver, buffer: GLuint, _target: GLenum) -> Result<bool> {
        checked(gl, "glUnmapNamedBuffer", |gl| gl.unmap_named_buffer(buffer))
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
        checked(gl, "glNamedFramebufferTexture", |gl| {
            gl.named_framebuffer_texture(framebuffer, attachment, texture, level)
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
        checked(gl, "glNamedFramebufferRenderbuffer", |gl| {
            gl.named_framebuffer_renderbuffer(framebuffer, attachment, renderbuffer_target, renderbuffer)
        })
    }

    fn named_framebuffer_draw_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, buf: GLenum) -> Result<()> {
        checked(gl, "glNamedFramebufferDrawBuffer", |gl| {
            gl.named_framebuffer_draw_buffer(framebuffer, buf)
        })
    }

    fn named_framebuffer_draw_buffers(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        bufs: &[GLenum],
    ) -> Result<()> {
        checked(gl, "glNamedFramebufferDrawBuffers", |gl| {
            gl.named_framebuffer_draw_buffers(framebuffer, bufs)
        })
    }

    fn named_framebuffer_read_buffer(&self, gl: &dyn GlDriver, framebuffer: GLuint, src: GLenum) -> Result<()> {
        checked(gl, "glNamedFramebufferReadBuffer", |gl| {
            gl.named_framebuffer_read_buffer(framebuffer, src)
        })
    }

    fn check_named_framebuffer_status(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        target: GLenum,
    ) -> Result<GLenum> {
        checked(gl, "glCheckNamedFramebufferStatus", |gl| {
            gl.check_named_framebuffer_status(framebuffer, target)
        })
    }

    fn invalidate_named_framebuffer_data(
        &self,
        gl: &dyn GlDriver,
        framebuffer: GLuint,
        _target: GLenum,
        attachments: &[GLenum],
    ) -> Result<()> {
        if !self.invalidate {
            return Err(GlError::Unsupported {
                op: "InvalidateNamedFramebufferData",
                strategy: DsaStrategy::Arb,
            });
        }
        checked(gl, "glInvalidateNamedFramebufferData", |gl| {
            gl.invalidate_named_framebuffer_data(framebuffer, attachments)
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
        checked(gl, "glNamedRenderbufferStorage", |gl| {
            gl.named_renderbuffer_storage(renderbuffer, internal_format, width, height)
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
        checked(gl, "glNamedRenderbufferStorageMultisample", |gl| {
            gl.named_renderbuffer_storage_multisample(renderbuffer, samples, internal_format, width, height)
        })
    }

    fn texture_parameter_i(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        pname: GLenum,
        param: GLint,
    ) -> Result<()> {
        checked(gl, "glTextureParameteri", |gl| gl.texture_parameter_i(texture, pname, param))
    }

    fn texture_parameter_f(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        pname: GLenum,
        param: GLfloat,
    ) -> Result<()> {
        checked(gl, "glTextureParameterf", |gl| gl.texture_parameter_f(texture, pname, param))
    }

    fn texture_storage_1d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    ) -> Result<()> {
        checked(gl, "glTextureStorage1D", |gl| {
            gl.texture_storage_1d(texture, levels, internal_format, width)
        })
    }

    fn texture_storage_2d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<()> {
        checked(gl, "glTextureStorage2D", |gl| {
            gl.texture_storage_2d(texture, levels, internal_format, width, height)
        })
    }

    fn texture_storage_3d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) -> Result<()> {
        checked(gl, "glTextureStorage3D", |gl| {
            gl.texture_storage_3d(texture, levels, internal_format, width, height, depth)
        })
    }

    fn texture_sub_image_2d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
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
        checked(gl, "glTextureSubImage2D", |gl| unsafe {
            gl.texture_sub_image_2d(texture, level, xoffset, yoffset, width, height, format, ty, pixels)
        })
    }

    fn texture_sub_image_3d(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
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
        checked(gl, "glTextureSubImage3D", |gl| unsafe {
            gl.texture_sub_image_3d(
                texture, level, xoffset, yoffset, zoffset, width, height, depth, format, ty, pixels,
            )
        })
    }

    fn generate_texture_mipmap(&self, gl: &dyn GlDriver, texture: GLuint, _target: GLenum) -> Result<()> {
        checked(gl, "glGenerateTextureMipmap", |gl| gl.generate_texture_mipmap(texture))
    }

    fn get_texture_image(
        &self,
        gl: &dyn GlDriver,
        texture: GLuint,
        _target: GLenum,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
    ) -> Result<()> {
        checked(gl, "glGetTextureImage", |gl| {
            gl.get_texture_image(texture, level, format, ty, out)
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
        checked(gl, "glVertexArrayVertexBuffer", |gl| {
            gl.vertex_array_vertex_buffer(vaobj, binding_index, buffer, offset, stride)
        })
    }

    fn enable_vertex_array_attrib(&self, gl: &dyn GlDriver, vaobj: GLuint, index: GLuint) -> Result<()> {
        checked(gl, "glEnableVertexArrayAttrib", |gl| gl.enable_vertex_array_attrib(vaobj, index))
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
        checked(gl, "glVertexArrayAttribFormat", |gl| {
            gl.vertex_array_attrib_format(vaobj, attrib_index, size, ty, normalized, relative_offset)
        })
    }

    fn vertex_array_attrib_binding(
        &self,
        gl: &dyn GlDriver,
        vaobj: GLuint,
        attrib_index: GLuint,
        binding_index: GLuint,
    ) -> Result<()> {
        checked(gl, "glVertexArrayAttribBinding", |gl| {
            gl.vertex_array_attrib_binding(vaobj, attrib_index, binding_index)
        })
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::FakeGl;

    use super::*;

    fn arb(gl: &FakeGl) -> ArbDsa {
        ArbDsa::new(&Capabilities::probe(gl).unwrap())
    }

    #[test]
    fn buffer_upload_uses_named_calls_and_leaves_bindings_alone() {
        let gl = FakeGl::desktop();
        let dsa = arb(&gl);
        gl.clear_calls();

        dsa.named_buffer_data(&gl, 4, gl::ARRAY_BUFFER, 8, None, gl::STATIC_DRAW)
            .unwrap();
        dsa.named_buffer_sub_data(&gl, 4, gl::ARRAY_BUFFER, 2, &[7, 8])
            .unwrap();

        assert_eq!(gl.call_names(), vec!["glNamedBufferData", "glNamedBufferSubData"]);
        assert_eq!(gl.error_checks(), 2);
        assert_eq!(gl.objects().buffers[&4].data, vec![0, 0, 7, 8, 0, 0, 0, 0]);
        assert!(gl.bindings().is_default());
    }

    #[test]
    fn map_and_unmap_round_trip() {
        let gl = FakeGl::desktop();
        let dsa = arb(&gl);
        dsa.named_buffer_data(&gl, 1, gl::ARRAY_BUFFER, 4, Some(&[1, 2, 3, 4]), gl::DYNAMIC_DRAW)
            .unwrap();

        let ptr = dsa
            .map_named_buffer_range(&gl, 1, gl::ARRAY_BUFFER, 1, 2, gl::MAP_READ_BIT)
            .unwrap();
        assert!(!ptr.is_null());
        assert!(gl.objects().buffers[&1].mapped);
        assert!(dsa.unmap_named_buffer(&gl, 1, gl::ARRAY_BUFFER).unwrap());
        assert!(!gl.objects().buffers[&1].mapped);
    }

    #[test]
    fn second_map_is_a_driver_error() {
        let gl = FakeGl::desktop();
        let dsa = arb(&gl);
        dsa.named_buffer_data(&gl, 1, gl::ARRAY_BUFFER, 4, None, gl::DYNAMIC_DRAW)
            .unwrap();
        dsa.map_named_buffer(&gl, 1, gl::ARRAY_BUFFER, gl::READ_WRITE)
            .unwrap();

        let err = dsa
            .map_named_buffer(&gl, 1, gl::ARRAY_BUFFER, gl::READ_WRITE)
            .unwrap_err();
        assert_eq!(
            err,
            GlError::Driver {
                call: "glMapNamedBuffer",
                code: gl::INVALID_OPERATION
            }
        );
    }

    #[test]
    fn framebuffer_status_follows_attachments() {
        let gl = FakeGl::desktop();
        let dsa = arb(&gl);
        assert_eq!(
            dsa.check_named_framebuffer_status(&gl, 2, gl::FRAMEBUFFER).unwrap(),
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
        );

        dsa.named_framebuffer_texture(&gl, 2, gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, 5, 0)
            .unwrap();
        assert_eq!(
            dsa.check_named_framebuffer_status(&gl, 2, gl::FRAMEBUFFER).unwrap(),
            gl::FRAMEBUFFER_COMPLETE
        );
    }

    #[test]
    fn invalidate_needs_driver_support() {
        let gl = FakeGl::desktop();
        let mut caps = Capabilities::probe(&gl).unwrap();
        caps.supports_invalidate_framebuffer = false;
        let dsa = ArbDsa::new(&caps);
        gl.clear_calls();

        let err = dsa
            .invalidate_named_framebuffer_data(&gl, 2, gl::FRAMEBUFFER, &[gl::COLOR_ATTACHMENT0])
            .unwrap_err();
        assert!(matches!(err, GlError::Unsupported { strategy: DsaStrategy::Arb, .. }));
        assert!(gl.calls().is_empty());
    }
}
