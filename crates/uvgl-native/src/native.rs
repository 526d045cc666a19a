//! [`GlDriver`] over the real driver.

use std::cell::Cell;
use std::ffi::{c_void, CStr};
use std::ptr;

use gl::types::*;
use tracing::{debug, error};
use uvgl_core::{DsaFamily, GlDriver};

use crate::ext::ExtDsaFns;
use crate::loader;

/// Calls straight into the driver loaded for the current context.
///
/// Core entry points go through the `gl` crate's global function table;
/// `EXT_direct_state_access` entry points go through a table owned by this
/// value.
pub struct NativeGl {
    ext: ExtDsaFns,
    /// Raised on this side of the driver, for a call to an entry point that
    /// never resolved or for buffer data shorter than its size. Reported by
    /// the next `get_error`.
    pending_error: Cell<Option<GLenum>>,
}

impl std::fmt::Debug for NativeGl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeGl")
            .field("arb_dsa", &self.has_entry_points(DsaFamily::Arb))
            .field("ext_dsa", &self.ext.all_loaded())
            .finish()
    }
}

impl NativeGl {
    /// Load every entry point through `gl_loader`.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and stay current
    /// for as long as the returned driver is used.
    pub unsafe fn load() -> anyhow::Result<Self> {
        let native = unsafe { Self::load_with(loader::system_proc_address) };
        if !gl::GetString::is_loaded() || !gl::GetError::is_loaded() {
            anyhow::bail!("no OpenGL library could be resolved for the current context");
        }
        Ok(native)
    }

    /// Load every entry point through a windowing library's resolver.
    ///
    /// # Safety
    ///
    /// Same as [`NativeGl::load`]. `loadfn` must return addresses valid for
    /// the current context.
    pub unsafe fn load_with(mut loadfn: impl FnMut(&str) -> *const c_void) -> Self {
        gl::load_with(|symbol| loadfn(symbol));
        let ext = ExtDsaFns::load(&mut loadfn);
        if !ext.all_loaded() {
            debug!(missing = ?ext.missing(), "EXT_direct_state_access is incomplete");
        }
        Self {
            ext,
            pending_error: Cell::new(None),
        }
    }

    fn raise(&self, code: GLenum) {
        if self.pending_error.get().is_none() {
            self.pending_error.set(Some(code));
        }
    }

    fn unloaded(&self, name: &'static str) {
        error!(entry_point = name, "called an entry point that is not loaded");
        self.raise(gl::INVALID_OPERATION);
    }

    /// Whether `data` holds the `size` bytes the driver would read. Raises
    /// `GL_INVALID_VALUE` when it does not.
    fn covers(&self, call: &'static str, size: GLsizeiptr, data: Option<&[u8]>) -> bool {
        match data {
            Some(data) if size > 0 && (data.len() as u64) < size as u64 => {
                error!(call, size, len = data.len(), "buffer data is shorter than its size");
                self.raise(gl::INVALID_VALUE);
                false
            }
            _ => true,
        }
    }
}

macro_rules! core_call {
    ($self:ident, $func:ident($($arg:expr),* $(,)?)) => {
        core_call!($self, $func($($arg),*), ())
    };
    ($self:ident, $func:ident($($arg:expr),* $(,)?), $default:expr) => {
        if gl::$func::is_loaded() {
            unsafe { gl::$func($($arg),*) }
        } else {
            $self.unloaded(concat!("gl", stringify!($func)));
            $default
        }
    };
}

macro_rules! ext_call {
    ($self:ident, $field:ident, $name:literal, |$f:ident| $call:expr) => {
        ext_call!($self, $field, $name, |$f| $call, ())
    };
    ($self:ident, $field:ident, $name:literal, |$f:ident| $call:expr, $default:expr) => {
        match $self.ext.$field {
            Some($f) => unsafe { $call },
            None => {
                $self.unloaded($name);
                $default
            }
        }
    };
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    data.map_or(ptr::null(), |d| d.as_ptr().cast())
}

fn gl_bool(value: bool) -> GLboolean {
    if value {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

unsafe fn owned_string(raw: *const GLubyte) -> Option<String> {
    if raw.is_null() {
        None
    } else {
        Some(
            unsafe { CStr::from_ptr(raw.cast()) }
                .to_string_lossy()
                .into_owned(),
        )
    }
}

// SAFETY (all methods): `NativeGl` is only constructed through the unsafe
// loaders above, whose contract guarantees a current context. Safe methods
// pass the driver the length of every slice, or check it against `size`
// first. Pixel transfers take no length, so those methods are `unsafe` and
// the caller sizes the slice.
impl GlDriver for NativeGl {
    fn has_entry_points(&self, family: DsaFamily) -> bool {
        match family {
            DsaFamily::Arb => {
                gl::NamedBufferData::is_loaded()
                    && gl::MapNamedBufferRange::is_loaded()
                    && gl::NamedFramebufferTexture::is_loaded()
                    && gl::CheckNamedFramebufferStatus::is_loaded()
                    && gl::NamedRenderbufferStorage::is_loaded()
                    && gl::TextureStorage2D::is_loaded()
                    && gl::TextureSubImage2D::is_loaded()
                    && gl::GetTextureImage::is_loaded()
                    && gl::VertexArrayVertexBuffer::is_loaded()
                    && gl::VertexArrayAttribFormat::is_loaded()
            }
            DsaFamily::Ext => self.ext.all_loaded(),
        }
    }

    fn get_error(&self) -> GLenum {
        match self.pending_error.take() {
            Some(code) => code,
            None if gl::GetError::is_loaded() => unsafe { gl::GetError() },
            None => gl::NO_ERROR,
        }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        unsafe { owned_string(core_call!(self, GetString(name), ptr::null())) }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        unsafe { owned_string(core_call!(self, GetStringi(name, index), ptr::null())) }
    }

    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]) {
        core_call!(self, GetIntegerv(pname, out.as_mut_ptr()))
    }

    fn get_float_v(&self, pname: GLenum, out: &mut [GLfloat]) {
        core_call!(self, GetFloatv(pname, out.as_mut_ptr()))
    }

    fn get_double_v(&self, pname: GLenum, out: &mut [GLdouble]) {
        core_call!(self, GetDoublev(pname, out.as_mut_ptr()))
    }

    fn get_boolean_v(&self, pname: GLenum, out: &mut [GLboolean]) {
        core_call!(self, GetBooleanv(pname, out.as_mut_ptr()))
    }

    fn is_enabled(&self, cap: GLenum) -> bool {
        core_call!(self, IsEnabled(cap), gl::FALSE) == gl::TRUE
    }

    fn enable(&self, cap: GLenum) {
        core_call!(self, Enable(cap))
    }

    fn disable(&self, cap: GLenum) {
        core_call!(self, Disable(cap))
    }

    fn blend_color(&self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) {
        core_call!(self, BlendColor(red, green, blue, alpha))
    }

    fn blend_equation(&self, mode: GLenum) {
        core_call!(self, BlendEquation(mode))
    }

    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum) {
        core_call!(self, BlendEquationSeparate(mode_rgb, mode_alpha))
    }

    fn blend_func_separate(&self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        core_call!(self, BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha))
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        core_call!(self, ColorMask(gl_bool(red), gl_bool(green), gl_bool(blue), gl_bool(alpha)))
    }

    fn depth_func(&self, func: GLenum) {
        core_call!(self, DepthFunc(func))
    }

    fn depth_mask(&self, flag: bool) {
        core_call!(self, DepthMask(gl_bool(flag)))
    }

    fn clear_depth(&self, depth: GLdouble) {
        core_call!(self, ClearDepth(depth))
    }

    fn clear_depth_f(&self, depth: GLfloat) {
        core_call!(self, ClearDepthf(depth))
    }

    fn clear_stencil(&self, s: GLint) {
        core_call!(self, ClearStencil(s))
    }

    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint) {
        core_call!(self, StencilFunc(func, reference, mask))
    }

    fn stencil_func_separate(&self, face: GLenum, func: GLenum, reference: GLint, mask: GLuint) {
        core_call!(self, StencilFuncSeparate(face, func, reference, mask))
    }

    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        core_call!(self, StencilOp(sfail, dpfail, dppass))
    }

    fn stencil_op_separate(&self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        core_call!(self, StencilOpSeparate(face, sfail, dpfail, dppass))
    }

    fn cull_face(&self, mode: GLenum) {
        core_call!(self, CullFace(mode))
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        core_call!(self, PolygonMode(face, mode))
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        core_call!(self, BindBuffer(target, buffer))
    }

    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if !self.covers("glBufferData", size, data) {
            return;
        }
        core_call!(self, BufferData(target, size, data_ptr(data), usage))
    }

    fn buffer_sub_data(&self, target: GLenum, offset: GLintptr, data: &[u8]) {
        core_call!(
            self,
            BufferSubData(target, offset, data.len() as GLsizeiptr, data.as_ptr().cast())
        )
    }

    fn get_buffer_sub_data(&self, target: GLenum, offset: GLintptr, out: &mut [u8]) {
        core_call!(
            self,
            GetBufferSubData(target, offset, out.len() as GLsizeiptr, out.as_mut_ptr().cast())
        )
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        core_call!(self, MapBuffer(target, access), ptr::null_mut())
    }

    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        core_call!(self, MapBufferRange(target, offset, length, access), ptr::null_mut())
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        core_call!(self, UnmapBuffer(target), gl::FALSE) == gl::TRUE
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        core_call!(self, BindFramebuffer(target, framebuffer))
    }

    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint) {
        core_call!(self, FramebufferTexture(target, attachment, texture, level))
    }

    fn framebuffer_renderbuffer(
        &self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        core_call!(
            self,
            FramebufferRenderbuffer(target, attachment, renderbuffer_target, renderbuffer)
        )
    }

    fn draw_buffer(&self, buf: GLenum) {
        core_call!(self, DrawBuffer(buf))
    }

    fn draw_buffers(&self, bufs: &[GLenum]) {
        core_call!(self, DrawBuffers(bufs.len() as GLsizei, bufs.as_ptr()))
    }

    fn read_buffer(&self, src: GLenum) {
        core_call!(self, ReadBuffer(src))
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        core_call!(self, CheckFramebufferStatus(target), 0)
    }

    fn invalidate_framebuffer(&self, target: GLenum, attachments: &[GLenum]) {
        core_call!(
            self,
            InvalidateFramebuffer(target, attachments.len() as GLsizei, attachments.as_ptr())
        )
    }

    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint) {
        core_call!(self, BindRenderbuffer(target, renderbuffer))
    }

    fn renderbuffer_storage(&self, target: GLenum, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        core_call!(self, RenderbufferStorage(target, internal_format, width, height))
    }

    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        core_call!(
            self,
            RenderbufferStorageMultisample(target, samples, internal_format, width, height)
        )
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        core_call!(self, BindTexture(target, texture))
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        core_call!(self, TexParameteri(target, pname, param))
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        core_call!(self, TexParameterf(target, pname, param))
    }

    fn tex_storage_1d(&self, target: GLenum, levels: GLsizei, internal_format: GLenum, width: GLsizei) {
        core_call!(self, TexStorage1D(target, levels, internal_format, width))
    }

    fn tex_storage_2d(
        &self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        core_call!(self, TexStorage2D(target, levels, internal_format, width, height))
    }

    fn tex_storage_3d(
        &self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) {
        core_call!(self, TexStorage3D(target, levels, internal_format, width, height, depth))
    }

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
    ) {
        core_call!(
            self,
            TexSubImage2D(
                target,
                level,
                xoffset,
                yoffset,
                width,
                height,
                format,
                ty,
                pixels.as_ptr().cast(),
            )
        )
    }

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
    ) {
        core_call!(
            self,
            TexSubImage3D(
                target,
                level,
                xoffset,
                yoffset,
                zoffset,
                width,
                height,
                depth,
                format,
                ty,
                pixels.as_ptr().cast(),
            )
        )
    }

    fn generate_mipmap(&self, target: GLenum) {
        core_call!(self, GenerateMipmap(target))
    }

    fn get_tex_level_parameter_iv(&self, target: GLenum, level: GLint, pname: GLenum, out: &mut [GLint]) {
        core_call!(self, GetTexLevelParameteriv(target, level, pname, out.as_mut_ptr()))
    }

    unsafe fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        core_call!(self, GetTexImage(target, level, format, ty, out.as_mut_ptr().cast()))
    }

    fn bind_vertex_array(&self, array: GLuint) {
        core_call!(self, BindVertexArray(array))
    }

    fn bind_vertex_buffer(&self, binding_index: GLuint, buffer: GLuint, offset: GLintptr, stride: GLsizei) {
        core_call!(self, BindVertexBuffer(binding_index, buffer, offset, stride))
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        core_call!(self, EnableVertexAttribArray(index))
    }

    fn vertex_attrib_format(
        &self,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) {
        core_call!(
            self,
            VertexAttribFormat(attrib_index, size, ty, gl_bool(normalized), relative_offset)
        )
    }

    fn vertex_attrib_binding(&self, attrib_index: GLuint, binding_index: GLuint) {
        core_call!(self, VertexAttribBinding(attrib_index, binding_index))
    }

    fn named_buffer_data(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if !self.covers("glNamedBufferData", size, data) {
            return;
        }
        core_call!(self, NamedBufferData(buffer, size, data_ptr(data), usage))
    }

    fn named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, data: &[u8]) {
        core_call!(
            self,
            NamedBufferSubData(buffer, offset, data.len() as GLsizeiptr, data.as_ptr().cast())
        )
    }

    fn get_named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]) {
        core_call!(
            self,
            GetNamedBufferSubData(
                buffer,
                offset,
                out.len() as GLsizeiptr,
                out.as_mut_ptr().cast(),
            )
        )
    }

    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        core_call!(self, MapNamedBuffer(buffer, access), ptr::null_mut())
    }

    fn map_named_buffer_range(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        core_call!(self, MapNamedBufferRange(buffer, offset, length, access), ptr::null_mut())
    }

    fn unmap_named_buffer(&self, buffer: GLuint) -> bool {
        core_call!(self, UnmapNamedBuffer(buffer), gl::FALSE) == gl::TRUE
    }

    fn named_framebuffer_texture(&self, framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint) {
        core_call!(self, NamedFramebufferTexture(framebuffer, attachment, texture, level))
    }

    fn named_framebuffer_renderbuffer(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        core_call!(
            self,
            NamedFramebufferRenderbuffer(
                framebuffer,
                attachment,
                renderbuffer_target,
                renderbuffer,
            )
        )
    }

    fn named_framebuffer_draw_buffer(&self, framebuffer: GLuint, buf: GLenum) {
        core_call!(self, NamedFramebufferDrawBuffer(framebuffer, buf))
    }

    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        core_call!(
            self,
            NamedFramebufferDrawBuffers(framebuffer, bufs.len() as GLsizei, bufs.as_ptr())
        )
    }

    fn named_framebuffer_read_buffer(&self, framebuffer: GLuint, src: GLenum) {
        core_call!(self, NamedFramebufferReadBuffer(framebuffer, src))
    }

    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        core_call!(self, CheckNamedFramebufferStatus(framebuffer, target), 0)
    }

    fn invalidate_named_framebuffer_data(&self, framebuffer: GLuint, attachments: &[GLenum]) {
        core_call!(
            self,
            InvalidateNamedFramebufferData(
                framebuffer,
                attachments.len() as GLsizei,
                attachments.as_ptr(),
            )
        )
    }

    fn named_renderbuffer_storage(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        core_call!(self, NamedRenderbufferStorage(renderbuffer, internal_format, width, height))
    }

    fn named_renderbuffer_storage_multisample(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        core_call!(
            self,
            NamedRenderbufferStorageMultisample(
                renderbuffer,
                samples,
                internal_format,
                width,
                height,
            )
        )
    }

    fn texture_parameter_i(&self, texture: GLuint, pname: GLenum, param: GLint) {
        core_call!(self, TextureParameteri(texture, pname, param))
    }

    fn texture_parameter_f(&self, texture: GLuint, pname: GLenum, param: GLfloat) {
        core_call!(self, TextureParameterf(texture, pname, param))
    }

    fn texture_storage_1d(&self, texture: GLuint, levels: GLsizei, internal_format: GLenum, width: GLsizei) {
        core_call!(self, TextureStorage1D(texture, levels, internal_format, width))
    }

    fn texture_storage_2d(
        &self,
        texture: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        core_call!(self, TextureStorage2D(texture, levels, internal_format, width, height))
    }

    fn texture_storage_3d(
        &self,
        texture: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) {
        core_call!(self, TextureStorage3D(texture, levels, internal_format, width, height, depth))
    }

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
    ) {
        core_call!(
            self,
            TextureSubImage2D(
                texture,
                level,
                xoffset,
                yoffset,
                width,
                height,
                format,
                ty,
                pixels.as_ptr().cast(),
            )
        )
    }

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
    ) {
        core_call!(
            self,
            TextureSubImage3D(
                texture,
                level,
                xoffset,
                yoffset,
                zoffset,
                width,
                height,
                depth,
                format,
                ty,
                pixels.as_ptr().cast(),
            )
        )
    }

    fn generate_texture_mipmap(&self, texture: GLuint) {
        core_call!(self, GenerateTextureMipmap(texture))
    }

    fn get_texture_image(&self, texture: GLuint, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        core_call!(
            self,
            GetTextureImage(
                texture,
                level,
                format,
                ty,
                out.len() as GLsizei,
                out.as_mut_ptr().cast(),
            )
        )
    }

    fn vertex_array_vertex_buffer(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) {
        core_call!(self, VertexArrayVertexBuffer(vaobj, binding_index, buffer, offset, stride))
    }

    fn enable_vertex_array_attrib(&self, vaobj: GLuint, index: GLuint) {
        core_call!(self, EnableVertexArrayAttrib(vaobj, index))
    }

    fn vertex_array_attrib_format(
        &self,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) {
        core_call!(
            self,
            VertexArrayAttribFormat(
                vaobj,
                attrib_index,
                size,
                ty,
                gl_bool(normalized),
                relative_offset,
            )
        )
    }

    fn vertex_array_attrib_binding(&self, vaobj: GLuint, attrib_index: GLuint, binding_index: GLuint) {
        core_call!(self, VertexArrayAttribBinding(vaobj, attrib_index, binding_index))
    }

    fn named_buffer_data_ext(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if !self.covers("glNamedBufferDataEXT", size, data) {
            return;
        }
        ext_call!(self, named_buffer_data, "glNamedBufferDataEXT", |f| f(
            buffer,
            size,
            data_ptr(data),
            usage
        ))
    }

    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, data: &[u8]) {
        ext_call!(self, named_buffer_sub_data, "glNamedBufferSubDataEXT", |f| f(
            buffer,
            offset,
            data.len() as GLsizeiptr,
            data.as_ptr().cast()
        ))
    }

    fn get_named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]) {
        ext_call!(self, get_named_buffer_sub_data, "glGetNamedBufferSubDataEXT", |f| f(
            buffer,
            offset,
            out.len() as GLsizeiptr,
            out.as_mut_ptr().cast()
        ))
    }

    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        ext_call!(
            self,
            map_named_buffer,
            "glMapNamedBufferEXT",
            |f| f(buffer, access),
            ptr::null_mut()
        )
    }

    fn map_named_buffer_range_ext(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        ext_call!(
            self,
            map_named_buffer_range,
            "glMapNamedBufferRangeEXT",
            |f| f(buffer, offset, length, access),
            ptr::null_mut()
        )
    }

    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool {
        ext_call!(
            self,
            unmap_named_buffer,
            "glUnmapNamedBufferEXT",
            |f| f(buffer) == gl::TRUE,
            false
        )
    }

    fn named_framebuffer_texture_ext(&self, framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint) {
        ext_call!(self, named_framebuffer_texture, "glNamedFramebufferTextureEXT", |f| f(
            framebuffer,
            attachment,
            texture,
            level
        ))
    }

    fn named_framebuffer_renderbuffer_ext(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        ext_call!(self, named_framebuffer_renderbuffer, "glNamedFramebufferRenderbufferEXT", |f| f(
            framebuffer,
            attachment,
            renderbuffer_target,
            renderbuffer
        ))
    }

    fn framebuffer_draw_buffer_ext(&self, framebuffer: GLuint, mode: GLenum) {
        ext_call!(self, framebuffer_draw_buffer, "glFramebufferDrawBufferEXT", |f| f(
            framebuffer,
            mode
        ))
    }

    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        ext_call!(self, framebuffer_draw_buffers, "glFramebufferDrawBuffersEXT", |f| f(
            framebuffer,
            bufs.len() as GLsizei,
            bufs.as_ptr()
        ))
    }

    fn framebuffer_read_buffer_ext(&self, framebuffer: GLuint, mode: GLenum) {
        ext_call!(self, framebuffer_read_buffer, "glFramebufferReadBufferEXT", |f| f(
            framebuffer,
            mode
        ))
    }

    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        ext_call!(
            self,
            check_named_framebuffer_status,
            "glCheckNamedFramebufferStatusEXT",
            |f| f(framebuffer, target),
            0
        )
    }

    fn named_renderbuffer_storage_ext(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        ext_call!(self, named_renderbuffer_storage, "glNamedRenderbufferStorageEXT", |f| f(
            renderbuffer,
            internal_format,
            width,
            height
        ))
    }

    fn named_renderbuffer_storage_multisample_ext(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        ext_call!(
            self,
            named_renderbuffer_storage_multisample,
            "glNamedRenderbufferStorageMultisampleEXT",
            |f| f(renderbuffer, samples, internal_format, width, height)
        )
    }

    fn texture_parameter_i_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLint) {
        ext_call!(self, texture_parameter_i, "glTextureParameteriEXT", |f| f(
            texture, target, pname, param
        ))
    }

    fn texture_parameter_f_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLfloat) {
        ext_call!(self, texture_parameter_f, "glTextureParameterfEXT", |f| f(
            texture, target, pname, param
        ))
    }

    fn texture_storage_1d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    ) {
        ext_call!(self, texture_storage_1d, "glTextureStorage1DEXT", |f| f(
            texture,
            target,
            levels,
            internal_format,
            width
        ))
    }

    fn texture_storage_2d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        ext_call!(self, texture_storage_2d, "glTextureStorage2DEXT", |f| f(
            texture,
            target,
            levels,
            internal_format,
            width,
            height
        ))
    }

    fn texture_storage_3d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) {
        ext_call!(self, texture_storage_3d, "glTextureStorage3DEXT", |f| f(
            texture,
            target,
            levels,
            internal_format,
            width,
            height,
            depth
        ))
    }

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
    ) {
        ext_call!(self, texture_sub_image_2d, "glTextureSubImage2DEXT", |f| f(
            texture,
            target,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            ty,
            pixels.as_ptr().cast()
        ))
    }

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
    ) {
        ext_call!(self, texture_sub_image_3d, "glTextureSubImage3DEXT", |f| f(
            texture,
            target,
            level,
            xoffset,
            yoffset,
            zoffset,
            width,
            height,
            depth,
            format,
            ty,
            pixels.as_ptr().cast()
        ))
    }

    fn generate_texture_mipmap_ext(&self, texture: GLuint, target: GLenum) {
        ext_call!(self, generate_texture_mipmap, "glGenerateTextureMipmapEXT", |f| f(
            texture, target
        ))
    }

    fn get_texture_level_parameter_iv_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        out: &mut [GLint],
    ) {
        ext_call!(
            self,
            get_texture_level_parameter_iv,
            "glGetTextureLevelParameterivEXT",
            |f| f(texture, target, level, pname, out.as_mut_ptr())
        )
    }

    unsafe fn get_texture_image_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
    ) {
        ext_call!(self, get_texture_image, "glGetTextureImageEXT", |f| f(
            texture,
            target,
            level,
            format,
            ty,
            out.as_mut_ptr().cast()
        ))
    }

    fn vertex_array_bind_vertex_buffer_ext(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) {
        ext_call!(
            self,
            vertex_array_bind_vertex_buffer,
            "glVertexArrayBindVertexBufferEXT",
            |f| f(vaobj, binding_index, buffer, offset, stride)
        )
    }

    fn enable_vertex_array_attrib_ext(&self, vaobj: GLuint, index: GLuint) {
        ext_call!(self, enable_vertex_array_attrib, "glEnableVertexArrayAttribEXT", |f| f(
            vaobj, index
        ))
    }

    fn vertex_array_vertex_attrib_format_ext(
        &self,
        vaobj: GLuint,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) {
        ext_call!(
            self,
            vertex_array_vertex_attrib_format,
            "glVertexArrayVertexAttribFormatEXT",
            |f| f(vaobj, attrib_index, size, ty, gl_bool(normalized), relative_offset)
        )
    }

    fn vertex_array_vertex_attrib_binding_ext(&self, vaobj: GLuint, attrib_index: GLuint, binding_index: GLuint) {
        ext_call!(
            self,
            vertex_array_vertex_attrib_binding,
            "glVertexArrayVertexAttribBindingEXT",
            |f| f(vaobj, attrib_index, binding_index)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved() -> NativeGl {
        // SAFETY: nothing resolves, so no driver function is ever reached.
        unsafe { NativeGl::load_with(|_| ptr::null()) }
    }

    #[test]
    fn unresolved_core_calls_raise_invalid_operation() {
        let gl = unresolved();
        assert!(!gl.has_entry_points(DsaFamily::Arb));
        assert!(!gl.has_entry_points(DsaFamily::Ext));

        gl.tex_storage_2d(gl::TEXTURE_2D, 1, gl::RGBA8, 4, 4);
        assert!(!gl.is_enabled(gl::BLEND));
        assert_eq!(gl.get_string(gl::VERSION), None);
        assert!(gl.map_buffer(gl::ARRAY_BUFFER, gl::READ_ONLY).is_null());
        assert_eq!(gl.check_framebuffer_status(gl::FRAMEBUFFER), 0);

        // One error, the first.
        assert_eq!(gl.get_error(), gl::INVALID_OPERATION);
        assert_eq!(gl.get_error(), gl::NO_ERROR);
    }

    #[test]
    fn short_buffer_data_is_refused_before_the_driver() {
        let gl = unresolved();
        gl.buffer_data(gl::ARRAY_BUFFER, 64, Some(&[0; 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_VALUE);
        gl.named_buffer_data(1, 64, Some(&[0; 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_VALUE);
        gl.named_buffer_data_ext(1, 64, Some(&[0; 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_VALUE);

        // Long enough, so it reaches the missing entry point.
        gl.buffer_data(gl::ARRAY_BUFFER, 4, Some(&[0; 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_OPERATION);
    }
}
