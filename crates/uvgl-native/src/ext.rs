//! `EXT_direct_state_access` entry points.
//!
//! The `gl` crate only generates core entry points, so the EXT family is
//! resolved by hand into a table of optional function pointers.

use std::ffi::c_void;

use gl::types::*;

use crate::loader::load_fn;

macro_rules! ext_fns {
    ($($field:ident: $name:literal => fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        #[derive(Default, Clone, Copy)]
        pub(crate) struct ExtDsaFns {
            $(pub(crate) $field: Option<unsafe extern "system" fn($($arg),*) $(-> $ret)?>,)*
        }

        impl ExtDsaFns {
            pub(crate) fn load(loadfn: &mut dyn FnMut(&str) -> *const c_void) -> Self {
                Self {
                    $($field: unsafe { load_fn(loadfn, $name) },)*
                }
            }

            pub(crate) fn all_loaded(&self) -> bool {
                true $(&& self.$field.is_some())*
            }

            pub(crate) fn missing(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(if self.$field.is_none() { missing.push($name); })*
                missing
            }
        }
    };
}

ext_fns! {
    named_buffer_data: "glNamedBufferDataEXT" => fn(GLuint, GLsizeiptr, *const c_void, GLenum);
    named_buffer_sub_data: "glNamedBufferSubDataEXT" => fn(GLuint, GLintptr, GLsizeiptr, *const c_void);
    get_named_buffer_sub_data: "glGetNamedBufferSubDataEXT" => fn(GLuint, GLintptr, GLsizeiptr, *mut c_void);
    map_named_buffer: "glMapNamedBufferEXT" => fn(GLuint, GLenum) -> *mut c_void;
    map_named_buffer_range: "glMapNamedBufferRangeEXT" => fn(GLuint, GLintptr, GLsizeiptr, GLbitfield) -> *mut c_void;
    unmap_named_buffer: "glUnmapNamedBufferEXT" => fn(GLuint) -> GLboolean;
    named_framebuffer_texture: "glNamedFramebufferTextureEXT" => fn(GLuint, GLenum, GLuint, GLint);
    named_framebuffer_renderbuffer: "glNamedFramebufferRenderbufferEXT" => fn(GLuint, GLenum, GLenum, GLuint);
    framebuffer_draw_buffer: "glFramebufferDrawBufferEXT" => fn(GLuint, GLenum);
    framebuffer_draw_buffers: "glFramebufferDrawBuffersEXT" => fn(GLuint, GLsizei, *const GLenum);
    framebuffer_read_buffer: "glFramebufferReadBufferEXT" => fn(GLuint, GLenum);
    check_named_framebuffer_status: "glCheckNamedFramebufferStatusEXT" => fn(GLuint, GLenum) -> GLenum;
    named_renderbuffer_storage: "glNamedRenderbufferStorageEXT" => fn(GLuint, GLenum, GLsizei, GLsizei);
    named_renderbuffer_storage_multisample: "glNamedRenderbufferStorageMultisampleEXT" => fn(GLuint, GLsizei, GLenum, GLsizei, GLsizei);
    texture_parameter_i: "glTextureParameteriEXT" => fn(GLuint, GLenum, GLenum, GLint);
    texture_parameter_f: "glTextureParameterfEXT" => fn(GLuint, GLenum, GLenum, GLfloat);
    texture_storage_1d: "glTextureStorage1DEXT" => fn(GLuint, GLenum, GLsizei, GLenum, GLsizei);
    texture_storage_2d: "glTextureStorage2DEXT" => fn(GLuint, GLenum, GLsizei, GLenum, GLsizei, GLsizei);
    texture_storage_3d: "glTextureStorage3DEXT" => fn(GLuint, GLenum, GLsizei, GLenum, GLsizei, GLsizei, GLsizei);
    texture_sub_image_2d: "glTextureSubImage2DEXT" => fn(GLuint, GLenum, GLint, GLint, GLint, GLsizei, GLsizei, GLenum, GLenum, *const c_void);
    texture_sub_image_3d: "glTextureSubImage3DEXT" => fn(GLuint, GLenum, GLint, GLint, GLint, GLint, GLsizei, GLsizei, GLsizei, GLenum, GLenum, *const c_void);
    generate_texture_mipmap: "glGenerateTextureMipmapEXT" => fn(GLuint, GLenum);
    get_texture_image: "glGetTextureImageEXT" => fn(GLuint, GLenum, GLint, GLenum, GLenum, *mut c_void);
    get_texture_level_parameter_iv: "glGetTextureLevelParameterivEXT" => fn(GLuint, GLenum, GLint, GLenum, *mut GLint);
    vertex_array_bind_vertex_buffer: "glVertexArrayBindVertexBufferEXT" => fn(GLuint, GLuint, GLuint, GLintptr, GLsizei);
    enable_vertex_array_attrib: "glEnableVertexArrayAttribEXT" => fn(GLuint, GLuint);
    vertex_array_vertex_attrib_format: "glVertexArrayVertexAttribFormatEXT" => fn(GLuint, GLuint, GLint, GLenum, GLboolean, GLuint);
    vertex_array_vertex_attrib_binding: "glVertexArrayVertexAttribBindingEXT" => fn(GLuint, GLuint, GLuint);
}
