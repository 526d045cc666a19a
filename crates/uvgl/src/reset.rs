use gl::types::*;
use tracing::debug;
use uvgl_core::{check_error, GlDriver, Result};

/// Buffer targets bind-emulated DSA may leave something bound to.
pub const BUFFER_TARGETS: [GLenum; 7] = [
    gl::ARRAY_BUFFER,
    gl::ELEMENT_ARRAY_BUFFER,
    gl::PIXEL_PACK_BUFFER,
    gl::PIXEL_UNPACK_BUFFER,
    gl::COPY_READ_BUFFER,
    gl::COPY_WRITE_BUFFER,
    gl::UNIFORM_BUFFER,
];

pub const TEXTURE_TARGETS: [GLenum; 4] = [
    gl::TEXTURE_2D,
    gl::TEXTURE_3D,
    gl::TEXTURE_2D_ARRAY,
    gl::TEXTURE_CUBE_MAP,
];

/// Unbind everything the bind-emulated DSA path can bind.
///
/// Only the active texture unit is touched. The vertex array is unbound
/// first: `GL_ELEMENT_ARRAY_BUFFER` is vertex array state, and unbinding it
/// while a vertex array is bound would clear that array's index buffer.
pub fn reset_bind_points(gl: &dyn GlDriver) -> Result<()> {
    gl.bind_vertex_array(0);
    check_error(gl, "glBindVertexArray")?;
    for target in TEXTURE_TARGETS {
        gl.bind_texture(target, 0);
        check_error(gl, "glBindTexture")?;
    }
    for target in BUFFER_TARGETS {
        gl.bind_buffer(target, 0);
        check_error(gl, "glBindBuffer")?;
    }

    gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
    check_error(gl, "glBindFramebuffer")?;
    gl.bind_renderbuffer(gl::RENDERBUFFER, 0);
    check_error(gl, "glBindRenderbuffer")?;

    debug!("bind points reset");
    Ok(())
}
