//! A simulated driver for tests.
//!
//! [`FakeGl`] implements [`GlDriver`] without a GPU. It keeps just enough
//! state to answer queries and to compare the effect of different call
//! sequences:
//!
//! - fixed-function state ([`FixedState`]) with GL's initial values,
//! - object storage for buffers, textures, framebuffers, renderbuffers and
//!   vertex arrays ([`Objects`]), created on first use,
//! - bind points ([`Bindings`]).
//!
//! Every entry point except `glGetError` is appended to a call log. A call
//! can be made to fail with [`FakeGl::fail_next`]; a failing call changes
//! nothing and leaves its error code for the next `glGetError`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::c_void;

use gl::types::*;

use crate::driver::{DsaFamily, GlDriver};
use crate::pixels::{pixel_size, PixelStore};

/// Version string, extension list and loaded entry points of a fake driver.
#[derive(Debug, Clone)]
pub struct Profile {
    pub version: String,
    pub major: u32,
    pub minor: u32,
    pub extensions: Vec<String>,
    pub arb_loaded: bool,
    pub ext_loaded: bool,
    pub es: bool,
    /// Entry points the driver does not provide. Calling one records the
    /// call and raises `GL_INVALID_OPERATION`, as `NativeGl` does for an
    /// entry point that never resolved.
    pub missing: Vec<&'static str>,
}

/// Desktop entry points GLES never has.
const ES_MISSING: [&str; 5] = [
    "glGetBufferSubData",
    "glGetTexImage",
    "glMapBuffer",
    "glDrawBuffer",
    "glTexStorage1D",
];

/// Arrived with GLES 3.1.
const ES31_ENTRY_POINTS: [&str; 4] = [
    "glGetTexLevelParameteriv",
    "glBindVertexBuffer",
    "glVertexAttribFormat",
    "glVertexAttribBinding",
];

impl Profile {
    pub fn desktop(major: u32, minor: u32) -> Self {
        let mut missing = Vec::new();
        if major < 3 {
            missing.push("glGetStringi");
        }
        Self {
            version: format!("{major}.{minor}.0 FakeGL"),
            major,
            minor,
            extensions: Vec::new(),
            arb_loaded: true,
            ext_loaded: true,
            es: false,
            missing,
        }
    }

    pub fn es(major: u32, minor: u32) -> Self {
        let mut missing = ES_MISSING.to_vec();
        if major < 3 {
            missing.push("glGetStringi");
        }
        if (major, minor) < (3, 1) {
            missing.extend(ES31_ENTRY_POINTS);
        }
        if (major, minor) < (3, 2) {
            missing.push("glFramebufferTexture");
        }
        Self {
            version: format!("OpenGL ES {major}.{minor} FakeGL"),
            major,
            minor,
            extensions: Vec::new(),
            arb_loaded: false,
            ext_loaded: false,
            es: true,
            missing,
        }
    }

    /// Leave one core entry point unresolved.
    pub fn without_entry_point(mut self, name: &'static str) -> Self {
        self.missing.push(name);
        self
    }

    /// `GL_NUM_EXTENSIONS` and `glGetStringi` exist.
    fn indexed_extensions(&self) -> bool {
        self.major >= 3
    }

    /// The row, skip and image pixel-store parameters exist.
    fn pixel_store_rows(&self) -> bool {
        !self.es || self.major >= 3
    }

    pub fn with_extension(mut self, name: &str) -> Self {
        self.extensions.push(name.to_string());
        self
    }

    pub fn without_entry_points(mut self, family: DsaFamily) -> Self {
        match family {
            DsaFamily::Arb => self.arb_loaded = false,
            DsaFamily::Ext => self.ext_loaded = false,
        }
        self
    }
}

/// One recorded entry point call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: &'static str,
    pub args: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceState {
    pub func: GLenum,
    pub reference: GLint,
    pub mask: GLuint,
    pub sfail: GLenum,
    pub dpfail: GLenum,
    pub dppass: GLenum,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            func: gl::ALWAYS,
            reference: 0,
            mask: GLuint::MAX,
            sfail: gl::KEEP,
            dpfail: gl::KEEP,
            dppass: gl::KEEP,
        }
    }
}

/// Global fixed-function state, starting at GL's initial values.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedState {
    pub blend_color: [GLfloat; 4],
    pub blend_equation: (GLenum, GLenum),
    pub blend_func: [GLenum; 4],
    pub color_mask: [bool; 4],
    pub depth_func: GLenum,
    pub depth_mask: bool,
    pub clear_depth: GLdouble,
    pub clear_stencil: GLint,
    pub stencil_front: StencilFaceState,
    pub stencil_back: StencilFaceState,
    pub cull_face: GLenum,
    pub polygon_mode: GLenum,
    pub enabled: BTreeSet<GLenum>,
    pub pack: PixelStore,
    pub unpack: PixelStore,
}

impl Default for FixedState {
    fn default() -> Self {
        Self {
            blend_color: [0.0; 4],
            blend_equation: (gl::FUNC_ADD, gl::FUNC_ADD),
            blend_func: [gl::ONE, gl::ZERO, gl::ONE, gl::ZERO],
            color_mask: [true; 4],
            depth_func: gl::LESS,
            depth_mask: true,
            clear_depth: 1.0,
            clear_stencil: 0,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            cull_face: gl::BACK,
            polygon_mode: gl::FILL,
            enabled: BTreeSet::new(),
            pack: PixelStore::DEFAULT,
            unpack: PixelStore::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BufferObject {
    pub data: Vec<u8>,
    pub usage: GLenum,
    pub mapped: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureLevel {
    pub width: GLsizei,
    pub height: GLsizei,
    pub depth: GLsizei,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureObject {
    pub internal_format: GLenum,
    pub levels: Vec<TextureLevel>,
    pub params_i: BTreeMap<GLenum, GLint>,
    pub params_f: BTreeMap<GLenum, GLfloat>,
    pub mipmaps_generated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Texture { texture: GLuint, level: GLint },
    Renderbuffer { renderbuffer: GLuint },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramebufferObject {
    pub attachments: BTreeMap<GLenum, Attachment>,
    pub draw_buffers: Vec<GLenum>,
    pub read_buffer: Option<GLenum>,
    pub invalidated: Vec<GLenum>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderbufferObject {
    pub internal_format: GLenum,
    pub width: GLsizei,
    pub height: GLsizei,
    pub samples: GLsizei,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexAttrib {
    pub enabled: bool,
    pub size: GLint,
    pub ty: GLenum,
    pub normalized: bool,
    pub relative_offset: GLuint,
    pub binding: GLuint,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexArrayObject {
    /// binding index -> (buffer, offset, stride)
    pub buffers: BTreeMap<GLuint, (GLuint, GLintptr, GLsizei)>,
    pub attribs: BTreeMap<GLuint, VertexAttrib>,
    /// The `GL_ELEMENT_ARRAY_BUFFER` binding, which belongs to the array.
    pub element_buffer: GLuint,
}

/// Everything that lives in named objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Objects {
    pub buffers: BTreeMap<GLuint, BufferObject>,
    pub textures: BTreeMap<GLuint, TextureObject>,
    pub framebuffers: BTreeMap<GLuint, FramebufferObject>,
    pub renderbuffers: BTreeMap<GLuint, RenderbufferObject>,
    pub vertex_arrays: BTreeMap<GLuint, VertexArrayObject>,
}

/// Global bind points. Zero means nothing bound.
///
/// `buffers[GL_ELEMENT_ARRAY_BUFFER]` shows the element buffer of the bound
/// vertex array.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    pub buffers: BTreeMap<GLenum, GLuint>,
    pub textures: BTreeMap<GLenum, GLuint>,
    pub draw_framebuffer: GLuint,
    pub read_framebuffer: GLuint,
    pub renderbuffer: GLuint,
    pub vertex_array: GLuint,
}

impl Bindings {
    /// True when every bind point is back at zero.
    pub fn is_default(&self) -> bool {
        self.buffers.values().all(|&b| b == 0)
            && self.textures.values().all(|&t| t == 0)
            && self.draw_framebuffer == 0
            && self.read_framebuffer == 0
            && self.renderbuffer == 0
            && self.vertex_array == 0
    }
}

#[derive(Debug, Default)]
struct State {
    fixed: FixedState,
    objects: Objects,
    bindings: Bindings,
    /// Element buffer binding while no vertex array is bound.
    default_element_buffer: GLuint,
    pending_error: Option<GLenum>,
}

impl State {
    fn raise(&mut self, code: GLenum) {
        self.pending_error.get_or_insert(code);
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        self.bindings.buffers.insert(target, buffer);
        if target == gl::ELEMENT_ARRAY_BUFFER {
            match self.bindings.vertex_array {
                0 => self.default_element_buffer = buffer,
                vao => self.objects.vertex_arrays.entry(vao).or_default().element_buffer = buffer,
            }
        }
    }

    fn bind_vertex_array(&mut self, array: GLuint) {
        self.bindings.vertex_array = array;
        let element_buffer = match array {
            0 => self.default_element_buffer,
            vao => self
                .objects
                .vertex_arrays
                .get(&vao)
                .map_or(0, |v| v.element_buffer),
        };
        self.bindings
            .buffers
            .insert(gl::ELEMENT_ARRAY_BUFFER, element_buffer);
    }

    fn bound_buffer(&mut self, target: GLenum) -> Option<GLuint> {
        match self.bindings.buffers.get(&target).copied().unwrap_or(0) {
            0 => {
                self.raise(gl::INVALID_OPERATION);
                None
            }
            id => Some(id),
        }
    }

    fn bound_texture(&mut self, target: GLenum) -> Option<GLuint> {
        match self.bindings.textures.get(&target).copied().unwrap_or(0) {
            0 => {
                self.raise(gl::INVALID_OPERATION);
                None
            }
            id => Some(id),
        }
    }

    fn bound_framebuffer(&mut self, target: GLenum) -> Option<GLuint> {
        let id = match target {
            gl::READ_FRAMEBUFFER => self.bindings.read_framebuffer,
            gl::DRAW_FRAMEBUFFER | gl::FRAMEBUFFER => self.bindings.draw_framebuffer,
            _ => {
                self.raise(gl::INVALID_ENUM);
                return None;
            }
        };
        Some(id)
    }

    fn bound_vertex_array(&mut self) -> Option<GLuint> {
        match self.bindings.vertex_array {
            0 => {
                self.raise(gl::INVALID_OPERATION);
                None
            }
            id => Some(id),
        }
    }

    fn buffer_data(&mut self, id: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if size < 0 || data.is_some_and(|d| d.len() < size as usize) {
            self.raise(gl::INVALID_VALUE);
            return;
        }
        let size = size as usize;
        let bytes = data.map_or_else(|| vec![0; size], |d| d[..size].to_vec());
        let buffer = self.objects.buffers.entry(id).or_default();
        buffer.data = bytes;
        buffer.usage = usage;
        buffer.mapped = false;
    }

    fn buffer_sub_data(&mut self, id: GLuint, offset: GLintptr, data: &[u8]) {
        let buffer = self.objects.buffers.entry(id).or_default();
        let start = offset.max(0) as usize;
        if offset >= 0 && start + data.len() <= buffer.data.len() {
            buffer.data[start..start + data.len()].copy_from_slice(data);
        } else {
            self.raise(gl::INVALID_VALUE);
        }
    }

    fn get_buffer_sub_data(&mut self, id: GLuint, offset: GLintptr, out: &mut [u8]) {
        let buffer = self.objects.buffers.entry(id).or_default();
        let start = offset.max(0) as usize;
        if offset >= 0 && start + out.len() <= buffer.data.len() {
            out.copy_from_slice(&buffer.data[start..start + out.len()]);
        } else {
            self.raise(gl::INVALID_VALUE);
        }
    }

    fn map_buffer(&mut self, id: GLuint, offset: GLintptr, length: Option<GLsizeiptr>) -> *mut c_void {
        let buffer = self.objects.buffers.entry(id).or_default();
        let start = offset.max(0) as usize;
        let end = length.map_or(buffer.data.len(), |l| start + l.max(0) as usize);
        if buffer.mapped || offset < 0 || end > buffer.data.len() {
            self.raise(gl::INVALID_OPERATION);
            return std::ptr::null_mut();
        }
        buffer.mapped = true;
        buffer.data[start..].as_mut_ptr().cast()
    }

    fn unmap_buffer(&mut self, id: GLuint) -> bool {
        let buffer = self.objects.buffers.entry(id).or_default();
        if !buffer.mapped {
            self.raise(gl::INVALID_OPERATION);
            return false;
        }
        buffer.mapped = false;
        true
    }

    fn attach(&mut self, framebuffer: GLuint, attachment: GLenum, value: Option<Attachment>) {
        let fb = self.objects.framebuffers.entry(framebuffer).or_default();
        match value {
            Some(value) => {
                fb.attachments.insert(attachment, value);
            }
            None => {
                fb.attachments.remove(&attachment);
            }
        }
    }

    fn draw_buffers(&mut self, framebuffer: GLuint, bufs: &[GLenum]) {
        self.objects
            .framebuffers
            .entry(framebuffer)
            .or_default()
            .draw_buffers = bufs.to_vec();
    }

    fn read_buffer(&mut self, framebuffer: GLuint, src: GLenum) {
        self.objects
            .framebuffers
            .entry(framebuffer)
            .or_default()
            .read_buffer = Some(src);
    }

    fn framebuffer_status(&mut self, framebuffer: GLuint) -> GLenum {
        if framebuffer == 0 {
            return gl::FRAMEBUFFER_COMPLETE;
        }
        match self.objects.framebuffers.get(&framebuffer) {
            Some(fb) if !fb.attachments.is_empty() => gl::FRAMEBUFFER_COMPLETE,
            _ => gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
        }
    }

    fn invalidate(&mut self, framebuffer: GLuint, attachments: &[GLenum]) {
        self.objects
            .framebuffers
            .entry(framebuffer)
            .or_default()
            .invalidated
            .extend_from_slice(attachments);
    }

    fn renderbuffer_storage(
        &mut self,
        id: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        self.objects.renderbuffers.insert(
            id,
            RenderbufferObject {
                internal_format,
                width,
                height,
                samples,
            },
        );
    }

    fn texture_param_i(&mut self, id: GLuint, pname: GLenum, param: GLint) {
        self.objects
            .textures
            .entry(id)
            .or_default()
            .params_i
            .insert(pname, param);
    }

    fn texture_param_f(&mut self, id: GLuint, pname: GLenum, param: GLfloat) {
        self.objects
            .textures
            .entry(id)
            .or_default()
            .params_f
            .insert(pname, param);
    }

    fn texture_storage(
        &mut self,
        id: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        depth: GLsizei,
    ) {
        let texture = self.objects.textures.entry(id).or_default();
        if !texture.levels.is_empty() || levels < 1 {
            // Immutable storage cannot be respecified.
            self.raise(gl::INVALID_OPERATION);
            return;
        }
        let bpp = internal_format_size(internal_format);
        texture.internal_format = internal_format;
        texture.levels = (0..levels)
            .map(|level| {
                let w = (width >> level).max(1);
                let h = (height >> level).max(1);
                let d = (depth >> level).max(1);
                TextureLevel {
                    width: w,
                    height: h,
                    depth: d,
                    data: vec![0; (w * h * d) as usize * bpp],
                }
            })
            .collect();
    }

    fn texture_sub_image(
        &mut self,
        id: GLuint,
        level: GLint,
        offset: (GLint, GLint, GLint),
        size: (GLsizei, GLsizei, GLsizei),
        format: GLenum,
        ty: GLenum,
        pixels: &[u8],
    ) {
        let unpack = self.fixed.unpack;
        let (x, y, z) = offset;
        let (w, h, d) = size;
        if w < 0 || h < 0 || d < 0 {
            self.raise(gl::INVALID_VALUE);
            return;
        }
        let texture = self.objects.textures.entry(id).or_default();
        let bpp = internal_format_size(texture.internal_format);
        let Some(dst) = texture.levels.get_mut(level.max(0) as usize) else {
            self.raise(gl::INVALID_OPERATION);
            return;
        };
        if pixel_size(format, ty) != Ok(bpp)
            || x < 0
            || y < 0
            || z < 0
            || x + w > dst.width
            || y + h > dst.height
            || z + d > dst.depth
        {
            self.raise(gl::INVALID_OPERATION);
            return;
        }
        assert!(
            pixels.len() >= unpack.required_len(bpp, w, h, d),
            "pixel upload would read past the client slice"
        );
        let row = w as usize * bpp;
        for layer in 0..d {
            for line in 0..h {
                let src_start = unpack.row_offset(bpp, w, h, line, layer);
                let dst_start = ((((z + layer) * dst.height + y + line) * dst.width + x) as usize) * bpp;
                dst.data[dst_start..dst_start + row]
                    .copy_from_slice(&pixels[src_start..src_start + row]);
            }
        }
    }

    fn generate_mipmap(&mut self, id: GLuint) {
        self.objects.textures.entry(id).or_default().mipmaps_generated = true;
    }

    /// `bounded` calls are told `out.len()`; the others trust it.
    fn get_texture_image(
        &mut self,
        id: GLuint,
        level: GLint,
        format: GLenum,
        ty: GLenum,
        out: &mut [u8],
        bounded: bool,
    ) {
        let pack = self.fixed.pack;
        let texture = self.objects.textures.entry(id).or_default();
        let bpp = internal_format_size(texture.internal_format);
        let Some(src) = texture.levels.get(level.max(0) as usize) else {
            self.raise(gl::INVALID_VALUE);
            return;
        };
        if pixel_size(format, ty) != Ok(bpp) {
            self.raise(gl::INVALID_OPERATION);
            return;
        }
        let (w, h, d) = (src.width, src.height, src.depth);
        if out.len() < pack.required_len(bpp, w, h, d) {
            assert!(bounded, "texture readback would write past the client slice");
            self.raise(gl::INVALID_OPERATION);
            return;
        }
        let row = w as usize * bpp;
        for layer in 0..d {
            for line in 0..h {
                let src_start = (((layer * h + line) * w) as usize) * bpp;
                let dst_start = pack.row_offset(bpp, w, h, line, layer);
                out[dst_start..dst_start + row].copy_from_slice(&src.data[src_start..src_start + row]);
            }
        }
    }

    fn level_parameter(&mut self, id: GLuint, level: GLint, pname: GLenum, out: &mut [GLint]) {
        if level < 0 {
            self.raise(gl::INVALID_VALUE);
            return;
        }
        let texture = self.objects.textures.get(&id);
        let defined = texture.and_then(|t| t.levels.get(level as usize));
        let value = match pname {
            gl::TEXTURE_WIDTH => defined.map_or(0, |l| l.width),
            gl::TEXTURE_HEIGHT => defined.map_or(0, |l| l.height),
            gl::TEXTURE_DEPTH => defined.map_or(0, |l| l.depth),
            gl::TEXTURE_INTERNAL_FORMAT => defined
                .and(texture)
                .map_or(gl::RGBA as GLint, |t| t.internal_format as GLint),
            _ => {
                self.raise(gl::INVALID_ENUM);
                return;
            }
        };
        if let Some(slot) = out.first_mut() {
            *slot = value;
        }
    }

    fn vertex_buffer(&mut self, vao: GLuint, binding: GLuint, buffer: GLuint, offset: GLintptr, stride: GLsizei) {
        self.objects
            .vertex_arrays
            .entry(vao)
            .or_default()
            .buffers
            .insert(binding, (buffer, offset, stride));
    }

    fn attrib(&mut self, vao: GLuint, index: GLuint) -> &mut VertexAttrib {
        self.objects
            .vertex_arrays
            .entry(vao)
            .or_default()
            .attribs
            .entry(index)
            .or_default()
    }
}

fn internal_format_size(internal_format: GLenum) -> usize {
    match internal_format {
        gl::R8 => 1,
        gl::RG8 | gl::R16F => 2,
        gl::RGB8 | gl::SRGB8 => 3,
        gl::RG16F => 4,
        gl::RGBA16F | gl::RG32F => 8,
        gl::RGBA32F => 16,
        _ => 4,
    }
}

/// A [`GlDriver`] that simulates a context in memory and records calls.
#[derive(Debug)]
pub struct FakeGl {
    profile: Profile,
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<(&'static str, GLenum)>>,
    error_checks: Cell<usize>,
}

macro_rules! record {
    ($self:ident, $name:literal $(, $arg:expr)* $(,)?) => {
        $self.enter($name, [$(format!("{:?}", $arg)),*].join(", "))
    };
}

impl FakeGl {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            state: RefCell::new(State::default()),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            error_checks: Cell::new(0),
        }
    }

    /// Desktop GL 4.6 with every DSA entry point loaded.
    pub fn desktop() -> Self {
        Self::new(Profile::desktop(4, 6).with_extension("GL_EXT_direct_state_access"))
    }

    /// Make the next call to `name` fail with `code` instead of running.
    pub fn fail_next(&self, name: &'static str, code: GLenum) {
        self.failures.borrow_mut().push((name, code));
    }

    /// Overwrite fixed-function state without recording a call.
    pub fn seed(&self, f: impl FnOnce(&mut FixedState)) {
        f(&mut self.state.borrow_mut().fixed);
    }

    pub fn fixed(&self) -> FixedState {
        self.state.borrow().fixed.clone()
    }

    pub fn objects(&self) -> Objects {
        self.state.borrow().objects.clone()
    }

    pub fn bindings(&self) -> Bindings {
        self.state.borrow().bindings.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.name == name).count()
    }

    /// Number of `glGetError` calls so far.
    pub fn error_checks(&self) -> usize {
        self.error_checks.get()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
        self.error_checks.set(0);
    }

    /// Log a call. Returns `false` if the call was made to fail or the
    /// entry point is missing.
    fn enter(&self, name: &'static str, args: String) -> bool {
        self.calls.borrow_mut().push(Call { name, args });
        if self.profile.missing.contains(&name) {
            self.state.borrow_mut().raise(gl::INVALID_OPERATION);
            return false;
        }
        let mut failures = self.failures.borrow_mut();
        if let Some(pos) = failures.iter().position(|(n, _)| *n == name) {
            let (_, code) = failures.remove(pos);
            self.state.borrow_mut().raise(code);
            return false;
        }
        true
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    fn stencil_faces(&self, face: GLenum, f: impl Fn(&mut StencilFaceState)) {
        self.with(|st| match face {
            gl::FRONT => f(&mut st.fixed.stencil_front),
            gl::BACK => f(&mut st.fixed.stencil_back),
            gl::FRONT_AND_BACK => {
                f(&mut st.fixed.stencil_front);
                f(&mut st.fixed.stencil_back);
            }
            _ => st.raise(gl::INVALID_ENUM),
        })
    }
}

impl GlDriver for FakeGl {
    fn has_entry_points(&self, family: DsaFamily) -> bool {
        match family {
            DsaFamily::Arb => self.profile.arb_loaded,
            DsaFamily::Ext => self.profile.ext_loaded,
        }
    }

    fn get_error(&self) -> GLenum {
        self.error_checks.set(self.error_checks.get() + 1);
        self.with(|st| st.pending_error.take().unwrap_or(gl::NO_ERROR))
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        if !record!(self, "glGetString", name) {
            return None;
        }
        match name {
            gl::VERSION => Some(self.profile.version.clone()),
            gl::VENDOR => Some("uvgl".to_string()),
            gl::RENDERER => Some("FakeGl".to_string()),
            gl::EXTENSIONS if !self.profile.indexed_extensions() => Some(self.profile.extensions.join(" ")),
            _ => {
                self.with(|st| st.raise(gl::INVALID_ENUM));
                None
            }
        }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        if !record!(self, "glGetStringi", name, index) {
            return None;
        }
        let found = (name == gl::EXTENSIONS)
            .then(|| self.profile.extensions.get(index as usize).cloned())
            .flatten();
        if found.is_none() {
            self.with(|st| st.raise(gl::INVALID_VALUE));
        }
        found
    }

    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]) {
        if !record!(self, "glGetIntegerv", pname) {
            return;
        }
        let es = self.profile.es;
        let indexed = self.profile.indexed_extensions();
        let rows = self.profile.pixel_store_rows();
        let extensions = self.profile.extensions.len() as GLint;
        self.with(|st| {
            let f = &st.fixed;
            let value = match pname {
                gl::NUM_EXTENSIONS if indexed => Some(extensions),
                gl::UNPACK_ALIGNMENT => Some(f.unpack.alignment),
                gl::UNPACK_ROW_LENGTH if rows => Some(f.unpack.row_length),
                gl::UNPACK_SKIP_PIXELS if rows => Some(f.unpack.skip_pixels),
                gl::UNPACK_SKIP_ROWS if rows => Some(f.unpack.skip_rows),
                gl::UNPACK_IMAGE_HEIGHT if rows => Some(f.unpack.image_height),
                gl::UNPACK_SKIP_IMAGES if rows => Some(f.unpack.skip_images),
                gl::PACK_ALIGNMENT => Some(f.pack.alignment),
                gl::PACK_ROW_LENGTH if rows => Some(f.pack.row_length),
                gl::PACK_SKIP_PIXELS if rows => Some(f.pack.skip_pixels),
                gl::PACK_SKIP_ROWS if rows => Some(f.pack.skip_rows),
                gl::PACK_IMAGE_HEIGHT if !es => Some(f.pack.image_height),
                gl::PACK_SKIP_IMAGES if !es => Some(f.pack.skip_images),
                gl::BLEND_EQUATION_RGB => Some(f.blend_equation.0 as GLint),
                gl::BLEND_EQUATION_ALPHA => Some(f.blend_equation.1 as GLint),
                gl::BLEND_SRC_RGB => Some(f.blend_func[0] as GLint),
                gl::BLEND_DST_RGB => Some(f.blend_func[1] as GLint),
                gl::BLEND_SRC_ALPHA => Some(f.blend_func[2] as GLint),
                gl::BLEND_DST_ALPHA => Some(f.blend_func[3] as GLint),
                gl::DEPTH_FUNC => Some(f.depth_func as GLint),
                gl::STENCIL_CLEAR_VALUE => Some(f.clear_stencil),
                gl::STENCIL_FUNC => Some(f.stencil_front.func as GLint),
                gl::STENCIL_REF => Some(f.stencil_front.reference),
                gl::STENCIL_VALUE_MASK => Some(f.stencil_front.mask as GLint),
                gl::STENCIL_FAIL => Some(f.stencil_front.sfail as GLint),
                gl::STENCIL_PASS_DEPTH_FAIL => Some(f.stencil_front.dpfail as GLint),
                gl::STENCIL_PASS_DEPTH_PASS => Some(f.stencil_front.dppass as GLint),
                gl::STENCIL_BACK_FUNC => Some(f.stencil_back.func as GLint),
                gl::STENCIL_BACK_REF => Some(f.stencil_back.reference),
                gl::STENCIL_BACK_VALUE_MASK => Some(f.stencil_back.mask as GLint),
                gl::STENCIL_BACK_FAIL => Some(f.stencil_back.sfail as GLint),
                gl::STENCIL_BACK_PASS_DEPTH_FAIL => Some(f.stencil_back.dpfail as GLint),
                gl::STENCIL_BACK_PASS_DEPTH_PASS => Some(f.stencil_back.dppass as GLint),
                gl::CULL_FACE_MODE => Some(f.cull_face as GLint),
                gl::POLYGON_MODE if !es => Some(f.polygon_mode as GLint),
                _ => None,
            };
            match (value, out.first_mut()) {
                (Some(value), Some(slot)) => *slot = value,
                (Some(_), None) => {}
                (None, _) => st.raise(gl::INVALID_ENUM),
            }
        });
    }

    fn get_float_v(&self, pname: GLenum, out: &mut [GLfloat]) {
        if !record!(self, "glGetFloatv", pname) {
            return;
        }
        self.with(|st| match pname {
            gl::BLEND_COLOR => {
                let n = out.len().min(4);
                out[..n].copy_from_slice(&st.fixed.blend_color[..n]);
            }
            gl::DEPTH_CLEAR_VALUE => {
                if let Some(slot) = out.first_mut() {
                    *slot = st.fixed.clear_depth as GLfloat;
                }
            }
            _ => st.raise(gl::INVALID_ENUM),
        });
    }

    fn get_double_v(&self, pname: GLenum, out: &mut [GLdouble]) {
        if !record!(self, "glGetDoublev", pname) {
            return;
        }
        let es = self.profile.es;
        self.with(|st| match pname {
            gl::DEPTH_CLEAR_VALUE if !es => {
                if let Some(slot) = out.first_mut() {
                    *slot = st.fixed.clear_depth;
                }
            }
            _ => st.raise(gl::INVALID_OPERATION),
        });
    }

    fn get_boolean_v(&self, pname: GLenum, out: &mut [GLboolean]) {
        if !record!(self, "glGetBooleanv", pname) {
            return;
        }
        let as_gl = |b: bool| if b { gl::TRUE } else { gl::FALSE };
        self.with(|st| match pname {
            gl::DEPTH_WRITEMASK => {
                if let Some(slot) = out.first_mut() {
                    *slot = as_gl(st.fixed.depth_mask);
                }
            }
            gl::COLOR_WRITEMASK => {
                for (slot, &value) in out.iter_mut().zip(st.fixed.color_mask.iter()) {
                    *slot = as_gl(value);
                }
            }
            _ => st.raise(gl::INVALID_ENUM),
        });
    }

    fn is_enabled(&self, cap: GLenum) -> bool {
        if !record!(self, "glIsEnabled", cap) {
            return false;
        }
        self.with(|st| st.fixed.enabled.contains(&cap))
    }

    fn enable(&self, cap: GLenum) {
        if record!(self, "glEnable", cap) {
            self.with(|st| st.fixed.enabled.insert(cap));
        }
    }

    fn disable(&self, cap: GLenum) {
        if record!(self, "glDisable", cap) {
            self.with(|st| st.fixed.enabled.remove(&cap));
        }
    }

    fn blend_color(&self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) {
        if record!(self, "glBlendColor", red, green, blue, alpha) {
            self.with(|st| st.fixed.blend_color = [red, green, blue, alpha]);
        }
    }

    fn blend_equation(&self, mode: GLenum) {
        if record!(self, "glBlendEquation", mode) {
            self.with(|st| st.fixed.blend_equation = (mode, mode));
        }
    }

    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum) {
        if record!(self, "glBlendEquationSeparate", mode_rgb, mode_alpha) {
            self.with(|st| st.fixed.blend_equation = (mode_rgb, mode_alpha));
        }
    }

    fn blend_func_separate(&self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        if record!(self, "glBlendFuncSeparate", src_rgb, dst_rgb, src_alpha, dst_alpha) {
            self.with(|st| st.fixed.blend_func = [src_rgb, dst_rgb, src_alpha, dst_alpha]);
        }
    }

    fn color_mask(&self, red: bool, green: bool, blue: bool, alpha: bool) {
        if record!(self, "glColorMask", red, green, blue, alpha) {
            self.with(|st| st.fixed.color_mask = [red, green, blue, alpha]);
        }
    }

    fn depth_func(&self, func: GLenum) {
        if record!(self, "glDepthFunc", func) {
            self.with(|st| st.fixed.depth_func = func);
        }
    }

    fn depth_mask(&self, flag: bool) {
        if record!(self, "glDepthMask", flag) {
            self.with(|st| st.fixed.depth_mask = flag);
        }
    }

    fn clear_depth(&self, depth: GLdouble) {
        if !record!(self, "glClearDepth", depth) {
            return;
        }
        let es = self.profile.es;
        self.with(|st| {
            if es {
                st.raise(gl::INVALID_OPERATION);
            } else {
                st.fixed.clear_depth = depth;
            }
        });
    }

    fn clear_depth_f(&self, depth: GLfloat) {
        if record!(self, "glClearDepthf", depth) {
            self.with(|st| st.fixed.clear_depth = depth as GLdouble);
        }
    }

    fn clear_stencil(&self, s: GLint) {
        if record!(self, "glClearStencil", s) {
            self.with(|st| st.fixed.clear_stencil = s);
        }
    }

    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint) {
        if record!(self, "glStencilFunc", func, reference, mask) {
            self.stencil_faces(gl::FRONT_AND_BACK, |s| {
                s.func = func;
                s.reference = reference;
                s.mask = mask;
            });
        }
    }

    fn stencil_func_separate(&self, face: GLenum, func: GLenum, reference: GLint, mask: GLuint) {
        if record!(self, "glStencilFuncSeparate", face, func, reference, mask) {
            self.stencil_faces(face, |s| {
                s.func = func;
                s.reference = reference;
                s.mask = mask;
            });
        }
    }

    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        if record!(self, "glStencilOp", sfail, dpfail, dppass) {
            self.stencil_faces(gl::FRONT_AND_BACK, |s| {
                s.sfail = sfail;
                s.dpfail = dpfail;
                s.dppass = dppass;
            });
        }
    }

    fn stencil_op_separate(&self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        if record!(self, "glStencilOpSeparate", face, sfail, dpfail, dppass) {
            self.stencil_faces(face, |s| {
                s.sfail = sfail;
                s.dpfail = dpfail;
                s.dppass = dppass;
            });
        }
    }

    fn cull_face(&self, mode: GLenum) {
        if record!(self, "glCullFace", mode) {
            self.with(|st| st.fixed.cull_face = mode);
        }
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        if !record!(self, "glPolygonMode", face, mode) {
            return;
        }
        let es = self.profile.es;
        self.with(|st| {
            if es || face != gl::FRONT_AND_BACK {
                st.raise(gl::INVALID_ENUM);
            } else {
                st.fixed.polygon_mode = mode;
            }
        });
    }

    // Legacy object calls.

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        if record!(self, "glBindBuffer", target, buffer) {
            self.with(|st| st.bind_buffer(target, buffer));
        }
    }

    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if record!(self, "glBufferData", target, size, usage) {
            self.with(|st| {
                if let Some(id) = st.bound_buffer(target) {
                    st.buffer_data(id, size, data, usage);
                }
            });
        }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: GLintptr, data: &[u8]) {
        if record!(self, "glBufferSubData", target, offset, data.len()) {
            self.with(|st| {
                if let Some(id) = st.bound_buffer(target) {
                    st.buffer_sub_data(id, offset, data);
                }
            });
        }
    }

    fn get_buffer_sub_data(&self, target: GLenum, offset: GLintptr, out: &mut [u8]) {
        if record!(self, "glGetBufferSubData", target, offset, out.len()) {
            self.with(|st| {
                if let Some(id) = st.bound_buffer(target) {
                    st.get_buffer_sub_data(id, offset, out);
                }
            });
        }
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        if !record!(self, "glMapBuffer", target, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| match st.bound_buffer(target) {
            Some(id) => st.map_buffer(id, 0, None),
            None => std::ptr::null_mut(),
        })
    }

    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        if !record!(self, "glMapBufferRange", target, offset, length, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| match st.bound_buffer(target) {
            Some(id) => st.map_buffer(id, offset, Some(length)),
            None => std::ptr::null_mut(),
        })
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        if !record!(self, "glUnmapBuffer", target) {
            return false;
        }
        self.with(|st| match st.bound_buffer(target) {
            Some(id) => st.unmap_buffer(id),
            None => false,
        })
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        if !record!(self, "glBindFramebuffer", target, framebuffer) {
            return;
        }
        self.with(|st| match target {
            gl::FRAMEBUFFER => {
                st.bindings.draw_framebuffer = framebuffer;
                st.bindings.read_framebuffer = framebuffer;
            }
            gl::DRAW_FRAMEBUFFER => st.bindings.draw_framebuffer = framebuffer,
            gl::READ_FRAMEBUFFER => st.bindings.read_framebuffer = framebuffer,
            _ => st.raise(gl::INVALID_ENUM),
        });
    }

    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint) {
        if record!(self, "glFramebufferTexture", target, attachment, texture, level) {
            self.with(|st| {
                if let Some(fb) = st.bound_framebuffer(target) {
                    let value = (texture != 0).then_some(Attachment::Texture { texture, level });
                    st.attach(fb, attachment, value);
                }
            });
        }
    }

    fn framebuffer_renderbuffer(
        &self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        if record!(
            self,
            "glFramebufferRenderbuffer",
            target,
            attachment,
            renderbuffer_target,
            renderbuffer
        ) {
            self.with(|st| {
                if let Some(fb) = st.bound_framebuffer(target) {
                    let value = (renderbuffer != 0).then_some(Attachment::Renderbuffer { renderbuffer });
                    st.attach(fb, attachment, value);
                }
            });
        }
    }

    fn draw_buffer(&self, buf: GLenum) {
        if record!(self, "glDrawBuffer", buf) {
            self.with(|st| {
                let fb = st.bindings.draw_framebuffer;
                st.draw_buffers(fb, &[buf]);
            });
        }
    }

    fn draw_buffers(&self, bufs: &[GLenum]) {
        if record!(self, "glDrawBuffers", bufs) {
            self.with(|st| {
                let fb = st.bindings.draw_framebuffer;
                st.draw_buffers(fb, bufs);
            });
        }
    }

    fn read_buffer(&self, src: GLenum) {
        if record!(self, "glReadBuffer", src) {
            self.with(|st| {
                let fb = st.bindings.read_framebuffer;
                st.read_buffer(fb, src);
            });
        }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        if !record!(self, "glCheckFramebufferStatus", target) {
            return 0;
        }
        self.with(|st| match st.bound_framebuffer(target) {
            Some(fb) => st.framebuffer_status(fb),
            None => 0,
        })
    }

    fn invalidate_framebuffer(&self, target: GLenum, attachments: &[GLenum]) {
        if record!(self, "glInvalidateFramebuffer", target, attachments) {
            self.with(|st| {
                if let Some(fb) = st.bound_framebuffer(target) {
                    st.invalidate(fb, attachments);
                }
            });
        }
    }

    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint) {
        if record!(self, "glBindRenderbuffer", target, renderbuffer) {
            self.with(|st| st.bindings.renderbuffer = renderbuffer);
        }
    }

    fn renderbuffer_storage(&self, target: GLenum, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        if record!(self, "glRenderbufferStorage", target, internal_format, width, height) {
            self.with(|st| match st.bindings.renderbuffer {
                0 => st.raise(gl::INVALID_OPERATION),
                id => st.renderbuffer_storage(id, 0, internal_format, width, height),
            });
        }
    }

    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(
            self,
            "glRenderbufferStorageMultisample",
            target,
            samples,
            internal_format,
            width,
            height
        ) {
            self.with(|st| match st.bindings.renderbuffer {
                0 => st.raise(gl::INVALID_OPERATION),
                id => st.renderbuffer_storage(id, samples, internal_format, width, height),
            });
        }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        if record!(self, "glBindTexture", target, texture) {
            self.with(|st| st.bindings.textures.insert(target, texture));
        }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        if record!(self, "glTexParameteri", target, pname, param) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_param_i(id, pname, param);
                }
            });
        }
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        if record!(self, "glTexParameterf", target, pname, param) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_param_f(id, pname, param);
                }
            });
        }
    }

    fn tex_storage_1d(&self, target: GLenum, levels: GLsizei, internal_format: GLenum, width: GLsizei) {
        if record!(self, "glTexStorage1D", target, levels, internal_format, width) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_storage(id, levels, internal_format, width, 1, 1);
                }
            });
        }
    }

    fn tex_storage_2d(
        &self,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(self, "glTexStorage2D", target, levels, internal_format, width, height) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_storage(id, levels, internal_format, width, height, 1);
                }
            });
        }
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
        if record!(self, "glTexStorage3D", target, levels, internal_format, width, height, depth) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_storage(id, levels, internal_format, width, height, depth);
                }
            });
        }
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
        if record!(
            self,
            "glTexSubImage2D",
            target,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            ty,
            pixels.len()
        ) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_sub_image(id, level, (xoffset, yoffset, 0), (width, height, 1), format, ty, pixels);
                }
            });
        }
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
        if record!(
            self,
            "glTexSubImage3D",
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
            pixels.len()
        ) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.texture_sub_image(
                        id,
                        level,
                        (xoffset, yoffset, zoffset),
                        (width, height, depth),
                        format,
                        ty,
                        pixels,
                    );
                }
            });
        }
    }

    fn generate_mipmap(&self, target: GLenum) {
        if record!(self, "glGenerateMipmap", target) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.generate_mipmap(id);
                }
            });
        }
    }

    fn get_tex_level_parameter_iv(&self, target: GLenum, level: GLint, pname: GLenum, out: &mut [GLint]) {
        if record!(self, "glGetTexLevelParameteriv", target, level, pname) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.level_parameter(id, level, pname, out);
                }
            });
        }
    }

    unsafe fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        if record!(self, "glGetTexImage", target, level, format, ty, out.len()) {
            self.with(|st| {
                if let Some(id) = st.bound_texture(target) {
                    st.get_texture_image(id, level, format, ty, out, false);
                }
            });
        }
    }

    fn bind_vertex_array(&self, array: GLuint) {
        if record!(self, "glBindVertexArray", array) {
            self.with(|st| st.bind_vertex_array(array));
        }
    }

    fn bind_vertex_buffer(&self, binding_index: GLuint, buffer: GLuint, offset: GLintptr, stride: GLsizei) {
        if record!(self, "glBindVertexBuffer", binding_index, buffer, offset, stride) {
            self.with(|st| {
                if let Some(vao) = st.bound_vertex_array() {
                    st.vertex_buffer(vao, binding_index, buffer, offset, stride);
                }
            });
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        if record!(self, "glEnableVertexAttribArray", index) {
            self.with(|st| {
                if let Some(vao) = st.bound_vertex_array() {
                    st.attrib(vao, index).enabled = true;
                }
            });
        }
    }

    fn vertex_attrib_format(
        &self,
        attrib_index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        relative_offset: GLuint,
    ) {
        if record!(self, "glVertexAttribFormat", attrib_index, size, ty, normalized, relative_offset) {
            self.with(|st| {
                if let Some(vao) = st.bound_vertex_array() {
                    let attrib = st.attrib(vao, attrib_index);
                    attrib.size = size;
                    attrib.ty = ty;
                    attrib.normalized = normalized;
                    attrib.relative_offset = relative_offset;
                }
            });
        }
    }

    fn vertex_attrib_binding(&self, attrib_index: GLuint, binding_index: GLuint) {
        if record!(self, "glVertexAttribBinding", attrib_index, binding_index) {
            self.with(|st| {
                if let Some(vao) = st.bound_vertex_array() {
                    st.attrib(vao, attrib_index).binding = binding_index;
                }
            });
        }
    }

    // ARB_direct_state_access.

    fn named_buffer_data(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if record!(self, "glNamedBufferData", buffer, size, usage) {
            self.with(|st| st.buffer_data(buffer, size, data, usage));
        }
    }

    fn named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, data: &[u8]) {
        if record!(self, "glNamedBufferSubData", buffer, offset, data.len()) {
            self.with(|st| st.buffer_sub_data(buffer, offset, data));
        }
    }

    fn get_named_buffer_sub_data(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]) {
        if record!(self, "glGetNamedBufferSubData", buffer, offset, out.len()) {
            self.with(|st| st.get_buffer_sub_data(buffer, offset, out));
        }
    }

    fn map_named_buffer(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        if !record!(self, "glMapNamedBuffer", buffer, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| st.map_buffer(buffer, 0, None))
    }

    fn map_named_buffer_range(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        if !record!(self, "glMapNamedBufferRange", buffer, offset, length, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| st.map_buffer(buffer, offset, Some(length)))
    }

    fn unmap_named_buffer(&self, buffer: GLuint) -> bool {
        record!(self, "glUnmapNamedBuffer", buffer) && self.with(|st| st.unmap_buffer(buffer))
    }

    fn named_framebuffer_texture(&self, framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint) {
        if record!(self, "glNamedFramebufferTexture", framebuffer, attachment, texture, level) {
            let value = (texture != 0).then_some(Attachment::Texture { texture, level });
            self.with(|st| st.attach(framebuffer, attachment, value));
        }
    }

    fn named_framebuffer_renderbuffer(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        if record!(
            self,
            "glNamedFramebufferRenderbuffer",
            framebuffer,
            attachment,
            renderbuffer_target,
            renderbuffer
        ) {
            let value = (renderbuffer != 0).then_some(Attachment::Renderbuffer { renderbuffer });
            self.with(|st| st.attach(framebuffer, attachment, value));
        }
    }

    fn named_framebuffer_draw_buffer(&self, framebuffer: GLuint, buf: GLenum) {
        if record!(self, "glNamedFramebufferDrawBuffer", framebuffer, buf) {
            self.with(|st| st.draw_buffers(framebuffer, &[buf]));
        }
    }

    fn named_framebuffer_draw_buffers(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        if record!(self, "glNamedFramebufferDrawBuffers", framebuffer, bufs) {
            self.with(|st| st.draw_buffers(framebuffer, bufs));
        }
    }

    fn named_framebuffer_read_buffer(&self, framebuffer: GLuint, src: GLenum) {
        if record!(self, "glNamedFramebufferReadBuffer", framebuffer, src) {
            self.with(|st| st.read_buffer(framebuffer, src));
        }
    }

    fn check_named_framebuffer_status(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        if !record!(self, "glCheckNamedFramebufferStatus", framebuffer, target) {
            return 0;
        }
        self.with(|st| st.framebuffer_status(framebuffer))
    }

    fn invalidate_named_framebuffer_data(&self, framebuffer: GLuint, attachments: &[GLenum]) {
        if record!(self, "glInvalidateNamedFramebufferData", framebuffer, attachments) {
            self.with(|st| st.invalidate(framebuffer, attachments));
        }
    }

    fn named_renderbuffer_storage(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(self, "glNamedRenderbufferStorage", renderbuffer, internal_format, width, height) {
            self.with(|st| st.renderbuffer_storage(renderbuffer, 0, internal_format, width, height));
        }
    }

    fn named_renderbuffer_storage_multisample(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(
            self,
            "glNamedRenderbufferStorageMultisample",
            renderbuffer,
            samples,
            internal_format,
            width,
            height
        ) {
            self.with(|st| st.renderbuffer_storage(renderbuffer, samples, internal_format, width, height));
        }
    }

    fn texture_parameter_i(&self, texture: GLuint, pname: GLenum, param: GLint) {
        if record!(self, "glTextureParameteri", texture, pname, param) {
            self.with(|st| st.texture_param_i(texture, pname, param));
        }
    }

    fn texture_parameter_f(&self, texture: GLuint, pname: GLenum, param: GLfloat) {
        if record!(self, "glTextureParameterf", texture, pname, param) {
            self.with(|st| st.texture_param_f(texture, pname, param));
        }
    }

    fn texture_storage_1d(&self, texture: GLuint, levels: GLsizei, internal_format: GLenum, width: GLsizei) {
        if record!(self, "glTextureStorage1D", texture, levels, internal_format, width) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, 1, 1));
        }
    }

    fn texture_storage_2d(
        &self,
        texture: GLuint,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(self, "glTextureStorage2D", texture, levels, internal_format, width, height) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, height, 1));
        }
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
        if record!(self, "glTextureStorage3D", texture, levels, internal_format, width, height, depth) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, height, depth));
        }
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
        if record!(
            self,
            "glTextureSubImage2D",
            texture,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            ty,
            pixels.len()
        ) {
            self.with(|st| {
                st.texture_sub_image(texture, level, (xoffset, yoffset, 0), (width, height, 1), format, ty, pixels)
            });
        }
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
        if record!(
            self,
            "glTextureSubImage3D",
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
            pixels.len()
        ) {
            self.with(|st| {
                st.texture_sub_image(
                    texture,
                    level,
                    (xoffset, yoffset, zoffset),
                    (width, height, depth),
                    format,
                    ty,
                    pixels,
                )
            });
        }
    }

    fn generate_texture_mipmap(&self, texture: GLuint) {
        if record!(self, "glGenerateTextureMipmap", texture) {
            self.with(|st| st.generate_mipmap(texture));
        }
    }

    fn get_texture_image(&self, texture: GLuint, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        if record!(self, "glGetTextureImage", texture, level, format, ty, out.len()) {
            self.with(|st| st.get_texture_image(texture, level, format, ty, out, true));
        }
    }

    fn vertex_array_vertex_buffer(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) {
        if record!(self, "glVertexArrayVertexBuffer", vaobj, binding_index, buffer, offset, stride) {
            self.with(|st| st.vertex_buffer(vaobj, binding_index, buffer, offset, stride));
        }
    }

    fn enable_vertex_array_attrib(&self, vaobj: GLuint, index: GLuint) {
        if record!(self, "glEnableVertexArrayAttrib", vaobj, index) {
            self.with(|st| st.attrib(vaobj, index).enabled = true);
        }
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
        if record!(
            self,
            "glVertexArrayAttribFormat",
            vaobj,
            attrib_index,
            size,
            ty,
            normalized,
            relative_offset
        ) {
            self.with(|st| {
                let attrib = st.attrib(vaobj, attrib_index);
                attrib.size = size;
                attrib.ty = ty;
                attrib.normalized = normalized;
                attrib.relative_offset = relative_offset;
            });
        }
    }

    fn vertex_array_attrib_binding(&self, vaobj: GLuint, attrib_index: GLuint, binding_index: GLuint) {
        if record!(self, "glVertexArrayAttribBinding", vaobj, attrib_index, binding_index) {
            self.with(|st| st.attrib(vaobj, attrib_index).binding = binding_index);
        }
    }

    // EXT_direct_state_access.

    fn named_buffer_data_ext(&self, buffer: GLuint, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        if record!(self, "glNamedBufferDataEXT", buffer, size, usage) {
            self.with(|st| st.buffer_data(buffer, size, data, usage));
        }
    }

    fn named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, data: &[u8]) {
        if record!(self, "glNamedBufferSubDataEXT", buffer, offset, data.len()) {
            self.with(|st| st.buffer_sub_data(buffer, offset, data));
        }
    }

    fn get_named_buffer_sub_data_ext(&self, buffer: GLuint, offset: GLintptr, out: &mut [u8]) {
        if record!(self, "glGetNamedBufferSubDataEXT", buffer, offset, out.len()) {
            self.with(|st| st.get_buffer_sub_data(buffer, offset, out));
        }
    }

    fn map_named_buffer_ext(&self, buffer: GLuint, access: GLenum) -> *mut c_void {
        if !record!(self, "glMapNamedBufferEXT", buffer, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| st.map_buffer(buffer, 0, None))
    }

    fn map_named_buffer_range_ext(
        &self,
        buffer: GLuint,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        if !record!(self, "glMapNamedBufferRangeEXT", buffer, offset, length, access) {
            return std::ptr::null_mut();
        }
        self.with(|st| st.map_buffer(buffer, offset, Some(length)))
    }

    fn unmap_named_buffer_ext(&self, buffer: GLuint) -> bool {
        record!(self, "glUnmapNamedBufferEXT", buffer) && self.with(|st| st.unmap_buffer(buffer))
    }

    fn named_framebuffer_texture_ext(&self, framebuffer: GLuint, attachment: GLenum, texture: GLuint, level: GLint) {
        if record!(self, "glNamedFramebufferTextureEXT", framebuffer, attachment, texture, level) {
            let value = (texture != 0).then_some(Attachment::Texture { texture, level });
            self.with(|st| st.attach(framebuffer, attachment, value));
        }
    }

    fn named_framebuffer_renderbuffer_ext(
        &self,
        framebuffer: GLuint,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: GLuint,
    ) {
        if record!(
            self,
            "glNamedFramebufferRenderbufferEXT",
            framebuffer,
            attachment,
            renderbuffer_target,
            renderbuffer
        ) {
            let value = (renderbuffer != 0).then_some(Attachment::Renderbuffer { renderbuffer });
            self.with(|st| st.attach(framebuffer, attachment, value));
        }
    }

    fn framebuffer_draw_buffer_ext(&self, framebuffer: GLuint, mode: GLenum) {
        if record!(self, "glFramebufferDrawBufferEXT", framebuffer, mode) {
            self.with(|st| st.draw_buffers(framebuffer, &[mode]));
        }
    }

    fn framebuffer_draw_buffers_ext(&self, framebuffer: GLuint, bufs: &[GLenum]) {
        if record!(self, "glFramebufferDrawBuffersEXT", framebuffer, bufs) {
            self.with(|st| st.draw_buffers(framebuffer, bufs));
        }
    }

    fn framebuffer_read_buffer_ext(&self, framebuffer: GLuint, mode: GLenum) {
        if record!(self, "glFramebufferReadBufferEXT", framebuffer, mode) {
            self.with(|st| st.read_buffer(framebuffer, mode));
        }
    }

    fn check_named_framebuffer_status_ext(&self, framebuffer: GLuint, target: GLenum) -> GLenum {
        if !record!(self, "glCheckNamedFramebufferStatusEXT", framebuffer, target) {
            return 0;
        }
        self.with(|st| st.framebuffer_status(framebuffer))
    }

    fn named_renderbuffer_storage_ext(
        &self,
        renderbuffer: GLuint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(self, "glNamedRenderbufferStorageEXT", renderbuffer, internal_format, width, height) {
            self.with(|st| st.renderbuffer_storage(renderbuffer, 0, internal_format, width, height));
        }
    }

    fn named_renderbuffer_storage_multisample_ext(
        &self,
        renderbuffer: GLuint,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        if record!(
            self,
            "glNamedRenderbufferStorageMultisampleEXT",
            renderbuffer,
            samples,
            internal_format,
            width,
            height
        ) {
            self.with(|st| st.renderbuffer_storage(renderbuffer, samples, internal_format, width, height));
        }
    }

    fn texture_parameter_i_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLint) {
        if record!(self, "glTextureParameteriEXT", texture, target, pname, param) {
            self.with(|st| st.texture_param_i(texture, pname, param));
        }
    }

    fn texture_parameter_f_ext(&self, texture: GLuint, target: GLenum, pname: GLenum, param: GLfloat) {
        if record!(self, "glTextureParameterfEXT", texture, target, pname, param) {
            self.with(|st| st.texture_param_f(texture, pname, param));
        }
    }

    fn texture_storage_1d_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        levels: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
    ) {
        if record!(self, "glTextureStorage1DEXT", texture, target, levels, internal_format, width) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, 1, 1));
        }
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
        if record!(
            self,
            "glTextureStorage2DEXT",
            texture,
            target,
            levels,
            internal_format,
            width,
            height
        ) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, height, 1));
        }
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
        if record!(
            self,
            "glTextureStorage3DEXT",
            texture,
            target,
            levels,
            internal_format,
            width,
            height,
            depth
        ) {
            self.with(|st| st.texture_storage(texture, levels, internal_format, width, height, depth));
        }
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
        if record!(
            self,
            "glTextureSubImage2DEXT",
            texture,
            target,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            ty,
            pixels.len()
        ) {
            self.with(|st| {
                st.texture_sub_image(texture, level, (xoffset, yoffset, 0), (width, height, 1), format, ty, pixels)
            });
        }
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
        if record!(
            self,
            "glTextureSubImage3DEXT",
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
            pixels.len()
        ) {
            self.with(|st| {
                st.texture_sub_image(
                    texture,
                    level,
                    (xoffset, yoffset, zoffset),
                    (width, height, depth),
                    format,
                    ty,
                    pixels,
                )
            });
        }
    }

    fn generate_texture_mipmap_ext(&self, texture: GLuint, target: GLenum) {
        if record!(self, "glGenerateTextureMipmapEXT", texture, target) {
            self.with(|st| st.generate_mipmap(texture));
        }
    }

    fn get_texture_level_parameter_iv_ext(
        &self,
        texture: GLuint,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        out: &mut [GLint],
    ) {
        if record!(self, "glGetTextureLevelParameterivEXT", texture, target, level, pname) {
            self.with(|st| st.level_parameter(texture, level, pname, out));
        }
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
        if record!(self, "glGetTextureImageEXT", texture, target, level, format, ty, out.len()) {
            self.with(|st| st.get_texture_image(texture, level, format, ty, out, false));
        }
    }

    fn vertex_array_bind_vertex_buffer_ext(
        &self,
        vaobj: GLuint,
        binding_index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        stride: GLsizei,
    ) {
        if record!(
            self,
            "glVertexArrayBindVertexBufferEXT",
            vaobj,
            binding_index,
            buffer,
            offset,
            stride
        ) {
            self.with(|st| st.vertex_buffer(vaobj, binding_index, buffer, offset, stride));
        }
    }

    fn enable_vertex_array_attrib_ext(&self, vaobj: GLuint, index: GLuint) {
        if record!(self, "glEnableVertexArrayAttribEXT", vaobj, index) {
            self.with(|st| st.attrib(vaobj, index).enabled = true);
        }
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
        if record!(
            self,
            "glVertexArrayVertexAttribFormatEXT",
            vaobj,
            attrib_index,
            size,
            ty,
            normalized,
            relative_offset
        ) {
            self.with(|st| {
                let attrib = st.attrib(vaobj, attrib_index);
                attrib.size = size;
                attrib.ty = ty;
                attrib.normalized = normalized;
                attrib.relative_offset = relative_offset;
            });
        }
    }

    fn vertex_array_vertex_attrib_binding_ext(&self, vaobj: GLuint, attrib_index: GLuint, binding_index: GLuint) {
        if record!(
            self,
            "glVertexArrayVertexAttribBindingEXT",
            vaobj,
            attrib_index,
            binding_index
        ) {
            self.with(|st| st.attrib(vaobj, attrib_index).binding = binding_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::check_error;
    use crate::error::GlError;

    #[test]
    fn records_calls_and_applies_state() {
        let gl = FakeGl::desktop();
        gl.depth_mask(false);
        assert_eq!(gl.call_names(), vec!["glDepthMask"]);
        assert_eq!(gl.calls()[0].args, "false");
        assert!(!gl.fixed().depth_mask);
    }

    #[test]
    fn injected_failure_skips_the_call_and_reports_once() {
        let gl = FakeGl::desktop();
        gl.fail_next("glCullFace", gl::INVALID_ENUM);
        gl.cull_face(gl::FRONT);
        assert_eq!(gl.fixed().cull_face, gl::BACK);
        assert_eq!(
            check_error(&gl, "glCullFace"),
            Err(GlError::Driver {
                call: "glCullFace",
                code: gl::INVALID_ENUM
            })
        );
        assert_eq!(check_error(&gl, "glCullFace"), Ok(()));
    }

    #[test]
    fn legacy_calls_need_a_bound_object() {
        let gl = FakeGl::desktop();
        gl.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_OPERATION);

        gl.bind_buffer(gl::ARRAY_BUFFER, 3);
        gl.buffer_data(gl::ARRAY_BUFFER, 4, Some(&[1, 2, 3, 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::NO_ERROR);
        assert_eq!(gl.objects().buffers[&3].data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn texture_sub_image_writes_rows_into_storage() {
        let gl = FakeGl::desktop();
        gl.texture_storage_2d(9, 1, gl::RGBA8, 2, 2);
        let pixel = [0xAA, 0xBB, 0xCC, 0xDD];
        unsafe { gl.texture_sub_image_2d(9, 0, 1, 1, 1, 1, gl::RGBA, gl::UNSIGNED_BYTE, &pixel) };
        assert_eq!(gl.get_error(), gl::NO_ERROR);

        let mut out = [0u8; 16];
        gl.get_texture_image(9, 0, gl::RGBA, gl::UNSIGNED_BYTE, &mut out);
        assert_eq!(&out[12..16], &pixel);
        assert_eq!(&out[..12], &[0u8; 12]);
    }

    #[test]
    fn texture_sub_image_honours_unpack_row_length() {
        let gl = FakeGl::desktop();
        gl.texture_storage_2d(9, 1, gl::R8, 2, 2);
        gl.seed(|s| {
            s.unpack.alignment = 1;
            s.unpack.row_length = 3;
        });
        // Rows of 3 bytes, only the first 2 of each are uploaded.
        let pixels = [1, 2, 0xFF, 3, 4];
        unsafe { gl.texture_sub_image_2d(9, 0, 0, 0, 2, 2, gl::RED, gl::UNSIGNED_BYTE, &pixels) };
        assert_eq!(gl.get_error(), gl::NO_ERROR);
        assert_eq!(gl.objects().textures[&9].levels[0].data, vec![1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "read past the client slice")]
    fn short_pixel_upload_is_caught() {
        let gl = FakeGl::desktop();
        gl.texture_storage_2d(9, 1, gl::RGBA8, 2, 2);
        unsafe { gl.texture_sub_image_2d(9, 0, 0, 0, 2, 2, gl::RGBA, gl::UNSIGNED_BYTE, &[0; 4]) };
    }

    #[test]
    fn bounded_readback_into_a_short_slice_is_an_error() {
        let gl = FakeGl::desktop();
        gl.texture_storage_2d(9, 1, gl::RGBA8, 2, 2);
        let mut out = [0u8; 8];
        gl.get_texture_image(9, 0, gl::RGBA, gl::UNSIGNED_BYTE, &mut out);
        assert_eq!(gl.get_error(), gl::INVALID_OPERATION);
    }

    #[test]
    fn short_buffer_data_is_rejected() {
        let gl = FakeGl::desktop();
        gl.named_buffer_data(3, 64, Some(&[1, 2, 3, 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::INVALID_VALUE);
        assert!(!gl.objects().buffers.contains_key(&3));

        gl.named_buffer_data(3, 2, Some(&[1, 2, 3, 4]), gl::STATIC_DRAW);
        assert_eq!(gl.get_error(), gl::NO_ERROR);
        assert_eq!(gl.objects().buffers[&3].data, vec![1, 2]);
    }

    #[test]
    fn element_buffer_binding_belongs_to_the_vertex_array() {
        let gl = FakeGl::desktop();
        gl.bind_vertex_array(5);
        gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 9);
        gl.bind_vertex_array(0);
        assert_eq!(gl.bindings().buffers[&gl::ELEMENT_ARRAY_BUFFER], 0);

        gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 4);
        gl.bind_vertex_array(5);
        assert_eq!(gl.bindings().buffers[&gl::ELEMENT_ARRAY_BUFFER], 9);
        gl.bind_vertex_array(0);
        assert_eq!(gl.bindings().buffers[&gl::ELEMENT_ARRAY_BUFFER], 4);
        assert_eq!(gl.objects().vertex_arrays[&5].element_buffer, 9);
    }

    #[test]
    fn missing_entry_points_raise_invalid_operation() {
        let gl = FakeGl::new(Profile::es(3, 2));
        gl.bind_buffer(gl::ARRAY_BUFFER, 1);
        let mut out = [0u8; 4];
        gl.get_buffer_sub_data(gl::ARRAY_BUFFER, 0, &mut out);
        assert_eq!(gl.get_error(), gl::INVALID_OPERATION);
        assert_eq!(gl.count("glGetBufferSubData"), 1);
    }
}
