//! The three named-object paths must leave the same objects behind. Only the
//! bind-emulated one may leave bind points changed.

use uvgl::{DirectStateAccess, DsaStrategy, GlContext, GlDriver, GlError, RasterizerState};
use uvgl_core::testing::{FakeGl, Objects, Profile};
use uvgl_core::{Capabilities, PolygonMode};
use uvgl_dsa::{ArbDsa, BindEmulatedDsa, ExtDsa};

const PIXELS: [u8; 16] = [
    255, 0, 0, 255, 0, 255, 0, 255, //
    0, 0, 255, 255, 255, 255, 255, 255,
];

/// Buffer, texture, renderbuffer, framebuffer and vertex array setup as a
/// renderer would do it.
fn build_scene(dsa: &dyn DirectStateAccess, gl: &dyn GlDriver) -> uvgl_core::Result<()> {
    // Vertex buffer, half written directly, half through a mapping.
    dsa.named_buffer_data(gl, 1, gl::ARRAY_BUFFER, 32, None, gl::STATIC_DRAW)?;
    let head: Vec<u8> = (1..=16).collect();
    dsa.named_buffer_sub_data(gl, 1, gl::ARRAY_BUFFER, 0, &head)?;
    let ptr = dsa.map_named_buffer_range(gl, 1, gl::ARRAY_BUFFER, 16, 16, gl::MAP_WRITE_BIT)?;
    assert!(!ptr.is_null());
    unsafe { std::ptr::write_bytes(ptr.cast::<u8>(), 0xAA, 16) };
    assert!(dsa.unmap_named_buffer(gl, 1, gl::ARRAY_BUFFER)?);

    // Colour texture.
    dsa.texture_storage_2d(gl, 2, gl::TEXTURE_2D, 2, gl::RGBA8, 2, 2)?;
    dsa.texture_parameter_i(gl, 2, gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32)?;
    dsa.texture_parameter_f(gl, 2, gl::TEXTURE_2D, gl::TEXTURE_MIN_LOD, -1.0)?;
    dsa.texture_sub_image_2d(gl, 2, gl::TEXTURE_2D, 0, 0, 0, 2, 2, gl::RGBA, gl::UNSIGNED_BYTE, &PIXELS)?;
    dsa.generate_texture_mipmap(gl, 2, gl::TEXTURE_2D)?;

    // Depth-stencil renderbuffer and the framebuffer using both.
    dsa.named_renderbuffer_storage(gl, 3, gl::DEPTH24_STENCIL8, 2, 2)?;
    dsa.named_framebuffer_texture(gl, 4, gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, 2, 0)?;
    dsa.named_framebuffer_renderbuffer(
        gl,
        4,
        gl::FRAMEBUFFER,
        gl::DEPTH_STENCIL_ATTACHMENT,
        gl::RENDERBUFFER,
        3,
    )?;
    dsa.named_framebuffer_draw_buffers(gl, 4, &[gl::COLOR_ATTACHMENT0])?;
    dsa.named_framebuffer_read_buffer(gl, 4, gl::COLOR_ATTACHMENT0)?;
    let status = dsa.check_named_framebuffer_status(gl, 4, gl::FRAMEBUFFER)?;
    assert_eq!(status, gl::FRAMEBUFFER_COMPLETE);

    // Vertex array reading vec4 positions from buffer 1.
    dsa.vertex_array_vertex_buffer(gl, 5, 0, 1, 0, 16)?;
    dsa.vertex_array_attrib_format(gl, 5, 0, 4, gl::FLOAT, false, 0)?;
    dsa.vertex_array_attrib_binding(gl, 5, 0, 0)?;
    dsa.enable_vertex_array_attrib(gl, 5, 0)?;
    Ok(())
}

fn run(dsa: &dyn DirectStateAccess, gl: &FakeGl) -> Objects {
    build_scene(dsa, gl).unwrap();

    let mut vertices = [0u8; 32];
    dsa.get_named_buffer_sub_data(gl, 1, gl::ARRAY_BUFFER, 0, &mut vertices)
        .unwrap();
    assert_eq!(vertices[15], 16);
    assert_eq!(vertices[16..], [0xAA; 16]);

    let mut texels = [0u8; 16];
    dsa.get_texture_image(gl, 2, gl::TEXTURE_2D, 0, gl::RGBA, gl::UNSIGNED_BYTE, &mut texels)
        .unwrap();
    assert_eq!(texels, PIXELS);

    gl.objects()
}

#[test]
fn arb_and_bind_emulation_build_the_same_objects() {
    uvgl_core::logging::init();

    let arb_gl = FakeGl::desktop();
    let caps = Capabilities::probe(&arb_gl).unwrap();
    let arb = run(&ArbDsa::new(&caps), &arb_gl);
    assert!(arb_gl.bindings().is_default());

    let emulated_gl = FakeGl::desktop();
    let emulated = run(&BindEmulatedDsa::new(&caps), &emulated_gl);

    assert_eq!(arb, emulated);
    assert!(arb.textures[&2].mipmaps_generated);
    assert_eq!(arb.vertex_arrays[&5].buffers[&0], (1, 0, 16));

    let bindings = emulated_gl.bindings();
    assert!(!bindings.is_default());
    assert_eq!(bindings.vertex_array, 5);
    assert_eq!(bindings.read_framebuffer, 4);
}

#[test]
fn ext_path_matches_arb() {
    let arb_gl = FakeGl::desktop();
    let caps = Capabilities::probe(&arb_gl).unwrap();
    let arb = run(&ArbDsa::new(&caps), &arb_gl);

    let ext_gl = FakeGl::desktop();
    let ext = run(&ExtDsa, &ext_gl);

    assert_eq!(arb, ext);
    assert!(ext_gl.bindings().is_default());
    assert!(ext_gl.call_names().iter().all(|name| !name.starts_with("glBind")));
}

#[test]
fn invalidation_differs_only_on_the_ext_path() {
    let gl = FakeGl::desktop();
    let caps = Capabilities::probe(&gl).unwrap();
    let attachments = [gl::COLOR_ATTACHMENT0];

    ArbDsa::new(&caps)
        .invalidate_named_framebuffer_data(&gl, 4, gl::FRAMEBUFFER, &attachments)
        .unwrap();
    BindEmulatedDsa::new(&caps)
        .invalidate_named_framebuffer_data(&gl, 6, gl::FRAMEBUFFER, &attachments)
        .unwrap();
    let objects = gl.objects();
    assert_eq!(objects.framebuffers[&4].invalidated, attachments);
    assert_eq!(objects.framebuffers[&6].invalidated, attachments);

    let err = ExtDsa
        .invalidate_named_framebuffer_data(&gl, 4, gl::FRAMEBUFFER, &attachments)
        .unwrap_err();
    assert_eq!(
        err,
        GlError::Unsupported {
            op: "InvalidateNamedFramebufferData",
            strategy: DsaStrategy::Ext
        }
    );
}

#[test]
fn es_context_runs_the_scene_through_bind_emulation() {
    let mut ctx = GlContext::new(FakeGl::new(Profile::es(3, 2))).unwrap();
    assert_eq!(ctx.dsa_strategy(), DsaStrategy::BindEmulated);
    assert!(!ctx.caps().supports_polygon_mode);

    let (dsa, gl) = ctx.dsa();
    build_scene(dsa, gl).unwrap();
    ctx.reset_bind_points().unwrap();
    assert!(ctx.driver().bindings().is_default());

    assert!(ctx.apply_rasterizer_state(&RasterizerState::CULL_BACK).unwrap());
    assert_eq!(ctx.state().polygon_mode(), PolygonMode::Fill);
    let err = ctx
        .apply_rasterizer_state(&RasterizerState::WIREFRAME)
        .unwrap_err();
    assert!(matches!(err, GlError::InvalidArgument { what: "polygon mode", .. }));
}

#[test]
fn desktop_context_leaves_bind_points_alone() {
    let ctx = GlContext::new(FakeGl::desktop()).unwrap();
    assert_eq!(ctx.dsa_strategy(), DsaStrategy::Arb);

    let (dsa, gl) = ctx.dsa();
    build_scene(dsa, gl).unwrap();
    assert!(ctx.driver().bindings().is_default());
}
