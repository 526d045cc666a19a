//! Entry point resolution for the process's current GL context.

use std::ffi::c_void;
use std::sync::Once;

pub(crate) static GL_LOADER_INIT: Once = Once::new();

/// Resolve a symbol through `gl_loader`, initialising the platform library
/// exactly once.
pub(crate) fn system_proc_address(symbol: &str) -> *const c_void {
    GL_LOADER_INIT.call_once(|| {
        gl_loader::init_gl();
    });
    gl_loader::get_proc_address(symbol).cast()
}

/// Resolve `name` through `loadfn` and reinterpret it as a function pointer.
///
/// # Safety
///
/// `F` must be an `extern "system" fn` type whose signature matches the
/// driver's definition of `name`.
pub(crate) unsafe fn load_fn<F: Copy>(
    loadfn: &mut dyn FnMut(&str) -> *const c_void,
    name: &str,
) -> Option<F> {
    debug_assert_eq!(
        std::mem::size_of::<F>(),
        std::mem::size_of::<*const c_void>()
    );
    let ptr = loadfn(name);
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { std::mem::transmute_copy::<*const c_void, F>(&ptr) })
    }
}
