// headless-gl/src/lib.rs
//
//! Headless OpenGL context creation.
//!
//! This crate creates OpenGL contexts that render off-screen, without a window or a connection to
//! a window server. Two backends are available:
//!
//! * EGL, preferring ANGLE's platform display when the loaded EGL library advertises it. The GL
//!   and EGL libraries are loaded at runtime from caller-supplied names.
//!
//! * OSMesa, Mesa's CPU rasterizer, rendering into a pixel buffer owned by the context (behind the
//!   `osmesa` feature).
//!
//! Both backends produce a handle implementing [`HeadlessContext`], which can be made current,
//! made not current, queried for OpenGL function addresses, and released.
//!
//! "Current context" is per-thread state in both native APIs. Handles are therefore neither `Send`
//! nor `Sync`; making a context current on one thread and issuing GL calls from another is not
//! possible through this crate.

pub mod platform;
pub use platform::generic::egl::context::{EglContext, EglContextDescriptor, EglMode};
#[cfg(osmesa)]
pub use platform::generic::osmesa::context::{OsMesaContext, OsMesaContextDescriptor};
pub use platform::generic::osmesa::format::PixelFormat;

pub mod error;
pub use crate::error::{Error, WindowingApiError};

mod context;
pub use crate::context::{create_context, Backend, ContextDescriptor, CurrentContextGuard};
pub use crate::context::HeadlessContext;

mod info;
pub use crate::info::{GLApi, GLVersion};

#[allow(dead_code, clippy::all)]
mod gl {
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

#[allow(dead_code, non_camel_case_types, clippy::all)]
mod egl {
    use std::os::raw::{c_long, c_void};
    pub type khronos_utime_nanoseconds_t = khronos_uint64_t;
    pub type khronos_uint64_t = u64;
    pub type khronos_ssize_t = c_long;
    pub type EGLint = i32;
    pub type EGLNativeDisplayType = *const c_void;
    pub type EGLNativePixmapType = *const c_void;
    pub type EGLNativeWindowType = *const c_void;
    pub type NativeDisplayType = EGLNativeDisplayType;
    pub type NativePixmapType = EGLNativePixmapType;
    pub type NativeWindowType = EGLNativeWindowType;
    include!(concat!(env!("OUT_DIR"), "/egl_bindings.rs"));
}
