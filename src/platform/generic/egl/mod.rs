// headless-gl/src/platform/generic/egl/mod.rs
//
//! The EGL backend, using ANGLE's platform display when it is available.

pub mod context;
pub(crate) mod display;
pub(crate) mod error;
pub(crate) mod ffi;
