// headless-gl/src/platform/mod.rs
//
//! Platform-specific pieces, and the backends built on top of them.
//!
//! Backends only ever import `platform::default`, so they never branch on the target platform
//! themselves.

pub mod generic;

#[cfg(posix)]
pub mod unix;
#[cfg(posix)]
pub use unix as default;

#[cfg(windows)]
pub mod windows;
#[cfg(windows)]
pub use windows as default;
