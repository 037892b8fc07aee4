// headless-gl/src/platform/generic/osmesa/mod.rs
//
//! Bindings to the OSMesa software rendering library.

#[cfg(osmesa)]
pub mod context;
pub mod format;
