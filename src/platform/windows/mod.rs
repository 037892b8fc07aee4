// headless-gl/src/platform/windows/mod.rs
//
//! Windows support, where native libraries are loaded with `LoadLibraryExA`.

pub mod library;
