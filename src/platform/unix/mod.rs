// headless-gl/src/platform/unix/mod.rs
//
//! Support for POSIX systems, where native libraries are loaded with `dlopen`.

pub mod library;
