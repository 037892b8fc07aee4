// headless-gl/build.rs
//
//! The `headless-gl` build script.

use cfg_aliases::cfg_aliases;
use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::PathBuf;

fn main() {
    // Setup aliases for #[cfg] checks
    cfg_aliases! {
        // Platforms
        posix: { all(unix, not(target_os = "windows")) },

        // Features
        osmesa: { feature = "osmesa" },
    }

    let dest = PathBuf::from(&env::var("OUT_DIR").unwrap());

    // Generate EGL bindings. Only the types and constants are used; entry points are resolved at
    // runtime from whichever EGL library the caller names.
    let mut file = File::create(dest.join("egl_bindings.rs")).unwrap();
    let registry = Registry::new(Api::Egl, (1, 5), Profile::Core, Fallbacks::All, []);
    registry.write_bindings(StructGenerator, &mut file).unwrap();

    // Generate GL bindings.
    let mut file = File::create(dest.join("gl_bindings.rs")).unwrap();
    let registry = Registry::new(Api::Gl, (3, 3), Profile::Core, Fallbacks::All, []);
    registry.write_bindings(StructGenerator, &mut file).unwrap();
}
