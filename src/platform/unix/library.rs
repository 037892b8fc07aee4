// headless-gl/src/platform/unix/library.rs
//
//! Runtime loading of shared objects via `dlopen`.

use crate::Error;

use libc::{dlclose, dlerror, dlopen, dlsym, RTLD_LAZY};
use log::{debug, warn};
use std::ffi::{CStr, CString};
use std::os::raw::c_void;

/// The GL library loaded when the caller doesn't name one.
pub const DEFAULT_GL_LIBRARY: &str = "libGL.so";
/// The EGL library loaded when the caller doesn't name one.
pub const DEFAULT_EGL_LIBRARY: &str = "libEGL.so";

/// A shared object loaded into the process.
///
/// The library is unloaded when this value is dropped. The dynamic loader reference-counts
/// libraries, so unloading only drops this handle's reference.
pub struct DynamicLibrary {
    handle: *mut c_void,
    name: String,
}

impl DynamicLibrary {
    /// Loads the library with the given name or path, resolving symbols lazily.
    pub fn open(name: &str) -> Result<DynamicLibrary, Error> {
        let c_name = CString::new(name).map_err(|_| Error::NoLibraryFound {
            name: name.to_owned(),
            reason: "the name contains a NUL byte".to_owned(),
        })?;

        unsafe {
            let handle = dlopen(c_name.as_ptr(), RTLD_LAZY);
            if handle.is_null() {
                return Err(Error::NoLibraryFound { name: name.to_owned(), reason: last_error() });
            }

            debug!("loaded {}", name);
            Ok(DynamicLibrary { handle, name: name.to_owned() })
        }
    }

    /// The name this library was opened with.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the address of the named symbol, or `None` if the library doesn't export it.
    pub fn symbol(&self, symbol_name: &str) -> Option<*mut c_void> {
        let symbol_name = CString::new(symbol_name).ok()?;
        unsafe {
            let symbol = dlsym(self.handle, symbol_name.as_ptr());
            if symbol.is_null() {
                None
            } else {
                Some(symbol)
            }
        }
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        unsafe {
            if dlclose(self.handle) != 0 {
                warn!("dlclose({}) failed: {}", self.name, last_error());
            }
        }
    }
}

fn last_error() -> String {
    unsafe {
        let message = dlerror();
        if message.is_null() {
            String::new()
        } else {
            CStr::from_ptr(message).to_string_lossy().into_owned()
        }
    }
}
