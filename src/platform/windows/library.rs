// headless-gl/src/platform/windows/library.rs
//
//! Runtime loading of DLLs via `LoadLibraryExA`.

use crate::Error;

use log::{debug, warn};
use std::ffi::CString;
use std::os::raw::c_void;
use std::path::Path;
use std::ptr;
use winapi::shared::minwindef::{DWORD, FALSE, HMODULE};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::{self, LOAD_LIBRARY_SEARCH_DEFAULT_DIRS};
use winapi::um::libloaderapi::LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR;

/// The GL library loaded when the caller doesn't name one.
pub const DEFAULT_GL_LIBRARY: &str = "opengl32";
/// The EGL library loaded when the caller doesn't name one.
pub const DEFAULT_EGL_LIBRARY: &str = "libEGL";

/// A DLL loaded into the process.
///
/// The library is unloaded when this value is dropped.
pub struct DynamicLibrary {
    module: HMODULE,
    name: String,
}

impl DynamicLibrary {
    /// Loads the DLL with the given name or path.
    ///
    /// The default DLL directories are always searched. For an absolute path, the directory the
    /// DLL lives in is searched too, so that DLLs shipped next to it (ANGLE's `libGLESv2` next to
    /// `libEGL`, for example) resolve.
    pub fn open(name: &str) -> Result<DynamicLibrary, Error> {
        let c_name = CString::new(name).map_err(|_| Error::NoLibraryFound {
            name: name.to_owned(),
            reason: "the name contains a NUL byte".to_owned(),
        })?;

        unsafe {
            let module = libloaderapi::LoadLibraryExA(c_name.as_ptr(),
                                                      ptr::null_mut(),
                                                      load_flags(name));
            if module.is_null() {
                return Err(Error::NoLibraryFound {
                    name: name.to_owned(),
                    reason: format!("error code {}", GetLastError()),
                });
            }

            debug!("loaded {}", name);
            Ok(DynamicLibrary { module, name: name.to_owned() })
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
            let symbol = libloaderapi::GetProcAddress(self.module, symbol_name.as_ptr());
            if symbol.is_null() {
                None
            } else {
                Some(symbol as *mut c_void)
            }
        }
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        unsafe {
            if libloaderapi::FreeLibrary(self.module) == FALSE {
                warn!("FreeLibrary({}) failed: error code {}", self.name, GetLastError());
            }
        }
    }
}

fn load_flags(name: &str) -> DWORD {
    let mut flags = LOAD_LIBRARY_SEARCH_DEFAULT_DIRS;
    // The loader rejects this flag for relative paths.
    if Path::new(name).is_absolute() {
        flags |= LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR;
    }
    flags
}
