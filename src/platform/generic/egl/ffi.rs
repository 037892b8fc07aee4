// headless-gl/src/platform/generic/egl/ffi.rs
//
//! The EGL entry points this backend calls, resolved at runtime from a loaded EGL library.

use crate::egl::types::{EGLAttrib, EGLBoolean, EGLConfig, EGLContext, EGLDisplay, EGLSurface};
use crate::egl::types::{EGLenum, EGLint};
use crate::egl::EGLNativeDisplayType;
use crate::platform::default::library::DynamicLibrary;
use crate::Error;

use std::ffi::CString;
use std::mem::transmute as cast;
use std::os::raw::{c_char, c_void};

pub const EGL_PLATFORM_ANGLE_ANGLE: EGLenum = 0x3202;

pub const ANGLE_PLATFORM_EXTENSION: &str = "EGL_ANGLE_platform_angle";

/// The entry points required to create, bind and destroy a context.
///
/// Every field except `GetPlatformDisplay` is resolved by exact symbol name from the EGL library
/// when the table is built; building fails if any of them is missing.
#[allow(non_snake_case)]
pub(crate) struct EglFunctions {
    pub(crate) GetError: unsafe extern "system" fn() -> EGLint,
    pub(crate) GetDisplay: unsafe extern "system" fn(display_id: EGLNativeDisplayType)
                                                     -> EGLDisplay,
    pub(crate) Initialize: unsafe extern "system" fn(dpy: EGLDisplay,
                                                     major: *mut EGLint,
                                                     minor: *mut EGLint)
                                                     -> EGLBoolean,
    pub(crate) ChooseConfig: unsafe extern "system" fn(dpy: EGLDisplay,
                                                       attrib_list: *const EGLint,
                                                       configs: *mut EGLConfig,
                                                       config_size: EGLint,
                                                       num_config: *mut EGLint)
                                                       -> EGLBoolean,
    pub(crate) BindAPI: unsafe extern "system" fn(api: EGLenum) -> EGLBoolean,
    pub(crate) CreateContext: unsafe extern "system" fn(dpy: EGLDisplay,
                                                        config: EGLConfig,
                                                        share_context: EGLContext,
                                                        attrib_list: *const EGLint)
                                                        -> EGLContext,
    pub(crate) DestroyContext: unsafe extern "system" fn(dpy: EGLDisplay, ctx: EGLContext)
                                                         -> EGLBoolean,
    pub(crate) MakeCurrent: unsafe extern "system" fn(dpy: EGLDisplay,
                                                      draw: EGLSurface,
                                                      read: EGLSurface,
                                                      ctx: EGLContext)
                                                      -> EGLBoolean,
    pub(crate) GetCurrentContext: unsafe extern "system" fn() -> EGLContext,
    pub(crate) GetProcAddress: unsafe extern "system" fn(procname: *const c_char)
                                                         -> *const c_void,
    pub(crate) QueryString: unsafe extern "system" fn(dpy: EGLDisplay, name: EGLint)
                                                      -> *const c_char,

    // An EGL 1.5 function, looked up through `eglGetProcAddress`. Only needed when the library
    // offers ANGLE's platform display.
    pub(crate) GetPlatformDisplay: Option<unsafe extern "system" fn(platform: EGLenum,
                                                                    native_display: *mut c_void,
                                                                    attrib_list: *const EGLAttrib)
                                                                    -> EGLDisplay>,
}

impl EglFunctions {
    pub(crate) fn load(library: &DynamicLibrary) -> Result<EglFunctions, Error> {
        let get = |name: &str| {
            library.symbol(name).ok_or_else(|| Error::SymbolNotFound(name.to_owned()))
        };

        unsafe {
            let mut functions = EglFunctions {
                GetError: cast(get("eglGetError")?),
                GetDisplay: cast(get("eglGetDisplay")?),
                Initialize: cast(get("eglInitialize")?),
                ChooseConfig: cast(get("eglChooseConfig")?),
                BindAPI: cast(get("eglBindAPI")?),
                CreateContext: cast(get("eglCreateContext")?),
                DestroyContext: cast(get("eglDestroyContext")?),
                MakeCurrent: cast(get("eglMakeCurrent")?),
                GetCurrentContext: cast(get("eglGetCurrentContext")?),
                GetProcAddress: cast(get("eglGetProcAddress")?),
                QueryString: cast(get("eglQueryString")?),
                GetPlatformDisplay: None,
            };
            functions.GetPlatformDisplay = cast(functions.get_proc_address("eglGetPlatformDisplay"));
            Ok(functions)
        }
    }

    /// Looks a function up with `eglGetProcAddress`, returning null if it's unknown.
    pub(crate) fn get_proc_address(&self, symbol_name: &str) -> *const c_void {
        match CString::new(symbol_name) {
            Ok(symbol_name) => unsafe { (self.GetProcAddress)(symbol_name.as_ptr()) },
            Err(_) => std::ptr::null(),
        }
    }
}
