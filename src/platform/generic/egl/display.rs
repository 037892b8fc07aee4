// headless-gl/src/platform/generic/egl/display.rs
//
//! Obtaining and initializing an EGL display, and choosing a config on it.

use super::error::ToWindowingApiError;
use super::ffi::{EglFunctions, ANGLE_PLATFORM_EXTENSION, EGL_PLATFORM_ANGLE_ANGLE};
use crate::egl;
use crate::egl::types::{EGLConfig, EGLDisplay, EGLint};
use crate::{Error, GLVersion};

use log::debug;
use std::ffi::CStr;
use std::os::raw::c_void;
use std::ptr;

const RGB_CHANNEL_BIT_DEPTH: EGLint = 8;
const DEPTH_BIT_DEPTH: EGLint = 8;

/// An initialized EGL display.
///
/// Displays are process-wide: every handle asking for the same native display gets the same
/// `EGLDisplay` back, so this is never terminated.
pub(crate) struct Display {
    pub(crate) egl_display: EGLDisplay,
    pub(crate) version: (EGLint, EGLint),
    pub(crate) uses_angle: bool,
}

impl Display {
    /// Obtains the display to render on and initializes it.
    ///
    /// ANGLE's platform display is preferred when the client extensions advertise it; otherwise
    /// the default display is used.
    pub(crate) unsafe fn open(egl: &EglFunctions) -> Result<Display, Error> {
        let extensions = client_extensions(egl);
        let uses_angle = has_extension(&extensions, ANGLE_PLATFORM_EXTENSION);

        let egl_display = if uses_angle {
            let get_platform_display = egl.GetPlatformDisplay.ok_or_else(|| {
                Error::SymbolNotFound("eglGetPlatformDisplay".to_owned())
            })?;
            debug!("using the ANGLE platform display");
            get_platform_display(EGL_PLATFORM_ANGLE_ANGLE,
                                 egl::DEFAULT_DISPLAY as *mut c_void,
                                 ptr::null())
        } else {
            debug!("{} unavailable, using the default display", ANGLE_PLATFORM_EXTENSION);
            (egl.GetDisplay)(egl::DEFAULT_DISPLAY)
        };
        if egl_display == egl::NO_DISPLAY {
            return Err(Error::NoDisplay((egl.GetError)().to_windowing_api_error()));
        }

        let (mut major, mut minor) = (0, 0);
        if (egl.Initialize)(egl_display, &mut major, &mut minor) == egl::FALSE {
            let err = (egl.GetError)().to_windowing_api_error();
            return Err(Error::DisplayInitializationFailed(err));
        }
        debug!("initialized EGL {}.{}", major, minor);

        Ok(Display { egl_display, version: (major, minor), uses_angle })
    }

    /// Chooses a pbuffer-capable, desktop-GL-renderable config with 8-bit color and depth.
    pub(crate) unsafe fn choose_config(&self, egl: &EglFunctions) -> Result<EGLConfig, Error> {
        let attributes = config_attributes();
        let (mut egl_config, mut config_count) = (ptr::null(), 0);
        let result = (egl.ChooseConfig)(self.egl_display,
                                        attributes.as_ptr(),
                                        &mut egl_config,
                                        1,
                                        &mut config_count);
        if result == egl::FALSE {
            let err = (egl.GetError)().to_windowing_api_error();
            return Err(Error::PixelFormatSelectionFailed(err));
        }
        if config_count == 0 || egl_config.is_null() {
            return Err(Error::NoPixelFormatFound);
        }
        Ok(egl_config)
    }
}

/// Returns the client extension string, which is queried on no display at all.
///
/// Libraries without client extension support fail that query; that reads as no extensions.
unsafe fn client_extensions(egl: &EglFunctions) -> String {
    let extensions = (egl.QueryString)(egl::NO_DISPLAY, egl::EXTENSIONS as EGLint);
    if extensions.is_null() {
        return String::new();
    }
    CStr::from_ptr(extensions).to_string_lossy().into_owned()
}

pub(crate) fn has_extension(extensions: &str, name: &str) -> bool {
    extensions.split_whitespace().any(|extension| extension == name)
}

pub(crate) fn config_attributes() -> [EGLint; 13] {
    [
        egl::SURFACE_TYPE as EGLint,    egl::PBUFFER_BIT as EGLint,
        egl::BLUE_SIZE as EGLint,       RGB_CHANNEL_BIT_DEPTH,
        egl::GREEN_SIZE as EGLint,      RGB_CHANNEL_BIT_DEPTH,
        egl::RED_SIZE as EGLint,        RGB_CHANNEL_BIT_DEPTH,
        egl::DEPTH_SIZE as EGLint,      DEPTH_BIT_DEPTH,
        egl::RENDERABLE_TYPE as EGLint, egl::OPENGL_BIT as EGLint,
        egl::NONE as EGLint,
    ]
}

pub(crate) fn context_attributes(version: GLVersion) -> [EGLint; 7] {
    [
        egl::CONTEXT_MAJOR_VERSION as EGLint,       version.major as EGLint,
        egl::CONTEXT_MINOR_VERSION as EGLint,       version.minor as EGLint,
        egl::CONTEXT_OPENGL_PROFILE_MASK as EGLint,
        egl::CONTEXT_OPENGL_CORE_PROFILE_BIT as EGLint,
        egl::NONE as EGLint,
    ]
}
