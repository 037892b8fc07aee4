// headless-gl/src/platform/generic/egl/context.rs
//
//! Standalone EGL contexts.

use super::display::{self, Display};
use super::error::ToWindowingApiError;
use super::ffi::EglFunctions;
use crate::context::HeadlessContext;
use crate::egl;
use crate::egl::types::{EGLConfig, EGLContext, EGLDisplay, EGLint};
use crate::platform::default::library::{DynamicLibrary, DEFAULT_EGL_LIBRARY, DEFAULT_GL_LIBRARY};
use crate::{Error, GLApi, GLVersion};

use log::{debug, warn};
use std::os::raw::c_void;
use std::str::FromStr;

/// How an EGL context is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EglMode {
    /// A new context of its own, with no surface, made current on creation.
    Standalone,
}

impl FromStr for EglMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<EglMode, Error> {
        match mode {
            "standalone" => Ok(EglMode::Standalone),
            _ => Err(Error::UnknownMode(mode.to_owned())),
        }
    }
}

/// Information needed to create an EGL context.
#[derive(Clone, Debug, PartialEq)]
pub struct EglContextDescriptor {
    /// How the context is created.
    pub mode: EglMode,
    /// The GL library to load; `load()` looks symbols up here first.
    pub gl_library: String,
    /// The EGL library to load.
    pub egl_library: String,
    /// The requested context version.
    pub gl_version: GLVersion,
    /// Accepted for callers that pass one, but standalone contexts always use the default device.
    pub device_index: u32,
}

impl Default for EglContextDescriptor {
    fn default() -> EglContextDescriptor {
        EglContextDescriptor {
            mode: EglMode::Standalone,
            gl_library: DEFAULT_GL_LIBRARY.to_owned(),
            egl_library: DEFAULT_EGL_LIBRARY.to_owned(),
            gl_version: GLVersion::default(),
            device_index: 0,
        }
    }
}

/// An EGL rendering context with no surface attached.
///
/// The context owns the GL and EGL libraries it was created from; they are unloaded when it is
/// dropped. Dropping also releases the context if `release()` wasn't called.
pub struct EglContext {
    egl_context: EGLContext,
    egl_display: EGLDisplay,
    #[allow(dead_code)]
    egl_config: EGLConfig,
    egl_version: (EGLint, EGLint),
    gl_version: GLVersion,
    standalone: bool,
    uses_angle: bool,
    egl: EglFunctions,
    // Dropped after everything above, since the function table points into it.
    #[allow(dead_code)]
    egl_library: DynamicLibrary,
    gl_library: DynamicLibrary,
}

/// The native objects behind a context that has been created and made current.
struct StandaloneContext {
    egl_context: EGLContext,
    egl_display: EGLDisplay,
    egl_config: EGLConfig,
    egl_version: (EGLint, EGLint),
    uses_angle: bool,
}

impl EglContext {
    /// Loads the libraries named by the descriptor, creates a context and makes it current on
    /// this thread.
    ///
    /// Everything acquired along the way is released again if any step fails.
    pub fn new(descriptor: &EglContextDescriptor) -> Result<EglContext, Error> {
        match descriptor.mode {
            EglMode::Standalone => {}
        }
        if descriptor.device_index != 0 {
            debug!("ignoring device index {}, standalone contexts use the default device",
                   descriptor.device_index);
        }

        let gl_library = DynamicLibrary::open(&descriptor.gl_library)?;
        let egl_library = DynamicLibrary::open(&descriptor.egl_library)?;
        let egl = EglFunctions::load(&egl_library)?;

        let native = unsafe { create_standalone_context(&egl, descriptor.gl_version)? };
        Ok(EglContext {
            egl_context: native.egl_context,
            egl_display: native.egl_display,
            egl_config: native.egl_config,
            egl_version: native.egl_version,
            gl_version: descriptor.gl_version,
            standalone: true,
            uses_angle: native.uses_angle,
            egl,
            egl_library,
            gl_library,
        })
    }

    /// Whether this context was created standalone. Always true for contexts created by `new()`.
    #[inline]
    pub fn standalone(&self) -> bool {
        self.standalone
    }

    /// Whether the display came from ANGLE's platform display rather than the default display.
    #[inline]
    pub fn uses_angle(&self) -> bool {
        self.uses_angle
    }

    /// The EGL version reported when the display was initialized.
    #[inline]
    pub fn egl_version(&self) -> (i32, i32) {
        self.egl_version
    }

    /// The OpenGL version this context was requested with.
    #[inline]
    pub fn gl_version(&self) -> GLVersion {
        self.gl_version
    }

    /// Whether this context is the current context of the calling thread.
    pub fn is_current(&self) -> bool {
        !self.is_released() && unsafe { (self.egl.GetCurrentContext)() == self.egl_context }
    }

    /// Fetches the address of an OpenGL function.
    ///
    /// The GL library is searched first, then `eglGetProcAddress`. Returns null if neither knows
    /// the function.
    pub fn get_proc_address(&self, symbol_name: &str) -> *const c_void {
        match self.gl_library.symbol(symbol_name) {
            Some(symbol) => symbol as *const c_void,
            None => self.egl.get_proc_address(symbol_name),
        }
    }
}

impl HeadlessContext for EglContext {
    /// Never fails for an unknown function: the address is null instead.
    fn load(&self, symbol_name: &str) -> Result<*const c_void, Error> {
        if self.is_released() {
            return Err(Error::ContextReleased);
        }
        Ok(self.get_proc_address(symbol_name))
    }

    fn make_current(&self) -> Result<(), Error> {
        if self.is_released() {
            return Err(Error::ContextReleased);
        }
        unsafe { make_context_current(&self.egl, self.egl_display, self.egl_context) }
    }

    fn make_not_current(&self) -> Result<(), Error> {
        unsafe { make_context_current(&self.egl, self.egl_display, egl::NO_CONTEXT) }
    }

    /// Unbinds the context first if it's current on this thread, so that the driver holds no
    /// thread-current state once the libraries are unloaded.
    fn release(&mut self) -> Result<(), Error> {
        if self.is_released() {
            return Ok(());
        }

        let egl_context = self.egl_context;
        self.egl_context = egl::NO_CONTEXT;
        unsafe { destroy_context(&self.egl, self.egl_display, egl_context) }
    }

    #[inline]
    fn is_released(&self) -> bool {
        self.egl_context == egl::NO_CONTEXT
    }

    #[inline]
    fn gl_api(&self) -> GLApi {
        GLApi::GLES
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("eglDestroyContext failed: {}", err);
        }
    }
}

/// Opens the display, chooses a config, binds the API, then creates a context and makes it
/// current.
///
/// A context that was created but couldn't be made current is destroyed before the error is
/// returned.
unsafe fn create_standalone_context(egl: &EglFunctions, gl_version: GLVersion)
                                    -> Result<StandaloneContext, Error> {
    let display = Display::open(egl)?;
    let egl_config = display.choose_config(egl)?;

    if (egl.BindAPI)(egl::OPENGL_ES_API) == egl::FALSE {
        return Err(Error::BindApiFailed((egl.GetError)().to_windowing_api_error()));
    }

    let attributes = display::context_attributes(gl_version);
    let egl_context = (egl.CreateContext)(display.egl_display,
                                          egl_config,
                                          egl::NO_CONTEXT,
                                          attributes.as_ptr());
    if egl_context == egl::NO_CONTEXT {
        return Err(Error::ContextCreationFailed((egl.GetError)().to_windowing_api_error()));
    }

    if let Err(err) = make_context_current(egl, display.egl_display, egl_context) {
        if let Err(destroy_err) = destroy_context(egl, display.egl_display, egl_context) {
            warn!("eglDestroyContext failed: {}", destroy_err);
        }
        return Err(err);
    }

    Ok(StandaloneContext {
        egl_context,
        egl_display: display.egl_display,
        egl_config,
        egl_version: display.version,
        uses_angle: display.uses_angle,
    })
}

/// Binds `egl_context` to the calling thread with no surface. `EGL_NO_CONTEXT` unbinds.
unsafe fn make_context_current(egl: &EglFunctions,
                               egl_display: EGLDisplay,
                               egl_context: EGLContext)
                               -> Result<(), Error> {
    let ok = (egl.MakeCurrent)(egl_display, egl::NO_SURFACE, egl::NO_SURFACE, egl_context);
    if ok == egl::FALSE {
        return Err(Error::MakeCurrentFailed((egl.GetError)().to_windowing_api_error()));
    }
    Ok(())
}

/// Destroys a context, unbinding it first if it's current on this thread.
unsafe fn destroy_context(egl: &EglFunctions,
                          egl_display: EGLDisplay,
                          egl_context: EGLContext)
                          -> Result<(), Error> {
    // EGL defers destroying a context that's still current.
    if (egl.GetCurrentContext)() == egl_context {
        if let Err(err) = make_context_current(egl, egl_display, egl::NO_CONTEXT) {
            warn!("failed to unbind the context before destroying it: {}", err);
        }
    }

    if (egl.DestroyContext)(egl_display, egl_context) == egl::FALSE {
        return Err(Error::ContextDestructionFailed((egl.GetError)().to_windowing_api_error()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{create_standalone_context, destroy_context, EglContext, EglContextDescriptor};
    use super::EglMode;
    use crate::egl;
    use crate::egl::types::{EGLAttrib, EGLBoolean, EGLConfig, EGLContext, EGLDisplay};
    use crate::egl::types::{EGLSurface, EGLenum, EGLint};
    use crate::egl::EGLNativeDisplayType;
    use crate::platform::generic::egl::display::context_attributes;
    use crate::platform::generic::egl::ffi::{EglFunctions, EGL_PLATFORM_ANGLE_ANGLE};
    use crate::{Error, GLVersion, WindowingApiError};

    use std::cell::RefCell;
    use std::os::raw::{c_char, c_void};
    use std::ptr;

    #[cfg(windows)]
    const SYSTEM_LIBRARY: &str = "kernel32";
    #[cfg(target_os = "linux")]
    const SYSTEM_LIBRARY: &str = "libc.so.6";
    #[cfg(all(unix, not(target_os = "linux")))]
    const SYSTEM_LIBRARY: &str = "libSystem.dylib";

    #[test]
    fn test_mode_parsing() {
        assert_eq!("standalone".parse::<EglMode>(), Ok(EglMode::Standalone));
        assert_eq!("share".parse::<EglMode>(), Err(Error::UnknownMode("share".to_owned())));
        assert!("Standalone".parse::<EglMode>().is_err());
    }

    #[test]
    fn test_missing_gl_library_is_reported_first() {
        let descriptor = EglContextDescriptor {
            gl_library: "libheadless-gl-missing-gl.so".to_owned(),
            egl_library: "libheadless-gl-missing-egl.so".to_owned(),
            ..EglContextDescriptor::default()
        };
        match EglContext::new(&descriptor) {
            Err(Error::NoLibraryFound { name, .. }) => {
                assert_eq!(name, "libheadless-gl-missing-gl.so")
            }
            _ => panic!("expected the GL library to be reported missing"),
        }
    }

    #[test]
    fn test_missing_egl_library_is_named() {
        let descriptor = EglContextDescriptor {
            gl_library: SYSTEM_LIBRARY.to_owned(),
            egl_library: "libheadless-gl-missing-egl.so".to_owned(),
            ..EglContextDescriptor::default()
        };
        match EglContext::new(&descriptor) {
            Err(Error::NoLibraryFound { name, .. }) => {
                assert_eq!(name, "libheadless-gl-missing-egl.so")
            }
            _ => panic!("expected the EGL library to be reported missing"),
        }
    }

    // A library that loads but exports no EGL entry points.
    #[test]
    fn test_library_without_egl_is_rejected() {
        let descriptor = EglContextDescriptor {
            gl_library: SYSTEM_LIBRARY.to_owned(),
            egl_library: SYSTEM_LIBRARY.to_owned(),
            ..EglContextDescriptor::default()
        };
        match EglContext::new(&descriptor) {
            Err(Error::SymbolNotFound(name)) => assert_eq!(name, "eglGetError"),
            _ => panic!("expected the first EGL entry point to be reported missing"),
        }
    }

    // A stand-in EGL implementation that records the calls made to it on the current thread.

    const FAKE_DISPLAY: EGLDisplay = 0x10 as EGLDisplay;
    const FAKE_ANGLE_DISPLAY: EGLDisplay = 0x11 as EGLDisplay;
    const FAKE_CONFIG: EGLConfig = 0x20 as EGLConfig;
    const FAKE_CONTEXT: EGLContext = 0x30 as EGLContext;

    const NO_ANGLE: &[u8] = b"EGL_EXT_client_extensions EGL_KHR_debug\0";
    const WITH_ANGLE: &[u8] = b"EGL_EXT_client_extensions EGL_ANGLE_platform_angle\0";

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        GetDisplay(EGLNativeDisplayType),
        GetPlatformDisplay(EGLenum),
        Initialize(EGLDisplay),
        ChooseConfig(EGLDisplay),
        BindApi(EGLenum),
        CreateContext(EGLConfig, Vec<EGLint>),
        MakeCurrent(EGLContext),
        DestroyContext(EGLContext),
    }

    struct FakeEgl {
        client_extensions: &'static [u8],
        make_current_fails: bool,
        error: EGLint,
        current_context: EGLContext,
        calls: Vec<Call>,
    }

    thread_local! {
        static FAKE_EGL: RefCell<FakeEgl> = RefCell::new(FakeEgl {
            client_extensions: NO_ANGLE,
            make_current_fails: false,
            error: egl::SUCCESS as EGLint,
            current_context: egl::NO_CONTEXT,
            calls: vec![],
        });
    }

    fn with_fake<R>(f: impl FnOnce(&mut FakeEgl) -> R) -> R {
        FAKE_EGL.with(|fake| f(&mut fake.borrow_mut()))
    }

    fn record(call: Call) {
        with_fake(|fake| fake.calls.push(call))
    }

    fn recorded_calls() -> Vec<Call> {
        with_fake(|fake| fake.calls.clone())
    }

    unsafe extern "system" fn fake_get_error() -> EGLint {
        with_fake(|fake| fake.error)
    }

    unsafe extern "system" fn fake_get_display(display_id: EGLNativeDisplayType) -> EGLDisplay {
        record(Call::GetDisplay(display_id));
        FAKE_DISPLAY
    }

    unsafe extern "system" fn fake_get_platform_display(platform: EGLenum,
                                                        _: *mut c_void,
                                                        _: *const EGLAttrib)
                                                        -> EGLDisplay {
        record(Call::GetPlatformDisplay(platform));
        FAKE_ANGLE_DISPLAY
    }

    unsafe extern "system" fn fake_initialize(dpy: EGLDisplay,
                                              major: *mut EGLint,
                                              minor: *mut EGLint)
                                              -> EGLBoolean {
        record(Call::Initialize(dpy));
        *major = 1;
        *minor = 5;
        egl::TRUE
    }

    unsafe extern "system" fn fake_choose_config(dpy: EGLDisplay,
                                                 _: *const EGLint,
                                                 configs: *mut EGLConfig,
                                                 _: EGLint,
                                                 num_config: *mut EGLint)
                                                 -> EGLBoolean {
        record(Call::ChooseConfig(dpy));
        *configs = FAKE_CONFIG;
        *num_config = 1;
        egl::TRUE
    }

    unsafe extern "system" fn fake_bind_api(api: EGLenum) -> EGLBoolean {
        record(Call::BindApi(api));
        egl::TRUE
    }

    unsafe extern "system" fn fake_create_context(_: EGLDisplay,
                                                  config: EGLConfig,
                                                  _: EGLContext,
                                                  attrib_list: *const EGLint)
                                                  -> EGLContext {
        let mut attributes = vec![];
        let mut next = attrib_list;
        while *next != egl::NONE as EGLint {
            attributes.push(*next);
            next = next.add(1);
        }
        record(Call::CreateContext(config, attributes));
        FAKE_CONTEXT
    }

    unsafe extern "system" fn fake_destroy_context(_: EGLDisplay, ctx: EGLContext) -> EGLBoolean {
        record(Call::DestroyContext(ctx));
        egl::TRUE
    }

    unsafe extern "system" fn fake_make_current(_: EGLDisplay,
                                                _: EGLSurface,
                                                _: EGLSurface,
                                                ctx: EGLContext)
                                                -> EGLBoolean {
        record(Call::MakeCurrent(ctx));
        with_fake(|fake| {
            if fake.make_current_fails {
                fake.error = egl::BAD_ACCESS as EGLint;
                return egl::FALSE;
            }
            fake.current_context = ctx;
            egl::TRUE
        })
    }

    unsafe extern "system" fn fake_get_current_context() -> EGLContext {
        with_fake(|fake| fake.current_context)
    }

    unsafe extern "system" fn fake_get_proc_address(_: *const c_char) -> *const c_void {
        ptr::null()
    }

    unsafe extern "system" fn fake_query_string(_: EGLDisplay, _: EGLint) -> *const c_char {
        with_fake(|fake| fake.client_extensions.as_ptr() as *const c_char)
    }

    fn fake_egl(client_extensions: &'static [u8], with_platform_display: bool) -> EglFunctions {
        with_fake(|fake| {
            fake.client_extensions = client_extensions;
            fake.make_current_fails = false;
            fake.error = egl::SUCCESS as EGLint;
            fake.current_context = egl::NO_CONTEXT;
            fake.calls.clear();
        });

        EglFunctions {
            GetError: fake_get_error,
            GetDisplay: fake_get_display,
            Initialize: fake_initialize,
            ChooseConfig: fake_choose_config,
            BindAPI: fake_bind_api,
            CreateContext: fake_create_context,
            DestroyContext: fake_destroy_context,
            MakeCurrent: fake_make_current,
            GetCurrentContext: fake_get_current_context,
            GetProcAddress: fake_get_proc_address,
            QueryString: fake_query_string,
            GetPlatformDisplay: if with_platform_display {
                Some(fake_get_platform_display)
            } else {
                None
            },
        }
    }

    #[test]
    fn test_creation_falls_back_to_the_default_display() {
        let egl = fake_egl(NO_ANGLE, true);
        let version = GLVersion::new(3, 3);
        let native = unsafe { create_standalone_context(&egl, version).unwrap() };

        assert!(!native.uses_angle);
        assert_eq!(native.egl_display, FAKE_DISPLAY);
        assert_eq!(native.egl_config, FAKE_CONFIG);
        assert_eq!(native.egl_context, FAKE_CONTEXT);
        assert_eq!(native.egl_version, (1, 5));
        assert_eq!(recorded_calls(), vec![
            Call::GetDisplay(egl::DEFAULT_DISPLAY),
            Call::Initialize(FAKE_DISPLAY),
            Call::ChooseConfig(FAKE_DISPLAY),
            Call::BindApi(egl::OPENGL_ES_API),
            Call::CreateContext(FAKE_CONFIG, context_attributes(version)[..6].to_vec()),
            Call::MakeCurrent(FAKE_CONTEXT),
        ]);
    }

    #[test]
    fn test_creation_prefers_the_angle_display() {
        let egl = fake_egl(WITH_ANGLE, true);
        let native = unsafe { create_standalone_context(&egl, GLVersion::new(3, 0)).unwrap() };

        assert!(native.uses_angle);
        assert_eq!(native.egl_display, FAKE_ANGLE_DISPLAY);
        let calls = recorded_calls();
        assert_eq!(calls[0], Call::GetPlatformDisplay(EGL_PLATFORM_ANGLE_ANGLE));
        assert!(!calls.iter().any(|call| matches!(call, Call::GetDisplay(_))));
        assert!(calls.contains(&Call::CreateContext(FAKE_CONFIG, vec![
            egl::CONTEXT_MAJOR_VERSION as EGLint, 3,
            egl::CONTEXT_MINOR_VERSION as EGLint, 0,
            egl::CONTEXT_OPENGL_PROFILE_MASK as EGLint,
            egl::CONTEXT_OPENGL_CORE_PROFILE_BIT as EGLint,
        ])));
    }

    #[test]
    fn test_angle_without_platform_display_entry_point() {
        let egl = fake_egl(WITH_ANGLE, false);
        match unsafe { create_standalone_context(&egl, GLVersion::default()) } {
            Err(Error::SymbolNotFound(name)) => assert_eq!(name, "eglGetPlatformDisplay"),
            _ => panic!("expected eglGetPlatformDisplay to be reported missing"),
        }
        assert!(recorded_calls().is_empty());
    }

    #[test]
    fn test_context_is_destroyed_when_it_cannot_be_made_current() {
        let egl = fake_egl(NO_ANGLE, true);
        with_fake(|fake| fake.make_current_fails = true);

        match unsafe { create_standalone_context(&egl, GLVersion::default()) } {
            Err(Error::MakeCurrentFailed(WindowingApiError::BadAccess)) => {}
            _ => panic!("expected making the context current to fail"),
        }
        let calls = recorded_calls();
        assert_eq!(calls[calls.len() - 2..], [
            Call::MakeCurrent(FAKE_CONTEXT),
            Call::DestroyContext(FAKE_CONTEXT),
        ]);
    }

    #[test]
    fn test_current_context_is_unbound_before_destruction() {
        let egl = fake_egl(NO_ANGLE, true);
        with_fake(|fake| fake.current_context = FAKE_CONTEXT);

        unsafe { destroy_context(&egl, FAKE_DISPLAY, FAKE_CONTEXT).unwrap() };
        assert_eq!(recorded_calls(), vec![
            Call::MakeCurrent(egl::NO_CONTEXT),
            Call::DestroyContext(FAKE_CONTEXT),
        ]);
        assert_eq!(with_fake(|fake| fake.current_context), egl::NO_CONTEXT);
    }

    #[test]
    fn test_context_not_current_is_destroyed_directly() {
        let egl = fake_egl(NO_ANGLE, true);

        unsafe { destroy_context(&egl, FAKE_DISPLAY, FAKE_CONTEXT).unwrap() };
        assert_eq!(recorded_calls(), vec![Call::DestroyContext(FAKE_CONTEXT)]);
    }
}
