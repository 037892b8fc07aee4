// headless-gl/src/error.rs
//
//! Various errors that methods can produce.

use std::error;
use std::fmt::{self, Display, Formatter};

/// Various errors that methods can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A native library couldn't be loaded.
    NoLibraryFound {
        /// The name or path the library was requested under.
        name: String,
        /// What the platform loader reported, if anything.
        reason: String,
    },
    /// A required entry point is missing from a loaded library.
    SymbolNotFound(String),
    /// The requested EGL creation mode isn't supported.
    UnknownMode(String),
    /// The requested backend name isn't known.
    UnknownBackend(String),
    /// The backend exists but wasn't compiled into this build.
    UnsupportedBackend(String),
    /// A buffer dimension was zero or negative.
    InvalidDimensions {
        /// The requested width.
        width: i32,
        /// The requested height.
        height: i32,
    },
    /// The pixel buffer of the given byte size couldn't be allocated.
    BufferAllocationFailed(usize),
    /// No display could be obtained from EGL.
    NoDisplay(WindowingApiError),
    /// The display couldn't be initialized.
    DisplayInitializationFailed(WindowingApiError),
    /// Choosing a pixel format (EGL config) failed.
    PixelFormatSelectionFailed(WindowingApiError),
    /// The system couldn't choose a pixel format.
    NoPixelFormatFound,
    /// Binding the client API failed.
    BindApiFailed(WindowingApiError),
    /// The system couldn't create an OpenGL context.
    ContextCreationFailed(WindowingApiError),
    /// The system couldn't destroy the OpenGL context.
    ContextDestructionFailed(WindowingApiError),
    /// The system couldn't make the OpenGL context current or not current.
    MakeCurrentFailed(WindowingApiError),
    /// Looking up an OpenGL function address failed.
    GLFunctionNotFound(String),
    /// The context was already released.
    ContextReleased,
}

/// Abstraction of the errors that EGL and OSMesa return.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowingApiError {
    /// Miscellaneous error.
    Failed,
    /// EGL is not initialized, or could not be initialized, for the specified display.
    NotInitialized,
    /// EGL cannot access a requested resource (for example a context is bound in another thread).
    BadAccess,
    /// EGL failed to allocate resources for the requested operation.
    BadAlloc,
    /// An unrecognized attribute or attribute value was passed in the attribute list.
    BadAttribute,
    /// The EGL configuration is unsupported.
    BadConfig,
    /// An EGLContext argument does not name a valid EGL rendering context.
    BadContext,
    /// The current surface of the calling thread is no longer valid.
    BadCurrentSurface,
    /// An EGLDisplay argument does not name a valid EGL display connection.
    BadDisplay,
    /// An EGLSurface argument does not name a valid surface configured for GL rendering.
    BadSurface,
    /// Arguments are inconsistent (for example, a valid context requires buffers not supplied by a
    /// valid surface).
    BadMatch,
    /// One or more argument values are invalid.
    BadParameter,
    /// A NativePixmapType argument does not refer to a valid native pixmap.
    BadNativePixmap,
    /// A NativeWindowType argument does not refer to a valid native window.
    BadNativeWindow,
    /// A power management event has occurred. The application must destroy all contexts and
    /// reinitialise OpenGL ES state and objects to continue rendering.
    ContextLost,
    /// An error code this crate doesn't recognize, kept verbatim.
    Unrecognized(i32),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Error::NoLibraryFound { ref name, ref reason } if reason.is_empty() => {
                write!(f, "{} not loaded", name)
            }
            Error::NoLibraryFound { ref name, ref reason } => {
                write!(f, "{} not loaded: {}", name, reason)
            }
            Error::SymbolNotFound(ref name) => write!(f, "{} not found", name),
            Error::UnknownMode(ref mode) => write!(f, "unknown mode {:?}", mode),
            Error::UnknownBackend(ref name) => write!(f, "unknown backend {:?}", name),
            Error::UnsupportedBackend(ref name) => {
                write!(f, "backend {:?} is not enabled in this build", name)
            }
            Error::InvalidDimensions { width, height } => {
                write!(f, "width and height must be positive (got {}x{})", width, height)
            }
            Error::BufferAllocationFailed(size) => {
                write!(f, "allocating a {} byte image buffer failed", size)
            }
            Error::NoDisplay(err) => write!(f, "no EGL display available ({})", err),
            Error::DisplayInitializationFailed(err) => write!(f, "eglInitialize failed ({})", err),
            Error::PixelFormatSelectionFailed(err) => {
                write!(f, "eglChooseConfig failed ({})", err)
            }
            Error::NoPixelFormatFound => write!(f, "no matching pixel format found"),
            Error::BindApiFailed(err) => write!(f, "eglBindAPI failed ({})", err),
            Error::ContextCreationFailed(err) => write!(f, "context creation failed ({})", err),
            Error::ContextDestructionFailed(err) => {
                write!(f, "context destruction failed ({})", err)
            }
            Error::MakeCurrentFailed(err) => write!(f, "making the context current failed ({})", err),
            Error::GLFunctionNotFound(ref name) => write!(f, "GL function {} not found", name),
            Error::ContextReleased => write!(f, "the context has been released"),
        }
    }
}

impl error::Error for Error {}

impl Display for WindowingApiError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            WindowingApiError::Unrecognized(code) => write!(f, "0x{:x}", code),
            ref other => write!(f, "{:?}", other),
        }
    }
}
