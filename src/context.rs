// headless-gl/src/context.rs
//
//! The interface shared by every backend's contexts.

use crate::platform::generic::egl::context::{EglContext, EglContextDescriptor};
#[cfg(osmesa)]
use crate::platform::generic::osmesa::context::{OsMesaContext, OsMesaContextDescriptor};
use crate::{Error, GLApi};

use log::warn;
use std::os::raw::c_void;
use std::str::FromStr;

/// An OpenGL context that renders off-screen.
///
/// A context is created fully formed by its backend's constructor and stays valid until
/// `release()`. After that, `make_current()` and `load()` fail with `ContextReleased`, and
/// `release()` does nothing. Dropping a context releases it.
///
/// Making a context current affects only the calling thread. A thread has at most one current
/// context; making another one current replaces it.
pub trait HeadlessContext {
    /// Fetches the address of an OpenGL function associated with this context.
    ///
    /// This method is typically used with a function like `gl::load_with()` from the `gl` crate to
    /// load OpenGL function pointers. Backends differ on unknown functions: EGL returns null, while
    /// OSMesa fails with `GLFunctionNotFound`.
    fn load(&self, symbol_name: &str) -> Result<*const c_void, Error>;

    /// Makes the context the current OpenGL context for this thread.
    fn make_current(&self) -> Result<(), Error>;

    /// Removes this context from the current thread, where the backend has such a notion.
    fn make_not_current(&self) -> Result<(), Error>;

    /// Destroys the native context and frees what it owns. Only the first call has any effect.
    fn release(&mut self) -> Result<(), Error>;

    /// Whether `release()` has been called.
    fn is_released(&self) -> bool;

    /// The flavor of OpenGL this context speaks.
    fn gl_api(&self) -> GLApi;
}

/// Keeps a context current for as long as the guard lives.
///
/// Dropping the guard calls `make_not_current()` on the context.
#[must_use]
pub struct CurrentContextGuard<'a, C: HeadlessContext + ?Sized> {
    context: &'a C,
}

impl<'a, C: HeadlessContext + ?Sized> CurrentContextGuard<'a, C> {
    /// Makes `context` current on this thread.
    pub fn enter(context: &'a C) -> Result<CurrentContextGuard<'a, C>, Error> {
        context.make_current()?;
        Ok(CurrentContextGuard { context })
    }

    /// The context that is current.
    #[inline]
    pub fn context(&self) -> &'a C {
        self.context
    }
}

impl<'a, C: HeadlessContext + ?Sized> Drop for CurrentContextGuard<'a, C> {
    fn drop(&mut self) {
        if let Err(err) = self.context.make_not_current() {
            warn!("failed to make the context not current: {}", err);
        }
    }
}

/// The available context backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backend {
    /// EGL, through ANGLE when available. Named `"egl"` or `"angle"`.
    Egl,
    /// The OSMesa software rasterizer. Named `"osmesa"`.
    #[cfg(osmesa)]
    OsMesa,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(name: &str) -> Result<Backend, Error> {
        match name {
            "egl" | "angle" => Ok(Backend::Egl),
            #[cfg(osmesa)]
            "osmesa" => Ok(Backend::OsMesa),
            #[cfg(not(osmesa))]
            "osmesa" => Err(Error::UnsupportedBackend(name.to_owned())),
            _ => Err(Error::UnknownBackend(name.to_owned())),
        }
    }
}

/// Everything needed to create a context on one of the backends.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextDescriptor {
    /// Create an `EglContext`.
    Egl(EglContextDescriptor),
    /// Create an `OsMesaContext`.
    #[cfg(osmesa)]
    OsMesa(OsMesaContextDescriptor),
}

impl ContextDescriptor {
    /// The backend this descriptor creates a context on.
    pub fn backend(&self) -> Backend {
        match *self {
            ContextDescriptor::Egl(_) => Backend::Egl,
            #[cfg(osmesa)]
            ContextDescriptor::OsMesa(_) => Backend::OsMesa,
        }
    }
}

/// Creates a context on the backend the descriptor names.
///
/// Either the whole context is created or nothing is: on failure, everything acquired so far has
/// already been released when the error is returned.
pub fn create_context(descriptor: &ContextDescriptor)
                      -> Result<Box<dyn HeadlessContext>, Error> {
    match *descriptor {
        ContextDescriptor::Egl(ref descriptor) => Ok(Box::new(EglContext::new(descriptor)?)),
        #[cfg(osmesa)]
        ContextDescriptor::OsMesa(ref descriptor) => {
            Ok(Box::new(OsMesaContext::new(descriptor)?))
        }
    }
}
