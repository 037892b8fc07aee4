// headless-gl/src/platform/generic/osmesa/context.rs
//
//! OSMesa contexts rendering into a buffer in main memory.

use super::format::PixelFormat;
use crate::context::HeadlessContext;
use crate::gl;
use crate::{Error, GLApi, WindowingApiError};

use euclid::default::Size2D;
use log::debug;
use osmesa_sys::{OSMesaContext, OSMesaCreateContextExt, OSMesaDestroyContext, OsMesa};
use osmesa_sys::{OSMesaGetCurrentContext, OSMesaGetProcAddress, OSMesaMakeCurrent};
use std::cell::UnsafeCell;
use std::ffi::CString;
use std::mem;
use std::os::raw::c_void;
use std::ptr;

const BYTES_PER_PIXEL: usize = 4;

/// Information needed to create an OSMesa context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OsMesaContextDescriptor {
    /// The size of the buffer rendered into, in pixels. Both dimensions must be positive.
    pub size: Size2D<i32>,
    /// The pixel format of the buffer.
    pub format: PixelFormat,
}

impl OsMesaContextDescriptor {
    /// A descriptor for an RGBA buffer of the given size.
    #[inline]
    pub fn new(size: Size2D<i32>) -> OsMesaContextDescriptor {
        OsMesaContextDescriptor { size, format: PixelFormat::default() }
    }
}

/// An OSMesa context together with the buffer it renders into.
///
/// The buffer is four bytes per pixel, regardless of the pixel format. The context is not made
/// current on creation; call `make_current()` before issuing GL calls.
pub struct OsMesaContext {
    osmesa_context: OSMesaContext,
    pixels: UnsafeCell<Vec<u8>>,
    size: Size2D<i32>,
    format: PixelFormat,
}

impl OsMesaContext {
    /// Allocates the pixel buffer and creates a context for it.
    pub fn new(descriptor: &OsMesaContextDescriptor) -> Result<OsMesaContext, Error> {
        let size = descriptor.size;
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::InvalidDimensions { width: size.width, height: size.height });
        }

        let pixels = allocate_pixels(size)?;

        if OsMesa::try_loading().is_err() {
            return Err(Error::NoLibraryFound {
                name: "OSMesa".to_owned(),
                reason: String::new(),
            });
        }

        unsafe {
            let osmesa_context = OSMesaCreateContextExt(descriptor.format.to_osmesa_format(),
                                                        0,
                                                        0,
                                                        0,
                                                        ptr::null_mut());
            if osmesa_context.is_null() {
                return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
            }

            debug!("created a {}x{} {} OSMesa context",
                   size.width,
                   size.height,
                   descriptor.format.name());
            Ok(OsMesaContext {
                osmesa_context,
                pixels: UnsafeCell::new(pixels),
                size,
                format: descriptor.format,
            })
        }
    }

    /// The size of the buffer, in pixels.
    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    /// The pixel format the context renders in.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// A copy of the rendered pixels, `width * height * 4` bytes, bottom row first.
    ///
    /// OSMesa writes into the buffer during GL calls, so no borrow of it is handed out. Call
    /// `glFinish()` first if rendering might still be in flight. Empty once released.
    pub fn pixels(&self) -> Vec<u8> {
        unsafe { (*self.pixels.get()).clone() }
    }
}

impl HeadlessContext for OsMesaContext {
    /// Fails with `GLFunctionNotFound` if OSMesa doesn't know the function.
    fn load(&self, symbol_name: &str) -> Result<*const c_void, Error> {
        if self.is_released() {
            return Err(Error::ContextReleased);
        }

        let not_found = || Error::GLFunctionNotFound(symbol_name.to_owned());
        let c_symbol_name = CString::new(symbol_name).map_err(|_| not_found())?;
        unsafe {
            match OSMesaGetProcAddress(c_symbol_name.as_ptr()) {
                Some(pointer) => Ok(pointer as *const c_void),
                None => Err(not_found()),
            }
        }
    }

    fn make_current(&self) -> Result<(), Error> {
        if self.is_released() {
            return Err(Error::ContextReleased);
        }

        unsafe {
            let ok = OSMesaMakeCurrent(self.osmesa_context,
                                       (*self.pixels.get()).as_mut_ptr() as *mut c_void,
                                       gl::UNSIGNED_BYTE,
                                       self.size.width,
                                       self.size.height);
            if ok == gl::FALSE {
                return Err(Error::MakeCurrentFailed(WindowingApiError::Failed));
            }
            Ok(())
        }
    }

    /// Does nothing. The context stays bound to its buffer until another context is made current
    /// or the context is released.
    #[inline]
    fn make_not_current(&self) -> Result<(), Error> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), Error> {
        if self.is_released() {
            return Ok(());
        }

        unsafe {
            // Never leave the context bound to a freed buffer.
            if OSMesaGetCurrentContext() == self.osmesa_context {
                OSMesaMakeCurrent(ptr::null_mut(), ptr::null_mut(), 0, 0, 0);
            }

            drop(mem::take(self.pixels.get_mut()));
            OSMesaDestroyContext(self.osmesa_context);
        }
        self.osmesa_context = ptr::null_mut();
        Ok(())
    }

    #[inline]
    fn is_released(&self) -> bool {
        self.osmesa_context.is_null()
    }

    #[inline]
    fn gl_api(&self) -> GLApi {
        GLApi::GL
    }
}

impl Drop for OsMesaContext {
    fn drop(&mut self) {
        // Releasing an OSMesa context can't fail.
        let _ = self.release();
    }
}

fn allocate_pixels(size: Size2D<i32>) -> Result<Vec<u8>, Error> {
    let byte_size = (size.width as usize)
        .checked_mul(size.height as usize)
        .and_then(|pixel_count| pixel_count.checked_mul(BYTES_PER_PIXEL))
        .ok_or(Error::BufferAllocationFailed(usize::MAX))?;

    let mut pixels = Vec::new();
    pixels.try_reserve_exact(byte_size)
          .map_err(|_| Error::BufferAllocationFailed(byte_size))?;
    pixels.resize(byte_size, 0);
    Ok(pixels)
}
