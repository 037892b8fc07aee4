// headless-gl/src/platform/generic/osmesa/format.rs
//
//! Pixel formats of the buffers OSMesa renders into.

#[cfg(osmesa)]
use osmesa_sys::{OSMESA_ARGB, OSMESA_BGR, OSMESA_BGRA, OSMESA_COLOR_INDEX, OSMESA_RGB};
#[cfg(osmesa)]
use osmesa_sys::OSMESA_RGBA;
use std::os::raw::c_uint;

// Values from `GL/osmesa.h`, for builds without OSMesa.
#[cfg(not(osmesa))]
const OSMESA_COLOR_INDEX: c_uint = 0x1900;
#[cfg(not(osmesa))]
const OSMESA_RGBA: c_uint = 0x1908;
#[cfg(not(osmesa))]
const OSMESA_BGRA: c_uint = 0x1;
#[cfg(not(osmesa))]
const OSMESA_ARGB: c_uint = 0x2;
#[cfg(not(osmesa))]
const OSMESA_RGB: c_uint = 0x1907;
#[cfg(not(osmesa))]
const OSMESA_BGR: c_uint = 0x4;

/// The layout of each pixel in an OSMesa buffer.
///
/// The buffer always reserves four bytes per pixel, whichever format is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelFormat {
    /// Palette indices.
    ColorIndex,
    /// Red, green, blue, alpha.
    #[default]
    Rgba,
    /// Blue, green, red, alpha.
    Bgra,
    /// Alpha, red, green, blue.
    Argb,
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
}

impl PixelFormat {
    /// Looks a format up by its OSMesa name (`"RGB"`, `"BGRA"`, ...).
    ///
    /// Names are matched exactly. `"RGBA"` and every unrecognized name give `Rgba`.
    pub fn from_name(name: &str) -> PixelFormat {
        match name {
            "COLOR_INDEX" => PixelFormat::ColorIndex,
            "BGRA" => PixelFormat::Bgra,
            "ARGB" => PixelFormat::Argb,
            "RGB" => PixelFormat::Rgb,
            "BGR" => PixelFormat::Bgr,
            _ => PixelFormat::Rgba,
        }
    }

    /// The OSMesa name of this format.
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::ColorIndex => "COLOR_INDEX",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Argb => "ARGB",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Bgr => "BGR",
        }
    }

    /// The format constant passed to `OSMesaCreateContextExt`.
    pub fn to_osmesa_format(self) -> c_uint {
        match self {
            PixelFormat::ColorIndex => OSMESA_COLOR_INDEX,
            PixelFormat::Rgba => OSMESA_RGBA,
            PixelFormat::Bgra => OSMESA_BGRA,
            PixelFormat::Argb => OSMESA_ARGB,
            PixelFormat::Rgb => OSMESA_RGB,
            PixelFormat::Bgr => OSMESA_BGR,
        }
    }
}
