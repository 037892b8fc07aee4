// headless-gl/src/info.rs
//
//! OpenGL information.

/// The API (OpenGL or OpenGL ES).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GLApi {
    /// OpenGL (full or desktop OpenGL).
    GL,
    /// OpenGL ES (embedded OpenGL).
    GLES,
}

/// Describes the OpenGL version that is requested when a context is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GLVersion {
    /// The major OpenGL version (e.g. 4 in 4.2).
    pub major: u8,
    /// The minor OpenGL version (e.g. 2 in 4.2).
    pub minor: u8,
}

impl GLVersion {
    /// Creates a GL version structure with the given major and minor version numbers.
    #[inline]
    pub fn new(major: u8, minor: u8) -> GLVersion {
        GLVersion { major, minor }
    }

    /// Decodes a version written as `major * 100 + minor * 10`, so that `330` means 3.3.
    ///
    /// Only the hundreds and tens digits are read; anything else in the number is ignored.
    #[inline]
    pub fn from_encoded(encoded: u32) -> GLVersion {
        GLVersion::new((encoded / 100 % 10) as u8, (encoded / 10 % 10) as u8)
    }

    /// Encodes this version as `major * 100 + minor * 10`.
    #[inline]
    pub fn encoded(&self) -> u32 {
        self.major as u32 * 100 + self.minor as u32 * 10
    }
}

impl Default for GLVersion {
    #[inline]
    fn default() -> GLVersion {
        GLVersion::new(3, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::GLVersion;

    #[test]
    fn test_encoded_version_decoding() {
        assert_eq!(GLVersion::from_encoded(330), GLVersion::new(3, 3));
        assert_eq!(GLVersion::from_encoded(460), GLVersion::new(4, 6));
        assert_eq!(GLVersion::from_encoded(200), GLVersion::new(2, 0));
        // Stray units digits and anything past the thousands are dropped.
        assert_eq!(GLVersion::from_encoded(335), GLVersion::new(3, 3));
        assert_eq!(GLVersion::from_encoded(1450), GLVersion::new(4, 5));
        assert_eq!(GLVersion::new(4, 1).encoded(), 410);
    }
}
