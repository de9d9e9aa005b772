//! Clipboard format identifiers

use std::fmt;

use serde::Serialize;

/// OS-assigned clipboard format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClipboardFormat(u32);

impl ClipboardFormat {
    /// Sentinel used to start and end format enumeration
    pub const NONE: Self = Self(0);
    /// ANSI text in the system code page
    pub const TEXT: Self = Self(1);
    /// GDI bitmap handle
    pub const BITMAP: Self = Self(2);
    /// Text in the OEM code page
    pub const OEM_TEXT: Self = Self(7);
    /// Device independent bitmap
    pub const DIB: Self = Self(8);
    /// UTF-16LE text
    pub const UNICODE_TEXT: Self = Self(13);
    /// GDI palette handle
    pub const PALETTE: Self = Self(14);
    /// Version 5 device independent bitmap
    pub const DIB_V5: Self = Self(17);

    /// Formats whose payloads are GDI objects or image data and are never backed up.
    pub const IMAGE_FORMATS: [Self; 4] = [Self::BITMAP, Self::DIB, Self::DIB_V5, Self::PALETTE];

    /// Create a format from its raw identifier
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw identifier
    pub const fn id(&self) -> u32 {
        self.0
    }

    /// Whether this is the enumeration sentinel
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Whether this format carries bitmap/image/palette data
    pub fn is_image(&self) -> bool {
        Self::IMAGE_FORMATS.contains(self)
    }

    /// Standard name for well-known formats
    pub const fn standard_name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("CF_TEXT"),
            2 => Some("CF_BITMAP"),
            7 => Some("CF_OEMTEXT"),
            8 => Some("CF_DIB"),
            13 => Some("CF_UNICODETEXT"),
            14 => Some("CF_PALETTE"),
            17 => Some("CF_DIBV5"),
            _ => None,
        }
    }
}

impl From<u32> for ClipboardFormat {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClipboardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standard_name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_formats_are_detected() {
        assert!(ClipboardFormat::BITMAP.is_image());
        assert!(ClipboardFormat::DIB.is_image());
        assert!(ClipboardFormat::DIB_V5.is_image());
        assert!(ClipboardFormat::PALETTE.is_image());
    }

    #[test]
    fn text_formats_are_not_images() {
        assert!(!ClipboardFormat::TEXT.is_image());
        assert!(!ClipboardFormat::UNICODE_TEXT.is_image());
        assert!(!ClipboardFormat::new(49499).is_image());
    }

    #[test]
    fn display_includes_standard_name() {
        assert_eq!(ClipboardFormat::UNICODE_TEXT.to_string(), "CF_UNICODETEXT (13)");
        assert_eq!(ClipboardFormat::new(49290).to_string(), "49290");
    }

    #[test]
    fn none_sentinel() {
        assert!(ClipboardFormat::NONE.is_none());
        assert!(!ClipboardFormat::TEXT.is_none());
    }
}
