//! Text decoding for clipboard text formats
//!
//! Each text-bearing clipboard format is mapped to the encoding its payload
//! uses. Reading text walks the table in priority order and decodes the first
//! format that is present.

use encoding_rs::Encoding;

use super::format::ClipboardFormat;

/// Code page family used by the legacy 8-bit text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePageKind {
    /// System default (ANSI) code page
    Ansi,
    /// OEM code page used by console applications
    Oem,
}

/// Code pages in effect on the host, as reported by the clipboard adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePages {
    pub ansi: u32,
    pub oem: u32,
}

impl CodePages {
    pub const fn get(&self, kind: CodePageKind) -> u32 {
        match kind {
            CodePageKind::Ansi => self.ansi,
            CodePageKind::Oem => self.oem,
        }
    }
}

impl Default for CodePages {
    fn default() -> Self {
        Self {
            ansi: 1252,
            oem: 437,
        }
    }
}

/// How the payload of a text format is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-16 little endian
    Utf16Le,
    /// 8-bit or DBCS text in a Windows code page
    CodePage(CodePageKind),
    /// Application formats that carry UTF-8 (decoded lossily)
    Utf8,
}

impl TextEncoding {
    /// Decode a raw payload, truncating at the first NUL character.
    pub fn decode(&self, bytes: &[u8], code_pages: &CodePages) -> String {
        let text = match self {
            Self::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Self::CodePage(kind) => {
                let encoding = encoding_for_code_page(code_pages.get(*kind));
                let (decoded, _) = encoding.decode_without_bom_handling(bytes);
                decoded.into_owned()
            }
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        };

        truncate_at_nul(text)
    }
}

/// Encode text as a NUL-terminated UTF-16LE clipboard payload.
pub fn encode_unicode_text(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn truncate_at_nul(mut text: String) -> String {
    if let Some(index) = text.find('\0') {
        text.truncate(index);
    }
    text
}

/// Map a Windows code page number onto an `encoding_rs` encoding.
///
/// Unknown code pages (including the DOS OEM pages 437/850) fall back to
/// Windows-1252, which matches them for the ASCII range.
pub fn encoding_for_code_page(code_page: u32) -> &'static Encoding {
    match code_page {
        866 => encoding_rs::IBM866,
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        28592 => encoding_rs::ISO_8859_2,
        28595 => encoding_rs::ISO_8859_5,
        28597 => encoding_rs::ISO_8859_7,
        54936 => encoding_rs::GB18030,
        65001 => encoding_rs::UTF_8,
        _ => encoding_rs::WINDOWS_1252,
    }
}

/// One entry of the text format table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    pub format: ClipboardFormat,
    pub encoding: TextEncoding,
}

/// Legacy application-registered formats that carry plain UTF-8 text.
pub const LEGACY_TEXT_FORMATS: [u32; 5] = [49499, 49290, 49504, 50103, 50104];

/// Priority-ordered mapping from text-bearing formats to their encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormatTable {
    entries: Vec<TextFormat>,
}

impl TextFormatTable {
    /// Table with no entries
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a format at the lowest priority. Re-adding a format replaces its encoding.
    pub fn with_format(mut self, format: ClipboardFormat, encoding: TextEncoding) -> Self {
        match self.entries.iter_mut().find(|e| e.format == format) {
            Some(entry) => entry.encoding = encoding,
            None => self.entries.push(TextFormat { format, encoding }),
        }
        self
    }

    /// Entries in priority order
    pub fn entries(&self) -> &[TextFormat] {
        &self.entries
    }

    /// Encoding registered for a format
    pub fn encoding_of(&self, format: ClipboardFormat) -> Option<TextEncoding> {
        self.entries
            .iter()
            .find(|e| e.format == format)
            .map(|e| e.encoding)
    }

    pub fn contains(&self, format: ClipboardFormat) -> bool {
        self.encoding_of(format).is_some()
    }
}

impl Default for TextFormatTable {
    fn default() -> Self {
        LEGACY_TEXT_FORMATS.iter().fold(
            Self::empty()
                .with_format(ClipboardFormat::UNICODE_TEXT, TextEncoding::Utf16Le)
                .with_format(
                    ClipboardFormat::TEXT,
                    TextEncoding::CodePage(CodePageKind::Ansi),
                )
                .with_format(
                    ClipboardFormat::OEM_TEXT,
                    TextEncoding::CodePage(CodePageKind::Oem),
                ),
            |table, id| table.with_format(ClipboardFormat::new(*id), TextEncoding::Utf8),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_priority_order() {
        let table = TextFormatTable::default();
        let formats: Vec<u32> = table.entries().iter().map(|e| e.format.id()).collect();
        assert_eq!(formats, vec![13, 1, 7, 49499, 49290, 49504, 50103, 50104]);
    }

    #[test]
    fn default_table_encodings() {
        let table = TextFormatTable::default();
        assert_eq!(
            table.encoding_of(ClipboardFormat::UNICODE_TEXT),
            Some(TextEncoding::Utf16Le)
        );
        assert_eq!(
            table.encoding_of(ClipboardFormat::OEM_TEXT),
            Some(TextEncoding::CodePage(CodePageKind::Oem))
        );
        assert_eq!(
            table.encoding_of(ClipboardFormat::new(50103)),
            Some(TextEncoding::Utf8)
        );
        assert!(!table.contains(ClipboardFormat::DIB));
    }

    #[test]
    fn with_format_appends_and_replaces() {
        let table = TextFormatTable::empty()
            .with_format(ClipboardFormat::new(60000), TextEncoding::Utf8)
            .with_format(ClipboardFormat::new(60000), TextEncoding::Utf16Le);
        assert_eq!(table.entries().len(), 1);
        assert_eq!(
            table.encoding_of(ClipboardFormat::new(60000)),
            Some(TextEncoding::Utf16Le)
        );
    }

    #[test]
    fn decode_utf16_truncates_at_nul() {
        let mut bytes = encode_unicode_text("héllo");
        bytes.extend(encode_unicode_text("junk"));
        let text = TextEncoding::Utf16Le.decode(&bytes, &CodePages::default());
        assert_eq!(text, "héllo");
    }

    #[test]
    fn decode_ansi_windows_1252() {
        // "café" in Windows-1252 followed by a terminator
        let bytes = [0x63, 0x61, 0x66, 0xE9, 0x00, 0x41];
        let text =
            TextEncoding::CodePage(CodePageKind::Ansi).decode(&bytes, &CodePages::default());
        assert_eq!(text, "café");
    }

    #[test]
    fn decode_oem_uses_oem_code_page() {
        // 0xE4 is "ф" in IBM866
        let pages = CodePages {
            ansi: 1252,
            oem: 866,
        };
        let text = TextEncoding::CodePage(CodePageKind::Oem).decode(&[0xE4, 0x00], &pages);
        assert_eq!(text, "ф");
    }

    #[test]
    fn decode_gbk_ansi() {
        // "中" in GBK
        let pages = CodePages {
            ansi: 936,
            oem: 936,
        };
        let text = TextEncoding::CodePage(CodePageKind::Ansi).decode(&[0xD6, 0xD0, 0x00], &pages);
        assert_eq!(text, "中");
    }

    #[test]
    fn decode_utf8_is_lossy() {
        let text = TextEncoding::Utf8.decode(&[0x68, 0x69, 0xFF, 0x00, 0x7A], &CodePages::default());
        assert_eq!(text, "hi\u{FFFD}");
    }

    #[test]
    fn encode_unicode_text_appends_terminator() {
        let bytes = encode_unicode_text("ab");
        assert_eq!(bytes, vec![0x61, 0x00, 0x62, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn unknown_code_page_falls_back_to_1252() {
        assert_eq!(encoding_for_code_page(437), encoding_rs::WINDOWS_1252);
        assert_eq!(encoding_for_code_page(936), encoding_rs::GBK);
    }
}
