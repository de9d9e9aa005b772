//! Clipboard domain types

mod encoding;
mod format;
mod size;
mod snapshot;

pub use encoding::{
    encode_unicode_text, encoding_for_code_page, CodePageKind, CodePages, TextEncoding,
    TextFormat, TextFormatTable, LEGACY_TEXT_FORMATS,
};
pub use format::ClipboardFormat;
pub use size::ByteSize;
pub use snapshot::{
    BackupReport, ClipboardSnapshot, FormatOutcome, FormatStatus, RestoreReport, SnapshotEntry,
    SnapshotLimits, SnapshotRejection, DEFAULT_MAX_FORMAT_SIZE, DEFAULT_MAX_TOTAL_SIZE,
};
