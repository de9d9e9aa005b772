//! In-memory copy of the clipboard's non-image contents
//!
//! A snapshot is an ordered list of `(format, payload)` pairs taken in
//! enumeration order. Admission is bounded per format and in total so that a
//! huge clipboard cannot blow up memory while a selection is being captured.

use serde::Serialize;

use super::format::ClipboardFormat;
use super::size::ByteSize;

/// Default per-format payload cap (5 MiB)
pub const DEFAULT_MAX_FORMAT_SIZE: ByteSize = ByteSize::mib(5);

/// Default cap on the sum of all payloads (10 MiB)
pub const DEFAULT_MAX_TOTAL_SIZE: ByteSize = ByteSize::mib(10);

/// Size bounds applied while taking a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLimits {
    pub max_format_size: ByteSize,
    pub max_total_size: ByteSize,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            max_format_size: DEFAULT_MAX_FORMAT_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
        }
    }
}

/// Why a format was left out of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotRejection {
    /// Bitmap, DIB or palette data
    ImageFormat,
    /// Handle unavailable, zero sized or not lockable
    Unreadable,
    /// Payload was zero bytes
    Empty,
    /// Payload exceeds the per-format cap
    Oversized,
    /// Payload would push the total past the budget
    BudgetExhausted,
}

/// One saved clipboard format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub format: ClipboardFormat,
    pub payload: Vec<u8>,
}

/// Saved clipboard contents, in the order the formats were enumerated.
///
/// Once a payload is turned away for the total ceiling the snapshot is
/// sealed and admits nothing further, so it never has gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    entries: Vec<SnapshotEntry>,
    total_size: usize,
    sealed: bool,
}

impl ClipboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a payload of `size` bytes may be admitted.
    pub fn admit(
        &self,
        format: ClipboardFormat,
        size: usize,
        limits: &SnapshotLimits,
    ) -> Result<(), SnapshotRejection> {
        if self.sealed {
            return Err(SnapshotRejection::BudgetExhausted);
        }
        if format.is_image() {
            return Err(SnapshotRejection::ImageFormat);
        }
        if size == 0 {
            return Err(SnapshotRejection::Empty);
        }
        if size > limits.max_format_size.as_usize() {
            return Err(SnapshotRejection::Oversized);
        }
        if self.total_size.saturating_add(size) > limits.max_total_size.as_usize() {
            return Err(SnapshotRejection::BudgetExhausted);
        }
        Ok(())
    }

    /// Add a payload if it passes admission. The payload is copied only on success.
    pub fn try_insert(
        &mut self,
        format: ClipboardFormat,
        payload: &[u8],
        limits: &SnapshotLimits,
    ) -> Result<(), SnapshotRejection> {
        if let Err(reason) = self.admit(format, payload.len(), limits) {
            if reason == SnapshotRejection::BudgetExhausted {
                self.sealed = true;
            }
            return Err(reason);
        }
        self.total_size += payload.len();
        self.entries.push(SnapshotEntry {
            format,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn formats(&self) -> impl Iterator<Item = ClipboardFormat> + '_ {
        self.entries.iter().map(|e| e.format)
    }

    pub fn get(&self, format: ClipboardFormat) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.format == format)
            .map(|e| e.payload.as_slice())
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all saved payloads
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_size = 0;
        self.sealed = false;
    }
}

/// Per-format result of a backup or restore pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormatStatus {
    Saved { bytes: usize },
    Skipped { reason: SnapshotRejection },
    Restored { bytes: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatOutcome {
    pub format: ClipboardFormat,
    #[serde(flatten)]
    pub status: FormatStatus,
}

/// Summary of a backup pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub formats: Vec<FormatOutcome>,
    pub total_bytes: usize,
}

impl BackupReport {
    pub fn record(&mut self, format: ClipboardFormat, status: FormatStatus) {
        self.formats.push(FormatOutcome { format, status });
    }

    pub fn saved_count(&self) -> usize {
        self.formats
            .iter()
            .filter(|o| matches!(o.status, FormatStatus::Saved { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.formats.len() - self.saved_count()
    }
}

/// Summary of a restore pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub formats: Vec<FormatOutcome>,
    /// Set when restore did nothing because the snapshot was empty
    pub skipped_empty: bool,
}

impl RestoreReport {
    pub fn empty_snapshot() -> Self {
        Self {
            formats: Vec::new(),
            skipped_empty: true,
        }
    }

    pub fn record(&mut self, format: ClipboardFormat, status: FormatStatus) {
        self.formats.push(FormatOutcome { format, status });
    }

    pub fn restored_count(&self) -> usize {
        self.formats
            .iter()
            .filter(|o| matches!(o.status, FormatStatus::Restored { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.formats
            .iter()
            .filter(|o| matches!(o.status, FormatStatus::Failed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_limits() -> SnapshotLimits {
        SnapshotLimits {
            max_format_size: ByteSize::bytes(8),
            max_total_size: ByteSize::bytes(12),
        }
    }

    #[test]
    fn admits_within_limits() {
        let mut snapshot = ClipboardSnapshot::new();
        snapshot
            .try_insert(ClipboardFormat::UNICODE_TEXT, b"abcd", &small_limits())
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.total_size(), 4);
        assert_eq!(snapshot.get(ClipboardFormat::UNICODE_TEXT), Some(&b"abcd"[..]));
    }

    #[test]
    fn rejects_image_formats_regardless_of_size() {
        let snapshot = ClipboardSnapshot::new();
        for format in ClipboardFormat::IMAGE_FORMATS {
            assert_eq!(
                snapshot.admit(format, 1, &small_limits()),
                Err(SnapshotRejection::ImageFormat)
            );
        }
    }

    #[test]
    fn rejects_empty_payload() {
        let snapshot = ClipboardSnapshot::new();
        assert_eq!(
            snapshot.admit(ClipboardFormat::TEXT, 0, &small_limits()),
            Err(SnapshotRejection::Empty)
        );
    }

    #[test]
    fn rejects_oversized_format() {
        let snapshot = ClipboardSnapshot::new();
        assert_eq!(
            snapshot.admit(ClipboardFormat::TEXT, 9, &small_limits()),
            Err(SnapshotRejection::Oversized)
        );
        assert!(snapshot.admit(ClipboardFormat::TEXT, 8, &small_limits()).is_ok());
    }

    #[test]
    fn total_budget_seals_snapshot() {
        let limits = small_limits();
        let mut snapshot = ClipboardSnapshot::new();
        snapshot
            .try_insert(ClipboardFormat::new(49499), &[1; 8], &limits)
            .unwrap();
        assert_eq!(
            snapshot.try_insert(ClipboardFormat::new(49500), &[2; 5], &limits),
            Err(SnapshotRejection::BudgetExhausted)
        );
        assert_eq!(
            snapshot.try_insert(ClipboardFormat::new(49501), &[3; 4], &limits),
            Err(SnapshotRejection::BudgetExhausted)
        );
        assert_eq!(snapshot.total_size(), 8);
        let formats: Vec<u32> = snapshot.formats().map(|f| f.id()).collect();
        assert_eq!(formats, vec![49499]);
    }

    #[test]
    fn clear_resets_total() {
        let mut snapshot = ClipboardSnapshot::new();
        snapshot
            .try_insert(ClipboardFormat::TEXT, b"x", &small_limits())
            .unwrap();
        assert!(snapshot
            .try_insert(ClipboardFormat::new(49500), &[0; 12], &small_limits())
            .is_err());
        snapshot.clear();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_size(), 0);
        snapshot
            .try_insert(ClipboardFormat::TEXT, b"again", &small_limits())
            .unwrap();
    }

    #[test]
    fn default_limits() {
        let limits = SnapshotLimits::default();
        assert_eq!(limits.max_format_size.as_u64(), 5 * 1024 * 1024);
        assert_eq!(limits.max_total_size.as_u64(), 10 * 1024 * 1024);
    }

    #[test]
    fn report_counts() {
        let mut backup = BackupReport::default();
        backup.record(ClipboardFormat::TEXT, FormatStatus::Saved { bytes: 3 });
        backup.record(
            ClipboardFormat::DIB,
            FormatStatus::Skipped {
                reason: SnapshotRejection::ImageFormat,
            },
        );
        assert_eq!(backup.saved_count(), 1);
        assert_eq!(backup.skipped_count(), 1);

        let mut restore = RestoreReport::default();
        restore.record(ClipboardFormat::TEXT, FormatStatus::Restored { bytes: 3 });
        restore.record(
            ClipboardFormat::new(49499),
            FormatStatus::Failed {
                reason: "denied".into(),
            },
        );
        assert_eq!(restore.restored_count(), 1);
        assert_eq!(restore.failed_count(), 1);
        assert!(!restore.skipped_empty);
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let mut backup = BackupReport::default();
        backup.record(
            ClipboardFormat::BITMAP,
            FormatStatus::Skipped {
                reason: SnapshotRejection::ImageFormat,
            },
        );
        let json = serde_json::to_value(&backup).unwrap();
        assert_eq!(json["formats"][0]["format"], 2);
        assert_eq!(json["formats"][0]["status"], "skipped");
        assert_eq!(json["formats"][0]["reason"], "image_format");
    }
}
