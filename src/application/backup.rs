//! Clipboard backup store
//!
//! Takes a bounded snapshot of everything on the clipboard that is not an
//! image and writes it back later in the same order.

use tracing::{debug, info};

use crate::application::accessor::ClipboardAccessor;
use crate::application::ports::{AccessError, ClipboardApi};
use crate::domain::clipboard::{
    BackupReport, ClipboardSnapshot, FormatStatus, RestoreReport, SnapshotLimits,
    SnapshotRejection,
};

/// Snapshot and restore of clipboard contents
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupStore {
    limits: SnapshotLimits,
}

impl BackupStore {
    pub fn new(limits: SnapshotLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SnapshotLimits {
        &self.limits
    }

    /// Copy every admissible format into a fresh snapshot.
    ///
    /// Formats that cannot be read or exceed the per-format ceiling are
    /// skipped and recorded in the report. The first format that would push
    /// the total past its ceiling ends the backup. Only failing to open the
    /// clipboard is an error.
    pub fn capture<A: ClipboardApi>(
        &self,
        accessor: &ClipboardAccessor<A>,
    ) -> Result<(ClipboardSnapshot, BackupReport), AccessError> {
        let session = accessor.open()?;
        let mut snapshot = ClipboardSnapshot::new();
        let mut report = BackupReport::default();

        for format in session.enumerate_formats() {
            if format.is_image() {
                report.record(
                    format,
                    FormatStatus::Skipped {
                        reason: SnapshotRejection::ImageFormat,
                    },
                );
                continue;
            }

            let size = match session.format_size(format) {
                Ok(size) => size,
                Err(e) => {
                    debug!(%format, error = %e, "Format has no data");
                    report.record(
                        format,
                        FormatStatus::Skipped {
                            reason: SnapshotRejection::Unreadable,
                        },
                    );
                    continue;
                }
            };

            // Check the size before copying so oversized payloads are never read
            let admitted = snapshot.admit(format, size, &self.limits).and_then(|()| {
                let payload = session.read_format(format).map_err(|e| {
                    debug!(%format, error = %e, "Failed to read format");
                    SnapshotRejection::Unreadable
                })?;
                snapshot.try_insert(format, &payload, &self.limits)?;
                Ok(payload.len())
            });

            match admitted {
                Ok(bytes) => {
                    debug!(%format, bytes, "Saved format");
                    report.record(format, FormatStatus::Saved { bytes });
                }
                Err(SnapshotRejection::BudgetExhausted) => {
                    debug!(%format, size, total = snapshot.total_size(), "Total ceiling reached, stopping backup");
                    report.record(
                        format,
                        FormatStatus::Skipped {
                            reason: SnapshotRejection::BudgetExhausted,
                        },
                    );
                    break;
                }
                Err(reason) => {
                    debug!(%format, size, ?reason, "Skipped format");
                    report.record(format, FormatStatus::Skipped { reason });
                }
            }
        }

        report.total_bytes = snapshot.total_size();
        info!(
            saved = report.saved_count(),
            skipped = report.skipped_count(),
            bytes = report.total_bytes,
            "Clipboard backed up"
        );
        Ok((snapshot, report))
    }

    /// Write a snapshot back, in its original order.
    ///
    /// An empty snapshot leaves the clipboard untouched. Individual format
    /// failures are recorded and the rest are still written.
    pub fn restore<A: ClipboardApi>(
        &self,
        accessor: &ClipboardAccessor<A>,
        snapshot: &ClipboardSnapshot,
    ) -> Result<RestoreReport, AccessError> {
        if snapshot.is_empty() {
            debug!("Empty snapshot, leaving clipboard as is");
            return Ok(RestoreReport::empty_snapshot());
        }

        let session = accessor.open()?;
        session.clear()?;

        let mut report = RestoreReport::default();
        for entry in snapshot.entries() {
            let status = match session.write_format(entry.format, &entry.payload) {
                Ok(()) => FormatStatus::Restored {
                    bytes: entry.payload.len(),
                },
                Err(e) => {
                    debug!(format = %entry.format, error = %e, "Failed to restore format");
                    FormatStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.record(entry.format, status);
        }

        info!(
            restored = report.restored_count(),
            failed = report.failed_count(),
            "Clipboard restored"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::OpenRetryPolicy;
    use crate::domain::clipboard::{ByteSize, ClipboardFormat};
    use crate::domain::timing::Duration;
    use crate::infrastructure::clipboard::MemoryClipboard;

    fn accessor(clipboard: &MemoryClipboard) -> ClipboardAccessor<MemoryClipboard> {
        ClipboardAccessor::new(clipboard.clone()).with_retry(OpenRetryPolicy {
            attempts: 2,
            interval: Duration::from_millis(1),
        })
    }

    fn custom(id: u32) -> ClipboardFormat {
        ClipboardFormat::new(id)
    }

    #[test]
    fn capture_empty_clipboard_gives_empty_snapshot() {
        let clipboard = MemoryClipboard::new();
        let (snapshot, report) = BackupStore::default().capture(&accessor(&clipboard)).unwrap();
        assert!(snapshot.is_empty());
        assert!(report.formats.is_empty());
        assert_eq!(clipboard.stats().opens, clipboard.stats().closes);
    }

    #[test]
    fn capture_skips_images_and_keeps_order() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[
            (custom(49300), b"rich".as_slice()),
            (ClipboardFormat::DIB, [0u8; 64].as_slice()),
            (ClipboardFormat::TEXT, b"plain\0".as_slice()),
            (ClipboardFormat::BITMAP, [1u8; 8].as_slice()),
        ]);

        let (snapshot, report) = BackupStore::default().capture(&accessor(&clipboard)).unwrap();

        let formats: Vec<_> = snapshot.formats().collect();
        assert_eq!(formats, vec![custom(49300), ClipboardFormat::TEXT]);
        assert_eq!(report.saved_count(), 2);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(
            report.formats[1].status,
            FormatStatus::Skipped {
                reason: SnapshotRejection::ImageFormat
            }
        );
    }

    #[test]
    fn capture_skips_unrendered_formats() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[(ClipboardFormat::TEXT, b"a\0".as_slice())]);
        clipboard.defer_rendering(custom(49400));

        let (snapshot, report) = BackupStore::default().capture(&accessor(&clipboard)).unwrap();
        assert_eq!(snapshot.formats().collect::<Vec<_>>(), vec![ClipboardFormat::TEXT]);
        assert!(report.formats.iter().all(|o| o.format != custom(49400)));
    }

    #[test]
    fn capture_respects_limits() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[
            (custom(49301), [1u8; 6].as_slice()),
            (custom(49302), [2u8; 20].as_slice()),
            (custom(49303), [3u8; 6].as_slice()),
            (custom(49304), [4u8; 2].as_slice()),
        ]);
        let store = BackupStore::new(SnapshotLimits {
            max_format_size: ByteSize::bytes(10),
            max_total_size: ByteSize::bytes(12),
        });

        let (snapshot, report) = store.capture(&accessor(&clipboard)).unwrap();

        let formats: Vec<_> = snapshot.formats().collect();
        assert_eq!(formats, vec![custom(49301), custom(49303)]);
        assert_eq!(snapshot.total_size(), 12);
        assert_eq!(report.total_bytes, 12);
        let reasons: Vec<_> = report
            .formats
            .iter()
            .filter_map(|o| match o.status {
                FormatStatus::Skipped { reason } => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![SnapshotRejection::Oversized, SnapshotRejection::BudgetExhausted]
        );
    }

    #[test]
    fn capture_stops_at_total_ceiling() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[
            (custom(49301), [1u8; 8].as_slice()),
            (custom(49302), [2u8; 5].as_slice()),
            (custom(49303), [3u8; 4].as_slice()),
        ]);
        let store = BackupStore::new(SnapshotLimits {
            max_format_size: ByteSize::bytes(10),
            max_total_size: ByteSize::bytes(12),
        });

        let (snapshot, report) = store.capture(&accessor(&clipboard)).unwrap();

        let formats: Vec<_> = snapshot.formats().collect();
        assert_eq!(formats, vec![custom(49301)]);
        assert_eq!(report.total_bytes, 8);
        let recorded: Vec<_> = report.formats.iter().map(|o| o.format).collect();
        assert_eq!(recorded, vec![custom(49301), custom(49302)]);
        assert_eq!(
            report.formats[1].status,
            FormatStatus::Skipped {
                reason: SnapshotRejection::BudgetExhausted
            }
        );
    }

    #[test]
    fn capture_skips_format_that_fails_to_lock() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[
            (custom(49301), b"first".as_slice()),
            (custom(49302), b"locked".as_slice()),
            (custom(49303), b"third".as_slice()),
        ]);
        clipboard.fail_lock(custom(49302));

        let (snapshot, report) = BackupStore::default().capture(&accessor(&clipboard)).unwrap();

        let formats: Vec<_> = snapshot.formats().collect();
        assert_eq!(formats, vec![custom(49301), custom(49303)]);
        assert_eq!(
            report.formats[1].status,
            FormatStatus::Skipped {
                reason: SnapshotRejection::Unreadable
            }
        );
        let stats = clipboard.stats();
        assert_eq!(stats.opens, stats.closes);
        assert_eq!(stats.outstanding_locks, 0);
    }

    #[test]
    fn restore_round_trips_payloads_in_order() {
        let clipboard = MemoryClipboard::new();
        let original = vec![
            (custom(49300), b"rich".to_vec()),
            (ClipboardFormat::UNICODE_TEXT, b"h\0i\0\0\0".to_vec()),
            (ClipboardFormat::TEXT, b"hi\0".to_vec()),
        ];
        let seeded: Vec<_> = original
            .iter()
            .map(|(f, bytes)| (*f, bytes.as_slice()))
            .collect();
        clipboard.seed(&seeded);

        let store = BackupStore::default();
        let accessor = accessor(&clipboard);
        let (snapshot, _) = store.capture(&accessor).unwrap();

        clipboard.seed_text("something else");
        let report = store.restore(&accessor, &snapshot).unwrap();

        assert_eq!(report.restored_count(), 3);
        assert_eq!(clipboard.contents(), original);
        let stats = clipboard.stats();
        assert_eq!(stats.opens, stats.closes);
        assert_eq!(stats.allocations, stats.frees + stats.handoffs);
        assert_eq!(stats.invalid_frees, 0);
    }

    #[test]
    fn restore_empty_snapshot_is_noop() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed_text("changed meanwhile");
        let report = BackupStore::default()
            .restore(&accessor(&clipboard), &ClipboardSnapshot::new())
            .unwrap();

        assert!(report.skipped_empty);
        assert_eq!(clipboard.stats().opens, 0);
        assert_eq!(clipboard.unicode_text().as_deref(), Some("changed meanwhile"));
    }

    #[test]
    fn restore_continues_past_failed_format() {
        let clipboard = MemoryClipboard::new();
        clipboard.seed(&[
            (custom(49300), b"a".as_slice()),
            (custom(49301), b"b".as_slice()),
            (custom(49302), b"c".as_slice()),
        ]);
        let store = BackupStore::default();
        let accessor = accessor(&clipboard);
        let (snapshot, _) = store.capture(&accessor).unwrap();

        clipboard.fail_handoff(custom(49301));
        let report = store.restore(&accessor, &snapshot).unwrap();

        assert_eq!(report.restored_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            clipboard.contents(),
            vec![(custom(49300), b"a".to_vec()), (custom(49302), b"c".to_vec())]
        );
        let stats = clipboard.stats();
        assert_eq!(stats.allocations, stats.frees + stats.handoffs);
        assert_eq!(stats.frees, 1);
    }

    #[test]
    fn busy_clipboard_fails_capture() {
        let clipboard = MemoryClipboard::new();
        clipboard.hold_busy(u32::MAX);
        let err = BackupStore::default()
            .capture(&accessor(&clipboard))
            .unwrap_err();
        assert!(matches!(err, AccessError::ResourceBusy { .. }));
    }
}
