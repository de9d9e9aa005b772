//! Clipboard port interface
//!
//! A thin, handle-based view of the OS clipboard. Everything here is
//! synchronous and cheap; callers run it on blocking threads.

use std::ptr::NonNull;

use thiserror::Error;

use crate::domain::clipboard::{ClipboardFormat, CodePageKind};

/// Clipboard access errors
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("Clipboard is busy: could not open it after {attempts} attempts")]
    ResourceBusy { attempts: u32 },

    #[error("Clipboard format {0} is not available")]
    FormatUnavailable(ClipboardFormat),

    #[error("Failed to lock clipboard data for format {0}")]
    LockFailed(ClipboardFormat),

    #[error("Failed to allocate {0} bytes of clipboard memory")]
    AllocationFailed(usize),

    #[error("Clipboard rejected data for format {0}")]
    HandoffFailed(ClipboardFormat),

    #[error("Failed to empty the clipboard")]
    ClearFailed,

    #[error("Clipboard task failed: {0}")]
    TaskFailed(String),

    #[error("System clipboard access is not supported on this platform")]
    Unsupported,
}

/// Opaque global memory handle owned either by the caller or by the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryHandle(pub usize);

/// Port for raw clipboard operations.
///
/// # Safety
///
/// `global_lock` must return a pointer that is valid for reads and writes of
/// `global_size(handle)` bytes until the matching `global_unlock`, and
/// `global_size` must not change while the handle is locked.
pub unsafe trait ClipboardApi: Send + Sync + 'static {
    /// Try once to take exclusive ownership of the clipboard
    fn open(&self) -> bool;

    /// Give up clipboard ownership
    fn close(&self) -> bool;

    /// Remove all formats. Requires the clipboard to be open.
    fn empty(&self) -> bool;

    /// Format following `previous` in enumeration order, or `ClipboardFormat::NONE` at the end.
    fn next_format(&self, previous: ClipboardFormat) -> ClipboardFormat;

    /// Whether a format is offered. Does not require the clipboard to be open.
    fn is_format_available(&self, format: ClipboardFormat) -> bool;

    /// Handle to a format's data, owned by the clipboard
    fn get_data(&self, format: ClipboardFormat) -> Option<MemoryHandle>;

    /// Hand a caller-owned handle to the clipboard. Ownership moves only on success.
    fn set_data(&self, format: ClipboardFormat, handle: MemoryHandle) -> bool;

    /// Counter that changes whenever clipboard contents change
    fn sequence_number(&self) -> u32;

    /// Allocate movable memory of `size` bytes
    fn global_alloc(&self, size: usize) -> Option<MemoryHandle>;

    fn global_size(&self, handle: MemoryHandle) -> usize;

    fn global_lock(&self, handle: MemoryHandle) -> Option<NonNull<u8>>;

    fn global_unlock(&self, handle: MemoryHandle);

    /// Free caller-owned memory
    fn global_free(&self, handle: MemoryHandle);

    /// Active code page for the 8-bit text formats
    fn code_page(&self, kind: CodePageKind) -> u32;
}

/// Blanket implementation for boxed clipboard types
unsafe impl ClipboardApi for Box<dyn ClipboardApi> {
    fn open(&self) -> bool {
        self.as_ref().open()
    }

    fn close(&self) -> bool {
        self.as_ref().close()
    }

    fn empty(&self) -> bool {
        self.as_ref().empty()
    }

    fn next_format(&self, previous: ClipboardFormat) -> ClipboardFormat {
        self.as_ref().next_format(previous)
    }

    fn is_format_available(&self, format: ClipboardFormat) -> bool {
        self.as_ref().is_format_available(format)
    }

    fn get_data(&self, format: ClipboardFormat) -> Option<MemoryHandle> {
        self.as_ref().get_data(format)
    }

    fn set_data(&self, format: ClipboardFormat, handle: MemoryHandle) -> bool {
        self.as_ref().set_data(format, handle)
    }

    fn sequence_number(&self) -> u32 {
        self.as_ref().sequence_number()
    }

    fn global_alloc(&self, size: usize) -> Option<MemoryHandle> {
        self.as_ref().global_alloc(size)
    }

    fn global_size(&self, handle: MemoryHandle) -> usize {
        self.as_ref().global_size(handle)
    }

    fn global_lock(&self, handle: MemoryHandle) -> Option<NonNull<u8>> {
        self.as_ref().global_lock(handle)
    }

    fn global_unlock(&self, handle: MemoryHandle) {
        self.as_ref().global_unlock(handle)
    }

    fn global_free(&self, handle: MemoryHandle) {
        self.as_ref().global_free(handle)
    }

    fn code_page(&self, kind: CodePageKind) -> u32 {
        self.as_ref().code_page(kind)
    }
}
