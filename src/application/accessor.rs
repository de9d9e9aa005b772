//! Raw clipboard accessor
//!
//! Wraps a `ClipboardApi` with scoped ownership: a `ClipboardSession` closes
//! the clipboard when dropped, locked memory is unlocked when its guard goes
//! out of scope, and memory allocated for a write is freed unless the
//! clipboard accepted it.

use std::ptr::NonNull;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{AccessError, ClipboardApi, MemoryHandle};
use crate::domain::capture::OpenRetryPolicy;
use crate::domain::clipboard::{
    encode_unicode_text, ClipboardFormat, CodePageKind, CodePages, TextFormatTable,
};

/// Clipboard access with open retries and text decoding
pub struct ClipboardAccessor<A: ClipboardApi> {
    api: A,
    retry: OpenRetryPolicy,
    text_formats: TextFormatTable,
}

impl<A: ClipboardApi> ClipboardAccessor<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            retry: OpenRetryPolicy::default(),
            text_formats: TextFormatTable::default(),
        }
    }

    pub fn with_retry(mut self, retry: OpenRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_text_formats(mut self, text_formats: TextFormatTable) -> Self {
        self.text_formats = text_formats;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn text_formats(&self) -> &TextFormatTable {
        &self.text_formats
    }

    /// Open the clipboard, retrying while another process holds it.
    ///
    /// Blocks the calling thread between attempts.
    pub fn open(&self) -> Result<ClipboardSession<'_, A>, AccessError> {
        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            if self.api.open() {
                if attempt > 1 {
                    debug!(attempt, "Clipboard opened after retry");
                }
                return Ok(ClipboardSession { accessor: self });
            }
            if attempt < attempts {
                std::thread::sleep(self.retry.interval.as_std());
            }
        }
        warn!(attempts, "Clipboard stayed busy");
        Err(AccessError::ResourceBusy { attempts })
    }

    /// Current change marker. Does not open the clipboard.
    pub fn sequence_number(&self) -> u32 {
        self.api.sequence_number()
    }

    /// Whether any known text format is offered. Does not open the clipboard.
    pub fn is_text_available(&self) -> bool {
        self.text_formats
            .entries()
            .iter()
            .any(|entry| self.api.is_format_available(entry.format))
    }

    /// Open, read the best text format, close.
    pub fn get_text(&self) -> Result<Option<String>, AccessError> {
        Ok(self.open()?.read_text())
    }

    /// Open, replace the contents with `text`, close.
    pub fn set_text(&self, text: &str) -> Result<(), AccessError> {
        self.open()?.set_text(text)
    }

    fn code_pages(&self) -> CodePages {
        CodePages {
            ansi: self.api.code_page(CodePageKind::Ansi),
            oem: self.api.code_page(CodePageKind::Oem),
        }
    }

    /// Run blocking clipboard work on the blocking thread pool.
    pub async fn run_blocking<F, T>(self: &Arc<Self>, work: F) -> Result<T, AccessError>
    where
        F: FnOnce(&Self) -> Result<T, AccessError> + Send + 'static,
        T: Send + 'static,
    {
        let accessor = Arc::clone(self);
        tokio::task::spawn_blocking(move || work(&accessor))
            .await
            .map_err(|e| AccessError::TaskFailed(e.to_string()))?
    }
}

/// Open clipboard. Closed exactly once when dropped.
pub struct ClipboardSession<'a, A: ClipboardApi> {
    accessor: &'a ClipboardAccessor<A>,
}

impl<A: ClipboardApi> ClipboardSession<'_, A> {
    fn api(&self) -> &A {
        &self.accessor.api
    }

    /// Formats that hold data, in the order the OS enumerates them.
    ///
    /// Formats offered for delayed rendering whose owner never renders them
    /// are left out.
    pub fn enumerate_formats(&self) -> Vec<ClipboardFormat> {
        let mut formats = Vec::new();
        let mut current = self.api().next_format(ClipboardFormat::NONE);
        while !current.is_none() {
            if self.api().get_data(current).is_some() {
                formats.push(current);
            } else {
                debug!(format = %current, "Skipping unrendered format");
            }
            current = self.api().next_format(current);
        }
        formats
    }

    fn data_handle(&self, format: ClipboardFormat) -> Result<MemoryHandle, AccessError> {
        self.api()
            .get_data(format)
            .ok_or(AccessError::FormatUnavailable(format))
    }

    /// Size in bytes of a format's data
    pub fn format_size(&self, format: ClipboardFormat) -> Result<usize, AccessError> {
        let handle = self.data_handle(format)?;
        Ok(self.api().global_size(handle))
    }

    /// Copy a format's data out of the clipboard.
    pub fn read_format(&self, format: ClipboardFormat) -> Result<Vec<u8>, AccessError> {
        let handle = self.data_handle(format)?;
        let locked = LockedMemory::lock(self.api(), handle)
            .ok_or(AccessError::LockFailed(format))?;
        Ok(locked.as_slice().to_vec())
    }

    /// Hand a copy of `bytes` to the clipboard under `format`.
    pub fn write_format(&self, format: ClipboardFormat, bytes: &[u8]) -> Result<(), AccessError> {
        let memory = OwnedGlobal::alloc(self.api(), bytes.len())
            .ok_or(AccessError::AllocationFailed(bytes.len()))?;

        {
            let mut locked = LockedMemory::lock(self.api(), memory.handle())
                .ok_or(AccessError::LockFailed(format))?;
            locked.as_mut_slice()[..bytes.len()].copy_from_slice(bytes);
        }

        if !self.api().set_data(format, memory.handle()) {
            return Err(AccessError::HandoffFailed(format));
        }
        memory.release();
        Ok(())
    }

    /// Remove every format
    pub fn clear(&self) -> Result<(), AccessError> {
        if self.api().empty() {
            Ok(())
        } else {
            Err(AccessError::ClearFailed)
        }
    }

    pub fn sequence_number(&self) -> u32 {
        self.api().sequence_number()
    }

    /// Decode the first available format of the text table.
    pub fn read_text(&self) -> Option<String> {
        let code_pages = self.accessor.code_pages();
        for entry in self.accessor.text_formats.entries() {
            if !self.api().is_format_available(entry.format) {
                continue;
            }
            match self.read_format(entry.format) {
                Ok(bytes) => return Some(entry.encoding.decode(&bytes, &code_pages)),
                Err(e) => debug!(format = %entry.format, error = %e, "Skipping unreadable text format"),
            }
        }
        None
    }

    /// Replace the contents with UTF-16 text only.
    pub fn set_text(&self, text: &str) -> Result<(), AccessError> {
        self.clear()?;
        self.write_format(ClipboardFormat::UNICODE_TEXT, &encode_unicode_text(text))
    }
}

impl<A: ClipboardApi> Drop for ClipboardSession<'_, A> {
    fn drop(&mut self) {
        if !self.api().close() {
            warn!("Failed to close clipboard");
        }
    }
}

/// Locked global memory, unlocked on drop
struct LockedMemory<'a, A: ClipboardApi> {
    api: &'a A,
    handle: MemoryHandle,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a, A: ClipboardApi> LockedMemory<'a, A> {
    fn lock(api: &'a A, handle: MemoryHandle) -> Option<Self> {
        let len = api.global_size(handle);
        let ptr = api.global_lock(handle)?;
        Some(Self {
            api,
            handle,
            ptr,
            len,
        })
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: ClipboardApi guarantees the pointer covers `len` bytes while locked
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and this guard is the only user of the block
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: ClipboardApi> Drop for LockedMemory<'_, A> {
    fn drop(&mut self) {
        self.api.global_unlock(self.handle);
    }
}

/// Caller-owned global memory, freed on drop unless released to the clipboard
struct OwnedGlobal<'a, A: ClipboardApi> {
    api: &'a A,
    handle: Option<MemoryHandle>,
}

impl<'a, A: ClipboardApi> OwnedGlobal<'a, A> {
    fn alloc(api: &'a A, size: usize) -> Option<Self> {
        let handle = api.global_alloc(size)?;
        Some(Self {
            api,
            handle: Some(handle),
        })
    }

    fn handle(&self) -> MemoryHandle {
        // Only `release` clears the handle and it consumes the guard
        self.handle.unwrap_or(MemoryHandle(0))
    }

    /// Ownership moved to the clipboard
    fn release(mut self) {
        self.handle = None;
    }
}

impl<A: ClipboardApi> Drop for OwnedGlobal<'_, A> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.api.global_free(handle);
        }
    }
}
