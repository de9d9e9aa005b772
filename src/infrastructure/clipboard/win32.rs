//! Win32 clipboard adapter

use std::ffi::c_void;
use std::ptr::{self, NonNull};

use windows_sys::Win32::Globalization::{GetACP, GetOEMCP};
use windows_sys::Win32::System::DataExchange::{
    CloseClipboard, EmptyClipboard, EnumClipboardFormats, GetClipboardData,
    GetClipboardSequenceNumber, IsClipboardFormatAvailable, OpenClipboard, SetClipboardData,
};
use windows_sys::Win32::System::Memory::{
    GlobalAlloc, GlobalFree, GlobalLock, GlobalSize, GlobalUnlock, GMEM_MOVEABLE,
};

use crate::application::ports::{ClipboardApi, MemoryHandle};
use crate::domain::clipboard::{ClipboardFormat, CodePageKind};

/// The system clipboard, accessed through user32 and kernel32
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Clipboard;

impl Win32Clipboard {
    pub fn new() -> Self {
        Self
    }
}

fn to_raw(handle: MemoryHandle) -> *mut c_void {
    handle.0 as *mut c_void
}

fn from_raw(raw: *mut c_void) -> Option<MemoryHandle> {
    (!raw.is_null()).then(|| MemoryHandle(raw as usize))
}

// SAFETY: GlobalLock on movable memory returns a pointer to at least
// GlobalSize bytes that stays valid until GlobalUnlock.
unsafe impl ClipboardApi for Win32Clipboard {
    fn open(&self) -> bool {
        unsafe { OpenClipboard(ptr::null_mut()) != 0 }
    }

    fn close(&self) -> bool {
        unsafe { CloseClipboard() != 0 }
    }

    fn empty(&self) -> bool {
        unsafe { EmptyClipboard() != 0 }
    }

    fn next_format(&self, previous: ClipboardFormat) -> ClipboardFormat {
        ClipboardFormat::new(unsafe { EnumClipboardFormats(previous.id()) })
    }

    fn is_format_available(&self, format: ClipboardFormat) -> bool {
        unsafe { IsClipboardFormatAvailable(format.id()) != 0 }
    }

    fn get_data(&self, format: ClipboardFormat) -> Option<MemoryHandle> {
        from_raw(unsafe { GetClipboardData(format.id()) })
    }

    fn set_data(&self, format: ClipboardFormat, handle: MemoryHandle) -> bool {
        unsafe { !SetClipboardData(format.id(), to_raw(handle)).is_null() }
    }

    fn sequence_number(&self) -> u32 {
        unsafe { GetClipboardSequenceNumber() }
    }

    fn global_alloc(&self, size: usize) -> Option<MemoryHandle> {
        from_raw(unsafe { GlobalAlloc(GMEM_MOVEABLE, size) })
    }

    fn global_size(&self, handle: MemoryHandle) -> usize {
        unsafe { GlobalSize(to_raw(handle)) }
    }

    fn global_lock(&self, handle: MemoryHandle) -> Option<NonNull<u8>> {
        NonNull::new(unsafe { GlobalLock(to_raw(handle)) }.cast::<u8>())
    }

    fn global_unlock(&self, handle: MemoryHandle) {
        // Returns zero once the lock count reaches zero, which is the normal case
        unsafe {
            GlobalUnlock(to_raw(handle));
        }
    }

    fn global_free(&self, handle: MemoryHandle) {
        unsafe {
            GlobalFree(to_raw(handle));
        }
    }

    fn code_page(&self, kind: CodePageKind) -> u32 {
        match kind {
            CodePageKind::Ansi => unsafe { GetACP() },
            CodePageKind::Oem => unsafe { GetOEMCP() },
        }
    }
}
