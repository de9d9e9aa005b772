//! In-memory clipboard adapter
//!
//! Behaves like the OS clipboard closely enough to run the whole capture
//! protocol without a desktop session, and counts every open, close,
//! allocation and free so tests can check that nothing leaks.

use std::collections::{HashMap, HashSet};
use std::ptr::NonNull;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use crate::application::ports::{ClipboardApi, MemoryHandle};
use crate::domain::clipboard::{encode_unicode_text, ClipboardFormat, CodePageKind, CodePages};

/// Call counters recorded by [`MemoryClipboard`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Successful opens
    pub opens: u32,
    /// Successful closes
    pub closes: u32,
    /// Opens refused because the clipboard was busy
    pub busy_rejections: u32,
    /// Caller allocations
    pub allocations: u32,
    /// Caller frees of caller-owned memory
    pub frees: u32,
    /// Allocations whose ownership moved to the clipboard
    pub handoffs: u32,
    /// Frees of unknown or clipboard-owned handles
    pub invalid_frees: u32,
    /// Locks not yet unlocked
    pub outstanding_locks: u32,
}

struct Block {
    data: Box<[u8]>,
    locks: u32,
    /// Set once the clipboard owns the block
    format: Option<ClipboardFormat>,
    /// Replaced while locked. Freed by the last unlock.
    detached: bool,
}

#[derive(Default)]
struct State {
    open: bool,
    owner: Option<ThreadId>,
    busy_opens: u32,
    /// Offered formats in enumeration order. `None` means not yet rendered.
    formats: Vec<(ClipboardFormat, Option<MemoryHandle>)>,
    blocks: HashMap<usize, Block>,
    next_handle: usize,
    sequence: u32,
    fail_handoff: HashSet<ClipboardFormat>,
    fail_lock: HashSet<ClipboardFormat>,
    code_pages: CodePages,
    stats: MemoryStats,
}

impl State {
    fn new_block(&mut self, data: Box<[u8]>, format: Option<ClipboardFormat>) -> MemoryHandle {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.blocks.insert(
            handle,
            Block {
                data,
                locks: 0,
                format,
                detached: false,
            },
        );
        MemoryHandle(handle)
    }

    /// Drop a clipboard-owned block, or leave it to its last unlock
    fn discard_block(&mut self, handle: MemoryHandle) {
        match self.blocks.get_mut(&handle.0) {
            Some(block) if block.locks > 0 => block.detached = true,
            Some(_) => {
                self.blocks.remove(&handle.0);
            }
            None => {}
        }
    }

    /// Drop every clipboard-owned block
    fn discard_contents(&mut self) {
        let handles: Vec<_> = self
            .formats
            .drain(..)
            .filter_map(|(_, handle)| handle)
            .collect();
        for handle in handles {
            self.discard_block(handle);
        }
    }
}

/// Clipboard kept in process memory. Clones share the same clipboard.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    state: Arc<Mutex<State>>,
    closed: Arc<Condvar>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind, keep using it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the contents as another application would, bumping the sequence number.
    ///
    /// Like another process, this waits while a different thread has the
    /// clipboard open. Blocks still locked by a reader stay alive until
    /// they are unlocked.
    pub fn seed(&self, entries: &[(ClipboardFormat, &[u8])]) {
        let me = thread::current().id();
        let mut state = self.state();
        while state.open && state.owner != Some(me) {
            state = self
                .closed
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.discard_contents();
        for (format, bytes) in entries {
            let handle = state.new_block(bytes.to_vec().into_boxed_slice(), Some(*format));
            state.formats.push((*format, Some(handle)));
        }
        state.sequence = state.sequence.wrapping_add(1);
    }

    /// Replace the contents with UTF-16 text
    pub fn seed_text(&self, text: &str) {
        let payload = encode_unicode_text(text);
        self.seed(&[(ClipboardFormat::UNICODE_TEXT, payload.as_slice())]);
    }

    /// Offer a format whose data is never rendered
    pub fn defer_rendering(&self, format: ClipboardFormat) {
        self.state().formats.push((format, None));
    }

    /// Refuse the next `count` open attempts
    pub fn hold_busy(&self, count: u32) {
        self.state().busy_opens = count;
    }

    /// Make `set_data` reject a format
    pub fn fail_handoff(&self, format: ClipboardFormat) {
        self.state().fail_handoff.insert(format);
    }

    /// Make locking a format's data fail
    pub fn fail_lock(&self, format: ClipboardFormat) {
        self.state().fail_lock.insert(format);
    }

    pub fn set_code_pages(&self, code_pages: CodePages) {
        self.state().code_pages = code_pages;
    }

    /// Rendered formats and their payloads, in enumeration order
    pub fn contents(&self) -> Vec<(ClipboardFormat, Vec<u8>)> {
        let state = self.state();
        state
            .formats
            .iter()
            .filter_map(|(format, handle)| {
                let block = state.blocks.get(&(*handle)?.0)?;
                Some((*format, block.data.to_vec()))
            })
            .collect()
    }

    /// UTF-16 text payload, decoded up to the terminator
    pub fn unicode_text(&self) -> Option<String> {
        let (_, bytes) = self
            .contents()
            .into_iter()
            .find(|(format, _)| *format == ClipboardFormat::UNICODE_TEXT)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|unit| *unit != 0)
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn stats(&self) -> MemoryStats {
        let state = self.state();
        MemoryStats {
            outstanding_locks: state.blocks.values().map(|b| b.locks).sum(),
            ..state.stats
        }
    }
}

unsafe impl ClipboardApi for MemoryClipboard {
    fn open(&self) -> bool {
        let mut state = self.state();
        if state.busy_opens > 0 {
            state.busy_opens -= 1;
            state.stats.busy_rejections += 1;
            return false;
        }
        if state.open {
            state.stats.busy_rejections += 1;
            return false;
        }
        state.open = true;
        state.owner = Some(thread::current().id());
        state.stats.opens += 1;
        true
    }

    fn close(&self) -> bool {
        let mut state = self.state();
        if !state.open {
            return false;
        }
        state.open = false;
        state.owner = None;
        state.stats.closes += 1;
        drop(state);
        self.closed.notify_all();
        true
    }

    fn empty(&self) -> bool {
        let mut state = self.state();
        if !state.open {
            return false;
        }
        state.discard_contents();
        state.sequence = state.sequence.wrapping_add(1);
        true
    }

    fn next_format(&self, previous: ClipboardFormat) -> ClipboardFormat {
        let state = self.state();
        if !state.open {
            return ClipboardFormat::NONE;
        }
        let next = if previous.is_none() {
            state.formats.first()
        } else {
            state
                .formats
                .iter()
                .position(|(format, _)| *format == previous)
                .and_then(|index| state.formats.get(index + 1))
        };
        next.map_or(ClipboardFormat::NONE, |(format, _)| *format)
    }

    fn is_format_available(&self, format: ClipboardFormat) -> bool {
        self.state().formats.iter().any(|(f, _)| *f == format)
    }

    fn get_data(&self, format: ClipboardFormat) -> Option<MemoryHandle> {
        let state = self.state();
        if !state.open {
            return None;
        }
        state
            .formats
            .iter()
            .find(|(f, _)| *f == format)
            .and_then(|(_, handle)| *handle)
    }

    fn set_data(&self, format: ClipboardFormat, handle: MemoryHandle) -> bool {
        let mut state = self.state();
        if !state.open || state.fail_handoff.contains(&format) {
            return false;
        }
        match state.blocks.get_mut(&handle.0) {
            Some(block) if block.format.is_none() => block.format = Some(format),
            _ => return false,
        }

        if let Some(index) = state.formats.iter().position(|(f, _)| *f == format) {
            let (_, old) = state.formats.remove(index);
            if let Some(old) = old {
                state.discard_block(old);
            }
        }
        state.formats.push((format, Some(handle)));
        state.sequence = state.sequence.wrapping_add(1);
        state.stats.handoffs += 1;
        true
    }

    fn sequence_number(&self) -> u32 {
        self.state().sequence
    }

    fn global_alloc(&self, size: usize) -> Option<MemoryHandle> {
        if size == 0 {
            return None;
        }
        let mut state = self.state();
        state.stats.allocations += 1;
        Some(state.new_block(vec![0u8; size].into_boxed_slice(), None))
    }

    fn global_size(&self, handle: MemoryHandle) -> usize {
        self.state()
            .blocks
            .get(&handle.0)
            .map_or(0, |block| block.data.len())
    }

    fn global_lock(&self, handle: MemoryHandle) -> Option<NonNull<u8>> {
        let mut state = self.state();
        let fail_lock = &state.fail_lock;
        let failing = state
            .blocks
            .get(&handle.0)
            .and_then(|block| block.format)
            .is_some_and(|format| fail_lock.contains(&format));
        if failing {
            return None;
        }
        let block = state.blocks.get_mut(&handle.0)?;
        block.locks += 1;
        // The boxed slice never moves while the block exists
        NonNull::new(block.data.as_mut_ptr())
    }

    fn global_unlock(&self, handle: MemoryHandle) {
        let mut state = self.state();
        let Some(block) = state.blocks.get_mut(&handle.0) else {
            return;
        };
        block.locks = block.locks.saturating_sub(1);
        if block.detached && block.locks == 0 {
            state.blocks.remove(&handle.0);
        }
    }

    fn global_free(&self, handle: MemoryHandle) {
        let mut state = self.state();
        let caller_owned = state
            .blocks
            .get(&handle.0)
            .is_some_and(|block| block.format.is_none());
        if caller_owned {
            state.blocks.remove(&handle.0);
            state.stats.frees += 1;
        } else {
            state.stats.invalid_frees += 1;
        }
    }

    fn code_page(&self, kind: CodePageKind) -> u32 {
        self.state().code_pages.get(kind)
    }
}
