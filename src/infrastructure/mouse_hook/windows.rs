//! Win32 low-level mouse hook
//!
//! The hook lives on its own thread with a message loop. Low-level hook
//! callbacks run on the installing thread, so the tracker and sender are
//! kept in a thread local there. Only one hook can be installed per process.

use std::cell::RefCell;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::thread;

use tracing::{debug, warn};
use windows_sys::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, GetSystemMetrics, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE, SM_CXDRAG,
    WH_MOUSE_LL, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE,
    WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_USER,
};

use crate::application::ports::{DragEventSender, HookHandle, MouseHook, MouseHookError};
use crate::domain::selection::{
    DragTracker, MouseButton, Point, RawMouseInput, DEFAULT_DRAG_THRESHOLD,
};

static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static HOOK_STATE: RefCell<Option<(DragTracker, DragEventSender)>> = const { RefCell::new(None) };
}

/// System-wide mouse hook based on `WH_MOUSE_LL`
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsMouseHook;

impl WindowsMouseHook {
    pub fn new() -> Self {
        Self
    }
}

/// Drag threshold from the system metrics, or the default if unavailable
fn drag_threshold() -> i32 {
    match unsafe { GetSystemMetrics(SM_CXDRAG) } {
        0 => DEFAULT_DRAG_THRESHOLD,
        pixels => pixels,
    }
}

fn raw_input(message: u32, at: Point) -> Option<RawMouseInput> {
    let input = match message {
        WM_MOUSEMOVE => RawMouseInput::Move(at),
        WM_LBUTTONDOWN => RawMouseInput::Down(MouseButton::Left, at),
        WM_LBUTTONUP => RawMouseInput::Up(MouseButton::Left, at),
        WM_RBUTTONDOWN => RawMouseInput::Down(MouseButton::Right, at),
        WM_RBUTTONUP => RawMouseInput::Up(MouseButton::Right, at),
        WM_MBUTTONDOWN => RawMouseInput::Down(MouseButton::Middle, at),
        WM_MBUTTONUP => RawMouseInput::Up(MouseButton::Middle, at),
        _ => return None,
    };
    Some(input)
}

unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && lparam != 0 {
        let info = &*(lparam as *const MSLLHOOKSTRUCT);
        let at = Point::new(info.pt.x, info.pt.y);
        if let Some(input) = raw_input(wparam as u32, at) {
            HOOK_STATE.with(|state| {
                if let Some((tracker, sender)) = state.borrow_mut().as_mut() {
                    if let Some(event) = tracker.feed(input) {
                        let _ = sender.send(event);
                    }
                }
            });
        }
    }
    CallNextHookEx(ptr::null_mut(), code, wparam, lparam)
}

/// Body of the hook thread. Reports the thread id once the hook is live.
fn run_hook_thread(events: DragEventSender, ready: std_mpsc::Sender<Result<u32, MouseHookError>>) {
    HOOK_STATE.with(|state| *state.borrow_mut() = Some((DragTracker::new(drag_threshold()), events)));

    let hook = unsafe {
        SetWindowsHookExW(
            WH_MOUSE_LL,
            Some(mouse_proc),
            GetModuleHandleW(ptr::null()),
            0,
        )
    };
    if hook.is_null() {
        let _ = ready.send(Err(MouseHookError::InstallFailed(
            std::io::Error::last_os_error().to_string(),
        )));
        HOOK_STATE.with(|state| state.borrow_mut().take());
        return;
    }

    unsafe {
        let mut msg: MSG = mem::zeroed();
        // Create the message queue before anyone posts WM_QUIT to it
        PeekMessageW(&mut msg, ptr::null_mut(), WM_USER, WM_USER, PM_NOREMOVE);
        let _ = ready.send(Ok(GetCurrentThreadId()));

        while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {}

        UnhookWindowsHookEx(hook);
    }
    HOOK_STATE.with(|state| state.borrow_mut().take());
    debug!("Mouse hook thread exited");
}

impl MouseHook for WindowsMouseHook {
    fn install(&self, events: DragEventSender) -> Result<HookHandle, MouseHookError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(MouseHookError::AlreadyInstalled);
        }

        let (ready_tx, ready_rx) = std_mpsc::channel();
        let spawned = thread::Builder::new()
            .name("selgrab-mouse-hook".into())
            .spawn(move || run_hook_thread(events, ready_tx));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                INSTALLED.store(false, Ordering::SeqCst);
                return Err(MouseHookError::InstallFailed(e.to_string()));
            }
        };

        let thread_id = match ready_rx.recv() {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                let _ = thread.join();
                INSTALLED.store(false, Ordering::SeqCst);
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                INSTALLED.store(false, Ordering::SeqCst);
                return Err(MouseHookError::InstallFailed("hook thread exited".into()));
            }
        };
        debug!(thread_id, "Mouse hook installed");

        Ok(HookHandle::new(move || stop_hook_thread(thread_id, thread)))
    }
}

/// Ask the hook thread to quit and wait for it.
///
/// The install slot is only freed once the thread is gone. If `WM_QUIT`
/// cannot be posted the hook is still live, so a second install keeps
/// failing with `AlreadyInstalled`.
fn stop_hook_thread(thread_id: u32, thread: thread::JoinHandle<()>) {
    if unsafe { PostThreadMessageW(thread_id, WM_QUIT, 0, 0) } == 0 {
        warn!(
            thread_id,
            error = %std::io::Error::last_os_error(),
            "Failed to stop mouse hook thread, hook stays installed"
        );
        return;
    }
    if thread.join().is_err() {
        warn!("Mouse hook thread panicked");
    }
    INSTALLED.store(false, Ordering::SeqCst);
    debug!("Mouse hook removed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_loop_thread() -> (u32, thread::JoinHandle<()>) {
        let (tx, rx) = std_mpsc::channel();
        let thread = thread::spawn(move || unsafe {
            let mut msg: MSG = mem::zeroed();
            PeekMessageW(&mut msg, ptr::null_mut(), WM_USER, WM_USER, PM_NOREMOVE);
            tx.send(GetCurrentThreadId()).unwrap();
            while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {}
        });
        (rx.recv().unwrap(), thread)
    }

    #[test]
    fn install_slot_survives_failed_quit_post() {
        INSTALLED.store(true, Ordering::SeqCst);
        let (thread_id, thread) = message_loop_thread();

        // Thread id 0 never has a message queue
        stop_hook_thread(0, thread::spawn(|| {}));
        assert!(INSTALLED.load(Ordering::SeqCst));

        stop_hook_thread(thread_id, thread);
        assert!(!INSTALLED.load(Ordering::SeqCst));
    }
}
