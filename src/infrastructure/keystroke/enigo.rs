//! Keystroke adapter using enigo
//!
//! Sends Control+letter shortcuts to the focused window. Any modifier left
//! pressed by the hotkey that triggered the capture would turn Control+C
//! into something else, so all of them are released first.

use async_trait::async_trait;
use ::enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::debug;

use crate::application::ports::{Keystroke, KeystrokeError, Shortcut};

/// Modifiers released before every shortcut
#[cfg(windows)]
fn modifier_keys() -> Vec<Key> {
    // Generic, left and right variants of Control, Alt, Shift and the Windows keys
    const VK_CODES: [u32; 11] = [
        0x11, 0xA2, 0xA3, // VK_CONTROL, VK_LCONTROL, VK_RCONTROL
        0x12, 0xA4, 0xA5, // VK_MENU, VK_LMENU, VK_RMENU
        0x10, 0xA0, 0xA1, // VK_SHIFT, VK_LSHIFT, VK_RSHIFT
        0x5B, 0x5C, // VK_LWIN, VK_RWIN
    ];
    VK_CODES.iter().map(|vk| Key::Other(*vk)).collect()
}

#[cfg(not(windows))]
fn modifier_keys() -> Vec<Key> {
    vec![Key::Control, Key::Alt, Key::Shift, Key::Meta]
}

/// Key for the shortcut letter
fn letter_key(shortcut: Shortcut) -> Key {
    #[cfg(windows)]
    {
        // Virtual key codes for C and V match their uppercase ASCII values
        Key::Other(shortcut.letter().to_ascii_uppercase() as u32)
    }

    #[cfg(not(windows))]
    {
        Key::Unicode(shortcut.letter())
    }
}

fn send_failed(e: impl std::fmt::Display) -> KeystrokeError {
    KeystrokeError::SendFailed(e.to_string())
}

/// Press the shortcut on the calling thread
fn send_blocking(shortcut: Shortcut) -> Result<(), KeystrokeError> {
    let mut enigo = Enigo::new(&Settings::default())
        .map_err(|e| KeystrokeError::SendFailed(format!("Failed to create enigo: {}", e)))?;

    for key in modifier_keys() {
        enigo.key(key, Direction::Release).map_err(send_failed)?;
    }

    enigo.key(Key::Control, Direction::Press).map_err(send_failed)?;
    let clicked = enigo.key(letter_key(shortcut), Direction::Click);
    // Control must come back up even if the letter failed
    let released = enigo.key(Key::Control, Direction::Release);
    clicked.map_err(send_failed)?;
    released.map_err(send_failed)
}

/// Cross-platform keystroke adapter using enigo
pub struct EnigoKeystroke;

impl EnigoKeystroke {
    /// Create a new enigo keystroke adapter
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnigoKeystroke {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Keystroke for EnigoKeystroke {
    async fn send_shortcut(&self, shortcut: Shortcut) -> Result<(), KeystrokeError> {
        debug!(%shortcut, "Sending shortcut");

        // enigo operations are blocking, so run in spawn_blocking
        tokio::task::spawn_blocking(move || send_blocking(shortcut))
            .await
            .map_err(|e| KeystrokeError::SendFailed(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keystroke_creates_successfully() {
        let _keystroke = EnigoKeystroke::new();
    }

    #[test]
    fn releases_every_modifier_family() {
        let keys = modifier_keys();
        #[cfg(windows)]
        assert_eq!(keys.len(), 11);
        #[cfg(not(windows))]
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn letter_keys_differ_per_shortcut() {
        assert_ne!(letter_key(Shortcut::Copy), letter_key(Shortcut::Paste));
    }
}
