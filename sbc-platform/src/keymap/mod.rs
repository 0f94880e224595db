//! Keycode translation.
//!
//! Pure, total mappings from native key symbols / scancodes to host [`Key`]s.
//! Unmapped input yields [`Key::NONE`]; nothing here fails.

use crate::abi::Key;
use crate::native::{Keycode, Scancode};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Non-contiguous symbols. Letters, digits and F/keypad ranges are computed.
    static ref LOGICAL_KEYS: HashMap<Keycode, Key> = {
        let pairs = [
            (Keycode::RETURN, Key::ENTER),
            (Keycode::RETURN2, Key::ENTER),
            (Keycode::ESCAPE, Key::ESCAPE),
            (Keycode::BACKSPACE, Key::BACKSPACE),
            (Keycode::TAB, Key::TAB),
            (Keycode::SPACE, Key::SPACE),
            (Keycode::QUOTE, Key::APOSTROPHE),
            (Keycode::COMMA, Key::COMMA),
            (Keycode::MINUS, Key::MINUS),
            (Keycode::PERIOD, Key::PERIOD),
            (Keycode::SLASH, Key::SLASH),
            (Keycode::SEMICOLON, Key::SEMICOLON),
            (Keycode::EQUALS, Key::EQUAL),
            (Keycode::LEFT_BRACKET, Key::BRACKET_LEFT),
            (Keycode::BACKSLASH, Key::BACKSLASH),
            (Keycode::RIGHT_BRACKET, Key::BRACKET_RIGHT),
            (Keycode::BACKQUOTE, Key::QUOTE_LEFT),
            (Keycode::DELETE, Key::DELETE),
            (Keycode::CAPS_LOCK, Key::CAPS_LOCK),
            (Keycode::PRINT_SCREEN, Key::PRINT),
            (Keycode::SYSREQ, Key::SYSREQ),
            (Keycode::SCROLL_LOCK, Key::SCROLL_LOCK),
            (Keycode::PAUSE, Key::PAUSE),
            (Keycode::INSERT, Key::INSERT),
            (Keycode::HOME, Key::HOME),
            (Keycode::PAGE_UP, Key::PAGE_UP),
            (Keycode::PRIOR, Key::PAGE_UP),
            (Keycode::END, Key::END),
            (Keycode::PAGE_DOWN, Key::PAGE_DOWN),
            (Keycode::CLEAR, Key::CLEAR),
            (Keycode::RIGHT, Key::RIGHT),
            (Keycode::LEFT, Key::LEFT),
            (Keycode::DOWN, Key::DOWN),
            (Keycode::UP, Key::UP),
            (Keycode::NUM_LOCK_CLEAR, Key::NUM_LOCK),
            (Keycode::KP_DIVIDE, Key::KP_DIVIDE),
            (Keycode::KP_MULTIPLY, Key::KP_MULTIPLY),
            (Keycode::KP_MINUS, Key::KP_SUBTRACT),
            (Keycode::KP_PLUS, Key::KP_ADD),
            (Keycode::KP_ENTER, Key::KP_ENTER),
            (Keycode::KP_PERIOD, Key::KP_PERIOD),
            (Keycode::KP_COMMA, Key::KP_PERIOD),
            (Keycode::KP_EQUALS, Key::EQUAL),
            (Keycode::KP_0, Key::keypad(0)),
            (Keycode::APPLICATION, Key::MENU),
            (Keycode::MENU, Key::MENU),
            (Keycode::HELP, Key::HELP),
            (Keycode::MUTE, Key::VOLUME_MUTE),
            (Keycode::VOLUME_UP, Key::VOLUME_UP),
            (Keycode::VOLUME_DOWN, Key::VOLUME_DOWN),
            (Keycode::LCTRL, Key::CTRL),
            (Keycode::RCTRL, Key::CTRL),
            (Keycode::LSHIFT, Key::SHIFT),
            (Keycode::RSHIFT, Key::SHIFT),
            (Keycode::LALT, Key::ALT),
            (Keycode::RALT, Key::ALT),
            (Keycode::LGUI, Key::META),
            (Keycode::RGUI, Key::META),
        ];
        pairs.into_iter().collect()
    };
}

/// Offset of `code` inside `[first, last]`, if it falls there.
fn range_offset(code: Keycode, first: Keycode, last: Keycode) -> Option<u32> {
    (first.0..=last.0)
        .contains(&code.0)
        .then(|| (code.0 - first.0) as u32)
}

/// Native key symbol -> logical host key.
pub fn translate_logical(sym: Keycode) -> Key {
    if let Some(key) = LOGICAL_KEYS.get(&sym) {
        return *key;
    }
    if let Some(n) = range_offset(sym, Keycode::A, Keycode::Z) {
        return Key(u32::from(b'A') + n);
    }
    if let Some(n) = range_offset(sym, Keycode::NUM_0, Keycode::NUM_9) {
        return Key(u32::from(b'0') + n);
    }
    if let Some(n) = range_offset(sym, Keycode::F1, Keycode::F12) {
        return Key::function(n + 1);
    }
    if let Some(n) = range_offset(sym, Keycode::F13, Keycode::F24) {
        return Key::function(n + 13);
    }
    if let Some(n) = range_offset(sym, Keycode::KP_1, Keycode::KP_9) {
        return Key::keypad(n + 1);
    }
    Key::NONE
}

/// Native scancode -> physical host key. The unknown scancode maps to [`Key::NONE`].
pub fn translate_physical(scancode: Scancode) -> Key {
    if scancode == Scancode::UNKNOWN {
        return Key::NONE;
    }
    Key::physical(scancode.0)
}

/// Resolve `(logical, physical)` for a key occurrence.
///
/// An unmapped logical key adopts the physical key. Returns `None` when neither maps, in
/// which case the occurrence must be discarded.
pub fn resolve_key(sym: Keycode, scancode: Scancode) -> Option<(Key, Key)> {
    let logical = translate_logical(sym);
    let physical = translate_physical(scancode);
    match (logical.is_none(), physical.is_none()) {
        (true, true) => None,
        (true, false) => Some((physical, physical)),
        _ => Some((logical, physical)),
    }
}
