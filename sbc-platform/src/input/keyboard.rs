//! Keyboard and text-input translation.

use crate::abi::{InputEvent, Key, KeyEvent, KeyModifiers, MAIN_WINDOW_ID};
use crate::keymap::resolve_key;
use crate::native::{KeyMod, Keycode, Scancode};

/// Host modifier set for a native modifier mask. Left and right variants both count.
pub fn modifiers_from(keymod: KeyMod) -> KeyModifiers {
    let mut mods = KeyModifiers::empty();
    mods.set(KeyModifiers::SHIFT, keymod.intersects(KeyMod::SHIFT));
    mods.set(KeyModifiers::ALT, keymod.intersects(KeyMod::ALT));
    mods.set(KeyModifiers::CTRL, keymod.intersects(KeyMod::CTRL));
    mods.set(KeyModifiers::META, keymod.intersects(KeyMod::GUI));
    mods
}

/// Key press/release. `None` when neither the symbol nor the scancode maps.
pub fn key_event(
    keycode: Keycode,
    scancode: Scancode,
    keymod: KeyMod,
    pressed: bool,
    repeat: bool,
) -> Option<InputEvent> {
    let (logical, physical) = resolve_key(keycode, scancode)?;
    Some(InputEvent::Key(KeyEvent {
        window_id: MAIN_WINDOW_ID,
        keycode: logical,
        physical_keycode: physical,
        unicode: None,
        pressed,
        echo: repeat,
        modifiers: modifiers_from(keymod),
    }))
}

/// One pressed, non-echo key event per codepoint, carrying only the unicode payload.
pub fn text_events(text: &str) -> impl Iterator<Item = InputEvent> + '_ {
    text.chars().map(|c| {
        InputEvent::Key(KeyEvent {
            window_id: MAIN_WINDOW_ID,
            keycode: Key::NONE,
            physical_keycode: Key::NONE,
            unicode: Some(c),
            pressed: true,
            echo: false,
            modifiers: KeyModifiers::empty(),
        })
    })
}
