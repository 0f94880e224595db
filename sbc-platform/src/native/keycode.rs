//! Native key symbols, scancodes and modifier bits.
//!
//! Values follow SDL2's numbering so a backend can pass them straight through.

use bitflags::bitflags;

/// Native layout-dependent key symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Keycode(pub i32);

/// Symbols derived from a scancode carry this bit.
const SCANCODE_MASK: i32 = 1 << 30;

const fn from_scancode(scancode: i32) -> Keycode {
    Keycode(scancode | SCANCODE_MASK)
}

impl Keycode {
    pub const UNKNOWN: Keycode = Keycode(0);

    pub const BACKSPACE: Keycode = Keycode(0x08);
    pub const TAB: Keycode = Keycode(0x09);
    pub const RETURN: Keycode = Keycode(0x0D);
    pub const ESCAPE: Keycode = Keycode(0x1B);
    pub const SPACE: Keycode = Keycode(0x20);
    pub const QUOTE: Keycode = Keycode(0x27);
    pub const COMMA: Keycode = Keycode(0x2C);
    pub const MINUS: Keycode = Keycode(0x2D);
    pub const PERIOD: Keycode = Keycode(0x2E);
    pub const SLASH: Keycode = Keycode(0x2F);
    pub const NUM_0: Keycode = Keycode(0x30);
    pub const NUM_9: Keycode = Keycode(0x39);
    pub const SEMICOLON: Keycode = Keycode(0x3B);
    pub const EQUALS: Keycode = Keycode(0x3D);
    pub const LEFT_BRACKET: Keycode = Keycode(0x5B);
    pub const BACKSLASH: Keycode = Keycode(0x5C);
    pub const RIGHT_BRACKET: Keycode = Keycode(0x5D);
    pub const BACKQUOTE: Keycode = Keycode(0x60);
    pub const A: Keycode = Keycode(0x61);
    pub const Z: Keycode = Keycode(0x7A);
    pub const DELETE: Keycode = Keycode(0x7F);

    pub const CAPS_LOCK: Keycode = from_scancode(57);
    pub const F1: Keycode = from_scancode(58);
    pub const F12: Keycode = from_scancode(69);
    pub const PRINT_SCREEN: Keycode = from_scancode(70);
    pub const SCROLL_LOCK: Keycode = from_scancode(71);
    pub const PAUSE: Keycode = from_scancode(72);
    pub const INSERT: Keycode = from_scancode(73);
    pub const HOME: Keycode = from_scancode(74);
    pub const PAGE_UP: Keycode = from_scancode(75);
    pub const END: Keycode = from_scancode(77);
    pub const PAGE_DOWN: Keycode = from_scancode(78);
    pub const RIGHT: Keycode = from_scancode(79);
    pub const LEFT: Keycode = from_scancode(80);
    pub const DOWN: Keycode = from_scancode(81);
    pub const UP: Keycode = from_scancode(82);
    pub const NUM_LOCK_CLEAR: Keycode = from_scancode(83);
    pub const KP_DIVIDE: Keycode = from_scancode(84);
    pub const KP_MULTIPLY: Keycode = from_scancode(85);
    pub const KP_MINUS: Keycode = from_scancode(86);
    pub const KP_PLUS: Keycode = from_scancode(87);
    pub const KP_ENTER: Keycode = from_scancode(88);
    pub const KP_1: Keycode = from_scancode(89);
    pub const KP_9: Keycode = from_scancode(97);
    pub const KP_0: Keycode = from_scancode(98);
    pub const KP_PERIOD: Keycode = from_scancode(99);
    pub const APPLICATION: Keycode = from_scancode(101);
    pub const KP_EQUALS: Keycode = from_scancode(103);
    pub const F13: Keycode = from_scancode(104);
    pub const F24: Keycode = from_scancode(115);
    pub const HELP: Keycode = from_scancode(117);
    pub const MENU: Keycode = from_scancode(118);
    pub const MUTE: Keycode = from_scancode(127);
    pub const VOLUME_UP: Keycode = from_scancode(128);
    pub const VOLUME_DOWN: Keycode = from_scancode(129);
    pub const KP_COMMA: Keycode = from_scancode(133);
    pub const SYSREQ: Keycode = from_scancode(154);
    pub const CLEAR: Keycode = from_scancode(156);
    pub const PRIOR: Keycode = from_scancode(157);
    pub const RETURN2: Keycode = from_scancode(158);
    pub const LCTRL: Keycode = from_scancode(224);
    pub const LSHIFT: Keycode = from_scancode(225);
    pub const LALT: Keycode = from_scancode(226);
    pub const LGUI: Keycode = from_scancode(227);
    pub const RCTRL: Keycode = from_scancode(228);
    pub const RSHIFT: Keycode = from_scancode(229);
    pub const RALT: Keycode = from_scancode(230);
    pub const RGUI: Keycode = from_scancode(231);
}

/// Native layout-independent key position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scancode(pub u32);

impl Scancode {
    pub const UNKNOWN: Scancode = Scancode(0);
    pub const A: Scancode = Scancode(4);
    pub const RETURN: Scancode = Scancode(40);
    pub const ESCAPE: Scancode = Scancode(41);
    pub const SPACE: Scancode = Scancode(44);
}

bitflags! {
    /// Native modifier mask.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct KeyMod: u16 {
        const LSHIFT = 0x0001;
        const RSHIFT = 0x0002;
        const LCTRL = 0x0040;
        const RCTRL = 0x0080;
        const LALT = 0x0100;
        const RALT = 0x0200;
        const LGUI = 0x0400;
        const RGUI = 0x0800;
        const NUM = 0x1000;
        const CAPS = 0x2000;
        const MODE = 0x4000;
        const SCROLL = 0x8000;

        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        const ALT = Self::LALT.bits() | Self::RALT.bits();
        const GUI = Self::LGUI.bits() | Self::RGUI.bits();
    }
}

bitflags! {
    /// Native hat switch position bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HatState: u8 {
        const UP = 0x01;
        const RIGHT = 0x02;
        const DOWN = 0x04;
        const LEFT = 0x08;
    }
}
