//! Key classification.

use crate::types::KeyInput;

/// DOM key names that never start editing.
///
/// `F2` is absent: it opens the editor.
const NON_INPUT_KEYS: &[&str] = &[
    "Unidentified",
    "Alt",
    "AltGraph",
    "CapsLock",
    "Control",
    "Fn",
    "FnLock",
    "Meta",
    "NumLock",
    "ScrollLock",
    "Shift",
    "Tab",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowUp",
    "End",
    "Home",
    "PageDown",
    "PageUp",
    "Insert",
    "ContextMenu",
    "Escape",
    "Pause",
    "Play",
    "PrintScreen",
    "F1",
    "F3",
    "F4",
    "F5",
    "F6",
    "F7",
    "F8",
    "F9",
    "F10",
    "F11",
    "F12",
];

const NAVIGATION_KEYS: &[&str] = &[
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Tab",
    "Home",
    "End",
    "PageUp",
    "PageDown",
];

/// Whether a key press should open the editor with that key as input.
pub fn is_default_cell_input(key: &KeyInput) -> bool {
    !NON_INPUT_KEYS.contains(&key.key.as_str())
}

/// Keys handled by keyboard navigation.
pub fn is_navigation_key(key: &str) -> bool {
    NAVIGATION_KEYS.contains(&key)
}

/// Ctrl/Cmd + C.
pub fn is_copy_shortcut(key: &KeyInput) -> bool {
    key.is_ctrl_held() && key.key.eq_ignore_ascii_case("c")
}

/// Ctrl/Cmd + V.
pub fn is_paste_shortcut(key: &KeyInput) -> bool {
    key.is_ctrl_held() && key.key.eq_ignore_ascii_case("v")
}
