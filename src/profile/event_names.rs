//! Maps the human-readable event names used in profile `.ini` files
//! (`BTN_SOUTH`, `ABS_X`, `REL_X`, ...) to their kernel event type and code,
//! via the `evdev` crate's typed wrappers around `<linux/input-event-codes.h>`.

use crate::profile::bindings::EvType;
use evdev::{AbsoluteAxisType, Key, RelativeAxisType};

/// Looks up a key/button name, returning its raw kernel event code.
pub fn key_code(name: &str) -> Option<u16> {
    let key = match name {
        "BTN_SOUTH" => Key::BTN_SOUTH,
        "BTN_EAST" => Key::BTN_EAST,
        "BTN_NORTH" => Key::BTN_NORTH,
        "BTN_WEST" => Key::BTN_WEST,
        "BTN_TL" => Key::BTN_TL,
        "BTN_TR" => Key::BTN_TR,
        "BTN_TL2" => Key::BTN_TL2,
        "BTN_TR2" => Key::BTN_TR2,
        "BTN_SELECT" => Key::BTN_SELECT,
        "BTN_START" => Key::BTN_START,
        "BTN_MODE" => Key::BTN_MODE,
        "BTN_THUMBL" => Key::BTN_THUMBL,
        "BTN_THUMBR" => Key::BTN_THUMBR,
        "BTN_DPAD_UP" => Key::BTN_DPAD_UP,
        "BTN_DPAD_DOWN" => Key::BTN_DPAD_DOWN,
        "BTN_DPAD_LEFT" => Key::BTN_DPAD_LEFT,
        "BTN_DPAD_RIGHT" => Key::BTN_DPAD_RIGHT,
        "BTN_TOUCH" => Key::BTN_TOUCH,
        "BTN_LEFT" => Key::BTN_LEFT,
        "BTN_RIGHT" => Key::BTN_RIGHT,
        "BTN_MIDDLE" => Key::BTN_MIDDLE,
        "BTN_TRIGGER_HAPPY1" => Key::BTN_TRIGGER_HAPPY1,
        "BTN_TRIGGER_HAPPY2" => Key::BTN_TRIGGER_HAPPY2,
        "KEY_UP" => Key::KEY_UP,
        "KEY_DOWN" => Key::KEY_DOWN,
        "KEY_LEFT" => Key::KEY_LEFT,
        "KEY_RIGHT" => Key::KEY_RIGHT,
        "KEY_SPACE" => Key::KEY_SPACE,
        "KEY_ENTER" => Key::KEY_ENTER,
        "KEY_ESC" => Key::KEY_ESC,
        "KEY_TAB" => Key::KEY_TAB,
        "KEY_LEFTSHIFT" => Key::KEY_LEFTSHIFT,
        "KEY_LEFTCTRL" => Key::KEY_LEFTCTRL,
        "KEY_LEFTALT" => Key::KEY_LEFTALT,
        "KEY_LEFTMETA" => Key::KEY_LEFTMETA,
        "KEY_A" => Key::KEY_A,
        "KEY_W" => Key::KEY_W,
        "KEY_S" => Key::KEY_S,
        "KEY_D" => Key::KEY_D,
        _ => return None,
    };
    Some(key.code())
}

/// Looks up an absolute-axis name, returning its raw kernel event code.
pub fn abs_code(name: &str) -> Option<u16> {
    let axis = match name {
        "ABS_X" => AbsoluteAxisType::ABS_X,
        "ABS_Y" => AbsoluteAxisType::ABS_Y,
        "ABS_Z" => AbsoluteAxisType::ABS_Z,
        "ABS_RX" => AbsoluteAxisType::ABS_RX,
        "ABS_RY" => AbsoluteAxisType::ABS_RY,
        "ABS_RZ" => AbsoluteAxisType::ABS_RZ,
        "ABS_HAT0X" => AbsoluteAxisType::ABS_HAT0X,
        "ABS_HAT0Y" => AbsoluteAxisType::ABS_HAT0Y,
        _ => return None,
    };
    Some(axis.0)
}

/// Looks up a relative-axis name, returning its raw kernel event code.
pub fn rel_code(name: &str) -> Option<u16> {
    let axis = match name {
        "REL_X" => RelativeAxisType::REL_X,
        "REL_Y" => RelativeAxisType::REL_Y,
        "REL_WHEEL" => RelativeAxisType::REL_WHEEL,
        "REL_HWHEEL" => RelativeAxisType::REL_HWHEEL,
        _ => return None,
    };
    Some(axis.0)
}

/// Classifies an event-type token from a `[GamepadAxes]`/`[MotionAxes]` line
/// (`KEY`, `ABS`, `REL`) and resolves its code within that type, mirroring
/// `EvName::GetEvType`/`GetEvCode` in the original.
pub fn get_ev_type_and_code(ev_type_name: &str, code_name: &str) -> Option<(EvType, u16)> {
    match ev_type_name {
        "KEY" | "BTN" => key_code(code_name).map(|c| (EvType::Key, c)),
        "ABS" => abs_code(code_name).map(|c| (EvType::Abs, c)),
        "REL" => rel_code(code_name).map(|c| (EvType::Rel, c)),
        _ => None,
    }
}

/// Resolves a bare event name (as it appears alone in a `[Bindings]` line,
/// with no type-hint token) to its event type and code. The name itself
/// disambiguates the type: `BTN_`/`KEY_` names are keys, `ABS_` names are
/// absolute axes, `REL_` names are relative axes.
pub fn resolve_event_name(name: &str) -> Option<(EvType, u16)> {
    if let Some(code) = key_code(name) {
        return Some((EvType::Key, code));
    }
    if let Some(code) = abs_code(name) {
        return Some((EvType::Abs, code));
    }
    if let Some(code) = rel_code(name) {
        return Some((EvType::Rel, code));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        assert!(get_ev_type_and_code("KEY", "BTN_SOUTH").is_some());
        assert!(get_ev_type_and_code("ABS", "ABS_X").is_some());
        assert!(get_ev_type_and_code("REL", "REL_X").is_some());
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(get_ev_type_and_code("KEY", "NOT_A_REAL_KEY").is_none());
        assert!(get_ev_type_and_code("WAT", "ABS_X").is_none());
    }
}
