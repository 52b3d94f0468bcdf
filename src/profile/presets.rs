//! The built-in default profile, used to seed [`Profile`](super::Profile)
//! before a `.ini` file is loaded over it.

use super::bindings::{BindMap, Binding, Device, EvType};
use super::{DeviceCapabilities, DeviceCapabilitySet, Deadzones, Features, Profile};
use crate::profile::event_names::{abs_code, key_code, rel_code};
use crate::uinput::AxisRange;

fn key(name: &str) -> u16 {
    key_code(name).unwrap_or_default()
}

fn abs(name: &str) -> u16 {
    abs_code(name).unwrap_or_default()
}

fn rel(name: &str) -> u16 {
    rel_code(name).unwrap_or_default()
}

fn game_key(code: u16) -> Binding {
    Binding::event(Device::Game, EvType::Key, code, false)
}

fn game_abs(code: u16, dir: bool) -> Binding {
    Binding::event(Device::Game, EvType::Abs, code, dir)
}

fn mouse_rel(code: u16) -> Binding {
    Binding::event(Device::Mouse, EvType::Rel, code, false)
}

fn mouse_key(code: u16) -> Binding {
    Binding::event(Device::Mouse, EvType::Key, code, false)
}

/// The template every profile load starts from: a Xbox-layout gamepad
/// mapping for buttons/sticks/triggers plus the right pad driving mouse
/// motion, with motion output unbound (the `motion` feature defaults off).
pub fn template() -> Profile {
    let mut map = BindMap::default();

    map.dpad.up = game_abs(abs("ABS_HAT0Y"), false);
    map.dpad.down = game_abs(abs("ABS_HAT0Y"), true);
    map.dpad.left = game_abs(abs("ABS_HAT0X"), false);
    map.dpad.right = game_abs(abs("ABS_HAT0X"), true);

    map.btn.a = game_key(key("BTN_SOUTH"));
    map.btn.b = game_key(key("BTN_EAST"));
    map.btn.x = game_key(key("BTN_WEST"));
    map.btn.y = game_key(key("BTN_NORTH"));
    map.btn.l1 = game_key(key("BTN_TL"));
    map.btn.r1 = game_key(key("BTN_TR"));
    map.btn.l2 = game_key(key("BTN_TL2"));
    map.btn.r2 = game_key(key("BTN_TR2"));
    map.btn.l3 = game_key(key("BTN_THUMBL"));
    map.btn.r3 = game_key(key("BTN_THUMBR"));
    map.btn.menu = game_key(key("BTN_START"));
    map.btn.options = game_key(key("BTN_SELECT"));
    map.btn.steam = game_key(key("BTN_MODE"));
    // l4/l5/r4/r5/quick_access: back paddles and the quick-access button have
    // no standard gamepad event code; left unbound by default.

    map.trigg.l = game_abs(abs("ABS_Z"), true);
    map.trigg.r = game_abs(abs("ABS_RZ"), true);

    map.stick.l.up = game_abs(abs("ABS_Y"), false);
    map.stick.l.down = game_abs(abs("ABS_Y"), true);
    map.stick.l.left = game_abs(abs("ABS_X"), false);
    map.stick.l.right = game_abs(abs("ABS_X"), true);

    map.stick.r.up = game_abs(abs("ABS_RY"), false);
    map.stick.r.down = game_abs(abs("ABS_RY"), true);
    map.stick.r.left = game_abs(abs("ABS_RX"), false);
    map.stick.r.right = game_abs(abs("ABS_RX"), true);

    map.pad.r.rel_x = mouse_rel(rel("REL_X"));
    map.pad.r.rel_y = mouse_rel(rel("REL_Y"));
    map.pad.r.press = mouse_key(key("BTN_LEFT"));
    map.pad.l.press = mouse_key(key("BTN_RIGHT"));

    let gamepad = DeviceCapabilities {
        name_override: None,
        key_list: vec![
            key("BTN_SOUTH"),
            key("BTN_EAST"),
            key("BTN_WEST"),
            key("BTN_NORTH"),
            key("BTN_TL"),
            key("BTN_TR"),
            key("BTN_TL2"),
            key("BTN_TR2"),
            key("BTN_THUMBL"),
            key("BTN_THUMBR"),
            key("BTN_START"),
            key("BTN_SELECT"),
            key("BTN_MODE"),
        ],
        abs_list: vec![
            AxisRange { code: abs("ABS_HAT0X"), min: -1, max: 1 },
            AxisRange { code: abs("ABS_HAT0Y"), min: -1, max: 1 },
            AxisRange { code: abs("ABS_X"), min: -32767, max: 32767 },
            AxisRange { code: abs("ABS_Y"), min: -32767, max: 32767 },
            AxisRange { code: abs("ABS_RX"), min: -32767, max: 32767 },
            AxisRange { code: abs("ABS_RY"), min: -32767, max: 32767 },
            AxisRange { code: abs("ABS_Z"), min: 0, max: 32767 },
            AxisRange { code: abs("ABS_RZ"), min: 0, max: 32767 },
        ],
        rel_list: Vec::new(),
    };

    let mouse = DeviceCapabilities {
        name_override: None,
        key_list: vec![key("BTN_LEFT"), key("BTN_RIGHT")],
        abs_list: Vec::new(),
        rel_list: vec![rel("REL_X"), rel("REL_Y")],
    };

    Profile {
        name: "default".to_string(),
        description: "Built-in default profile".to_string(),
        features: Features {
            force_feedback: false,
            motion: false,
            mouse: true,
            lizard: false,
            filter_sticks: true,
            filter_pads: false,
        },
        dz: Deadzones {
            l_stick: 0.1,
            r_stick: 0.1,
            l_pad: 0.0,
            r_pad: 0.0,
            l_trigg: 0.0,
            r_trigg: 0.0,
        },
        dev: DeviceCapabilitySet {
            gamepad,
            motion: DeviceCapabilities::default(),
            mouse,
        },
        map,
    }
}
