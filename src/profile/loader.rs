//! Populates a [`Profile`] from a `.ini` file on top of the built-in
//! [`presets::template`].

use super::bindings::{BindMap, Binding, Device, EvType};
use super::event_names::{get_ev_type_and_code, resolve_event_name};
use super::ini::IniFile;
use super::{presets, Profile};
use crate::error::{DriverError, ErrorKind, Result};
use std::path::Path;

fn get_feat_enable(ini: &IniFile, key: &str, value: &mut bool) {
    let val = ini.get_val("Features", key);
    if let Some(first) = val.first() {
        *value = first.eq_ignore_ascii_case("true");
    }
}

fn get_deadzone(ini: &IniFile, key: &str, value: &mut f64) {
    let val = ini.get_val("Deadzones", key);
    let Some(first) = val.first() else {
        tracing::debug!(key, "deadzone is missing value");
        return;
    };
    let Ok(v) = first.parse::<f64>() else {
        tracing::debug!(key, "deadzone value is not a number");
        return;
    };
    *value = v.clamp(0.0, 0.9);
}

fn get_axis_range(ini: &IniFile, section: &str, key: &str, min: &mut i32, max: &mut i32) {
    let val = ini.get_val(section, key);
    if val.len() < 2 {
        tracing::debug!(section, key, "axis range expects 2 integer values, ignoring");
        return;
    }
    let (parsed_min, parsed_max) = (val[0].parse::<i32>(), val[1].parse::<i32>());
    match (parsed_min, parsed_max) {
        (Ok(lo), Ok(hi)) if lo != hi => {
            *min = lo;
            *max = hi;
        }
        _ => tracing::debug!(section, key, "axis range is invalid, ignoring"),
    }
}

fn get_event_binding(ini: &IniFile, key: &str, profile: &mut Profile) -> Option<Binding> {
    let val = ini.get_val("Bindings", key);
    if val.len() < 2 {
        tracing::debug!(key, "event binding needs a device and an event name");
        return None;
    }

    let dev = match val[0].to_uppercase().as_str() {
        "GAMEPAD" => Device::Game,
        "MOTION" => Device::Motion,
        "MOUSE" => Device::Mouse,
        _ => Device::None,
    };

    // The event name alone carries both its type and code; there is no
    // separate type-hint token (`A = Gamepad BTN_SOUTH`).
    let event_name = val[1].to_uppercase();
    let (ev_type, ev_code) = resolve_event_name(&event_name)?;

    match ev_type {
        EvType::Key => {
            add_key_event(profile, dev, ev_code);
            Some(Binding::event(dev, EvType::Key, ev_code, false))
        }
        EvType::Abs => {
            let dir = match val.get(2).map(|s| s.as_str()) {
                Some("+") => true,
                Some("-") => false,
                _ => {
                    tracing::debug!(key, "axis binding requires a direction indicator (+ or -)");
                    return None;
                }
            };
            // The axis itself is enabled via [GamepadAxes]/[MotionAxes], not here.
            Some(Binding::event(dev, EvType::Abs, ev_code, dir))
        }
        EvType::Rel => {
            add_rel_event(profile, dev, ev_code);
            Some(Binding::event(dev, EvType::Rel, ev_code, false))
        }
        EvType::None => None,
    }
}

fn add_key_event(profile: &mut Profile, dev: Device, code: u16) {
    match dev {
        Device::Game => profile.dev.gamepad.add_key(code),
        Device::Mouse => profile.dev.mouse.add_key(code),
        Device::Motion => tracing::debug!("key events are not supported on the motion device"),
        _ => tracing::debug!("invalid binding device for key event"),
    }
}

fn add_rel_event(profile: &mut Profile, dev: Device, code: u16) {
    match dev {
        Device::Game => profile.dev.gamepad.add_rel(code),
        Device::Mouse => profile.dev.mouse.add_rel(code),
        Device::Motion => profile.dev.motion.add_rel(code),
        _ => tracing::debug!("invalid binding device for relative axis event"),
    }
}

fn add_abs_event(profile: &mut Profile, dev: Device, code: u16, min: i32, max: i32) {
    match dev {
        Device::Game => profile.dev.gamepad.add_abs(code, min, max),
        Device::Motion => profile.dev.motion.add_abs(code, min, max),
        Device::Mouse => tracing::debug!("absolute axis events are not supported on the mouse device"),
        _ => tracing::debug!("invalid binding device for absolute axis event"),
    }
}

fn get_binding(ini: &IniFile, key: &str, profile: &mut Profile) -> Binding {
    let val = ini.get_val("Bindings", key);
    let Some(first) = val.first() else {
        return Binding::default();
    };

    match first.to_uppercase().as_str() {
        "NONE" => Binding::default(),
        "GAMEPAD" | "MOTION" | "MOUSE" => get_event_binding(ini, key, profile).unwrap_or_default(),
        #[cfg(feature = "unstable-command-bindings")]
        "COMMAND" => get_command_binding(ini, key).unwrap_or_default(),
        #[cfg(feature = "unstable-command-bindings")]
        "PROFILE" => get_profile_binding(ini, key).unwrap_or_default(),
        other => {
            tracing::debug!(key, bind_type = other, "unknown bind type");
            Binding::default()
        }
    }
}

#[cfg(feature = "unstable-command-bindings")]
fn get_command_binding(ini: &IniFile, key: &str) -> Option<Binding> {
    let val = ini.get_val("Bindings", key);
    if val.len() < 4 {
        tracing::debug!(key, "command bindings need at least four parameters");
        return None;
    }
    let wait = val[1].eq_ignore_ascii_case("true");
    let delay_ms: u64 = val[2].parse().unwrap_or(0);
    let cmd = val[3..].join(" ");
    if cmd.is_empty() {
        tracing::debug!(key, "command_to_execute string is empty");
        return None;
    }
    Some(Binding {
        dev: Device::Command,
        ev_type: EvType::None,
        ev_code: 0,
        dir: false,
        cmd,
        id: if wait { 1 } else { 0 },
        delay_ms,
        profile_name: String::new(),
    })
}

#[cfg(feature = "unstable-command-bindings")]
fn get_profile_binding(ini: &IniFile, key: &str) -> Option<Binding> {
    let val = ini.get_val("Bindings", key);
    if val.len() < 2 {
        tracing::debug!(key, "profile bindings need at least two parameters");
        return None;
    }
    let name = val[1..].join(" ");
    if name.is_empty() {
        return None;
    }
    Some(Binding {
        dev: Device::Profile,
        ev_type: EvType::None,
        ev_code: 0,
        dir: false,
        cmd: String::new(),
        id: 0,
        delay_ms: 0,
        profile_name: name,
    })
}

macro_rules! bind {
    ($ini:expr, $profile:expr, $key:expr, $field:expr) => {
        $field = get_binding($ini, $key, $profile);
    };
}

/// Loads a profile `.ini` file on top of the built-in default template.
pub fn load(path: &Path) -> Result<Profile> {
    let mut profile = presets::template();

    if !path.exists() {
        return Err(DriverError::new(
            ErrorKind::CannotOpen,
            format!("{} not found", path.display()),
        ));
    }

    let mut ini = IniFile::new();
    ini.load_file(path)?;

    if let Some(name) = ini.get_val("Profile", "Name").first() {
        profile.name = name.clone();
    }
    if let Some(desc) = ini.get_val("Profile", "Description").first() {
        profile.description = desc.clone();
    }

    get_feat_enable(&ini, "ForceFeedback", &mut profile.features.force_feedback);
    get_feat_enable(&ini, "MotionDevice", &mut profile.features.motion);
    get_feat_enable(&ini, "MouseDevice", &mut profile.features.mouse);
    get_feat_enable(&ini, "LizardMode", &mut profile.features.lizard);
    get_feat_enable(&ini, "StickFiltering", &mut profile.features.filter_sticks);
    get_feat_enable(&ini, "TrackpadFiltering", &mut profile.features.filter_pads);

    get_deadzone(&ini, "LStick", &mut profile.dz.l_stick);
    get_deadzone(&ini, "RStick", &mut profile.dz.r_stick);
    get_deadzone(&ini, "LPad", &mut profile.dz.l_pad);
    get_deadzone(&ini, "RPad", &mut profile.dz.r_pad);
    get_deadzone(&ini, "LTrigg", &mut profile.dz.l_trigg);
    get_deadzone(&ini, "RTrigg", &mut profile.dz.r_trigg);

    for key in ini.key_list("GamepadAxes").iter().map(|s| s.to_string()).collect::<Vec<_>>() {
        let Some(code) = get_ev_type_and_code("ABS", &key.to_uppercase()).map(|(_, c)| c) else {
            tracing::debug!(key, "failed to enable gamepad axis: event name not found");
            continue;
        };
        let (mut min, mut max) = (0, 0);
        get_axis_range(&ini, "GamepadAxes", &key, &mut min, &mut max);
        add_abs_event(&mut profile, Device::Game, code, min, max);
    }

    for key in ini.key_list("MotionAxes").iter().map(|s| s.to_string()).collect::<Vec<_>>() {
        let Some(code) = get_ev_type_and_code("ABS", &key.to_uppercase()).map(|(_, c)| c) else {
            tracing::debug!(key, "failed to enable motion axis: event name not found");
            continue;
        };
        let (mut min, mut max) = (0, 0);
        get_axis_range(&ini, "MotionAxes", &key, &mut min, &mut max);
        add_abs_event(&mut profile, Device::Motion, code, min, max);
    }

    let mut map = BindMap::default();
    bind!(&ini, &mut profile, "DpadUp", map.dpad.up);
    bind!(&ini, &mut profile, "DpadDown", map.dpad.down);
    bind!(&ini, &mut profile, "DpadLeft", map.dpad.left);
    bind!(&ini, &mut profile, "DpadRight", map.dpad.right);

    bind!(&ini, &mut profile, "A", map.btn.a);
    bind!(&ini, &mut profile, "B", map.btn.b);
    bind!(&ini, &mut profile, "X", map.btn.x);
    bind!(&ini, &mut profile, "Y", map.btn.y);
    bind!(&ini, &mut profile, "L1", map.btn.l1);
    bind!(&ini, &mut profile, "L2", map.btn.l2);
    bind!(&ini, &mut profile, "L3", map.btn.l3);
    bind!(&ini, &mut profile, "L4", map.btn.l4);
    bind!(&ini, &mut profile, "L5", map.btn.l5);
    bind!(&ini, &mut profile, "R1", map.btn.r1);
    bind!(&ini, &mut profile, "R2", map.btn.r2);
    bind!(&ini, &mut profile, "R3", map.btn.r3);
    bind!(&ini, &mut profile, "R4", map.btn.r4);
    bind!(&ini, &mut profile, "R5", map.btn.r5);
    bind!(&ini, &mut profile, "Menu", map.btn.menu);
    bind!(&ini, &mut profile, "Options", map.btn.options);
    bind!(&ini, &mut profile, "Steam", map.btn.steam);
    bind!(&ini, &mut profile, "QuickAccess", map.btn.quick_access);

    bind!(&ini, &mut profile, "LTrigg", map.trigg.l);
    bind!(&ini, &mut profile, "RTrigg", map.trigg.r);

    bind!(&ini, &mut profile, "LStickUp", map.stick.l.up);
    bind!(&ini, &mut profile, "LStickDown", map.stick.l.down);
    bind!(&ini, &mut profile, "LStickLeft", map.stick.l.left);
    bind!(&ini, &mut profile, "LStickRight", map.stick.l.right);
    bind!(&ini, &mut profile, "LStickTouch", map.stick.l.touch);
    bind!(&ini, &mut profile, "LStickForce", map.stick.l.force);

    bind!(&ini, &mut profile, "RStickUp", map.stick.r.up);
    bind!(&ini, &mut profile, "RStickDown", map.stick.r.down);
    bind!(&ini, &mut profile, "RStickLeft", map.stick.r.left);
    bind!(&ini, &mut profile, "RStickRight", map.stick.r.right);
    bind!(&ini, &mut profile, "RStickTouch", map.stick.r.touch);
    bind!(&ini, &mut profile, "RStickForce", map.stick.r.force);

    bind!(&ini, &mut profile, "LPadUp", map.pad.l.up);
    bind!(&ini, &mut profile, "LPadDown", map.pad.l.down);
    bind!(&ini, &mut profile, "LPadLeft", map.pad.l.left);
    bind!(&ini, &mut profile, "LPadRight", map.pad.l.right);
    bind!(&ini, &mut profile, "LPadRelX", map.pad.l.rel_x);
    bind!(&ini, &mut profile, "LPadRelY", map.pad.l.rel_y);
    bind!(&ini, &mut profile, "LPadTouch", map.pad.l.touch);
    bind!(&ini, &mut profile, "LPadPress", map.pad.l.press);
    bind!(&ini, &mut profile, "LPadForce", map.pad.l.force);

    bind!(&ini, &mut profile, "RPadUp", map.pad.r.up);
    bind!(&ini, &mut profile, "RPadDown", map.pad.r.down);
    bind!(&ini, &mut profile, "RPadLeft", map.pad.r.left);
    bind!(&ini, &mut profile, "RPadRight", map.pad.r.right);
    bind!(&ini, &mut profile, "RPadRelX", map.pad.r.rel_x);
    bind!(&ini, &mut profile, "RPadRelY", map.pad.r.rel_y);
    bind!(&ini, &mut profile, "RPadTouch", map.pad.r.touch);
    bind!(&ini, &mut profile, "RPadPress", map.pad.r.press);
    bind!(&ini, &mut profile, "RPadForce", map.pad.r.force);

    bind!(&ini, &mut profile, "AccelXPlus", map.accel.x_plus);
    bind!(&ini, &mut profile, "AccelXMinus", map.accel.x_minus);
    bind!(&ini, &mut profile, "AccelYPlus", map.accel.y_plus);
    bind!(&ini, &mut profile, "AccelYMinus", map.accel.y_minus);
    bind!(&ini, &mut profile, "AccelZPlus", map.accel.z_plus);
    bind!(&ini, &mut profile, "AccelZMinus", map.accel.z_minus);

    bind!(&ini, &mut profile, "RollPlus", map.att.roll_plus);
    bind!(&ini, &mut profile, "RollMinus", map.att.roll_minus);
    bind!(&ini, &mut profile, "PitchPlus", map.att.pitch_plus);
    bind!(&ini, &mut profile, "PitchMinus", map.att.pitch_minus);
    bind!(&ini, &mut profile, "YawPlus", map.att.yaw_plus);
    bind!(&ini, &mut profile, "YawMinus", map.att.yaw_minus);

    profile.map = map;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_features_and_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.ini");
        fs::write(
            &path,
            "[Profile]\n\
             Name = My Profile\n\
             [Features]\n\
             LizardMode = true\n\
             [Deadzones]\n\
             LStick = 0.15\n\
             [Bindings]\n\
             A = Gamepad BTN_SOUTH\n\
             LTrigg = Gamepad ABS_Z +\n",
        )
        .unwrap();

        let profile = load(&path).unwrap();
        assert_eq!(profile.name, "My Profile");
        assert!(profile.features.lizard);
        assert_eq!(profile.dz.l_stick, 0.15);
        assert!(!profile.map.btn.a.is_none());
        assert!(!profile.map.trigg.l.is_none());
        assert!(profile.map.trigg.l.dir);
    }

    #[test]
    fn missing_file_is_cannot_open() {
        let err = load(Path::new("/nonexistent/profile.ini")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CannotOpen);
    }
}
