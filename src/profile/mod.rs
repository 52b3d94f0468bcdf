//! The in-memory profile: feature toggles, deadzones, per-device
//! capabilities, and the binding map, plus the `.ini` loader that populates
//! one from a file.

pub mod bindings;
pub mod event_names;
pub mod ini;
pub mod loader;
pub mod presets;

pub use bindings::{AxisEnum, BindMap};

use crate::uinput::AxisRange;

#[derive(Debug, Clone, Copy, Default)]
pub struct Features {
    pub force_feedback: bool,
    pub motion: bool,
    pub mouse: bool,
    /// When true, lizard mode is left enabled (the driver does not attempt
    /// to suppress vendor keyboard/mouse emulation for this profile).
    pub lizard: bool,
    pub filter_sticks: bool,
    pub filter_pads: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Deadzones {
    pub l_stick: f64,
    pub r_stick: f64,
    pub l_pad: f64,
    pub r_pad: f64,
    pub l_trigg: f64,
    pub r_trigg: f64,
}

/// Capability declaration for one synthetic device: its display name and
/// the key/abs/rel event sets it exposes.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    pub name_override: Option<String>,
    pub key_list: Vec<u16>,
    pub abs_list: Vec<AxisRange>,
    pub rel_list: Vec<u16>,
}

impl DeviceCapabilities {
    fn add_key(&mut self, code: u16) {
        if !self.key_list.contains(&code) {
            self.key_list.push(code);
        }
    }

    fn add_rel(&mut self, code: u16) {
        if !self.rel_list.contains(&code) {
            self.rel_list.push(code);
        }
    }

    fn add_abs(&mut self, code: u16, min: i32, max: i32) {
        if !self.abs_list.iter().any(|a| a.code == code) {
            self.abs_list.push(AxisRange { code, min, max });
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilitySet {
    pub gamepad: DeviceCapabilities,
    pub motion: DeviceCapabilities,
    pub mouse: DeviceCapabilities,
}

#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub features: Features,
    pub dz: Deadzones,
    pub dev: DeviceCapabilitySet,
    pub map: BindMap,
}
