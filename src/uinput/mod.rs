//! Synthetic kernel input devices, built on the `evdev` crate's `uinput`
//! builder. One [`SyntheticDevice`] wraps one `/dev/uinput`-backed virtual
//! device and the queue of events pending its next flush.

use crate::error::{DriverError, ErrorKind, Result};
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, BusType, InputEvent, InputId, Key};

const VENDOR_ID: u16 = 0xDEAD;
const PRODUCT_ID: u16 = 0xBEEF;
const VERSION: u16 = 0x0001;

/// An absolute axis to expose on a synthetic device: kernel code plus the
/// integer range the profile declared for it.
#[derive(Debug, Clone, Copy)]
pub struct AxisRange {
    pub code: u16,
    pub min: i32,
    pub max: i32,
}

/// Everything needed to build one synthetic device.
#[derive(Debug, Clone, Default)]
pub struct DeviceSpec {
    pub name: String,
    pub keys: Vec<u16>,
    pub abs_axes: Vec<AxisRange>,
    pub rel_axes: Vec<u16>,
}

/// A synthetic kernel input device with a pending-event queue, flushed as
/// one batch ending in `SYN_REPORT`.
pub struct SyntheticDevice {
    device: VirtualDevice,
    axis_ranges: Vec<AxisRange>,
    pending: Vec<InputEvent>,
    key_state: std::collections::HashMap<u16, bool>,
}

impl SyntheticDevice {
    pub fn create(spec: &DeviceSpec) -> Result<Self> {
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(|e| DriverError::new(ErrorKind::CannotCreate, e.to_string()))?
            .name(&spec.name)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, VERSION));

        if !spec.keys.is_empty() {
            let mut keys = AttributeSet::<Key>::new();
            for &code in &spec.keys {
                keys.insert(Key::new(code));
            }
            builder = builder
                .with_keys(&keys)
                .map_err(|e| DriverError::new(ErrorKind::CannotCreate, e.to_string()))?;
        }

        for axis in &spec.abs_axes {
            let info = AbsInfo::new(0, axis.min, axis.max, 0, 0, 0);
            builder = builder
                .with_absolute_axis(&evdev::UinputAbsSetup::new(AbsoluteAxisType(axis.code), info))
                .map_err(|e| DriverError::new(ErrorKind::CannotCreate, e.to_string()))?;
        }

        if !spec.rel_axes.is_empty() {
            let mut rels = AttributeSet::<evdev::RelativeAxisType>::new();
            for &code in &spec.rel_axes {
                rels.insert(evdev::RelativeAxisType(code));
            }
            builder = builder
                .with_relative_axes(&rels)
                .map_err(|e| DriverError::new(ErrorKind::CannotCreate, e.to_string()))?;
        }

        let device = builder
            .build()
            .map_err(|e| DriverError::new(ErrorKind::CannotCreate, e.to_string()))?;

        Ok(Self {
            device,
            axis_ranges: spec.abs_axes.clone(),
            pending: Vec::new(),
            key_state: std::collections::HashMap::new(),
        })
    }

    fn axis_range(&self, code: u16) -> Option<AxisRange> {
        self.axis_ranges.iter().copied().find(|a| a.code == code)
    }

    /// Sets a key's down/up state. Emits only on a change from the
    /// last-emitted state for this code, so callers can report the current
    /// condition every tick and releases fall out automatically.
    pub fn update_key(&mut self, code: u16, pressed: bool) {
        if self.key_state.get(&code).copied() == Some(pressed) {
            return;
        }
        self.key_state.insert(code, pressed);
        self.pending
            .push(InputEvent::new_now(evdev::EventType::KEY, code, pressed as i32));
    }

    /// Sets an absolute axis from a normalized value (`[-1,1]` for signed
    /// axes, `[0,1]` for triggers/pressure), scaled into the axis's
    /// declared integer range.
    pub fn update_abs(&mut self, code: u16, normalized: f64) {
        let value = match self.axis_range(code) {
            Some(range) => scale_to_range(normalized, range.min, range.max),
            None => return,
        };
        self.pending
            .push(InputEvent::new_now(evdev::EventType::ABSOLUTE, code, value));
    }

    /// Queues a relative-motion event.
    pub fn update_rel(&mut self, code: u16, value: i32) {
        self.pending
            .push(InputEvent::new_now(evdev::EventType::RELATIVE, code, value));
    }

    /// Emits every queued event as one batch, terminated implicitly by the
    /// `evdev` crate's own `SYN_REPORT`.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.device
            .emit(&self.pending)
            .map_err(|e| DriverError::new(ErrorKind::WriteFailed, e.to_string()))?;
        self.pending.clear();
        Ok(())
    }
}

/// Maps a normalized value into an axis's declared integer range.
/// `normalized` is assumed to be in `[-1,1]` if `min < 0`, else `[0,1]`.
fn scale_to_range(normalized: f64, min: i32, max: i32) -> i32 {
    let normalized = normalized.clamp(-1.0, 1.0);
    if min < 0 {
        let half = (max as f64 - min as f64) / 2.0;
        let center = (max as f64 + min as f64) / 2.0;
        (center + normalized * half).round() as i32
    } else {
        let normalized = normalized.clamp(0.0, 1.0);
        (min as f64 + normalized * (max as f64 - min as f64)).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_signed_axis_midpoints() {
        assert_eq!(scale_to_range(0.0, -32767, 32767), 0);
        assert_eq!(scale_to_range(1.0, -32767, 32767), 32767);
        assert_eq!(scale_to_range(-1.0, -32767, 32767), -32767);
    }

    #[test]
    fn scale_unsigned_axis_range() {
        assert_eq!(scale_to_range(0.0, 0, 255), 0);
        assert_eq!(scale_to_range(1.0, 0, 255), 255);
    }

    #[test]
    fn update_key_emits_only_on_change() {
        let mut state = std::collections::HashMap::new();
        let emits = |state: &mut std::collections::HashMap<u16, bool>, code: u16, pressed: bool| -> bool {
            if state.get(&code).copied() == Some(pressed) {
                return false;
            }
            state.insert(code, pressed);
            true
        };
        assert!(emits(&mut state, 1, true), "first press must emit");
        assert!(!emits(&mut state, 1, true), "repeated press must not re-emit");
        assert!(emits(&mut state, 1, false), "release must emit");
        assert!(!emits(&mut state, 1, false), "repeated release must not re-emit");
    }
}
