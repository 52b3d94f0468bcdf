//! The driver engine: owns the HID transport and synthetic devices, runs the
//! polling loop and the lizard-mode suppression thread, and dispatches
//! decoded state through the active [`BindMap`].

use crate::error::{DriverError, ErrorKind, Result};
use crate::hid::report::{self, tag, PackedInputReport};
use crate::hid::{self, Hidraw, KNOWN_DEVICES};
use crate::profile::bindings::{BindMap, BindMode, Binding, Device, EvType};
use crate::profile::{AxisEnum, Profile};
use crate::state::DeviceState;
use crate::uinput::{DeviceSpec, SyntheticDevice};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const LIZARD_SLEEP: Duration = Duration::from_secs(2);
const SET_PROFILE_SETTLE: Duration = Duration::from_millis(50);

struct Devices {
    gamepad: Option<SyntheticDevice>,
    motion: Option<SyntheticDevice>,
    mouse: Option<SyntheticDevice>,
}

impl Devices {
    fn empty() -> Self {
        Self {
            gamepad: None,
            motion: None,
            mouse: None,
        }
    }
}

/// Owns the HID transport, the active binding map and synthetic devices, and
/// the two worker threads that drive input translation and lizard-mode
/// suppression.
pub struct Driver {
    hid: Arc<Hidraw>,
    state: Mutex<DeviceState>,
    map: Mutex<BindMap>,
    devices: Mutex<Devices>,
    running: Arc<AtomicBool>,
    lizard_mode: Arc<AtomicBool>,
    poll_thread: Mutex<Option<JoinHandle<()>>>,
    lizard_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Driver {
    /// Opens the first known gamepad hidraw node and asserts non-lizard mode.
    pub fn new() -> Result<Self> {
        let hid = Hidraw::new();
        let mut opened = false;
        for dev in KNOWN_DEVICES {
            if let Some(path) = hid::find_dev_node(dev.vendor_id, dev.product_id, dev.interface_num) {
                tracing::debug!(path = %path.display(), "found hidraw device");
                match hid.open(&path) {
                    Ok(()) => {
                        tracing::info!(name = dev.name, "opened gamepad device");
                        opened = true;
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "error opening hidraw device");
                        return Err(DriverError::new(ErrorKind::CannotOpen, "failed to open gamepad hidraw device"));
                    }
                }
            }
        }
        if !opened {
            return Err(DriverError::new(ErrorKind::Unknown, "no known gamepad device found"));
        }

        let driver = Self {
            hid: Arc::new(hid),
            state: Mutex::new(DeviceState::default()),
            map: Mutex::new(BindMap::default()),
            devices: Mutex::new(Devices::empty()),
            running: Arc::new(AtomicBool::new(false)),
            lizard_mode: Arc::new(AtomicBool::new(true)),
            poll_thread: Mutex::new(None),
            lizard_thread: Mutex::new(None),
        };

        driver.set_lizard_mode(false)?;
        Ok(driver)
    }

    fn set_hid_register(&self, reg: u8, value: u16) -> Result<()> {
        if !self.hid.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "device is not open"));
        }
        self.hid.write(&report::write_register(reg, value))
    }

    /// Disables (or re-enables) the vendor keyboard/mouse emulation.
    pub fn set_lizard_mode(&self, enabled: bool) -> Result<()> {
        if !self.hid.is_open() {
            return Err(DriverError::new(ErrorKind::NotOpen, "device is not open"));
        }
        std::thread::sleep(Duration::from_millis(50));

        if !enabled {
            if let Err(e) = self.hid.write(&report::tagged_report(tag::CLEAR_MAPPINGS)) {
                tracing::debug!(error = %e, "failed to disable keyboard emulation");
            }
            if let Err(e) = self.set_hid_register(report::register::RPAD_MODE, 0x07) {
                tracing::debug!(error = %e, "failed to disable mouse emulation");
            }
            if let Err(e) = self.set_hid_register(report::register::RPAD_MARGIN, 0x00) {
                tracing::debug!(error = %e, "failed to disable trackpad margins");
            }
            self.lizard_mode.store(false, Ordering::SeqCst);
            tracing::debug!("lizard mode disabled");
        } else {
            if let Err(e) = self.hid.write(&report::tagged_report(tag::DEFAULT_MAPPINGS)) {
                tracing::debug!(error = %e, "failed to enable keyboard emulation");
            }
            if let Err(e) = self.hid.write(&report::tagged_report(tag::DEFAULT_MOUSE)) {
                tracing::debug!(error = %e, "failed to enable mouse emulation");
            }
            if let Err(e) = self.set_hid_register(report::register::RPAD_MARGIN, 0x01) {
                tracing::debug!(error = %e, "failed to enable trackpad margins");
            }
            self.lizard_mode.store(true, Ordering::SeqCst);
            tracing::debug!("lizard mode enabled");
        }
        Ok(())
    }

    fn set_deadzone(&self, axis: AxisEnum, dz: f64) {
        let mut state = self.state.lock();
        let dz = crate::state::Deadzone::new(dz);
        match axis {
            AxisEnum::LStick => state.stick_l.dz = dz,
            AxisEnum::RStick => state.stick_r.dz = dz,
            AxisEnum::LPad => state.pad_l.dz = dz,
            AxisEnum::RPad => state.pad_r.dz = dz,
            AxisEnum::LTrigg => state.trigg_l.dz = dz,
            AxisEnum::RTrigg => state.trigg_r.dz = dz,
        }
    }

    /// Destroys the current synthetic devices and builds new ones from
    /// `profile`, copying over its binding map, filter toggles and deadzones.
    pub fn set_profile(&self, profile: &Profile) -> Result<()> {
        tracing::info!(name = %profile.name, "setting gamepad profile");
        std::thread::sleep(SET_PROFILE_SETTLE);

        let mut devices = self.devices.lock();
        *devices = Devices::empty();

        let gamepad_name = profile
            .dev
            .gamepad
            .name_override
            .clone()
            .unwrap_or_else(|| "OpenSD Gamepad Device".to_string());
        let gamepad = SyntheticDevice::create(&DeviceSpec {
            name: gamepad_name,
            keys: profile.dev.gamepad.key_list.clone(),
            abs_axes: profile.dev.gamepad.abs_list.clone(),
            rel_axes: Vec::new(),
        });
        let gamepad = match gamepad {
            Ok(d) => d,
            Err(e) => {
                tracing::error!("failed to create gamepad uinput device");
                *devices = Devices::empty();
                return Err(e);
            }
        };
        devices.gamepad = Some(gamepad);

        if profile.features.motion {
            let motion_name = profile
                .dev
                .motion
                .name_override
                .clone()
                .unwrap_or_else(|| "OpenSD Motion Control Device".to_string());
            match SyntheticDevice::create(&DeviceSpec {
                name: motion_name,
                keys: Vec::new(),
                abs_axes: profile.dev.motion.abs_list.clone(),
                rel_axes: Vec::new(),
            }) {
                Ok(d) => devices.motion = Some(d),
                Err(e) => {
                    tracing::error!("failed to create motion control uinput device");
                    *devices = Devices::empty();
                    return Err(e);
                }
            }
        }

        if profile.features.mouse {
            let mouse_name = profile
                .dev
                .mouse
                .name_override
                .clone()
                .unwrap_or_else(|| "OpenSD Trackpad/Mouse Device".to_string());
            match SyntheticDevice::create(&DeviceSpec {
                name: mouse_name,
                keys: profile.dev.mouse.key_list.clone(),
                abs_axes: Vec::new(),
                rel_axes: profile.dev.mouse.rel_list.clone(),
            }) {
                Ok(d) => devices.mouse = Some(d),
                Err(e) => {
                    tracing::error!("failed to create trackpad/mouse uinput device");
                    *devices = Devices::empty();
                    return Err(e);
                }
            }
        }
        drop(devices);

        *self.map.lock() = profile.map.clone();

        {
            let mut state = self.state.lock();
            state.filter_sticks = profile.features.filter_sticks;
            state.filter_pads = profile.features.filter_pads;
        }
        self.set_deadzone(AxisEnum::LStick, profile.dz.l_stick);
        self.set_deadzone(AxisEnum::RStick, profile.dz.r_stick);
        self.set_deadzone(AxisEnum::LPad, profile.dz.l_pad);
        self.set_deadzone(AxisEnum::RPad, profile.dz.r_pad);
        self.set_deadzone(AxisEnum::LTrigg, profile.dz.l_trigg);
        self.set_deadzone(AxisEnum::RTrigg, profile.dz.r_trigg);

        Ok(())
    }

    /// Spawns the poll and lizard-suppression threads.
    pub fn start(self: &Arc<Self>) {
        self.running.store(true, Ordering::SeqCst);

        let poll_driver = Arc::clone(self);
        let poll_handle = std::thread::spawn(move || poll_driver.poll_loop());
        *self.poll_thread.lock() = Some(poll_handle);

        let lizard_driver = Arc::clone(self);
        let lizard_handle = std::thread::spawn(move || lizard_driver.lizard_loop());
        *self.lizard_thread.lock() = Some(lizard_handle);
    }

    /// Clears the run flag, joins both threads, re-enables lizard mode, and
    /// closes the HID device. Lizard mode must be restored before the device
    /// closes, since `set_lizard_mode` needs it open to write the restore.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.poll_thread.lock().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.lizard_thread.lock().take() {
            let _ = handle.join();
        }

        if let Err(e) = self.set_lizard_mode(true) {
            tracing::debug!(error = %e, "failed to restore lizard mode on shutdown");
        }

        self.hid.close();
    }

    fn poll_loop(&self) {
        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.poll_once() {
                match e.kind {
                    ErrorKind::NotOpen | ErrorKind::NoDevice => {
                        tracing::error!("gamepad device lost, stopping poll loop");
                        self.running.store(false, Ordering::SeqCst);
                        break;
                    }
                    _ => tracing::warn!(error = %e, "error while polling gamepad device"),
                }
            }
        }
    }

    fn poll_once(&self) -> Result<()> {
        let buf = match self.hid.read() {
            Ok(buf) => buf,
            Err(e) if e.kind == ErrorKind::NotOpen => return Err(e),
            Err(e) => {
                tracing::error!(error = %e, "failed to read input from gamepad device");
                return Err(e);
            }
        };

        if buf[0] != tag::INPUT {
            tracing::trace!(tag = buf[0], "unhandled report type received from gamepad device");
            return Ok(());
        }

        let raw = PackedInputReport::parse(&buf);
        let map = self.map.lock().clone();
        let mut devices = self.devices.lock();
        {
            let mut state = self.state.lock();
            state.update(&raw);
            translate(&map, &state, &mut devices);
        }
        flush(&mut devices);
        Ok(())
    }

    fn lizard_loop(&self) {
        let report = report::tagged_report(tag::CLEAR_MAPPINGS);
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(LIZARD_SLEEP);
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            if !self.lizard_mode.load(Ordering::SeqCst) {
                if !self.hid.is_open() {
                    tracing::debug!("device is not open, skipping lizard re-assertion");
                } else if let Err(e) = self.hid.write(&report) {
                    tracing::debug!(error = %e, "failed to write gamepad device");
                }
            }
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn flush(devices: &mut Devices) {
    if let Some(d) = devices.gamepad.as_mut() {
        if let Err(e) = d.flush() {
            tracing::debug!(error = %e, "failed to flush gamepad device");
        }
    }
    if let Some(d) = devices.motion.as_mut() {
        if let Err(e) = d.flush() {
            tracing::debug!(error = %e, "failed to flush motion device");
        }
    }
    if let Some(d) = devices.mouse.as_mut() {
        if let Err(e) = d.flush() {
            tracing::debug!(error = %e, "failed to flush mouse device");
        }
    }
}

fn device_for<'a>(devices: &'a mut Devices, dev: Device) -> Option<&'a mut SyntheticDevice> {
    match dev {
        Device::None => None,
        Device::Game => devices.gamepad.as_mut(),
        Device::Motion => devices.motion.as_mut(),
        Device::Mouse => devices.mouse.as_mut(),
        #[cfg(feature = "unstable-command-bindings")]
        Device::Command | Device::Profile => None,
    }
}

/// Dispatches one binding's current value to its target synthetic device,
/// per the mode/ev_type truth table.
fn translate_event(devices: &mut Devices, bind: &Binding, value: f64, mode: BindMode) {
    if bind.is_none() {
        return;
    }
    let Some(device) = device_for(devices, bind.dev) else {
        return;
    };

    match mode {
        BindMode::Button => match bind.ev_type {
            EvType::Key => device.update_key(bind.ev_code, value != 0.0),
            EvType::Abs => {
                if value != 0.0 {
                    device.update_abs(bind.ev_code, if bind.dir { 1.0 } else { -1.0 });
                }
            }
            EvType::Rel => {
                if value != 0.0 {
                    device.update_rel(bind.ev_code, if bind.dir { 1 } else { -1 });
                }
            }
            EvType::None => {}
        },
        BindMode::AxisMinus => match bind.ev_type {
            EvType::Key => device.update_key(bind.ev_code, value < 0.0),
            EvType::Abs => {
                if value < 0.0 {
                    device.update_abs(bind.ev_code, if bind.dir { value.abs() } else { value });
                }
            }
            EvType::Rel => {
                if value < 0.0 {
                    let v = if bind.dir { value.abs() } else { value };
                    device.update_rel(bind.ev_code, v as i32);
                }
            }
            EvType::None => {}
        },
        BindMode::AxisPlus | BindMode::Pressure => match bind.ev_type {
            EvType::Key => device.update_key(bind.ev_code, value > 0.0),
            EvType::Abs => {
                if value > 0.0 {
                    device.update_abs(bind.ev_code, if bind.dir { value } else { -value });
                }
            }
            EvType::Rel => {
                if value > 0.0 {
                    let v = if bind.dir { value } else { -value };
                    device.update_rel(bind.ev_code, v as i32);
                }
            }
            EvType::None => {}
        },
        BindMode::Relative => {
            if bind.ev_type == EvType::Rel {
                device.update_rel(bind.ev_code, value as i32);
            }
        }
    }
}

/// Dispatches every BindMap slot from the current DeviceState.
fn translate(map: &BindMap, state: &DeviceState, devices: &mut Devices) {
    use BindMode::*;

    translate_event(devices, &map.dpad.up, state.btn.dpad_up as u8 as f64, Button);
    translate_event(devices, &map.dpad.down, state.btn.dpad_down as u8 as f64, Button);
    translate_event(devices, &map.dpad.left, state.btn.dpad_left as u8 as f64, Button);
    translate_event(devices, &map.dpad.right, state.btn.dpad_right as u8 as f64, Button);

    translate_event(devices, &map.btn.a, state.btn.a as u8 as f64, Button);
    translate_event(devices, &map.btn.b, state.btn.b as u8 as f64, Button);
    translate_event(devices, &map.btn.x, state.btn.x as u8 as f64, Button);
    translate_event(devices, &map.btn.y, state.btn.y as u8 as f64, Button);
    translate_event(devices, &map.btn.l1, state.btn.l1 as u8 as f64, Button);
    translate_event(devices, &map.btn.l2, state.btn.l2 as u8 as f64, Button);
    translate_event(devices, &map.btn.l3, state.btn.l3 as u8 as f64, Button);
    translate_event(devices, &map.btn.l4, state.btn.l4 as u8 as f64, Button);
    translate_event(devices, &map.btn.l5, state.btn.l5 as u8 as f64, Button);
    translate_event(devices, &map.btn.r1, state.btn.r1 as u8 as f64, Button);
    translate_event(devices, &map.btn.r2, state.btn.r2 as u8 as f64, Button);
    translate_event(devices, &map.btn.r3, state.btn.r3 as u8 as f64, Button);
    translate_event(devices, &map.btn.r4, state.btn.r4 as u8 as f64, Button);
    translate_event(devices, &map.btn.r5, state.btn.r5 as u8 as f64, Button);
    translate_event(devices, &map.btn.menu, state.btn.menu as u8 as f64, Button);
    translate_event(devices, &map.btn.options, state.btn.options as u8 as f64, Button);
    translate_event(devices, &map.btn.steam, state.btn.steam as u8 as f64, Button);
    translate_event(devices, &map.btn.quick_access, state.btn.quick_access as u8 as f64, Button);

    translate_event(devices, &map.trigg.l, state.trigg_l.z, Pressure);
    translate_event(devices, &map.trigg.r, state.trigg_r.z, Pressure);

    translate_event(devices, &map.stick.l.up, state.stick_l.y, AxisMinus);
    translate_event(devices, &map.stick.l.down, state.stick_l.y, AxisPlus);
    translate_event(devices, &map.stick.l.left, state.stick_l.x, AxisMinus);
    translate_event(devices, &map.stick.l.right, state.stick_l.x, AxisPlus);
    translate_event(devices, &map.stick.l.touch, state.stick_l.touch as u8 as f64, Button);
    translate_event(devices, &map.stick.l.force, state.stick_l.force, Pressure);

    translate_event(devices, &map.stick.r.up, state.stick_r.y, AxisMinus);
    translate_event(devices, &map.stick.r.down, state.stick_r.y, AxisPlus);
    translate_event(devices, &map.stick.r.left, state.stick_r.x, AxisMinus);
    translate_event(devices, &map.stick.r.right, state.stick_r.x, AxisPlus);
    translate_event(devices, &map.stick.r.touch, state.stick_r.touch as u8 as f64, Button);
    translate_event(devices, &map.stick.r.force, state.stick_r.force, Pressure);

    translate_event(devices, &map.pad.l.up, state.pad_l.y, AxisMinus);
    translate_event(devices, &map.pad.l.down, state.pad_l.y, AxisPlus);
    translate_event(devices, &map.pad.l.left, state.pad_l.x, AxisMinus);
    translate_event(devices, &map.pad.l.right, state.pad_l.x, AxisPlus);
    translate_event(devices, &map.pad.l.rel_x, state.pad_l.dx, Relative);
    translate_event(devices, &map.pad.l.rel_y, state.pad_l.dy, Relative);
    translate_event(devices, &map.pad.l.touch, state.pad_l.touch as u8 as f64, Button);
    translate_event(devices, &map.pad.l.press, state.pad_l.press as u8 as f64, Button);
    translate_event(devices, &map.pad.l.force, state.pad_l.force, Pressure);

    translate_event(devices, &map.pad.r.up, state.pad_r.y, AxisMinus);
    translate_event(devices, &map.pad.r.down, state.pad_r.y, AxisPlus);
    translate_event(devices, &map.pad.r.left, state.pad_r.x, AxisMinus);
    translate_event(devices, &map.pad.r.right, state.pad_r.x, AxisPlus);
    translate_event(devices, &map.pad.r.rel_x, state.pad_r.dx, Relative);
    translate_event(devices, &map.pad.r.rel_y, state.pad_r.dy, Relative);
    translate_event(devices, &map.pad.r.touch, state.pad_r.touch as u8 as f64, Button);
    translate_event(devices, &map.pad.r.press, state.pad_r.press as u8 as f64, Button);
    translate_event(devices, &map.pad.r.force, state.pad_r.force, Pressure);

    translate_event(devices, &map.accel.x_plus, state.motion.accel_x, AxisPlus);
    translate_event(devices, &map.accel.x_minus, state.motion.accel_x, AxisMinus);
    translate_event(devices, &map.accel.y_plus, state.motion.accel_y, AxisPlus);
    translate_event(devices, &map.accel.y_minus, state.motion.accel_y, AxisMinus);
    translate_event(devices, &map.accel.z_plus, state.motion.accel_z, AxisPlus);
    translate_event(devices, &map.accel.z_minus, state.motion.accel_z, AxisMinus);

    translate_event(devices, &map.att.roll_plus, state.motion.roll, AxisPlus);
    translate_event(devices, &map.att.roll_minus, state.motion.roll, AxisMinus);
    translate_event(devices, &map.att.pitch_plus, state.motion.pitch, AxisPlus);
    translate_event(devices, &map.att.pitch_minus, state.motion.pitch, AxisMinus);
    translate_event(devices, &map.att.yaw_plus, state.motion.yaw, AxisPlus);
    translate_event(devices, &map.att.yaw_minus, state.motion.yaw, AxisMinus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::bindings::{Binding, Device, EvType};

    #[test]
    fn binding_targeting_uninstantiated_device_is_a_no_op() {
        let mut devices = Devices::empty();
        // gamepad feature always creates a device in practice, but here no
        // synthetic device exists for Device::Game, so this must not panic.
        let bind = Binding::event(Device::Game, EvType::Key, 0x130, false);
        translate_event(&mut devices, &bind, 1.0, BindMode::Button);
    }

    #[test]
    fn none_binding_is_a_no_op() {
        let mut devices = Devices::empty();
        let bind = Binding::default();
        translate_event(&mut devices, &bind, 1.0, BindMode::Button);
    }
}
