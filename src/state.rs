//! Normalized device state: the decode, deadzone, and filtering stage that
//! sits between a raw [`PackedInputReport`](crate::hid::report::PackedInputReport)
//! and the binding dispatch in [`crate::driver`].

use crate::hid::report::PackedInputReport;

const STICK_AXIS_MAX: f64 = 32767.0;
const TRIGG_AXIS_MAX: f64 = 32767.0;
const PAD_AXIS_MAX: f64 = 32767.0;
const STICK_FORCE_MAX: f64 = 255.0;
const PAD_FORCE_MAX: f64 = 255.0;
/// Touchpad delta decay applied each tick the finger isn't touching.
/// Coupled to the ~250 Hz poll rate; changing the poll rate without
/// recalibrating this constant changes the felt inertia.
const PAD_DECAY: f64 = 0.95;

/// A deadzone and its derived rescale factor, shared by sticks, pads and
/// triggers.
#[derive(Debug, Clone, Copy)]
pub struct Deadzone {
    pub deadzone: f64,
    pub scale: f64,
}

impl Deadzone {
    pub fn new(deadzone: f64) -> Self {
        let deadzone = deadzone.clamp(0.0, 0.9);
        Self {
            deadzone,
            scale: 1.0 / (1.0 - deadzone),
        }
    }
}

impl Default for Deadzone {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    pub z: f64,
    pub dz: Deadzone,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StickState {
    pub x: f64,
    pub y: f64,
    pub touch: bool,
    pub force: f64,
    pub dz: Deadzone,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PadState {
    pub x: f64,
    pub y: f64,
    /// Sensitivity-scaled absolute coordinates used for delta computation.
    pub sx: f64,
    pub sy: f64,
    pub dx: f64,
    pub dy: f64,
    pub touch: bool,
    pub press: bool,
    pub force: f64,
    pub dz: Deadzone,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonState {
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub l1: bool,
    pub l2: bool,
    pub l3: bool,
    pub l4: bool,
    pub l5: bool,
    pub r1: bool,
    pub r2: bool,
    pub r3: bool,
    pub r4: bool,
    pub r5: bool,
    pub menu: bool,
    pub options: bool,
    pub steam: bool,
    pub quick_access: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MotionState {
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Full decoded and filtered device state, mutated once per poll tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceState {
    pub btn: ButtonState,
    pub trigg_l: TriggerState,
    pub trigg_r: TriggerState,
    pub stick_l: StickState,
    pub stick_r: StickState,
    pub pad_l: PadState,
    pub pad_r: PadState,
    pub motion: MotionState,
    pub filter_sticks: bool,
    pub filter_pads: bool,
}

impl DeviceState {
    /// Decodes a raw report into `self`, applying trigger deadzones,
    /// touchpad inertia, and (if enabled) radial stick/pad filtering.
    /// `self` is used both as the output and as the previous tick's state
    /// for delta computation, so the caller must not reset fields this
    /// call doesn't touch.
    pub fn update(&mut self, raw: &PackedInputReport) {
        let prev = *self;

        self.btn = ButtonState {
            dpad_up: raw.dpad_up,
            dpad_down: raw.dpad_down,
            dpad_left: raw.dpad_left,
            dpad_right: raw.dpad_right,
            a: raw.a,
            b: raw.b,
            x: raw.x,
            y: raw.y,
            l1: raw.l1,
            l2: raw.l2,
            l3: raw.l3,
            l4: raw.l4,
            l5: raw.l5,
            r1: raw.r1,
            r2: raw.r2,
            r3: raw.r3,
            r4: raw.r4,
            r5: raw.r5,
            menu: raw.menu,
            options: raw.options,
            steam: raw.steam,
            quick_access: raw.quick_access,
        };

        self.trigg_l.z = decode_trigger(raw.l_trigg, self.trigg_l.dz);
        self.trigg_r.z = decode_trigger(raw.r_trigg, self.trigg_r.dz);

        self.stick_l.x = raw.l_stick_x as f64 / STICK_AXIS_MAX;
        self.stick_l.y = raw.l_stick_y as f64 / STICK_AXIS_MAX;
        self.stick_l.touch = raw.l_stick_touch;
        self.stick_l.force = (raw.l_stick_force as f64 / STICK_FORCE_MAX).min(1.0);

        self.stick_r.x = raw.r_stick_x as f64 / STICK_AXIS_MAX;
        self.stick_r.y = raw.r_stick_y as f64 / STICK_AXIS_MAX;
        self.stick_r.touch = raw.r_stick_touch;
        self.stick_r.force = (raw.r_stick_force as f64 / STICK_FORCE_MAX).min(1.0);

        if self.filter_sticks {
            filter_stick_coords(&mut self.stick_l.x, &mut self.stick_l.y, self.stick_l.dz);
            filter_stick_coords(&mut self.stick_r.x, &mut self.stick_r.y, self.stick_r.dz);
        }

        self.pad_l.x = raw.l_pad_x as f64 / PAD_AXIS_MAX;
        self.pad_l.y = raw.l_pad_y as f64 / PAD_AXIS_MAX;
        self.pad_l.sx = (raw.l_pad_x as f64 + PAD_AXIS_MAX) / (2.0 * PAD_AXIS_MAX);
        self.pad_l.sy = (raw.l_pad_y as f64 * -1.0 + PAD_AXIS_MAX) / (2.0 * PAD_AXIS_MAX);
        self.pad_l.touch = raw.l_pad_touch;
        self.pad_l.press = raw.l_pad_press;
        self.pad_l.force = (raw.l_pad_force as f64 / PAD_FORCE_MAX).min(1.0);
        update_pad_delta(&mut self.pad_l, &prev.pad_l);

        self.pad_r.x = raw.r_pad_x as f64 / PAD_AXIS_MAX;
        self.pad_r.y = raw.r_pad_y as f64 / PAD_AXIS_MAX;
        self.pad_r.sx = (raw.r_pad_x as f64 + PAD_AXIS_MAX) / (2.0 * PAD_AXIS_MAX);
        self.pad_r.sy = (raw.r_pad_y as f64 * -1.0 + PAD_AXIS_MAX) / (2.0 * PAD_AXIS_MAX);
        self.pad_r.touch = raw.r_pad_touch;
        self.pad_r.press = raw.r_pad_press;
        self.pad_r.force = (raw.r_pad_force as f64 / PAD_FORCE_MAX).min(1.0);
        update_pad_delta(&mut self.pad_r, &prev.pad_r);

        if self.filter_pads {
            filter_pad_coords(&mut self.pad_l.x, &mut self.pad_l.y, self.pad_l.dz);
            filter_pad_coords(&mut self.pad_r.x, &mut self.pad_r.y, self.pad_r.dz);
        }

        // Accelerometer/gyro decode. Upstream leaves this as a TODO; this
        // port implements a plain linear normalization so the motion device
        // (when enabled via the `motion` feature) carries real data rather
        // than silently emitting zero.
        self.motion.accel_x = raw.accel_x as f64 / STICK_AXIS_MAX;
        self.motion.accel_y = raw.accel_y as f64 / STICK_AXIS_MAX;
        self.motion.accel_z = raw.accel_z as f64 / STICK_AXIS_MAX;
        self.motion.roll = raw.gyro_x as f64 / STICK_AXIS_MAX;
        self.motion.pitch = raw.gyro_y as f64 / STICK_AXIS_MAX;
        self.motion.yaw = raw.gyro_z as f64 / STICK_AXIS_MAX;
    }
}

fn decode_trigger(raw: u16, dz: Deadzone) -> f64 {
    let z = raw as f64 / TRIGG_AXIS_MAX;
    if dz.deadzone > 0.0 {
        if z < dz.deadzone {
            0.0
        } else {
            (z - dz.deadzone) * dz.scale
        }
    } else {
        z
    }
}

fn update_pad_delta(pad: &mut PadState, prev: &PadState) {
    if pad.touch && prev.touch {
        pad.dx = ((pad.sx - prev.sx) + prev.dx) / 2.0;
        pad.dy = ((pad.sy - prev.sy) + prev.dy) / 2.0;
    } else {
        pad.dx = prev.dx * PAD_DECAY;
        pad.dy = prev.dy * PAD_DECAY;
    }
}

/// Radial deadzone filter for stick axes: clips to the origin inside the
/// deadzone, rescales outside it, and clamps magnitude to the unit circle.
pub fn filter_stick_coords(x: &mut f64, y: &mut f64, dz: Deadzone) {
    let mag = (x.powi(2) + y.powi(2)).sqrt();
    let ang = y.atan2(*x);

    if mag < dz.deadzone {
        *x = 0.0;
        *y = 0.0;
    } else {
        let mag = ((mag - dz.deadzone) * dz.scale).min(1.0);
        *x = mag * ang.cos();
        *y = mag * ang.sin();
    }
}

/// Same radial filter as [`filter_stick_coords`] but without the unit-circle
/// clamp, matching the original's separate pad filter.
pub fn filter_pad_coords(x: &mut f64, y: &mut f64, dz: Deadzone) {
    let mag = (x.powi(2) + y.powi(2)).sqrt();
    let ang = y.atan2(*x);

    if mag < dz.deadzone {
        *x = 0.0;
        *y = 0.0;
    } else {
        let mag = (mag - dz.deadzone) * dz.scale;
        *x = mag * ang.cos();
        *y = mag * ang.sin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_outside_deadzone_is_idempotent_in_direction() {
        let dz = Deadzone::new(0.1);
        let mut x = 0.9;
        let mut y = 0.0;
        filter_stick_coords(&mut x, &mut y, dz);
        assert!(x > 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn filter_inside_deadzone_clips_to_zero() {
        let dz = Deadzone::new(0.2);
        let mut x = 0.1;
        let mut y = 0.05;
        filter_stick_coords(&mut x, &mut y, dz);
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn stick_filter_clamps_to_unit_circle() {
        let dz = Deadzone::new(0.0);
        let mut x = 2.0;
        let mut y = 2.0;
        filter_stick_coords(&mut x, &mut y, dz);
        assert!((x.powi(2) + y.powi(2)).sqrt() <= 1.0 + 1e-9);
    }

    #[test]
    fn pad_filter_does_not_clamp_magnitude() {
        let dz = Deadzone::new(0.0);
        let mut x = 2.0;
        let mut y = 2.0;
        filter_pad_coords(&mut x, &mut y, dz);
        assert!((x.powi(2) + y.powi(2)).sqrt() > 1.0);
    }

    #[test]
    fn pad_delta_decays_when_not_touching() {
        let mut pad = PadState {
            dx: 1.0,
            dy: 1.0,
            touch: false,
            ..Default::default()
        };
        let prev = pad;
        update_pad_delta(&mut pad, &prev);
        assert_eq!(pad.dx, 0.95);
        assert_eq!(pad.dy, 0.95);
    }

    #[test]
    fn trigger_deadzone_zero_passes_through() {
        assert_eq!(decode_trigger(16383, Deadzone::new(0.0)), 16383.0 / TRIGG_AXIS_MAX);
    }
}
