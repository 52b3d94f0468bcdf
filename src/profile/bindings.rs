//! The binding map: every logical control slot on the physical device and
//! the output event it's routed to.

/// Which synthetic device (if any) a binding targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    None,
    Game,
    Motion,
    Mouse,
    #[cfg(feature = "unstable-command-bindings")]
    Command,
    #[cfg(feature = "unstable-command-bindings")]
    Profile,
}

/// Input event type a binding emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvType {
    #[default]
    None,
    Key,
    Abs,
    Rel,
}

/// How a state value maps to the trigger condition for a binding, decided by
/// the slot it occupies in [`BindMap`] (a stick's `up` binding is
/// `AxisMinus`, its `force` binding is `Pressure`, a d-pad direction is
/// `Button`, a touchpad's `rel_x` is `Relative`, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    Button,
    AxisMinus,
    AxisPlus,
    Pressure,
    Relative,
}

/// A single control-to-event mapping.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub dev: Device,
    pub ev_type: EvType,
    pub ev_code: u16,
    /// Axis direction: `true` = positive/`+`, `false` = negative/`-`.
    pub dir: bool,
    #[cfg(feature = "unstable-command-bindings")]
    pub cmd: String,
    #[cfg(feature = "unstable-command-bindings")]
    pub id: u32,
    #[cfg(feature = "unstable-command-bindings")]
    pub delay_ms: u64,
    #[cfg(feature = "unstable-command-bindings")]
    pub profile_name: String,
}

impl Binding {
    pub fn event(dev: Device, ev_type: EvType, ev_code: u16, dir: bool) -> Self {
        Self {
            dev,
            ev_type,
            ev_code,
            dir,
            ..Default::default()
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.dev, Device::None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DpadBindings {
    pub up: Binding,
    pub down: Binding,
    pub left: Binding,
    pub right: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct ButtonBindings {
    pub a: Binding,
    pub b: Binding,
    pub x: Binding,
    pub y: Binding,
    pub l1: Binding,
    pub l2: Binding,
    pub l3: Binding,
    pub l4: Binding,
    pub l5: Binding,
    pub r1: Binding,
    pub r2: Binding,
    pub r3: Binding,
    pub r4: Binding,
    pub r5: Binding,
    pub menu: Binding,
    pub options: Binding,
    pub steam: Binding,
    pub quick_access: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerBindings {
    pub l: Binding,
    pub r: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct StickBindings {
    pub up: Binding,
    pub down: Binding,
    pub left: Binding,
    pub right: Binding,
    pub touch: Binding,
    pub force: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct StickPairBindings {
    pub l: StickBindings,
    pub r: StickBindings,
}

#[derive(Debug, Clone, Default)]
pub struct TouchpadBindings {
    pub up: Binding,
    pub down: Binding,
    pub left: Binding,
    pub right: Binding,
    pub rel_x: Binding,
    pub rel_y: Binding,
    pub touch: Binding,
    pub press: Binding,
    pub force: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct TouchpadPairBindings {
    pub l: TouchpadBindings,
    pub r: TouchpadBindings,
}

#[derive(Debug, Clone, Default)]
pub struct AccelBindings {
    pub x_plus: Binding,
    pub x_minus: Binding,
    pub y_plus: Binding,
    pub y_minus: Binding,
    pub z_plus: Binding,
    pub z_minus: Binding,
}

#[derive(Debug, Clone, Default)]
pub struct AttitudeBindings {
    pub roll_plus: Binding,
    pub roll_minus: Binding,
    pub pitch_plus: Binding,
    pub pitch_minus: Binding,
    pub yaw_plus: Binding,
    pub yaw_minus: Binding,
}

/// Every logical control slot the device exposes, each carrying one
/// [`Binding`].
#[derive(Debug, Clone, Default)]
pub struct BindMap {
    pub dpad: DpadBindings,
    pub btn: ButtonBindings,
    pub trigg: TriggerBindings,
    pub stick: StickPairBindings,
    pub pad: TouchpadPairBindings,
    pub accel: AccelBindings,
    pub att: AttitudeBindings,
}

/// The six axis groups a deadzone applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEnum {
    LStick,
    RStick,
    LPad,
    RPad,
    LTrigg,
    RTrigg,
}
