//! Userspace driver daemon core: HID transport, synthetic uinput devices,
//! the profile model and its INI loader, and the driver engine tying them
//! together. See `bin/opensdd.rs` for the daemon shell.

pub mod cli;
pub mod driver;
pub mod error;
pub mod hid;
pub mod paths;
pub mod profile;
pub mod state;
pub mod uinput;

pub use driver::Driver;
pub use error::{DriverError, ErrorKind, Result};
