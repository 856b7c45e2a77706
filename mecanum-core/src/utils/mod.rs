//! Utility re-exports and helper macros for the mecanum vehicle.
//!
//! - `config`: wheel and vehicle configuration with validation
//! - `controllers`: wheel actuators, the drive controller and the PCA9685 driver
//! - `error`: drive and configuration errors
//! - `math`: direction-vector kinematics for mecanum motion
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod config;
pub mod controllers;
pub mod error;
pub mod math;

pub use config::{VehicleConfig, WheelConfig};
pub use controllers::{DriveCommand, VehicleController, DRIVE_CHANNEL};
pub use error::{ConfigError, DriveError};
pub use math::kinematics::Motion;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::static_cell::StaticCell<$t> =
            $crate::static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
