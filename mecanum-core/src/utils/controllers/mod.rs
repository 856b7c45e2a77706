//! Module Exports
//!
//! This file exports the modules that drive the vehicle's wheels.
//!
//! - `drive`: four-wheel drive controller applying named motions.
//! - `i2c`: PCA9685 PWM driver on a shared I2C bus.
//! - `pwm`: the PWM driver abstraction.
//! - `wheel`: per-wheel direction and speed state.

pub mod drive;
/// Module for the PCA9685 motor PWM driver.
pub mod i2c;
pub mod pwm;
pub mod wheel;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;
use serde::{Deserialize, Serialize};

pub use drive::{DriveController, WheelPosition};
pub use i2c::{Pca9685Driver, Pca9685Error};
pub use pwm::{PwmDriver, TerminalPair};
pub use wheel::{SpeedOp, WheelActuator};

use crate::utils::{config::VehicleConfig, error::DriveError, math::kinematics::Motion};

/// Channel used to receive drive commands (`DriveCommand` messages).
pub static DRIVE_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    DriveCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Drive command variants.
///
/// Serialized as JSON with tag `"dc"`, e.g. `{"dc":"move","m":"clock3"}` or
/// `{"dc":"speed","op":"+","w":["fl","rr"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dc", rename_all = "snake_case")]
pub enum DriveCommand {
    /// Apply a named motion.
    Move { m: Motion },
    /// Translate toward a clock position.
    Clock { h: u8 },
    /// Step the speed of the listed wheels (all when `w` is absent).
    Speed {
        op: char,
        #[serde(default)]
        w: Option<Vec<WheelPosition, 4>>,
    },
    Stop,
    /// Log the state of every wheel.
    Status,
}

impl DriveCommand {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Command-level front end of the drive controller.
pub struct VehicleController<P: PwmDriver> {
    pub drive: DriveController<P>,
}

impl<P: PwmDriver> VehicleController<P> {
    pub fn new(
        pwm: P,
        config: &VehicleConfig,
    ) -> Result<Self, DriveError<P::Error>> {
        Ok(VehicleController {
            drive: DriveController::new(pwm, config)?,
        })
    }

    /// Execute one `DriveCommand` to completion.
    pub fn execute_command(
        &mut self,
        command: DriveCommand,
    ) -> Result<(), DriveError<P::Error>> {
        match command {
            DriveCommand::Move { m } => self.drive.apply(m).map_err(DriveError::Pwm),
            DriveCommand::Clock { h } => self.drive.move_clock(h),
            DriveCommand::Speed { op, w } => {
                let changed = self.drive.adjust_speed_raw(op, w.as_deref())?;
                tracing::info!(changed, "speed adjusted");
                Ok(())
            }
            DriveCommand::Stop => self.drive.stop().map_err(DriveError::Pwm),
            DriveCommand::Status => {
                for (pos, wheel) in WheelPosition::ALL.iter().zip(self.drive.wheels()) {
                    tracing::info!(
                        ?pos,
                        direction = ?wheel.direction(),
                        speed = wheel.speed(),
                        "wheel status"
                    );
                }
                Ok(())
            }
        }
    }

    /// Receive and execute commands from `DRIVE_CHANNEL` forever.
    ///
    /// Commands run one at a time in arrival order. Failures are logged and
    /// the loop keeps going.
    pub async fn drive_ch(&mut self) -> ! {
        loop {
            let command = DRIVE_CHANNEL.receiver().receive().await;
            tracing::info!("Received drive command: {:?}", command);
            match self.execute_command(command) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => tracing::warn!("drive command rejected: {}", e),
                Err(e) => tracing::error!("drive command failed: {}", e),
            }
        }
    }
}

impl<'a, I2C, E> VehicleController<Pca9685Driver<'a, I2C>>
where
    I2C: embedded_hal::i2c::I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Bring up the PCA9685 at `address`, program `config.frequency_hz` and
    /// stop every wheel.
    ///
    /// If the chip does not come up, the bus is scanned and any responding
    /// addresses are logged before the error is returned.
    pub fn with_pca9685(
        i2c_bus: &'a RefCell<I2C>,
        address: u8,
        config: &VehicleConfig,
    ) -> Result<Self, DriveError<Pca9685Error<E>>> {
        config.validate()?;
        let mut pwm = Pca9685Driver::new(i2c_bus);
        let init = pwm
            .init_device(address)
            .and_then(|()| pwm.configure_pwm(config.frequency_hz));
        if let Err(e) = init {
            tracing::warn!("PCA9685 init failed, scanning instead: {:?}", e);
            pwm.scan_bus();
            return Err(DriveError::Pwm(e));
        }
        Self::new(pwm, config)
    }
}
