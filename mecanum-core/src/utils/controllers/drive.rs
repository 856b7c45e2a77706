//! Four-wheel drive controller.
//!
//! Owns the PWM driver and the four wheel actuators, and applies named motions
//! as direction vectors.
//!
//! ```text
//!   A(FL) ----- B(FR)
//!     |           |
//!     |           |
//!   C(RL) ----- D(RR)
//! ```

use serde::{Deserialize, Serialize};

use crate::utils::{
    config::VehicleConfig,
    controllers::{
        pwm::PwmDriver,
        wheel::{SpeedOp, WheelActuator},
    },
    error::DriveError,
    math::kinematics::{DirectionVector, Motion, WheelDirection},
};

/// Wheel corner. Serialized as `"fl"`, `"fr"`, `"rl"`, `"rr"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelPosition {
    #[serde(rename = "fl")]
    FrontLeft,
    #[serde(rename = "fr")]
    FrontRight,
    #[serde(rename = "rl")]
    RearLeft,
    #[serde(rename = "rr")]
    RearRight,
}

impl WheelPosition {
    /// Positions in direction-vector order.
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

pub struct DriveController<P: PwmDriver> {
    pwm: P,
    // Order must match `WheelPosition::ALL`; direction vectors index it positionally.
    wheels: [WheelActuator; 4],
}

impl<P: PwmDriver> DriveController<P> {
    /// Create the controller and stop every wheel.
    ///
    /// The PWM chip must already run at `config.frequency_hz`.
    pub fn new(
        mut pwm: P,
        config: &VehicleConfig,
    ) -> Result<Self, DriveError<P::Error>> {
        config.validate()?;
        let [fl, fr, rl, rr] = &config.wheels;
        let wheels = [
            WheelActuator::new(fl, &mut pwm)?,
            WheelActuator::new(fr, &mut pwm)?,
            WheelActuator::new(rl, &mut pwm)?,
            WheelActuator::new(rr, &mut pwm)?,
        ];
        tracing::info!(frequency_hz = config.frequency_hz, "drive controller ready");
        Ok(DriveController { pwm, wheels })
    }

    /// Apply a direction vector, front-left first.
    ///
    /// Stops at the first driver fault; wheels after it keep their old state.
    pub fn indicate_wheels(
        &mut self,
        vector: DirectionVector,
    ) -> Result<(), P::Error> {
        for (wheel, direction) in self.wheels.iter_mut().zip(vector) {
            wheel.set_direction(&mut self.pwm, direction)?;
        }
        Ok(())
    }

    pub fn apply(
        &mut self,
        motion: Motion,
    ) -> Result<(), P::Error> {
        tracing::info!(?motion, "applying motion");
        self.indicate_wheels(motion.direction_vector())
    }

    /// Translate toward a clock position (12 is straight ahead).
    pub fn move_clock(
        &mut self,
        hour: u8,
    ) -> Result<(), DriveError<P::Error>> {
        let motion = Motion::from_clock(hour).ok_or_else(|| {
            tracing::warn!(hour, "no motion for clock position");
            DriveError::UnsupportedClockPosition(hour)
        })?;
        self.apply(motion).map_err(DriveError::Pwm)
    }

    pub fn move_clock12(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock12)
    }

    pub fn move_clock6(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock6)
    }

    pub fn move_clock2(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock2)
    }

    pub fn move_clock10(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock10)
    }

    pub fn move_clock4(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock4)
    }

    pub fn move_clock8(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock8)
    }

    pub fn move_clock3(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock3)
    }

    pub fn move_clock9(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clock9)
    }

    pub fn move_clockwise(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Clockwise)
    }

    pub fn rotate_clockwise(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::RotateClockwise)
    }

    pub fn move_anticlockwise(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Anticlockwise)
    }

    pub fn stop(&mut self) -> Result<(), P::Error> {
        self.apply(Motion::Stop)
    }

    /// Step the speed of the selected wheels, or all of them for `None`.
    ///
    /// Each wheel clamps on its own. Returns how many wheels changed speed.
    pub fn adjust_speed(
        &mut self,
        op: SpeedOp,
        wheels: Option<&[WheelPosition]>,
    ) -> Result<usize, P::Error> {
        let selected = wheels.unwrap_or(&WheelPosition::ALL[..]);
        let mut changed = 0;
        for pos in selected {
            if self.wheels[pos.index()].adjust_speed(&mut self.pwm, op)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// [`adjust_speed`](Self::adjust_speed) with a raw operator character.
    pub fn adjust_speed_raw(
        &mut self,
        op: char,
        wheels: Option<&[WheelPosition]>,
    ) -> Result<usize, DriveError<P::Error>> {
        let op = SpeedOp::try_from(op).map_err(|op| {
            tracing::warn!(?op, "unknown speed operator");
            DriveError::InvalidSpeedOperator(op)
        })?;
        self.adjust_speed(op, wheels).map_err(DriveError::Pwm)
    }

    pub fn wheel(
        &self,
        pos: WheelPosition,
    ) -> &WheelActuator {
        &self.wheels[pos.index()]
    }

    pub fn wheels(&self) -> &[WheelActuator; 4] {
        &self.wheels
    }

    /// Current direction of every wheel.
    pub fn directions(&self) -> DirectionVector {
        self.wheels.each_ref().map(WheelActuator::direction)
    }

    pub fn is_stopped(&self) -> bool {
        self.wheels
            .iter()
            .all(|w| w.direction() == WheelDirection::Stopped)
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Stop every wheel before the controller is released.
    pub fn shutdown(&mut self) -> Result<(), P::Error> {
        tracing::info!("drive controller shutting down");
        self.stop()
    }
}

impl<P: PwmDriver> Drop for DriveController<P> {
    fn drop(&mut self) {
        if self.is_stopped() {
            return;
        }
        if let Err(e) = self.stop() {
            tracing::warn!(error = ?e, "failed to stop wheels on drop");
        }
    }
}
