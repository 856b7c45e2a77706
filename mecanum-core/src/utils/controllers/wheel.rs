//! Single-wheel actuator.
//!
//! A `WheelActuator` owns one motor's rotation state and speed and turns them
//! into duty values for the motor's two terminals. Exactly one terminal is
//! driven when moving; both are zero when stopped.

use serde::{Deserialize, Serialize};

use crate::utils::{
    config::WheelConfig,
    controllers::pwm::{PwmDriver, TerminalPair},
    error::DriveError,
    math::kinematics::WheelDirection,
};

/// Speed adjustment operator. Serialized as `"+"` / `"-"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedOp {
    #[serde(rename = "+")]
    Increase,
    #[serde(rename = "-")]
    Decrease,
}

impl TryFrom<char> for SpeedOp {
    type Error = char;

    fn try_from(op: char) -> Result<Self, char> {
        match op {
            '+' => Ok(SpeedOp::Increase),
            '-' => Ok(SpeedOp::Decrease),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelActuator {
    pair: TerminalPair,
    speed: u16,
    step: u16,
    min_speed: u16,
    max_speed: u16,
    direction: WheelDirection,
}

impl WheelActuator {
    /// Build a wheel from its configuration and bring it to the stopped state.
    pub fn new<P: PwmDriver>(
        config: &WheelConfig,
        pwm: &mut P,
    ) -> Result<Self, DriveError<P::Error>> {
        config.validate()?;
        let mut wheel = WheelActuator {
            pair: config.terminal_pair.into(),
            speed: config.initial_speed,
            step: config.step,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            direction: WheelDirection::Stopped,
        };
        wheel
            .set_direction(pwm, WheelDirection::Stopped)
            .map_err(DriveError::Pwm)?;
        tracing::info!(pair = ?wheel.pair, speed = wheel.speed, step = wheel.step, "wheel initialized");
        Ok(wheel)
    }

    /// Duty values for (forward terminal, backward terminal) in `direction`.
    pub const fn duties_for(
        &self,
        direction: WheelDirection,
    ) -> (u16, u16) {
        match direction {
            WheelDirection::Stopped => (0, 0),
            WheelDirection::Forward => (self.speed, 0),
            WheelDirection::Backward => (0, self.speed),
        }
    }

    /// Drive the wheel in `direction` at the current speed.
    ///
    /// The direction is recorded even if the driver then fails.
    pub fn set_direction<P: PwmDriver>(
        &mut self,
        pwm: &mut P,
        direction: WheelDirection,
    ) -> Result<(), P::Error> {
        self.direction = direction;
        let (forward, backward) = self.duties_for(direction);
        pwm.set_terminal_pair(self.pair, forward, backward)?;
        tracing::debug!(pair = ?self.pair, ?direction, speed = self.speed, "wheel direction set");
        Ok(())
    }

    /// Step the speed up or down, clamped to the wheel's bounds.
    ///
    /// A changed speed is applied live by re-issuing the current direction.
    /// Returns `false` without touching the driver when already at the bound.
    pub fn adjust_speed<P: PwmDriver>(
        &mut self,
        pwm: &mut P,
        op: SpeedOp,
    ) -> Result<bool, P::Error> {
        let candidate = match op {
            SpeedOp::Increase => self.speed.saturating_add(self.step),
            SpeedOp::Decrease => self.speed.saturating_sub(self.step),
        }
        .clamp(self.min_speed, self.max_speed);

        if candidate == self.speed {
            return Ok(false);
        }
        self.speed = candidate;
        self.set_direction(pwm, self.direction)?;
        tracing::info!(pair = ?self.pair, speed = self.speed, ?op, "wheel speed changed");
        Ok(true)
    }

    /// Like [`adjust_speed`](Self::adjust_speed), taking the operator as a
    /// raw character. Unknown operators are logged and rejected untouched.
    pub fn adjust_speed_raw<P: PwmDriver>(
        &mut self,
        pwm: &mut P,
        op: char,
    ) -> Result<bool, DriveError<P::Error>> {
        let op = SpeedOp::try_from(op).map_err(|op| {
            tracing::warn!(pair = ?self.pair, ?op, speed = self.speed, "unknown speed operator");
            DriveError::InvalidSpeedOperator(op)
        })?;
        self.adjust_speed(pwm, op).map_err(DriveError::Pwm)
    }

    pub fn terminal_pair(&self) -> TerminalPair {
        self.pair
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn step(&self) -> u16 {
        self.step
    }

    /// Inclusive speed bounds `(min, max)`.
    pub fn bounds(&self) -> (u16, u16) {
        (self.min_speed, self.max_speed)
    }

    pub fn direction(&self) -> WheelDirection {
        self.direction
    }

    /// Duty values currently driven on (forward, backward) terminals.
    pub fn duties(&self) -> (u16, u16) {
        self.duties_for(self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::controllers::pwm::recorder::RecordingPwm;

    fn wheel(pwm: &mut RecordingPwm) -> WheelActuator {
        let cfg = WheelConfig::new((1, 0))
            .with_initial_speed(1200)
            .with_step(200)
            .with_bounds(400, 2400);
        WheelActuator::new(&cfg, pwm).unwrap()
    }

    #[test]
    fn test_new_wheel_is_stopped() {
        let mut pwm = RecordingPwm::default();
        let w = wheel(&mut pwm);
        assert_eq!(w.direction(), WheelDirection::Stopped);
        assert_eq!(pwm.writes, [(1, 0, 0), (0, 0, 0)]);
    }

    #[test]
    fn test_forward_and_backward_polarity() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        pwm.writes.clear();

        w.set_direction(&mut pwm, WheelDirection::Forward).unwrap();
        assert_eq!(pwm.writes, [(1, 1200, 0), (0, 0, 0)]);

        w.set_direction(&mut pwm, WheelDirection::Backward).unwrap();
        assert_eq!(pwm.writes[2..], [(1, 0, 0), (0, 1200, 0)]);

        w.set_direction(&mut pwm, WheelDirection::Stopped).unwrap();
        assert_eq!(pwm.writes[4..], [(1, 0, 0), (0, 0, 0)]);
        assert_eq!(w.speed(), 1200);
    }

    #[test]
    fn test_increase_clamps_at_max() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);

        assert!(w.adjust_speed(&mut pwm, SpeedOp::Increase).unwrap());
        assert_eq!(w.speed(), 1400);

        let mut changed = 0;
        for _ in 0..10 {
            let before = pwm.writes.len();
            if w.adjust_speed(&mut pwm, SpeedOp::Increase).unwrap() {
                changed += 1;
                assert_eq!(pwm.writes.len(), before + 2);
            } else {
                assert_eq!(pwm.writes.len(), before);
            }
            assert!(w.speed() <= 2400);
        }
        assert_eq!(changed, 5);
        assert_eq!(w.speed(), 2400);
    }

    #[test]
    fn test_decrease_clamps_at_min() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        let mut last = w.speed();
        for _ in 0..8 {
            w.adjust_speed(&mut pwm, SpeedOp::Decrease).unwrap();
            assert!(w.speed() <= last);
            assert!(w.speed() >= 400);
            last = w.speed();
        }
        assert_eq!(w.speed(), 400);
        let before = pwm.writes.len();
        assert!(!w.adjust_speed(&mut pwm, SpeedOp::Decrease).unwrap());
        assert_eq!(pwm.writes.len(), before);
    }

    #[test]
    fn test_uneven_step_lands_on_bound() {
        let mut pwm = RecordingPwm::default();
        let cfg = WheelConfig::new((2, 3))
            .with_initial_speed(2300)
            .with_step(300);
        let mut w = WheelActuator::new(&cfg, &mut pwm).unwrap();
        assert!(w.adjust_speed(&mut pwm, SpeedOp::Increase).unwrap());
        assert_eq!(w.speed(), 2400);
    }

    #[test]
    fn test_speed_change_applies_live_when_moving() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        w.set_direction(&mut pwm, WheelDirection::Backward).unwrap();
        w.adjust_speed(&mut pwm, SpeedOp::Decrease).unwrap();
        assert_eq!(pwm.duty(1), Some(0));
        assert_eq!(pwm.duty(0), Some(1000));
    }

    #[test]
    fn test_speed_change_while_stopped_is_deferred() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        pwm.writes.clear();

        w.adjust_speed(&mut pwm, SpeedOp::Increase).unwrap();
        assert_eq!(pwm.writes, [(1, 0, 0), (0, 0, 0)]);
        assert_eq!(w.speed(), 1400);

        w.set_direction(&mut pwm, WheelDirection::Forward).unwrap();
        assert_eq!(pwm.duty(1), Some(1400));
    }

    #[test]
    fn test_invalid_operator_leaves_state() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        w.set_direction(&mut pwm, WheelDirection::Forward).unwrap();
        let snapshot = w.clone();
        let before = pwm.writes.len();

        let err = w.adjust_speed_raw(&mut pwm, '*').unwrap_err();
        assert!(matches!(err, DriveError::InvalidSpeedOperator('*')));
        assert_eq!(w, snapshot);
        assert_eq!(pwm.writes.len(), before);

        assert!(w.adjust_speed_raw(&mut pwm, '+').unwrap());
        assert_eq!(w.speed(), 1400);
    }

    #[test]
    fn test_driver_fault_propagates() {
        let mut pwm = RecordingPwm::default();
        let mut w = wheel(&mut pwm);
        pwm.fail_after = Some(pwm.writes.len() + 1);

        assert_eq!(w.set_direction(&mut pwm, WheelDirection::Forward), Err(()));
        assert_eq!(w.direction(), WheelDirection::Forward);
        assert_eq!(pwm.writes.last(), Some(&(1, 1200, 0)));
    }
}
