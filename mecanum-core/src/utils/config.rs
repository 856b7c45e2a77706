//! Wheel and vehicle configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides:
//!
//! ```rust
//! use mecanum_core::utils::VehicleConfig;
//! let cfg = VehicleConfig::from_json(br#"{"frequency_hz": 1000}"#).unwrap();
//! assert_eq!(cfg.wheels[1].terminal_pair, (2, 3));
//! ```

use serde::{Deserialize, Serialize};

use crate::utils::{controllers::pwm::MAX_DUTY, error::ConfigError};

pub const MIN_SPEED: u16 = 400;
pub const MAX_SPEED: u16 = 2400;
pub const DEFAULT_INITIAL_SPEED: u16 = 1200;
pub const DEFAULT_STEP: u16 = 200;

/// Initial speed the vehicle gives each of its wheels.
pub const VEHICLE_INITIAL_SPEED: u16 = 1900;
pub const DEFAULT_FREQUENCY_HZ: u16 = 1600;

/// Terminal pairs in wheel order: front-left, front-right, rear-left, rear-right.
pub const DEFAULT_TERMINAL_PAIRS: [(u8, u8); 4] = [(1, 0), (2, 3), (5, 4), (6, 7)];

/// PCA9685 internal oscillator.
pub const OSCILLATOR_HZ: u32 = 25_000_000;
const PWM_RESOLUTION: u32 = 4096;
const PRESCALE_MIN: u32 = 3;
const PRESCALE_MAX: u32 = 255;

/// Construction parameters for one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// (forward terminal, backward terminal) PWM channels.
    pub terminal_pair: (u8, u8),
    pub initial_speed: u16,
    pub step: u16,
    pub min_speed: u16,
    pub max_speed: u16,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_PAIRS[0])
    }
}

impl WheelConfig {
    /// Wheel on the given terminals with default speed settings.
    pub const fn new(terminal_pair: (u8, u8)) -> Self {
        Self {
            terminal_pair,
            initial_speed: DEFAULT_INITIAL_SPEED,
            step: DEFAULT_STEP,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
        }
    }

    pub const fn with_initial_speed(
        mut self,
        speed: u16,
    ) -> Self {
        self.initial_speed = speed;
        self
    }

    pub const fn with_step(
        mut self,
        step: u16,
    ) -> Self {
        self.step = step;
        self
    }

    pub const fn with_bounds(
        mut self,
        min_speed: u16,
        max_speed: u16,
    ) -> Self {
        self.min_speed = min_speed;
        self.max_speed = max_speed;
        self
    }

    /// Check bounds, step and channel assignment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (fwd, bwd) = self.terminal_pair;
        for ch in [fwd, bwd] {
            if ch >= 16 {
                return Err(ConfigError::InvalidChannel(ch));
            }
        }
        if fwd == bwd {
            return Err(ConfigError::SharedTerminal(fwd));
        }
        if self.min_speed == 0 {
            return Err(ConfigError::ZeroMinSpeed);
        }
        if self.min_speed > self.max_speed {
            return Err(ConfigError::InvertedBounds {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if self.max_speed > MAX_DUTY {
            return Err(ConfigError::DutyOutOfRange(self.max_speed));
        }
        if !(self.min_speed..=self.max_speed).contains(&self.initial_speed) {
            return Err(ConfigError::InitialSpeedOutOfBounds {
                speed: self.initial_speed,
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        Ok(())
    }
}

/// Construction parameters for the whole vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// PWM output frequency, programmed once before any wheel command.
    pub frequency_hz: u16,
    /// Wheels in order: front-left, front-right, rear-left, rear-right.
    pub wheels: [WheelConfig; 4],
}

impl Default for VehicleConfig {
    fn default() -> Self {
        let wheel =
            |pair: (u8, u8)| WheelConfig::new(pair).with_initial_speed(VEHICLE_INITIAL_SPEED);
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            wheels: DEFAULT_TERMINAL_PAIRS.map(wheel),
        }
    }
}

impl VehicleConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Set the initial speed of every wheel.
    pub fn with_initial_speed(
        mut self,
        speed: u16,
    ) -> Self {
        for wheel in self.wheels.iter_mut() {
            wheel.initial_speed = speed;
        }
        self
    }

    /// Set the speed step of every wheel.
    pub fn with_step(
        mut self,
        step: u16,
    ) -> Self {
        for wheel in self.wheels.iter_mut() {
            wheel.step = step;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut used = [false; 16];
        for wheel in &self.wheels {
            wheel.validate()?;
            let (fwd, bwd) = wheel.terminal_pair;
            for ch in [fwd, bwd] {
                if core::mem::replace(&mut used[ch as usize], true) {
                    return Err(ConfigError::SharedTerminal(ch));
                }
            }
        }
        self.pwm_prescale().map(|_| ())
    }

    /// PCA9685 prescale register value for `frequency_hz`.
    pub fn pwm_prescale(&self) -> Result<u8, ConfigError> {
        pwm_prescale(self.frequency_hz)
    }
}

/// Compute `round(25 MHz / (4096 * f)) - 1`, rejecting values the chip refuses.
pub fn pwm_prescale(frequency_hz: u16) -> Result<u8, ConfigError> {
    let period = PWM_RESOLUTION * frequency_hz as u32;
    if period == 0 {
        return Err(ConfigError::FrequencyOutOfRange(frequency_hz));
    }
    let prescale = ((OSCILLATOR_HZ + period / 2) / period).saturating_sub(1);
    if !(PRESCALE_MIN..=PRESCALE_MAX).contains(&prescale) {
        return Err(ConfigError::FrequencyOutOfRange(frequency_hz));
    }
    Ok(prescale as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vehicle_is_valid() {
        let cfg = VehicleConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.wheels[2].terminal_pair, (5, 4));
        assert!(cfg.wheels.iter().all(|w| w.initial_speed == 1900));
    }

    #[test]
    fn prescale_matches_datasheet() {
        assert_eq!(pwm_prescale(1600), Ok(3));
        assert_eq!(pwm_prescale(50), Ok(121));
        assert_eq!(pwm_prescale(0), Err(ConfigError::FrequencyOutOfRange(0)));
        assert_eq!(pwm_prescale(2000), Err(ConfigError::FrequencyOutOfRange(2000)));
        assert_eq!(pwm_prescale(10), Err(ConfigError::FrequencyOutOfRange(10)));
    }

    #[test]
    fn wheel_validation_rejects_bad_values() {
        let base = WheelConfig::new((1, 0));
        assert_eq!(
            base.with_bounds(2400, 400).validate(),
            Err(ConfigError::InvertedBounds { min: 2400, max: 400 })
        );
        assert_eq!(
            base.with_initial_speed(100).validate(),
            Err(ConfigError::InitialSpeedOutOfBounds {
                speed: 100,
                min: 400,
                max: 2400
            })
        );
        assert_eq!(base.with_step(0).validate(), Err(ConfigError::ZeroStep));
        assert_eq!(
            base.with_bounds(0, 2400).with_initial_speed(0).validate(),
            Err(ConfigError::ZeroMinSpeed)
        );
        assert_eq!(
            base.with_bounds(400, 5000).validate(),
            Err(ConfigError::DutyOutOfRange(5000))
        );
        assert_eq!(
            WheelConfig::new((16, 0)).validate(),
            Err(ConfigError::InvalidChannel(16))
        );
        assert_eq!(
            WheelConfig::new((3, 3)).validate(),
            Err(ConfigError::SharedTerminal(3))
        );
    }

    #[test]
    fn vehicle_rejects_zero_speed_floor() {
        let mut cfg = VehicleConfig::default();
        cfg.wheels[0] = cfg.wheels[0].with_bounds(0, 2400).with_initial_speed(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroMinSpeed));
    }

    #[test]
    fn vehicle_rejects_channel_reuse() {
        let mut cfg = VehicleConfig::default();
        cfg.wheels[3].terminal_pair = (7, 1);
        assert_eq!(cfg.validate(), Err(ConfigError::SharedTerminal(1)));
    }

    #[test]
    fn json_overrides_single_fields() {
        let cfg = VehicleConfig::from_json(
            br#"{"wheels": [
                {"terminal_pair": [1, 0], "step": 100},
                {"terminal_pair": [2, 3]},
                {"terminal_pair": [5, 4], "initial_speed": 800},
                {"terminal_pair": [6, 7], "max_speed": 3000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(cfg.frequency_hz, 1600);
        assert_eq!(cfg.wheels[0].step, 100);
        assert_eq!(cfg.wheels[1].initial_speed, DEFAULT_INITIAL_SPEED);
        assert_eq!(cfg.wheels[2].initial_speed, 800);
        assert_eq!(cfg.wheels[3].max_speed, 3000);
        assert_eq!(cfg.validate(), Ok(()));
    }
}
