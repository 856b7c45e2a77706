//! Error types for the drive core.
//!
//! Driver faults are carried through unchanged in `DriveError::Pwm`; the core
//! never retries a duty-cycle write.

use core::fmt;

/// Invalid wheel or vehicle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `min_speed` is greater than `max_speed`.
    InvertedBounds { min: u16, max: u16 },
    /// The initial speed lies outside `[min_speed, max_speed]`.
    InitialSpeedOutOfBounds { speed: u16, min: u16, max: u16 },
    /// A zero speed floor would let a moving wheel drive neither terminal.
    ZeroMinSpeed,
    /// A zero step would make speed adjustment a permanent no-op.
    ZeroStep,
    /// A duty value exceeds the 12-bit PWM range.
    DutyOutOfRange(u16),
    /// Channel index outside the 16 PWM outputs.
    InvalidChannel(u8),
    /// The same PWM channel is wired to more than one terminal.
    SharedTerminal(u8),
    /// No valid prescale exists for the requested PWM frequency.
    FrequencyOutOfRange(u16),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::InvertedBounds { min, max } => {
                write!(f, "min speed {} is above max speed {}", min, max)
            }
            ConfigError::InitialSpeedOutOfBounds { speed, min, max } => {
                write!(f, "initial speed {} is outside [{}, {}]", speed, min, max)
            }
            ConfigError::ZeroMinSpeed => f.write_str("min speed must be nonzero"),
            ConfigError::ZeroStep => f.write_str("speed step must be nonzero"),
            ConfigError::DutyOutOfRange(duty) => write!(f, "duty {} exceeds 4095", duty),
            ConfigError::InvalidChannel(ch) => write!(f, "PWM channel {} does not exist", ch),
            ConfigError::SharedTerminal(ch) => write!(f, "PWM channel {} is used twice", ch),
            ConfigError::FrequencyOutOfRange(hz) => {
                write!(f, "PWM frequency {} Hz is out of range", hz)
            }
        }
    }
}

/// Errors surfaced by wheel and drive commands.
#[derive(Debug)]
pub enum DriveError<E> {
    /// Fault raised by the PWM driver abstraction.
    Pwm(E),
    /// Speed operator other than `+` or `-`. State is left untouched.
    InvalidSpeedOperator(char),
    /// Clock position with no mapped motion.
    UnsupportedClockPosition(u8),
    Config(ConfigError),
}

impl<E> From<ConfigError> for DriveError<E> {
    fn from(e: ConfigError) -> Self {
        DriveError::Config(e)
    }
}

impl<E: fmt::Debug> fmt::Display for DriveError<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            DriveError::Pwm(e) => write!(f, "PWM driver fault: {:?}", e),
            DriveError::InvalidSpeedOperator(op) => write!(f, "unknown speed operator {:?}", op),
            DriveError::UnsupportedClockPosition(h) => {
                write!(f, "no motion for clock position {}", h)
            }
            DriveError::Config(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl<E> DriveError<E> {
    /// Whether the error was handled locally and leaves the vehicle state intact.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DriveError::Pwm(_))
    }
}
