//! PWM driver abstraction used by the wheel actuators.

use serde::{Deserialize, Serialize};

/// Largest duty value of a 12-bit PWM output.
pub const MAX_DUTY: u16 = 4095;
/// Phase offset used for every motor channel.
pub const PHASE: u16 = 0;

/// The two PWM channels driving one motor's polarity inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalPair {
    pub forward: u8,
    pub backward: u8,
}

impl From<(u8, u8)> for TerminalPair {
    fn from((forward, backward): (u8, u8)) -> Self {
        Self { forward, backward }
    }
}

/// Channel-level access to a PWM chip.
///
/// Errors are the implementation's concern; callers propagate them unchanged.
pub trait PwmDriver {
    type Error: core::fmt::Debug;

    /// Program one output channel with the given duty and phase.
    fn set_channel_duty(
        &mut self,
        channel: u8,
        duty: u16,
        phase: u16,
    ) -> Result<(), Self::Error>;

    /// Program both terminals of a motor.
    ///
    /// The default issues two channel writes in order. Implementations that
    /// can commit both values in one bus transaction should override this.
    fn set_terminal_pair(
        &mut self,
        pair: TerminalPair,
        forward_duty: u16,
        backward_duty: u16,
    ) -> Result<(), Self::Error> {
        self.set_channel_duty(pair.forward, forward_duty, PHASE)?;
        self.set_channel_duty(pair.backward, backward_duty, PHASE)
    }
}

impl<T: PwmDriver + ?Sized> PwmDriver for &mut T {
    type Error = T::Error;

    fn set_channel_duty(
        &mut self,
        channel: u8,
        duty: u16,
        phase: u16,
    ) -> Result<(), Self::Error> {
        (**self).set_channel_duty(channel, duty, phase)
    }

    fn set_terminal_pair(
        &mut self,
        pair: TerminalPair,
        forward_duty: u16,
        backward_duty: u16,
    ) -> Result<(), Self::Error> {
        (**self).set_terminal_pair(pair, forward_duty, backward_duty)
    }
}
