//! PCA9685 PWM driver over a shared I2C bus.
//!
//! Implements `PwmDriver` for the motor outputs. A shadow of all 16 channels
//! is kept so that both terminals of a motor are committed in one
//! auto-increment bus transaction.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use crate::utils::{
    config::pwm_prescale,
    controllers::pwm::{PwmDriver, TerminalPair, MAX_DUTY, PHASE},
};

/// Default I2C address of the PCA9685.
pub const PWM_ADDRESS: u8 = 0x40;
const CHANNELS: usize = 16;

/// Errors that can occur when driving the PCA9685.
#[derive(Debug)]
pub enum Pca9685Error<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    PwmNotInitialized,
    InvalidChannel(u8),
    DutyOutOfRange(u16),
    FrequencyOutOfRange(u16),
}

/// PCA9685 driver sharing an I2C bus with other devices.
pub struct Pca9685Driver<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    pub pwm: Option<Pca9685<RefCellDevice<'a, I2C>>>,
    on: [u16; CHANNELS],
    off: [u16; CHANNELS],
}

impl<'a, I2C, E> Pca9685Driver<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        Pca9685Driver {
            i2c: i2c_bus,
            pwm: None,
            on: [0; CHANNELS],
            off: [0; CHANNELS],
        }
    }

    /// Attach to the PCA9685 at `address`.
    pub fn init_device(
        &mut self,
        address: u8,
    ) -> Result<(), Pca9685Error<E>> {
        let pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(address))
            .map_err(Pca9685Error::PwmError)?;
        self.pwm = Some(pwm);
        Ok(())
    }

    /// Scan the I2C bus for devices and log any found addresses.
    pub fn scan_bus(&self) {
        let mut bus = self.i2c.borrow_mut();
        for addr in 0x03..0x78 {
            if bus.write(addr, &[]).is_ok() {
                tracing::warn!("I2C device found at 0x{:02X}", addr);
            }
        }
    }

    /// Enable the oscillator and program the prescale for `frequency_hz`.
    pub fn configure_pwm(
        &mut self,
        frequency_hz: u16,
    ) -> Result<(), Pca9685Error<E>> {
        let prescale = pwm_prescale(frequency_hz)
            .map_err(|_| Pca9685Error::FrequencyOutOfRange(frequency_hz))?;
        self.enable()?;
        tracing::info!("PWM enabled");
        let pca = self.pwm.as_mut().ok_or(Pca9685Error::PwmNotInitialized)?;
        pca.set_prescale(prescale).map_err(Pca9685Error::PwmError)?;
        tracing::info!(frequency_hz, prescale, "PWM prescale set");
        Ok(())
    }

    pub fn enable(&mut self) -> Result<(), Pca9685Error<E>> {
        let pca = self.pwm.as_mut().ok_or(Pca9685Error::PwmNotInitialized)?;
        pca.enable().map_err(Pca9685Error::PwmError)
    }

    /// Last (on, off) counts committed for `channel`.
    pub fn shadow(
        &self,
        channel: u8,
    ) -> Option<(u16, u16)> {
        let i = channel as usize;
        (i < CHANNELS).then(|| (self.on[i], self.off[i]))
    }
}

fn check_duty<E: core::fmt::Debug>(duty: u16) -> Result<u16, Pca9685Error<E>> {
    if duty > MAX_DUTY {
        return Err(Pca9685Error::DutyOutOfRange(duty));
    }
    Ok(duty)
}

fn channel<E: core::fmt::Debug>(index: u8) -> Result<Channel, Pca9685Error<E>> {
    let ch = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return Err(Pca9685Error::InvalidChannel(index)),
    };
    Ok(ch)
}

impl<'a, I2C, E> PwmDriver for Pca9685Driver<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = Pca9685Error<E>;

    /// Program one channel: output rises at `phase` and falls at `duty`.
    fn set_channel_duty(
        &mut self,
        channel_index: u8,
        duty: u16,
        phase: u16,
    ) -> Result<(), Self::Error> {
        let ch = channel::<E>(channel_index)?;
        let duty = check_duty::<E>(duty)?;
        let pca = self.pwm.as_mut().ok_or(Pca9685Error::PwmNotInitialized)?;
        pca.set_channel_on_off(ch, phase, duty)
            .map_err(Pca9685Error::PwmError)?;
        self.on[channel_index as usize] = phase;
        self.off[channel_index as usize] = duty;
        Ok(())
    }

    /// Commit both terminals in a single write of all channels.
    ///
    /// The shadow is only updated once the bus write succeeded.
    fn set_terminal_pair(
        &mut self,
        pair: TerminalPair,
        forward_duty: u16,
        backward_duty: u16,
    ) -> Result<(), Self::Error> {
        channel::<E>(pair.forward)?;
        channel::<E>(pair.backward)?;
        let mut on = self.on;
        let mut off = self.off;
        on[pair.forward as usize] = PHASE;
        off[pair.forward as usize] = check_duty::<E>(forward_duty)?;
        on[pair.backward as usize] = PHASE;
        off[pair.backward as usize] = check_duty::<E>(backward_duty)?;

        let pca = self.pwm.as_mut().ok_or(Pca9685Error::PwmNotInitialized)?;
        pca.set_all_on_off(&on, &off)
            .map_err(Pca9685Error::PwmError)?;
        self.on = on;
        self.off = off;
        Ok(())
    }
}
