// Copyright (c) 2026 The mcpdigipot Developers
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
// THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Wiper control for MCP45xx, MCP46xx and MCP44xx digital potentiometers.
//!
//! [`DigitalPotentiometer`] manages a single channel of a chip. It caches the
//! volatile wiper position, clamps values to the range supported by the
//! [`DeviceVariant`], and decides whether a change is sent as a burst of
//! increment/decrement commands or as a full write.
//!
//! [`Controller`] offers register-level access for everything the manager
//! doesn't cover.
//!
//! ## Volatile and non-volatile wipers
//!
//! Every channel has a volatile wiper register, which determines the actual
//! wiper position. Devices with EEPROM also have a non-volatile wiper
//! register, which is copied into the volatile register at power-up.
//! [`NonVolatileMode`] selects which of the two registers
//! [`set_current_value`] writes to.
//!
//! Increment and decrement commands only exist for the volatile wiper, so
//! [`increase`] and [`decrease`] are limited to
//! [`NonVolatileMode::VolatileOnly`].
//!
//! ## Example
//!
//! ```no_run
//! use mcpdigipot::i2c::I2c;
//! use mcpdigipot::potentiometer::variant::MCP4641;
//! use mcpdigipot::potentiometer::{Channel, DigitalPotentiometer, NonVolatileMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let i2c = I2c::with_address(1, MCP4641.address(false, false, false))?;
//! let mut pot =
//!     DigitalPotentiometer::new(i2c, &MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 0)?;
//!
//! pot.set_current_value(64)?;
//! pot.increase_by(3)?;
//! assert_eq!(pot.current_value(), 67);
//! # Ok(())
//! # }
//! ```
//!
//! [`DigitalPotentiometer`]: struct.DigitalPotentiometer.html
//! [`DeviceVariant`]: variant/struct.DeviceVariant.html
//! [`Controller`]: struct.Controller.html
//! [`NonVolatileMode`]: enum.NonVolatileMode.html
//! [`NonVolatileMode::VolatileOnly`]: enum.NonVolatileMode.html#variant.VolatileOnly
//! [`set_current_value`]: struct.DigitalPotentiometer.html#method.set_current_value
//! [`increase`]: struct.DigitalPotentiometer.html#method.increase
//! [`decrease`]: struct.DigitalPotentiometer.html#method.decrease

use std::error;
use std::fmt;
use std::io;
use std::result;

use log::debug;

mod channel;
mod controller;
#[cfg(test)]
pub(crate) mod mock;
mod status;
mod transport;
pub mod variant;

pub use self::channel::{Channel, ChannelDescriptor};
pub use self::controller::Controller;
pub use self::status::{ChannelStatus, DeviceStatus, TerminalConfiguration};
pub use self::transport::Transport;
pub use self::variant::{Address, DeviceVariant, Model};

// Above this many steps, a single write is cheaper than a burst
const MAX_BURST_STEPS: u32 = 5;

/// Errors that can occur when controlling a potentiometer.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    ///
    /// Returned by the underlying [`Transport`]. Transactions are never
    /// retried.
    ///
    /// [`Transport`]: trait.Transport.html
    Io(io::Error),
    /// Channel not supported by the device variant.
    UnsupportedChannel(Channel),
    /// Terminal configuration belongs to a different channel.
    ChannelMismatch { expected: Channel, actual: Channel },
    /// Register address doesn't fit in the command byte.
    InvalidAddress(u8),
    /// Value doesn't fit in a 9-bit register.
    ValueOutOfRange(u16),
    /// Increment/decrement burst longer than a full wiper sweep.
    StepsOutOfRange(i32),
    /// Read returned an unexpected number of bytes.
    UnexpectedByteCount { expected: usize, actual: usize },
    /// STATUS register contains unexpected reserved bits.
    InvalidStatus(u16),
    /// Operation requires `NonVolatileMode::VolatileOnly`.
    VolatileOnly,
    /// Device variant doesn't have a non-volatile wiper.
    NonVolatileNotSupported,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "I/O error: {}", err),
            Error::UnsupportedChannel(channel) => {
                write!(f, "Channel {} not supported by device", channel)
            }
            Error::ChannelMismatch { expected, actual } => write!(
                f,
                "Terminal configuration for channel {} applied to channel {}",
                actual, expected
            ),
            Error::InvalidAddress(address) => write!(f, "Invalid register address: {:#04x}", address),
            Error::ValueOutOfRange(value) => write!(f, "Value out of range: {}", value),
            Error::StepsOutOfRange(steps) => write!(f, "Step count out of range: {}", steps),
            Error::UnexpectedByteCount { expected, actual } => write!(
                f,
                "Unexpected byte count: expected {}, received {}",
                expected, actual
            ),
            Error::InvalidStatus(value) => write!(f, "Invalid STATUS register: {:#011b}", value),
            Error::VolatileOnly => write!(f, "Operation only supported for volatile wipers"),
            Error::NonVolatileNotSupported => write!(f, "Non-volatile wiper not supported"),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// Result type returned from methods that can have `potentiometer::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// Wiper registers targeted by [`set_current_value`].
///
/// [`set_current_value`]: struct.DigitalPotentiometer.html#method.set_current_value
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum NonVolatileMode {
    /// Write the volatile wiper only.
    VolatileOnly,
    /// Write the non-volatile wiper only. The actual wiper position, and the
    /// cached value, stay unchanged until the next power cycle.
    NonVolatileOnly,
    /// Write both the volatile and the non-volatile wiper.
    VolatileAndNonVolatile,
}

impl fmt::Display for NonVolatileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NonVolatileMode::VolatileOnly => write!(f, "volatile only"),
            NonVolatileMode::NonVolatileOnly => write!(f, "non-volatile only"),
            NonVolatileMode::VolatileAndNonVolatile => write!(f, "volatile and non-volatile"),
        }
    }
}

/// Manages a single channel of a digital potentiometer.
///
/// `DigitalPotentiometer` caches the position of the volatile wiper, so
/// [`current_value`] never touches the bus. The cache is updated after every
/// successful write to the volatile wiper. When a transaction fails, the cache
/// keeps its previous value.
///
/// A chip with multiple channels is controlled through multiple
/// `DigitalPotentiometer` instances. Put the bus in a `RefCell`, and give each
/// instance a shared reference to it, since [`Transport`] is implemented for
/// `&RefCell<T>`. Constructing a new instance for a channel reinitializes it,
/// which overwrites the wiper on devices without EEPROM, so keep the instances
/// around instead of recreating them.
///
/// ```no_run
/// use std::cell::RefCell;
///
/// use mcpdigipot::i2c::I2c;
/// use mcpdigipot::potentiometer::variant::MCP4651;
/// use mcpdigipot::potentiometer::{Channel, DigitalPotentiometer, NonVolatileMode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = RefCell::new(I2c::with_address(1, MCP4651.address(false, false, false))?);
///
/// let mut pot_a =
///     DigitalPotentiometer::new(&bus, &MCP4651, Channel::A, NonVolatileMode::VolatileOnly, 64)?;
/// let mut pot_b =
///     DigitalPotentiometer::new(&bus, &MCP4651, Channel::B, NonVolatileMode::VolatileOnly, 192)?;
///
/// pot_a.increase()?;
/// pot_b.decrease()?;
/// # Ok(())
/// # }
/// ```
///
/// [`current_value`]: #method.current_value
/// [`Transport`]: trait.Transport.html
#[derive(Debug)]
pub struct DigitalPotentiometer<T: Transport> {
    controller: Controller<T>,
    variant: DeviceVariant,
    channel: Channel,
    mode: NonVolatileMode,
    current_value: u16,
}

impl<T: Transport> DigitalPotentiometer<T> {
    /// Constructs a new `DigitalPotentiometer` for `channel` of a chip of the
    /// specified `variant`.
    ///
    /// On devices with a non-volatile wiper, the volatile wiper already holds
    /// the value loaded from EEPROM at power-up, so it's read into the cache,
    /// and `initial_value` is ignored. On all other devices, `initial_value` is
    /// clamped and written to the volatile wiper.
    ///
    /// Returns `Err(`[`Error::UnsupportedChannel`]`)` if the variant doesn't
    /// have `channel`, and `Err(`[`Error::NonVolatileNotSupported`]`)` if
    /// `mode` requires a non-volatile wiper the variant doesn't have.
    ///
    /// [`Error::UnsupportedChannel`]: enum.Error.html#variant.UnsupportedChannel
    /// [`Error::NonVolatileNotSupported`]: enum.Error.html#variant.NonVolatileNotSupported
    pub fn new(
        transport: T,
        variant: &DeviceVariant,
        channel: Channel,
        mode: NonVolatileMode,
        initial_value: i32,
    ) -> Result<DigitalPotentiometer<T>> {
        variant.check_channel(channel)?;
        check_mode(variant, mode)?;

        let mut pot = DigitalPotentiometer {
            controller: Controller::new(transport),
            variant: *variant,
            channel,
            mode,
            current_value: 0,
        };

        if variant.is_capable_of_non_volatile_wiper() {
            pot.update_cache_from_device()?;
        } else {
            let value = pot.clamp(initial_value);
            pot.controller.set_value(channel, value, false)?;
            pot.current_value = value;
        }

        debug!(
            "{} channel {} initialized at {} ({})",
            pot.variant.model(),
            channel,
            pot.current_value,
            mode
        );

        Ok(pot)
    }

    /// Returns the cached position of the volatile wiper.
    pub fn current_value(&self) -> u16 {
        self.current_value
    }

    /// Reads the volatile wiper, and updates the cache.
    ///
    /// Values above [`max_value`] are clamped.
    ///
    /// [`max_value`]: #method.max_value
    pub fn update_cache_from_device(&mut self) -> Result<u16> {
        let value = self.controller.value(self.channel, false)?;

        self.current_value = value.min(self.variant.max_value());

        Ok(self.current_value)
    }

    /// Moves the wiper to `value`, clamped to `0..=max_value`.
    ///
    /// The targeted registers depend on the current [`NonVolatileMode`].
    /// With [`NonVolatileOnly`], the cache isn't updated, because the actual
    /// wiper position doesn't change.
    ///
    /// [`NonVolatileMode`]: enum.NonVolatileMode.html
    /// [`NonVolatileOnly`]: enum.NonVolatileMode.html#variant.NonVolatileOnly
    pub fn set_current_value(&mut self, value: i32) -> Result<()> {
        let value = self.clamp(value);

        match self.mode {
            NonVolatileMode::VolatileOnly => {
                self.controller.set_value(self.channel, value, false)?;
                self.current_value = value;
            }
            NonVolatileMode::NonVolatileOnly => {
                self.controller.set_value(self.channel, value, true)?;
            }
            NonVolatileMode::VolatileAndNonVolatile => {
                self.controller.set_value(self.channel, value, false)?;
                self.controller.set_value(self.channel, value, true)?;
                self.current_value = value;
            }
        }

        Ok(())
    }

    /// Moves the wiper up by a single step.
    pub fn increase(&mut self) -> Result<()> {
        self.increase_by(1)
    }

    /// Moves the wiper up by `steps`, stopping at [`max_value`].
    ///
    /// Small changes are sent as a burst of increment commands. Changes of
    /// more than 5 steps, or changes that end at `max_value`, are sent as a
    /// single write, which also resynchronizes the wiper with the cache.
    ///
    /// Returns `Err(`[`Error::VolatileOnly`]`)` unless the mode is
    /// `NonVolatileMode::VolatileOnly`.
    ///
    /// [`max_value`]: #method.max_value
    /// [`Error::VolatileOnly`]: enum.Error.html#variant.VolatileOnly
    pub fn increase_by(&mut self, steps: u32) -> Result<()> {
        self.step(steps, true)
    }

    /// Moves the wiper down by a single step.
    pub fn decrease(&mut self) -> Result<()> {
        self.decrease_by(1)
    }

    /// Moves the wiper down by `steps`, stopping at 0.
    ///
    /// Uses the same strategy as [`increase_by`].
    ///
    /// [`increase_by`]: #method.increase_by
    pub fn decrease_by(&mut self, steps: u32) -> Result<()> {
        self.step(steps, false)
    }

    fn step(&mut self, steps: u32, increase: bool) -> Result<()> {
        if self.mode != NonVolatileMode::VolatileOnly {
            return Err(Error::VolatileOnly);
        }

        let max_value = self.variant.max_value();
        let (boundary, distance) = if increase {
            (max_value, max_value - self.current_value)
        } else {
            (0, self.current_value)
        };

        if steps == 0 || distance == 0 {
            return Ok(());
        }

        // distance is at most 256, so the result always fits
        let actual_steps = steps.min(u32::from(distance)) as u16;
        let new_value = if increase {
            self.current_value + actual_steps
        } else {
            self.current_value - actual_steps
        };

        if new_value == boundary || steps > MAX_BURST_STEPS {
            debug!(
                "Channel {}: writing {} instead of stepping {} times",
                self.channel, new_value, steps
            );

            return self.set_current_value(i32::from(new_value));
        }

        debug!(
            "Channel {}: stepping {} times to {}",
            self.channel, actual_steps, new_value
        );

        if increase {
            self.controller.increase(self.channel, i32::from(actual_steps))?;
        } else {
            self.controller.decrease(self.channel, i32::from(actual_steps))?;
        }

        // The device doesn't acknowledge individual steps
        self.current_value = new_value;

        Ok(())
    }

    /// Reads the non-volatile wiper.
    ///
    /// Returns `Err(`[`Error::NonVolatileNotSupported`]`)` on devices without
    /// EEPROM.
    ///
    /// [`Error::NonVolatileNotSupported`]: enum.Error.html#variant.NonVolatileNotSupported
    pub fn non_volatile_value(&mut self) -> Result<u16> {
        self.check_non_volatile()?;

        self.controller.value(self.channel, true)
    }

    /// Reads the STATUS register.
    ///
    /// The wiper lock flag in the returned [`ChannelStatus`] refers to this
    /// potentiometer's channel.
    ///
    /// [`ChannelStatus`]: struct.ChannelStatus.html
    pub fn device_status(&mut self) -> Result<ChannelStatus> {
        let status = self.controller.device_status()?;

        Ok(ChannelStatus::new(status, self.channel))
    }

    /// Reads the terminal configuration of this channel.
    pub fn terminal_configuration(&mut self) -> Result<TerminalConfiguration> {
        self.controller.terminal_configuration(self.channel)
    }

    /// Changes the terminal configuration of this channel.
    ///
    /// Returns `Err(`[`Error::ChannelMismatch`]`)` if `config` belongs to a
    /// different channel.
    ///
    /// [`Error::ChannelMismatch`]: enum.Error.html#variant.ChannelMismatch
    pub fn set_terminal_configuration(&mut self, config: &TerminalConfiguration) -> Result<()> {
        if config.channel() != self.channel {
            return Err(Error::ChannelMismatch {
                expected: self.channel,
                actual: config.channel(),
            });
        }

        self.controller.set_terminal_configuration(config)
    }

    /// Enables or disables the wiper lock of this channel.
    ///
    /// Requires the HVC/A0 pin to be held at the high-voltage level.
    pub fn set_wiper_lock(&mut self, locked: bool) -> Result<()> {
        self.check_non_volatile()?;

        self.controller.set_wiper_lock(self.channel, locked)
    }

    /// Enables or disables EEPROM write protection.
    ///
    /// Write protection covers the whole device, not just this channel.
    /// Requires the HVC/A0 pin to be held at the high-voltage level.
    pub fn set_write_protection(&mut self, enabled: bool) -> Result<()> {
        self.check_non_volatile()?;

        self.controller.set_write_protection(enabled)
    }

    /// Returns the channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the current non-volatile mode.
    pub fn non_volatile_mode(&self) -> NonVolatileMode {
        self.mode
    }

    /// Changes the non-volatile mode.
    ///
    /// Returns `Err(`[`Error::NonVolatileNotSupported`]`)` if `mode` requires a
    /// non-volatile wiper the device doesn't have.
    ///
    /// [`Error::NonVolatileNotSupported`]: enum.Error.html#variant.NonVolatileNotSupported
    pub fn set_non_volatile_mode(&mut self, mode: NonVolatileMode) -> Result<()> {
        check_mode(&self.variant, mode)?;

        self.mode = mode;

        Ok(())
    }

    /// Returns the highest wiper position.
    pub fn max_value(&self) -> u16 {
        self.variant.max_value()
    }

    /// Returns `true` if the device is a rheostat.
    pub fn is_rheostat(&self) -> bool {
        self.variant.is_rheostat()
    }

    /// Returns the device variant.
    pub fn variant(&self) -> &DeviceVariant {
        &self.variant
    }

    /// Returns `true` if the device has `channel`.
    pub fn is_channel_supported(&self, channel: Channel) -> bool {
        self.variant.is_channel_supported(channel)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        self.controller.transport()
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        self.controller.transport_mut()
    }

    /// Consumes the `DigitalPotentiometer`, returning the underlying transport.
    ///
    /// The device keeps its current state.
    pub fn into_inner(self) -> T {
        self.controller.into_inner()
    }

    fn clamp(&self, value: i32) -> u16 {
        value.max(0).min(i32::from(self.variant.max_value())) as u16
    }

    fn check_non_volatile(&self) -> Result<()> {
        if !self.variant.is_capable_of_non_volatile_wiper() {
            return Err(Error::NonVolatileNotSupported);
        }

        Ok(())
    }
}

fn check_mode(variant: &DeviceVariant, mode: NonVolatileMode) -> Result<()> {
    if mode != NonVolatileMode::VolatileOnly && !variant.is_capable_of_non_volatile_wiper() {
        return Err(Error::NonVolatileNotSupported);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::channel::MEMADDR_STATUS;
    use super::mock::{SimulatedChip, Transaction};
    use super::variant::{MCP4461, MCP4532, MCP4641, MCP4651};
    use super::*;

    use std::cell::RefCell;

    use proptest::prelude::*;

    fn pot_with_value(
        variant: &DeviceVariant,
        channel: Channel,
        mode: NonVolatileMode,
        value: u16,
    ) -> (DigitalPotentiometer<SimulatedChip>, SimulatedChip) {
        let chip = SimulatedChip::new(variant);
        chip.set_register(channel.descriptor().volatile_address(), value);

        let pot = DigitalPotentiometer::new(chip.clone(), variant, channel, mode, 0).unwrap();
        chip.clear_transactions();

        (pot, chip)
    }

    #[test]
    fn new_reads_volatile_wiper_on_capable_device() {
        let chip = SimulatedChip::new(&MCP4641);
        chip.set_register(0x01, 77);

        let pot = DigitalPotentiometer::new(
            chip.clone(),
            &MCP4641,
            Channel::B,
            NonVolatileMode::VolatileOnly,
            10,
        )
        .unwrap();

        assert_eq!(pot.current_value(), 77);
        assert_eq!(chip.transactions(), vec![Transaction::WriteRead(vec![0x1C], 2)]);
    }

    #[test]
    fn new_writes_clamped_initial_value_on_incapable_device() {
        let chip = SimulatedChip::new(&MCP4532);

        let pot = DigitalPotentiometer::new(
            chip.clone(),
            &MCP4532,
            Channel::A,
            NonVolatileMode::VolatileOnly,
            300,
        )
        .unwrap();

        assert_eq!(pot.current_value(), 128);
        assert_eq!(chip.register(0x00), 128);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x00, 0x80])]);
    }

    #[test]
    fn new_rejects_unsupported_channel() {
        let chip = SimulatedChip::new(&MCP4651);

        let result =
            DigitalPotentiometer::new(chip.clone(), &MCP4651, Channel::C, NonVolatileMode::VolatileOnly, 0);

        assert!(matches!(result, Err(Error::UnsupportedChannel(Channel::C))));
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn new_rejects_non_volatile_mode_on_incapable_device() {
        let chip = SimulatedChip::new(&MCP4532);

        let result = DigitalPotentiometer::new(
            chip.clone(),
            &MCP4532,
            Channel::A,
            NonVolatileMode::VolatileAndNonVolatile,
            0,
        );

        assert!(matches!(result, Err(Error::NonVolatileNotSupported)));
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn new_clamps_out_of_range_register() {
        let (pot, _) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 0x1FF);

        assert_eq!(pot.current_value(), 128);
    }

    #[test]
    fn set_current_value_clamps() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 10);

        pot.set_current_value(-5).unwrap();
        assert_eq!(pot.current_value(), 0);
        assert_eq!(chip.register(0x00), 0);

        pot.set_current_value(1000).unwrap();
        assert_eq!(pot.current_value(), 128);
        assert_eq!(chip.register(0x00), 128);
    }

    #[test]
    fn set_current_value_volatile_only() {
        let (mut pot, chip) = pot_with_value(&MCP4461, Channel::C, NonVolatileMode::VolatileOnly, 0);

        pot.set_current_value(256).unwrap();

        assert_eq!(pot.current_value(), 256);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x61, 0x00])]);
        assert_eq!(chip.register(0x08), 0);
    }

    #[test]
    fn set_current_value_non_volatile_only_leaves_cache() {
        let (mut pot, chip) =
            pot_with_value(&MCP4641, Channel::A, NonVolatileMode::NonVolatileOnly, 20);

        pot.set_current_value(100).unwrap();

        assert_eq!(pot.current_value(), 20);
        assert_eq!(chip.register(0x00), 20);
        assert_eq!(chip.register(0x02), 100);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x20, 100])]);
    }

    #[test]
    fn set_current_value_writes_both_wipers() {
        let (mut pot, chip) =
            pot_with_value(&MCP4641, Channel::B, NonVolatileMode::VolatileAndNonVolatile, 0);

        pot.set_current_value(42).unwrap();

        assert_eq!(pot.current_value(), 42);
        assert_eq!(
            chip.transactions(),
            vec![
                Transaction::Write(vec![0x10, 42]),
                Transaction::Write(vec![0x30, 42]),
            ]
        );
    }

    #[test]
    fn partial_write_failure_keeps_cache() {
        let (mut pot, chip) =
            pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileAndNonVolatile, 30);
        chip.fail_after(1);

        assert!(matches!(pot.set_current_value(90), Err(Error::Io(_))));
        assert_eq!(pot.current_value(), 30);
        assert_eq!(chip.register(0x00), 90);
    }

    #[test]
    fn failed_write_keeps_cache() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 30);
        chip.fail_after(0);

        match pot.set_current_value(60) {
            Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::TimedOut),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(pot.current_value(), 30);
        assert!(matches!(pot.increase_by(2), Err(Error::Io(_))));
        assert_eq!(pot.current_value(), 30);
    }

    #[test]
    fn large_increase_uses_full_write() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 0);

        pot.increase_by(200).unwrap();

        assert_eq!(pot.current_value(), 128);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x00, 0x80])]);
    }

    #[test]
    fn small_increase_uses_burst() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 50);

        pot.increase_by(3).unwrap();

        assert_eq!(pot.current_value(), 53);
        assert_eq!(chip.register(0x00), 53);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x04; 3])]);
    }

    #[test]
    fn small_decrease_uses_burst() {
        let (mut pot, chip) = pot_with_value(&MCP4461, Channel::D, NonVolatileMode::VolatileOnly, 100);

        pot.decrease().unwrap();
        pot.decrease_by(5).unwrap();

        assert_eq!(pot.current_value(), 94);
        assert_eq!(chip.register(0x07), 94);
        assert_eq!(
            chip.transactions(),
            vec![
                Transaction::Write(vec![0x78]),
                Transaction::Write(vec![0x78; 5]),
            ]
        );
    }

    #[test]
    fn decrease_to_zero_uses_full_write() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 3);

        pot.decrease_by(3).unwrap();

        assert_eq!(pot.current_value(), 0);
        assert_eq!(chip.transactions(), vec![Transaction::Write(vec![0x00, 0x00])]);
    }

    #[test]
    fn step_at_boundary_is_a_no_op() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 128);

        pot.increase().unwrap();
        pot.increase_by(10).unwrap();
        pot.set_current_value(0).unwrap();
        chip.clear_transactions();
        pot.decrease_by(4).unwrap();

        assert_eq!(pot.current_value(), 0);
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn zero_steps_is_a_no_op() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 64);

        pot.increase_by(0).unwrap();
        pot.decrease_by(0).unwrap();

        assert_eq!(pot.current_value(), 64);
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn step_requires_volatile_only() {
        let (mut pot, chip) =
            pot_with_value(&MCP4641, Channel::A, NonVolatileMode::NonVolatileOnly, 64);

        assert!(matches!(pot.increase(), Err(Error::VolatileOnly)));
        assert!(matches!(pot.decrease_by(0), Err(Error::VolatileOnly)));
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn update_cache_from_device_reads_volatile_wiper() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::B, NonVolatileMode::VolatileOnly, 5);
        chip.set_register(0x01, 99);

        assert_eq!(pot.current_value(), 5);
        assert_eq!(pot.update_cache_from_device().unwrap(), 99);
        assert_eq!(pot.current_value(), 99);
    }

    #[test]
    fn non_volatile_value_requires_capable_device() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::B, NonVolatileMode::VolatileOnly, 5);
        chip.set_register(0x03, 120);
        assert_eq!(pot.non_volatile_value().unwrap(), 120);

        let (mut pot, chip) = pot_with_value(&MCP4651, Channel::B, NonVolatileMode::VolatileOnly, 5);
        assert!(matches!(pot.non_volatile_value(), Err(Error::NonVolatileNotSupported)));
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn set_non_volatile_mode_checks_capability() {
        let (mut pot, _) = pot_with_value(&MCP4532, Channel::A, NonVolatileMode::VolatileOnly, 0);

        assert!(matches!(
            pot.set_non_volatile_mode(NonVolatileMode::NonVolatileOnly),
            Err(Error::NonVolatileNotSupported)
        ));
        pot.set_non_volatile_mode(NonVolatileMode::VolatileOnly).unwrap();
        assert_eq!(pot.non_volatile_mode(), NonVolatileMode::VolatileOnly);

        let (mut pot, _) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 0);
        pot.set_non_volatile_mode(NonVolatileMode::VolatileAndNonVolatile)
            .unwrap();
        assert_eq!(pot.non_volatile_mode(), NonVolatileMode::VolatileAndNonVolatile);
    }

    #[test]
    fn device_status_reports_own_lock() {
        let (mut pot, chip) = pot_with_value(&MCP4461, Channel::D, NonVolatileMode::VolatileOnly, 0);

        pot.set_wiper_lock(true).unwrap();
        let status = pot.device_status().unwrap();

        assert_eq!(status.channel(), Channel::D);
        assert!(status.is_wiper_lock_active());
        assert!(!status.is_eeprom_write_protected());
        assert_eq!(pot.current_value(), 0);

        pot.set_write_protection(true).unwrap();
        pot.set_wiper_lock(false).unwrap();
        let status = pot.device_status().unwrap();

        assert!(!status.is_wiper_lock_active());
        assert!(status.is_eeprom_write_protected());
        assert_eq!(chip.register(MEMADDR_STATUS), 0b1_1111_0001);
    }

    #[test]
    fn lock_and_protection_require_capable_device() {
        let (mut pot, chip) = pot_with_value(&MCP4651, Channel::A, NonVolatileMode::VolatileOnly, 0);

        assert!(matches!(pot.set_wiper_lock(true), Err(Error::NonVolatileNotSupported)));
        assert!(matches!(
            pot.set_write_protection(true),
            Err(Error::NonVolatileNotSupported)
        ));
        assert!(chip.transactions().is_empty());
    }

    #[test]
    fn terminal_configuration_is_scoped_to_channel() {
        let (mut pot, chip) = pot_with_value(&MCP4641, Channel::B, NonVolatileMode::VolatileOnly, 0);

        let config = TerminalConfiguration::new(Channel::B, true, false, true, true);
        pot.set_terminal_configuration(&config).unwrap();

        assert_eq!(pot.terminal_configuration().unwrap(), config);
        assert_eq!(chip.register(0x04), 0x1BF);

        let other = TerminalConfiguration::new(Channel::A, true, true, true, true);
        assert!(matches!(
            pot.set_terminal_configuration(&other),
            Err(Error::ChannelMismatch {
                expected: Channel::B,
                actual: Channel::A,
            })
        ));
    }

    #[test]
    fn channels_share_a_bus() {
        let chip = SimulatedChip::new(&MCP4461);
        let mut bus = chip.clone();

        {
            let mut a =
                DigitalPotentiometer::new(&mut bus, &MCP4461, Channel::A, NonVolatileMode::VolatileOnly, 0)
                    .unwrap();
            a.set_current_value(10).unwrap();
        }

        let mut c =
            DigitalPotentiometer::new(&mut bus, &MCP4461, Channel::C, NonVolatileMode::VolatileOnly, 0)
                .unwrap();
        c.set_current_value(20).unwrap();

        assert_eq!(chip.register(0x00), 10);
        assert_eq!(chip.register(0x06), 20);
    }

    #[test]
    fn live_channels_keep_their_wipers() {
        let chip = SimulatedChip::new(&MCP4651);
        let bus = RefCell::new(chip.clone());

        let mut a =
            DigitalPotentiometer::new(&bus, &MCP4651, Channel::A, NonVolatileMode::VolatileOnly, 0)
                .unwrap();
        a.set_current_value(100).unwrap();

        let mut b =
            DigitalPotentiometer::new(&bus, &MCP4651, Channel::B, NonVolatileMode::VolatileOnly, 0)
                .unwrap();
        b.set_current_value(20).unwrap();

        a.increase_by(2).unwrap();
        b.decrease().unwrap();

        assert_eq!(a.current_value(), 102);
        assert_eq!(b.current_value(), 19);
        assert_eq!(chip.register(0x00), 102);
        assert_eq!(chip.register(0x01), 19);
    }

    #[test]
    fn accessors_reflect_variant() {
        let (pot, _) = pot_with_value(&MCP4532, Channel::A, NonVolatileMode::VolatileOnly, 0);

        assert_eq!(pot.channel(), Channel::A);
        assert_eq!(pot.max_value(), 128);
        assert!(pot.is_rheostat());
        assert!(pot.is_channel_supported(Channel::A));
        assert!(!pot.is_channel_supported(Channel::B));
        assert_eq!(pot.variant(), &MCP4532);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::UnexpectedByteCount {
                expected: 2,
                actual: 1
            }
            .to_string(),
            "Unexpected byte count: expected 2, received 1"
        );
        assert_eq!(
            Error::UnsupportedChannel(Channel::D).to_string(),
            "Channel D not supported by device"
        );
    }

    proptest! {
        #[test]
        fn set_current_value_stores_clamped_value(value in any::<i32>()) {
            let (mut pot, chip) = pot_with_value(&MCP4461, Channel::A, NonVolatileMode::VolatileOnly, 0);

            pot.set_current_value(value).unwrap();

            let expected = value.max(0).min(256) as u16;
            prop_assert_eq!(pot.current_value(), expected);
            prop_assert_eq!(chip.register(0x00), expected);
        }

        #[test]
        fn increases_compose(start in 0u16..=128, a in 0u32..200, b in 0u32..200) {
            let (mut split, _) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, start);
            let (mut joined, _) = pot_with_value(&MCP4641, Channel::A, NonVolatileMode::VolatileOnly, start);

            split.increase_by(a).unwrap();
            split.increase_by(b).unwrap();
            joined.increase_by(a + b).unwrap();

            prop_assert_eq!(split.current_value(), joined.current_value());
            prop_assert_eq!(split.current_value(), (u32::from(start) + a + b).min(128) as u16);
        }

        #[test]
        fn cache_tracks_device(start in 0u16..=256, moves in proptest::collection::vec((any::<bool>(), 0u32..20), 1..20)) {
            let (mut pot, chip) = pot_with_value(&MCP4461, Channel::B, NonVolatileMode::VolatileOnly, start);

            for (up, steps) in moves {
                if up {
                    pot.increase_by(steps).unwrap();
                } else {
                    pot.decrease_by(steps).unwrap();
                }
                prop_assert_eq!(pot.current_value(), chip.register(0x01));
            }
        }
    }
}
