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

use log::{trace, warn};

use super::channel::{MEMADDR_STATUS, MEMADDR_WRITE_PROTECTION};
use super::{Channel, DeviceStatus, Error, Result, TerminalConfiguration, Transport};

// Command bits (datasheet 7.3)
const CMD_WRITE: u8 = 0b00 << 2;
const CMD_INCREASE: u8 = 0b01 << 2;
const CMD_DECREASE: u8 = 0b10 << 2;
const CMD_READ: u8 = 0b11 << 2;

// Registers are 9 bits wide. Bit 8 travels in the command byte.
const REGISTER_MAX: u16 = 0x1FF;
const ADDRESS_MAX: u8 = 0x0F;

const READ_LENGTH: usize = 2;

// A full sweep of an 8-bit wiper. Longer bursts can't move the wiper any further.
const BURST_MAX: u32 = 256;

/// Register-level access to an MCP45xx/MCP46xx/MCP44xx device.
///
/// `Controller` translates register operations into the device's command
/// bytes, and decodes its responses. It doesn't keep any state besides the
/// transport, and never clamps values. [`DigitalPotentiometer`] builds on top
/// of it.
///
/// [`DigitalPotentiometer`]: struct.DigitalPotentiometer.html
#[derive(Debug)]
pub struct Controller<T: Transport> {
    transport: T,
}

impl<T: Transport> Controller<T> {
    /// Constructs a new `Controller` communicating through `transport`.
    pub fn new(transport: T) -> Controller<T> {
        Controller { transport }
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the `Controller`, returning the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Reads and decodes the STATUS register.
    pub fn device_status(&mut self) -> Result<DeviceStatus> {
        let value = self.read(MEMADDR_STATUS)?;

        DeviceStatus::from_register(value).map_err(|err| {
            warn!("Unexpected STATUS register contents: {:#011b}", value);
            err
        })
    }

    /// Increments the volatile wiper of `channel` by `steps`.
    ///
    /// A negative `steps` decrements instead.
    pub fn increase(&mut self, channel: Channel, steps: i32) -> Result<()> {
        // Increments only work on the volatile wiper
        let address = channel.descriptor().volatile_address();

        self.increase_or_decrease(address, true, steps)
    }

    /// Decrements the volatile wiper of `channel` by `steps`.
    ///
    /// A negative `steps` increments instead.
    pub fn decrease(&mut self, channel: Channel, steps: i32) -> Result<()> {
        let address = channel.descriptor().volatile_address();

        self.increase_or_decrease(address, false, steps)
    }

    /// Reads the volatile or non-volatile wiper of `channel`.
    pub fn value(&mut self, channel: Channel, non_volatile: bool) -> Result<u16> {
        self.read(channel.descriptor().wiper_address(non_volatile))
    }

    /// Writes `value` to the volatile or non-volatile wiper of `channel`.
    pub fn set_value(&mut self, channel: Channel, value: u16, non_volatile: bool) -> Result<()> {
        self.write(channel.descriptor().wiper_address(non_volatile), value)
    }

    /// Reads the terminal configuration of `channel`.
    pub fn terminal_configuration(&mut self, channel: Channel) -> Result<TerminalConfiguration> {
        let tcon = self.read(channel.descriptor().terminal_control_address())?;

        Ok(TerminalConfiguration::from_register(channel, tcon))
    }

    /// Writes `config` to its channel's terminal control register.
    ///
    /// The register is shared with the sibling channel, so it's read first, and
    /// only the four bits that belong to the configuration's channel are changed.
    pub fn set_terminal_configuration(&mut self, config: &TerminalConfiguration) -> Result<()> {
        let address = config.channel().descriptor().terminal_control_address();

        let tcon = self.read(address)?;

        self.write(address, config.apply(tcon))
    }

    /// Enables or disables the wiper lock of `channel`.
    ///
    /// Requires a high-voltage command (datasheet 5.3). Incrementing the
    /// non-volatile wiper address sets the lock, decrementing clears it.
    pub fn set_wiper_lock(&mut self, channel: Channel, locked: bool) -> Result<()> {
        let address = channel.descriptor().non_volatile_address();

        self.increase_or_decrease(address, locked, 1)
    }

    /// Enables or disables EEPROM write protection.
    ///
    /// Requires a high-voltage command (datasheet 5.3).
    pub fn set_write_protection(&mut self, enabled: bool) -> Result<()> {
        self.increase_or_decrease(MEMADDR_WRITE_PROTECTION, enabled, 1)
    }

    /// Reads the 9-bit register at `address`.
    ///
    /// Sends a READ command, and expects two bytes in return. The first byte
    /// holds bit 8, the second one bits 0 through 7.
    pub fn read(&mut self, address: u8) -> Result<u16> {
        let command = [command(address, CMD_READ)?];
        let mut buffer = [0u8; READ_LENGTH];

        let read = self.transport.write_read(&command, &mut buffer)?;
        if read != READ_LENGTH {
            return Err(Error::UnexpectedByteCount {
                expected: READ_LENGTH,
                actual: read,
            });
        }

        let value = (u16::from(buffer[0]) << 8) | u16::from(buffer[1]);

        trace!("read {:#04x} -> {:#05x}", address, value);

        Ok(value)
    }

    /// Writes the 9-bit `value` to the register at `address`.
    pub fn write(&mut self, address: u8, value: u16) -> Result<()> {
        if value > REGISTER_MAX {
            return Err(Error::ValueOutOfRange(value));
        }

        let bit8 = ((value >> 8) & 0x01) as u8;
        let sequence = [command(address, CMD_WRITE)? | bit8, (value & 0xFF) as u8];

        trace!("write {:#04x} <- {:#05x}", address, value);

        Ok(self.transport.write(&sequence)?)
    }

    /// Sends `steps` increment or decrement commands for `address` as a
    /// single burst.
    ///
    /// Zero steps doesn't touch the bus. Negative steps reverse the direction.
    /// Returns `Err(`[`Error::StepsOutOfRange`]`)` for bursts of more than 256
    /// steps.
    ///
    /// [`Error::StepsOutOfRange`]: enum.Error.html#variant.StepsOutOfRange
    pub fn increase_or_decrease(&mut self, address: u8, increase: bool, steps: i32) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }

        if steps.unsigned_abs() > BURST_MAX {
            return Err(Error::StepsOutOfRange(steps));
        }

        let increase = if steps < 0 { !increase } else { increase };
        let steps = steps.unsigned_abs() as usize;

        let command = command(address, if increase { CMD_INCREASE } else { CMD_DECREASE })?;

        trace!(
            "{} {:#04x} by {}",
            if increase { "increment" } else { "decrement" },
            address,
            steps
        );

        // Every command byte moves the wiper by one step
        Ok(self.transport.write(&vec![command; steps])?)
    }
}

fn command(address: u8, command: u8) -> Result<u8> {
    if address > ADDRESS_MAX {
        return Err(Error::InvalidAddress(address));
    }

    Ok((address << 4) | command)
}
