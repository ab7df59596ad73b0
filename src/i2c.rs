// Copyright (c) 2017-2019 Rene van der Meer
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

//! Linux `i2cdev` bus access for the potentiometer driver.
//!
//! [`I2c`] opens `/dev/i2c-N` and implements [`Transport`], which makes it
//! usable as the bus of a [`DigitalPotentiometer`].
//!
//! ## I2C buses
//!
//! On a Raspberry Pi, the I2C bus connected to physical pins 3 (SDA) and
//! 5 (SCL) is bus 1 on every model except the early model B Rev 1, which uses
//! bus 0. The bus is disabled by default. You can enable it through
//! `sudo raspi-config`, or by adding `dtparam=i2c_arm=on` to
//! `/boot/config.txt`. Remember to reboot afterwards.
//!
//! ## High-voltage commands
//!
//! Toggling wiper lock or EEPROM write protection requires the chip's
//! HVC/A0 pin to be held at the high-voltage level while the command is
//! sent. The `i2cdev` interface can't drive that pin, so external
//! circuitry has to take care of it. The bytes on the bus are identical to
//! regular increment and decrement commands.
//!
//! ## Troubleshooting
//!
//! ### Permission denied
//!
//! If [`with_bus`] returns an `io::ErrorKind::PermissionDenied`
//! error, make sure the file permissions for `/dev/i2c-1` or `/dev/i2c-0`
//! are correct, and the current user is a member of the `i2c` group.
//!
//! ### Timed out
//!
//! Transactions return an `io::ErrorKind::TimedOut` error when their duration
//! exceeds the timeout value. You can change the timeout using [`set_timeout`].
//!
//! [`I2c`]: struct.I2c.html
//! [`Transport`]: ../potentiometer/trait.Transport.html
//! [`DigitalPotentiometer`]: ../potentiometer/struct.DigitalPotentiometer.html
//! [`with_bus`]: struct.I2c.html#method.with_bus
//! [`set_timeout`]: struct.I2c.html#method.set_timeout

use std::error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::Write;
use std::marker::PhantomData;
use std::os::unix::io::AsRawFd;
use std::result;

use libc::c_ulong;

use crate::potentiometer::{Address, Transport};

mod ioctl;

pub use self::ioctl::Capabilities;

/// Errors that can occur when accessing the I2C bus.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(io::Error),
    /// Invalid slave address.
    ///
    /// Only 7-bit addresses outside of the reserved ranges are accepted.
    InvalidSlaveAddress(u16),
    /// I2C feature not supported.
    ///
    /// The underlying drivers don't support combined write/read transfers.
    FeatureNotSupported,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "I/O error: {}", err),
            Error::InvalidSlaveAddress(address) => write!(f, "Invalid slave address: {}", address),
            Error::FeatureNotSupported => write!(f, "I2C feature not supported"),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            Error::InvalidSlaveAddress(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            Error::FeatureNotSupported => io::Error::new(io::ErrorKind::Unsupported, err),
        }
    }
}

/// Result type returned from methods that can have `i2c::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// Provides access to an I2C bus through the Linux `i2cdev` interface.
///
/// A single `I2c` talks to one slave device at a time. Use
/// [`set_slave_address`] to select the potentiometer, or construct the
/// `I2c` with [`with_address`] directly.
///
/// [`set_slave_address`]: #method.set_slave_address
/// [`with_address`]: #method.with_address
#[derive(Debug)]
pub struct I2c {
    bus: u8,
    funcs: Capabilities,
    i2cdev: File,
    address: u16,
    // The not_sync field is a workaround to force !Sync. I2c isn't safe for
    // Sync because of ioctl() and the underlying drivers. This avoids needing
    // #![feature(optin_builtin_traits)] to manually add impl !Sync for I2c.
    not_sync: PhantomData<*const ()>,
}

impl I2c {
    /// Constructs a new `I2c` using the specified bus.
    ///
    /// `bus` selects `/dev/i2c-{bus}`. On a Raspberry Pi, physical pins 3
    /// (SDA) and 5 (SCL) are bus 1, except on the model B Rev 1 where they're
    /// tied to bus 0.
    pub fn with_bus(bus: u8) -> Result<I2c> {
        // bus is a u8, because any 8-bit bus ID could potentially
        // be configured for bit banging I2C using i2c-gpio.
        let i2cdev = OpenOptions::new()
            .read(true)
            .write(true)
            .open(format!("/dev/i2c-{}", bus))?;

        let capabilities = unsafe { ioctl::funcs(i2cdev.as_raw_fd())? };

        // 10-bit addresses aren't used by any of the supported chips
        if capabilities.addr_10bit() {
            unsafe {
                ioctl::set_addr_10bit(i2cdev.as_raw_fd(), 0)?;
            }
        }

        Ok(I2c {
            bus,
            funcs: capabilities,
            i2cdev,
            address: 0,
            not_sync: PhantomData,
        })
    }

    /// Constructs a new `I2c` using the specified bus, and selects the slave
    /// device at `address`.
    pub fn with_address(bus: u8, address: Address) -> Result<I2c> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(address.slave_address())?;

        Ok(i2c)
    }

    /// Returns information on the functionality supported by the underlying drivers.
    pub fn capabilities(&self) -> Capabilities {
        self.funcs
    }

    /// Returns the I2C bus ID.
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Returns the currently selected slave address.
    pub fn slave_address(&self) -> u16 {
        self.address
    }

    /// Sets a 7-bit slave address.
    ///
    /// `slave_address` shouldn't include the R/W bit.
    pub fn set_slave_address(&mut self, slave_address: u16) -> Result<()> {
        // Filter out reserved, invalid and unsupported addresses
        if slave_address < 8 || (slave_address >> 3) == 0b1111 || slave_address > 0x7F {
            return Err(Error::InvalidSlaveAddress(slave_address));
        }

        unsafe {
            ioctl::set_slave_address(self.i2cdev.as_raw_fd(), c_ulong::from(slave_address))?;
        }

        self.address = slave_address;

        Ok(())
    }

    /// Sets the maximum duration of a transaction in milliseconds (ms).
    ///
    /// Transactions that take longer than `timeout` return an
    /// `io::ErrorKind::TimedOut` error.
    ///
    /// `timeout` has a resolution of 10ms.
    pub fn set_timeout(&self, timeout: u32) -> Result<()> {
        // i2cdev expects the timeout in units of 10ms
        unsafe {
            ioctl::set_timeout(self.i2cdev.as_raw_fd(), (timeout / 10) as c_ulong)?;
        }

        Ok(())
    }

    /// Sends the outgoing data contained in `buffer` to the slave device.
    ///
    /// Sequence: START → Address + Write Bit → Outgoing Bytes → STOP
    ///
    /// Returns how many bytes were written.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        Ok(self.i2cdev.write(buffer)?)
    }

    /// Sends the outgoing data contained in `write_buffer` to the slave device, and
    /// then fills `read_buffer` with incoming data.
    ///
    /// No STOP condition is issued in between the write and read operation. A
    /// repeated START is sent instead.
    ///
    /// Sequence: START → Address + Write Bit → Outgoing Bytes → Repeated START →
    /// Address + Read Bit → Incoming Bytes → STOP
    ///
    /// Returns how many bytes were read.
    pub fn write_read(&self, write_buffer: &[u8], read_buffer: &mut [u8]) -> Result<usize> {
        if !self.funcs.i2c() {
            return Err(Error::FeatureNotSupported);
        }

        unsafe {
            ioctl::i2c_write_read(
                self.i2cdev.as_raw_fd(),
                self.address,
                write_buffer,
                read_buffer,
            )?;
        }

        Ok(read_buffer.len())
    }
}

impl Transport for I2c {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let written = I2c::write(self, bytes)?;
        if written != bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("wrote {} of {} bytes", written, bytes.len()),
            ));
        }

        Ok(())
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        Ok(I2c::write_read(self, bytes, buffer)?)
    }
}

// Send is safe for I2c, but we're marked !Send because of the dummy pointer that's
// needed to force !Sync.
unsafe impl Send for I2c {}
