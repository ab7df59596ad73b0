//! `embedded-hal` I2C buses as potentiometer transports.
//!
//! [`HalTransport`] wraps an `embedded-hal` v1 [`I2c`] bus, [`Hal0Transport`]
//! wraps an `embedded-hal` v0.2.7 blocking `Write` + `WriteRead` bus. Both
//! store the slave address, and implement [`Transport`].
//!
//! This module is only included when either the `hal`, `embedded-hal` or
//! `embedded-hal-0` feature flag is enabled.
//!
//! [`HalTransport`]: struct.HalTransport.html
//! [`Hal0Transport`]: struct.Hal0Transport.html
//! [`I2c`]: https://docs.rs/embedded-hal/1/embedded_hal/i2c/trait.I2c.html
//! [`Transport`]: ../potentiometer/trait.Transport.html

#[cfg(feature = "embedded-hal-0")]
use std::fmt;
use std::io;

#[cfg(feature = "embedded-hal")]
use embedded_hal::i2c::{self, I2c};

use crate::potentiometer::{Address, Transport};

/// `Transport` implementation for `embedded-hal` v1 I2C buses.
#[cfg(feature = "embedded-hal")]
#[derive(Debug)]
pub struct HalTransport<I2C> {
    i2c: I2C,
    address: u8,
}

#[cfg(feature = "embedded-hal")]
impl<I2C: I2c> HalTransport<I2C> {
    /// Constructs a new `HalTransport` talking to the slave device at
    /// `address`.
    pub fn new(i2c: I2C, address: Address) -> HalTransport<I2C> {
        HalTransport {
            i2c,
            address: address.slave_address() as u8,
        }
    }

    /// Consumes the `HalTransport`, returning the underlying bus.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

#[cfg(feature = "embedded-hal")]
impl<I2C: I2c> Transport for HalTransport<I2C> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.i2c.write(self.address, bytes).map_err(to_io_error)
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        self.i2c
            .write_read(self.address, bytes, buffer)
            .map_err(to_io_error)?;

        // embedded-hal transfers either fill the buffer or fail
        Ok(buffer.len())
    }
}

#[cfg(feature = "embedded-hal")]
fn to_io_error<E: i2c::Error>(err: E) -> io::Error {
    let kind = match err.kind() {
        i2c::ErrorKind::Bus | i2c::ErrorKind::Overrun => io::ErrorKind::InvalidData,
        i2c::ErrorKind::ArbitrationLoss => io::ErrorKind::WouldBlock,
        i2c::ErrorKind::NoAcknowledge(_) => io::ErrorKind::NotConnected,
        _ => io::ErrorKind::Other,
    };

    io::Error::new(kind, format!("I2C error: {:?}", err))
}

/// `Transport` implementation for `embedded-hal` v0.2.7 I2C buses.
#[cfg(feature = "embedded-hal-0")]
#[derive(Debug)]
pub struct Hal0Transport<I2C> {
    i2c: I2C,
    address: u8,
}

#[cfg(feature = "embedded-hal-0")]
impl<I2C, E> Hal0Transport<I2C>
where
    I2C: embedded_hal_0::blocking::i2c::Write<Error = E>
        + embedded_hal_0::blocking::i2c::WriteRead<Error = E>,
    E: fmt::Debug,
{
    /// Constructs a new `Hal0Transport` talking to the slave device at
    /// `address`.
    pub fn new(i2c: I2C, address: Address) -> Hal0Transport<I2C> {
        Hal0Transport {
            i2c,
            address: address.slave_address() as u8,
        }
    }

    /// Consumes the `Hal0Transport`, returning the underlying bus.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

#[cfg(feature = "embedded-hal-0")]
impl<I2C, E> Transport for Hal0Transport<I2C>
where
    I2C: embedded_hal_0::blocking::i2c::Write<Error = E>
        + embedded_hal_0::blocking::i2c::WriteRead<Error = E>,
    E: fmt::Debug,
{
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        embedded_hal_0::blocking::i2c::Write::write(&mut self.i2c, self.address, bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("I2C error: {:?}", err)))
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        embedded_hal_0::blocking::i2c::WriteRead::write_read(
            &mut self.i2c,
            self.address,
            bytes,
            buffer,
        )
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("I2C error: {:?}", err)))?;

        Ok(buffer.len())
    }
}
