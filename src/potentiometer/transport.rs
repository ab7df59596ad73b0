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

use std::cell::{RefCell, RefMut};
use std::io;

/// Byte-oriented connection to a single slave device.
///
/// Implementations address the slave device themselves. Every call is one
/// bus transaction, and no retries are expected.
///
/// `Transport` is implemented for [`I2c`], for the `embedded-hal` adapters in
/// the `hal` module, for mutable references to any `Transport`, and for shared
/// references to a [`RefCell`] holding one. The latter lets several
/// potentiometers on the same bus exist at the same time.
///
/// [`I2c`]: ../i2c/struct.I2c.html
/// [`RefCell`]: https://doc.rust-lang.org/std/cell/struct.RefCell.html
pub trait Transport {
    /// Sends `bytes` to the slave device.
    ///
    /// Sequence: START → Address + Write Bit → Outgoing Bytes → STOP
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Sends `bytes` to the slave device, and then fills `buffer` with
    /// incoming data.
    ///
    /// Sequence: START → Address + Write Bit → Outgoing Bytes → Repeated START →
    /// Address + Read Bit → Incoming Bytes → STOP
    ///
    /// Returns how many bytes were read.
    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        (**self).write_read(bytes, buffer)
    }
}

impl<T: Transport> Transport for &RefCell<T> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        borrow_bus(*self)?.write(bytes)
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        borrow_bus(*self)?.write_read(bytes, buffer)
    }
}

// Transactions never nest, so the bus is only busy if a caller holds on to it
fn borrow_bus<T>(bus: &RefCell<T>) -> io::Result<RefMut<'_, T>> {
    bus.try_borrow_mut()
        .map_err(|_| io::Error::new(io::ErrorKind::WouldBlock, "I2C bus already in use"))
}
