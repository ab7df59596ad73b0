// Copyright (c) 2017-2018 Rene van der Meer
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

use libc::{c_int, c_ulong, ioctl};
use std::io;
use std::result;

pub type Result<T> = result::Result<T, io::Error>;

// Based on i2c.h, i2c-dev.h and the documentation at https://www.kernel.org/doc/Documentation/i2c

// Capabilities returned by REQ_FUNCS
const FUNC_I2C: c_ulong = 0x01;
const FUNC_10BIT_ADDR: c_ulong = 0x02;

/// Lists the I2C features supported by the underlying drivers.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Capabilities {
    funcs: c_ulong,
}

impl Capabilities {
    fn new(funcs: c_ulong) -> Capabilities {
        Capabilities { funcs }
    }

    /// Combined write/read transfers (`I2C_RDWR`) are supported.
    pub fn i2c(&self) -> bool {
        (self.funcs & FUNC_I2C) > 0
    }

    /// 10-bit slave addresses are supported.
    pub fn addr_10bit(&self) -> bool {
        (self.funcs & FUNC_10BIT_ADDR) > 0
    }
}

// ioctl() requests supported by i2cdev
const REQ_TIMEOUT: c_ulong = 0x0702; // Timeout in 10ms units
const REQ_SLAVE: c_ulong = 0x0706; // Set slave address
const REQ_TENBIT: c_ulong = 0x0704; // Use 10-bit slave addresses
const REQ_FUNCS: c_ulong = 0x0705; // Read I2C bus capabilities
const REQ_RDWR: c_ulong = 0x0707; // Combined read/write transfer with a single STOP

// Message flags
const MSG_RD: u16 = 0x0001;

// Holds a single segment of a REQ_RDWR transfer (struct i2c_msg)
#[repr(C)]
struct Message {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

// Specifies REQ_RDWR request parameters (struct i2c_rdwr_ioctl_data)
#[repr(C)]
struct RdwrRequest {
    msgs: *mut Message,
    nmsgs: u32,
}

// All ioctl commands take an unsigned long parameter, except for
// REQ_FUNCS and REQ_RDWR

pub unsafe fn set_slave_address(fd: c_int, value: c_ulong) -> Result<i32> {
    parse_retval!(ioctl(fd, REQ_SLAVE, value))
}

pub unsafe fn set_addr_10bit(fd: c_int, value: c_ulong) -> Result<i32> {
    parse_retval!(ioctl(fd, REQ_TENBIT, value))
}

pub unsafe fn set_timeout(fd: c_int, value: c_ulong) -> Result<i32> {
    parse_retval!(ioctl(fd, REQ_TIMEOUT, value))
}

pub unsafe fn funcs(fd: c_int) -> Result<Capabilities> {
    let mut funcs: c_ulong = 0;

    parse_retval!(ioctl(fd, REQ_FUNCS, &mut funcs))?;

    Ok(Capabilities::new(funcs))
}

pub unsafe fn i2c_write_read(
    fd: c_int,
    address: u16,
    write_buffer: &[u8],
    read_buffer: &mut [u8],
) -> Result<i32> {
    // Both buffers are limited by the 16-bit length field of i2c_msg
    if write_buffer.len() > u16::MAX as usize || read_buffer.len() > u16::MAX as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "buffer exceeds maximum transfer length",
        ));
    }

    let mut messages = [
        Message {
            addr: address,
            flags: 0,
            len: write_buffer.len() as u16,
            // i2cdev doesn't write to buffers of messages without MSG_RD
            buf: write_buffer.as_ptr() as *mut u8,
        },
        Message {
            addr: address,
            flags: MSG_RD,
            len: read_buffer.len() as u16,
            buf: read_buffer.as_mut_ptr(),
        },
    ];

    let mut request = RdwrRequest {
        msgs: messages.as_mut_ptr(),
        nmsgs: messages.len() as u32,
    };

    parse_retval!(ioctl(fd, REQ_RDWR, &mut request))
}
