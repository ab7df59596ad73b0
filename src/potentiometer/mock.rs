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

// Register-level simulation of a potentiometer, used as a Transport in tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use super::channel::{
    MEMADDR_STATUS, MEMADDR_TCON0, MEMADDR_TCON1, MEMADDR_WIPER0_NV, MEMADDR_WIPER1_NV,
    MEMADDR_WIPER2_NV, MEMADDR_WIPER3_NV, MEMADDR_WRITE_PROTECTION,
};
use super::status::STATUS_RESERVED_VALUE;
use super::{DeviceVariant, Transport};

const STATUS_WRITE_PROTECTION: u16 = 0b0001;
const STATUS_WIPER_LOCK0: u16 = 0b0010;
const STATUS_WIPER_LOCK1: u16 = 0b0100;

// Power-on default: every terminal connected
const TCON_DEFAULT: u16 = 0x1FF;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Transaction {
    Write(Vec<u8>),
    WriteRead(Vec<u8>, usize),
}

#[derive(Debug)]
struct State {
    registers: [u16; 16],
    max_value: u16,
    transactions: Vec<Transaction>,
    short_read: bool,
    fail_after: Option<usize>,
}

impl State {
    fn check_failure(&mut self) -> io::Result<()> {
        match self.fail_after {
            Some(0) => Err(io::Error::new(io::ErrorKind::TimedOut, "simulated bus failure")),
            Some(remaining) => {
                self.fail_after = Some(remaining - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn step(&mut self, address: u8, increase: bool) {
        let lock = match address {
            MEMADDR_WIPER0_NV | MEMADDR_WIPER2_NV => Some(STATUS_WIPER_LOCK0),
            MEMADDR_WIPER1_NV | MEMADDR_WIPER3_NV => Some(STATUS_WIPER_LOCK1),
            MEMADDR_WRITE_PROTECTION => Some(STATUS_WRITE_PROTECTION),
            _ => None,
        };

        if let Some(bit) = lock {
            let status = &mut self.registers[usize::from(MEMADDR_STATUS)];
            *status = set_bits!(*status, bit, increase);
            return;
        }

        let register = &mut self.registers[usize::from(address)];
        if increase {
            *register = (*register + 1).min(self.max_value);
        } else {
            *register = register.saturating_sub(1);
        }
    }
}

/// Shared handle to a simulated chip. Clones observe the same registers.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    state: Rc<RefCell<State>>,
}

impl SimulatedChip {
    pub fn new(variant: &DeviceVariant) -> SimulatedChip {
        let mut registers = [0u16; 16];
        registers[usize::from(MEMADDR_STATUS)] = STATUS_RESERVED_VALUE;
        registers[usize::from(MEMADDR_TCON0)] = TCON_DEFAULT;
        registers[usize::from(MEMADDR_TCON1)] = TCON_DEFAULT;

        SimulatedChip {
            state: Rc::new(RefCell::new(State {
                registers,
                max_value: variant.max_value(),
                transactions: Vec::new(),
                short_read: false,
                fail_after: None,
            })),
        }
    }

    pub fn register(&self, address: u8) -> u16 {
        self.state.borrow().registers[usize::from(address)]
    }

    pub fn set_register(&self, address: u8, value: u16) {
        self.state.borrow_mut().registers[usize::from(address)] = value;
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().transactions.clone()
    }

    pub fn clear_transactions(&self) {
        self.state.borrow_mut().transactions.clear();
    }

    /// Makes reads return a single byte.
    pub fn set_short_read(&self, short_read: bool) {
        self.state.borrow_mut().short_read = short_read;
    }

    /// Lets `transactions` more transactions succeed, and fails every one after.
    pub fn fail_after(&self, transactions: usize) {
        self.state.borrow_mut().fail_after = Some(transactions);
    }
}

impl Transport for SimulatedChip {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.check_failure()?;
        state.transactions.push(Transaction::Write(bytes.to_vec()));

        let mut bytes = bytes.iter();
        while let Some(&command) = bytes.next() {
            let address = command >> 4;

            match (command >> 2) & 0b11 {
                0b00 => {
                    let data = bytes.next().ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidData, "missing data byte")
                    })?;
                    state.registers[usize::from(address)] =
                        (u16::from(command & 0x01) << 8) | u16::from(*data);
                }
                0b01 => state.step(address, true),
                0b10 => state.step(address, false),
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "read command in write transaction",
                    ))
                }
            }
        }

        Ok(())
    }

    fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        state.check_failure()?;
        state
            .transactions
            .push(Transaction::WriteRead(bytes.to_vec(), buffer.len()));

        let address = bytes[0] >> 4;
        let value = state.registers[usize::from(address)];

        buffer[0] = (value >> 8) as u8;
        if state.short_read {
            return Ok(1);
        }
        buffer[1] = (value & 0xFF) as u8;

        Ok(2)
    }
}
