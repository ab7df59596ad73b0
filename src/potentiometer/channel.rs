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

use std::fmt;

// Register memory addresses (datasheet TABLE 4-1)
pub(crate) const MEMADDR_WIPER0: u8 = 0x00;
pub(crate) const MEMADDR_WIPER1: u8 = 0x01;
pub(crate) const MEMADDR_WIPER0_NV: u8 = 0x02;
pub(crate) const MEMADDR_WIPER1_NV: u8 = 0x03;
pub(crate) const MEMADDR_TCON0: u8 = 0x04; // Terminal control for wiper 0 and 1
pub(crate) const MEMADDR_STATUS: u8 = 0x05;
pub(crate) const MEMADDR_WIPER2: u8 = 0x06;
pub(crate) const MEMADDR_WIPER3: u8 = 0x07;
pub(crate) const MEMADDR_WIPER2_NV: u8 = 0x08;
pub(crate) const MEMADDR_WIPER3_NV: u8 = 0x09;
pub(crate) const MEMADDR_TCON1: u8 = 0x0A; // Terminal control for wiper 2 and 3
pub(crate) const MEMADDR_WRITE_PROTECTION: u8 = 0x0F;

// Terminal control register bits. Wipers 0 and 2 use the low nibble of their
// TCON register, wipers 1 and 3 the high nibble. Bit 8 (general call enable)
// belongs to neither channel.
const TCON_RH02HW: u16 = 1 << 3;
const TCON_RH02A: u16 = 1 << 2;
const TCON_RH02W: u16 = 1 << 1;
const TCON_RH02B: u16 = 1;
const TCON_RH13HW: u16 = 1 << 7;
const TCON_RH13A: u16 = 1 << 6;
const TCON_RH13W: u16 = 1 << 5;
const TCON_RH13B: u16 = 1 << 4;

/// Wiper channels.
///
/// Single-wiper devices only know `Channel::A`. Dual-wiper devices add
/// `Channel::B`, and quad-wiper devices `Channel::C` and `Channel::D`.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Channel {
    A,
    B,
    C,
    D,
}

impl Channel {
    /// Returns all channels, in register order.
    pub const ALL: [Channel; 4] = [Channel::A, Channel::B, Channel::C, Channel::D];

    /// Returns the fixed register layout for this channel.
    pub fn descriptor(self) -> &'static ChannelDescriptor {
        match self {
            Channel::A => &CHANNEL_A,
            Channel::B => &CHANNEL_B,
            Channel::C => &CHANNEL_C,
            Channel::D => &CHANNEL_D,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Channel::A => write!(f, "A"),
            Channel::B => write!(f, "B"),
            Channel::C => write!(f, "C"),
            Channel::D => write!(f, "D"),
        }
    }
}

/// Register addresses and terminal control bits of a single wiper channel.
///
/// Channels are paired up on a shared terminal control register. `A` and `B`
/// share TCON0, `C` and `D` share TCON1, which is why any update of the
/// terminal configuration has to read the register first.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ChannelDescriptor {
    channel: Channel,
    volatile_address: u8,
    non_volatile_address: u8,
    terminal_control_address: u8,
    hardware_config_bit: u16,
    terminal_a_bit: u16,
    wiper_bit: u16,
    terminal_b_bit: u16,
}

const CHANNEL_A: ChannelDescriptor = ChannelDescriptor {
    channel: Channel::A,
    volatile_address: MEMADDR_WIPER0,
    non_volatile_address: MEMADDR_WIPER0_NV,
    terminal_control_address: MEMADDR_TCON0,
    hardware_config_bit: TCON_RH02HW,
    terminal_a_bit: TCON_RH02A,
    wiper_bit: TCON_RH02W,
    terminal_b_bit: TCON_RH02B,
};

const CHANNEL_B: ChannelDescriptor = ChannelDescriptor {
    channel: Channel::B,
    volatile_address: MEMADDR_WIPER1,
    non_volatile_address: MEMADDR_WIPER1_NV,
    terminal_control_address: MEMADDR_TCON0,
    hardware_config_bit: TCON_RH13HW,
    terminal_a_bit: TCON_RH13A,
    wiper_bit: TCON_RH13W,
    terminal_b_bit: TCON_RH13B,
};

const CHANNEL_C: ChannelDescriptor = ChannelDescriptor {
    channel: Channel::C,
    volatile_address: MEMADDR_WIPER2,
    non_volatile_address: MEMADDR_WIPER2_NV,
    terminal_control_address: MEMADDR_TCON1,
    hardware_config_bit: TCON_RH02HW,
    terminal_a_bit: TCON_RH02A,
    wiper_bit: TCON_RH02W,
    terminal_b_bit: TCON_RH02B,
};

const CHANNEL_D: ChannelDescriptor = ChannelDescriptor {
    channel: Channel::D,
    volatile_address: MEMADDR_WIPER3,
    non_volatile_address: MEMADDR_WIPER3_NV,
    terminal_control_address: MEMADDR_TCON1,
    hardware_config_bit: TCON_RH13HW,
    terminal_a_bit: TCON_RH13A,
    wiper_bit: TCON_RH13W,
    terminal_b_bit: TCON_RH13B,
};

impl ChannelDescriptor {
    /// Returns the channel this descriptor belongs to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the address of the volatile wiper register.
    pub fn volatile_address(&self) -> u8 {
        self.volatile_address
    }

    /// Returns the address of the non-volatile (EEPROM) wiper register.
    pub fn non_volatile_address(&self) -> u8 {
        self.non_volatile_address
    }

    /// Returns the address of the terminal control register shared with the
    /// sibling channel.
    pub fn terminal_control_address(&self) -> u8 {
        self.terminal_control_address
    }

    /// Returns the address of the volatile or non-volatile wiper register.
    pub fn wiper_address(&self, non_volatile: bool) -> u8 {
        if non_volatile {
            self.non_volatile_address
        } else {
            self.volatile_address
        }
    }

    pub fn hardware_config_bit(&self) -> u16 {
        self.hardware_config_bit
    }

    pub fn terminal_a_bit(&self) -> u16 {
        self.terminal_a_bit
    }

    pub fn wiper_bit(&self) -> u16 {
        self.wiper_bit
    }

    pub fn terminal_b_bit(&self) -> u16 {
        self.terminal_b_bit
    }

    /// Returns all four terminal control bits owned by this channel.
    pub fn terminal_control_mask(&self) -> u16 {
        self.hardware_config_bit | self.terminal_a_bit | self.wiper_bit | self.terminal_b_bit
    }
}
