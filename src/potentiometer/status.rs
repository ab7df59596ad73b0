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

use super::{Channel, Error, Result};

// STATUS register layout (datasheet 4.2.2.1). Bits 4 through 8 are reserved
// and always read as 1.
pub(crate) const STATUS_RESERVED_MASK: u16 = 0b1_1111_0000;
pub(crate) const STATUS_RESERVED_VALUE: u16 = 0b1_1111_0000;
const STATUS_EEPROM_WRITE_ACTIVE_BIT: u16 = 0b1000;
const STATUS_WIPER_LOCK1_BIT: u16 = 0b0100;
const STATUS_WIPER_LOCK0_BIT: u16 = 0b0010;
const STATUS_EEPROM_WRITE_PROTECTION_BIT: u16 = 0b0001;

/// Contents of the device's STATUS register.
///
/// The register holds two wiper lock flags. Wiper lock 0 covers channels
/// `A` and `C`, wiper lock 1 covers channels `B` and `D`, following the same
/// pairing as the terminal control bits.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct DeviceStatus {
    eeprom_write_active: bool,
    eeprom_write_protected: bool,
    wiper_lock0: bool,
    wiper_lock1: bool,
}

impl DeviceStatus {
    /// Decodes a raw STATUS register value.
    ///
    /// Returns `Err(`[`Error::InvalidStatus`]`)` if the reserved bits don't
    /// match, which usually means the slave device isn't one of the
    /// supported chips, or the transfer got corrupted.
    ///
    /// [`Error::InvalidStatus`]: enum.Error.html#variant.InvalidStatus
    pub fn from_register(value: u16) -> Result<DeviceStatus> {
        if value & STATUS_RESERVED_MASK != STATUS_RESERVED_VALUE {
            return Err(Error::InvalidStatus(value));
        }

        Ok(DeviceStatus {
            eeprom_write_active: (value & STATUS_EEPROM_WRITE_ACTIVE_BIT) > 0,
            eeprom_write_protected: (value & STATUS_EEPROM_WRITE_PROTECTION_BIT) > 0,
            wiper_lock0: (value & STATUS_WIPER_LOCK0_BIT) > 0,
            wiper_lock1: (value & STATUS_WIPER_LOCK1_BIT) > 0,
        })
    }

    /// Returns `true` while the device is writing to EEPROM.
    pub fn is_eeprom_write_active(&self) -> bool {
        self.eeprom_write_active
    }

    /// Returns `true` if EEPROM is write-protected.
    pub fn is_eeprom_write_protected(&self) -> bool {
        self.eeprom_write_protected
    }

    /// Returns `true` if the wiper lock covering `channel` is active.
    pub fn is_wiper_locked(&self, channel: Channel) -> bool {
        match channel {
            Channel::A | Channel::C => self.wiper_lock0,
            Channel::B | Channel::D => self.wiper_lock1,
        }
    }
}

/// Device status as seen from a single channel.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ChannelStatus {
    channel: Channel,
    eeprom_write_active: bool,
    eeprom_write_protected: bool,
    wiper_lock_active: bool,
}

impl ChannelStatus {
    pub(crate) fn new(status: DeviceStatus, channel: Channel) -> ChannelStatus {
        ChannelStatus {
            channel,
            eeprom_write_active: status.is_eeprom_write_active(),
            eeprom_write_protected: status.is_eeprom_write_protected(),
            wiper_lock_active: status.is_wiper_locked(channel),
        }
    }

    /// Returns the channel the wiper lock flag refers to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns `true` while the device is writing to EEPROM.
    pub fn is_eeprom_write_active(&self) -> bool {
        self.eeprom_write_active
    }

    /// Returns `true` if EEPROM is write-protected.
    pub fn is_eeprom_write_protected(&self) -> bool {
        self.eeprom_write_protected
    }

    /// Returns `true` if the channel's wiper lock is active.
    pub fn is_wiper_lock_active(&self) -> bool {
        self.wiper_lock_active
    }
}

/// Terminal configuration of a single channel.
///
/// When `channel_enabled` is `false`, the channel is put in shutdown mode
/// regardless of the individual pin settings.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct TerminalConfiguration {
    channel: Channel,
    channel_enabled: bool,
    pin_a_enabled: bool,
    pin_w_enabled: bool,
    pin_b_enabled: bool,
}

impl TerminalConfiguration {
    /// Constructs a new `TerminalConfiguration`.
    pub fn new(
        channel: Channel,
        channel_enabled: bool,
        pin_a_enabled: bool,
        pin_w_enabled: bool,
        pin_b_enabled: bool,
    ) -> TerminalConfiguration {
        TerminalConfiguration {
            channel,
            channel_enabled,
            pin_a_enabled,
            pin_w_enabled,
            pin_b_enabled,
        }
    }

    /// Extracts the configuration of `channel` from a raw terminal control
    /// register value.
    pub fn from_register(channel: Channel, tcon: u16) -> TerminalConfiguration {
        let descriptor = channel.descriptor();

        TerminalConfiguration {
            channel,
            channel_enabled: (tcon & descriptor.hardware_config_bit()) > 0,
            pin_a_enabled: (tcon & descriptor.terminal_a_bit()) > 0,
            pin_w_enabled: (tcon & descriptor.wiper_bit()) > 0,
            pin_b_enabled: (tcon & descriptor.terminal_b_bit()) > 0,
        }
    }

    /// Merges this configuration into a raw terminal control register value.
    ///
    /// Only the four bits owned by the configuration's channel are modified.
    pub fn apply(&self, tcon: u16) -> u16 {
        let descriptor = self.channel.descriptor();

        let tcon = set_bits!(tcon, descriptor.hardware_config_bit(), self.channel_enabled);
        let tcon = set_bits!(tcon, descriptor.terminal_a_bit(), self.pin_a_enabled);
        let tcon = set_bits!(tcon, descriptor.wiper_bit(), self.pin_w_enabled);

        set_bits!(tcon, descriptor.terminal_b_bit(), self.pin_b_enabled)
    }

    /// Returns the channel this configuration applies to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns `true` if the channel is connected to the resistor network.
    pub fn is_channel_enabled(&self) -> bool {
        self.channel_enabled
    }

    /// Returns `true` if terminal A is connected.
    pub fn is_pin_a_enabled(&self) -> bool {
        self.pin_a_enabled
    }

    /// Returns `true` if the wiper terminal is connected.
    pub fn is_pin_w_enabled(&self) -> bool {
        self.pin_w_enabled
    }

    /// Returns `true` if terminal B is connected.
    pub fn is_pin_b_enabled(&self) -> bool {
        self.pin_b_enabled
    }
}

impl fmt::Display for TerminalConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel {}: enabled={} A={} W={} B={}",
            self.channel,
            self.channel_enabled,
            self.pin_a_enabled,
            self.pin_w_enabled,
            self.pin_b_enabled
        )
    }
}
