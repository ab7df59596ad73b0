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

// Fixed part of the 7-bit slave address (datasheet 6.2.4)
const ADDRESS_BASE: u16 = 0b010_1000;

const CHANNELS_1: &[Channel] = &[Channel::A];
const CHANNELS_2: &[Channel] = &[Channel::A, Channel::B];
const CHANNELS_4: &[Channel] = &[Channel::A, Channel::B, Channel::C, Channel::D];

/// Supported chip models.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Model {
    Mcp4532,
    Mcp4541,
    Mcp4542,
    Mcp4551,
    Mcp4632,
    Mcp4641,
    Mcp4642,
    Mcp4651,
    Mcp4661,
    Mcp4461,
}

impl Model {
    /// Returns the constant properties of this model.
    pub fn variant(self) -> &'static DeviceVariant {
        match self {
            Model::Mcp4532 => &MCP4532,
            Model::Mcp4541 => &MCP4541,
            Model::Mcp4542 => &MCP4542,
            Model::Mcp4551 => &MCP4551,
            Model::Mcp4632 => &MCP4632,
            Model::Mcp4641 => &MCP4641,
            Model::Mcp4642 => &MCP4642,
            Model::Mcp4651 => &MCP4651,
            Model::Mcp4661 => &MCP4661,
            Model::Mcp4461 => &MCP4461,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Model::Mcp4532 => write!(f, "MCP4532"),
            Model::Mcp4541 => write!(f, "MCP4541"),
            Model::Mcp4542 => write!(f, "MCP4542"),
            Model::Mcp4551 => write!(f, "MCP4551"),
            Model::Mcp4632 => write!(f, "MCP4632"),
            Model::Mcp4641 => write!(f, "MCP4641"),
            Model::Mcp4642 => write!(f, "MCP4642"),
            Model::Mcp4651 => write!(f, "MCP4651"),
            Model::Mcp4661 => write!(f, "MCP4661"),
            Model::Mcp4461 => write!(f, "MCP4461"),
        }
    }
}

/// Constant properties of a chip model.
///
/// `max_value` is the highest wiper position. 7-bit devices have 129 wiper
/// positions (0 through 128), 8-bit devices have 257 (0 through 256).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct DeviceVariant {
    model: Model,
    max_value: u16,
    non_volatile: bool,
    rheostat: bool,
    channels: &'static [Channel],
    address_pins: u8,
}

/// Single rheostat, 7-bit, volatile wiper.
pub const MCP4532: DeviceVariant = DeviceVariant {
    model: Model::Mcp4532,
    max_value: 128,
    non_volatile: false,
    rheostat: true,
    channels: CHANNELS_1,
    address_pins: 2,
};

/// Single potentiometer, 7-bit, non-volatile wiper.
pub const MCP4541: DeviceVariant = DeviceVariant {
    model: Model::Mcp4541,
    max_value: 128,
    non_volatile: true,
    rheostat: false,
    channels: CHANNELS_1,
    address_pins: 1,
};

/// Single rheostat, 7-bit, non-volatile wiper.
pub const MCP4542: DeviceVariant = DeviceVariant {
    model: Model::Mcp4542,
    max_value: 128,
    non_volatile: true,
    rheostat: true,
    channels: CHANNELS_1,
    address_pins: 2,
};

/// Single potentiometer, 8-bit, volatile wiper.
pub const MCP4551: DeviceVariant = DeviceVariant {
    model: Model::Mcp4551,
    max_value: 256,
    non_volatile: false,
    rheostat: false,
    channels: CHANNELS_1,
    address_pins: 1,
};

/// Dual rheostat, 7-bit, volatile wipers.
pub const MCP4632: DeviceVariant = DeviceVariant {
    model: Model::Mcp4632,
    max_value: 128,
    non_volatile: false,
    rheostat: true,
    channels: CHANNELS_2,
    address_pins: 2,
};

/// Dual potentiometer, 7-bit, non-volatile wipers.
pub const MCP4641: DeviceVariant = DeviceVariant {
    model: Model::Mcp4641,
    max_value: 128,
    non_volatile: true,
    rheostat: false,
    channels: CHANNELS_2,
    address_pins: 3,
};

/// Dual rheostat, 7-bit, non-volatile wipers.
pub const MCP4642: DeviceVariant = DeviceVariant {
    model: Model::Mcp4642,
    max_value: 128,
    non_volatile: true,
    rheostat: true,
    channels: CHANNELS_2,
    address_pins: 2,
};

/// Dual potentiometer, 8-bit, volatile wipers.
pub const MCP4651: DeviceVariant = DeviceVariant {
    model: Model::Mcp4651,
    max_value: 256,
    non_volatile: false,
    rheostat: false,
    channels: CHANNELS_2,
    address_pins: 3,
};

/// Dual potentiometer, 8-bit, non-volatile wipers.
pub const MCP4661: DeviceVariant = DeviceVariant {
    model: Model::Mcp4661,
    max_value: 256,
    non_volatile: true,
    rheostat: false,
    channels: CHANNELS_2,
    address_pins: 3,
};

/// Quad potentiometer, 8-bit, non-volatile wipers.
pub const MCP4461: DeviceVariant = DeviceVariant {
    model: Model::Mcp4461,
    max_value: 256,
    non_volatile: true,
    rheostat: false,
    channels: CHANNELS_4,
    address_pins: 1,
};

impl DeviceVariant {
    /// Returns the chip model.
    pub fn model(&self) -> Model {
        self.model
    }

    /// Returns the highest wiper position.
    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    /// Returns `true` if the device stores its wipers in EEPROM.
    pub fn is_capable_of_non_volatile_wiper(&self) -> bool {
        self.non_volatile
    }

    /// Returns `true` for rheostats, which don't expose terminal A.
    pub fn is_rheostat(&self) -> bool {
        self.rheostat
    }

    /// Returns every channel the device provides.
    pub fn channels(&self) -> &'static [Channel] {
        self.channels
    }

    /// Returns `true` if the device provides `channel`.
    pub fn is_channel_supported(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    /// Returns `Err(`[`Error::UnsupportedChannel`]`)` unless the device
    /// provides `channel`.
    ///
    /// [`Error::UnsupportedChannel`]: enum.Error.html#variant.UnsupportedChannel
    pub fn check_channel(&self, channel: Channel) -> Result<()> {
        if self.is_channel_supported(channel) {
            Ok(())
        } else {
            Err(Error::UnsupportedChannel(channel))
        }
    }

    /// Returns the number of hardware address pins (A0, A1, A2) the package
    /// exposes.
    pub fn address_pins(&self) -> u8 {
        self.address_pins
    }

    /// Builds the slave address for the given address pin levels.
    ///
    /// Pins the package doesn't expose are tied high internally, so their
    /// requested level is ignored.
    pub fn address(&self, pin_a0: bool, pin_a1: bool, pin_a2: bool) -> Address {
        let available = |index: u8, level: bool| if self.address_pins > index { level } else { true };

        Address::new(
            available(0, pin_a0),
            available(1, pin_a1),
            available(2, pin_a2),
        )
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} channel {}, {} steps{})",
            self.model,
            self.channels.len(),
            if self.rheostat { "rheostat" } else { "potentiometer" },
            self.max_value,
            if self.non_volatile { ", non-volatile" } else { "" }
        )
    }
}

/// I2C slave address of a potentiometer, derived from its address pins.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Address {
    pin_a0: bool,
    pin_a1: bool,
    pin_a2: bool,
}

impl Address {
    /// Constructs a new `Address` from the logic levels of pins A0, A1 and A2.
    ///
    /// Prefer [`DeviceVariant::address`], which takes care of pins the
    /// package doesn't expose.
    ///
    /// [`DeviceVariant::address`]: struct.DeviceVariant.html#method.address
    pub fn new(pin_a0: bool, pin_a1: bool, pin_a2: bool) -> Address {
        Address {
            pin_a0,
            pin_a1,
            pin_a2,
        }
    }

    /// Returns the 7-bit slave address.
    pub fn slave_address(&self) -> u16 {
        ADDRESS_BASE
            | (u16::from(self.pin_a2) << 2)
            | (u16::from(self.pin_a1) << 1)
            | u16::from(self.pin_a0)
    }
}
