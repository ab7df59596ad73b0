//! MCPDIGIPOT drives Microchip's MCP45xx, MCP46xx and MCP44xx family of
//! I2C digital potentiometers and rheostats through a user-friendly interface.
//!
//! The driver talks to the chip's register map directly. It keeps track of the
//! volatile and non-volatile (EEPROM) wipers, clamps values at the hardware
//! boundaries, and picks between cheap increment/decrement commands and full
//! resynchronizing writes.
//!
//! On Linux, the chips are reached through the `i2cdev` interface provided by
//! the [`i2c`] module. Any other bus can be used by implementing
//! [`potentiometer::Transport`], or, through the optional `hal` feature, by
//! wrapping an `embedded-hal` I2C implementation with one of the adapters in
//! the `hal` module.
//!
//! [`i2c`]: i2c/index.html
//! [`potentiometer::Transport`]: potentiometer/trait.Transport.html

// Used by rustdoc to link other crates to mcpdigipot's docs
#![doc(html_root_url = "https://docs.rs/mcpdigipot/0.1.0")]

#[macro_use]
mod macros;

#[cfg(any(feature = "embedded-hal", feature = "embedded-hal-0"))]
pub mod hal;
pub mod i2c;
pub mod potentiometer;
