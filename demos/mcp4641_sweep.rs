// mcp4641_sweep.rs - Sweeps both wipers of a Microchip MCP4641 dual digital
// potentiometer back and forth, while handling any incoming SIGINT (Ctrl-C)
// and SIGTERM signals so the wipers can be restored before the application
// exits.
//
// Connect the MCP4641's SDA and SCL pins to physical pins 3 and 5, and tie
// A0, A1 and A2 to ground. Set RUST_LOG=debug to see which commands are sent.

use std::cell::RefCell;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// The simple-signal crate is used to handle incoming signals.
use simple_signal::{self, Signal};

use mcpdigipot::i2c::I2c;
use mcpdigipot::potentiometer::variant::MCP4641;
use mcpdigipot::potentiometer::{Channel, DigitalPotentiometer, NonVolatileMode};

// Bus 1 is connected to physical pins 3 (SDA) and 5 (SCL).
const I2C_BUS: u8 = 1;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let i2c = I2c::with_address(I2C_BUS, MCP4641.address(false, false, false))?;

    // Both channels share the same bus. Each potentiometer keeps a shared
    // reference to it, and borrows it for the duration of a transaction.
    let bus = RefCell::new(i2c);

    let mut pot_a =
        DigitalPotentiometer::new(&bus, &MCP4641, Channel::A, NonVolatileMode::VolatileOnly, 0)?;
    let mut pot_b =
        DigitalPotentiometer::new(&bus, &MCP4641, Channel::B, NonVolatileMode::VolatileOnly, 0)?;

    println!("{}", pot_a.variant());
    println!("Channel A starts at {}", pot_a.current_value());
    println!("Channel A terminals: {}", pot_a.terminal_configuration()?);

    let status = pot_a.device_status()?;
    println!(
        "EEPROM write protected: {}, wiper lock A: {}",
        status.is_eeprom_write_protected(),
        status.is_wiper_lock_active()
    );

    // Remember the power-up values so they can be restored on exit.
    let initial_a = pot_a.current_value();
    let initial_b = pot_b.current_value();

    let running = Arc::new(AtomicBool::new(true));

    // When a SIGINT (Ctrl-C) or SIGTERM signal is caught, atomically set running to false.
    simple_signal::set_handler(&[Signal::Int, Signal::Term], {
        let running = running.clone();
        move |_| {
            running.store(false, Ordering::SeqCst);
        }
    });

    let mut rising = true;
    while running.load(Ordering::SeqCst) {
        // Small steps are sent as a burst of increment/decrement commands.
        if rising {
            pot_a.increase_by(4)?;
        } else {
            pot_a.decrease_by(4)?;
        }

        let value_a = pot_a.current_value();
        if value_a == 0 || value_a == pot_a.max_value() {
            rising = !rising;
        }

        // Channel B mirrors channel A.
        pot_b.set_current_value(i32::from(pot_b.max_value() - value_a))?;

        println!("A: {:>3}  B: {:>3}", value_a, pot_b.current_value());

        thread::sleep(Duration::from_millis(100));
    }

    // Restore both wipers.
    pot_a.set_current_value(i32::from(initial_a))?;
    pot_b.set_current_value(i32::from(initial_b))?;

    Ok(())
}
