//! Continuously sends an incrementing counter to the connected
//! microcontroller and prints whatever payloads come back.
//!
//! The controller side is expected to run the matching transport firmware
//! and echo received payloads. Run with, for example:
//!
//! ```text
//! cargo run --example rx_tx_cycle -- --port /dev/ttyACM0
//! ```

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tether_host::{SerialPortDevice, Transport, TransportConfig, list_available_ports};

#[derive(Parser)]
#[command(about = "Round-trip counter payloads over a tether serial link")]
struct Args {
    /// Serial port to connect to, e.g. /dev/ttyACM0 or COM3.
    #[arg(long)]
    port: Option<String>,

    /// Baud rate (ignored by native USB ports).
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// How long to wait for each echo before giving up, in milliseconds.
    #[arg(long, default_value_t = 500)]
    echo_timeout_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(port) = args.port else {
        println!("No --port given; available ports:");
        for info in list_available_ports()? {
            println!("  {}", info.port_name);
        }
        return Ok(());
    };

    let device = SerialPortDevice::connect(&port, args.baud)
        .with_context(|| format!("failed to open {port}"))?;
    let mut transport = Transport::new(TransportConfig::default(), device)?;
    let echo_timeout = Duration::from_millis(args.echo_timeout_ms);

    let mut counter = 0u32;
    loop {
        transport.write_data(&counter, None)?;
        transport.send_data()?;

        let sent_at = Instant::now();
        loop {
            if transport.receive_data()? {
                let (echoed, _) = transport.read_data(0u32, 0)?;
                println!("sent {counter}, controller answered {echoed}");
                break;
            }
            if sent_at.elapsed() > echo_timeout {
                println!("sent {counter}, no answer within {echo_timeout:?}");
                break;
            }
        }

        counter = counter.wrapping_add(1);
    }
}
