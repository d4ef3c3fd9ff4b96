//! Host-side runtime of the tether serial transport.
//!
//! Connects to a tethered microcontroller over a byte-oriented serial link
//! (USB-CDC or UART) and exchanges typed binary payloads framed with COBS
//! and protected by a CRC. The protocol core lives in `tether_core`; this
//! crate adds the serial device adapter, an in-memory mock device, and the
//! [`Transport`] driving both directions.
//!
//! # Example
//!
//! ```no_run
//! use tether_host::{SerialPortDevice, Transport, TransportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let device = SerialPortDevice::connect("/dev/ttyACM0", 115_200)?;
//!     let mut transport = Transport::new(TransportConfig::default(), device)?;
//!
//!     transport.write_data(&42u32, None)?;
//!     transport.send_data()?;
//!
//!     while !transport.receive_data()? {}
//!     let (echoed, _) = transport.read_data(0u32, 0)?;
//!     println!("controller echoed {echoed}");
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mock;
pub mod transport;

pub use device::{SerialDevice, SerialPortDevice, list_available_ports};
pub use transport::{Transport, TransportError};

pub use tether_core::config::TransportConfig;
pub use tether_core::crc::CrcWidth;
pub use tether_core::serialize::Serializable;
