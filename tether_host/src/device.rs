use std::io;
use std::time::Duration;

use serialport::{SerialPort, SerialPortInfo};

/// Minimal byte-oriented interface the transport needs from a serial link.
///
/// The transport performs all of its own timing, so implementations must
/// not block in `read`: it is only ever called for byte counts that
/// `available` already reported. A mock implementation with identical
/// semantics lives in [`crate::mock`] for testing without hardware.
pub trait SerialDevice {
    fn open(&mut self) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;

    /// Number of received bytes waiting to be read.
    fn available(&mut self) -> io::Result<usize>;

    /// Reads exactly `count` bytes; `count` must not exceed `available()`.
    fn read(&mut self, count: usize) -> io::Result<Vec<u8>>;

    /// Writes all of `bytes` to the link.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// How long the device is given to settle after DTR is asserted.
const OPEN_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// A physical (or USB-CDC) serial port behind the [`SerialDevice`] seam.
///
/// The port's built-in read timeout is pinned to zero: inter-byte timing is
/// owned by the transport's receive loop, which only reads bytes the driver
/// has already buffered.
pub struct SerialPortDevice {
    port: Box<dyn SerialPort>,
}

impl SerialPortDevice {
    /// Opens `port_name` at `baud_rate`.
    ///
    /// The baud rate matters for UART-bridged devices and is ignored by
    /// native USB ports.
    pub fn connect(port_name: &str, baud_rate: u32) -> io::Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::ZERO)
            .open()
            .map_err(io::Error::other)?;
        Ok(Self { port })
    }

    /// Wraps an already-opened port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl SerialDevice for SerialPortDevice {
    fn open(&mut self) -> io::Result<()> {
        // Asserting DTR makes Linux and Windows hosts behave identically;
        // some CDC stacks discard writes that arrive before the line settles.
        self.port
            .write_data_terminal_ready(true)
            .map_err(io::Error::other)?;
        std::thread::sleep(OPEN_SETTLE_DELAY);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn available(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read().map_err(io::Error::other)? as usize)
    }

    fn read(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut bytes = vec![0u8; count];
        self.port.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}

/// Lists the serial ports addressable on this host.
///
/// Intended for discovering the port name to hand to
/// [`SerialPortDevice::connect`].
pub fn list_available_ports() -> serialport::Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports()?;
    log::debug!("discovered {} serial port(s)", ports.len());
    Ok(ports)
}
