//! In-memory serial device for tests and examples.
//!
//! [`MockSerial::pair`] returns the device half (handed to the transport)
//! and a [`MockHandle`] playing the role of the microcontroller: it injects
//! inbound bytes and observes what the transport wrote. The handle is
//! cloneable and thread-safe, so tests can feed bytes from a second thread
//! to exercise the transport's inter-byte timing.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::SerialDevice;

#[derive(Default)]
struct MockState {
    is_open: bool,
    /// Bytes waiting for the transport to read.
    rx: Vec<u8>,
    /// Bytes the transport has written.
    tx: Vec<u8>,
}

/// Device half of a mock serial link.
pub struct MockSerial {
    state: Arc<Mutex<MockState>>,
}

/// Test half of a mock serial link.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockSerial {
    /// Creates a connected device/handle pair.
    pub fn pair() -> (MockSerial, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            MockSerial {
                state: state.clone(),
            },
            MockHandle { state },
        )
    }

    fn state(&self) -> io::Result<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("mock serial state poisoned"))
    }
}

impl SerialDevice for MockSerial {
    fn open(&mut self) -> io::Result<()> {
        self.state()?.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state()?.is_open = false;
        Ok(())
    }

    fn available(&mut self) -> io::Result<usize> {
        Ok(self.state()?.rx.len())
    }

    fn read(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut state = self.state()?;
        if !state.is_open {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "mock serial port is not open",
            ));
        }
        let count = count.min(state.rx.len());
        Ok(state.rx.drain(..count).collect())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state()?;
        if !state.is_open {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "mock serial port is not open",
            ));
        }
        state.tx.extend_from_slice(bytes);
        Ok(())
    }
}

impl MockHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock serial state poisoned")
    }

    /// Queues `bytes` for the transport to receive.
    pub fn inject(&self, bytes: &[u8]) {
        self.state().rx.extend_from_slice(bytes);
    }

    /// Number of injected bytes the transport has not read yet.
    pub fn pending(&self) -> usize {
        self.state().rx.len()
    }

    /// Removes and returns everything the transport has written so far.
    pub fn take_transmitted(&self) -> Vec<u8> {
        std::mem::take(&mut self.state().tx)
    }

    /// Copies everything the transport has written so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state().tx.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_shares_both_directions() {
        let (mut device, handle) = MockSerial::pair();
        device.open().unwrap();
        assert!(handle.is_open());

        handle.inject(&[1, 2, 3]);
        assert_eq!(device.available().unwrap(), 3);
        assert_eq!(device.read(2).unwrap(), vec![1, 2]);
        assert_eq!(handle.pending(), 1);

        device.write(&[9, 8]).unwrap();
        assert_eq!(handle.take_transmitted(), vec![9, 8]);
        assert!(handle.take_transmitted().is_empty());
    }

    #[test]
    fn closed_device_rejects_io() {
        let (mut device, handle) = MockSerial::pair();
        handle.inject(&[1]);
        assert!(device.read(1).is_err());
        assert!(device.write(&[1]).is_err());
    }
}
