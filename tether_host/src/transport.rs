use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use tether_core::cobs::{self, CobsError};
use tether_core::config::{ConfigError, TransportConfig};
use tether_core::crc::{CrcEngine, CrcError};
use tether_core::parser::{PacketParser, ParseError, ParseProgress};
use tether_core::serialize::{Serializable, SerializeError};

use crate::device::SerialDevice;

/// A packet settles in at most this many parser invocations: one that ends
/// on the start byte, one that resolves the size, and one that drains the
/// rest once the byte count is known.
const MAX_PARSER_CALLS: usize = 3;

/// Sleep between polls of the serial device while waiting for bytes.
const POLL_INTERVAL: Duration = Duration::from_micros(50);

#[derive(Debug)]
pub enum TransportError {
    /// Invalid construction parameters.
    Config(ConfigError),
    /// COBS encoding or decoding failed.
    Cobs(CobsError),
    /// CRC configuration or postamble handling failed.
    Crc(CrcError),
    /// A value could not be staged into or recovered from a buffer.
    Serialize(SerializeError),
    /// The incoming byte stream did not parse as a packet.
    Parse(ParseError),
    /// The size byte did not follow the start byte in time.
    SizeTimeout { timeout_us: u32 },
    /// Packet reception staled while accumulating the encoded payload.
    BodyTimeout { missing: usize, timeout_us: u32 },
    /// Packet reception staled while accumulating the CRC postamble.
    CrcTimeout { missing: usize, timeout_us: u32 },
    /// The packet arrived intact but its checksum did not verify.
    CrcMismatch { received: u32, expected: u32 },
    /// The underlying serial device failed.
    Io(io::Error),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Config(error) => write!(f, "invalid configuration: {error}"),
            TransportError::Cobs(error) => write!(f, "COBS framing failed: {error}"),
            TransportError::Crc(error) => write!(f, "CRC handling failed: {error}"),
            TransportError::Serialize(error) => write!(f, "data serialization failed: {error}"),
            TransportError::Parse(error) => write!(f, "packet parsing failed: {error}"),
            TransportError::SizeTimeout { timeout_us } => write!(
                f,
                "the size byte was not received within {timeout_us} us of the start byte"
            ),
            TransportError::BodyTimeout {
                missing,
                timeout_us,
            } => write!(
                f,
                "packet reception staled with {missing} byte(s) outstanding ({timeout_us} us inter-byte timeout)"
            ),
            TransportError::CrcTimeout {
                missing,
                timeout_us,
            } => write!(
                f,
                "CRC postamble reception staled with {missing} byte(s) outstanding ({timeout_us} us inter-byte timeout)"
            ),
            TransportError::CrcMismatch { received, expected } => write!(
                f,
                "packet checksum {received:#x} did not match the expected value {expected:#x}; \
                 the packet was corrupted in transit"
            ),
            TransportError::Io(error) => write!(f, "serial device error: {error}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Config(error) => Some(error),
            TransportError::Cobs(error) => Some(error),
            TransportError::Crc(error) => Some(error),
            TransportError::Serialize(error) => Some(error),
            TransportError::Parse(error) => Some(error),
            TransportError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for TransportError {
    fn from(error: ConfigError) -> Self {
        TransportError::Config(error)
    }
}

impl From<CobsError> for TransportError {
    fn from(error: CobsError) -> Self {
        TransportError::Cobs(error)
    }
}

impl From<CrcError> for TransportError {
    fn from(error: CrcError) -> Self {
        TransportError::Crc(error)
    }
}

impl From<SerializeError> for TransportError {
    fn from(error: SerializeError) -> Self {
        TransportError::Serialize(error)
    }
}

impl From<ParseError> for TransportError {
    fn from(error: ParseError) -> Self {
        TransportError::Parse(error)
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io(error)
    }
}

/// Bidirectional packet transport over a byte-oriented serial device.
///
/// The transport owns two staging buffers. Outbound values are serialized
/// into the transmission buffer with [`write_data`](Self::write_data), then
/// framed and sent as one packet by [`send_data`](Self::send_data). Inbound
/// packets are reassembled from the byte stream by
/// [`receive_data`](Self::receive_data), after which
/// [`read_data`](Self::read_data) recovers typed values from the reception
/// buffer.
///
/// Packets on the wire look like
/// `[START][SIZE][COBS-encoded payload][CRC]`, where the encoded payload
/// ends with the delimiter byte and the CRC covers the encoded payload.
/// Both sides of the link must use identical [`TransportConfig`] protocol
/// parameters.
///
/// All operations run to completion on the calling thread; the only
/// blocking happens inside `receive_data`'s inter-byte wait, bounded by the
/// configured timeout.
pub struct Transport<D: SerialDevice> {
    device: D,
    config: TransportConfig,
    crc: CrcEngine,
    parser: PacketParser,
    /// Staged outbound payload; only the first `tx_used` bytes are live.
    tx_buffer: Vec<u8>,
    /// Decoded inbound payload; only the first `rx_used` bytes are live.
    rx_buffer: Vec<u8>,
    tx_used: usize,
    rx_used: usize,
    /// Bytes already pulled from the device but not yet consumed by the
    /// parser. Reading the device in bulk keeps the costly calls rare.
    leftover: Vec<u8>,
    min_packet_size: usize,
    timeout: Duration,
}

impl<D: SerialDevice> Transport<D> {
    /// Builds the CRC table, allocates the staging buffers, and opens the
    /// device.
    pub fn new(config: TransportConfig, mut device: D) -> Result<Self, TransportError> {
        config.validate()?;
        let crc = CrcEngine::new(
            config.crc_width,
            config.polynomial,
            config.initial_crc,
            config.final_crc_xor,
        )?;
        device.open()?;

        let postamble = config.postamble_size();
        Ok(Self {
            parser: PacketParser::new(&config),
            tx_buffer: vec![0u8; config.max_tx_payload as usize + 2 + postamble],
            rx_buffer: vec![0u8; cobs::MAX_PAYLOAD_SIZE + 2 + postamble],
            tx_used: 0,
            rx_used: 0,
            leftover: Vec::new(),
            min_packet_size: config.min_packet_size(),
            timeout: Duration::from_micros(u64::from(config.timeout_us)),
            device,
            config,
            crc,
        })
    }

    /// Number of staged payload bytes awaiting transmission.
    pub fn bytes_in_transmission_buffer(&self) -> usize {
        self.tx_used
    }

    /// Number of decoded payload bytes available for reading.
    pub fn bytes_in_reception_buffer(&self) -> usize {
        self.rx_used
    }

    /// Snapshot copy of the transmission buffer.
    pub fn transmission_buffer(&self) -> Vec<u8> {
        self.tx_buffer.clone()
    }

    /// Snapshot copy of the reception buffer.
    pub fn reception_buffer(&self) -> Vec<u8> {
        self.rx_buffer.clone()
    }

    /// Invalidates any staged outbound payload. The buffer contents are
    /// left in place; only the cursor moves.
    pub fn reset_transmission_buffer(&mut self) {
        self.tx_used = 0;
    }

    /// Invalidates any received payload.
    pub fn reset_reception_buffer(&mut self) {
        self.rx_used = 0;
    }

    /// True when enough bytes are buffered to plausibly hold a packet.
    ///
    /// A cheap pre-check: `receive_data` performs it internally, but
    /// callers polling many transports can use it to skip idle ones.
    pub fn available(&mut self) -> Result<bool, TransportError> {
        Ok(self.leftover.len() + self.device.available()? >= self.min_packet_size)
    }

    /// Serializes `value` into the transmission buffer.
    ///
    /// With `start_index` of `None` the value is appended after the staged
    /// payload; an explicit index overwrites in place, which never shrinks
    /// the staged payload.
    ///
    /// Returns the buffer index immediately past the written value, usable
    /// as the `start_index` of a chained write.
    pub fn write_data<T: Serializable>(
        &mut self,
        value: &T,
        start_index: Option<usize>,
    ) -> Result<usize, TransportError> {
        let offset = start_index.unwrap_or(self.tx_used);
        // Staging is bounded by the configured payload limit, not the
        // physical buffer, so a full buffer always frames successfully.
        let staging = self.config.max_tx_payload as usize;
        let end = value.write_into(&mut self.tx_buffer[..staging], offset)?;
        self.tx_used = self.tx_used.max(end);
        Ok(end)
    }

    /// Recreates `prototype` from the received payload.
    ///
    /// The prototype's type decides how many bytes are consumed starting at
    /// `start_index` and how they are interpreted. Reading does not consume
    /// the payload; the same bytes can be read any number of times until
    /// the next packet arrives.
    ///
    /// Returns the recreated value and the index immediately past it.
    pub fn read_data<T: Serializable>(
        &self,
        prototype: T,
        start_index: usize,
    ) -> Result<(T, usize), TransportError> {
        let mut value = prototype;
        let end = value.read_from(&self.rx_buffer[..self.rx_used], start_index)?;
        Ok((value, end))
    }

    /// Frames the staged payload and writes it to the device as a single
    /// packet.
    ///
    /// On success the transmission cursor is reset so the next payload can
    /// be staged. Framing failures leave the staged payload untouched for
    /// inspection.
    pub fn send_data(&mut self) -> Result<bool, TransportError> {
        let payload = &self.tx_buffer[..self.tx_used];
        let encoded = cobs::encode_payload(payload, self.config.delimiter_byte)?;
        let checksum = self.crc.checksum(&encoded);

        let mut packet = Vec::with_capacity(2 + encoded.len() + self.crc.byte_length());
        packet.push(self.config.start_byte);
        packet.push(self.tx_used as u8);
        packet.extend_from_slice(&encoded);
        packet.extend_from_slice(&self.crc.checksum_to_bytes(checksum));

        trace!(
            "sending {} payload byte(s) as a {}-byte packet",
            self.tx_used,
            packet.len()
        );
        self.device.write(&packet)?;
        self.reset_transmission_buffer();
        Ok(true)
    }

    /// Receives one packet, verifies it, and decodes its payload into the
    /// reception buffer.
    ///
    /// Returns `Ok(true)` when a packet was received and decoded, and
    /// `Ok(false)` when there was nothing to receive — too few buffered
    /// bytes to hold a packet, or only line noise without a start byte.
    /// Protocol violations, checksum failures, and inter-byte timeouts are
    /// errors; they clear the in-flight reception state but leave the
    /// transport ready for the next packet.
    pub fn receive_data(&mut self) -> Result<bool, TransportError> {
        self.reset_reception_buffer();

        // Noise gate: do not start parsing until enough bytes exist to
        // plausibly hold the smallest packet.
        if !self.bytes_available(self.min_packet_size, Duration::ZERO)? {
            return Ok(false);
        }

        for _ in 0..MAX_PARSER_CALLS {
            let input = std::mem::take(&mut self.leftover);
            match self.parser.consume(&input) {
                Ok((progress, consumed)) => {
                    // Unconsumed bytes belong to the next packet.
                    self.leftover = input[consumed..].to_vec();
                    match progress {
                        ParseProgress::Complete => return self.validate_packet(),
                        ParseProgress::NoStart => {
                            trace!("discarded {consumed} noise byte(s); no packet");
                            return Ok(false);
                        }
                        ParseProgress::AwaitingSize => {
                            // The packet length is unknown until the size
                            // byte arrives; wait for enough bytes to cover
                            // the smallest possible remainder.
                            if !self.bytes_available(self.min_packet_size - 1, self.timeout)? {
                                self.abort_reception();
                                return Err(TransportError::SizeTimeout {
                                    timeout_us: self.config.timeout_us,
                                });
                            }
                        }
                        ParseProgress::AwaitingBody { missing } => {
                            if !self.bytes_available(missing, self.timeout)? {
                                self.abort_reception();
                                return Err(TransportError::BodyTimeout {
                                    missing,
                                    timeout_us: self.config.timeout_us,
                                });
                            }
                        }
                        ParseProgress::AwaitingCrc { missing } => {
                            if !self.bytes_available(missing, self.timeout)? {
                                self.abort_reception();
                                return Err(TransportError::CrcTimeout {
                                    missing,
                                    timeout_us: self.config.timeout_us,
                                });
                            }
                        }
                    }
                }
                Err(error) => {
                    debug!("packet parsing failed: {error}");
                    self.abort_reception();
                    return Err(error.into());
                }
            }
        }

        // Every partial progress blocks until the exact outstanding byte
        // count is buffered, so the third invocation always settles.
        unreachable!("a packet settles within {MAX_PARSER_CALLS} parser invocations");
    }

    /// Verifies the accumulated `[encoded payload ∥ CRC]` and decodes the
    /// payload into the reception buffer.
    fn validate_packet(&mut self) -> Result<bool, TransportError> {
        let packet = self.parser.finish();
        let split = packet.len() - self.crc.byte_length();

        // Checksumming the encoded payload together with its appended CRC
        // yields zero for an intact packet, so corruption is detected
        // without deserializing the postamble first.
        if self.crc.checksum(&packet) != 0 {
            self.abort_reception();
            let received = self.crc.bytes_to_checksum(&packet[split..])?;
            let expected = self.crc.checksum(&packet[..split]);
            debug!("packet failed CRC verification: got {received:#x}, expected {expected:#x}");
            return Err(TransportError::CrcMismatch { received, expected });
        }

        let payload = match cobs::decode_payload(&packet[..split], self.config.delimiter_byte) {
            Ok(payload) => payload,
            Err(error) => {
                self.abort_reception();
                return Err(error.into());
            }
        };

        self.rx_buffer[..payload.len()].copy_from_slice(&payload);
        self.rx_used = payload.len();
        debug!("received a {} byte payload", payload.len());
        Ok(true)
    }

    /// Drops all in-flight reception state after a terminal error. The
    /// staged transmission payload is deliberately preserved.
    fn abort_reception(&mut self) {
        self.parser.reset();
        self.leftover.clear();
        self.rx_used = 0;
    }

    /// Blocks until `required` unprocessed bytes are buffered, or `timeout`
    /// passes without the device receiving anything new.
    ///
    /// All bytes the device has on hand are drained into the leftover
    /// buffer in one read, keeping the number of device calls low. The
    /// timeout is an inter-byte deadline: it restarts whenever the device's
    /// available count grows, so a slowly trickling packet is not cut off
    /// mid-reception.
    fn bytes_available(
        &mut self,
        required: usize,
        timeout: Duration,
    ) -> Result<bool, TransportError> {
        if self.leftover.len() >= required {
            return Ok(true);
        }

        let mut last_progress = Instant::now();
        let mut previously_waiting = 0usize;
        loop {
            let waiting = self.device.available()?;
            if self.leftover.len() + waiting >= required {
                let bytes = self.device.read(waiting)?;
                self.leftover.extend_from_slice(&bytes);
                return Ok(true);
            }
            if waiting > previously_waiting {
                previously_waiting = waiting;
                last_progress = Instant::now();
            }
            if last_progress.elapsed() >= timeout {
                return Ok(false);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockHandle, MockSerial};
    use tether_core::crc::CrcWidth;

    fn transport_pair(config: TransportConfig) -> (Transport<MockSerial>, MockHandle) {
        let (device, handle) = MockSerial::pair();
        let transport = Transport::new(config, device).unwrap();
        (transport, handle)
    }

    fn default_pair() -> (Transport<MockSerial>, MockHandle) {
        transport_pair(TransportConfig::default())
    }

    /// Reference CRC-16/CCITT-FALSE engine matching the default config.
    fn reference_crc() -> CrcEngine {
        CrcEngine::new(CrcWidth::Bits16, 0x1021, 0xFFFF, 0x0000).unwrap()
    }

    #[test]
    fn sends_the_documented_minimal_frame() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x2Au8, None).unwrap();
        assert!(transport.send_data().unwrap());

        let crc = reference_crc();
        let checksum = crc.checksum(&[0x02, 0x2A, 0x00]);
        let mut expected = vec![0x81, 0x01, 0x02, 0x2A, 0x00];
        expected.extend_from_slice(&crc.checksum_to_bytes(checksum));

        assert_eq!(handle.take_transmitted(), expected);
        assert_eq!(transport.bytes_in_transmission_buffer(), 0);
    }

    #[test]
    fn receives_its_own_minimal_frame() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x2Au8, None).unwrap();
        transport.send_data().unwrap();
        handle.inject(&handle.take_transmitted());

        assert!(transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 1);
        assert_eq!(transport.reception_buffer()[0], 0x2A);

        let (value, end) = transport.read_data(0u8, 0).unwrap();
        assert_eq!(value, 0x2A);
        assert_eq!(end, 1);
    }

    #[test]
    fn overwrites_do_not_shrink_the_staged_payload() {
        let (mut transport, _handle) = default_pair();
        transport.write_data(&[1u8, 2, 3, 4], None).unwrap();
        assert_eq!(transport.bytes_in_transmission_buffer(), 4);

        let end = transport.write_data(&9u8, Some(1)).unwrap();
        assert_eq!(end, 2);
        assert_eq!(transport.bytes_in_transmission_buffer(), 4);
        assert_eq!(&transport.transmission_buffer()[..4], &[1, 9, 3, 4]);
    }

    #[test]
    fn staging_is_bounded_by_the_configured_payload_limit() {
        let config = TransportConfig {
            max_tx_payload: 8,
            ..TransportConfig::default()
        };
        let (mut transport, _handle) = transport_pair(config);
        transport.write_data(&[0u8; 8], None).unwrap();
        assert!(matches!(
            transport.write_data(&1u8, None),
            Err(TransportError::Serialize(
                SerializeError::InsufficientSpace { .. }
            ))
        ));
        assert_eq!(transport.bytes_in_transmission_buffer(), 8);
    }

    #[test]
    fn reading_does_not_consume_the_payload() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x1122_3344u32, None).unwrap();
        transport.send_data().unwrap();
        handle.inject(&handle.take_transmitted());
        transport.receive_data().unwrap();

        for _ in 0..3 {
            let (value, _) = transport.read_data(0u32, 0).unwrap();
            assert_eq!(value, 0x1122_3344);
            assert_eq!(transport.bytes_in_reception_buffer(), 4);
        }
    }

    #[test]
    fn reading_past_the_payload_is_rejected() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&7u8, None).unwrap();
        transport.send_data().unwrap();
        handle.inject(&handle.take_transmitted());
        transport.receive_data().unwrap();

        assert!(matches!(
            transport.read_data(0u16, 0),
            Err(TransportError::Serialize(
                SerializeError::InsufficientData { .. }
            ))
        ));
    }

    #[test]
    fn returns_no_packet_when_the_line_is_silent() {
        let (mut transport, _handle) = default_pair();
        assert!(!transport.receive_data().unwrap());
    }

    #[test]
    fn noise_without_a_start_byte_is_discarded_silently() {
        let (mut transport, handle) = default_pair();
        handle.inject(&[0xFF, 0x00, 0x7E, 0x55, 0x13, 0x37, 0x99]);
        assert!(!transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 0);
        assert_eq!(handle.pending(), 0);

        // The transport stays usable: a real packet parses afterwards.
        transport.write_data(&0x2Au8, None).unwrap();
        transport.send_data().unwrap();
        handle.inject(&handle.take_transmitted());
        assert!(transport.receive_data().unwrap());
    }

    #[test]
    fn noise_before_a_packet_is_skipped() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x2Au8, None).unwrap();
        transport.send_data().unwrap();

        handle.inject(&[0xFF, 0x00, 0x7E]);
        handle.inject(&handle.take_transmitted());
        assert!(transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 1);
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn missing_start_byte_is_an_error_when_configured() {
        let config = TransportConfig {
            allow_start_byte_errors: true,
            ..TransportConfig::default()
        };
        let (mut transport, handle) = transport_pair(config);
        handle.inject(&[0xFF, 0x00, 0x7E, 0x55, 0x13, 0x37, 0x99]);
        assert!(matches!(
            transport.receive_data(),
            Err(TransportError::Parse(ParseError::StartMissing))
        ));
    }

    #[test]
    fn back_to_back_packets_are_received_in_order() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x2Au8, None).unwrap();
        transport.send_data().unwrap();
        transport.write_data(&[1u8, 2, 3, 4, 5], None).unwrap();
        transport.send_data().unwrap();
        handle.inject(&handle.take_transmitted());

        assert!(transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 1);
        assert_eq!(transport.reception_buffer()[0], 0x2A);

        assert!(transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 5);
        assert_eq!(&transport.reception_buffer()[..5], &[1, 2, 3, 4, 5]);
        assert!(transport.leftover.is_empty());
    }

    #[test]
    fn corrupted_packets_fail_the_checksum() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&0x2Au8, None).unwrap();
        transport.send_data().unwrap();
        let mut frame = handle.take_transmitted();

        // Flip one bit inside the encoded-payload region.
        frame[3] ^= 0x08;
        handle.inject(&frame);

        match transport.receive_data() {
            Err(TransportError::CrcMismatch { received, expected }) => {
                assert_ne!(received, expected);
            }
            other => panic!("expected a CRC mismatch, got {other:?}"),
        }
        assert_eq!(transport.bytes_in_reception_buffer(), 0);
        assert!(transport.leftover.is_empty());
    }

    #[test]
    fn bad_declared_size_is_rejected() {
        let (mut transport, handle) = default_pair();
        handle.inject(&[0x81, 0x00, 1, 2, 3, 4, 5]);
        assert!(matches!(
            transport.receive_data(),
            Err(TransportError::Parse(ParseError::BadSize {
                declared: 0,
                ..
            }))
        ));
        assert!(transport.leftover.is_empty());
    }

    #[test]
    fn stalled_size_byte_times_out() {
        let config = TransportConfig {
            timeout_us: 1_000,
            ..TransportConfig::default()
        };
        let (mut transport, handle) = transport_pair(config);
        // Enough noise to pass the admission gate, ending on the start byte.
        handle.inject(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x81]);
        assert!(matches!(
            transport.receive_data(),
            Err(TransportError::SizeTimeout { timeout_us: 1_000 })
        ));
        assert!(transport.leftover.is_empty());
    }

    #[test]
    fn stalled_body_times_out() {
        let config = TransportConfig {
            timeout_us: 1_000,
            ..TransportConfig::default()
        };
        let (mut transport, handle) = transport_pair(config);
        // Start + size(5) + two body bytes, padded to pass the gate.
        handle.inject(&[0xFF, 0xFF, 0xFF, 0x81, 0x05, 0x06, 0x01]);
        assert!(matches!(
            transport.receive_data(),
            Err(TransportError::BodyTimeout { missing: 7, .. })
        ));
    }

    #[test]
    fn stalled_postamble_times_out() {
        let config = TransportConfig {
            timeout_us: 1_000,
            ..TransportConfig::default()
        };
        let (mut transport, handle) = transport_pair(config);
        // Complete encoded body for payload [0x2A], no CRC bytes.
        handle.inject(&[0xFF, 0xFF, 0x81, 0x01, 0x02, 0x2A, 0x00]);
        assert!(matches!(
            transport.receive_data(),
            Err(TransportError::CrcTimeout { missing: 2, .. })
        ));
    }

    #[test]
    fn errors_preserve_the_staged_transmission_payload() {
        let (mut transport, handle) = default_pair();
        transport.write_data(&[9u8, 8, 7], None).unwrap();

        handle.inject(&[0x81, 0x00, 1, 2, 3, 4, 5]);
        assert!(transport.receive_data().is_err());
        assert_eq!(transport.bytes_in_transmission_buffer(), 3);
        assert_eq!(&transport.transmission_buffer()[..3], &[9, 8, 7]);
    }

    #[test]
    fn sending_an_empty_payload_is_rejected() {
        let (mut transport, _handle) = default_pair();
        assert!(matches!(
            transport.send_data(),
            Err(TransportError::Cobs(CobsError::PayloadEmpty))
        ));
    }

    #[test]
    fn available_reflects_the_admission_threshold() {
        let (mut transport, handle) = default_pair();
        assert!(!transport.available().unwrap());
        handle.inject(&[0u8; 6]);
        assert!(!transport.available().unwrap());
        handle.inject(&[0u8; 1]);
        assert!(transport.available().unwrap());
    }
}
