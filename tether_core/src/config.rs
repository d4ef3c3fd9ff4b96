use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cobs;
use crate::crc::CrcWidth;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The start and delimiter bytes must differ, or the parser could not
    /// tell a packet boundary from a packet beginning.
    StartEqualsDelimiter { value: u8 },
    /// A payload bound is outside the 1 to 254 range imposed by COBS.
    BadPayloadBounds {
        max_tx_payload: u8,
        min_rx_payload: u8,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::StartEqualsDelimiter { value } => write!(
                f,
                "start byte and delimiter byte are both {value:#04x}; they must differ"
            ),
            ConfigError::BadPayloadBounds {
                max_tx_payload,
                min_rx_payload,
            } => write!(
                f,
                "payload bounds (max tx {max_tx_payload}, min rx {min_rx_payload}) must lie between 1 and {}",
                cobs::MAX_PAYLOAD_SIZE
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Protocol parameters shared by both ends of the link.
///
/// Every field except `timeout_us` and `allow_start_byte_errors` must match
/// the configuration compiled into the connected microcontroller, or neither
/// side will parse the other's packets. Immutable once handed to the
/// transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Byte value marking the beginning of every packet.
    pub start_byte: u8,
    /// Byte value marking the end of the COBS-encoded region. Zero is the
    /// conventional choice; any value different from `start_byte` works.
    pub delimiter_byte: u8,
    /// Byte-width of the CRC checksum postamble.
    pub crc_width: CrcWidth,
    /// Non-reflected CRC polynomial, e.g. `0x1021` for CCITT variants.
    pub polynomial: u32,
    /// Value the CRC register starts from.
    pub initial_crc: u32,
    /// Value XOR-ed into the checksum after the last input byte.
    pub final_crc_xor: u32,
    /// Largest payload this side will stage for transmission, 1 to 254.
    pub max_tx_payload: u8,
    /// Smallest payload the microcontroller is expected to send, 1 to 254.
    /// Used to gate reception attempts, not to reject short noise early.
    pub min_rx_payload: u8,
    /// Longest permitted gap between two consecutive bytes of one packet,
    /// in microseconds.
    pub timeout_us: u32,
    /// Whether an absent start byte is reported as an error instead of
    /// being silently treated as line noise.
    pub allow_start_byte_errors: bool,
}

impl Default for TransportConfig {
    /// CRC-16/CCITT-FALSE over the full payload range with a 20 ms
    /// inter-byte timeout.
    fn default() -> Self {
        Self {
            start_byte: 129,
            delimiter_byte: 0,
            crc_width: CrcWidth::Bits16,
            polynomial: 0x1021,
            initial_crc: 0xFFFF,
            final_crc_xor: 0x0000,
            max_tx_payload: cobs::MAX_PAYLOAD_SIZE as u8,
            min_rx_payload: 1,
            timeout_us: 20_000,
            allow_start_byte_errors: false,
        }
    }
}

impl TransportConfig {
    /// Checks the framing parameters. CRC parameter widths are validated
    /// separately when the engine is built from this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_byte == self.delimiter_byte {
            return Err(ConfigError::StartEqualsDelimiter {
                value: self.start_byte,
            });
        }
        let bounds = 1..=cobs::MAX_PAYLOAD_SIZE as u8;
        if !bounds.contains(&self.max_tx_payload) || !bounds.contains(&self.min_rx_payload) {
            return Err(ConfigError::BadPayloadBounds {
                max_tx_payload: self.max_tx_payload,
                min_rx_payload: self.min_rx_payload,
            });
        }
        Ok(())
    }

    /// Byte-size of the CRC postamble.
    pub fn postamble_size(&self) -> usize {
        self.crc_width.byte_length()
    }

    /// Smallest byte count that can hold a complete packet: start byte,
    /// size byte, COBS overhead, the minimum payload, the delimiter, and
    /// the CRC postamble.
    pub fn min_packet_size(&self) -> usize {
        self.min_rx_payload as usize + 4 + self.postamble_size()
    }
}
