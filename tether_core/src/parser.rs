//! Resumable packet parser: locates packets inside an unsynchronized,
//! arbitrarily fragmented byte stream.
//!
//! A packet on the wire is `[START][SIZE][COBS(payload)][CRC]`, where the
//! last byte of the COBS region is the delimiter. The parser walks four
//! stages — start byte, size byte, encoded body, CRC postamble — and can
//! stop between any two bytes when its input runs dry, carrying its state
//! into the next [`PacketParser::consume`] call. Timing (waiting for more
//! bytes) is the caller's concern; the parser itself never blocks.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::config::TransportConfig;

/// Outcome of a [`PacketParser::consume`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseProgress {
    /// The encoded body and CRC postamble are fully accumulated; collect
    /// them with [`PacketParser::finish`].
    Complete,
    /// All input was consumed as noise without locating the start byte.
    NoStart,
    /// The start byte was consumed, but the size byte has not arrived.
    AwaitingSize,
    /// The size byte resolved; `missing` more bytes complete the packet.
    AwaitingBody { missing: usize },
    /// The encoded body is in; `missing` CRC bytes are outstanding.
    AwaitingCrc { missing: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No start byte among the available bytes. Only raised when the
    /// transport is configured to treat missing starts as errors; the
    /// default is the silent [`ParseProgress::NoStart`].
    StartMissing,
    /// The declared payload size is outside the configured bounds.
    BadSize {
        declared: u8,
        minimum: u8,
        maximum: u8,
    },
    /// The delimiter appeared inside the encoded body, before its final
    /// byte. `index` is the offset within the encoded region.
    DelimiterEarly { index: usize },
    /// The final byte of the encoded body was not the delimiter.
    DelimiterMissing { found: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::StartMissing => {
                write!(f, "start byte not found among the available bytes")
            }
            ParseError::BadSize {
                declared,
                minimum,
                maximum,
            } => write!(
                f,
                "declared payload size {declared} is outside the expected bounds ({minimum} to {maximum})"
            ),
            ParseError::DelimiterEarly { index } => write!(
                f,
                "delimiter encountered at encoded-payload byte {index}, before the end of the packet"
            ),
            ParseError::DelimiterMissing { found } => write!(
                f,
                "expected the delimiter as the last encoded-payload byte, found {found:#04x}"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Four-stage packet accumulator with carry-state between calls.
///
/// The internal buffer is sized to the encoded-payload region plus the CRC
/// postamble as soon as the size byte resolves; `filled` tracks how much of
/// it later calls have populated.
pub struct PacketParser {
    start_byte: u8,
    delimiter_byte: u8,
    min_payload_size: u8,
    max_payload_size: u8,
    postamble_size: usize,
    allow_start_byte_errors: bool,

    start_found: bool,
    packet: Vec<u8>,
    filled: usize,
}

impl PacketParser {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            start_byte: config.start_byte,
            delimiter_byte: config.delimiter_byte,
            min_payload_size: config.min_rx_payload,
            max_payload_size: crate::cobs::MAX_PAYLOAD_SIZE as u8,
            postamble_size: config.postamble_size(),
            allow_start_byte_errors: config.allow_start_byte_errors,
            start_found: false,
            packet: Vec::new(),
            filled: 0,
        }
    }

    /// True while a partially accumulated packet is carried between calls.
    pub fn in_flight(&self) -> bool {
        self.start_found
    }

    /// Discards any partially accumulated packet.
    pub fn reset(&mut self) {
        self.start_found = false;
        self.packet = Vec::new();
        self.filled = 0;
    }

    /// Returns the accumulated `[encoded payload ∥ CRC]` bytes and resets
    /// the parser for the next packet.
    ///
    /// Call only after [`consume`](Self::consume) reported
    /// [`ParseProgress::Complete`].
    pub fn finish(&mut self) -> Vec<u8> {
        debug_assert!(self.start_found && self.filled == self.packet.len());
        self.start_found = false;
        self.filled = 0;
        core::mem::take(&mut self.packet)
    }

    /// Advances the parser with `input`, returning the progress made and
    /// the number of input bytes consumed.
    ///
    /// Bytes past the returned count were not examined and belong to the
    /// caller (typically the next packet). On an error the caller must
    /// [`reset`](Self::reset) before feeding further bytes.
    pub fn consume(&mut self, input: &[u8]) -> Result<(ParseProgress, usize), ParseError> {
        let total = input.len();
        let mut processed = 0usize;

        // Stage 1: scan for the start byte, discarding noise.
        if !self.start_found {
            while processed < total {
                let byte = input[processed];
                processed += 1;
                if byte == self.start_byte {
                    self.start_found = true;
                    break;
                }
            }
            if !self.start_found {
                if self.allow_start_byte_errors {
                    return Err(ParseError::StartMissing);
                }
                return Ok((ParseProgress::NoStart, processed));
            }
            if processed == total {
                return Ok((ParseProgress::AwaitingSize, processed));
            }
        }

        // Stage 2: one byte declares the unencoded payload length, which
        // fixes the size of everything that follows.
        if self.packet.is_empty() {
            if processed == total {
                return Ok((ParseProgress::AwaitingSize, processed));
            }
            let declared = input[processed];
            processed += 1;
            if declared < self.min_payload_size || declared > self.max_payload_size {
                return Err(ParseError::BadSize {
                    declared,
                    minimum: self.min_payload_size,
                    maximum: self.max_payload_size,
                });
            }
            // COBS adds the overhead and delimiter bytes on top of the
            // declared payload length; the postamble follows the body.
            let body_size = declared as usize + 2;
            self.packet = vec![0u8; body_size + self.postamble_size];
            self.filled = 0;
            if processed == total {
                return Ok((
                    ParseProgress::AwaitingBody {
                        missing: self.packet.len(),
                    },
                    processed,
                ));
            }
        }

        // Stage 3: accumulate the encoded body. The delimiter must appear
        // exactly once, as the region's final byte.
        let body_size = self.packet.len() - self.postamble_size;
        while self.filled < body_size {
            if processed == total {
                return Ok((
                    ParseProgress::AwaitingBody {
                        missing: self.packet.len() - self.filled,
                    },
                    processed,
                ));
            }
            let byte = input[processed];
            processed += 1;
            self.packet[self.filled] = byte;
            self.filled += 1;
            if byte == self.delimiter_byte {
                if self.filled < body_size {
                    return Err(ParseError::DelimiterEarly {
                        index: self.filled - 1,
                    });
                }
            } else if self.filled == body_size {
                return Err(ParseError::DelimiterMissing { found: byte });
            }
        }

        // Stage 4: accumulate the CRC postamble.
        while self.filled < self.packet.len() {
            if processed == total {
                return Ok((
                    ParseProgress::AwaitingCrc {
                        missing: self.packet.len() - self.filled,
                    },
                    processed,
                ));
            }
            self.packet[self.filled] = input[processed];
            processed += 1;
            self.filled += 1;
        }

        Ok((ParseProgress::Complete, processed))
    }
}
