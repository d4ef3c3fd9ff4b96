use alloc::vec::Vec;
use core::fmt;

/// Largest payload COBS can frame with a single overhead byte.
///
/// The overhead byte stores the distance to the next eliminated delimiter as a
/// u8, so it can bridge at most 255 positions; together with the trailing
/// delimiter this caps the encoded packet at 256 bytes and the payload at 254.
pub const MAX_PAYLOAD_SIZE: usize = 254;

/// Smallest valid encoded packet: overhead byte + one payload byte + delimiter.
pub const MIN_PACKET_SIZE: usize = 3;

/// Largest valid encoded packet: overhead byte + 254 payload bytes + delimiter.
pub const MAX_PACKET_SIZE: usize = MAX_PAYLOAD_SIZE + 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CobsError {
    /// Encoding was requested for a zero-length payload.
    PayloadEmpty,
    /// Encoding was requested for a payload longer than [`MAX_PAYLOAD_SIZE`].
    PayloadTooLarge { size: usize },
    /// Decoding was requested for a packet shorter than [`MIN_PACKET_SIZE`].
    PacketTooSmall { size: usize },
    /// Decoding was requested for a packet longer than [`MAX_PACKET_SIZE`].
    PacketTooLarge { size: usize },
    /// An unencoded delimiter value was found before the end of the packet.
    DelimiterEarly { index: usize },
    /// The jump chain did not terminate on the delimiter at the packet's end.
    DelimiterMissing,
}

impl fmt::Display for CobsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CobsError::PayloadEmpty => write!(f, "cannot COBS-encode an empty payload"),
            CobsError::PayloadTooLarge { size } => write!(
                f,
                "payload of {size} bytes exceeds the COBS limit of {MAX_PAYLOAD_SIZE} bytes"
            ),
            CobsError::PacketTooSmall { size } => write!(
                f,
                "packet of {size} bytes is below the minimum encoded size of {MIN_PACKET_SIZE} bytes"
            ),
            CobsError::PacketTooLarge { size } => write!(
                f,
                "packet of {size} bytes exceeds the maximum encoded size of {MAX_PACKET_SIZE} bytes"
            ),
            CobsError::DelimiterEarly { index } => write!(
                f,
                "delimiter value encountered at byte {index}, before the end of the packet"
            ),
            CobsError::DelimiterMissing => {
                write!(f, "packet does not terminate with the delimiter byte")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CobsError {}

/// Encodes `payload` so that no byte of the result except the final one equals
/// `delimiter`.
///
/// The returned packet is `payload.len() + 2` bytes: an overhead byte, the
/// payload with every delimiter occurrence replaced by the distance to the
/// next replaced occurrence, and the single unencoded delimiter at the tail.
pub fn encode_payload(payload: &[u8], delimiter: u8) -> Result<Vec<u8>, CobsError> {
    if payload.is_empty() {
        return Err(CobsError::PayloadEmpty);
    }
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CobsError::PayloadTooLarge { size: payload.len() });
    }

    let size = payload.len();
    let mut packet = Vec::with_capacity(size + 2);
    packet.push(0); // overhead byte, patched below
    packet.extend_from_slice(payload);
    packet.push(delimiter);

    // Walk the payload back-to-front, replacing each delimiter occurrence with
    // the distance to the previously seen one. `next` always points at the
    // nearest delimiter-or-replacement ahead of the cursor, starting at the
    // trailing delimiter itself.
    let mut next = size + 1;
    for index in (1..=size).rev() {
        if packet[index] == delimiter {
            packet[index] = (next - index) as u8;
            next = index;
        }
    }
    packet[0] = next as u8;

    Ok(packet)
}

/// Decodes a packet produced by [`encode_payload`], restoring every replaced
/// delimiter occurrence.
///
/// Returns the `packet.len() - 2` payload bytes. The jump chain starting at
/// the overhead byte must land exactly on the trailing delimiter; anything
/// else means the packet was corrupted or framed with a different delimiter.
pub fn decode_payload(packet: &[u8], delimiter: u8) -> Result<Vec<u8>, CobsError> {
    if packet.len() < MIN_PACKET_SIZE {
        return Err(CobsError::PacketTooSmall { size: packet.len() });
    }
    if packet.len() > MAX_PACKET_SIZE {
        return Err(CobsError::PacketTooLarge { size: packet.len() });
    }

    let size = packet.len();
    let mut decoded = packet.to_vec();

    let mut read = 0usize;
    let mut step = decoded[0] as usize;
    loop {
        read += step;
        if read >= size {
            return Err(CobsError::DelimiterMissing);
        }
        if decoded[read] == delimiter {
            if read == size - 1 {
                break;
            }
            return Err(CobsError::DelimiterEarly { index: read });
        }
        step = decoded[read] as usize;
        decoded[read] = delimiter;
        // A zero jump only appears in corrupted packets (encoding always
        // produces distances of at least 1); following it would never
        // advance past this byte.
        if step == 0 {
            return Err(CobsError::DelimiterMissing);
        }
    }

    decoded.truncate(size - 1);
    decoded.remove(0);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn encode_without_delimiter_occurrences() {
        let packet = encode_payload(&[1, 2, 3, 4, 5], 0).unwrap();
        assert_eq!(packet, vec![6, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn encode_replaces_delimiter_occurrences() {
        // Delimiters at payload indices 1 and 3 become jump distances.
        let packet = encode_payload(&[10, 0, 20, 0, 30], 0).unwrap();
        assert_eq!(packet, vec![2, 10, 2, 20, 2, 30, 0]);
    }

    #[test]
    fn encode_with_nonzero_delimiter() {
        let packet = encode_payload(&[7, 1, 7], 7).unwrap();
        assert_eq!(packet, vec![1, 2, 1, 1, 7]);
        assert!(!packet[..packet.len() - 1].contains(&7));
    }

    #[test]
    fn decode_restores_payload() {
        let packet = vec![2, 10, 2, 20, 2, 30, 0];
        assert_eq!(decode_payload(&packet, 0).unwrap(), vec![10, 0, 20, 0, 30]);
    }

    #[test]
    fn round_trip_boundary_lengths() {
        for len in [1usize, 2, 253, 254] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let packet = encode_payload(&payload, 0).unwrap();
            assert_eq!(packet.len(), len + 2);
            assert_eq!(decode_payload(&packet, 0).unwrap(), payload);
        }
    }

    #[test]
    fn round_trip_all_delimiter_payload() {
        let payload = [0u8; 254];
        let packet = encode_payload(&payload, 0).unwrap();
        assert!(!packet[..packet.len() - 1].contains(&0));
        assert_eq!(packet[packet.len() - 1], 0);
        assert_eq!(decode_payload(&packet, 0).unwrap(), payload.to_vec());
    }

    #[test]
    fn encoded_region_never_aliases_delimiter() {
        // Jump distances can collide with nonzero delimiter values, which is
        // why zero is the conventional delimiter; these payload/delimiter
        // combinations keep every distance clear of the delimiter.
        for delimiter in [0u8, 1, 129, 255] {
            let payload: Vec<u8> = (0..100u8).collect();
            let packet = encode_payload(&payload, delimiter).unwrap();
            assert!(!packet[..packet.len() - 1].contains(&delimiter));
            assert_eq!(*packet.last().unwrap(), delimiter);
        }
    }

    #[test]
    fn encode_rejects_empty_payload() {
        assert_eq!(encode_payload(&[], 0), Err(CobsError::PayloadEmpty));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = [0u8; 255];
        assert_eq!(
            encode_payload(&payload, 0),
            Err(CobsError::PayloadTooLarge { size: 255 })
        );
    }

    #[test]
    fn decode_rejects_undersized_packet() {
        assert_eq!(
            decode_payload(&[1, 0], 0),
            Err(CobsError::PacketTooSmall { size: 2 })
        );
    }

    #[test]
    fn decode_rejects_oversized_packet() {
        let packet = [1u8; 257];
        assert_eq!(
            decode_payload(&packet, 0),
            Err(CobsError::PacketTooLarge { size: 257 })
        );
    }

    #[test]
    fn decode_detects_early_delimiter() {
        // Corrupt a replaced occurrence so the jump chain lands on a raw
        // delimiter mid-packet.
        let mut packet = encode_payload(&[10, 0, 20, 0, 30], 0).unwrap();
        packet[2] = 0;
        assert_eq!(
            decode_payload(&packet, 0),
            Err(CobsError::DelimiterEarly { index: 2 })
        );
    }

    #[test]
    fn decode_detects_missing_delimiter() {
        let mut packet = encode_payload(&[1, 2, 3], 0).unwrap();
        let last = packet.len() - 1;
        packet[last] = 9;
        assert_eq!(decode_payload(&packet, 0), Err(CobsError::DelimiterMissing));
    }

    #[test]
    fn decode_survives_zero_jump_corruption() {
        // With a nonzero delimiter a corrupted zero jump must not hang.
        let mut packet = encode_payload(&[7, 1, 7], 7).unwrap();
        packet[0] = 0;
        assert_eq!(decode_payload(&packet, 7), Err(CobsError::DelimiterMissing));
    }
}
