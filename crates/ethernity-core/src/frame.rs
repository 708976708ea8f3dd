//! Frame binary layout (`spec.md` §3, §4.6, §6.2).

use ethernity_codecs::{crc32_ieee, read_uvarint};

use crate::constants::{DOC_ID_LEN, FRAME_MAGIC, FRAME_VERSION};
use crate::error::FrameError;

/// What kind of frame this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// One chunk of the reassembled ciphertext.
    Main,
    /// A signed attestation binding `doc_id` and the ciphertext's document
    /// hash to a signing public key.
    Auth,
    /// One share of a Shamir-split secret.
    Key,
}

impl FrameType {
    fn from_byte(byte: u8) -> Result<Self, FrameError> {
        match byte {
            0 => Ok(Self::Main),
            1 => Ok(Self::Auth),
            2 => Ok(Self::Key),
            other => Err(FrameError::UnknownFrameType(other)),
        }
    }
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame schema version.
    pub version: u8,
    /// Which kind of frame this is.
    pub frame_type: FrameType,
    /// 16-byte document identity.
    pub doc_id: [u8; DOC_ID_LEN],
    /// This frame's index within the document.
    pub index: u32,
    /// Declared total frame count for the document.
    pub total: u32,
    /// The frame's payload bytes.
    pub data: Vec<u8>,
}

/// Decode one frame from a raw byte block (already extracted from printed
/// text by [`ethernity_codecs::decode_frame_blocks`]).
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    if bytes.len() < 4 {
        return Err(FrameError::Truncated);
    }
    let (crc_region, trailer) = bytes.split_at(bytes.len() - 4);
    let expected_crc = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual_crc = crc32_ieee(crc_region);
    if actual_crc != expected_crc {
        return Err(FrameError::CrcMismatch);
    }

    let mut pos = 0usize;

    if crc_region.len() < 2 || crc_region[0..2] != FRAME_MAGIC {
        return Err(FrameError::BadMagic);
    }
    pos += 2;

    let (version, consumed) = read_uvarint(&crc_region[pos..])?;
    pos += consumed;
    if version != FRAME_VERSION {
        return Err(FrameError::UnsupportedVersion(version));
    }

    let type_byte = *crc_region.get(pos).ok_or(FrameError::Truncated)?;
    pos += 1;
    let frame_type = FrameType::from_byte(type_byte)?;

    let doc_id_slice = crc_region.get(pos..pos + DOC_ID_LEN).ok_or(FrameError::Truncated)?;
    let mut doc_id = [0u8; DOC_ID_LEN];
    doc_id.copy_from_slice(doc_id_slice);
    pos += DOC_ID_LEN;

    let (index, consumed) = read_uvarint(&crc_region[pos..])?;
    pos += consumed;
    let (total, consumed) = read_uvarint(&crc_region[pos..])?;
    pos += consumed;

    let index = u32::try_from(index).map_err(|_| FrameError::InvalidIndexTotal {
        index: u32::MAX,
        total: u32::try_from(total).unwrap_or(u32::MAX),
    })?;
    let total = u32::try_from(total)
        .map_err(|_| FrameError::InvalidIndexTotal { index, total: u32::MAX })?;

    validate_index_total(frame_type, index, total)?;

    let (data_len, consumed) = read_uvarint(&crc_region[pos..])?;
    pos += consumed;
    let data_len = usize::try_from(data_len).map_err(|_| FrameError::Truncated)?;

    let data = crc_region.get(pos..pos + data_len).ok_or(FrameError::Truncated)?.to_vec();
    pos += data_len;

    if pos != crc_region.len() {
        return Err(FrameError::TrailingBytes(crc_region.len() - pos));
    }

    Ok(Frame { version: version as u8, frame_type, doc_id, index, total, data })
}

fn validate_index_total(frame_type: FrameType, index: u32, total: u32) -> Result<(), FrameError> {
    if index >= total {
        return Err(FrameError::InvalidIndexTotal { index, total });
    }
    if !matches!(frame_type, FrameType::Main) && (total != 1 || index != 0) {
        return Err(FrameError::InvalidIndexTotal { index, total });
    }
    Ok(())
}

/// Encode a frame back to its binary layout. Production code never calls
/// this (frame encoding is out of scope, `spec.md` §1); it exists purely
/// so test fixtures can build realistic frame bytes.
#[cfg(any(test, feature = "test-support"))]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&FRAME_MAGIC);
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(u64::from(frame.version)));
    out.push(match frame.frame_type {
        FrameType::Main => 0,
        FrameType::Auth => 1,
        FrameType::Key => 2,
    });
    out.extend_from_slice(&frame.doc_id);
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(u64::from(frame.index)));
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(u64::from(frame.total)));
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(frame.data.len() as u64));
    out.extend_from_slice(&frame.data);
    let crc = crc32_ieee(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame {
            version: 1,
            frame_type: FrameType::Main,
            doc_id: [0x42; DOC_ID_LEN],
            index: 0,
            total: 2,
            data: b"chunk one".to_vec(),
        }
    }

    #[test]
    fn round_trips_through_encode_decode() {
        let frame = sample_frame();
        let bytes = encode_frame(&frame);
        let decoded = decode_frame(&bytes).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_frame(&sample_frame());
        bytes[0] ^= 0xFF;
        let crc_region_len = bytes.len() - 4;
        let crc = crc32_ieee(&bytes[..crc_region_len]);
        bytes[crc_region_len..].copy_from_slice(&crc.to_be_bytes());
        assert!(matches!(decode_frame(&bytes), Err(FrameError::BadMagic)));
    }

    #[test]
    fn rejects_crc_mismatch() {
        let mut bytes = encode_frame(&sample_frame());
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(decode_frame(&bytes), Err(FrameError::CrcMismatch)));
    }

    #[test]
    fn rejects_index_greater_or_equal_total() {
        let mut frame = sample_frame();
        frame.index = 2;
        frame.total = 2;
        let bytes = encode_frame(&frame);
        assert!(matches!(decode_frame(&bytes), Err(FrameError::InvalidIndexTotal { .. })));
    }

    #[test]
    fn auth_frame_requires_total_one_index_zero() {
        let mut frame = sample_frame();
        frame.frame_type = FrameType::Auth;
        frame.total = 2;
        frame.index = 0;
        let bytes = encode_frame(&frame);
        assert!(matches!(decode_frame(&bytes), Err(FrameError::InvalidIndexTotal { .. })));
    }

    #[test]
    fn accepts_zero_length_data() {
        let mut frame = sample_frame();
        frame.data = Vec::new();
        let bytes = encode_frame(&frame);
        let decoded = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.data, Vec::<u8>::new());
    }

    #[test]
    fn rejects_trailing_bytes() {
        let bytes = encode_frame(&sample_frame());
        let crc_region_len = bytes.len() - 4;
        let mut crc_region = bytes[..crc_region_len].to_vec();
        crc_region.push(0xAB); // extra byte beyond the declared data_len
        let crc = crc32_ieee(&crc_region);
        let mut tampered = crc_region;
        tampered.extend_from_slice(&crc.to_be_bytes());
        assert!(matches!(decode_frame(&tampered), Err(FrameError::TrailingBytes(1))));
    }

    #[test]
    fn unknown_frame_type_byte_is_rejected() {
        let mut bytes = encode_frame(&sample_frame());
        // frame_type byte sits right after magic(2) + version varint(1 for value 1)
        let type_byte_offset = 3;
        bytes[type_byte_offset] = 9;
        let crc_region_len = bytes.len() - 4;
        let crc = crc32_ieee(&bytes[..crc_region_len]);
        bytes[crc_region_len..].copy_from_slice(&crc.to_be_bytes());
        assert!(matches!(decode_frame(&bytes), Err(FrameError::UnknownFrameType(9))));
    }
}
