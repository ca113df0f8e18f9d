//! Frame layout for the origin wire protocol
//!
//! Fixed header is 4 bytes:
//! - Byte 0: Wire version
//! - Byte 1: Message kind
//! - Bytes 2-3: Payload length (LE)
//!
//! The payload follows immediately; a frame carries exactly one message.

use bytes::{BufMut, Bytes, BytesMut};

use origin_core::{OriginError, OriginResult};

use crate::MessageKind;

/// Fixed header size in bytes
pub const FRAME_HEADER_SIZE: usize = 4;

/// Current wire protocol version
pub const WIRE_VERSION: u8 = 1;

/// Maximum payload size
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Fixed frame header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub kind: MessageKind,
    pub payload_len: u16,
}

impl FrameHeader {
    /// Parse header from bytes
    pub fn parse(buf: &[u8]) -> OriginResult<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Err(OriginError::BufferTooShort {
                expected: FRAME_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        // Byte 0: Version
        let version = buf[0];
        if version != WIRE_VERSION {
            return Err(OriginError::UnsupportedWireVersion(version));
        }

        // Byte 1: Kind
        let kind = MessageKind::from_byte(buf[1]).ok_or(OriginError::UnknownMessageKind(buf[1]))?;

        // Bytes 2-3: Payload length
        let payload_len = u16::from_le_bytes([buf[2], buf[3]]);

        Ok(FrameHeader {
            version,
            kind,
            payload_len,
        })
    }

    /// Serialize header into a buffer
    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.version);
        buf.put_u8(self.kind.to_byte());
        buf.put_u16_le(self.payload_len);
    }
}

/// Complete frame: header plus encoded message body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub kind: MessageKind,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(kind: MessageKind, payload: Bytes) -> Self {
        Frame { kind, payload }
    }

    /// Parse a frame; the buffer must hold exactly one frame
    pub fn parse(buf: &[u8]) -> OriginResult<Self> {
        let header = FrameHeader::parse(buf)?;
        let expected = FRAME_HEADER_SIZE + header.payload_len as usize;

        if buf.len() < expected {
            return Err(OriginError::BufferTooShort {
                expected,
                actual: buf.len(),
            });
        }
        if buf.len() > expected {
            return Err(OriginError::InvalidWireFormat(format!(
                "{} trailing bytes after frame",
                buf.len() - expected
            )));
        }

        Ok(Frame {
            kind: header.kind,
            payload: Bytes::copy_from_slice(&buf[FRAME_HEADER_SIZE..]),
        })
    }

    /// Serialize frame to bytes
    pub fn serialize(&self) -> OriginResult<Bytes> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(OriginError::InvalidWireFormat(format!(
                "Payload too large: {} > {}",
                self.payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let mut buf = BytesMut::with_capacity(self.size());
        FrameHeader {
            version: WIRE_VERSION,
            kind: self.kind,
            payload_len: self.payload.len() as u16,
        }
        .write(&mut buf);
        buf.put_slice(&self.payload);

        Ok(buf.freeze())
    }

    /// Total frame size
    pub fn size(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }
}
