//! Field codec
//!
//! Integers are little-endian. Strings carry a u16 byte length followed by
//! UTF-8. Identifiers travel as their `namespace:path` string and are
//! validated on read. Booleans are a single 0/1 byte.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use origin_core::{
    Assignment, AssignmentRecord, Identifier, OriginError, OriginResult, ProtocolVersion,
};

/// Sequential writer for message payloads
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        WireWriter::default()
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.put_u8(v);
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.buf.put_u8(u8::from(v));
        self
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.buf.put_u16_le(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32_le(v);
        self
    }

    pub fn put_str(&mut self, s: &str) -> OriginResult<&mut Self> {
        let len = u16::try_from(s.len())
            .map_err(|_| OriginError::InvalidWireFormat(format!("string too long: {}", s.len())))?;
        self.buf.put_u16_le(len);
        self.buf.put_slice(s.as_bytes());
        Ok(self)
    }

    pub fn put_identifier(&mut self, id: &Identifier) -> OriginResult<&mut Self> {
        self.put_str(&id.to_string())
    }

    /// Three u32 components: major, minor, patch
    pub fn put_version(&mut self, version: &ProtocolVersion) -> &mut Self {
        for component in version.to_triple() {
            self.buf.put_u32_le(component);
        }
        self
    }

    /// u16 count, the `(layer, origin)` pairs, then `selecting` and `had_origin_before`
    pub fn put_record(&mut self, record: &AssignmentRecord) -> OriginResult<&mut Self> {
        let count = u16::try_from(record.assignments.len()).map_err(|_| {
            OriginError::InvalidWireFormat(format!(
                "too many assignments: {}",
                record.assignments.len()
            ))
        })?;
        self.put_u16(count);
        for assignment in &record.assignments {
            self.put_identifier(&assignment.layer)?;
            self.put_identifier(&assignment.origin)?;
        }
        self.put_bool(record.selecting);
        self.put_bool(record.had_origin_before);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Sequential reader over a message payload
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        WireReader { buf, consumed: 0 }
    }

    fn need(&self, n: usize) -> OriginResult<()> {
        if self.buf.remaining() < n {
            return Err(OriginError::BufferTooShort {
                expected: self.consumed + n,
                actual: self.consumed + self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn get_u8(&mut self) -> OriginResult<u8> {
        self.need(1)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    pub fn get_bool(&mut self) -> OriginResult<bool> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(OriginError::InvalidWireFormat(format!(
                "invalid bool byte {other:#04x}"
            ))),
        }
    }

    pub fn get_u16(&mut self) -> OriginResult<u16> {
        self.need(2)?;
        self.consumed += 2;
        Ok(self.buf.get_u16_le())
    }

    pub fn get_u32(&mut self) -> OriginResult<u32> {
        self.need(4)?;
        self.consumed += 4;
        Ok(self.buf.get_u32_le())
    }

    pub fn get_str(&mut self) -> OriginResult<String> {
        let len = self.get_u16()? as usize;
        self.need(len)?;
        let (head, tail) = self.buf.split_at(len);
        let s = std::str::from_utf8(head)
            .map_err(|e| OriginError::InvalidWireFormat(format!("invalid utf-8: {e}")))?
            .to_string();
        self.buf = tail;
        self.consumed += len;
        Ok(s)
    }

    pub fn get_identifier(&mut self) -> OriginResult<Identifier> {
        let raw = self.get_str()?;
        Identifier::parse(&raw)
    }

    pub fn get_version(&mut self) -> OriginResult<ProtocolVersion> {
        Ok(ProtocolVersion::from_triple([
            self.get_u32()?,
            self.get_u32()?,
            self.get_u32()?,
        ]))
    }

    pub fn get_record(&mut self) -> OriginResult<AssignmentRecord> {
        let count = self.get_u16()? as usize;
        let mut assignments = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let layer = self.get_identifier()?;
            let origin = self.get_identifier()?;
            assignments.push(Assignment::new(layer, origin));
        }
        Ok(AssignmentRecord {
            assignments,
            selecting: self.get_bool()?,
            had_origin_before: self.get_bool()?,
        })
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Fail if the payload carries bytes the message did not consume
    pub fn finish(self) -> OriginResult<()> {
        if self.buf.has_remaining() {
            return Err(OriginError::InvalidWireFormat(format!(
                "{} unread payload bytes",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_length_prefixed() {
        let mut w = WireWriter::new();
        w.put_str("abc").unwrap();
        assert_eq!(&w.finish()[..], &[3, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_short_string_reports_offsets() {
        let mut r = WireReader::new(&[5, 0, b'a']);
        assert!(matches!(
            r.get_str(),
            Err(OriginError::BufferTooShort { expected: 7, actual: 3 })
        ));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let mut w = WireWriter::new();
        w.put_str("Not An Id").unwrap();
        let bytes = w.finish();
        let mut r = WireReader::new(&bytes);
        assert!(matches!(
            r.get_identifier(),
            Err(OriginError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_bool_strict() {
        let mut r = WireReader::new(&[2]);
        assert!(r.get_bool().is_err());
    }

    #[test]
    fn test_record_layout_order() {
        let record = AssignmentRecord {
            assignments: vec![Assignment::new(
                Identifier::origins("l"),
                Identifier::origins("o"),
            )],
            selecting: true,
            had_origin_before: false,
        };

        let mut w = WireWriter::new();
        w.put_record(&record).unwrap();
        let bytes = w.finish();

        // count, "origins:l", "origins:o", selecting, had_origin_before
        assert_eq!(&bytes[0..2], &[1, 0]);
        assert_eq!(bytes[bytes.len() - 2], 1);
        assert_eq!(bytes[bytes.len() - 1], 0);

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.get_record().unwrap(), record);
        r.finish().unwrap();
    }
}
