//! Scan line record structure and decoding

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Buf, BufMut, BytesMut};

use crate::{
    constants::{finish, line},
    error::{Error, Result},
};

/// One raw scan line emitted by the sensor
///
/// # Record Structure
///
/// ```text
/// ┌───────┬─────────┬───────┬──────┬──────┬─────────┬─────────┬──────┬──────┬──────┐
/// │ 01 FE │ counter │ sync  │ flag │ 0x00 │  scan   │ mirror  │ sum1 │ sum2 │ sum3 │
/// │  2 B  │ 2 B LE  │  2 B  │ 1 B  │ 1 B  │  200 B  │  64 B   │ 2 B  │ 11 B │ 3 B  │
/// └───────┴─────────┴───────┴──────┴──────┴─────────┴─────────┴──────┴──────┴──────┘
/// ```
///
/// Only the start marker is meaningful for framing and only `scan` is used
/// for the image. `sync` is usually `08 08` and sometimes `08 18`; it and
/// the mirror and sum fields are kept as opaque bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanLine {
    pub counter: u16,
    pub sync: [u8; 2],
    pub flag: u8,
    pub reserved: u8,
    pub scan: [u8; line::SAMPLES],
    pub mirror: [u8; line::MIRROR_LEN],
    pub sum1: [u8; line::SUM1_LEN],
    pub sum2: [u8; line::SUM2_LEN],
    pub sum3: [u8; line::SUM3_LEN],
}

impl ScanLine {
    /// Create a line with the given samples and the usual sync bytes
    pub fn new(counter: u16, scan: [u8; line::SAMPLES]) -> Self {
        Self {
            counter,
            sync: [0x08, 0x08],
            flag: 0,
            reserved: 0,
            scan,
            mirror: [0; line::MIRROR_LEN],
            sum1: [0; line::SUM1_LEN],
            sum2: [0; line::SUM2_LEN],
            sum3: [0; line::SUM3_LEN],
        }
    }

    /// Decode one record from the start of `buf`
    ///
    /// The start marker is not checked here; framing is the job of the
    /// frame synchronizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordTooShort`] if `buf` holds less than one record.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < line::RECORD_SIZE {
            return Err(Error::RecordTooShort {
                expected: line::RECORD_SIZE,
                actual: buf.len(),
            });
        }

        let mut buf = &buf[..line::RECORD_SIZE];
        buf.advance(line::START_MARKER.len());

        let counter = LittleEndian::read_u16(buf);
        buf.advance(2);

        let mut record = Self::new(counter, [0; line::SAMPLES]);
        buf.copy_to_slice(&mut record.sync);
        record.flag = buf.get_u8();
        record.reserved = buf.get_u8();
        buf.copy_to_slice(&mut record.scan);
        buf.copy_to_slice(&mut record.mirror);
        buf.copy_to_slice(&mut record.sum1);
        buf.copy_to_slice(&mut record.sum2);
        buf.copy_to_slice(&mut record.sum3);

        Ok(record)
    }

    /// Encode the record, start marker included
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(line::RECORD_SIZE);

        buf.put_slice(&line::START_MARKER);
        buf.put_u16_le(self.counter);
        buf.put_slice(&self.sync);
        buf.put_u8(self.flag);
        buf.put_u8(self.reserved);
        buf.put_slice(&self.scan);
        buf.put_slice(&self.mirror);
        buf.put_slice(&self.sum1);
        buf.put_slice(&self.sum2);
        buf.put_slice(&self.sum3);

        buf
    }

    /// Raw quality byte (second sync byte)
    pub fn quality_marker(&self) -> u8 {
        self.sync[1]
    }

    /// Check if the low-contrast sums show no finger on this line
    pub fn is_blank(&self) -> bool {
        self.sum2
            .iter()
            .all(|&s| s <= finish::SUM_MEDIAN + finish::SUM_EMPTY_RANGE)
    }
}

/// Check if a scan line starts at the beginning of `buf`
pub fn has_start_marker(buf: &[u8]) -> bool {
    buf.starts_with(&line::START_MARKER)
}

/// Sample window of a raw record
pub fn samples(record: &[u8]) -> &[u8] {
    &record[line::SAMPLES_OFFSET..line::SAMPLES_OFFSET + line::SAMPLES]
}

impl fmt::Debug for ScanLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanLine")
            .field("counter", &self.counter)
            .field("sync", &format!("{:02X} {:02X}", self.sync[0], self.sync[1]))
            .field("flag", &format!("0x{:02X}", self.flag))
            .field("sum2", &self.sum2)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ramp() -> [u8; line::SAMPLES] {
        let mut scan = [0u8; line::SAMPLES];
        for (i, s) in scan.iter_mut().enumerate() {
            *s = i as u8;
        }
        scan
    }

    #[test]
    fn test_record_size() {
        let encoded = ScanLine::new(0, ramp()).encode();
        assert_eq!(encoded.len(), line::RECORD_SIZE);
        assert!(has_start_marker(&encoded));
    }

    #[test]
    fn test_parse_fields() {
        let mut original = ScanLine::new(0x1234, ramp());
        original.sync = [0x08, 0x18];
        original.flag = 0x5A;
        original.mirror[63] = 0x77;
        original.sum3 = [1, 2, 3];

        let encoded = original.encode();
        assert_eq!(&encoded[2..4], &[0x34, 0x12]);

        let parsed = ScanLine::parse(&encoded).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.quality_marker(), 0x18);
    }

    #[test]
    fn test_parse_ignores_trailing_bytes() {
        let mut encoded = ScanLine::new(7, ramp()).encode();
        encoded.extend_from_slice(&[0xFF; 10]);

        let parsed = ScanLine::parse(&encoded).unwrap();
        assert_eq!(parsed.counter, 7);
    }

    #[test]
    fn test_parse_too_short() {
        let result = ScanLine::parse(&[0x01, 0xFE, 0x00]);
        assert!(matches!(
            result,
            Err(Error::RecordTooShort { expected: 288, actual: 3 })
        ));
    }

    #[test]
    fn test_samples_window() {
        let encoded = ScanLine::new(0, ramp()).encode();
        let window = samples(&encoded);

        assert_eq!(window.len(), line::SAMPLES);
        assert_eq!(window[0], 0);
        assert_eq!(window[199], 199);
    }

    #[test]
    fn test_is_blank() {
        let mut record = ScanLine::new(0, ramp());
        record.sum2 = [60; line::SUM2_LEN];
        assert!(record.is_blank());

        record.sum2[4] = 66;
        assert!(!record.is_blank());
    }
}
