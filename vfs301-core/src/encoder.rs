//! Command encoder
//!
//! Maps a command type / subtype pair to the exact bytes sent to the
//! sensor. Three encodings are in use:
//!
//! ```text
//! bare         [opcode]
//! 0x0B         [0x0B, 38 payload bytes]   payload[20] = subtype
//!                                         payload[34] = 0x9F | 0xAB
//! templated    hex-decoded template, next-scan variants patched:
//!              ... DE AD DE AD <tail>  ->  ... hi lo hi lo <tail>
//! ```
//!
//! The command set is closed: anything not listed above is rejected.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{
    command::{Command, CommandType},
    constants::next_scan,
    error::{Error, Result},
    fragments::{self, Fragments},
    sequence::ProtocolGeneration,
};

/// Size of the `0x0B` payload that follows the opcode
pub const CONFIGURE_PAYLOAD_LEN: usize = 38;

const CONFIGURE_SUBTYPE_OFFSET: usize = 20;
const CONFIGURE_TRAILER_OFFSET: usize = 34;

/// Command encoder for one protocol generation
///
/// # Examples
///
/// ```
/// use vfs301_core::{encoder::Encoder, sequence::ProtocolGeneration};
///
/// let encoder = Encoder::new(ProtocolGeneration::Templated);
/// let poll = encoder.encode(0x17, None).unwrap();
/// assert_eq!(poll.as_ref(), &[0x17]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    generation: ProtocolGeneration,
    fragments: &'static Fragments,
}

impl Encoder {
    /// Create an encoder using the [placeholder tables](fragments::PLACEHOLDER)
    ///
    /// Their framing is right but their register values are invented; call
    /// [`with_fragments`](Self::with_fragments) with captured tables before
    /// driving real hardware.
    pub fn new(generation: ProtocolGeneration) -> Self {
        Self {
            generation,
            fragments: &fragments::PLACEHOLDER,
        }
    }

    /// Use other payload tables
    pub fn with_fragments(mut self, fragments: &'static Fragments) -> Self {
        self.fragments = fragments;
        self
    }

    pub fn generation(&self) -> ProtocolGeneration {
        self.generation
    }

    pub fn fragments(&self) -> &'static Fragments {
        self.fragments
    }

    /// Encode a command
    pub fn encode_command(&self, command: &Command) -> Result<Bytes> {
        let encoded = match command {
            Command::Raw(blob) => Bytes::from_static(self.fragments.raw(*blob)),
            _ => self.encode(command.command_type(), command.subtype())?,
        };

        trace!(
            command = %command,
            len = encoded.len(),
            "Encoded command: {:02X?}",
            &encoded[..encoded.len().min(16)]
        );

        Ok(encoded)
    }

    /// Encode a command type / subtype pair
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCommand`] for pairs outside the command
    /// set of this generation, and [`Error::InvalidHexTemplate`] or
    /// [`Error::SentinelNotFound`] when a payload table is malformed.
    pub fn encode(&self, command_type: u16, subtype: Option<u16>) -> Result<Bytes> {
        let unsupported = || Error::UnsupportedCommand {
            command: command_type,
            subtype,
            generation: self.generation,
        };

        let kind = CommandType::try_from(command_type).map_err(|_| unsupported())?;

        match (kind, subtype) {
            (kind, None) if kind.is_bare() => Ok(Bytes::copy_from_slice(&[command_type as u8])),
            (CommandType::Configure, Some(subtype @ (0x04 | 0x05))) => {
                Ok(encode_configure(subtype as u8))
            }
            (CommandType::Calibration, Some(subtype @ 1..=7)) => {
                let template = &self.fragments.calibration[usize::from(subtype) - 1];
                Ok(decode_hex(template.name, template.parts)?.freeze())
            }
            (CommandType::Scan, Some(subtype @ 1..=3)) => {
                let template = &self.fragments.scan[usize::from(subtype) - 1];
                Ok(decode_hex(template.name, template.parts)?.freeze())
            }
            (CommandType::Scan, Some(subtype)) if self.supports_next_scan(subtype) => {
                self.encode_next_scan(subtype)
            }
            _ => Err(unsupported()),
        }
    }

    fn supports_next_scan(&self, subtype: u16) -> bool {
        match self.generation {
            ProtocolGeneration::Legacy => subtype == next_scan::SUBTYPE_FA00,
            ProtocolGeneration::Templated => next_scan::SUBTYPES.contains(&subtype),
        }
    }

    fn encode_next_scan(&self, subtype: u16) -> Result<Bytes> {
        let template = &self.fragments.next_scan;

        let mut buf = decode_hex(template.name, template.head)?;
        buf.extend_from_slice(&decode_hex(template.name, &[template.tail])?);

        let offset = buf
            .len()
            .checked_sub(template.tail_len() + next_scan::SENTINEL.len())
            .ok_or(Error::SentinelNotFound {
                name: template.name,
                offset: 0,
            })?;

        let field = &mut buf[offset..offset + next_scan::SENTINEL.len()];
        if field != next_scan::SENTINEL {
            return Err(Error::SentinelNotFound {
                name: template.name,
                offset,
            });
        }

        let [hi, lo] = subtype.to_be_bytes();
        field.copy_from_slice(&[hi, lo, hi, lo]);

        Ok(buf.freeze())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(ProtocolGeneration::default())
    }
}

fn encode_configure(subtype: u8) -> Bytes {
    let mut payload = [0u8; CONFIGURE_PAYLOAD_LEN];
    payload[CONFIGURE_SUBTYPE_OFFSET] = subtype;
    payload[CONFIGURE_TRAILER_OFFSET] = match subtype {
        0x04 => 0x9F,
        _ => 0xAB,
    };

    let mut buf = BytesMut::with_capacity(1 + CONFIGURE_PAYLOAD_LEN);
    buf.put_u8(CommandType::Configure as u8);
    buf.put_slice(&payload);
    buf.freeze()
}

/// Decode concatenated upper-case hex parts
pub(crate) fn decode_hex(name: &'static str, parts: &[&str]) -> Result<BytesMut> {
    let joined: String = parts.concat();

    if let Some(c) = joined
        .chars()
        .find(|c| !matches!(c, '0'..='9' | 'A'..='F'))
    {
        return Err(Error::InvalidHexTemplate {
            name,
            reason: format!("invalid character {:?}", c),
        });
    }

    let decoded = hex::decode(&joined).map_err(|e| Error::InvalidHexTemplate {
        name,
        reason: e.to_string(),
    })?;

    Ok(BytesMut::from(decoded.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RawBlob;
    use crate::fragments::{HexTemplate, NextScanTemplate, PLACEHOLDER};
    use pretty_assertions::assert_eq;

    fn templated() -> Encoder {
        Encoder::new(ProtocolGeneration::Templated)
    }

    #[test]
    fn test_bare_commands() {
        let encoder = templated();
        for opcode in [0x01, 0x04, 0x17, 0x19, 0x1A] {
            let encoded = encoder.encode(opcode, None).unwrap();
            assert_eq!(encoded.as_ref(), &[opcode as u8]);
        }
    }

    #[test]
    fn test_configure_04() {
        let encoded = templated().encode(0x0B, Some(0x04)).unwrap();

        assert_eq!(encoded.len(), 39);
        assert_eq!(encoded[0], 0x0B);

        let payload = &encoded[1..];
        assert_eq!(payload[20], 0x04);
        assert_eq!(payload[34], 0x9F);
        let others = payload
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 20 && *i != 34)
            .all(|(_, b)| *b == 0);
        assert!(others);
    }

    #[test]
    fn test_configure_05() {
        let encoded = templated().encode(0x0B, Some(0x05)).unwrap();

        assert_eq!(encoded.len(), 39);
        assert_eq!(encoded[1 + 20], 0x05);
        assert_eq!(encoded[1 + 34], 0xAB);
    }

    #[test]
    fn test_configure_unknown_subtype() {
        let result = templated().encode(0x0B, Some(0x06));
        assert!(matches!(
            result,
            Err(Error::UnsupportedCommand { command: 0x0B, subtype: Some(0x06), .. })
        ));
    }

    #[test]
    fn test_calibration_templates() {
        let encoder = templated();
        for subtype in 1..=7u16 {
            let encoded = encoder.encode(0x02D0, Some(subtype)).unwrap();
            let template = &PLACEHOLDER.calibration[usize::from(subtype) - 1];

            assert_eq!(encoded.len(), template.hex_len() / 2);
            assert_eq!(&encoded[..2], &[0x02, 0xD0]);
        }
    }

    #[test]
    fn test_calibration_literal_bytes() {
        let encoded = templated().encode(0x02D0, Some(1)).unwrap();
        assert_eq!(
            &encoded[..14],
            &[0x02, 0xD0, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_calibration_out_of_range() {
        assert!(templated().encode(0x02D0, Some(0)).is_err());
        assert!(templated().encode(0x02D0, Some(8)).is_err());
    }

    #[test]
    fn test_scan_templates_unpatched() {
        let encoder = templated();
        for subtype in 1..=3u16 {
            let encoded = encoder.encode(0x0220, Some(subtype)).unwrap();
            let template = &PLACEHOLDER.scan[usize::from(subtype) - 1];
            let expected = decode_hex(template.name, template.parts).unwrap();

            assert_eq!(encoded.as_ref(), expected.as_ref());
        }
    }

    #[test]
    fn test_next_scan_patch() {
        let encoder = templated();
        let template = &PLACEHOLDER.next_scan;
        let mut unpatched = decode_hex(template.name, template.head).unwrap();
        unpatched.extend_from_slice(&decode_hex(template.name, &[template.tail]).unwrap());
        let offset = unpatched.len() - template.tail_len() - 4;

        for subtype in next_scan::SUBTYPES {
            let encoded = encoder.encode(0x0220, Some(subtype)).unwrap();
            let [hi, lo] = subtype.to_be_bytes();

            assert_eq!(encoded.len(), unpatched.len());
            assert_eq!(&encoded[offset..offset + 4], &[hi, lo, hi, lo]);

            for (i, (a, b)) in encoded.iter().zip(unpatched.iter()).enumerate() {
                if !(offset..offset + 4).contains(&i) {
                    assert_eq!(a, b, "byte {} differs", i);
                }
            }
        }
    }

    #[test]
    fn test_next_scan_fa00_bytes() {
        let encoded = templated().encode(0x0220, Some(0xFA00)).unwrap();
        let offset = encoded.len() - PLACEHOLDER.next_scan.tail_len() - 4;
        assert_eq!(&encoded[offset..offset + 4], &[0xFA, 0x00, 0xFA, 0x00]);
    }

    #[test]
    fn test_legacy_next_scan_subset() {
        let encoder = Encoder::new(ProtocolGeneration::Legacy);

        assert!(encoder.encode(0x0220, Some(0xFA00)).is_ok());
        assert!(matches!(
            encoder.encode(0x0220, Some(0x2C01)),
            Err(Error::UnsupportedCommand { generation: ProtocolGeneration::Legacy, .. })
        ));
    }

    #[test]
    fn test_unknown_scan_subtype() {
        assert!(templated().encode(0x0220, Some(4)).is_err());
        assert!(templated().encode(0x0220, Some(0x1234)).is_err());
    }

    #[test]
    fn test_unsupported_pairs() {
        let encoder = templated();
        assert!(encoder.encode(0x17, Some(1)).is_err());
        assert!(encoder.encode(0x06, None).is_err());
        assert!(encoder.encode(0x0B, None).is_err());
        assert!(encoder.encode(0x99, None).is_err());
    }

    #[test]
    fn test_raw_blob_passthrough() {
        let encoded = templated()
            .encode_command(&Command::Raw(RawBlob::Illuminate))
            .unwrap();
        assert_eq!(encoded.as_ref(), PLACEHOLDER.illuminate);
    }

    #[test]
    fn test_encode_command_matches_pair() {
        let encoder = templated();
        let by_command = encoder.encode_command(&Command::Calibration(3)).unwrap();
        let by_pair = encoder.encode(0x02D0, Some(3)).unwrap();
        assert_eq!(by_command, by_pair);
    }

    #[test]
    fn test_decode_hex_rejects_lowercase() {
        let result = decode_hex("lower", &["02d0"]);
        assert!(matches!(result, Err(Error::InvalidHexTemplate { name: "lower", .. })));
    }

    #[test]
    fn test_decode_hex_rejects_odd_length() {
        let result = decode_hex("odd", &["02D", "00"]);
        assert!(matches!(result, Err(Error::InvalidHexTemplate { name: "odd", .. })));
    }

    static BROKEN: Fragments = Fragments {
        calibration: PLACEHOLDER.calibration,
        scan: [
            HexTemplate { name: "broken_01", parts: &["0220", "0G"] },
            PLACEHOLDER.scan[1],
            PLACEHOLDER.scan[2],
        ],
        next_scan: NextScanTemplate {
            name: "broken_next_scan",
            head: &["0220", "00000000"],
            tail: "0000",
        },
        setup_1: PLACEHOLDER.setup_1,
        setup_2: PLACEHOLDER.setup_2,
        setup_3: PLACEHOLDER.setup_3,
        setup_4: PLACEHOLDER.setup_4,
        calibration_done: PLACEHOLDER.calibration_done,
        illuminate: PLACEHOLDER.illuminate,
    };

    #[test]
    fn test_missing_sentinel() {
        let encoder = templated().with_fragments(&BROKEN);
        let result = encoder.encode(0x0220, Some(0xFA00));
        assert!(matches!(
            result,
            Err(Error::SentinelNotFound { name: "broken_next_scan", offset: 2 })
        ));
    }

    #[test]
    fn test_invalid_template_character() {
        let encoder = templated().with_fragments(&BROKEN);
        assert!(matches!(
            encoder.encode(0x0220, Some(1)),
            Err(Error::InvalidHexTemplate { name: "broken_01", .. })
        ));
    }

    #[test]
    fn test_placeholder_tables_are_default() {
        assert!(std::ptr::eq(templated().fragments(), &PLACEHOLDER));

        let encoder = templated().with_fragments(&BROKEN);
        assert!(std::ptr::eq(encoder.fragments(), &BROKEN));
        assert!(!std::ptr::eq(encoder.fragments(), &PLACEHOLDER));
    }
}
