//! Payload tables for templated and pre-encoded commands
//!
//! Templated commands are stored as lists of upper-case hex strings that are
//! concatenated and decoded by the [`Encoder`](crate::encoder::Encoder).
//! The register values inside them are opaque; the encoder only relies on
//! the framing:
//!
//! - every `0x02D0` template starts with `02D0`,
//! - every `0x0220` template starts with `0220`,
//! - the next-scan template carries the `DEADDEAD` sentinel immediately
//!   before its tail.
//!
//! The only tables shipped here are [`PLACEHOLDER`]: correct framing,
//! invented register values. They drive the scripted transport but will not
//! configure real hardware. A [`Fragments`] value built from tables
//! extracted from a USB trace of the vendor driver has to be handed to
//! [`Encoder::with_fragments`](crate::encoder::Encoder::with_fragments)
//! before talking to a sensor.

use crate::command::RawBlob;

/// Hex template made of concatenated parts
#[derive(Debug, Clone, Copy)]
pub struct HexTemplate {
    pub name: &'static str,
    pub parts: &'static [&'static str],
}

impl HexTemplate {
    /// Number of hex characters across all parts
    pub fn hex_len(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }
}

/// Template of the `0x0220` next-scan command
///
/// The 4-byte sentinel sits between `head` and `tail` and is overwritten
/// with the subtype when the command is encoded.
#[derive(Debug, Clone, Copy)]
pub struct NextScanTemplate {
    pub name: &'static str,
    pub head: &'static [&'static str],
    pub tail: &'static str,
}

impl NextScanTemplate {
    /// Length of the decoded tail in bytes
    pub fn tail_len(&self) -> usize {
        self.tail.len() / 2
    }
}

/// Complete set of payload tables for one sensor
#[derive(Debug, Clone, Copy)]
pub struct Fragments {
    /// `0x02D0` subtypes 1 to 7
    pub calibration: [HexTemplate; 7],
    /// `0x0220` subtypes 1 to 3
    pub scan: [HexTemplate; 3],
    pub next_scan: NextScanTemplate,
    pub setup_1: &'static [u8],
    pub setup_2: &'static [u8],
    pub setup_3: &'static [u8],
    pub setup_4: &'static [u8],
    pub calibration_done: &'static [u8],
    pub illuminate: &'static [u8],
}

impl Fragments {
    /// Literal bytes of a pre-encoded blob
    pub fn raw(&self, blob: RawBlob) -> &'static [u8] {
        match blob {
            RawBlob::Setup1 => self.setup_1,
            RawBlob::Setup2 => self.setup_2,
            RawBlob::Setup3 => self.setup_3,
            RawBlob::Setup4 => self.setup_4,
            RawBlob::CalibrationDone => self.calibration_done,
            RawBlob::Illuminate => self.illuminate,
        }
    }
}

const NEXT_SCAN_TAIL: &str = "0000000000000000000000000000000000000000";

/// Placeholder tables
///
/// Every template has the right prefix, length and sentinel position, but
/// the register values are made up. Use them with a scripted transport or
/// in tests; a real sensor needs captured tables passed through
/// [`Encoder::with_fragments`](crate::encoder::Encoder::with_fragments)
/// or `Device::with_encoder`.
pub static PLACEHOLDER: Fragments = Fragments {
    calibration: [
        HexTemplate {
            name: "calibration_01",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040000000000",
            ],
        },
        HexTemplate {
            name: "calibration_02",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040001000000",
                "0080000000D00000",
            ],
        },
        HexTemplate {
            name: "calibration_03",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040002000000",
                "004E000000D00000",
            ],
        },
        HexTemplate {
            name: "calibration_04",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040003000000",
                "C016000000D00000",
            ],
        },
        HexTemplate {
            name: "calibration_05",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040004000000",
                "001A000000D00000",
            ],
        },
        HexTemplate {
            name: "calibration_06",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040005000000",
                "001A000000D00000",
            ],
        },
        HexTemplate {
            name: "calibration_07",
            parts: &[
                "02D0",
                "00000000",
                "2C00000000000000",
                "2D80000010000000",
                "1001040006000000",
                "4003000000D00000",
            ],
        },
    ],
    scan: [
        HexTemplate {
            name: "scan_01",
            parts: &[
                "0220",
                "000000000000",
                "1F00000000000000",
                "0001000020000000",
            ],
        },
        HexTemplate {
            name: "scan_02",
            parts: &[
                "0220",
                "000000000000",
                "1F00000000000000",
                "8016000001000000",
                "2C01000000000000",
            ],
        },
        HexTemplate {
            name: "scan_03",
            parts: &[
                "0220",
                "000000000000",
                "1F00000000000000",
                "4009000024000000",
                "8016000001000000",
                "FA00000000000000",
            ],
        },
    ],
    next_scan: NextScanTemplate {
        name: "next_scan",
        head: &[
            "0220",
            "000000000000",
            "1F00000000000000",
            "40480100",
            "0000000000000000",
            "0100",
            "DEADDEAD",
        ],
        tail: NEXT_SCAN_TAIL,
    },
    setup_1: &[
        0x06, 0x17, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00,
    ],
    setup_2: &[
        0x06, 0x17, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x03, 0x00, 0x00, 0x00,
    ],
    setup_3: &[
        0x06, 0x17, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ],
    setup_4: &[
        0x06, 0x17, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x07, 0x00, 0x00, 0x00,
    ],
    calibration_done: &[
        0x12, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ],
    illuminate: &[
        0x24, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ],
};
