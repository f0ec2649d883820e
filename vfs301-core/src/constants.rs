//! Protocol constants

/// Default timeout for a single send or receive (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 300;

/// Default delay between two idle polls (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Bytes requested for the first block of a capture.
///
/// The first reply carries extra header bytes in front of line 0, which is
/// why it is smaller than the following blocks and needs synchronizing.
pub const FIRST_BLOCK_SIZE: usize = 84032;

/// Bytes requested for every block after the first
pub const NEXT_BLOCK_SIZE: usize = 84096;

/// Burst drained from the data endpoint before the block loop starts
pub const CAPTURE_PREAMBLE_SIZE: usize = 64;

/// Images with this many rows or fewer are dropped
pub const DEFAULT_MIN_IMAGE_HEIGHT: usize = 20;

/// Scan line record layout
pub mod line {
    /// Size of one raw scan line record
    pub const RECORD_SIZE: usize = 288;

    /// Number of grayscale samples in one line
    pub const SAMPLES: usize = 200;

    /// Offset of the first sample inside a record
    pub const SAMPLES_OFFSET: usize = 8;

    /// Two-byte marker that starts every record
    pub const START_MARKER: [u8; 2] = [0x01, 0xFE];

    pub const MIRROR_LEN: usize = 64;
    pub const SUM1_LEN: usize = 2;
    pub const SUM2_LEN: usize = 11;
    pub const SUM3_LEN: usize = 3;
}

/// Image reconstruction tuning
pub mod image {
    /// Minimum mean absolute sample difference for a line to be kept
    pub const LINE_DIFF_THRESHOLD: u32 = 15;
}

/// Finish detection on the `sum2` field of trailing lines
pub mod finish {
    /// Number of trailing lines inspected per block
    pub const SUM_LINES: usize = 3;

    // Observed between ~60 and ~80 depending on the sensor.
    pub const SUM_MEDIAN: u8 = 60;

    pub const SUM_EMPTY_RANGE: u8 = 5;
}

/// Poll status replies
pub mod status {
    /// Length of a poll status reply
    pub const LEN: usize = 7;

    /// Index of the event byte inside a status reply
    pub const EVENT_INDEX: usize = 2;

    /// Event byte value signalling a finger on the sensor
    pub const FINGER_PRESENT: u8 = 0x02;
}

/// Subtypes of the `0x0220` next-scan command
pub mod next_scan {
    pub const SUBTYPE_FA00: u16 = 0xFA00;
    pub const SUBTYPE_2C01: u16 = 0x2C01;
    pub const SUBTYPE_5E01: u16 = 0x5E01;

    /// All subtypes built from the patched template
    pub const SUBTYPES: [u16; 3] = [SUBTYPE_FA00, SUBTYPE_2C01, SUBTYPE_5E01];

    /// Placeholder overwritten with the subtype before transmission
    pub const SENTINEL: [u8; 4] = [0xDE, 0xAD, 0xDE, 0xAD];
}
