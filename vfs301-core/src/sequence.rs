//! Fixed command/reply sequences
//!
//! The sensor is driven by replaying the vendor driver's traffic. Every
//! step is either a command to send or a receive of a fixed expected size on
//! one endpoint. Replies are not interpreted; they are acknowledgements.

use crate::{
    command::{Command, RawBlob},
    constants::next_scan,
    endpoint::Endpoint,
};

/// Protocol generation the session targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolGeneration {
    /// Opcode-only driver: the next-scan command exists only as the
    /// `0xFA00` variant and the sensor is re-armed after each capture.
    Legacy,

    /// Template driver: all next-scan variants, sensor armed before each
    /// wait for a finger.
    #[default]
    Templated,
}

/// Expected reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub endpoint: Endpoint,
    pub len: usize,
}

impl Reply {
    pub const fn ctrl(len: usize) -> Self {
        Self {
            endpoint: Endpoint::RecvCtrl,
            len,
        }
    }

    pub const fn data(len: usize) -> Self {
        Self {
            endpoint: Endpoint::RecvData,
            len,
        }
    }
}

/// One step of a fixed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Send(Command),
    Receive(Reply),
}

const fn send(command: Command) -> Step {
    Step::Send(command)
}

const fn ctrl(len: usize) -> Step {
    Step::Receive(Reply::ctrl(len))
}

const fn data(len: usize) -> Step {
    Step::Receive(Reply::data(len))
}

/// Bring-up: reset, configure, calibrate, illuminate
pub static BRING_UP: &[Step] = &[
    send(Command::RESET),
    ctrl(38),
    send(Command::Configure(0x04)),
    ctrl(6),
    send(Command::Configure(0x05)),
    ctrl(7),
    send(Command::IDENTIFY),
    ctrl(64),
    ctrl(4),
    send(Command::Raw(RawBlob::Setup1)),
    ctrl(2),

    send(Command::RESET),
    ctrl(38),
    send(Command::PREPARE),
    ctrl(2),
    send(Command::Raw(RawBlob::Setup2)),
    ctrl(2),
    send(Command::Scan(1)),
    ctrl(2),
    data(256),
    data(32),

    send(Command::PREPARE),
    ctrl(2),
    send(Command::Raw(RawBlob::Setup3)),
    ctrl(2),
    // calibration upload
    send(Command::RESET),
    ctrl(38),
    send(Command::Calibration(1)),
    ctrl(2),
    data(11648),
    send(Command::Calibration(2)),
    ctrl(2),
    data(53248),
    send(Command::Calibration(3)),
    ctrl(2),
    data(19968),
    send(Command::Calibration(4)),
    ctrl(2),
    data(5824),
    send(Command::Calibration(5)),
    ctrl(2),
    data(6656),
    send(Command::Calibration(6)),
    ctrl(2),
    data(6656),
    send(Command::Calibration(7)),
    ctrl(2),
    data(832),
    send(Command::Raw(RawBlob::CalibrationDone)),
    ctrl(2),

    send(Command::PREPARE),
    ctrl(2),
    send(Command::Raw(RawBlob::Setup2)),
    ctrl(2),
    send(Command::Scan(2)),
    ctrl(2),
    data(5760),

    send(Command::PREPARE),
    ctrl(2),
    send(Command::Raw(RawBlob::Setup1)),
    ctrl(2),

    send(Command::PREPARE),
    ctrl(2),
    send(Command::Raw(RawBlob::Setup4)),
    ctrl(2),
    send(Command::Raw(RawBlob::Illuminate)),
    ctrl(2),
    // illumination on
    send(Command::RESET),
    ctrl(38),
    send(Command::Scan(3)),
    ctrl(2368),
    ctrl(36),
    data(5760),
];

/// Arm the sensor for the next swipe
pub static ARM: &[Step] = &[send(Command::Scan(next_scan::SUBTYPE_FA00)), ctrl(2)];

/// Two replies the sensor may deliver in either order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnorderedPair {
    /// Reply normally arriving first
    pub primary: Reply,
    pub secondary: Reply,
    /// The secondary reply may not arrive at all
    pub secondary_optional: bool,
}

/// Acknowledgements after the block loop, each preceded by its command
pub static POST_CAPTURE: &[(Command, UnorderedPair)] = &[
    (
        Command::END_CAPTURE,
        UnorderedPair {
            primary: Reply::ctrl(2),
            secondary: Reply::data(16384),
            secondary_optional: true,
        },
    ),
    (
        Command::Scan(2),
        UnorderedPair {
            primary: Reply::data(5760),
            secondary: Reply::ctrl(2),
            secondary_optional: false,
        },
    ),
];

impl ProtocolGeneration {
    /// Steps run once before the first wait for a finger
    pub fn bring_up(self) -> Vec<Step> {
        let mut steps = BRING_UP.to_vec();
        if self.arms_after_capture() {
            steps.extend_from_slice(ARM);
        }
        steps
    }

    /// Check if the sensor is armed at the start of every wait
    pub fn arms_before_wait(self) -> bool {
        matches!(self, Self::Templated)
    }

    /// Check if the sensor is armed after bring-up and after each capture
    pub fn arms_after_capture(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;

    #[test]
    fn test_bring_up_starts_with_reset() {
        assert_eq!(BRING_UP[0], Step::Send(Command::RESET));
        assert_eq!(BRING_UP[1], Step::Receive(Reply::ctrl(38)));
    }

    #[test]
    fn test_every_send_is_followed_by_a_receive() {
        for window in BRING_UP.windows(2) {
            if let Step::Send(command) = window[0] {
                assert!(
                    matches!(window[1], Step::Receive(_)),
                    "{} not followed by a receive",
                    command
                );
            }
        }
    }

    #[test]
    fn test_bring_up_encodes_for_both_generations() {
        for generation in [ProtocolGeneration::Legacy, ProtocolGeneration::Templated] {
            let encoder = Encoder::new(generation);
            for step in generation.bring_up() {
                if let Step::Send(command) = step {
                    encoder.encode_command(&command).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_legacy_bring_up_ends_armed() {
        let steps = ProtocolGeneration::Legacy.bring_up();
        assert_eq!(&steps[steps.len() - 2..], ARM);
        assert_eq!(ProtocolGeneration::Templated.bring_up().len(), BRING_UP.len());
    }

    #[test]
    fn test_calibration_uploads_in_order() {
        let uploads: Vec<u8> = BRING_UP
            .iter()
            .filter_map(|step| match step {
                Step::Send(Command::Calibration(subtype)) => Some(*subtype),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_post_capture_pairs() {
        assert_eq!(POST_CAPTURE[0].0, Command::END_CAPTURE);
        assert!(POST_CAPTURE[0].1.secondary_optional);
        assert_eq!(POST_CAPTURE[1].1.primary, Reply::data(5760));
    }
}
