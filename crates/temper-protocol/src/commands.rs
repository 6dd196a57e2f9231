//! Wire commands and frame handling.
//!
//! # Frame exchange
//! Every exchange is a single 8-byte write followed by one or more 8-byte
//! reads. There are no report IDs beyond the first command byte and no
//! checksums.
//!
//! | Command        | Bytes                     | Reply frames            |
//! |----------------|---------------------------|-------------------------|
//! | query firmware | `01 86 FF 01 00 00 00 00` | 2 (ASCII, NUL padded)   |
//! | query values   | `01 80 33 01 00 00 00 00` | per profile (1 or 2)    |

use core::fmt;

/// Size in bytes of every command and every response frame.
pub const FRAME_LEN: usize = 8;

/// One raw 8-byte frame.
pub type Frame = [u8; FRAME_LEN];

/// Number of frames the device answers a firmware query with.
pub const FIRMWARE_FRAMES: usize = 2;

/// Maximum length of the assembled firmware string.
pub const FIRMWARE_CAPACITY: usize = FRAME_LEN * FIRMWARE_FRAMES;

/// Byte offsets of the two sensor sub-values inside a value frame.
pub const SENSOR_OFFSETS: [usize; 2] = [2, 4];

/// Firmware query payload.
pub const QUERY_FIRMWARE: Frame = [0x01, 0x86, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x00];

/// Value query payload.
pub const QUERY_VALUES: Frame = [0x01, 0x80, 0x33, 0x01, 0x00, 0x00, 0x00, 0x00];

/// The two commands the device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    QueryFirmware,
    QueryValues,
}

impl Command {
    /// Raw payload written to the device.
    pub fn payload(self) -> &'static Frame {
        match self {
            Command::QueryFirmware => &QUERY_FIRMWARE,
            Command::QueryValues => &QUERY_VALUES,
        }
    }

    /// Name used in log lines and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Command::QueryFirmware => "query firmware",
            Command::QueryValues => "query values",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extract the big-endian 2-byte field starting at `offset`.
///
/// Returns `None` if the field would run past the end of the frame.
pub fn field_at(frame: &Frame, offset: usize) -> Option<[u8; 2]> {
    match frame.get(offset..offset.checked_add(2)?) {
        Some(&[hi, lo]) => Some([hi, lo]),
        _ => None,
    }
}

/// Render bytes as lowercase, space separated hex (`01 86 ff 01`).
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Firmware identification string assembled from the firmware reply frames.
///
/// Each frame contributes its bytes up to the first NUL; the result is capped
/// at [`FIRMWARE_CAPACITY`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareString {
    bytes: Vec<u8>,
}

impl FirmwareString {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(FIRMWARE_CAPACITY),
        }
    }

    /// Append the printable part of one reply frame.
    pub fn push_frame(&mut self, frame: &Frame) {
        let text = frame.split(|b| *b == 0).next().unwrap_or_default();
        let room = FIRMWARE_CAPACITY.saturating_sub(self.bytes.len());
        self.bytes.extend(text.iter().take(room));
    }

    /// Build from a sequence of reply frames.
    pub fn from_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Self {
        let mut firmware = Self::new();
        for frame in frames {
            firmware.push_frame(frame);
        }
        firmware
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for FirmwareString {
    fn from(value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.truncate(FIRMWARE_CAPACITY);
        Self { bytes }
    }
}

impl fmt::Display for FirmwareString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
