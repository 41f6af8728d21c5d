//! Distance report and its wire frame
//!
//! A frame is the fixed prefix, one digit and a carriage return:
//!
//! ```text
//! S R 0 4 : ␠ 5 \r
//! ```
//!
//! The digit is `'0' + distance` with 8 bit wraparound. Only distances 0..=9
//! come out as decimal digits; anything larger becomes whatever byte sits at
//! that offset (12 gives `'<'`). The format is kept as is and the overflow is
//! surfaced through [`DistanceDigit::OutOfRange`] instead of being fixed.

/// Text sent before every digit.
pub const FRAME_PREFIX: &[u8] = b"SR04: ";

/// Last byte of every frame.
pub const FRAME_TERMINATOR: u8 = b'\r';

/// Bytes in a frame with the given prefix.
pub const fn frame_len(prefix: &[u8]) -> usize {
    prefix.len() + 2
}

/// The byte that carries the distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceDigit {
    /// A real decimal digit.
    Decimal(u8),
    /// The distance did not fit in one digit; the byte is still sent.
    OutOfRange(u8),
}

impl DistanceDigit {
    pub const fn encode(distance: u16) -> Self {
        let byte = (b'0' as u16).wrapping_add(distance) as u8;
        if distance <= 9 {
            DistanceDigit::Decimal(byte)
        } else {
            DistanceDigit::OutOfRange(byte)
        }
    }

    /// Byte as it goes out on the wire.
    pub const fn byte(self) -> u8 {
        match self {
            DistanceDigit::Decimal(byte) | DistanceDigit::OutOfRange(byte) => byte,
        }
    }

    pub const fn is_decimal(self) -> bool {
        matches!(self, DistanceDigit::Decimal(_))
    }
}

/// One distance measurement ready to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceReport {
    /// Distance in capture ticks.
    pub distance: u16,
}

impl DistanceReport {
    pub const fn new(distance: u16) -> Self {
        Self { distance }
    }

    pub const fn digit(&self) -> DistanceDigit {
        DistanceDigit::encode(self.distance)
    }

    /// Exact bytes of the frame for this report.
    pub fn frame_bytes<'a>(&self, prefix: &'a [u8]) -> impl Iterator<Item = u8> + 'a {
        let digit = self.digit().byte();
        prefix
            .iter()
            .copied()
            .chain([digit, FRAME_TERMINATOR])
    }
}
