/*!
# Rip Sure: Read Offset
*/

use crate::RipSureError;
use dactyl::traits::BytesToSigned;
use serde::{
	Deserialize,
	Serialize,
};
use std::fmt;
use trimothy::TrimSlice;



/// # Min Offset.
const MIN_OFFSET: i16 = -5880;

/// # Max Offset.
const MAX_OFFSET: i16 = 5880;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
/// # Read Offset.
///
/// This holds a drive's read offset in samples.
///
/// The same disc read with different offsets yields different absolute
/// sector positions, so this forms part of the table cache key.
///
/// For historical reasons, values are restricted to `-5880..=5880`.
pub struct ReadOffset(i16);

impl fmt::Display for ReadOffset {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:+}", self.0)
	}
}

impl TryFrom<i16> for ReadOffset {
	type Error = RipSureError;
	fn try_from(src: i16) -> Result<Self, Self::Error> {
		if (MIN_OFFSET..=MAX_OFFSET).contains(&src) { Ok(Self(src)) }
		else { Err(RipSureError::ReadOffset) }
	}
}

impl TryFrom<&[u8]> for ReadOffset {
	type Error = RipSureError;
	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		let src = src.trim();
		if src.is_empty() { Ok(Self(0)) }
		else {
			// The parser doesn't care for explicit plus signs.
			let src = src.strip_prefix(b"+").unwrap_or(src);
			i16::btoi(src)
				.ok_or(RipSureError::ReadOffset)
				.and_then(Self::try_from)
		}
	}
}

impl TryFrom<&str> for ReadOffset {
	type Error = RipSureError;
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		Self::try_from(src.as_bytes())
	}
}

impl ReadOffset {
	#[must_use]
	/// # Samples.
	pub const fn samples(self) -> i16 { self.0 }

	#[must_use]
	/// # Samples (Absolute).
	pub const fn samples_abs(self) -> u16 { self.0.unsigned_abs() }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_offset_parse() {
		for (raw, expected) in [
			("0", 0_i16),
			("", 0),
			(" 6 ", 6),
			("+667", 667),
			("-1164", -1164),
			("5880", 5880),
			("-5880", -5880),
		] {
			let offset = ReadOffset::try_from(raw).expect("Offset failed to parse.");
			assert_eq!(offset.samples(), expected, "Offset mismatch for {raw:?}.");
		}

		for raw in ["5881", "-5881", "six", "1.5"] {
			assert!(ReadOffset::try_from(raw).is_err(), "Offset {raw:?} should be invalid.");
		}
	}

	#[test]
	fn t_offset_abs() {
		for (samples, abs) in [(0_i16, 0_u16), (6, 6), (-588, 588), (-5880, 5880)] {
			let offset = ReadOffset::try_from(samples).expect("Offset failed.");
			assert_eq!(offset.samples_abs(), abs, "Absolute mismatch for {samples}.");
		}
	}

	#[test]
	fn t_offset_display() {
		let offset = ReadOffset::try_from(6_i16).expect("Offset failed.");
		assert_eq!(offset.to_string(), "+6");
		let offset = ReadOffset::try_from(-667_i16).expect("Offset failed.");
		assert_eq!(offset.to_string(), "-667");
	}
}
