/*!
# Rip Sure: Checksum Verifier
*/

use crate::{
	RipSureError,
	WAVE_SPEC,
};
use crc32fast::Hasher as Crc;
use hound::WavReader;
use serde::{
	Deserialize,
	Serialize,
};
use std::{
	fmt,
	fs::File,
	io::BufReader,
	path::Path,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
/// # Verification Verdict.
pub enum TrackVerdict {
	/// # The file matches.
	Verified,

	/// # The file is complete, but the checksum differs.
	Mismatched {
		/// # Expected CRC32.
		expected: u32,

		/// # Actual CRC32.
		actual: u32,
	},

	/// # The file is missing audio.
	Incomplete {
		/// # Expected Frames.
		expected: u64,

		/// # Frames Found.
		actual: u64,
	},
}

impl fmt::Display for TrackVerdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Verified => f.write_str("verified"),
			Self::Mismatched { expected, actual } =>
				write!(f, "checksum mismatch (expected {expected:08X}, got {actual:08X})"),
			Self::Incomplete { expected, actual } =>
				write!(f, "incomplete audio ({actual} of {expected} frames)"),
		}
	}
}

impl TrackVerdict {
	#[must_use]
	/// # Verified?
	pub const fn is_verified(self) -> bool { matches!(self, Self::Verified) }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Frame Scan Summary.
pub(crate) struct FrameScan {
	/// # Frames Read.
	pub(crate) frames: u64,

	/// # Ended Early?
	pub(crate) truncated: bool,
}



/// # Verify.
///
/// Compute the CRC32 of the decoded audio in `src` and compare it against
/// `expected_crc`.
///
/// Files with fewer than `expected_frames` stereo frames, including those that
/// end partway through their declared data, come back
/// [`TrackVerdict::Incomplete`] regardless of checksum.
///
/// ## Errors
///
/// Any other read or format error is returned as-is.
pub fn verify(src: &Path, expected_frames: u64, expected_crc: u32)
-> Result<TrackVerdict, RipSureError> {
	let (crc, scan) = crc32(src)?;
	if scan.truncated || scan.frames < expected_frames {
		Ok(TrackVerdict::Incomplete { expected: expected_frames, actual: scan.frames })
	}
	else if crc == expected_crc { Ok(TrackVerdict::Verified) }
	else { Ok(TrackVerdict::Mismatched { expected: expected_crc, actual: crc }) }
}

/// # CRC32.
///
/// Hash the raw little-endian PCM of `src`.
///
/// ## Errors
///
/// Returns an error if the file cannot be opened or is not 16-bit stereo.
pub(crate) fn crc32(src: &Path) -> Result<(u32, FrameScan), RipSureError> {
	let mut crc = Crc::new();
	let scan = for_each_frame(src, |frame| { crc.update(frame.as_slice()); })?;
	Ok((crc.finalize(), scan))
}

/// # Peak Level.
///
/// Return the largest absolute sample value in the file.
///
/// ## Errors
///
/// Returns an error if the file cannot be opened or is not 16-bit stereo.
pub(crate) fn peak_level(src: &Path) -> Result<u16, RipSureError> {
	let mut peak = 0_u16;
	for_each_frame(src, |frame| {
		let l = i16::from_le_bytes([frame[0], frame[1]]).unsigned_abs();
		let r = i16::from_le_bytes([frame[2], frame[3]]).unsigned_abs();
		peak = peak.max(l).max(r);
	})?;
	Ok(peak)
}

/// # For Each Frame.
///
/// Feed each stereo frame of `src` to the callback as raw little-endian PCM
/// bytes, left then right.
///
/// Running out of data early, be it mid-header, mid-stream, or mid-frame, is
/// reported as truncation rather than an error.
///
/// ## Errors
///
/// Returns an error if the file cannot be opened, is not 16-bit stereo, or
/// cannot be read for some reason other than being short.
pub(crate) fn for_each_frame<F>(src: &Path, mut cb: F) -> Result<FrameScan, RipSureError>
where F: FnMut([u8; 4]) {
	let err = || RipSureError::Read(src.to_string_lossy().into_owned());
	let truncated = FrameScan { frames: 0, truncated: true };

	// Hound reports short reads as generic IO errors, so the file is opened
	// separately; from there on any IO error means we ran out of data.
	let file = File::open(src).map_err(|_| err())?;
	let mut reader = match WavReader::new(BufReader::new(file)) {
		Ok(r) => r,
		Err(hound::Error::IoError(_)) => return Ok(truncated),
		Err(_) => return Err(err()),
	};

	let spec = reader.spec();
	if
		spec.channels != WAVE_SPEC.channels ||
		spec.bits_per_sample != WAVE_SPEC.bits_per_sample ||
		spec.sample_format != WAVE_SPEC.sample_format
	{
		return Err(err());
	}

	let mut out = FrameScan { frames: 0, truncated: false };
	let mut left: Option<i16> = None;
	for sample in reader.samples::<i16>() {
		match sample {
			Ok(s) =>
				if let Some(l) = left.take() {
					let [a, b] = l.to_le_bytes();
					let [c, d] = s.to_le_bytes();
					cb([a, b, c, d]);
					out.frames += 1;
				}
				else { left.replace(s); },
			Err(hound::Error::IoError(_)) => {
				out.truncated = true;
				break;
			},
			Err(_) => return Err(err()),
		}
	}

	// A dangling left channel.
	if left.is_some() { out.truncated = true; }

	Ok(out)
}
