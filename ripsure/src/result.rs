/*!
# Rip Sure: Rip Results
*/

use crate::{
	DbVerification,
	Persist,
	Table,
	TrackVerdict,
};
use serde::{
	Deserialize,
	Serialize,
};
use std::{
	collections::BTreeMap,
	path::{
		Path,
		PathBuf,
	},
	time::Duration,
};



#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
/// # Rip Result.
///
/// Everything known about one rip of one disc: the table it was ripped
/// against and the outcome for each track, keyed by number (zero being the
/// HTOA).
pub struct RipResult {
	pub(crate) table: Option<Table>,
	pub(crate) tracks: BTreeMap<u8, TrackResult>,
}

impl Persist for RipResult {
	const MAGIC: [u8; 8] = *b"RSurRR01";
}

impl RipResult {
	#[must_use]
	/// # Table.
	pub const fn table(&self) -> Option<&Table> { self.table.as_ref() }

	#[must_use]
	/// # Track.
	pub fn track(&self, number: u8) -> Option<&TrackResult> { self.tracks.get(&number) }

	/// # Tracks.
	///
	/// Return the track results in order.
	pub fn tracks(&self) -> impl Iterator<Item=&TrackResult> { self.tracks.values() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.tracks.is_empty() }

	#[must_use]
	/// # Accurate?
	///
	/// Returns `true` if every regular track was confirmed by the database.
	/// The HTOA is not considered.
	pub fn is_accurate(&self) -> bool {
		let mut any = false;
		for t in self.tracks.values().filter(|t| t.number != 0) {
			if ! t.is_accurate() { return false; }
			any = true;
		}
		any
	}

	#[must_use]
	/// # AccurateRip Summary.
	///
	/// Return one line per track and checksum version describing the
	/// database verdict.
	pub fn accuraterip_summary(&self) -> Vec<String> {
		let mut out = Vec::new();
		for t in self.tracks.values() {
			let n = t.number;
			if n == 0 {
				out.push("Track 00: unknown (not tracked)".to_owned());
				continue;
			}

			match (t.accuraterip_v1, t.accuraterip_v2) {
				(None, None) => out.push(format!("Track {n:02}: unknown (not reconciled)")),
				(v1, v2) => {
					if let Some(v1) = v1 { out.push(format!("Track {n:02}: {v1} v1")); }
					if let Some(v2) = v2 { out.push(format!("Track {n:02}: {v2} v2")); }
				},
			}
		}
		out
	}
}



#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// # Track Result.
///
/// The outcome of ripping a single track, accumulated across runs.
pub struct TrackResult {
	pub(crate) number: u8,
	pub(crate) path: PathBuf,
	pub(crate) test_crc: Option<u32>,
	pub(crate) copy_crc: Option<u32>,
	pub(crate) peak: Option<u16>,
	pub(crate) quality: Option<f64>,
	pub(crate) test_speed: Option<f64>,
	pub(crate) copy_speed: Option<f64>,
	pub(crate) test_duration: Duration,
	pub(crate) copy_duration: Duration,
	pub(crate) verdict: Option<TrackVerdict>,
	pub(crate) accuraterip_v1: Option<DbVerification>,
	pub(crate) accuraterip_v2: Option<DbVerification>,
}

impl TrackResult {
	#[must_use]
	/// # New.
	pub(crate) const fn new(number: u8, path: PathBuf) -> Self {
		Self {
			number,
			path,
			test_crc: None,
			copy_crc: None,
			peak: None,
			quality: None,
			test_speed: None,
			copy_speed: None,
			test_duration: Duration::ZERO,
			copy_duration: Duration::ZERO,
			verdict: None,
			accuraterip_v1: None,
			accuraterip_v2: None,
		}
	}

	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # File Path.
	pub fn path(&self) -> &Path { &self.path }

	#[must_use]
	/// # Test CRC32.
	pub const fn test_crc(&self) -> Option<u32> { self.test_crc }

	#[must_use]
	/// # Copy CRC32.
	pub const fn copy_crc(&self) -> Option<u32> { self.copy_crc }

	#[must_use]
	/// # Checksum.
	///
	/// This is the copy CRC, or the test CRC if there was no copy pass.
	pub const fn checksum(&self) -> Option<u32> {
		if self.copy_crc.is_some() { self.copy_crc }
		else { self.test_crc }
	}

	#[must_use]
	/// # Consistent?
	///
	/// Returns `false` only if both passes were made and disagree.
	pub const fn is_consistent(&self) -> bool {
		match (self.test_crc, self.copy_crc) {
			(Some(a), Some(b)) => a == b,
			_ => true,
		}
	}

	#[must_use]
	/// # Peak Level.
	pub const fn peak(&self) -> Option<u16> { self.peak }

	#[must_use]
	/// # Quality.
	pub const fn quality(&self) -> Option<f64> { self.quality }

	#[must_use]
	/// # Speeds (Test, Copy).
	pub const fn speeds(&self) -> (Option<f64>, Option<f64>) { (self.test_speed, self.copy_speed) }

	#[must_use]
	/// # Durations (Test, Copy).
	///
	/// These are cumulative across re-rips.
	pub const fn durations(&self) -> (Duration, Duration) { (self.test_duration, self.copy_duration) }

	#[must_use]
	/// # Verifier Verdict.
	pub const fn verdict(&self) -> Option<TrackVerdict> { self.verdict }

	#[must_use]
	/// # AccurateRip (v1).
	pub const fn accuraterip_v1(&self) -> Option<DbVerification> { self.accuraterip_v1 }

	#[must_use]
	/// # AccurateRip (v2).
	pub const fn accuraterip_v2(&self) -> Option<DbVerification> { self.accuraterip_v2 }

	#[must_use]
	/// # Accurate?
	///
	/// A regular track is accurate if either AccurateRip version matched. The
	/// HTOA never is.
	pub fn is_accurate(&self) -> bool {
		self.number != 0 &&
		(
			self.accuraterip_v1.is_some_and(|v| v.is_accurate()) ||
			self.accuraterip_v2.is_some_and(|v| v.is_accurate())
		)
	}
}
