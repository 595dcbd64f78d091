/*!
# Rip Sure: Cross-Database Reconciliation
*/

use serde::{
	Deserialize,
	Serialize,
};
use std::fmt;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Submitted Checksum.
///
/// One track position's worth of a [`ChecksumSubmission`].
pub struct SubmittedChecksum {
	/// # Checksum.
	pub checksum: u32,

	/// # Confidence.
	///
	/// The number of independent rips agreeing with this checksum. Zero is a
	/// legitimate value.
	pub confidence: u32,
}



#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Checksum Submission.
///
/// One external party's claim about a disc: a checksum and confidence for
/// each track position, in track order.
pub struct ChecksumSubmission {
	tracks: Vec<SubmittedChecksum>,
}

impl From<Vec<SubmittedChecksum>> for ChecksumSubmission {
	#[inline]
	fn from(tracks: Vec<SubmittedChecksum>) -> Self { Self { tracks } }
}

impl FromIterator<(u32, u32)> for ChecksumSubmission {
	fn from_iter<I: IntoIterator<Item=(u32, u32)>>(iter: I) -> Self {
		Self {
			tracks: iter.into_iter()
				.map(|(checksum, confidence)| SubmittedChecksum { checksum, confidence })
				.collect(),
		}
	}
}

impl ChecksumSubmission {
	#[must_use]
	/// # Get Position.
	///
	/// Positions are zero-based.
	pub fn get(&self, idx: usize) -> Option<SubmittedChecksum> { self.tracks.get(idx).copied() }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.tracks.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.tracks.is_empty() }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
/// # Database Verdict.
pub enum DbVerdict {
	/// # No Submissions Cover This Track.
	NotVerifiable,

	/// # Matched.
	Matched {
		/// # The Matching Checksum.
		checksum: u32,

		/// # Confidence of the Matching Submission.
		confidence: u32,

		/// # Highest Confidence Seen at This Position.
		max_confidence: u32,
	},

	/// # Not Matched.
	Unmatched {
		/// # Checksum of the Most Confident Submission.
		best: u32,

		/// # Highest Confidence Seen at This Position.
		max_confidence: u32,
	},
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
/// # Database Verification.
///
/// The locally computed checksum for a track alongside what the database had
/// to say about it.
pub struct DbVerification {
	local: u32,
	verdict: DbVerdict,
}

impl fmt::Display for DbVerification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.verdict {
			DbVerdict::NotVerifiable =>
				write!(f, "rip NOT accurate (not found) [{:08x}], DB [notfound]", self.local),
			DbVerdict::Matched { checksum, confidence, max_confidence } => write!(
				f,
				"rip accurate (confidence {confidence} of {max_confidence}) [{:08x}], DB [{checksum:08x}]",
				self.local,
			),
			DbVerdict::Unmatched { best, max_confidence } => write!(
				f,
				"rip NOT accurate (max confidence {max_confidence}) [{:08x}], DB [{best:08x}]",
				self.local,
			),
		}
	}
}

impl DbVerification {
	#[must_use]
	/// # Local Checksum.
	pub const fn local(&self) -> u32 { self.local }

	#[must_use]
	/// # Verdict.
	pub const fn verdict(&self) -> DbVerdict { self.verdict }

	#[must_use]
	/// # Accurate?
	pub const fn is_accurate(&self) -> bool { matches!(self.verdict, DbVerdict::Matched { .. }) }

	#[must_use]
	/// # Database Checksum of Record.
	///
	/// This is the matching checksum, or failing that, the one from the most
	/// confident submission.
	pub const fn db_checksum(&self) -> Option<u32> {
		match self.verdict {
			DbVerdict::NotVerifiable => None,
			DbVerdict::Matched { checksum, .. } => Some(checksum),
			DbVerdict::Unmatched { best, .. } => Some(best),
		}
	}

	#[must_use]
	/// # Matching Confidence.
	pub const fn confidence(&self) -> Option<u32> {
		if let DbVerdict::Matched { confidence, .. } = self.verdict { Some(confidence) }
		else { None }
	}

	#[must_use]
	/// # Maximum Confidence Seen.
	pub const fn max_confidence(&self) -> Option<u32> {
		match self.verdict {
			DbVerdict::NotVerifiable => None,
			DbVerdict::Matched { max_confidence, .. } |
			DbVerdict::Unmatched { max_confidence, .. } => Some(max_confidence),
		}
	}
}



#[must_use]
/// # Reconcile.
///
/// Compare each locally computed checksum against the same position in every
/// submission, returning one verification per local checksum.
///
/// The first matching submission, in the order given, wins, even if a later
/// one matches with more confidence. The maximum confidence is tracked across
/// every submission covering the position whether or not it matched, and when
/// nothing matches, the checksum of the (first) most confident submission is
/// reported in its place.
///
/// Positions no submission covers are [`DbVerdict::NotVerifiable`].
///
/// The hidden track has no place in any of this; callers should pass regular
/// tracks only.
pub fn reconcile(local: &[u32], subs: &[ChecksumSubmission]) -> Vec<DbVerification> {
	local.iter()
		.enumerate()
		.map(|(idx, &local)| DbVerification { local, verdict: reconcile_one(idx, local, subs) })
		.collect()
}

/// # Reconcile One Position.
fn reconcile_one(idx: usize, local: u32, subs: &[ChecksumSubmission]) -> DbVerdict {
	let mut matched: Option<SubmittedChecksum> = None;
	let mut best: Option<SubmittedChecksum> = None;

	for sub in subs.iter().filter_map(|s| s.get(idx)) {
		if matched.is_none() && sub.checksum == local { matched.replace(sub); }
		if best.map_or(true, |b| b.confidence < sub.confidence) { best.replace(sub); }
	}

	match (matched, best) {
		(Some(m), Some(b)) => DbVerdict::Matched {
			checksum: m.checksum,
			confidence: m.confidence,
			max_confidence: b.confidence,
		},
		(None, Some(b)) => DbVerdict::Unmatched { best: b.checksum, max_confidence: b.confidence },
		_ => DbVerdict::NotVerifiable,
	}
}



#[cfg(test)]
mod test {
	use super::*;

	fn sub(src: &[(u32, u32)]) -> ChecksumSubmission { src.iter().copied().collect() }

	#[test]
	fn t_reconcile() {
		let subs = [
			sub(&[(0xAAAA, 5), (0xCCCC, 5)]),
			sub(&[(0x1111, 2), (0xBBBB, 9)]),
		];
		let out = reconcile(&[0xAAAA, 0xBBBB], &subs);
		assert_eq!(out.len(), 2);

		assert_eq!(out[0].local(), 0xAAAA);
		assert_eq!(
			out[0].verdict(),
			DbVerdict::Matched { checksum: 0xAAAA, confidence: 5, max_confidence: 5 },
		);
		assert_eq!(
			out[1].verdict(),
			DbVerdict::Matched { checksum: 0xBBBB, confidence: 9, max_confidence: 9 },
		);
		assert!(out.iter().all(DbVerification::is_accurate));

		// Same input, same output.
		for _ in 0..5 { assert_eq!(reconcile(&[0xAAAA, 0xBBBB], &subs), out); }
	}

	#[test]
	fn t_first_match() {
		// Both match; the first wins despite lower confidence, but the max is
		// still reported.
		let subs = [sub(&[(0xAAAA, 1)]), sub(&[(0x2222, 50)]), sub(&[(0xAAAA, 20)])];
		let out = reconcile(&[0xAAAA], &subs);
		assert_eq!(
			out[0].verdict(),
			DbVerdict::Matched { checksum: 0xAAAA, confidence: 1, max_confidence: 50 },
		);
		assert_eq!(out[0].confidence(), Some(1));
		assert_eq!(out[0].max_confidence(), Some(50));
	}

	#[test]
	fn t_unmatched() {
		// Ties go to the first.
		let subs = [sub(&[(0x1111, 3)]), sub(&[(0x2222, 7)]), sub(&[(0x3333, 7)])];
		let out = reconcile(&[0xAAAA], &subs);
		assert_eq!(out[0].verdict(), DbVerdict::Unmatched { best: 0x2222, max_confidence: 7 });
		assert_eq!(out[0].db_checksum(), Some(0x2222));
		assert!(! out[0].is_accurate());
		assert_eq!(out[0].confidence(), None);
	}

	#[test]
	fn t_zero_confidence() {
		let out = reconcile(&[0xAAAA], &[sub(&[(0xAAAA, 0)])]);
		assert_eq!(
			out[0].verdict(),
			DbVerdict::Matched { checksum: 0xAAAA, confidence: 0, max_confidence: 0 },
			"Zero confidence is still a match.",
		);

		// And zero confidence elsewhere is still a candidate.
		let out = reconcile(&[0xAAAA], &[sub(&[(0x1234, 0)])]);
		assert_eq!(out[0].verdict(), DbVerdict::Unmatched { best: 0x1234, max_confidence: 0 });
	}

	#[test]
	fn t_not_verifiable() {
		let out = reconcile(&[0xAAAA, 0xBBBB], &[]);
		assert_eq!(out.len(), 2);
		assert!(out.iter().all(|v| v.verdict() == DbVerdict::NotVerifiable));
		assert_eq!(out[1].local(), 0xBBBB, "Local checksums are always recorded.");

		// Submissions too short to cover a position.
		let out = reconcile(&[0xAAAA, 0xBBBB], &[sub(&[(0xAAAA, 2)])]);
		assert!(out[0].is_accurate());
		assert_eq!(out[1].verdict(), DbVerdict::NotVerifiable);
		assert_eq!(out[1].db_checksum(), None);
	}

	#[test]
	fn t_display() {
		let out = reconcile(&[0xAAAA, 0xBBBB], &[sub(&[(0xAAAA, 5), (0x1234, 3)])]);
		assert_eq!(
			out[0].to_string(),
			"rip accurate (confidence 5 of 5) [0000aaaa], DB [0000aaaa]",
		);
		assert_eq!(
			out[1].to_string(),
			"rip NOT accurate (max confidence 3) [0000bbbb], DB [00001234]",
		);
	}
}
