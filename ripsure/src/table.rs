/*!
# Rip Sure: Table of Contents
*/

use crate::{
	RipSureError,
	SAMPLES_PER_SECTOR,
};
use serde::{
	Deserialize,
	Serialize,
};
use std::ops::RangeInclusive;



/// # Session Gap.
///
/// The number of sectors between the last audio track and a trailing data
/// session on enhanced CDs.
const SESSION_GAP: i32 = 11_400;



#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
/// # Table.
///
/// The logical layout of a disc: an ordered list of tracks, each with one or
/// more index points, and the leadout.
///
/// Tables are read from hardware (or the cache) and replaced wholesale, never
/// edited in place, so construction does not validate anything; use
/// [`Table::has_toc`] or [`Table::validate`] before trusting one.
pub struct Table {
	tracks: Vec<TableTrack>,
	leadout: i32,
}

impl Table {
	#[must_use]
	/// # New.
	pub const fn new(tracks: Vec<TableTrack>, leadout: i32) -> Self {
		Self { tracks, leadout }
	}

	#[must_use]
	/// # Has a Usable Table of Contents?
	pub fn has_toc(&self) -> bool { self.validate().is_ok() }

	/// # Validate.
	///
	/// A usable table has at least one track, numbered sequentially from one,
	/// each with an index #1. Index positions must be non-negative and
	/// strictly increasing across the whole disc, and end before the
	/// leadout.
	///
	/// ## Errors
	///
	/// Returns an error describing the first problem found.
	pub fn validate(&self) -> Result<(), RipSureError> {
		if self.tracks.is_empty() { return Err(RipSureError::Table("no tracks")); }

		let mut last: Option<i32> = None;
		for (k, t) in self.tracks.iter().enumerate() {
			if usize::from(t.number) != k + 1 {
				return Err(RipSureError::Table("tracks are not sequential"));
			}
			if t.index(1).is_none() {
				return Err(RipSureError::Table("track without index #1"));
			}

			let mut last_idx: Option<u8> = None;
			for &(idx, pos) in &t.indices {
				if pos < 0 {
					return Err(RipSureError::Table("negative index position"));
				}
				if last_idx.is_some_and(|v| idx <= v) {
					return Err(RipSureError::Table("index numbers out of order"));
				}
				if last.is_some_and(|v| pos <= v) {
					return Err(RipSureError::Table("index positions out of order"));
				}
				last_idx.replace(idx);
				last.replace(pos);
			}
		}

		if last.is_some_and(|v| v < self.leadout) { Ok(()) }
		else { Err(RipSureError::Table("leadout precedes the last index")) }
	}
}

impl Table {
	#[must_use]
	/// # Leadout.
	pub const fn leadout(&self) -> i32 { self.leadout }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[TableTrack] { &self.tracks }

	/// # Audio Tracks.
	pub fn audio_tracks(&self) -> impl Iterator<Item=&TableTrack> {
		self.tracks.iter().filter(|t| t.audio)
	}

	#[must_use]
	/// # Track.
	pub fn track(&self, number: u8) -> Option<&TableTrack> {
		let idx = usize::from(number).checked_sub(1)?;
		self.tracks.get(idx)
	}

	#[must_use]
	/// # First and Last Audio Track Numbers.
	pub fn audio_bounds(&self) -> Option<(u8, u8)> {
		let first = self.audio_tracks().next()?.number;
		let last = self.audio_tracks().last()?.number;
		Some((first, last))
	}

	#[must_use]
	/// # Hidden Track One Audio.
	///
	/// Return the inclusive sector range of the HTOA, i.e. track one's
	/// index #0 up to its index #1, if there is one.
	pub fn htoa(&self) -> Option<RangeInclusive<i32>> {
		let track = self.track(1)?;
		let start = track.index(0)?;
		let stop = track.index(1)? - 1;
		if start <= stop { Some(start..=stop) }
		else { None }
	}

	#[must_use]
	/// # Track Start.
	///
	/// This is the track's index #1.
	pub fn track_start(&self, number: u8) -> Option<i32> {
		self.track(number)?.index(1)
	}

	#[must_use]
	/// # Track End (Inclusive).
	///
	/// Tracks run up to the start of the next one (pregaps included), or the
	/// leadout. Audio tracks followed by a data track also lose the session
	/// gap.
	pub fn track_end(&self, number: u8) -> Option<i32> {
		let track = self.track(number)?;
		match self.track(number.checked_add(1)?) {
			Some(next) => {
				let mut end = next.index(1)? - 1;
				if track.audio && ! next.audio { end -= SESSION_GAP; }
				Some(end)
			},
			None => Some(self.leadout - 1),
		}
	}

	#[must_use]
	/// # Rip Range (Inclusive Sectors).
	///
	/// Track zero is the HTOA.
	pub fn rip_range(&self, number: u8) -> Option<RangeInclusive<i32>> {
		if number == 0 { self.htoa() }
		else {
			let start = self.track_start(number)?;
			let end = self.track_end(number)?;
			if start <= end { Some(start..=end) }
			else { None }
		}
	}

	#[must_use]
	/// # Expected Frames.
	///
	/// The number of stereo sample frames a complete rip of the track should
	/// contain.
	pub fn expected_frames(&self, number: u8) -> Option<u64> {
		let rng = self.rip_range(number)?;
		let sectors = u64::try_from(rng.end() - rng.start() + 1).ok()?;
		sectors.checked_mul(u64::from(SAMPLES_PER_SECTOR))
	}
}



#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
/// # Table Track.
///
/// A track number, its type, and its index points (index number, absolute
/// sector), sorted by index number.
pub struct TableTrack {
	number: u8,
	audio: bool,
	indices: Vec<(u8, i32)>,
}

impl TableTrack {
	#[must_use]
	/// # New.
	pub const fn new(number: u8, audio: bool) -> Self {
		Self { number, audio, indices: Vec::new() }
	}

	#[must_use]
	/// # With Index.
	///
	/// Add or replace an index point.
	pub fn with_index(mut self, idx: u8, absolute: i32) -> Self {
		match self.indices.binary_search_by_key(&idx, |&(k, _)| k) {
			Ok(pos) => { self.indices[pos].1 = absolute; },
			Err(pos) => { self.indices.insert(pos, (idx, absolute)); },
		}
		self
	}

	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Audio?
	pub const fn is_audio(&self) -> bool { self.audio }

	#[must_use]
	/// # Index Position.
	pub fn index(&self, idx: u8) -> Option<i32> {
		self.indices.iter().find_map(|&(k, v)| if k == idx { Some(v) } else { None })
	}

	#[must_use]
	/// # Index Points.
	pub fn indices(&self) -> &[(u8, i32)] { &self.indices }
}
