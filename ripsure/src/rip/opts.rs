/*!
# Rip Sure: Ripping Options
*/

use crate::{
	ReadOffset,
	RetryPolicy,
};



/// # FLAG: Resume previous rip (when applicable).
const FLAG_RESUME: u8 =  0b0000_0001;

/// # FLAG: Verbose logging.
const FLAG_VERBOSE: u8 = 0b0000_0010;

/// # FLAG: Include the HTOA in whole-disc rips.
const FLAG_HTOA: u8 =    0b0000_0100;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_RESUME | FLAG_HTOA;



#[derive(Debug, Clone, Copy)]
/// # Rip Options.
///
/// This struct holds the rip-related options like read offset, track numbers,
/// etc.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use ripsure::RipOptions;
///
/// let opts = RipOptions::default()
///     .with_verbose(true)
///     .with_track(3) // Order doesn't matter.
///     .with_track(2)
///     .with_track(15);
///
/// assert!(opts.verbose());
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3, 15]);
/// ```
pub struct RipOptions {
	offset: ReadOffset,
	retry: RetryPolicy,
	flags: u8,
	tracks: u128,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			offset: ReadOffset::default(),
			retry: RetryPolicy::default(),
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl RipOptions {
	with_flag!(
		with_htoa,
		FLAG_HTOA,
		"# Include HTOA.",
		"",
		"When `true` and no specific tracks have been requested, a hidden",
		"track (if any) will be ripped along with the rest of the disc.",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Read Offset.
	///
	/// Optical drives have weirdly arbitrary precision problems, causing them
	/// to read data a little earlier or later than another drive might.
	///
	/// The offset is passed along to the table reader and track ripper, and
	/// keys the table cache, since the same disc read at different offsets
	/// has different boundaries.
	pub const fn with_offset(self, offset: ReadOffset) -> Self {
		Self {
			offset,
			..self
		}
	}

	#[must_use]
	/// # Database Retry Policy.
	///
	/// Control how (and how often) failed AccurateRip lookups are retried.
	pub const fn with_retry(self, retry: RetryPolicy) -> Self {
		Self {
			retry,
			..self
		}
	}

	with_flag!(
		with_resume,
		FLAG_RESUME,
		"# Resume Previous Rip.",
		"",
		"When `true`, tracks already ripped (and still intact) during a",
		"previous run will be skipped. When `false`, everything starts over",
		"from scratch.",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Include Track.
	///
	/// Add a given track number to the to-rip list. Zero is the HTOA.
	pub const fn with_track(self, track: u8) -> Self {
		let tracks = self.tracks | track_idx_to_bits(track);
		Self {
			tracks,
			..self
		}
	}

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose.",
		"",
		"When `true`, a detailed log of everything that happened will be",
		"printed to STDOUT at the end of the run.",
		"",
		"The default is `false`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl RipOptions {
	get_flag!(htoa, FLAG_HTOA, "Include HTOA");
	get_flag!(resume, FLAG_RESUME, "Resume Previous Rip");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose");

	#[must_use]
	/// # Has Any Tracks?
	///
	/// If not, the whole disc will be ripped.
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Has Track?
	pub const fn has_track(&self, track: u8) -> bool {
		0 != self.tracks & track_idx_to_bits(track)
	}

	#[must_use]
	/// # Read Offset.
	pub const fn offset(&self) -> ReadOffset { self.offset }

	#[must_use]
	/// # Database Retry Policy.
	pub const fn retry(&self) -> RetryPolicy { self.retry }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track indices.
	pub const fn tracks(&self) -> RipOptionsTracks {
		RipOptionsTracks {
			set: self.tracks,
			pos: 0,
		}
	}
}



#[derive(Debug, Clone)]
/// # Rip Option Tracks.
///
/// This iterator converts the `u128` monster flag back into individual `u8`
/// track indexes.
pub struct RipOptionsTracks {
	set: u128,
	pos: u8,
}

impl Iterator for RipOptionsTracks {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pos < 100 {
			let idx = self.pos;
			self.pos += 1;
			if 0 != self.set & track_idx_to_bits(idx) {
				return Some(idx);
			}
		}
		None
	}

	/// # Size Hint.
	///
	/// There will never be more than 99 tracks.
	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(100_usize.saturating_sub(usize::from(self.pos))))
	}
}



/// # Track Number to Bitflag.
///
/// Redbook audio CDs have at most 99 tracks, or 100 counting the HTOA as #0,
/// so every possible selection fits in a single `u128`.
///
/// Out of range values are silently treated as zero.
const fn track_idx_to_bits(idx: u8) -> u128 {
	if 99 < idx { 0 }
	else { 2_u128.pow(idx as u32) }
}
