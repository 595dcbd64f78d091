/*!
# Rip Sure: Log
*/

use crate::{
	DbVerification,
	ReadOffset,
	RipSureError,
	TrackVerdict,
};
use dactyl::NiceElapsed;
use std::{
	fmt,
	io::Write,
	path::PathBuf,
	time::Instant,
};
use utc2k::FmtUtc2k;



/// # Super Basic Log.
///
/// This holds the log-worthy details from a run, printing them out en masse
/// at the end (if verbose).
///
/// Doing it this way, versus printing each line in realtime, keeps the output
/// from getting tangled up with the progress bar.
pub(super) struct RipLog {
	verbose: bool,
	start: Instant,
	events: Vec<(FmtUtc2k, RipLogEvent)>,
}

impl Drop for RipLog {
	/// # Final Print Maybe.
	fn drop(&mut self) { self.flush(); }
}

impl RipLog {
	/// # New Instance.
	pub(super) fn new(verbose: bool) -> Self {
		Self {
			verbose,
			start: Instant::now(),
			events: Vec::new(),
		}
	}

	/// # Add Event.
	pub(super) fn add(&mut self, event: RipLogEvent) {
		if self.verbose { self.events.push((FmtUtc2k::now(), event)); }
	}

	/// # Events.
	#[cfg(test)]
	pub(super) fn events(&self) -> impl Iterator<Item=&RipLogEvent> {
		self.events.iter().map(|(_, e)| e)
	}

	/// # Flush.
	pub(super) fn flush(&mut self) {
		if self.events.is_empty() { return; }

		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = writeln!(
			&mut handle,
			r"##
## Rip Sure: {}
## Events: {}
##",
			NiceElapsed::from(self.start),
			self.events.len(),
		);

		for (time, event) in self.events.drain(..) {
			let _res = writeln!(&mut handle, "## [{time}] {event}");
		}

		// Write it!
		let _res = writeln!(&mut handle, "##");
		let _res = handle.flush();
	}
}



#[derive(Debug, Clone, PartialEq)]
/// # Log Event.
pub(super) enum RipLogEvent {
	/// # Table From Cache.
	TableCached(ReadOffset),

	/// # Table From Hardware.
	TableRead(ReadOffset),

	/// # Track Skipped (Already Ripped).
	Resumed(u8),

	/// # Track Ripped.
	Ripped {
		track: u8,
		test_speed: Option<f64>,
		copy_speed: Option<f64>,
	},

	/// # Destination Changed.
	Renamed(u8, PathBuf),

	/// # Test/Copy Mismatch.
	Inconsistent(u8),

	/// # Peak Measured Locally.
	PeakMeasured(u8, u16),

	/// # Verifier Verdict.
	Verdict(u8, TrackVerdict),

	/// # Submissions Fetched.
	Submissions(usize),

	/// # Reconciliation Outcome.
	Reconciled(u8, Option<DbVerification>, Option<DbVerification>),

	/// # Reconciliation Skipped.
	NotReconciled(&'static str),

	/// # Error.
	Error(RipSureError),
}

impl fmt::Display for RipLogEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::TableCached(o) => write!(f, "Table of contents loaded from cache (offset {o})."),
			Self::TableRead(o) => write!(f, "Table of contents read from disc (offset {o})."),
			Self::Resumed(n) => write!(f, "Track {n:02}: previously ripped and intact; skipped."),
			Self::Ripped { track, test_speed, copy_speed } => {
				write!(f, "Track {track:02}: ripped")?;
				if let Some(s) = test_speed { write!(f, ", test {s:.1}x")?; }
				if let Some(s) = copy_speed { write!(f, ", copy {s:.1}x")?; }
				f.write_str(".")
			},
			Self::Renamed(n, p) => write!(f, "Track {n:02}: saved to {}.", p.display()),
			Self::Inconsistent(n) => write!(f, "Track {n:02}: test and copy checksums differ."),
			Self::PeakMeasured(n, p) => write!(f, "Track {n:02}: peak level {p} (measured)."),
			Self::Verdict(n, v) => write!(f, "Track {n:02}: {v}."),
			Self::Submissions(n) => write!(f, "{n} AccurateRip submission(s) found."),
			Self::Reconciled(n, v1, v2) => {
				write!(f, "Track {n:02}:")?;
				if let Some(v) = v1 { write!(f, " v1 {v};")?; }
				if let Some(v) = v2 { write!(f, " v2 {v};")?; }
				Ok(())
			},
			Self::NotReconciled(why) => write!(f, "AccurateRip skipped: {why}."),
			Self::Error(e) => write!(f, "{e}"),
		}
	}
}
