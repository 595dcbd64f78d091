/*!
# Rip Sure: Errors
*/

use cdtoc::TocError;
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipSureError {
	/// # Bug!
	///
	/// A programming precondition was violated by the caller.
	Bug(&'static str),

	/// # Cache directory.
	Cache,

	/// # Cache Path.
	CachePath(String),

	/// # CDTOC passthrough.
	///
	/// This is for callers building a [`Toc`](cdtoc::Toc) to derive a
	/// [`DiscIdentity`](crate::DiscIdentity) from; the library itself never
	/// raises it.
	Cdtoc(TocError),

	/// # Database: Not Found.
	DbNotFound,

	/// # Database: Network Failure.
	DbNetwork(String),

	/// # Database: Unparseable Response.
	DbParse,

	/// # Invalid Disc Identity.
	DiscId,

	/// # Hardware Read Failure.
	///
	/// For [`TableReader`](crate::TableReader) and
	/// [`TrackRipper`](crate::TrackRipper) implementations to report drive
	/// trouble; the library itself never raises it.
	Hardware(String),

	/// # Unreadable File.
	Read(String),

	/// # User/Collaborator Abort.
	Killed,

	/// # Missing Checksum (Integrity).
	MissingChecksum(u8),

	/// # Noop.
	Noop,

	/// # No Track.
	NoTrack(u8),

	/// # Read Offset.
	ReadOffset,

	/// # Numbers can't be converted to the necessary types.
	RipOverflow,

	/// # Invalid Table of Contents.
	Table(&'static str),

	/// # Writing to disk.
	Write(String),
}

impl Error for RipSureError {}

impl From<TocError> for RipSureError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

impl From<RipSureError> for Msg {
	#[inline]
	fn from(src: RipSureError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipSureError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::Cache => f.write_str("Unable to establish a cache directory."),
			Self::CachePath(s) => write!(f, "Invalid cache path {s}."),
			Self::Cdtoc(s) => write!(f, "{s}"),
			Self::DbNotFound => f.write_str("The disc is not in the AccurateRip database."),
			Self::DbNetwork(s) => write!(f, "Unable to reach the AccurateRip database: {s}."),
			Self::DbParse => f.write_str("Unable to parse the AccurateRip response."),
			Self::DiscId => f.write_str("Invalid disc identity."),
			Self::Hardware(s) => write!(f, "Drive read failure: {s}."),
			Self::Read(s) => write!(f, "Unable to read {s}."),
			Self::Killed => f.write_str("User abort."),
			Self::MissingChecksum(n) => write!(f, "Track #{n} has no checksum; its rip result cannot be trusted."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::NoTrack(n) =>
				if *n == 0 { f.write_str("There is no HTOA on this disc.") }
				else { write!(f, "There is no track #{n} on this disc.") },
			Self::ReadOffset => f.write_str("Invalid read offset."),
			Self::RipOverflow => f.write_str("The numbers are too big for this system architecture."),
			Self::Table(s) => write!(f, "Invalid table of contents: {s}."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),
		}
	}
}

impl RipSureError {
	#[must_use]
	/// # Transient?
	///
	/// Returns `true` for failures worth retrying, i.e. network hiccups.
	/// Everything else will fail the same way the next time.
	pub const fn is_transient(&self) -> bool { matches!(self, Self::DbNetwork(_)) }
}
