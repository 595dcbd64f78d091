/*!
# Rip Sure: Library

This library is the durable, resumable core of a CD ripper. It caches tables
of contents and per-track rip results so that nothing expensive is read from
the drive twice, verifies ripped files against their checksums, and
reconciles local AccurateRip checksums against the database's submissions.

The physical reads are left to collaborators implementing [`TableReader`] and
[`TrackRipper`]; [`Pipeline`] ties everything together.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod cache;
mod chk;
mod disc;
mod error;
mod fetch;
#[cfg(test)] mod fixture;
mod offset;
mod reconcile;
mod result;
mod rip;
mod session;
mod store;
mod table;
mod table_cache;
mod verify;

pub use abort::KillSwitch;
pub use cache::Cache;
pub use chk::AccurateRipSource;
pub use disc::DiscIdentity;
pub use error::RipSureError;
pub use fetch::{
	Clock,
	fetch_submissions,
	RetryPolicy,
	SubmissionSource,
	SystemClock,
};
pub use offset::ReadOffset;
pub use reconcile::{
	ChecksumSubmission,
	DbVerdict,
	DbVerification,
	reconcile,
	SubmittedChecksum,
};
pub use result::{
	RipResult,
	TrackResult,
};
pub use rip::{
	opts::{
		RipOptions,
		RipOptionsTracks,
	},
	Pipeline,
	PipelineState,
	RippedTrack,
	RipRequest,
	TableReader,
	TrackRipper,
};
pub use session::{
	RipResultStore,
	RipSession,
};
pub use store::{
	load,
	Persist,
	save,
};
pub use table::{
	Table,
	TableTrack,
};
pub use table_cache::TableCache;
pub use verify::{
	TrackVerdict,
	verify,
};



/// # Cache Base.
///
/// The default cache root is thus `CWD/CACHE_BASE`.
pub const CACHE_BASE: &str = "_ripsure";

/// # Cache Scratch.
///
/// The scratch folder for non-track data, e.g. `CWD/CACHE_BASE/CACHE_SCRATCH`.
pub(crate) const CACHE_SCRATCH: &str = "scratch";

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Wave Spec.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
