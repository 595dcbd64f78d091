/*!
# Rip Sure: Ripping
*/

mod log;
pub(super) mod opts;

use crate::{
	Cache,
	chk::accuraterip_checksums,
	Clock,
	DiscIdentity,
	fetch_submissions,
	KillSwitch,
	ReadOffset,
	reconcile,
	RipOptions,
	RipResult,
	RipResultStore,
	RipSession,
	RipSureError,
	SubmissionSource,
	SystemClock,
	Table,
	TableCache,
	TableTrack,
	TrackResult,
	TrackVerdict,
	verify::{
		peak_level,
		verify,
	},
};
use fyi_msg::{
	Msg,
	Progless,
};
use log::{
	RipLog,
	RipLogEvent,
};
use std::{
	fmt,
	ops::RangeInclusive,
	path::{
		Path,
		PathBuf,
	},
	time::Duration,
};



/// # Table Reader.
///
/// Whatever reads the table of contents from the physical disc.
pub trait TableReader {
	/// # Read Table.
	///
	/// ## Errors
	///
	/// Hardware failures should be returned as errors; they are fatal.
	fn read_table(&mut self, offset: ReadOffset) -> Result<Table, RipSureError>;
}

/// # Track Ripper.
///
/// Whatever extracts (and saves) the audio for a single track.
pub trait TrackRipper {
	/// # Rip Track.
	///
	/// Rip the requested sectors to the requested destination, or somewhere
	/// nearby; the final path is part of the response.
	///
	/// ## Errors
	///
	/// Hardware failures should be returned as errors; they are fatal.
	fn rip_track(&mut self, req: &RipRequest<'_>) -> Result<RippedTrack, RipSureError>;
}



#[derive(Debug, Clone)]
/// # Rip Request.
pub struct RipRequest<'a> {
	/// # Table of Contents.
	pub table: &'a Table,

	/// # Track Number (Zero for HTOA).
	pub track: u8,

	/// # Sectors (Inclusive).
	pub sectors: RangeInclusive<i32>,

	/// # Read Offset.
	pub offset: ReadOffset,

	/// # Destination.
	pub dst: &'a Path,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// # Ripped Track.
///
/// What the ripper has to say about a finished rip.
pub struct RippedTrack {
	/// # Test Pass CRC32.
	pub test_crc: Option<u32>,

	/// # Copy Pass CRC32.
	pub copy_crc: Option<u32>,

	/// # Peak Level.
	///
	/// If omitted, it will be measured from the file.
	pub peak: Option<u16>,

	/// # Quality (Percent).
	pub quality: Option<f64>,

	/// # Test Pass Speed.
	pub test_speed: Option<f64>,

	/// # Copy Pass Speed.
	pub copy_speed: Option<f64>,

	/// # Test Pass Duration.
	pub test_duration: Duration,

	/// # Copy Pass Duration.
	pub copy_duration: Duration,

	/// # Final Path.
	pub path: PathBuf,
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Pipeline State.
pub enum PipelineState {
	#[default]
	/// # Nothing Yet.
	Idle,

	/// # Table of Contents Acquired.
	TableAcquired,

	/// # Ripping a Track.
	Ripping(u8),

	/// # All Requested Tracks Ripped.
	RipComplete,

	/// # Reconciled (Done).
	Reconciled,

	/// # Aborted (Done).
	Aborted,
}



/// # Rip Pipeline.
///
/// This ties everything together: table acquisition, track ripping,
/// verification, and reconciliation against AccurateRip, saving progress
/// along the way so interrupted rips can pick up where they left off.
pub struct Pipeline {
	cache: Cache,
	tables: TableCache,
	results: RipResultStore,
	opts: RipOptions,
	clock: Box<dyn Clock>,
	state: PipelineState,
}

impl fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline")
			.field("cache", &self.cache)
			.field("opts", &self.opts)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl Pipeline {
	#[must_use]
	/// # New.
	pub fn new(cache: Cache, opts: RipOptions) -> Self {
		Self {
			tables: TableCache::new(cache.clone()),
			results: RipResultStore::new(cache.clone()),
			cache,
			opts,
			clock: Box::new(SystemClock),
			state: PipelineState::Idle,
		}
	}

	#[must_use]
	/// # With Clock.
	///
	/// Replace the clock used to pace database retries.
	pub fn with_clock<C: Clock + 'static>(self, clock: C) -> Self {
		Self { clock: Box::new(clock), ..self }
	}

	#[must_use]
	/// # State.
	pub const fn state(&self) -> PipelineState { self.state }

	#[must_use]
	/// # Options.
	pub const fn opts(&self) -> &RipOptions { &self.opts }

	#[must_use]
	/// # Table Cache.
	pub const fn tables(&self) -> &TableCache { &self.tables }

	#[must_use]
	/// # Rip Result Store.
	pub const fn results(&self) -> &RipResultStore { &self.results }

	/// # Rip!
	///
	/// Acquire the table, rip (or resume) the requested tracks, verify them,
	/// and reconcile the results with the database, saving as we go.
	///
	/// ## Errors
	///
	/// Hardware failures, integrity faults, cache write failures, and aborts
	/// all stop the pipeline with an error, leaving the last saved result as
	/// the resume point. Database problems do not; the tracks are simply left
	/// unverified.
	pub fn rip(
		&mut self,
		id: &DiscIdentity,
		reader: &mut dyn TableReader,
		ripper: &mut dyn TrackRipper,
		source: &dyn SubmissionSource,
		progress: &Progless,
		killed: &KillSwitch,
	) -> Result<RipResult, RipSureError> {
		self.state = PipelineState::Idle;
		let mut share = RipShare {
			reader,
			ripper,
			source,
			log: RipLog::new(self.opts.verbose()),
			progress,
			killed,
		};

		let out = self.rip_inner(id, &mut share);
		if let Err(e) = &out {
			self.state = PipelineState::Aborted;
			share.log.add(RipLogEvent::Error(e.clone()));
		}
		progress.finish();
		out
	}
}

impl Pipeline {
	/// # Rip (Inner).
	fn rip_inner(&mut self, id: &DiscIdentity, share: &mut RipShare<'_>)
	-> Result<RipResult, RipSureError> {
		let Self { cache, tables, results, opts, clock, state } = self;
		share.check_killed()?;

		// Table first.
		let table = acquire_table(tables, id, opts.offset(), share)?;
		let tracks = prune_tracks(opts, &table)?;

		let mut session = results.session(id, opts.resume())?;
		session.set_table(table.clone());
		session.save()?;
		*state = PipelineState::TableAcquired;

		// Tracks, plus verification and reconciliation.
		let total = u32::try_from(tracks.len() + 2).map_err(|_| RipSureError::RipOverflow)?;
		let _res = share.progress.reset(total);

		for &n in &tracks {
			share.check_killed()?;
			*state = PipelineState::Ripping(n);
			rip_track(cache, id, &table, n, opts, &mut session, share)?;
			share.progress.increment();
		}
		*state = PipelineState::RipComplete;

		// Final verification.
		share.check_killed()?;
		verify_tracks(&table, &tracks, &mut session, share)?;
		session.save()?;
		share.progress.increment();

		// Reconciliation.
		share.check_killed()?;
		if reconcile_tracks(id, &table, opts, &**clock, &mut session, share)? {
			session.save()?;
			*state = PipelineState::Reconciled;
		}
		share.progress.increment();

		session.finish()
	}
}



/// # Rip Share.
///
/// This groups together all the shared elements needed exclusively during the
/// ripping run, eliminating the need to pass a half dozen separate variables
/// between methods.
struct RipShare<'a> {
	reader: &'a mut dyn TableReader,
	ripper: &'a mut dyn TrackRipper,
	source: &'a dyn SubmissionSource,
	log: RipLog,
	progress: &'a Progless,
	killed: &'a KillSwitch,
}

impl RipShare<'_> {
	/// # Bail if Killed.
	fn check_killed(&self) -> Result<(), RipSureError> {
		if self.killed.killed() { Err(RipSureError::Killed) }
		else { Ok(()) }
	}
}



/// # Acquire Table.
///
/// Pull the table from the cache, or failing that, the disc, caching the
/// latter for next time.
fn acquire_table(
	tables: &TableCache,
	id: &DiscIdentity,
	offset: ReadOffset,
	share: &mut RipShare<'_>,
) -> Result<Table, RipSureError> {
	if let Some(table) = tables.get_offset(id, offset)? {
		share.log.add(RipLogEvent::TableCached(offset));
		return Ok(table);
	}

	set_progress_title(share.progress, "Disc", "Reading the table of contents…");
	let table = share.reader.read_table(offset)?;
	table.validate()?;
	share.log.add(RipLogEvent::TableRead(offset));

	if let Err(e) = tables.put(id, offset, table.clone()) {
		Msg::warning(format!("The table of contents could not be cached: {e}")).eprint();
	}

	Ok(table)
}

/// # Rip Track.
///
/// Rip a single track, unless it was already ripped and is still intact, then
/// commit and save the result.
fn rip_track(
	cache: &Cache,
	id: &DiscIdentity,
	table: &Table,
	n: u8,
	opts: &RipOptions,
	session: &mut RipSession<'_>,
	share: &mut RipShare<'_>,
) -> Result<(), RipSureError> {
	let sectors = table.rip_range(n).ok_or(RipSureError::NoTrack(n))?;
	let frames = table.expected_frames(n).ok_or(RipSureError::NoTrack(n))?;

	// Skip tracks we already have.
	if opts.resume() {
		if let Some(old) = session.result().track(n) {
			set_progress_title_n(share.progress, n, "Checking the previous rip…");
			if is_intact(old, frames) {
				share.log.add(RipLogEvent::Resumed(n));
				return Ok(());
			}
		}
	}

	set_progress_title_n(share.progress, n, "Ripping…");
	let dst = cache.track_path(id, n)?;
	let ripped = share.ripper.rip_track(&RipRequest {
		table,
		track: n,
		sectors,
		offset: opts.offset(),
		dst: &dst,
	})?;

	// Nothing gets committed if we were interrupted.
	share.check_killed()?;

	share.log.add(RipLogEvent::Ripped {
		track: n,
		test_speed: ripped.test_speed,
		copy_speed: ripped.copy_speed,
	});
	if ripped.path != dst {
		Msg::warning(format!("Track {n:02} was saved to {}.", ripped.path.display())).eprint();
		share.log.add(RipLogEvent::Renamed(n, ripped.path.clone()));
	}

	let mut track = TrackResult::new(n, ripped.path);
	track.test_crc = ripped.test_crc;
	track.copy_crc = ripped.copy_crc;
	track.quality = ripped.quality;
	track.test_speed = ripped.test_speed;
	track.copy_speed = ripped.copy_speed;
	track.test_duration = ripped.test_duration;
	track.copy_duration = ripped.copy_duration;
	track.peak = ripped.peak.or_else(|| {
		let peak = peak_level(&track.path).ok()?;
		share.log.add(RipLogEvent::PeakMeasured(n, peak));
		Some(peak)
	});

	if ! track.is_consistent() {
		Msg::warning(format!("Track {n:02}: the test and copy checksums differ.")).eprint();
		share.log.add(RipLogEvent::Inconsistent(n));
	}

	session.commit(track);
	session.save()
}

/// # Intact?
///
/// Returns `true` if a previous rip's file still matches its test checksum.
fn is_intact(track: &TrackResult, frames: u64) -> bool {
	let Some(crc) = track.test_crc.or(track.copy_crc) else { return false; };
	track.path.is_file() &&
	matches!(verify(&track.path, frames, crc), Ok(TrackVerdict::Verified))
}

/// # Verify Tracks.
///
/// Run each ripped track's file back through the checksum verifier, recording
/// the verdicts.
fn verify_tracks(
	table: &Table,
	tracks: &[u8],
	session: &mut RipSession<'_>,
	share: &mut RipShare<'_>,
) -> Result<(), RipSureError> {
	set_progress_title(share.progress, "Disc", "Verifying the rip…");
	for &n in tracks {
		let frames = table.expected_frames(n).ok_or(RipSureError::NoTrack(n))?;
		let track = session.track_mut(n).ok_or(RipSureError::Bug("track was not committed"))?;
		let Some(crc) = track.test_crc.or(track.copy_crc) else {
			// The HTOA is never checked against anything, so can go without.
			if n == 0 { continue; }
			return Err(RipSureError::MissingChecksum(n));
		};

		let verdict = verify(&track.path, frames, crc)?;
		match verdict {
			TrackVerdict::Verified => {},
			TrackVerdict::Mismatched { .. } | TrackVerdict::Incomplete { .. } =>
				Msg::warning(format!("Track {n:02}: {verdict}.")).eprint(),
		}
		track.verdict.replace(verdict);
		share.log.add(RipLogEvent::Verdict(n, verdict));
	}

	Ok(())
}

/// # Reconcile Tracks.
///
/// Compute the AccurateRip checksums for each audio track and compare them
/// against the database.
///
/// Returns `false` if reconciliation was skipped, i.e. because only part of
/// the disc has been ripped.
fn reconcile_tracks(
	id: &DiscIdentity,
	table: &Table,
	opts: &RipOptions,
	clock: &dyn Clock,
	session: &mut RipSession<'_>,
	share: &mut RipShare<'_>,
) -> Result<bool, RipSureError> {
	let (first, last) = table.audio_bounds().ok_or(RipSureError::Table("no audio tracks"))?;
	let audio: Vec<u8> = table.audio_tracks().map(TableTrack::number).collect();

	// Everything has to be here.
	if audio.iter().any(|n| session.result().track(*n).is_none()) {
		Msg::warning("AccurateRip verification requires all tracks to be ripped.").eprint();
		share.log.add(RipLogEvent::NotReconciled("partial rip"));
		return Ok(false);
	}

	// And have a checksum.
	set_progress_title(share.progress, "Disc", "Crunching AccurateRip checksums…");
	let mut v1 = Vec::with_capacity(audio.len());
	let mut v2 = Vec::with_capacity(audio.len());
	for &n in &audio {
		let track = session.result().track(n).ok_or(RipSureError::Bug("track went missing"))?;
		if track.checksum().is_none() { return Err(RipSureError::MissingChecksum(n)); }

		let Some((a, b)) = accuraterip_checksums(track.path(), n == first, n == last)? else {
			Msg::warning(format!("Track {n:02} is too short for AccurateRip verification.")).eprint();
			share.log.add(RipLogEvent::NotReconciled("incomplete audio"));
			return Ok(false);
		};
		v1.push(a);
		v2.push(b);
	}

	set_progress_title(share.progress, "Disc", "Checking AccurateRip…");
	let subs = fetch_submissions(share.source, id, opts.retry(), clock);
	share.log.add(RipLogEvent::Submissions(subs.len()));
	if subs.is_empty() {
		Msg::warning("No AccurateRip submissions were found; the rip cannot be verified.").eprint();
	}

	let v1 = reconcile(&v1, &subs);
	let v2 = reconcile(&v2, &subs);
	for ((n, v1), v2) in audio.into_iter().zip(v1).zip(v2) {
		if let Some(track) = session.track_mut(n) {
			track.accuraterip_v1.replace(v1);
			track.accuraterip_v2.replace(v2);
		}
		share.log.add(RipLogEvent::Reconciled(n, Some(v1), Some(v2)));
	}

	Ok(true)
}

/// # Prune Invalid Tracks.
///
/// Return the tracks to rip, in order. An empty selection means the whole
/// disc. Selected tracks the disc doesn't have are dropped with a warning.
///
/// If for some reason every track is invalid, an error will be returned.
fn prune_tracks(opts: &RipOptions, table: &Table) -> Result<Vec<u8>, RipSureError> {
	let mut out = Vec::new();
	if opts.has_tracks() {
		for t in opts.tracks() {
			if t == 0 {
				if table.htoa().is_some() { out.push(0); }
				else { Msg::warning("This disc does not have an HTOA.").eprint(); }
			}
			else if table.track(t).is_some_and(TableTrack::is_audio) { out.push(t); }
			else {
				Msg::warning(format!("This disc does not have an audio track #{t}.")).eprint();
			}
		}
	}
	else {
		if opts.htoa() && table.htoa().is_some() { out.push(0); }
		out.extend(table.audio_tracks().map(TableTrack::number));
	}

	if out.is_empty() { Err(RipSureError::Noop) }
	else { Ok(out) }
}

/// # Set Progress Title.
fn set_progress_title(progress: &Progless, prefix: &str, msg: &str) {
	progress.set_title(Some(Msg::custom(prefix, 199, msg)));
}

/// # Set Progress Title (Track).
fn set_progress_title_n(progress: &Progless, idx: u8, msg: &str) {
	set_progress_title(progress, format!("Track {idx:02}").as_str(), msg);
}
