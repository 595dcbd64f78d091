/*!
# Rip Sure: AccurateRip
*/

use crate::{
	Cache,
	cache::cache_write,
	ChecksumSubmission,
	DiscIdentity,
	RipSureError,
	SAMPLES_PER_SECTOR,
	SubmissionSource,
	verify::for_each_frame,
};
use cdtoc::{
	AccurateRip,
	Toc,
};
use std::{
	collections::VecDeque,
	io::Read,
	path::Path,
	sync::OnceLock,
	time::Duration,
};
use ureq::{
	Agent,
	AgentBuilder,
};



/// # Connection Agent.
static AGENT: OnceLock<Agent> = OnceLock::new();

/// # Leading Samples Ignored (First Track).
const SKIP_FIRST: u64 = SAMPLES_PER_SECTOR as u64 * 5 - 1;

/// # Trailing Samples Ignored (Last Track).
const SKIP_LAST: usize = SAMPLES_PER_SECTOR as usize * 5;

/// # Chunk Header Size.
///
/// Track count (u8) and three disc IDs (u32).
const CHUNK_HEADER: usize = 13;

/// # Chunk Track Size.
///
/// Confidence (u8), checksum (u32), and 450-frame checksum (u32).
const CHUNK_TRACK: usize = 9;



/// # AccurateRip Checksums (v1, v2).
///
/// Crunch the AccurateRip checksums for a ripped track.
///
/// The computations are non-standard, but are more or less the sum of the
/// product of each sample pair (in byte form) and its relative index. All
/// data is factored, except the first `2939` samples of the first track and
/// the tail end of the last track, which drives can't reliably reach.
///
/// Returns `None` if the file is short, or too short to have anything left
/// to crunch after the trimming.
///
/// ## Errors
///
/// Read errors are passed through.
pub(crate) fn accuraterip_checksums(src: &Path, first: bool, last: bool)
-> Result<Option<(u32, u32)>, RipSureError> {
	let start = if first { SKIP_FIRST } else { 0 };
	let hold = if last { SKIP_LAST } else { 0 };

	// The tail isn't known until we've reached it, so the last track's
	// contributions are held back until they're known not to be in it.
	let mut pending: VecDeque<(u64, u64)> = VecDeque::with_capacity(hold + 1);
	let mut crc1 = 0_u64; // Version #1.
	let mut crc2 = 0_u64; // Version #2.
	let mut total = 0_usize;
	let mut idx = 0_u64;

	let scan = for_each_frame(src, |frame| {
		if start <= idx {
			let v = u64::from(u32::from_le_bytes(frame));
			let kv = (idx + 1).wrapping_mul(v);
			pending.push_back((kv, (kv >> 32) + (kv & 0xFFFF_FFFF)));
			if hold < pending.len() {
				if let Some((a, b)) = pending.pop_front() {
					crc1 = crc1.wrapping_add(a);
					crc2 = crc2.wrapping_add(b);
					total += 1;
				}
			}
		}
		idx += 1;
	})?;

	if scan.truncated || total == 0 { return Ok(None); }

	// Sixty-four bits were only used to help with overflow; the final checksum
	// only uses half that much.
	Ok(Some(((crc1 & 0xFFFF_FFFF) as u32, (crc2 & 0xFFFF_FFFF) as u32)))
}



#[derive(Debug, Clone)]
/// # AccurateRip Submission Source.
///
/// This downloads (and caches) the AccurateRip database entry for a disc,
/// returning each response chunk as a separate submission.
///
/// Chunks carry either v1 or v2 checksums, so local checksums of both kinds
/// should be reconciled against the full list.
pub struct AccurateRipSource {
	ar: AccurateRip,
	cache: Cache,
}

impl AccurateRipSource {
	#[must_use]
	/// # New.
	pub fn new(toc: &Toc, cache: Cache) -> Self {
		Self { ar: toc.accuraterip_id(), cache }
	}
}

impl SubmissionSource for AccurateRipSource {
	fn fetch(&self, _id: &DiscIdentity) -> Result<Vec<ChecksumSubmission>, RipSureError> {
		let dst = self.cache.scratch_path(&format!("{}__chk-ar.bin", self.ar.cddb_id()))?;

		// Try the cache first.
		if let Some(out) = std::fs::read(&dst).ok().and_then(|raw| parse_accuraterip(&raw).ok()) {
			return Ok(out);
		}

		let raw = download(&self.ar.checksum_url())?;
		let out = parse_accuraterip(&raw)?;

		// Cache the contents for next time.
		let _res = cache_write(&dst, &raw);

		Ok(out)
	}
}



/// # Parse AccurateRip Response.
///
/// The response is a series of chunks, each of which begins with a track
/// count and the disc's three IDs, followed by a confidence, checksum, and
/// 450-frame checksum for each track. All values are little endian.
///
/// ## Errors
///
/// Empty or malformed responses return an error.
pub(crate) fn parse_accuraterip(mut raw: &[u8]) -> Result<Vec<ChecksumSubmission>, RipSureError> {
	if raw.is_empty() { return Err(RipSureError::DbParse); }

	let mut out = Vec::new();
	while let Some(&count) = raw.first() {
		let count = usize::from(count);
		let len = CHUNK_HEADER + count * CHUNK_TRACK;
		if count == 0 || raw.len() < len { return Err(RipSureError::DbParse); }

		let sub = raw[CHUNK_HEADER..len].chunks_exact(CHUNK_TRACK)
			.map(|t| (
				u32::from_le_bytes([t[1], t[2], t[3], t[4]]),
				u32::from(t[0]),
			))
			.collect();
		out.push(sub);
		raw = &raw[len..];
	}

	Ok(out)
}



/// # Connection Agent.
///
/// Storing the agent statically saves a little bit of overhead on reuse. Since
/// the checksums are cached locally, this may not get called at all.
fn agent() -> &'static Agent {
	AGENT.get_or_init(||
		AgentBuilder::new()
			.timeout(Duration::from_secs(15))
			.user_agent(concat!(
				"Mozilla/5.0 (X11; Linux x86_64; rv:",
				env!("CARGO_PKG_VERSION"),
				") RipSure/",
				env!("CARGO_PKG_VERSION"),
			))
			.max_idle_connections(0)
			.build()
	)
}

/// # Download.
///
/// ## Errors
///
/// A 404 means the disc isn't in the database. Everything else is treated as
/// a (retryable) network failure.
fn download(url: &str) -> Result<Vec<u8>, RipSureError> {
	let res = agent().get(url).call().map_err(|e| match e {
		ureq::Error::Status(404, _) => RipSureError::DbNotFound,
		ureq::Error::Status(code, _) => RipSureError::DbNetwork(format!("HTTP {code}")),
		ureq::Error::Transport(e) => RipSureError::DbNetwork(e.to_string()),
	})?;

	let mut out = Vec::new();
	res.into_reader().read_to_end(&mut out)
		.map_err(|e| RipSureError::DbNetwork(e.to_string()))?;

	if out.is_empty() { Err(RipSureError::DbNotFound) }
	else { Ok(out) }
}
