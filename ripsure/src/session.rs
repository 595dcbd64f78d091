/*!
# Rip Sure: Rip Result Store
*/

use crate::{
	Cache,
	DiscIdentity,
	RipResult,
	RipSureError,
	store,
	Table,
	TrackResult,
};
use fyi_msg::Msg;
use std::{
	collections::BTreeSet,
	path::{
		Path,
		PathBuf,
	},
	sync::{
		Mutex,
		PoisonError,
	},
};



/// # Active Sessions.
///
/// The result files currently claimed by a [`RipSession`], process-wide.
static ACTIVE: Mutex<BTreeSet<PathBuf>> = Mutex::new(BTreeSet::new());



#[derive(Debug)]
/// # Rip Result Store.
///
/// Persisted rip results, keyed by disc identity.
///
/// Results are modified through a [`RipSession`], which mutably borrows the
/// store for its lifetime, so a second session cannot be opened until the
/// first is finished or dropped. The claim is also registered process-wide,
/// so a second store pointed at the same cache cannot open a competing
/// session for the same disc either.
pub struct RipResultStore {
	cache: Cache,
}

impl RipResultStore {
	#[must_use]
	/// # New.
	pub const fn new(cache: Cache) -> Self { Self { cache } }

	/// # Get.
	///
	/// Return a read-only copy of the persisted result for the disc, or a new,
	/// empty one if there isn't any.
	///
	/// ## Errors
	///
	/// This will only return an error if the cache path cannot be built.
	pub fn get(&self, id: &DiscIdentity) -> Result<RipResult, RipSureError> {
		let src = self.cache.result_path(id)?;
		Ok(load(&src, id))
	}

	/// # Open a Session.
	///
	/// If `resume` is true, the session starts from the persisted result (if
	/// any), otherwise it starts fresh and overwrites the old result on its
	/// first save.
	///
	/// ## Errors
	///
	/// This will return an error if the cache path cannot be built, or if
	/// another session for the same disc and cache is still active.
	pub fn session(&mut self, id: &DiscIdentity, resume: bool)
	-> Result<RipSession<'_>, RipSureError> {
		let dst = self.cache.result_path(id)?;
		if ! ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).insert(dst.clone()) {
			return Err(RipSureError::Bug("a rip session is already active for this disc"));
		}

		let result =
			if resume { load(&dst, id) }
			else { RipResult::default() };

		Ok(RipSession {
			_store: self,
			dst,
			result,
		})
	}
}



#[derive(Debug)]
/// # Rip Session.
///
/// Exclusive, in-memory ownership of one disc's rip result. Changes are only
/// persisted by [`RipSession::save`] or [`RipSession::finish`]; anything
/// unsaved when the session is dropped is lost, leaving the last save as the
/// resume point.
pub struct RipSession<'a> {
	_store: &'a mut RipResultStore,
	dst: PathBuf,
	result: RipResult,
}

impl Drop for RipSession<'_> {
	/// # Release Claim.
	fn drop(&mut self) {
		ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.dst);
	}
}

impl RipSession<'_> {
	#[must_use]
	/// # Result.
	pub const fn result(&self) -> &RipResult { &self.result }

	/// # Set Table.
	///
	/// If the table differs from the one the result was previously ripped
	/// against, the old track results no longer line up and are discarded.
	pub(crate) fn set_table(&mut self, table: Table) {
		if self.result.table.as_ref().is_some_and(|old| old != &table) {
			if ! self.result.tracks.is_empty() {
				Msg::warning("The table of contents has changed; previous track results have been discarded.")
					.eprint();
			}
			self.result.tracks.clear();
		}
		self.result.table.replace(table);
	}

	/// # Commit Track.
	///
	/// Record a freshly ripped track, carrying over the durations of any
	/// previous rips of the same track.
	pub(crate) fn commit(&mut self, mut track: TrackResult) {
		if let Some(old) = self.result.tracks.get(&track.number) {
			track.test_duration += old.test_duration;
			track.copy_duration += old.copy_duration;
		}
		self.result.tracks.insert(track.number, track);
	}

	/// # Track (Mutable).
	pub(crate) fn track_mut(&mut self, number: u8) -> Option<&mut TrackResult> {
		self.result.tracks.get_mut(&number)
	}

	/// # Save.
	///
	/// ## Errors
	///
	/// Write failures are passed through.
	pub fn save(&self) -> Result<(), RipSureError> { store::save(&self.dst, &self.result) }

	/// # Finish.
	///
	/// Save one last time and hand back the result.
	///
	/// ## Errors
	///
	/// Write failures are passed through.
	pub fn finish(mut self) -> Result<RipResult, RipSureError> {
		self.save()?;
		Ok(std::mem::take(&mut self.result))
	}
}



/// # Load.
///
/// Absent and unreadable results both yield a fresh one; the latter gets a
/// warning.
fn load(src: &Path, id: &DiscIdentity) -> RipResult {
	store::load::<RipResult>(src).unwrap_or_else(|| {
		if src.exists() {
			Msg::warning(format!("Ignoring stale or corrupt rip result for {id}.")).eprint();
		}
		RipResult::default()
	})
}
