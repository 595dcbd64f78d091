/*!
# Rip Sure: Cache
*/

use crate::{
	CACHE_BASE,
	CACHE_SCRATCH,
	DiscIdentity,
	RipSureError,
};
use std::path::{
	Path,
	PathBuf,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Cache.
///
/// This is the root directory everything persistent lives under: ripped
/// tracks at the top, and table caches, rip results, and downloaded database
/// responses in the scratch subfolder.
pub struct Cache {
	root: PathBuf,
}

impl Cache {
	/// # New.
	///
	/// Use (and create, if necessary) the given directory as the cache root.
	///
	/// ## Errors
	///
	/// This will return an error if the directory cannot be created or
	/// resolved.
	pub fn new<P>(root: P) -> Result<Self, RipSureError>
	where P: AsRef<Path> {
		let root = root.as_ref();
		if ! root.is_dir() {
			std::fs::create_dir_all(root).map_err(|_| RipSureError::Cache)?;
		}

		let root = std::fs::canonicalize(root).map_err(|_| RipSureError::Cache)?;
		if root.is_dir() { Ok(Self { root }) }
		else { Err(RipSureError::Cache) }
	}

	/// # From Current Directory.
	///
	/// Use `CWD/CACHE_BASE` as the cache root.
	///
	/// ## Errors
	///
	/// This will return an error if the current working directory does not
	/// exist, or the cache root cannot be created.
	pub fn from_cwd() -> Result<Self, RipSureError> {
		let dir = std::env::current_dir().map_err(|_| RipSureError::Cache)?;
		if ! dir.is_dir() { return Err(RipSureError::Cache); }
		Self::new(dir.join(CACHE_BASE))
	}

	#[must_use]
	/// # Root.
	pub fn root(&self) -> &Path { &self.root }
}

impl Cache {
	/// # Scratch Path.
	///
	/// Glue `name` onto the scratch folder, making sure the result still lives
	/// inside the cache.
	///
	/// ## Errors
	///
	/// This will return an error if the name would escape the cache.
	pub(crate) fn scratch_path(&self, name: &str) -> Result<PathBuf, RipSureError> {
		let dst = self.root.join(CACHE_SCRATCH).join(name);
		self.validate(&dst)?;
		Ok(dst)
	}

	/// # Table Cache Path.
	pub(crate) fn table_path(&self, id: &DiscIdentity) -> Result<PathBuf, RipSureError> {
		self.scratch_path(&format!("{}__table.bin", id.key()))
	}

	/// # Rip Result Path.
	pub(crate) fn result_path(&self, id: &DiscIdentity) -> Result<PathBuf, RipSureError> {
		self.scratch_path(&format!("{}__result.bin", id.key()))
	}

	/// # Track Path.
	///
	/// Ripped tracks are saved to the cache root like `CDDB_NN.wav`.
	pub(crate) fn track_path(&self, id: &DiscIdentity, number: u8)
	-> Result<PathBuf, RipSureError> {
		let dst = self.root.join(format!("{}_{number:02}.wav", id.cddb()));
		self.validate(&dst)?;
		Ok(dst)
	}

	/// # Validate Cache Path.
	///
	/// Make sure a path is in the cache root.
	fn validate(&self, src: &Path) -> Result<(), RipSureError> {
		let rel = src.strip_prefix(&self.root)
			.map_err(|_| RipSureError::CachePath(src.to_string_lossy().into_owned()))?;

		if
			rel.as_os_str().is_empty() ||
			rel.components().any(|c| ! matches!(c, std::path::Component::Normal(_)))
		{
			Err(RipSureError::CachePath(src.to_string_lossy().into_owned()))
		}
		else { Ok(()) }
	}
}



/// # Write to Cache.
///
/// Atomically write `data` to `dst`, creating the parent directory if
/// needed and replacing the original if it exists. An interrupted write
/// leaves whatever was there before untouched.
///
/// ## Errors
///
/// This will return an error if the directory cannot be created or the file
/// cannot be written.
pub(crate) fn cache_write(dst: &Path, data: &[u8]) -> Result<(), RipSureError> {
	let err = || RipSureError::Write(dst.to_string_lossy().into_owned());
	let parent = dst.parent().ok_or_else(err)?;
	if ! parent.is_dir() {
		std::fs::create_dir_all(parent).map_err(|_| err())?;
	}

	write_atomic::write_file(dst, data).map_err(|_| err())
}
