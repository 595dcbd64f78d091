/*!
# Rip Sure: Table Cache
*/

use crate::{
	Cache,
	DiscIdentity,
	Persist,
	ReadOffset,
	RipSureError,
	store,
	Table,
};
use fyi_msg::Msg;
use serde::{
	Deserialize,
	Serialize,
};
use std::collections::BTreeMap;



#[derive(Debug, Clone, Default, Deserialize, Serialize)]
/// # Table Cache Entry.
///
/// All of the tables read for a given disc, partitioned by read offset.
struct TableCacheEntry(BTreeMap<ReadOffset, Table>);

impl Persist for TableCacheEntry {
	/// # Version Two: Offset-Partitioned.
	///
	/// Version one held a single table regardless of offset; those files are
	/// treated as missing.
	const MAGIC: [u8; 8] = *b"RSurTB02";
}



#[derive(Debug, Clone)]
/// # Table Cache.
///
/// Tables of contents previously read from hardware, keyed by disc identity
/// and read offset.
pub struct TableCache {
	cache: Cache,
}

impl TableCache {
	#[must_use]
	/// # New.
	pub const fn new(cache: Cache) -> Self { Self { cache } }

	/// # Get.
	///
	/// Return all usable tables recorded for the disc, keyed by read offset.
	/// Missing, stale, and corrupt entries all come back empty; tables that
	/// fail validation are dropped.
	///
	/// ## Errors
	///
	/// This will only return an error if the cache path cannot be built.
	pub fn get(&self, id: &DiscIdentity) -> Result<BTreeMap<ReadOffset, Table>, RipSureError> {
		let src = self.cache.table_path(id)?;
		let Some(TableCacheEntry(mut out)) = store::load::<TableCacheEntry>(&src) else {
			if src.exists() {
				Msg::warning(format!("Ignoring stale or corrupt table cache for {id}.")).eprint();
			}
			return Ok(BTreeMap::new());
		};

		let before = out.len();
		out.retain(|_, t| t.has_toc());
		if out.len() != before {
			Msg::warning(format!("Ignoring invalid cached table(s) for {id}.")).eprint();
		}

		Ok(out)
	}

	/// # Get One.
	///
	/// Return the table for a specific offset, if cached.
	///
	/// ## Errors
	///
	/// This will only return an error if the cache path cannot be built.
	pub fn get_offset(&self, id: &DiscIdentity, offset: ReadOffset)
	-> Result<Option<Table>, RipSureError> {
		Ok(self.get(id)?.remove(&offset))
	}

	/// # Put.
	///
	/// Record the table for one offset, leaving any other offsets already
	/// recorded for the disc as they were.
	///
	/// ## Errors
	///
	/// Invalid tables are rejected, and write failures are passed through.
	pub fn put(&self, id: &DiscIdentity, offset: ReadOffset, table: Table)
	-> Result<(), RipSureError> {
		table.validate()?;

		let dst = self.cache.table_path(id)?;
		let mut entry = store::load::<TableCacheEntry>(&dst).unwrap_or_default();
		entry.0.insert(offset, table);
		store::save(&dst, &entry)
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::TableTrack;

	#[derive(Deserialize, Serialize)]
	struct OldEntry(Table);

	impl Persist for OldEntry {
		const MAGIC: [u8; 8] = *b"RSurTB01";
	}

	fn id() -> DiscIdentity {
		DiscIdentity::new("b60a1f0c", "kmxLHj7s1gDvtOkYc3ZXzaF2xyc-").expect("Identity failed.")
	}

	fn table(shift: i32) -> Table {
		Table::new(
			vec![
				TableTrack::new(1, true).with_index(1, shift),
				TableTrack::new(2, true).with_index(1, 100 + shift),
			],
			200 + shift,
		)
	}

	#[test]
	fn t_get_put() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let tables = TableCache::new(Cache::new(dir.path()).expect("Cache failed."));
		let id = id();
		let o1 = ReadOffset::try_from(6).expect("Offset failed.");
		let o2 = ReadOffset::try_from(-472).expect("Offset failed.");

		assert!(tables.get(&id).expect("Get failed.").is_empty(), "Nothing is cached yet.");

		tables.put(&id, o1, table(0)).expect("Put failed.");
		assert_eq!(tables.get_offset(&id, o1).expect("Get failed."), Some(table(0)));
		assert_eq!(tables.get_offset(&id, o2).expect("Get failed."), None);

		// A second offset must not disturb the first.
		tables.put(&id, o2, table(5)).expect("Put failed.");
		let all = tables.get(&id).expect("Get failed.");
		assert_eq!(all.len(), 2, "Both offsets should be recorded.");
		assert_eq!(all.get(&o1), Some(&table(0)), "The first offset was altered.");
		assert_eq!(all.get(&o2), Some(&table(5)));

		// Overwriting only touches its own offset.
		tables.put(&id, o2, table(7)).expect("Put failed.");
		let all = tables.get(&id).expect("Get failed.");
		assert_eq!(all.get(&o1), Some(&table(0)), "The first offset was altered.");
		assert_eq!(all.get(&o2), Some(&table(7)), "The second offset was not replaced.");
	}

	#[test]
	fn t_put_invalid() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let tables = TableCache::new(Cache::new(dir.path()).expect("Cache failed."));
		let bad = Table::new(vec![TableTrack::new(1, true).with_index(0, 0)], 100);
		assert!(
			matches!(tables.put(&id(), ReadOffset::default(), bad), Err(RipSureError::Table(_))),
			"Invalid tables should be rejected.",
		);
		assert!(tables.get(&id()).expect("Get failed.").is_empty(), "Nothing should have been written.");
	}

	#[test]
	fn t_stale() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let cache = Cache::new(dir.path()).expect("Cache failed.");
		let tables = TableCache::new(cache.clone());
		let id = id();
		let dst = cache.table_path(&id).expect("Path failed.");
		let offset = ReadOffset::try_from(6).expect("Offset failed.");

		// An old, unpartitioned entry.
		store::save(&dst, &OldEntry(table(0))).expect("Save failed.");
		assert!(tables.get(&id).expect("Get failed.").is_empty(), "Old formats should be ignored.");

		// Replacing it yields the new shape.
		tables.put(&id, offset, table(0)).expect("Put failed.");
		assert!(store::load::<TableCacheEntry>(&dst).is_some(), "The entry should be partitioned.");
		assert_eq!(tables.get_offset(&id, offset).expect("Get failed."), Some(table(0)));

		// Outright garbage.
		std::fs::write(&dst, b"RSurTB02 is a lie").expect("Write failed.");
		assert!(tables.get(&id).expect("Get failed.").is_empty(), "Garbage should be ignored.");
	}
}
