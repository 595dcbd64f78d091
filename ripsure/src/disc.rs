/*!
# Rip Sure: Disc Identity
*/

use cdtoc::Toc;
use crate::RipSureError;
use serde::{
	Deserialize,
	Serialize,
};
use std::fmt;



#[derive(Debug, Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
/// # Disc Identity.
///
/// A CDDB-style ID and a MusicBrainz-style ID, both derived from the disc's
/// geometry. The pair is used together to key cached tables and rip results;
/// the values themselves are treated as opaque strings.
pub struct DiscIdentity {
	cddb: String,
	musicbrainz: String,
}

impl fmt::Display for DiscIdentity {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.key())
	}
}

impl From<&Toc> for DiscIdentity {
	fn from(toc: &Toc) -> Self {
		Self {
			cddb: toc.cddb_id().to_string(),
			musicbrainz: toc.musicbrainz_id().to_string(),
		}
	}
}

impl DiscIdentity {
	/// # New.
	///
	/// ## Errors
	///
	/// Both parts end up in file names, so they must be non-empty. The CDDB ID
	/// is limited to ASCII alphanumerics; the MusicBrainz ID may also contain
	/// `.`, `_`, and `-`.
	pub fn new<S1, S2>(cddb: S1, musicbrainz: S2) -> Result<Self, RipSureError>
	where S1: Into<String>, S2: Into<String> {
		let cddb = cddb.into();
		let musicbrainz = musicbrainz.into();
		if
			! cddb.is_empty() &&
			cddb.bytes().all(|b| b.is_ascii_alphanumeric()) &&
			is_safe(&musicbrainz)
		{
			Ok(Self { cddb, musicbrainz })
		}
		else { Err(RipSureError::DiscId) }
	}

	#[must_use]
	/// # CDDB ID.
	pub fn cddb(&self) -> &str { &self.cddb }

	#[must_use]
	/// # MusicBrainz ID.
	pub fn musicbrainz(&self) -> &str { &self.musicbrainz }

	#[must_use]
	/// # Composite Key.
	///
	/// The CDDB ID never contains a dash, so the first one always marks the
	/// boundary.
	pub fn key(&self) -> String { format!("{}-{}", self.cddb, self.musicbrainz) }
}



/// # Safe Identifier?
fn is_safe(src: &str) -> bool {
	! src.is_empty() &&
	! src.starts_with('.') &&
	src.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_from_toc() {
		let toc = Toc::from_cdtoc("4+96+2D2B+6256+B327+D84A").expect("Bad TOC.");
		let id = DiscIdentity::from(&toc);
		assert_eq!(id.cddb(), toc.cddb_id().to_string());
		assert_eq!(id.musicbrainz(), toc.musicbrainz_id().to_string());
		assert_eq!(id.key(), format!("{}-{}", id.cddb(), id.musicbrainz()));
		assert!(
			DiscIdentity::new(id.cddb(), id.musicbrainz()).is_ok(),
			"Derived identities should be valid.",
		);
	}

	#[test]
	fn t_new() {
		assert!(DiscIdentity::new("b60a1f0c", "kmxLHj7s1gDvtOkYc3ZXzaF2xyc-").is_ok());
		for (a, b) in [
			("", "abc"),
			("abc", ""),
			("../abc", "abc"),
			("abc", "a/b"),
			(".hidden", "abc"),
			("a-b", "c"),
			("a_b", "c"),
		] {
			assert!(DiscIdentity::new(a, b).is_err(), "{a:?}/{b:?} should be invalid.");
		}
	}

	#[test]
	fn t_key() {
		let a = DiscIdentity::new("a", "b-c").expect("Identity failed.");
		let b = DiscIdentity::new("ab", "c").expect("Identity failed.");
		let c = DiscIdentity::new("a", "b_c").expect("Identity failed.");
		assert_eq!(a.key(), "a-b-c");
		assert_ne!(a.key(), b.key(), "Distinct identities need distinct keys.");
		assert_ne!(a.key(), c.key(), "Distinct identities need distinct keys.");
	}
}
