/*!
# Rip Sure: Durable Object Store
*/

use crate::{
	cache::cache_write,
	RipSureError,
};
use serde::{
	de::DeserializeOwned,
	Serialize,
};
use std::{
	io::{
		Read,
		Write,
	},
	path::Path,
};



/// # Header Length.
///
/// Eight bytes of magic followed by a four-byte CRC32 of the payload.
const HEADER_LEN: usize = 12;



/// # Persistable Object.
///
/// Anything saved with [`save`] and restored with [`load`] needs a unique
/// magic header identifying both the kind of object and the version of its
/// shape. Bump the version whenever the shape changes so that stale files are
/// quietly treated as missing rather than misread.
pub trait Persist: Serialize + DeserializeOwned {
	/// # Magic Bytes.
	const MAGIC: [u8; 8];
}



/// # Load.
///
/// Load a previously saved object from `src`, if any.
///
/// Missing, truncated, corrupt, and differently-versioned files all simply
/// return `None`; callers should treat that as "nothing saved yet".
pub fn load<T: Persist>(src: &Path) -> Option<T> {
	let raw = std::fs::read(src).ok()?;
	if raw.len() <= HEADER_LEN || raw[..8] != T::MAGIC { return None; }

	// Verify the payload before trying to make sense of it.
	let hash = u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]);
	let payload = &raw[HEADER_LEN..];
	if hash != crc32fast::hash(payload) { return None; }

	let payload = zstd_decode(payload)?;
	bincode::deserialize(&payload).ok()
}

/// # Save.
///
/// Serialize, compress, and atomically write `obj` to `dst`, replacing
/// whatever was there before.
///
/// ## Errors
///
/// This will return an error if the object cannot be encoded or the file
/// cannot be written. A failed save never clobbers the previous copy.
pub fn save<T: Persist>(dst: &Path, obj: &T) -> Result<(), RipSureError> {
	let err = || RipSureError::Write(dst.to_string_lossy().into_owned());
	let payload = bincode::serialize(obj).ok()
		.and_then(|raw| zstd_encode(&raw))
		.ok_or_else(err)?;

	let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
	out.extend_from_slice(T::MAGIC.as_slice());
	out.extend_from_slice(crc32fast::hash(&payload).to_le_bytes().as_slice());
	out.extend_from_slice(&payload);
	cache_write(dst, &out)
}



/// # Zstd Decode.
///
/// Return a decompressed copy of `raw`, or `None` if the operation fails.
fn zstd_decode(raw: &[u8]) -> Option<Vec<u8>> {
	let mut out = Vec::with_capacity(raw.len() * 2);
	let mut decoder = zstd::stream::Decoder::new(raw).ok()?;
	decoder.read_to_end(&mut out).ok()?;

	// Make sure we have something.
	if out.is_empty() { None }
	else { Some(out) }
}

/// # Zstd Encode.
///
/// Return a copy of the `raw` compressed with default-level zstd. If there is
/// any sort of problem, `None` will be returned instead.
fn zstd_encode(raw: &[u8]) -> Option<Vec<u8>> {
	let mut encoder = zstd::stream::Encoder::new(
		Vec::with_capacity(raw.len().wrapping_div(2)),
		zstd::DEFAULT_COMPRESSION_LEVEL,
	).ok()?;
	encoder.write_all(raw).ok()?;
	let out = encoder.finish().ok()?;

	// Make sure there's something.
	if out.is_empty() { None }
	else { Some(out) }
}
