/*!
# Rip Sure: Test Fixtures
*/

use crate::WAVE_SPEC;
use hound::WavWriter;
use std::path::Path;



/// # Frames.
///
/// Generate `len` stereo frames of deterministic noise, varying by `seed`.
pub(crate) fn frames(seed: u32, len: usize) -> Vec<[i16; 2]> {
	let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
	let mut next = || {
		// Xorshift.
		state ^= state << 13;
		state ^= state >> 17;
		state ^= state << 5;
		state.to_le_bytes()
	};

	(0..len).map(|_| {
		let [a, b, c, d] = next();
		[i16::from_le_bytes([a, b]), i16::from_le_bytes([c, d])]
	})
		.collect()
}

/// # Write Wave.
///
/// Save the frames to `dst`, returning the CRC32 of the raw PCM.
pub(crate) fn write_wav(dst: &Path, frames: &[[i16; 2]]) -> u32 {
	let mut crc = crc32fast::Hasher::new();
	let mut wav = WavWriter::create(dst, WAVE_SPEC).expect("Wave create failed.");
	for &[l, r] in frames {
		wav.write_sample(l).expect("Wave write failed.");
		wav.write_sample(r).expect("Wave write failed.");
		crc.update(&l.to_le_bytes());
		crc.update(&r.to_le_bytes());
	}
	wav.finalize().expect("Wave finalize failed.");
	crc.finalize()
}
