/*!
# Rip Sure: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// This is a short-circuit for long-running operations. Whatever executes the
/// hardware reads (or a CTRL-C intercept) flips the value, and the pipeline
/// stops at the next safe point, leaving the last saved rip result as the
/// resume point.
pub struct KillSwitch(Arc<AtomicBool>);

impl From<Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: Arc<AtomicBool>) -> Self { Self(src) }
}

impl KillSwitch {
	/// # Kill.
	pub fn kill(&self) { self.0.store(true, Release); }

	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_killswitch() {
		let flag = Arc::new(AtomicBool::new(false));
		let killed = KillSwitch::from(Arc::clone(&flag));
		let twin = killed.clone();
		assert!(! killed.killed(), "Nothing has been killed yet.");

		twin.kill();
		assert!(killed.killed(), "Clones should share the switch.");
		assert!(flag.load(Acquire), "The source flag should be set too.");
	}
}
