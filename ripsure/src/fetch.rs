/*!
# Rip Sure: Database Fetching
*/

use crate::{
	ChecksumSubmission,
	DiscIdentity,
	RipSureError,
};
use fyi_msg::Msg;
use std::time::Duration;



/// # Minimum Attempts.
const ATTEMPTS_MIN: u8 = 1;

/// # Maximum Attempts.
const ATTEMPTS_MAX: u8 = 10;



/// # Submission Source.
///
/// Anything that can produce the checksum submissions recorded for a disc.
pub trait SubmissionSource {
	/// # Fetch Submissions.
	///
	/// Return the submissions in the source's natural order. An empty list is
	/// a valid answer.
	///
	/// ## Errors
	///
	/// Implementations should flag retryable failures with an error for which
	/// [`RipSureError::is_transient`] returns `true`.
	fn fetch(&self, id: &DiscIdentity) -> Result<Vec<ChecksumSubmission>, RipSureError>;
}



/// # Clock.
///
/// The passage of time, abstracted for the benefit of retries.
pub trait Clock {
	/// # Sleep.
	fn sleep(&self, dur: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
/// # System Clock.
pub struct SystemClock;

impl Clock for SystemClock {
	#[inline]
	fn sleep(&self, dur: Duration) { std::thread::sleep(dur); }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Retry Policy.
///
/// How many times to try fetching submissions, and how long to wait between
/// attempts. Each successive wait is the previous one multiplied by the
/// growth factor.
///
/// ```
/// use ripsure::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_attempts(3)
///     .with_delay(Duration::from_secs(2))
///     .with_factor(3);
///
/// assert_eq!(policy.attempts(), 3);
/// assert_eq!(policy.delay_for(1), Duration::from_secs(2));
/// assert_eq!(policy.delay_for(2), Duration::from_secs(6));
/// ```
pub struct RetryPolicy {
	attempts: u8,
	delay: Duration,
	factor: u8,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			attempts: 4,
			delay: Duration::from_secs(5),
			factor: 1,
		}
	}
}

impl RetryPolicy {
	#[must_use]
	/// # With Attempts.
	///
	/// The total number of attempts, including the first. Values are clamped
	/// to `1..=10`.
	pub const fn with_attempts(self, attempts: u8) -> Self {
		let attempts =
			if attempts < ATTEMPTS_MIN { ATTEMPTS_MIN }
			else if attempts > ATTEMPTS_MAX { ATTEMPTS_MAX }
			else { attempts };
		Self { attempts, ..self }
	}

	#[must_use]
	/// # With Delay.
	///
	/// The wait before the first retry.
	pub const fn with_delay(self, delay: Duration) -> Self { Self { delay, ..self } }

	#[must_use]
	/// # With Growth Factor.
	///
	/// A factor of one (the minimum) keeps the delay constant.
	pub const fn with_factor(self, factor: u8) -> Self {
		Self {
			factor: if factor == 0 { 1 } else { factor },
			..self
		}
	}

	#[must_use]
	/// # Attempts.
	pub const fn attempts(self) -> u8 { self.attempts }

	#[must_use]
	/// # Delay Before Retry.
	///
	/// Retries are numbered from one.
	pub fn delay_for(self, retry: u8) -> Duration {
		let mut out = self.delay;
		for _ in 1..retry {
			out = out.saturating_mul(u32::from(self.factor));
		}
		out
	}
}



/// # Fetch Submissions.
///
/// Ask the source for the disc's submissions, retrying transient failures
/// according to the policy.
///
/// Failure is not fatal; the verdicts will simply be "not verifiable". Any
/// problems are printed as warnings and an empty list is returned instead.
pub fn fetch_submissions<S, C>(src: &S, id: &DiscIdentity, policy: RetryPolicy, clock: &C)
-> Vec<ChecksumSubmission>
where S: SubmissionSource + ?Sized, C: Clock + ?Sized {
	let mut attempt = 1;
	loop {
		match src.fetch(id) {
			Ok(out) => return out,
			Err(e) if e.is_transient() && attempt < policy.attempts => {
				Msg::warning(format!("{e} Retrying ({attempt}/{})…", policy.attempts)).eprint();
				clock.sleep(policy.delay_for(attempt));
				attempt += 1;
			},
			Err(e) => {
				Msg::warning(format!("{e} Continuing without database checksums.")).eprint();
				return Vec::new();
			},
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use std::cell::{
		Cell,
		RefCell,
	};

	/// # Scripted Source.
	///
	/// Fail with the given errors, in order, then succeed.
	struct Scripted {
		errors: RefCell<Vec<RipSureError>>,
		calls: Cell<u8>,
	}

	impl Scripted {
		fn new(mut errors: Vec<RipSureError>) -> Self {
			errors.reverse();
			Self { errors: RefCell::new(errors), calls: Cell::new(0) }
		}
	}

	impl SubmissionSource for Scripted {
		fn fetch(&self, _id: &DiscIdentity) -> Result<Vec<ChecksumSubmission>, RipSureError> {
			self.calls.set(self.calls.get() + 1);
			match self.errors.borrow_mut().pop() {
				Some(e) => Err(e),
				None => Ok(vec![[(1, 2)].into_iter().collect()]),
			}
		}
	}

	#[derive(Default)]
	struct FakeClock(RefCell<Vec<Duration>>);

	impl Clock for FakeClock {
		fn sleep(&self, dur: Duration) { self.0.borrow_mut().push(dur); }
	}

	fn id() -> DiscIdentity {
		DiscIdentity::new("b60a1f0c", "kmxLHj7s1gDvtOkYc3ZXzaF2xyc-").expect("Identity failed.")
	}

	fn net() -> RipSureError { RipSureError::DbNetwork("timeout".to_owned()) }

	#[test]
	fn t_policy() {
		let p = RetryPolicy::default();
		assert_eq!(p.attempts(), 4);
		assert_eq!(p.delay_for(1), Duration::from_secs(5));
		assert_eq!(p.delay_for(3), Duration::from_secs(5), "The default delay is constant.");

		assert_eq!(p.with_attempts(0).attempts(), 1);
		assert_eq!(p.with_attempts(200).attempts(), 10);

		let p = p.with_delay(Duration::from_millis(100)).with_factor(2);
		assert_eq!(p.delay_for(1), Duration::from_millis(100));
		assert_eq!(p.delay_for(2), Duration::from_millis(200));
		assert_eq!(p.delay_for(4), Duration::from_millis(800));
		assert_eq!(p.with_factor(0).delay_for(4), Duration::from_millis(100));
	}

	#[test]
	fn t_retry() {
		let policy = RetryPolicy::default()
			.with_delay(Duration::from_secs(1))
			.with_factor(2);

		// Two hiccups, then success.
		let src = Scripted::new(vec![net(), net()]);
		let clock = FakeClock::default();
		let out = fetch_submissions(&src, &id(), policy, &clock);
		assert_eq!(out.len(), 1, "The third attempt should have worked.");
		assert_eq!(src.calls.get(), 3);
		assert_eq!(*clock.0.borrow(), [Duration::from_secs(1), Duration::from_secs(2)]);

		// Too many hiccups.
		let src = Scripted::new(vec![net(); 10]);
		let clock = FakeClock::default();
		assert!(fetch_submissions(&src, &id(), policy, &clock).is_empty());
		assert_eq!(src.calls.get(), 4, "Attempts should be capped.");
		assert_eq!(clock.0.borrow().len(), 3);
	}

	#[test]
	fn t_no_retry() {
		// Not-found is final.
		let src = Scripted::new(vec![RipSureError::DbNotFound]);
		let clock = FakeClock::default();
		assert!(fetch_submissions(&src, &id(), RetryPolicy::default(), &clock).is_empty());
		assert_eq!(src.calls.get(), 1, "Permanent failures should not be retried.");
		assert!(clock.0.borrow().is_empty(), "Nobody should have slept.");
	}
}
