//! Settle pauses between page interactions

use std::time::Duration;

/// Waits out asynchronous UI updates. Production sleeps on the tokio timer,
/// tests substitute a zero-delay recorder.
#[allow(async_fn_in_trait)]
pub trait Pause {
	async fn pause(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioPause;

impl Pause for TokioPause {
	async fn pause(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// Fixed pauses used by the solver and the lesson loop
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timings {
	/// After clicking submit, before reading the verdict
	pub settle: Duration,
	/// After clicking the proceed button
	pub proceed: Duration,
	/// Between loop iterations that had nothing to proceed to
	pub idle: Duration,
}

impl Default for Timings {
	fn default() -> Self {
		Self {
			settle: Duration::from_secs(1),
			proceed: Duration::from_secs(1),
			idle: Duration::from_millis(500),
		}
	}
}

impl Timings {
	pub fn zero() -> Self {
		Self {
			settle: Duration::ZERO,
			proceed: Duration::ZERO,
			idle: Duration::ZERO,
		}
	}
}
