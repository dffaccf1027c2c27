use std::time::Duration;

use v_utils::macros::{MyConfigPrimitives, Settings};

use crate::pause::Timings;

#[derive(Clone, Debug, Default, MyConfigPrimitives, Settings)]
pub struct AppConfig {
	/// Run with visible browser window (non-headless mode)
	#[serde(default)]
	pub visible: bool,
	/// Proxy the browser traffic goes through, e.g. "http://127.0.0.1:8080"
	#[serde(default)]
	pub proxy: Option<String>,
	/// Pause after submitting an answer before reading the verdict, in ms (default: 1000)
	#[serde(default = "default_settle_ms")]
	pub settle_ms: u64,
	/// Pause after clicking the proceed button, in ms (default: 1000)
	#[serde(default = "default_proceed_pause_ms")]
	pub proceed_pause_ms: u64,
	/// Pause between loop iterations with nothing to proceed to, in ms (default: 500)
	#[serde(default = "default_idle_poll_ms")]
	pub idle_poll_ms: u64,
	/// Polling interval while waiting for an element to become ready, in ms (default: 100)
	#[serde(default = "default_ready_poll_ms")]
	pub ready_poll_ms: u64,
	/// Save the page HTML when a search is exhausted or the page is malformed
	#[serde(default)]
	pub persist_snapshots: bool,
}

fn default_settle_ms() -> u64 {
	1000
}

fn default_proceed_pause_ms() -> u64 {
	1000
}

fn default_idle_poll_ms() -> u64 {
	500
}

fn default_ready_poll_ms() -> u64 {
	100
}

impl AppConfig {
	pub fn timings(&self) -> Timings {
		Timings {
			settle: Duration::from_millis(self.settle_ms),
			proceed: Duration::from_millis(self.proceed_pause_ms),
			idle: Duration::from_millis(self.idle_poll_ms),
		}
	}

	pub fn ready_poll(&self) -> Duration {
		Duration::from_millis(self.ready_poll_ms)
	}
}
