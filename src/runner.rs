//! Search drivers for each form kind and the lesson loop around them

use std::{
	collections::HashSet,
	fmt,
	path::{Path, PathBuf},
};

use color_eyre::{Result, eyre::eyre};
use derive_new::new;
use tokio_util::sync::CancellationToken;
use v_utils::{elog, log};

use crate::{
	Candidate, ExhaustReason, Form, FormKind, SolveOutcome, Verdict,
	classify::{ClassifyError, classify},
	enumerate::{self, MatrixSearch},
	page::PageDriver,
	pause::{Pause, Timings},
	selectors,
	snapshot::Snapshot,
	submit::FeedbackExtractor,
};

/// Drives one page: applies candidates, submits them and walks lessons.
#[derive(new)]
pub struct Solver<'a, P, S> {
	pub(crate) page: &'a P,
	pub(crate) pause: &'a S,
	pub(crate) timings: Timings,
}

impl<P: PageDriver, S: Pause> Solver<'_, P, S> {
	/// Search for the accepted answer of `form`
	pub async fn solve(&self, form: &Form) -> Result<SolveOutcome> {
		match &form.kind {
			FormKind::Checkbox { options } => self.solve_checkboxes(form, *options).await,
			FormKind::Radio { options } => self.solve_radios(form, *options).await,
			FormKind::Matrix { rows, cols } => self.solve_matrix(form, *rows, *cols).await,
			FormKind::Unknown { marker } => {
				tracing::debug!(form_id = %form.id, %marker, "skipping form of unrecognized type");
				Ok(SolveOutcome::Skipped)
			}
		}
	}

	/// Click an option label and let the form settle
	async fn select(&self, form: &Form, option_id: &str) -> Result<()> {
		self.page.click(&selectors::label_for(option_id)).await?;
		self.page.wait_ready(&selectors::form_by_id(&form.id)).await
	}

	/// Only the overall verdict is observable, so try every subset, smallest first.
	async fn solve_checkboxes(&self, form: &Form, options: usize) -> Result<SolveOutcome> {
		if options == 0 {
			elog!("Checkboxes not found in {form}");
			return Ok(SolveOutcome::Exhausted {
				reason: ExhaustReason::NoOptions,
				submissions: 0,
			});
		}

		tracing::debug!(form_id = %form.id, worst_case = enumerate::subsets_up_to(options, options), "checkbox search started");
		let mut submissions = 0;
		for candidate in enumerate::subsets(options) {
			for &index in &candidate {
				self.select(form, &form.option_id(index)).await?;
			}
			submissions += 1;
			match self.submit(&form.id, &mut []).await? {
				Verdict::Accepted =>
					return Ok(SolveOutcome::Accepted {
						candidate: Candidate::Checkbox(candidate),
						submissions,
					}),
				Verdict::Rejected => tracing::debug!(form_id = %form.id, ?candidate, submissions, "checkbox candidate rejected"),
			}
		}

		Ok(SolveOutcome::Exhausted {
			reason: ExhaustReason::AllRejected,
			submissions,
		})
	}

	async fn solve_radios(&self, form: &Form, options: usize) -> Result<SolveOutcome> {
		if options == 0 {
			elog!("Radio buttons not found in {form}");
			return Ok(SolveOutcome::Exhausted {
				reason: ExhaustReason::NoOptions,
				submissions: 0,
			});
		}

		for index in 0..options {
			self.select(form, &form.option_id(index)).await?;
			if self.submit(&form.id, &mut []).await? == Verdict::Accepted {
				return Ok(SolveOutcome::Accepted {
					candidate: Candidate::Radio(index),
					submissions: index + 1,
				});
			}
			tracing::debug!(form_id = %form.id, index, "radio candidate rejected");
		}

		Ok(SolveOutcome::Exhausted {
			reason: ExhaustReason::AllRejected,
			submissions: options,
		})
	}

	/// Rows are graded individually, so each unlocked row moves one column per
	/// submission until the platform marks it correct. At most `rows * cols` probes.
	async fn solve_matrix(&self, form: &Form, rows: usize, cols: usize) -> Result<SolveOutcome> {
		if rows == 0 || cols == 0 {
			elog!("Rows or columns not found in {form}");
			return Ok(SolveOutcome::Exhausted {
				reason: ExhaustReason::NoOptions,
				submissions: 0,
			});
		}

		let mut search = MatrixSearch::new(rows, cols);
		let mut submissions = 0;
		loop {
			let probes: Vec<(usize, String)> = search.pending().map(|(row, col)| (row, form.cell_id(row, col))).collect();
			for (_, cell) in &probes {
				self.select(form, cell).await?;
			}

			let mut feedback = RowFeedback::new(probes);
			submissions += 1;
			let verdict = self.submit(&form.id, &mut [&mut feedback as &mut dyn FeedbackExtractor]).await?;
			for &row in &feedback.correct {
				search.lock(row);
			}

			if verdict == Verdict::Accepted || search.all_locked() {
				return Ok(SolveOutcome::Accepted {
					candidate: Candidate::Matrix(search.selection()),
					submissions,
				});
			}
			if let Some(row) = feedback.missing {
				return Ok(SolveOutcome::Exhausted {
					reason: ExhaustReason::FeedbackMissing { row },
					submissions,
				});
			}
			if let Err(row) = search.advance() {
				return Ok(SolveOutcome::Exhausted {
					reason: ExhaustReason::RowOutOfColumns { row },
					submissions,
				});
			}
			tracing::debug!(form_id = %form.id, submissions, pointers = ?search.selection(), "matrix rows advanced");
		}
	}

	/// Run until cancelled, solving whatever form is open and moving on once the
	/// proceed button shows up.
	pub async fn run_lessons(&self, cancel: &CancellationToken, options: &LoopOptions) -> Result<SessionStats> {
		let mut stats = SessionStats::default();
		let mut last_failure: Option<ClassifyError> = None;
		// ids of this page that were exhausted or skipped
		let mut settled: HashSet<String> = HashSet::new();

		while !cancel.is_cancelled() {
			if options.max_forms.is_some_and(|max| stats.processed() >= max) {
				log!("Processed {} form(s), stopping", stats.processed());
				break;
			}

			let markup = self.page.snapshot().await?;
			let classified = classify(&Snapshot::parse(&markup));
			match classified {
				Ok(form) if settled.contains(&form.id) => {
					last_failure = None;
					tracing::debug!(form_id = %form.id, "form already settled, waiting for the page to move on");
				}
				Ok(form) => {
					last_failure = None;
					let outcome = self.process_form(&form, &mut stats, options).await?;
					if matches!(outcome, SolveOutcome::Exhausted { .. } | SolveOutcome::Skipped) {
						settled.insert(form.id);
					}
				}
				Err(e) => {
					stats.unclassified += 1;
					if last_failure.as_ref() != Some(&e) {
						log!("{e}");
						if e.is_anomaly() {
							self.persist(options, &markup, "unclassified");
						}
					}
					last_failure = Some(e);
				}
			}

			if self.proceed().await? {
				stats.proceeded += 1;
				settled.clear();
				self.pause.pause(self.timings.proceed).await;
			} else {
				self.pause.pause(self.timings.idle).await;
			}
		}

		Ok(stats)
	}

	async fn process_form(&self, form: &Form, stats: &mut SessionStats, options: &LoopOptions) -> Result<SolveOutcome> {
		if !matches!(form.kind, FormKind::Unknown { .. }) {
			log!("Solving {form}");
		}
		tracing::debug!(form_id = %form.id, options = ?form.option_ids(), "form classified");

		let outcome = self.solve(form).await?;
		match &outcome {
			SolveOutcome::Accepted { candidate, submissions } => {
				tracing::info!(form_id = %form.id, kind = form.kind.tag(), submissions, "form accepted");
				log!("✓ {form} accepted after {submissions} submission(s): {candidate}");
			}
			SolveOutcome::Exhausted { reason, submissions } => {
				tracing::warn!(form_id = %form.id, kind = form.kind.tag(), submissions, %reason, "search exhausted");
				elog!("{form}: search exhausted after {submissions} submission(s): {reason}");
				let markup = self.page.snapshot().await?;
				self.persist(options, &markup, &form.id);
			}
			SolveOutcome::Skipped => {}
		}
		stats.record(&outcome);
		Ok(outcome)
	}

	/// Click the proceed button if the current item is resolved
	async fn proceed(&self) -> Result<bool> {
		let markup = self.page.snapshot().await?;
		if !Snapshot::parse(&markup).contains(selectors::PROCEED_BUTTON)? {
			return Ok(false);
		}
		self.page.click(selectors::PROCEED_BUTTON).await?;
		tracing::debug!("proceeded to next item");
		Ok(true)
	}

	fn persist(&self, options: &LoopOptions, markup: &str, label: &str) {
		if !options.persist_snapshots {
			return;
		}
		if let Err(e) = save_snapshot(&options.snapshot_dir, markup, label) {
			elog!("Failed to save snapshot: {e}");
		}
	}
}

/// Reads per-row correctness of a matrix off the post-submit page
struct RowFeedback {
	/// `(row, cell id)` submitted for every unlocked row
	probes: Vec<(usize, String)>,
	correct: Vec<usize>,
	/// First row whose label could not be read
	missing: Option<usize>,
}

impl RowFeedback {
	fn new(probes: Vec<(usize, String)>) -> Self {
		Self {
			probes,
			correct: Vec::new(),
			missing: None,
		}
	}
}

impl FeedbackExtractor for RowFeedback {
	fn inspect(&mut self, snapshot: &Snapshot) {
		for (row, cell) in &self.probes {
			let class = match snapshot.first(&selectors::label_for(cell)) {
				Ok(Some(label)) => label.value().attr("class"),
				Ok(None) => None,
				Err(e) => {
					elog!("{e}");
					None
				}
			};
			let Some(class) = class else {
				elog!("Label class not found for {cell}");
				self.missing = Some(*row);
				return;
			};
			if class.contains(selectors::CORRECT_MARKER) {
				self.correct.push(*row);
			}
		}
	}
}

#[derive(Clone, Debug, Default, new)]
pub struct LoopOptions {
	/// Stop once this many forms were solved or exhausted
	pub max_forms: Option<usize>,
	/// Save the page when a search is exhausted or the page is malformed
	pub persist_snapshots: bool,
	/// Where the saved pages of this run go
	pub snapshot_dir: PathBuf,
}

/// Counters of one lesson-loop run
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionStats {
	pub solved: usize,
	pub exhausted: usize,
	/// Forms of an unrecognized type
	pub skipped: usize,
	/// Loop iterations where no form could be classified
	pub unclassified: usize,
	pub submissions: usize,
	pub proceeded: usize,
}

impl SessionStats {
	pub fn record(&mut self, outcome: &SolveOutcome) {
		match outcome {
			SolveOutcome::Accepted { .. } => self.solved += 1,
			SolveOutcome::Exhausted { .. } => self.exhausted += 1,
			SolveOutcome::Skipped => self.skipped += 1,
		}
		self.submissions += outcome.submissions();
	}

	/// Forms that reached a terminal state
	pub fn processed(&self) -> usize {
		self.solved + self.exhausted
	}
}

impl fmt::Display for SessionStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"solved {}, exhausted {}, skipped {}, submissions {}, proceeded {}",
			self.solved, self.exhausted, self.skipped, self.submissions, self.proceeded
		)
	}
}

/// Save page markup to disk for debugging
pub fn save_snapshot(html_dir: &Path, markup: &str, label: &str) -> Result<PathBuf> {
	std::fs::create_dir_all(html_dir).map_err(|e| eyre!("Failed to create HTML dir: {}", e))?;

	let timestamp = chrono::Local::now().format("%H%M%S%.3f");
	let safe_label: String = label.chars().map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' }).collect();
	let filepath = html_dir.join(format!("{timestamp}_{safe_label}.html"));

	std::fs::write(&filepath, markup).map_err(|e| eyre!("Failed to write HTML file: {}", e))?;

	log!("Saved page HTML to: {}", filepath.display());
	Ok(filepath)
}
