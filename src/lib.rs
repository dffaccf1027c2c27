use std::fmt;

use derive_new::new;

pub mod classify;
pub mod config;
pub mod enumerate;
pub mod page;
pub mod pause;
pub mod runner;
pub mod selectors;
pub mod snapshot;
pub mod submit;
#[cfg(test)]
pub(crate) mod test_support;

/// Course map, the default landing page
pub const MAP_URL: &str = "https://lis.itmo.ru/1/map";

/// URL of a single lesson page
pub fn lesson_url(lesson_id: &str) -> String {
	format!("https://lis.itmo.ru/1/lesson/{lesson_id}")
}

/// Interaction model of a quiz form, read from the `class` of its `<form>` element
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormKind {
	/// Any subset of the options may be the answer
	Checkbox { options: usize },
	/// Exactly one option is the answer
	Radio { options: usize },
	/// Grid where every row has exactly one correct column
	Matrix { rows: usize, cols: usize },
	/// A marker we don't know how to solve. Skipped without error.
	Unknown { marker: String },
}

impl FormKind {
	/// Short tag for log lines
	pub fn tag(&self) -> &'static str {
		match self {
			FormKind::Checkbox { .. } => "[checkbox]",
			FormKind::Radio { .. } => "[radio]",
			FormKind::Matrix { .. } => "[matrix]",
			FormKind::Unknown { .. } => "[unknown]",
		}
	}
}

/// One form occurrence on the lesson page
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct Form {
	/// Platform-assigned id, shared by the `<form>` and its submit button
	pub id: String,
	pub kind: FormKind,
}

impl Form {
	/// Id of a checkbox/radio option, as referenced by its label's `for`
	pub fn option_id(&self, index: usize) -> String {
		format!("{}_var{}", self.id, index)
	}

	/// Id of a matrix cell, as referenced by its label's `for`
	pub fn cell_id(&self, row: usize, col: usize) -> String {
		format!("{id}_row-{row}__{id}_col-{col}", id = self.id)
	}

	/// Every option of the form, in page order (row-major for matrices)
	pub fn option_ids(&self) -> Vec<String> {
		match self.kind {
			FormKind::Checkbox { options } | FormKind::Radio { options } => (0..options).map(|i| self.option_id(i)).collect(),
			FormKind::Matrix { rows, cols } => (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).map(|(r, c)| self.cell_id(r, c)).collect(),
			FormKind::Unknown { .. } => Vec::new(),
		}
	}
}

impl fmt::Display for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "form {} {}", self.id, self.kind.tag())?;
		match &self.kind {
			FormKind::Checkbox { options } | FormKind::Radio { options } => write!(f, " ({options} options)"),
			FormKind::Matrix { rows, cols } => write!(f, " ({rows}x{cols})"),
			FormKind::Unknown { marker } => write!(f, " (marker {marker:?})"),
		}
	}
}

/// Outcome of a single submission, decided by whether the submit button survives it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
	Accepted,
	Rejected,
}

/// A concrete answer that was submitted
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Candidate {
	/// Selected option indices, ascending
	Checkbox(Vec<usize>),
	Radio(usize),
	/// Chosen column per row
	Matrix(Vec<usize>),
}

impl fmt::Display for Candidate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Candidate::Checkbox(indices) => write!(f, "{indices:?}"),
			Candidate::Radio(index) => write!(f, "#{index}"),
			Candidate::Matrix(cols) => {
				let cells: Vec<String> = cols.iter().enumerate().map(|(row, col)| format!("{row}->{col}")).collect();
				write!(f, "[{}]", cells.join(", "))
			}
		}
	}
}

/// Why a search gave up
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExhaustReason {
	/// The form rendered no options at all
	NoOptions,
	/// Every candidate was submitted and rejected
	AllRejected,
	/// A matrix row was rejected in its last column
	RowOutOfColumns { row: usize },
	/// The post-submit page had no readable label for a probed matrix row
	FeedbackMissing { row: usize },
}

impl fmt::Display for ExhaustReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExhaustReason::NoOptions => write!(f, "no options found"),
			ExhaustReason::AllRejected => write!(f, "every candidate was rejected"),
			ExhaustReason::RowOutOfColumns { row } => write!(f, "row {row} rejected in every column"),
			ExhaustReason::FeedbackMissing { row } => write!(f, "no feedback label for row {row}"),
		}
	}
}

/// Result of solving one form occurrence
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolveOutcome {
	Accepted { candidate: Candidate, submissions: usize },
	Exhausted { reason: ExhaustReason, submissions: usize },
	/// Form of an unrecognized type, left alone
	Skipped,
}

impl SolveOutcome {
	pub fn submissions(&self) -> usize {
		match self {
			SolveOutcome::Accepted { submissions, .. } | SolveOutcome::Exhausted { submissions, .. } => *submissions,
			SolveOutcome::Skipped => 0,
		}
	}
}
