//! In-memory lesson page that grades answers against a hidden key

use std::{
	cell::RefCell,
	collections::{BTreeSet, VecDeque},
	future::Future,
	time::Duration,
};

use color_eyre::{
	Result,
	eyre::{bail, eyre},
};

use crate::{page::PageDriver, pause::Pause, selectors, snapshot::Snapshot};

/// Hidden answer of one form
#[derive(Clone, Debug)]
pub(crate) enum Key {
	Checkbox { options: usize, correct: Vec<usize> },
	Radio { options: usize, correct: usize },
	/// One correct column per row
	Matrix { cols: usize, correct: Vec<usize> },
	Unknown { marker: &'static str },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
	Editing,
	/// Rejected; the submit button now acts as "try again"
	Feedback,
	Accepted,
}

struct Task {
	id: String,
	key: Key,
	selected: BTreeSet<usize>,
	cells: Vec<Option<usize>>,
	phase: Phase,
}

impl Task {
	fn new(id: &str, key: Key) -> Self {
		let rows = match &key {
			Key::Matrix { correct, .. } => correct.len(),
			_ => 0,
		};
		Self {
			id: id.to_string(),
			key,
			selected: BTreeSet::new(),
			cells: vec![None; rows],
			phase: Phase::Editing,
		}
	}

	fn is_correct(&self) -> bool {
		match &self.key {
			Key::Checkbox { correct, .. } => self.selected.iter().copied().eq(correct.iter().copied()),
			Key::Radio { correct, .. } => self.selected.len() == 1 && self.selected.contains(correct),
			Key::Matrix { correct, .. } => self.cells.iter().zip(correct).all(|(cell, c)| *cell == Some(*c)),
			Key::Unknown { .. } => false,
		}
	}

	fn current_answer(&self) -> Vec<usize> {
		match &self.key {
			Key::Matrix { .. } => self.cells.iter().map(|cell| cell.unwrap_or(usize::MAX)).collect(),
			_ => self.selected.iter().copied().collect(),
		}
	}

	fn select(&mut self, option_id: &str) -> Result<()> {
		if self.phase != Phase::Editing {
			bail!("clicked {option_id} while the form is {:?}", self.phase);
		}
		match &self.key {
			Key::Checkbox { options, .. } | Key::Radio { options, .. } => {
				let index: usize = option_id
					.strip_prefix(&format!("{}_var", self.id))
					.and_then(|i| i.parse().ok())
					.filter(|i| i < options)
					.ok_or_else(|| eyre!("no option {option_id}"))?;
				if matches!(self.key, Key::Radio { .. }) {
					self.selected.clear();
					self.selected.insert(index);
				} else if !self.selected.remove(&index) {
					self.selected.insert(index);
				}
			}
			Key::Matrix { cols, .. } => {
				let (row, col) = option_id
					.strip_prefix(&format!("{}_row-", self.id))
					.and_then(|rest| rest.split_once(&format!("__{}_col-", self.id)))
					.and_then(|(r, c)| Some((r.parse::<usize>().ok()?, c.parse::<usize>().ok()?)))
					.filter(|&(r, c)| r < self.cells.len() && c < *cols)
					.ok_or_else(|| eyre!("no cell {option_id}"))?;
				self.cells[row] = Some(col);
			}
			Key::Unknown { .. } => bail!("form {} has no options", self.id),
		}
		Ok(())
	}

	/// Clear what was wrong; correct matrix rows stay selected
	fn dismiss(&mut self) {
		match &self.key {
			Key::Matrix { correct, .. } =>
				for (cell, c) in self.cells.iter_mut().zip(correct) {
					if *cell != Some(*c) {
						*cell = None;
					}
				},
			_ => self.selected.clear(),
		}
		self.phase = Phase::Editing;
	}

	fn render(&self, layout: Layout) -> String {
		let id = &self.id;
		let mut form = String::new();
		match &self.key {
			Key::Checkbox { options, .. } | Key::Radio { options, .. } => {
				let (marker, option_class) = match self.key {
					Key::Checkbox { .. } => ("t2-checkboxes", "t2-option"),
					_ => ("t1-radios", "t1-option"),
				};
				form.push_str(&format!(r#"<form id="{id}" class="{marker}">"#));
				for i in 0..*options {
					let checked = if self.selected.contains(&i) { " checked" } else { "" };
					form.push_str(&format!(
						r#"<div class="{option_class}"><input type="checkbox" id="{id}_var{i}"{checked}><label for="{id}_var{i}" class="{option_class}__label">Option {i}</label></div>"#
					));
				}
			}
			Key::Matrix { cols, correct } => {
				form.push_str(&format!(r#"<form id="{id}" class="t6-table">"#));
				for c in 0..*cols {
					form.push_str(&format!(r#"<div class="t6-table__column-header">Column {c}</div>"#));
				}
				for (r, right) in correct.iter().enumerate() {
					form.push_str(r#"<div class="t6-table__row">"#);
					form.push_str(&format!(r#"<div class="t6-table__row-header">Row {r}</div>"#));
					for c in 0..*cols {
						let graded = self.phase != Phase::Editing;
						let class = match (graded && self.cells[r] == Some(c), graded && layout.bare_feedback) {
							(_, true) => String::new(),
							(true, false) if c == *right => r#" class="t6-table__box t6-table__box_correct""#.to_string(),
							(true, false) => r#" class="t6-table__box t6-table__box_incorrect""#.to_string(),
							(false, false) => r#" class="t6-table__box""#.to_string(),
						};
						form.push_str(&format!(r#"<input type="radio" id="{id}_row-{r}__{id}_col-{c}"><label for="{id}_row-{r}__{id}_col-{c}"{class}></label>"#));
					}
					form.push_str("</div>");
				}
			}
			Key::Unknown { marker } => form.push_str(&format!(r#"<form id="{id}" class="{marker}">"#)),
		}
		form.push_str("</form>");

		let mut html = format!(r#"<div class="task-basis">{form}"#);
		if self.phase != Phase::Accepted {
			html.push_str(&format!(r#"<button class="button button_medium button_primary task-basis__submit" form="{id}">Ответить</button>"#));
		}
		html.push_str("</div>");
		if self.phase == Phase::Accepted || layout.skippable {
			html.push_str(r#"<div class="replica-variant"><button class="replica-variant__button">Дальше</button></div>"#);
		}
		html
	}
}

/// Page-wide quirks the platform can be configured with
#[derive(Clone, Copy, Debug, Default)]
struct Layout {
	/// Proceed button is offered even before the form is accepted
	skippable: bool,
	/// Graded matrix labels come back without a `class`
	bare_feedback: bool,
}

#[derive(Default)]
struct State {
	layout: Layout,
	current: Option<Task>,
	queue: VecDeque<Task>,
	clicks: Vec<String>,
	waits: Vec<String>,
	evaluations: Vec<Vec<usize>>,
	dismissals: usize,
}

/// Lesson page serving a queue of forms, one at a time. Clicking the proceed
/// button after an accepted form loads the next one; after the last the page is empty.
pub(crate) struct FakePlatform {
	state: RefCell<State>,
}

impl FakePlatform {
	pub fn single(id: &str, key: Key) -> Self {
		Self::lesson(vec![(id, key)])
	}

	pub fn lesson(forms: Vec<(&str, Key)>) -> Self {
		let mut queue: VecDeque<Task> = forms.into_iter().map(|(id, key)| Task::new(id, key)).collect();
		let current = queue.pop_front();
		Self {
			state: RefCell::new(State { current, queue, ..State::default() }),
		}
	}

	pub fn skippable(mut self) -> Self {
		self.state.get_mut().layout.skippable = true;
		self
	}

	pub fn bare_feedback(mut self) -> Self {
		self.state.get_mut().layout.bare_feedback = true;
		self
	}

	/// Answer held at each submission that was graded
	pub fn evaluations(&self) -> Vec<Vec<usize>> {
		self.state.borrow().evaluations.clone()
	}

	pub fn dismissals(&self) -> usize {
		self.state.borrow().dismissals
	}

	pub fn clicks(&self) -> Vec<String> {
		self.state.borrow().clicks.clone()
	}

	pub fn clicks_on(&self, selector: &str) -> usize {
		self.state.borrow().clicks.iter().filter(|c| *c == selector).count()
	}

	pub fn waits_on(&self, selector: &str) -> usize {
		self.state.borrow().waits.iter().filter(|w| *w == selector).count()
	}

	fn render(&self) -> String {
		let state = self.state.borrow();
		let body = state.current.as_ref().map(|task| task.render(state.layout)).unwrap_or_default();
		format!(r#"<html><head></head><body><div class="lesson">{body}</div></body></html>"#)
	}
}

impl PageDriver for FakePlatform {
	async fn snapshot(&self) -> Result<String> {
		Ok(self.render())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		let mut state = self.state.borrow_mut();
		state.clicks.push(selector.to_string());

		if selector == selectors::PROCEED_BUTTON {
			let accepted = state.current.as_ref().is_some_and(|t| t.phase == Phase::Accepted);
			if !(accepted || (state.current.is_some() && state.layout.skippable)) {
				bail!("no proceed button on the page");
			}
			state.current = state.queue.pop_front();
			return Ok(());
		}

		let State { current, evaluations, dismissals, .. } = &mut *state;
		let Some(task) = current.as_mut() else {
			bail!("nothing to click on an empty page: {selector}");
		};

		if let Some(option_id) = selector.strip_prefix(r#"label[for=""#).and_then(|s| s.strip_suffix(r#""]"#)) {
			return task.select(option_id);
		}

		if selector == selectors::submit_for(&task.id) {
			match task.phase {
				Phase::Editing => {
					evaluations.push(task.current_answer());
					task.phase = if task.is_correct() { Phase::Accepted } else { Phase::Feedback };
				}
				Phase::Feedback => {
					*dismissals += 1;
					task.dismiss();
				}
				Phase::Accepted => bail!("submit button is gone"),
			}
			return Ok(());
		}

		bail!("unexpected click on {selector}")
	}

	async fn wait_ready(&self, selector: &str) -> Result<()> {
		self.state.borrow_mut().waits.push(selector.to_string());
		if !Snapshot::parse(&self.render()).contains(selector)? {
			bail!("{selector} would never become ready");
		}
		Ok(())
	}

	async fn navigate(&self, _url: &str) -> Result<()> {
		Ok(())
	}
}

/// Zero-delay pause that remembers what it was asked to wait
#[derive(Default)]
pub(crate) struct RecordingPause {
	waits: RefCell<Vec<Duration>>,
}

impl RecordingPause {
	pub fn recorded(&self) -> Vec<Duration> {
		self.waits.borrow().clone()
	}
}

impl Pause for RecordingPause {
	async fn pause(&self, duration: Duration) {
		self.waits.borrow_mut().push(duration);
	}
}

/// Drive an async test body from inside a `proptest!` case
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
	tokio::runtime::Builder::new_current_thread().enable_all().build().expect("test runtime").block_on(future)
}
