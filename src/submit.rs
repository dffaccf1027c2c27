//! Submitting a form and reading the platform's verdict

use color_eyre::Result;

use crate::{Verdict, page::PageDriver, pause::Pause, runner::Solver, selectors, snapshot::Snapshot};

/// Inspects the page right after a submission, before the verdict is taken
pub trait FeedbackExtractor {
	fn inspect(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> FeedbackExtractor for F {
	fn inspect(&mut self, snapshot: &Snapshot) {
		(*self)(snapshot)
	}
}

impl<P: PageDriver, S: Pause> Solver<'_, P, S> {
	/// Submit `form_id` and tell whether the platform took the answer.
	///
	/// The submit button only disappears once the form is satisfied, so its presence
	/// after the settle pause means Rejected. On rejection the same button serves as
	/// "try again" and is clicked once more to reopen the form.
	pub async fn submit(&self, form_id: &str, extractors: &mut [&mut dyn FeedbackExtractor]) -> Result<Verdict> {
		let submit = selectors::submit_for(form_id);
		let form = selectors::form_by_id(form_id);

		self.page.click(&submit).await?;
		self.pause.pause(self.timings.settle).await;
		self.page.wait_ready(&form).await?;
		let markup = self.page.snapshot().await?;

		let still_open = {
			let snapshot = Snapshot::parse(&markup);
			for extractor in extractors.iter_mut() {
				extractor.inspect(&snapshot);
			}
			snapshot.contains(&submit)?
		};

		if !still_open {
			return Ok(Verdict::Accepted);
		}

		self.page.click(&submit).await?;
		self.page.wait_ready(&form).await?;
		Ok(Verdict::Rejected)
	}
}
