//! Locating the active form on a lesson page and telling what kind it is

use crate::{
	Form, FormKind, selectors,
	snapshot::{SelectorError, Snapshot, count_within, first_within},
};

#[derive(Debug, thiserror::Error, Clone, Eq, PartialEq)]
pub enum ClassifyError {
	#[error("Forms not found")]
	NoFormContainer,
	#[error("Submit button not found")]
	NoSubmitControl,
	#[error("Form id not found on submit button")]
	FormIdMissing,
	#[error("Form {0} not found")]
	FormElementMissing(String),
	#[error("Form type not found for form {0}")]
	TypeMarkerMissing(String),
	#[error(transparent)]
	Selector(#[from] SelectorError),
}

impl ClassifyError {
	/// The page is in an unexpected shape, as opposed to simply having no open form
	pub fn is_anomaly(&self) -> bool {
		matches!(self, ClassifyError::FormElementMissing(_) | ClassifyError::TypeMarkerMissing(_) | ClassifyError::Selector(_))
	}
}

/// Classify the most recently added form on the page.
///
/// Unrecognized type markers are not an error: they come back as [`FormKind::Unknown`].
pub fn classify(snapshot: &Snapshot) -> Result<Form, ClassifyError> {
	let container = snapshot.last(selectors::TASK_CONTAINER)?.ok_or(ClassifyError::NoFormContainer)?;
	let submit = first_within(container, selectors::SUBMIT_BUTTON)?.ok_or(ClassifyError::NoSubmitControl)?;
	let form_id = submit.value().attr("form").ok_or(ClassifyError::FormIdMissing)?.to_string();

	let form = snapshot
		.first(&selectors::form_by_id(&form_id))?
		.ok_or_else(|| ClassifyError::FormElementMissing(form_id.clone()))?;
	let marker = form.value().attr("class").ok_or_else(|| ClassifyError::TypeMarkerMissing(form_id.clone()))?;

	let kind = match marker {
		selectors::CHECKBOX_MARKER => FormKind::Checkbox {
			options: count_within(form, selectors::CHECKBOX_OPTION)?,
		},
		selectors::RADIO_MARKER => FormKind::Radio {
			options: count_within(form, selectors::RADIO_OPTION)?,
		},
		selectors::MATRIX_MARKER => FormKind::Matrix {
			rows: count_within(form, selectors::MATRIX_ROW_HEADER)?,
			cols: count_within(form, selectors::MATRIX_COLUMN_HEADER)?,
		},
		other => FormKind::Unknown { marker: other.to_string() },
	};

	Ok(Form::new(form_id, kind))
}

pub fn classify_markup(markup: &str) -> Result<Form, ClassifyError> {
	classify(&Snapshot::parse(markup))
}
