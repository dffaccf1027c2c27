//! CSS selectors of the lesson page markup. Class matches are exact attribute
//! matches, the platform relies on the full class string.

pub const TASK_CONTAINER: &str = r#"div[class="task-basis"]"#;
pub const SUBMIT_BUTTON: &str = r#"button[class="button button_medium button_primary task-basis__submit"]"#;
pub const PROCEED_BUTTON: &str = r#"button[class="replica-variant__button"]"#;

pub const CHECKBOX_OPTION: &str = r#"div[class="t2-option"]"#;
pub const RADIO_OPTION: &str = r#"div[class="t1-option"]"#;
pub const MATRIX_ROW_HEADER: &str = r#"div[class="t6-table__row-header"]"#;
pub const MATRIX_COLUMN_HEADER: &str = r#"div[class="t6-table__column-header"]"#;

/// `class` of the `<form>` element for each solvable kind
pub const CHECKBOX_MARKER: &str = "t2-checkboxes";
pub const RADIO_MARKER: &str = "t1-radios";
pub const MATRIX_MARKER: &str = "t6-table";

/// Class fragment the platform puts on a selected label it judged correct
pub const CORRECT_MARKER: &str = "box_correct";

/// Submit (and, after a rejection, dismiss) button of a form
pub fn submit_for(form_id: &str) -> String {
	format!(r#"button[form="{}"]"#, quote(form_id))
}

pub fn form_by_id(form_id: &str) -> String {
	format!(r#"form[id="{}"]"#, quote(form_id))
}

pub fn label_for(option_id: &str) -> String {
	format!(r#"label[for="{}"]"#, quote(option_id))
}

fn quote(value: &str) -> String {
	value.replace('\\', "\\\\").replace('"', "\\\"")
}
