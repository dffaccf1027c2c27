//! Parsed page markup with selector queries on top of `scraper`.

use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error, Clone, Eq, PartialEq)]
#[error("invalid selector `{css}`: {reason}")]
pub struct SelectorError {
	css: String,
	reason: String,
}

pub fn selector(css: &str) -> Result<Selector, SelectorError> {
	Selector::parse(css).map_err(|e| SelectorError {
		css: css.to_string(),
		reason: e.to_string(),
	})
}

/// One `outerHTML` capture of the page
pub struct Snapshot {
	doc: Html,
}

impl Snapshot {
	pub fn parse(markup: &str) -> Self {
		Self { doc: Html::parse_document(markup) }
	}

	pub fn contains(&self, css: &str) -> Result<bool, SelectorError> {
		let selector = selector(css)?;
		Ok(self.doc.select(&selector).next().is_some())
	}

	pub fn first(&self, css: &str) -> Result<Option<ElementRef<'_>>, SelectorError> {
		let selector = selector(css)?;
		Ok(self.doc.select(&selector).next())
	}

	/// Last match in document order, i.e. the most recently appended element
	pub fn last(&self, css: &str) -> Result<Option<ElementRef<'_>>, SelectorError> {
		let selector = selector(css)?;
		Ok(self.doc.select(&selector).last())
	}
}

pub fn first_within<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>, SelectorError> {
	let selector = selector(css)?;
	Ok(scope.select(&selector).next())
}

pub fn count_within(scope: ElementRef<'_>, css: &str) -> Result<usize, SelectorError> {
	let selector = selector(css)?;
	Ok(scope.select(&selector).count())
}
