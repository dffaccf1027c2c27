//! Browser-control channel used by the solver

use std::time::Duration;

use chromiumoxide::Page;
use color_eyre::{Result, eyre::eyre};

/// Everything the solver needs from the live page. Each call completes
/// before the next one is issued; errors are channel failures.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
	/// Current `outerHTML` of the document
	async fn snapshot(&self) -> Result<String>;
	/// Click the first element matching `selector`
	async fn click(&self, selector: &str) -> Result<()>;
	/// Block until the document is loaded and `selector` matches something
	async fn wait_ready(&self, selector: &str) -> Result<()>;
	async fn navigate(&self, url: &str) -> Result<()>;
}

/// [`PageDriver`] over a chromiumoxide page
pub struct ChromePage {
	page: Page,
	ready_poll: Duration,
}

impl ChromePage {
	pub fn new(page: Page, ready_poll: Duration) -> Self {
		Self { page, ready_poll }
	}

	async fn is_ready(&self, selector: &str) -> Result<bool> {
		let selector_js = serde_json::to_string(selector).map_err(|e| eyre!("Failed to encode selector {selector}: {e}"))?;
		let script = format!(
			r#"
			(function() {{
				return document.readyState === 'complete' && document.querySelector({selector_js}) !== null;
			}})()
			"#
		);

		let result = self.page.evaluate(script).await.map_err(|e| eyre!("Failed to poll {selector}: {e}"))?;
		Ok(result.value().and_then(|v| v.as_bool()) == Some(true))
	}
}

impl PageDriver for ChromePage {
	async fn snapshot(&self) -> Result<String> {
		self.page.content().await.map_err(|e| eyre!("Failed to get page HTML: {e}"))
	}

	async fn click(&self, selector: &str) -> Result<()> {
		self.wait_ready(selector).await?;
		let element = self.page.find_element(selector).await.map_err(|e| eyre!("Failed to find {selector}: {e}"))?;
		element.click().await.map_err(|e| eyre!("Failed to click {selector}: {e}"))?;
		Ok(())
	}

	// No timeout: an unresponsive page stalls here until the session is torn down.
	async fn wait_ready(&self, selector: &str) -> Result<()> {
		while !self.is_ready(selector).await? {
			tokio::time::sleep(self.ready_poll).await;
		}
		Ok(())
	}

	async fn navigate(&self, url: &str) -> Result<()> {
		self.page.goto(url).await.map_err(|e| eyre!("Failed to navigate to {url}: {e}"))?;
		Ok(())
	}
}
