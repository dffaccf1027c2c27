use chromiumoxide::browser::{Browser, BrowserConfig};
use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use futures::StreamExt;
use lis_headless::{
	MAP_URL,
	config::{AppConfig, SettingsFlags},
	lesson_url,
	page::{ChromePage, PageDriver},
	pause::TokioPause,
	runner::{LoopOptions, Solver},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "xdg")]
use v_utils::xdg_state_dir;
use v_utils::{elog, log};

#[derive(Debug, Parser)]
#[command(name = "lis_headless")]
#[command(about = "Solves lesson quiz forms by submitting candidates until the platform accepts one", long_about = None)]
struct Args {
	/// Lesson id to start from instead of the course map
	#[arg(short, long)]
	lesson: Option<String>,

	/// Stop after this many forms were solved or given up on
	#[arg(long)]
	max_forms: Option<usize>,

	#[command(flatten)]
	settings: SettingsFlags,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	let args = Args::parse();
	let config = AppConfig::try_build(args.settings).map_err(|e| eyre!("Failed to load config: {e}"))?;

	let mut builder = BrowserConfig::builder();
	if config.visible {
		builder = builder.with_head();
	}
	if let Some(proxy) = &config.proxy {
		builder = builder.arg(format!("--proxy-server={proxy}"));
	}
	let browser_config = builder.build().map_err(|e| eyre!("Failed to build browser config: {}", e))?;

	let (mut browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| eyre!("Failed to launch browser: {}", e))?;

	// CDP events must be drained or the browser hangs
	let handle = tokio::spawn(async move { while let Some(_event) = handler.next().await {} });

	let page = browser.new_page("about:blank").await.map_err(|e| eyre!("Failed to create new page: {}", e))?;
	let driver = ChromePage::new(page, config.ready_poll());

	let start_url = args.lesson.as_deref().map(lesson_url).unwrap_or_else(|| MAP_URL.to_string());
	log!("Navigating to {start_url}");
	driver.navigate(&start_url).await?;

	let cancel = CancellationToken::new();
	{
		let cancel = cancel.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				log!("Ctrl-C received, stopping after the current form...");
				cancel.cancel();
			}
		});
	}

	let session_id = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
	#[cfg(feature = "xdg")]
	let snapshot_dir = xdg_state_dir!("persist_htmls").join(&session_id);
	#[cfg(not(feature = "xdg"))]
	let snapshot_dir = std::env::temp_dir().join("lis_headless").join(&session_id);
	let options = LoopOptions::new(args.max_forms, config.persist_snapshots, snapshot_dir);
	let solver = Solver::new(&driver, &TokioPause, config.timings());
	let result = solver.run_lessons(&cancel, &options).await;

	match &result {
		Ok(stats) => log!("Session finished: {stats}"),
		Err(e) => elog!("Session aborted: {e}"),
	}

	drop(driver);
	browser.close().await.map_err(|e| eyre!("Failed to close browser: {}", e))?;
	handle.abort();

	result.map(|_| ())
}
