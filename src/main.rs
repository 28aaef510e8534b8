use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use summarize_page::clipboard::SystemClipboard;
use summarize_page::filter::PageAccessFilter;
use summarize_page::gemini::GeminiClient;
use summarize_page::store::JsonFileStore;
use summarize_page::tabs::TabHost;
use summarize_page::tabs::local::LocalTabs;
use summarize_page::tabs::webdriver::WebDriverTabs;
use summarize_page::{
    Extractor, Orchestrator, PageDocument, SummarizerConfig, SummaryLength, bridge,
};

mod args;
use args::{Args, Command, KeyAction, PageTarget};

/// The browser side selected on the command line
enum Host {
    Local(Arc<LocalTabs>),
    WebDriver(Arc<WebDriverTabs>),
}

impl Host {
    fn tab_host(&self) -> Arc<dyn TabHost> {
        match self {
            Host::Local(tabs) => tabs.clone() as Arc<dyn TabHost>,
            Host::WebDriver(tabs) => tabs.clone() as Arc<dyn TabHost>,
        }
    }

    async fn shutdown(&self) {
        if let Host::WebDriver(tabs) = self {
            tabs.shutdown().await;
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::debug!("Exiting with error: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => SummarizerConfig::from_file(path)?,
        None => SummarizerConfig::default(),
    }
    .with_env_overrides();

    let filter = Arc::new(PageAccessFilter::with_extra_patterns(
        &config.blocked_url_patterns,
    )?);
    let extractor = Arc::new(Extractor::new(config.extractor.clone()));

    match args.command {
        Command::Summarize {
            target,
            length,
            copy,
        } => {
            let host = open_host(&config, &target, filter, extractor).await?;
            let length = length.unwrap_or(config.default_length);
            let result = summarize(&config, &host, length, copy).await;
            host.shutdown().await;
            result
        }
        Command::Extract { target } => {
            let host = open_host(&config, &target, filter, extractor).await?;
            let result = bridge::request_page_content(host.tab_host().as_ref()).await;
            host.shutdown().await;

            let snapshot = result?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Command::Key { action } => {
            let tabs = Arc::new(LocalTabs::new(filter, extractor));
            let mut orchestrator = build_orchestrator(&config, tabs)?;
            match action {
                KeyAction::Set { key } => {
                    orchestrator.save_api_key(&key)?;
                    println!("API key saved to {}", config.credential_path().display());
                }
                KeyAction::Clear => {
                    orchestrator.clear_api_key()?;
                    println!("API key removed");
                }
                KeyAction::Show => match orchestrator.masked_api_key() {
                    Some(masked) => println!("API key: {}", masked),
                    None => println!("No API key saved"),
                },
            }
            Ok(())
        }
    }
}

fn build_orchestrator(
    config: &SummarizerConfig,
    tabs: Arc<dyn TabHost>,
) -> Result<Orchestrator, Box<dyn Error>> {
    let store = Arc::new(JsonFileStore::new(config.credential_path()));
    let api = GeminiClient::new(&config.api)?;
    let orchestrator = Orchestrator::new(tabs, store, api, Box::new(SystemClipboard::new()))?
        .with_length(config.default_length);
    Ok(orchestrator)
}

async fn summarize(
    config: &SummarizerConfig,
    host: &Host,
    length: SummaryLength,
    copy: bool,
) -> Result<(), Box<dyn Error>> {
    let mut orchestrator = build_orchestrator(config, host.tab_host())?;
    if !orchestrator.has_api_key() {
        return Err("No API key saved. Run `summarize-page key set <KEY>` first.".into());
    }
    orchestrator.set_length(length);

    ::log::info!("Summarizing active tab ({} summary)", orchestrator.length());
    orchestrator.summarize().await;

    if let Some(error) = orchestrator.error() {
        return Err(error.to_string().into());
    }

    if let Some(page) = orchestrator.page_info() {
        println!("{}", page.title);
        println!("{}", page.url);
        println!();
    }
    for line in orchestrator.summary_lines() {
        println!("{}", line);
    }

    if copy {
        orchestrator.copy_summary()?;
        println!();
        println!("Summary copied to clipboard");
    }

    Ok(())
}

async fn open_host(
    config: &SummarizerConfig,
    target: &PageTarget,
    filter: Arc<PageAccessFilter>,
    extractor: Arc<Extractor>,
) -> Result<Host, Box<dyn Error>> {
    if let Some(path) = &target.file {
        let tabs = Arc::new(LocalTabs::new(filter, extractor));
        tabs.open(load_file_document(path)?).await;
        return Ok(Host::Local(tabs));
    }

    let tabs = WebDriverTabs::connect(
        &config.webdriver_url,
        filter,
        extractor,
        Duration::from_secs(config.request_timeout_secs),
    )
    .await?;

    if let Some(url) = &target.url {
        if let Err(e) = tabs.open(url).await {
            tabs.shutdown().await;
            return Err(e.into());
        }
    }

    Ok(Host::WebDriver(Arc::new(tabs)))
}

/// Reads a local HTML file as the document of a `file://` tab
fn load_file_document(path: &Path) -> Result<PageDocument, Box<dyn Error>> {
    let html = std::fs::read_to_string(path)?;
    let absolute = std::fs::canonicalize(path)?;
    let url = url::Url::from_file_path(&absolute)
        .map_err(|_| format!("cannot turn {} into a file URL", absolute.display()))?;

    Ok(PageDocument::new(url.as_str(), html))
}
