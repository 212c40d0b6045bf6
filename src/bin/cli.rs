//! shopee-tracker command line
//!
//! Scrapes Shopee search result pages and records them in Firestore. Firestore is
//! configured through `PROJECT_ID` and `API_KEY` (see `FirestoreConfig::from_env`).

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use shopee_tracker::{BrowserSession, ConnectionOptions, DocumentStore, FirestoreClient, FirestoreConfig, LaunchOptions,
                     MemoryStore, Product, SyncOptions, SyncReport, listing::scrape_pages, sync::DEFAULT_CONCURRENCY,
                     tools::utils::{DEFAULT_STOREFRONT, normalize_target}, upload_products};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

/// GET stays disabled for this long after the previous run finished
const GET_COOLDOWN: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(name = "shopee-tracker")]
#[command(version)]
#[command(about = "Scrape Shopee search results into Firestore", long_about = None)]
struct Cli {
    #[command(flatten)]
    browser: BrowserArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BrowserArgs {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H', global = true)]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH", global = true)]
    chrome_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR", global = true)]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL", global = true)]
    ws_endpoint: Option<String>,

    /// Storefront used when a bare keyword is given instead of a URL
    #[arg(long, default_value = DEFAULT_STOREFRONT, global = true)]
    storefront: String,
}

#[derive(Args)]
struct UploadArgs {
    /// Products uploaded concurrently
    #[arg(long, short = 'c', default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Keep writes in memory instead of sending them to Firestore
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape result pages and print the products as JSON
    Scrape {
        /// Search URL or keyword
        #[arg(long, short = 'u')]
        url: String,

        /// Maximum number of result pages to follow
        #[arg(long, short = 'p', default_value_t = 1)]
        pages: usize,

        /// Write JSON here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Scrape result pages and upload them
    Sync {
        /// Search URL or keyword
        #[arg(long, short = 'u')]
        url: String,

        /// Maximum number of result pages to follow
        #[arg(long, short = 'p', default_value_t = 1)]
        pages: usize,

        #[command(flatten)]
        upload: UploadArgs,
    },
    /// Upload products from a JSON file written by `scrape`
    Upload {
        #[arg(long, short = 'i')]
        input: PathBuf,

        #[command(flatten)]
        upload: UploadArgs,
    },
    /// Drive the page by hand with back / get / next
    Interactive {
        /// Search URL or keyword to open first
        #[arg(long, short = 'u')]
        url: String,

        #[command(flatten)]
        upload: UploadArgs,
    },
}

/// Rate limit for the GET control: disabled while a run is in progress and for
/// `period` after it finishes
struct Cooldown {
    period: Duration,
    running: bool,
    finished: Option<Instant>,
}

impl Cooldown {
    fn new(period: Duration) -> Self {
        Self { period, running: false, finished: None }
    }

    fn try_start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        if let Some(finished) = self.finished {
            if now.duration_since(finished) < self.period {
                return false;
            }
        }
        self.running = true;
        true
    }

    fn finish(&mut self, now: Instant) {
        self.running = false;
        self.finished = Some(now);
    }
}

fn open_session(args: &BrowserArgs) -> anyhow::Result<BrowserSession> {
    if let Some(ref endpoint) = args.ws_endpoint {
        eprintln!("WebSocket endpoint: {}", endpoint);
        return Ok(BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))?);
    }

    let mut options = LaunchOptions::new().headless(!args.headed);
    if let Some(ref path) = args.chrome_path {
        options = options.chrome_path(path);
    }
    if let Some(ref dir) = args.user_data_dir {
        options = options.user_data_dir(dir);
    }

    eprintln!("Browser mode: {}", if options.headless { "headless" } else { "headed" });

    Ok(BrowserSession::launch(options).context("Failed to launch browser")?)
}

fn open_store(args: &UploadArgs) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if args.dry_run {
        eprintln!("Dry run: nothing is sent to Firestore");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let config = FirestoreConfig::from_env().context("Firestore is not configured")?;
    Ok(Arc::new(FirestoreClient::new(config)?))
}

fn open_page(session: &BrowserSession, target: &str, storefront: &str) -> anyhow::Result<()> {
    let url = normalize_target(target, storefront);
    eprintln!("Opening {}", url);
    session.navigate(&url)?;
    session.wait_for_navigation()?;
    Ok(())
}

fn print_report(report: &SyncReport) {
    eprintln!("Saved {} / failed {} (of {})", report.saved, report.failed, report.total);
    for failure in &report.failures {
        eprintln!("  {} - {}", failure.url, failure.reason);
    }
}

fn notify(message: &str, is_error: bool) {
    if is_error {
        println!("[error] {}", message);
    } else {
        println!("[ok] {}", message);
    }
}

async fn upload(products: Vec<Product>, args: &UploadArgs) -> anyhow::Result<SyncReport> {
    let store = open_store(args)?;
    let report = upload_products(store, products, SyncOptions::default().concurrency(args.concurrency)).await?;
    print_report(&report);
    Ok(report)
}

async fn run_interactive(session: &BrowserSession, storefront: &str, args: &UploadArgs) -> anyhow::Result<()> {
    let registry = session.tool_registry();
    let mut cooldown = Cooldown::new(GET_COOLDOWN);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Commands: back | get | next | state | go <url or keyword> | quit");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').map_or((line, ""), |(c, r)| (c, r.trim()));

        let result = match command {
            "" => continue,
            "quit" | "exit" => break,
            "back" => session.execute_tool("prev_page", serde_json::json!({})),
            "next" => session.execute_tool("next_page", serde_json::json!({})),
            "state" => session.execute_tool("pager_state", serde_json::json!({})),
            "go" if !rest.is_empty() => session.execute_tool("navigate", serde_json::json!({ "url": normalize_target(rest, storefront) })),
            "get" => {
                if !cooldown.try_start(Instant::now()) {
                    notify("GET is cooling down, try again in a moment.", true);
                    continue;
                }
                run_get(session, args).await;
                cooldown.finish(Instant::now());
                continue;
            }
            _ => {
                eprintln!("Unknown command '{}'. Available tools: {}", line, registry.names().collect::<Vec<_>>().join(", "));
                continue;
            }
        };

        match result {
            Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
            Err(e) => notify(&e.to_string(), true),
        }
    }

    Ok(())
}

/// GET: extract the current page and upload it, reporting through a notification
async fn run_get(session: &BrowserSession, args: &UploadArgs) {
    let products = match session.execute_tool("extract_products", serde_json::json!({})) {
        Ok(outcome) if outcome.success => outcome
            .data
            .and_then(|data| data.get("products").cloned())
            .and_then(|products| serde_json::from_value::<Vec<Product>>(products).ok())
            .unwrap_or_default(),
        Ok(_) => Vec::new(),
        Err(e) => {
            log::error!("Extraction failed: {}", e);
            Vec::new()
        }
    };

    if products.is_empty() {
        notify("Failed to fetch data.", true);
        return;
    }

    let count = products.len();
    match upload(products, args).await {
        Ok(report) if report.any_saved() => notify(&format!("{} of {} products saved.", report.saved, count), false),
        Ok(_) => notify("Failed to fetch data.", true),
        Err(e) => {
            log::error!("Upload failed: {:#}", e);
            notify("Failed to fetch data.", true);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    eprintln!("shopee-tracker v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Scrape { url, pages, output } => {
            let session = open_session(&cli.browser)?;
            open_page(&session, &url, &cli.browser.storefront)?;
            let products = scrape_pages(&session, pages)?;
            let json = serde_json::to_string_pretty(&products)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await.with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote {} products to {}", products.len(), path.display());
                }
                None => println!("{}", json),
            }
            session.close()?;
        }
        Command::Sync { url, pages, upload: args } => {
            let session = open_session(&cli.browser)?;
            open_page(&session, &url, &cli.browser.storefront)?;
            let products = scrape_pages(&session, pages)?;
            session.close()?;

            let report = upload(products, &args).await?;
            if !report.any_saved() {
                bail!("No products were saved");
            }
        }
        Command::Upload { input, upload: args } => {
            let json = tokio::fs::read_to_string(&input).await.with_context(|| format!("Failed to read {}", input.display()))?;
            let products: Vec<Product> = serde_json::from_str(&json).context("Input is not a product list")?;

            let report = upload(products, &args).await?;
            if !report.any_saved() {
                bail!("No products were saved");
            }
        }
        Command::Interactive { url, upload: args } => {
            let session = open_session(&cli.browser)?;
            open_page(&session, &url, &cli.browser.storefront)?;
            run_interactive(&session, &cli.browser.storefront, &args).await?;
            session.close()?;
        }
    }

    Ok(())
}
