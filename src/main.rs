use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use marquee::config::Config;
use marquee::fetch::{CachingPort, CatalogPort, FetchPort};
use marquee::list::{ListController, EMPTY_DATA_TITLE, ERROR_TITLE, SCREEN_TITLE};
use marquee::queries::RecentQueries;

/// Upper bound on waiting for one load to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the config directory path (~/.config/marquee/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("marquee"))
}

#[derive(Parser, Debug)]
#[command(name = "marquee", about = "Browse trending movies or search a movie catalog")]
struct Args {
    /// Catalog JSON file ({"movies": [...]})
    #[arg(long, value_name = "FILE", default_value = "demos/catalog.json")]
    catalog: PathBuf,

    /// Config file (defaults to ~/.config/marquee/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search by title instead of listing trending movies
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Simulate a missing network connection
    #[arg(long)]
    offline: bool,

    /// Print recent search queries and exit
    #[arg(long)]
    recent: bool,
}

async fn settle<P: FetchPort>(controller: &mut ListController<P>) -> Result<()> {
    tokio::time::timeout(SETTLE_TIMEOUT, controller.settle())
        .await
        .context("Timed out waiting for the catalog to answer")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let queries_path = config_dir.join("recent_queries.json");
    let recent = match RecentQueries::load(&queries_path, config.recent_queries_max) {
        Ok(recent) => recent,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load recent queries, starting empty");
            RecentQueries::new(config.recent_queries_max)
        }
    };

    if args.recent {
        for query in recent.all() {
            println!("{}", query.query);
        }
        return Ok(());
    }

    let catalog = CatalogPort::from_path(&args.catalog, config.page_size)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?
        .with_delay(Duration::from_millis(config.fetch_delay_ms))
        .with_offline(args.offline);
    let port = CachingPort::new(catalog, config.response_cache_pages);

    let mut controller = ListController::new(port).with_recent_queries(recent);

    match args.search.as_deref() {
        Some(text) => controller.search(text),
        None => controller.start(),
    }
    settle(&mut controller).await?;

    while controller.current_page() < args.pages
        && controller.has_more_pages()
        && controller.last_error().get().is_none()
    {
        controller.load_next_page();
        settle(&mut controller).await?;
    }

    let query = controller.query().value();
    if query.is_empty() {
        println!("{} (trending)", SCREEN_TITLE);
    } else {
        println!("{} matching \"{}\"", SCREEN_TITLE, query);
    }
    println!(
        "Page {} of {}",
        controller.current_page(),
        controller.total_page_count()
    );
    println!();

    for (index, item) in controller.list_items().iter().enumerate() {
        let rating = item.rating.as_deref().unwrap_or("-");
        println!("{:>3}. {}  [{}]", index + 1, item.title, rating);
        println!("     {}", item.release_date);
        if !item.overview.is_empty() {
            println!("     {}", item.overview);
        }
    }

    if let Some(message) = controller.last_error().value() {
        eprintln!("{}: {}", ERROR_TITLE, message);
    }
    if controller.is_empty() {
        println!("{}", EMPTY_DATA_TITLE);
    }

    if let Err(e) = controller.recent_queries().save(&queries_path) {
        tracing::warn!(path = %queries_path.display(), error = %e, "Failed to save recent queries");
    }

    Ok(())
}
