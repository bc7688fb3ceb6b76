//! stocknews CLI
//!
//! Drives the orchestration layer against the configured backends.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stocknews::{
    controller::{NewsListController, StockListController},
    error::Result,
    models::{Config, Market, NewsOrder, Session, SortField, SortOrder, ViewStatus},
    services::{
        AutocompleteEngine, FetchGateway, HttpGateway, NewsFeed, RankingPoller, RankingView,
    },
    storage::{LocalStorage, PersistenceStore, StateStore},
};

/// stocknews - stock and news search client core
#[derive(Parser, Debug)]
#[command(
    name = "stocknews",
    version,
    about = "Stock and news listing, search and ranking from the command line"
)]
struct Cli {
    /// Path to the config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding persisted favorites and recents
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Bearer token of a logged-in session
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List or search stocks
    Stocks {
        /// Market tab to show (kospi, kosdaq)
        #[arg(long)]
        market: Option<Market>,

        /// Search query instead of the full listing
        #[arg(short, long)]
        query: Option<String>,

        /// Sort column (name, price, change_rate, volume, market_cap, ...)
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: usize,
    },

    /// Browse or search news
    News {
        /// Global feed instead of domestic
        #[arg(long)]
        global: bool,

        #[arg(long)]
        category: Option<String>,

        #[arg(short, long)]
        query: Option<String>,

        /// accuracy, desc or asc
        #[arg(long)]
        order: Option<NewsOrder>,

        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: usize,
    },

    /// Show suggestions for a partial input
    Suggest { input: String },

    /// Follow the rotating ranking sidebar
    Rankings {
        /// Rotation steps to print before exiting
        #[arg(long, default_value_t = 5)]
        cycles: usize,
    },

    /// Show recently viewed stocks
    Recent,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn status_line(status: &ViewStatus) -> Option<String> {
    match status {
        ViewStatus::Empty => Some("No results.".to_string()),
        ViewStatus::Error(e) => Some(format!("Error: {e}")),
        _ => None,
    }
}

fn print_ranking(view: &RankingView) {
    let Some(snapshot) = &view.snapshot else {
        println!("== {} (no data yet)", view.category);
        return;
    };
    println!("== {} (as of {})", view.category, snapshot.as_of);
    for item in &snapshot.items {
        println!(
            "{:>3}. {:<8} {}",
            item.rank,
            item.code,
            item.name.as_deref().unwrap_or("-")
        );
    }
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let storage_dir = cli
        .storage_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(stocknews::models::StorageConfig::default().dir));
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| storage_dir.join("config.toml"));

    let loaded = Config::load(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) if matches!(cli.command, Command::Validate) => {
            log::error!("Cannot read {}: {}", config_path.display(), e);
            return Err(e);
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Config::default()
        }
    };

    let storage_dir = cli
        .storage_dir
        .unwrap_or_else(|| PathBuf::from(&config.storage.dir));
    let session = cli
        .token
        .map(Session::authenticated)
        .unwrap_or_else(Session::anonymous);

    let backend: Arc<dyn StateStore> = Arc::new(LocalStorage::new(&storage_dir));
    let gateway: Arc<dyn FetchGateway> =
        Arc::new(HttpGateway::new(&config.backend, session.clone())?);

    match cli.command {
        Command::Stocks {
            market,
            query,
            sort,
            desc,
            page,
        } => {
            let store = PersistenceStore::open(backend, "stocks").await;
            let stocks = StockListController::new(
                gateway,
                session.clone(),
                store,
                &config.listing,
                &config.cache,
            );

            if session.is_authenticated() {
                if let Err(e) = stocks.load_favorites().await {
                    log::warn!("Could not load favorites: {e}");
                }
            }
            match query {
                Some(q) => stocks.search(&q).await?,
                None => stocks.load_listings().await?,
            };
            if let Some(market) = market {
                stocks.set_tab(market);
            }
            if let Some(field) = sort {
                let spec = stocks.toggle_sort(field);
                if desc && spec.order == SortOrder::Asc {
                    stocks.toggle_sort(field);
                }
            }
            stocks.set_page(page);

            let view = stocks.view();
            if let Some(suggestions) = &view.suggestions {
                if let Some(message) = &suggestions.message {
                    println!("{message}");
                }
                for word in &suggestions.autocomplete {
                    println!("  did you mean: {word}");
                }
            }
            println!(
                "{} - page {}/{} ({} stocks)",
                view.tab,
                view.page + 1,
                view.total_pages.max(1),
                view.total_count
            );
            for stock in &view.visible {
                println!(
                    "{:<8} {:<20} {:>10} {:>8} {:>14}",
                    stock.code,
                    stock.name,
                    stock
                        .current_price
                        .map_or_else(|| "-".to_string(), |p| p.to_string()),
                    stock.change_rate.as_deref().unwrap_or("-"),
                    stock.volume.map_or_else(|| "-".to_string(), |v| v.to_string()),
                );
            }
            if let Some(line) = status_line(&view.status) {
                println!("{line}");
            }
        }

        Command::News {
            global,
            category,
            query,
            order,
            page,
        } => {
            let feed = if global {
                NewsFeed::Global
            } else {
                NewsFeed::Domestic
            };
            let store = PersistenceStore::open(backend, "news").await;
            let news = NewsListController::new(
                gateway,
                store,
                feed,
                &config.listing,
                &config.cache,
                config.autocomplete.clone(),
            );

            match &category {
                Some(c) => {
                    news.set_category(c).await?;
                }
                None if query.is_none() => {
                    news.browse().await?;
                }
                None => {}
            }
            if let Some(q) = &query {
                news.submit(q).await?;
            }
            if let Some(order) = order {
                news.set_order(order).await?;
            }
            if page > 0 {
                news.go_to_page(page).await?;
            }

            let view = news.view();
            println!(
                "{} [{}] order={} - page {}/{}",
                if global { "Global news" } else { "News" },
                view.category,
                view.order,
                view.page + 1,
                view.total_pages.max(1)
            );
            for article in &view.visible {
                println!(
                    "{:<12} {} ({})",
                    article.pub_date.as_deref().unwrap_or("-"),
                    article.title,
                    article.media.as_deref().unwrap_or("-")
                );
            }
            if let Some(line) = status_line(&view.status) {
                println!("{line}");
            }
            news.shutdown();
        }

        Command::Suggest { input } => {
            let engine = AutocompleteEngine::spawn(gateway, config.autocomplete.clone());
            let mut updates = engine.subscribe();
            engine.on_input(input);

            let wait =
                config.autocomplete.debounce() + Duration::from_secs(config.backend.timeout_secs);
            if tokio::time::timeout(wait, updates.changed()).await.is_err() {
                log::warn!("No suggestions within {:?}", wait);
            }

            let set = engine.current();
            for word in &set.autocomplete {
                println!("{word}");
            }
            if let Some(correction) = &set.correction {
                println!(
                    "correction: {} -> {}",
                    correction.original, correction.corrected
                );
            }
            for keyword in &set.trending {
                println!("trending: {} ({})", keyword.keyword, keyword.count);
            }
        }

        Command::Rankings { cycles } => {
            let poller = RankingPoller::spawn(gateway, &config.ranking);
            let mut updates = poller.subscribe();

            // A step is printed once the next one starts, so its fetch has
            // had the whole interval to land.
            let mut held = updates.borrow_and_update().clone();
            let mut shown = 0;
            while shown < cycles {
                if updates.changed().await.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                if view.step != held.step {
                    print_ranking(&held);
                    shown += 1;
                }
                held = view;
            }
            poller.shutdown();
        }

        Command::Recent => {
            let store = PersistenceStore::open(backend, "stocks").await;
            let stocks = StockListController::new(
                gateway,
                session.clone(),
                store,
                &config.listing,
                &config.cache,
            );
            let recent = if session.is_authenticated() {
                stocks.load_recent().await?
            } else {
                stocks.recent()
            };
            if recent.is_empty() {
                println!("No recently viewed stocks.");
            }
            for entry in recent {
                println!("{:<8} {}", entry.code, entry.name);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
