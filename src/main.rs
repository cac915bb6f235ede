use std::sync::Arc;

use clap::Parser;
use price_tracker::config::FetchStrategy;
use price_tracker::utils::error::ErrorSeverity;
use price_tracker::utils::{logger, validation::Validate};
use price_tracker::{
    select_fetcher, Cli, Command, PricePipeline, PriceSearch, RefreshOrchestrator, Scheduler,
    SqliteStore, TokioSleeper, TrackerConfig, TrackerError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, config.logging.format);
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = run(&cli, config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> price_tracker::Result<TrackerConfig> {
    let mut config = TrackerConfig::load(&cli.config)?;

    if let Some(strategy) = &cli.strategy {
        config.fetcher.strategy = match strategy.to_ascii_lowercase().as_str() {
            "auto" => FetchStrategy::Auto,
            "browser" => FetchStrategy::Browser,
            "static" => FetchStrategy::Static,
            other => {
                return Err(TrackerError::InvalidConfigValue {
                    field: "--strategy".to_string(),
                    value: other.to_string(),
                    reason: "Expected one of: auto, browser, static".to_string(),
                })
            }
        };
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: &Cli, config: TrackerConfig) -> price_tracker::Result<()> {
    let sleeper = Arc::new(TokioSleeper);

    match &cli.command {
        Command::InitDb => {
            SqliteStore::open(&config.database.path)?;
            println!("✅ Database ready at {}", config.database.path);
        }
        Command::Fetch { url } => {
            let pipeline = PricePipeline::new(select_fetcher(&config)?);
            match pipeline.try_fetch_price(url).await {
                Ok(price) => println!("{:.2}", price),
                Err(e) => {
                    tracing::info!("No price for {}: {}", url, e);
                    println!("unavailable");
                }
            }
        }
        Command::Search { query } => {
            let pipeline = PricePipeline::new(select_fetcher(&config)?);
            let store = Arc::new(SqliteStore::open(&config.database.path)?);
            let report = PriceSearch::new(pipeline, store).search_prices(query).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Refresh => {
            let pipeline = PricePipeline::new(select_fetcher(&config)?);
            let store = Arc::new(SqliteStore::open(&config.database.path)?);
            let orchestrator =
                RefreshOrchestrator::new(pipeline, store, sleeper, config.politeness_delay());
            let summary = orchestrator.refresh_all().await?;
            println!(
                "✅ Refreshed {} targets: {} updated, {} skipped, {} failed",
                summary.targets, summary.updated, summary.skipped, summary.failed
            );
        }
        Command::Serve => {
            let pipeline = PricePipeline::new(select_fetcher(&config)?);
            let store = Arc::new(SqliteStore::open(&config.database.path)?);
            let orchestrator = Arc::new(RefreshOrchestrator::new(
                pipeline,
                store,
                sleeper.clone(),
                config.politeness_delay(),
            ));
            let scheduler = Arc::new(Scheduler::new(
                orchestrator,
                sleeper,
                config.warmup_delay(),
                config.refresh_interval(),
            ));

            let handle = scheduler.spawn();
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutting down price refresher");
            handle.abort();
        }
    }

    Ok(())
}
