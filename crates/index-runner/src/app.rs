//! Binary Wiring
//!
//! Builds production clients from [`Credentials`] and drives one run. The
//! binaries only parse flags and map the outcome to an exit code.

use std::process::ExitCode;
use std::sync::Arc;

use index_core::{GenerationOptions, ScoringOracle};
use index_store::{Notifier, SupabaseClient, TelegramNotifier};
use market_data::{FactorFetcher, HttpMarketApi, MembitClient, SocialApi};
use news_scraper::{BrowserCash, BrowserProvider, HeadlineCollector, NEWS_MONITOR_SITES};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{session_config, Prompts, RunArgs};
use crate::config::{Credentials, Requirement};
use crate::error::{Result, RunError};
use crate::news_monitor::{MonitorReport, NewsMonitor};
use crate::pipeline::{IndexDefinition, Pipeline, RunReport, Sources};
use crate::report;

/// Install the `RUST_LOG` filter (default `info`) and the fmt layer
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Exit code for a finished run; fatal errors are reported on stderr
pub fn exit_code<T>(outcome: Result<T>) -> ExitCode {
    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(stage = %e.stage(), error = %e, "❌ Run aborted");
            eprintln!("[!] {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn browser(credentials: &Credentials) -> Result<Arc<dyn BrowserProvider>> {
    let browser = BrowserCash::new(credentials.browser.clone()).map_err(|e| RunError::Setup(e.to_string()))?;
    Ok(Arc::new(browser))
}

fn store(credentials: &Credentials) -> Result<SupabaseClient> {
    SupabaseClient::new(credentials.supabase.clone()).map_err(|e| RunError::Setup(e.to_string()))
}

/// Score one index end to end and print its card and summary
pub async fn run_index<D: IndexDefinition>(index: &D, args: RunArgs) -> Result<RunReport> {
    let credentials = Credentials::from_env(Requirement::Scoring)?;
    let session = session_config(args, Prompts::Basic)?;

    let profile = index.profile();
    println!("\n{}", "═".repeat(55));
    println!("  {} INDEX  ({} factors)", profile.name.to_uppercase(), profile.factors.len());
    println!("{}\n", "═".repeat(55));

    let provider = credentials
        .oracle
        .clone()
        .ok_or_else(|| RunError::Setup("no oracle configured".into()))?
        .into_provider()
        .map_err(|e| RunError::Setup(e.to_string()))?;
    let options = GenerationOptions::scoring(profile.temperature).with_model(provider.info().model);
    let oracle = ScoringOracle::new(provider, options);

    let social = match credentials.membit.clone() {
        Some(config) => {
            let client = MembitClient::new(config).map_err(|e| RunError::Setup(e.to_string()))?;
            Some(Arc::new(client) as Arc<dyn SocialApi>)
        }
        None => None,
    };
    let market = HttpMarketApi::new(credentials.market.clone()).map_err(|e| RunError::Setup(e.to_string()))?;
    let sources = Sources {
        fetcher: FactorFetcher::new(Arc::new(market)).with_social(social),
        browser: browser(&credentials)?,
        session,
    };

    let pipeline = Pipeline::new(sources, oracle, Arc::new(store(&credentials)?));
    let scored = pipeline.score(index).await?;
    println!("{}", report::result_card(profile, &scored.result));

    let run = pipeline.persist(index, scored).await;
    println!("{}", report::run_summary(&run));
    Ok(run)
}

/// One news monitor pass over the fixed site rotation
pub async fn run_news_monitor(args: RunArgs) -> Result<MonitorReport> {
    let credentials = Credentials::from_env(Requirement::Monitoring)?;
    let session = session_config(args, Prompts::Extended)?;

    let notifier = match credentials.telegram.clone() {
        Some(config) => {
            let notifier = TelegramNotifier::new(config).map_err(|e| RunError::Setup(e.to_string()))?;
            Some(Arc::new(notifier) as Arc<dyn Notifier>)
        }
        None => {
            tracing::warn!("⚠️ Telegram not configured, news will only be stored");
            None
        }
    };

    let collector = HeadlineCollector::new(browser(&credentials)?, session);
    let monitor = NewsMonitor::new(collector, Arc::new(store(&credentials)?)).with_notifier(notifier);

    println!("\n>> News Monitor");
    println!(">> Sites: {}", NEWS_MONITOR_SITES.len());
    let run = monitor.run(&NEWS_MONITOR_SITES).await;

    println!("{}", report::monitor_summary(&run));
    Ok(run)
}
