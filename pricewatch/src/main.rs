use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pricewatch::config::AppConfig;
use pricewatch::credentials::{AuthorizationTarget, CredentialManager, HttpTokenEndpoint};
use pricewatch::database::{self, repositories::*};
use pricewatch::logging::init_logging;
use pricewatch::monitor::{FanOutExecutor, PriceUpdateProcessor};
use pricewatch::notification::{
    EmailChannel, FeedChannel, NotificationChannel, NotificationDispatcher, TelegramChannel,
};
use pricewatch::scheduler::PipelineScheduler;
use pricewatch::source::{HttpScraperClient, HttpUpstreamApi, SourceGateway};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let (logging, _log_guard) = init_logging(&config.log_dir, config.log_json)?;

    info!("Starting pricewatch v{}", env!("CARGO_PKG_VERSION"));

    let pool = database::init_pool(&config.database_url).await?;
    let write_pool = database::init_write_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let http = reqwest::Client::builder()
        .timeout(config.scraper.timeout)
        .build()?;

    // Upstream credentials
    let mut credentials = CredentialManager::new(
        Arc::new(HttpTokenEndpoint::new(http.clone(), &config.upstream)),
        Arc::new(SqlxCredentialStore::new(write_pool.clone())),
    );
    if config.upstream.has_client() {
        credentials = credentials.with_authorization(AuthorizationTarget::from_config(&config.upstream));
    }
    let credentials = Arc::new(credentials);
    match credentials.load().await {
        Ok(state) => info!(%state, "Upstream credential loaded"),
        Err(e) => warn!(error = %e, "Upstream credential unavailable; using scraper only"),
    }
    if let Ok(url) = credentials.authorization_url() {
        info!(%url, "Upstream authorization URL");
    }

    let gateway = Arc::new(SourceGateway::new(
        credentials,
        Arc::new(HttpUpstreamApi::new(http.clone(), &config.upstream)),
        Arc::new(HttpScraperClient::new(http.clone(), &config.scraper)),
        config.upstream.domains.clone(),
    ));

    // Notifications
    let channels: Vec<Arc<dyn NotificationChannel>> = vec![
        Arc::new(FeedChannel::new(Arc::new(SqlxFeedRepository::new(write_pool.clone())))),
        Arc::new(EmailChannel::new(http.clone(), config.email.clone())),
        Arc::new(TelegramChannel::new(http.clone(), config.telegram.bot_token.clone())),
    ];
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        channels,
    ));

    let processor = Arc::new(PriceUpdateProcessor::new(
        write_pool.clone(),
        config.price_rules,
        dispatcher.clone(),
    ));
    let executor = Arc::new(FanOutExecutor::new(
        gateway.clone(),
        processor,
        config.fanout.max_concurrent_fetches,
    ));
    let scheduler = Arc::new(PipelineScheduler::new(
        Arc::new(SqlxItemRepository::new(pool.clone(), write_pool.clone())),
        gateway,
        executor,
        config.scheduler.clone(),
    ));

    let cancel = CancellationToken::new();
    logging.start_retention_cleanup(cancel.child_token());
    let scheduler_task = scheduler.start(cancel.child_token());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    cancel.cancel();
    if let Err(e) = scheduler_task.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }
    scheduler.wait_idle().await;
    dispatcher.wait_idle().await;

    let stats = dispatcher.stats();
    info!(
        sent = stats.sent,
        failed = stats.failed,
        "pricewatch stopped"
    );
    Ok(())
}
