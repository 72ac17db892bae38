use anyhow::{anyhow, Context};
use clap::Parser;
use scheduledevent_exporter::config::Config;
use scheduledevent_exporter::metrics::{self, MetricStore};
use scheduledevent_exporter::server::{self, ServerState};
use scheduledevent_exporter::{logging, Collector, MetadataClient, PollLoop};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::parse();
    config.validate()?;

    let _guard = logging::init_logging(&config.log_options()).context("failed to set up logging")?;

    let handle = metrics::init_metrics();
    let store = Arc::new(MetricStore::new());

    let source = MetadataClient::new(config.api_url.clone(), config.api_timeout)?;
    let collector = Arc::new(Collector::new(
        Arc::new(source),
        config.api_error_threshold,
        store.clone(),
    ));

    info!(
        api_url = %config.api_url,
        api_timeout = ?config.api_timeout,
        scrape_time = ?config.scrape_time,
        api_error_threshold = config.api_error_threshold,
        "Starting scheduled event exporter"
    );

    let addr = config.bind_addr()?;
    let router = server::create_router(ServerState::new(store, handle));
    let poll = PollLoop::new(collector, config.scrape_time);

    tokio::select! {
        err = poll.run() => Err(err.into()),
        result = server::serve(addr, router) => {
            result?;
            Err(anyhow!("scrape server stopped"))
        }
    }
}
