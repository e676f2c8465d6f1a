use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::Parser;

mod types;
mod modules;
mod logging;
mod state;
mod args;

use modules::auth::HttpAuthApi;
use modules::goals::factory::ConcreteGoalFactory;
use modules::goals::state::SledGoalRepository;

#[tokio::main]
async fn main() -> Result<()> {

    // a missing .env file is fine, everything can come from the real environment
    _ = dotenvy::dotenv();

    let opt = crate::args::Opt::parse();

    logging::init(opt.log_level.into(),opt.otel_trace_endpoint.clone()).await?;

    let span = tracing::error_span!("MAIN");
    span.in_scope(||{
        tracing::info!("Goal Storage Started");
        tracing::debug!("Using authentication api at {}",opt.auth_url);
    });

    let db = sled::open(&opt.db_path)
        .with_context(|| format!("failed to open goal store at {}",opt.db_path.display()))?;

    let repository = SledGoalRepository::new(&db, &opt.collection, Duration::from_secs(opt.store_timeout_secs))?;
    let factory = ConcreteGoalFactory::new(Arc::new(repository));
    let auth = HttpAuthApi::new(opt.auth_url.clone(), Duration::from_secs(opt.auth_timeout_secs))?;

    let global_state = Arc::new(state::GlobalState::new(Arc::new(factory), Arc::new(auth)));

    let routes = crate::modules::get_all(global_state);

    let (addr,server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(([0, 0, 0, 0], opt.port), async {
            _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested.");
        })?;

    tracing::info!("Server is running on port {}",addr.port());

    server.await;

    db.flush_async().await?;

    tracing::info!("Application stopping gracefully.");

    opentelemetry::global::shutdown_tracer_provider();
    Ok(())

}
