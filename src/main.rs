//! OpenSASE Fulfillment - order fulfillment and returns back office

use anyhow::Result;
use tracing::{info, warn};

use opensase_fulfillment::{
    api::{self, AppState},
    config::Config,
    publisher::EventPublisher,
    store::Repositories,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    telemetry::init(config.log_format);

    let repos = Repositories::connect(&config).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { warn!(error = %e, "NATS unavailable, events are logged only"); None }
        },
        None => None,
    };

    let app = api::router(AppState::new(repos, EventPublisher::new(nats)));
    let addr = format!("0.0.0.0:{}", config.port);
    info!("OpenSASE Fulfillment listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
