use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod completion;
mod config;
mod prompts;

use api::{relay::CompletionRelay, AppState};
use completion::AzureChatClient;
use config::Settings;
use prompts::PromptTemplate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Configuration
    // -----------------------------
    let settings = Settings::from_env().context("failed to load settings")?;

    if settings.access_key.is_none() {
        warn!("FUNCTIONS_KEY is not set; /api/completions is open to anyone");
    }

    // -----------------------------
    // Shared state
    // -----------------------------
    let client = AzureChatClient::new(&settings);
    info!(
        url = %client.url(),
        "chat completion client ready"
    );

    let template = PromptTemplate::new(&settings.prompt);
    info!(turns = template.preamble().len(), "prompt template loaded");

    let relay = CompletionRelay::new(Arc::new(client), template);
    let state = AppState {
        relay: Arc::new(relay),
        access_key: settings.access_key.as_deref().map(Arc::from),
    };

    let app = api::app(state);

    let addr = settings.bind_addr.as_str();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("HTTP listening on http://{addr}");
    info!("Completions at POST http://{addr}/api/completions");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
