mod error;
mod markdown;
mod routes;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use kamus_core::chat::ChatState;
use kamus_core::completion::CompletionClient;
use kamus_core::config::KamusConfig;
use kamus_core::store::SessionStore;
use tokio::sync::Mutex;

/// Shared by every handler. The chat state is locked for the whole of each
/// request, completion call included, so user actions run one at a time.
pub struct AppState {
    pub chat: Mutex<ChatState>,
    pub completion: CompletionClient,
    pub config: KamusConfig,
}

#[derive(Parser)]
#[command(
    name = "kamus-web",
    about = "Kamus: chat dictionary for Indonesian, Cirebonese and Sundanese",
    version
)]
struct Args {
    /// Address to bind (overrides web.host)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides web.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Session file (overrides store.path)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Directory holding a .kamus/ config folder (defaults to the working directory)
    #[arg(long)]
    project_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kamus_web=info,kamus_core=info".into()),
        )
        .init();

    let args = Args::parse();

    let project_dir = args.project_dir.unwrap_or_else(|| PathBuf::from("."));
    let mut config = KamusConfig::load(Some(&project_dir)).unwrap_or_else(|e| {
        tracing::warn!("failed to load config, using defaults: {e}");
        KamusConfig::default_config()
    });
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(store) = args.store {
        config.store.path = Some(store.to_string_lossy().into_owned());
    }

    let store = SessionStore::from_config(&config.store);
    let mut chat = ChatState::init(store, config.ui.direction())?;
    if let Some(key) = config.completion.env_api_key() {
        tracing::info!("API key pre-filled from environment");
        chat.set_api_key(&key);
    }

    let completion = CompletionClient::from_config(&config.completion);
    tracing::info!("completion model: {}", config.completion.model);

    let state = Arc::new(AppState {
        chat: Mutex::new(chat),
        completion,
        config: config.clone(),
    });

    let app = routes::router()
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.web.host, config.web.port);
    tracing::info!("kamus-web listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
