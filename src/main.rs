//! CodeQA Service - Main Entry Point
//!
//! Serves entity extraction, prompt synthesis and QA generation over HTTP.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codeqa::api::{self, handlers::AppState};
use codeqa::output::{GenerationClient, MockGenerator, TrainingExampleGenerator};
use codeqa::pipeline::QaPipeline;
use codeqa::types::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "codeqa=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    info!("Starting CodeQA Service v{}", env!("CARGO_PKG_VERSION"));
    info!("Prompt budget: {} tokens", config.max_prompt_tokens);

    // Initialize the generation backend
    let generator: Arc<dyn TrainingExampleGenerator> = match &config.generation {
        Some(generation) => {
            info!(base_url = %generation.base_url, model = %generation.model, "Using HTTP generation backend");
            Arc::new(GenerationClient::new(generation.clone(), &config.source_repository)?)
        }
        None => {
            info!("No GENERATION_SERVICE_URL set, using mock generator");
            Arc::new(MockGenerator::new())
        }
    };

    let pipeline = QaPipeline::new(generator).with_max_prompt_tokens(config.max_prompt_tokens);
    let port = config.port;

    let state = Arc::new(AppState { pipeline, config });

    // Build HTTP routes
    let app = api::router(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
