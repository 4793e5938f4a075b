use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderValue;
use reqwest::Method;
use tower_http::cors::CorsLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

use stockfolio_backend::alphavantage::QuoteClient;
use stockfolio_backend::{app, AppState, Config, DatabasePool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set the log level based on the first argument
    let args: Vec<String> = std::env::args().collect();
    let mut log_level = Level::INFO;
    if args.len() >= 2 {
        log_level = match args[1].as_str() {
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
    }

    // Initalize dotenv so we can read .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_max_level(log_level)
        .init();

    tracing::info!("Log level set to: {}", log_level);

    let config = Config::from_env()?;
    if config.quote_sandbox {
        tracing::warn!("quote sandbox mode enabled; serving canned quotes");
    }

    // Initialize CORS layer
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(vec![AUTHORIZATION, CONTENT_TYPE]);

    let pool = DatabasePool::new(&config.database_path)?;
    let quotes = QuoteClient::from_config(&config);
    let bind_addr = config.bind_addr.clone();

    let state = AppState {
        pool,
        config,
        quotes,
    };

    // Build application with routes, CORS, and tracing layers
    let app = app(state).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
    );

    // Run server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Listening on: {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
