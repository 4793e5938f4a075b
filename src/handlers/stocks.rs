use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::seq::IndexedRandom;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{NewStock, QuoteSample, Stock, StockPatch};
use crate::state::AppState;

/// Fixed pool sampled by the random-quote endpoint.
const SAMPLE_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NFLX", "META", "NVDA", "BRK.B", "V",
];

pub async fn list_stocks(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Stock>>, AppError> {
    let stocks = state.pool.list_stocks(&caller.id).await?;
    Ok(Json(stocks))
}

pub async fn create_stock(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<NewStock>,
) -> Result<(StatusCode, Json<Stock>), AppError> {
    let attrs = req.validate()?;
    let stock = state.pool.insert_stock(&caller.id, attrs).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

pub async fn get_stock(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Stock>, AppError> {
    let stock = state.pool.get_stock(&caller.id, &id).await?;
    Ok(Json(stock))
}

pub async fn update_stock(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<StockPatch>,
) -> Result<Json<Stock>, AppError> {
    patch.validate()?;
    let stock = state.pool.update_stock(&caller.id, &id, &patch).await?;
    Ok(Json(stock))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.pool.delete_stock(&caller.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Quote one randomly sampled ticker from the fixed pool. A failed quote is
/// skipped rather than reported, so the response is always 200.
pub async fn random_stocks(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Vec<QuoteSample>>, AppError> {
    let ticker = *SAMPLE_TICKERS
        .choose(&mut rand::rng())
        .expect("ticker pool is non-empty");

    let mut samples = Vec::new();
    match state.quotes.fetch_quote(ticker).await {
        Some(quote) => samples.push(QuoteSample {
            ticker: quote.ticker,
            current_price: quote.price,
            previous_close: quote.previous_close,
            change: quote.change,
            change_percent: quote.change_percent,
        }),
        None => tracing::warn!("skipping {ticker}: no quote available"),
    }

    Ok(Json(samples))
}
