use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{MetricsResponse, PortfolioValue};
use crate::portfolio;
use crate::state::AppState;

/// Total portfolio value with a per-holding breakdown. Quote failures fall
/// back to the stored buy price, so this always returns 200.
pub async fn portfolio_value(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<PortfolioValue>, AppError> {
    let stocks = state.pool.list_stocks(&caller.id).await?;
    Ok(Json(portfolio::compute_value(&state.quotes, &stocks).await))
}

/// Per-holding live metrics (price, previous close, day change); a holding
/// whose quote fails is reported with zero change, never as an error.
pub async fn portfolio_metrics(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<MetricsResponse>, AppError> {
    let stocks = state.pool.list_stocks(&caller.id).await?;
    Ok(Json(
        portfolio::compute_metrics(&state.quotes, &stocks).await,
    ))
}
