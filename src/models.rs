use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A registered user. The password hash never leaves the database layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// One user-owned stock holding.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Stock {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub ticker: String,
    pub quantity: i64,
    pub buy_price: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Create-holding request body. Fields default so that missing ones are
/// reported as a 400 validation error rather than a body-rejection.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewStock {
    pub name: String,
    pub ticker: String,
    pub quantity: Option<i64>,
    pub buy_price: Option<f64>,
}

/// Validated create-holding attributes.
#[derive(Debug)]
pub struct StockAttrs {
    pub name: String,
    pub ticker: String,
    pub quantity: i64,
    pub buy_price: f64,
}

impl NewStock {
    pub fn validate(self) -> Result<StockAttrs, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        let ticker = self.ticker.trim().to_string();
        if ticker.is_empty() {
            return Err(AppError::Validation("ticker is required".into()));
        }
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 0 {
            return Err(AppError::Validation(
                "quantity must be a non-negative integer".into(),
            ));
        }
        let buy_price = self
            .buy_price
            .ok_or_else(|| AppError::Validation("buy_price is required".into()))?;
        if !buy_price.is_finite() || buy_price < 0.0 {
            return Err(AppError::Validation(
                "buy_price must be a non-negative number".into(),
            ));
        }
        Ok(StockAttrs {
            name,
            ticker,
            quantity,
            buy_price: round2(buy_price),
        })
    }
}

/// Partial-update request body; absent fields are left unchanged.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StockPatch {
    pub name: Option<String>,
    pub ticker: Option<String>,
    pub quantity: Option<i64>,
    pub buy_price: Option<f64>,
}

impl StockPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("name must not be blank".into()));
            }
        }
        if let Some(ticker) = &self.ticker {
            if ticker.trim().is_empty() {
                return Err(AppError::Validation("ticker must not be blank".into()));
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(AppError::Validation(
                    "quantity must be a non-negative integer".into(),
                ));
            }
        }
        if let Some(buy_price) = self.buy_price {
            if !buy_price.is_finite() || buy_price < 0.0 {
                return Err(AppError::Validation(
                    "buy_price must be a non-negative number".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Access/refresh pair issued by the token endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// One line of the portfolio valuation breakdown.
#[derive(Serialize, Deserialize, Debug)]
pub struct HoldingLine {
    pub name: String,
    pub ticker: String,
    pub quantity: i64,
    pub buy_price: f64,
    pub current_price: f64,
    pub value: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PortfolioValue {
    pub total_value: f64,
    pub stocks: Vec<HoldingLine>,
}

/// Live (or degraded) per-holding metrics. Change fields keep the
/// provider's string formatting and are not parsed further.
#[derive(Serialize, Deserialize, Debug)]
pub struct StockMetrics {
    pub name: String,
    pub ticker: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub change: String,
    pub change_percent: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MetricsResponse {
    pub stocks: Vec<StockMetrics>,
}

/// Quote sample returned by the random-ticker endpoint.
#[derive(Serialize, Deserialize, Debug)]
pub struct QuoteSample {
    pub ticker: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub change: String,
    pub change_percent: String,
}

/// Round a monetary value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
