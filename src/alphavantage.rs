use serde::Deserialize;

use crate::config::Config;

/// `GLOBAL_QUOTE` payload from Alpha Vantage. All values arrive as strings.
#[derive(Deserialize, Clone, Debug)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "05. price")]
    pub price: String,
    #[serde(rename = "08. previous close")]
    pub previous_close: String,
    #[serde(rename = "09. change")]
    pub change: String,
    #[serde(rename = "10. change percent")]
    pub change_percent: String,
}

#[derive(Deserialize, Debug)]
struct QuoteEnvelope {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

/// A normalized point-in-time quote. Price fields are parsed; change fields
/// keep the provider's formatting (e.g. "3.4001%").
#[derive(Debug, Clone)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: String,
    pub change_percent: String,
}

/// Client for the external quote provider.
///
/// `fetch_quote` never fails: any network, rate-limit, or parse problem is
/// logged and reported as `None`, so callers can substitute a fallback price
/// without exception-style control flow.
#[derive(Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sandbox: bool,
}

impl QuoteClient {
    pub fn new(base_url: String, api_key: String, sandbox: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            sandbox,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.quote_base_url.clone(),
            config.alpha_vantage_api_key.clone(),
            config.quote_sandbox,
        )
    }

    pub async fn fetch_quote(&self, ticker: &str) -> Option<Quote> {
        if self.sandbox {
            return Some(sandbox_quote(ticker));
        }

        let response = match self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", ticker),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("quote request for {ticker} failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("quote request for {ticker} returned HTTP {}", response.status());
            return None;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("reading quote response for {ticker} failed: {e}");
                return None;
            }
        };
        tracing::debug!("raw quote response for {ticker}: {body}");

        let quote = parse_quote(&body);
        if quote.is_none() {
            tracing::warn!("no usable quote for {ticker}");
        }
        quote
    }
}

/// Parse a raw `GLOBAL_QUOTE` response body. Rate-limit notes and empty
/// `"Global Quote"` objects come back as `None`.
fn parse_quote(body: &str) -> Option<Quote> {
    let envelope: QuoteEnvelope = serde_json::from_str(body).ok()?;
    let raw = envelope.global_quote?;
    let price: f64 = raw.price.trim().parse().ok()?;
    let previous_close: f64 = raw.previous_close.trim().parse().ok()?;
    Some(Quote {
        ticker: raw.symbol,
        price,
        previous_close,
        change: raw.change,
        change_percent: raw.change_percent,
    })
}

/// Canned quote served in sandbox mode, shaped like a real provider response.
fn sandbox_quote(ticker: &str) -> Quote {
    Quote {
        ticker: ticker.to_string(),
        price: 136.24,
        previous_close: 131.76,
        change: "4.4800".to_string(),
        change_percent: "3.4001%".to_string(),
    }
}
