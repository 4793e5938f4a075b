//! Portfolio aggregation: resolves a current price per holding and sums
//! line values. A failed quote degrades that holding to its stored buy
//! price; it never fails the whole computation.

use crate::alphavantage::QuoteClient;
use crate::models::{round2, HoldingLine, MetricsResponse, PortfolioValue, Stock, StockMetrics};

pub async fn compute_value(quotes: &QuoteClient, stocks: &[Stock]) -> PortfolioValue {
    let mut total_value = 0.0;
    let mut lines = Vec::with_capacity(stocks.len());

    for stock in stocks {
        let current_price = match quotes.fetch_quote(&stock.ticker).await {
            Some(quote) => quote.price,
            None => stock.buy_price,
        };
        let value = round2(current_price * stock.quantity as f64);
        total_value += value;

        lines.push(HoldingLine {
            name: stock.name.clone(),
            ticker: stock.ticker.clone(),
            quantity: stock.quantity,
            buy_price: stock.buy_price,
            current_price,
            value,
        });
    }

    PortfolioValue {
        total_value: round2(total_value),
        stocks: lines,
    }
}

pub async fn compute_metrics(quotes: &QuoteClient, stocks: &[Stock]) -> MetricsResponse {
    let mut lines = Vec::with_capacity(stocks.len());

    for stock in stocks {
        let metrics = match quotes.fetch_quote(&stock.ticker).await {
            Some(quote) => StockMetrics {
                name: stock.name.clone(),
                ticker: stock.ticker.clone(),
                current_price: quote.price,
                previous_close: quote.previous_close,
                change: quote.change,
                change_percent: quote.change_percent,
            },
            // Degraded but valid: the stored buy price stands in for both
            // prices and the day change reads as zero.
            None => StockMetrics {
                name: stock.name.clone(),
                ticker: stock.ticker.clone(),
                current_price: stock.buy_price,
                previous_close: stock.buy_price,
                change: "0.00".to_string(),
                change_percent: "0.00%".to_string(),
            },
        };
        lines.push(metrics);
    }

    MetricsResponse { stocks: lines }
}
