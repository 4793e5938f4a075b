use crate::alphavantage::QuoteClient;
use crate::config::Config;
use crate::db::DatabasePool;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DatabasePool,
    pub config: Config,
    pub quotes: QuoteClient,
}
