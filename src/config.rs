use std::env;

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is loaded first if present).
#[derive(Clone)]
pub struct Config {
    pub database_path: String,
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub alpha_vantage_api_key: String,
    pub quote_base_url: String,
    pub quote_sandbox: bool,
    pub bind_addr: String,
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let quote_sandbox = env::var("QUOTE_SANDBOX")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        // The key is mandatory for live quotes; sandbox mode never calls out.
        let alpha_vantage_api_key = match env::var("ALPHA_VANTAGE_API_KEY") {
            Ok(key) => key,
            Err(_) if quote_sandbox => String::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "db.sqlite".into()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".into()),
            access_ttl_minutes: env::var("ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            refresh_ttl_days: env::var("REFRESH_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            alpha_vantage_api_key,
            quote_base_url: env::var("QUOTE_BASE_URL")
                .unwrap_or_else(|_| "https://www.alphavantage.co/query".into()),
            quote_sandbox,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        })
    }

    /// Configuration for tests: in-memory-friendly defaults, sandbox quotes.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            jwt_secret: "test-secret".into(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
            alpha_vantage_api_key: String::new(),
            quote_base_url: "https://www.alphavantage.co/query".into(),
            quote_sandbox: true,
            bind_addr: "127.0.0.1:0".into(),
            frontend_url: "http://localhost:5173".into(),
        }
    }
}
