use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Stock, StockAttrs, StockPatch, User};

#[derive(Clone)]
pub struct DatabasePool(pub Arc<Mutex<Connection>>);

impl DatabasePool {
    /// Open (or create) the database file and initialize the schema.
    pub fn new(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self(Arc::new(Mutex::new(conn))))
    }

    /// In-memory database, used by tests and throwaway sandbox runs.
    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self(Arc::new(Mutex::new(conn))))
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let conn = self.0.lock().await;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.username, user.password_hash, user.created_at],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::UsernameTaken
            }
            other => AppError::Database(other),
        })?;
        Ok(user)
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let conn = self.0.lock().await;
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub async fn insert_stock(&self, owner: &str, attrs: StockAttrs) -> Result<Stock, AppError> {
        let conn = self.0.lock().await;
        let now = chrono::Utc::now().to_rfc3339();
        let stock = Stock {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            name: attrs.name,
            ticker: attrs.ticker,
            quantity: attrs.quantity,
            buy_price: attrs.buy_price,
            created_at: now.clone(),
            updated_at: now,
        };
        conn.execute(
            "INSERT INTO stocks (id, user_id, name, ticker, quantity, buy_price, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stock.id,
                stock.user_id,
                stock.name,
                stock.ticker,
                stock.quantity,
                stock.buy_price,
                stock.created_at,
                stock.updated_at
            ],
        )?;
        Ok(stock)
    }

    /// All holdings belonging to `owner`, in insertion order.
    pub async fn list_stocks(&self, owner: &str) -> Result<Vec<Stock>, AppError> {
        let conn = self.0.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, ticker, quantity, buy_price, created_at, updated_at
             FROM stocks WHERE user_id = ?1 ORDER BY rowid",
        )?;
        let stocks = stmt
            .query_map([owner], row_to_stock)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    /// Owner scoping is part of the query: a holding that exists but belongs
    /// to someone else is indistinguishable from a missing one.
    pub async fn get_stock(&self, owner: &str, id: &str) -> Result<Stock, AppError> {
        let conn = self.0.lock().await;
        conn.query_row(
            "SELECT id, user_id, name, ticker, quantity, buy_price, created_at, updated_at
             FROM stocks WHERE id = ?1 AND user_id = ?2",
            [id, owner],
            row_to_stock,
        )
        .optional()?
        .ok_or(AppError::StockNotFound)
    }

    pub async fn update_stock(
        &self,
        owner: &str,
        id: &str,
        patch: &StockPatch,
    ) -> Result<Stock, AppError> {
        let conn = self.0.lock().await;
        let mut stock = conn
            .query_row(
                "SELECT id, user_id, name, ticker, quantity, buy_price, created_at, updated_at
                 FROM stocks WHERE id = ?1 AND user_id = ?2",
                [id, owner],
                row_to_stock,
            )
            .optional()?
            .ok_or(AppError::StockNotFound)?;

        if let Some(name) = &patch.name {
            stock.name = name.trim().to_string();
        }
        if let Some(ticker) = &patch.ticker {
            stock.ticker = ticker.trim().to_string();
        }
        if let Some(quantity) = patch.quantity {
            stock.quantity = quantity;
        }
        if let Some(buy_price) = patch.buy_price {
            stock.buy_price = crate::models::round2(buy_price);
        }
        stock.updated_at = chrono::Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE stocks SET name = ?1, ticker = ?2, quantity = ?3, buy_price = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                stock.name,
                stock.ticker,
                stock.quantity,
                stock.buy_price,
                stock.updated_at,
                stock.id,
                stock.user_id
            ],
        )?;
        Ok(stock)
    }

    pub async fn delete_stock(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let conn = self.0.lock().await;
        let deleted = conn.execute(
            "DELETE FROM stocks WHERE id = ?1 AND user_id = ?2",
            [id, owner],
        )?;
        if deleted == 0 {
            return Err(AppError::StockNotFound);
        }
        Ok(())
    }

    /// Blacklist a refresh token by its `jti`. Returns false when the token
    /// was already revoked.
    pub async fn revoke_token(&self, jti: &str) -> Result<bool, AppError> {
        let conn = self.0.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO revoked_tokens (jti, revoked_at) VALUES (?1, ?2)",
            params![jti, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let conn = self.0.lock().await;
        let found = conn
            .query_row("SELECT 1 FROM revoked_tokens WHERE jti = ?1", [jti], |_| {
                Ok(())
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn row_to_stock(row: &Row<'_>) -> rusqlite::Result<Stock> {
    Ok(Stock {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        ticker: row.get(3)?,
        quantity: row.get(4)?,
        buy_price: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS stocks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            ticker TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            buy_price REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS revoked_tokens (
            jti TEXT PRIMARY KEY,
            revoked_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}
