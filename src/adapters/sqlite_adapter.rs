//! SQLite market-data adapter.
//!
//! Serves a locally maintained mirror of daily bars, market-cap snapshots
//! and display names. An external ingest job owns the data; this adapter
//! only reads, plus seeding helpers for tests and ingest tooling.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::snapshot::TickerSnapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

#[derive(Debug)]
pub struct SqliteDataAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDataAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, ScreenerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, ScreenerError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ohlcv (
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                value REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (ticker, date)
            );
            CREATE INDEX IF NOT EXISTS idx_ohlcv_ticker ON ohlcv(ticker);
            CREATE TABLE IF NOT EXISTS market_cap (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                market_cap REAL NOT NULL,
                close REAL NOT NULL,
                PRIMARY KEY (date, ticker)
            );
            CREATE TABLE IF NOT EXISTS ticker_names (
                ticker TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<(), ScreenerError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO ohlcv (ticker, date, open, high, low, close, volume, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    bar.ticker,
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    bar.value
                ],
            )
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    pub fn insert_snapshots(
        &self,
        date: NaiveDate,
        snapshots: &[TickerSnapshot],
    ) -> Result<(), ScreenerError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        for snap in snapshots {
            tx.execute(
                "INSERT OR REPLACE INTO market_cap (date, ticker, market_cap, close)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    date.format("%Y-%m-%d").to_string(),
                    snap.ticker,
                    snap.market_cap,
                    snap.close
                ],
            )
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    pub fn insert_name(&self, ticker: &str, name: &str) -> Result<(), ScreenerError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO ticker_names (ticker, name) VALUES (?1, ?2)",
            params![ticker, name],
        )
        .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

impl MarketDataPort for SqliteDataAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let conn = self.conn()?;
        let start_str = start_date.format("%Y-%m-%d").to_string();
        let end_str = end_date.format("%Y-%m-%d").to_string();

        let mut stmt = conn
            .prepare(
                "SELECT ticker, date, open, high, low, close, volume, value
                 FROM ohlcv
                 WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![ticker, start_str, end_str], |row| {
                let date_str: String = row.get(1)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(OhlcvBar {
                    ticker: row.get(0)?,
                    date,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                    value: row.get(7)?,
                })
            })
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?);
        }
        Ok(bars)
    }

    fn market_cap_ranking(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<TickerSnapshot>, ScreenerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT ticker, market_cap, close
                 FROM market_cap
                 WHERE date = ?1
                 ORDER BY market_cap DESC",
            )
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
                Ok(TickerSnapshot {
                    ticker: row.get(0)?,
                    market_cap: row.get(1)?,
                    close: row.get(2)?,
                })
            })
            .map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row.map_err(|e: rusqlite::Error| ScreenerError::DataSource {
                reason: e.to_string(),
            })?);
        }
        Ok(snapshots)
    }

    fn ticker_name(&self, ticker: &str) -> Result<String, ScreenerError> {
        let conn = self.conn()?;
        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM ticker_names WHERE ticker = ?1",
                params![ticker],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(ScreenerError::DataSource {
                    reason: other.to_string(),
                }),
            })?;
        Ok(name.unwrap_or_else(|| ticker.to_string()))
    }
}
