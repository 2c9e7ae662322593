//! CSV tabular store adapter.
//!
//! Three named tables as files in one directory: `universe.csv` (full
//! snapshot, replaced per run), `top.csv` (ranked slice, replaced per run)
//! and `positions.csv` (externally maintained holdings, read-only here).

use crate::domain::band::PriceBand;
use crate::domain::error::ScreenerError;
use crate::domain::levels::LevelRecord;
use crate::domain::positions::Position;
use crate::domain::rank::RankedRow;
use crate::ports::table_port::TablePort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const UNIVERSE_HEADERS: [&str; 14] = [
    "date",
    "ticker",
    "name",
    "close",
    "buy_pivot",
    "sell_pivot",
    "buy_atr",
    "sell_atr",
    "stop",
    "atr",
    "ema",
    "score",
    "in_atr_buy",
    "in_pivot_buy",
];

pub const TOP_HEADERS: [&str; 10] = [
    "rank",
    "ticker",
    "name",
    "close",
    "buy_atr",
    "sell_atr",
    "buy_pivot",
    "sell_pivot",
    "stop",
    "score",
];

pub const POSITIONS_HEADERS: [&str; 5] = ["ticker", "name", "qty", "avg_cost", "note"];

#[derive(Debug)]
pub struct CsvTableAdapter {
    dir: PathBuf,
}

impl CsvTableAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn universe_path(&self) -> PathBuf {
        self.dir.join("universe.csv")
    }

    fn top_path(&self) -> PathBuf {
        self.dir.join("top.csv")
    }

    fn positions_path(&self) -> PathBuf {
        self.dir.join("positions.csv")
    }

    fn writer(&self, path: &PathBuf) -> Result<csv::Writer<std::fs::File>, ScreenerError> {
        csv::Writer::from_path(path).map_err(|e| ScreenerError::TableStore {
            reason: format!("failed to open {}: {}", path.display(), e),
        })
    }
}

fn store_err(path: &PathBuf, e: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::TableStore {
        reason: format!("{}: {}", path.display(), e),
    }
}

/// Rebuild a record from one universe row; `None` drops the malformed row.
fn parse_universe_row(record: &csv::StringRecord) -> Option<LevelRecord> {
    let date = NaiveDate::parse_from_str(record.get(0)?, "%Y-%m-%d").ok()?;
    Some(LevelRecord {
        date,
        ticker: record.get(1)?.to_string(),
        name: record.get(2)?.to_string(),
        close: record.get(3)?.parse().ok()?,
        buy_pivot: record.get(4)?.parse::<PriceBand>().ok()?,
        sell_pivot: record.get(5)?.parse::<PriceBand>().ok()?,
        buy_atr: record.get(6)?.parse::<PriceBand>().ok()?,
        sell_atr: record.get(7)?.parse::<PriceBand>().ok()?,
        stop: record.get(8)?.parse().ok()?,
        atr: record.get(9)?.parse().ok()?,
        ema: record.get(10)?.parse().ok()?,
        score: record.get(11)?.parse().ok()?,
        in_atr_buy: record.get(12)?.parse().ok()?,
        in_pivot_buy: record.get(13)?.parse().ok()?,
    })
}

impl TablePort for CsvTableAdapter {
    fn write_universe(
        &self,
        records: &[LevelRecord],
        _date: NaiveDate,
    ) -> Result<(), ScreenerError> {
        let path = self.universe_path();
        let mut wtr = self.writer(&path)?;
        wtr.write_record(UNIVERSE_HEADERS)
            .map_err(|e| store_err(&path, e))?;
        for r in records {
            wtr.write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.ticker.clone(),
                r.name.clone(),
                r.close.to_string(),
                r.buy_pivot.to_string(),
                r.sell_pivot.to_string(),
                r.buy_atr.to_string(),
                r.sell_atr.to_string(),
                r.stop.to_string(),
                r.atr.to_string(),
                r.ema.to_string(),
                r.score.to_string(),
                r.in_atr_buy.to_string(),
                r.in_pivot_buy.to_string(),
            ])
            .map_err(|e| store_err(&path, e))?;
        }
        wtr.flush().map_err(|e| store_err(&path, e))?;
        Ok(())
    }

    fn write_top(&self, rows: &[RankedRow], _date: NaiveDate) -> Result<(), ScreenerError> {
        let path = self.top_path();
        let mut wtr = self.writer(&path)?;
        wtr.write_record(TOP_HEADERS)
            .map_err(|e| store_err(&path, e))?;
        for row in rows {
            let r = &row.record;
            wtr.write_record([
                row.rank.to_string(),
                r.ticker.clone(),
                r.name.clone(),
                r.close.to_string(),
                r.buy_atr.to_string(),
                r.sell_atr.to_string(),
                r.buy_pivot.to_string(),
                r.sell_pivot.to_string(),
                r.stop.to_string(),
                r.score.to_string(),
            ])
            .map_err(|e| store_err(&path, e))?;
        }
        wtr.flush().map_err(|e| store_err(&path, e))?;
        Ok(())
    }

    fn read_universe(&self) -> Result<Vec<LevelRecord>, ScreenerError> {
        let path = self.universe_path();
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| store_err(&path, e))?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| store_err(&path, e))?;
            if let Some(record) = parse_universe_row(&row) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn read_positions(&self) -> Result<Vec<Position>, ScreenerError> {
        let path = self.positions_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| store_err(&path, e))?;

        let mut positions = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| store_err(&path, e))?;
            let Some(ticker) = row.get(0).map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            positions.push(Position {
                ticker: ticker.to_string(),
                name: row.get(1).unwrap_or("").trim().to_string(),
                quantity: row
                    .get(2)
                    .and_then(|q| q.trim().parse().ok())
                    .unwrap_or(0),
                average_cost: row.get(3).and_then(|c| c.trim().parse().ok()),
                note: row.get(4).unwrap_or("").trim().to_string(),
            });
        }
        Ok(positions)
    }
}
