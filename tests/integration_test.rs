//! Integration tests for the screening pipeline.
//!
//! Covers:
//! - Full run with mock market data: tables written, notifications sent
//! - Per-ticker failures skip without aborting the batch
//! - Empty universe and empty record set abort with the right error class
//! - Sell-alert evaluation through the persisted universe table
//! - Notification failure surfaces as a run-level error

mod common;

use common::*;
use pivotscreen::adapters::csv_table_adapter::CsvTableAdapter;
use pivotscreen::cli::{execute_alerts, execute_run};
use pivotscreen::domain::config::{ScreenerConfig, StalenessPolicy};
use pivotscreen::domain::error::ScreenerError;
use pivotscreen::ports::table_port::TablePort;
use std::fs;
use tempfile::TempDir;

fn test_config() -> ScreenerConfig {
    ScreenerConfig {
        top_n: 5,
        top_size: 3,
        ..ScreenerConfig::default()
    }
}

fn ref_date() -> chrono::NaiveDate {
    date(2024, 1, 15)
}

/// Two liquid tickers with flat 60-day histories.
fn seeded_market() -> MockMarketData {
    MockMarketData::new()
        .with_snapshot("005930", 4.0e14, 70_000.0)
        .with_snapshot("000660", 9.0e13, 55_000.0)
        .with_bars(
            "005930",
            flat_bars("005930", ref_date(), 60, 70_000.0, 2_000.0, 6.0e9),
        )
        .with_bars(
            "000660",
            flat_bars("000660", ref_date(), 60, 55_000.0, 1_500.0, 6.0e9),
        )
        .with_name("005930", "Samsung Electronics")
        .with_name("000660", "SK hynix")
}

mod full_run {
    use super::*;

    #[test]
    fn writes_tables_and_notifies() {
        let dir = TempDir::new().unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        let data = seeded_market();

        execute_run(&data, &tables, &notifier, &test_config(), Some(ref_date())).unwrap();

        let records = tables.read_universe().unwrap();
        assert_eq!(records.len(), 2);
        // flat series: EMA = close, ATR = range
        let samsung = records.iter().find(|r| r.ticker == "005930").unwrap();
        assert_eq!(samsung.name, "Samsung Electronics");
        assert_eq!(samsung.close, 70_000);
        assert_eq!(samsung.sell_atr.hi, 72_000);
        assert_eq!(samsung.sell_atr.lo, 71_000);

        // equal scores (price bonus only), higher close ranks first
        let top_csv = fs::read_to_string(dir.path().join("top.csv")).unwrap();
        let rows: Vec<&str> = top_csv.lines().collect();
        assert!(rows[1].starts_with("1,005930,"));
        assert!(rows[2].starts_with("2,000660,"));

        let messages = notifier.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("top 2 buy candidates | 2024-01-15"));
        assert!(messages[0].contains("01. 005930 Samsung Electronics close 70,000"));
    }

    #[test]
    fn fetch_failure_skips_the_ticker_only() {
        let dir = TempDir::new().unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        let data = MockMarketData::new()
            .with_snapshot("GOOD", 2.0e14, 50_000.0)
            .with_snapshot("BAD", 1.0e14, 40_000.0)
            .with_bars(
                "GOOD",
                flat_bars("GOOD", ref_date(), 60, 50_000.0, 1_000.0, 6.0e9),
            )
            .with_error("BAD", "feed offline");

        execute_run(&data, &tables, &notifier, &test_config(), Some(ref_date())).unwrap();

        let records = tables.read_universe().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "GOOD");
    }

    #[test]
    fn empty_universe_aborts_with_exit_class_5() {
        let dir = TempDir::new().unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        // only ticker is above the price cap
        let data = MockMarketData::new()
            .with_snapshot("PRICEY", 4.0e14, 500_000.0)
            .with_bars(
                "PRICEY",
                flat_bars("PRICEY", ref_date(), 60, 500_000.0, 5_000.0, 6.0e9),
            );

        let err = execute_run(&data, &tables, &notifier, &test_config(), Some(ref_date()))
            .unwrap_err();
        assert!(matches!(err, ScreenerError::EmptyUniverse { .. }));
        assert_eq!(err.exit_code(), 5);
        assert!(!dir.path().join("universe.csv").exists());
    }

    #[test]
    fn notification_failure_is_a_run_error() {
        let dir = TempDir::new().unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let data = seeded_market();

        let err = execute_run(
            &data,
            &tables,
            &FailingNotifier,
            &test_config(),
            Some(ref_date()),
        )
        .unwrap_err();
        assert!(matches!(err, ScreenerError::Notify { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn held_position_below_target_triggers_second_message() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("positions.csv"),
            "ticker,name,qty,avg_cost,note\n005930,Samsung Electronics,10,60000,\n",
        )
        .unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        let data = seeded_market();

        execute_run(&data, &tables, &notifier, &test_config(), Some(ref_date())).unwrap();

        let messages = notifier.messages.borrow();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].starts_with("[holdings sell signals]"));
        // sell target is the ATR band upper bound, 72,000
        assert!(messages[1].contains("target 72,000"));
        assert!(messages[1].contains("avg cost 60,000"));
    }

    #[test]
    fn position_at_profit_already_is_quiet() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("positions.csv"),
            "ticker,name,qty,avg_cost,note\n005930,Samsung Electronics,10,80000,\n",
        )
        .unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        let data = seeded_market();

        execute_run(&data, &tables, &notifier, &test_config(), Some(ref_date())).unwrap();

        // top message only; 80,000 >= 72,000 target
        assert_eq!(notifier.messages.borrow().len(), 1);
    }
}

mod stored_alerts {
    use super::*;

    fn run_and_persist(dir: &TempDir) -> CsvTableAdapter {
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();
        execute_run(
            &seeded_market(),
            &tables,
            &notifier,
            &test_config(),
            Some(ref_date()),
        )
        .unwrap();
        tables
    }

    #[test]
    fn alerts_read_the_persisted_universe() {
        let dir = TempDir::new().unwrap();
        let tables = run_and_persist(&dir);
        fs::write(
            dir.path().join("positions.csv"),
            "ticker,name,qty,avg_cost,note\n000660,SK hynix,5,50000,\n",
        )
        .unwrap();

        let notifier = RecordingNotifier::new();
        execute_alerts(&tables, &notifier, &test_config(), ref_date()).unwrap();

        let messages = notifier.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("000660 SK hynix"));
    }

    #[test]
    fn stale_table_is_quiet_under_same_date_only() {
        let dir = TempDir::new().unwrap();
        let tables = run_and_persist(&dir);
        fs::write(
            dir.path().join("positions.csv"),
            "ticker,name,qty,avg_cost,note\n000660,SK hynix,5,50000,\n",
        )
        .unwrap();

        // evaluate three days later with the default same-date-only policy
        let notifier = RecordingNotifier::new();
        execute_alerts(&tables, &notifier, &test_config(), date(2024, 1, 18)).unwrap();
        assert!(notifier.messages.borrow().is_empty());
    }

    #[test]
    fn stale_table_still_alerts_under_fallback_any() {
        let dir = TempDir::new().unwrap();
        let tables = run_and_persist(&dir);
        fs::write(
            dir.path().join("positions.csv"),
            "ticker,name,qty,avg_cost,note\n000660,SK hynix,5,50000,\n",
        )
        .unwrap();

        let config = ScreenerConfig {
            staleness: StalenessPolicy::FallbackAny,
            ..test_config()
        };
        let notifier = RecordingNotifier::new();
        execute_alerts(&tables, &notifier, &config, date(2024, 1, 18)).unwrap();
        assert_eq!(notifier.messages.borrow().len(), 1);
    }

    #[test]
    fn no_positions_is_a_clean_noop() {
        let dir = TempDir::new().unwrap();
        let tables = run_and_persist(&dir);

        let notifier = RecordingNotifier::new();
        execute_alerts(&tables, &notifier, &test_config(), ref_date()).unwrap();
        assert!(notifier.messages.borrow().is_empty());
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_pipeline {
    use super::*;
    use pivotscreen::adapters::sqlite_adapter::SqliteDataAdapter;
    use pivotscreen::domain::snapshot::TickerSnapshot;

    #[test]
    fn full_run_against_seeded_sqlite() {
        let adapter = SqliteDataAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
            .insert_bars(&flat_bars("005930", ref_date(), 60, 70_000.0, 2_000.0, 6.0e9))
            .unwrap();
        adapter
            .insert_snapshots(
                ref_date(),
                &[TickerSnapshot {
                    ticker: "005930".into(),
                    market_cap: 4.0e14,
                    close: 70_000.0,
                }],
            )
            .unwrap();
        adapter.insert_name("005930", "Samsung Electronics").unwrap();

        let dir = TempDir::new().unwrap();
        let tables = CsvTableAdapter::new(dir.path().to_path_buf());
        let notifier = RecordingNotifier::new();

        execute_run(&adapter, &tables, &notifier, &test_config(), Some(ref_date())).unwrap();

        let records = tables.read_universe().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Samsung Electronics");
    }
}
