//! CLI definition and staged dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::console_adapter::ConsoleNotifier;
use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::csv_table_adapter::CsvTableAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::ScreenerConfig;
use crate::domain::error::ScreenerError;
use crate::domain::levels::{LEVEL_LOOKBACK_DAYS, LevelRecord, compute_levels};
use crate::domain::positions::evaluate_positions;
use crate::domain::rank::rank;
use crate::domain::refdate::latest_trading_date;
use crate::domain::report;
use crate::domain::snapshot::TickerSnapshot;
use crate::domain::universe::build_universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::notify_port::NotifyPort;
use crate::ports::table_port::TablePort;

#[derive(Parser, Debug)]
#[command(name = "pivotscreen", about = "Large-cap equity screener with pivot/ATR bands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full screen: universe, levels, tables, notification, alerts
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Reference date override (YYYY-MM-DD); defaults to the latest trading date
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the filtered universe for a date
    Universe {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Compute levels for a single ticker
    Levels {
        #[arg(short, long)]
        config: PathBuf,
        ticker: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Evaluate stored holdings against the persisted universe table
    Alerts {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            date,
            dry_run,
        } => run_screen(&config, date, dry_run),
        Command::Universe { config, date } => run_universe(&config, date),
        Command::Levels {
            config,
            ticker,
            date,
        } => run_levels(&config, &ticker, date),
        Command::Alerts { config, date } => run_alerts(&config, date),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_data_port(
    adapter: &FileConfigAdapter,
) -> Result<Box<dyn MarketDataPort>, ScreenerError> {
    let kind = adapter
        .get_string("data", "adapter")
        .unwrap_or_else(|| "csv".to_string());

    match kind.as_str() {
        "csv" => {
            let path = adapter.get_string("data", "path").ok_or_else(|| {
                ScreenerError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                }
            })?;
            Ok(Box::new(CsvDataAdapter::new(PathBuf::from(path))))
        }
        "sqlite" => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_adapter::SqliteDataAdapter;
                return Ok(Box::new(SqliteDataAdapter::from_config(adapter)?));
            }
            #[cfg(not(feature = "sqlite"))]
            {
                return Err(ScreenerError::ConfigInvalid {
                    section: "data".into(),
                    key: "adapter".into(),
                    reason: "built without the sqlite feature".into(),
                });
            }
        }
        other => Err(ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "adapter".into(),
            reason: format!("unknown adapter {other:?} (expected csv or sqlite)"),
        }),
    }
}

pub fn build_table_port(adapter: &FileConfigAdapter) -> Result<CsvTableAdapter, ScreenerError> {
    let dir = adapter
        .get_string("tables", "dir")
        .ok_or_else(|| ScreenerError::ConfigMissing {
            section: "tables".into(),
            key: "dir".into(),
        })?;
    Ok(CsvTableAdapter::new(PathBuf::from(dir)))
}

pub fn build_notifier(adapter: &FileConfigAdapter) -> Box<dyn NotifyPort> {
    #[cfg(feature = "telegram")]
    {
        use crate::adapters::telegram_adapter::TelegramNotifier;
        if let Some(notifier) = TelegramNotifier::from_config(adapter) {
            return Box::new(notifier);
        }
    }
    #[cfg(not(feature = "telegram"))]
    let _ = adapter;

    eprintln!("warning: [telegram] not configured, sending notifications to the console");
    Box::new(ConsoleNotifier)
}

fn resolve_reference_date(
    data: &dyn MarketDataPort,
    config: &ScreenerConfig,
    date_override: Option<NaiveDate>,
) -> NaiveDate {
    match date_override {
        Some(date) => date,
        None => latest_trading_date(
            data,
            chrono::Local::now().date_naive(),
            &config.benchmark_ticker,
        ),
    }
}

fn run_screen(config_path: &PathBuf, date_override: Option<NaiveDate>, dry_run: bool) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match ScreenerConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if dry_run {
        return run_dry_run(&adapter, &config);
    }

    let data = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let tables = match build_table_port(&adapter) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let notifier = build_notifier(&adapter);

    let result = execute_run(data.as_ref(), &tables, notifier.as_ref(), &config, date_override);
    finish(result, notifier.as_ref())
}

/// The full pipeline for one reference date. Public so integration tests can
/// drive it with mock ports.
pub fn execute_run(
    data: &dyn MarketDataPort,
    tables: &dyn TablePort,
    notifier: &dyn NotifyPort,
    config: &ScreenerConfig,
    date_override: Option<NaiveDate>,
) -> Result<(), ScreenerError> {
    // Stage 1: anchor the run to a trading date
    let reference_date = resolve_reference_date(data, config, date_override);
    eprintln!("Reference date {reference_date}");

    // Stage 2: candidate universe
    let universe = build_universe(data, config, reference_date)?;
    eprintln!("Screening {} tickers...", universe.snapshots.len());

    // Stage 3: per-ticker levels; failures skip the ticker, never the batch
    let records = collect_levels(data, config, &universe.snapshots, reference_date);
    if records.is_empty() {
        return Err(ScreenerError::NoRecords {
            date: reference_date,
        });
    }

    // Stage 4: rank and persist (clear-then-overwrite)
    let top = rank(&records, config.top_size);
    tables.write_universe(&records, reference_date)?;
    tables.write_top(&top, reference_date)?;

    // Stage 5: top-N notification
    let message = report::format_top_message(&config.market, &top, reference_date);
    notifier.send(&report::truncate_message(&message))?;

    // Stage 6: holdings sell alerts
    let positions = tables.read_positions()?;
    if !positions.is_empty() {
        let alerts = evaluate_positions(&positions, &records, reference_date, config.staleness);
        if alerts.is_empty() {
            eprintln!("No sell candidates among {} positions", positions.len());
        } else {
            let message = report::format_sell_alerts(&alerts);
            notifier.send(&report::truncate_message(&message))?;
        }
    }

    eprintln!(
        "Run complete: {} records written, top {} notified",
        records.len(),
        top.len()
    );
    Ok(())
}

fn collect_levels(
    data: &dyn MarketDataPort,
    config: &ScreenerConfig,
    snapshots: &[TickerSnapshot],
    reference_date: NaiveDate,
) -> Vec<LevelRecord> {
    let start_date = reference_date - Duration::days(LEVEL_LOOKBACK_DAYS);
    let mut records = Vec::with_capacity(snapshots.len());

    for snap in snapshots {
        let bars = match data.fetch_ohlcv(&snap.ticker, start_date, reference_date) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", snap.ticker, e);
                continue;
            }
        };

        let name = data
            .ticker_name(&snap.ticker)
            .unwrap_or_else(|_| snap.ticker.clone());

        match compute_levels(&snap.ticker, &name, &bars, reference_date, config) {
            Some(record) => records.push(record),
            None => eprintln!(
                "warning: skipping {} (insufficient history: {} bars)",
                snap.ticker,
                bars.len()
            ),
        }
    }
    records
}

/// Map a run result to an exit code, pushing the error to the operator
/// channel best-effort first.
fn finish(result: Result<(), ScreenerError>, notifier: &dyn NotifyPort) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let message = report::truncate_message(&format!("[screener error]\n{e}"));
            if let Err(send_err) = notifier.send(&message) {
                eprintln!("warning: error notification failed ({send_err})");
            }
            (&e).into()
        }
    }
}

fn run_dry_run(adapter: &FileConfigAdapter, config: &ScreenerConfig) -> ExitCode {
    if let Err(e) = build_data_port(adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = build_table_port(adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Config validated successfully");
    eprintln!("  market:            {} (benchmark {})", config.market, config.benchmark_ticker);
    eprintln!("  max_price:         {}", config.max_price);
    eprintln!("  top_n / top_size:  {} / {}", config.top_n, config.top_size);
    eprintln!("  min_trading_value: {}", config.min_trading_value);
    eprintln!("  atr_n / ema_n:     {} / {}", config.atr_n, config.ema_n);
    eprintln!("  price_bonus:       {}", config.price_bonus);
    eprintln!("  scoring_mode:      {:?}", config.scoring_mode);
    eprintln!("  staleness:         {:?}", config.staleness);
    ExitCode::SUCCESS
}

fn run_universe(config_path: &PathBuf, date_override: Option<NaiveDate>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match ScreenerConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let reference_date = resolve_reference_date(data.as_ref(), &config, date_override);
    match build_universe(data.as_ref(), &config, reference_date) {
        Ok(universe) => {
            println!("{:<10} {:>18} {:>10}", "ticker", "market_cap", "close");
            for snap in &universe.snapshots {
                println!(
                    "{:<10} {:>18} {:>10}",
                    snap.ticker,
                    report::fmt_thousands(snap.market_cap as i64),
                    report::fmt_thousands(snap.close as i64)
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_levels(config_path: &PathBuf, ticker: &str, date_override: Option<NaiveDate>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match ScreenerConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let reference_date = resolve_reference_date(data.as_ref(), &config, date_override);
    let start_date = reference_date - Duration::days(LEVEL_LOOKBACK_DAYS);

    let bars = match data.fetch_ohlcv(ticker, start_date, reference_date) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let name = data
        .ticker_name(ticker)
        .unwrap_or_else(|_| ticker.to_string());

    match compute_levels(ticker, &name, &bars, reference_date, &config) {
        Some(record) => {
            println!("{} {} @ {}", record.ticker, record.name, record.date);
            println!("  close:       {}", report::fmt_thousands(record.close));
            println!("  buy(pivot):  {}", record.buy_pivot);
            println!("  sell(pivot): {}", record.sell_pivot);
            println!("  buy(ATR):    {}", record.buy_atr);
            println!("  sell(ATR):   {}", record.sell_atr);
            println!("  stop:        {}", report::fmt_thousands(record.stop));
            println!("  atr: {:.2}  ema: {:.2}  score: {}", record.atr, record.ema, record.score);
            println!(
                "  in_atr_buy: {}  in_pivot_buy: {}",
                record.in_atr_buy, record.in_pivot_buy
            );
            ExitCode::SUCCESS
        }
        None => {
            let err = ScreenerError::NoRecords {
                date: reference_date,
            };
            eprintln!(
                "error: insufficient history for {} ({} bars, need {})",
                ticker,
                bars.len(),
                config.ema_n + 1
            );
            (&err).into()
        }
    }
}

fn run_alerts(config_path: &PathBuf, date_override: Option<NaiveDate>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match ScreenerConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data = match build_data_port(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let tables = match build_table_port(&adapter) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let notifier = build_notifier(&adapter);

    let reference_date = resolve_reference_date(data.as_ref(), &config, date_override);
    let result = execute_alerts(&tables, notifier.as_ref(), &config, reference_date);
    finish(result, notifier.as_ref())
}

/// Alerts against the persisted universe table, outside a full run.
pub fn execute_alerts(
    tables: &dyn TablePort,
    notifier: &dyn NotifyPort,
    config: &ScreenerConfig,
    reference_date: NaiveDate,
) -> Result<(), ScreenerError> {
    let positions = tables.read_positions()?;
    if positions.is_empty() {
        eprintln!("No positions to evaluate");
        return Ok(());
    }

    let records = tables.read_universe()?;
    let alerts = evaluate_positions(&positions, &records, reference_date, config.staleness);

    if alerts.is_empty() {
        eprintln!(
            "No sell candidates among {} positions for {}",
            positions.len(),
            reference_date
        );
        return Ok(());
    }

    let message = report::format_sell_alerts(&alerts);
    notifier.send(&report::truncate_message(&message))?;
    eprintln!("{} sell candidates notified", alerts.len());
    Ok(())
}
