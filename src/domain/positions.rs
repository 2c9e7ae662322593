//! Held-position evaluation against computed sell bands.

use crate::domain::config::StalenessPolicy;
use crate::domain::levels::LevelRecord;
use chrono::NaiveDate;

/// One row of the externally maintained holdings table. Read-only input.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub name: String,
    pub quantity: i64,
    /// Missing or unparseable in the source table -> `None`, silently skipped.
    pub average_cost: Option<f64>,
    pub note: String,
}

/// A held position whose ATR sell-band upper bound exceeds its average cost.
#[derive(Debug, Clone, PartialEq)]
pub struct SellAlert {
    pub ticker: String,
    pub name: String,
    pub target: i64,
    pub average_cost: i64,
}

/// Join positions against level records and flag profit-taking candidates.
///
/// Records dated exactly `reference_date` are preferred. When none match,
/// `policy` decides: skip alerting entirely, or fall back to whatever records
/// exist. A position with no matching record or no average cost is excluded,
/// never an error.
pub fn evaluate_positions(
    positions: &[Position],
    records: &[LevelRecord],
    reference_date: NaiveDate,
    policy: StalenessPolicy,
) -> Vec<SellAlert> {
    let same_date: Vec<&LevelRecord> =
        records.iter().filter(|r| r.date == reference_date).collect();

    let candidates: Vec<&LevelRecord> = if !same_date.is_empty() {
        same_date
    } else {
        match policy {
            StalenessPolicy::SameDateOnly => return Vec::new(),
            StalenessPolicy::FallbackAny => records.iter().collect(),
        }
    };

    let mut alerts = Vec::new();
    for position in positions {
        let Some(average_cost) = position.average_cost else {
            continue;
        };
        let Some(record) = candidates.iter().find(|r| r.ticker == position.ticker) else {
            continue;
        };

        let target = record.sell_atr.hi;
        let average_cost = average_cost.trunc() as i64;
        if average_cost < target {
            let name = if position.name.is_empty() {
                record.name.clone()
            } else {
                position.name.clone()
            };
            alerts.push(SellAlert {
                ticker: position.ticker.clone(),
                name,
                target,
                average_cost,
            });
        }
    }
    alerts
}
