//! Tabular store port trait.

use crate::domain::error::ScreenerError;
use crate::domain::levels::LevelRecord;
use crate::domain::positions::Position;
use crate::domain::rank::RankedRow;
use chrono::NaiveDate;

/// Named tables with a declared header row. The two output tables are
/// replaced in full on every run, never appended. Band columns cross this
/// boundary as `"{lo}~{hi}"` strings; everything inside the domain stays
/// structured.
pub trait TablePort {
    /// Replace the full-snapshot table with all records for `date`.
    fn write_universe(
        &self,
        records: &[LevelRecord],
        date: NaiveDate,
    ) -> Result<(), ScreenerError>;

    /// Replace the top-N table with the ranked slice for `date`.
    fn write_top(&self, rows: &[RankedRow], date: NaiveDate) -> Result<(), ScreenerError>;

    /// Read back the persisted full-snapshot table (for the alerts path).
    fn read_universe(&self) -> Result<Vec<LevelRecord>, ScreenerError>;

    /// Read the externally maintained holdings table.
    fn read_positions(&self) -> Result<Vec<Position>, ScreenerError>;
}
