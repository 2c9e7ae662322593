//! Composite-score ranking of level records.

use crate::domain::levels::LevelRecord;

/// A level record with its 1-based position in the top-N slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub rank: u32,
    pub record: LevelRecord,
}

/// Sort by (score descending, close descending), take the first `n`, assign
/// ranks 1..=len. The sort is stable, so remaining ties keep input order.
pub fn rank(records: &[LevelRecord], n: usize) -> Vec<RankedRow> {
    let mut sorted: Vec<&LevelRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.close.cmp(&a.close))
    });

    sorted
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, record)| RankedRow {
            rank: (i + 1) as u32,
            record: record.clone(),
        })
        .collect()
}
