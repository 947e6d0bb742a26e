// File: ./src/rank.rs
use crate::model::Occurrence;
use chrono::{DateTime, Utc};

/// Relevant occurrences in display order, capped at the requested limit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankingResult {
    pub occurrences: Vec<Occurrence>,
    /// Relevant occurrences before truncation.
    pub total: usize,
}

/// Drop what is over, order by start, keep the first `limit`.
///
/// An occurrence is still relevant while `end > now`, so events already in
/// progress stay visible. Equal starts keep their input order.
pub fn rank(occurrences: Vec<Occurrence>, now: DateTime<Utc>, limit: usize) -> RankingResult {
    let mut relevant: Vec<Occurrence> = occurrences
        .into_iter()
        .filter(|o| o.end() > now)
        .collect();
    relevant.sort_by_key(|o| o.start());

    let total = relevant.len();
    relevant.truncate(limit);
    RankingResult {
        occurrences: relevant,
        total,
    }
}
