//! Derivation of the `recent` and `popular` feeds from the full catalog.
//!
//! Only published records are eligible. `recent` orders by creation time,
//! newest first; records whose timestamp cannot be parsed sort last.
//! `popular` orders by a weighted engagement score:
//!
//! ```text
//! score = likes × LIKE_WEIGHT + downloads + shares
//! ```
//!
//! Ties fall back to creation time so both feeds are deterministic.

use std::cmp::Reverse;

use crate::domain::{Model, ProductRecord};

/// A like counts twice as much as a download or a share.
const LIKE_WEIGHT: u64 = 2;

#[must_use]
pub fn popularity_score(record: &ProductRecord) -> u64 {
    record
        .likes
        .saturating_mul(LIKE_WEIGHT)
        .saturating_add(record.downloads)
        .saturating_add(record.shares)
}

fn published(records: &[ProductRecord]) -> Vec<&ProductRecord> {
    records.iter().filter(|r| r.is_published()).collect()
}

/// Newest published models first, at most `limit`.
#[must_use]
pub fn recent(records: &[ProductRecord], limit: usize) -> Vec<Model> {
    let mut eligible = published(records);
    eligible.sort_by_key(|r| Reverse(r.created_timestamp().unwrap_or(i64::MIN)));
    eligible.into_iter().take(limit).map(Model::from).collect()
}

/// Highest scoring published models first, at most `limit`.
#[must_use]
pub fn popular(records: &[ProductRecord], limit: usize) -> Vec<Model> {
    let mut eligible = published(records);
    eligible.sort_by_key(|r| {
        (
            Reverse(popularity_score(r)),
            Reverse(r.created_timestamp().unwrap_or(i64::MIN)),
        )
    });
    eligible.into_iter().take(limit).map(Model::from).collect()
}
