//! Reduction of per-repository details into aggregate metrics.
//!
//! Everything here is pure: the clock is passed in so the activity score
//! is reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::detail::RepoDetail;
use crate::model::{AggregateMetrics, LanguageShare};

/// Days after which a repository stops contributing to the activity score.
pub const ACTIVITY_WINDOW_DAYS: i64 = 100;

/// Reduce fetched repository details into totals.
///
/// `activity_score` is computed only when `include_activity` is set.
pub fn aggregate(
    details: &[RepoDetail],
    now: DateTime<Utc>,
    include_activity: bool,
) -> AggregateMetrics {
    let mut language_bytes: BTreeMap<String, u64> = BTreeMap::new();
    for detail in details {
        for (language, bytes) in &detail.language_bytes {
            *language_bytes.entry(language.clone()).or_default() += bytes;
        }
    }

    let total = total_bytes(&language_bytes);
    let language_percentages = language_bytes
        .iter()
        .map(|(language, bytes)| (language.clone(), percentage(*bytes, total)))
        .collect();

    AggregateMetrics {
        total_languages: language_bytes.len() as u64,
        total_repositories: details.len() as u64,
        total_commits: details.iter().map(|d| d.commits).sum(),
        total_stars: details.iter().map(|d| d.repo.stargazers_count).sum(),
        total_forks: details.iter().map(|d| d.repo.forks_count).sum(),
        activity_score: include_activity.then(|| activity_score(details, now)),
        language_bytes,
        language_percentages,
    }
}

/// Sum of bytes across languages, never less than 1.
pub fn total_bytes(language_bytes: &BTreeMap<String, u64>) -> u64 {
    language_bytes.values().sum::<u64>().max(1)
}

/// `bytes / total * 100`, rounded to two decimals.
pub fn percentage(bytes: u64, total: u64) -> f64 {
    let raw = bytes as f64 / total.max(1) as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Per-language shares sorted by bytes, largest first.
///
/// Ties are broken by language name so the order is stable.
pub fn language_shares(metrics: &AggregateMetrics) -> Vec<LanguageShare> {
    let mut shares: Vec<LanguageShare> = metrics
        .language_bytes
        .iter()
        .map(|(language, bytes)| LanguageShare {
            language: language.clone(),
            bytes: *bytes,
            percentage: metrics
                .language_percentages
                .get(language)
                .copied()
                .unwrap_or_default(),
        })
        .collect();

    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    shares
}

/// `Σ max(0, 100 - days since last update)` over the repositories.
///
/// Repositories whose timestamp does not parse contribute nothing.
pub fn activity_score(details: &[RepoDetail], now: DateTime<Utc>) -> u64 {
    details
        .iter()
        .filter_map(|detail| match DateTime::parse_from_rfc3339(&detail.repo.updated_at) {
            Ok(updated) => Some(updated.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!(
                    repo = %detail.repo.name,
                    updated_at = %detail.repo.updated_at,
                    error = %e,
                    "unparseable update timestamp, skipping activity contribution"
                );
                None
            }
        })
        .map(|updated| {
            let days = (now - updated).num_days();
            (ACTIVITY_WINDOW_DAYS - days).max(0) as u64
        })
        .sum()
}
