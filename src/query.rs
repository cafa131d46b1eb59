/// Record queries: filtering, sorting, stats and export

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::Result;
use crate::record::Record;

/// Search term and domain selection from the browse view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub search: String,
    pub domain: String,
}

impl RecordFilter {
    pub fn new(search: &str, domain: &str) -> Self {
        RecordFilter {
            search: search.to_string(),
            domain: domain.to_string(),
        }
    }

    /// Search matches title, URL, domain or site name (case-insensitive),
    /// AND the domain, when selected, matches exactly
    pub fn matches(&self, record: &Record) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = term.is_empty()
            || record.title.to_lowercase().contains(&term)
            || record.url.to_lowercase().contains(&term)
            || record.domain.to_lowercase().contains(&term)
            || record.site_name.to_lowercase().contains(&term);

        let matches_domain = self.domain.is_empty() || record.domain == self.domain;

        matches_search && matches_domain
    }
}

pub fn filter_records(records: &[Record], filter: &RecordFilter) -> Vec<Record> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Newest first by last save (or first save when never re-saved)
pub fn sort_by_recency(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.saved_at().cmp(&a.saved_at()));
    sorted
}

/// Distinct domains, alphabetically
pub fn unique_domains(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.domain.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total: usize,
    pub this_week: usize,
    pub unique_domains: usize,
}

impl RecordStats {
    pub fn compute(records: &[Record], now: DateTime<Utc>) -> Self {
        let one_week_ago = now - Duration::days(7);
        RecordStats {
            total: records.len(),
            this_week: records.iter().filter(|r| r.saved_at() >= one_week_ago).count(),
            unique_domains: records
                .iter()
                .map(|r| r.domain.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }
}

/// "Just now", "5m ago", "3h ago", "2d ago"
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - then;
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", days)
    }
}

/// Relative time of the most recent save, if anything has been saved
pub fn last_saved_relative(records: &[Record], now: DateTime<Utc>) -> Option<String> {
    records
        .iter()
        .map(Record::saved_at)
        .max()
        .map(|latest| format_relative(latest, now))
}

/// Which export is being written; decides the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Every record, from the popup
    All,
    /// The filtered list, from the browse view
    Filtered,
}

pub fn export_filename(product_slug: &str, kind: ExportKind, date: NaiveDate) -> String {
    let label = match kind {
        ExportKind::All => "export",
        ExportKind::Filtered => "urls",
    };
    format!("{}-{}-{}.json", product_slug, label, date.format("%Y-%m-%d"))
}

pub fn export_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, day, hour, 0, 0).unwrap()
    }

    fn record(id: &str, url: &str, title: &str, domain: &str, saved: DateTime<Utc>) -> Record {
        Record {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            site_name: title.to_string(),
            domain: domain.to_string(),
            timestamp: saved,
            created_at: saved,
            last_saved: Some(saved),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("1", "https://a.com/rust", "Rust tips", "a.com", at(1, 0)),
            record("2", "https://a.com/go", "Go tips", "a.com", at(3, 0)),
            record("3", "https://b.com/airdrop", "Airdrop Season", "b.com", at(2, 0)),
        ]
    }

    #[test]
    fn test_filter_by_domain_only() {
        let filtered = filter_records(&sample(), &RecordFilter::new("", "a.com"));

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.domain == "a.com"));
    }

    #[test]
    fn test_filter_search_and_domain_are_anded() {
        let filtered = filter_records(&sample(), &RecordFilter::new("airdrop", "a.com"));
        assert!(filtered.is_empty());

        let filtered = filter_records(&sample(), &RecordFilter::new("airdrop", ""));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "3");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let records = sample();

        assert_eq!(filter_records(&records, &RecordFilter::new("RUST", "")).len(), 1);
        assert_eq!(filter_records(&records, &RecordFilter::new("B.COM", "")).len(), 1);
        assert_eq!(filter_records(&records, &RecordFilter::new("/go", "")).len(), 1);
        assert_eq!(filter_records(&records, &RecordFilter::default()).len(), 3);
    }

    #[test]
    fn test_search_matches_site_name() {
        let mut records = sample();
        records[0].site_name = "Ferris Weekly".to_string();

        let filtered = filter_records(&records, &RecordFilter::new("ferris", ""));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn test_domain_filter_is_exact() {
        let filtered = filter_records(&sample(), &RecordFilter::new("", "a.co"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_sort_by_recency() {
        let sorted = sort_by_recency(&sample());
        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_falls_back_to_created_at() {
        let mut records = sample();
        records[0].last_saved = None;
        records[0].created_at = at(9, 0);

        let sorted = sort_by_recency(&records);

        assert_eq!(sorted[0].id, "1");
    }

    #[test]
    fn test_unique_domains_sorted() {
        assert_eq!(unique_domains(&sample()), vec!["a.com".to_string(), "b.com".to_string()]);
    }

    #[test]
    fn test_stats() {
        let stats = RecordStats::compute(&sample(), at(9, 0));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.unique_domains, 2);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(RecordStats::compute(&[], at(9, 0)), RecordStats::default());
        assert_eq!(last_saved_relative(&[], at(9, 0)), None);
    }

    #[test]
    fn test_format_relative() {
        let now = at(10, 12);
        assert_eq!(format_relative(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_last_saved_relative_uses_newest() {
        assert_eq!(last_saved_relative(&sample(), at(3, 2)), Some("2h ago".to_string()));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 28).unwrap();
        assert_eq!(
            export_filename("airdrop-tracker", ExportKind::Filtered, date),
            "airdrop-tracker-urls-2024-10-28.json"
        );
        assert_eq!(
            export_filename("airdrop-tracker", ExportKind::All, date),
            "airdrop-tracker-export-2024-10-28.json"
        );
    }

    #[test]
    fn test_export_contains_filtered_records_only() {
        let records = sample();
        let filtered = filter_records(&records, &RecordFilter::new("", "b.com"));

        let json = export_json(&filtered).unwrap();
        let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, filtered);
        assert_ne!(parsed.len(), records.len());
    }
}
