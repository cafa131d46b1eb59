/// Normalizing records written by the unversioned (schema 0) layout
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::capture::{extract_site_name, generate_id, hostname};
use crate::record::Record;

/// A schema 0 record: every field optional, timestamps as loose strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyRecord {
    id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    site_name: Option<String>,
    domain: Option<String>,
    timestamp: Option<String>,
    created_at: Option<String>,
    last_saved: Option<String>,
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn normalize(legacy: LegacyRecord, now: DateTime<Utc>) -> Option<Record> {
    let url = legacy.url.filter(|u| !u.is_empty())?;
    let title = legacy.title.unwrap_or_default();

    let timestamp = parse_time(legacy.timestamp.as_deref());
    let last_saved = parse_time(legacy.last_saved.as_deref());
    let created_at = parse_time(legacy.created_at.as_deref())
        .or(last_saved)
        .or(timestamp)
        .unwrap_or(now);

    let site_name = legacy
        .site_name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| extract_site_name(&title, &url));
    let domain = legacy
        .domain
        .filter(|d| !d.is_empty())
        .or_else(|| hostname(&url))
        .unwrap_or_default();

    Some(Record {
        id: legacy.id.filter(|id| !id.is_empty()).unwrap_or_else(|| generate_id(now)),
        timestamp: timestamp.unwrap_or(created_at),
        last_saved: Some(last_saved.unwrap_or(created_at).max(created_at)),
        created_at,
        url,
        title,
        site_name,
        domain,
    })
}

/// Fill missing fields and keep one record per URL (the most recently saved).
/// Entries without a URL cannot be keyed and are dropped.
pub fn normalize_records(raw: Vec<Value>, now: DateTime<Utc>) -> Vec<Record> {
    let mut out: Vec<Record> = Vec::with_capacity(raw.len());
    let mut index_by_url: HashMap<String, usize> = HashMap::new();

    for value in raw {
        let legacy: LegacyRecord = match serde_json::from_value(value) {
            Ok(legacy) => legacy,
            Err(e) => {
                log::warn!("Dropping unreadable record during migration: {}", e);
                continue;
            }
        };

        let Some(record) = normalize(legacy, now) else {
            log::warn!("Dropping record without a URL during migration");
            continue;
        };

        match index_by_url.get(&record.url) {
            Some(&i) => {
                if record.saved_at() > out[i].saved_at() {
                    out[i] = record;
                }
            }
            None => {
                index_by_url.insert(record.url.clone(), out.len());
                out.push(record);
            }
        }
    }

    out
}
