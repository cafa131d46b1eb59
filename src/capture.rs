/// Capturing the current page into a saved record
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::config::{ForwardPolicy, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::record::{ApiProjection, CapturePayload};
use crate::storage::{KeyValueStore, TrackerStore, UpsertOutcome};

pub const UNKNOWN_SITE: &str = "Unknown Site";

/// Longest cleaned title (exclusive) still accepted as a site name
const MAX_SITE_NAME_CHARS: usize = 50;

static DASH_OR_PIPE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-|]\s*.*$").expect("valid regex"));
static COLON_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*:\s*.*$").expect("valid regex"));
static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*\)$").expect("valid regex"));

/// Derive a human readable site name from a page title, falling back to the URL
///
/// Examples:
/// - "Example Site - Home" → "Example Site"
/// - "Docs | Rust" → "Docs"
/// - "" + https://www.example.com/page → "Example.com"
/// - "" + "not a url" → "Unknown Site"
pub fn extract_site_name(title: &str, url: &str) -> String {
    if !title.trim().is_empty() {
        let cleaned = clean_title(title);
        let len = cleaned.chars().count();
        if len > 0 && len < MAX_SITE_NAME_CHARS {
            return cleaned;
        }
    }

    match hostname(url) {
        Some(host) => capitalize(host.strip_prefix("www.").unwrap_or(&host)),
        None => {
            log::debug!("Could not derive a site name from {:?}", url);
            UNKNOWN_SITE.to_string()
        }
    }
}

fn clean_title(title: &str) -> String {
    let cleaned = DASH_OR_PIPE_SUFFIX.replace(title, "");
    let cleaned = COLON_SUFFIX.replace(&cleaned, "");
    let cleaned = TRAILING_PARENTHETICAL.replace(&cleaned, "");
    cleaned.trim().to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Hostname of a URL, `None` when the URL does not parse or has no host
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Generate a record id: base36 millisecond timestamp plus a random suffix
pub fn generate_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", to_base36(millis), &suffix[..11])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

impl CapturePayload {
    /// Build the payload for the page at `url` with document title `title`
    pub fn from_page(url: &str, title: &str, now: DateTime<Utc>) -> Result<CapturePayload> {
        if url.is_empty() {
            return Err(TrackerError::MissingUrl);
        }

        let parsed = Url::parse(url).map_err(|_| TrackerError::InvalidUrl { url: url.to_string() })?;

        Ok(CapturePayload {
            url: url.to_string(),
            title: title.to_string(),
            site_name: extract_site_name(title, url),
            domain: parsed.host_str().unwrap_or_default().to_string(),
            timestamp: now,
        })
    }
}

/// Destination for the reduced projection of each capture
#[allow(async_fn_in_trait)]
pub trait Forwarder {
    async fn forward(&self, endpoint: &str, projection: &ApiProjection) -> Result<()>;
}

/// Stand-in for the external API: logs what would be POSTed
#[derive(Debug, Default, Clone, Copy)]
pub struct LogForwarder;

impl Forwarder for LogForwarder {
    async fn forward(&self, endpoint: &str, projection: &ApiProjection) -> Result<()> {
        let body = serde_json::to_string(projection)?;
        log::info!("Would send to API: POST {} {}", endpoint, body);
        Ok(())
    }
}

/// Upserts captures into the store and forwards them when enabled
pub struct CaptureService<S, F> {
    store: TrackerStore<S>,
    forwarder: F,
    config: TrackerConfig,
}

impl<S: KeyValueStore, F: Forwarder> CaptureService<S, F> {
    pub fn new(store: TrackerStore<S>, forwarder: F, config: TrackerConfig) -> Self {
        CaptureService {
            store,
            forwarder,
            config,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &TrackerStore<S> {
        &self.store
    }

    /// Upsert the capture by exact URL and persist the whole collection.
    /// The local write completes before any forwarding is attempted.
    pub async fn save(&self, payload: CapturePayload, now: DateTime<Utc>) -> Result<UpsertOutcome> {
        if payload.url.is_empty() {
            return Err(TrackerError::MissingUrl);
        }

        let projection = ApiProjection::from(&payload);

        let mut records = self.store.load_records().await?;
        let outcome = records.upsert(payload, now, || generate_id(now));
        self.store.save_records(&records).await?;

        log::info!("Saved {} ({:?})", projection.url, outcome);

        if self.config.forwarding_enabled {
            if let Err(e) = self.forwarder.forward(&self.config.api_endpoint, &projection).await {
                match self.config.forward_policy {
                    ForwardPolicy::Required => {
                        log::error!("API call failed: {}", e);
                        return Err(e);
                    }
                    ForwardPolicy::BestEffort => {
                        log::warn!("API call failed, local save kept: {}", e);
                    }
                }
            }
        }

        Ok(outcome)
    }
}
