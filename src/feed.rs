//! Fetching and refreshing the iCalendar feed.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;

use crate::state::{AppState, FeedData};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Turn a configured feed URL into something reqwest can fetch.
///
/// `webcal://` is the subscription scheme calendar apps hand out; it is plain
/// HTTPS underneath.
pub fn normalize_feed_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let rewritten = match raw.strip_prefix("webcal://") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    };

    let url = Url::parse(&rewritten).with_context(|| format!("Invalid feed URL '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Unsupported feed URL scheme '{}'", url.scheme());
    }

    Ok(url)
}

#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: Url,
}

impl FeedClient {
    pub fn new(feed_url: &str) -> Result<Self> {
        let url = normalize_feed_url(feed_url)?;
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(FeedClient { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download the raw ICS text.
    pub async fn fetch(&self) -> Result<String> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.url.host_str().unwrap_or("feed")))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Feed responded with {status}");
        }

        response.text().await.context("Failed to read feed body")
    }
}

/// Fetch, parse and publish the feed once.
///
/// A failed fetch or an unparsable feed leaves the previous events in place
/// and only records the error.
pub async fn refresh_calendar(state: &AppState, client: &FeedClient) {
    let generation = state.calendar.begin();

    let outcome = match client.fetch().await {
        Ok(raw) => state
            .parser()
            .parse(&raw)
            .map(|events| FeedData { raw, events })
            .map_err(|e| e.to_string()),
        Err(e) => Err(format!("{e:#}")),
    };

    match &outcome {
        Ok(data) => info!(generation, events = data.events.len(), "Calendar refreshed"),
        Err(error) => warn!(generation, %error, "Calendar refresh failed"),
    }

    state.calendar.publish(generation, outcome).await;
}

/// Refresh the calendar every `refresh_interval`, starting immediately.
///
/// Each refresh runs in its own task so a hung request never delays the next
/// tick; overlapping results are ordered by generation.
pub async fn poll_calendar(state: AppState, client: FeedClient) {
    let mut ticker = tokio::time::interval(state.config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(url = %client.url(), every = ?state.config.refresh_interval, "Polling calendar feed");
    loop {
        ticker.tick().await;
        let state = state.clone();
        let client = client.clone();
        tokio::spawn(async move { refresh_calendar(&state, &client).await });
    }
}
