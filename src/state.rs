use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::RwLock;
use tracing::debug;
use wallcal_core::config::DashboardConfig;
use wallcal_core::weather::WeatherReport;
use wallcal_core::{Event, IcsParser};

/// The latest successfully fetched feed.
#[derive(Debug)]
pub struct FeedData {
    pub raw: String,
    pub events: Vec<Event>,
}

/// What a refresh slot currently holds.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Generation of the refresh that last published here (0 = never)
    pub generation: u64,
    /// Last successful value; kept when later refreshes fail
    pub value: Option<Arc<T>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub attempted_at: Option<DateTime<Utc>>,
    /// Error of the most recent refresh, cleared on success
    pub last_error: Option<String>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Snapshot {
            generation: 0,
            value: None,
            updated_at: None,
            attempted_at: None,
            last_error: None,
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot {
            generation: self.generation,
            value: self.value.as_ref().map(Arc::clone),
            updated_at: self.updated_at,
            attempted_at: self.attempted_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Last-writer-wins holder for periodically refreshed data.
///
/// A refresh takes a generation with [`Slot::begin`] before it starts
/// fetching and hands it back to [`Slot::publish`]. Results older than what
/// is already published are dropped, so a slow fetch can never replace the
/// data of a newer one.
pub struct Slot<T> {
    issued: AtomicU64,
    inner: RwLock<Snapshot<T>>,
}

impl<T> Slot<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            issued: AtomicU64::new(0),
            inner: Default::default(),
        })
    }

    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns false when the result was superseded and discarded.
    pub async fn publish(&self, generation: u64, outcome: Result<T, String>) -> bool {
        let mut snapshot = self.inner.write().await;
        if generation <= snapshot.generation {
            debug!(
                generation,
                published = snapshot.generation,
                "Discarding stale refresh result"
            );
            return false;
        }

        let now = Utc::now();
        snapshot.generation = generation;
        snapshot.attempted_at = Some(now);
        match outcome {
            Ok(value) => {
                snapshot.value = Some(Arc::new(value));
                snapshot.updated_at = Some(now);
                snapshot.last_error = None;
            }
            Err(error) => snapshot.last_error = Some(error),
        }

        true
    }

    pub async fn snapshot(&self) -> Snapshot<T> {
        self.inner.read().await.clone()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    /// Zone the dashboard displays in
    pub tz: Tz,
    pub calendar: Arc<Slot<FeedData>>,
    pub weather: Arc<Slot<WeatherReport>>,
}

impl AppState {
    pub fn new(config: DashboardConfig, tz: Tz) -> Self {
        AppState {
            config: Arc::new(config),
            tz,
            calendar: Slot::new(),
            weather: Slot::new(),
        }
    }

    pub fn parser(&self) -> IcsParser {
        IcsParser::new(self.tz)
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}
