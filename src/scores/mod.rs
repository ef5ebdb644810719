//! The scores module contains the read-through cache of EPSS scores.
//!
//! It is composed of a parser turning the downloaded dataset into scores, a
//! staleness policy deciding when to download it again, and a store holding
//! the current snapshot. The [`Client`] ties them together and is the only
//! one writing in the store.

pub mod parser;
pub mod staleness;
pub mod store;

use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use flate2::read::MultiGzDecoder;
use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::error::{Error, FetchError, RefreshError, Result};
use crate::models::{is_cve_id, Metadata, Score};
use crate::readers::http::{HttpTransport, DEFAULT_TIMEOUT};
use crate::readers::Transport;
use staleness::{StalenessPolicy, DEFAULT_UPDATE_INTERVAL_HOURS};
use store::{CacheStore, Snapshot};

/// Where the current scores are published.
pub const DEFAULT_DATA_URL: &str = "https://epss.cyentia.com/epss_scores-current.csv.gz";

/// Builds a [`Client`].
pub struct ClientBuilder {
    data_url: String,
    transport: Option<Box<dyn Transport>>,
    update_interval: Duration,
    timeout: std::time::Duration,
}

impl ClientBuilder {
    /// Creates a builder with the default settings.
    pub fn new() -> Self {
        ClientBuilder {
            data_url: DEFAULT_DATA_URL.to_string(),
            transport: None,
            update_interval: Duration::hours(DEFAULT_UPDATE_INTERVAL_HOURS),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Downloads the dataset from another URL.
    pub fn data_url(mut self, data_url: &str) -> Self {
        self.data_url = data_url.to_string();
        self
    }

    /// Uses the given transport instead of the default HTTP one.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Sets how long a snapshot is considered fresh.
    /// A negative interval falls back to 24 hours.
    pub fn update_interval(mut self, update_interval: Duration) -> Self {
        self.update_interval = update_interval;
        self
    }

    /// Sets the timeout of the default HTTP transport.
    /// Ignored when a transport is injected.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates the client. Nothing is downloaded until the first query.
    pub fn build(self) -> Result<Client> {
        trace!("Running ClientBuilder::build()");
        let transport = match self.transport {
            Some(t) => t,
            None => Box::new(HttpTransport::new(self.timeout)?),
        };
        let policy = StalenessPolicy::new(self.update_interval);
        debug!(
            "Client for {} with an update interval of {}",
            self.data_url,
            policy.interval()
        );

        Ok(Client {
            data_url: self.data_url,
            transport,
            policy,
            store: CacheStore::new(),
            refresh_lock: Mutex::new(()),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A read-through cache of the EPSS scores.
///
/// Every query checks whether the snapshot is stale and, if so, downloads
/// and parses the dataset before answering. There is no background thread:
/// the refresh runs on the thread of the caller who found the snapshot stale.
/// When a refresh fails, the error is returned and the previous snapshot
/// stays in place.
///
/// A `Client` can be shared between threads behind an `Arc`.
pub struct Client {
    /// The URL of the gzipped dataset
    data_url: String,
    /// The reader used to download the dataset
    transport: Box<dyn Transport>,
    /// Decides when to download the dataset again
    policy: StalenessPolicy,
    /// Holds the current snapshot
    store: CacheStore,
    /// Serializes the refreshes
    refresh_lock: Mutex<()>,
}

impl Client {
    /// Returns a builder to configure a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The URL the dataset is downloaded from.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// The normalized update interval.
    pub fn update_interval(&self) -> Duration {
        self.policy.interval()
    }

    /// Refreshes the snapshot if it is stale.
    pub fn ensure_fresh(&self) -> std::result::Result<(), RefreshError> {
        trace!("Running Client::ensure_fresh()");
        if !self.is_stale() {
            return Ok(());
        }

        let _guard = self.refresh_lock.lock();
        // Another caller may have refreshed while we were waiting for the lock
        if !self.is_stale() {
            debug!("Snapshot refreshed by another caller");
            return Ok(());
        }
        self.refresh_locked()
    }

    /// Downloads the dataset again, whether the snapshot is stale or not.
    pub fn refresh(&self) -> std::result::Result<(), RefreshError> {
        trace!("Running Client::refresh()");
        let _guard = self.refresh_lock.lock();
        self.refresh_locked()
    }

    /// Returns all the scores.
    /// Their order is not stable across calls.
    pub fn get_all_scores(&self) -> Result<Vec<Score>> {
        trace!("Running Client::get_all_scores()");
        self.ensure_fresh()?;
        let snapshot = self.store.read();
        Ok(snapshot.scores.values().cloned().collect())
    }

    /// Returns the score of the given CVE.
    pub fn get_score(&self, cve: &str) -> Result<Score> {
        trace!("Running Client::get_score()");
        if !is_cve_id(cve) {
            return Err(Error::InvalidIdentifier(cve.to_string()));
        }
        self.ensure_fresh()?;

        self.store
            .read()
            .scores
            .get(cve)
            .cloned()
            .ok_or_else(|| Error::NotFound(cve.to_string()))
    }

    /// Returns the scores of the given CVEs, in the same order, all read from
    /// the same snapshot. Fails on the first CVE without a score.
    pub fn get_scores<S: AsRef<str>>(&self, cves: &[S]) -> Result<Vec<Score>> {
        trace!("Running Client::get_scores()");
        if let Some(invalid) = cves.iter().find(|cve| !is_cve_id(cve.as_ref())) {
            return Err(Error::InvalidIdentifier(invalid.as_ref().to_string()));
        }
        self.ensure_fresh()?;

        let snapshot = self.store.read();
        cves.iter()
            .map(|cve| {
                let cve = cve.as_ref();
                snapshot
                    .scores
                    .get(cve)
                    .cloned()
                    .ok_or_else(|| Error::NotFound(cve.to_string()))
            })
            .collect()
    }

    /// When the snapshot was last refreshed, None if it never was.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.store.read().last_updated
    }

    /// The metadata of the current snapshot, None if it was never refreshed.
    pub fn metadata(&self) -> Option<Metadata> {
        self.store.read().metadata.clone()
    }

    /// The model version of the current snapshot.
    pub fn model_version(&self) -> Option<String> {
        self.metadata().map(|m| m.model_version)
    }

    /// The score date of the current snapshot.
    pub fn score_date(&self) -> Option<DateTime<Utc>> {
        self.metadata().map(|m| m.score_date)
    }

    /// The current snapshot, without refreshing it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.read()
    }

    fn is_stale(&self) -> bool {
        self.policy.is_stale(self.store.read().last_updated, Utc::now())
    }

    /// Fetches, decompresses and parses the dataset, then commits it.
    /// The caller must hold `refresh_lock`.
    fn refresh_locked(&self) -> std::result::Result<(), RefreshError> {
        debug!("Refreshing scores from {}", self.data_url);
        let result = self.download().and_then(|data| {
            let (metadata, scores) = parser::parse(&data)?;
            Ok((metadata, scores))
        });

        match result {
            Ok((metadata, scores)) => {
                info!(
                    "Loaded {} scores, model version {}",
                    scores.len(),
                    metadata.model_version
                );
                self.store.commit(Snapshot::new(scores, metadata, Utc::now()));
                Ok(())
            }
            Err(e) => {
                warn!("Unable to refresh the scores, keeping the previous ones: {}", e);
                Err(e)
            }
        }
    }

    /// Downloads the dataset and returns it decompressed.
    fn download(&self) -> std::result::Result<Vec<u8>, RefreshError> {
        let response = self
            .transport
            .fetch(&self.data_url)
            .map_err(FetchError::Transport)?;
        if !response.is_success() {
            return Err(FetchError::BadStatus(response.status).into());
        }
        if response.body.is_empty() {
            return Err(FetchError::EmptyBody.into());
        }

        // The artifact may hold several gzip members, all of them are read
        let mut data = Vec::new();
        MultiGzDecoder::new(response.body.as_slice())
            .read_to_end(&mut data)
            .map_err(RefreshError::DecompressFailed)?;
        debug!(
            "Decompressed {} bytes into {} bytes",
            response.body.len(),
            data.len()
        );
        Ok(data)
    }
}
