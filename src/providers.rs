use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::{UpstreamError, ensure_success};

// --- Upstream Shapes ---

/// StoreRow
///
/// A raw row from the persisted-store shorts table. Upstream producers disagree on field
/// names, so the row is kept as loose JSON and normalized in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreRow(pub serde_json::Value);

/// LiveItem
///
/// One search result from the live provider:
/// `{ id: { videoId }, snippet: { title, description, thumbnails: { medium: { url } } } }`.
/// Every level is optional; a partial item still normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveItem {
    #[serde(default)]
    pub id: Option<LiveItemId>,
    #[serde(default)]
    pub snippet: Option<LiveSnippet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveItemId {
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveSnippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<LiveThumbnails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveThumbnails {
    #[serde(default)]
    pub medium: Option<LiveThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LiveThumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

impl LiveItem {
    pub fn new(video_id: &str, title: &str, description: &str, thumbnail_url: &str) -> Self {
        Self {
            id: Some(LiveItemId {
                video_id: Some(video_id.to_string()),
            }),
            snippet: Some(LiveSnippet {
                title: Some(title.to_string()),
                description: Some(description.to_string()),
                thumbnails: Some(LiveThumbnails {
                    medium: Some(LiveThumbnail {
                        url: Some(thumbnail_url.to_string()),
                    }),
                }),
            }),
        }
    }
}

// --- Provider Contract ---

/// ContentProvider
///
/// The two independent content sources behind a locality feed. Implementations report
/// failures honestly; swallowing them is the aggregator's job.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Persisted-store rows scoped by region and locality.
    async fn fetch_store(
        &self,
        region: &str,
        locality: &str,
        max_results: u32,
    ) -> Result<Vec<StoreRow>, UpstreamError>;

    /// Live provider results scoped by locality alone.
    async fn fetch_live(&self, locality: &str) -> Result<Vec<LiveItem>, UpstreamError>;
}

/// ContentState
///
/// Shared handle to the content provider stored in `AppState`.
pub type ContentState = Arc<dyn ContentProvider>;

/// HttpContentProvider
///
/// `reqwest` implementation against the application's content API. No timeout is set
/// on these requests.
#[derive(Clone)]
pub struct HttpContentProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    async fn fetch_store(
        &self,
        region: &str,
        locality: &str,
        max_results: u32,
    ) -> Result<Vec<StoreRow>, UpstreamError> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/db/shorts", self.base_url))
            .query(&[
                ("region", region),
                ("city", locality),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        Ok(ensure_success(response)?.json::<Vec<StoreRow>>().await?)
    }

    async fn fetch_live(&self, locality: &str) -> Result<Vec<LiveItem>, UpstreamError> {
        // The live endpoint calls its only parameter `region`, but it is keyed by locality.
        let response = self
            .client
            .get(format!("{}/region", self.base_url))
            .query(&[("region", locality)])
            .send()
            .await?;

        Ok(ensure_success(response)?.json::<Vec<LiveItem>>().await?)
    }
}

// --- Mock Implementation ---

/// ProviderCall
///
/// One recorded call against `MockContentProvider`, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Store { region: String, locality: String },
    Live { locality: String },
}

/// MockContentProvider
///
/// Scripted provider for tests. Store responses are fixed per locality; live responses
/// are queued per locality and consumed one per call, so the first live call and the
/// fallback call can answer differently. Unscripted calls answer `[]`. Failures are
/// reported as `UpstreamError::Status`.
///
/// `with_store_answering_last` makes the first live call wait until the store call has
/// started, and holds the store reply until that live call has answered. Both only
/// complete when the two calls are in flight together.
#[derive(Default)]
pub struct MockContentProvider {
    store: HashMap<String, Result<Vec<StoreRow>, u16>>,
    live: Mutex<HashMap<String, VecDeque<Result<Vec<LiveItem>, u16>>>>,
    calls: Mutex<Vec<ProviderCall>>,
    overlap: Option<OverlapGate>,
}

#[derive(Default)]
struct OverlapGate {
    armed: AtomicBool,
    store_started: Notify,
    live_answered: Notify,
}

impl MockContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, locality: &str, rows: Vec<serde_json::Value>) -> Self {
        let rows = rows.into_iter().map(StoreRow).collect();
        self.store.insert(locality.to_string(), Ok(rows));
        self
    }

    pub fn with_store_failure(mut self, locality: &str, status: u16) -> Self {
        self.store.insert(locality.to_string(), Err(status));
        self
    }

    pub fn with_live(self, locality: &str, items: Vec<LiveItem>) -> Self {
        self.push_live(locality, Ok(items));
        self
    }

    pub fn with_live_failure(self, locality: &str, status: u16) -> Self {
        self.push_live(locality, Err(status));
        self
    }

    pub fn with_store_answering_last(mut self) -> Self {
        self.overlap = Some(OverlapGate {
            armed: AtomicBool::new(true),
            ..OverlapGate::default()
        });
        self
    }

    fn push_live(&self, locality: &str, response: Result<Vec<LiveItem>, u16>) {
        self.live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(locality.to_string())
            .or_default()
            .push_back(response);
    }

    fn record(&self, call: ProviderCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn live_calls(&self, locality: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Live { locality: l } if l == locality))
            .count()
    }

    pub fn store_calls(&self, locality: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Store { locality: l, .. } if l == locality))
            .count()
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    async fn fetch_store(
        &self,
        region: &str,
        locality: &str,
        _max_results: u32,
    ) -> Result<Vec<StoreRow>, UpstreamError> {
        self.record(ProviderCall::Store {
            region: region.to_string(),
            locality: locality.to_string(),
        });
        if let Some(gate) = &self.overlap {
            gate.store_started.notify_one();
            gate.live_answered.notified().await;
        }
        match self.store.get(locality) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(status)) => Err(UpstreamError::Status(*status)),
            None => Ok(vec![]),
        }
    }

    async fn fetch_live(&self, locality: &str) -> Result<Vec<LiveItem>, UpstreamError> {
        self.record(ProviderCall::Live {
            locality: locality.to_string(),
        });
        // Only the first live call takes part in the overlap.
        let gate = self
            .overlap
            .as_ref()
            .filter(|gate| gate.armed.swap(false, Ordering::SeqCst));
        if let Some(gate) = gate {
            gate.store_started.notified().await;
        }
        let next = self
            .live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_mut(locality)
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            gate.live_answered.notify_one();
        }
        match next {
            Some(Ok(items)) => Ok(items),
            Some(Err(status)) => Err(UpstreamError::Status(status)),
            None => Ok(vec![]),
        }
    }
}
