use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde_json::Value;
use std::future::Future;

use crate::models::{ContentItem, LocalityFeedResponse};
use crate::providers::{ContentProvider, LiveItem, StoreRow};

// Alternate spellings written by the different persisted-store producers,
// in order of preference.
const ID_KEYS: &[&str] = &["videoId", "youtubeVideoId", "youtube_video_id", "video_id", "id"];
const TITLE_KEYS: &[&str] = &["title", "videoTitle", "video_title", "youtubeTitle", "youtube_title"];
const DESCRIPTION_KEYS: &[&str] = &[
    "description",
    "videoDescription",
    "video_description",
    "desc",
];
const THUMBNAIL_KEYS: &[&str] = &[
    "thumbnailUrl",
    "thumbnail_url",
    "thumbnail",
    "thumbnailURL",
    "thumb_url",
];

fn first_of(row: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| match row.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// normalize_store_row
///
/// Maps a persisted-store row onto `ContentItem`, taking the first non-empty spelling of
/// each field. Returns `None` for rows that are not JSON objects.
pub fn normalize_store_row(row: &StoreRow) -> Option<ContentItem> {
    let fields = row.0.as_object()?;
    Some(ContentItem {
        id: first_of(fields, ID_KEYS),
        title: first_of(fields, TITLE_KEYS),
        description: first_of(fields, DESCRIPTION_KEYS),
        thumbnail_url: first_of(fields, THUMBNAIL_KEYS),
    })
}

pub fn normalize_live_item(item: &LiveItem) -> ContentItem {
    let snippet = item.snippet.as_ref();
    ContentItem {
        id: item
            .id
            .as_ref()
            .and_then(|id| id.video_id.clone())
            .unwrap_or_default(),
        title: snippet.and_then(|s| s.title.clone()).unwrap_or_default(),
        description: snippet
            .and_then(|s| s.description.clone())
            .unwrap_or_default(),
        thumbnail_url: snippet
            .and_then(|s| s.thumbnails.as_ref())
            .and_then(|t| t.medium.as_ref())
            .and_then(|m| m.url.clone())
            .unwrap_or_default(),
    }
}

/// assemble
///
/// Normalizes both result sets and concatenates them, persisted store first. Order within
/// each provider is preserved; arrival order of the two fetches plays no part.
pub fn assemble(store: &[StoreRow], live: &[LiveItem]) -> Vec<ContentItem> {
    store
        .iter()
        .filter_map(normalize_store_row)
        .chain(live.iter().map(normalize_live_item))
        .collect()
}

/// Merged
///
/// Result of `merge_with_fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub items: Vec<ContentItem>,
    pub fallback_used: bool,
}

/// merge_with_fallback
///
/// Merges already-resolved provider results. When the merge is empty, `fallback` is
/// awaited exactly once and its (normalized) result becomes the final list.
pub async fn merge_with_fallback<F, Fut>(store: &[StoreRow], live: &[LiveItem], fallback: F) -> Merged
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Vec<LiveItem>>,
{
    let items = assemble(store, live);
    if !items.is_empty() {
        return Merged {
            items,
            fallback_used: false,
        };
    }

    let retried = fallback().await;
    Merged {
        items: retried.iter().map(normalize_live_item).collect(),
        fallback_used: true,
    }
}

// --- Locality Feed ---

/// FeedPhase
///
/// `Loading -> Merged`, or `Loading -> Merged(empty) -> RetryingFallback -> Merged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Merged,
    RetryingFallback,
}

/// LocalityFeed
///
/// The feed for one `(region, locality)` pair and where it is in its lifecycle.
#[derive(Debug, Clone)]
pub struct LocalityFeed {
    pub region: String,
    pub locality: String,
    pub phase: FeedPhase,
    pub items: Vec<ContentItem>,
    pub fallback_used: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl LocalityFeed {
    pub fn loading(region: &str, locality: &str) -> Self {
        Self {
            region: region.to_string(),
            locality: locality.to_string(),
            phase: FeedPhase::Loading,
            items: vec![],
            fallback_used: false,
            fetched_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase != FeedPhase::Merged
    }

    fn transition(&mut self, phase: FeedPhase) {
        tracing::debug!(
            region = %self.region,
            locality = %self.locality,
            from = ?self.phase,
            to = ?phase,
            "feed transition"
        );
        self.phase = phase;
    }

    fn merged(&mut self, items: Vec<ContentItem>) {
        self.items = items;
        self.fetched_at = Some(Utc::now());
        self.transition(FeedPhase::Merged);
    }
}

impl From<LocalityFeed> for LocalityFeedResponse {
    fn from(feed: LocalityFeed) -> Self {
        LocalityFeedResponse {
            loading: feed.is_loading(),
            fallback_used: feed.fallback_used,
            fetched_at: feed.fetched_at.unwrap_or_else(Utc::now),
            region: feed.region,
            locality: feed.locality,
            items: feed.items,
        }
    }
}

async fn live_or_empty<P>(provider: &P, locality: &str) -> Vec<LiveItem>
where
    P: ContentProvider + ?Sized,
{
    provider.fetch_live(locality).await.unwrap_or_else(|e| {
        tracing::warn!(locality, "live provider fetch failed: {}", e);
        vec![]
    })
}

async fn store_or_empty<P>(provider: &P, region: &str, locality: &str, max_results: u32) -> Vec<StoreRow>
where
    P: ContentProvider + ?Sized,
{
    provider
        .fetch_store(region, locality, max_results)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(region, locality, "persisted store fetch failed: {}", e);
            vec![]
        })
}

/// aggregate
///
/// Builds one locality's feed. The persisted-store and live fetches run concurrently and
/// are joined before merging; each degrades to `[]` on failure. If the merge is empty the
/// live fetch is issued once more, strictly after the join. Never fails.
pub async fn aggregate<P>(provider: &P, region: &str, locality: &str, max_results: u32) -> LocalityFeed
where
    P: ContentProvider + ?Sized,
{
    let mut feed = LocalityFeed::loading(region, locality);

    let (store, live) = tokio::join!(
        store_or_empty(provider, region, locality, max_results),
        live_or_empty(provider, locality),
    );

    let merged = merge_with_fallback(&store, &live, || {
        // Only reached with an empty merge.
        feed.transition(FeedPhase::Merged);
        feed.transition(FeedPhase::RetryingFallback);
        tracing::info!(region, locality, "empty feed, retrying live provider");
        live_or_empty(provider, locality)
    })
    .await;

    feed.fallback_used = merged.fallback_used;
    feed.merged(merged.items);
    feed
}

/// aggregate_region
///
/// Runs `aggregate` for every locality concurrently. Each locality is independent: one
/// failing provider call only empties that locality's feed. Output follows input order.
pub async fn aggregate_region<P>(
    provider: &P,
    region: &str,
    localities: &[&str],
    max_results: u32,
) -> Vec<LocalityFeed>
where
    P: ContentProvider + ?Sized,
{
    join_all(
        localities
            .iter()
            .map(|locality| aggregate(provider, region, locality, max_results)),
    )
    .await
}
