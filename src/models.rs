use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Content ---

/// ContentItem
///
/// A normalized short video, whichever provider it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
}

/// LocalityFeedResponse
///
/// Output schema for one locality's merged feed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LocalityFeedResponse {
    pub region: String,
    pub locality: String,
    /// True until the merge (including any fallback) has completed.
    pub loading: bool,
    /// Whether the single fallback fetch had to be issued.
    pub fallback_used: bool,
    pub items: Vec<ContentItem>,
    #[ts(type = "string")]
    pub fetched_at: DateTime<Utc>,
}

/// RegionFeedResponse
///
/// Output schema for GET /regions/{region}: one feed per locality, in table order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegionFeedResponse {
    pub region: String,
    pub localities: Vec<LocalityFeedResponse>,
}

/// RegionSummary
///
/// Entry of GET /regions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegionSummary {
    pub region: String,
    pub localities: Vec<String>,
}

// --- Weather ---

/// WeatherSummary
///
/// Current conditions for a locality, already mapped to a display glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WeatherSummary {
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub icon: String,
}

/// LocalityPageResponse
///
/// Everything the locality page shows: the merged feed plus the weather widget.
/// `weather` is null when the locality has no known coordinates or the fetch failed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LocalityPageResponse {
    pub feed: LocalityFeedResponse,
    pub weather: Option<WeatherSummary>,
}

// --- Accounts ---

/// SignInRequest
///
/// Credentials forwarded untouched to the application backend.
/// The password is never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// LoginPageResponse
///
/// Output schema for GET /login: the pending intent (if any) and whether a session is
/// already present.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageResponse {
    pub next: Option<String>,
    pub signed_in: bool,
}

/// UserProfile
///
/// The signed-in user as reported by the application backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
