use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{UpstreamError, ensure_success};
use crate::locality::Coordinates;
use crate::models::WeatherSummary;

/// Shown when the condition is missing or not in the table.
pub const FALLBACK_ICON: &str = "🌈";

const ICONS: &[(&str, &str)] = &[
    ("Clear", "☀️"),
    ("Clouds", "☁️"),
    ("Rain", "🌧️"),
    ("Drizzle", "🌦️"),
    ("Thunderstorm", "⛈️"),
    ("Snow", "❄️"),
    ("Mist", "🌫️"),
    ("Fog", "🌫️"),
    ("Haze", "🌫️"),
    ("Smoke", "🌫️"),
    ("Dust", "🌪️"),
    ("Sand", "🌪️"),
    ("Tornado", "🌪️"),
];

/// icon_for
///
/// Display glyph for a condition name such as `Clear` or `Rain`. Unknown or missing
/// conditions get the fallback glyph.
pub fn icon_for(condition: Option<&str>) -> &'static str {
    condition
        .and_then(|c| ICONS.iter().find(|(name, _)| *name == c))
        .map(|(_, icon)| *icon)
        .unwrap_or(FALLBACK_ICON)
}

/// CurrentWeather
///
/// Body of `GET /weather/current`: `{ main: { temp }, weather: [{ main }] }`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct CurrentWeather {
    #[serde(default)]
    pub main: Option<MainReading>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct MainReading {
    #[serde(default)]
    pub temp: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Condition {
    #[serde(default)]
    pub main: Option<String>,
}

impl From<CurrentWeather> for WeatherSummary {
    fn from(current: CurrentWeather) -> Self {
        let condition = current.weather.into_iter().next().and_then(|w| w.main);
        WeatherSummary {
            temperature: current.main.and_then(|m| m.temp),
            icon: icon_for(condition.as_deref()).to_string(),
            condition,
        }
    }
}

/// WeatherProvider
///
/// Current conditions at a point. The real client calls the weather backend; tests use
/// `MockWeatherService`.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, UpstreamError>;
}

pub type WeatherState = Arc<dyn WeatherProvider>;

/// Fetches current conditions and maps them for display. Failures degrade to `None`.
pub async fn summary<P>(provider: &P, at: Coordinates) -> Option<WeatherSummary>
where
    P: WeatherProvider + ?Sized,
{
    match provider.current(at).await {
        Ok(current) => Some(current.into()),
        Err(e) => {
            tracing::warn!(lat = at.lat, lon = at.lon, "weather fetch failed: {}", e);
            None
        }
    }
}

/// HttpWeatherClient
///
/// `WeatherProvider` over `GET {base}/weather/current?lat=&lon=`.
#[derive(Clone)]
pub struct HttpWeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWeatherClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherClient {
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/weather/current", self.base_url))
            .query(&[("lat", at.lat), ("lon", at.lon)])
            .send()
            .await?;

        Ok(ensure_success(response)?.json::<CurrentWeather>().await?)
    }
}

/// MockWeatherService
///
/// Answers every request with the same reading, or fails with the given status.
#[derive(Clone, Default)]
pub struct MockWeatherService {
    pub reading: Option<(f64, String)>,
    pub fail_with: Option<u16>,
}

impl MockWeatherService {
    pub fn new(temp: f64, condition: &str) -> Self {
        Self {
            reading: Some((temp, condition.to_string())),
            fail_with: None,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            reading: None,
            fail_with: Some(503),
        }
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherService {
    async fn current(&self, _at: Coordinates) -> Result<CurrentWeather, UpstreamError> {
        if let Some(status) = self.fail_with {
            return Err(UpstreamError::Status(status));
        }
        Ok(match &self.reading {
            Some((temp, condition)) => CurrentWeather {
                main: Some(MainReading { temp: Some(*temp) }),
                weather: vec![Condition {
                    main: Some(condition.clone()),
                }],
            },
            None => CurrentWeather::default(),
        })
    }
}
