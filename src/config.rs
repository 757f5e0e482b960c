use std::env;

/// AppConfig
///
/// Holds the gateway's configuration: where the upstream collaborators live and how the
/// session cookies are issued. Loaded once at startup and shared through `AppState`
/// (pulled into handlers via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls cookie hardening and log format.
    pub env: Env,
    // Application backend (sign-in, user fetch, account deletion).
    pub api_base_url: String,
    // Base for both the persisted-store shorts endpoint and the live provider endpoint.
    pub content_base_url: String,
    // Base for the `/weather/current` endpoint.
    pub weather_base_url: String,
    // Value sent as `maxResults` on persisted-store fetches.
    pub shorts_max_results: u32,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context. `Production` requires every upstream URL to be set explicitly
/// and marks session cookies `Secure`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_API_BASE: &str = "http://localhost:8080/api";
const LOCAL_CONTENT_BASE: &str = "http://localhost:8080/api/youtube";
const LOCAL_WEATHER_BASE: &str = "http://localhost:8080";
const DEFAULT_MAX_RESULTS: u32 = 10;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// Non-panicking configuration for test scaffolding. Upstream URLs point at
    /// localhost; tests swap the services for mocks anyway.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE.to_string(),
            content_base_url: LOCAL_CONTENT_BASE.to_string(),
            weather_base_url: LOCAL_WEATHER_BASE.to_string(),
            shorts_max_results: DEFAULT_MAX_RESULTS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// In production, panics if any upstream base URL is missing. The gateway is useless
    /// without its collaborators, so it refuses to start half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let shorts_max_results = env::var("SHORTS_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RESULTS);
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                api_base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| LOCAL_API_BASE.to_string()),
                content_base_url: env::var("CONTENT_BASE_URL")
                    .unwrap_or_else(|_| LOCAL_CONTENT_BASE.to_string()),
                weather_base_url: env::var("WEATHER_BASE_URL")
                    .unwrap_or_else(|_| LOCAL_WEATHER_BASE.to_string()),
                shorts_max_results,
                bind_addr,
            },
            Env::Production => Self {
                env: Env::Production,
                api_base_url: env::var("API_BASE_URL")
                    .expect("FATAL: API_BASE_URL required in production"),
                content_base_url: env::var("CONTENT_BASE_URL")
                    .expect("FATAL: CONTENT_BASE_URL required in production"),
                weather_base_url: env::var("WEATHER_BASE_URL")
                    .expect("FATAL: WEATHER_BASE_URL required in production"),
                shorts_max_results,
                bind_addr,
            },
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
