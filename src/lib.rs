use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use std::sync::Arc;
use tracing::{Level, Span};

// --- Module Structure ---

// Session context and the gate in front of protected routes.
pub mod gate;
pub mod session;

// Content aggregation and the upstream collaborators it talks to.
pub mod accounts;
pub mod content;
pub mod locality;
pub mod providers;
pub mod weather;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// Public vs. gated routing.
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use accounts::{AccountState, HttpAccountClient, MockAccountService};
pub use config::AppConfig;
pub use providers::{ContentState, HttpContentProvider, MockContentProvider};
pub use weather::{HttpWeatherClient, MockWeatherService, WeatherState};

/// ApiDoc
///
/// OpenAPI document for every gateway route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_regions, handlers::get_region_feed, handlers::get_locality_page,
        handlers::get_weather, handlers::login_page, handlers::sign_in, handlers::sign_out,
        handlers::get_me, handlers::delete_me
    ),
    components(
        schemas(
            models::ContentItem, models::LocalityFeedResponse, models::RegionFeedResponse,
            models::RegionSummary, models::WeatherSummary, models::LocalityPageResponse,
            models::SignInRequest, models::LoginPageResponse, models::UserProfile,
        )
    ),
    tags(
        (name = "tripfeed", description = "Travel feed gateway API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a handler may need, shared across requests. Upstream collaborators sit
/// behind traits so tests can swap in the mock services.
#[derive(Clone)]
pub struct AppState {
    /// Persisted-store and live short-video sources.
    pub content: ContentState,
    /// Current-conditions source for the weather widget.
    pub weather: WeatherState,
    /// Application backend session endpoints.
    pub accounts: AccountState,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the real HTTP clients from configuration, sharing one connection pool.
    pub fn from_config(config: AppConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            content: Arc::new(HttpContentProvider::new(
                client.clone(),
                &config.content_base_url,
            )),
            weather: Arc::new(HttpWeatherClient::new(
                client.clone(),
                &config.weather_base_url,
            )),
            accounts: Arc::new(HttpAccountClient::new(client, &config.api_base_url)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets handlers that only need configuration take `State<AppConfig>`.
impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree: public routes, gated routes behind `require_session`,
/// API docs, then request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Gated routes: no handler runs without a stored credential.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn(gate::require_session)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, tagged with the `x-request-id` set by `SetRequestIdLayer`
/// so all log lines of one request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
