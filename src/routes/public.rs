use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints available to anonymous visitors. Content and weather endpoints degrade
/// to empty results on upstream failure instead of erroring.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /regions
        // The static region table and each region's localities.
        .route("/regions", get(handlers::list_regions))
        // GET /regions/{region}
        // Merged store + live feeds for every locality of the region, fetched concurrently.
        .route("/regions/{region}", get(handlers::get_region_feed))
        // GET /regions/{region}/{locality}
        // One locality's feed together with its current weather.
        .route(
            "/regions/{region}/{locality}",
            get(handlers::get_locality_page),
        )
        // GET /weather?region=&locality=
        .route("/weather", get(handlers::get_weather))
        // GET/POST /login?next=...
        // GET reports the pending intent; POST signs in and resumes it.
        .route("/login", get(handlers::login_page).post(handlers::sign_in))
        // POST /logout
        .route("/logout", post(handlers::sign_out))
}
