use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Gated Router Module
///
/// Every route here is wrapped in `gate::require_session` by `create_router`. Handlers
/// additionally take `ActiveSession` to get at the credential they forward upstream.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // Profile of the signed-in user, fetched from the backend with the session's bearer token.
        // DELETE /me
        // Deletes the account upstream, then destroys the session cookies.
        .route("/me", get(handlers::get_me).delete(handlers::delete_me))
}
