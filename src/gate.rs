use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{Uri, request::Parts},
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use reqwest::Url;

use crate::session::{CookieSession, Session, SessionStorage};

pub const LOGIN_PATH: &str = "/login";
const HOME_PATH: &str = "/";

/// NavigationIntent
///
/// The path (including its query) a visitor tried to reach before signing in.
/// Carried on the redirect to the login route and consumed once after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub path: String,
}

/// GateDecision
///
/// Outcome of checking a navigation target against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Render(Session),
    Redirect(NavigationIntent),
}

/// decide
///
/// Pure gate check. A session whose credential is missing or empty sends the visitor to
/// the login route with the requested path as resumable intent. Any other session is let
/// through as-is: the credential's authenticity and expiry are never checked here.
pub fn decide(requested: &str, session: Option<Session>) -> GateDecision {
    match session.filter(Session::is_authenticated) {
        Some(session) => GateDecision::Render(session),
        None => GateDecision::Redirect(NavigationIntent {
            path: requested.to_string(),
        }),
    }
}

/// login_location
///
/// Builds `/login?next=<intent>`, with the intent form-urlencoded.
pub fn login_location(intent: &NavigationIntent) -> String {
    // Url is only used as an encoder here; the host part is thrown away.
    Url::parse_with_params("http://gateway.local/login", &[("next", intent.path.as_str())])
        .ok()
        .and_then(|url| url.query().map(|q| format!("{}?{}", LOGIN_PATH, q)))
        .unwrap_or_else(|| LOGIN_PATH.to_string())
}

/// resume_target
///
/// Where to send the visitor after a successful sign-in. Only local absolute paths are
/// honoured so the login form cannot be turned into an open redirect.
pub fn resume_target(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => HOME_PATH.to_string(),
    }
}

// Browsers drop tabs and newlines while parsing a URL, so "/\t/host" would still
// resolve to another origin.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_control() || c.is_whitespace())
}

fn requested_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// ActiveSession
///
/// Extractor for gated handlers. Resolves the session from the cookie jar and runs it
/// through `decide`; a missing session rejects with a 303 to the login route.
#[derive(Debug, Clone)]
pub struct ActiveSession(pub Session);

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Prefer the URI as the client sent it; nested routers strip their prefix.
        let requested = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => requested_path(uri),
            None => requested_path(&parts.uri),
        };

        let jar = CookieJar::from_headers(&parts.headers);
        let session = CookieSession::new(jar, false).get();

        match decide(&requested, session) {
            GateDecision::Render(session) => Ok(ActiveSession(session)),
            GateDecision::Redirect(intent) => {
                tracing::debug!(intent = %intent.path, "no session, redirecting to login");
                Err(Redirect::to(&login_location(&intent)))
            }
        }
    }
}

/// require_session
///
/// Route layer for the gated router. Extracting `ActiveSession` is the whole check:
/// if it rejects, the handler never runs.
pub async fn require_session(_session: ActiveSession, request: Request, next: Next) -> Response {
    next.run(request).await
}
