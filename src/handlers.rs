use crate::{
    AppConfig, AppState,
    content::{aggregate, aggregate_region},
    error::{AuthError, UpstreamError},
    gate::{ActiveSession, resume_target},
    locality::{self, LocalityQuery},
    models::{
        LocalityFeedResponse, LocalityPageResponse, LoginPageResponse, RegionFeedResponse,
        RegionSummary, SignInRequest, UserProfile, WeatherSummary,
    },
    session::{CookieSession, SessionStorage},
    weather::{self, FALLBACK_ICON},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

/// NextParam
///
/// The resumable navigation intent carried on the login route.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextParam {
    /// Path the visitor tried to reach before being sent to sign in.
    pub next: Option<String>,
}

// --- Content ---

/// list_regions
///
/// [Public Route] The fixed region table with each region's localities.
#[utoipa::path(
    get,
    path = "/regions",
    responses((status = 200, description = "Regions", body = [RegionSummary]))
)]
pub async fn list_regions() -> Json<Vec<RegionSummary>> {
    let regions = locality::regions()
        .map(|region| RegionSummary {
            region: region.to_string(),
            localities: locality::localities_of(region)
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();
    Json(regions)
}

/// get_region_feed
///
/// [Public Route] Aggregated short-video feeds for every locality of a region.
/// Provider failures never fail the request; they only empty the affected locality.
#[utoipa::path(
    get,
    path = "/regions/{region}",
    params(("region" = String, Path, description = "Region name")),
    responses(
        (status = 200, description = "Feeds per locality", body = RegionFeedResponse),
        (status = 404, description = "Unknown region")
    )
)]
pub async fn get_region_feed(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<RegionFeedResponse>, StatusCode> {
    let localities = locality::localities_of(&region).ok_or(StatusCode::NOT_FOUND)?;

    let feeds = aggregate_region(
        state.content.as_ref(),
        &region,
        &localities,
        state.config.shorts_max_results,
    )
    .await;

    Ok(Json(RegionFeedResponse {
        region,
        localities: feeds.into_iter().map(LocalityFeedResponse::from).collect(),
    }))
}

/// get_locality_page
///
/// [Public Route] One locality's merged feed plus its weather widget. The locality is
/// not validated: content is fetched by name, weather only when coordinates are known.
#[utoipa::path(
    get,
    path = "/regions/{region}/{locality}",
    params(
        ("region" = String, Path, description = "Region name"),
        ("locality" = String, Path, description = "Locality within the region")
    ),
    responses((status = 200, description = "Locality page", body = LocalityPageResponse))
)]
pub async fn get_locality_page(
    State(state): State<AppState>,
    Path((region, locality)): Path<(String, String)>,
) -> Json<LocalityPageResponse> {
    let query = LocalityQuery { region, locality };

    let widget = async {
        match locality::coordinates(&query) {
            Some(at) => weather::summary(state.weather.as_ref(), at).await,
            None => None,
        }
    };
    let feed = aggregate(
        state.content.as_ref(),
        &query.region,
        &query.locality,
        state.config.shorts_max_results,
    );

    let (feed, weather) = tokio::join!(feed, widget);

    Json(LocalityPageResponse {
        feed: feed.into(),
        weather,
    })
}

/// get_weather
///
/// [Public Route] Current weather for a locality from the static coordinate table.
/// A failed upstream call still answers 200 with the fallback glyph.
#[utoipa::path(
    get,
    path = "/weather",
    params(LocalityQuery),
    responses(
        (status = 200, description = "Current weather", body = WeatherSummary),
        (status = 404, description = "Locality not in the table")
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<LocalityQuery>,
) -> Result<Json<WeatherSummary>, StatusCode> {
    let at = locality::coordinates(&query).ok_or(StatusCode::NOT_FOUND)?;

    let summary = weather::summary(state.weather.as_ref(), at)
        .await
        .unwrap_or_else(|| WeatherSummary {
            temperature: None,
            condition: None,
            icon: FALLBACK_ICON.to_string(),
        });
    Ok(Json(summary))
}

// --- Session ---

/// login_page
///
/// [Public Route] Tells the sign-in screen which intent is pending and whether a
/// session is already present.
#[utoipa::path(
    get,
    path = "/login",
    params(NextParam),
    responses((status = 200, description = "Login page state", body = LoginPageResponse))
)]
pub async fn login_page(
    State(config): State<AppConfig>,
    jar: CookieJar,
    Query(params): Query<NextParam>,
) -> Json<LoginPageResponse> {
    let session = CookieSession::new(jar, config.secure_cookies());
    Json(LoginPageResponse {
        next: params.next,
        signed_in: session.get().is_some_and(|s| s.is_authenticated()),
    })
}

/// sign_in
///
/// [Public Route] Signs in against the application backend, stores the returned session
/// in the cookie jar and resumes the pending intent (or `/`).
#[utoipa::path(
    post,
    path = "/login",
    params(NextParam),
    request_body = SignInRequest,
    responses(
        (status = 303, description = "Signed in, redirected to the resumed path"),
        (status = 401, description = "Rejected credentials"),
        (status = 502, description = "Account service unavailable")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<NextParam>,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Redirect), AuthError> {
    let session = state.accounts.sign_in(&payload).await?;
    tracing::info!(user_id = %session.user_id, "signed in");

    let mut storage = CookieSession::new(jar, state.config.secure_cookies());
    storage.set(session);

    let target = resume_target(params.next.as_deref());
    Ok((storage.into_jar(), Redirect::to(&target)))
}

/// sign_out
///
/// [Public Route] Destroys the session. Succeeds whether or not one existed.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn sign_out(State(config): State<AppConfig>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut storage = CookieSession::new(jar, config.secure_cookies());
    storage.clear();
    (storage.into_jar(), StatusCode::NO_CONTENT)
}

fn session_error(err: UpstreamError) -> AuthError {
    match err {
        UpstreamError::Status(401) | UpstreamError::Status(403) => AuthError::SessionRejected,
        other => AuthError::Upstream(other),
    }
}

/// get_me
///
/// [Gated Route] The signed-in user as reported by the backend.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 303, description = "No session, redirected to /login")
    )
)]
pub async fn get_me(
    ActiveSession(session): ActiveSession,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = state
        .accounts
        .fetch_user(&session)
        .await
        .map_err(session_error)?;
    Ok(Json(profile))
}

/// delete_me
///
/// [Gated Route] Deletes the account upstream and destroys the local session.
#[utoipa::path(
    delete,
    path = "/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 303, description = "No session, redirected to /login")
    )
)]
pub async fn delete_me(
    ActiveSession(session): ActiveSession,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AuthError> {
    state
        .accounts
        .delete_account(&session)
        .await
        .map_err(session_error)?;
    tracing::info!(user_id = %session.user_id, "account deleted");

    let mut storage = CookieSession::new(jar, state.config.secure_cookies());
    storage.clear();
    Ok((storage.into_jar(), StatusCode::NO_CONTENT))
}
