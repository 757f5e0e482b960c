use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;
use tripfeed_gateway::{
    AppConfig, AppState, MockAccountService, MockContentProvider, MockWeatherService,
    create_router,
    models::{LocalityPageResponse, LoginPageResponse, RegionFeedResponse, RegionSummary, UserProfile, WeatherSummary},
    providers::LiveItem,
    session::Session,
    weather::FALLBACK_ICON,
};

const EMAIL: &str = "traveler@example.com";
const PASSWORD: &str = "hunter2";

// --- Test Scaffolding ---

fn accounts() -> MockAccountService {
    MockAccountService::new(EMAIL, PASSWORD, Session::new("tok-1", "user-1"))
}

fn app_with(
    content: MockContentProvider,
    weather: MockWeatherService,
    accounts: MockAccountService,
) -> axum::Router {
    let state = AppState {
        content: Arc::new(content),
        weather: Arc::new(weather),
        accounts: Arc::new(accounts),
        config: AppConfig::default(),
    };
    create_router(state)
}

fn app() -> axum::Router {
    app_with(
        MockContentProvider::new(),
        MockWeatherService::new(21.5, "Clear"),
        accounts(),
    )
}

async fn send(app: axum::Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

// --- Public Routes ---

#[tokio::test]
async fn test_health_check() {
    let response = send(app(), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let response = send(app(), get("/health")).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_list_regions() {
    let response = send(app(), get("/regions")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let regions: Vec<RegionSummary> = json_body(response).await;
    let gangwon = regions.iter().find(|r| r.region == "Gangwon").unwrap();
    assert_eq!(gangwon.localities, vec!["Chuncheon", "Gangneung", "Sokcho"]);
}

#[tokio::test]
async fn test_region_feed_merges_each_locality() {
    let content = MockContentProvider::new()
        .with_store("Chuncheon", vec![json!({ "youtube_video_id": "abc", "video_title": "X" })])
        .with_live("Chuncheon", vec![LiveItem::new("l1", "Lake", "", "")])
        .with_store_failure("Gangneung", 500)
        .with_live("Gangneung", vec![LiveItem::new("g1", "Coast", "", "")])
        .with_live("Sokcho", vec![])
        .with_live("Sokcho", vec![LiveItem::new("retry", "Port", "", "")]);

    let response = send(
        app_with(content, MockWeatherService::default(), accounts()),
        get("/regions/Gangwon"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: RegionFeedResponse = json_body(response).await;
    assert_eq!(body.region, "Gangwon");
    assert_eq!(body.localities.len(), 3);

    let chuncheon = &body.localities[0];
    assert_eq!(chuncheon.locality, "Chuncheon");
    assert!(!chuncheon.loading);
    assert_eq!(chuncheon.items[0].id, "abc");
    assert_eq!(chuncheon.items[0].title, "X");
    assert_eq!(chuncheon.items[1].id, "l1");

    let gangneung = &body.localities[1];
    assert_eq!(gangneung.items.len(), 1);
    assert!(!gangneung.fallback_used);

    let sokcho = &body.localities[2];
    assert!(sokcho.fallback_used);
    assert_eq!(sokcho.items[0].id, "retry");
}

#[tokio::test]
async fn test_unknown_region_is_not_found() {
    let response = send(app(), get("/regions/Atlantis")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_locality_page_includes_weather() {
    let content = MockContentProvider::new().with_live("Seogwipo", vec![LiveItem::new("j1", "Falls", "", "")]);
    let response = send(
        app_with(content, MockWeatherService::new(18.0, "Rain"), accounts()),
        get("/regions/Jeju/Seogwipo"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: LocalityPageResponse = json_body(response).await;
    assert_eq!(page.feed.items.len(), 1);
    let weather = page.weather.unwrap();
    assert_eq!(weather.temperature, Some(18.0));
    assert_eq!(weather.icon, "🌧️");
}

#[tokio::test]
async fn test_locality_page_without_coordinates_has_no_weather() {
    let response = send(app(), get("/regions/Jeju/Udo")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: LocalityPageResponse = json_body(response).await;
    assert!(page.weather.is_none());
    assert_eq!(page.feed.locality, "Udo");
}

#[tokio::test]
async fn test_weather_maps_condition_to_icon() {
    let response = send(app(), get("/weather?region=Seoul&locality=Jongno")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary: WeatherSummary = json_body(response).await;
    assert_eq!(summary.condition.as_deref(), Some("Clear"));
    assert_eq!(summary.icon, "☀️");
}

#[tokio::test]
async fn test_weather_unrecognized_condition_gets_fallback_icon() {
    let app = app_with(
        MockContentProvider::new(),
        MockWeatherService::new(3.0, "Volcanic Ash"),
        accounts(),
    );
    let summary: WeatherSummary = json_body(send(app, get("/weather?region=Seoul&locality=Mapo")).await).await;
    assert_eq!(summary.icon, FALLBACK_ICON);
}

#[tokio::test]
async fn test_weather_failure_degrades_to_fallback_icon() {
    let app = app_with(
        MockContentProvider::new(),
        MockWeatherService::new_failing(),
        accounts(),
    );
    let response = send(app, get("/weather?region=Seoul&locality=Mapo")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary: WeatherSummary = json_body(response).await;
    assert_eq!(summary.temperature, None);
    assert_eq!(summary.icon, FALLBACK_ICON);
}

#[tokio::test]
async fn test_weather_unknown_locality_is_not_found() {
    let response = send(app(), get("/weather?region=Seoul&locality=Nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Session Gate ---

#[tokio::test]
async fn test_gated_route_redirects_without_session() {
    let response = send(app(), get("/me")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fme");
}

#[tokio::test]
async fn test_gated_route_redirects_with_empty_token() {
    let request = Request::builder()
        .uri("/me")
        .header(header::COOKIE, "token=; user_id=user-1")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_gated_route_renders_with_session() {
    let request = Request::builder()
        .uri("/me")
        .header(header::COOKIE, "token=tok-1; user_id=user-1")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile: UserProfile = json_body(response).await;
    assert_eq!(profile.user_id, "user-1");
    assert_eq!(profile.email, EMAIL);
}

#[tokio::test]
async fn test_gate_lets_unknown_token_through_to_backend() {
    // The gate does not validate; the backend does, and its rejection is reported inline.
    let request = Request::builder()
        .uri("/me")
        .header(header::COOKIE, "token=stale; user_id=user-1")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// --- Sign-in / Sign-out ---

fn sign_in_request(uri: &str, email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_login_page_reports_intent() {
    let response = send(app(), get("/login?next=%2Fme")).await;
    let page: LoginPageResponse = json_body(response).await;
    assert_eq!(page.next.as_deref(), Some("/me"));
    assert!(!page.signed_in);
}

#[tokio::test]
async fn test_sign_in_sets_session_and_resumes_intent() {
    let response = send(app(), sign_in_request("/login?next=%2Fme", EMAIL, PASSWORD)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/me");

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("token=tok-1")));
    assert!(cookies.iter().any(|c| c.starts_with("user_id=user-1")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
}

#[tokio::test]
async fn test_sign_in_without_intent_goes_home() {
    let response = send(app(), sign_in_request("/login", EMAIL, PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_sign_in_ignores_foreign_intent() {
    let response = send(
        app(),
        sign_in_request("/login?next=https%3A%2F%2Fevil.example", EMAIL, PASSWORD),
    )
    .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_sign_in_ignores_intent_with_control_characters() {
    let tab = send(
        app(),
        sign_in_request("/login?next=%2F%09%2Fevil.example", EMAIL, PASSWORD),
    )
    .await;
    assert_eq!(tab.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&tab), "/");

    let newline = send(
        app(),
        sign_in_request("/login?next=%2F%0A%2Fevil.example", EMAIL, PASSWORD),
    )
    .await;
    assert_eq!(newline.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&newline), "/");
}

#[tokio::test]
async fn test_sign_in_with_bad_password_reports_inline_message() {
    let response = send(app(), sign_in_request("/login?next=%2Fme", EMAIL, "wrong")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["message"], "email or password is incorrect");
}

#[tokio::test]
async fn test_sign_in_backend_outage_is_bad_gateway() {
    let app = app_with(
        MockContentProvider::new(),
        MockWeatherService::default(),
        MockAccountService::new_failing(500),
    );
    let response = send(app, sign_in_request("/login", EMAIL, PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_sign_out_clears_cookies() {
    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::COOKIE, "token=tok-1; user_id=user-1")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("token=;")));
    assert!(cookies.iter().any(|c| c.starts_with("user_id=;")));
}

#[tokio::test]
async fn test_delete_account_clears_session() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/me")
        .header(header::COOKIE, "token=tok-1; user_id=user-1")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("token=;")));
}

#[tokio::test]
async fn test_delete_account_requires_session() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/me")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
