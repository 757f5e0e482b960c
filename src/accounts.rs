use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{UpstreamError, ensure_success};
use crate::models::{SignInRequest, UserProfile};
use crate::session::Session;

/// AccountService
///
/// The application backend's session endpoints. Each call is a stateless request/response
/// pair; calls on behalf of a user carry the session as a bearer header.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn sign_in(&self, request: &SignInRequest) -> Result<Session, UpstreamError>;
    async fn fetch_user(&self, session: &Session) -> Result<UserProfile, UpstreamError>;
    async fn delete_account(&self, session: &Session) -> Result<(), UpstreamError>;
}

pub type AccountState = Arc<dyn AccountService>;

/// Body of a successful `POST /auth/login`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    token: String,
    user_id: String,
}

/// HttpAccountClient
///
/// `AccountService` against the application backend: `POST /auth/login` for sign-in,
/// `GET`/`DELETE /users/me` with the session's bearer header for the rest.
#[derive(Clone)]
pub struct HttpAccountClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAccountClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AccountService for HttpAccountClient {
    async fn sign_in(&self, request: &SignInRequest) -> Result<Session, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(request)
            .send()
            .await?;

        let body = ensure_success(response)?.json::<SignInResponse>().await?;
        Ok(Session::new(body.token, body.user_id))
    }

    async fn fetch_user(&self, session: &Session) -> Result<UserProfile, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/users/me", self.base_url))
            .header(reqwest::header::AUTHORIZATION, session.bearer())
            .send()
            .await?;

        Ok(ensure_success(response)?.json::<UserProfile>().await?)
    }

    async fn delete_account(&self, session: &Session) -> Result<(), UpstreamError> {
        let response = self
            .client
            .delete(format!("{}/users/me", self.base_url))
            .header(reqwest::header::AUTHORIZATION, session.bearer())
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }
}

/// MockAccountService
///
/// Accepts exactly one email/password pair and issues a fixed session for it.
/// Any bearer token other than the issued one is answered with 401.
#[derive(Clone)]
pub struct MockAccountService {
    pub email: String,
    pub password: String,
    pub session: Session,
    /// When set, every call fails with this status (backend outage).
    pub fail_with: Option<u16>,
}

impl MockAccountService {
    pub fn new(email: &str, password: &str, session: Session) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            session,
            fail_with: None,
        }
    }

    pub fn new_failing(status: u16) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            session: Session::new("", ""),
            fail_with: Some(status),
        }
    }

    fn check(&self, session: &Session) -> Result<(), UpstreamError> {
        if let Some(status) = self.fail_with {
            return Err(UpstreamError::Status(status));
        }
        if session.token != self.session.token {
            return Err(UpstreamError::Status(401));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn sign_in(&self, request: &SignInRequest) -> Result<Session, UpstreamError> {
        if let Some(status) = self.fail_with {
            return Err(UpstreamError::Status(status));
        }
        if request.email == self.email && request.password == self.password {
            Ok(self.session.clone())
        } else {
            Err(UpstreamError::Status(401))
        }
    }

    async fn fetch_user(&self, session: &Session) -> Result<UserProfile, UpstreamError> {
        self.check(session)?;
        Ok(UserProfile {
            user_id: self.session.user_id.clone(),
            email: self.email.clone(),
            nickname: None,
            role: Some("user".to_string()),
        })
    }

    async fn delete_account(&self, session: &Session) -> Result<(), UpstreamError> {
        self.check(session)
    }
}
