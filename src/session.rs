use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const TOKEN_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "user_id";

/// Session
///
/// An opaque bearer credential plus the identifier of the user it belongs to.
/// The gateway never inspects the token; it only forwards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    /// A stored credential counts only when it is non-empty. There is no expiry check.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// SessionStorage
///
/// The session context handed to whoever needs the current session. Reads return the
/// raw stored value; deciding whether it is usable is up to the caller (see `gate`).
pub trait SessionStorage {
    fn get(&self) -> Option<Session>;
    fn set(&mut self, session: Session);
    fn clear(&mut self);
}

/// CookieSession
///
/// Session storage backed by the client's cookie jar. Changes are only visible to the
/// client once the jar is returned as part of the response (`into_jar`).
#[derive(Debug, Clone)]
pub struct CookieSession {
    jar: CookieJar,
    secure: bool,
}

impl CookieSession {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

impl SessionStorage for CookieSession {
    fn get(&self) -> Option<Session> {
        let token = self.jar.get(TOKEN_COOKIE)?.value().to_string();
        let user_id = self
            .jar
            .get(USER_ID_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap_or_default();
        Some(Session { token, user_id })
    }

    fn set(&mut self, session: Session) {
        let token = self.cookie(TOKEN_COOKIE, session.token);
        let user_id = self.cookie(USER_ID_COOKIE, session.user_id);
        self.jar = self.jar.clone().add(token).add(user_id);
    }

    fn clear(&mut self) {
        // Removal cookies must carry the same path the session cookies were set with.
        self.jar = self
            .jar
            .clone()
            .remove(Cookie::build(TOKEN_COOKIE).path("/"))
            .remove(Cookie::build(USER_ID_COOKIE).path("/"));
    }
}

/// MemorySession
///
/// In-process session holder for callers that are not behind HTTP, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    session: Option<Session>,
}

impl MemorySession {
    pub fn with(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }
}

impl SessionStorage for MemorySession {
    fn get(&self) -> Option<Session> {
        self.session.clone()
    }

    fn set(&mut self, session: Session) {
        self.session = Some(session);
    }

    fn clear(&mut self) {
        self.session = None;
    }
}
