//! HTTP client for the Second Brain backend.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    NewNote, NewResource, NewStudySession, NewTask, NewUser, Note, Resource, Stats, StudySession,
    Task, Token, User,
};

/// Client for the backend's REST API.
///
/// Credentials live on the value itself: an unauthenticated client can
/// only reach `/`, `/token` and `/users/`. [`ApiClient::with_token`] returns
/// an authenticated copy that shares the connection pool.
///
/// ```ignore
/// let client = ApiClient::new(&ApiConfig::from_env())?;
/// let token = client.login("me@example.com", "secret").await?;
/// let client = client.with_token(token.access_token);
/// let tasks = client.list_tasks().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("secondbrain/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// A copy of this client that sends `token` as a bearer credential.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(method = %method, path, "Backend request");
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = send(self.authed(Method::GET, path)?).await?;
        Ok(resp.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = send(self.authed(method, path)?.json(body)).await?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        send(self.authed(Method::DELETE, path)?).await?;
        Ok(())
    }

    // ========== Auth ==========

    /// `GET /`, reachable without a token.
    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        let resp = send(self.request(Method::GET, "/")).await?;
        Ok(resp.json().await?)
    }

    /// Exchange username (email) and password for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let form = [("username", username), ("password", password)];
        let resp = send(self.request(Method::POST, "/token").form(&form)).await?;
        Ok(resp.json().await?)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = NewUser {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = send(self.request(Method::POST, "/users/").json(&body)).await?;
        Ok(resp.json().await?)
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/users/me/").await
    }

    // ========== Tasks ==========

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_json("/tasks/").await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.send_json(Method::POST, "/tasks/", task).await
    }

    pub async fn update_task(&self, id: i64, task: &NewTask) -> Result<Task, ApiError> {
        self.send_json(Method::PUT, &format!("/tasks/{id}"), task).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{id}")).await
    }

    // ========== Notes ==========

    pub async fn list_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.get_json("/notes/").await
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        self.send_json(Method::POST, "/notes/", note).await
    }

    pub async fn update_note(&self, id: i64, note: &NewNote) -> Result<Note, ApiError> {
        self.send_json(Method::PUT, &format!("/notes/{id}"), note).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/notes/{id}")).await
    }

    // ========== Resources ==========

    pub async fn list_resources(&self) -> Result<Vec<Resource>, ApiError> {
        self.get_json("/resources/").await
    }

    pub async fn create_resource(&self, resource: &NewResource) -> Result<Resource, ApiError> {
        self.send_json(Method::POST, "/resources/", resource).await
    }

    pub async fn delete_resource(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/resources/{id}")).await
    }

    // ========== Study sessions ==========

    pub async fn list_study_sessions(&self) -> Result<Vec<StudySession>, ApiError> {
        self.get_json("/study-sessions/").await
    }

    pub async fn create_study_session(
        &self,
        session: &NewStudySession,
    ) -> Result<StudySession, ApiError> {
        self.send_json(Method::POST, "/study-sessions/", session).await
    }

    pub async fn update_study_session(
        &self,
        id: i64,
        session: &NewStudySession,
    ) -> Result<StudySession, ApiError> {
        self.send_json(Method::PUT, &format!("/study-sessions/{id}"), session)
            .await
    }

    pub async fn delete_study_session(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/study-sessions/{id}")).await
    }

    // ========== Stats ==========

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_json("/stats/").await
    }
}

/// Send a request and turn non-success statuses into [`ApiError::Status`].
async fn send(req: RequestBuilder) -> Result<Response, ApiError> {
    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), detail = %detail, "Backend request failed");

    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

/// Extract FastAPI's `{"detail": ...}` message, or the raw body.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}
