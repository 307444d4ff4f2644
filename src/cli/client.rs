use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};

use super::CliError;
use crate::models::{Note, NoteChanges, UserSummary};
use crate::result::{ApiResult, Empty};
use crate::routes::auth::model::{LoginRequest, SignupRequest, SignupResponse, TokenResponse};
use crate::routes::health::HealthResponse;
use crate::routes::note::model::{CreateNoteRequest, NoteResponse, NotesResponse};
use crate::routes::user::model::{DeletedResponse, PasswordRequest, UserResponse};

/// Talks to a notebox server over its JSON API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn require_token(&self) -> Result<&str, CliError> {
        self.token.as_deref().ok_or(CliError::NotLoggedIn)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, CliError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ApiResult<Empty>>(&bytes) {
                Ok(err) => CliError::Api {
                    status: status.as_u16(),
                    code: err.code,
                    msg: err.msg,
                },
                Err(_) => CliError::Api {
                    status: status.as_u16(),
                    code: 0,
                    msg: String::from_utf8_lossy(&bytes).into_owned(),
                },
            });
        }

        let result: ApiResult<T> = serde_json::from_slice(&bytes)?;
        Ok(result.content)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        self.send::<Empty, T>(Method::GET, path, None).await
    }

    pub async fn health(&self) -> Result<HealthResponse, CliError> {
        self.get("/api/health").await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<UserSummary, CliError> {
        let resp: SignupResponse = self.send(Method::POST, "/auth/signup", Some(req)).await?;
        Ok(resp.user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, CliError> {
        let req = LoginRequest {
            username: Some(username.to_string()),
            email: None,
            password: password.to_string(),
        };
        let resp: TokenResponse = self.send(Method::POST, "/auth/login", Some(&req)).await?;
        Ok(resp.token)
    }

    pub async fn logout(&self) -> Result<(), CliError> {
        self.send::<Empty, Empty>(Method::POST, "/auth/logout", None)
            .await
            .map(|_| ())
    }

    pub async fn refresh(&self) -> Result<String, CliError> {
        self.require_token()?;
        let resp: TokenResponse = self
            .send::<Empty, _>(Method::POST, "/auth/refresh", None)
            .await?;
        Ok(resp.token)
    }

    pub async fn whoami(&self) -> Result<UserSummary, CliError> {
        self.require_token()?;
        let resp: UserResponse = self.get("/user/me").await?;
        Ok(resp.user)
    }

    pub async fn create_note(&self, title: Option<String>, content: &str) -> Result<Note, CliError> {
        self.require_token()?;
        let req = CreateNoteRequest {
            title,
            content: content.to_string(),
            archived: false,
        };
        let resp: NoteResponse = self.send(Method::POST, "/api/notes", Some(&req)).await?;
        Ok(resp.note)
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>, CliError> {
        self.require_token()?;
        let resp: NotesResponse = self.get("/api/notes").await?;
        Ok(resp.notes)
    }

    pub async fn get_note(&self, id: i64) -> Result<Note, CliError> {
        self.require_token()?;
        let resp: NoteResponse = self.get(&format!("/api/notes/{id}")).await?;
        Ok(resp.note)
    }

    pub async fn update_note(&self, id: i64, changes: &NoteChanges) -> Result<Note, CliError> {
        self.require_token()?;
        let resp: NoteResponse = self
            .send(Method::PUT, &format!("/api/notes/{id}"), Some(changes))
            .await?;
        Ok(resp.note)
    }

    pub async fn delete_note(&self, id: i64) -> Result<Note, CliError> {
        self.require_token()?;
        let resp: NoteResponse = self
            .send::<Empty, _>(Method::DELETE, &format!("/api/notes/{id}"), None)
            .await?;
        Ok(resp.note)
    }

    pub async fn delete_all_notes(&self, password: &str) -> Result<usize, CliError> {
        self.require_token()?;
        let req = PasswordRequest {
            password: password.to_string(),
        };
        let resp: DeletedResponse = self
            .send(Method::DELETE, "/api/notes", Some(&req))
            .await?;
        Ok(resp.deleted)
    }
}
