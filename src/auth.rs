//! Identity operations against the backend's auth endpoints (`/auth/v1`).
//!
//! Everything delegates to the backend's identity provider. No session state,
//! token storage, or refresh logic lives here: credential operations return
//! the session to the caller, and authenticated calls take the access token
//! as an argument.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ConnectClient;
use crate::error::{ConnectError, Result};
use crate::models::UserType;

/// Authenticated identity as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Session issued on successful credential sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// Registration parameters. `name` and `user_type` travel as profile metadata;
/// `email_redirect_to` is the post-confirmation redirect target.
#[derive(Debug, Clone)]
pub struct SignUpParams {
    pub email: String,
    pub password: String,
    pub name: String,
    pub user_type: UserType,
    pub email_redirect_to: Option<String>,
}

/// Outcome of a registration call. `session` is present only when the project
/// auto-confirms accounts; otherwise the user must confirm by email first.
#[derive(Debug, Clone)]
pub struct SignUpResponse {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpRaw {
    Session(AuthSession),
    User(AuthUser),
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    name: &'a str,
    user_type: UserType,
}

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl ConnectClient {
    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    /// Register a new account carrying profile metadata.
    ///
    /// POST /auth/v1/signup
    pub async fn sign_up(&self, params: &SignUpParams) -> Result<SignUpResponse> {
        let body = SignUpBody {
            email: &params.email,
            password: &params.password,
            data: SignUpMetadata {
                name: &params.name,
                user_type: params.user_type,
            },
        };

        let mut request = self
            .client
            .post(self.auth_url("signup"))
            .headers(self.auth_headers()?)
            .json(&body);
        if let Some(target) = params.email_redirect_to.as_deref() {
            request = request.query(&[("redirect_to", target)]);
        }
        let response = request.send().await?;

        let raw: SignUpRaw = Self::parse_response(response).await?;
        Ok(match raw {
            SignUpRaw::Session(session) => SignUpResponse {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpRaw::User(user) => SignUpResponse {
                user,
                session: None,
            },
        })
    }

    /// Authenticate by email and password.
    ///
    /// POST /auth/v1/token?grant_type=password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .headers(self.auth_headers()?)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrantBody { email, password })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Build the third-party OAuth redirect URL for Google sign-in. The
    /// caller opens it in the user agent; the OAuth round-trip completes
    /// there, outside this layer.
    ///
    /// GET /auth/v1/authorize?provider=google
    pub fn sign_in_with_google(&self, redirect_to: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&self.auth_url("authorize"))
            .map_err(|_| ConnectError::invalid_request("Invalid base URL"))?;
        url.query_pairs_mut().append_pair("provider", "google");
        if let Some(target) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", target);
        }
        Ok(url.to_string())
    }

    /// End the session behind the given access token.
    ///
    /// POST /auth/v1/logout
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .headers(self.headers(token)?)
            .send()
            .await?;
        Self::parse_empty_response(response).await
    }

    /// The identity behind the given access token, or `None` when the token
    /// carries no authenticated session (expired or revoked).
    ///
    /// GET /auth/v1/user
    pub async fn get_current_user(&self, token: &str) -> Result<Option<AuthUser>> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .headers(self.headers(token)?)
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }
}
