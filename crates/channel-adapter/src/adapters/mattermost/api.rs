//! Mattermost REST API client.
//!
//! Handles session establishment, team/channel discovery, membership
//! lookups and message posting via the Mattermost v4 API.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ChannelAdapterError;
use crate::types::{DeliveryReceipt, OutboundMessage, TeamMember};

const MEMBERS_PAGE_SIZE: usize = 200;

/// Mattermost API client. Unauthenticated until a token is attached.
#[derive(Clone)]
pub struct MattermostApiClient {
    client: reqwest::Client,
    server_url: String,
    token: Option<String>,
}

/// A user record as returned by `/api/v4/users/*`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Request body for `PUT /api/v4/users/{id}/patch`.
#[derive(Debug, Serialize)]
pub struct UserPatch {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Request body for `POST /api/v4/channels`.
#[derive(Debug, Serialize)]
pub struct CreateChannelRequest {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub purpose: String,
    /// `O` for open, `P` for private.
    #[serde(rename = "type")]
    pub channel_type: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    login_id: &'a str,
    password: &'a str,
}

/// Team membership as returned by `/api/v4/teams/{id}/members`.
#[derive(Debug, Deserialize)]
struct TeamMemberRecord {
    user_id: String,
    #[serde(default)]
    roles: String,
    #[serde(default)]
    scheme_admin: Option<bool>,
}

impl From<TeamMemberRecord> for TeamMember {
    fn from(record: TeamMemberRecord) -> Self {
        let is_admin = record.scheme_admin.unwrap_or(false)
            || record.roles.split_whitespace().any(|r| r == "team_admin");
        TeamMember {
            user_id: record.user_id,
            is_admin,
        }
    }
}

/// Request body for `POST /api/v4/posts`.
#[derive(Debug, Serialize)]
struct CreatePostRequest {
    channel_id: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_id: Option<String>,
}

/// Response from `POST /api/v4/posts`.
#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    id: Option<String>,
    channel_id: Option<String>,
}

impl MattermostApiClient {
    pub fn new(server_url: &str) -> Result<Self, ChannelAdapterError> {
        if server_url.is_empty() {
            return Err(ChannelAdapterError::Config(
                "Mattermost server_url cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| ChannelAdapterError::Internal(format!("HTTP client init: {}", e)))?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a session or personal access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.server_url, path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a JSON body, mapping HTTP failures onto the error taxonomy.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ChannelAdapterError> {
        let resp = self.authed(builder).send().await.map_err(|e| {
            ChannelAdapterError::Connection(format!("Mattermost {} failed: {}", what, e))
        })?;

        let resp = check_status(resp, what).await?;
        resp.json::<T>().await.map_err(|e| {
            ChannelAdapterError::ParseError(format!("Mattermost {} parse: {}", what, e))
        })
    }

    /// Liveness check via `GET /api/v4/system/ping`. Returns the server version if advertised.
    pub async fn ping(&self) -> Result<Option<String>, ChannelAdapterError> {
        let resp = self
            .client
            .get(self.url("/system/ping"))
            .send()
            .await
            .map_err(|e| ChannelAdapterError::Connection(format!("Mattermost ping failed: {}", e)))?;
        let resp = check_status(resp, "ping").await?;

        Ok(resp
            .headers()
            .get("X-Version-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    /// Password login via `POST /api/v4/users/login`. Returns an authenticated client.
    pub async fn login(&self, login_id: &str, password: &str) -> Result<(Self, User), ChannelAdapterError> {
        let resp = self
            .client
            .post(self.url("/users/login"))
            .json(&LoginRequest { login_id, password })
            .send()
            .await
            .map_err(|e| ChannelAdapterError::Connection(format!("Mattermost login failed: {}", e)))?;

        let resp = check_status(resp, "login").await?;
        let token = resp
            .headers()
            .get("Token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ChannelAdapterError::Auth("login response carried no Token header".to_string()))?;

        let user: User = resp
            .json()
            .await
            .map_err(|e| ChannelAdapterError::ParseError(format!("Mattermost login parse: {}", e)))?;

        Ok((self.clone().with_token(token), user))
    }

    /// Verify the token and get the bot user via `GET /api/v4/users/me`.
    pub async fn get_me(&self) -> Result<User, ChannelAdapterError> {
        self.send_json(self.client.get(self.url("/users/me")), "users/me")
            .await
    }

    pub async fn patch_user(&self, user_id: &str, patch: &UserPatch) -> Result<User, ChannelAdapterError> {
        let url = self.url(&format!("/users/{}/patch", user_id));
        self.send_json(self.client.put(url).json(patch), "users/patch")
            .await
    }

    pub async fn get_team_by_name(&self, name: &str) -> Result<Team, ChannelAdapterError> {
        let url = self.url(&format!("/teams/name/{}", name));
        self.send_json(self.client.get(url), "teams/name").await
    }

    pub async fn get_channel_by_name(
        &self,
        team_id: &str,
        name: &str,
    ) -> Result<Channel, ChannelAdapterError> {
        let url = self.url(&format!("/teams/{}/channels/name/{}", team_id, name));
        self.send_json(self.client.get(url), "channels/name").await
    }

    pub async fn create_channel(
        &self,
        request: &CreateChannelRequest,
    ) -> Result<Channel, ChannelAdapterError> {
        self.send_json(
            self.client.post(self.url("/channels")).json(request),
            "channels/create",
        )
        .await
    }

    /// Join a channel via `POST /api/v4/channels/{id}/members`. Joining twice is harmless.
    pub async fn add_channel_member(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<(), ChannelAdapterError> {
        let url = self.url(&format!("/channels/{}/members", channel_id));
        let body = serde_json::json!({ "user_id": user_id });
        let _: serde_json::Value = self
            .send_json(self.client.post(url).json(&body), "channels/members")
            .await?;
        Ok(())
    }

    /// All members of a team, following pagination.
    pub async fn get_team_members(&self, team_id: &str) -> Result<Vec<TeamMember>, ChannelAdapterError> {
        let mut members = Vec::new();
        let mut page = 0usize;

        loop {
            let url = self.url(&format!(
                "/teams/{}/members?page={}&per_page={}",
                team_id, page, MEMBERS_PAGE_SIZE
            ));
            let batch: Vec<TeamMemberRecord> =
                self.send_json(self.client.get(url), "teams/members").await?;
            let done = batch.len() < MEMBERS_PAGE_SIZE;
            members.extend(batch.into_iter().map(TeamMember::from));
            if done {
                break;
            }
            page += 1;
        }

        Ok(members)
    }

    /// Create a post in a channel via `POST /api/v4/posts`.
    pub async fn create_post(
        &self,
        message: &OutboundMessage,
    ) -> Result<DeliveryReceipt, ChannelAdapterError> {
        let body = CreatePostRequest {
            channel_id: message.channel_id.clone(),
            message: message.content.clone(),
            root_id: message.root_id.clone(),
        };

        let resp = self
            .authed(self.client.post(self.url("/posts")).json(&body))
            .send()
            .await
            .map_err(|e| {
                ChannelAdapterError::SendFailed(format!("Mattermost create_post failed: {}", e))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Ok(DeliveryReceipt {
                channel_id: message.channel_id.clone(),
                post_id: None,
                delivered_at: chrono::Utc::now(),
                success: false,
                error: Some(format!("HTTP {}: {}", status, body)),
            });
        }

        let post_resp: CreatePostResponse = resp.json().await.unwrap_or(CreatePostResponse {
            id: None,
            channel_id: None,
        });

        Ok(DeliveryReceipt {
            channel_id: post_resp
                .channel_id
                .unwrap_or_else(|| message.channel_id.clone()),
            post_id: post_resp.id,
            delivered_at: chrono::Utc::now(),
            success: true,
            error: None,
        })
    }
}

async fn check_status(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, ChannelAdapterError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = format!("Mattermost {} rejected ({}): {}", what, status, body);
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChannelAdapterError::Auth(detail),
        StatusCode::NOT_FOUND => ChannelAdapterError::NotFound(detail),
        _ => ChannelAdapterError::Connection(detail),
    })
}
