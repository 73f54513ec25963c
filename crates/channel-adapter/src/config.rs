use crate::error::ChannelAdapterError;

pub const ENV_HOST: &str = "MATTERMOST_BOT_HOST";
pub const ENV_LOGIN: &str = "MATTERMOST_BOT_LOGIN";
pub const ENV_PASSWORD: &str = "MATTERMOST_BOT_PASSWORD";
pub const ENV_TOKEN: &str = "MATTERMOST_BOT_TOKEN";
pub const ENV_FIRST_NAME: &str = "MATTERMOST_BOT_FIRSTNAME";
pub const ENV_LAST_NAME: &str = "MATTERMOST_BOT_LASTNAME";
pub const ENV_FULL_NAME: &str = "MATTERMOST_BOT_NAME";
pub const ENV_TEAM: &str = "MATTERMOST_BOT_TEAM";
pub const ENV_CHANNEL: &str = "MATTERMOST_BOT_CHANNEL";

/// How the bot proves its identity to the server.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username/password login; the session token comes back in the `Token` header.
    Password { password: String },
    /// Personal access token, checked against `/api/v4/users/me`.
    Token { token: String },
}

/// Configuration for the Mattermost side of the bot.
#[derive(Debug, Clone)]
pub struct MattermostConfig {
    /// Server address, `localhost:8065` or a full `https://...` URL.
    pub host: String,
    pub login: String,
    pub credentials: Credentials,
    pub first_name: String,
    pub last_name: String,
    /// Username the bot account is synced to. Defaults to first + last name.
    pub full_name: String,
    pub team_name: String,
    /// Name of the single monitored channel.
    pub channel_name: String,
}

pub fn default_host() -> String {
    "localhost:8065".to_string()
}

pub fn default_login() -> String {
    "yakafokon".to_string()
}

pub fn default_first_name() -> String {
    "Yakafokon".to_string()
}

pub fn default_last_name() -> String {
    "Bot".to_string()
}

pub fn default_team() -> String {
    "myteam".to_string()
}

pub fn default_channel() -> String {
    "debugging-for-sample-bot".to_string()
}

impl MattermostConfig {
    /// Load from the process environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, ChannelAdapterError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChannelAdapterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let credentials = match (get(ENV_TOKEN), get(ENV_PASSWORD)) {
            (Some(token), _) => Credentials::Token { token },
            (None, Some(password)) => Credentials::Password { password },
            (None, None) => {
                return Err(ChannelAdapterError::Config(format!(
                    "it is mandatory to set {} (or {})",
                    ENV_PASSWORD, ENV_TOKEN
                )))
            }
        };

        let first_name = get(ENV_FIRST_NAME).unwrap_or_else(default_first_name);
        let last_name = get(ENV_LAST_NAME).unwrap_or_else(default_last_name);
        let full_name = get(ENV_FULL_NAME).unwrap_or_else(|| format!("{}{}", first_name, last_name));

        Ok(Self {
            host: get(ENV_HOST).unwrap_or_else(default_host),
            login: get(ENV_LOGIN).unwrap_or_else(default_login),
            credentials,
            first_name,
            last_name,
            full_name,
            team_name: get(ENV_TEAM).unwrap_or_else(default_team),
            channel_name: get(ENV_CHANNEL).unwrap_or_else(default_channel),
        })
    }

    /// Base URL for REST calls, without trailing slash.
    pub fn server_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        }
    }

    /// Websocket endpoint derived from the server URL.
    pub fn websocket_url(&self) -> String {
        let server = self.server_url();
        let ws = match server.strip_prefix("https://") {
            Some(rest) => format!("wss://{}", rest),
            None => format!("ws://{}", server.trim_start_matches("http://")),
        };
        format!("{}/api/v4/websocket", ws)
    }
}
