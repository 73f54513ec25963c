//! Session bootstrap: ping, login, profile sync, team and channel discovery.
//!
//! Every step is fatal on failure; the caller reports the error and exits.

use crate::config::{Credentials, MattermostConfig};
use crate::error::ChannelAdapterError;

use super::api::{Channel, CreateChannelRequest, MattermostApiClient, Team, User, UserPatch};

const CHANNEL_DISPLAY_NAME: &str = "Debugging For Sample Bot";
const CHANNEL_PURPOSE: &str = "This is used as a test channel for logging bot debug messages";

/// An authenticated session bound to one team and one monitored channel.
#[derive(Clone)]
pub struct Session {
    pub api: MattermostApiClient,
    pub token: String,
    pub user: User,
    pub team: Team,
    pub channel: Channel,
}

impl Session {
    pub async fn establish(config: &MattermostConfig) -> Result<Self, ChannelAdapterError> {
        let api = MattermostApiClient::new(&config.server_url())?;

        match api.ping().await? {
            Some(version) => tracing::info!(%version, "Server detected and is running"),
            None => tracing::info!("Server detected and is running"),
        }

        let (api, user) = match config.credentials {
            Credentials::Password { ref password } => api.login(&config.login, password).await?,
            Credentials::Token { ref token } => {
                let api = api.with_token(token.clone());
                let me = api.get_me().await?;
                (api, me)
            }
        };
        let token = api
            .token()
            .map(str::to_string)
            .ok_or_else(|| ChannelAdapterError::Auth("no session token after login".to_string()))?;
        tracing::info!(user_id = %user.id, "Logged in as the bot user");

        let user = sync_profile(&api, user, config).await?;

        let team = api
            .get_team_by_name(&config.team_name)
            .await
            .map_err(|e| match e {
                ChannelAdapterError::NotFound(_) => ChannelAdapterError::NotFound(format!(
                    "we do not appear to be a member of the team '{}'",
                    config.team_name
                )),
                other => other,
            })?;

        let channel = ensure_channel(&api, &team, &user, config).await?;

        Ok(Self {
            api,
            token,
            user,
            team,
            channel,
        })
    }
}

/// Bring the account's names in line with the configuration.
async fn sync_profile(
    api: &MattermostApiClient,
    user: User,
    config: &MattermostConfig,
) -> Result<User, ChannelAdapterError> {
    if !profile_differs(&user, config) {
        return Ok(user);
    }

    let patch = UserPatch {
        first_name: config.first_name.clone(),
        last_name: config.last_name.clone(),
        username: config.full_name.clone(),
    };
    let updated = api.patch_user(&user.id, &patch).await?;
    tracing::info!(username = %updated.username, "Updated the bot account settings");
    Ok(updated)
}

fn profile_differs(user: &User, config: &MattermostConfig) -> bool {
    user.first_name != config.first_name
        || user.last_name != config.last_name
        || !user.username.eq_ignore_ascii_case(&config.full_name)
}

/// Find the monitored channel, creating it when absent, and make sure the bot is a member.
async fn ensure_channel(
    api: &MattermostApiClient,
    team: &Team,
    user: &User,
    config: &MattermostConfig,
) -> Result<Channel, ChannelAdapterError> {
    match api.get_channel_by_name(&team.id, &config.channel_name).await {
        Ok(channel) => {
            if let Err(e) = api.add_channel_member(&channel.id, &user.id).await {
                tracing::warn!(channel = %channel.name, error = %e, "Failed to join monitored channel");
            }
            Ok(channel)
        }
        Err(ChannelAdapterError::NotFound(_)) => {
            let request = CreateChannelRequest {
                team_id: team.id.clone(),
                name: config.channel_name.clone(),
                display_name: CHANNEL_DISPLAY_NAME.to_string(),
                purpose: CHANNEL_PURPOSE.to_string(),
                channel_type: "O".to_string(),
            };
            let channel = api.create_channel(&request).await?;
            tracing::info!(channel = %channel.name, "Created the monitored channel");
            Ok(channel)
        }
        Err(e) => Err(e),
    }
}
