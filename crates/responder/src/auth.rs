//! Team administrator check, fail-closed and uncached.

use std::sync::Arc;

use yakabot_channel_adapter::ChannelAdapter;

#[derive(Clone)]
pub struct TeamAuthorizer {
    adapter: Arc<dyn ChannelAdapter>,
    team_id: String,
}

impl TeamAuthorizer {
    pub fn new(adapter: Arc<dyn ChannelAdapter>, team_id: impl Into<String>) -> Self {
        Self {
            adapter,
            team_id: team_id.into(),
        }
    }

    /// True only if the user is listed in the team and flagged as admin.
    /// Every call queries the platform.
    pub async fn is_admin(&self, user_id: &str) -> bool {
        let members = match self.adapter.list_team_members(&self.team_id).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(team = %self.team_id, user = %user_id, error = %e, "Team member lookup failed, denying");
                return false;
            }
        };

        members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.is_admin)
            .unwrap_or(false)
    }
}
