use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::SlackAuthClient;
use crate::features::auth::model::SessionUser;
use crate::features::auth::services::TokenService;
use crate::features::users::models::{User, UserRole};
use crate::features::users::services::UserService;

/// Slack sign-in flow and session issuance.
pub struct AuthService {
    slack: Arc<SlackAuthClient>,
    users: Arc<UserService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        slack: Arc<SlackAuthClient>,
        users: Arc<UserService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            slack,
            users,
            tokens,
        }
    }

    /// Complete the Slack OAuth flow: exchange the code, confirm the
    /// member belongs to the configured workspace, find or create the
    /// user record, and issue a session token.
    pub async fn login(&self, code: &str, redirect_uri: &str) -> Result<(String, User)> {
        let access_token = self.slack.exchange_code(code, redirect_uri).await?;
        let info = self.slack.user_info(&access_token).await?;

        if !self.slack.is_workspace_member(&info) {
            tracing::warn!("Sign-in attempt from outside the workspace rejected");
            return Err(AppError::Forbidden(
                "Sign-in is restricted to workspace members".to_string(),
            ));
        }

        let email = info.email.ok_or_else(|| {
            AppError::Unauthorized("Slack did not provide an email address".to_string())
        })?;

        let user = match self.users.get_by_email(&email).await? {
            Some(user) => user,
            None => {
                // First sign-in provisions the account with member defaults
                self.users
                    .create(
                        &email,
                        info.given_name.as_deref().unwrap_or(""),
                        info.family_name.as_deref().unwrap_or(""),
                        info.picture.as_deref(),
                        UserRole::User,
                    )
                    .await?
            }
        };

        let token = self.tokens.issue(&user)?;
        Ok((token, user))
    }

    /// Resolve the current session to its stored user record.
    pub async fn me(&self, session: &SessionUser) -> Result<User> {
        self.users
            .get_by_email(&session.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
    }
}
