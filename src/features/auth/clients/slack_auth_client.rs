use serde::Deserialize;

use crate::core::error::{AppError, Result};

/// Token exchange response from `openid.connect.token`.
#[derive(Debug, Deserialize)]
pub struct SlackTokenResponse {
    pub ok: bool,
    pub access_token: Option<String>,
    pub error: Option<String>,
}

/// Identity claims from `openid.connect.userInfo`.
#[derive(Debug, Deserialize)]
pub struct SlackUserInfo {
    pub ok: bool,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    #[serde(rename = "https://slack.com/team_id")]
    pub team_id: Option<String>,
    pub error: Option<String>,
}

/// Slack OpenID Connect client for the sign-in flow.
pub struct SlackAuthClient {
    client_id: String,
    client_secret: String,
    team_id: String,
    http_client: reqwest::Client,
}

impl SlackAuthClient {
    const TOKEN_URL: &'static str = "https://slack.com/api/openid.connect.token";
    const USER_INFO_URL: &'static str = "https://slack.com/api/openid.connect.userInfo";

    pub fn new(client_id: String, client_secret: String, team_id: String) -> Self {
        Self {
            client_id,
            client_secret,
            team_id,
            http_client: reqwest::Client::new(),
        }
    }

    /// Exchange an OAuth authorization code for an access token.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String> {
        let response = self
            .http_client
            .post(Self::TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Slack token exchange: {}", e)))?;

        let body: SlackTokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Slack token exchange response: {}", e))
        })?;

        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("Slack token exchange rejected: {}", reason);
            return Err(AppError::Unauthorized(
                "Slack sign-in was not accepted".to_string(),
            ));
        }

        body.access_token.ok_or_else(|| {
            AppError::ExternalServiceError("Slack token exchange returned no token".to_string())
        })
    }

    /// Fetch the signed-in member's identity claims.
    pub async fn user_info(&self, access_token: &str) -> Result<SlackUserInfo> {
        let response = self
            .http_client
            .get(Self::USER_INFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Slack user info: {}", e)))?;

        let body: SlackUserInfo = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Slack user info response: {}", e))
        })?;

        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("Slack user info rejected: {}", reason);
            return Err(AppError::Unauthorized(
                "Slack sign-in was not accepted".to_string(),
            ));
        }

        Ok(body)
    }

    /// Check that the identity belongs to the configured workspace.
    pub fn is_workspace_member(&self, info: &SlackUserInfo) -> bool {
        info.team_id.as_deref() == Some(self.team_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SlackAuthClient {
        SlackAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "T12345".to_string(),
        )
    }

    fn info(team_id: Option<&str>) -> SlackUserInfo {
        SlackUserInfo {
            ok: true,
            email: Some("user@example.com".to_string()),
            given_name: Some("Test".to_string()),
            family_name: Some("User".to_string()),
            picture: None,
            team_id: team_id.map(|s| s.to_string()),
            error: None,
        }
    }

    #[test]
    fn workspace_check_matches_configured_team_only() {
        let client = client();
        assert!(client.is_workspace_member(&info(Some("T12345"))));
        assert!(!client.is_workspace_member(&info(Some("T99999"))));
        assert!(!client.is_workspace_member(&info(None)));
    }

    #[test]
    fn user_info_team_id_uses_the_namespaced_claim() {
        let raw = serde_json::json!({
            "ok": true,
            "email": "user@example.com",
            "given_name": "Test",
            "family_name": "User",
            "https://slack.com/team_id": "T12345"
        });
        let parsed: SlackUserInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.team_id.as_deref(), Some("T12345"));
    }
}
