use serde::Deserialize;

/// Response shape of Slack's `users.lookupByEmail`.
#[derive(Debug, Deserialize)]
struct LookupByEmailResponse {
    ok: bool,
    user: Option<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    profile: Option<LookupProfile>,
}

#[derive(Debug, Deserialize)]
struct LookupProfile {
    image_512: Option<String>,
    image_192: Option<String>,
    image_72: Option<String>,
}

/// Client for fetching a member's avatar from the Slack workspace.
///
/// The integration is optional: without a token every lookup resolves to
/// `None`, and lookup failures are logged and swallowed so user creation
/// never fails on a missing avatar.
pub struct SlackAvatarClient {
    token: Option<String>,
    http_client: reqwest::Client,
}

impl SlackAvatarClient {
    const LOOKUP_URL: &'static str = "https://slack.com/api/users.lookupByEmail";

    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            http_client: reqwest::Client::new(),
        }
    }

    /// Best-effort avatar lookup by workspace email.
    pub async fn lookup_avatar(&self, email: &str) -> Option<String> {
        let token = self.token.as_ref()?;

        let response = self
            .http_client
            .get(Self::LOOKUP_URL)
            .bearer_auth(token)
            .query(&[("email", email)])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!("Slack avatar lookup failed: HTTP {}", r.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Slack avatar lookup failed: {}", e);
                return None;
            }
        };

        let body: LookupByEmailResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to parse Slack avatar response: {}", e);
                return None;
            }
        };

        if !body.ok {
            return None;
        }

        let profile = body.user?.profile?;
        // Prefer a reasonably sized image; fall back if missing
        profile
            .image_512
            .or(profile.image_192)
            .or(profile.image_72)
    }
}
