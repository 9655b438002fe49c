mod slack_auth_client;

pub use slack_auth_client::{SlackAuthClient, SlackUserInfo};
