mod slack_avatar_client;

pub use slack_avatar_client::SlackAvatarClient;
