pub mod discord;
pub mod error;
pub mod log_sink;
pub mod render;

pub use discord::DiscordWebhookSink;
pub use error::NotifyError;
pub use log_sink::LogSink;
pub use render::{gig_payload, job_markdown, job_payload, WebhookPayload, JOB_EMOJIS};
