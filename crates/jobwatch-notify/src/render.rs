//! Discord webhook payloads for job and gig announcements.

use jobwatch_core::{GigAnnouncement, JobAnnouncement};
use rand::seq::IndexedRandom;
use serde::Serialize;

/// One of these opens every job announcement.
pub const JOB_EMOJIS: [&str; 5] = ["🎉", "👏", "💼", "🔥", "💻"];

const GIG_EMBED_COLOR: u32 = 0x00ff_00;
const GIG_FOOTER: &str = "Freelancer Job Alert";

// Discord rejects longer fields outright.
const MAX_CONTENT_CHARS: usize = 2000;
const MAX_EMBED_TITLE_CHARS: usize = 256;
const MAX_EMBED_DESCRIPTION_CHARS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Renders the markdown block posted for a new job.
///
/// The employer is linked when an employer URL is known and shown as plain
/// text otherwise. Links are wrapped in `<>` to suppress Discord previews.
#[must_use]
pub fn job_markdown(job: &JobAnnouncement, emoji: &str) -> String {
    let employer = if job.company_url.is_empty() {
        job.company.clone()
    } else {
        format!("[{}](<{}>)", job.company, job.company_url)
    };
    let location = if job.location.is_empty() {
        "Not listed"
    } else {
        job.location.as_str()
    };

    format!(
        ">>> ## {emoji} {employer} just posted a new job!\n\n\
         ### **Role:**\n\
         [**{title}**](<{url}>)\n\n\
         ### **Location:**\n\
         {location}\n\
         ---",
        title = job.title,
        url = job.application_url,
    )
}

/// Job payload with a randomly chosen emoji.
#[must_use]
pub fn job_payload(job: &JobAnnouncement) -> WebhookPayload {
    let emoji = JOB_EMOJIS.choose(&mut rand::rng()).copied().unwrap_or("💼");
    WebhookPayload {
        content: Some(truncate(&job_markdown(job, emoji), MAX_CONTENT_CHARS)),
        embeds: Vec::new(),
    }
}

/// Gig payload: a single green embed linking to the listing.
#[must_use]
pub fn gig_payload(gig: &GigAnnouncement) -> WebhookPayload {
    WebhookPayload {
        content: None,
        embeds: vec![Embed {
            title: truncate(&gig.title, MAX_EMBED_TITLE_CHARS),
            url: gig.link.clone(),
            description: gig
                .description
                .as_deref()
                .map(|d| truncate(d, MAX_EMBED_DESCRIPTION_CHARS)),
            color: GIG_EMBED_COLOR,
            footer: EmbedFooter {
                text: GIG_FOOTER.to_owned(),
            },
        }],
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobAnnouncement {
        JobAnnouncement {
            company: "Acme".to_owned(),
            company_url: "https://acme.example".to_owned(),
            title: "Software Engineer".to_owned(),
            application_url: "https://jobs.example/1".to_owned(),
            location: "Austin, TX".to_owned(),
        }
    }

    #[test]
    fn job_markdown_carries_all_five_fields() {
        let text = job_markdown(&job(), "🔥");

        assert!(text.starts_with(">>> ## 🔥 [Acme](<https://acme.example>) just posted"));
        assert!(text.contains("[**Software Engineer**](<https://jobs.example/1>)"));
        assert!(text.contains("### **Location:**\nAustin, TX"));
    }

    #[test]
    fn job_markdown_without_employer_url_shows_plain_name() {
        let announcement = JobAnnouncement {
            company_url: String::new(),
            location: String::new(),
            ..job()
        };

        let text = job_markdown(&announcement, "💻");

        assert!(text.contains("## 💻 Acme just posted"));
        assert!(text.contains("Not listed"));
    }

    #[test]
    fn job_payload_uses_one_of_the_known_emojis() {
        let payload = job_payload(&job());
        let content = payload.content.unwrap();

        assert!(JOB_EMOJIS
            .iter()
            .any(|e| content.starts_with(&format!(">>> ## {e} "))));
        assert!(payload.embeds.is_empty());
    }

    #[test]
    fn gig_payload_is_a_green_embed_with_footer() {
        let gig = GigAnnouncement {
            title: "Landing page".to_owned(),
            link: "https://www.freelancer.com/projects/lp".to_owned(),
            description: Some("Quick job".to_owned()),
        };

        let json = serde_json::to_value(gig_payload(&gig)).unwrap();

        assert!(json.get("content").is_none());
        assert_eq!(json["embeds"][0]["title"], "Landing page");
        assert_eq!(json["embeds"][0]["url"], "https://www.freelancer.com/projects/lp");
        assert_eq!(json["embeds"][0]["color"], 0x00ff00);
        assert_eq!(json["embeds"][0]["footer"]["text"], "Freelancer Job Alert");
    }

    #[test]
    fn overlong_description_is_truncated() {
        let gig = GigAnnouncement {
            title: "t".to_owned(),
            link: "https://x".to_owned(),
            description: Some("x".repeat(5000)),
        };

        let payload = gig_payload(&gig);
        let description = payload.embeds[0].description.as_deref().unwrap();

        assert_eq!(description.chars().count(), MAX_EMBED_DESCRIPTION_CHARS);
        assert!(description.ends_with('…'));
    }
}
