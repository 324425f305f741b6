//! Integration tests for `DiscordWebhookSink` against a `wiremock` webhook.

use jobwatch_core::{Announcement, Destination, GigAnnouncement, JobAnnouncement, NotificationSink};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobwatch_notify::{DiscordWebhookSink, NotifyError};

const HOOK_PATH: &str = "/api/webhooks/1/token";

fn sink(max_retries: u32) -> DiscordWebhookSink {
    DiscordWebhookSink::new(5, max_retries)
        .expect("failed to build sink")
        .with_backoff_base_ms(0)
}

fn destination(server: &MockServer) -> Destination {
    Destination::new(format!("{}{HOOK_PATH}", server.uri()))
}

fn job() -> Announcement {
    Announcement::Job(JobAnnouncement {
        company: "Acme".to_owned(),
        company_url: "https://acme.example".to_owned(),
        title: "Mobile Engineer".to_owned(),
        application_url: "https://jobs.example/7".to_owned(),
        location: "Remote".to_owned(),
    })
}

#[tokio::test]
async fn job_is_posted_as_markdown_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    sink(0)
        .send(&destination(&server), &job())
        .await
        .expect("send should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let content = body["content"].as_str().expect("content string");
    assert!(content.contains("[**Mobile Engineer**](<https://jobs.example/7>)"));
    assert!(body.get("embeds").is_none());
}

#[tokio::test]
async fn gig_is_posted_as_embed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "Logo design",
                "url": "https://www.freelancer.com/projects/logo",
                "color": 65280,
                "footer": {"text": "Freelancer Job Alert"}
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let gig = Announcement::Gig(GigAnnouncement {
        title: "Logo design".to_owned(),
        link: "https://www.freelancer.com/projects/logo".to_owned(),
        description: None,
    });

    sink(0)
        .send(&destination(&server), &gig)
        .await
        .expect("send should succeed");
}

#[tokio::test]
async fn rate_limit_waits_then_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"message": "slow down", "retry_after": 0.01, "global": false})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    sink(2)
        .send(&destination(&server), &job())
        .await
        .expect("second attempt should succeed");
}

#[tokio::test]
async fn rate_limit_reported_after_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"retry_after": 0.0})))
        .expect(2)
        .mount(&server)
        .await;

    let result = sink(1).send(&destination(&server), &job()).await;

    assert!(
        matches!(result, Err(NotifyError::RateLimited { .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
        .expect(1)
        .mount(&server)
        .await;

    let result = sink(3).send(&destination(&server), &job()).await;

    match result {
        Err(NotifyError::Rejected { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Unknown Webhook");
        }
        other => panic!("expected NotifyError::Rejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    sink(1)
        .send(&destination(&server), &job())
        .await
        .expect("retry should succeed");
}
