//! Freelance gig stage against in-memory ports.

mod support;

use jobwatch_core::{Announcement, Destination, GigPosting};
use jobwatch_pipeline::publish_gigs;

use support::{FixedGigSource, MemoryGigStore, RecordingSink};

fn gig(slug: &str) -> GigPosting {
    GigPosting {
        title: format!("Gig {slug}"),
        link: format!("https://www.freelancer.com/projects/{slug}"),
        description: Some("details".to_owned()),
    }
}

fn destination() -> Destination {
    Destination::new("https://discord.test/freelancer")
}

#[tokio::test]
async fn new_gigs_are_announced_once_across_polls() {
    let source = FixedGigSource {
        gigs: vec![gig("a"), gig("b")],
        fail: false,
    };
    let store = MemoryGigStore::default();
    let sink = RecordingSink::default();

    let first = publish_gigs(&source, &store, &sink, &destination()).await;
    let second = publish_gigs(&source, &store, &sink, &destination()).await;

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(store.len(), 2);
    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert!(matches!(&sent[0].1, Announcement::Gig(g) if g.link.ends_with("/a")));
}

#[tokio::test]
async fn board_failure_yields_zero() {
    let source = FixedGigSource {
        gigs: vec![gig("a")],
        fail: true,
    };
    let store = MemoryGigStore::default();
    let sink = RecordingSink::default();

    let recorded = publish_gigs(&source, &store, &sink, &destination()).await;

    assert_eq!(recorded, 0);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn store_error_skips_only_that_gig() {
    let source = FixedGigSource {
        gigs: vec![gig("bad"), gig("good")],
        fail: false,
    };
    let store = MemoryGigStore::failing_on("https://www.freelancer.com/projects/bad");
    let sink = RecordingSink::default();

    let recorded = publish_gigs(&source, &store, &sink, &destination()).await;

    assert_eq!(recorded, 1);
    assert_eq!(sink.titles(), vec!["Gig good"]);
}

#[tokio::test]
async fn delivery_failure_keeps_gig_recorded() {
    let source = FixedGigSource {
        gigs: vec![gig("a")],
        fail: false,
    };
    let store = MemoryGigStore::default();
    let sink = RecordingSink::default();
    sink.set_fail(true);

    let first = publish_gigs(&source, &store, &sink, &destination()).await;
    sink.set_fail(false);
    let second = publish_gigs(&source, &store, &sink, &destination()).await;

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    assert!(sink.sent().is_empty());
}
