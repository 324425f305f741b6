//! Scraper for the freelancer.com job board listing page.

use std::time::Duration;

use jobwatch_core::{GigPosting, GigSource};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};

use crate::error::SourceError;
use crate::rate_limit::retry_with_backoff;

const CARD_SELECTOR: &str = "div.JobSearchCard-item";
const TITLE_LINK_SELECTOR: &str = "a.JobSearchCard-primary-heading-link";
const DESCRIPTION_SELECTOR: &str = "p.JobSearchCard-primary-description";

struct CardSelectors {
    card: Selector,
    title_link: Selector,
    description: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self, SourceError> {
        Ok(Self {
            card: parse_selector(CARD_SELECTOR)?,
            title_link: parse_selector(TITLE_LINK_SELECTOR)?,
            description: parse_selector(DESCRIPTION_SELECTOR)?,
        })
    }
}

fn parse_selector(selector: &'static str) -> Result<Selector, SourceError> {
    Selector::parse(selector).map_err(|_| SourceError::Selector { selector })
}

/// Fetches and parses gig cards from one board page.
pub struct FreelancerClient {
    client: Client,
    board_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FreelancerClient {
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if `board_url` does not parse, or
    /// [`SourceError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        board_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        let board_url = Url::parse(board_url).map_err(|e| SourceError::InvalidUrl {
            url: board_url.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            board_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Downloads the board page and returns its gig cards in page order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`], [`SourceError::RateLimited`],
    /// [`SourceError::NotFound`] or [`SourceError::UnexpectedStatus`] when the
    /// page cannot be retrieved.
    pub async fn fetch_gig_page(&self) -> Result<Vec<GigPosting>, SourceError> {
        let html = retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.client.get(self.board_url.clone()).send().await?;
            let status = response.status();
            let url = self.board_url.to_string();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SourceError::RateLimited {
                    url,
                    retry_after_secs: 60,
                });
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(SourceError::NotFound { url });
            }
            if !status.is_success() {
                return Err(SourceError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let gigs = parse_gig_cards(&html, &self.board_url)?;
        tracing::debug!(count = gigs.len(), "freelancer: parsed gig cards");
        Ok(gigs)
    }
}

impl GigSource for FreelancerClient {
    type Error = SourceError;

    async fn fetch_gigs(&self) -> Result<Vec<GigPosting>, SourceError> {
        self.fetch_gig_page().await
    }
}

/// Extracts gig cards from a board page.
///
/// Relative links are resolved against `base`. Cards without a title link
/// are skipped. Text is trimmed and inner whitespace collapsed to single
/// spaces; an empty description becomes `None`.
///
/// # Errors
///
/// Returns [`SourceError::Selector`] if a card selector fails to compile.
pub fn parse_gig_cards(html: &str, base: &Url) -> Result<Vec<GigPosting>, SourceError> {
    let selectors = CardSelectors::new()?;
    let document = Html::parse_document(html);

    let gigs = document
        .select(&selectors.card)
        .filter_map(|card| parse_card(card, &selectors, base))
        .collect();
    Ok(gigs)
}

fn parse_card(card: ElementRef<'_>, selectors: &CardSelectors, base: &Url) -> Option<GigPosting> {
    let Some(anchor) = card.select(&selectors.title_link).next() else {
        tracing::debug!("freelancer: skipping card without a title link");
        return None;
    };
    let href = anchor.value().attr("href")?;
    let link = base.join(href.trim()).ok()?;

    let title = collapse_whitespace(&anchor.text().collect::<String>());
    let description = card
        .select(&selectors.description)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|d| !d.is_empty());

    Some(GigPosting {
        title,
        link: link.to_string(),
        description,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
