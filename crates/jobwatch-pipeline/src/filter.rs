//! Per-category acceptance rules for raw postings.

use jobwatch_core::{CategoryRule, GlobalRules, RawPosting};

/// Why a posting was not accepted. Checks run in declaration order and the
/// first failing one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Employer is on the global blacklist (exact match).
    Blacklisted,
    /// Title contains none of the category's required terms.
    MissingRequiredTerm,
    /// Title contains one of the category's quarantine terms.
    QuarantinedTerm(String),
    /// Title contains one of the global bad-role terms.
    BadRole(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Blacklisted => f.write_str("blacklisted employer"),
            Rejection::MissingRequiredTerm => f.write_str("no required term in title"),
            Rejection::QuarantinedTerm(term) => write!(f, "quarantined term \"{term}\""),
            Rejection::BadRole(term) => write!(f, "bad role term \"{term}\""),
        }
    }
}

/// Decides whether `posting` belongs in `rule`'s category.
///
/// An empty required-term set is vacuously satisfied.
///
/// # Errors
///
/// Returns the first [`Rejection`] that applies.
pub fn evaluate(
    posting: &RawPosting,
    rule: &CategoryRule,
    globals: &GlobalRules,
) -> Result<(), Rejection> {
    if globals.is_blacklisted(&posting.company) {
        return Err(Rejection::Blacklisted);
    }
    if !rule.required_terms.is_empty() && !rule.required_terms.matches(&posting.title) {
        return Err(Rejection::MissingRequiredTerm);
    }
    if let Some(term) = rule.quarantine_terms.first_match(&posting.title) {
        return Err(Rejection::QuarantinedTerm(term.to_owned()));
    }
    if let Some(term) = globals.bad_role_terms.first_match(&posting.title) {
        return Err(Rejection::BadRole(term.to_owned()));
    }
    Ok(())
}

/// Keeps the postings that pass [`evaluate`], in input order. Each rejection
/// is logged.
#[must_use]
pub fn filter(postings: Vec<RawPosting>, rule: &CategoryRule, globals: &GlobalRules) -> Vec<RawPosting> {
    postings
        .into_iter()
        .filter(|posting| match evaluate(posting, rule, globals) {
            Ok(()) => true,
            Err(reason) => {
                tracing::info!(
                    category = %rule.category,
                    title = %posting.title,
                    company = %posting.company,
                    reason = %reason,
                    "filter: rejected posting"
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
