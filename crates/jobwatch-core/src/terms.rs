//! Case-insensitive substring term matching for posting titles.

use serde::{Deserialize, Deserializer};

/// A set of terms matched case-insensitively as substrings of a haystack.
///
/// Terms are lowercased and de-duplicated at construction; blank entries are
/// dropped. The original spelling of each term is kept for log output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    original: String,
    lowered: String,
}

impl TermSet {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<Term> = Vec::new();
        for term in terms {
            let trimmed = term.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            if out.iter().any(|t| t.lowered == lowered) {
                continue;
            }
            out.push(Term {
                original: trimmed.to_string(),
                lowered,
            });
        }
        Self { terms: out }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns the first term (original spelling) contained in `haystack`.
    #[must_use]
    pub fn first_match(&self, haystack: &str) -> Option<&str> {
        let lowered = haystack.to_lowercase();
        self.terms
            .iter()
            .find(|t| lowered.contains(&t.lowered))
            .map(|t| t.original.as_str())
    }

    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        self.first_match(haystack).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.original.as_str())
    }
}

impl<'de> Deserialize<'de> for TermSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(TermSet::new(raw))
    }
}
