use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::postings::SearchQuery;
use crate::terms::TermSet;
use crate::ConfigError;

/// A job classification with its own rule set and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "blockchain")]
    Blockchain,
    #[serde(rename = "mobile")]
    Mobile,
    #[serde(rename = "machine-learning")]
    MachineLearning,
    #[serde(rename = "intern")]
    Intern,
    #[serde(rename = "ng-2025")]
    NewGrad2025,
    #[serde(rename = "ng-2024")]
    NewGrad2024,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::FullTime,
        Category::Blockchain,
        Category::Mobile,
        Category::MachineLearning,
        Category::Intern,
        Category::NewGrad2025,
        Category::NewGrad2024,
    ];

    /// Stable key used in config files, the CLI, and the `seen_postings.category` column.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Category::FullTime => "full-time",
            Category::Blockchain => "blockchain",
            Category::Mobile => "mobile",
            Category::MachineLearning => "machine-learning",
            Category::Intern => "intern",
            Category::NewGrad2025 => "ng-2025",
            Category::NewGrad2024 => "ng-2024",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
                format!("unknown category '{s}'; expected one of {}", known.join(", "))
            })
    }
}

/// Handle of the external notification target for a category (a webhook URL).
#[derive(Clone, PartialEq, Eq)]
pub struct Destination(String);

impl Destination {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Destination([redacted])")
    }
}

/// Category-specific fetch parameters. `terms` is never empty; a category with
/// a single fixed search term has a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub terms: Vec<String>,
    pub location: String,
    pub sites: Vec<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
}

impl QueryPlan {
    #[must_use]
    pub fn query_for(&self, search_term: &str) -> SearchQuery {
        SearchQuery {
            search_term: search_term.to_string(),
            location: self.location.clone(),
            results_wanted: self.results_wanted,
            hours_old: self.hours_old,
            sites: self.sites.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    pub display_name: String,
    pub destination: Destination,
    pub query: QueryPlan,
    pub required_terms: TermSet,
    pub quarantine_terms: TermSet,
}

/// Rules shared by every category.
#[derive(Debug, Clone, Default)]
pub struct GlobalRules {
    pub blacklist: HashSet<String>,
    pub bad_role_terms: TermSet,
}

impl GlobalRules {
    /// Exact, case-sensitive employer match.
    #[must_use]
    pub fn is_blacklisted(&self, company: &str) -> bool {
        self.blacklist.contains(company)
    }
}

/// The immutable rule table: enabled categories keyed by [`Category`], plus
/// the rotation order they are polled in.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub globals: GlobalRules,
    rules: BTreeMap<Category, CategoryRule>,
    order: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from already-resolved rules, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `rules` is empty or repeats a category.
    pub fn new(globals: GlobalRules, rules: Vec<CategoryRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::Validation(
                "at least one category must be enabled".to_string(),
            ));
        }
        let mut map = BTreeMap::new();
        let mut order = Vec::with_capacity(rules.len());
        for rule in rules {
            let category = rule.category;
            if map.insert(category, rule).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate category: '{category}'"
                )));
            }
            order.push(category);
        }
        Ok(Self {
            globals,
            rules: map,
            order,
        })
    }

    #[must_use]
    pub fn rule(&self, category: Category) -> Option<&CategoryRule> {
        self.rules.get(&category)
    }

    /// Enabled rules in rotation order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.order.iter().filter_map(|c| self.rules.get(c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoriesFile {
    #[serde(default)]
    blacklist_companies: Vec<String>,
    #[serde(default)]
    bad_role_terms: TermSet,
    #[serde(default)]
    defaults: QueryDefaults,
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct QueryDefaults {
    location: String,
    sites: Vec<String>,
    results_wanted: u32,
    hours_old: u32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            location: "United States, Remote".to_string(),
            sites: vec!["linkedin".to_string()],
            results_wanted: 50,
            hours_old: 24,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryEntry {
    key: Category,
    name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    destination_env: String,
    search_term: Option<String>,
    rotating_terms: Option<Vec<String>>,
    location: Option<String>,
    sites: Option<Vec<String>>,
    results_wanted: Option<u32>,
    hours_old: Option<u32>,
    #[serde(default)]
    required_terms: TermSet,
    #[serde(default)]
    quarantine_terms: TermSet,
}

fn enabled_by_default() -> bool {
    true
}

/// Load and validate the category rule table from a YAML file, resolving each
/// enabled category's destination through `lookup`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation,
/// or if an enabled category's destination variable is unset.
pub fn load_catalog<F>(path: &Path, lookup: F) -> Result<Catalog, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog(&content, lookup)
}

/// Parse and validate a category rule table from YAML text.
///
/// # Errors
///
/// See [`load_catalog`].
pub fn parse_catalog<F>(content: &str, lookup: F) -> Result<Catalog, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let file: CategoriesFile = serde_yaml::from_str(content)?;
    validate_entries(&file)?;

    let globals = GlobalRules {
        blacklist: file
            .blacklist_companies
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        bad_role_terms: file.bad_role_terms,
    };

    let mut rules = Vec::new();
    for entry in file.categories {
        if !entry.enabled {
            continue;
        }
        let destination = lookup(&entry.destination_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingDestination {
                category: entry.key.to_string(),
                var: entry.destination_env.clone(),
            })?;

        let terms = search_terms(&entry)?;

        rules.push(CategoryRule {
            category: entry.key,
            display_name: entry.name,
            destination: Destination::new(destination),
            query: QueryPlan {
                terms,
                location: entry
                    .location
                    .unwrap_or_else(|| file.defaults.location.clone()),
                sites: entry.sites.unwrap_or_else(|| file.defaults.sites.clone()),
                results_wanted: entry
                    .results_wanted
                    .unwrap_or(file.defaults.results_wanted),
                hours_old: entry.hours_old.unwrap_or(file.defaults.hours_old),
            },
            required_terms: entry.required_terms,
            quarantine_terms: entry.quarantine_terms,
        });
    }

    Catalog::new(globals, rules)
}

fn validate_entries(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.defaults.results_wanted == 0 {
        return Err(ConfigError::Validation(
            "defaults.results_wanted must be greater than zero".to_string(),
        ));
    }
    if file.defaults.sites.is_empty() {
        return Err(ConfigError::Validation(
            "defaults.sites must name at least one source".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &file.categories {
        let key = entry.key;
        if !seen.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{key}'"
            )));
        }
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{key}' must have a non-empty name"
            )));
        }
        if entry.destination_env.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{key}' must name a destination_env variable"
            )));
        }
        search_terms(entry)?;
        if entry.results_wanted == Some(0) {
            return Err(ConfigError::Validation(format!(
                "category '{key}' has results_wanted = 0"
            )));
        }
        if entry.sites.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Validation(format!(
                "category '{key}' has an empty sites list"
            )));
        }
    }

    Ok(())
}

/// Resolve the fixed or rotating search terms of an entry into a non-empty list.
fn search_terms(entry: &CategoryEntry) -> Result<Vec<String>, ConfigError> {
    let key = entry.key;
    match (&entry.search_term, &entry.rotating_terms) {
        (Some(term), None) => {
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{key}' has a blank search_term"
                )));
            }
            Ok(vec![term.trim().to_string()])
        }
        (None, Some(list)) => {
            if list.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{key}' has an empty rotating_terms list"
                )));
            }
            if list.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "category '{key}' has a blank entry in rotating_terms"
                )));
            }
            Ok(list.iter().map(|t| t.trim().to_string()).collect())
        }
        (Some(_), Some(_)) => Err(ConfigError::Validation(format!(
            "category '{key}' sets both search_term and rotating_terms"
        ))),
        (None, None) => Err(ConfigError::Validation(format!(
            "category '{key}' needs either search_term or rotating_terms"
        ))),
    }
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
