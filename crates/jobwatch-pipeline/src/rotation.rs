use jobwatch_core::ConfigError;

/// Round-robin cursor over a category's search terms.
///
/// Lives only in memory; a restart begins again at the first term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    terms: Vec<String>,
    index: usize,
}

impl RotationState {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `terms` is empty.
    pub fn new(terms: Vec<String>) -> Result<Self, ConfigError> {
        if terms.is_empty() {
            return Err(ConfigError::Validation(
                "rotation needs at least one search term".to_string(),
            ));
        }
        Ok(Self { terms, index: 0 })
    }

    /// The term the next fetch should use.
    #[must_use]
    pub fn next_term(&self) -> &str {
        &self.terms[self.index]
    }

    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.terms.len();
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
