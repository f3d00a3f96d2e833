//! Filter for errors that were already shown to the user
//!
//! Screens display API failures inline. A front end's global error hook
//! consults this filter so that those known messages are not reported a
//! second time as crashes.

use crate::errors::messages;

/// Known, already surfaced error message patterns
#[derive(Debug, Clone)]
pub struct SurfacedErrorFilter {
    patterns: Vec<String>,
}

impl Default for SurfacedErrorFilter {
    fn default() -> Self {
        Self::new([
            messages::SESSION_EXPIRED,
            messages::NETWORK,
            messages::TIMEOUT,
            messages::SERVER,
            "Network request failed",
            "Credenciales inválidas",
        ])
    }
}

impl SurfacedErrorFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Add another known pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Whether the message contains one of the known patterns
    pub fn should_suppress(&self, message: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && message.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_messages_suppressed() {
        let filter = SurfacedErrorFilter::default();
        assert!(filter.should_suppress("Error: Sesión expirada"));
        assert!(filter.should_suppress(messages::SERVER));
        assert!(!filter.should_suppress("index out of bounds"));
    }

    #[test]
    fn test_custom_pattern() {
        let filter = SurfacedErrorFilter::new(Vec::<String>::new()).with_pattern("asiento ocupado");
        assert!(filter.should_suppress("El asiento ocupado no puede venderse"));
        assert!(!filter.should_suppress(messages::NETWORK));
    }
}
