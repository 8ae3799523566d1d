use crate::dom::SanitizeOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `act` and `observe` turn an instruction into a locator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// The oracle picks a CSS/XPath selector from page content
    #[default]
    Selector,
    /// The oracle names a role and an exact accessible name
    Role,
}

/// What happens when a resolved locator matches nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    /// Return an unsuccessful `ActResult`
    #[default]
    Report,
    /// Fail the call with `CuehandError::ElementNotFound`
    Abort,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct CuehandConfig {
    pub strategy: ResolutionStrategy,

    /// Narrow content by oracle-picked keyword and tags before the selector query
    /// (selector strategy only)
    pub keyword_narrowing: bool,

    pub not_found: NotFoundPolicy,

    /// Pause after a successful fill
    pub settle_delay: Duration,

    pub sanitize: SanitizeOptions,
}

impl Default for CuehandConfig {
    fn default() -> Self {
        Self {
            strategy: ResolutionStrategy::default(),
            keyword_narrowing: true,
            not_found: NotFoundPolicy::default(),
            settle_delay: Duration::from_secs(1),
            sanitize: SanitizeOptions::default(),
        }
    }
}

impl CuehandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the resolution strategy
    pub fn strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder method: toggle keyword narrowing
    pub fn keyword_narrowing(mut self, enabled: bool) -> Self {
        self.keyword_narrowing = enabled;
        self
    }

    /// Builder method: set the not-found policy
    pub fn not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found = policy;
        self
    }

    /// Builder method: set the post-fill settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Builder method: set sanitizer options
    pub fn sanitize(mut self, options: SanitizeOptions) -> Self {
        self.sanitize = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CuehandConfig::default();
        assert_eq!(config.strategy, ResolutionStrategy::Selector);
        assert_eq!(config.not_found, NotFoundPolicy::Report);
        assert!(config.keyword_narrowing);
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert!(config.sanitize.strip_svg);
    }

    #[test]
    fn test_config_builder() {
        let config = CuehandConfig::new()
            .strategy(ResolutionStrategy::Role)
            .not_found(NotFoundPolicy::Abort)
            .keyword_narrowing(false)
            .settle_delay(Duration::ZERO)
            .sanitize(SanitizeOptions::preserve_layout());

        assert_eq!(config.strategy, ResolutionStrategy::Role);
        assert_eq!(config.not_found, NotFoundPolicy::Abort);
        assert!(!config.keyword_narrowing);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert!(!config.sanitize.strip_svg);
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(serde_json::to_string(&ResolutionStrategy::Role).unwrap(), "\"role\"");
        let strategy: ResolutionStrategy = serde_json::from_str("\"selector\"").unwrap();
        assert_eq!(strategy, ResolutionStrategy::Selector);
    }
}
