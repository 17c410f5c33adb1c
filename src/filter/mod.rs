//! Link allow-list matching
//!
//! A `DomainPatternSet` is the compiled form of the configured
//! `allowed-domains` list. A link is relevant when any pattern matches
//! anywhere inside it.

use crate::config::FilterConfig;
use crate::ConfigError;
use regex::{Regex, RegexSet};

/// Ordered, immutable set of allow-list patterns
#[derive(Debug, Clone)]
pub struct DomainPatternSet {
    patterns: Vec<Regex>,
    set: RegexSet,
}

impl DomainPatternSet {
    /// Compiles the given patterns, preserving their order
    ///
    /// # Example
    ///
    /// ```
    /// use sublink::filter::DomainPatternSet;
    ///
    /// let patterns = DomainPatternSet::new([r"good\.com"]).unwrap();
    /// assert!(patterns.is_match("http://good.com/x"));
    /// assert!(!patterns.is_match("http://bad.com/y"));
    /// ```
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref())
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", p.as_ref(), e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let set = RegexSet::new(patterns.iter().map(Regex::as_str))
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self { patterns, set })
    }

    /// Builds the pattern set from the `[filter]` configuration section
    pub fn from_config(config: &FilterConfig) -> Result<Self, ConfigError> {
        Self::new(&config.allowed_domains)
    }

    /// Returns true if at least one pattern is found anywhere in `link`
    pub fn is_match(&self, link: &str) -> bool {
        self.set.is_match(link)
    }

    /// The configured patterns in order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
