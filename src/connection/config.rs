use std::time::Duration;

use crate::engine::{QueryOptions, ScanConsistency};
use crate::json::CoercionOptions;

/// What a cursor does when fetching the next document fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationErrorPolicy {
    /// Report the failure as end of results. The error is only logged.
    #[default]
    Swallow,
    /// Return [`DbError::Iteration`](crate::DbError::Iteration) once, then
    /// behave as exhausted.
    Surface,
}

/// Adapter configuration
///
/// Endpoint and credentials belong to whoever builds the
/// [`QueryEngine`](crate::engine::QueryEngine); this only controls how
/// statements are submitted and how results are read back.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Statement timeout forwarded to the engine
    pub query_timeout: Option<Duration>,

    /// Ask the engine to reject mutating statements
    pub readonly: bool,

    /// Scan consistency forwarded to the engine
    pub scan_consistency: ScanConsistency,

    /// Handling of fetch failures while advancing a cursor
    pub iteration_errors: IterationErrorPolicy,

    /// Coerce RFC 3339 strings to timestamps
    pub parse_dates: bool,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self {
            query_timeout: None,
            readonly: false,
            scan_consistency: ScanConsistency::NotBounded,
            iteration_errors: IterationErrorPolicy::Swallow,
            parse_dates: true,
        }
    }

    /// Set query timeout
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn scan_consistency(mut self, consistency: ScanConsistency) -> Self {
        self.scan_consistency = consistency;
        self
    }

    pub fn iteration_errors(mut self, policy: IterationErrorPolicy) -> Self {
        self.iteration_errors = policy;
        self
    }

    pub fn parse_dates(mut self, parse_dates: bool) -> Self {
        self.parse_dates = parse_dates;
        self
    }

    pub(crate) fn coercion(&self) -> CoercionOptions {
        CoercionOptions {
            parse_dates: self.parse_dates,
        }
    }

    /// Fresh engine options carrying the configured defaults.
    pub(crate) fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        options.timeout = self.query_timeout;
        options.readonly = self.readonly;
        options.scan_consistency = self.scan_consistency;
        options
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.query_timeout, None);
        assert!(!config.readonly);
        assert_eq!(config.iteration_errors, IterationErrorPolicy::Swallow);
        assert!(config.parse_dates);
    }

    #[test]
    fn test_builder() {
        let config = ConnectionConfig::new()
            .query_timeout(Duration::from_secs(5))
            .readonly(true)
            .scan_consistency(ScanConsistency::RequestPlus)
            .iteration_errors(IterationErrorPolicy::Surface)
            .parse_dates(false);

        let options = config.query_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.readonly);
        assert_eq!(options.scan_consistency, ScanConsistency::RequestPlus);
        assert!(!config.coercion().parse_dates);
    }
}
