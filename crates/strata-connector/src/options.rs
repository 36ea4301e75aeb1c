#![forbid(unsafe_code)]

use std::{fmt, sync::Arc};

use strata_path::{NoOpValidator, PathValidator};

/// Construction options for a [`StoreConnector`](crate::StoreConnector).
///
/// The only connector-level knobs are the listing cache switch and the
/// naming-rule validator; credentials, endpoints and retry policy belong to
/// the backend adapter.
#[derive(Clone)]
pub struct ConnectorOptions {
    /// Memoize blob lists and child-key lists per path. Off by default:
    /// listing can be expensive or rate-limited, but staleness across
    /// connector instances is unacceptable in some deployments, so the
    /// caller opts in.
    pub use_cache: bool,
    /// Backend-specific naming rules, applied before every operation.
    pub validator: Arc<dyn PathValidator>,
}

impl ConnectorOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn PathValidator>) -> Self {
        self.validator = validator;
        self
    }
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            use_cache: false,
            validator: Arc::new(NoOpValidator),
        }
    }
}

impl fmt::Debug for ConnectorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorOptions")
            .field("use_cache", &self.use_cache)
            .finish_non_exhaustive()
    }
}
