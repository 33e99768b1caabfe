use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::domain::{ScoreDetail, TableCode};

/// Port used by plugins to read another table's last persisted score detail.
pub trait ScoreDetailResolver: Send + Sync {
    fn fetch_score_detail(&self, code: &TableCode) -> Result<Option<ScoreDetail>, ResolverError>;
}

/// Lookup failure raised by the transport behind a resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("score detail lookup unavailable: {0}")]
    Unavailable(String),
}

/// Fixed set of details, for batch scoring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    details: BTreeMap<TableCode, ScoreDetail>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: &str, detail: ScoreDetail) -> Self {
        self.details.insert(TableCode::new(code), detail);
        self
    }
}

impl ScoreDetailResolver for StaticResolver {
    fn fetch_score_detail(&self, code: &TableCode) -> Result<Option<ScoreDetail>, ResolverError> {
        Ok(self.details.get(code).cloned())
    }
}

/// Memoizes lookups until the owning service invalidates a code.
pub struct CachingResolver {
    inner: Arc<dyn ScoreDetailResolver>,
    cache: Mutex<HashMap<TableCode, Option<ScoreDetail>>>,
}

impl CachingResolver {
    pub fn new(inner: Arc<dyn ScoreDetailResolver>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self, code: &TableCode) {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if cache.remove(code).is_some() {
            debug!(table = %code, "score detail cache invalidated");
        }
    }

}

impl ScoreDetailResolver for CachingResolver {
    fn fetch_score_detail(&self, code: &TableCode) -> Result<Option<ScoreDetail>, ResolverError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(code)
        {
            return Ok(hit.clone());
        }

        // errors are not cached; the next save retries the transport
        let fetched = self.inner.fetch_score_detail(code)?;
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(code.clone(), fetched.clone());
        Ok(fetched)
    }
}
