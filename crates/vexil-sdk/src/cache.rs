//! Caching of aggregated flags
//!
//! Two layers, both optional:
//!
//! - [`RequestScope`] memoizes the flag set for one unit of work (one
//!   inbound request). A new scope per request is the invalidation.
//! - [`FlagCache`] keeps the flag set process-wide with a TTL, and is
//!   invalidated by any write to the condition store.
//!
//! Only condition lists are cached, never evaluation results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use vexil_core::EvaluationContext;
use vexil_repository::{CacheConfig, CacheStats, CachedEntry, ChangeEvent, ChangeListener};

use crate::aggregator::FlagSet;
use crate::error::Result;

/// What a flag is evaluated against: a bare context, or a request scope
/// that also memoizes the aggregated flags
pub trait EvaluationScope {
    fn context(&self) -> &EvaluationContext;

    /// The memo to read aggregated flags from, if any
    fn memo(&self) -> Option<&RequestScope> {
        None
    }
}

impl EvaluationScope for EvaluationContext {
    fn context(&self) -> &EvaluationContext {
        self
    }
}

/// Evaluation context for one unit of work, carrying the flags aggregated
/// for it
#[derive(Debug, Default)]
pub struct RequestScope {
    context: EvaluationContext,
    flags: OnceLock<Arc<FlagSet>>,
}

impl RequestScope {
    pub fn new(context: EvaluationContext) -> Self {
        Self {
            context,
            flags: OnceLock::new(),
        }
    }

    /// Whether flags were already aggregated in this scope
    pub fn is_populated(&self) -> bool {
        self.flags.get().is_some()
    }

    /// Return the memoized flags, computing them on first use.
    ///
    /// Concurrent first uses may both compute; the first stored set wins.
    pub(crate) fn get_or_try_insert<F>(&self, compute: F) -> Result<Arc<FlagSet>>
    where
        F: FnOnce() -> Result<Arc<FlagSet>>,
    {
        if let Some(flags) = self.flags.get() {
            return Ok(Arc::clone(flags));
        }
        let flags = compute()?;
        Ok(Arc::clone(self.flags.get_or_init(|| flags)))
    }
}

impl From<EvaluationContext> for RequestScope {
    fn from(context: EvaluationContext) -> Self {
        Self::new(context)
    }
}

impl EvaluationScope for RequestScope {
    fn context(&self) -> &EvaluationContext {
        &self.context
    }

    fn memo(&self) -> Option<&RequestScope> {
        Some(self)
    }
}

/// Process-wide cache of the aggregated flag set
///
/// Every invalidation bumps a generation counter. A flag set aggregated
/// under an older generation is never stored, so a write that lands while
/// the sources are being read cannot be hidden by a stale insert.
pub struct FlagCache {
    config: CacheConfig,
    entry: RwLock<Option<CachedEntry<Arc<FlagSet>>>>,
    generation: AtomicU64,
    stats: Mutex<CacheStats>,
}

impl FlagCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entry: RwLock::new(None),
            generation: AtomicU64::new(0),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The cached flag set, unless missing or expired
    pub fn get(&self) -> Option<Arc<FlagSet>> {
        if !self.config.enabled {
            return None;
        }

        let cached = self
            .entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|entry| !entry.is_expired())
            .map(|entry| Arc::clone(&entry.data));

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        if cached.is_some() {
            stats.hits += 1;
            tracing::debug!("flag cache hit");
        } else {
            stats.misses += 1;
            tracing::debug!("flag cache miss");
        }
        cached
    }

    /// Current generation; read it before aggregating and pass it to `insert`
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a flag set aggregated at `generation`.
    ///
    /// Returns false, storing nothing, when the cache was invalidated since.
    pub fn insert(&self, generation: u64, flags: Arc<FlagSet>) -> bool {
        if !self.config.enabled {
            return false;
        }
        let size = flags.len();
        {
            let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
            if self.generation.load(Ordering::Acquire) != generation {
                tracing::debug!("flag set aggregated before an invalidation, not cached");
                return false;
            }
            *entry = Some(CachedEntry::new(flags, self.config.ttl));
        }
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).size = size;
        true
    }

    /// Drop the cached flag set
    pub fn invalidate(&self) {
        let removed = {
            let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::AcqRel);
            entry.take().is_some()
        };
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.size = 0;
        if removed {
            stats.invalidations += 1;
            tracing::debug!("flag cache invalidated");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for FlagCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ChangeListener for FlagCache {
    fn on_change(&self, event: &ChangeEvent) {
        tracing::debug!(flag = event.flag_name(), "condition changed, invalidating flag cache");
        self.invalidate();
    }
}
