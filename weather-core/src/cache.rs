//! Time-boxed lookup caches shared by the geocoder and the forecast client.
//!
//! Both are handed a `Cache` at construction, so tests can swap in
//! [`NoopCache`] or drive a [`TtlCache`] with a manual clock.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::{collections::HashMap, fmt::Debug, sync::Arc};

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub trait Cache<V>: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<V>;
    fn put(&self, key: String, value: V);
}

/// Never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl<V> Cache<V> for NoopCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn put(&self, _key: String, _value: V) {}
}

/// In-memory cache whose entries expire `ttl` after insertion.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, (DateTime<Utc>, V)>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send + Debug> Cache<V> for TtlCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some((stored_at, value)) if now - *stored_at < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: String, value: V) {
        let now = self.clock.now();
        self.entries.lock().insert(key, (now, value));
    }
}

/// Pick a TTL cache or a no-op one.
pub fn cache_for<V>(enabled: bool, ttl: Duration) -> Arc<dyn Cache<V>>
where
    V: Clone + Send + Debug + 'static,
{
    if enabled {
        Arc::new(TtlCache::<V>::with_system_clock(ttl))
    } else {
        Arc::new(NoopCache)
    }
}
