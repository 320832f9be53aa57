use super::{StatementMode, StatementTemplate};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

/// Everything a template's text depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub table: String,
    pub mode: StatementMode,
    pub columns: Vec<&'static str>,
    pub identity: Option<&'static str>,
}

/// Bounded, thread-safe template cache.
///
/// Templates are immutable once built, so an entry is never replaced; a
/// racing second insert of the same key returns the first value. Past
/// `capacity` the oldest key is evicted. Rendering is a pure function of
/// the key, so a key rendered again after eviction (or [`clear`]) yields
/// byte-identical SQL.
///
/// [`clear`]: TemplateCache::clear
#[derive(Debug)]
pub struct TemplateCache {
    inner: Mutex<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    map: HashMap<TemplateKey, Arc<StatementTemplate>>,
    order: VecDeque<TemplateKey>,
}

impl TemplateCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &TemplateKey) -> Option<Arc<StatementTemplate>> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.map.get(key).cloned()
    }

    /// Return the cached template for `key`, rendering it on a miss.
    pub fn get_or_render(&self, key: TemplateKey) -> Arc<StatementTemplate> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        // Rendered outside the lock.
        let template = Arc::new(StatementTemplate::from_key(key.clone()));

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inner.map.get(&key) {
            return Arc::clone(existing);
        }
        if inner.capacity == 0 {
            return template;
        }
        inner.map.insert(key.clone(), Arc::clone(&template));
        inner.order.push_back(key);
        inner.evict_if_needed();
        template
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.map.clear();
        inner.order.clear();
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(256)
    }
}

impl CacheInner {
    fn evict_if_needed(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }
}
