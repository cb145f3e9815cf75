//! Pagination session cache.
//!
//! Remembers, per opaque session id, the query text, channel filter and total hit count of a
//! search so later page requests can replay it. Sessions are immutable once opened. The cache
//! is bounded: sessions expire `ttl` after creation, and opening a session on a full cache
//! evicts the oldest one. Evicted or expired ids never come back.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use storage::ChannelFilter;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub query_text: String,
    pub channel_filter: ChannelFilter,
    /// Hit count when the session was opened; not refreshed on later pages.
    pub total_found: i64,
}

struct Entry {
    session: Arc<SearchSession>,
    created_at: Instant,
}

#[derive(Default)]
struct Store {
    entries: HashMap<String, Entry>,
    // Session ids in creation order, oldest first.
    order: VecDeque<String>,
}

impl Store {
    fn purge_expired(&mut self, now: Instant, ttl: Duration) {
        while let Some(oldest) = self.order.front() {
            let expired = self
                .entries
                .get(oldest)
                .map_or(true, |entry| now.duration_since(entry.created_at) >= ttl);
            if !expired {
                break;
            }
            if let Some(id) = self.order.pop_front() {
                self.entries.remove(&id);
            }
        }
    }

    fn evict_oldest(&mut self) -> bool {
        while let Some(id) = self.order.pop_front() {
            if self.entries.remove(&id).is_some() {
                debug!(session_id = %id, "Evicted pagination session");
                return true;
            }
        }
        false
    }
}

pub struct SessionCache {
    store: Mutex<Store>,
    capacity: usize,
    ttl: Duration,
}

impl SessionCache {
    /// Creates a cache holding at most `capacity` sessions (minimum 1), each live for `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Stores a new session and returns its id.
    pub fn open(
        &self,
        query_text: impl Into<String>,
        channel_filter: ChannelFilter,
        total_found: i64,
    ) -> String {
        let session_id = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let session = Arc::new(SearchSession {
            query_text: query_text.into(),
            channel_filter,
            total_found,
        });

        let mut store = self.store.lock();
        store.purge_expired(now, self.ttl);
        while store.entries.len() >= self.capacity {
            if !store.evict_oldest() {
                break;
            }
        }
        store.entries.insert(
            session_id.clone(),
            Entry {
                session,
                created_at: now,
            },
        );
        store.order.push_back(session_id.clone());

        debug!(session_id = %session_id, live = store.entries.len(), "Opened pagination session");
        session_id
    }

    /// Looks up a live session; `None` for unknown, evicted or expired ids.
    pub fn get(&self, session_id: &str) -> Option<Arc<SearchSession>> {
        let now = Instant::now();
        let mut store = self.store.lock();
        store.purge_expired(now, self.ttl);
        store.entries.get(session_id).map(|entry| entry.session.clone())
    }

    /// Number of sessions currently held, expired ones included until the next access.
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_open_then_get() {
        let cache = SessionCache::new(8, Duration::from_secs(60));
        let id = cache.open("你好", ChannelFilter::parse("@chanA"), 42);

        let session = cache.get(&id).expect("live session");
        assert_eq!(session.query_text, "你好");
        assert_eq!(session.channel_filter, ChannelFilter::Username("chanA".to_string()));
        assert_eq!(session.total_found, 42);

        // Lookups do not consume or alter the session.
        assert_eq!(cache.get(&id).as_deref(), Some(&*session));
    }

    #[test]
    fn test_unknown_id_not_found() {
        let cache = SessionCache::new(8, Duration::from_secs(60));
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ids_are_distinct_and_fit_callback_payload() {
        let cache = SessionCache::new(128, Duration::from_secs(60));
        let ids: Vec<String> = (0..100).map(|i| cache.open(format!("q{}", i), ChannelFilter::None, i)).collect();

        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| format!("pg:{}:100000", id).len() <= 64));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = SessionCache::new(2, Duration::from_secs(60));
        let first = cache.open("a", ChannelFilter::None, 1);
        let second = cache.open("b", ChannelFilter::None, 2);
        let third = cache.open("c", ChannelFilter::None, 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&first).is_none());
        assert!(cache.get(&second).is_some());
        assert!(cache.get(&third).is_some());
    }

    #[test]
    fn test_ttl_expires_sessions() {
        let cache = SessionCache::new(8, Duration::from_millis(30));
        let id = cache.open("a", ChannelFilter::None, 1);
        assert!(cache.get(&id).is_some());

        thread::sleep(Duration::from_millis(60));

        assert!(cache.get(&id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_open_keeps_every_entry() {
        let cache = Arc::new(SessionCache::new(1000, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    (0..50)
                        .map(|i| {
                            let id = cache.open(format!("{}-{}", t, i), ChannelFilter::ChatId(t), i);
                            (id, format!("{}-{}", t, i))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for (id, query) in handle.join().expect("thread") {
                let session = cache.get(&id).expect("session present");
                assert_eq!(session.query_text, query);
            }
        }
        assert_eq!(cache.len(), 400);
    }
}
