//! Process-scoped DNS cache (`spec.md` §4.2): every resolver result is
//! cached forever, keyed by `(query type, name)`. No eviction, no TTL —
//! a scan is short-lived enough that staleness isn't a concern, and a
//! flat append-only map keeps lookups lock-free after the first miss.

use dashmap::DashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Cname,
    A,
    Ns,
    Classify,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryType::Cname => "CNAME",
            QueryType::A => "A",
            QueryType::Ns => "NS",
            QueryType::Classify => "CLASSIFY",
        };
        f.write_str(s)
    }
}

/// Cache entry type is erased to `T: Clone` by the caller; each query type
/// gets its own map so unrelated result shapes never collide on a key.
#[derive(Default)]
pub struct DnsCache<T: Clone> {
    entries: DashMap<(QueryType, String), T>,
}

impl<T: Clone> DnsCache<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, query: QueryType, name: &str) -> Option<T> {
        self.entries.get(&(query, name.to_ascii_lowercase())).map(|v| v.clone())
    }

    pub fn get_or_insert_with(
        &self,
        query: QueryType,
        name: &str,
        compute: impl FnOnce() -> T,
    ) -> T {
        let key = (query, name.to_ascii_lowercase());
        if let Some(v) = self.entries.get(&key) {
            return v.clone();
        }
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    pub fn insert(&self, query: QueryType, name: &str, value: T) {
        self.entries.insert((query, name.to_ascii_lowercase()), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_query_types_do_not_collide() {
        let cache: DnsCache<Vec<String>> = DnsCache::new();
        cache.insert(QueryType::Cname, "app.example.com", vec!["a.cname.net".to_string()]);
        cache.insert(QueryType::Ns, "app.example.com", vec!["ns1.example.com".to_string()]);
        assert_eq!(cache.get(QueryType::Cname, "app.example.com").unwrap().len(), 1);
        assert_eq!(cache.get(QueryType::Ns, "APP.EXAMPLE.COM").unwrap()[0], "ns1.example.com");
    }

    #[test]
    fn miss_returns_none() {
        let cache: DnsCache<Vec<String>> = DnsCache::new();
        assert!(cache.get(QueryType::A, "nothing.example.com").is_none());
    }
}
