use std::collections::HashMap;

use crate::model::Builder;

/// Sentinel name for ids the cache has never seen. A miss is not an error
/// and never triggers a fetch.
pub const UNKNOWN_BUILDER: &str = "unknown builder";

/// Id/name lookup table for builders. Populated once at session start from
/// an explicit `fetch_builders` round trip; read-only afterwards.
#[derive(Debug, Default)]
pub struct BuilderCache {
    by_id: HashMap<u64, Builder>,
    by_name: HashMap<String, u64>,
}

impl BuilderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot. The first record wins on a duplicate id, keeping
    /// the id-uniqueness invariant.
    pub fn load(&mut self, builders: Vec<Builder>) {
        for builder in builders {
            if self.by_id.contains_key(&builder.builder_id) {
                continue;
            }
            self.by_name.insert(builder.name.clone(), builder.builder_id);
            self.by_id.insert(builder.builder_id, builder);
        }
    }

    pub fn get(&self, builder_id: u64) -> Option<&Builder> {
        self.by_id.get(&builder_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Builder> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    pub fn name_of(&self, builder_id: u64) -> &str {
        self.get(builder_id)
            .map_or(UNKNOWN_BUILDER, |b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(id: u64, name: &str) -> Builder {
        Builder {
            builder_id: id,
            name: name.to_string(),
        }
    }

    #[test]
    fn lookup_before_population_is_unknown() {
        let cache = BuilderCache::new();
        assert_eq!(cache.name_of(1), UNKNOWN_BUILDER);
        assert!(cache.get(1).is_none());
        assert!(cache.by_name("linux").is_none());
    }

    #[test]
    fn load_then_lookup_by_id_and_name() {
        let mut cache = BuilderCache::new();
        cache.load(vec![builder(1, "linux"), builder(2, "macos")]);
        assert_eq!(cache.name_of(1), "linux");
        assert_eq!(cache.by_name("macos").unwrap().builder_id, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn duplicate_id_keeps_first_record() {
        let mut cache = BuilderCache::new();
        cache.load(vec![builder(1, "linux"), builder(1, "linux-dup")]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.name_of(1), "linux");
    }

    #[test]
    fn miss_after_population_is_still_unknown() {
        let mut cache = BuilderCache::new();
        cache.load(vec![builder(1, "linux")]);
        assert_eq!(cache.name_of(99), UNKNOWN_BUILDER);
    }
}
