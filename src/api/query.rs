/// Ordered query-string builder. Pairs are emitted in insertion order; a key
/// whose value is `None` is omitted entirely rather than sent empty.
#[derive(Debug, Default)]
pub struct Query {
    pairs: Vec<(&'static str, Option<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &'static str, value: Option<String>) -> Self {
        debug_assert!(
            !self.pairs.iter().any(|(k, _)| *k == key),
            "duplicate query key {key}"
        );
        self.pairs.push((key, value));
        self
    }

    pub fn encode(&self) -> String {
        let present: Vec<String> = self
            .pairs
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref()
                    .map(|v| format!("{}={}", k, urlencoding::encode(v)))
            })
            .collect();
        present.join("&")
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.iter().all(|(_, v)| v.is_none())
    }
}

/// Filters for the `/changes` listing. `None` means "use the server default"
/// and keeps the key out of the query string entirely.
#[derive(Debug, Clone, Default)]
pub struct ChangeFilters {
    pub limit: Option<usize>,
    pub order: Option<String>,
    pub revision: Option<String>,
    pub branch: Option<String>,
}

impl ChangeFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .push("limit", self.limit.map(|n| n.to_string()))
            .push("order", self.order.clone())
            .push("revision", self.revision.clone())
            .push("branch", self.branch.clone())
    }
}

/// Filters for the `/builds` and `/builders/{id}/builds` listings.
#[derive(Debug, Clone, Default)]
pub struct BuildFilters {
    pub limit: Option<usize>,
    pub order: Option<String>,
    pub build_id: Option<u64>,
    pub property: Option<String>,
}

impl BuildFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .push("limit", self.limit.map(|n| n.to_string()))
            .push("order", self.order.clone())
            .push("buildid", self.build_id.map(|n| n.to_string()))
            .push("property", self.property.clone())
    }
}
