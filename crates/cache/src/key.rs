use std::fmt::Display;

/// A cache key following the `<entity>:<lookup>[:<value>]` grammar.
///
/// The segment before the first `:` is the key's namespace; namespace
/// purges remove every tracked key sharing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a lookup by primary identity, e.g. `sales_order:5`.
    pub fn by_id(namespace: &str, id: impl Display) -> Self {
        Self(format!("{namespace}:{id}"))
    }

    /// Key for a lookup by another field, e.g. `store:store_code:ST-01`.
    pub fn by_field(namespace: &str, field: &str, value: impl Display) -> Self {
        Self(format!("{namespace}:{field}:{value}"))
    }

    /// Key for a lookup by two fields, e.g. `order_status:sales_order:open`.
    pub fn by_pair(namespace: &str, first: impl Display, second: impl Display) -> Self {
        Self(format!("{namespace}:{first}:{second}"))
    }

    /// Parses a raw key, rejecting keys without a namespace.
    pub fn parse(raw: impl Into<String>) -> crate::Result<Self> {
        let raw = raw.into();
        match raw.split_once(':') {
            Some((ns, rest)) if !ns.is_empty() && !rest.is_empty() => Ok(Self(raw)),
            _ => Err(crate::CacheError::MalformedKey(raw)),
        }
    }

    /// Returns the namespace segment.
    pub fn namespace(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
