//! Cache key derivation.

/// Default key namespace for book entries.
pub const DEFAULT_NAMESPACE: &str = "book";

/// Builds the cache keys for one namespace.
///
/// Layout:
///
/// | entry        | key                                   |
/// |--------------|---------------------------------------|
/// | single book  | `{ns}:{id}`                           |
/// | live count   | `{ns}:count`                          |
/// | list page    | field `{ns}:page:{page}:size:{size}` of hash `{ns}` |
///
/// Ids are integers, so `{ns}:{id}` never collides with `{ns}:count` or the
/// `{ns}:page:` fields. Every list page lives in the single hash `{ns}`, so
/// deleting that one key drops all pages at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    namespace: String,
}

impl CacheKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn by_id(&self, id: i64) -> String {
        format!("{}:{}", self.namespace, id)
    }

    pub fn count(&self) -> String {
        format!("{}:count", self.namespace)
    }

    /// Hash key grouping every list page.
    pub fn group(&self) -> String {
        self.namespace.clone()
    }

    /// Field of [`Self::group`] holding one page.
    pub fn list_field(&self, page: i64, size: i64) -> String {
        format!("{}:page:{}:size:{}", self.namespace, page, size)
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
