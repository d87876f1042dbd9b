//! Cache keys and invalidation targets.

use std::fmt;

use finboard_core::models::{canonical_query, EntityId, EntityKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// A list query, identified by its canonical query string.
    List(String),
    /// A single record.
    Detail(EntityId),
}

/// Identifies one cached query: entity kind plus parameters.
///
/// Two filters that serialize to the same query pairs share a key, so
/// field order and absent values never split the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: EntityKind,
    pub scope: KeyScope,
}

impl QueryKey {
    pub fn list<F: Serialize>(kind: EntityKind, filter: &F) -> Self {
        Self {
            kind,
            scope: KeyScope::List(canonical_query(filter)),
        }
    }

    pub fn detail(kind: EntityKind, id: EntityId) -> Self {
        Self {
            kind,
            scope: KeyScope::Detail(id),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.scope, KeyScope::List(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::List(query) if query.is_empty() => write!(f, "{}", self.kind),
            KeyScope::List(query) => write!(f, "{}?{}", self.kind, query),
            KeyScope::Detail(id) => write!(f, "{}/{}", self.kind, id),
        }
    }
}

/// Selects the cache entries an invalidation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    All,
    /// Every list and record of a kind.
    Kind(EntityKind),
    /// Every list of a kind.
    Lists(EntityKind),
    Record(EntityKind, EntityId),
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidation::All => true,
            Invalidation::Kind(kind) => key.kind == *kind,
            Invalidation::Lists(kind) => key.kind == *kind && key.is_list(),
            Invalidation::Record(kind, id) => {
                key.kind == *kind && key.scope == KeyScope::Detail(*id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finboard_core::bills::BillFilter;
    use finboard_core::models::PageRequest;

    #[test]
    fn test_equal_filters_share_a_key() {
        let a = BillFilter::default().with_name("luz").with_category(3);
        let b = BillFilter::default().with_category(3).with_name("luz");
        assert_eq!(
            QueryKey::list(EntityKind::Bills, &a),
            QueryKey::list(EntityKind::Bills, &b)
        );
    }

    #[test]
    fn test_page_change_is_a_new_key() {
        let first = BillFilter::default();
        let second = BillFilter::default().with_page(PageRequest::new(1, 10));
        assert_ne!(
            QueryKey::list(EntityKind::Bills, &first),
            QueryKey::list(EntityKind::Bills, &second)
        );
    }

    #[test]
    fn test_invalidation_matching() {
        let list = QueryKey::list(EntityKind::Bills, &BillFilter::default());
        let record = QueryKey::detail(EntityKind::Bills, 4);
        let other = QueryKey::detail(EntityKind::Invoices, 4);

        assert!(Invalidation::Lists(EntityKind::Bills).matches(&list));
        assert!(!Invalidation::Lists(EntityKind::Bills).matches(&record));
        assert!(Invalidation::Record(EntityKind::Bills, 4).matches(&record));
        assert!(!Invalidation::Record(EntityKind::Bills, 5).matches(&record));
        assert!(Invalidation::Kind(EntityKind::Bills).matches(&record));
        assert!(!Invalidation::Kind(EntityKind::Bills).matches(&other));
        assert!(Invalidation::All.matches(&other));
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryKey::detail(EntityKind::CreditCards, 2).to_string(), "credit-cards/2");
        let key = QueryKey::list(EntityKind::Bills, &BillFilter::default());
        assert_eq!(key.to_string(), "bills?page=0&size=10");
    }
}
