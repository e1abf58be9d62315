use std::fmt;

use crate::model::UserId;

/// The two shapes of cacheable reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A (possibly filtered) list of users.
    Collection,
    /// One user by id.
    Item,
}

/// Identifies one cache slot. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Collection { search: Option<String> },
    Item { id: UserId },
}

impl QueryKey {
    /// List key; an empty search term is the same slot as no search.
    pub fn collection(search: Option<&str>) -> Self {
        Self::Collection {
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn item(id: impl Into<UserId>) -> Self {
        Self::Item { id: id.into() }
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Collection { .. } => QueryKind::Collection,
            Self::Item { .. } => QueryKind::Item,
        }
    }

    pub fn search(&self) -> Option<&str> {
        match self {
            Self::Collection { search } => search.as_deref(),
            Self::Item { .. } => None,
        }
    }

    pub fn item_id(&self) -> Option<&UserId> {
        match self {
            Self::Item { id } => Some(id),
            Self::Collection { .. } => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection { search: None } => write!(f, "users"),
            Self::Collection {
                search: Some(search),
            } => write!(f, "users?search={}", search),
            Self::Item { id } => write!(f, "user/{}", id),
        }
    }
}

/// Selects a set of cache slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    /// Exactly one key.
    Exact(QueryKey),
    /// Every key of a kind, e.g. `collection(*)`.
    Kind(QueryKind),
    All,
}

impl QueryFilter {
    /// Every user list regardless of search term.
    pub fn all_collections() -> Self {
        Self::Kind(QueryKind::Collection)
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Kind(kind) => key.kind() == *kind,
            Self::All => true,
        }
    }
}

impl From<QueryKey> for QueryFilter {
    fn from(key: QueryKey) -> Self {
        Self::Exact(key)
    }
}
