use serde::{Deserialize, Serialize};

/// Server-assigned record identifier.
pub type EntityId = i64;

/// The kinds of server resources the client caches.
///
/// Used as the first half of every cache key and as the target of
/// invalidation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Bills,
    Categories,
    CreditCards,
    /// Available limit of a credit card, fetched separately from the card.
    CreditCardLimits,
    Invoices,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Bills,
        EntityKind::Categories,
        EntityKind::CreditCards,
        EntityKind::CreditCardLimits,
        EntityKind::Invoices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Bills => "bills",
            EntityKind::Categories => "categories",
            EntityKind::CreditCards => "credit-cards",
            EntityKind::CreditCardLimits => "credit-card-limits",
            EntityKind::Invoices => "invoices",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight reference to a related record, as embedded by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}
