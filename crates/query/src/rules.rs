//! Which cache entries a successful mutation invalidates.

use finboard_core::models::{EntityId, EntityKind};

use crate::key::Invalidation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

/// Kinds whose cached data embeds or derives from `kind` and so must be
/// refreshed after `mutation`.
pub fn dependents(kind: EntityKind, mutation: Mutation) -> &'static [EntityKind] {
    use EntityKind::*;
    match (kind, mutation) {
        // Bills embed the category name; a new category changes no bill.
        (Categories, Mutation::Create) => &[],
        (Categories, _) => &[Bills],
        (CreditCards, Mutation::Create) => &[],
        (CreditCards, _) => &[Bills, Invoices, CreditCardLimits],
        (Bills, _) => &[Invoices, CreditCardLimits],
        (Invoices, _) => &[CreditCardLimits],
        (CreditCardLimits, _) => &[],
    }
}

/// Everything to invalidate after `mutation` of `kind`: its lists, the
/// record itself when `id` is known, and every dependent kind.
pub fn invalidations_for(
    kind: EntityKind,
    mutation: Mutation,
    id: Option<EntityId>,
) -> Vec<Invalidation> {
    let mut targets = vec![Invalidation::Lists(kind)];
    if let Some(id) = id {
        targets.push(Invalidation::Record(kind, id));
    }
    targets.extend(dependents(kind, mutation).iter().copied().map(Invalidation::Kind));
    targets
}
