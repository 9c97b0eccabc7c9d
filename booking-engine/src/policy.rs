//! Authorization policy
//!
//! Maps an actor's role and identity onto the set of line items they may
//! mutate. Scope is decided once per operation; per-item checks inside a
//! granted scope are silent no-ops rather than errors, so a provider's
//! status change simply leaves foreign items untouched.

use shared::booking::{Actor, ActorRole, LineItem};

/// Which line items of a booking an actor's status mutation reaches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationScope {
    /// Admin: every item of every booking
    AllItems,
    /// Provider: only items carrying this provider id
    OwnItems(String),
    /// Customer: status is read-only
    ReadOnly,
}

impl MutationScope {
    /// Whether this scope reaches the given item.
    ///
    /// Platform-level items (`provider_id == None`) are reachable only by
    /// the all-items scope.
    pub fn grants(&self, item: &LineItem) -> bool {
        match self {
            MutationScope::AllItems => true,
            MutationScope::OwnItems(provider_id) => item.belongs_to(provider_id),
            MutationScope::ReadOnly => false,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, MutationScope::ReadOnly)
    }
}

/// Resolve the mutation scope for an actor
pub fn mutation_scope(actor: &Actor) -> MutationScope {
    match actor.role {
        ActorRole::Admin => MutationScope::AllItems,
        ActorRole::Provider => MutationScope::OwnItems(actor.id.clone()),
        ActorRole::Customer => MutationScope::ReadOnly,
    }
}

/// Only customers create bookings
pub fn may_place_booking(actor: &Actor) -> bool {
    actor.role == ActorRole::Customer
}

/// Only customers rate, and only their own completed bookings (ownership
/// and completion are checked by the action against the loaded document)
pub fn may_submit_rating(actor: &Actor) -> bool {
    actor.role == ActorRole::Customer
}
