//! UpdateStatus command handler
//!
//! Applies one target status to every line item the actor's scope reaches,
//! recomputes the booking-level status, and writes the whole item list back
//! in one document write. Items outside the scope are untouched - a
//! provider addressing a mixed booking silently no-ops on foreign items,
//! and the operation still succeeds.
//!
//! The write carries the items array exactly as read and transformed here;
//! there is no version check, so concurrent status changes to one booking
//! are last-write-wins (see DESIGN.md).

use async_trait::async_trait;

use super::{ActionContext, BookingAction};
use crate::bookings::{BookingError, BookingResult};
use crate::policy;
use shared::booking::{Booking, BookingStatus, derive_booking_status};

/// UpdateStatus action
#[derive(Debug, Clone)]
pub struct UpdateStatusAction {
    pub booking_id: String,
    /// Desired status for the items the actor owns
    pub target: BookingStatus,
    /// Persisted on the booking whenever supplied; callers pass it only on
    /// cancellation flows
    pub reason: Option<String>,
}

/// Result of a status mutation
#[derive(Debug, Clone)]
pub struct StatusChangeOutcome {
    pub booking: Booking,
    /// How many line items the actor's scope actually rewrote
    pub items_touched: usize,
}

#[async_trait]
impl BookingAction for UpdateStatusAction {
    type Output = StatusChangeOutcome;

    async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<Self::Output> {
        // 1. Resolve the mutation scope; read-only actors stop here
        let scope = policy::mutation_scope(ctx.actor);
        if scope.is_read_only() {
            return Err(BookingError::Forbidden(
                "status changes require a provider or admin role".to_string(),
            ));
        }

        // 2. Load the current document
        let mut booking = ctx.bookings.get_booking(&self.booking_id).await?;

        // 3. Rewrite owned items only; identity fields never change
        let mut items_touched = 0;
        for item in &mut booking.items {
            if scope.grants(item) {
                item.status = self.target;
                items_touched += 1;
            }
        }

        // 4. Booking-level status from the full (possibly partially
        //    updated) item set, with the just-written status as the
        //    mixed-state fallback
        let statuses = booking.item_statuses();
        booking.status = derive_booking_status(&statuses, self.target);
        if let Some(reason) = &self.reason {
            booking.cancellation_reason = Some(reason.clone());
        }

        // 5. One write: full item list + derived status (+ reason)
        ctx.bookings
            .write_status(
                &self.booking_id,
                &booking.items,
                booking.status,
                self.reason.as_deref(),
            )
            .await?;

        Ok(StatusChangeOutcome {
            booking,
            items_touched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::store::{BookingStore, MemoryStore};
    use shared::booking::BookingStatus::*;
    use shared::booking::{Actor, GeoPoint, LineItem};
    use std::sync::Arc;

    fn line_item(service: &str, provider: Option<&str>, status: BookingStatus) -> LineItem {
        LineItem {
            service_id: service.to_string(),
            service_name: format!("{} service", service),
            image_url: None,
            service_price: 40.0,
            quantity: 1,
            provider_id: provider.map(str::to_string),
            status,
        }
    }

    /// Two-provider booking: items[0] belongs to prov-1, items[1] to prov-2
    fn two_provider_booking() -> Booking {
        Booking {
            id: None,
            booking_group_id: 44_444_444,
            customer_id: "cust-1".to_string(),
            customer_name: "Alex".to_string(),
            items: vec![
                line_item("svc-1", Some("prov-1"), Pending),
                line_item("svc-2", Some("prov-2"), Pending),
            ],
            booking_date: 1_700_000_000_000,
            location: GeoPoint { lat: 46.0, lng: 7.0 },
            status: Pending,
            total_price: 80.0,
            total_items: 2,
            rated: false,
            cancellation_reason: None,
            created_at: 1_700_000_000_000,
        }
    }

    async fn seeded_repo() -> (BookingStore, String) {
        let repo = BookingStore::new(Arc::new(MemoryStore::new()), &EngineConfig::for_tests());
        let id = repo.create_booking(&two_provider_booking()).await.unwrap();
        (repo, id)
    }

    async fn apply(
        repo: &BookingStore,
        actor: &Actor,
        booking_id: &str,
        target: BookingStatus,
        reason: Option<&str>,
    ) -> BookingResult<StatusChangeOutcome> {
        let action = UpdateStatusAction {
            booking_id: booking_id.to_string(),
            target,
            reason: reason.map(str::to_string),
        };
        let ctx = ActionContext {
            bookings: repo,
            actor,
        };
        action.execute(&ctx).await
    }

    #[tokio::test]
    async fn first_provider_confirm_reflects_last_write() {
        // Scenario: [pending, pending], prov-1 confirms its item. The
        // confirmed threshold is not met (1 of 2), so the booking shows the
        // just-written status, not pending.
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");

        let outcome = apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        assert_eq!(outcome.items_touched, 1);
        assert_eq!(outcome.booking.items[0].status, Confirmed);
        assert_eq!(outcome.booking.items[1].status, Pending);
        assert_eq!(outcome.booking.status, Confirmed);

        let stored = repo.get_booking(&id).await.unwrap();
        assert_eq!(stored.status, Confirmed);
    }

    #[tokio::test]
    async fn second_provider_confirm_meets_threshold() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        let prov2 = Actor::provider("prov-2", "Lakeside Camp");

        apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        let outcome = apply(&repo, &prov2, &id, Confirmed, None).await.unwrap();
        assert_eq!(outcome.booking.item_statuses(), vec![Confirmed, Confirmed]);
        assert_eq!(outcome.booking.status, Confirmed);
    }

    #[tokio::test]
    async fn staggered_ready_passes_through_last_write_fallback() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        let prov2 = Actor::provider("prov-2", "Lakeside Camp");

        apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        apply(&repo, &prov2, &id, Confirmed, None).await.unwrap();

        // [ready, confirmed]: ready threshold fails, last write was Ready
        let mid = apply(&repo, &prov1, &id, Ready, None).await.unwrap();
        assert_eq!(mid.booking.item_statuses(), vec![Ready, Confirmed]);
        assert_eq!(mid.booking.status, Ready);

        // [ready, ready]: threshold met
        let done = apply(&repo, &prov2, &id, Ready, None).await.unwrap();
        assert_eq!(done.booking.status, Ready);
    }

    #[tokio::test]
    async fn admin_cancel_touches_all_items_and_persists_reason() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        let admin = Actor::admin("adm-1", "Ops");

        apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();

        let outcome = apply(&repo, &admin, &id, Cancelled, Some("out of stock"))
            .await
            .unwrap();
        assert_eq!(outcome.items_touched, 2);
        assert!(outcome
            .booking
            .items
            .iter()
            .all(|i| i.status == Cancelled));
        assert_eq!(outcome.booking.status, Cancelled);

        let stored = repo.get_booking(&id).await.unwrap();
        assert_eq!(stored.status, Cancelled);
        assert_eq!(stored.cancellation_reason.as_deref(), Some("out of stock"));
    }

    #[tokio::test]
    async fn provider_never_touches_foreign_items() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");

        let before = repo.get_booking(&id).await.unwrap();
        let outcome = apply(&repo, &prov1, &id, Completed, None).await.unwrap();

        // Foreign item: status and identity untouched
        assert_eq!(outcome.booking.items[1].status, Pending);
        assert_eq!(outcome.booking.items[1].service_id, before.items[1].service_id);
        assert_eq!(
            outcome.booking.items[1].provider_id,
            before.items[1].provider_id
        );
        // Own item: only status changed
        assert_eq!(outcome.booking.items[0].status, Completed);
        assert_eq!(
            outcome.booking.items[0].service_price,
            before.items[0].service_price
        );
        assert_eq!(outcome.booking.items[0].quantity, before.items[0].quantity);
    }

    #[tokio::test]
    async fn foreign_only_mutation_is_a_silent_noop_not_an_error() {
        // prov-3 owns nothing in this booking: zero items touched, the
        // operation still succeeds and recomputes from the unchanged set.
        let (repo, id) = seeded_repo().await;
        let prov3 = Actor::provider("prov-3", "Summit Rides");

        let outcome = apply(&repo, &prov3, &id, Completed, None).await.unwrap();
        assert_eq!(outcome.items_touched, 0);
        assert_eq!(outcome.booking.item_statuses(), vec![Pending, Pending]);
        // No threshold met; the fallback reflects the attempted write
        assert_eq!(outcome.booking.status, Completed);
    }

    #[tokio::test]
    async fn reapplying_same_status_changes_nothing() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");

        let first = apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        let second = apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        assert_eq!(first.booking.items, second.booking.items);
        assert_eq!(first.booking.status, second.booking.status);
    }

    #[tokio::test]
    async fn total_price_snapshot_survives_mutations() {
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        let admin = Actor::admin("adm-1", "Ops");

        apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        apply(&repo, &admin, &id, Cancelled, Some("weather")).await.unwrap();

        let stored = repo.get_booking(&id).await.unwrap();
        assert_eq!(stored.total_price, 80.0);
        assert_eq!(stored.total_items, 2);
    }

    #[tokio::test]
    async fn reason_is_persisted_even_for_non_cancel_targets() {
        // The reason lands whenever supplied, independent of the derived
        // status. Callers only pass it when cancelling.
        let (repo, id) = seeded_repo().await;
        let prov1 = Actor::provider("prov-1", "Alpine Tours");

        apply(&repo, &prov1, &id, Confirmed, Some("note")).await.unwrap();
        let stored = repo.get_booking(&id).await.unwrap();
        assert_eq!(stored.cancellation_reason.as_deref(), Some("note"));
    }

    #[tokio::test]
    async fn customer_is_rejected() {
        let (repo, id) = seeded_repo().await;
        let customer = Actor::customer("cust-1", "Alex");
        assert!(matches!(
            apply(&repo, &customer, &id, Confirmed, None).await,
            Err(BookingError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let repo = BookingStore::new(Arc::new(MemoryStore::new()), &EngineConfig::for_tests());
        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        assert!(matches!(
            apply(&repo, &prov1, "missing", Confirmed, None).await,
            Err(BookingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn platform_items_are_admin_only() {
        let repo = BookingStore::new(Arc::new(MemoryStore::new()), &EngineConfig::for_tests());
        let mut booking = two_provider_booking();
        booking.items.push(line_item("svc-3", None, Pending));
        let id = repo.create_booking(&booking).await.unwrap();

        let prov1 = Actor::provider("prov-1", "Alpine Tours");
        let outcome = apply(&repo, &prov1, &id, Confirmed, None).await.unwrap();
        assert_eq!(outcome.items_touched, 1);
        assert_eq!(outcome.booking.items[2].status, Pending);

        let admin = Actor::admin("adm-1", "Ops");
        let outcome = apply(&repo, &admin, &id, Confirmed, None).await.unwrap();
        assert_eq!(outcome.items_touched, 3);
    }
}
