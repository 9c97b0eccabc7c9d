//! PlaceBooking command handler
//!
//! Freezes the customer's cart into a booking document: every item starts
//! `Pending`, price and item-count snapshots are taken, and the whole
//! document is persisted in one atomic write. The cart itself is cleared
//! by the manager only after that write succeeds.

use async_trait::async_trait;
use validator::Validate;

use super::{ActionContext, BookingAction};
use crate::bookings::{BookingError, BookingResult};
use crate::{money, policy};
use serde::{Deserialize, Serialize};
use shared::booking::{Booking, BookingStatus, Cart, GeoPoint, LineItem};
use shared::util::{booking_group_id, now_millis};

/// Checkout input besides the cart. Date and location are the two fields
/// this operation is responsible for validating; cart emptiness is
/// enforced upstream by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Customer-requested fulfilment timestamp (Unix milliseconds)
    #[validate(required)]
    pub booking_date: Option<i64>,
    #[validate(required)]
    pub location: Option<GeoPoint>,
}

/// PlaceBooking action
#[derive(Debug)]
pub struct PlaceBookingAction<'c> {
    pub cart: &'c Cart,
    pub request: CheckoutRequest,
}

#[async_trait]
impl BookingAction for PlaceBookingAction<'_> {
    type Output = Booking;

    async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<Self::Output> {
        // 1. Only customers check out
        if !policy::may_place_booking(ctx.actor) {
            return Err(BookingError::Forbidden(
                "only customers can place bookings".to_string(),
            ));
        }

        // 2. Required fields; nothing is written on failure
        self.request
            .validate()
            .map_err(|e| BookingError::Validation(e.to_string()))?;
        let (Some(booking_date), Some(location)) = (self.request.booking_date, self.request.location)
        else {
            return Err(BookingError::Validation(
                "booking_date and location are required".to_string(),
            ));
        };

        // 3. Per-item bounds before any price math
        for item in self.cart.items() {
            money::validate_cart_item(item)?;
        }

        // 4. Freeze the cart: every item Pending, snapshots taken now
        let items: Vec<LineItem> = self
            .cart
            .items()
            .iter()
            .map(LineItem::from_cart_item)
            .collect();
        let total_items: i32 = items.iter().map(|i| i.quantity).sum();
        let booking = Booking {
            id: None,
            booking_group_id: booking_group_id(),
            customer_id: ctx.actor.id.clone(),
            customer_name: ctx.actor.name.clone(),
            total_price: money::cart_total(self.cart.items()),
            total_items,
            items,
            booking_date,
            location,
            status: BookingStatus::Pending,
            rated: false,
            cancellation_reason: None,
            created_at: now_millis(),
        };

        // 5. Single document write; the store failure, if any, propagates
        let id = ctx.bookings.create_booking(&booking).await?;

        Ok(Booking {
            id: Some(id),
            ..booking
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::store::{BookingStore, MemoryStore, Query, RecordStore};
    use shared::booking::{Actor, CartItem};
    use std::sync::Arc;

    fn cart_item(service: &str, provider: &str, price: f64, quantity: i32) -> CartItem {
        CartItem {
            service_id: service.to_string(),
            service_name: format!("{} service", service),
            service_price: price,
            quantity,
            image_url: Some(format!("https://img.test/{}.jpg", service)),
            provider_id: Some(provider.to_string()),
        }
    }

    fn two_provider_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(cart_item("svc-1", "prov-1", 80.0, 1));
        cart.add(cart_item("svc-2", "prov-2", 25.5, 2));
        cart
    }

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            booking_date: Some(1_700_000_000_000),
            location: Some(GeoPoint { lat: 46.0, lng: 7.0 }),
        }
    }

    fn repo_on(store: &Arc<MemoryStore>) -> BookingStore {
        BookingStore::new(store.clone(), &EngineConfig::for_tests())
    }

    #[tokio::test]
    async fn checkout_creates_pending_booking_with_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let cart = two_provider_cart();

        let action = PlaceBookingAction {
            cart: &cart,
            request: valid_request(),
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        let booking = action.execute(&ctx).await.unwrap();

        assert!(booking.id.is_some());
        assert!((10_000_000..=99_999_999).contains(&booking.booking_group_id));
        assert_eq!(booking.customer_id, "cust-1");
        assert_eq!(booking.customer_name, "Alex");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.items.iter().all(|i| i.status == BookingStatus::Pending));
        assert_eq!(booking.total_price, 131.0); // 80 + 25.5 * 2
        assert_eq!(booking.total_items, 3);
        assert!(!booking.rated);

        // Persisted form matches
        let stored = repo.get_booking(booking.id.as_deref().unwrap()).await.unwrap();
        assert_eq!(stored, booking);
    }

    #[tokio::test]
    async fn items_preserve_cart_order() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let cart = two_provider_cart();

        let action = PlaceBookingAction {
            cart: &cart,
            request: valid_request(),
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        let booking = action.execute(&ctx).await.unwrap();
        assert_eq!(booking.items[0].service_id, "svc-1");
        assert_eq!(booking.items[1].service_id, "svc-2");
    }

    #[tokio::test]
    async fn missing_booking_date_is_validation_error_without_write() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let cart = two_provider_cart();

        let action = PlaceBookingAction {
            cart: &cart,
            request: CheckoutRequest {
                booking_date: None,
                location: Some(GeoPoint { lat: 46.0, lng: 7.0 }),
            },
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        let result = action.execute(&ctx).await;
        assert!(matches!(result, Err(BookingError::Validation(_))));

        // No document reached the store
        let all = store.query(&Query::collection("bookings")).await.unwrap();
        assert!(all.is_empty());
        // The cart is untouched; the manager never clears it on failure
        assert_eq!(cart.len(), 2);
    }

    #[tokio::test]
    async fn missing_location_is_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let cart = two_provider_cart();

        let action = PlaceBookingAction {
            cart: &cart,
            request: CheckoutRequest {
                booking_date: Some(1_700_000_000_000),
                location: None,
            },
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        assert!(matches!(
            action.execute(&ctx).await,
            Err(BookingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn invalid_cart_item_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let mut cart = Cart::new();
        cart.add(cart_item("svc-1", "prov-1", -5.0, 1));

        let action = PlaceBookingAction {
            cart: &cart,
            request: valid_request(),
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        assert!(matches!(
            action.execute(&ctx).await,
            Err(BookingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn non_customer_roles_cannot_check_out() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let cart = two_provider_cart();

        for actor in [
            Actor::provider("prov-1", "Alpine Tours"),
            Actor::admin("adm-1", "Ops"),
        ] {
            let action = PlaceBookingAction {
                cart: &cart,
                request: valid_request(),
            };
            let ctx = ActionContext {
                bookings: &repo,
                actor: &actor,
            };
            assert!(matches!(
                action.execute(&ctx).await,
                Err(BookingError::Forbidden(_))
            ));
        }
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_on(&store);
        let actor = Actor::customer("cust-1", "Alex");
        let cart = two_provider_cart();
        store.set_offline(true);

        let action = PlaceBookingAction {
            cart: &cart,
            request: valid_request(),
        };
        let ctx = ActionContext {
            bookings: &repo,
            actor: &actor,
        };
        let err = action.execute(&ctx).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
