//! BookingManager - operation entry point
//!
//! Wires actions to the typed store, emits booking events after each
//! successful operation, and owns the cross-cutting concerns the actions
//! stay out of: logging and cart clearing.
//!
//! # Operation flow
//!
//! ```text
//! place_booking / update_status / submit_rating
//!     ├─ 1. Build the action
//!     ├─ 2. Execute against the store (single-document writes)
//!     ├─ 3. Broadcast a BookingEvent to in-process subscribers
//!     └─ 4. Return the result (store failures propagate unchanged)
//! ```
//!
//! Propagation to customers/providers/admins does not depend on the event
//! channel: every store write triggers the change feed that the projection
//! layer subscribes to.

use super::actions::{
    ActionContext, BookingAction, CheckoutRequest, PlaceBookingAction, StatusChangeOutcome,
    SubmitRatingAction, UpdateStatusAction,
};
use super::BookingResult;
use crate::config::EngineConfig;
use crate::store::{BookingStore, RecordStore};
use shared::booking::{
    Actor, Booking, BookingEvent, BookingEventType, BookingStatus, Cart, EventPayload, Rating,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Booking operation entry point
#[derive(Debug, Clone)]
pub struct BookingManager {
    bookings: BookingStore,
    event_tx: broadcast::Sender<BookingEvent>,
}

impl BookingManager {
    pub fn new(store: Arc<dyn RecordStore>, config: &EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            bookings: BookingStore::new(store, config),
            event_tx,
        }
    }

    /// In-process event feed (observability; the store change feed is the
    /// propagation channel)
    pub fn subscribe_events(&self) -> broadcast::Receiver<BookingEvent> {
        self.event_tx.subscribe()
    }

    /// Typed store handle, used by projection feeds
    pub fn store(&self) -> &BookingStore {
        &self.bookings
    }

    /// Checkout: freeze the cart into a pending booking.
    ///
    /// The cart is cleared only when the store write succeeds; on any
    /// failure it is left intact so the customer can retry.
    pub async fn place_booking(
        &self,
        actor: &Actor,
        cart: &mut Cart,
        request: CheckoutRequest,
    ) -> BookingResult<Booking> {
        let action = PlaceBookingAction { cart, request };
        let ctx = ActionContext {
            bookings: &self.bookings,
            actor,
        };
        let booking = action.execute(&ctx).await.inspect_err(|e| {
            tracing::warn!(customer_id = %actor.id, error = %e, "checkout failed, cart kept");
        })?;
        cart.clear();

        let booking_id = booking.id.clone().unwrap_or_default();
        tracing::info!(
            booking_id = %booking_id,
            booking_group_id = booking.booking_group_id,
            total_price = booking.total_price,
            "booking placed"
        );
        self.emit(BookingEvent::new(
            booking_id,
            actor,
            BookingEventType::BookingPlaced,
            EventPayload::BookingPlaced {
                booking_group_id: booking.booking_group_id,
                total_price: booking.total_price,
                total_items: booking.total_items,
            },
        ));
        Ok(booking)
    }

    /// Apply a status change to the items the actor owns and recompute the
    /// booking-level status
    pub async fn update_status(
        &self,
        actor: &Actor,
        booking_id: &str,
        target: BookingStatus,
        reason: Option<String>,
    ) -> BookingResult<Booking> {
        let action = UpdateStatusAction {
            booking_id: booking_id.to_string(),
            target,
            reason: reason.clone(),
        };
        let ctx = ActionContext {
            bookings: &self.bookings,
            actor,
        };
        let StatusChangeOutcome {
            booking,
            items_touched,
        } = action.execute(&ctx).await?;

        tracing::info!(
            booking_id = %booking_id,
            actor_id = %actor.id,
            target = ?target,
            derived = ?booking.status,
            items_touched,
            "status change applied"
        );
        self.emit(BookingEvent::new(
            booking_id,
            actor,
            BookingEventType::StatusChanged,
            EventPayload::StatusChanged {
                target,
                derived: booking.status,
                items_touched,
                reason,
            },
        ));
        Ok(booking)
    }

    /// Submit the one post-completion rating for a booking
    pub async fn submit_rating(
        &self,
        actor: &Actor,
        booking_id: &str,
        stars: u8,
        comment: Option<String>,
    ) -> BookingResult<Rating> {
        let action = SubmitRatingAction {
            booking_id: booking_id.to_string(),
            stars,
            comment,
        };
        let ctx = ActionContext {
            bookings: &self.bookings,
            actor,
        };
        let rating = action.execute(&ctx).await?;

        tracing::info!(booking_id = %booking_id, stars, "rating submitted");
        self.emit(BookingEvent::new(
            booking_id,
            actor,
            BookingEventType::RatingSubmitted,
            EventPayload::RatingSubmitted {
                rating_id: rating.id.clone().unwrap_or_default(),
                stars,
            },
        ));
        Ok(rating)
    }

    /// Convenience lookup for callers that only hold the store id
    pub async fn get_booking(&self, booking_id: &str) -> BookingResult<Booking> {
        self.bookings.get_booking(booking_id).await
    }

    fn emit(&self, event: BookingEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
