//! Booking operations, one command per module
//!
//! Each action validates, loads whatever document it needs, and performs
//! its writes through the typed store. The manager wires actions to the
//! store, emits events, and owns cross-cutting concerns (logging, cart
//! clearing).

mod place_booking;
mod submit_rating;
mod update_status;

pub use place_booking::{CheckoutRequest, PlaceBookingAction};
pub use submit_rating::SubmitRatingAction;
pub use update_status::{StatusChangeOutcome, UpdateStatusAction};

use super::BookingResult;
use crate::store::BookingStore;
use async_trait::async_trait;
use shared::booking::Actor;

/// Execution context handed to every action
pub struct ActionContext<'a> {
    pub bookings: &'a BookingStore,
    pub actor: &'a Actor,
}

/// A booking command
#[async_trait]
pub trait BookingAction {
    type Output;

    async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<Self::Output>;
}
