//! Shared types for the booking marketplace
//!
//! Domain types used by the engine and any future client: the booking
//! document model, status machine, cart input, actor identity, and booking
//! events.

pub mod booking;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use booking::{
    Actor, ActorRole, Booking, BookingEvent, BookingEventType, BookingStatus, Cart, CartItem,
    EventPayload, GeoPoint, LineItem, Rating, derive_booking_status,
};
