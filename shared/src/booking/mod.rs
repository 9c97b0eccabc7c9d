//! Booking domain module
//!
//! Types shared between the engine and its clients:
//! - Model: the booking document and its line items
//! - Status: the item status machine and the booking-level derivation rule
//! - Types: cart input and actor identity
//! - Events: facts emitted after an operation commits

pub mod event;
pub mod model;
pub mod status;
pub mod types;

// Re-exports
pub use event::{BookingEvent, BookingEventType, EventPayload};
pub use model::{Booking, GeoPoint, LineItem, Rating};
pub use status::{BookingStatus, derive_booking_status};
pub use types::{Actor, ActorRole, Cart, CartItem};
