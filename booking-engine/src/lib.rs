//! Booking status aggregation engine
//!
//! Core of the marketplace's multi-provider order handling:
//! - `bookings`: checkout, per-provider status mutation, rating
//! - `policy`: which line items an actor may mutate
//! - `projection`: per-viewer real-time views over the booking stream
//! - `store`: the document-database seam plus an in-memory backend
//!
//! The booking-level status is always derived from the line-item statuses
//! (`shared::booking::derive_booking_status`); nothing in this crate sets
//! it independently, except that a cancellation writes the derived
//! `CANCELLED` together with its reason.

pub mod bookings;
pub mod config;
pub mod money;
pub mod policy;
pub mod projection;
pub mod store;
pub mod utils;

pub use bookings::{BookingError, BookingManager, BookingResult, CheckoutRequest};
pub use config::EngineConfig;
pub use projection::{Viewer, ViewerFeed};
pub use store::{MemoryStore, RecordStore};
