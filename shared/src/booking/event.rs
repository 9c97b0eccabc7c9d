//! Booking events - facts emitted after an operation commits
//!
//! Events are observability output: the store change feed is the
//! authoritative propagation channel, events carry the who/what for logs
//! and audit consumers.

use super::status::BookingStatus;
use super::types::Actor;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// Booking event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Event unique ID
    pub event_id: String,
    /// Booking this event belongs to
    pub booking_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Actor who triggered this event
    pub actor_id: String,
    /// Actor name (snapshot for audit)
    pub actor_name: String,
    pub event_type: BookingEventType,
    pub payload: EventPayload,
}

impl BookingEvent {
    pub fn new(
        booking_id: impl Into<String>,
        actor: &Actor,
        event_type: BookingEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.into(),
            timestamp: now_millis(),
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            event_type,
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEventType {
    BookingPlaced,
    StatusChanged,
    RatingSubmitted,
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    BookingPlaced {
        booking_group_id: u32,
        total_price: f64,
        total_items: i32,
    },

    StatusChanged {
        /// Status the actor asked for
        target: BookingStatus,
        /// Booking-level status after recomputation
        derived: BookingStatus,
        /// How many line items the actor's scope actually rewrote
        items_touched: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    RatingSubmitted {
        rating_id: String,
        stars: u8,
    },
}
