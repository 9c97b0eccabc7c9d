//! Typed repository over the raw record store
//!
//! All booking and rating persistence goes through here; actions never
//! touch raw documents. Write surface is deliberately small: create,
//! status patch, rated flag - item count, provider assignment and prices
//! have no write path after checkout.

use super::{Direction, Document, Query, RecordStore, StoreError, Subscription};
use crate::bookings::{BookingError, BookingResult};
use crate::config::EngineConfig;
use serde_json::json;
use shared::booking::{Booking, BookingStatus, LineItem, Rating};
use std::sync::Arc;

/// Decode a raw store document into a [`Booking`], injecting the store id
pub fn decode_booking(doc: &Document) -> Result<Booking, StoreError> {
    let mut booking: Booking = serde_json::from_value(doc.data.clone())?;
    booking.id = Some(doc.id.clone());
    Ok(booking)
}

/// Booking/rating repository
#[derive(Debug, Clone)]
pub struct BookingStore {
    store: Arc<dyn RecordStore>,
    bookings: String,
    ratings: String,
}

impl BookingStore {
    pub fn new(store: Arc<dyn RecordStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            bookings: config.bookings_collection.clone(),
            ratings: config.ratings_collection.clone(),
        }
    }

    /// Persist a new booking in a single write, returning the store id
    pub async fn create_booking(&self, booking: &Booking) -> BookingResult<String> {
        let data = serde_json::to_value(booking).map_err(StoreError::from)?;
        let id = self.store.create(&self.bookings, data).await?;
        Ok(id)
    }

    pub async fn get_booking(&self, id: &str) -> BookingResult<Booking> {
        let doc = self.store.get(&self.bookings, id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => BookingError::NotFound(id.to_string()),
            other => other.into(),
        })?;
        Ok(decode_booking(&doc)?)
    }

    /// Single write carrying the full updated item list, the recomputed
    /// booking status, and (when supplied) the cancellation reason.
    ///
    /// No version check precedes the write: the items array lands exactly
    /// as the caller read and transformed it, so concurrent writers on one
    /// booking are last-write-wins.
    pub async fn write_status(
        &self,
        id: &str,
        items: &[LineItem],
        status: BookingStatus,
        reason: Option<&str>,
    ) -> BookingResult<()> {
        let mut patch = json!({
            "items": items,
            "status": status,
        });
        if let Some(reason) = reason {
            patch["cancellation_reason"] = json!(reason);
        }
        self.store
            .update(&self.bookings, id, patch)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => BookingError::NotFound(id.to_string()),
                other => other.into(),
            })
    }

    /// Flip the one-shot rated flag
    pub async fn set_rated(&self, id: &str) -> BookingResult<()> {
        self.store
            .update(&self.bookings, id, json!({ "rated": true }))
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => BookingError::NotFound(id.to_string()),
                other => other.into(),
            })
    }

    /// Sibling write to the ratings collection; no atomicity with the
    /// booking's rated flag
    pub async fn create_rating(&self, rating: &Rating) -> BookingResult<String> {
        let data = serde_json::to_value(rating).map_err(StoreError::from)?;
        let id = self.store.create(&self.ratings, data).await?;
        Ok(id)
    }

    /// One customer's bookings, newest first (store-side filter)
    pub fn subscribe_customer(&self, customer_id: &str) -> Subscription {
        self.store.subscribe(
            Query::collection(&self.bookings)
                .filter("customer_id", customer_id)
                .order_by("created_at", Direction::Desc),
        )
    }

    /// Every booking, newest first. The store cannot filter inside the
    /// items array, so provider views subscribe broadly and filter
    /// client-side in the projection layer.
    pub fn subscribe_all(&self) -> Subscription {
        self.store
            .subscribe(Query::collection(&self.bookings).order_by("created_at", Direction::Desc))
    }
}
