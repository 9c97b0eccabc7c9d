//! Booking document model
//!
//! A booking is one customer checkout, composed of one or more line items
//! that may belong to different providers. Only the `status` field of a
//! line item ever mutates after creation; identity fields (service, price,
//! quantity, provider) are frozen at checkout.

use super::status::BookingStatus;
use super::types::CartItem;
use serde::{Deserialize, Serialize};

/// Geographic point selected at checkout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One service or package quantity within a booking, owned by one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Service or package reference
    pub service_id: String,
    /// Display name snapshot captured at checkout
    pub service_name: String,
    /// Image snapshot captured at checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Price snapshot, not a live catalog reference
    pub service_price: f64,
    pub quantity: i32,
    /// Fulfilling provider; `None` only for platform-level items, which
    /// bypass ownership checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// The only field that mutates after checkout
    pub status: BookingStatus,
}

impl LineItem {
    /// Freeze a cart item into a pending line item
    pub fn from_cart_item(item: &CartItem) -> Self {
        Self {
            service_id: item.service_id.clone(),
            service_name: item.service_name.clone(),
            image_url: item.image_url.clone(),
            service_price: item.service_price,
            quantity: item.quantity,
            provider_id: item.provider_id.clone(),
            status: BookingStatus::Pending,
        }
    }

    /// Whether the given provider owns this item
    pub fn belongs_to(&self, provider_id: &str) -> bool {
        self.provider_id.as_deref() == Some(provider_id)
    }
}

/// Booking document as persisted in the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned document id; absent until the first write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-facing 8-digit identifier generated at checkout.
    /// Drawn at random with no uniqueness probe against existing bookings.
    pub booking_group_id: u32,
    /// Owner reference, set once at creation
    pub customer_id: String,
    /// Customer display name snapshot
    pub customer_name: String,
    /// Insertion order = cart order at checkout; count and identity are
    /// immutable after creation
    pub items: Vec<LineItem>,
    /// Customer-requested fulfilment timestamp (Unix milliseconds)
    pub booking_date: i64,
    pub location: GeoPoint,
    /// Derived from `items[].status`; never independently settable
    pub status: BookingStatus,
    /// Snapshot of `Σ service_price × quantity` at checkout; not recomputed
    /// on later item mutation
    pub total_price: f64,
    /// Item count snapshot at checkout
    pub total_items: i32,
    /// Set once a post-completion rating is submitted; one rating per booking
    #[serde(default)]
    pub rated: bool,
    /// Free text persisted when a cancellation is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Server-assigned creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Booking {
    /// Current status of every line item, in array order
    pub fn item_statuses(&self) -> Vec<BookingStatus> {
        self.items.iter().map(|i| i.status).collect()
    }

    /// Whether any line item belongs to the given provider
    pub fn has_provider_items(&self, provider_id: &str) -> bool {
        self.items.iter().any(|i| i.belongs_to(provider_id))
    }

    pub fn is_completed(&self) -> bool {
        self.status == BookingStatus::Completed
    }
}

/// Post-completion rating, stored in its own collection.
///
/// Written as a sibling of the `rated` flag flip on the booking; there is
/// no cross-document atomicity between the two writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub booking_id: String,
    pub customer_id: String,
    /// 1-5
    pub stars: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: i64,
}
