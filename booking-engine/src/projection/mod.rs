//! Per-viewer projections over the booking stream
//!
//! The store's query model cannot filter inside the items array, so the
//! provider view subscribes to every booking and filters client-side.
//! These functions are pure and run from scratch on every snapshot the
//! change feed delivers; [`feed::ViewerFeed`] owns the subscription
//! plumbing.
//!
//! One booking can legitimately present three different status/total pairs
//! at the same moment: the customer sees the stored document, each
//! provider sees only their own items with a recomputed subtotal, the
//! admin sees everything. That divergence is the product's contract, not
//! an artifact of this layer.

mod feed;

pub use feed::{Viewer, ViewerFeed};

use crate::money;
use shared::booking::Booking;

/// Customer view: the stored document, unmodified. The store-side filter
/// (`customer_id == self`) already scoped the result set.
pub fn project_for_customer(bookings: Vec<Booking>) -> Vec<Booking> {
    bookings
}

/// Admin view: every booking, unmodified.
pub fn project_for_admin(bookings: Vec<Booking>) -> Vec<Booking> {
    bookings
}

/// Provider view over a full result set:
/// - bookings containing none of the provider's items are dropped,
/// - `items` is reduced to the provider's own items,
/// - `total_price` becomes the subtotal over those items,
/// - `status` becomes the status of the provider's FIRST remaining item
///   (array order), NOT the booking-level derivation rule.
///
/// Deliberate: the viewer-local status does NOT reuse the booking-level
/// derivation rule over the subset; see DESIGN.md for the open question.
pub fn project_for_provider(bookings: &[Booking], provider_id: &str) -> Vec<Booking> {
    bookings
        .iter()
        .filter_map(|booking| {
            let own: Vec<_> = booking
                .items
                .iter()
                .filter(|item| item.belongs_to(provider_id))
                .cloned()
                .collect();
            if own.is_empty() {
                return None;
            }
            let mut view = booking.clone();
            view.total_price = money::items_total(&own);
            view.status = own[0].status;
            view.items = own;
            Some(view)
        })
        .collect()
}
