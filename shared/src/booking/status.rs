//! Booking status machine and the order-level derivation rule
//!
//! Line items move `Pending → Confirmed → Ready → Completed` as the owning
//! provider fulfils them; `Cancelled` is terminal and reachable from any
//! non-terminal state. The booking-level status is never stored
//! independently: it is recomputed from the item statuses on every mutation
//! via [`derive_booking_status`].

use serde::{Deserialize, Serialize};

/// Status of a single line item, and (derived) of a whole booking.
///
/// Items and bookings share the same value set: the derivation rule below
/// maps a list of item statuses onto one booking status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Awaiting provider confirmation
    #[default]
    Pending,
    /// Provider has accepted the item
    Confirmed,
    /// Prepared, awaiting the booking date
    Ready,
    /// Fulfilled
    Completed,
    /// Terminal, reachable from any non-terminal state
    Cancelled,
}

impl BookingStatus {
    /// Whether no further forward transition exists from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Derive the booking-level status from the item statuses.
///
/// Threshold rules, checked in order:
///
/// 1. every item `Cancelled` → `Cancelled`
/// 2. every item `Completed` → `Completed`
/// 3. every item in {`Ready`, `Completed`} → `Ready`
/// 4. every item in {`Confirmed`, `Ready`, `Completed`} → `Confirmed`
/// 5. otherwise → `last_written`
///
/// Rule 5 is NOT a "lowest common status": when items are in a genuinely
/// mixed state (say one `Pending`, one `Confirmed`), the booking reflects
/// the status of whichever mutation just ran, so the UI answers the action
/// the actor just took. `last_written` must be the target status of that
/// mutation; passing it explicitly keeps this a total pure function with no
/// dependence on mutation order or hidden state.
pub fn derive_booking_status(items: &[BookingStatus], last_written: BookingStatus) -> BookingStatus {
    use BookingStatus::*;

    if items.iter().all(|s| *s == Cancelled) {
        return Cancelled;
    }
    if items.iter().all(|s| *s == Completed) {
        return Completed;
    }
    if items.iter().all(|s| matches!(s, Ready | Completed)) {
        return Ready;
    }
    if items.iter().all(|s| matches!(s, Confirmed | Ready | Completed)) {
        return Confirmed;
    }
    last_written
}
