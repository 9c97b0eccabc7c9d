//! Live viewer feeds
//!
//! A [`ViewerFeed`] binds a store subscription to a viewer projection: on
//! every change-feed delivery it decodes the raw result set, re-runs the
//! pure projection, and publishes the projected view through a watch
//! channel. Consumers read the latest view or await the next change;
//! intermediate snapshots they were too slow for are simply superseded.

use super::{project_for_admin, project_for_customer, project_for_provider};
use crate::store::{BookingStore, Subscription, decode_booking};
use shared::booking::Booking;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Who is looking at the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Customer { customer_id: String },
    Provider { provider_id: String },
    Admin,
}

impl Viewer {
    fn project(&self, bookings: Vec<Booking>) -> Vec<Booking> {
        match self {
            Viewer::Customer { .. } => project_for_customer(bookings),
            Viewer::Provider { provider_id } => project_for_provider(&bookings, provider_id),
            Viewer::Admin => project_for_admin(bookings),
        }
    }
}

/// Live, projected view of the booking stream for one viewer
#[derive(Debug)]
pub struct ViewerFeed {
    rx: watch::Receiver<Vec<Booking>>,
    token: CancellationToken,
}

impl ViewerFeed {
    /// Open the store subscription for the viewer and start projecting.
    /// Customer feeds filter store-side; provider and admin feeds subscribe
    /// to everything (the store cannot filter inside the items array).
    pub fn spawn(store: &BookingStore, viewer: Viewer) -> Self {
        let subscription = match &viewer {
            Viewer::Customer { customer_id } => store.subscribe_customer(customer_id),
            Viewer::Provider { .. } | Viewer::Admin => store.subscribe_all(),
        };
        let (tx, rx) = watch::channel(Vec::new());
        let token = CancellationToken::new();
        tokio::spawn(run(subscription, viewer, tx, token.clone()));
        Self { rx, token }
    }

    /// Latest projected view
    pub fn current(&self) -> Vec<Booking> {
        self.rx.borrow().clone()
    }

    /// Wait for the next delivery and return the projected view.
    /// Returns `None` once the feed is shut down or the store is gone.
    pub async fn changed(&mut self) -> Option<Vec<Booking>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stop the background task and drop the store subscription
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl Drop for ViewerFeed {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run(
    mut subscription: Subscription,
    viewer: Viewer,
    tx: watch::Sender<Vec<Booking>>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            delivery = subscription.recv() => {
                let Some(documents) = delivery else { break };
                let bookings: Vec<Booking> = documents
                    .iter()
                    .filter_map(|doc| match decode_booking(doc) {
                        Ok(booking) => Some(booking),
                        Err(e) => {
                            tracing::warn!(doc_id = %doc.id, error = %e, "skipping undecodable booking document");
                            None
                        }
                    })
                    .collect();
                if tx.send(viewer.project(bookings)).is_err() {
                    break;
                }
            }
        }
    }
}
