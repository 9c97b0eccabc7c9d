//! Shared input and identity types for the booking engine

use serde::{Deserialize, Serialize};

/// Cart line as assembled by the storefront before checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub service_id: String,
    pub service_name: String,
    pub service_price: f64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Fulfilling provider; `None` for platform-level items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// Customer cart. Cleared by checkout only when the booking write succeeds;
/// a failed checkout leaves it intact so the customer can retry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Role of an authenticated actor.
///
/// Sourced from the user profile record held by the external session
/// provider, fetched once per session and trusted for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Customer,
    Provider,
    Admin,
}

/// Authenticated entity attempting an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    /// Display name snapshot, denormalized onto documents the actor creates
    pub name: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn customer(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: ActorRole::Customer,
        }
    }

    pub fn provider(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: ActorRole::Provider,
        }
    }

    pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: ActorRole::Admin,
        }
    }
}
