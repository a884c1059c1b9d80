//! Shared types for the AeroKits system
//!
//! Common types used by both `vendor-server` and `aero-client`:
//! data model, sync bus messages, and unified error types.

pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType, SyncPayload};

// Model re-exports
pub use models::{
    CartItem, DELIVERY_WINDOW_SECS, Kit, KitCreate, LineItem, Order, OrderCreate, OrderStatus,
    TailGroup, group_by_tail,
};

// Error re-exports
pub use error::{ApiResponse, SUCCESS_CODE};
