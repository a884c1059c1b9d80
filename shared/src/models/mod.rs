//! Data Models
//!
//! 核心数据模型，服务端与客户端共用。

pub mod cart;
pub mod kit;
pub mod order;

// Re-exports
pub use cart::CartItem;
pub use kit::{Kit, KitCreate};
pub use order::{
    DELIVERY_WINDOW_SECS, LineItem, Order, OrderCreate, OrderStatus, TailGroup, group_by_tail,
};
