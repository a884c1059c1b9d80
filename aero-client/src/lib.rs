//! AeroKits client crate
//!
//! 店面与供应商仪表盘的非 UI 部分：
//!
//! - **购物车** (`cart`): 进程内状态 + redb 本地持久化 + watch 变更通知
//! - **结账** (`checkout`): 前置条件门控、快照冻结、发票序号获取、订单提交
//! - **订单面板** (`feed`): 拉取-分组管线 + 失效-重取刷新
//! - **同步订阅** (`sync`): 连接服务端同步总线的 TCP 监听器
//! - **本地存储** (`storage`): 购物车与记住的尾号的 redb 键值层

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod storage;
pub mod sync;

// Re-exports
pub use cart::{CartBackend, CartSnapshot, CartStore};
pub use checkout::{CheckoutForm, Fbo, default_fbos, submit_order};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use feed::OrderFeed;
pub use http::HttpClient;
pub use storage::{LocalStore, StorageError};
pub use sync::SyncListener;
