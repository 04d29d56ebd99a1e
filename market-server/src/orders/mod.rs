//! 订单生命周期 (Order Lifecycle)
//!
//! - [`manager`]: creation from priced lines, the status state machine,
//!   listing, notifications
//! - [`shipping`]: distance-based shipping cost

pub mod manager;
pub mod shipping;

pub use manager::{ManagerError, OrderPolicy, OrdersManager};
pub use shipping::shipping_cost;
