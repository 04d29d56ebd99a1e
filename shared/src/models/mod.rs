//! Data models
//!
//! Shared between market-server and the mobile clients (via API).
//! Wire format is camelCase; ids are opaque strings.

pub mod cart;
pub mod engagement;
pub mod location;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::*;
pub use engagement::*;
pub use location::*;
pub use order::*;
pub use product::*;
pub use user::*;
