//! Shared types for the marketplace
//!
//! Domain models, notification payloads, pagination and the unified error
//! system used by market-server and its clients.

pub mod error;
pub mod message;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::NotificationEvent;
pub use pagination::{Page, PageMeta, PageQuery, Paginated};
