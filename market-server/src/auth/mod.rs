//! 认证授权模块
//!
//! 令牌由外部认证服务签发，这里只负责校验和访问控制：
//! - [`JwtService`] - JWT 校验 (以及测试用的签发)
//! - [`CurrentUser`] - 当前用户上下文 (extractor)
//! - [`Access`] / [`authorize`] - 路由级能力检查，在调用任何引擎之前执行

pub mod extractor;
pub mod jwt;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use permissions::{Access, authorize};
