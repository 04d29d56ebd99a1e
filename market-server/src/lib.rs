//! Market Server - 多卖家外卖市场的履约核心
//!
//! # 架构概述
//!
//! - **购物车定价** (`pricing`, `carts`): 按目录快照重新计算价格，丢弃失效的行
//! - **附近匹配** (`geo`): 网格空间索引 + 可组合的查询管道
//! - **订单状态机** (`orders`): 单卖家下单、配送距离和运费、状态流转
//! - **实时通知** (`notifications`): 按卖家/买家分发的 SSE 流 + Expo 推送
//!
//! # 模块结构
//!
//! ```text
//! market-server/src/
//! ├── core/           # 配置、状态、服务器
//! ├── auth/           # JWT 校验、路由能力检查
//! ├── api/            # HTTP 路由和处理器
//! ├── catalog/        # 商品/用户快照、评价和收藏
//! ├── locations/      # 位置记录与卖家索引维护
//! ├── geo/            # 距离、空间索引、查询管道、发现服务
//! ├── pricing/        # 行定价与购物车校验
//! ├── carts/          # 持久化购物车
//! ├── orders/         # 订单管理器、运费
//! ├── notifications/  # 通知中心、推送
//! ├── storage/        # redb 持久化
//! └── utils/          # 日志、校验、响应
//! ```

pub mod api;
pub mod auth;
pub mod carts;
pub mod catalog;
pub mod core;
pub mod geo;
pub mod locations;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use notifications::NotificationHub;
pub use orders::OrdersManager;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 进程级准备: `.env`、日志
///
/// 返回的 guard 必须在 main 中保持存活，否则文件日志会丢失。
pub fn setup_environment() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    dotenv::dotenv().ok();
    let level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());
    init_logger_with_file(level.as_deref(), log_dir.as_deref())
}

pub fn print_banner() {
    println!(
        r#"
    __  ___           __        __
   /  |/  /___ ______/ /_____  / /_
  / /|_/ / __ `/ ___/ //_/ _ \/ __/
 / /  / / /_/ / /  / ,< /  __/ /_
/_/  /_/\__,_/_/  /_/|_|\___/\__/
    "#
    );
}
