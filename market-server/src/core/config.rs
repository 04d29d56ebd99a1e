use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::notifications::DEFAULT_EXPO_PUSH_URL;
use crate::orders::OrderPolicy;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 默认日志级别 |
/// | LOG_DIR | - | 设置后写入按天滚动的日志文件 |
/// | MAX_DELIVERY_RADIUS_KM | 10 | 下单最大配送距离 (含边界) |
/// | SHIPPING_RATE_PER_KM | 4000 | 每公里运费 |
/// | DEFAULT_SEARCH_RADIUS_KM | 5 | 附近搜索默认半径 |
/// | RANKING_LIMIT | 8 | 分类排行每组数量 |
/// | NOTIFICATION_CHANNEL_CAPACITY | 64 | 每个推送流的缓冲 |
/// | EXPO_PUSH_URL | Expo 官方地址 | 推送服务地址 |
/// | PUSH_ENABLED | true | 是否发送推送 |
/// | CATALOG_SEED | - | 启动时加载的目录 JSON |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/market HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// JWT 校验配置
    pub jwt: JwtConfig,

    // === 业务参数 ===
    pub max_delivery_radius_km: f64,
    pub shipping_rate_per_km: u64,
    pub default_search_radius_km: f64,
    pub ranking_limit: usize,
    pub notification_channel_capacity: usize,

    // === 外部协作方 ===
    pub expo_push_url: String,
    pub push_enabled: bool,
    pub catalog_seed: Option<String>,

    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            jwt: JwtConfig::from_env(),

            max_delivery_radius_km: env_or("MAX_DELIVERY_RADIUS_KM", 10.0),
            shipping_rate_per_km: env_or("SHIPPING_RATE_PER_KM", 4000),
            default_search_radius_km: env_or("DEFAULT_SEARCH_RADIUS_KM", 5.0),
            ranking_limit: env_or("RANKING_LIMIT", 8),
            notification_channel_capacity: env_or("NOTIFICATION_CHANNEL_CAPACITY", 64),

            expo_push_url: std::env::var("EXPO_PUSH_URL")
                .unwrap_or_else(|_| DEFAULT_EXPO_PUSH_URL.into()),
            push_enabled: env_or("PUSH_ENABLED", true),
            catalog_seed: std::env::var("CATALOG_SEED").ok().filter(|p| !p.is_empty()),

            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
        }
    }

    /// 覆盖工作目录和端口，并关闭推送
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.push_enabled = false;
        config.catalog_seed = None;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("market.redb")
    }

    /// 确保工作目录存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }

    pub fn order_policy(&self) -> OrderPolicy {
        OrderPolicy {
            max_radius_km: self.max_delivery_radius_km,
            shipping_rate_per_km: self.shipping_rate_per_km,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/market-test", 4100);
        assert_eq!(config.http_port, 4100);
        assert!(!config.push_enabled);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/market-test/market.redb")
        );
    }

    #[test]
    fn test_order_policy_from_config() {
        let mut config = Config::with_overrides("/tmp/market-test", 0);
        config.max_delivery_radius_km = 7.5;
        config.shipping_rate_per_km = 3000;
        let policy = config.order_policy();
        assert_eq!(policy.max_radius_km, 7.5);
        assert_eq!(policy.shipping_rate_per_km, 3000);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("MARKET_TEST_SURELY_UNSET_VAR", 42u32), 42);
    }
}
