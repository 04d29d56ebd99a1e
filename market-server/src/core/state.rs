use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::carts::CartService;
use crate::catalog::{CatalogSeed, CatalogService, EngagementService};
use crate::core::{Config, Result, ServerError};
use crate::geo::{DiscoveryService, SpatialIndex};
use crate::locations::LocationService;
use crate::notifications::{DisabledPushNotifier, ExpoPushNotifier, NotificationHub, PushNotifier};
use crate::orders::OrdersManager;
use crate::pricing::CartPricer;
use crate::storage::MarketStorage;

/// 推送请求超时
const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝 (内部 Arc)，每个请求克隆一份。
///
/// | 字段 | 说明 |
/// |------|------|
/// | storage | redb 持久化 (订单、购物车、位置) |
/// | catalog | 商品和用户快照 |
/// | locations | 位置记录 + 卖家空间索引 |
/// | engagement | 评价和收藏 |
/// | hub | 实时通知流注册表 |
/// | pricer / carts / orders / discovery | 四个核心引擎 |
/// | jwt_service | 令牌校验 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: MarketStorage,
    pub catalog: CatalogService,
    pub locations: LocationService,
    pub engagement: EngagementService,
    pub hub: NotificationHub,
    pub pricer: CartPricer,
    pub carts: CartService,
    pub orders: OrdersManager,
    pub discovery: DiscoveryService,
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("storage", &self.storage)
            .field("hub_streams", &self.hub.stream_count())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (work_dir/market.redb)
    /// 3. 目录种子数据 (CATALOG_SEED)
    /// 4. 各服务与引擎
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir()?;
        let storage = MarketStorage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Storage opened");

        let seed = match &config.catalog_seed {
            Some(path) => {
                let seed = CatalogSeed::load(path)?;
                tracing::info!(
                    path = %path,
                    users = seed.users.len(),
                    products = seed.products.len(),
                    "Catalog seed loaded"
                );
                Some(seed)
            }
            None => None,
        };

        Self::build(config.clone(), storage, seed)
    }

    /// 用已打开的存储组装状态 (测试使用内存存储)
    pub fn build(config: Config, storage: MarketStorage, seed: Option<CatalogSeed>) -> Result<Self> {
        let catalog = CatalogService::new();
        let locations = LocationService::new(
            storage.clone(),
            catalog.clone(),
            Arc::new(SpatialIndex::new()),
        );
        match &seed {
            Some(seed) => {
                catalog.warmup(seed);
                locations.warmup(&seed.locations)?;
            }
            None => locations.rebuild_index()?,
        }

        let engagement = EngagementService::new(storage.clone(), catalog.clone());
        let hub = NotificationHub::new(config.notification_channel_capacity);
        let push: Arc<dyn PushNotifier> = if config.push_enabled {
            let notifier = ExpoPushNotifier::new(config.expo_push_url.clone(), PUSH_TIMEOUT)
                .map_err(|e| ServerError::Config(format!("push client: {}", e)))?;
            Arc::new(notifier)
        } else {
            tracing::info!("Push delivery disabled");
            Arc::new(DisabledPushNotifier)
        };

        let pricer = CartPricer::new(Arc::new(catalog.clone()));
        let carts = CartService::new(storage.clone(), pricer.clone());
        let orders = OrdersManager::new(
            storage.clone(),
            pricer.clone(),
            catalog.clone(),
            locations.clone(),
            hub.clone(),
            push,
            config.order_policy(),
        );
        let discovery = DiscoveryService::new(
            locations.index().clone(),
            catalog.clone(),
            locations.clone(),
            engagement.clone(),
            storage.clone(),
            config.ranking_limit,
        );
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config,
            storage,
            catalog,
            locations,
            engagement,
            hub,
            pricer,
            carts,
            orders,
            discovery,
            jwt_service,
        })
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 关闭所有通知流
    pub fn shutdown(&self) {
        self.hub.shutdown();
        tracing::info!("Notification streams closed");
    }
}
