use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{InventoryLedger, OrderRepository, ProductRepository};
use crate::gateway::{MockGateway, PaymentGateway, ZarinpalGateway};
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是引擎的核心数据结构。使用 Arc 实现浅拷贝，
/// 每个请求处理器持有一份克隆。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 (WAL) |
/// | gateway | Arc<dyn PaymentGateway> | 支付网关适配器 |
/// | notifier | Arc<dyn Notifier> | 用户通知 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 支付网关适配器
    pub gateway: Arc<dyn PaymentGateway>,
    /// 用户通知
    pub notifier: Arc<dyn Notifier>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造，测试场景常用)
    pub fn new(
        config: Config,
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            pool,
            gateway,
            notifier,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/shop.db)
    /// 3. 支付网关 (未配置商户号时使用 mock)
    /// 4. 通知渠道 (未配置 bot token 时只写日志)
    ///
    /// # Panics
    ///
    /// 数据库或网关初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("shop.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");

        // 2. Payment gateway
        let gateway: Arc<dyn PaymentGateway> = if config.gateway.merchant_id.is_empty() {
            tracing::warn!("ZARINPAL_MERCHANT_ID not set, using mock payment gateway");
            Arc::new(MockGateway::new())
        } else {
            Arc::new(
                ZarinpalGateway::new(&config.gateway).expect("Failed to initialize gateway client"),
            )
        };

        // 3. Notifier
        let notifier: Arc<dyn Notifier> = match &config.telegram_bot_token {
            Some(token) => Arc::new(TelegramNotifier::new(token.clone())),
            None => Arc::new(LogNotifier),
        };

        Self::new(config.clone(), db_service.pool, gateway, notifier)
    }

    /// 获取数据库连接池
    pub fn get_pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn order_repository(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn product_repository(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn inventory_ledger(&self) -> InventoryLedger {
        InventoryLedger::new(self.pool.clone())
    }
}
