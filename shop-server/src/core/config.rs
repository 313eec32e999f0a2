/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/shop | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | ZARINPAL_MERCHANT_ID | (空 = mock 网关) | 支付网关商户号 |
/// | ZARINPAL_CALLBACK_URL | http://localhost:3000/verify | 支付回调地址 |
/// | ZARINPAL_SANDBOX | true | 使用沙箱网关 |
/// | GATEWAY_TIMEOUT_MS | 10000 | 网关请求超时(毫秒) |
/// | RESTOCK_ON_PAYMENT_FAILURE | false | 支付失败时是否回补库存 |
/// | TELEGRAM_BOT_TOKEN | (空 = 仅日志通知) | Telegram 通知机器人 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/shop HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    /// 支付网关配置
    pub gateway: GatewayConfig,

    /// 支付验证失败时是否自动回补库存
    ///
    /// 默认关闭：失败订单保留已占用的库存等待人工处理，只有显式取消才回补。
    pub restock_on_payment_failure: bool,

    /// Telegram 通知机器人 token (未配置时只写日志)
    pub telegram_bot_token: Option<String>,
}

/// 支付网关配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 商户号 (空字符串 = 未配置，使用 mock 网关)
    pub merchant_id: String,
    /// 回调地址，order_id 作为查询参数附加
    pub callback_url: String,
    /// 使用沙箱环境
    pub sandbox: bool,
    /// 网关 HTTP 请求超时 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/shop".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            gateway: GatewayConfig {
                merchant_id: std::env::var("ZARINPAL_MERCHANT_ID").unwrap_or_default(),
                callback_url: std::env::var("ZARINPAL_CALLBACK_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/verify".into()),
                sandbox: std::env::var("ZARINPAL_SANDBOX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
                request_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(10_000),
            },

            restock_on_payment_failure: std::env::var("RESTOCK_ON_PAYMENT_FAILURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),

            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
