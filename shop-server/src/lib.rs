//! Shop Server - 订单生命周期与支付对账引擎
//!
//! # 架构概述
//!
//! 本模块是服务器的主入口，提供以下核心功能：
//!
//! - **库存账本** (`db::repository::inventory`): 原子预留/回补
//! - **订单存储** (`db::repository::order`): 创建 + 乐观状态迁移
//! - **订单动作** (`orders`): 下单、取消、回调对账
//! - **支付网关** (`gateway`): 不可靠外部协作方的适配器
//! - **通知** (`notify`): 用户状态消息 (日志 / Telegram)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! shop-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── db/            # 数据库层 (SQLite WAL)
//! ├── orders/        # 订单动作 (引擎核心)
//! ├── gateway/       # 支付网关适配器
//! ├── notify/        # 通知
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod gateway;
pub mod notify;
pub mod orders;
pub mod utils;

// Re-export 公共类型 (crate:: 前缀避免与内建 core crate 歧义)
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_  ____  ____
  \__ \/ __ \/ __ \/ __ \
 ___/ / / / / /_/ / /_/ /
/____/_/ /_/\____/ .___/
                /_/
    "#
    );
}
