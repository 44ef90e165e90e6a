//! 港股数据代理
//!
//! 将港股数据源的表格数据整理为统一 JSON 响应，供 HTTP 服务和验证脚本共用

pub mod config;   // 配置
pub mod handlers; // HTTP 请求处理器
pub mod models;   // 数据模型定义
pub mod services; // 业务逻辑服务
