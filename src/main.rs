//! 港股数据代理服务
//!
//! 提供港股财务报表、K线、基本信息等数据的 RESTful API 服务
//! 数据来源：东方财富

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use hk_data_proxy::config::AppConfig;
use hk_data_proxy::handlers;
use hk_data_proxy::services::hk::{EastmoneyProvider, HkDataProvider, HkDataService};

/// 应用程序入口
///
/// 启动 HTTP 服务器，默认监听 0.0.0.0:8000
#[actix_web::main]
async fn main() -> io::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    source.log();

    let provider = EastmoneyProvider::new(&config.provider)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let provider: Arc<dyn HkDataProvider> = Arc::new(provider);

    log::info!(
        "启动港股数据代理服务 {} (数据源: {})",
        env!("CARGO_PKG_VERSION"),
        provider.version()
    );

    let service = web::Data::new(HkDataService::new(provider));
    let bind_addr = config.bind_addr();
    log::info!("监听地址: {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 请求日志
            .wrap(Cors::permissive()) // 允许任意来源
            .app_data(service.clone())
            .configure(handlers::config) // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
