//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，进程启动时加载一次，之后只读

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "HK_PROXY_CONFIG";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 数据源配置（东方财富接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 历史K线接口地址
    #[serde(default = "default_push2his_base")]
    pub push2his_base: String,
    /// 行情列表/个股快照接口地址
    #[serde(default = "default_push2_base")]
    pub push2_base: String,
    /// 数据中心（F10 财务数据）接口地址
    #[serde(default = "default_datacenter_base")]
    pub datacenter_base: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 分页拉取行情列表时的并发页数
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_push2his_base() -> String { "https://33.push2his.eastmoney.com".to_string() }
fn default_push2_base() -> String { "https://72.push2.eastmoney.com".to_string() }
fn default_datacenter_base() -> String { "https://datacenter.eastmoney.com".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_page_concurrency() -> usize { 4 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            push2his_base: default_push2his_base(),
            push2_base: default_push2_base(),
            datacenter_base: default_datacenter_base(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            page_concurrency: default_page_concurrency(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// 配置来源：成功加载的文件（None 表示默认值）及加载失败的文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSource {
    pub path: Option<String>,
    pub failures: Vec<(String, String)>,
}

impl ConfigSource {
    /// 输出加载过程，需在日志系统初始化之后调用
    pub fn log(&self) {
        for (path, error) in &self.failures {
            log::warn!("加载配置文件 {} 失败: {}", path, error);
        }
        match &self.path {
            Some(path) => log::info!("从 {} 加载配置成功", path),
            None => log::info!("使用默认配置"),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析配置，缺失字段使用默认值
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// 加载配置
    ///
    /// 优先读取 `HK_PROXY_CONFIG` 指定的文件，其次 config.json、config/config.json，
    /// 都不可用时使用默认值。日志系统依赖配置中的级别，所以这里不写日志，
    /// 加载过程记录在返回的 `ConfigSource` 中，由调用方在日志初始化后输出
    pub fn load() -> (Self, ConfigSource) {
        let explicit = env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(explicit.as_deref(), &["config.json", "config/config.json"])
    }

    /// 按顺序尝试配置文件
    ///
    /// `explicit` 为显式指定的路径，文件不存在也记为失败；
    /// `fallbacks` 中不存在的文件直接跳过
    pub fn load_from(explicit: Option<&str>, fallbacks: &[&str]) -> (Self, ConfigSource) {
        let mut source = ConfigSource::default();

        let candidates = explicit
            .map(|path| (path, true))
            .into_iter()
            .chain(fallbacks.iter().map(|path| (*path, false)));

        for (path, required) in candidates {
            if !required && !Path::new(path).exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => {
                    source.path = Some(path.to_string());
                    return (config, source);
                }
                Err(e) => source.failures.push((path.to_string(), e.to_string())),
            }
        }

        (Self::default(), source)
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
