//! 港股数据服务
//!
//! 通过可替换的数据源获取港股行情、财务与公司资料，整理为统一响应
//!
//! ## 数据来源
//! - 东方财富 push2his：日线历史行情
//! - 东方财富 push2：港股通成分股、全部港股行情、个股估值快照
//! - 东方财富数据中心：财务报表、主要指标、公司概况、分红派息、证券资料
//!
//! ## 主要功能
//! - 港股代码标准化（5 位补零）
//! - 财务报表 / K线 / 基本信息 / 公司概况 / 每日指标 / 财务指标
//! - 港股通成分股与全部港股列表

mod adapter;
mod code;
mod common;
mod eastmoney;
mod provider;

pub use adapter::{HkDataService, DEFAULT_ADJUST, DEFAULT_INDICATOR, DEFAULT_KLINE_DAYS};
pub use code::{normalize_hk_code, HK_CODE_WIDTH};
pub use common::{get_hk_time, KLINE_COLUMNS, KLINE_FIELD_MAP};
pub use eastmoney::EastmoneyProvider;
pub use provider::HkDataProvider;
