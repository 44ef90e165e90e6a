//! 公共常量和辅助函数

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Hong_Kong;
use serde_json::{Number, Value};

// ==================== 东方财富 API 路径 ====================

/// 历史K线（push2his）
pub const EM_KLINE_PATH: &str = "/api/qt/stock/kline/get";
/// 行情列表（push2）
pub const EM_CLIST_PATH: &str = "/api/qt/clist/get";
/// 个股快照（push2）
pub const EM_QUOTE_PATH: &str = "/api/qt/stock/get";
/// 数据中心 F10 报表
pub const EM_DATACENTER_PATH: &str = "/securities/api/data/v1/get";

/// 港股市场编号（secid 前缀）
pub const HK_MARKET_ID: u32 = 116;

pub const EM_KLINE_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";
pub const EM_CLIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// 港股通成分股
pub const GGT_COMPONENTS_FS: &str = "b:DLMK0146,b:DLMK0144";
/// 全部港股
pub const HK_SPOT_FS: &str = "m:128 t:3,m:128 t:4,m:128 t:1,m:128 t:2";

/// 行情列表每页条数
pub const CLIST_PAGE_SIZE: usize = 100;
/// 行情列表最多拉取的页数（全部港股约 30 页）
pub const CLIST_MAX_PAGES: usize = 100;
/// 数据中心每页条数
pub const DATACENTER_PAGE_SIZE: usize = 500;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ==================== 数据源列名 ====================

/// 历史K线列（顺序与 klines 字符串一致）
pub const KLINE_COLUMNS: [&str; 11] = [
    "日期", "开盘", "收盘", "最高", "最低", "成交量", "成交额", "振幅", "涨跌幅", "涨跌额",
    "换手率",
];

/// K线中文列名 -> 英文字段名
pub const KLINE_FIELD_MAP: [(&str, &str); 11] = [
    ("日期", "date"),
    ("开盘", "open"),
    ("收盘", "close"),
    ("最高", "high"),
    ("最低", "low"),
    ("成交量", "volume"),
    ("成交额", "amount"),
    ("振幅", "amplitude"),
    ("涨跌幅", "pct_chg"),
    ("涨跌额", "change"),
    ("换手率", "turnover_rate"),
];

/// 行情列表字段 -> 中文列名
pub const CLIST_FIELDS: [(&str, &str); 11] = [
    ("f12", "代码"),
    ("f14", "名称"),
    ("f2", "最新价"),
    ("f3", "涨跌幅"),
    ("f4", "涨跌额"),
    ("f5", "成交量"),
    ("f6", "成交额"),
    ("f15", "最高"),
    ("f16", "最低"),
    ("f17", "今开"),
    ("f18", "昨收"),
];

/// 个股快照字段 -> 中文列名（f86 为行情时间戳，单独处理为“日期”）
pub const QUOTE_FIELDS: [(&str, &str); 7] = [
    ("f43", "收盘价"),
    ("f163", "市盈率"),
    ("f164", "市盈率TTM"),
    ("f167", "市净率"),
    ("f116", "总市值"),
    ("f117", "流通市值"),
    ("f168", "换手率"),
];

/// 主要财务指标字段 -> 中文列名
pub const INDICATOR_FIELDS: [(&str, &str); 12] = [
    ("REPORT_DATE", "报告期"),
    ("ROE_AVG", "净资产收益率"),
    ("ROA", "总资产净利率"),
    ("GROSS_PROFIT_RATIO", "毛利率"),
    ("NET_PROFIT_RATIO", "净利率"),
    ("DEBT_ASSET_RATIO", "资产负债率"),
    ("CURRENT_RATIO", "流动比率"),
    ("QUICK_RATIO", "速动比率"),
    ("BASIC_EPS", "每股收益"),
    ("BPS", "每股净资产"),
    ("HOLDER_PROFIT_YOY", "净利润同比"),
    ("OPERATE_INCOME_YOY", "营收同比"),
];

/// 公司概况字段 -> 中文项目名
pub const PROFILE_FIELDS: [(&str, &str); 17] = [
    ("ORG_NAME", "公司名称"),
    ("ORG_EN_ABBR", "英文名称"),
    ("REG_PLACE", "注册地"),
    ("REG_ADDRESS", "注册地址"),
    ("FOUND_DATE", "成立日期"),
    ("BELONG_INDUSTRY", "所属行业"),
    ("CHAIRMAN", "董事长"),
    ("SECRETARY", "董秘"),
    ("EMP_NUM", "员工人数"),
    ("ADDRESS", "办公地址"),
    ("ORG_WEB", "公司网址"),
    ("ORG_EMAIL", "电子邮箱"),
    ("YEAR_SETTLE_DAY", "年结日"),
    ("ORG_TEL", "联系电话"),
    ("ACCOUNT_FIRM", "核数师"),
    ("ORG_FAX", "传真"),
    ("ORG_PROFILE", "公司介绍"),
];

// ==================== 辅助函数 ====================

/// 获取香港时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_hk_time() -> String {
    Utc::now().with_timezone(&Hong_Kong).to_rfc3339()
}

/// Unix 时间戳（秒）转香港日期 YYYY-MM-DD
pub fn timestamp_to_hk_date(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.with_timezone(&Hong_Kong).format("%Y-%m-%d").to_string())
}

/// 数据源数值文本转 JSON 数值
///
/// 整数优先保持整数；"-"、空串等无效值为 null
pub fn parse_number(raw: &str) -> Value {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// 数据源返回的 "-" 视为缺失
pub fn clean_value(value: Value) -> Value {
    match value {
        Value::String(s) if s.trim() == "-" || s.trim().is_empty() => Value::Null,
        other => other,
    }
}

/// 日期时间字符串只保留日期部分，如 "2023-12-31 00:00:00" -> "2023-12-31"
pub fn date_part(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.split_whitespace().next().unwrap_or("").to_string()),
        other => other.clone(),
    }
}

/// 日期转紧凑格式 YYYYMMDD
///
/// 支持 `YYYY-MM-DD`、`YYYY/MM/DD`、`YYYYMMDD`、带时间部分及 RFC 3339，
/// 无法识别时去掉非数字字符
pub fn compact_date(value: &Value) -> Value {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => return Value::Null,
        other => other.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Value::String(dt.format("%Y%m%d").to_string());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, fmt) {
            return Value::String(dt.format("%Y%m%d").to_string());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, fmt) {
            return Value::String(date.format("%Y%m%d").to_string());
        }
    }

    Value::String(raw.chars().filter(|c| c.is_ascii_digit()).collect())
}
